use async_trait::async_trait;

use crate::errors::NotifyError;

/// One outbound channel. `send` makes a single delivery attempt; retrying
/// is the dispatcher's job.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), NotifyError>;

    /// Longest message the channel accepts, in characters.
    fn max_message_len(&self) -> usize {
        4096
    }
}
