//! Delivery with bounded retries.
//!
//! A failed attempt is logged and retried after a fixed delay, up to
//! `max_attempts` in total. Undelivered messages are dropped, never queued
//! for a later cycle.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::errors::NotifyError;
use crate::notifier::Notifier;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            delay: Duration::from_secs(5),
        }
    }
}

#[derive(Clone)]
pub struct Dispatcher {
    notifier: Arc<dyn Notifier>,
    policy: RetryPolicy,
}

impl Dispatcher {
    pub fn new(notifier: Arc<dyn Notifier>, policy: RetryPolicy) -> Self {
        Self {
            notifier,
            policy: RetryPolicy {
                max_attempts: policy.max_attempts.max(1),
                ..policy
            },
        }
    }

    /// Sends `text`, split into several messages if it exceeds the
    /// channel's limit. Fails if any part could not be delivered; the
    /// remaining parts are still attempted.
    pub async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let parts = split_message(text, self.notifier.max_message_len());
        if parts.is_empty() {
            debug!("empty notification skipped");
            return Ok(());
        }

        let mut outcome = Ok(());
        for part in &parts {
            if let Err(e) = self.send_with_retry(part).await {
                outcome = Err(e);
            }
        }
        outcome
    }

    async fn send_with_retry(&self, text: &str) -> Result<(), NotifyError> {
        let max = self.policy.max_attempts;

        for attempt in 1..=max {
            match self.notifier.send(text).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    warn!(
                        attempt,
                        max_attempts = max,
                        retry_in_s = self.policy.delay.as_secs(),
                        error = %e,
                        "notification send failed"
                    );
                    if attempt < max {
                        tokio::time::sleep(self.policy.delay).await;
                    }
                }
            }
        }

        error!(attempts = max, "notification not delivered after all attempts");
        Err(NotifyError::Exhausted { attempts: max })
    }
}

/// Splits `text` into chunks of at most `limit` characters, breaking on line
/// boundaries where possible. Lines longer than `limit` are cut.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for line in text.split('\n') {
        let line_len = line.chars().count();
        let needed = if current.is_empty() {
            line_len
        } else {
            line_len + 1
        };

        if current_len + needed <= limit {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
            current_len += needed;
            continue;
        }

        if !current.is_empty() {
            push_part(&mut parts, std::mem::take(&mut current));
            current_len = 0;
        }

        let chars: Vec<char> = line.chars().collect();
        let mut chunks = chars.chunks(limit).peekable();
        while let Some(chunk) = chunks.next() {
            let piece: String = chunk.iter().collect();
            if chunks.peek().is_some() {
                push_part(&mut parts, piece);
            } else {
                current_len = chunk.len();
                current = piece;
            }
        }
    }

    push_part(&mut parts, current);
    parts
}

/// Blank parts are dropped; the channel rejects them.
fn push_part(parts: &mut Vec<String>, part: String) {
    if !part.trim().is_empty() {
        parts.push(part);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use tokio::time::Instant;

    use super::*;

    /// Fails the first `fail_first` calls, then succeeds.
    struct FlakyNotifier {
        calls: AtomicU32,
        fail_first: u32,
        sent: Mutex<Vec<String>>,
        limit: usize,
    }

    impl FlakyNotifier {
        fn new(fail_first: u32) -> Self {
            Self {
                calls: AtomicU32::new(0),
                fail_first,
                sent: Mutex::new(Vec::new()),
                limit: 4096,
            }
        }
    }

    #[async_trait]
    impl Notifier for FlakyNotifier {
        async fn send(&self, text: &str) -> Result<(), NotifyError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n <= self.fail_first {
                return Err(NotifyError::Rejected("Too Many Requests".into()));
            }
            self.sent.lock().unwrap().push(text.to_string());
            Ok(())
        }

        fn max_message_len(&self) -> usize {
            self.limit
        }
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures() {
        let notifier = Arc::new(FlakyNotifier::new(3));
        let dispatcher = Dispatcher::new(notifier.clone(), RetryPolicy::default());

        let start = Instant::now();
        dispatcher.send("hello").await.unwrap();

        assert_eq!(notifier.calls.load(Ordering::SeqCst), 4);
        assert_eq!(start.elapsed(), Duration::from_secs(15));
        assert_eq!(*notifier.sent.lock().unwrap(), vec!["hello".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_ten_attempts() {
        let notifier = Arc::new(FlakyNotifier::new(u32::MAX));
        let dispatcher = Dispatcher::new(notifier.clone(), RetryPolicy::default());

        let start = Instant::now();
        let err = dispatcher.send("hello").await.unwrap_err();

        assert!(matches!(err, NotifyError::Exhausted { attempts: 10 }));
        assert_eq!(notifier.calls.load(Ordering::SeqCst), 10);
        // No sleep after the last attempt.
        assert_eq!(start.elapsed(), Duration::from_secs(45));
    }

    #[tokio::test]
    async fn empty_text_sends_nothing() {
        let notifier = Arc::new(FlakyNotifier::new(0));
        let dispatcher = Dispatcher::new(notifier.clone(), RetryPolicy::default());

        dispatcher.send("").await.unwrap();

        assert_eq!(notifier.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn long_messages_go_out_in_parts() {
        let notifier = Arc::new(FlakyNotifier {
            limit: 10,
            ..FlakyNotifier::new(0)
        });
        let dispatcher = Dispatcher::new(notifier.clone(), RetryPolicy::default());

        dispatcher.send("aaaa\nbbbb\ncccc").await.unwrap();

        assert_eq!(
            *notifier.sent.lock().unwrap(),
            vec!["aaaa\nbbbb".to_string(), "cccc".to_string()]
        );
    }

    #[test]
    fn split_keeps_short_text_whole() {
        assert_eq!(split_message("a\nb", 4096), vec!["a\nb".to_string()]);
    }

    #[test]
    fn split_cuts_overlong_lines() {
        assert_eq!(
            split_message("abcdefg\nhi", 3),
            vec![
                "abc".to_string(),
                "def".to_string(),
                "g".to_string(),
                "hi".to_string()
            ]
        );
    }

    #[test]
    fn split_drops_blank_parts_mid_stream() {
        assert_eq!(
            split_message("abc\n   \nx", 3),
            vec!["abc".to_string(), "x".to_string()]
        );
        assert_eq!(
            split_message("ab\n      \ncd", 2),
            vec!["ab".to_string(), "cd".to_string()]
        );
    }

    #[test]
    fn split_counts_characters_not_bytes() {
        let parts = split_message("ééé\nééé", 7);
        assert_eq!(parts, vec!["ééé\nééé".to_string()]);
    }
}
