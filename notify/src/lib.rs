pub mod dispatcher;
pub mod errors;
pub mod notifier;
pub mod telegram;

pub use dispatcher::{Dispatcher, RetryPolicy, split_message};
pub use errors::NotifyError;
pub use notifier::Notifier;
pub use telegram::TelegramNotifier;
