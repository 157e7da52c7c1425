use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("message rejected by channel: {0}")]
    Rejected(String),

    #[error("message not delivered after {attempts} attempts")]
    Exhausted { attempts: u32 },
}
