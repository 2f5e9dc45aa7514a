pub mod codec;
pub mod pubsub;

pub use codec::CodecError;
pub use pubsub::{BrokerError, BrokerResult};

use thiserror::Error;

/// Ошибка инициализации логирования.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("global tracing subscriber already set: {0}")]
    AlreadyInitialized(String),
}
