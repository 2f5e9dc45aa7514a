use thiserror::Error;

use super::CodecError;

pub type BrokerResult<T> = Result<T, BrokerError>;

/// Ошибки брокера pub/sub.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrokerError {
    /// Топик пустой или совпадает с зарезервированным корневым токеном.
    #[error("empty topic")]
    EmptyTopic,

    #[error("topic validation failed: {topic:?}")]
    TopicValidationFailed { topic: String },

    #[error("empty queue value")]
    EmptyQueueValue,

    /// Операция над подпиской, которая уже отписана.
    #[error("invalid subscription")]
    InvalidSubscription,

    #[error("subscription not found")]
    SubscriptionNotFound,

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

impl BrokerError {
    pub fn validation_failed(topic: impl Into<String>) -> Self {
        Self::TopicValidationFailed {
            topic: topic.into(),
        }
    }
}
