use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::{IndexSource, Message, Subscription};
use crate::error::BrokerError;

/// Итог работы резолвера за одну публикацию.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct QueueOutcome {
    /// Успешные доставки (не больше одной на имя очереди).
    pub delivered: usize,
    /// Кандидаты, отброшенные как невалидные во время доставки.
    pub dropped: usize,
}

/// Сборщик кандидатов очередей для одной публикации.
///
/// Создаётся заново на каждый вызов `publish` и никогда не разделяется
/// между публикациями.
#[derive(Debug, Default)]
pub struct QueueResolver {
    buckets: FxHashMap<Arc<str>, Vec<Subscription>>,
}

impl QueueResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Раскладывает кандидатов по именам очередей.
    pub fn collect(
        &mut self,
        candidates: impl IntoIterator<Item = Subscription>,
    ) {
        for sub in candidates {
            self.buckets
                .entry(sub.queue_key().clone())
                .or_default()
                .push(sub);
        }
    }

    pub fn candidate_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn queue_count(&self) -> usize {
        self.buckets.len()
    }

    /// Для каждой очереди случайно выбирает кандидата и пытается доставить;
    /// отписанные кандидаты выбрасываются, выбор повторяется среди
    /// оставшихся.
    pub fn deliver(
        self,
        message: &Message,
        picker: &dyn IndexSource,
    ) -> QueueOutcome {
        let mut outcome = QueueOutcome::default();

        for (queue, mut candidates) in self.buckets {
            while !candidates.is_empty() {
                // Внешний источник может вернуть индекс за границей.
                let idx = picker.pick(candidates.len()).min(candidates.len() - 1);
                match candidates[idx].deliver(message) {
                    Ok(()) => {
                        outcome.delivered += 1;
                        break;
                    }
                    Err(BrokerError::InvalidSubscription) => {
                        tracing::warn!(
                            queue = %queue,
                            topic = %message.topic,
                            id = candidates[idx].id(),
                            "Dropping invalid queue candidate"
                        );
                        candidates.swap_remove(idx);
                        outcome.dropped += 1;
                    }
                    Err(err) => {
                        tracing::error!(queue = %queue, error = %err, "Queue delivery failed");
                        candidates.swap_remove(idx);
                        outcome.dropped += 1;
                    }
                }
            }
        }

        outcome
    }
}
