use std::{
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Weak,
    },
};

use parking_lot::RwLock;

use super::{Message, SubscriptionGroup};
use crate::error::{BrokerError, BrokerResult};

/// Обработчик входящих сообщений.
///
/// Вызывается синхронно в потоке публикующего под блокировкой брокера,
/// поэтому не должен обращаться к тому же брокеру.
pub type Handler = Arc<dyn Fn(&Message) + Send + Sync>;

static NEXT_SUBSCRIPTION_ID: AtomicU64 = AtomicU64::new(1);

/// Изменяемая часть подписки. Оба поля очищаются одновременно.
struct SubscriptionState {
    handler: Option<Handler>,
    group: Option<Weak<SubscriptionGroup>>,
}

struct SubscriptionInner {
    id: u64,
    topic: Arc<str>,
    queue: Arc<str>,
    state: RwLock<SubscriptionState>,
}

/// Зарегистрированный интерес к шаблону топика.
///
/// Подписка живёт, пока её явно не отпишут через [`Subscription::unsubscribe`].
/// Клоны разделяют одно и то же состояние.
#[derive(Clone)]
pub struct Subscription {
    inner: Arc<SubscriptionInner>,
}

impl Subscription {
    pub(crate) fn new(
        topic: Arc<str>,
        queue: Arc<str>,
        handler: Handler,
        group: Weak<SubscriptionGroup>,
    ) -> Self {
        Self {
            inner: Arc::new(SubscriptionInner {
                id: NEXT_SUBSCRIPTION_ID.fetch_add(1, Ordering::Relaxed),
                topic,
                queue,
                state: RwLock::new(SubscriptionState {
                    handler: Some(handler),
                    group: Some(group),
                }),
            }),
        }
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Шаблон топика, на который оформлена подписка.
    pub fn topic(&self) -> &str {
        &self.inner.topic
    }

    /// Имя очереди; пустая строка означает широковещательную подписку.
    pub fn queue(&self) -> &str {
        &self.inner.queue
    }

    pub(crate) fn queue_key(&self) -> &Arc<str> {
        &self.inner.queue
    }

    pub fn is_valid(&self) -> bool {
        let state = self.inner.state.read();
        state.handler.is_some() && state.group.is_some()
    }

    /// Отписывается и удаляет подписку из её группы.
    ///
    /// Повторный вызов возвращает [`BrokerError::InvalidSubscription`].
    /// После возврата обработчик больше не вызывается: доставка держит
    /// блокировку подписки на чтение, а отписка ждёт её на запись.
    pub fn unsubscribe(&self) -> BrokerResult<()> {
        let group = {
            let mut state = self.inner.state.write();
            if state.handler.is_none() || state.group.is_none() {
                return Err(BrokerError::InvalidSubscription);
            }
            state.handler = None;
            state.group.take()
        };

        tracing::debug!(
            id = self.inner.id,
            topic = %self.inner.topic,
            queue = %self.inner.queue,
            "Unsubscribed"
        );

        match group.and_then(|g| g.upgrade()) {
            Some(group) => group.remove(self),
            None => Err(BrokerError::SubscriptionNotFound),
        }
    }

    /// Доставляет сообщение обработчику.
    ///
    /// Если подписка уже отписана, обработчик не вызывается и возвращается
    /// [`BrokerError::InvalidSubscription`].
    pub(crate) fn deliver(
        &self,
        message: &Message,
    ) -> BrokerResult<()> {
        let state = self.inner.state.read();
        match (&state.handler, &state.group) {
            (Some(handler), Some(_)) => {
                handler(message);
                tracing::trace!(id = self.inner.id, topic = %message.topic, "Delivered");
                Ok(())
            }
            _ => Err(BrokerError::InvalidSubscription),
        }
    }

    pub(crate) fn same_as(
        &self,
        other: &Subscription,
    ) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Subscription {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.inner.id)
            .field("topic", &self.inner.topic)
            .field("queue", &self.inner.queue)
            .field("valid", &self.is_valid())
            .finish()
    }
}
