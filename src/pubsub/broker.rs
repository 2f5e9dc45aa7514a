use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use bytes::Bytes;
use parking_lot::Mutex;

use super::{
    parse, publish_segments, Handler, IndexSource, Message, QueueResolver, SeededSource,
    Subscription, ThreadRngSource, TopicKind, TopicNode,
};
use crate::{
    config::Settings,
    error::{BrokerError, BrokerResult},
};

/// Зарезервированный корневой токен по умолчанию. Топик, равный ему,
/// считается пустым.
pub const DEFAULT_ROOT_TOKEN: &str = "$root";

/// Снимок счётчиков брокера.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BrokerStats {
    /// Успешно провалидированные вызовы `publish`.
    pub publish_count: u64,
    /// Доставки обработчикам (широковещательные и очередные).
    pub delivery_count: u64,
    /// Кандидаты очередей, отброшенные как отписанные.
    pub dropped_queue_candidates: u64,
    /// Отложенные публикации, завершившиеся ошибкой.
    pub delayed_failures: u64,
}

#[derive(Debug, Default)]
struct Counters {
    publish_count: AtomicU64,
    delivery_count: AtomicU64,
    dropped_queue_candidates: AtomicU64,
    delayed_failures: AtomicU64,
}

struct BrokerInner {
    /// Дерево подписок; блокировка держится на всё время subscribe/publish,
    /// включая вызовы обработчиков.
    root: Mutex<TopicNode>,
    root_token: Arc<str>,
    picker: Arc<dyn IndexSource>,
    counters: Counters,
}

/// Внутрипроцессный брокер сообщений с иерархическими топиками.
///
/// Поддерживает:
/// - точные подписки и шаблоны `*` / `>`
/// - широковещательную доставку и очереди (один получатель на имя очереди)
/// - отложенную публикацию
///
/// `Broker` дешево клонируется; клоны работают с одним деревом.
#[derive(Clone)]
pub struct Broker {
    inner: Arc<BrokerInner>,
}

/// Построитель [`Broker`].
#[derive(Default)]
pub struct BrokerBuilder {
    root_token: Option<String>,
    index_source: Option<Arc<dyn IndexSource>>,
}

impl BrokerBuilder {
    pub fn root_token(
        mut self,
        token: impl Into<String>,
    ) -> Self {
        self.root_token = Some(token.into());
        self
    }

    /// Источник случайных индексов для выбора получателя в очереди.
    pub fn index_source(
        mut self,
        source: Arc<dyn IndexSource>,
    ) -> Self {
        self.index_source = Some(source);
        self
    }

    pub fn build(self) -> Broker {
        let root_token = self
            .root_token
            .unwrap_or_else(|| DEFAULT_ROOT_TOKEN.to_string());
        Broker {
            inner: Arc::new(BrokerInner {
                root: Mutex::new(TopicNode::new()),
                root_token: Arc::from(root_token),
                picker: self
                    .index_source
                    .unwrap_or_else(|| Arc::new(ThreadRngSource)),
                counters: Counters::default(),
            }),
        }
    }
}

impl Default for Broker {
    fn default() -> Self {
        Self::new()
    }
}

impl Broker {
    pub fn new() -> Self {
        BrokerBuilder::default().build()
    }

    pub fn builder() -> BrokerBuilder {
        BrokerBuilder::default()
    }

    /// Создаёт брокер по настройкам: корневой токен и, если задано,
    /// детерминированное зерно для выбора получателя очереди.
    pub fn from_settings(settings: &Settings) -> Self {
        let mut builder = Self::builder().root_token(settings.root_token.clone());
        if let Some(seed) = settings.rng_seed {
            builder = builder.index_source(Arc::new(SeededSource::new(seed)));
        }
        builder.build()
    }

    pub fn root_token(&self) -> &str {
        &self.inner.root_token
    }

    /// Широковещательная подписка на шаблон топика.
    pub fn subscribe<F>(
        &self,
        topic: &str,
        handler: F,
    ) -> BrokerResult<Subscription>
    where
        F: Fn(&Message) + Send + Sync + 'static,
    {
        self.register(topic, "", Arc::new(handler))
    }

    /// Подписка в очередь `queue`: каждое сообщение получает ровно один
    /// живой участник очереди.
    pub fn queue_subscribe<F>(
        &self,
        topic: &str,
        queue: &str,
        handler: F,
    ) -> BrokerResult<Subscription>
    where
        F: Fn(&Message) + Send + Sync + 'static,
    {
        if queue.is_empty() {
            return Err(BrokerError::EmptyQueueValue);
        }
        self.register(topic, queue, Arc::new(handler))
    }

    pub(crate) fn register(
        &self,
        topic: &str,
        queue: &str,
        handler: Handler,
    ) -> BrokerResult<Subscription> {
        let segments = parse(topic, &self.inner.root_token, TopicKind::Pattern)?;
        let pattern: Arc<str> = Arc::from(topic);
        let queue: Arc<str> = Arc::from(queue);

        let sub = self
            .inner
            .root
            .lock()
            .subscribe(&segments, &pattern, &queue, handler);

        tracing::debug!(id = sub.id(), topic = %pattern, queue = %queue, "Subscribed");
        Ok(sub)
    }

    /// Публикует сообщение всем подпискам, совпадающим с топиком.
    ///
    /// Широковещательные подписчики вызываются синхронно во время обхода
    /// дерева, затем выполняется доставка по очередям.
    pub fn publish(
        &self,
        topic: &str,
        payload: impl Into<Bytes>,
    ) -> BrokerResult<()> {
        let segments = publish_segments(topic, &self.inner.root_token)?;
        let message = Message::new(topic, payload);
        let mut resolver = QueueResolver::new();

        let (broadcast, queued) = {
            let root = self.inner.root.lock();
            let broadcast = root.publish(&segments, &message, &mut resolver);
            let queued = resolver.deliver(&message, self.inner.picker.as_ref());
            (broadcast, queued)
        };

        let counters = &self.inner.counters;
        counters.publish_count.fetch_add(1, Ordering::Relaxed);
        counters
            .delivery_count
            .fetch_add((broadcast + queued.delivered) as u64, Ordering::Relaxed);
        counters
            .dropped_queue_candidates
            .fetch_add(queued.dropped as u64, Ordering::Relaxed);

        tracing::trace!(
            topic,
            broadcast,
            queued = queued.delivered,
            dropped = queued.dropped,
            "Published"
        );
        Ok(())
    }

    /// Планирует публикацию через `delay` и сразу возвращается.
    ///
    /// Ошибка отложенной публикации только логируется. Отменить
    /// запланированную публикацию нельзя. Таймер живёт в отдельном потоке
    /// и не зависит от runtime вызывающего: остановка runtime не отменяет
    /// публикацию.
    pub fn publish_with_delay(
        &self,
        topic: impl Into<String>,
        payload: impl Into<Bytes>,
        delay: Duration,
    ) {
        let broker = self.clone();
        let topic = topic.into();
        let payload = payload.into();

        let spawned = std::thread::Builder::new()
            .name("localbus-delayed".into())
            .spawn(move || {
                std::thread::sleep(delay);
                broker.fire_delayed(&topic, payload);
            });
        if let Err(err) = spawned {
            self.inner
                .counters
                .delayed_failures
                .fetch_add(1, Ordering::Relaxed);
            tracing::error!(error = %err, "Failed to schedule delayed publish");
        }
    }

    fn fire_delayed(
        &self,
        topic: &str,
        payload: Bytes,
    ) {
        if let Err(err) = self.publish(topic, payload) {
            self.inner
                .counters
                .delayed_failures
                .fetch_add(1, Ordering::Relaxed);
            tracing::error!(topic, error = %err, "Delayed publish failed");
        }
    }

    /// Число живых подписок.
    pub fn subscription_count(&self) -> usize {
        self.inner.root.lock().subscription_count()
    }

    pub fn stats(&self) -> BrokerStats {
        let c = &self.inner.counters;
        BrokerStats {
            publish_count: c.publish_count.load(Ordering::Relaxed),
            delivery_count: c.delivery_count.load(Ordering::Relaxed),
            dropped_queue_candidates: c.dropped_queue_candidates.load(Ordering::Relaxed),
            delayed_failures: c.delayed_failures.load(Ordering::Relaxed),
        }
    }
}
