use std::{sync::Arc, time::Duration};

use serde::{de::DeserializeOwned, Serialize};

use super::{Broker, Message, Subscription};
use crate::{codec::Codec, error::BrokerResult};

/// Типизированная обёртка над [`Broker`]: значения кодируются кодеком
/// перед публикацией и декодируются перед вызовом обработчика.
///
/// Сообщение, которое не удалось декодировать, логируется и пропускается.
pub struct TypedBus<C: Codec> {
    broker: Broker,
    codec: Arc<C>,
}

impl<C: Codec> Clone for TypedBus<C> {
    fn clone(&self) -> Self {
        Self {
            broker: self.broker.clone(),
            codec: self.codec.clone(),
        }
    }
}

impl<C: Codec> TypedBus<C> {
    pub fn new(
        broker: Broker,
        codec: C,
    ) -> Self {
        Self {
            broker,
            codec: Arc::new(codec),
        }
    }

    pub fn broker(&self) -> &Broker {
        &self.broker
    }

    pub fn publish<T: Serialize>(
        &self,
        topic: &str,
        value: &T,
    ) -> BrokerResult<()> {
        let payload = self.codec.encode(value)?;
        self.broker.publish(topic, payload)
    }

    /// Кодирует значение сразу, публикует через `delay`.
    pub fn publish_with_delay<T: Serialize>(
        &self,
        topic: &str,
        value: &T,
        delay: Duration,
    ) -> BrokerResult<()> {
        let payload = self.codec.encode(value)?;
        self.broker.publish_with_delay(topic, payload, delay);
        Ok(())
    }

    pub fn subscribe<T, F>(
        &self,
        topic: &str,
        handler: F,
    ) -> BrokerResult<Subscription>
    where
        T: DeserializeOwned + 'static,
        F: Fn(&str, T) + Send + Sync + 'static,
    {
        self.broker.subscribe(topic, self.decoding(handler))
    }

    pub fn queue_subscribe<T, F>(
        &self,
        topic: &str,
        queue: &str,
        handler: F,
    ) -> BrokerResult<Subscription>
    where
        T: DeserializeOwned + 'static,
        F: Fn(&str, T) + Send + Sync + 'static,
    {
        self.broker
            .queue_subscribe(topic, queue, self.decoding(handler))
    }

    fn decoding<T, F>(
        &self,
        handler: F,
    ) -> impl Fn(&Message) + Send + Sync + 'static
    where
        T: DeserializeOwned + 'static,
        F: Fn(&str, T) + Send + Sync + 'static,
    {
        let codec = self.codec.clone();
        move |msg: &Message| match codec.decode::<T>(&msg.payload) {
            Ok(value) => handler(msg.topic(), value),
            Err(err) => {
                tracing::warn!(topic = %msg.topic, error = %err, "Failed to decode payload");
            }
        }
    }
}
