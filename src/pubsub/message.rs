use std::sync::Arc;

use bytes::Bytes;

/// Сообщение, доставляемое обработчику подписки.
///
/// `topic` всегда содержит полный опубликованный топик, а не шаблон
/// подписки.
#[derive(Debug, Clone)]
pub struct Message {
    pub topic: Arc<str>,
    pub payload: Bytes,
}

impl Message {
    pub fn new(
        topic: impl Into<Arc<str>>,
        payload: impl Into<Bytes>,
    ) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Тест проверяет создание сообщения с &str и &'static [u8]
    #[test]
    fn test_message_creation_with_str_and_bytes() {
        let msg = Message::new("news.sport", Bytes::from_static(b"hello"));

        assert_eq!(msg.topic(), "news.sport");
        assert_eq!(msg.payload, Bytes::from_static(b"hello"));
    }

    /// Тест проверяет создание сообщения с String и Vec<u8>
    #[test]
    fn test_message_creation_with_string_and_vec() {
        let msg = Message::new(String::from("updates"), vec![1u8, 2, 3]);

        assert_eq!(&*msg.topic, "updates");
        assert_eq!(msg.payload.as_ref(), &[1, 2, 3]);
    }

    /// Тест проверяет, что клон разделяет топик, а не копирует его.
    #[test]
    fn test_clone_shares_topic() {
        let msg = Message::new("a.b", Bytes::new());
        let copy = msg.clone();
        assert!(Arc::ptr_eq(&msg.topic, &copy.topic));
        assert!(copy.payload.is_empty());
    }
}
