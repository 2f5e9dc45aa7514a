//! Грамматика топиков.
//!
//! Топик — это один или несколько непустых сегментов, разделённых `.`.
//! При подписке допускаются шаблоны:
//! - `*` совпадает ровно с одним сегментом;
//! - `>` совпадает с одним или несколькими хвостовыми сегментами и может
//!   стоять только последним.
//!
//! При публикации шаблоны запрещены.

use std::sync::Arc;

use crate::error::{BrokerError, BrokerResult};

pub const SEPARATOR: char = '.';
pub const SINGLE_WILDCARD: &str = "*";
pub const TAIL_WILDCARD: &str = ">";

/// Один разобранный сегмент топика.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Literal(Arc<str>),
    SingleWildcard,
    TailWildcard,
}

/// Какая грамматика применяется при проверке.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicKind {
    /// Подписка: разрешены `*` и `>`.
    Pattern,
    /// Публикация: только литеральные сегменты.
    Publish,
}

impl TopicKind {
    fn allows_wildcards(self) -> bool {
        matches!(self, TopicKind::Pattern)
    }
}

/// Проверяет топик без разбора в сегменты.
pub fn validate(
    topic: &str,
    root_token: &str,
    allow_wildcards: bool,
) -> BrokerResult<()> {
    let kind = if allow_wildcards {
        TopicKind::Pattern
    } else {
        TopicKind::Publish
    };
    parse(topic, root_token, kind).map(|_| ())
}

/// Разбирает топик в последовательность сегментов.
///
/// Пустой топик и топик, равный `root_token`, дают
/// [`BrokerError::EmptyTopic`]; всё остальное, что не подходит под
/// грамматику, даёт [`BrokerError::TopicValidationFailed`].
pub fn parse(
    topic: &str,
    root_token: &str,
    kind: TopicKind,
) -> BrokerResult<Vec<Segment>> {
    if topic.is_empty() || topic == root_token {
        return Err(BrokerError::EmptyTopic);
    }

    let raw: Vec<&str> = topic.split(SEPARATOR).collect();
    let last = raw.len() - 1;
    let mut segments = Vec::with_capacity(raw.len());

    for (idx, part) in raw.into_iter().enumerate() {
        let segment = match part {
            SINGLE_WILDCARD if kind.allows_wildcards() => Segment::SingleWildcard,
            TAIL_WILDCARD if kind.allows_wildcards() && idx == last => Segment::TailWildcard,
            _ if is_literal(part) => Segment::Literal(Arc::from(part)),
            _ => return Err(BrokerError::validation_failed(topic)),
        };
        segments.push(segment);
    }

    Ok(segments)
}

/// Разбивает опубликованный топик на литеральные сегменты.
pub fn publish_segments<'a>(
    topic: &'a str,
    root_token: &str,
) -> BrokerResult<Vec<&'a str>> {
    if topic.is_empty() || topic == root_token {
        return Err(BrokerError::EmptyTopic);
    }
    let segments: Vec<&str> = topic.split(SEPARATOR).collect();
    if segments.iter().all(|s| is_literal(s)) {
        Ok(segments)
    } else {
        Err(BrokerError::validation_failed(topic))
    }
}

fn is_literal(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| !c.is_whitespace() && c != '*' && c != '>' && c != SEPARATOR)
}
