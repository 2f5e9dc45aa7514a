use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::{
    GroupKind, Handler, Message, QueueResolver, Segment, Subscription, SubscriptionGroup,
};

/// Узел дерева сегментов топика.
///
/// Каждый узел владеет четырьмя группами:
/// - `broadcast` / `queued` — подписки, шаблон которых заканчивается здесь;
/// - `broadcast_tail` / `queued_tail` — используются только узлом,
///   стоящим под `>`, и получают всё, что глубже его родителя.
///
/// Узлы создаются лениво при подписке и никогда не удаляются.
#[derive(Debug)]
pub struct TopicNode {
    broadcast: Arc<SubscriptionGroup>,
    broadcast_tail: Arc<SubscriptionGroup>,
    queued: Arc<SubscriptionGroup>,
    queued_tail: Arc<SubscriptionGroup>,
    literals: FxHashMap<Arc<str>, TopicNode>,
    single: Option<Box<TopicNode>>,
    tail: Option<Box<TopicNode>>,
}

impl Default for TopicNode {
    fn default() -> Self {
        Self::new()
    }
}

impl TopicNode {
    pub fn new() -> Self {
        Self {
            broadcast: SubscriptionGroup::new(GroupKind::Broadcast),
            broadcast_tail: SubscriptionGroup::new(GroupKind::Broadcast),
            queued: SubscriptionGroup::new(GroupKind::Queued),
            queued_tail: SubscriptionGroup::new(GroupKind::Queued),
            literals: FxHashMap::default(),
            single: None,
            tail: None,
        }
    }

    fn here_group(
        &self,
        queue: &str,
    ) -> &Arc<SubscriptionGroup> {
        if queue.is_empty() {
            &self.broadcast
        } else {
            &self.queued
        }
    }

    fn tail_group(
        &self,
        queue: &str,
    ) -> &Arc<SubscriptionGroup> {
        if queue.is_empty() {
            &self.broadcast_tail
        } else {
            &self.queued_tail
        }
    }

    /// Регистрирует подписку по оставшимся сегментам шаблона.
    pub fn subscribe(
        &mut self,
        remaining: &[Segment],
        pattern: &Arc<str>,
        queue: &Arc<str>,
        handler: Handler,
    ) -> Subscription {
        match remaining.split_first() {
            None => self
                .here_group(queue)
                .add(pattern.clone(), queue.clone(), handler),
            Some((Segment::TailWildcard, _)) => self
                .tail
                .get_or_insert_with(Default::default)
                .tail_group(queue)
                .add(pattern.clone(), queue.clone(), handler),
            Some((Segment::SingleWildcard, rest)) => self
                .single
                .get_or_insert_with(Default::default)
                .subscribe(rest, pattern, queue, handler),
            Some((Segment::Literal(segment), rest)) => self
                .literals
                .entry(segment.clone())
                .or_default()
                .subscribe(rest, pattern, queue, handler),
        }
    }

    /// Обходит дерево по сегментам опубликованного топика.
    ///
    /// Широковещательные группы получают сообщение сразу, очередные
    /// участники складываются в `resolver`. Возвращает число синхронных
    /// доставок.
    pub fn publish(
        &self,
        remaining: &[&str],
        message: &Message,
        resolver: &mut QueueResolver,
    ) -> usize {
        let Some((first, rest)) = remaining.split_first() else {
            return self.broadcast.dispatch(message, resolver)
                + self.queued.dispatch(message, resolver);
        };

        let mut delivered = 0;
        if let Some(child) = self.literals.get(*first) {
            delivered += child.publish(rest, message, resolver);
        }
        if let Some(child) = &self.single {
            delivered += child.publish(rest, message, resolver);
        }
        if let Some(child) = &self.tail {
            delivered += child.broadcast_tail.dispatch(message, resolver)
                + child.queued_tail.dispatch(message, resolver);
        }
        delivered
    }

    /// Число живых подписок в поддереве.
    pub fn subscription_count(&self) -> usize {
        let own = self.broadcast.len()
            + self.broadcast_tail.len()
            + self.queued.len()
            + self.queued_tail.len();
        own + self.children().map(TopicNode::subscription_count).sum::<usize>()
    }

    /// Число узлов в поддереве, включая этот.
    pub fn node_count(&self) -> usize {
        1 + self.children().map(TopicNode::node_count).sum::<usize>()
    }

    fn children(&self) -> impl Iterator<Item = &TopicNode> {
        self.literals
            .values()
            .chain(self.single.as_deref())
            .chain(self.tail.as_deref())
    }
}
