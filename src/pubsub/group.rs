use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use super::{Handler, Message, QueueResolver, Subscription};
use crate::error::{BrokerError, BrokerResult};

/// Семантика доставки группы.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    /// Каждый участник получает каждое сообщение.
    Broadcast,
    /// Участники — кандидаты на доставку "одному из очереди".
    Queued,
}

/// Набор подписок, разделяющих одну точку сопоставления в дереве.
///
/// Порядок участников не имеет значения. Участники хранятся по id
/// подписки, удаление выполняется за O(1).
#[derive(Debug)]
pub struct SubscriptionGroup {
    kind: GroupKind,
    members: Mutex<FxHashMap<u64, Subscription>>,
}

impl SubscriptionGroup {
    pub fn new(kind: GroupKind) -> Arc<Self> {
        Arc::new(Self {
            kind,
            members: Mutex::new(FxHashMap::default()),
        })
    }

    pub fn kind(&self) -> GroupKind {
        self.kind
    }

    /// Создаёт подписку, принадлежащую этой группе.
    pub fn add(
        self: &Arc<Self>,
        topic: Arc<str>,
        queue: Arc<str>,
        handler: Handler,
    ) -> Subscription {
        let sub = Subscription::new(topic, queue, handler, Arc::downgrade(self));
        self.members.lock().insert(sub.id(), sub.clone());
        sub
    }

    pub fn remove(
        &self,
        sub: &Subscription,
    ) -> BrokerResult<()> {
        let mut members = self.members.lock();
        match members.get(&sub.id()) {
            Some(member) if member.same_as(sub) => {
                members.remove(&sub.id());
                Ok(())
            }
            _ => Err(BrokerError::SubscriptionNotFound),
        }
    }

    /// Снимок участников; блокировка группы отпускается до возврата.
    pub fn members(&self) -> Vec<Subscription> {
        self.members.lock().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.members.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.lock().is_empty()
    }

    /// Рассылает сообщение всем живым участникам. Возвращает число
    /// доставок.
    pub fn send(
        &self,
        message: &Message,
    ) -> usize {
        self.members()
            .iter()
            .filter(|sub| sub.deliver(message).is_ok())
            .count()
    }

    /// Обрабатывает сообщение согласно виду группы: широковещательная
    /// группа доставляет сразу, очередная передаёт участников резолверу.
    pub(crate) fn dispatch(
        &self,
        message: &Message,
        resolver: &mut QueueResolver,
    ) -> usize {
        match self.kind {
            GroupKind::Broadcast => self.send(message),
            GroupKind::Queued => {
                resolver.collect(self.members());
                0
            }
        }
    }
}
