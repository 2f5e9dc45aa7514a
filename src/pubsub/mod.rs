//! Подсистема Publish–Subscribe (pub/sub).
//!
//! Внутрипроцессная шина сообщений с иерархическими топиками:
//!
//! - `topic`: грамматика топиков и их разбор в сегменты.
//! - `subscription`: отдельная подписка и её жизненный цикл.
//! - `group`: группы подписок (широковещательные и очередные).
//! - `tree`: дерево сегментов топиков, подписка и обход при публикации.
//! - `resolver`: доставка по очередям для одной публикации.
//! - `random`: источники случайных индексов для выбора в очереди.
//! - `broker`: фасад брокера.
//! - `typed`: типизированная обёртка поверх кодека.

pub mod broker;
pub mod group;
pub mod message;
pub mod random;
pub mod resolver;
pub mod subscription;
pub mod topic;
pub mod tree;
pub mod typed;

pub use broker::*;
pub use group::*;
pub use message::*;
pub use random::*;
pub use resolver::*;
pub use subscription::*;
pub use topic::*;
pub use tree::*;
pub use typed::*;
