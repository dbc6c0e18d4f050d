//! SubscriptionRegistry - topic ごとの handler の登録と管理
//!
//! # 学習ポイント
//! - HashMap での型消去された trait object の管理
//! - Generic methods での登録と型安全性
//! - `TypeId` による「1 topic = 1 メッセージ型」の保証
//!
//! `call` は型を検証しない前提で設計されているので、
//! 同じ topic に別の型の handler を混ぜないことが registry の責任です。

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use super::handler::{SubscriptionHandler, TypedSubscriptionHandler};
use super::message::Message;
use crate::domain::topic::Topic;

/// Subscription は 1 topic 分の handler 群（全て同じメッセージ型）
pub struct Subscription {
    message_type: &'static str,
    type_id: TypeId,
    handlers: Vec<Arc<dyn SubscriptionHandler>>,
}

impl Subscription {
    fn new<M: Message>() -> Self {
        Self {
            message_type: M::TYPE,
            type_id: TypeId::of::<M>(),
            handlers: Vec::new(),
        }
    }

    pub fn message_type(&self) -> &'static str {
        self.message_type
    }

    pub fn handlers(&self) -> &[Arc<dyn SubscriptionHandler>] {
        &self.handlers
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// RegistryError は SubscriptionRegistry の操作エラー
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("topic '{topic}' carries {registered}, cannot subscribe with {requested}")]
    TypeMismatch {
        topic: Topic,
        registered: &'static str,
        requested: &'static str,
    },
}

/// SubscriptionRegistry は topic → Subscription の対応を管理
///
/// # 使用例
/// ```ignore
/// let mut registry = SubscriptionRegistry::new();
/// registry.register(Topic::new("/chatter"), TypedSubscriptionHandler::<Chatter>::new(on_chatter))?;
///
/// let sub = registry.get(&Topic::new("/chatter")).unwrap();
/// assert_eq!(sub.message_type(), "std_msgs/String");
/// ```
///
/// # 設計
/// - 初期化時に組み立て（mutable）
/// - 配送中は読み取りのみ（immutable）なのでロック不要
#[derive(Default)]
pub struct SubscriptionRegistry {
    subscriptions: HashMap<Topic, Subscription>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self {
            subscriptions: HashMap::new(),
        }
    }

    /// handler を topic に追加
    ///
    /// topic が既に別の型で登録されていれば `RegistryError::TypeMismatch`。
    pub fn register<M: Message>(
        &mut self,
        topic: Topic,
        handler: TypedSubscriptionHandler<M>,
    ) -> Result<(), RegistryError> {
        let subscription = self
            .subscriptions
            .entry(topic.clone())
            .or_insert_with(Subscription::new::<M>);

        if subscription.type_id != TypeId::of::<M>() {
            return Err(RegistryError::TypeMismatch {
                topic,
                registered: subscription.message_type,
                requested: M::TYPE,
            });
        }
        subscription.handlers.push(Arc::new(handler));
        Ok(())
    }

    pub fn get(&self, topic: &Topic) -> Option<&Subscription> {
        self.subscriptions.get(topic)
    }

    pub fn topics(&self) -> Vec<Topic> {
        self.subscriptions.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typed::fixtures::{Point, Text};

    fn ignore<M: Message + Default>() -> TypedSubscriptionHandler<M> {
        TypedSubscriptionHandler::new(|_| {})
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = SubscriptionRegistry::new();
        registry
            .register(Topic::new("/chatter"), ignore::<Text>())
            .unwrap();

        let sub = registry.get(&Topic::new("/chatter")).unwrap();
        assert_eq!(sub.message_type(), Text::TYPE);
        assert_eq!(sub.len(), 1);
    }

    #[test]
    fn test_same_type_handlers_share_a_topic() {
        let mut registry = SubscriptionRegistry::new();
        registry.register(Topic::new("/pose"), ignore::<Point>()).unwrap();
        registry.register(Topic::new("/pose"), ignore::<Point>()).unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(&Topic::new("/pose")).unwrap().len(), 2);
    }

    #[test]
    fn test_mixing_types_on_a_topic_is_rejected() {
        let mut registry = SubscriptionRegistry::new();
        registry.register(Topic::new("/mixed"), ignore::<Point>()).unwrap();

        let result = registry.register(Topic::new("/mixed"), ignore::<Text>());

        assert!(matches!(
            result,
            Err(RegistryError::TypeMismatch { registered, requested, .. })
                if registered == Point::TYPE && requested == Text::TYPE
        ));
        // 失敗した登録は既存の subscription を変えない
        assert_eq!(registry.get(&Topic::new("/mixed")).unwrap().len(), 1);
    }

    #[test]
    fn test_topics_lists_registered_topics() {
        let mut registry = SubscriptionRegistry::new();
        registry.register(Topic::new("/a"), ignore::<Point>()).unwrap();
        registry.register(Topic::new("/b"), ignore::<Text>()).unwrap();

        let mut topics = registry.topics();
        topics.sort();
        assert_eq!(topics, vec![Topic::new("/a"), Topic::new("/b")]);
        assert!(registry.get(&Topic::new("/c")).is_none());
    }
}
