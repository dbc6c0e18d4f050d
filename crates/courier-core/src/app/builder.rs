//! SubscriberBuilder - subscription の構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）
//! - construction strategy 付きの handler もそのまま登録できる

use std::sync::Arc;

use super::delivery_loop::{DeliveryConfig, DeliveryGroup};
use super::dispatcher::Dispatcher;
use crate::domain::errors::CourierError;
use crate::domain::inbound::InboundMessage;
use crate::domain::topic::Topic;
use crate::ports::InboundSource;
use crate::typed::{Message, RegistryError, SubscriptionRegistry, TypedSubscriptionHandler};

/// SubscriberBuilder は Subscriber を構築
///
/// # 使用例
/// ```ignore
/// let subscriber = SubscriberBuilder::new()
///     .subscribe::<Chatter, _>("/chatter", |msg| println!("{}", msg.data))?
///     .expect_topics(&["/chatter"])
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - expect_topics() で期待される topic を登録
/// - build() 時に「期待集合 ⊆ 登録済み集合」をチェック
/// - 不足があれば BuildError を返す
pub struct SubscriberBuilder {
    registry: SubscriptionRegistry,
    expected_topics: Option<Vec<Topic>>,
}

/// BuildError は Subscriber 構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing topics: {0:?}. These topics were expected but have no subscription.")]
    MissingTopics(Vec<String>),
}

impl SubscriberBuilder {
    /// 新しい SubscriberBuilder を作成
    pub fn new() -> Self {
        Self {
            registry: SubscriptionRegistry::new(),
            expected_topics: None,
        }
    }

    /// callback を topic に登録（インスタンスは `M::default()` で作る）
    pub fn subscribe<M, F>(self, topic: impl Into<Topic>, callback: F) -> Result<Self, RegistryError>
    where
        M: Message + Default,
        F: Fn(Arc<M>) + Send + Sync + 'static,
    {
        self.subscribe_handler(topic, TypedSubscriptionHandler::<M>::new(callback))
    }

    /// 組み立て済みの handler を登録
    ///
    /// construction strategy を差し替えた handler を使いたいときはこちら。
    ///
    /// # Example
    /// ```ignore
    /// let mut handler = TypedSubscriptionHandler::<Pose>::new(on_pose);
    /// handler.set_create_fn(pool.create_fn());
    /// builder.subscribe_handler("/pose", handler)?;
    /// ```
    pub fn subscribe_handler<M: Message>(
        mut self,
        topic: impl Into<Topic>,
        handler: TypedSubscriptionHandler<M>,
    ) -> Result<Self, RegistryError> {
        self.registry.register(topic.into(), handler)?;
        Ok(self)
    }

    /// 期待される topic のリストを設定
    pub fn expect_topics(mut self, topics: &[&str]) -> Self {
        self.expected_topics = Some(topics.iter().map(|&t| Topic::new(t)).collect());
        self
    }

    /// Subscriber を生成
    ///
    /// # 検証
    /// - expect_topics() で設定された topic が全て登録されているかチェック
    /// - 不足があれば BuildError::MissingTopics を返す
    pub fn build(self) -> Result<Subscriber, BuildError> {
        if let Some(expected_topics) = &self.expected_topics {
            let missing_topics: Vec<String> = expected_topics
                .iter()
                .filter(|topic| self.registry.get(topic).is_none())
                .map(|topic| topic.to_string())
                .collect();
            if !missing_topics.is_empty() {
                return Err(BuildError::MissingTopics(missing_topics));
            }
        }
        Ok(Subscriber {
            dispatcher: Arc::new(Dispatcher::new(Arc::new(self.registry))),
        })
    }
}

impl Default for SubscriberBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Subscriber は構築済みの subscription 群
///
/// 同期的に 1 件ずつ配るなら `deliver`、
/// InboundSource から流し続けるなら `spawn_delivery` を使います。
pub struct Subscriber {
    dispatcher: Arc<Dispatcher>,
}

impl Subscriber {
    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        Arc::clone(&self.dispatcher)
    }

    pub fn topics(&self) -> Vec<Topic> {
        self.dispatcher.registry().topics()
    }

    pub fn deliver(&self, msg: &InboundMessage) -> Result<usize, CourierError> {
        self.dispatcher.deliver(msg)
    }

    /// worker を起動して `source` から配送し続ける
    pub fn spawn_delivery(
        &self,
        config: DeliveryConfig,
        source: Arc<dyn InboundSource>,
    ) -> DeliveryGroup {
        DeliveryGroup::spawn(config, source, self.dispatcher())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::MessageId;
    use crate::typed::fixtures::{Point, Reading, Text};
    use crate::typed::{MessageCodec, WireCodec, prototype_create_fn};
    use chrono::Utc;
    use std::sync::Mutex;
    use ulid::Ulid;

    #[test]
    fn test_build_success() {
        let subscriber = SubscriberBuilder::new()
            .subscribe::<Text, _>("/chatter", |_| {})
            .unwrap()
            .expect_topics(&["/chatter"])
            .build();
        assert!(subscriber.is_ok());
    }

    #[test]
    fn test_build_missing_topics() {
        let subscriber = SubscriberBuilder::new()
            .subscribe::<Text, _>("/chatter", |_| {})
            .unwrap()
            .expect_topics(&["/chatter", "/pose"])
            .build();
        assert!(matches!(
            subscriber,
            Err(BuildError::MissingTopics(missing)) if missing == vec!["/pose".to_string()]
        ));
    }

    #[test]
    fn test_build_no_expect_topics() {
        let subscriber = SubscriberBuilder::new()
            .subscribe::<Point, _>("/pose", |_| {})
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(subscriber.topics(), vec![Topic::new("/pose")]);
    }

    #[test]
    fn test_type_mismatch_surfaces_at_registration() {
        let result = SubscriberBuilder::new()
            .subscribe::<Point, _>("/pose", |_| {})
            .unwrap()
            .subscribe::<Text, _>("/pose", |_| {});
        assert!(matches!(result, Err(RegistryError::TypeMismatch { .. })));
    }

    #[test]
    fn test_subscribe_handler_keeps_its_create_fn() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut handler = TypedSubscriptionHandler::<Reading>::new(move |r: Arc<Reading>| {
            sink.lock().unwrap().push(r.source.clone());
        });
        handler.set_create_fn(prototype_create_fn(Reading {
            source: "pool".to_string(),
            ..Reading::default()
        }));

        let subscriber = SubscriberBuilder::new()
            .subscribe_handler("/readings", handler)
            .unwrap()
            .build()
            .unwrap();

        let msg = InboundMessage::new(
            MessageId::from_ulid(Ulid::new()),
            Topic::new("/readings"),
            WireCodec::encode(&Reading::default()),
            None,
            Utc::now(),
        );
        assert_eq!(subscriber.deliver(&msg).unwrap(), 1);
        assert_eq!(*seen.lock().unwrap(), vec!["pool".to_string()]);
    }
}
