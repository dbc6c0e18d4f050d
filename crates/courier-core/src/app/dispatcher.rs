//! Dispatcher - 受信メッセージを topic の subscription に配る

use std::sync::Arc;

use crate::domain::errors::CourierError;
use crate::domain::inbound::InboundMessage;
use crate::typed::{DeserializeParams, SubscriptionRegistry};

/// Dispatcher は `InboundMessage` を topic の subscription に配る
///
/// 1 件につき deserialize は 1 回だけ。できた `MessagePtr` を
/// subscription 内の全 handler が共有します。
pub struct Dispatcher {
    registry: Arc<SubscriptionRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<SubscriptionRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &SubscriptionRegistry {
        &self.registry
    }

    /// 1 件配送して、呼んだ callback の数を返す
    ///
    /// payload が壊れていれば callback は 1 つも呼ばれず、
    /// `CourierError::Deserialization` が返ります。
    pub fn deliver(&self, msg: &InboundMessage) -> Result<usize, CourierError> {
        let subscription = self
            .registry
            .get(&msg.topic)
            .ok_or_else(|| CourierError::SubscriptionNotFound(msg.topic.clone()))?;

        let Some(first) = subscription.handlers().first() else {
            return Ok(0);
        };

        let params = DeserializeParams::new(&msg.payload)
            .with_connection_header(msg.connection_header.as_ref());
        let ptr = first
            .deserialize(&params)
            .map_err(|source| CourierError::Deserialization {
                topic: msg.topic.clone(),
                message_type: subscription.message_type(),
                source,
            })?;

        for handler in subscription.handlers() {
            handler.call(&ptr);
        }

        tracing::debug!(
            message_id = %msg.id,
            topic = %msg.topic,
            message_type = subscription.message_type(),
            callbacks = subscription.len(),
            "delivered"
        );
        Ok(subscription.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::header::shared_header;
    use crate::domain::ids::MessageId;
    use crate::domain::topic::Topic;
    use crate::typed::fixtures::{Point, Text};
    use crate::typed::{
        ConnectionHeaderSlot, Message, MessageCodec, TypedSubscriptionHandler, WireCodec,
    };
    use chrono::Utc;
    use std::sync::Mutex;
    use ulid::Ulid;

    fn inbound(topic: &str, payload: Vec<u8>) -> InboundMessage {
        InboundMessage::new(
            MessageId::from_ulid(Ulid::new()),
            Topic::new(topic),
            payload,
            None,
            Utc::now(),
        )
    }

    #[test]
    fn deliver_calls_every_handler_with_the_same_object() {
        let seen: Arc<Mutex<Vec<Arc<Point>>>> = Arc::new(Mutex::new(Vec::new()));
        let mut registry = SubscriptionRegistry::new();
        for _ in 0..2 {
            let sink = Arc::clone(&seen);
            registry
                .register(
                    Topic::new("/pose"),
                    TypedSubscriptionHandler::<Point>::new(move |p| sink.lock().unwrap().push(p)),
                )
                .unwrap();
        }
        let dispatcher = Dispatcher::new(Arc::new(registry));

        let point = Point { x: 1.0, y: 2.0, z: 3.0 };
        let called = dispatcher
            .deliver(&inbound("/pose", WireCodec::encode(&point)))
            .unwrap();

        assert_eq!(called, 2);
        let seen = seen.lock().unwrap();
        assert_eq!(*seen[0], point);
        assert!(Arc::ptr_eq(&seen[0], &seen[1]));
    }

    #[test]
    fn deliver_attaches_connection_header() {
        let seen: Arc<Mutex<Option<Arc<Text>>>> = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let mut registry = SubscriptionRegistry::new();
        registry
            .register(
                Topic::new("/chatter"),
                TypedSubscriptionHandler::<Text>::new(move |t| *sink.lock().unwrap() = Some(t)),
            )
            .unwrap();
        let dispatcher = Dispatcher::new(Arc::new(registry));

        let header = shared_header([("callerid", "/talker")]);
        let mut msg = inbound(
            "/chatter",
            WireCodec::encode(&Text {
                data: "hi".to_string(),
                connection_header: None,
            }),
        );
        msg.connection_header = Some(Arc::clone(&header));
        dispatcher.deliver(&msg).unwrap();

        let text = seen.lock().unwrap().clone().unwrap();
        assert_eq!(text.data, "hi");
        assert!(Arc::ptr_eq(text.connection_header().unwrap(), &header));
    }

    #[test]
    fn unknown_topic_is_reported() {
        let dispatcher = Dispatcher::new(Arc::new(SubscriptionRegistry::new()));

        let err = dispatcher.deliver(&inbound("/nobody", vec![])).unwrap_err();

        assert!(matches!(err, CourierError::SubscriptionNotFound(t) if t.as_str() == "/nobody"));
    }

    #[test]
    fn malformed_payload_fails_only_that_topic() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut registry = SubscriptionRegistry::new();
        let sink = Arc::clone(&calls);
        registry
            .register(
                Topic::new("/pose"),
                TypedSubscriptionHandler::<Point>::new(move |_| sink.lock().unwrap().push("pose")),
            )
            .unwrap();
        let sink = Arc::clone(&calls);
        registry
            .register(
                Topic::new("/chatter"),
                TypedSubscriptionHandler::<Text>::new(move |_| sink.lock().unwrap().push("chatter")),
            )
            .unwrap();
        let dispatcher = Dispatcher::new(Arc::new(registry));

        let err = dispatcher.deliver(&inbound("/pose", vec![0; 5])).unwrap_err();
        assert!(err.is_malformed_payload());
        assert!(matches!(
            err,
            CourierError::Deserialization { message_type, .. } if message_type == Point::TYPE
        ));

        let ok = dispatcher.deliver(&inbound(
            "/chatter",
            WireCodec::encode(&Text::default()),
        ));
        assert_eq!(ok.unwrap(), 1);
        assert_eq!(*calls.lock().unwrap(), vec!["chatter"]);
    }
}
