use std::sync::Arc;

use serde::Serialize;
use tracing_subscriber::EnvFilter;

use courier_core::app::{DeliveryConfig, SubscriberBuilder};
use courier_core::domain::{DeserializationError, SharedHeader, shared_header};
use courier_core::impls::InMemoryInbound;
use courier_core::typed::{
    ConnectionHeaderSlot, IStream, Message, NoHeader, OStream, TypedSubscriptionHandler,
    WireCodec, WireMessage, WithHeader, prototype_create_fn,
};

/// 送信元の connection header を受け取る文字列メッセージ
#[derive(Debug, Default)]
struct Chatter {
    data: String,
    connection_header: Option<SharedHeader>,
}

impl WireMessage for Chatter {
    fn decode_fields(&mut self, s: &mut IStream<'_>) -> Result<(), DeserializationError> {
        self.data = s.read()?;
        Ok(())
    }

    fn encode_fields(&self, s: &mut OStream) {
        s.write(&self.data);
    }
}

impl ConnectionHeaderSlot for Chatter {
    fn set_connection_header(&mut self, header: Option<SharedHeader>) {
        self.connection_header = header;
    }

    fn connection_header(&self) -> Option<&SharedHeader> {
        self.connection_header.as_ref()
    }
}

impl Message for Chatter {
    const TYPE: &'static str = "std_msgs/String";
    type Codec = WireCodec;
    type Header = WithHeader;
}

/// 2D pose。`frame_id` は wire に載らず、construction strategy が埋める
#[derive(Debug, Clone, Default, Serialize)]
struct Pose2D {
    x: f64,
    y: f64,
    theta: f64,
    frame_id: String,
}

impl WireMessage for Pose2D {
    fn decode_fields(&mut self, s: &mut IStream<'_>) -> Result<(), DeserializationError> {
        self.x = s.read()?;
        self.y = s.read()?;
        self.theta = s.read()?;
        Ok(())
    }

    fn encode_fields(&self, s: &mut OStream) {
        s.write(&self.x);
        s.write(&self.y);
        s.write(&self.theta);
    }
}

impl Message for Pose2D {
    const TYPE: &'static str = "geometry_msgs/Pose2D";
    type Codec = WireCodec;
    type Header = NoHeader;
}

fn on_chatter(msg: Arc<Chatter>) {
    let caller = msg
        .connection_header()
        .and_then(|h| h.get("callerid"))
        .map(String::as_str)
        .unwrap_or("<unknown>");
    tracing::info!(caller, data = %msg.data, "heard chatter");
}

fn on_pose(msg: Arc<Pose2D>) {
    match serde_json::to_string(&*msg) {
        Ok(json) => tracing::info!(pose = %json, "received pose"),
        Err(e) => tracing::warn!(error = %e, "pose could not be rendered"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // (A) ログ（RUST_LOG で上書き可能）
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // (B) subscription を組み立てる（pose はプリセット値つきの construction strategy）
    let mut pose_handler = TypedSubscriptionHandler::<Pose2D>::new(on_pose);
    pose_handler.set_create_fn(prototype_create_fn(Pose2D {
        frame_id: "map".to_string(),
        ..Pose2D::default()
    }));

    let subscriber = SubscriberBuilder::new()
        .subscribe::<Chatter, _>("/chatter", on_chatter)?
        .subscribe_handler("/pose", pose_handler)?
        .expect_topics(&["/chatter", "/pose"])
        .build()?;

    // (C) transport の代わりに in-memory channel から配送する
    let (sender, inbound) = InMemoryInbound::channel(16);
    let group = subscriber.spawn_delivery(DeliveryConfig { workers: 2 }, Arc::new(inbound));

    let header = shared_header([("callerid", "/talker"), ("type", Chatter::TYPE)]);
    for i in 0..3 {
        let msg = Chatter {
            data: format!("hello {i}"),
            connection_header: None,
        };
        sender
            .publish_message("/chatter", &msg, Some(Arc::clone(&header)))
            .await?;
    }

    let pose = Pose2D {
        x: 1.0,
        y: 2.0,
        theta: 0.5,
        frame_id: String::new(),
    };
    sender.publish_message("/pose", &pose, None).await?;

    // 途中で切れた payload（1 件だけ失敗してログに出る）
    sender.publish("/pose", vec![0; 7], None).await?;

    // (D) sender を閉じると worker は残りを配り終えて止まる
    drop(sender);
    let stats = group.join().await;
    tracing::info!(
        delivered = stats.delivered(),
        failed = stats.failed(),
        "delivery finished"
    );
    Ok(())
}
