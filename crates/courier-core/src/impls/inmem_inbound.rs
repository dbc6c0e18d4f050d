//! InMemoryInbound - 開発用の inbound source
//!
//! # 学習ポイント
//! - tokio の bounded mpsc による backpressure
//! - 複数 worker で 1 つの Receiver を共有する（tokio::sync::Mutex）
//! - 送信側で ID と受信時刻を付ける（IdGenerator / Clock）

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};

use crate::domain::errors::CourierError;
use crate::domain::header::SharedHeader;
use crate::domain::ids::MessageId;
use crate::domain::inbound::InboundMessage;
use crate::domain::topic::Topic;
use crate::ports::{Clock, IdGenerator, InboundSource, SystemClock, UlidGenerator};
use crate::typed::{Message, MessageCodec};

/// InMemoryInbound は mpsc の受信側を InboundSource として見せる
///
/// # 使用例
/// ```ignore
/// let (sender, inbound) = InMemoryInbound::channel(64);
/// sender.publish("/chatter", bytes, None).await?;
/// let msg = inbound.recv().await;
/// ```
pub struct InMemoryInbound {
    receiver: Mutex<mpsc::Receiver<InboundMessage>>,
}

impl InMemoryInbound {
    /// SystemClock + UlidGenerator で channel を作る
    pub fn channel(capacity: usize) -> (InboundSender, InMemoryInbound) {
        Self::channel_with(
            capacity,
            Arc::new(UlidGenerator::new(SystemClock)),
            Arc::new(SystemClock),
        )
    }

    /// ID 生成器と Clock を指定して channel を作る
    pub fn channel_with(
        capacity: usize,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
    ) -> (InboundSender, InMemoryInbound) {
        let (tx, rx) = mpsc::channel(capacity);
        let sender = InboundSender { tx, ids, clock };
        let inbound = InMemoryInbound {
            receiver: Mutex::new(rx),
        };
        (sender, inbound)
    }
}

#[async_trait]
impl InboundSource for InMemoryInbound {
    async fn recv(&self) -> Option<InboundMessage> {
        // lock と recv はどちらもキャンセル安全
        self.receiver.lock().await.recv().await
    }
}

/// InboundSender は transport の代わりに生メッセージを投入する
///
/// 全ての sender が drop されると、InMemoryInbound の `recv` は `None` を返します。
#[derive(Clone)]
pub struct InboundSender {
    tx: mpsc::Sender<InboundMessage>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl InboundSender {
    /// wire bytes をそのまま投入
    ///
    /// channel が満杯なら空くまで待ちます。
    pub async fn publish(
        &self,
        topic: impl Into<Topic>,
        payload: Vec<u8>,
        connection_header: Option<SharedHeader>,
    ) -> Result<MessageId, CourierError> {
        let id = self.ids.generate_message_id();
        let msg = InboundMessage::new(
            id,
            topic.into(),
            payload,
            connection_header,
            self.clock.now(),
        );
        self.tx
            .send(msg)
            .await
            .map_err(|_| CourierError::Inbound("inbound receiver dropped".to_string()))?;
        Ok(id)
    }

    /// `M` の codec で encode してから投入
    pub async fn publish_message<M: Message>(
        &self,
        topic: impl Into<Topic>,
        msg: &M,
        connection_header: Option<SharedHeader>,
    ) -> Result<MessageId, CourierError> {
        let payload = <M::Codec as MessageCodec<M>>::encode(msg);
        self.publish(topic, payload, connection_header).await
    }
}
