//! InboundMessage - transport から届いた、型が決まる前の生メッセージ

use chrono::{DateTime, Utc};

use super::header::SharedHeader;
use super::ids::MessageId;
use super::topic::Topic;

/// transport から届いた 1 件分の生メッセージ（型はまだ分からない）
///
/// payload は wire bytes のまま。どの型で読むかは topic の subscription が決める。
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub id: MessageId,
    pub topic: Topic,
    pub payload: Vec<u8>,
    pub connection_header: Option<SharedHeader>,
    pub received_at: DateTime<Utc>,
}

impl InboundMessage {
    pub fn new(
        id: MessageId,
        topic: Topic,
        payload: Vec<u8>,
        connection_header: Option<SharedHeader>,
        received_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            topic,
            payload,
            connection_header,
            received_at,
        }
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}
