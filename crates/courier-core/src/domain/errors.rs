//! Errors - エラー型と分類
//!
//! - `DeserializationError`: codec が返すエラー。adapter はそのまま伝播する
//! - `CourierError`: 配送経路（dispatcher / delivery loop）のエラー

use std::string::FromUtf8Error;

use thiserror::Error;

use super::topic::Topic;

/// DeserializationError は wire bytes が壊れている・足りない・スキーマと合わない場合のエラー
///
/// # リトライ方針
/// このクレートはリトライしない。再配送するかどうかは配送経路側の判断。
#[derive(Debug, Error)]
pub enum DeserializationError {
    #[error("truncated payload: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    #[error("declared length {length} exceeds buffer of {buffer} bytes")]
    LengthExceedsBuffer { length: usize, buffer: usize },

    #[error("invalid utf-8 in string field: {0}")]
    InvalidUtf8(#[from] FromUtf8Error),

    #[error("invalid bool byte: {0:#04x}")]
    InvalidBool(u8),

    #[error("sequence length {0} does not fit in memory")]
    LengthOverflow(u32),
}

/// CourierError は配送経路のエラー
#[derive(Debug, Error)]
pub enum CourierError {
    #[error("no subscription for topic={0}")]
    SubscriptionNotFound(Topic),

    #[error("failed to deserialize {message_type} on topic={topic}: {source}")]
    Deserialization {
        topic: Topic,
        message_type: &'static str,
        #[source]
        source: DeserializationError,
    },

    #[error("inbound source failed: {0}")]
    Inbound(String),
}

impl CourierError {
    /// 壊れた payload が原因かどうか（他の subscription には影響しない種類のエラー）
    pub fn is_malformed_payload(&self) -> bool {
        matches!(self, CourierError::Deserialization { .. })
    }

    /// 失敗したメッセージ型名（deserialize 段階の失敗のときだけ分かる）
    pub fn message_type(&self) -> Option<&'static str> {
        match self {
            CourierError::Deserialization { message_type, .. } => Some(*message_type),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncated_message_names_both_counts() {
        let err = DeserializationError::Truncated {
            needed: 4,
            remaining: 1,
        };
        let msg = err.to_string();
        assert!(msg.contains("needed 4"));
        assert!(msg.contains("1 remaining"));
    }

    #[test]
    fn deserialization_error_is_exposed_as_source() {
        use std::error::Error;

        let err = CourierError::Deserialization {
            topic: Topic::new("/chatter"),
            message_type: "test_msgs/Text",
            source: DeserializationError::InvalidBool(7),
        };
        assert!(err.is_malformed_payload());
        assert_eq!(err.message_type(), Some("test_msgs/Text"));
        let source = err.source().expect("source is set");
        assert!(source.to_string().contains("0x07"));
    }

    #[test]
    fn missing_subscription_is_not_a_payload_error() {
        let err = CourierError::SubscriptionNotFound(Topic::new("/missing"));
        assert!(!err.is_malformed_payload());
        assert_eq!(err.message_type(), None);
        assert!(err.to_string().contains("/missing"));
    }
}
