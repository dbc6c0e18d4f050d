//! InboundSource port - transport から届く生メッセージの受け口
//!
//! transport の実装（TCP, shared memory など）はこのクレートの外。
//! 開発・テスト用には `impls::InMemoryInbound` を使います。

use async_trait::async_trait;

use crate::domain::inbound::InboundMessage;

/// InboundSource は受信した生メッセージを 1 件ずつ返す
///
/// # 設計原則
/// - payload は wire bytes のまま（型はまだ決まっていない）
/// - `None` は source が閉じたことを表す（以降も `None`）
/// - `recv` はキャンセル安全であること（delivery loop が shutdown と select する）
#[async_trait]
pub trait InboundSource: Send + Sync {
    async fn recv(&self) -> Option<InboundMessage>;
}
