//! Impls - 実装（開発用・テスト用）
//!
//! # 含まれる実装
//! - **InMemoryInbound**: tokio mpsc を使った inbound source
//!
//! 本番用の transport は別クレートに置きます。

pub mod inmem_inbound;

// 主要な型を再エクスポート
pub use self::inmem_inbound::{InMemoryInbound, InboundSender};
