//! Ports - 抽象化レイヤー
//!
//! 外部（transport, 時刻, ID 生成）へのインターフェースを trait として定義します。

pub mod clock;
pub mod id_generator;
pub mod inbound;

// 主要な trait を再エクスポート
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::inbound::InboundSource;
