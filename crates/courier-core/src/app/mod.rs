//! App - アプリケーション層（配送経路）
//!
//! typed の handler と ports を組み合わせて、生メッセージを callback まで届けます。
//!
//! # 主要コンポーネント
//! - **SubscriberBuilder**: subscription の構築と起動時検証
//! - **Dispatcher**: topic → subscription の解決と deserialize / call
//! - **DeliveryGroup**: InboundSource から配送し続ける worker 群

pub mod builder;
pub mod delivery_loop;
pub mod dispatcher;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, Subscriber, SubscriberBuilder};
pub use self::delivery_loop::{DeliveryConfig, DeliveryGroup, DeliveryStats};
pub use self::dispatcher::Dispatcher;
