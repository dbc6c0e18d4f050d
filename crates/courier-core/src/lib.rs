//! courier-core
//!
//! Typed subscription handling for a publish/subscribe runtime.
//!
//! 配送経路は wire bytes と型消去されたメッセージ（`MessagePtr`）しか扱いません。
//! 具体的なメッセージ型への deserialize と callback 呼び出しは、
//! 型ごとに単相化された `TypedSubscriptionHandler<M>` が担当します。
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, topic, connection header, inbound message, errors）
//! - **ports**: 抽象化レイヤー（InboundSource, Clock, IdGenerator）
//! - **typed**: 型付きメッセージ API（Message, SubscriptionHandler, codec, registry）
//! - **impls**: 実装（InMemoryInbound など開発用）
//! - **app**: 配送経路（SubscriberBuilder, Dispatcher, DeliveryGroup）

pub mod app;
pub mod domain;
pub mod impls;
pub mod ports;
pub mod typed;
