//! Typed - 型付きメッセージ API
//!
//! 配送経路は wire bytes と `MessagePtr`（型消去された共有参照）しか知りません。
//! このモジュールは、その手前で型を扱う部分を提供します。
//!
//! # 二層構造
//! - **表層（Typed）**: `Message` trait, `TypedSubscriptionHandler<M>` - 型安全
//! - **内部（Dyn）**: `SubscriptionHandler` trait - object-safe, type erasure

pub mod codec;
pub mod create;
pub mod handler;
pub mod message;
pub mod registry;
pub mod wire;

#[cfg(test)]
pub(crate) mod fixtures;

// 主要な trait/型 を再エクスポート
pub use self::codec::{MessageCodec, WireCodec, WireMessage};
pub use self::create::{CreateFn, default_create_fn, prototype_create_fn};
pub use self::handler::{
    Callback, DeserializeParams, MessagePtr, SubscriptionHandler, TypedSubscriptionHandler,
};
pub use self::message::{ConnectionHeaderSlot, HeaderPolicy, Message, NoHeader, WithHeader};
pub use self::registry::{RegistryError, Subscription, SubscriptionRegistry};
pub use self::wire::{IStream, OStream, WireField};
