//! SubscriptionHandler - 配送経路と型付き callback の橋渡し
//!
//! # 学習ポイント
//! - Object-safe trait (`SubscriptionHandler`)
//! - Type erasure パターン (`TypedSubscriptionHandler<M>` → `dyn SubscriptionHandler`)
//! - `Arc<dyn Any + Send + Sync>` による型消去された共有所有権
//!
//! # 二段階の呼び出し
//! 1. `deserialize`: wire bytes から `M` を作り、`MessagePtr` として返す
//! 2. `call`: `MessagePtr` を `Arc<M>` に戻して callback を呼ぶ
//!
//! 配送経路は `M` を知りません。`deserialize` と `call` の間、
//! メッセージは `MessagePtr` のまま保持・共有されます。

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use super::codec::MessageCodec;
use super::create::{CreateFn, default_create_fn};
use super::message::{HeaderPolicy, Message};
use crate::domain::errors::DeserializationError;
use crate::domain::header::SharedHeader;

/// 型消去されたメッセージへの共有参照
pub type MessagePtr = Arc<dyn Any + Send + Sync>;

/// 型付き callback
pub type Callback<M> = Arc<dyn Fn(Arc<M>) + Send + Sync>;

/// `deserialize` の入力
///
/// バッファは借用なので、handler が `deserialize` の後まで保持することはできません。
#[derive(Debug, Clone, Copy)]
pub struct DeserializeParams<'a> {
    buffer: &'a [u8],
    length: usize,
    connection_header: Option<&'a SharedHeader>,
}

impl<'a> DeserializeParams<'a> {
    /// バッファ全体を payload とする
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            length: buffer.len(),
            connection_header: None,
        }
    }

    /// 先頭 `length` バイトだけを payload とする
    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    pub fn with_connection_header(mut self, header: Option<&'a SharedHeader>) -> Self {
        self.connection_header = header;
        self
    }

    /// codec に渡す範囲
    pub fn payload(&self) -> Result<&'a [u8], DeserializationError> {
        self.buffer
            .get(..self.length)
            .ok_or(DeserializationError::LengthExceedsBuffer {
                length: self.length,
                buffer: self.buffer.len(),
            })
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn connection_header(&self) -> Option<&'a SharedHeader> {
        self.connection_header
    }
}

/// SubscriptionHandler は配送経路が依存する唯一の抽象
///
/// # Object Safety
/// - メソッドはジェネリックではない
/// - `Arc<dyn SubscriptionHandler>` として異なるメッセージ型の handler を同じコレクションに置ける
///
/// # 前提条件（`call`）
/// `call` に渡す `MessagePtr` は、同じメッセージ型に束縛された handler の
/// `deserialize` が返したもの（または同じ型で外から作ったもの）でなければなりません。
/// これは呼び出し側の責任です。`SubscriptionRegistry` は topic ごとに型を固定することで
/// これを構造的に保証します。
///
/// # Concurrency
/// 両メソッドとも同期で、内部でロックを取りません。
/// 同じ handler への `deserialize` の同時呼び出しは安全で、それぞれ独立したオブジェクトを返します。
pub trait SubscriptionHandler: Send + Sync {
    /// wire bytes から新しいメッセージを作る
    ///
    /// codec のエラーはそのまま返します（ラップ・握りつぶし・ログはしない）。
    fn deserialize(
        &self,
        params: &DeserializeParams<'_>,
    ) -> Result<MessagePtr, DeserializationError>;

    /// callback を同期的に呼ぶ
    ///
    /// callback には `msg` と同じオブジェクトへの共有参照が渡されます。
    /// 呼び出し側は `call` の後も `msg` を持ち続けられます。
    ///
    /// # Panics
    /// `msg` がこの handler の型を保持していない場合（前提条件違反）。
    /// callback 内の panic もそのまま呼び出し側へ伝わります。
    fn call(&self, msg: &MessagePtr);
}

/// TypedSubscriptionHandler は `M` に束縛された `SubscriptionHandler` の実装
///
/// # 使用例
/// ```ignore
/// let handler = TypedSubscriptionHandler::<Chatter>::new(|msg| {
///     println!("heard: {}", msg.data);
/// });
///
/// let ptr = handler.deserialize(&DeserializeParams::new(&bytes))?;
/// handler.call(&ptr);
/// ```
pub struct TypedSubscriptionHandler<M: Message> {
    callback: Callback<M>,
    create: CreateFn<M>,
}

impl<M: Message> TypedSubscriptionHandler<M> {
    /// `M::default()` でインスタンスを作る handler
    pub fn new<F>(callback: F) -> Self
    where
        M: Default,
        F: Fn(Arc<M>) + Send + Sync + 'static,
    {
        Self::with_create_fn(callback, default_create_fn::<M>())
    }

    /// construction strategy を指定して作る
    pub fn with_create_fn<F>(callback: F, create: CreateFn<M>) -> Self
    where
        F: Fn(Arc<M>) + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(callback),
            create,
        }
    }

    /// construction strategy を差し替える
    ///
    /// 以降の `deserialize` から新しい strategy が使われます。
    /// `&mut self` なので、同じ handler への `deserialize` / `call` と並行しては呼べません。
    pub fn set_create_fn(&mut self, create: CreateFn<M>) {
        self.create = create;
    }

    pub fn message_type(&self) -> &'static str {
        M::TYPE
    }
}

impl<M: Message> SubscriptionHandler for TypedSubscriptionHandler<M> {
    fn deserialize(
        &self,
        params: &DeserializeParams<'_>,
    ) -> Result<MessagePtr, DeserializationError> {
        let mut msg = (self.create)();

        <M::Codec as MessageCodec<M>>::decode_into(params.payload()?, &mut msg)?;
        <M::Header as HeaderPolicy<M>>::assign(&mut msg, params.connection_header());

        let msg: MessagePtr = Arc::new(msg);
        Ok(msg)
    }

    fn call(&self, msg: &MessagePtr) {
        let Ok(typed) = Arc::clone(msg).downcast::<M>() else {
            panic!(
                "MessagePtr handed to the {} handler holds a different message type",
                M::TYPE
            );
        };
        (self.callback)(typed);
    }
}

impl<M: Message> fmt::Debug for TypedSubscriptionHandler<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedSubscriptionHandler")
            .field("message_type", &M::TYPE)
            .finish_non_exhaustive()
    }
}
