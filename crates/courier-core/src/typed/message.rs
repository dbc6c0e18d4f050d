//! Message trait - 具体メッセージ型の定義と header capability
//!
//! # 学習ポイント
//! - Associated Constants (`const TYPE`)
//! - Associated Types で codec と header policy をコンパイル時に選ぶ
//! - 非居住型（`enum WithHeader {}`）を marker として使う
//!
//! # Header capability
//! メッセージ型によって、送信元の connection header を保持できるもの
//! （`ConnectionHeaderSlot` を実装するもの）とできないものがあります。
//! 共通の基底型や実行時フラグは使わず、`Message::Header` で
//! `WithHeader` / `NoHeader` のどちらかを選びます。
//! 単相化の結果、`NoHeader` の型では代入コード自体が存在しません。

use super::codec::MessageCodec;
use crate::domain::header::SharedHeader;

/// Message は topic 上を流れる具体メッセージ型
///
/// # 使用例
/// ```ignore
/// #[derive(Default)]
/// struct Chatter {
///     data: String,
///     connection_header: Option<SharedHeader>,
/// }
///
/// impl Message for Chatter {
///     const TYPE: &'static str = "std_msgs/String";
///     type Codec = WireCodec;
///     type Header = WithHeader;
/// }
/// ```
///
/// `type Header = WithHeader` は `ConnectionHeaderSlot` を実装していない型では
/// コンパイルできません。
///
/// ```compile_fail
/// use courier_core::domain::DeserializationError;
/// use courier_core::typed::{IStream, Message, OStream, WireCodec, WireMessage, WithHeader};
///
/// #[derive(Default)]
/// struct NoSlot;
///
/// impl WireMessage for NoSlot {
///     fn decode_fields(&mut self, _: &mut IStream<'_>) -> Result<(), DeserializationError> {
///         Ok(())
///     }
///     fn encode_fields(&self, _: &mut OStream) {}
/// }
///
/// impl Message for NoSlot {
///     const TYPE: &'static str = "test/NoSlot";
///     type Codec = WireCodec;
///     type Header = WithHeader;
/// }
/// ```
pub trait Message: Sized + Send + Sync + 'static {
    /// メッセージ型の名前
    ///
    /// # 命名規約
    /// - `{package}/{Name}`
    /// - 例: `std_msgs/String`, `geometry_msgs/Point`
    const TYPE: &'static str;

    /// wire bytes を読む codec
    type Codec: MessageCodec<Self>;

    /// connection header を付けるかどうか（`WithHeader` / `NoHeader`）
    type Header: HeaderPolicy<Self>;
}

/// ConnectionHeaderSlot は connection header を保持できるメッセージ
pub trait ConnectionHeaderSlot {
    fn set_connection_header(&mut self, header: Option<SharedHeader>);
    fn connection_header(&self) -> Option<&SharedHeader>;
}

/// HeaderPolicy は deserialize 直後に header をどう扱うかを決める
pub trait HeaderPolicy<M> {
    fn assign(msg: &mut M, header: Option<&SharedHeader>);
}

/// header slot に受信した header を代入する（無ければ `None` にする）
#[derive(Debug)]
pub enum WithHeader {}

/// header を無視する
#[derive(Debug)]
pub enum NoHeader {}

impl<M: ConnectionHeaderSlot> HeaderPolicy<M> for WithHeader {
    #[inline]
    fn assign(msg: &mut M, header: Option<&SharedHeader>) {
        msg.set_connection_header(header.cloned());
    }
}

impl<M> HeaderPolicy<M> for NoHeader {
    #[inline(always)]
    fn assign(_msg: &mut M, _header: Option<&SharedHeader>) {}
}
