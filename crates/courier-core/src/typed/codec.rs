//! MessageCodec - wire bytes と具体メッセージ型の相互変換
//!
//! adapter から見ると codec はブラックボックスです（bytes → object）。
//! どの codec を使うかはメッセージ型が `Message::Codec` で選びます。
//!
//! Codec は marker struct + static method で実装します。
//! trait object を経由しないので、型ごとにコンパイル時に決まります。

use super::wire::{IStream, OStream};
use crate::domain::errors::DeserializationError;

/// MessageCodec は `M` を wire bytes から埋める / wire bytes に書く
pub trait MessageCodec<M> {
    /// 既存のインスタンス `msg` に `bytes` の内容を書き込む
    ///
    /// wire に載っていないフィールドは触らない。エラー時の `msg` の中身は未規定。
    fn decode_into(bytes: &[u8], msg: &mut M) -> Result<(), DeserializationError>;

    fn encode(msg: &M) -> Vec<u8>;
}

/// WireMessage はフィールドを wire format の順序で読み書きするメッセージ
///
/// # 使用例
/// ```
/// use courier_core::typed::{IStream, OStream, WireMessage};
/// use courier_core::domain::DeserializationError;
///
/// #[derive(Default)]
/// struct Temperature {
///     celsius: f64,
///     sensor: String,
/// }
///
/// impl WireMessage for Temperature {
///     fn decode_fields(&mut self, s: &mut IStream<'_>) -> Result<(), DeserializationError> {
///         self.celsius = s.read()?;
///         self.sensor = s.read()?;
///         Ok(())
///     }
///
///     fn encode_fields(&self, s: &mut OStream) {
///         s.write(&self.celsius);
///         s.write(&self.sensor);
///     }
/// }
/// ```
pub trait WireMessage {
    fn decode_fields(&mut self, stream: &mut IStream<'_>) -> Result<(), DeserializationError>;
    fn encode_fields(&self, stream: &mut OStream);
}

/// WireCodec は `WireMessage` 用の codec
pub struct WireCodec;

impl<M: WireMessage> MessageCodec<M> for WireCodec {
    fn decode_into(bytes: &[u8], msg: &mut M) -> Result<(), DeserializationError> {
        let mut stream = IStream::new(bytes);
        msg.decode_fields(&mut stream)
    }

    fn encode(msg: &M) -> Vec<u8> {
        let mut stream = OStream::new();
        msg.encode_fields(&mut stream);
        stream.into_bytes()
    }
}
