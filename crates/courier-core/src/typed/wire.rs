//! Wire streams - little-endian のバイナリ wire format
//!
//! # フォーマット
//! - 固定長プリミティブ: little-endian
//! - bool: 1 byte（0 / 1 以外はエラー）
//! - String: `u32` 長さ + UTF-8 bytes
//! - Vec<T>: `u32` 要素数 + 要素を順に
//!
//! 最後のフィールドの後ろに余ったバイトは無視します。

use crate::domain::errors::DeserializationError;

/// IStream は借用したバッファを先頭から読む
///
/// バッファは借用なので、読み終わったあとに参照が残ることはありません。
#[derive(Debug)]
pub struct IStream<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> IStream<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// まだ読んでいないバイト数
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// 1 フィールド読む
    pub fn read<T: WireField>(&mut self) -> Result<T, DeserializationError> {
        T::read(self)
    }

    /// `n` バイト進めて、その範囲を返す
    pub fn advance(&mut self, n: usize) -> Result<&'a [u8], DeserializationError> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(DeserializationError::Truncated {
                needed: n,
                remaining,
            });
        }
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    /// `u32` の長さ prefix を読む
    pub fn read_len(&mut self) -> Result<usize, DeserializationError> {
        let len: u32 = self.read()?;
        usize::try_from(len).map_err(|_| DeserializationError::LengthOverflow(len))
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DeserializationError> {
        let bytes = self.advance(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }
}

/// OStream は wire bytes を組み立てる
#[derive(Debug, Default)]
pub struct OStream {
    buf: Vec<u8>,
}

impl OStream {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn write<T: WireField>(&mut self, value: &T) {
        value.write(self);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// `u32` の長さ prefix を書く
    ///
    /// # Panics
    /// `len` が `u32::MAX` を超える場合（wire format で表現できない）
    pub fn write_len(&mut self, len: usize) {
        assert!(
            len <= u32::MAX as usize,
            "length {len} does not fit the u32 length prefix"
        );
        self.write(&(len as u32));
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// WireField は wire format で読み書きできる 1 フィールド分の型
pub trait WireField: Sized {
    fn read(stream: &mut IStream<'_>) -> Result<Self, DeserializationError>;
    fn write(&self, stream: &mut OStream);
}

macro_rules! impl_wire_primitive {
    ($($t:ty),* $(,)?) => {
        $(
            impl WireField for $t {
                fn read(stream: &mut IStream<'_>) -> Result<Self, DeserializationError> {
                    Ok(<$t>::from_le_bytes(stream.read_array()?))
                }

                fn write(&self, stream: &mut OStream) {
                    stream.write_bytes(&self.to_le_bytes());
                }
            }
        )*
    };
}

impl_wire_primitive!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

impl WireField for bool {
    fn read(stream: &mut IStream<'_>) -> Result<Self, DeserializationError> {
        match stream.read::<u8>()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(DeserializationError::InvalidBool(other)),
        }
    }

    fn write(&self, stream: &mut OStream) {
        stream.write(&u8::from(*self));
    }
}

impl WireField for String {
    fn read(stream: &mut IStream<'_>) -> Result<Self, DeserializationError> {
        let len = stream.read_len()?;
        let bytes = stream.advance(len)?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    fn write(&self, stream: &mut OStream) {
        stream.write_len(self.len());
        stream.write_bytes(self.as_bytes());
    }
}

impl<T: WireField> WireField for Vec<T> {
    fn read(stream: &mut IStream<'_>) -> Result<Self, DeserializationError> {
        let len = stream.read_len()?;
        // 要素は最低 1 byte なので、残りバイト数を超える capacity は確保しない
        let mut out = Vec::with_capacity(len.min(stream.remaining()));
        for _ in 0..len {
            out.push(stream.read()?);
        }
        Ok(out)
    }

    fn write(&self, stream: &mut OStream) {
        stream.write_len(self.len());
        for item in self {
            stream.write(item);
        }
    }
}
