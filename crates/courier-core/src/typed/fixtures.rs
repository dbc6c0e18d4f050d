//! テスト用のメッセージ型

use super::codec::{WireCodec, WireMessage};
use super::message::{ConnectionHeaderSlot, Message, NoHeader, WithHeader};
use super::wire::{IStream, OStream};
use crate::domain::errors::DeserializationError;
use crate::domain::header::SharedHeader;

/// header slot を持つ文字列メッセージ
#[derive(Debug, Clone, Default)]
pub struct Text {
    pub data: String,
    pub connection_header: Option<SharedHeader>,
}

impl WireMessage for Text {
    fn decode_fields(&mut self, s: &mut IStream<'_>) -> Result<(), DeserializationError> {
        self.data = s.read()?;
        Ok(())
    }

    fn encode_fields(&self, s: &mut OStream) {
        s.write(&self.data);
    }
}

impl ConnectionHeaderSlot for Text {
    fn set_connection_header(&mut self, header: Option<SharedHeader>) {
        self.connection_header = header;
    }

    fn connection_header(&self) -> Option<&SharedHeader> {
        self.connection_header.as_ref()
    }
}

impl Message for Text {
    const TYPE: &'static str = "test_msgs/Text";
    type Codec = WireCodec;
    type Header = WithHeader;
}

/// header slot を持たないメッセージ
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl WireMessage for Point {
    fn decode_fields(&mut self, s: &mut IStream<'_>) -> Result<(), DeserializationError> {
        self.x = s.read()?;
        self.y = s.read()?;
        self.z = s.read()?;
        Ok(())
    }

    fn encode_fields(&self, s: &mut OStream) {
        s.write(&self.x);
        s.write(&self.y);
        s.write(&self.z);
    }
}

impl Message for Point {
    const TYPE: &'static str = "test_msgs/Point";
    type Codec = WireCodec;
    type Header = NoHeader;
}

/// `source` は wire に載らない（construction strategy が入れる値）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reading {
    pub sensor: String,
    pub values: Vec<i32>,
    pub valid: bool,
    pub source: String,
}

impl WireMessage for Reading {
    fn decode_fields(&mut self, s: &mut IStream<'_>) -> Result<(), DeserializationError> {
        self.sensor = s.read()?;
        self.values = s.read()?;
        self.valid = s.read()?;
        Ok(())
    }

    fn encode_fields(&self, s: &mut OStream) {
        s.write(&self.sensor);
        s.write(&self.values);
        s.write(&self.valid);
    }
}

impl Message for Reading {
    const TYPE: &'static str = "test_msgs/Reading";
    type Codec = WireCodec;
    type Header = NoHeader;
}
