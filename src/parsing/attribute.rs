//! Attribute tables.
//!
//! Only `Signature` and `Exceptions` are materialized. Every other
//! attribute is consumed by its declared length and dropped — unknown
//! names never fail, which is the forward-compatibility rule the format
//! itself specifies.

use std::io::Read;

use itertools::Itertools;

use crate::errors::{DecodeError, ReadContext};

use super::constant_pool::ConstantPool;
use super::reader_utils::{ValueReader, read_byte_chunk};

/// A raw `attribute_info`: the name index and the undecoded payload.
#[derive(Debug)]
pub(crate) struct AttributeInfo {
    name_index: u16,
    info: Vec<u8>,
}

impl AttributeInfo {
    pub(crate) fn parse<R>(reader: &mut R) -> Result<Self, DecodeError>
    where
        R: Read + ?Sized,
    {
        let name_index = reader.read_value().context("an attribute name index")?;
        let length: u32 = reader.read_value().context("an attribute length")?;
        let info = read_byte_chunk(reader, length as usize).context("an attribute payload")?;
        Ok(Self { name_index, info })
    }

    pub(crate) fn parse_table<R>(reader: &mut R) -> Result<Vec<Self>, DecodeError>
    where
        R: Read + ?Sized,
    {
        let count: u16 = reader.read_value().context("an attribute count")?;
        (0..count).map(|_| Self::parse(reader)).try_collect()
    }
}

/// An attribute the decoder understands. Everything else lands in
/// `Skipped`.
#[derive(Debug, PartialEq)]
pub(crate) enum Attribute {
    Signature(String),
    Exceptions(Vec<String>),
    Skipped,
}

impl Attribute {
    pub(crate) fn decode(raw: &AttributeInfo, pool: &ConstantPool) -> Result<Self, DecodeError> {
        let name = pool.utf8(raw.name_index)?;
        let reader = &mut raw.info.as_slice();
        match name {
            "Signature" => {
                let signature_index = reader.read_value().context("a Signature attribute")?;
                pool.utf8(signature_index)
                    .map(|text| Self::Signature(text.to_owned()))
            }
            "Exceptions" => {
                let count: u16 = reader.read_value().context("an Exceptions attribute")?;
                (0..count)
                    .map(|_| {
                        let class_index: u16 =
                            reader.read_value().context("an Exceptions attribute")?;
                        pool.class_name(class_index).map(str::to_owned)
                    })
                    .try_collect()
                    .map(Self::Exceptions)
            }
            _ => Ok(Self::Skipped),
        }
    }
}
