//! Top-level orchestration: header, constant pool, flags, names, members
//! and class-level attributes.
//!
//! Parsing happens in two passes over the same material. The first pass
//! reads the raw file layout with indices unresolved; the second resolves
//! every index against the pool and builds the owned [`ClassView`].

use std::io::Read;

use itertools::Itertools;

use crate::{
    class::{AccessFlags, ClassView, FieldRecord, MethodRecord},
    errors::{DecodeError, ReadContext},
    names,
};

use super::{
    attribute::{Attribute, AttributeInfo},
    constant_pool::ConstantPool,
    reader_utils::ValueReader,
};

const CLASS_MAGIC: u32 = 0xCAFE_BABE;

/// The undigested layout of a class file, indices unresolved.
#[derive(Debug)]
struct RawClassFile {
    minor_version: u16,
    major_version: u16,
    constant_pool: ConstantPool,
    access_flags: u16,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    fields: Vec<MemberInfo>,
    methods: Vec<MemberInfo>,
    attributes: Vec<AttributeInfo>,
}

/// `field_info` and `method_info` share one on-disk shape.
#[derive(Debug)]
struct MemberInfo {
    access_flags: u16,
    name_index: u16,
    descriptor_index: u16,
    attributes: Vec<AttributeInfo>,
}

impl MemberInfo {
    fn parse<R>(reader: &mut R, table: &'static str) -> Result<Self, DecodeError>
    where
        R: Read + ?Sized,
    {
        let access_flags = reader.read_value().context(table)?;
        let name_index = reader.read_value().context(table)?;
        let descriptor_index = reader.read_value().context(table)?;
        let attributes = AttributeInfo::parse_table(reader)?;
        Ok(Self {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    fn into_field(self, pool: &ConstantPool) -> Result<FieldRecord, DecodeError> {
        let name = pool.utf8(self.name_index)?.to_owned();
        let descriptor = pool.utf8(self.descriptor_index)?.to_owned();
        let mut signature = None;
        for raw in &self.attributes {
            if let Attribute::Signature(text) = Attribute::decode(raw, pool)? {
                signature = Some(text);
            }
        }
        Ok(FieldRecord {
            name,
            descriptor,
            signature,
            access_flags: AccessFlags::from_bits_retain(self.access_flags),
        })
    }

    fn into_method(self, pool: &ConstantPool) -> Result<MethodRecord, DecodeError> {
        let name = pool.utf8(self.name_index)?.to_owned();
        let descriptor = pool.utf8(self.descriptor_index)?.to_owned();
        let mut signature = None;
        let mut exceptions = Vec::new();
        for raw in &self.attributes {
            match Attribute::decode(raw, pool)? {
                Attribute::Signature(text) => signature = Some(text),
                Attribute::Exceptions(thrown) => exceptions = thrown,
                Attribute::Skipped => {}
            }
        }
        Ok(MethodRecord {
            name,
            descriptor,
            signature,
            exceptions,
            access_flags: AccessFlags::from_bits_retain(self.access_flags),
        })
    }
}

impl RawClassFile {
    fn parse<R>(reader: &mut R) -> Result<Self, DecodeError>
    where
        R: Read + ?Sized,
    {
        let magic: u32 = reader.read_value().context("the file header")?;
        if magic != CLASS_MAGIC {
            return Err(DecodeError::BadMagic(magic));
        }
        let minor_version = reader.read_value().context("the file header")?;
        let major_version = reader.read_value().context("the file header")?;
        let constant_pool_count = reader.read_value().context("the constant pool count")?;
        let constant_pool = ConstantPool::parse(reader, constant_pool_count)?;
        let access_flags = reader.read_value().context("the class access flags")?;
        let this_class = reader.read_value().context("this_class")?;
        let super_class = reader.read_value().context("super_class")?;
        let interface_count: u16 = reader.read_value().context("the interface table")?;
        let interfaces = (0..interface_count)
            .map(|_| reader.read_value().context("the interface table"))
            .try_collect()?;
        let field_count: u16 = reader.read_value().context("the field table")?;
        let fields = (0..field_count)
            .map(|_| MemberInfo::parse(reader, "the field table"))
            .try_collect()?;
        let method_count: u16 = reader.read_value().context("the method table")?;
        let methods = (0..method_count)
            .map(|_| MemberInfo::parse(reader, "the method table"))
            .try_collect()?;
        let attributes = AttributeInfo::parse_table(reader)?;
        Ok(Self {
            minor_version,
            major_version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }

    fn elaborate(self, need_members: bool) -> Result<ClassView, DecodeError> {
        let Self {
            minor_version,
            major_version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        } = self;
        let pool = &constant_pool;

        let access_flags = AccessFlags::from_bits_retain(access_flags);
        let internal_name = pool.class_name(this_class)?.to_owned();
        let package = names::extract_package(&internal_name);
        let simple_name = names::extract_classname(&internal_name).to_owned();

        let super_name = match super_class {
            0 if internal_name == "java/lang/Object"
                || access_flags.contains(AccessFlags::MODULE) =>
            {
                None
            }
            0 => return Err(DecodeError::BadPoolIndex(0)),
            index => Some(pool.class_name(index)?.replace('/', ".")),
        };

        let interfaces = interfaces
            .into_iter()
            .map(|index| pool.class_name(index).map(str::to_owned))
            .try_collect()?;
        let mut fields: Vec<_> = fields
            .into_iter()
            .map(|member| member.into_field(pool))
            .try_collect()?;
        let mut methods: Vec<_> = methods
            .into_iter()
            .map(|member| member.into_method(pool))
            .try_collect()?;

        let mut signature = None;
        for raw in &attributes {
            if let Attribute::Signature(text) = Attribute::decode(raw, pool)? {
                signature = Some(text);
            }
        }

        if !need_members {
            fields = Vec::new();
            methods = Vec::new();
        }

        Ok(ClassView {
            minor_version,
            major_version,
            access_flags,
            internal_name,
            package,
            simple_name,
            super_name,
            interfaces,
            fields,
            methods,
            signature,
        })
    }
}

pub(crate) fn decode(bytes: &[u8], need_members: bool) -> Result<ClassView, DecodeError> {
    let mut reader = bytes;
    let raw = RawClassFile::parse(&mut reader)?;
    if !reader.is_empty() {
        log::warn!(
            "{} trailing byte(s) after the last class attribute",
            reader.len()
        );
    }
    raw.elaborate(need_members)
}
