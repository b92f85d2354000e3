//! The symbolic constant pool at the head of every class file.
//!
//! See the [JVM Specification §4.4](https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-4.html#jvms-4.4)
//! for the on-disk layout.

use std::io::Read;

use crate::errors::{DecodeError, ReadContext};

use super::reader_utils::{ValueReader, read_byte_chunk};

/// A parsed constant pool, kept as a contiguous table indexed exactly the
/// way the class file indexes it: entries are 1-based, and the slot after
/// every Long or Double is reserved.
///
/// Entries hold raw indices into the table; cross-references are resolved
/// on demand by the typed lookups, never into a graph of pointers.
#[derive(Debug, Clone)]
pub struct ConstantPool {
    entries: Vec<PoolEntry>,
}

impl ConstantPool {
    /// Reads `count - 1` entries, reserving slot 0 and the companion slot
    /// of every Long and Double.
    pub(crate) fn parse<R>(reader: &mut R, count: u16) -> Result<Self, DecodeError>
    where
        R: Read + ?Sized,
    {
        let count = count as usize;
        let mut entries = vec![PoolEntry::Unused; count];
        let mut index = 1;
        while index < count {
            let entry = PoolEntry::parse(reader, index as u16)?;
            let width = entry.slot_width();
            entries[index] = entry;
            index += width;
        }
        Ok(Self { entries })
    }

    /// The declared pool count (one more than the number of usable slots).
    #[must_use]
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// The entry at `index`, or `None` when the index is zero, out of
    /// range, or reserved.
    #[must_use]
    pub fn get(&self, index: u16) -> Option<&PoolEntry> {
        match self.entries.get(index as usize) {
            None | Some(PoolEntry::Unused) => None,
            entry => entry,
        }
    }

    fn entry(&self, index: u16) -> Result<&PoolEntry, DecodeError> {
        self.get(index).ok_or(DecodeError::BadPoolIndex(index))
    }

    /// Resolves a Utf8 entry to its decoded text.
    ///
    /// # Errors
    /// [`DecodeError::BadPoolIndex`] or [`DecodeError::WrongPoolKind`].
    pub fn utf8(&self, index: u16) -> Result<&str, DecodeError> {
        match self.entry(index)? {
            PoolEntry::Utf8(text) => Ok(text),
            other => Err(DecodeError::WrongPoolKind {
                index,
                expected: "CONSTANT_Utf8",
                found: other.kind(),
            }),
        }
    }

    /// Resolves a Class entry to the internal binary name it references.
    ///
    /// # Errors
    /// [`DecodeError::BadPoolIndex`] or [`DecodeError::WrongPoolKind`],
    /// here or on the referenced name slot.
    pub fn class_name(&self, index: u16) -> Result<&str, DecodeError> {
        match self.entry(index)? {
            &PoolEntry::Class { name_index } => self.utf8(name_index),
            other => Err(DecodeError::WrongPoolKind {
                index,
                expected: "CONSTANT_Class",
                found: other.kind(),
            }),
        }
    }

    /// Resolves a NameAndType entry to its `(name, descriptor)` texts.
    ///
    /// # Errors
    /// [`DecodeError::BadPoolIndex`] or [`DecodeError::WrongPoolKind`],
    /// here or on either referenced slot.
    pub fn name_and_type(&self, index: u16) -> Result<(&str, &str), DecodeError> {
        match self.entry(index)? {
            &PoolEntry::NameAndType {
                name_index,
                descriptor_index,
            } => Ok((self.utf8(name_index)?, self.utf8(descriptor_index)?)),
            other => Err(DecodeError::WrongPoolKind {
                index,
                expected: "CONSTANT_NameAndType",
                found: other.kind(),
            }),
        }
    }
}

/// One slot of the constant pool.
#[derive(Debug, Clone)]
pub enum PoolEntry {
    /// Slot 0, and the reserved companion slot of every Long and Double.
    /// Never a valid target of a reference index.
    Unused,
    /// A decoded modified-UTF-8 string.
    Utf8(String),
    /// A 32-bit integer constant.
    Integer(i32),
    /// A 32-bit IEEE-754 float constant.
    Float(f32),
    /// A 64-bit integer constant. Occupies two slots.
    Long(i64),
    /// A 64-bit IEEE-754 double constant. Occupies two slots.
    Double(f64),
    /// A class reference.
    Class {
        /// Index of the Utf8 entry holding the internal binary name.
        name_index: u16,
    },
    /// A string constant.
    String {
        /// Index of the Utf8 entry holding the text.
        string_index: u16,
    },
    /// A field reference.
    FieldRef {
        /// Index of the Class entry of the owning type.
        class_index: u16,
        /// Index of the NameAndType entry of the field.
        name_and_type_index: u16,
    },
    /// A method reference.
    MethodRef {
        /// Index of the Class entry of the owning type.
        class_index: u16,
        /// Index of the NameAndType entry of the method.
        name_and_type_index: u16,
    },
    /// An interface method reference.
    InterfaceMethodRef {
        /// Index of the Class entry of the owning interface.
        class_index: u16,
        /// Index of the NameAndType entry of the method.
        name_and_type_index: u16,
    },
    /// A name plus a field or method descriptor.
    NameAndType {
        /// Index of the Utf8 entry holding the name.
        name_index: u16,
        /// Index of the Utf8 entry holding the descriptor.
        descriptor_index: u16,
    },
    /// A method handle.
    MethodHandle {
        /// The kind of the handle (1–9).
        reference_kind: u8,
        /// Index of the referenced FieldRef, MethodRef or
        /// InterfaceMethodRef entry.
        reference_index: u16,
    },
    /// A method type.
    MethodType {
        /// Index of the Utf8 entry holding the method descriptor.
        descriptor_index: u16,
    },
    /// A dynamically computed constant.
    Dynamic {
        /// Index into the bootstrap method table.
        bootstrap_method_attr_index: u16,
        /// Index of the NameAndType entry of the constant.
        name_and_type_index: u16,
    },
    /// An `invokedynamic` call site.
    InvokeDynamic {
        /// Index into the bootstrap method table.
        bootstrap_method_attr_index: u16,
        /// Index of the NameAndType entry of the call site.
        name_and_type_index: u16,
    },
    /// A module name.
    Module {
        /// Index of the Utf8 entry holding the name.
        name_index: u16,
    },
    /// A package name.
    Package {
        /// Index of the Utf8 entry holding the name.
        name_index: u16,
    },
}

impl PoolEntry {
    fn parse<R>(reader: &mut R, index: u16) -> Result<Self, DecodeError>
    where
        R: Read + ?Sized,
    {
        let tag: u8 = reader.read_value().context("a constant pool tag")?;
        let entry = match tag {
            1 => Self::parse_utf8(reader, index)?,
            3 => Self::Integer(reader.read_value().context("a constant pool entry")?),
            4 => Self::Float(reader.read_value().context("a constant pool entry")?),
            5 => Self::Long(reader.read_value().context("a constant pool entry")?),
            6 => Self::Double(reader.read_value().context("a constant pool entry")?),
            7 => Self::Class {
                name_index: reader.read_value().context("a constant pool entry")?,
            },
            8 => Self::String {
                string_index: reader.read_value().context("a constant pool entry")?,
            },
            9 => Self::FieldRef {
                class_index: reader.read_value().context("a constant pool entry")?,
                name_and_type_index: reader.read_value().context("a constant pool entry")?,
            },
            10 => Self::MethodRef {
                class_index: reader.read_value().context("a constant pool entry")?,
                name_and_type_index: reader.read_value().context("a constant pool entry")?,
            },
            11 => Self::InterfaceMethodRef {
                class_index: reader.read_value().context("a constant pool entry")?,
                name_and_type_index: reader.read_value().context("a constant pool entry")?,
            },
            12 => Self::NameAndType {
                name_index: reader.read_value().context("a constant pool entry")?,
                descriptor_index: reader.read_value().context("a constant pool entry")?,
            },
            15 => Self::MethodHandle {
                reference_kind: reader.read_value().context("a constant pool entry")?,
                reference_index: reader.read_value().context("a constant pool entry")?,
            },
            16 => Self::MethodType {
                descriptor_index: reader.read_value().context("a constant pool entry")?,
            },
            17 => Self::Dynamic {
                bootstrap_method_attr_index: reader.read_value().context("a constant pool entry")?,
                name_and_type_index: reader.read_value().context("a constant pool entry")?,
            },
            18 => Self::InvokeDynamic {
                bootstrap_method_attr_index: reader.read_value().context("a constant pool entry")?,
                name_and_type_index: reader.read_value().context("a constant pool entry")?,
            },
            19 => Self::Module {
                name_index: reader.read_value().context("a constant pool entry")?,
            },
            20 => Self::Package {
                name_index: reader.read_value().context("a constant pool entry")?,
            },
            unknown => return Err(DecodeError::UnknownPoolTag(unknown)),
        };
        Ok(entry)
    }

    fn parse_utf8<R>(reader: &mut R, index: u16) -> Result<Self, DecodeError>
    where
        R: Read + ?Sized,
    {
        let length: u16 = reader.read_value().context("a Utf8 entry length")?;
        let content =
            read_byte_chunk(reader, length as usize).context("a Utf8 entry payload")?;
        match cesu8::from_java_cesu8(&content) {
            Ok(text) => Ok(Self::Utf8(text.into_owned())),
            Err(_) => Err(DecodeError::BadString(index)),
        }
    }

    /// How many pool slots the entry occupies.
    const fn slot_width(&self) -> usize {
        match self {
            Self::Long(_) | Self::Double(_) => 2,
            _ => 1,
        }
    }

    /// The `CONSTANT_*` kind name, as used in error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Unused => "unused slot",
            Self::Utf8(_) => "CONSTANT_Utf8",
            Self::Integer(_) => "CONSTANT_Integer",
            Self::Float(_) => "CONSTANT_Float",
            Self::Long(_) => "CONSTANT_Long",
            Self::Double(_) => "CONSTANT_Double",
            Self::Class { .. } => "CONSTANT_Class",
            Self::String { .. } => "CONSTANT_String",
            Self::FieldRef { .. } => "CONSTANT_Fieldref",
            Self::MethodRef { .. } => "CONSTANT_Methodref",
            Self::InterfaceMethodRef { .. } => "CONSTANT_InterfaceMethodref",
            Self::NameAndType { .. } => "CONSTANT_NameAndType",
            Self::MethodHandle { .. } => "CONSTANT_MethodHandle",
            Self::MethodType { .. } => "CONSTANT_MethodType",
            Self::Dynamic { .. } => "CONSTANT_Dynamic",
            Self::InvokeDynamic { .. } => "CONSTANT_InvokeDynamic",
            Self::Module { .. } => "CONSTANT_Module",
            Self::Package { .. } => "CONSTANT_Package",
        }
    }
}
