//! The read-only view of a decoded class and its members.

use std::{fs, path::Path};

use bitflags::bitflags;

use crate::{errors::DecodeError, names, parsing};

bitflags! {
    /// The 16-bit access-flag set of a class, field, or method.
    ///
    /// The bit numbers are those of the [JVM Specification, chapter 4](https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-4.html).
    /// Some bits are overloaded across sites (`ACC_SUPER`/`ACC_SYNCHRONIZED`,
    /// `ACC_VOLATILE`/`ACC_BRIDGE`, `ACC_TRANSIENT`/`ACC_VARARGS`); both
    /// names are provided and which one applies depends on where the flag
    /// word was read. The decoder records the bits as found and does not
    /// enforce which bits are legal on which site.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AccessFlags: u16 {
        /// Declared `public`.
        const PUBLIC = 0x0001;
        /// Declared `private`.
        const PRIVATE = 0x0002;
        /// Declared `protected`.
        const PROTECTED = 0x0004;
        /// Declared `static`.
        const STATIC = 0x0008;
        /// Declared `final`.
        const FINAL = 0x0010;
        /// Declared `synchronized` (methods).
        const SYNCHRONIZED = 0x0020;
        /// Treat superclass methods specially on `invokespecial` (classes).
        const SUPER = 0x0020;
        /// Declared `volatile` (fields).
        const VOLATILE = 0x0040;
        /// A compiler-generated bridge method (methods).
        const BRIDGE = 0x0040;
        /// Declared `transient` (fields).
        const TRANSIENT = 0x0080;
        /// Declared with a variable number of arguments (methods).
        const VARARGS = 0x0080;
        /// Declared `native`.
        const NATIVE = 0x0100;
        /// Is an interface, not a class.
        const INTERFACE = 0x0200;
        /// Declared `abstract`.
        const ABSTRACT = 0x0400;
        /// Declared `strictfp`.
        const STRICT = 0x0800;
        /// Not present in the source code.
        const SYNTHETIC = 0x1000;
        /// Declared as an annotation interface.
        const ANNOTATION = 0x2000;
        /// Declared as an `enum` class or an enum constant field.
        const ENUM = 0x4000;
        /// Is a module, not a class or interface.
        const MODULE = 0x8000;
    }
}

/// The single-valued label of a decoded type.
///
/// The flag bits are not mutually exclusive on disk, so the label is picked
/// with a fixed precedence: enum, then annotation, then interface, then
/// abstract class, then class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum ClassKind {
    /// An `enum` class.
    #[display("enum")]
    Enum,
    /// An annotation interface.
    #[display("annotation")]
    Annotation,
    /// An interface.
    #[display("interface")]
    Interface,
    /// An abstract class.
    #[display("abstract class")]
    Abstract,
    /// A plain (possibly concrete) class.
    #[display("class")]
    Class,
}

/// A field as declared by a class file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRecord {
    pub(crate) name: String,
    pub(crate) descriptor: String,
    pub(crate) signature: Option<String>,
    pub(crate) access_flags: AccessFlags,
}

impl FieldRecord {
    /// The simple field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The JVM field descriptor, e.g. `Ljava/lang/String;`.
    #[must_use]
    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    /// The generic `Signature` attribute value, if the field carries one.
    #[must_use]
    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    /// The access flags as found in the `field_info` record.
    #[must_use]
    pub const fn access_flags(&self) -> AccessFlags {
        self.access_flags
    }

    /// Whether the field is declared `public`.
    #[must_use]
    pub const fn is_public(&self) -> bool {
        self.access_flags.contains(AccessFlags::PUBLIC)
    }

    /// Whether the field is declared `protected`.
    #[must_use]
    pub const fn is_protected(&self) -> bool {
        self.access_flags.contains(AccessFlags::PROTECTED)
    }

    /// Whether the field is declared `private`.
    #[must_use]
    pub const fn is_private(&self) -> bool {
        self.access_flags.contains(AccessFlags::PRIVATE)
    }

    /// Whether the field is declared `static`.
    #[must_use]
    pub const fn is_static(&self) -> bool {
        self.access_flags.contains(AccessFlags::STATIC)
    }

    /// Whether the field is declared `final`.
    #[must_use]
    pub const fn is_final(&self) -> bool {
        self.access_flags.contains(AccessFlags::FINAL)
    }

    /// Whether the field is an enum constant.
    #[must_use]
    pub const fn is_enum(&self) -> bool {
        self.access_flags.contains(AccessFlags::ENUM)
    }
}

/// A method as declared by a class file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodRecord {
    pub(crate) name: String,
    pub(crate) descriptor: String,
    pub(crate) signature: Option<String>,
    pub(crate) exceptions: Vec<String>,
    pub(crate) access_flags: AccessFlags,
}

impl MethodRecord {
    /// The simple method name (`<init>` for constructors).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The JVM method descriptor, e.g. `(I)V`.
    #[must_use]
    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    /// The generic `Signature` attribute value, if the method carries one.
    #[must_use]
    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    /// The internal names of the declared thrown exceptions, in file order.
    /// Empty when the method has no `Exceptions` attribute.
    #[must_use]
    pub fn exceptions(&self) -> &[String] {
        &self.exceptions
    }

    /// The access flags as found in the `method_info` record.
    #[must_use]
    pub const fn access_flags(&self) -> AccessFlags {
        self.access_flags
    }

    /// Whether the method is declared `public`.
    #[must_use]
    pub const fn is_public(&self) -> bool {
        self.access_flags.contains(AccessFlags::PUBLIC)
    }

    /// Whether the method is declared `protected`.
    #[must_use]
    pub const fn is_protected(&self) -> bool {
        self.access_flags.contains(AccessFlags::PROTECTED)
    }

    /// Whether the method is declared `private`.
    #[must_use]
    pub const fn is_private(&self) -> bool {
        self.access_flags.contains(AccessFlags::PRIVATE)
    }

    /// Whether the method is declared `static`.
    #[must_use]
    pub const fn is_static(&self) -> bool {
        self.access_flags.contains(AccessFlags::STATIC)
    }

    /// Whether the method is declared `final`.
    #[must_use]
    pub const fn is_final(&self) -> bool {
        self.access_flags.contains(AccessFlags::FINAL)
    }

    /// Whether the method is declared `synchronized`.
    #[must_use]
    pub const fn is_synchronized(&self) -> bool {
        self.access_flags.contains(AccessFlags::SYNCHRONIZED)
    }

    /// Whether the method is declared `abstract`.
    #[must_use]
    pub const fn is_abstract(&self) -> bool {
        self.access_flags.contains(AccessFlags::ABSTRACT)
    }
}

/// The decoded, immutable view of one class file.
///
/// A view owns every decoded string; the raw byte buffer it was decoded from
/// may be released as soon as [`ClassView::decode`] returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassView {
    pub(crate) minor_version: u16,
    pub(crate) major_version: u16,
    pub(crate) access_flags: AccessFlags,
    pub(crate) internal_name: String,
    pub(crate) package: Option<String>,
    pub(crate) simple_name: String,
    pub(crate) super_name: Option<String>,
    pub(crate) interfaces: Vec<String>,
    pub(crate) fields: Vec<FieldRecord>,
    pub(crate) methods: Vec<MethodRecord>,
    pub(crate) signature: Option<String>,
}

impl ClassView {
    /// Decodes a class file from a byte buffer.
    ///
    /// With `need_members == false` the field and method tables are still
    /// walked (the format leaves no other way to reach the class attributes)
    /// but their records are dropped; use it when only the class identity is
    /// needed.
    ///
    /// # Errors
    /// See [`DecodeError`]. A failed decode never returns a partial view.
    pub fn decode(bytes: &[u8], need_members: bool) -> Result<Self, DecodeError> {
        parsing::decode(bytes, need_members)
    }

    /// Reads and decodes a class file from disk.
    ///
    /// # Errors
    /// [`DecodeError::Io`] when the file cannot be read; otherwise as
    /// [`ClassView::decode`].
    pub fn decode_from_path<P>(path: P, need_members: bool) -> Result<Self, DecodeError>
    where
        P: AsRef<Path>,
    {
        let bytes = fs::read(path)?;
        Self::decode(&bytes, need_members)
    }

    /// The minor version number of the class-file format.
    #[must_use]
    pub const fn minor_version(&self) -> u16 {
        self.minor_version
    }

    /// The major version number of the class-file format.
    #[must_use]
    pub const fn major_version(&self) -> u16 {
        self.major_version
    }

    /// The display label of the major version, e.g. `"Java 8"` for 52.
    /// `None` for majors this build does not know about.
    #[must_use]
    pub const fn version_label(&self) -> Option<&'static str> {
        version_label(self.major_version)
    }

    /// The simple class name, without its package.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.simple_name
    }

    /// The dot-separated package, or `None` for the default package.
    #[must_use]
    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    /// The internal (slash-separated) binary name, as stored on disk.
    #[must_use]
    pub fn internal_name(&self) -> &str {
        &self.internal_name
    }

    /// The fully qualified, dot-separated class name.
    #[must_use]
    pub fn fq_name(&self) -> String {
        names::fq_name(self.package(), &self.simple_name)
    }

    /// The fully qualified name of the superclass, absent only for
    /// `java.lang.Object` (and module info pseudo-classes).
    #[must_use]
    pub fn fq_parent(&self) -> Option<&str> {
        self.super_name.as_deref()
    }

    /// The internal names of the directly implemented interfaces.
    #[must_use]
    pub fn interfaces(&self) -> &[String] {
        &self.interfaces
    }

    /// The number of directly implemented interfaces.
    #[must_use]
    pub fn interface_number(&self) -> usize {
        self.interfaces.len()
    }

    /// The declared fields, in file order.
    #[must_use]
    pub fn fields(&self) -> &[FieldRecord] {
        &self.fields
    }

    /// The number of declared fields.
    #[must_use]
    pub fn field_number(&self) -> usize {
        self.fields.len()
    }

    /// The declared methods, in file order.
    #[must_use]
    pub fn methods(&self) -> &[MethodRecord] {
        &self.methods
    }

    /// The number of declared methods.
    #[must_use]
    pub fn method_number(&self) -> usize {
        self.methods.len()
    }

    /// The generic `Signature` attribute of the class, if present.
    #[must_use]
    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    /// The class access flags as found in the file.
    #[must_use]
    pub const fn access_flags(&self) -> AccessFlags {
        self.access_flags
    }

    /// Whether the class is declared `public`.
    #[must_use]
    pub const fn is_public(&self) -> bool {
        self.access_flags.contains(AccessFlags::PUBLIC)
    }

    /// Whether the class is declared `final`.
    #[must_use]
    pub const fn is_final(&self) -> bool {
        self.access_flags.contains(AccessFlags::FINAL)
    }

    /// Whether the INTERFACE flag is set.
    #[must_use]
    pub const fn is_interface(&self) -> bool {
        self.access_flags.contains(AccessFlags::INTERFACE)
    }

    /// Whether the ABSTRACT flag is set.
    #[must_use]
    pub const fn is_abstract(&self) -> bool {
        self.access_flags.contains(AccessFlags::ABSTRACT)
    }

    /// Whether the ENUM flag is set.
    #[must_use]
    pub const fn is_enum(&self) -> bool {
        self.access_flags.contains(AccessFlags::ENUM)
    }

    /// Whether the ANNOTATION flag is set.
    #[must_use]
    pub const fn is_annotation(&self) -> bool {
        self.access_flags.contains(AccessFlags::ANNOTATION)
    }

    /// The single-valued type label; see [`ClassKind`] for the precedence.
    #[must_use]
    pub const fn kind(&self) -> ClassKind {
        let flags = self.access_flags;
        if flags.contains(AccessFlags::ENUM) {
            ClassKind::Enum
        } else if flags.contains(AccessFlags::ANNOTATION) {
            ClassKind::Annotation
        } else if flags.contains(AccessFlags::INTERFACE) {
            ClassKind::Interface
        } else if flags.contains(AccessFlags::ABSTRACT) {
            ClassKind::Abstract
        } else {
            ClassKind::Class
        }
    }
}

/// Maps a class-file major version to its display label.
///
/// Returns `None` for majors this build does not know about; callers fall
/// back to showing the numeric pair.
#[must_use]
pub const fn version_label(major: u16) -> Option<&'static str> {
    Some(match major {
        45 => "Java 1.1",
        46 => "Java 1.2",
        47 => "Java 1.3",
        48 => "Java 1.4",
        49 => "Java 5",
        50 => "Java 6",
        51 => "Java 7",
        52 => "Java 8",
        53 => "Java 9",
        54 => "Java 10",
        55 => "Java 11",
        56 => "Java 12",
        57 => "Java 13",
        58 => "Java 14",
        59 => "Java 15",
        60 => "Java 16",
        61 => "Java 17",
        62 => "Java 18",
        63 => "Java 19",
        64 => "Java 20",
        65 => "Java 21",
        66 => "Java 22",
        67 => "Java 23",
        68 => "Java 24",
        _ => return None,
    })
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use super::*;

    fn view_with_flags(access_flags: AccessFlags) -> ClassView {
        ClassView {
            minor_version: 0,
            major_version: 52,
            access_flags,
            internal_name: "Sample".to_owned(),
            package: None,
            simple_name: "Sample".to_owned(),
            super_name: Some("java.lang.Object".to_owned()),
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            signature: None,
        }
    }

    #[test]
    fn enum_label_wins_over_everything() {
        let view = view_with_flags(
            AccessFlags::ENUM
                | AccessFlags::ANNOTATION
                | AccessFlags::INTERFACE
                | AccessFlags::ABSTRACT,
        );
        assert_eq!(ClassKind::Enum, view.kind());
    }

    #[test]
    fn annotation_label_wins_over_interface() {
        let view = view_with_flags(
            AccessFlags::ANNOTATION | AccessFlags::INTERFACE | AccessFlags::ABSTRACT,
        );
        assert_eq!(ClassKind::Annotation, view.kind());
    }

    #[test]
    fn interface_label_wins_over_abstract() {
        let view = view_with_flags(AccessFlags::INTERFACE | AccessFlags::ABSTRACT);
        assert_eq!(ClassKind::Interface, view.kind());
        assert!(view.is_interface());
        assert!(view.is_abstract());
    }

    #[test]
    fn plain_class_label() {
        let view = view_with_flags(AccessFlags::PUBLIC | AccessFlags::SUPER);
        assert_eq!(ClassKind::Class, view.kind());
        assert_eq!("class", view.kind().to_string());
    }

    #[test]
    fn version_labels_cover_the_known_range() {
        assert_eq!(Some("Java 1.1"), version_label(45));
        assert_eq!(Some("Java 8"), version_label(52));
        assert_eq!(Some("Java 24"), version_label(68));
        assert_eq!(None, version_label(44));
        assert_eq!(None, version_label(69));
    }

    #[test]
    fn overloaded_bits_share_their_value() {
        assert_eq!(AccessFlags::SUPER, AccessFlags::SYNCHRONIZED);
        assert_eq!(AccessFlags::VOLATILE, AccessFlags::BRIDGE);
        assert_eq!(AccessFlags::TRANSIENT, AccessFlags::VARARGS);
    }

    proptest! {
        #[test]
        fn the_label_is_always_single_valued(bits in any::<u16>()) {
            let view = view_with_flags(AccessFlags::from_bits_retain(bits));
            let kind = view.kind();
            match kind {
                ClassKind::Enum => prop_assert!(view.is_enum()),
                ClassKind::Annotation => prop_assert!(view.is_annotation() && !view.is_enum()),
                ClassKind::Interface => {
                    prop_assert!(view.is_interface() && !view.is_annotation() && !view.is_enum());
                }
                ClassKind::Abstract => prop_assert!(
                    view.is_abstract()
                        && !view.is_interface()
                        && !view.is_annotation()
                        && !view.is_enum()
                ),
                ClassKind::Class => prop_assert!(
                    !view.is_abstract()
                        && !view.is_interface()
                        && !view.is_annotation()
                        && !view.is_enum()
                ),
            }
        }
    }
}
