//! Errors surfaced by the class-file decoder.

use std::io;

/// An error produced while decoding a class file.
///
/// A failed decode never yields a partial [`crate::ClassView`]; the caller
/// gets exactly one of these, carrying the context the decoder had when the
/// input stopped making sense.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// The buffer does not start with `0xCAFEBABE`.
    #[error("not a Java class file (magic bytes {0:#010x})")]
    BadMagic(u32),
    /// A read ran past the end of the buffer or past a declared attribute
    /// length.
    #[error("class file ends early while reading {0}")]
    Truncated(&'static str),
    /// A constant pool entry carries a tag the format does not define.
    #[error("unknown constant pool tag {0}")]
    UnknownPoolTag(u8),
    /// A constant pool index is zero, out of range, or points at the
    /// reserved slot after a Long or Double.
    #[error("constant pool index {0} is out of range or reserved")]
    BadPoolIndex(u16),
    /// An index resolved to an entry of the wrong kind for its use.
    #[error("constant pool entry #{index} is a {found}, expected {expected}")]
    WrongPoolKind {
        /// The offending pool index.
        index: u16,
        /// The kind the caller required.
        expected: &'static str,
        /// The kind actually stored there.
        found: &'static str,
    },
    /// A Utf8 entry holds a malformed modified-UTF-8 sequence.
    #[error("constant pool entry #{0} holds malformed modified UTF-8")]
    BadString(u16),
    /// Reading the class file from disk failed.
    #[error("failed to read class file: {0}")]
    Io(#[from] io::Error),
}

/// Attaches "what were we reading" context to the I/O failures coming out
/// of the byte-level readers. On slice input every such failure is an
/// unexpected end of data.
pub(crate) trait ReadContext<T> {
    fn context(self, reading: &'static str) -> Result<T, DecodeError>;
}

impl<T> ReadContext<T> for io::Result<T> {
    fn context(self, reading: &'static str) -> Result<T, DecodeError> {
        self.map_err(|_| DecodeError::Truncated(reading))
    }
}
