//! Decoding the class-file binary format.
//!
//! The input is a borrowed byte slice; everything the decoder keeps is
//! copied into owned strings, so the buffer may be released as soon as
//! [`decode`](crate::ClassView::decode) returns.

mod attribute;
mod class_file;
pub mod constant_pool;
pub(crate) mod reader_utils;

pub use constant_pool::{ConstantPool, PoolEntry};

pub(crate) use class_file::decode;
