#![warn(
    clippy::pedantic,
    future_incompatible,
    missing_debug_implementations,
    missing_docs,
    rust_2018_idioms
)]

//! `jindex` decodes compiled Java class files — loose on disk or bundled in
//! JAR archives — into a read-only view of their declared surface: name,
//! package, supertype, interfaces, fields, methods, access flags, generic
//! signatures and thrown-exception lists.
//!
//! The decoder does not verify bytecode, does not decode instruction
//! streams, and does not load referenced classes. It reads exactly one
//! class file and exposes what that file declares.
//!
//! ```no_run
//! use jindex::ClassView;
//!
//! let class = ClassView::decode_from_path("Widget.class", true)?;
//! println!("{} extends {:?}", class.fq_name(), class.fq_parent());
//! # Ok::<(), jindex::DecodeError>(())
//! ```
//!
//! On top of the decoder sit two collaborators: [`walker`], which yields the
//! bytes of every candidate class under a directory tree, and [`index`],
//! which persists decoded classes into a SQLite catalog.

pub mod class;
pub mod errors;
pub mod index;
pub mod names;
pub mod parsing;
pub mod walker;

pub use class::{AccessFlags, ClassKind, ClassView, FieldRecord, MethodRecord};
pub use errors::DecodeError;

/// Placeholder namespace used where a class declares no package.
pub const DEFAULT_PACKAGE: &str = "(default)";
