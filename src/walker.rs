//! Finding candidate classes on disk and inside JAR archives.
//!
//! The walker only produces byte buffers; whether a class is decoded in
//! full or header-only is the caller's choice. Problems with individual
//! files or archives are logged and never stop a walk.

use std::{
    fmt,
    fs::{self, File},
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

use walkdir::{DirEntry, WalkDir};
use zip::ZipArchive;
use zip::result::ZipResult;

/// Where a class file came from: loose on disk, or an entry in an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassOrigin {
    /// The `.class` or `.jar` file on disk.
    pub file: PathBuf,
    /// The entry name inside the archive, for archived classes.
    pub entry: Option<String>,
}

impl fmt::Display for ClassOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.entry {
            Some(entry) => write!(f, "{}!{entry}", self.file.display()),
            None => write!(f, "{}", self.file.display()),
        }
    }
}

/// Whether a walked entry is a hidden file or directory (leading `.`).
/// The walk root itself never counts as hidden.
#[must_use]
pub fn hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

/// Whether a class-file name belongs to an inner class (`Outer$Inner`).
#[must_use]
pub fn inner_class(name: &str) -> bool {
    name.contains('$')
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().is_some_and(|it| it == extension)
}

/// Walks `root`, handing the bytes of every candidate class to `visit`:
/// loose `.class` files plus every `.class` entry of every `.jar` found.
/// Hidden directories and inner classes are skipped.
pub fn visit_classes<F>(root: &Path, mut visit: F)
where
    F: FnMut(&ClassOrigin, Vec<u8>),
{
    let entries = WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| !hidden(entry));
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                log::warn!("skipping unreadable directory entry: {err}");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if has_extension(path, "class") {
            if inner_class(&entry.file_name().to_string_lossy()) {
                continue;
            }
            match fs::read(path) {
                Ok(bytes) => visit(
                    &ClassOrigin {
                        file: path.to_owned(),
                        entry: None,
                    },
                    bytes,
                ),
                Err(err) => log::warn!("failed to read {}: {err}", path.display()),
            }
        } else if has_extension(path, "jar") {
            if let Err(err) = visit_jar(path, &mut visit) {
                log::warn!("failed to read archive {}: {err}", path.display());
            }
        }
    }
}

/// Hands every outer-class `.class` entry of one archive to `visit`.
///
/// # Errors
/// Fails when the archive cannot be opened or its directory is unreadable;
/// unreadable individual entries are logged and skipped.
pub fn visit_jar<F>(jar: &Path, mut visit: F) -> ZipResult<()>
where
    F: FnMut(&ClassOrigin, Vec<u8>),
{
    let file = File::open(jar)?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if !entry.is_file() || !entry.name().ends_with(".class") || inner_class(entry.name()) {
            continue;
        }
        let name = entry.name().to_owned();
        let mut bytes = Vec::new();
        if let Err(err) = entry.read_to_end(&mut bytes) {
            log::warn!("failed to read {name} from {}: {err}", jar.display());
            continue;
        }
        visit(
            &ClassOrigin {
                file: jar.to_owned(),
                entry: Some(name),
            },
            bytes,
        );
    }
    Ok(())
}

/// Lists the entry names of one archive without reading their contents.
///
/// # Errors
/// Fails when the archive cannot be opened or its directory is unreadable.
pub fn jar_entry_names(jar: &Path) -> ZipResult<Vec<String>> {
    let file = File::open(jar)?;
    let archive = ZipArchive::new(BufReader::new(file))?;
    Ok(archive.file_names().map(str::to_owned).collect())
}
