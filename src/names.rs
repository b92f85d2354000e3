//! Splitting and joining qualified class names.
//!
//! Both `/` (the internal, on-disk form) and `.` (the user-facing form) are
//! accepted as separators, so these helpers work on raw class-file names
//! and on fully qualified names alike.

fn split(name: &str) -> Option<(&str, &str)> {
    name.rfind(['/', '.'])
        .map(|at| (&name[..at], &name[at + 1..]))
}

/// Returns everything before the last separator, dot-joined, or `None` when
/// the name carries no package (the default package).
#[must_use]
pub fn extract_package(name: &str) -> Option<String> {
    match split(name) {
        Some((package, _)) if !package.is_empty() => Some(package.replace('/', ".")),
        _ => None,
    }
}

/// Returns the trailing segment of a qualified name.
#[must_use]
pub fn extract_classname(name: &str) -> &str {
    split(name).map_or(name, |(_, simple)| simple)
}

/// Dot-joins a package and a simple name, skipping a missing or empty
/// package.
#[must_use]
pub fn fq_name(package: Option<&str>, simple: &str) -> String {
    match package {
        Some(package) if !package.is_empty() => format!("{package}.{simple}"),
        _ => simple.to_owned(),
    }
}
