//! Builds the class catalog for the current directory tree, the classpath,
//! and the JDK.

use std::{env, path::Path, process::ExitCode};

use clap::Parser;
use walkdir::WalkDir;

use jindex::{
    ClassView,
    index::{DB_FILE, IndexSession},
    walker,
};

#[derive(Debug, Parser)]
#[command(
    name = "jindex",
    about = "Index Java classes from the classpath, the JDK, and the current directory",
    version
)]
struct Args {}

fn main() -> ExitCode {
    env_logger::init();
    let Args {} = Args::parse();

    let mut session = match IndexSession::create(Path::new(DB_FILE)) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("Can't open database: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(classpath) = env::var_os("CLASSPATH") {
        for entry in env::split_paths(&classpath) {
            if entry.as_os_str().is_empty() || entry == Path::new(".") {
                continue;
            }
            index_tree(&mut session, &entry, false);
        }
    }

    match env::var_os("JAVA_HOME") {
        Some(java_home) => index_tree(&mut session, Path::new(&java_home), false),
        None => eprintln!("JDK classes can't be indexed since JAVA_HOME is not set"),
    }

    index_tree(&mut session, Path::new("."), true);

    if let Err(err) = session.finish() {
        eprintln!("SQL error: {err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

/// Indexes every class under `root`. With `record_files` the pass also
/// records every regular filename in the `files` table, which backs the
/// "find file in project" queries.
fn index_tree(session: &mut IndexSession, root: &Path, record_files: bool) {
    if record_files {
        record_filenames(session, root);
    }

    walker::visit_classes(root, |origin, bytes| {
        let class = match ClassView::decode(&bytes, true) {
            Ok(class) => class,
            Err(err) => {
                eprintln!("{origin}: {err}");
                return;
            }
        };
        match session.add_class(&class) {
            Ok(true) => {}
            Ok(false) => {
                eprintln!("ERROR: Possible namespace collision");
                eprintln!("Class {} is already in the database", class.fq_name());
            }
            Err(err) => log::error!("failed to index {origin}: {err}"),
        }
    });
}

fn record_filenames(session: &IndexSession, root: &Path) {
    let entries = WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| !walker::hidden(entry))
        .filter_map(Result::ok);
    for entry in entries {
        if !entry.file_type().is_file() || entry.file_name() == DB_FILE {
            continue;
        }
        let dir = entry.path().parent().unwrap_or(root);
        let name = entry.file_name().to_string_lossy();
        if let Err(err) = session.add_file(dir, &name) {
            log::error!("failed to record {}: {err}", entry.path().display());
        }
    }
}
