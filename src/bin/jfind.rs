//! Finds the JAR files and class files that define a given class.

use std::{path::Path, process::ExitCode};

use clap::Parser;
use walkdir::WalkDir;

use jindex::{ClassView, walker};

#[derive(Debug, Parser)]
#[command(
    name = "jfind",
    about = "Find JAR files that contain a given Java class",
    version
)]
struct Args {
    /// Simple (`Object`) or qualified (`java.lang.Object`) class name.
    classname: String,
    /// Report every archive as it is searched.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    // An unqualified name like `Object` matches entries ending in
    // `/Object.class`; a qualified `java.lang.Object` matches entries
    // ending in `java/lang/Object.class`.
    let qualified = args.classname.contains('.');
    let mut suffix = args.classname.replace('.', "/");
    if !qualified {
        suffix.insert(0, '/');
    }
    suffix.push_str(".class");

    search_tree(Path::new("."), &args, qualified, &suffix);
    ExitCode::SUCCESS
}

fn search_tree(root: &Path, args: &Args, qualified: bool, suffix: &str) {
    let entries = WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| !walker::hidden(entry))
        .filter_map(Result::ok);
    for entry in entries {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        match path.extension().and_then(|it| it.to_str()) {
            Some("jar") => {
                if args.verbose {
                    println!("Searching JAR file {}", path.display());
                }
                search_jar(path, &args.classname, suffix);
            }
            Some("class") => {
                let name = entry.file_name().to_string_lossy();
                if walker::inner_class(&name) {
                    continue;
                }
                search_class_file(path, &args.classname, qualified);
            }
            _ => {}
        }
    }
}

fn search_jar(jar: &Path, classname: &str, suffix: &str) {
    let entries = match walker::jar_entry_names(jar) {
        Ok(entries) => entries,
        Err(err) => {
            eprintln!("Failed to open '{}': {err}", jar.display());
            return;
        }
    };
    for entry in entries {
        if !entry.ends_with(".class") || walker::inner_class(&entry) {
            continue;
        }
        if entry == classname || entry.ends_with(suffix) {
            println!("{} {entry}", jar.display());
        }
    }
}

fn search_class_file(path: &Path, classname: &str, qualified: bool) {
    // Only the class identity is needed here, so skip the member records.
    let class = match ClassView::decode_from_path(path, false) {
        Ok(class) => class,
        Err(err) => {
            eprintln!("ERROR: {err}");
            return;
        }
    };
    let matched = if qualified {
        class.fq_name() == classname
    } else {
        class.name() == classname
    };
    if matched {
        println!("{} {classname}", path.display());
    }
}
