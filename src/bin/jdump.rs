//! Prints the declared surface of one compiled class.

use std::{path::PathBuf, process::ExitCode};

use clap::Parser;

use jindex::{ClassView, DEFAULT_PACKAGE};

#[derive(Debug, Parser)]
#[command(
    name = "jdump",
    about = "Print the declared surface of a compiled Java class",
    version
)]
struct Args {
    /// The `.class` file to decode.
    classfile: PathBuf,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    println!("Reading file '{}'...", args.classfile.display());
    let class = match ClassView::decode_from_path(&args.classfile, true) {
        Ok(class) => class,
        Err(err) => {
            eprintln!("Failed to read the class file {}", args.classfile.display());
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let access = if class.is_public() { "public" } else { "package" };

    println!("Classname: {}", class.name());
    println!("Class signature: {}", class.signature().unwrap_or("(none)"));
    println!("Package: {}", class.package().unwrap_or(DEFAULT_PACKAGE));
    println!("Fully-qualified classname: {}", class.fq_name());
    println!("Parent class: {}", class.fq_parent().unwrap_or("(none)"));
    println!("Access: {access}");
    println!("Type: {}", class.kind());
    println!("Final: {}", if class.is_final() { "yes" } else { "no" });
    println!(
        "Classfile version number: {}.{}",
        class.major_version(),
        class.minor_version()
    );
    if let Some(label) = class.version_label() {
        println!("Classfile version: {label}");
    }

    println!("Interfaces count: {}", class.interface_number());
    if class.interface_number() > 0 {
        println!("Interfaces:");
        for interface in class.interfaces() {
            println!("    {interface}");
        }
    }

    println!("Fields count: {}", class.field_number());
    if class.field_number() > 0 {
        println!("Fields:");
        for field in class.fields() {
            println!("    {} {}", field.descriptor(), field.name());
            if let Some(signature) = field.signature() {
                println!("        Signature: {signature}");
            }
        }
    }

    println!("Methods count: {}", class.method_number());
    if class.method_number() > 0 {
        println!("Methods:");
        for method in class.methods() {
            println!("    {} {}", method.name(), method.descriptor());
            if !method.exceptions().is_empty() {
                println!("        throws {}", method.exceptions().join(" "));
            }
            if let Some(signature) = method.signature() {
                println!("        Signature: {signature}");
            }
        }
    }

    ExitCode::SUCCESS
}
