//! CLI entry point for the seaside configuration generator binary.

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use confgen::catalog::{Catalog, TOOL_VERSION};
use format_core::{emit_to_new_file, encode};
#[cfg(test)]
use tempfile as _;

const USAGE_TEXT: &str = "\
Usage: seaside-confgen <command> [options]

Commands:
  gen [-o <output>]  Generate the binary configuration file
  list               Print every catalog property with its default

Options:
  -o, --output <file>  Output file path (default: seaside.bin)
  -h, --help           Show this help message

The output path must not already exist; the generator never overwrites.

Examples:
  seaside-confgen gen
  seaside-confgen gen -o res/seaside.bin
  seaside-confgen list
";

const DEFAULT_OUTPUT: &str = "seaside.bin";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Gen(GenArgs),
    List,
}

#[derive(Debug, PartialEq, Eq)]
struct GenArgs {
    output: Option<PathBuf>,
}

#[derive(Debug)]
enum ParseResult {
    Command(Command),
    Help,
}

fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let first = args.next().ok_or_else(|| "missing command".to_string())?;

    if first == "--help" || first == "-h" {
        return Ok(ParseResult::Help);
    }

    let command_str = first.to_string_lossy().to_string();

    match command_str.as_str() {
        "gen" => parse_gen_args(args)
            .map(Command::Gen)
            .map(ParseResult::Command),
        "list" => parse_list_args(args).map(|()| ParseResult::Command(Command::List)),
        other => Err(format!("unknown command: {other}")),
    }
}

#[allow(clippy::while_let_on_iterator)]
fn parse_gen_args(mut args: impl Iterator<Item = OsString>) -> Result<GenArgs, String> {
    let mut output: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            return Err(USAGE_TEXT.to_string());
        }

        if arg == "-o" || arg == "--output" {
            let value = args
                .next()
                .ok_or_else(|| "missing value for -o".to_string())?;
            output = Some(PathBuf::from(value));
            continue;
        }

        return Err(format!("unexpected argument: {}", arg.to_string_lossy()));
    }

    Ok(GenArgs { output })
}

fn parse_list_args(mut args: impl Iterator<Item = OsString>) -> Result<(), String> {
    if let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            return Err(USAGE_TEXT.to_string());
        }
        return Err(format!("unexpected argument: {}", arg.to_string_lossy()));
    }
    Ok(())
}

fn build_catalog() -> Result<Catalog, i32> {
    Catalog::build().map_err(|error| {
        eprintln!("error: {error}");
        1
    })
}

fn run_gen(args: GenArgs) -> Result<(), i32> {
    let catalog = build_catalog()?;
    let bytes = encode(catalog.table(), TOOL_VERSION);

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    if let Err(error) = emit_to_new_file(&output, &bytes) {
        eprintln!("error: {error}");
        return Err(1);
    }

    println!(
        "Generated {} ({} bytes, {} properties, format {})",
        output.display(),
        bytes.len(),
        catalog.table().len(),
        TOOL_VERSION,
    );

    Ok(())
}

fn run_list() -> Result<(), i32> {
    let catalog = build_catalog()?;

    for (id, value) in catalog.table().iter() {
        let name = catalog.full_name(id).unwrap_or_default();
        println!("{id}  {name:<44} {:>8} = {value}", value.value_type().name());
    }

    Ok(())
}

fn main() {
    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Command(Command::Gen(args))) => match run_gen(args) {
            Ok(()) => 0,
            Err(code) => code,
        },
        Ok(ParseResult::Command(Command::List)) => match run_list() {
            Ok(()) => 0,
            Err(code) => code,
        },
        Err(error) => {
            if error.starts_with("Usage:") {
                println!("{error}");
                0
            } else {
                eprintln!("error: {error}");
                eprintln!("{USAGE_TEXT}");
                1
            }
        }
    };

    std::process::exit(exit_code);
}
