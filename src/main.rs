//! Runs a stack-processor script from a file.
//!
//! # Usage
//! ```text
//! stack-processor <program> [OPTIONS]
//! ```
//!
//! # Arguments
//! - `program`: Script file with one token per line; blank lines are skipped
//!
//! # Options
//! - `-v, --verbose`: Log every token and the stack before it runs
//! - `--hash <name>`: Hash for `OP_HASH` and signatures (defaults to `lsh256`)
//! - `--no-timestamp`: Omit timestamps from log lines
//!
//! # Examples
//! ```text
//! stack-processor p2pkh.script
//! stack-processor openssl.script --hash sha256 --verbose
//! ```

use stack_processor::crypto::hash::HashAlgorithm;
use stack_processor::utils::log::{Level, SHOW_TIMESTAMP, set_max_level};
use stack_processor::virtual_machine::processor::{ProcessorConfig, StackProcessor};
use stack_processor::virtual_machine::value::format_stack;
use stack_processor::{error, info};
use std::env;
use std::fs;
use std::process;
use std::sync::atomic::Ordering;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage(&args[0]);
        process::exit(if args.len() < 2 { 1 } else { 0 });
    }

    let program_path = &args[1];
    let mut config = ProcessorConfig::default();

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--verbose" | "-v" => {
                set_max_level(Level::Debug);
                i += 1;
            }
            "--no-timestamp" => {
                SHOW_TIMESTAMP.store(false, Ordering::Relaxed);
                i += 1;
            }
            "--hash" => {
                i += 1;
                if i >= args.len() {
                    error!("--hash requires an argument");
                    process::exit(1);
                }
                config = config.with_hash(parse_hash(&args[i]).unwrap_or_else(|| {
                    error!("Unknown hash '{}'", args[i]);
                    process::exit(1);
                }));
                i += 1;
            }
            other => {
                error!("Unknown argument: {other}");
                print_usage(&args[0]);
                process::exit(1);
            }
        }
    }

    let source = fs::read_to_string(program_path).unwrap_or_else(|e| {
        error!("Failed to read {program_path}: {e}");
        process::exit(1);
    });
    let tokens: Vec<&str> = source
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    info!("Running {} tokens from {program_path} with {}", tokens.len(), config.hash);

    match StackProcessor::new(tokens, &config).run() {
        Ok(stack) => println!("{}", format_stack(&stack)),
        Err(e) => {
            error!("Script failed: {e}");
            process::exit(1);
        }
    }
}

/// Maps a `--hash` argument to an algorithm.
fn parse_hash(name: &str) -> Option<HashAlgorithm> {
    match name {
        "lsh256" => Some(HashAlgorithm::Lsh256 { output_bits: 256 }),
        "lsh224" => Some(HashAlgorithm::Lsh256 { output_bits: 224 }),
        "sha256" => Some(HashAlgorithm::Sha256),
        "sha3-256" => Some(HashAlgorithm::Sha3_256),
        _ => None,
    }
}

const USAGE: &str = "\
Stack Processor

USAGE:
    {program} <program> [OPTIONS]

ARGS:
    <program>    Script file, one token per line

OPTIONS:
    -v, --verbose      Log each token and the stack before it runs
    --hash <name>      lsh256 (default), lsh224, sha256 or sha3-256
    --no-timestamp     Omit timestamps from log lines
    -h, --help         Print this help message

EXAMPLES:
    # Verify a pay-to-public-key-hash script
    {program} p2pkh.script

    # Check an OpenSSL signature
    {program} openssl.script --hash sha256
";

fn print_usage(program: &str) {
    eprintln!("{}", USAGE.replace("{program}", program));
}
