//! Command-line entry point.
//!
//! Usage:
//!   packy convert <template> [--out <path>] [--json|-j] [--yaml|-y]
//!   packy <anything else>    - delegates to packer with YAML args converted

use std::env;
use std::process;

const PACKER_BIN: &str = "packer";

fn main() {
    let args: Vec<String> = env::args().collect();
    process::exit(packy::cli::dispatch(&args, PACKER_BIN));
}
