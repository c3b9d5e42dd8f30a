//! Command-line surface: argument parsing and input-pair validation.
//!
//! Mirrors the shape of `unai`'s `clap` derive `Args` struct, adapted to
//! lfdiff's two-positional/`-o`/`-s` grammar.

use clap::Parser;

use crate::chunked_input::{parse_splitsize, DEFAULT_SPLITSIZE};
use crate::error::{LfdiffError, Result};

#[derive(Parser, Debug)]
#[command(
    name = "lfdiff",
    version,
    about = "Diff very large inputs in bounded memory by chunking them through an external diff",
    long_about = None
)]
pub struct Args {
    /// First input. Use '-' to read from stdin.
    #[arg(value_name = "INPUT1")]
    pub input1: String,

    /// Second input. Use '-' to read from stdin.
    #[arg(value_name = "INPUT2")]
    pub input2: String,

    /// Write the diff to this file instead of stdout.
    #[arg(short = 'o', long, value_name = "OUTPUT")]
    pub output: Option<String>,

    /// Bytes read per input per iteration, e.g. 512, 64k, 4M, 2G.
    #[arg(short = 's', long, value_name = "SPLITSIZE")]
    pub splitsize: Option<String>,

    /// Print progress to stderr.
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

pub struct Resolved {
    pub input1: String,
    pub input2: String,
    pub output: Option<String>,
    pub splitsize: i64,
}

impl Args {
    pub fn resolve(self) -> Result<Resolved> {
        if self.input1 != "-" && self.input1 == self.input2 {
            return Err(LfdiffError::SameInput(self.input1));
        }
        if self.input1 == "-" && self.input2 == "-" {
            return Err(LfdiffError::StdinUsedTwice);
        }

        let splitsize = match self.splitsize {
            Some(raw) => parse_splitsize(&raw)?,
            None => DEFAULT_SPLITSIZE,
        };

        Ok(Resolved {
            input1: self.input1,
            input2: self.input2,
            output: self.output,
            splitsize,
        })
    }
}
