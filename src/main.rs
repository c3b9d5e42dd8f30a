mod chunked_input;
mod cli;
mod diff_manager;
mod driver;
mod error;
mod line_list;
mod side;
mod subprocess;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process;

use clap::Parser;

use chunked_input::Input;
use cli::Args;
use error::{LfdiffError, Result};

fn main() {
    let args = Args::parse();
    let verbose = args.verbose;

    env_logger::Builder::new()
        .filter_level(if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .init();

    if let Err(e) = run(args) {
        eprintln!("lfdiff: {e}");
        process::exit(e.exit_code());
    }
}

fn run(args: Args) -> Result<()> {
    let resolved = args.resolve()?;

    let mut input_a = Input::open(&resolved.input1)?;
    let mut input_b = Input::open(&resolved.input2)?;

    match resolved.output {
        Some(path) => {
            let file = File::create(&path).map_err(|source| LfdiffError::OpenOutput {
                path: path.into(),
                source,
            })?;
            let mut sink = BufWriter::new(file);
            driver::run(&mut input_a, &mut input_b, resolved.splitsize, &mut sink)?;
            sink.flush().map_err(LfdiffError::Io)
        }
        None => {
            let stdout = io::stdout();
            let mut sink = BufWriter::new(stdout.lock());
            driver::run(&mut input_a, &mut input_b, resolved.splitsize, &mut sink)?;
            sink.flush().map_err(LfdiffError::Io)
        }
    }
}
