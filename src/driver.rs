//! Top-level iteration loop: runs chunks of `diff` against both inputs
//! until both are exhausted, dispatching each output line into a
//! [`DiffManager`], and flushes the final diff once input is exhausted.
//!
//! Grounded in geocalc's `lfdiff.c`'s `main()` loop (the
//! `for (iteration=1; ...) { if (feof(A) && feof(B)) break; ... }` shape,
//! its per-line `regexec` dispatch, and the `lineOffset[i] +=
//! threadbuffer[i].lines_copied` bookkeeping at the end of each iteration).

use std::io::Write;

use log::debug;

use crate::chunked_input::Input;
use crate::diff_manager::DiffManager;
use crate::error::{LfdiffError, Result};
use crate::subprocess;

/// Run `diff` repeatedly over chunks of `input_a`/`input_b` until both are
/// exhausted, writing the merged normal-format diff to `sink`.
pub fn run<W: Write>(input_a: &mut Input, input_b: &mut Input, splitsize: i64, sink: &mut W) -> Result<()> {
    let mut manager = DiffManager::new();
    let mut current_a: i64 = 0;
    let mut current_b: i64 = 0;
    let mut offset_a: i64 = 0;
    let mut offset_b: i64 = 0;
    let mut iteration: u64 = 0;

    loop {
        if input_a.is_eof() && input_b.is_eof() {
            break;
        }
        iteration += 1;
        debug!("diff input {iteration}");

        let report = subprocess::run_iteration(input_a, input_b, splitsize, |line| {
            dispatch_line(&mut manager, line, &mut current_a, &mut current_b, offset_a, offset_b)
        })?;

        offset_a += report.lines_a;
        offset_b += report.lines_b;
    }

    manager.output(sink, 0).map_err(LfdiffError::Io)
}

fn dispatch_line(
    manager: &mut DiffManager,
    line: &str,
    current_a: &mut i64,
    current_b: &mut i64,
    offset_a: i64,
    offset_b: i64,
) -> Result<()> {
    if let Some((n1, n3)) = parse_header(line) {
        *current_a = n1 + offset_a;
        *current_b = n3 + offset_b;
        return Ok(());
    }

    let bytes = line.as_bytes();
    if bytes.len() >= 2 && bytes[0] == b'<' && bytes[1] == b' ' {
        manager.input(line, *current_a);
        *current_a += 1;
    } else if bytes.len() >= 2 && bytes[0] == b'>' && bytes[1] == b' ' {
        manager.input(line, *current_b);
        *current_b += 1;
    } else if line == "---\n" || line == "---" {
        // separator between the c-block's two halves; carries no data
    } else {
        return Err(LfdiffError::MalformedChildLine(line.trim_end().to_string()));
    }

    Ok(())
}

/// Parse a `diff` normal-format header `N1[,N2]('a'|'c'|'d')N3[,N4]`,
/// returning `(N1, N3)`. N2/N4 are validated for shape but discarded.
fn parse_header(line: &str) -> Option<(i64, i64)> {
    let line = line.strip_suffix('\n').unwrap_or(line);
    let bytes = line.as_bytes();
    let mut i = 0;

    let n1 = scan_digits(bytes, &mut i)?;
    skip_optional_comma_digits(bytes, &mut i)?;

    if i >= bytes.len() {
        return None;
    }
    match bytes[i] {
        b'a' | b'c' | b'd' => i += 1,
        _ => return None,
    }

    let n3 = scan_digits(bytes, &mut i)?;
    skip_optional_comma_digits(bytes, &mut i)?;

    if i != bytes.len() {
        return None;
    }

    Some((parse_i64(line, n1), parse_i64(line, n3)))
}

fn scan_digits(bytes: &[u8], i: &mut usize) -> Option<(usize, usize)> {
    let start = *i;
    while *i < bytes.len() && bytes[*i].is_ascii_digit() {
        *i += 1;
    }
    if *i == start {
        None
    } else {
        Some((start, *i))
    }
}

fn skip_optional_comma_digits(bytes: &[u8], i: &mut usize) -> Option<()> {
    if *i < bytes.len() && bytes[*i] == b',' {
        *i += 1;
        scan_digits(bytes, i)?;
    }
    Some(())
}

fn parse_i64(line: &str, (start, end): (usize, usize)) -> i64 {
    line[start..end].parse().expect("scan_digits only yields ASCII digit runs")
}
