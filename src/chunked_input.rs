//! Input sources and the `-s SPLITSIZE` suffix grammar.
//!
//! Grounded in geocalc's `lfdiff.c`'s `config.splitsize` handling:
//! a decimal byte count optionally suffixed with `k`/`kB`/`M`/`MB`/`G`/`GB`
//! (multipliers 1024, 1024², 1024³), overflow-checked against a 64-bit signed
//! byte count. The original validates with a POSIX ERE (`^([0-9]+)([kMG]?)B?$`)
//! compiled via `regcomp`; this is a small fixed grammar, so it is hand-parsed
//! here instead of pulling in the `regex` crate for one call site.

use std::fs::File;
use std::io::{self, BufRead, BufReader};

use crate::error::{LfdiffError, Result};

pub const DEFAULT_SPLITSIZE: i64 = 2 * 1024 * 1024 * 1024;

/// Parse a `-s` argument like `512`, `64k`, `4MB`, `2G` into a byte count.
pub fn parse_splitsize(raw: &str) -> Result<i64> {
    let bad = || LfdiffError::BadSplitsize(raw.to_string(), "expected digits with an optional k/kB/M/MB/G/GB suffix");

    let digits_end = raw.find(|c: char| !c.is_ascii_digit()).unwrap_or(raw.len());
    if digits_end == 0 {
        return Err(bad());
    }
    let (digits, rest) = raw.split_at(digits_end);

    let multiplier: i64 = match rest {
        "" => 1,
        "k" | "kB" => 1024,
        "M" | "MB" => 1024 * 1024,
        "G" | "GB" => 1024 * 1024 * 1024,
        _ => return Err(bad()),
    };

    let base: i64 = digits.parse().map_err(|_| bad())?;
    base.checked_mul(multiplier)
        .ok_or_else(|| LfdiffError::SplitsizeOverflow(raw.to_string()))
}

/// One of the two chunked inputs. Owns its reader across iterations so a
/// source's position and EOF state persist between chunks.
pub struct Input {
    reader: Box<dyn BufRead + Send>,
    eof: bool,
}

impl Input {
    pub fn open(path: &str) -> Result<Input> {
        let reader: Box<dyn BufRead + Send> = if path == "-" {
            Box::new(BufReader::new(io::stdin()))
        } else {
            let file = File::open(path).map_err(|source| LfdiffError::OpenInput {
                path: path.into(),
                source,
            })?;
            Box::new(BufReader::new(file))
        };
        Ok(Input { reader, eof: false })
    }

    pub fn is_eof(&self) -> bool {
        self.eof
    }

    /// Read whole lines until either source EOF or `budget` cumulative bytes
    /// have been read, writing each line to `sink`. Returns the number of
    /// lines copied.
    pub fn feed_chunk<W: io::Write>(&mut self, budget: i64, sink: &mut W) -> io::Result<i64> {
        let mut copied_bytes: i64 = 0;
        let mut lines_copied: i64 = 0;
        let mut line = String::new();

        while !self.eof && copied_bytes < budget {
            line.clear();
            let n = self.reader.read_line(&mut line)?;
            if n == 0 {
                self.eof = true;
                break;
            }
            sink.write_all(line.as_bytes())?;
            copied_bytes += n as i64;
            lines_copied += 1;
        }

        Ok(lines_copied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_byte_count() {
        assert_eq!(parse_splitsize("512").unwrap(), 512);
    }

    #[test]
    fn parses_k_m_g_suffixes() {
        assert_eq!(parse_splitsize("64k").unwrap(), 64 * 1024);
        assert_eq!(parse_splitsize("4M").unwrap(), 4 * 1024 * 1024);
        assert_eq!(parse_splitsize("2G").unwrap(), 2 * 1024 * 1024 * 1024);
    }

    #[test]
    fn accepts_trailing_b_form() {
        assert_eq!(parse_splitsize("64kB").unwrap(), 64 * 1024);
        assert_eq!(parse_splitsize("4MB").unwrap(), 4 * 1024 * 1024);
    }

    #[test]
    fn rejects_bare_b_suffix() {
        assert!(parse_splitsize("5B").is_err());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_splitsize("abc").is_err());
        assert!(parse_splitsize("").is_err());
        assert!(parse_splitsize("12X").is_err());
    }

    #[test]
    fn rejects_overflow() {
        assert!(parse_splitsize("9223372036854775807G").is_err());
    }

    #[test]
    fn feed_chunk_stops_at_budget_and_reports_eof() {
        let mut input = Input {
            reader: Box::new(BufReader::new(io::Cursor::new(b"a\nb\nc\n".to_vec()))),
            eof: false,
        };
        let mut out = Vec::new();
        let copied = input.feed_chunk(3, &mut out).unwrap();
        assert_eq!(copied, 2); // "a\n" + "b\n" = 4 bytes >= budget 3 after 2 lines
        assert!(!input.is_eof());

        let mut out2 = Vec::new();
        let copied2 = input.feed_chunk(100, &mut out2).unwrap();
        assert_eq!(copied2, 1);
        assert!(input.is_eof());
    }
}
