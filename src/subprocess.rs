//! Spawns one `diff` child per iteration, feeding it both chunks through
//! raw pipes and streaming its normal-format output back line by line.
//!
//! Grounded in geocalc's `lfdiff.c`'s `diff_open`/`diff_close`/
//! `thread_copy_infile_to_outpipe`, with `fork`+`execlp` replaced by
//! `std::process::Command` (the output channel uses `Stdio::piped()`
//! directly; the two input channels still need the `/dev/fd/<n>`
//! path-argument trick `Command` has no native support for, so those two
//! are still raw `libc::pipe` pairs) and POSIX threads replaced by
//! `std::thread::scope`, following the `thread::scope` + `Stdio::piped()`
//! pattern used in `examples/other_examples/.../annotate.rs`.

use std::io::{self, BufRead, BufReader};
use std::os::unix::io::{FromRawFd, RawFd};
use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};
use std::thread;

use crate::chunked_input::Input;
use crate::error::{LfdiffError, Result};

pub struct IterationReport {
    pub lines_a: i64,
    pub lines_b: i64,
}

fn make_pipe() -> Result<(RawFd, RawFd)> {
    let mut fds = [0i32; 2];
    let rc = unsafe { libc::pipe(fds.as_mut_ptr()) };
    if rc != 0 {
        return Err(LfdiffError::Pipe(io::Error::last_os_error()));
    }
    Ok((fds[0], fds[1]))
}

/// Run one iteration: spawn `diff` against up to `splitsize` bytes from each
/// input, calling `on_line` for every line of its normal-format output, and
/// return how many lines each feeder copied.
pub fn run_iteration(
    input_a: &mut Input,
    input_b: &mut Input,
    splitsize: i64,
    mut on_line: impl FnMut(&str) -> Result<()>,
) -> Result<IterationReport> {
    let (read_a, write_a) = make_pipe()?;
    let (read_b, write_b) = make_pipe()?;

    let mut cmd = Command::new("diff");
    cmd.arg(format!("/dev/fd/{read_a}"))
        .arg(format!("/dev/fd/{read_b}"))
        .stdout(Stdio::piped());
    // SAFETY: the closure only closes fds local to this process and is
    // async-signal-safe.
    unsafe {
        cmd.pre_exec(move || {
            libc::close(write_a);
            libc::close(write_b);
            Ok(())
        });
    }
    let mut child = cmd.spawn().map_err(LfdiffError::Spawn)?;

    // The child holds its own copies of the read ends (inherited across
    // fork); the parent has no further use for them.
    unsafe {
        libc::close(read_a);
        libc::close(read_b);
    }

    let mut pipe_a = unsafe { std::fs::File::from_raw_fd(write_a) };
    let mut pipe_b = unsafe { std::fs::File::from_raw_fd(write_b) };

    let stdout = child.stdout.take().expect("stdout was piped");
    let mut out_reader = BufReader::new(stdout);

    let report = thread::scope(|scope| -> Result<IterationReport> {
        let feeder_a = scope.spawn(move || input_a.feed_chunk(splitsize, &mut pipe_a));
        let feeder_b = scope.spawn(move || input_b.feed_chunk(splitsize, &mut pipe_b));

        let mut line = String::new();
        loop {
            line.clear();
            let n = out_reader.read_line(&mut line).map_err(LfdiffError::Io)?;
            if n == 0 {
                break;
            }
            on_line(&line)?;
        }

        let lines_a = join_feeder(feeder_a, "A")?;
        let lines_b = join_feeder(feeder_b, "B")?;
        Ok(IterationReport { lines_a, lines_b })
    })?;

    let status = child.wait().map_err(LfdiffError::Io)?;
    match status.code() {
        Some(0) | Some(1) => {}
        Some(other) => return Err(LfdiffError::AbnormalExit(other)),
        None => return Err(LfdiffError::KilledBySignal),
    }

    Ok(report)
}

fn join_feeder(
    handle: thread::ScopedJoinHandle<io::Result<i64>>,
    side: &'static str,
) -> Result<i64> {
    handle
        .join()
        .unwrap_or_else(|_| Err(io::Error::other(format!("feeder {side} panicked"))))
        .map_err(|source| LfdiffError::Feeder { side, source })
}
