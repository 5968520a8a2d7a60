use anyhow::Error;
use std::io;

/// Returns `true` if the error originated from a broken pipe, e.g. when the merged
/// table is streamed to stdout and piped into `head`.
#[inline]
pub fn is_broken_pipe(err: &Error) -> bool {
    err.root_cause()
        .downcast_ref::<io::Error>()
        .map(|io_err| io_err.kind() == io::ErrorKind::BrokenPipe)
        .unwrap_or(false)
}
