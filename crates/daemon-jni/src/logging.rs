//! Logging for the native library.
//!
//! Installs a `tracing` fmt subscriber once per process. On Android each
//! event becomes one logcat entry under the configured tag; host builds
//! write the same lines to stderr.

use std::ffi::{CStr, CString};
use std::io::{self, Write};
use std::os::raw::c_int;
use std::sync::Once;
use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;

// android/log.h priorities
const ANDROID_LOG_VERBOSE: c_int = 2;
const ANDROID_LOG_DEBUG: c_int = 3;
const ANDROID_LOG_INFO: c_int = 4;
const ANDROID_LOG_WARN: c_int = 5;
const ANDROID_LOG_ERROR: c_int = 6;

static INIT: Once = Once::new();

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub tag: &'static CStr,
    pub max_level: Level,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            tag: c"daemon",
            max_level: if cfg!(debug_assertions) {
                Level::DEBUG
            } else {
                Level::INFO
            },
        }
    }
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init(config: &LogConfig) {
    INIT.call_once(|| {
        let installed = tracing_subscriber::fmt()
            .with_max_level(config.max_level)
            .with_writer(Logcat { tag: config.tag })
            .with_ansi(false)
            .without_time()
            .try_init();

        // The hosting process may already own the global subscriber
        if let Err(e) = installed {
            tracing::debug!("Keeping existing subscriber: {}", e);
        }
    });
}

fn priority(level: &Level) -> c_int {
    match *level {
        Level::ERROR => ANDROID_LOG_ERROR,
        Level::WARN => ANDROID_LOG_WARN,
        Level::INFO => ANDROID_LOG_INFO,
        Level::DEBUG => ANDROID_LOG_DEBUG,
        _ => ANDROID_LOG_VERBOSE,
    }
}

#[derive(Debug, Clone, Copy)]
struct Logcat {
    tag: &'static CStr,
}

impl<'a> MakeWriter<'a> for Logcat {
    type Writer = LogcatWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogcatWriter {
            tag: self.tag,
            priority: ANDROID_LOG_INFO,
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        LogcatWriter {
            tag: self.tag,
            priority: priority(meta.level()),
        }
    }
}

/// Writes each formatted event as a single log line
#[derive(Debug)]
pub struct LogcatWriter {
    tag: &'static CStr,
    priority: c_int,
}

impl Write for LogcatWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        let line = text.trim_end_matches('\n').replace('\0', "\u{FFFD}");
        let line = CString::new(line).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        write_line(self.tag, self.priority, &line)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(target_os = "android")]
fn write_line(tag: &CStr, priority: c_int, line: &CStr) -> io::Result<()> {
    use std::os::raw::c_char;

    #[link(name = "log")]
    extern "C" {
        fn __android_log_write(prio: c_int, tag: *const c_char, text: *const c_char) -> c_int;
    }

    // SAFETY: both pointers are NUL-terminated and outlive the call
    let rc = unsafe { __android_log_write(priority, tag.as_ptr(), line.as_ptr()) };
    if rc < 0 {
        return Err(io::Error::from_raw_os_error(-rc));
    }
    Ok(())
}

#[cfg(not(target_os = "android"))]
fn write_line(tag: &CStr, _priority: c_int, line: &CStr) -> io::Result<()> {
    writeln!(
        io::stderr().lock(),
        "{}: {}",
        tag.to_string_lossy(),
        line.to_string_lossy()
    )
}
