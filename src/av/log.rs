//! FFmpeg log level control and the av_log to tracing bridge
//!
//! Once [`install_tracing_bridge`] runs, every line FFmpeg would print to
//! stderr is emitted as a `tracing` event with target `ffmpeg`, at the level
//! matching its `AV_LOG_*` severity.

use super::Error;
use crate::ffi::accessors::{fflog_install, fflog_restore_default};
use crate::ffi::avutil::{av_log_get_level, av_log_set_level};
use crate::ffi::log_level;
use serde::Serialize;
use std::ffi::CStr;
use std::fmt;
use std::os::raw::{c_char, c_int};
use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;

/// `AV_LOG_*` severities, quietest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
  Quiet,
  Panic,
  Fatal,
  Error,
  Warning,
  Info,
  Verbose,
  Debug,
  Trace,
}

impl LogLevel {
  pub const ALL: &'static [LogLevel] = &[
    LogLevel::Quiet,
    LogLevel::Panic,
    LogLevel::Fatal,
    LogLevel::Error,
    LogLevel::Warning,
    LogLevel::Info,
    LogLevel::Verbose,
    LogLevel::Debug,
    LogLevel::Trace,
  ];

  pub const fn as_raw(self) -> c_int {
    match self {
      LogLevel::Quiet => log_level::QUIET,
      LogLevel::Panic => log_level::PANIC,
      LogLevel::Fatal => log_level::FATAL,
      LogLevel::Error => log_level::ERROR,
      LogLevel::Warning => log_level::WARNING,
      LogLevel::Info => log_level::INFO,
      LogLevel::Verbose => log_level::VERBOSE,
      LogLevel::Debug => log_level::DEBUG,
      LogLevel::Trace => log_level::TRACE,
    }
  }

  /// Most verbose level not above `raw`; values between the named steps round down
  pub fn from_raw(raw: c_int) -> Self {
    Self::ALL
      .iter()
      .rev()
      .copied()
      .find(|level| level.as_raw() <= raw)
      .unwrap_or(LogLevel::Quiet)
  }

  pub const fn name(self) -> &'static str {
    match self {
      LogLevel::Quiet => "quiet",
      LogLevel::Panic => "panic",
      LogLevel::Fatal => "fatal",
      LogLevel::Error => "error",
      LogLevel::Warning => "warning",
      LogLevel::Info => "info",
      LogLevel::Verbose => "verbose",
      LogLevel::Debug => "debug",
      LogLevel::Trace => "trace",
    }
  }
}

impl fmt::Display for LogLevel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for LogLevel {
  type Err = Error;

  /// Accepts the names `ffmpeg -loglevel` takes, plus `warn`
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let lower = s.trim().to_ascii_lowercase();
    if lower == "warn" {
      return Ok(LogLevel::Warning);
    }
    Self::ALL
      .iter()
      .copied()
      .find(|level| level.name() == lower)
      .ok_or_else(|| Error::InvalidArgument(format!("unknown log level: {:?}", s)))
  }
}

/// Messages above `level` are discarded by FFmpeg before formatting
pub fn set_level(level: LogLevel) {
  unsafe { av_log_set_level(level.as_raw()) }
}

pub fn level() -> LogLevel {
  LogLevel::from_raw(unsafe { av_log_get_level() })
}

/// Route av_log output into `tracing`
///
/// The bridge is process-wide; installing it twice is harmless.
pub fn install_tracing_bridge() {
  unsafe { fflog_install(log_sink) };
}

/// Give av_log back its default stderr printer
pub fn restore_default() {
  unsafe { fflog_restore_default() };
}

fn emit(level: c_int, line: &str) {
  match LogLevel::from_raw(level) {
    LogLevel::Quiet => {}
    LogLevel::Panic | LogLevel::Fatal | LogLevel::Error => {
      tracing::error!(target: "ffmpeg", "{}", line)
    }
    LogLevel::Warning => tracing::warn!(target: "ffmpeg", "{}", line),
    LogLevel::Info => tracing::info!(target: "ffmpeg", "{}", line),
    LogLevel::Verbose | LogLevel::Debug => tracing::debug!(target: "ffmpeg", "{}", line),
    LogLevel::Trace => tracing::trace!(target: "ffmpeg", "{}", line),
  }
}

unsafe extern "C" fn log_sink(level: c_int, line: *const c_char) {
  if line.is_null() {
    return;
  }
  let text = unsafe { CStr::from_ptr(line) }.to_string_lossy();
  let text = text.trim_end_matches(['\n', '\r']);
  if text.is_empty() {
    return;
  }
  // A panicking subscriber must not unwind into libav*
  let _ = panic::catch_unwind(AssertUnwindSafe(|| emit(level, text)));
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ffi::avutil::av_log;
  use std::ffi::CString;
  use std::io;
  use std::sync::{Arc, Mutex};

  #[derive(Clone, Default)]
  struct Capture(Arc<Mutex<Vec<u8>>>);

  impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
      self.0.lock().unwrap().extend_from_slice(buf);
      Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
      Ok(())
    }
  }

  fn captured(level: c_int, line: &str) -> String {
    let capture = Capture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
      .with_writer(move || writer.clone())
      .with_max_level(tracing::Level::TRACE)
      .with_ansi(false)
      .finish();
    let line = CString::new(line).unwrap();
    tracing::subscriber::with_default(subscriber, || unsafe { log_sink(level, line.as_ptr()) });
    let bytes = capture.0.lock().unwrap().clone();
    String::from_utf8(bytes).unwrap()
  }

  #[test]
  fn test_parse_level_names() {
    assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warning);
    assert_eq!("WARN".parse::<LogLevel>().unwrap(), LogLevel::Warning);
    assert_eq!(" debug ".parse::<LogLevel>().unwrap(), LogLevel::Debug);
    assert!("loud".parse::<LogLevel>().is_err());
  }

  #[test]
  fn test_raw_levels_round_down() {
    for level in LogLevel::ALL {
      assert_eq!(LogLevel::from_raw(level.as_raw()), *level);
    }
    assert_eq!(LogLevel::from_raw(log_level::INFO + 3), LogLevel::Info);
    assert_eq!(LogLevel::from_raw(-100), LogLevel::Quiet);
  }

  // Serialises tests that change the process-wide level
  static LEVEL: Mutex<()> = Mutex::new(());

  #[test]
  fn test_set_level_is_read_back() {
    let _guard = LEVEL.lock().unwrap();
    let previous = level();
    set_level(LogLevel::Error);
    assert_eq!(level(), LogLevel::Error);
    set_level(previous);
  }

  #[test]
  fn test_sink_maps_severity() {
    let out = captured(log_level::WARNING, "[wav @ 0x1] odd chunk\n");
    assert!(out.contains("WARN"));
    assert!(out.contains("ffmpeg"));
    assert!(out.contains("odd chunk"));

    let out = captured(log_level::ERROR, "broken");
    assert!(out.contains("ERROR"));
  }

  #[test]
  fn test_sink_skips_blank_lines() {
    assert!(captured(log_level::INFO, "\n").is_empty());
  }

  #[test]
  fn test_reinstall_while_other_threads_log() {
    let _guard = LEVEL.lock().unwrap();
    let previous = level();
    set_level(LogLevel::Quiet);

    let fmt = CString::new("%s\n").unwrap();
    let text = CString::new("concurrent line").unwrap();
    std::thread::scope(|scope| {
      for _ in 0..4 {
        scope.spawn(|| {
          for _ in 0..500 {
            let null = std::ptr::null_mut();
            unsafe { av_log(null, log_level::ERROR, fmt.as_ptr(), text.as_ptr()) };
          }
        });
      }
      for _ in 0..500 {
        install_tracing_bridge();
        restore_default();
      }
    });

    restore_default();
    set_level(previous);
  }

  #[test]
  fn test_bridge_install_and_restore() {
    install_tracing_bridge();
    install_tracing_bridge();
    restore_default();
  }
}
