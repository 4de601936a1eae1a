//! FFmpeg error handling
//!
//! Provides error codes, error conversion, and result types.

use std::ffi::CStr;
use std::fmt;
use std::os::raw::c_int;

// ============================================================================
// FFmpeg Error Codes
// ============================================================================

/// End of file / stream reached
pub const AVERROR_EOF: c_int = fferrtag(b'E', b'O', b'F', b' ');

/// Bitstream filter not found
pub const AVERROR_BSF_NOT_FOUND: c_int = fferrtag(0xF8, b'B', b'S', b'F');

/// Internal bug (should never happen)
pub const AVERROR_BUG: c_int = fferrtag(b'B', b'U', b'G', b'!');

/// Internal bug, alternate tag
pub const AVERROR_BUG2: c_int = fferrtag(b'B', b'U', b'G', b' ');

/// Buffer too small
pub const AVERROR_BUFFER_TOO_SMALL: c_int = fferrtag(b'B', b'U', b'F', b'S');

/// Decoder not found
pub const AVERROR_DECODER_NOT_FOUND: c_int = fferrtag(0xF8, b'D', b'E', b'C');

/// Demuxer not found
pub const AVERROR_DEMUXER_NOT_FOUND: c_int = fferrtag(0xF8, b'D', b'E', b'M');

/// Encoder not found
pub const AVERROR_ENCODER_NOT_FOUND: c_int = fferrtag(0xF8, b'E', b'N', b'C');

/// Exit requested
pub const AVERROR_EXIT: c_int = fferrtag(b'E', b'X', b'I', b'T');

/// Generic error in an external library (also returned when a host callback panics)
pub const AVERROR_EXTERNAL: c_int = fferrtag(b'E', b'X', b'T', b' ');

/// Filter not found
pub const AVERROR_FILTER_NOT_FOUND: c_int = fferrtag(0xF8, b'F', b'I', b'L');

/// Invalid data found
pub const AVERROR_INVALIDDATA: c_int = fferrtag(b'I', b'N', b'D', b'A');

/// Muxer not found
pub const AVERROR_MUXER_NOT_FOUND: c_int = fferrtag(0xF8, b'M', b'U', b'X');

/// Option not found
pub const AVERROR_OPTION_NOT_FOUND: c_int = fferrtag(0xF8, b'O', b'P', b'T');

/// Not yet implemented
pub const AVERROR_PATCHWELCOME: c_int = fferrtag(b'P', b'A', b'W', b'E');

/// Protocol not found
pub const AVERROR_PROTOCOL_NOT_FOUND: c_int = fferrtag(0xF8, b'P', b'R', b'O');

/// Stream not found
pub const AVERROR_STREAM_NOT_FOUND: c_int = fferrtag(0xF8, b'S', b'T', b'R');

/// Unknown error
pub const AVERROR_UNKNOWN: c_int = fferrtag(b'U', b'N', b'K', b'N');

/// Experimental feature
pub const AVERROR_EXPERIMENTAL: c_int = -0x2bb2afa8;

/// Input changed between calls
pub const AVERROR_INPUT_CHANGED: c_int = -0x636e6701;

/// Output changed between calls
pub const AVERROR_OUTPUT_CHANGED: c_int = -0x636e6702;

// POSIX-derived codes: FFmpeg negates errno, so the values follow the platform libc

/// Resource temporarily unavailable (try again)
pub const AVERROR_EAGAIN: c_int = averror(libc::EAGAIN);

/// Out of memory
pub const AVERROR_ENOMEM: c_int = averror(libc::ENOMEM);

/// Invalid argument
pub const AVERROR_EINVAL: c_int = averror(libc::EINVAL);

/// I/O error
pub const AVERROR_EIO: c_int = averror(libc::EIO);

/// Function not implemented
pub const AVERROR_ENOSYS: c_int = averror(libc::ENOSYS);

/// No such file or directory
pub const AVERROR_ENOENT: c_int = averror(libc::ENOENT);

/// Operation not permitted on this stream (e.g. seeking a pipe)
pub const AVERROR_ESPIPE: c_int = averror(libc::ESPIPE);

// ============================================================================
// Error Tag Helpers
// ============================================================================

/// Create FFmpeg error tag from 4 bytes
const fn fferrtag(a: u8, b: u8, c: u8, d: u8) -> c_int {
  -((a as c_int) | ((b as c_int) << 8) | ((c as c_int) << 16) | ((d as c_int) << 24))
}

/// `AVERROR(e)`: FFmpeg's negated errno
#[inline]
pub const fn averror(errno: c_int) -> c_int {
  -errno
}

// ============================================================================
// Error Classification
// ============================================================================

/// Coarse classification of an FFmpeg error code
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
  Eof,
  Again,
  InvalidData,
  DecoderNotFound,
  DemuxerNotFound,
  EncoderNotFound,
  FilterNotFound,
  MuxerNotFound,
  OptionNotFound,
  ProtocolNotFound,
  StreamNotFound,
  BitstreamFilterNotFound,
  OutOfMemory,
  InvalidArgument,
  Io,
  Unsupported,
  Exit,
  External,
  Bug,
  Other,
}

impl ErrorKind {
  pub fn from_code(code: c_int) -> Self {
    match code {
      AVERROR_EOF => Self::Eof,
      AVERROR_EAGAIN => Self::Again,
      AVERROR_INVALIDDATA => Self::InvalidData,
      AVERROR_DECODER_NOT_FOUND => Self::DecoderNotFound,
      AVERROR_DEMUXER_NOT_FOUND => Self::DemuxerNotFound,
      AVERROR_ENCODER_NOT_FOUND => Self::EncoderNotFound,
      AVERROR_FILTER_NOT_FOUND => Self::FilterNotFound,
      AVERROR_MUXER_NOT_FOUND => Self::MuxerNotFound,
      AVERROR_OPTION_NOT_FOUND => Self::OptionNotFound,
      AVERROR_PROTOCOL_NOT_FOUND => Self::ProtocolNotFound,
      AVERROR_STREAM_NOT_FOUND => Self::StreamNotFound,
      AVERROR_BSF_NOT_FOUND => Self::BitstreamFilterNotFound,
      AVERROR_ENOMEM => Self::OutOfMemory,
      AVERROR_EINVAL => Self::InvalidArgument,
      AVERROR_EIO | AVERROR_ENOENT | AVERROR_ESPIPE => Self::Io,
      AVERROR_ENOSYS | AVERROR_PATCHWELCOME | AVERROR_EXPERIMENTAL => Self::Unsupported,
      AVERROR_EXIT => Self::Exit,
      AVERROR_EXTERNAL => Self::External,
      AVERROR_BUG | AVERROR_BUG2 => Self::Bug,
      _ => Self::Other,
    }
  }
}

// ============================================================================
// FFmpeg Error Type
// ============================================================================

/// FFmpeg error with code and the library's own description
#[derive(Clone, PartialEq, Eq)]
pub struct FFmpegError {
  /// Error code (negative)
  pub code: c_int,
  /// Text from av_strerror
  pub description: String,
}

impl FFmpegError {
  /// Create error from FFmpeg error code
  pub fn from_code(code: c_int) -> Self {
    Self {
      code,
      description: get_error_message(code),
    }
  }

  #[inline]
  pub fn kind(&self) -> ErrorKind {
    ErrorKind::from_code(self.code)
  }

  /// Check if this is EAGAIN (resource temporarily unavailable)
  #[inline]
  pub fn is_eagain(&self) -> bool {
    self.code == AVERROR_EAGAIN
  }

  /// Check if this is EOF
  #[inline]
  pub fn is_eof(&self) -> bool {
    self.code == AVERROR_EOF
  }
}

impl fmt::Debug for FFmpegError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("FFmpegError")
      .field("code", &self.code)
      .field("kind", &self.kind())
      .field("description", &self.description)
      .finish()
  }
}

impl fmt::Display for FFmpegError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} (error {})", self.description, self.code)
  }
}

impl std::error::Error for FFmpegError {}

// ============================================================================
// Result Type
// ============================================================================

/// Result type for FFmpeg operations
pub type FFmpegResult<T> = Result<T, FFmpegError>;

// ============================================================================
// Error Checking
// ============================================================================

/// Check FFmpeg return code and convert to Result
///
/// Returns Ok with the value if >= 0, Err with FFmpegError if < 0.
/// Positive values (byte counts, indices) pass through untouched.
#[inline]
pub fn check(ret: c_int) -> FFmpegResult<c_int> {
  if ret < 0 {
    Err(FFmpegError::from_code(ret))
  } else {
    Ok(ret)
  }
}

/// [`check`] for the 64-bit returns of avio_seek / avio_size
#[inline]
pub fn check_i64(ret: i64) -> FFmpegResult<i64> {
  if ret < 0 {
    // AVERROR codes always fit in c_int
    Err(FFmpegError::from_code(ret as c_int))
  } else {
    Ok(ret)
  }
}

/// Check FFmpeg return code, ignoring EAGAIN and EOF
///
/// Returns Ok(Some(value)) if >= 0, Ok(None) if EAGAIN/EOF, Err otherwise
#[inline]
pub fn check_except_eagain_eof(ret: c_int) -> FFmpegResult<Option<c_int>> {
  if ret >= 0 {
    Ok(Some(ret))
  } else if ret == AVERROR_EAGAIN || ret == AVERROR_EOF {
    Ok(None)
  } else {
    Err(FFmpegError::from_code(ret))
  }
}

// ============================================================================
// Error Message Helper
// ============================================================================

/// Get error message for an FFmpeg error code
pub fn get_error_message(code: c_int) -> String {
  let mut buf = [0 as std::os::raw::c_char; 256];
  unsafe {
    if super::avutil::av_strerror(code, buf.as_mut_ptr(), buf.len()) < 0 && buf[0] == 0 {
      return format!("unknown error {}", code);
    }
    CStr::from_ptr(buf.as_ptr()).to_string_lossy().into_owned()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_error_codes() {
    assert!(AVERROR_EOF < 0);
    assert!(AVERROR_EAGAIN < 0);
    assert!(AVERROR_EINVAL < 0);
    assert_eq!(AVERROR_ENOMEM, -libc::ENOMEM);
  }

  #[test]
  fn test_check() {
    assert_eq!(check(0).unwrap(), 0);
    assert_eq!(check(4096).unwrap(), 4096);
    assert!(check(-1).is_err());
    assert!(check(AVERROR_EAGAIN).is_err());
    assert_eq!(check_i64(1 << 40).unwrap(), 1 << 40);
    assert!(check_i64(AVERROR_EOF as i64).is_err());
  }

  #[test]
  fn test_check_except_eagain_eof() {
    assert_eq!(check_except_eagain_eof(0).unwrap(), Some(0));
    assert_eq!(check_except_eagain_eof(AVERROR_EAGAIN).unwrap(), None);
    assert_eq!(check_except_eagain_eof(AVERROR_EOF).unwrap(), None);
    assert!(check_except_eagain_eof(AVERROR_EINVAL).is_err());
  }

  #[test]
  fn test_error_carries_library_description() {
    let err = FFmpegError::from_code(AVERROR_EOF);
    assert_eq!(err.kind(), ErrorKind::Eof);
    assert!(!err.description.is_empty());
    let shown = err.to_string();
    assert!(shown.contains(&err.description));
    assert!(shown.contains(&AVERROR_EOF.to_string()));
  }

  #[test]
  fn test_error_kind_classification() {
    assert_eq!(ErrorKind::from_code(AVERROR_EXTERNAL), ErrorKind::External);
    assert_eq!(ErrorKind::from_code(AVERROR_ENOMEM), ErrorKind::OutOfMemory);
    assert_eq!(ErrorKind::from_code(AVERROR_MUXER_NOT_FOUND), ErrorKind::MuxerNotFound);
    assert_eq!(ErrorKind::from_code(-123456), ErrorKind::Other);
  }
}
