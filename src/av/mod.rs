//! Safe Rust wrappers over the FFmpeg libraries
//!
//! This module provides RAII wrappers around FFmpeg's C structures,
//! non-owning views tied to their parent's lifetime, registry iterators
//! and serde projections for introspection.

pub mod avio_context;
pub mod codec;
pub mod device;
pub mod dictionary;
pub mod enums;
pub mod filter;
pub mod format;
pub mod formats;
pub mod frame;
pub mod io_buffer;
pub mod log;
pub mod options;
pub mod packet;
pub mod stream;
pub mod version;

pub use avio_context::{Callbacks, Capabilities, IoBackend, IoConfig, IoContext};
pub use codec::{Codec, CodecContext, CodecDescriptor};
pub use dictionary::{Dictionary, DictionaryRef};
pub use enums::{
  ChromaLocation, CodecId, ColorPrimaries, ColorRange, ColorSpace, ColorTransfer, FieldOrder,
  MediaType, OptionType, PictureType, PixelFormat, SampleFormat,
};
pub use filter::{
  AudioSourceArgs, Endpoint, Filter, FilterChain, FilterContextMut, FilterContextRef, FilterGraph,
  VideoSourceArgs,
};
pub use format::{
  CustomIo, FormatInfo, InputContext, InputFormat, InputOptions, IoAttachment, LibraryIo,
  OutputContext, OutputFormat, SeekFlags,
};
pub use frame::Frame;
pub use log::LogLevel;
pub use packet::Packet;
pub use stream::{CodecParametersMut, CodecParametersRef, Disposition, Stream, StreamMut};
pub use version::{versions, LibraryVersion, Versions};

use crate::ffi::FFmpegError;
use std::borrow::Cow;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};

/// Safe layer error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("FFmpeg error: {0}")]
  Ffmpeg(#[from] FFmpegError),

  #[error("Failed to allocate {0}")]
  AllocationFailed(&'static str),

  #[error("Invalid argument: {0}")]
  InvalidArgument(String),

  #[error("{kind} not found: {name}")]
  NotFound { kind: &'static str, name: String },

  #[error("Invalid state: {0}")]
  InvalidState(&'static str),

  #[error("JSON serialization failed: {0}")]
  Json(#[from] serde_json::Error),
}

impl Error {
  /// FFmpeg error code, when the error came from the library
  pub fn code(&self) -> Option<i32> {
    match self {
      Error::Ffmpeg(e) => Some(e.code),
      _ => None,
    }
  }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Serialize a projection to a pretty-printed JSON string
pub fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
  Ok(serde_json::to_string_pretty(value)?)
}

// ============================================================================
// String marshalling
// ============================================================================

/// Convert a Rust string for a C call; interior NULs are rejected
pub(crate) fn to_cstring(s: &str) -> Result<CString> {
  CString::new(s).map_err(|_| Error::InvalidArgument(format!("string contains NUL byte: {:?}", s)))
}

/// Borrow a static registry string (codec, format, filter names)
///
/// # Safety
/// `ptr` must be NULL or point to a NUL-terminated string in FFmpeg's static data
pub(crate) unsafe fn static_str(ptr: *const c_char) -> Option<&'static str> {
  if ptr.is_null() {
    return None;
  }
  unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

/// Borrow a string owned by a live FFmpeg object
///
/// # Safety
/// `ptr` must be NULL or valid for `'a`
pub(crate) unsafe fn borrowed_str<'a>(ptr: *const c_char) -> Option<Cow<'a, str>> {
  if ptr.is_null() {
    return None;
  }
  Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy())
}

/// Narrow a size or count to the `int` FFmpeg stores it in
pub(crate) fn to_c_int<T>(value: T, what: &str) -> Result<c_int>
where
  T: Copy + std::fmt::Display + TryInto<c_int>,
{
  value
    .try_into()
    .map_err(|_| Error::InvalidArgument(format!("{} out of range: {}", what, value)))
}

/// Serde helper: skip zero numerics
pub(crate) fn is_zero<T: Default + PartialEq>(value: &T) -> bool {
  *value == T::default()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_error_display_includes_code_and_description() {
    let err: Error = FFmpegError::from_code(crate::ffi::error::AVERROR_EOF).into();
    let shown = err.to_string();
    assert!(shown.contains(&crate::ffi::error::AVERROR_EOF.to_string()));
    assert_eq!(err.code(), Some(crate::ffi::error::AVERROR_EOF));
  }

  #[test]
  fn test_to_cstring_rejects_nul() {
    assert!(to_cstring("a\0b").is_err());
    assert_eq!(to_cstring("wav").unwrap().as_bytes(), b"wav");
  }

  #[test]
  fn test_string_helpers_handle_null() {
    unsafe {
      assert!(static_str(std::ptr::null()).is_none());
      assert!(borrowed_str(std::ptr::null()).is_none());
    }
  }
}
