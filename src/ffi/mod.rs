//! Hand-written FFmpeg C bindings (no bindgen)
//!
//! All FFmpeg structs are opaque - fields are reached via the thin C accessor
//! library in `accessors.c`. Requires FFmpeg 6.0 or newer.

pub mod accessors;
pub mod avcodec;
pub mod avdevice;
pub mod avfilter;
pub mod avformat;
pub mod avutil;
pub mod error;
pub mod types;

pub use error::{check, check_i64, ErrorKind, FFmpegError, FFmpegResult};
pub use types::*;
