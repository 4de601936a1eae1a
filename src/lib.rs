#![deny(clippy::all)]

//! Hand-written FFmpeg bindings
//!
//! [`ffi`] declares the C surface (no bindgen) plus a small C shim for
//! struct fields; [`av`] wraps it in RAII handles, borrowed views, a
//! callback-driven custom I/O bridge and serde projections.

// FFmpeg C bindings
pub mod ffi;

// Safe wrappers
pub mod av;

pub use av::{
  versions, Codec, CodecContext, Dictionary, Error, FilterChain, FilterGraph, Frame,
  InputContext, InputOptions, IoBackend, IoContext, LogLevel, OutputContext, Packet, Result,
};

// Keeps the zlib archive on the link line when FFmpeg is linked statically
#[cfg(feature = "static")]
use libz_sys as _;
