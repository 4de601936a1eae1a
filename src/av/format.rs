//! Format contexts for demuxing and muxing
//!
//! [`InputContext`] and [`OutputContext`] own an `AVFormatContext`. Their
//! type parameter records where the bytes go: [`LibraryIo`] lets libavformat
//! open the URL itself, an [`IoContext`] moves a custom I/O bridge into the
//! format context, and `&mut IoContext` lends one for the context's lifetime.
//! Ownership of the bridge is therefore fixed at compile time and teardown
//! never has to guess who frees the pb.

use super::avio_context::{IoBackend, IoContext};
use super::codec::Codec;
use super::dictionary::{Dictionary, DictionaryRef};
use super::enums::{CodecId, MediaType};
use super::options::{OptionClass, OptionTarget};
use super::packet::Packet;
use super::stream::{Stream, StreamInfo, StreamMut};
use super::{borrowed_str, is_zero, static_str, to_cstring, to_json, Error, Result};
use crate::ffi::accessors::{
  fffmt_get_bit_rate, fffmt_get_duration, fffmt_get_flags, fffmt_get_iformat,
  fffmt_get_metadata, fffmt_get_metadata_ptr, fffmt_get_nb_streams, fffmt_get_oformat,
  fffmt_get_oformat_flags, fffmt_get_pb_ptr, fffmt_get_start_time, fffmt_get_stream,
  fffmt_get_url, fffmt_set_flags, fffmt_set_pb, ffiformat_get_extensions, ffiformat_get_flags,
  ffiformat_get_long_name, ffiformat_get_mime_type, ffiformat_get_name,
  ffiformat_get_priv_class, ffoformat_get_audio_codec, ffoformat_get_extensions,
  ffoformat_get_flags, ffoformat_get_long_name, ffoformat_get_mime_type, ffoformat_get_name,
  ffoformat_get_priv_class, ffoformat_get_subtitle_codec, ffoformat_get_video_codec,
};
use crate::ffi::avformat::{
  av_demuxer_iterate, av_dump_format, av_find_best_stream, av_find_input_format,
  av_guess_format, av_interleaved_write_frame, av_muxer_iterate, av_read_frame, av_seek_frame,
  av_write_frame, av_write_trailer, avformat_alloc_context, avformat_alloc_output_context2,
  avformat_close_input, avformat_find_stream_info, avformat_free_context, avformat_new_stream,
  avformat_open_input, avformat_write_header, avio_closep, avio_open,
};
use crate::ffi::avutil::av_dict_set;
use crate::ffi::error::AVERROR_EOF;
use crate::ffi::{
  avfmt_ctx_flag, avfmt_flag, avio_flag, avseek_flag, check, AVFormatContext, AVIOContext,
  AVInputFormat, AVOutputFormat, AV_NOPTS_VALUE, AV_TIME_BASE,
};
use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::mem::ManuallyDrop;
use std::os::raw::{c_int, c_uint, c_void};
use std::ptr::{self, NonNull};

// ============================================================================
// I/O attachment
// ============================================================================

mod sealed {
  pub trait Sealed {}
}

/// Where a format context reads or writes its bytes
///
/// Implemented for [`LibraryIo`], [`IoContext`] (moved into the format
/// context) and `&mut IoContext` (borrowed for its lifetime).
pub trait IoAttachment: sealed::Sealed {
  /// True when the pb is supplied by the caller rather than opened by FFmpeg
  #[doc(hidden)]
  const CUSTOM: bool;

  #[doc(hidden)]
  fn pb(&self) -> *mut AVIOContext;

  #[doc(hidden)]
  fn is_writable(&self) -> bool;
}

/// A caller-supplied I/O bridge
pub trait CustomIo: IoAttachment {}

/// libavformat opens and closes the URL itself
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LibraryIo;

impl sealed::Sealed for LibraryIo {}

impl IoAttachment for LibraryIo {
  const CUSTOM: bool = false;

  fn pb(&self) -> *mut AVIOContext {
    ptr::null_mut()
  }

  fn is_writable(&self) -> bool {
    true
  }
}

impl<B: IoBackend> sealed::Sealed for IoContext<B> {}

impl<B: IoBackend> IoAttachment for IoContext<B> {
  const CUSTOM: bool = true;

  fn pb(&self) -> *mut AVIOContext {
    self.as_ptr()
  }

  fn is_writable(&self) -> bool {
    IoContext::is_writable(self)
  }
}

impl<B: IoBackend> CustomIo for IoContext<B> {}

impl<B: IoBackend> sealed::Sealed for &mut IoContext<B> {}

impl<B: IoBackend> IoAttachment for &mut IoContext<B> {
  const CUSTOM: bool = true;

  fn pb(&self) -> *mut AVIOContext {
    self.as_ptr()
  }

  fn is_writable(&self) -> bool {
    IoContext::is_writable(self)
  }
}

impl<B: IoBackend> CustomIo for &mut IoContext<B> {}

// ============================================================================
// Seek flags
// ============================================================================

/// `AVSEEK_FLAG_*` bits for [`InputContext::seek`]
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SeekFlags(c_int);

impl SeekFlags {
  /// Seek to the nearest keyframe at or before the target
  pub const BACKWARD: Self = Self(avseek_flag::BACKWARD);
  /// The target is a byte offset
  pub const BYTE: Self = Self(avseek_flag::BYTE);
  /// Allow landing on non-keyframes
  pub const ANY: Self = Self(avseek_flag::ANY);
  /// The target is a frame number
  pub const FRAME: Self = Self(avseek_flag::FRAME);

  pub const fn empty() -> Self {
    Self(0)
  }

  pub const fn bits(self) -> c_int {
    self.0
  }

  pub const fn contains(self, other: Self) -> bool {
    self.0 & other.0 == other.0
  }
}

impl std::ops::BitOr for SeekFlags {
  type Output = Self;

  fn bitor(self, rhs: Self) -> Self {
    Self(self.0 | rhs.0)
  }
}

impl fmt::Debug for SeekFlags {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut names = Vec::new();
    for (flag, name) in [
      (Self::BACKWARD, "BACKWARD"),
      (Self::BYTE, "BYTE"),
      (Self::ANY, "ANY"),
      (Self::FRAME, "FRAME"),
    ] {
      if self.contains(flag) && flag.0 != 0 {
        names.push(name);
      }
    }
    write!(f, "SeekFlags({})", names.join(" | "))
  }
}

// ============================================================================
// Format descriptors
// ============================================================================

const FORMAT_FLAG_NAMES: &[(c_int, &str)] = &[
  (avfmt_flag::NOFILE, "nofile"),
  (avfmt_flag::NEEDNUMBER, "neednumber"),
  (avfmt_flag::EXPERIMENTAL, "experimental"),
  (avfmt_flag::SHOW_IDS, "show_ids"),
  (avfmt_flag::GLOBALHEADER, "globalheader"),
  (avfmt_flag::NOTIMESTAMPS, "notimestamps"),
  (avfmt_flag::GENERIC_INDEX, "generic_index"),
  (avfmt_flag::TS_DISCONT, "ts_discont"),
  (avfmt_flag::VARIABLE_FPS, "variable_fps"),
  (avfmt_flag::NODIMENSIONS, "nodimensions"),
  (avfmt_flag::NOSTREAMS, "nostreams"),
  (avfmt_flag::NOBINSEARCH, "nobinsearch"),
  (avfmt_flag::NOGENSEARCH, "nogensearch"),
  (avfmt_flag::NO_BYTE_SEEK, "no_byte_seek"),
  (avfmt_flag::TS_NONSTRICT, "ts_nonstrict"),
  (avfmt_flag::TS_NEGATIVE, "ts_negative"),
  (avfmt_flag::SEEK_TO_PTS, "seek_to_pts"),
];

fn format_flag_names(flags: c_int) -> Vec<&'static str> {
  FORMAT_FLAG_NAMES
    .iter()
    .filter(|(bit, _)| flags & bit != 0)
    .map(|(_, name)| *name)
    .collect()
}

/// Registered demuxer
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct InputFormat {
  ptr: NonNull<AVInputFormat>,
}

// SAFETY: demuxer descriptors are static library data
unsafe impl Send for InputFormat {}
unsafe impl Sync for InputFormat {}

impl InputFormat {
  /// # Safety
  /// `ptr` must be NULL or point to a registered demuxer
  pub unsafe fn from_ptr(ptr: *const AVInputFormat) -> Option<Self> {
    NonNull::new(ptr as *mut AVInputFormat).map(|ptr| Self { ptr })
  }

  #[inline]
  pub fn as_ptr(&self) -> *const AVInputFormat {
    self.ptr.as_ptr()
  }

  /// Look up a demuxer by short name
  pub fn find(name: &str) -> Option<Self> {
    let c_name = to_cstring(name).ok()?;
    unsafe { Self::from_ptr(av_find_input_format(c_name.as_ptr())) }
  }

  /// Comma-separated short names
  pub fn name(&self) -> &'static str {
    unsafe { static_str(ffiformat_get_name(self.as_ptr())) }.unwrap_or("")
  }

  pub fn long_name(&self) -> Option<&'static str> {
    unsafe { static_str(ffiformat_get_long_name(self.as_ptr())) }
  }

  pub fn extensions(&self) -> Option<&'static str> {
    unsafe { static_str(ffiformat_get_extensions(self.as_ptr())) }
  }

  pub fn mime_type(&self) -> Option<&'static str> {
    unsafe { static_str(ffiformat_get_mime_type(self.as_ptr())) }
  }

  /// Raw `AVFMT_*` bits
  pub fn flags(&self) -> c_int {
    unsafe { ffiformat_get_flags(self.as_ptr()) }
  }

  /// Demuxer-private options
  pub fn priv_class(&self) -> Option<OptionClass> {
    unsafe { OptionClass::from_ptr(ffiformat_get_priv_class(self.as_ptr())) }
  }

  pub fn info(&self) -> InputFormatInfo {
    InputFormatInfo {
      name: self.name(),
      long_name: self.long_name(),
      extensions: self.extensions(),
      mime_type: self.mime_type(),
      flags: format_flag_names(self.flags()),
    }
  }
}

impl fmt::Debug for InputFormat {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("InputFormat").field(&self.name()).finish()
  }
}

/// Registered muxer
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct OutputFormat {
  ptr: NonNull<AVOutputFormat>,
}

// SAFETY: muxer descriptors are static library data
unsafe impl Send for OutputFormat {}
unsafe impl Sync for OutputFormat {}

impl OutputFormat {
  /// # Safety
  /// `ptr` must be NULL or point to a registered muxer
  pub unsafe fn from_ptr(ptr: *const AVOutputFormat) -> Option<Self> {
    NonNull::new(ptr as *mut AVOutputFormat).map(|ptr| Self { ptr })
  }

  #[inline]
  pub fn as_ptr(&self) -> *const AVOutputFormat {
    self.ptr.as_ptr()
  }

  /// Look up a muxer by short name
  pub fn find(name: &str) -> Option<Self> {
    Self::guess(Some(name), None, None)
  }

  /// Best match for any combination of short name, file name and MIME type
  pub fn guess(
    short_name: Option<&str>,
    filename: Option<&str>,
    mime_type: Option<&str>,
  ) -> Option<Self> {
    let short_name = short_name.map(to_cstring).transpose().ok()?;
    let filename = filename.map(to_cstring).transpose().ok()?;
    let mime_type = mime_type.map(to_cstring).transpose().ok()?;
    let as_ptr = |s: &Option<std::ffi::CString>| s.as_ref().map_or(ptr::null(), |s| s.as_ptr());
    unsafe {
      Self::from_ptr(av_guess_format(
        as_ptr(&short_name),
        as_ptr(&filename),
        as_ptr(&mime_type),
      ))
    }
  }

  pub fn name(&self) -> &'static str {
    unsafe { static_str(ffoformat_get_name(self.as_ptr())) }.unwrap_or("")
  }

  pub fn long_name(&self) -> Option<&'static str> {
    unsafe { static_str(ffoformat_get_long_name(self.as_ptr())) }
  }

  pub fn extensions(&self) -> Option<&'static str> {
    unsafe { static_str(ffoformat_get_extensions(self.as_ptr())) }
  }

  pub fn mime_type(&self) -> Option<&'static str> {
    unsafe { static_str(ffoformat_get_mime_type(self.as_ptr())) }
  }

  /// Raw `AVFMT_*` bits
  pub fn flags(&self) -> c_int {
    unsafe { ffoformat_get_flags(self.as_ptr()) }
  }

  /// The muxer writes through its own protocol rather than a pb
  pub fn is_nofile(&self) -> bool {
    self.flags() & avfmt_flag::NOFILE != 0
  }

  pub fn audio_codec(&self) -> CodecId {
    CodecId::from_raw(unsafe { ffoformat_get_audio_codec(self.as_ptr()) })
  }

  pub fn video_codec(&self) -> CodecId {
    CodecId::from_raw(unsafe { ffoformat_get_video_codec(self.as_ptr()) })
  }

  pub fn subtitle_codec(&self) -> CodecId {
    CodecId::from_raw(unsafe { ffoformat_get_subtitle_codec(self.as_ptr()) })
  }

  /// Muxer-private options
  pub fn priv_class(&self) -> Option<OptionClass> {
    unsafe { OptionClass::from_ptr(ffoformat_get_priv_class(self.as_ptr())) }
  }

  pub fn info(&self) -> OutputFormatInfo {
    let non_none = |id: CodecId| (!id.is_none()).then_some(id);
    OutputFormatInfo {
      name: self.name(),
      long_name: self.long_name(),
      extensions: self.extensions(),
      mime_type: self.mime_type(),
      audio_codec: non_none(self.audio_codec()),
      video_codec: non_none(self.video_codec()),
      subtitle_codec: non_none(self.subtitle_codec()),
      flags: format_flag_names(self.flags()),
    }
  }
}

impl fmt::Debug for OutputFormat {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("OutputFormat").field(&self.name()).finish()
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct InputFormatInfo {
  pub name: &'static str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub long_name: Option<&'static str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub extensions: Option<&'static str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub mime_type: Option<&'static str>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub flags: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutputFormatInfo {
  pub name: &'static str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub long_name: Option<&'static str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub extensions: Option<&'static str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub mime_type: Option<&'static str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub audio_codec: Option<CodecId>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub video_codec: Option<CodecId>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub subtitle_codec: Option<CodecId>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub flags: Vec<&'static str>,
}

/// Every registered demuxer, in registry order
pub fn demuxers() -> Demuxers {
  Demuxers {
    opaque: ptr::null_mut(),
  }
}

/// Every registered muxer, in registry order
pub fn muxers() -> Muxers {
  Muxers {
    opaque: ptr::null_mut(),
  }
}

pub struct Demuxers {
  opaque: *mut c_void,
}

impl Iterator for Demuxers {
  type Item = InputFormat;

  fn next(&mut self) -> Option<Self::Item> {
    unsafe { InputFormat::from_ptr(av_demuxer_iterate(&mut self.opaque)) }
  }
}

pub struct Muxers {
  opaque: *mut c_void,
}

impl Iterator for Muxers {
  type Item = OutputFormat;

  fn next(&mut self) -> Option<Self::Item> {
    unsafe { OutputFormat::from_ptr(av_muxer_iterate(&mut self.opaque)) }
  }
}

// ============================================================================
// Shared context helpers
// ============================================================================

/// Streams of a format context, in index order
pub struct Streams<'a> {
  ctx: *const AVFormatContext,
  next: c_uint,
  len: c_uint,
  _marker: PhantomData<&'a AVFormatContext>,
}

impl<'a> Streams<'a> {
  fn new(ctx: *const AVFormatContext) -> Self {
    Self {
      ctx,
      next: 0,
      len: unsafe { fffmt_get_nb_streams(ctx) },
      _marker: PhantomData,
    }
  }
}

impl<'a> Iterator for Streams<'a> {
  type Item = Stream<'a>;

  fn next(&mut self) -> Option<Self::Item> {
    while self.next < self.len {
      let st = unsafe { fffmt_get_stream(self.ctx, self.next) };
      self.next += 1;
      if !st.is_null() {
        return Some(unsafe { Stream::from_ptr(st) });
      }
    }
    None
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    let left = (self.len - self.next) as usize;
    (left, Some(left))
  }
}

impl ExactSizeIterator for Streams<'_> {}

fn stream_at<'a>(ctx: *const AVFormatContext, index: usize) -> Option<Stream<'a>> {
  let index = c_uint::try_from(index).ok()?;
  if index >= unsafe { fffmt_get_nb_streams(ctx) } {
    return None;
  }
  let st = unsafe { fffmt_get_stream(ctx, index) };
  (!st.is_null()).then(|| unsafe { Stream::from_ptr(st) })
}

fn nopts(value: i64) -> Option<i64> {
  (value != AV_NOPTS_VALUE).then_some(value)
}

fn log_unused(what: &'static str, options: &Dictionary) {
  if !options.is_empty() {
    tracing::warn!(
      target: "ffbridge::format",
      unused = ?options.keys(),
      "{} options not consumed",
      what
    );
  }
}

/// Serializable snapshot of a format context and its streams
#[derive(Debug, Clone, Serialize)]
pub struct FormatInfo {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub format: Option<&'static str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub format_long_name: Option<&'static str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub url: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub start_time: Option<i64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub duration: Option<i64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub duration_seconds: Option<f64>,
  #[serde(skip_serializing_if = "is_zero")]
  pub bit_rate: i64,
  #[serde(skip_serializing_if = "BTreeMap::is_empty")]
  pub metadata: BTreeMap<String, String>,
  pub streams: Vec<StreamInfo>,
}

impl FormatInfo {
  fn collect(
    ctx: *const AVFormatContext,
    format: Option<&'static str>,
    format_long_name: Option<&'static str>,
  ) -> Self {
    let duration = nopts(unsafe { fffmt_get_duration(ctx) });
    let metadata = unsafe { DictionaryRef::from_ptr(fffmt_get_metadata(ctx)) };
    Self {
      format,
      format_long_name,
      url: unsafe { borrowed_str(fffmt_get_url(ctx)) }.map(Cow::into_owned),
      start_time: nopts(unsafe { fffmt_get_start_time(ctx) }),
      duration,
      duration_seconds: duration.map(|d| d as f64 / AV_TIME_BASE as f64),
      bit_rate: unsafe { fffmt_get_bit_rate(ctx) },
      metadata: metadata
        .iter()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect(),
      streams: Streams::new(ctx).map(|s| s.info()).collect(),
    }
  }
}

// ============================================================================
// Input
// ============================================================================

/// How to open an input
#[derive(Debug)]
pub struct InputOptions {
  pub format: Option<String>,
  pub options: Option<Dictionary>,
  pub find_stream_info: bool,
}

impl Default for InputOptions {
  fn default() -> Self {
    Self {
      format: None,
      options: None,
      find_stream_info: true,
    }
  }
}

impl InputOptions {
  pub fn new() -> Self {
    Self::default()
  }

  /// Force a demuxer instead of probing
  pub fn format(mut self, name: impl Into<String>) -> Self {
    self.format = Some(name.into());
    self
  }

  /// Format and demuxer-private options
  pub fn options(mut self, options: Dictionary) -> Self {
    self.options = Some(options);
    self
  }

  pub fn find_stream_info(mut self, enabled: bool) -> Self {
    self.find_stream_info = enabled;
    self
  }
}

/// Open demuxing session
pub struct InputContext<Io: IoAttachment = LibraryIo> {
  ptr: NonNull<AVFormatContext>,
  io: Io,
}

impl InputContext<LibraryIo> {
  /// Open a URL (file path, protocol URL) through libavformat
  pub fn open(url: &str, options: InputOptions) -> Result<Self> {
    Self::open_impl(Some(url), LibraryIo, options)
  }
}

impl<Io: CustomIo> InputContext<Io> {
  /// Demux from a caller-supplied I/O bridge
  pub fn open_with(io: Io, options: InputOptions) -> Result<Self> {
    Self::open_impl(None, io, options)
  }
}

impl<Io: IoAttachment> InputContext<Io> {
  fn open_impl(url: Option<&str>, io: Io, options: InputOptions) -> Result<Self> {
    let InputOptions {
      format,
      options,
      find_stream_info,
    } = options;

    let input_format = match format.as_deref() {
      Some(name) => Some(InputFormat::find(name).ok_or_else(|| Error::NotFound {
        kind: "demuxer",
        name: name.to_owned(),
      })?),
      None => None,
    };
    let c_url = url.map(to_cstring).transpose()?;

    let mut ctx_ptr: *mut AVFormatContext = ptr::null_mut();
    if Io::CUSTOM {
      ctx_ptr = unsafe { avformat_alloc_context() };
      if ctx_ptr.is_null() {
        return Err(Error::AllocationFailed("AVFormatContext"));
      }
      unsafe {
        fffmt_set_pb(ctx_ptr, io.pb());
        fffmt_set_flags(ctx_ptr, fffmt_get_flags(ctx_ptr) | avfmt_ctx_flag::CUSTOM_IO);
      }
    }

    let mut options = options.unwrap_or_default();
    // Frees ctx_ptr on failure; CUSTOM_IO keeps the pb alive
    check(unsafe {
      avformat_open_input(
        &mut ctx_ptr,
        c_url.as_ref().map_or(ptr::null(), |u| u.as_ptr()),
        input_format.map_or(ptr::null(), |f| f.as_ptr()),
        options.as_mut_slot(),
      )
    })?;
    let ptr = NonNull::new(ctx_ptr).ok_or(Error::AllocationFailed("AVFormatContext"))?;
    log_unused("input", &options);

    let mut ctx = Self { ptr, io };
    if find_stream_info {
      ctx.find_stream_info()?;
    }

    tracing::debug!(
      target: "ffbridge::format",
      format = ctx.format().map(|f| f.name()),
      streams = ctx.nb_streams(),
      custom_io = Io::CUSTOM,
      "opened input"
    );
    Ok(ctx)
  }

  #[inline]
  pub fn as_ptr(&self) -> *const AVFormatContext {
    self.ptr.as_ptr()
  }

  #[inline]
  pub fn as_mut_ptr(&mut self) -> *mut AVFormatContext {
    self.ptr.as_ptr()
  }

  /// Read packets to fill in stream parameters the header lacks
  pub fn find_stream_info(&mut self) -> Result<()> {
    check(unsafe { avformat_find_stream_info(self.as_mut_ptr(), ptr::null_mut()) })?;
    Ok(())
  }

  /// The demuxer in use
  pub fn format(&self) -> Option<InputFormat> {
    unsafe { InputFormat::from_ptr(fffmt_get_iformat(self.as_ptr())) }
  }

  pub fn url(&self) -> Option<Cow<'_, str>> {
    unsafe { borrowed_str(fffmt_get_url(self.as_ptr())) }
  }

  pub fn nb_streams(&self) -> usize {
    unsafe { fffmt_get_nb_streams(self.as_ptr()) as usize }
  }

  pub fn stream(&self, index: usize) -> Option<Stream<'_>> {
    stream_at(self.as_ptr(), index)
  }

  pub fn streams(&self) -> Streams<'_> {
    Streams::new(self.as_ptr())
  }

  /// The stream FFmpeg would pick for `media_type`
  pub fn best_stream(&self, media_type: MediaType) -> Option<Stream<'_>> {
    let index = unsafe {
      av_find_best_stream(
        self.ptr.as_ptr(),
        media_type.as_raw(),
        -1,
        -1,
        ptr::null_mut(),
        0,
      )
    };
    if index < 0 {
      return None;
    }
    self.stream(index as usize)
  }

  /// Read the next packet into `packet`
  ///
  /// Returns Ok(false) at end of input.
  pub fn read_packet(&mut self, packet: &mut Packet) -> Result<bool> {
    packet.unref();
    let ret = unsafe { av_read_frame(self.as_mut_ptr(), packet.as_mut_ptr()) };
    if ret == AVERROR_EOF {
      return Ok(false);
    }
    check(ret)?;
    Ok(true)
  }

  /// Iterate the remaining packets, allocating one per item
  pub fn packets(&mut self) -> Packets<'_, Io> {
    Packets {
      ctx: self,
      done: false,
    }
  }

  /// Seek `stream` (or the default stream, in `AV_TIME_BASE` units) to `timestamp`
  pub fn seek(&mut self, stream: Option<usize>, timestamp: i64, flags: SeekFlags) -> Result<()> {
    let stream_index = match stream {
      Some(index) if index >= self.nb_streams() => {
        return Err(Error::InvalidArgument(format!("no stream at index {}", index)));
      }
      Some(index) => index as c_int,
      None => -1,
    };
    check(unsafe { av_seek_frame(self.as_mut_ptr(), stream_index, timestamp, flags.bits()) })?;
    Ok(())
  }

  /// Duration in `AV_TIME_BASE` units
  pub fn duration(&self) -> Option<i64> {
    nopts(unsafe { fffmt_get_duration(self.as_ptr()) })
  }

  /// Start time in `AV_TIME_BASE` units
  pub fn start_time(&self) -> Option<i64> {
    nopts(unsafe { fffmt_get_start_time(self.as_ptr()) })
  }

  /// Total bit rate in bit/s, 0 if unknown
  pub fn bit_rate(&self) -> i64 {
    unsafe { fffmt_get_bit_rate(self.as_ptr()) }
  }

  pub fn metadata(&self) -> DictionaryRef<'_> {
    unsafe { DictionaryRef::from_ptr(fffmt_get_metadata(self.as_ptr())) }
  }

  /// Print the ffprobe-style summary through av_log
  pub fn dump(&self) {
    let url = self.url().map(|u| u.into_owned()).unwrap_or_default();
    let Ok(c_url) = to_cstring(&url) else { return };
    unsafe { av_dump_format(self.ptr.as_ptr(), 0, c_url.as_ptr(), 0) };
  }

  pub fn info(&self) -> FormatInfo {
    let format = self.format();
    FormatInfo::collect(
      self.as_ptr(),
      format.map(|f| f.name()),
      format.and_then(|f| f.long_name()),
    )
  }

  pub fn to_json(&self) -> Result<String> {
    to_json(&self.info())
  }

  /// Close the input and hand back the I/O attachment
  pub fn into_io(self) -> Io {
    let this = ManuallyDrop::new(self);
    unsafe {
      let mut ptr = this.ptr.as_ptr();
      avformat_close_input(&mut ptr);
      ptr::read(&this.io)
    }
  }
}

impl<Io: IoAttachment> OptionTarget for InputContext<Io> {
  fn option_object(&self) -> *mut c_void {
    self.ptr.as_ptr() as *mut c_void
  }
}

impl<Io: IoAttachment> Drop for InputContext<Io> {
  fn drop(&mut self) {
    // CUSTOM_IO stops avformat_close_input from closing an attached pb
    let mut ptr = self.ptr.as_ptr();
    unsafe { avformat_close_input(&mut ptr) };
  }
}

impl<Io: IoAttachment> fmt::Debug for InputContext<Io> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("InputContext")
      .field("format", &self.format())
      .field("url", &self.url())
      .field("nb_streams", &self.nb_streams())
      .field("custom_io", &Io::CUSTOM)
      .finish()
  }
}

// SAFETY: the context is only used through &mut self; the attachment decides
// whether its pb may follow
unsafe impl<Io: IoAttachment + Send> Send for InputContext<Io> {}

/// Packets read by [`InputContext::packets`]
pub struct Packets<'a, Io: IoAttachment> {
  ctx: &'a mut InputContext<Io>,
  done: bool,
}

impl<Io: IoAttachment> Iterator for Packets<'_, Io> {
  type Item = Result<Packet>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.done {
      return None;
    }
    let mut packet = match Packet::new() {
      Ok(packet) => packet,
      Err(e) => {
        self.done = true;
        return Some(Err(e));
      }
    };
    match self.ctx.read_packet(&mut packet) {
      Ok(true) => Some(Ok(packet)),
      Ok(false) => {
        self.done = true;
        None
      }
      Err(e) => {
        self.done = true;
        Some(Err(e))
      }
    }
  }
}

// ============================================================================
// Output
// ============================================================================

/// Open muxing session
pub struct OutputContext<Io: IoAttachment = LibraryIo> {
  ptr: NonNull<AVFormatContext>,
  io: Io,
  header_written: bool,
  trailer_written: bool,
}

impl OutputContext<LibraryIo> {
  /// Create `path`, guessing the muxer from its extension unless `format` is given
  pub fn create(path: &str, format: Option<&str>) -> Result<Self> {
    let c_path = to_cstring(path)?;
    let mut ctx = Self::alloc(format, Some(&c_path), LibraryIo)?;
    if unsafe { fffmt_get_oformat_flags(ctx.as_ptr()) } & avfmt_flag::NOFILE == 0 {
      check(unsafe {
        avio_open(fffmt_get_pb_ptr(ctx.as_mut_ptr()), c_path.as_ptr(), avio_flag::WRITE)
      })?;
    }
    tracing::debug!(target: "ffbridge::format", path, format = ?ctx.format(), "created output");
    Ok(ctx)
  }
}

impl<Io: CustomIo> OutputContext<Io> {
  /// Mux into a caller-supplied I/O bridge
  ///
  /// `filename_hint` only feeds muxers that derive names from the URL.
  pub fn with_io(io: Io, format: &str, filename_hint: Option<&str>) -> Result<Self> {
    if !io.is_writable() {
      return Err(Error::InvalidArgument("output I/O context must be writable".into()));
    }
    let c_hint = filename_hint.map(to_cstring).transpose()?;
    let mut ctx = Self::alloc(Some(format), c_hint.as_deref(), io)?;
    let pb = ctx.io.pb();
    unsafe {
      fffmt_set_pb(ctx.as_mut_ptr(), pb);
      fffmt_set_flags(ctx.as_mut_ptr(), fffmt_get_flags(ctx.as_ptr()) | avfmt_ctx_flag::CUSTOM_IO);
    }
    Ok(ctx)
  }
}

impl<Io: IoAttachment> OutputContext<Io> {
  fn alloc(format: Option<&str>, filename: Option<&std::ffi::CStr>, io: Io) -> Result<Self> {
    let c_format = format.map(to_cstring).transpose()?;
    let mut ctx_ptr: *mut AVFormatContext = ptr::null_mut();
    check(unsafe {
      avformat_alloc_output_context2(
        &mut ctx_ptr,
        ptr::null(),
        c_format.as_ref().map_or(ptr::null(), |f| f.as_ptr()),
        filename.map_or(ptr::null(), |f| f.as_ptr()),
      )
    })?;
    let ptr = NonNull::new(ctx_ptr).ok_or(Error::AllocationFailed("AVFormatContext"))?;
    Ok(Self {
      ptr,
      io,
      header_written: false,
      trailer_written: false,
    })
  }

  #[inline]
  pub fn as_ptr(&self) -> *const AVFormatContext {
    self.ptr.as_ptr()
  }

  #[inline]
  pub fn as_mut_ptr(&mut self) -> *mut AVFormatContext {
    self.ptr.as_ptr()
  }

  /// The muxer in use
  pub fn format(&self) -> Option<OutputFormat> {
    unsafe { OutputFormat::from_ptr(fffmt_get_oformat(self.as_ptr())) }
  }

  pub fn is_header_written(&self) -> bool {
    self.header_written
  }

  pub fn is_trailer_written(&self) -> bool {
    self.trailer_written
  }

  /// Add a stream; `codec` preloads defaults for that codec
  pub fn add_stream(&mut self, codec: Option<Codec>) -> Result<StreamMut<'_>> {
    if self.header_written {
      return Err(Error::InvalidState("streams cannot be added after the header"));
    }
    let st = unsafe {
      avformat_new_stream(self.as_mut_ptr(), codec.map_or(ptr::null(), |c| c.as_ptr()))
    };
    if st.is_null() {
      return Err(Error::AllocationFailed("AVStream"));
    }
    Ok(unsafe { StreamMut::from_ptr(st) })
  }

  pub fn nb_streams(&self) -> usize {
    unsafe { fffmt_get_nb_streams(self.as_ptr()) as usize }
  }

  pub fn stream(&self, index: usize) -> Option<Stream<'_>> {
    stream_at(self.as_ptr(), index)
  }

  pub fn stream_mut(&mut self, index: usize) -> Option<StreamMut<'_>> {
    let st = stream_at(self.as_ptr(), index)?;
    Some(unsafe { StreamMut::from_ptr(st.as_ptr() as *mut _) })
  }

  pub fn streams(&self) -> Streams<'_> {
    Streams::new(self.as_ptr())
  }

  /// Container-level metadata tag
  pub fn set_metadata(&mut self, key: &str, value: &str) -> Result<()> {
    let key = to_cstring(key)?;
    let value = to_cstring(value)?;
    check(unsafe {
      av_dict_set(fffmt_get_metadata_ptr(self.as_mut_ptr()), key.as_ptr(), value.as_ptr(), 0)
    })?;
    Ok(())
  }

  pub fn metadata(&self) -> DictionaryRef<'_> {
    unsafe { DictionaryRef::from_ptr(fffmt_get_metadata(self.as_ptr())) }
  }

  /// Write the container header; returns the options the muxer did not use
  ///
  /// Muxers may replace stream time bases here.
  pub fn write_header(&mut self, options: Option<Dictionary>) -> Result<Dictionary> {
    if self.header_written {
      return Err(Error::InvalidState("header already written"));
    }
    if self.nb_streams() == 0 {
      return Err(Error::InvalidState("no streams to mux"));
    }
    let mut options = options.unwrap_or_default();
    check(unsafe { avformat_write_header(self.as_mut_ptr(), options.as_mut_slot()) })?;
    self.header_written = true;
    log_unused("muxer", &options);
    Ok(options)
  }

  fn ensure_writing(&self) -> Result<()> {
    if !self.header_written {
      return Err(Error::InvalidState("header not written"));
    }
    if self.trailer_written {
      return Err(Error::InvalidState("trailer already written"));
    }
    Ok(())
  }

  /// Write a packet through the interleaving queue
  ///
  /// Timestamps must be in the stream's time base. The packet is left blank.
  pub fn write_packet(&mut self, packet: &mut Packet) -> Result<()> {
    self.ensure_writing()?;
    check(unsafe { av_interleaved_write_frame(self.as_mut_ptr(), packet.as_mut_ptr()) })?;
    Ok(())
  }

  /// Write a packet straight to the muxer; the caller interleaves
  pub fn write_packet_direct(&mut self, packet: &mut Packet) -> Result<()> {
    self.ensure_writing()?;
    check(unsafe { av_write_frame(self.as_mut_ptr(), packet.as_mut_ptr()) })?;
    Ok(())
  }

  /// Drain the interleaving queue
  pub fn flush(&mut self) -> Result<()> {
    self.ensure_writing()?;
    check(unsafe { av_interleaved_write_frame(self.as_mut_ptr(), ptr::null_mut()) })?;
    Ok(())
  }

  /// Finish the file; a second call is a no-op
  pub fn write_trailer(&mut self) -> Result<()> {
    if !self.header_written {
      return Err(Error::InvalidState("header not written"));
    }
    if self.trailer_written {
      return Ok(());
    }
    // av_write_trailer frees muxer state even when it fails
    self.trailer_written = true;
    check(unsafe { av_write_trailer(self.as_mut_ptr()) })?;
    tracing::debug!(target: "ffbridge::format", format = ?self.format(), "wrote trailer");
    Ok(())
  }

  pub fn info(&self) -> FormatInfo {
    let format = self.format();
    FormatInfo::collect(
      self.as_ptr(),
      format.map(|f| f.name()),
      format.and_then(|f| f.long_name()),
    )
  }

  pub fn to_json(&self) -> Result<String> {
    to_json(&self.info())
  }

  /// Print the output layout through av_log
  pub fn dump(&self) {
    let url = unsafe { borrowed_str(fffmt_get_url(self.as_ptr())) }
      .map(|u| u.into_owned())
      .unwrap_or_default();
    let Ok(c_url) = to_cstring(&url) else { return };
    unsafe { av_dump_format(self.ptr.as_ptr(), 0, c_url.as_ptr(), 1) };
  }

  /// Finish the file if needed, free the context and hand back the I/O attachment
  pub fn into_io(self) -> Result<Io> {
    let mut this = ManuallyDrop::new(self);
    let finished = if this.header_written {
      this.write_trailer()
    } else {
      Ok(())
    };
    let io = unsafe {
      this.release();
      ptr::read(&this.io)
    };
    finished?;
    Ok(io)
  }

  /// Detach or close the pb and free the context
  ///
  /// # Safety
  /// Must run exactly once; `ptr` dangles afterwards.
  unsafe fn release(&mut self) {
    let ctx = self.ptr.as_ptr();
    unsafe {
      if Io::CUSTOM {
        fffmt_set_pb(ctx, ptr::null_mut());
      } else if fffmt_get_oformat_flags(ctx) & avfmt_flag::NOFILE == 0 {
        avio_closep(fffmt_get_pb_ptr(ctx));
      }
      avformat_free_context(ctx);
    }
  }
}

impl<Io: IoAttachment> OptionTarget for OutputContext<Io> {
  fn option_object(&self) -> *mut c_void {
    self.ptr.as_ptr() as *mut c_void
  }
}

impl<Io: IoAttachment> Drop for OutputContext<Io> {
  fn drop(&mut self) {
    if self.header_written && !self.trailer_written {
      if let Err(e) = self.write_trailer() {
        tracing::warn!(target: "ffbridge::format", error = %e, "failed to write trailer on drop");
      }
    }
    unsafe { self.release() };
  }
}

impl<Io: IoAttachment> fmt::Debug for OutputContext<Io> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("OutputContext")
      .field("format", &self.format())
      .field("nb_streams", &self.nb_streams())
      .field("header_written", &self.header_written)
      .field("trailer_written", &self.trailer_written)
      .field("custom_io", &Io::CUSTOM)
      .finish()
  }
}

// SAFETY: see InputContext
unsafe impl<Io: IoAttachment + Send> Send for OutputContext<Io> {}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::av::avio_context::IoConfig;
  use crate::av::codec::CodecContext;
  use crate::av::enums::SampleFormat;
  use crate::av::io_buffer::{ChannelWriter, ReadOnlyBuffer, SharedBuffer};
  use crate::av::stream::Disposition;
  use crate::ffi::AVRational;
  use std::io::SeekFrom;

  const RATE: i32 = 8000;
  const SAMPLES_PER_PACKET: i64 = 800;

  fn add_pcm_stream<Io: IoAttachment>(ctx: &mut OutputContext<Io>) {
    let mut st = ctx.add_stream(None).unwrap();
    st.set_time_base(AVRational::new(1, RATE));
    st.parameters_mut()
      .set_codec_id(CodecId::PCM_S16LE)
      .set_sample_format(SampleFormat::S16)
      .set_sample_rate(RATE as u32)
      .unwrap()
      .set_channels(1)
      .unwrap();
  }

  fn write_tone<Io: IoAttachment>(ctx: &mut OutputContext<Io>, packets: i64) {
    let tb = ctx.stream(0).unwrap().time_base();
    for i in 0..packets {
      let mut pkt = Packet::from_slice(&[0x11; (SAMPLES_PER_PACKET * 2) as usize]).unwrap();
      pkt.set_pts(i * SAMPLES_PER_PACKET);
      pkt.set_dts(i * SAMPLES_PER_PACKET);
      pkt.set_duration(SAMPLES_PER_PACKET);
      pkt.set_key(true);
      pkt.rescale_ts(AVRational::new(1, RATE), tb);
      ctx.write_packet(&mut pkt).unwrap();
    }
  }

  fn total_payload<Io: IoAttachment>(input: &mut InputContext<Io>) -> usize {
    input.packets().map(|p| p.unwrap().size()).sum()
  }

  #[test]
  fn test_format_lookup() {
    let demuxer = InputFormat::find("wav").unwrap();
    assert_eq!(demuxer.name(), "wav");
    let muxer = OutputFormat::find("wav").unwrap();
    assert_eq!(muxer.audio_codec(), CodecId::PCM_S16LE);
    assert!(!muxer.is_nofile());
    assert!(InputFormat::find("no-such-demuxer").is_none());
    assert_eq!(OutputFormat::guess(None, Some("clip.wav"), None), Some(muxer));
  }

  #[test]
  fn test_registry_iteration_is_restartable() {
    let first: Vec<&str> = muxers().map(|f| f.name()).collect();
    let second: Vec<&str> = muxers().map(|f| f.name()).collect();
    assert_eq!(first, second);
    assert!(first.contains(&"wav"));
    assert!(demuxers().any(|f| f.name() == "wav"));
  }

  #[test]
  fn test_output_format_info_json() {
    let value = serde_json::to_value(OutputFormat::find("wav").unwrap().info()).unwrap();
    assert_eq!(value["name"], "wav");
    assert_eq!(value["audio_codec"], "pcm_s16le");
    assert!(value.get("video_codec").is_none());
  }

  #[test]
  fn test_wav_round_trip_through_memory() {
    let store = SharedBuffer::new();
    let config = IoConfig::writable().with_buffer_size(64 * 1024);
    let io = IoContext::new(store.clone(), config).unwrap();

    let mut muxer = OutputContext::with_io(io, "wav", None).unwrap();
    add_pcm_stream(&mut muxer);
    muxer.write_header(None).unwrap();
    write_tone(&mut muxer, 10);
    drop(muxer.into_io().unwrap());

    let bytes = store.to_vec();
    assert_eq!(&bytes[..4], b"RIFF");

    let io = IoContext::reader(ReadOnlyBuffer::new(bytes)).unwrap();
    let mut input = InputContext::open_with(io, InputOptions::new()).unwrap();
    assert_eq!(input.format().unwrap().name(), "wav");
    assert_eq!(input.nb_streams(), 1);
    let duration = input.duration().unwrap();
    assert!((duration - 1_000_000).abs() < 1_000, "duration {}", duration);

    let stream = input.best_stream(MediaType::Audio).unwrap();
    assert_eq!(stream.parameters().codec_id(), CodecId::PCM_S16LE);
    assert_eq!(stream.parameters().sample_rate(), RATE as u32);
    assert_eq!(total_payload(&mut input), 16_000);
  }

  #[test]
  fn test_borrowed_io_outlives_input() {
    let store = SharedBuffer::new();
    {
      let io = IoContext::writer(store.clone()).unwrap();
      let mut muxer = OutputContext::with_io(io, "wav", None).unwrap();
      add_pcm_stream(&mut muxer);
      muxer.write_header(None).unwrap();
      write_tone(&mut muxer, 2);
    }

    let mut io = IoContext::reader(ReadOnlyBuffer::new(store.to_vec())).unwrap();
    {
      let input =
        InputContext::open_with(&mut io, InputOptions::new().format("wav").find_stream_info(false))
          .unwrap();
      assert_eq!(input.nb_streams(), 1);
    }
    io.seek(SeekFrom::Start(0)).unwrap();
    let mut magic = [0u8; 4];
    io.read(&mut magic).unwrap();
    assert_eq!(&magic, b"RIFF");
  }

  fn tone_bytes(packets: i64) -> Vec<u8> {
    let store = SharedBuffer::new();
    let io = IoContext::new(store.clone(), IoConfig::writable()).unwrap();
    let mut muxer = OutputContext::with_io(io, "wav", None).unwrap();
    add_pcm_stream(&mut muxer);
    muxer.write_header(None).unwrap();
    write_tone(&mut muxer, packets);
    drop(muxer.into_io().unwrap());
    store.to_vec()
  }

  #[test]
  fn test_remux_copies_stream_parameters() {
    let io = IoContext::reader(ReadOnlyBuffer::new(tone_bytes(3))).unwrap();
    let mut input = InputContext::open_with(io, InputOptions::new()).unwrap();

    let store = SharedBuffer::new();
    let io = IoContext::new(store.clone(), IoConfig::writable()).unwrap();
    let mut remux = OutputContext::with_io(io, "wav", None).unwrap();
    let in_tb = {
      let src = input.stream(0).unwrap();
      let mut st = remux.add_stream(None).unwrap();
      st.copy_parameters_from(&src).unwrap();
      st.set_time_base(src.time_base());
      st.set_disposition(Disposition::DEFAULT);
      st.set_metadata("language", "eng").unwrap();
      src.time_base()
    };

    let copied = remux.stream(0).unwrap();
    assert_eq!(copied.parameters().codec_id(), CodecId::PCM_S16LE);
    assert_eq!(copied.parameters().sample_rate(), RATE as u32);
    assert_eq!(copied.parameters().channels(), 1);
    assert!(copied.disposition().contains(Disposition::DEFAULT));
    assert_eq!(copied.metadata().get("language").as_deref(), Some("eng"));

    remux.write_header(None).unwrap();
    let out_tb = remux.stream(0).unwrap().time_base();
    let mut pkt = Packet::new().unwrap();
    while input.read_packet(&mut pkt).unwrap() {
      pkt.set_stream_index(0).unwrap();
      pkt.rescale_ts(in_tb, out_tb);
      remux.write_packet(&mut pkt).unwrap();
    }
    drop(remux.into_io().unwrap());

    let io = IoContext::reader(ReadOnlyBuffer::new(store.to_vec())).unwrap();
    let mut output = InputContext::open_with(io, InputOptions::new()).unwrap();
    let stream = output.stream(0).unwrap();
    assert_eq!(stream.parameters().codec_id(), CodecId::PCM_S16LE);
    assert_eq!(stream.parameters().sample_rate(), RATE as u32);
    assert_eq!(total_payload(&mut output), 3 * 1600);
  }

  #[test]
  fn test_extradata_and_parameters_from_context() {
    let (writer, _rx) = ChannelWriter::unbounded();
    let io = IoContext::writer(writer).unwrap();
    let mut muxer = OutputContext::with_io(io, "wav", None).unwrap();
    add_pcm_stream(&mut muxer);

    muxer.stream_mut(0).unwrap().parameters_mut().set_extradata(&[1, 2, 3]).unwrap();
    assert_eq!(muxer.stream(0).unwrap().parameters().extradata(), &[1, 2, 3]);

    muxer.stream_mut(0).unwrap().parameters_mut().set_extradata(&[]).unwrap();
    assert!(muxer.stream(0).unwrap().parameters().extradata().is_empty());

    let mut enc = CodecContext::new(Codec::find_encoder(CodecId::PCM_S16LE).unwrap()).unwrap();
    enc
      .set_sample_format(SampleFormat::S16)
      .set_sample_rate(16_000)
      .unwrap()
      .set_channels(2)
      .unwrap();
    enc.open(None).unwrap();
    muxer.stream_mut(0).unwrap().copy_parameters_from_context(&enc).unwrap();
    let params = muxer.stream(0).unwrap().parameters();
    assert_eq!(params.sample_rate(), 16_000);
    assert_eq!(params.channels(), 2);
  }

  #[test]
  fn test_muxer_state_errors() {
    let (writer, rx) = ChannelWriter::unbounded();
    let io = IoContext::writer(writer).unwrap();
    let mut muxer = OutputContext::with_io(io, "wav", None).unwrap();

    assert!(matches!(muxer.write_header(None), Err(Error::InvalidState(_))));
    let mut pkt = Packet::from_slice(&[0; 4]).unwrap();
    assert!(matches!(muxer.write_packet(&mut pkt), Err(Error::InvalidState(_))));
    assert!(matches!(muxer.write_trailer(), Err(Error::InvalidState(_))));

    add_pcm_stream(&mut muxer);
    muxer.write_header(None).unwrap();
    assert!(matches!(muxer.add_stream(None), Err(Error::InvalidState(_))));
    assert!(matches!(muxer.write_header(None), Err(Error::InvalidState(_))));

    muxer.write_trailer().unwrap();
    muxer.write_trailer().unwrap();
    assert!(matches!(muxer.write_packet(&mut pkt), Err(Error::InvalidState(_))));
    drop(muxer);

    let written: Vec<u8> = rx.try_iter().flatten().collect();
    assert_eq!(&written[..4], b"RIFF");
  }

  #[test]
  fn test_read_only_io_rejected_for_output() {
    let io = IoContext::reader(ReadOnlyBuffer::new(vec![0u8; 4])).unwrap();
    let err = OutputContext::with_io(io, "wav", None).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
  }

  #[test]
  fn test_file_create_then_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tone.wav");
    let path = path.to_str().unwrap();

    let mut muxer = OutputContext::create(path, None).unwrap();
    assert_eq!(muxer.format().unwrap().name(), "wav");
    add_pcm_stream(&mut muxer);
    muxer.set_metadata("title", "tone").unwrap();
    muxer.write_header(None).unwrap();
    write_tone(&mut muxer, 5);
    // Drop writes the trailer
    drop(muxer);

    let mut input = InputContext::open(path, InputOptions::default()).unwrap();
    assert_eq!(input.url().as_deref(), Some(path));
    assert_eq!(input.metadata().get("title").as_deref(), Some("tone"));
    assert_eq!(input.streams().len(), 1);

    let value = serde_json::to_value(input.info()).unwrap();
    assert_eq!(value["format"], "wav");
    assert_eq!(value["streams"][0]["media_type"], "audio");

    input.seek(Some(0), 0, SeekFlags::BACKWARD).unwrap();
    assert_eq!(total_payload(&mut input), 8_000);
  }

  #[test]
  fn test_open_missing_file() {
    let err = InputContext::open("/nonexistent/ffbridge/missing.wav", InputOptions::new())
      .unwrap_err();
    assert_eq!(err.code(), Some(-libc::ENOENT));
  }

  #[test]
  fn test_unknown_demuxer_name() {
    let io = IoContext::reader(ReadOnlyBuffer::new(vec![0u8; 16])).unwrap();
    let options = InputOptions::new().format("no-such-demuxer");
    let err = InputContext::open_with(io, options).unwrap_err();
    assert!(matches!(err, Error::NotFound { kind: "demuxer", .. }));
  }

  #[test]
  fn test_context_options() {
    let io = IoContext::writer(SharedBuffer::new()).unwrap();
    let mut muxer = OutputContext::with_io(io, "wav", None).unwrap();
    muxer.set_option("max_delay", "1000").unwrap();
    assert_eq!(muxer.get_option("max_delay").unwrap(), "1000");
  }

  #[test]
  fn test_seek_flags() {
    let flags = SeekFlags::BACKWARD | SeekFlags::ANY;
    assert!(flags.contains(SeekFlags::ANY));
    assert!(!flags.contains(SeekFlags::BYTE));
    assert_eq!(flags.bits(), 5);
    assert_eq!(format!("{:?}", flags), "SeekFlags(BACKWARD | ANY)");
  }
}
