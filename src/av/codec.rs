//! Codec registry entries and codec contexts
//!
//! [`Codec`] and [`CodecDescriptor`] point into libavcodec's static tables.
//! [`CodecContext`] owns an `AVCodecContext` and drives the
//! send/receive encode and decode loops.

use super::dictionary::Dictionary;
use super::enums::{CodecId, MediaType, PixelFormat, SampleFormat};
use super::frame::Frame;
use super::options::{OptionClass, OptionTarget};
use super::packet::Packet;
use super::stream::{CodecParametersMut, CodecParametersRef};
use super::{static_str, to_c_int, to_cstring, Error, Result};
use crate::ffi::accessors::{
  ffcodec_get_capabilities, ffcodec_get_id, ffcodec_get_long_name, ffcodec_get_name,
  ffcodec_get_priv_class, ffcodec_get_type, ffcodec_get_wrapper_name, ffcodecdesc_get_id,
  ffcodecdesc_get_long_name, ffcodecdesc_get_name, ffcodecdesc_get_props, ffcodecdesc_get_type,
  ffctx_get_bit_rate, ffctx_get_channels, ffctx_get_codec_id, ffctx_get_codec_type,
  ffctx_get_flags, ffctx_get_frame_size, ffctx_get_height, ffctx_get_pix_fmt,
  ffctx_get_sample_fmt, ffctx_get_sample_rate, ffctx_get_time_base, ffctx_get_width,
  ffctx_set_bit_rate, ffctx_set_channels, ffctx_set_flags, ffctx_set_framerate,
  ffctx_set_gop_size, ffctx_set_height, ffctx_set_pix_fmt, ffctx_set_sample_fmt,
  ffctx_set_sample_rate, ffctx_set_thread_count, ffctx_set_time_base, ffctx_set_width,
};
use crate::ffi::avcodec::{
  av_codec_is_decoder, av_codec_is_encoder, av_codec_iterate, avcodec_alloc_context3,
  avcodec_descriptor_get, avcodec_descriptor_next, avcodec_find_decoder,
  avcodec_find_decoder_by_name, avcodec_find_encoder, avcodec_find_encoder_by_name,
  avcodec_flush_buffers, avcodec_free_context, avcodec_is_open, avcodec_open2,
  avcodec_parameters_from_context, avcodec_parameters_to_context, avcodec_receive_frame,
  avcodec_receive_packet, avcodec_send_frame, avcodec_send_packet,
};
use crate::ffi::error::{check_except_eagain_eof, AVERROR_EAGAIN};
use crate::ffi::{
  check, codec_cap, codec_prop, AVCodec, AVCodecContext, AVCodecDescriptor, AVRational,
};
use serde::Serialize;
use std::fmt;
use std::os::raw::{c_int, c_void};
use std::ptr::{self, NonNull};

const CAPABILITY_NAMES: &[(c_int, &str)] = &[
  (codec_cap::DRAW_HORIZ_BAND, "draw_horiz_band"),
  (codec_cap::DR1, "dr1"),
  (codec_cap::DELAY, "delay"),
  (codec_cap::SMALL_LAST_FRAME, "small_last_frame"),
  (codec_cap::SUBFRAMES, "subframes"),
  (codec_cap::EXPERIMENTAL, "experimental"),
  (codec_cap::CHANNEL_CONF, "channel_conf"),
  (codec_cap::FRAME_THREADS, "frame_threads"),
  (codec_cap::SLICE_THREADS, "slice_threads"),
  (codec_cap::PARAM_CHANGE, "param_change"),
  (codec_cap::OTHER_THREADS, "other_threads"),
  (codec_cap::VARIABLE_FRAME_SIZE, "variable_frame_size"),
  (codec_cap::AVOID_PROBING, "avoid_probing"),
  (codec_cap::HARDWARE, "hardware"),
  (codec_cap::HYBRID, "hybrid"),
  (codec_cap::ENCODER_REORDERED_OPAQUE, "encoder_reordered_opaque"),
  (codec_cap::ENCODER_FLUSH, "encoder_flush"),
];

const PROP_NAMES: &[(c_int, &str)] = &[
  (codec_prop::INTRA_ONLY, "intra_only"),
  (codec_prop::LOSSY, "lossy"),
  (codec_prop::LOSSLESS, "lossless"),
  (codec_prop::REORDER, "reorder"),
  (codec_prop::FIELDS, "fields"),
  (codec_prop::BITMAP_SUB, "bitmap_sub"),
  (codec_prop::TEXT_SUB, "text_sub"),
];

fn flag_names(bits: c_int, table: &[(c_int, &'static str)]) -> Vec<&'static str> {
  table
    .iter()
    .filter(|(bit, _)| bits & bit != 0)
    .map(|(_, name)| *name)
    .collect()
}

// ============================================================================
// Codec
// ============================================================================

/// Encoder or decoder implementation registered in libavcodec
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Codec {
  ptr: NonNull<AVCodec>,
}

// SAFETY: codecs are immutable static registry entries
unsafe impl Send for Codec {}
unsafe impl Sync for Codec {}

impl Codec {
  /// # Safety
  /// `ptr` must be NULL or a codec returned by libavcodec
  pub unsafe fn from_ptr(ptr: *const AVCodec) -> Option<Self> {
    NonNull::new(ptr as *mut AVCodec).map(|ptr| Self { ptr })
  }

  #[inline]
  pub fn as_ptr(&self) -> *const AVCodec {
    self.ptr.as_ptr()
  }

  /// Preferred encoder for `id`
  pub fn find_encoder(id: CodecId) -> Option<Self> {
    unsafe { Self::from_ptr(avcodec_find_encoder(id.as_raw())) }
  }

  /// Preferred decoder for `id`
  pub fn find_decoder(id: CodecId) -> Option<Self> {
    unsafe { Self::from_ptr(avcodec_find_decoder(id.as_raw())) }
  }

  /// Encoder by implementation name (e.g. "libx264", "pcm_s16le")
  pub fn find_encoder_by_name(name: &str) -> Option<Self> {
    let c_name = to_cstring(name).ok()?;
    unsafe { Self::from_ptr(avcodec_find_encoder_by_name(c_name.as_ptr())) }
  }

  pub fn find_decoder_by_name(name: &str) -> Option<Self> {
    let c_name = to_cstring(name).ok()?;
    unsafe { Self::from_ptr(avcodec_find_decoder_by_name(c_name.as_ptr())) }
  }

  pub fn name(&self) -> &'static str {
    unsafe { static_str(ffcodec_get_name(self.as_ptr())) }.unwrap_or("")
  }

  pub fn long_name(&self) -> Option<&'static str> {
    unsafe { static_str(ffcodec_get_long_name(self.as_ptr())) }
  }

  /// External library or hardware API the codec wraps, if any
  pub fn wrapper_name(&self) -> Option<&'static str> {
    unsafe { static_str(ffcodec_get_wrapper_name(self.as_ptr())) }
  }

  pub fn media_type(&self) -> MediaType {
    MediaType::from_raw(unsafe { ffcodec_get_type(self.as_ptr()) }).unwrap_or(MediaType::Unknown)
  }

  pub fn id(&self) -> CodecId {
    CodecId::from_raw(unsafe { ffcodec_get_id(self.as_ptr()) })
  }

  pub fn is_encoder(&self) -> bool {
    unsafe { av_codec_is_encoder(self.as_ptr()) != 0 }
  }

  pub fn is_decoder(&self) -> bool {
    unsafe { av_codec_is_decoder(self.as_ptr()) != 0 }
  }

  /// Raw `AV_CODEC_CAP_*` bits
  pub fn capabilities(&self) -> c_int {
    unsafe { ffcodec_get_capabilities(self.as_ptr()) }
  }

  /// Class of the codec's private options
  pub fn priv_class(&self) -> Option<OptionClass> {
    unsafe { OptionClass::from_ptr(ffcodec_get_priv_class(self.as_ptr())) }
  }

  pub fn descriptor(&self) -> Option<CodecDescriptor> {
    CodecDescriptor::get(self.id())
  }

  pub fn info(&self) -> CodecInfo {
    CodecInfo {
      name: self.name(),
      long_name: self.long_name(),
      media_type: self.media_type(),
      id: self.id(),
      encoder: self.is_encoder(),
      decoder: self.is_decoder(),
      wrapper: self.wrapper_name(),
      capabilities: flag_names(self.capabilities(), CAPABILITY_NAMES),
    }
  }
}

impl fmt::Debug for Codec {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Codec")
      .field("name", &self.name())
      .field("id", &self.id())
      .field("encoder", &self.is_encoder())
      .finish()
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct CodecInfo {
  pub name: &'static str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub long_name: Option<&'static str>,
  pub media_type: MediaType,
  pub id: CodecId,
  pub encoder: bool,
  pub decoder: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub wrapper: Option<&'static str>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub capabilities: Vec<&'static str>,
}

/// Every registered codec, encoders and decoders alike
pub fn codecs() -> Codecs {
  Codecs {
    opaque: ptr::null_mut(),
  }
}

/// Restartable cursor over `av_codec_iterate`
pub struct Codecs {
  opaque: *mut c_void,
}

impl Iterator for Codecs {
  type Item = Codec;

  fn next(&mut self) -> Option<Self::Item> {
    unsafe { Codec::from_ptr(av_codec_iterate(&mut self.opaque)) }
  }
}

// ============================================================================
// Codec descriptors
// ============================================================================

/// Static properties of a codec ID, independent of any implementation
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct CodecDescriptor {
  ptr: NonNull<AVCodecDescriptor>,
}

unsafe impl Send for CodecDescriptor {}
unsafe impl Sync for CodecDescriptor {}

impl CodecDescriptor {
  pub fn get(id: CodecId) -> Option<Self> {
    let ptr = unsafe { avcodec_descriptor_get(id.as_raw()) };
    NonNull::new(ptr as *mut AVCodecDescriptor).map(|ptr| Self { ptr })
  }

  #[inline]
  pub fn as_ptr(&self) -> *const AVCodecDescriptor {
    self.ptr.as_ptr()
  }

  pub fn id(&self) -> CodecId {
    CodecId::from_raw(unsafe { ffcodecdesc_get_id(self.as_ptr()) })
  }

  pub fn media_type(&self) -> MediaType {
    MediaType::from_raw(unsafe { ffcodecdesc_get_type(self.as_ptr()) })
      .unwrap_or(MediaType::Unknown)
  }

  pub fn name(&self) -> &'static str {
    unsafe { static_str(ffcodecdesc_get_name(self.as_ptr())) }.unwrap_or("")
  }

  pub fn long_name(&self) -> Option<&'static str> {
    unsafe { static_str(ffcodecdesc_get_long_name(self.as_ptr())) }
  }

  /// Raw `AV_CODEC_PROP_*` bits
  pub fn props(&self) -> c_int {
    unsafe { ffcodecdesc_get_props(self.as_ptr()) }
  }

  pub fn info(&self) -> CodecDescriptorInfo {
    CodecDescriptorInfo {
      id: self.id(),
      media_type: self.media_type(),
      name: self.name(),
      long_name: self.long_name(),
      props: flag_names(self.props(), PROP_NAMES),
    }
  }
}

impl fmt::Debug for CodecDescriptor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CodecDescriptor")
      .field("name", &self.name())
      .field("media_type", &self.media_type())
      .finish()
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct CodecDescriptorInfo {
  pub id: CodecId,
  pub media_type: MediaType,
  pub name: &'static str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub long_name: Option<&'static str>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub props: Vec<&'static str>,
}

/// Every codec descriptor, ordered by codec ID
pub fn codec_descriptors() -> CodecDescriptors {
  CodecDescriptors { prev: ptr::null() }
}

/// Restartable cursor over `avcodec_descriptor_next`
pub struct CodecDescriptors {
  prev: *const AVCodecDescriptor,
}

impl Iterator for CodecDescriptors {
  type Item = CodecDescriptor;

  fn next(&mut self) -> Option<Self::Item> {
    let next = unsafe { avcodec_descriptor_next(self.prev) };
    let desc = NonNull::new(next as *mut AVCodecDescriptor)?;
    self.prev = next;
    Some(CodecDescriptor { ptr: desc })
  }
}

// ============================================================================
// Codec context
// ============================================================================

/// Owned `AVCodecContext` bound to one codec
pub struct CodecContext {
  ptr: NonNull<AVCodecContext>,
  codec: Codec,
}

impl CodecContext {
  /// Allocate a context with the codec's defaults
  pub fn new(codec: Codec) -> Result<Self> {
    let ptr = unsafe { avcodec_alloc_context3(codec.as_ptr()) };
    NonNull::new(ptr)
      .map(|ptr| Self { ptr, codec })
      .ok_or(Error::AllocationFailed("AVCodecContext"))
  }

  /// Decoder context pre-filled from stream parameters
  pub fn from_parameters(params: CodecParametersRef<'_>) -> Result<Self> {
    let id = params.codec_id();
    let codec = Codec::find_decoder(id).ok_or_else(|| Error::NotFound {
      kind: "decoder",
      name: id.to_string(),
    })?;
    Self::with_parameters(codec, params)
  }

  /// Context for `codec` pre-filled from stream parameters
  pub fn with_parameters(codec: Codec, params: CodecParametersRef<'_>) -> Result<Self> {
    let mut ctx = Self::new(codec)?;
    check(unsafe { avcodec_parameters_to_context(ctx.as_mut_ptr(), params.as_ptr()) })?;
    Ok(ctx)
  }

  #[inline]
  pub fn as_ptr(&self) -> *const AVCodecContext {
    self.ptr.as_ptr()
  }

  #[inline]
  pub fn as_mut_ptr(&mut self) -> *mut AVCodecContext {
    self.ptr.as_ptr()
  }

  pub fn codec(&self) -> Codec {
    self.codec
  }

  pub fn is_open(&self) -> bool {
    unsafe { avcodec_is_open(self.ptr.as_ptr()) > 0 }
  }

  // ========================================================================
  // Configuration
  // ========================================================================

  pub fn media_type(&self) -> MediaType {
    MediaType::from_raw(unsafe { ffctx_get_codec_type(self.as_ptr()) })
      .unwrap_or(MediaType::Unknown)
  }

  pub fn codec_id(&self) -> CodecId {
    CodecId::from_raw(unsafe { ffctx_get_codec_id(self.as_ptr()) })
  }

  pub fn width(&self) -> u32 {
    unsafe { ffctx_get_width(self.as_ptr()) }.max(0) as u32
  }

  pub fn height(&self) -> u32 {
    unsafe { ffctx_get_height(self.as_ptr()) }.max(0) as u32
  }

  pub fn set_dimensions(&mut self, width: u32, height: u32) -> Result<&mut Self> {
    let (width, height) = (to_c_int(width, "width")?, to_c_int(height, "height")?);
    unsafe {
      ffctx_set_width(self.as_mut_ptr(), width);
      ffctx_set_height(self.as_mut_ptr(), height);
    }
    Ok(self)
  }

  pub fn pixel_format(&self) -> PixelFormat {
    PixelFormat::from_raw(unsafe { ffctx_get_pix_fmt(self.as_ptr()) })
  }

  pub fn set_pixel_format(&mut self, format: PixelFormat) -> &mut Self {
    unsafe { ffctx_set_pix_fmt(self.as_mut_ptr(), format.as_raw()) };
    self
  }

  pub fn sample_format(&self) -> SampleFormat {
    SampleFormat::from_raw(unsafe { ffctx_get_sample_fmt(self.as_ptr()) })
      .unwrap_or(SampleFormat::None)
  }

  pub fn set_sample_format(&mut self, format: SampleFormat) -> &mut Self {
    unsafe { ffctx_set_sample_fmt(self.as_mut_ptr(), format.as_raw()) };
    self
  }

  pub fn sample_rate(&self) -> u32 {
    unsafe { ffctx_get_sample_rate(self.as_ptr()) }.max(0) as u32
  }

  pub fn set_sample_rate(&mut self, sample_rate: u32) -> Result<&mut Self> {
    let sample_rate = to_c_int(sample_rate, "sample rate")?;
    unsafe { ffctx_set_sample_rate(self.as_mut_ptr(), sample_rate) };
    Ok(self)
  }

  pub fn channels(&self) -> u32 {
    unsafe { ffctx_get_channels(self.as_ptr()) }.max(0) as u32
  }

  /// Use the default channel layout for `channels`
  pub fn set_channels(&mut self, channels: u32) -> Result<&mut Self> {
    let channels = to_c_int(channels, "channel count")?;
    unsafe { ffctx_set_channels(self.as_mut_ptr(), channels) };
    Ok(self)
  }

  /// Samples per channel the encoder expects per frame; 0 when unrestricted
  pub fn frame_size(&self) -> u32 {
    unsafe { ffctx_get_frame_size(self.as_ptr()) }.max(0) as u32
  }

  pub fn time_base(&self) -> AVRational {
    let mut tb = AVRational::default();
    unsafe { ffctx_get_time_base(self.as_ptr(), &mut tb.num, &mut tb.den) };
    tb
  }

  pub fn set_time_base(&mut self, time_base: AVRational) -> &mut Self {
    unsafe { ffctx_set_time_base(self.as_mut_ptr(), time_base.num, time_base.den) };
    self
  }

  pub fn set_frame_rate(&mut self, frame_rate: AVRational) -> &mut Self {
    unsafe { ffctx_set_framerate(self.as_mut_ptr(), frame_rate.num, frame_rate.den) };
    self
  }

  pub fn bit_rate(&self) -> i64 {
    unsafe { ffctx_get_bit_rate(self.as_ptr()) }
  }

  pub fn set_bit_rate(&mut self, bit_rate: i64) -> &mut Self {
    unsafe { ffctx_set_bit_rate(self.as_mut_ptr(), bit_rate) };
    self
  }

  pub fn set_gop_size(&mut self, gop_size: u32) -> Result<&mut Self> {
    let gop_size = to_c_int(gop_size, "GOP size")?;
    unsafe { ffctx_set_gop_size(self.as_mut_ptr(), gop_size) };
    Ok(self)
  }

  /// 0 lets the codec pick
  pub fn set_thread_count(&mut self, threads: u32) -> Result<&mut Self> {
    let threads = to_c_int(threads, "thread count")?;
    unsafe { ffctx_set_thread_count(self.as_mut_ptr(), threads) };
    Ok(self)
  }

  /// Raw `AV_CODEC_FLAG_*` bits
  pub fn flags(&self) -> c_int {
    unsafe { ffctx_get_flags(self.as_ptr()) }
  }

  pub fn set_flags(&mut self, flags: c_int) -> &mut Self {
    unsafe { ffctx_set_flags(self.as_mut_ptr(), flags) };
    self
  }

  /// Open the codec
  ///
  /// Entries of `options` the codec did not recognise are logged and
  /// returned.
  pub fn open(&mut self, options: Option<Dictionary>) -> Result<Dictionary> {
    let mut options = options.unwrap_or_default();
    check(unsafe { avcodec_open2(self.as_mut_ptr(), self.codec.as_ptr(), options.as_mut_slot()) })?;
    if !options.is_empty() {
      tracing::warn!(
        target: "ffbridge::codec",
        codec = self.codec.name(),
        unused = ?options.keys(),
        "codec options not consumed"
      );
    }
    Ok(options)
  }

  /// Export the context's settings to stream parameters
  pub fn parameters_into(&self, params: &mut CodecParametersMut<'_>) -> Result<()> {
    check(unsafe { avcodec_parameters_from_context(params.as_mut_ptr(), self.as_ptr()) })?;
    Ok(())
  }

  // ========================================================================
  // Decoding
  // ========================================================================

  /// Send a packet to the decoder; `None` starts draining
  ///
  /// Returns Ok(false) if the decoder is full and frames must be received first
  pub fn send_packet(&mut self, packet: Option<&Packet>) -> Result<bool> {
    let pkt_ptr = packet.map(|p| p.as_ptr()).unwrap_or(ptr::null());
    let ret = unsafe { avcodec_send_packet(self.as_mut_ptr(), pkt_ptr) };
    if ret == AVERROR_EAGAIN {
      return Ok(false);
    }
    check(ret)?;
    Ok(true)
  }

  /// Receive a decoded frame into `frame`
  ///
  /// Returns Ok(false) when more input is needed or the decoder is drained
  pub fn receive_frame(&mut self, frame: &mut Frame) -> Result<bool> {
    let ret = unsafe { avcodec_receive_frame(self.as_mut_ptr(), frame.as_mut_ptr()) };
    Ok(check_except_eagain_eof(ret)?.is_some())
  }

  /// Decode a packet and return all frames that became available
  pub fn decode(&mut self, packet: Option<&Packet>) -> Result<Vec<Frame>> {
    let mut frames = Vec::new();
    send_or_drain(
      self,
      |ctx| ctx.send_packet(packet),
      |ctx| ctx.drain_frames(&mut frames),
      "decoder refused input after draining",
    )?;
    self.drain_frames(&mut frames)?;
    Ok(frames)
  }

  fn drain_frames(&mut self, frames: &mut Vec<Frame>) -> Result<()> {
    loop {
      let mut frame = Frame::new()?;
      if !self.receive_frame(&mut frame)? {
        return Ok(());
      }
      frames.push(frame);
    }
  }

  // ========================================================================
  // Encoding
  // ========================================================================

  /// Send a frame to the encoder; `None` starts draining
  ///
  /// Returns Ok(false) if the encoder is full and packets must be received first
  pub fn send_frame(&mut self, frame: Option<&Frame>) -> Result<bool> {
    let frame_ptr = frame.map(|f| f.as_ptr()).unwrap_or(ptr::null());
    let ret = unsafe { avcodec_send_frame(self.as_mut_ptr(), frame_ptr) };
    if ret == AVERROR_EAGAIN {
      return Ok(false);
    }
    check(ret)?;
    Ok(true)
  }

  /// Receive an encoded packet into `packet`
  ///
  /// Returns Ok(false) when more input is needed or the encoder is drained
  pub fn receive_packet(&mut self, packet: &mut Packet) -> Result<bool> {
    let ret = unsafe { avcodec_receive_packet(self.as_mut_ptr(), packet.as_mut_ptr()) };
    Ok(check_except_eagain_eof(ret)?.is_some())
  }

  /// Encode a frame and return all packets that became available
  pub fn encode(&mut self, frame: Option<&Frame>) -> Result<Vec<Packet>> {
    let mut packets = Vec::new();
    send_or_drain(
      self,
      |ctx| ctx.send_frame(frame),
      |ctx| ctx.drain_packets(&mut packets),
      "encoder refused input after draining",
    )?;
    self.drain_packets(&mut packets)?;
    Ok(packets)
  }

  fn drain_packets(&mut self, packets: &mut Vec<Packet>) -> Result<()> {
    loop {
      let mut packet = Packet::new()?;
      if !self.receive_packet(&mut packet)? {
        return Ok(());
      }
      packets.push(packet);
    }
  }

  /// Reset internal state, discarding buffered data (e.g. after a seek)
  pub fn flush_buffers(&mut self) {
    unsafe { avcodec_flush_buffers(self.as_mut_ptr()) }
  }
}

impl OptionTarget for CodecContext {
  fn option_object(&self) -> *mut c_void {
    self.ptr.as_ptr() as *mut c_void
  }
}

/// Send once; if the codec is full, drain and send again
fn send_or_drain<T>(
  target: &mut T,
  mut send: impl FnMut(&mut T) -> Result<bool>,
  mut drain: impl FnMut(&mut T) -> Result<()>,
  refused: &'static str,
) -> Result<()> {
  if send(target)? {
    return Ok(());
  }
  drain(target)?;
  if send(target)? {
    Ok(())
  } else {
    Err(Error::InvalidState(refused))
  }
}

impl Drop for CodecContext {
  fn drop(&mut self) {
    unsafe {
      let mut ptr = self.ptr.as_ptr();
      avcodec_free_context(&mut ptr);
    }
  }
}

// Codec contexts are used from one thread at a time
unsafe impl Send for CodecContext {}

impl fmt::Debug for CodecContext {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CodecContext")
      .field("codec", &self.codec.name())
      .field("media_type", &self.media_type())
      .field("open", &self.is_open())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_find_pcm_codecs() {
    let enc = Codec::find_encoder(CodecId::PCM_S16LE).unwrap();
    assert_eq!(enc.name(), "pcm_s16le");
    assert!(enc.is_encoder());
    assert!(!enc.is_decoder());
    assert_eq!(enc.media_type(), MediaType::Audio);

    let dec = Codec::find_decoder_by_name("pcm_s16le").unwrap();
    assert!(dec.is_decoder());
    assert_eq!(dec.id(), CodecId::PCM_S16LE);
    assert!(Codec::find_encoder_by_name("no-such-encoder").is_none());
  }

  #[test]
  fn test_codec_iteration_is_restartable() {
    let first: Vec<&str> = codecs().map(|c| c.name()).collect();
    let second: Vec<&str> = codecs().map(|c| c.name()).collect();
    assert!(!first.is_empty());
    assert_eq!(first, second);
    assert!(first.contains(&"rawvideo"));
  }

  #[test]
  fn test_descriptors() {
    let desc = CodecDescriptor::get(CodecId::H264).unwrap();
    assert_eq!(desc.name(), "h264");
    assert_eq!(desc.media_type(), MediaType::Video);
    assert!(desc.info().props.contains(&"lossy"));
    assert!(codec_descriptors().any(|d| d.id() == CodecId::FLAC));
    assert!(CodecDescriptor::get(CodecId::from_raw(-42)).is_none());
  }

  #[test]
  fn test_codec_info_json() {
    let decoder = Codec::find_decoder(CodecId::RAWVIDEO).unwrap();
    let value = serde_json::to_value(decoder.info()).unwrap();
    assert_eq!(value["name"], "rawvideo");
    assert_eq!(value["media_type"], "video");
    assert_eq!(value["id"], "rawvideo");
    assert_eq!(value["decoder"], true);
  }

  fn rawvideo_pair(width: u32, height: u32) -> (CodecContext, CodecContext) {
    let mut enc = CodecContext::new(Codec::find_encoder(CodecId::RAWVIDEO).unwrap()).unwrap();
    enc
      .set_dimensions(width, height)
      .unwrap()
      .set_pixel_format(PixelFormat::YUV420P)
      .set_time_base(AVRational::new(1, 25));
    enc.open(None).unwrap();

    let mut dec = CodecContext::new(Codec::find_decoder(CodecId::RAWVIDEO).unwrap()).unwrap();
    dec
      .set_dimensions(width, height)
      .unwrap()
      .set_pixel_format(PixelFormat::YUV420P);
    dec.open(None).unwrap();
    (enc, dec)
  }

  #[test]
  fn test_rawvideo_encode_decode() {
    let (mut enc, mut dec) = rawvideo_pair(16, 16);
    assert!(enc.is_open());

    let mut frame = Frame::new_video(16, 16, PixelFormat::YUV420P).unwrap();
    frame.plane_mut(0).unwrap().fill(0x80);
    frame.set_pts(0);

    let packets = enc.encode(Some(&frame)).unwrap();
    assert_eq!(packets.len(), 1);
    assert_eq!(packets[0].size(), 16 * 16 * 3 / 2);

    let frames = dec.decode(Some(&packets[0])).unwrap();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].width(), 16);
    assert_eq!(frames[0].pixel_format(), PixelFormat::YUV420P);
    assert_eq!(frames[0].plane(0).unwrap()[0], 0x80);

    assert!(enc.encode(None).unwrap().is_empty());
    assert!(dec.decode(None).unwrap().is_empty());
  }

  #[test]
  fn test_open_returns_unused_options() {
    let mut enc = CodecContext::new(Codec::find_encoder(CodecId::PCM_S16LE).unwrap()).unwrap();
    enc
      .set_sample_format(SampleFormat::S16)
      .set_sample_rate(8000)
      .unwrap()
      .set_channels(1)
      .unwrap();
    let options = Dictionary::from_pairs([("threads", "1"), ("bogus_option", "x")]).unwrap();
    let unused = enc.open(Some(options)).unwrap();
    assert_eq!(unused.keys(), vec!["bogus_option".to_string()]);
    assert_eq!(enc.channels(), 1);
  }

  #[test]
  fn test_send_retries_once_after_draining() {
    let mut drained = 0;
    let mut attempts = 0;
    let result = send_or_drain(
      &mut drained,
      |_| {
        attempts += 1;
        Ok(attempts > 1)
      },
      |n| {
        *n += 1;
        Ok(())
      },
      "refused",
    );
    assert!(result.is_ok());
    assert_eq!(drained, 1);

    let mut drained = 0;
    let result = send_or_drain(
      &mut drained,
      |_| Ok(false),
      |n| {
        *n += 1;
        Ok(())
      },
      "refused",
    );
    assert!(matches!(result, Err(Error::InvalidState("refused"))));
    assert_eq!(drained, 1);
  }

  #[test]
  fn test_setters_reject_values_beyond_int() {
    let mut ctx = CodecContext::new(Codec::find_encoder(CodecId::RAWVIDEO).unwrap()).unwrap();
    assert!(matches!(ctx.set_dimensions(u32::MAX, 16), Err(Error::InvalidArgument(_))));
    assert!(matches!(ctx.set_sample_rate(u32::MAX), Err(Error::InvalidArgument(_))));
    assert!(matches!(ctx.set_thread_count(u32::MAX), Err(Error::InvalidArgument(_))));
    ctx.set_gop_size(12).unwrap();
    assert_eq!(ctx.width(), 0);
  }

  #[test]
  fn test_option_access_on_live_context() {
    let mut enc = CodecContext::new(Codec::find_encoder(CodecId::RAWVIDEO).unwrap()).unwrap();
    enc.set_option("b", "64000").unwrap();
    assert_eq!(enc.bit_rate(), 64_000);
    assert_eq!(enc.get_option("b").unwrap(), "64000");
    let err = enc.set_option("no_such_option", "1").unwrap_err();
    assert_eq!(err.code(), Some(crate::ffi::error::AVERROR_OPTION_NOT_FOUND));
  }

  #[test]
  fn test_open_failure_reports_library_error() {
    // No sample format or rate configured
    let mut enc = CodecContext::new(Codec::find_encoder(CodecId::PCM_S16LE).unwrap()).unwrap();
    let err = enc.open(None).unwrap_err();
    assert!(err.code().unwrap() < 0);
    assert!(!enc.is_open());
  }
}
