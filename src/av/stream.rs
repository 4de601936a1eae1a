//! Stream and codec-parameter views
//!
//! Streams belong to their format context; these views borrow the context and
//! cannot outlive it.

use super::codec::CodecContext;
use super::dictionary::DictionaryRef;
use super::enums::{
  ChromaLocation, CodecId, ColorPrimaries, ColorRange, ColorSpace, ColorTransfer, FieldOrder,
  MediaType, PixelFormat, SampleFormat,
};
use super::{is_zero, static_str, to_c_int, to_cstring, Result};
use crate::ffi::accessors::*;
use crate::ffi::avcodec::{avcodec_parameters_copy, avcodec_parameters_from_context};
use crate::ffi::avformat::{av_disposition_from_string, av_disposition_to_string};
use crate::ffi::avutil::av_dict_set;
use crate::ffi::{
  check, disposition, AVCodecParameters, AVRational, AVStream, AV_NOPTS_VALUE,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::os::raw::{c_char, c_int};

/// `FF_PROFILE_UNKNOWN` / `FF_LEVEL_UNKNOWN`
const UNKNOWN_PROFILE_OR_LEVEL: c_int = -99;

fn timestamp(value: i64) -> Option<i64> {
  (value != AV_NOPTS_VALUE).then_some(value)
}

fn rational(read: impl FnOnce(*mut c_int, *mut c_int)) -> AVRational {
  let mut r = AVRational::default();
  read(&mut r.num, &mut r.den);
  r
}

// ============================================================================
// Disposition
// ============================================================================

/// `AV_DISPOSITION_*` bitset
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Disposition(c_int);

impl Disposition {
  pub const DEFAULT: Self = Self(disposition::DEFAULT);
  pub const DUB: Self = Self(disposition::DUB);
  pub const ORIGINAL: Self = Self(disposition::ORIGINAL);
  pub const COMMENT: Self = Self(disposition::COMMENT);
  pub const FORCED: Self = Self(disposition::FORCED);
  pub const HEARING_IMPAIRED: Self = Self(disposition::HEARING_IMPAIRED);
  pub const VISUAL_IMPAIRED: Self = Self(disposition::VISUAL_IMPAIRED);
  pub const ATTACHED_PIC: Self = Self(disposition::ATTACHED_PIC);
  pub const CAPTIONS: Self = Self(disposition::CAPTIONS);

  pub const fn empty() -> Self {
    Self(0)
  }

  pub const fn from_bits(bits: c_int) -> Self {
    Self(bits)
  }

  pub const fn bits(self) -> c_int {
    self.0
  }

  pub const fn is_empty(&self) -> bool {
    self.0 == 0
  }

  pub const fn contains(self, other: Self) -> bool {
    self.0 & other.0 == other.0
  }

  pub fn insert(&mut self, other: Self) {
    self.0 |= other.0;
  }

  /// Single flag by its libavformat name (`"default"`, `"forced"`, ...)
  pub fn from_name(name: &str) -> Option<Self> {
    let c_name = to_cstring(name).ok()?;
    let bit = unsafe { av_disposition_from_string(c_name.as_ptr()) };
    (bit > 0).then_some(Self(bit))
  }

  /// Names of the set flags, lowest bit first; unnamed bits are skipped
  pub fn names(self) -> Vec<&'static str> {
    (0..c_int::BITS)
      .map(|shift| 1 << shift)
      .filter(|bit| self.0 & bit != 0)
      .filter_map(|bit| unsafe { static_str(av_disposition_to_string(bit)) })
      .collect()
  }
}

impl std::ops::BitOr for Disposition {
  type Output = Self;

  fn bitor(self, rhs: Self) -> Self {
    Self(self.0 | rhs.0)
  }
}

impl fmt::Debug for Disposition {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Disposition({:?})", self.names())
  }
}

impl Serialize for Disposition {
  fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    self.names().serialize(serializer)
  }
}

// ============================================================================
// Codec Parameters
// ============================================================================

/// Read-only view of a stream's `AVCodecParameters`
#[derive(Clone, Copy)]
pub struct CodecParametersRef<'a> {
  ptr: *const AVCodecParameters,
  _marker: PhantomData<&'a AVCodecParameters>,
}

impl<'a> CodecParametersRef<'a> {
  /// # Safety
  /// `ptr` must be non-null and valid for `'a`
  pub unsafe fn from_ptr(ptr: *const AVCodecParameters) -> Self {
    Self {
      ptr,
      _marker: PhantomData,
    }
  }

  pub fn as_ptr(&self) -> *const AVCodecParameters {
    self.ptr
  }

  pub fn media_type(&self) -> MediaType {
    let raw = unsafe { ffcodecpar_get_codec_type(self.ptr) };
    MediaType::from_raw(raw).unwrap_or(MediaType::Unknown)
  }

  pub fn codec_id(&self) -> CodecId {
    CodecId::from_raw(unsafe { ffcodecpar_get_codec_id(self.ptr) })
  }

  pub fn codec_tag(&self) -> u32 {
    unsafe { ffcodecpar_get_codec_tag(self.ptr) }
  }

  /// Raw `format` field; its meaning depends on the media type
  pub fn format_raw(&self) -> c_int {
    unsafe { ffcodecpar_get_format(self.ptr) }
  }

  pub fn pixel_format(&self) -> Option<PixelFormat> {
    (self.media_type() == MediaType::Video)
      .then(|| PixelFormat::from_raw(self.format_raw()))
      .filter(|f| !f.is_none())
  }

  pub fn sample_format(&self) -> Option<SampleFormat> {
    if self.media_type() != MediaType::Audio {
      return None;
    }
    SampleFormat::from_raw(self.format_raw()).filter(|f| !f.is_sentinel())
  }

  pub fn bit_rate(&self) -> i64 {
    unsafe { ffcodecpar_get_bit_rate(self.ptr) }
  }

  pub fn width(&self) -> u32 {
    unsafe { ffcodecpar_get_width(self.ptr) }.max(0) as u32
  }

  pub fn height(&self) -> u32 {
    unsafe { ffcodecpar_get_height(self.ptr) }.max(0) as u32
  }

  pub fn sample_rate(&self) -> u32 {
    unsafe { ffcodecpar_get_sample_rate(self.ptr) }.max(0) as u32
  }

  pub fn channels(&self) -> u32 {
    unsafe { ffcodecpar_get_channels(self.ptr) }.max(0) as u32
  }

  /// Channel layout as described by libavutil (`"stereo"`, `"5.1(side)"`)
  pub fn channel_layout(&self) -> Option<String> {
    if self.channels() == 0 {
      return None;
    }
    let mut buf = [0 as c_char; 128];
    let ret = unsafe { ffcodecpar_describe_ch_layout(self.ptr, buf.as_mut_ptr(), buf.len()) };
    if ret < 0 {
      return None;
    }
    unsafe { super::borrowed_str(buf.as_ptr()) }.map(|s| s.into_owned())
  }

  pub fn frame_size(&self) -> u32 {
    unsafe { ffcodecpar_get_frame_size(self.ptr) }.max(0) as u32
  }

  pub fn profile(&self) -> Option<c_int> {
    let profile = unsafe { ffcodecpar_get_profile(self.ptr) };
    (profile != UNKNOWN_PROFILE_OR_LEVEL).then_some(profile)
  }

  pub fn level(&self) -> Option<c_int> {
    let level = unsafe { ffcodecpar_get_level(self.ptr) };
    (level != UNKNOWN_PROFILE_OR_LEVEL).then_some(level)
  }

  pub fn color_range(&self) -> Option<ColorRange> {
    ColorRange::from_raw(unsafe { ffcodecpar_get_color_range(self.ptr) })
  }

  pub fn color_primaries(&self) -> Option<ColorPrimaries> {
    ColorPrimaries::from_raw(unsafe { ffcodecpar_get_color_primaries(self.ptr) })
  }

  pub fn color_transfer(&self) -> Option<ColorTransfer> {
    ColorTransfer::from_raw(unsafe { ffcodecpar_get_color_trc(self.ptr) })
  }

  pub fn color_space(&self) -> Option<ColorSpace> {
    ColorSpace::from_raw(unsafe { ffcodecpar_get_color_space(self.ptr) })
  }

  pub fn chroma_location(&self) -> Option<ChromaLocation> {
    ChromaLocation::from_raw(unsafe { ffcodecpar_get_chroma_location(self.ptr) })
  }

  pub fn field_order(&self) -> Option<FieldOrder> {
    FieldOrder::from_raw(unsafe { ffcodecpar_get_field_order(self.ptr) })
  }

  pub fn bits_per_coded_sample(&self) -> u32 {
    unsafe { ffcodecpar_get_bits_per_coded_sample(self.ptr) }.max(0) as u32
  }

  pub fn sample_aspect_ratio(&self) -> AVRational {
    rational(|num, den| unsafe { ffcodecpar_get_sample_aspect_ratio(self.ptr, num, den) })
  }

  /// Codec-specific global header (avcC, hvcC, AudioSpecificConfig)
  pub fn extradata(&self) -> &'a [u8] {
    unsafe {
      let data = ffcodecpar_get_extradata(self.ptr);
      let size = ffcodecpar_get_extradata_size(self.ptr);
      if data.is_null() || size <= 0 {
        &[]
      } else {
        std::slice::from_raw_parts(data, size as usize)
      }
    }
  }

  pub fn info(&self) -> CodecParametersInfo {
    let media_type = self.media_type();
    let format = match media_type {
      MediaType::Video => self.pixel_format().map(|f| f.to_string()),
      MediaType::Audio => self.sample_format().map(|f| f.name().to_string()),
      _ => None,
    };
    CodecParametersInfo {
      media_type,
      codec: self.codec_id(),
      codec_tag: self.codec_tag(),
      format,
      bit_rate: self.bit_rate(),
      width: self.width(),
      height: self.height(),
      sample_aspect_ratio: Some(self.sample_aspect_ratio()).filter(|r| !r.is_zero()),
      sample_rate: self.sample_rate(),
      channels: self.channels(),
      channel_layout: self.channel_layout(),
      frame_size: self.frame_size(),
      profile: self.profile(),
      level: self.level(),
      color_range: self.color_range().filter(|v| *v != ColorRange::Unspecified),
      color_primaries: self.color_primaries().filter(|v| *v != ColorPrimaries::Unspecified),
      color_transfer: self.color_transfer().filter(|v| *v != ColorTransfer::Unspecified),
      color_space: self.color_space().filter(|v| *v != ColorSpace::Unspecified),
      chroma_location: self.chroma_location().filter(|v| *v != ChromaLocation::Unspecified),
      field_order: self.field_order().filter(|v| *v != FieldOrder::Unknown),
      extradata_size: self.extradata().len(),
    }
  }
}

impl fmt::Debug for CodecParametersRef<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Debug::fmt(&self.info(), f)
  }
}

/// Mutable view of a stream's `AVCodecParameters`
pub struct CodecParametersMut<'a> {
  ptr: *mut AVCodecParameters,
  _marker: PhantomData<&'a mut AVCodecParameters>,
}

impl<'a> CodecParametersMut<'a> {
  /// # Safety
  /// `ptr` must be non-null, valid and not aliased for `'a`
  pub unsafe fn from_ptr(ptr: *mut AVCodecParameters) -> Self {
    Self {
      ptr,
      _marker: PhantomData,
    }
  }

  pub fn as_ref(&self) -> CodecParametersRef<'_> {
    unsafe { CodecParametersRef::from_ptr(self.ptr) }
  }

  pub fn as_mut_ptr(&mut self) -> *mut AVCodecParameters {
    self.ptr
  }

  pub fn set_media_type(&mut self, media_type: MediaType) -> &mut Self {
    unsafe { ffcodecpar_set_codec_type(self.ptr, media_type.as_raw()) };
    self
  }

  /// Also sets the media type implied by the codec
  pub fn set_codec_id(&mut self, id: CodecId) -> &mut Self {
    unsafe {
      ffcodecpar_set_codec_id(self.ptr, id.as_raw());
      ffcodecpar_set_codec_type(self.ptr, id.media_type().as_raw());
    }
    self
  }

  pub fn set_codec_tag(&mut self, tag: u32) -> &mut Self {
    unsafe { ffcodecpar_set_codec_tag(self.ptr, tag) };
    self
  }

  pub fn set_pixel_format(&mut self, format: PixelFormat) -> &mut Self {
    unsafe { ffcodecpar_set_format(self.ptr, format.as_raw()) };
    self
  }

  pub fn set_sample_format(&mut self, format: SampleFormat) -> &mut Self {
    unsafe { ffcodecpar_set_format(self.ptr, format.as_raw()) };
    self
  }

  pub fn set_bit_rate(&mut self, bit_rate: i64) -> &mut Self {
    unsafe { ffcodecpar_set_bit_rate(self.ptr, bit_rate) };
    self
  }

  pub fn set_dimensions(&mut self, width: u32, height: u32) -> Result<&mut Self> {
    let (width, height) = (to_c_int(width, "width")?, to_c_int(height, "height")?);
    unsafe {
      ffcodecpar_set_width(self.ptr, width);
      ffcodecpar_set_height(self.ptr, height);
    }
    Ok(self)
  }

  pub fn set_sample_rate(&mut self, sample_rate: u32) -> Result<&mut Self> {
    let sample_rate = to_c_int(sample_rate, "sample rate")?;
    unsafe { ffcodecpar_set_sample_rate(self.ptr, sample_rate) };
    Ok(self)
  }

  /// Default channel layout for `channels`
  pub fn set_channels(&mut self, channels: u32) -> Result<&mut Self> {
    let channels = to_c_int(channels, "channel count")?;
    unsafe { ffcodecpar_set_channels(self.ptr, channels) };
    Ok(self)
  }

  pub fn set_frame_size(&mut self, frame_size: u32) -> Result<&mut Self> {
    let frame_size = to_c_int(frame_size, "frame size")?;
    unsafe { ffcodecpar_set_frame_size(self.ptr, frame_size) };
    Ok(self)
  }

  pub fn set_extradata(&mut self, data: &[u8]) -> Result<&mut Self> {
    let size = to_c_int(data.len(), "extradata size")?;
    check(unsafe { ffcodecpar_set_extradata(self.ptr, data.as_ptr(), size) })?;
    Ok(self)
  }

  /// Replace every field with a copy of `src`
  pub fn copy_from(&mut self, src: CodecParametersRef<'_>) -> Result<()> {
    check(unsafe { avcodec_parameters_copy(self.ptr, src.as_ptr()) })?;
    Ok(())
  }

  /// Fill from an opened (or configured) codec context
  pub fn copy_from_context(&mut self, ctx: &CodecContext) -> Result<()> {
    check(unsafe { avcodec_parameters_from_context(self.ptr, ctx.as_ptr()) })?;
    Ok(())
  }
}

// ============================================================================
// Streams
// ============================================================================

/// Non-owning view of an `AVStream`, tied to its format context
#[derive(Clone, Copy)]
pub struct Stream<'a> {
  ptr: *const AVStream,
  _marker: PhantomData<&'a AVStream>,
}

impl<'a> Stream<'a> {
  /// # Safety
  /// `ptr` must be non-null and valid for `'a`
  pub unsafe fn from_ptr(ptr: *const AVStream) -> Self {
    Self {
      ptr,
      _marker: PhantomData,
    }
  }

  pub fn as_ptr(&self) -> *const AVStream {
    self.ptr
  }

  pub fn index(&self) -> usize {
    unsafe { ffstream_get_index(self.ptr) }.max(0) as usize
  }

  /// Format-specific stream ID
  pub fn id(&self) -> c_int {
    unsafe { ffstream_get_id(self.ptr) }
  }

  pub fn time_base(&self) -> AVRational {
    rational(|num, den| unsafe { ffstream_get_time_base(self.ptr, num, den) })
  }

  /// First timestamp in `time_base` units
  pub fn start_time(&self) -> Option<i64> {
    timestamp(unsafe { ffstream_get_start_time(self.ptr) })
  }

  /// Duration in `time_base` units
  pub fn duration(&self) -> Option<i64> {
    timestamp(unsafe { ffstream_get_duration(self.ptr) })
  }

  /// Number of frames if known, otherwise 0
  pub fn nb_frames(&self) -> i64 {
    unsafe { ffstream_get_nb_frames(self.ptr) }
  }

  pub fn avg_frame_rate(&self) -> AVRational {
    rational(|num, den| unsafe { ffstream_get_avg_frame_rate(self.ptr, num, den) })
  }

  pub fn r_frame_rate(&self) -> AVRational {
    rational(|num, den| unsafe { ffstream_get_r_frame_rate(self.ptr, num, den) })
  }

  pub fn sample_aspect_ratio(&self) -> AVRational {
    rational(|num, den| unsafe { ffstream_get_sample_aspect_ratio(self.ptr, num, den) })
  }

  pub fn disposition(&self) -> Disposition {
    Disposition::from_bits(unsafe { ffstream_get_disposition(self.ptr) })
  }

  pub fn metadata(&self) -> DictionaryRef<'a> {
    unsafe { DictionaryRef::from_ptr(ffstream_get_metadata(self.ptr)) }
  }

  pub fn parameters(&self) -> CodecParametersRef<'a> {
    unsafe { CodecParametersRef::from_ptr(ffstream_get_codecpar_const(self.ptr)) }
  }

  pub fn media_type(&self) -> MediaType {
    self.parameters().media_type()
  }

  /// Duration converted to seconds
  pub fn duration_seconds(&self) -> Option<f64> {
    let tb = self.time_base();
    self.duration().map(|d| d as f64 * tb.as_f64())
  }

  pub fn info(&self) -> StreamInfo {
    let avg_frame_rate = self.avg_frame_rate();
    StreamInfo {
      index: self.index(),
      id: self.id(),
      media_type: self.media_type(),
      time_base: self.time_base(),
      start_time: self.start_time(),
      duration: self.duration(),
      duration_seconds: self.duration_seconds(),
      nb_frames: self.nb_frames(),
      avg_frame_rate: (!avg_frame_rate.is_zero()).then_some(avg_frame_rate),
      disposition: self.disposition(),
      metadata: self
        .metadata()
        .iter()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect(),
      codec: self.parameters().info(),
    }
  }
}

impl fmt::Debug for Stream<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Debug::fmt(&self.info(), f)
  }
}

/// Mutable stream view, handed out while building an output context
pub struct StreamMut<'a> {
  ptr: *mut AVStream,
  _marker: PhantomData<&'a mut AVStream>,
}

impl<'a> StreamMut<'a> {
  /// # Safety
  /// `ptr` must be non-null, valid and not aliased for `'a`
  pub unsafe fn from_ptr(ptr: *mut AVStream) -> Self {
    Self {
      ptr,
      _marker: PhantomData,
    }
  }

  pub fn as_ref(&self) -> Stream<'_> {
    unsafe { Stream::from_ptr(self.ptr) }
  }

  pub fn index(&self) -> usize {
    self.as_ref().index()
  }

  pub fn set_id(&mut self, id: c_int) -> &mut Self {
    unsafe { ffstream_set_id(self.ptr, id) };
    self
  }

  /// Time base hint; muxers may replace it in write_header
  pub fn set_time_base(&mut self, time_base: AVRational) -> &mut Self {
    unsafe { ffstream_set_time_base(self.ptr, time_base.num, time_base.den) };
    self
  }

  pub fn set_disposition(&mut self, disposition: Disposition) -> &mut Self {
    unsafe { ffstream_set_disposition(self.ptr, disposition.bits()) };
    self
  }

  pub fn set_metadata(&mut self, key: &str, value: &str) -> Result<&mut Self> {
    let key = to_cstring(key)?;
    let value = to_cstring(value)?;
    check(unsafe {
      av_dict_set(ffstream_get_metadata_ptr(self.ptr), key.as_ptr(), value.as_ptr(), 0)
    })?;
    Ok(self)
  }

  pub fn parameters_mut(&mut self) -> CodecParametersMut<'_> {
    unsafe { CodecParametersMut::from_ptr(ffstream_get_codecpar(self.ptr)) }
  }

  /// Copy codec parameters from another stream (remuxing)
  pub fn copy_parameters_from(&mut self, src: &Stream<'_>) -> Result<&mut Self> {
    self.parameters_mut().copy_from(src.parameters())?;
    Ok(self)
  }

  /// Copy codec parameters from an encoder context
  pub fn copy_parameters_from_context(&mut self, ctx: &CodecContext) -> Result<&mut Self> {
    self.parameters_mut().copy_from_context(ctx)?;
    Ok(self)
  }
}

// ============================================================================
// JSON projections
// ============================================================================

/// Serializable snapshot of codec parameters
#[derive(Debug, Clone, Serialize)]
pub struct CodecParametersInfo {
  pub media_type: MediaType,
  pub codec: CodecId,
  #[serde(skip_serializing_if = "is_zero")]
  pub codec_tag: u32,
  /// Pixel format for video, sample format for audio
  #[serde(skip_serializing_if = "Option::is_none")]
  pub format: Option<String>,
  #[serde(skip_serializing_if = "is_zero")]
  pub bit_rate: i64,
  #[serde(skip_serializing_if = "is_zero")]
  pub width: u32,
  #[serde(skip_serializing_if = "is_zero")]
  pub height: u32,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub sample_aspect_ratio: Option<AVRational>,
  #[serde(skip_serializing_if = "is_zero")]
  pub sample_rate: u32,
  #[serde(skip_serializing_if = "is_zero")]
  pub channels: u32,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub channel_layout: Option<String>,
  #[serde(skip_serializing_if = "is_zero")]
  pub frame_size: u32,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub profile: Option<c_int>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub level: Option<c_int>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub color_range: Option<ColorRange>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub color_primaries: Option<ColorPrimaries>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub color_transfer: Option<ColorTransfer>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub color_space: Option<ColorSpace>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub chroma_location: Option<ChromaLocation>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub field_order: Option<FieldOrder>,
  #[serde(skip_serializing_if = "is_zero")]
  pub extradata_size: usize,
}

/// Serializable snapshot of a stream
#[derive(Debug, Clone, Serialize)]
pub struct StreamInfo {
  pub index: usize,
  #[serde(skip_serializing_if = "is_zero")]
  pub id: c_int,
  pub media_type: MediaType,
  pub time_base: AVRational,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub start_time: Option<i64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub duration: Option<i64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub duration_seconds: Option<f64>,
  #[serde(skip_serializing_if = "is_zero")]
  pub nb_frames: i64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub avg_frame_rate: Option<AVRational>,
  #[serde(skip_serializing_if = "Disposition::is_empty")]
  pub disposition: Disposition,
  #[serde(skip_serializing_if = "BTreeMap::is_empty")]
  pub metadata: BTreeMap<String, String>,
  pub codec: CodecParametersInfo,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_disposition_names() {
    let d = Disposition::DEFAULT | Disposition::FORCED;
    assert!(d.contains(Disposition::DEFAULT));
    assert!(!d.contains(Disposition::DUB));
    assert_eq!(d.names(), vec!["default", "forced"]);
    assert_eq!(serde_json::to_string(&d).unwrap(), r#"["default","forced"]"#);
  }

  #[test]
  fn test_disposition_from_name() {
    assert_eq!(Disposition::from_name("attached_pic"), Some(Disposition::ATTACHED_PIC));
    assert_eq!(Disposition::from_name("no-such-flag"), None);
    assert!(Disposition::empty().names().is_empty());
  }

  #[test]
  fn test_timestamp_filters_nopts() {
    assert_eq!(timestamp(AV_NOPTS_VALUE), None);
    assert_eq!(timestamp(0), Some(0));
  }
}
