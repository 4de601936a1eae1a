//! Safe wrapper around FFmpeg AVFrame
//!
//! Provides RAII-based memory management and safe access to decoded
//! picture planes and audio sample buffers.

use super::enums::{
  ColorPrimaries, ColorRange, ColorSpace, ColorTransfer, PictureType, PixelFormat, SampleFormat,
};
use super::formats::PixelFormatDescriptor;
use super::{is_zero, to_c_int, Error, Result};
use crate::ffi::accessors::{
  ffframe_data, ffframe_get_channels, ffframe_get_color_primaries, ffframe_get_color_range,
  ffframe_get_color_trc, ffframe_get_colorspace, ffframe_get_duration, ffframe_get_format,
  ffframe_get_height, ffframe_get_key_frame, ffframe_get_nb_samples, ffframe_get_pict_type,
  ffframe_get_pts, ffframe_get_sample_rate, ffframe_get_width, ffframe_linesize,
  ffframe_set_channels, ffframe_set_color_primaries, ffframe_set_color_range,
  ffframe_set_color_trc, ffframe_set_colorspace, ffframe_set_duration, ffframe_set_format,
  ffframe_set_height, ffframe_set_key_frame, ffframe_set_nb_samples, ffframe_set_pict_type,
  ffframe_set_pts, ffframe_set_sample_rate, ffframe_set_width,
};
use crate::ffi::avutil::{
  av_frame_alloc, av_frame_clone, av_frame_free, av_frame_get_buffer, av_frame_is_writable,
  av_frame_make_writable, av_frame_unref,
};
use crate::ffi::{check, AVFrame, AV_NOPTS_VALUE, AV_NUM_DATA_POINTERS};
use serde::Serialize;
use std::borrow::Cow;
use std::os::raw::c_int;
use std::ptr::NonNull;

/// Size of the palette plane of paletted formats (256 x RGBA)
const PALETTE_SIZE: usize = 1024;

/// Safe wrapper around AVFrame with RAII cleanup
pub struct Frame {
  ptr: NonNull<AVFrame>,
}

impl Frame {
  /// Allocate a new empty frame
  pub fn new() -> Result<Self> {
    let ptr = unsafe { av_frame_alloc() };
    NonNull::new(ptr)
      .map(|ptr| Self { ptr })
      .ok_or(Error::AllocationFailed("AVFrame"))
  }

  /// Allocate a picture with buffers for the given format and dimensions
  pub fn new_video(width: u32, height: u32, format: PixelFormat) -> Result<Self> {
    if width == 0 || height == 0 {
      return Err(Error::InvalidArgument(format!("invalid frame size {}x{}", width, height)));
    }
    if PixelFormatDescriptor::get(format).is_none() {
      return Err(Error::InvalidArgument(format!("unknown pixel format {}", format)));
    }
    let mut frame = Self::new()?;
    frame.set_dimensions(width, height)?;
    frame.set_pixel_format(format);

    // 32-byte alignment for SIMD
    check(unsafe { av_frame_get_buffer(frame.as_mut_ptr(), 32) })?;
    Ok(frame)
  }

  /// Allocate an audio frame with the default channel layout for `channels`
  pub fn new_audio(
    nb_samples: u32,
    format: SampleFormat,
    sample_rate: u32,
    channels: u32,
  ) -> Result<Self> {
    if nb_samples == 0 || channels == 0 || format.is_sentinel() {
      return Err(Error::InvalidArgument(format!(
        "invalid audio frame: {} samples, {} channels, format {}",
        nb_samples, channels, format
      )));
    }
    let mut frame = Self::new()?;
    frame.set_sample_format(format);
    frame.set_nb_samples(nb_samples)?;
    frame.set_sample_rate(sample_rate)?;
    frame.set_channels(channels)?;
    check(unsafe { av_frame_get_buffer(frame.as_mut_ptr(), 0) })?;
    Ok(frame)
  }

  /// Create a Frame from a raw pointer (takes ownership)
  ///
  /// # Safety
  /// The pointer must be a valid AVFrame allocated by FFmpeg
  pub unsafe fn from_raw(ptr: *mut AVFrame) -> Option<Self> {
    NonNull::new(ptr).map(|ptr| Self { ptr })
  }

  #[inline]
  pub fn as_ptr(&self) -> *const AVFrame {
    self.ptr.as_ptr()
  }

  #[inline]
  pub fn as_mut_ptr(&mut self) -> *mut AVFrame {
    self.ptr.as_ptr()
  }

  /// Consume the Frame and return the raw pointer
  pub fn into_raw(self) -> *mut AVFrame {
    let ptr = self.ptr.as_ptr();
    std::mem::forget(self);
    ptr
  }

  // ========================================================================
  // Picture Properties
  // ========================================================================

  #[inline]
  pub fn width(&self) -> u32 {
    unsafe { ffframe_get_width(self.as_ptr()) }.max(0) as u32
  }

  #[inline]
  pub fn height(&self) -> u32 {
    unsafe { ffframe_get_height(self.as_ptr()) }.max(0) as u32
  }

  pub fn set_dimensions(&mut self, width: u32, height: u32) -> Result<()> {
    let (width, height) = (to_c_int(width, "width")?, to_c_int(height, "height")?);
    unsafe {
      ffframe_set_width(self.as_mut_ptr(), width);
      ffframe_set_height(self.as_mut_ptr(), height);
    }
    Ok(())
  }

  /// Raw `format` field; its meaning depends on the media type
  #[inline]
  pub fn format_raw(&self) -> c_int {
    unsafe { ffframe_get_format(self.as_ptr()) }
  }

  pub fn pixel_format(&self) -> PixelFormat {
    PixelFormat::from_raw(self.format_raw())
  }

  pub fn set_pixel_format(&mut self, format: PixelFormat) {
    unsafe { ffframe_set_format(self.as_mut_ptr(), format.as_raw()) }
  }

  pub fn is_key_frame(&self) -> bool {
    unsafe { ffframe_get_key_frame(self.as_ptr()) != 0 }
  }

  pub fn set_key_frame(&mut self, key: bool) {
    unsafe { ffframe_set_key_frame(self.as_mut_ptr(), key as c_int) }
  }

  pub fn picture_type(&self) -> PictureType {
    let raw = unsafe { ffframe_get_pict_type(self.as_ptr()) };
    PictureType::from_raw(raw).unwrap_or(PictureType::None)
  }

  pub fn set_picture_type(&mut self, pict_type: PictureType) {
    unsafe { ffframe_set_pict_type(self.as_mut_ptr(), pict_type.as_raw()) }
  }

  pub fn color_range(&self) -> ColorRange {
    ColorRange::from_raw(unsafe { ffframe_get_color_range(self.as_ptr()) })
      .unwrap_or(ColorRange::Unspecified)
  }

  pub fn set_color_range(&mut self, range: ColorRange) {
    unsafe { ffframe_set_color_range(self.as_mut_ptr(), range.as_raw()) }
  }

  pub fn color_primaries(&self) -> ColorPrimaries {
    ColorPrimaries::from_raw(unsafe { ffframe_get_color_primaries(self.as_ptr()) })
      .unwrap_or(ColorPrimaries::Unspecified)
  }

  pub fn set_color_primaries(&mut self, primaries: ColorPrimaries) {
    unsafe { ffframe_set_color_primaries(self.as_mut_ptr(), primaries.as_raw()) }
  }

  pub fn color_transfer(&self) -> ColorTransfer {
    ColorTransfer::from_raw(unsafe { ffframe_get_color_trc(self.as_ptr()) })
      .unwrap_or(ColorTransfer::Unspecified)
  }

  pub fn set_color_transfer(&mut self, trc: ColorTransfer) {
    unsafe { ffframe_set_color_trc(self.as_mut_ptr(), trc.as_raw()) }
  }

  pub fn color_space(&self) -> ColorSpace {
    ColorSpace::from_raw(unsafe { ffframe_get_colorspace(self.as_ptr()) })
      .unwrap_or(ColorSpace::Unspecified)
  }

  pub fn set_color_space(&mut self, space: ColorSpace) {
    unsafe { ffframe_set_colorspace(self.as_mut_ptr(), space.as_raw()) }
  }

  // ========================================================================
  // Audio Properties
  // ========================================================================

  /// The format field read as a sample format; only meaningful for audio
  pub fn sample_format(&self) -> Option<SampleFormat> {
    SampleFormat::from_raw(self.format_raw()).filter(|f| !f.is_sentinel())
  }

  pub fn set_sample_format(&mut self, format: SampleFormat) {
    unsafe { ffframe_set_format(self.as_mut_ptr(), format.as_raw()) }
  }

  #[inline]
  pub fn nb_samples(&self) -> u32 {
    unsafe { ffframe_get_nb_samples(self.as_ptr()) }.max(0) as u32
  }

  pub fn set_nb_samples(&mut self, nb_samples: u32) -> Result<()> {
    let nb_samples = to_c_int(nb_samples, "sample count")?;
    unsafe { ffframe_set_nb_samples(self.as_mut_ptr(), nb_samples) };
    Ok(())
  }

  #[inline]
  pub fn sample_rate(&self) -> u32 {
    unsafe { ffframe_get_sample_rate(self.as_ptr()) }.max(0) as u32
  }

  pub fn set_sample_rate(&mut self, sample_rate: u32) -> Result<()> {
    let sample_rate = to_c_int(sample_rate, "sample rate")?;
    unsafe { ffframe_set_sample_rate(self.as_mut_ptr(), sample_rate) };
    Ok(())
  }

  #[inline]
  pub fn channels(&self) -> u32 {
    unsafe { ffframe_get_channels(self.as_ptr()) }.max(0) as u32
  }

  /// Replace the channel layout with the default one for `channels`
  pub fn set_channels(&mut self, channels: u32) -> Result<()> {
    let channels = to_c_int(channels, "channel count")?;
    unsafe { ffframe_set_channels(self.as_mut_ptr(), channels) };
    Ok(())
  }

  // ========================================================================
  // Timing
  // ========================================================================

  /// Presentation timestamp, `AV_NOPTS_VALUE` when unknown
  #[inline]
  pub fn pts(&self) -> i64 {
    unsafe { ffframe_get_pts(self.as_ptr()) }
  }

  #[inline]
  pub fn set_pts(&mut self, pts: i64) {
    unsafe { ffframe_set_pts(self.as_mut_ptr(), pts) }
  }

  #[inline]
  pub fn duration(&self) -> i64 {
    unsafe { ffframe_get_duration(self.as_ptr()) }
  }

  #[inline]
  pub fn set_duration(&mut self, duration: i64) {
    unsafe { ffframe_set_duration(self.as_mut_ptr(), duration) }
  }

  // ========================================================================
  // Data Access
  // ========================================================================

  /// Line size (stride) for a plane; for audio only plane 0 is meaningful
  #[inline]
  pub fn linesize(&self, plane: usize) -> i32 {
    if plane >= AV_NUM_DATA_POINTERS {
      return 0;
    }
    unsafe { ffframe_linesize(self.as_ptr(), plane as c_int) }
  }

  fn plane_ptr(&self, plane: usize) -> *mut u8 {
    if plane >= AV_NUM_DATA_POINTERS {
      return std::ptr::null_mut();
    }
    // Reading the pointer does not mutate the frame
    unsafe { ffframe_data(self.ptr.as_ptr(), plane as c_int) }
  }

  /// Number of populated data planes
  pub fn planes(&self) -> usize {
    (0..AV_NUM_DATA_POINTERS)
      .take_while(|&p| !self.plane_ptr(p).is_null())
      .count()
  }

  /// Byte length of a plane, `None` if it does not exist or has a
  /// negative (bottom-up) stride
  fn plane_len(&self, plane: usize) -> Option<usize> {
    if self.plane_ptr(plane).is_null() {
      return None;
    }
    if self.nb_samples() > 0 {
      let format = self.sample_format()?;
      let per_plane = if format.is_planar() { 1 } else { self.channels() as usize };
      return Some(self.nb_samples() as usize * format.bytes_per_sample() * per_plane);
    }
    let desc = PixelFormatDescriptor::get(self.pixel_format())?;
    if plane == 1 && desc.has_palette() {
      return Some(PALETTE_SIZE);
    }
    let linesize = self.linesize(plane);
    if linesize <= 0 {
      return None;
    }
    Some(linesize as usize * desc.plane_height(plane, self.height()) as usize)
  }

  /// Plane contents including stride padding (video) or the exact sample
  /// bytes (audio)
  pub fn plane(&self, plane: usize) -> Option<&[u8]> {
    let len = self.plane_len(plane)?;
    Some(unsafe { std::slice::from_raw_parts(self.plane_ptr(plane), len) })
  }

  /// Mutable plane contents; `None` while the buffers are shared, call
  /// [`Frame::make_writable`] first
  pub fn plane_mut(&mut self, plane: usize) -> Option<&mut [u8]> {
    if !self.is_writable() {
      return None;
    }
    let len = self.plane_len(plane)?;
    Some(unsafe { std::slice::from_raw_parts_mut(self.plane_ptr(plane), len) })
  }

  pub fn is_writable(&self) -> bool {
    unsafe { av_frame_is_writable(self.ptr.as_ptr()) > 0 }
  }

  /// Copy the buffers if they are shared with another frame
  pub fn make_writable(&mut self) -> Result<()> {
    check(unsafe { av_frame_make_writable(self.as_mut_ptr()) })?;
    Ok(())
  }

  // ========================================================================
  // Lifecycle
  // ========================================================================

  /// Unreference the frame data (but keep the frame structure)
  pub fn unref(&mut self) {
    unsafe { av_frame_unref(self.as_mut_ptr()) }
  }

  /// New frame referencing the same buffers
  pub fn try_clone(&self) -> Result<Self> {
    let ptr = unsafe { av_frame_clone(self.as_ptr()) };
    NonNull::new(ptr)
      .map(|ptr| Self { ptr })
      .ok_or(Error::AllocationFailed("AVFrame clone"))
  }

  pub fn info(&self) -> FrameInfo {
    let video = self.width() > 0 && self.height() > 0;
    let audio = self.nb_samples() > 0;
    let named = |name: &'static str, unspecified: bool| (!unspecified).then_some(name);
    FrameInfo {
      pts: Some(self.pts()).filter(|&v| v != AV_NOPTS_VALUE),
      duration: self.duration(),
      key_frame: video && self.is_key_frame(),
      width: video.then(|| self.width()),
      height: video.then(|| self.height()),
      pixel_format: video.then(|| PixelFormat::describe(self.format_raw())),
      picture_type: Some(self.picture_type())
        .filter(|t| video && !t.is_sentinel())
        .map(PictureType::name),
      color_range: named(self.color_range().name(), self.color_range() == ColorRange::Unspecified),
      color_primaries: named(
        self.color_primaries().name(),
        self.color_primaries() == ColorPrimaries::Unspecified,
      ),
      color_transfer: named(
        self.color_transfer().name(),
        self.color_transfer() == ColorTransfer::Unspecified,
      ),
      color_space: named(self.color_space().name(), self.color_space() == ColorSpace::Unspecified),
      nb_samples: audio.then(|| self.nb_samples()),
      sample_format: audio.then(|| SampleFormat::describe(self.format_raw())),
      sample_rate: audio.then(|| self.sample_rate()),
      channels: audio.then(|| self.channels()),
    }
  }
}

impl Drop for Frame {
  fn drop(&mut self) {
    unsafe {
      let mut ptr = self.ptr.as_ptr();
      av_frame_free(&mut ptr);
    }
  }
}

// Frame data can be sent between threads
unsafe impl Send for Frame {}

impl std::fmt::Debug for Frame {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Frame")
      .field("width", &self.width())
      .field("height", &self.height())
      .field("nb_samples", &self.nb_samples())
      .field("format", &self.format_raw())
      .field("pts", &self.pts())
      .field("key_frame", &self.is_key_frame())
      .finish()
  }
}

/// Serializable snapshot of a frame; video and audio fields appear only
/// for frames of that kind
#[derive(Debug, Clone, Serialize)]
pub struct FrameInfo {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub pts: Option<i64>,
  #[serde(skip_serializing_if = "is_zero")]
  pub duration: i64,
  #[serde(skip_serializing_if = "is_zero")]
  pub key_frame: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub width: Option<u32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub height: Option<u32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub pixel_format: Option<Cow<'static, str>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub picture_type: Option<&'static str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub color_range: Option<&'static str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub color_primaries: Option<&'static str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub color_transfer: Option<&'static str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub color_space: Option<&'static str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub nb_samples: Option<u32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub sample_format: Option<Cow<'static, str>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub sample_rate: Option<u32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub channels: Option<u32>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_frame_allocation() {
    let frame = Frame::new().unwrap();
    assert_eq!(frame.width(), 0);
    assert_eq!(frame.pts(), AV_NOPTS_VALUE);
    assert_eq!(frame.planes(), 0);
    assert!(frame.plane(0).is_none());
  }

  #[test]
  fn test_video_frame_planes() {
    let frame = Frame::new_video(33, 17, PixelFormat::YUV420P).unwrap();
    assert_eq!(frame.width(), 33);
    assert_eq!(frame.height(), 17);
    assert_eq!(frame.pixel_format(), PixelFormat::YUV420P);
    assert_eq!(frame.planes(), 3);

    let luma = frame.plane(0).unwrap();
    assert_eq!(luma.len(), frame.linesize(0) as usize * 17);
    let chroma = frame.plane(1).unwrap();
    assert_eq!(chroma.len(), frame.linesize(1) as usize * 9);
    assert!(frame.plane(3).is_none());
  }

  #[test]
  fn test_video_frame_rejects_bad_shape() {
    assert!(Frame::new_video(0, 10, PixelFormat::RGBA).is_err());
    assert!(Frame::new_video(10, 10, PixelFormat::NONE).is_err());
    let err = Frame::new_video(u32::MAX, 10, PixelFormat::RGBA).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    let err = Frame::new_audio(1024, SampleFormat::S16, u32::MAX, 1).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
  }

  #[test]
  fn test_audio_frame_planes() {
    let planar = Frame::new_audio(1024, SampleFormat::Fltp, 48_000, 2).unwrap();
    assert_eq!(planar.channels(), 2);
    assert_eq!(planar.sample_format(), Some(SampleFormat::Fltp));
    assert_eq!(planar.planes(), 2);
    assert_eq!(planar.plane(1).unwrap().len(), 1024 * 4);

    let packed = Frame::new_audio(1024, SampleFormat::S16, 44_100, 2).unwrap();
    assert_eq!(packed.planes(), 1);
    assert_eq!(packed.plane(0).unwrap().len(), 1024 * 2 * 2);
  }

  #[test]
  fn test_clone_shares_until_made_writable() {
    let mut frame = Frame::new_video(16, 16, PixelFormat::GRAY8).unwrap();
    frame.plane_mut(0).unwrap().fill(7);

    let mut copy = frame.try_clone().unwrap();
    assert!(!copy.is_writable());
    assert!(copy.plane_mut(0).is_none());

    copy.make_writable().unwrap();
    copy.plane_mut(0).unwrap()[0] = 99;
    assert_eq!(frame.plane(0).unwrap()[0], 7);
    assert_eq!(copy.plane(0).unwrap()[1], 7);
  }

  #[test]
  fn test_color_properties_round_trip() {
    let mut frame = Frame::new().unwrap();
    frame.set_color_range(ColorRange::Jpeg);
    frame.set_color_primaries(ColorPrimaries::Bt709);
    frame.set_color_space(ColorSpace::Bt709);
    assert_eq!(frame.color_range(), ColorRange::Jpeg);
    assert_eq!(frame.color_primaries(), ColorPrimaries::Bt709);
    assert_eq!(frame.color_transfer(), ColorTransfer::Unspecified);
    assert_eq!(frame.color_space(), ColorSpace::Bt709);
  }

  #[test]
  fn test_video_info_json() {
    let mut frame = Frame::new_video(4, 2, PixelFormat::RGB24).unwrap();
    frame.set_pts(3);
    frame.set_key_frame(true);
    frame.set_picture_type(PictureType::I);
    let value = serde_json::to_value(frame.info()).unwrap();
    assert_eq!(
      value,
      serde_json::json!({
        "pts": 3,
        "key_frame": true,
        "width": 4,
        "height": 2,
        "pixel_format": "rgb24",
        "picture_type": "I",
      })
    );
  }

  #[test]
  fn test_audio_info_json() {
    let frame = Frame::new_audio(160, SampleFormat::S16, 8000, 1).unwrap();
    let value = serde_json::to_value(frame.info()).unwrap();
    assert_eq!(
      value,
      serde_json::json!({
        "nb_samples": 160,
        "sample_format": "s16",
        "sample_rate": 8000,
        "channels": 1,
      })
    );
  }
}
