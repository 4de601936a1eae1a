//! Pixel and sample format descriptors

use super::enums::{PixelFormat, SampleFormat};
use super::static_str;
use crate::ffi::accessors::{
  ffpixdesc_get_alias, ffpixdesc_get_flags, ffpixdesc_get_log2_chroma_h,
  ffpixdesc_get_log2_chroma_w, ffpixdesc_get_name, ffpixdesc_get_nb_components,
};
use crate::ffi::avutil::{
  av_get_bits_per_pixel, av_get_bytes_per_sample, av_get_packed_sample_fmt,
  av_get_padded_bits_per_pixel, av_get_planar_sample_fmt, av_pix_fmt_desc_get,
  av_pix_fmt_desc_get_id, av_pix_fmt_desc_next, av_sample_fmt_is_planar,
};
use crate::ffi::{pix_fmt_flag, AVPixFmtDescriptor};
use serde::Serialize;
use std::fmt;
use std::ptr::{self, NonNull};

/// Static layout description of a pixel format
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PixelFormatDescriptor {
  ptr: NonNull<AVPixFmtDescriptor>,
}

// SAFETY: descriptors live in libavutil's read-only tables
unsafe impl Send for PixelFormatDescriptor {}
unsafe impl Sync for PixelFormatDescriptor {}

impl PixelFormatDescriptor {
  pub fn get(format: PixelFormat) -> Option<Self> {
    let ptr = unsafe { av_pix_fmt_desc_get(format.as_raw()) };
    NonNull::new(ptr as *mut AVPixFmtDescriptor).map(|ptr| Self { ptr })
  }

  #[inline]
  pub fn as_ptr(&self) -> *const AVPixFmtDescriptor {
    self.ptr.as_ptr()
  }

  pub fn format(&self) -> PixelFormat {
    PixelFormat::from_raw(unsafe { av_pix_fmt_desc_get_id(self.as_ptr()) })
  }

  pub fn name(&self) -> &'static str {
    unsafe { static_str(ffpixdesc_get_name(self.as_ptr())) }.unwrap_or("")
  }

  /// Comma-separated alternative names, if any
  pub fn alias(&self) -> Option<&'static str> {
    unsafe { static_str(ffpixdesc_get_alias(self.as_ptr())) }
  }

  pub fn nb_components(&self) -> u8 {
    unsafe { ffpixdesc_get_nb_components(self.as_ptr()) }.clamp(0, 4) as u8
  }

  /// Horizontal chroma subsampling as a right shift
  pub fn log2_chroma_w(&self) -> u8 {
    unsafe { ffpixdesc_get_log2_chroma_w(self.as_ptr()) }.max(0) as u8
  }

  /// Vertical chroma subsampling as a right shift
  pub fn log2_chroma_h(&self) -> u8 {
    unsafe { ffpixdesc_get_log2_chroma_h(self.as_ptr()) }.max(0) as u8
  }

  /// Raw `AV_PIX_FMT_FLAG_*` bits
  pub fn flags(&self) -> u64 {
    unsafe { ffpixdesc_get_flags(self.as_ptr()) }
  }

  #[inline]
  fn has_flag(&self, flag: u64) -> bool {
    self.flags() & flag != 0
  }

  pub fn is_planar(&self) -> bool {
    self.has_flag(pix_fmt_flag::PLANAR)
  }

  pub fn is_rgb(&self) -> bool {
    self.has_flag(pix_fmt_flag::RGB)
  }

  pub fn has_alpha(&self) -> bool {
    self.has_flag(pix_fmt_flag::ALPHA)
  }

  pub fn is_hwaccel(&self) -> bool {
    self.has_flag(pix_fmt_flag::HWACCEL)
  }

  pub fn is_bitstream(&self) -> bool {
    self.has_flag(pix_fmt_flag::BITSTREAM)
  }

  pub fn has_palette(&self) -> bool {
    self.has_flag(pix_fmt_flag::PAL)
  }

  pub fn is_big_endian(&self) -> bool {
    self.has_flag(pix_fmt_flag::BE)
  }

  pub fn bits_per_pixel(&self) -> u32 {
    unsafe { av_get_bits_per_pixel(self.as_ptr()) }.max(0) as u32
  }

  pub fn padded_bits_per_pixel(&self) -> u32 {
    unsafe { av_get_padded_bits_per_pixel(self.as_ptr()) }.max(0) as u32
  }

  /// Height in rows of `plane` for a picture `height` rows tall
  ///
  /// Chroma planes are rounded up like libavutil does for odd heights.
  pub(crate) fn plane_height(&self, plane: usize, height: u32) -> u32 {
    if (plane == 1 || plane == 2) && !self.has_palette() {
      let shift = self.log2_chroma_h();
      (height + (1 << shift) - 1) >> shift
    } else {
      height
    }
  }

  pub fn info(&self) -> PixelFormatInfo {
    let mut flags = Vec::new();
    for (flag, name) in [
      (pix_fmt_flag::PLANAR, "planar"),
      (pix_fmt_flag::RGB, "rgb"),
      (pix_fmt_flag::ALPHA, "alpha"),
      (pix_fmt_flag::HWACCEL, "hwaccel"),
      (pix_fmt_flag::BITSTREAM, "bitstream"),
      (pix_fmt_flag::PAL, "palette"),
      (pix_fmt_flag::BE, "big_endian"),
      (pix_fmt_flag::FLOAT, "float"),
      (pix_fmt_flag::BAYER, "bayer"),
    ] {
      if self.has_flag(flag) {
        flags.push(name);
      }
    }
    PixelFormatInfo {
      name: self.name(),
      alias: self.alias(),
      nb_components: self.nb_components(),
      log2_chroma_w: self.log2_chroma_w(),
      log2_chroma_h: self.log2_chroma_h(),
      bits_per_pixel: self.bits_per_pixel(),
      flags,
    }
  }
}

impl fmt::Debug for PixelFormatDescriptor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("PixelFormatDescriptor")
      .field("name", &self.name())
      .field("nb_components", &self.nb_components())
      .field("flags", &format_args!("{:#x}", self.flags()))
      .finish()
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct PixelFormatInfo {
  pub name: &'static str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub alias: Option<&'static str>,
  pub nb_components: u8,
  pub log2_chroma_w: u8,
  pub log2_chroma_h: u8,
  pub bits_per_pixel: u32,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub flags: Vec<&'static str>,
}

/// Every pixel format known to the linked libavutil, in table order
pub fn pixel_formats() -> PixelFormats {
  PixelFormats { prev: ptr::null() }
}

pub struct PixelFormats {
  prev: *const AVPixFmtDescriptor,
}

impl Iterator for PixelFormats {
  type Item = PixelFormatDescriptor;

  fn next(&mut self) -> Option<Self::Item> {
    let next = unsafe { av_pix_fmt_desc_next(self.prev) };
    let desc = NonNull::new(next as *mut AVPixFmtDescriptor)?;
    self.prev = next;
    Some(PixelFormatDescriptor { ptr: desc })
  }
}

// ============================================================================
// Sample formats
// ============================================================================

impl SampleFormat {
  /// Bytes in one sample of one channel
  pub fn bytes_per_sample(self) -> usize {
    unsafe { av_get_bytes_per_sample(self.as_raw()) }.max(0) as usize
  }

  pub fn is_planar(self) -> bool {
    unsafe { av_sample_fmt_is_planar(self.as_raw()) != 0 }
  }

  /// Interleaved counterpart (`fltp` -> `flt`)
  pub fn packed(self) -> Self {
    Self::from_raw(unsafe { av_get_packed_sample_fmt(self.as_raw()) }).unwrap_or(Self::None)
  }

  /// Planar counterpart (`s16` -> `s16p`)
  pub fn planar(self) -> Self {
    Self::from_raw(unsafe { av_get_planar_sample_fmt(self.as_raw()) }).unwrap_or(Self::None)
  }
}

/// The declared sample formats, without the `none` placeholder
pub fn sample_formats() -> impl Iterator<Item = SampleFormat> {
  SampleFormat::ALL.iter().copied().filter(|f| !f.is_sentinel())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_yuv420p_descriptor() {
    let desc = PixelFormatDescriptor::get(PixelFormat::YUV420P).unwrap();
    assert_eq!(desc.name(), "yuv420p");
    assert_eq!(desc.format(), PixelFormat::YUV420P);
    assert_eq!(desc.nb_components(), 3);
    assert_eq!(desc.log2_chroma_w(), 1);
    assert_eq!(desc.log2_chroma_h(), 1);
    assert!(desc.is_planar());
    assert!(!desc.is_rgb());
    assert_eq!(desc.bits_per_pixel(), 12);
    assert_eq!(desc.plane_height(0, 15), 15);
    assert_eq!(desc.plane_height(1, 15), 8);
  }

  #[test]
  fn test_rgba_has_alpha() {
    let desc = PixelFormatDescriptor::get(PixelFormat::RGBA).unwrap();
    assert!(desc.is_rgb());
    assert!(desc.has_alpha());
    assert_eq!(desc.bits_per_pixel(), 32);
  }

  #[test]
  fn test_none_has_no_descriptor() {
    assert!(PixelFormatDescriptor::get(PixelFormat::NONE).is_none());
  }

  #[test]
  fn test_pixel_format_iteration_is_restartable() {
    let first: Vec<&str> = pixel_formats().map(|d| d.name()).collect();
    let second: Vec<&str> = pixel_formats().map(|d| d.name()).collect();
    assert!(!first.is_empty());
    assert_eq!(first, second);
    assert!(first.contains(&"nv12"));
  }

  #[test]
  fn test_pixel_format_info_json() {
    let desc = PixelFormatDescriptor::get(PixelFormat::NV12).unwrap();
    let value = serde_json::to_value(desc.info()).unwrap();
    assert_eq!(value["name"], "nv12");
    assert_eq!(value["flags"], serde_json::json!(["planar"]));
  }

  #[test]
  fn test_sample_format_helpers() {
    assert_eq!(SampleFormat::S16.bytes_per_sample(), 2);
    assert_eq!(SampleFormat::Dblp.bytes_per_sample(), 8);
    assert!(SampleFormat::Fltp.is_planar());
    assert!(!SampleFormat::Flt.is_planar());
    assert_eq!(SampleFormat::Fltp.packed(), SampleFormat::Flt);
    assert_eq!(SampleFormat::S16.planar(), SampleFormat::S16p);
  }

  #[test]
  fn test_sample_formats_skip_placeholder() {
    let all: Vec<SampleFormat> = sample_formats().collect();
    assert_eq!(all.len(), 12);
    assert!(!all.contains(&SampleFormat::None));
  }
}
