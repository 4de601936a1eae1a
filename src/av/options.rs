//! AVOption introspection and access
//!
//! Every FFmpeg object that starts with an `AVClass` pointer carries a table
//! of named options. [`OptionClass::options`] lists that table without a live
//! object; [`OptionTarget`] reads and writes options on a live one.

use super::dictionary::Dictionary;
use super::enums::OptionType;
use super::{static_str, to_cstring, Result};
use crate::ffi::accessors::{
  ffopt_get_default_dbl, ffopt_get_default_i64, ffopt_get_default_str, ffopt_get_flags,
  ffopt_get_help, ffopt_get_kind, ffopt_get_max, ffopt_get_min, ffopt_get_name, ffopt_get_unit,
};
use crate::ffi::avcodec::avcodec_get_class;
use crate::ffi::avfilter::avfilter_get_class;
use crate::ffi::avformat::avformat_get_class;
use crate::ffi::avutil::{av_free, av_opt_get, av_opt_next, av_opt_set, av_opt_set_dict2};
use crate::ffi::{check, opt_flag, opt_search, AVClass, AVOption};
use serde::Serialize;
use std::ffi::CStr;
use std::fmt;
use std::os::raw::{c_int, c_void};
use std::ptr::{self, NonNull};

/// A class whose option table can be listed
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct OptionClass {
  ptr: NonNull<AVClass>,
}

// SAFETY: classes are static, read-only library data
unsafe impl Send for OptionClass {}
unsafe impl Sync for OptionClass {}

impl OptionClass {
  /// # Safety
  /// `ptr` must be NULL or point to a static AVClass
  pub unsafe fn from_ptr(ptr: *const AVClass) -> Option<Self> {
    NonNull::new(ptr as *mut AVClass).map(|ptr| Self { ptr })
  }

  #[inline]
  pub fn as_ptr(&self) -> *const AVClass {
    self.ptr.as_ptr()
  }

  /// Generic options of every codec context
  pub fn codec_context() -> Option<Self> {
    unsafe { Self::from_ptr(avcodec_get_class()) }
  }

  /// Generic options of every format context
  pub fn format_context() -> Option<Self> {
    unsafe { Self::from_ptr(avformat_get_class()) }
  }

  /// Generic options of every filter instance
  pub fn filter_context() -> Option<Self> {
    unsafe { Self::from_ptr(avfilter_get_class()) }
  }

  pub fn options(&self) -> Options {
    options_of(*self)
  }

  /// Look up one option by name, named constants excluded
  pub fn find(&self, name: &str) -> Option<OptionDescriptor> {
    self
      .options()
      .find(|opt| opt.kind() != Some(OptionType::Const) && opt.name() == name)
  }
}

impl fmt::Debug for OptionClass {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("OptionClass").field(&self.ptr).finish()
  }
}

/// Iterate the option table of `class`, named constants included
pub fn options_of(class: OptionClass) -> Options {
  Options {
    class: class.as_ptr(),
    prev: ptr::null(),
  }
}

/// Restartable cursor over `av_opt_next`
pub struct Options {
  // Doubles as the fake object: av_opt_next only reads the leading class pointer
  class: *const AVClass,
  prev: *const AVOption,
}

impl Iterator for Options {
  type Item = OptionDescriptor;

  fn next(&mut self) -> Option<Self::Item> {
    let fake_obj = &self.class as *const *const AVClass as *const c_void;
    let next = unsafe { av_opt_next(fake_obj, self.prev) };
    let opt = NonNull::new(next as *mut AVOption)?;
    self.prev = next;
    Some(OptionDescriptor { ptr: opt })
  }
}

/// Default value of an option, in the representation its type uses
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OptionValue {
  Int(i64),
  Double(f64),
  String(String),
}

/// Entry of a static option table
#[derive(Clone, Copy)]
pub struct OptionDescriptor {
  ptr: NonNull<AVOption>,
}

unsafe impl Send for OptionDescriptor {}
unsafe impl Sync for OptionDescriptor {}

impl OptionDescriptor {
  #[inline]
  fn as_ptr(&self) -> *const AVOption {
    self.ptr.as_ptr()
  }

  pub fn name(&self) -> &'static str {
    unsafe { static_str(ffopt_get_name(self.as_ptr())) }.unwrap_or("")
  }

  pub fn help(&self) -> Option<&'static str> {
    unsafe { static_str(ffopt_get_help(self.as_ptr())) }
  }

  /// Option type; `None` for types this binding does not know
  pub fn kind(&self) -> Option<OptionType> {
    OptionType::from_raw(unsafe { ffopt_get_kind(self.as_ptr()) })
  }

  /// Group shared by an option and its named constants
  pub fn unit(&self) -> Option<&'static str> {
    unsafe { static_str(ffopt_get_unit(self.as_ptr())) }
  }

  /// Raw `AV_OPT_FLAG_*` bits
  pub fn flags(&self) -> c_int {
    unsafe { ffopt_get_flags(self.as_ptr()) }
  }

  pub fn min(&self) -> f64 {
    unsafe { ffopt_get_min(self.as_ptr()) }
  }

  pub fn max(&self) -> f64 {
    unsafe { ffopt_get_max(self.as_ptr()) }
  }

  pub fn is_deprecated(&self) -> bool {
    self.flags() & opt_flag::DEPRECATED != 0
  }

  pub fn default_value(&self) -> Option<OptionValue> {
    let opt = self.as_ptr();
    match self.kind()? {
      OptionType::Flags
      | OptionType::Int
      | OptionType::Int64
      | OptionType::UInt64
      | OptionType::Const
      | OptionType::PixelFmt
      | OptionType::SampleFmt
      | OptionType::Duration
      | OptionType::Bool => Some(OptionValue::Int(unsafe { ffopt_get_default_i64(opt) })),
      // Rationals keep their default as a double
      OptionType::Double | OptionType::Float | OptionType::Rational => {
        Some(OptionValue::Double(unsafe { ffopt_get_default_dbl(opt) }))
      }
      OptionType::String
      | OptionType::Binary
      | OptionType::Dict
      | OptionType::ImageSize
      | OptionType::VideoRate
      | OptionType::Color
      | OptionType::ChannelLayout => unsafe { static_str(ffopt_get_default_str(opt)) }
        .map(|s| OptionValue::String(s.to_owned())),
    }
  }

  pub fn info(&self) -> OptionInfo {
    let mut flags = Vec::new();
    for (flag, name) in [
      (opt_flag::ENCODING_PARAM, "encoding"),
      (opt_flag::DECODING_PARAM, "decoding"),
      (opt_flag::AUDIO_PARAM, "audio"),
      (opt_flag::VIDEO_PARAM, "video"),
      (opt_flag::SUBTITLE_PARAM, "subtitle"),
      (opt_flag::EXPORT, "export"),
      (opt_flag::READONLY, "readonly"),
      (opt_flag::FILTERING_PARAM, "filtering"),
      (opt_flag::RUNTIME_PARAM, "runtime"),
      (opt_flag::DEPRECATED, "deprecated"),
    ] {
      if self.flags() & flag != 0 {
        flags.push(name);
      }
    }
    let numeric = matches!(
      self.kind(),
      Some(OptionType::Int | OptionType::Int64 | OptionType::Double | OptionType::Float)
    );
    OptionInfo {
      name: self.name(),
      help: self.help(),
      kind: self.kind().map(OptionType::name).unwrap_or("unknown"),
      unit: self.unit(),
      default: self.default_value(),
      min: numeric.then(|| self.min()),
      max: numeric.then(|| self.max()),
      flags,
    }
  }
}

impl fmt::Debug for OptionDescriptor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("OptionDescriptor")
      .field("name", &self.name())
      .field("kind", &self.kind())
      .field("unit", &self.unit())
      .finish()
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct OptionInfo {
  pub name: &'static str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub help: Option<&'static str>,
  #[serde(rename = "type")]
  pub kind: &'static str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub unit: Option<&'static str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub default: Option<OptionValue>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub min: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub max: Option<f64>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub flags: Vec<&'static str>,
}

// ============================================================================
// Live objects
// ============================================================================

/// Live FFmpeg object with an option table
///
/// Lookups also search child objects (a codec's private context, a
/// muxer's private data).
pub trait OptionTarget {
  /// The object pointer handed to `av_opt_*`
  fn option_object(&self) -> *mut c_void;

  /// Parse and set `name` from its string form
  fn set_option(&mut self, name: &str, value: &str) -> Result<()> {
    let c_name = to_cstring(name)?;
    let c_value = to_cstring(value)?;
    check(unsafe {
      av_opt_set(self.option_object(), c_name.as_ptr(), c_value.as_ptr(), opt_search::CHILDREN)
    })?;
    Ok(())
  }

  /// Current value of `name` formatted as a string
  fn get_option(&self, name: &str) -> Result<String> {
    let c_name = to_cstring(name)?;
    let mut out: *mut u8 = ptr::null_mut();
    check(unsafe {
      av_opt_get(self.option_object(), c_name.as_ptr(), opt_search::CHILDREN, &mut out)
    })?;
    if out.is_null() {
      return Ok(String::new());
    }
    let value = unsafe { CStr::from_ptr(out as *const _) }.to_string_lossy().into_owned();
    unsafe { av_free(out as *mut c_void) };
    Ok(value)
  }

  /// Apply every entry of `options`; returns the entries no option matched
  fn apply_options(&mut self, mut options: Dictionary) -> Result<Dictionary> {
    check(unsafe {
      av_opt_set_dict2(self.option_object(), options.as_mut_slot(), opt_search::CHILDREN)
    })?;
    Ok(options)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_codec_context_class_lists_bit_rate() {
    let class = OptionClass::codec_context().unwrap();
    let b = class.find("b").unwrap();
    assert_eq!(b.kind(), Some(OptionType::Int64));
    assert_eq!(b.default_value(), Some(OptionValue::Int(200_000)));
    assert!(b.help().is_some());
  }

  #[test]
  fn test_enumeration_is_restartable() {
    let class = OptionClass::format_context().unwrap();
    let first: Vec<&str> = class.options().map(|o| o.name()).collect();
    let second: Vec<&str> = options_of(class).map(|o| o.name()).collect();
    assert!(!first.is_empty());
    assert_eq!(first, second);
  }

  #[test]
  fn test_constants_share_unit_with_their_option() {
    let class = OptionClass::format_context().unwrap();
    let fflags = class.find("fflags").unwrap();
    let unit = fflags.unit().unwrap();
    let constants: Vec<&str> = class
      .options()
      .filter(|o| o.kind() == Some(OptionType::Const) && o.unit() == Some(unit))
      .map(|o| o.name())
      .collect();
    assert!(constants.contains(&"genpts"));
    assert!(class.find("genpts").is_none());
  }

  #[test]
  fn test_option_info_json() {
    let class = OptionClass::codec_context().unwrap();
    let value = serde_json::to_value(class.find("b").unwrap().info()).unwrap();
    assert_eq!(value["name"], "b");
    assert_eq!(value["type"], "int64");
    assert_eq!(value["default"], 200_000);
    assert!(value["flags"].as_array().unwrap().contains(&"encoding".into()));
  }

  #[test]
  fn test_filter_context_class() {
    let class = OptionClass::filter_context().unwrap();
    assert!(class.find("enable").is_some());
  }
}
