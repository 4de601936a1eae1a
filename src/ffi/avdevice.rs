//! libavdevice function declarations

use super::types::*;
use std::os::raw::{c_char, c_uint};

unsafe extern "C" {
  /// Initialize libavdevice and register all the input and output devices
  pub fn avdevice_register_all();

  /// Audio input devices iterator (NULL to start)
  pub fn av_input_audio_device_next(d: *const AVInputFormat) -> *const AVInputFormat;

  /// Video input devices iterator (NULL to start)
  pub fn av_input_video_device_next(d: *const AVInputFormat) -> *const AVInputFormat;

  /// Audio output devices iterator (NULL to start)
  pub fn av_output_audio_device_next(d: *const AVOutputFormat) -> *const AVOutputFormat;

  /// Video output devices iterator (NULL to start)
  pub fn av_output_video_device_next(d: *const AVOutputFormat) -> *const AVOutputFormat;

  pub fn avdevice_version() -> c_uint;
  pub fn avdevice_configuration() -> *const c_char;
  pub fn avdevice_license() -> *const c_char;
}
