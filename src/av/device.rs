//! libavdevice registration and device enumeration
//!
//! Devices are demuxers and muxers that talk to hardware or OS APIs; they
//! only appear in the registry after [`register_all`].

use super::format::{InputFormat, OutputFormat};
use crate::ffi::avdevice::{
  av_input_audio_device_next, av_input_video_device_next, av_output_audio_device_next,
  av_output_video_device_next, avdevice_register_all,
};
use crate::ffi::{AVInputFormat, AVOutputFormat};
use std::ptr;
use std::sync::Once;

static REGISTER: Once = Once::new();

/// Register every device with libavformat; later calls do nothing
pub fn register_all() {
  REGISTER.call_once(|| {
    unsafe { avdevice_register_all() };
    tracing::debug!(target: "ffbridge::format", "registered devices");
  });
}

type InputNext = unsafe extern "C" fn(*const AVInputFormat) -> *const AVInputFormat;
type OutputNext = unsafe extern "C" fn(*const AVOutputFormat) -> *const AVOutputFormat;

/// Cursor over one of the input device lists
pub struct InputDevices {
  prev: *const AVInputFormat,
  next_fn: InputNext,
}

impl Iterator for InputDevices {
  type Item = InputFormat;

  fn next(&mut self) -> Option<Self::Item> {
    let next = unsafe { (self.next_fn)(self.prev) };
    let format = unsafe { InputFormat::from_ptr(next) }?;
    self.prev = next;
    Some(format)
  }
}

/// Cursor over one of the output device lists
pub struct OutputDevices {
  prev: *const AVOutputFormat,
  next_fn: OutputNext,
}

impl Iterator for OutputDevices {
  type Item = OutputFormat;

  fn next(&mut self) -> Option<Self::Item> {
    let next = unsafe { (self.next_fn)(self.prev) };
    let format = unsafe { OutputFormat::from_ptr(next) }?;
    self.prev = next;
    Some(format)
  }
}

pub fn input_audio_devices() -> InputDevices {
  register_all();
  InputDevices {
    prev: ptr::null(),
    next_fn: av_input_audio_device_next,
  }
}

pub fn input_video_devices() -> InputDevices {
  register_all();
  InputDevices {
    prev: ptr::null(),
    next_fn: av_input_video_device_next,
  }
}

pub fn output_audio_devices() -> OutputDevices {
  register_all();
  OutputDevices {
    prev: ptr::null(),
    next_fn: av_output_audio_device_next,
  }
}

pub fn output_video_devices() -> OutputDevices {
  register_all();
  OutputDevices {
    prev: ptr::null(),
    next_fn: av_output_video_device_next,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_register_all_is_idempotent() {
    register_all();
    register_all();
  }

  #[test]
  fn test_device_lists_are_restartable() {
    let first: Vec<&str> = input_video_devices().map(|d| d.name()).collect();
    let second: Vec<&str> = input_video_devices().map(|d| d.name()).collect();
    assert_eq!(first, second);

    let first: Vec<&str> = output_audio_devices().map(|d| d.name()).collect();
    let second: Vec<&str> = output_audio_devices().map(|d| d.name()).collect();
    assert_eq!(first, second);
  }

  #[test]
  fn test_device_lists_contain_only_named_formats() {
    for device in input_audio_devices() {
      assert!(!device.name().is_empty());
    }
    for device in output_video_devices() {
      assert!(!device.name().is_empty());
    }
  }
}
