//! Versions, licenses and build configuration of the linked libraries

use super::static_str;
use crate::ffi::avcodec::{avcodec_configuration, avcodec_license, avcodec_version};
use crate::ffi::avdevice::{avdevice_license, avdevice_version};
use crate::ffi::avfilter::{avfilter_license, avfilter_version};
use crate::ffi::avformat::{avformat_license, avformat_version};
use crate::ffi::avutil::{av_version_info, avutil_license, avutil_version, version_triplet};
use serde::Serialize;
use std::fmt;
use std::os::raw::{c_char, c_uint};

/// Runtime version of one libav* library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LibraryVersion {
  pub name: &'static str,
  pub major: u32,
  pub minor: u32,
  pub micro: u32,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub license: Option<&'static str>,
}

impl LibraryVersion {
  fn query(
    name: &'static str,
    version: unsafe extern "C" fn() -> c_uint,
    license: unsafe extern "C" fn() -> *const c_char,
  ) -> Self {
    let (major, minor, micro) = version_triplet(unsafe { version() });
    Self {
      name,
      major,
      minor,
      micro,
      license: unsafe { static_str(license()) },
    }
  }
}

impl fmt::Display for LibraryVersion {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "lib{} {}.{}.{}", self.name, self.major, self.minor, self.micro)
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct Versions {
  /// Release string such as `6.1.1` or a git describe
  #[serde(skip_serializing_if = "Option::is_none")]
  pub ffmpeg: Option<&'static str>,
  pub libraries: Vec<LibraryVersion>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub configuration: Option<&'static str>,
}

impl Versions {
  pub fn library(&self, name: &str) -> Option<&LibraryVersion> {
    self.libraries.iter().find(|lib| lib.name == name)
  }
}

/// Query the libraries this process actually loaded
pub fn versions() -> Versions {
  Versions {
    ffmpeg: unsafe { static_str(av_version_info()) },
    libraries: vec![
      LibraryVersion::query("avutil", avutil_version, avutil_license),
      LibraryVersion::query("avcodec", avcodec_version, avcodec_license),
      LibraryVersion::query("avformat", avformat_version, avformat_license),
      LibraryVersion::query("avfilter", avfilter_version, avfilter_license),
      LibraryVersion::query("avdevice", avdevice_version, avdevice_license),
    ],
    configuration: unsafe { static_str(avcodec_configuration()) },
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_linked_libraries_are_ffmpeg_6_or_newer() {
    let v = versions();
    assert_eq!(v.libraries.len(), 5);
    assert!(v.library("avutil").unwrap().major >= 58);
    assert!(v.library("avcodec").unwrap().major >= 60);
    assert!(v.library("avformat").unwrap().major >= 60);
    assert!(v.ffmpeg.is_some());
  }

  #[test]
  fn test_versions_json() {
    let value = serde_json::to_value(versions()).unwrap();
    assert_eq!(value["libraries"][0]["name"], "avutil");
    assert!(value["libraries"][0]["major"].is_u64());
  }

  #[test]
  fn test_display() {
    let lib = LibraryVersion {
      name: "avformat",
      major: 60,
      minor: 16,
      micro: 100,
      license: None,
    };
    assert_eq!(lib.to_string(), "libavformat 60.16.100");
  }
}
