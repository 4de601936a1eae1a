//! Safe wrapper around FFmpeg AVPacket
//!
//! Provides RAII-based memory management for encoded data.

use super::{is_zero, to_c_int, Error, Result};
use crate::ffi::accessors::{
  ffpkt_data, ffpkt_data_mut, ffpkt_dts, ffpkt_duration, ffpkt_flags, ffpkt_pos, ffpkt_pts,
  ffpkt_set_dts, ffpkt_set_duration, ffpkt_set_flags, ffpkt_set_pos, ffpkt_set_pts,
  ffpkt_set_stream_index, ffpkt_size, ffpkt_stream_index,
};
use crate::ffi::avcodec::{
  av_new_packet, av_packet_alloc, av_packet_free, av_packet_make_writable, av_packet_ref,
  av_packet_rescale_ts, av_packet_unref,
};
use crate::ffi::{check, pkt_flag, AVPacket, AVRational, AV_NOPTS_VALUE};
use serde::Serialize;
use std::os::raw::c_int;
use std::ptr::NonNull;

const FLAG_NAMES: &[(c_int, &str)] = &[
  (pkt_flag::KEY, "key"),
  (pkt_flag::CORRUPT, "corrupt"),
  (pkt_flag::DISCARD, "discard"),
  (pkt_flag::TRUSTED, "trusted"),
  (pkt_flag::DISPOSABLE, "disposable"),
];

/// Safe wrapper around AVPacket with RAII cleanup
pub struct Packet {
  ptr: NonNull<AVPacket>,
}

impl Packet {
  /// Allocate a new empty packet
  pub fn new() -> Result<Self> {
    let ptr = unsafe { av_packet_alloc() };
    NonNull::new(ptr)
      .map(|ptr| Self { ptr })
      .ok_or(Error::AllocationFailed("AVPacket"))
  }

  /// Allocate a packet holding a copy of `data`
  pub fn from_slice(data: &[u8]) -> Result<Self> {
    let size = c_int::try_from(data.len())
      .map_err(|_| Error::InvalidArgument(format!("packet too large: {} bytes", data.len())))?;
    let mut pkt = Self::new()?;
    check(unsafe { av_new_packet(pkt.as_mut_ptr(), size) })?;
    if !data.is_empty() {
      unsafe {
        std::ptr::copy_nonoverlapping(data.as_ptr(), ffpkt_data_mut(pkt.as_mut_ptr()), data.len());
      }
    }
    Ok(pkt)
  }

  /// Create a Packet from a raw pointer (takes ownership)
  ///
  /// # Safety
  /// The pointer must be a valid AVPacket allocated by FFmpeg
  pub unsafe fn from_raw(ptr: *mut AVPacket) -> Option<Self> {
    NonNull::new(ptr).map(|ptr| Self { ptr })
  }

  #[inline]
  pub fn as_ptr(&self) -> *const AVPacket {
    self.ptr.as_ptr()
  }

  #[inline]
  pub fn as_mut_ptr(&mut self) -> *mut AVPacket {
    self.ptr.as_ptr()
  }

  /// Consume the Packet and return the raw pointer
  /// The caller is responsible for freeing the packet
  pub fn into_raw(self) -> *mut AVPacket {
    let ptr = self.ptr.as_ptr();
    std::mem::forget(self);
    ptr
  }

  // ========================================================================
  // Data Access
  // ========================================================================

  /// Packet payload
  pub fn data(&self) -> &[u8] {
    let ptr = unsafe { ffpkt_data(self.as_ptr()) };
    let size = self.size();
    if ptr.is_null() || size == 0 {
      &[]
    } else {
      unsafe { std::slice::from_raw_parts(ptr, size) }
    }
  }

  /// Writable payload; copies the data first if it is shared
  pub fn data_mut(&mut self) -> Result<&mut [u8]> {
    check(unsafe { av_packet_make_writable(self.as_mut_ptr()) })?;
    let ptr = unsafe { ffpkt_data_mut(self.as_mut_ptr()) };
    let size = self.size();
    if ptr.is_null() || size == 0 {
      return Ok(&mut [][..]);
    }
    Ok(unsafe { std::slice::from_raw_parts_mut(ptr, size) })
  }

  #[inline]
  pub fn size(&self) -> usize {
    unsafe { ffpkt_size(self.as_ptr()) }.max(0) as usize
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.size() == 0
  }

  pub fn to_vec(&self) -> Vec<u8> {
    self.data().to_vec()
  }

  // ========================================================================
  // Timestamps
  // ========================================================================

  /// Presentation timestamp, `AV_NOPTS_VALUE` when unknown
  #[inline]
  pub fn pts(&self) -> i64 {
    unsafe { ffpkt_pts(self.as_ptr()) }
  }

  #[inline]
  pub fn set_pts(&mut self, pts: i64) {
    unsafe { ffpkt_set_pts(self.as_mut_ptr(), pts) }
  }

  /// Decoding timestamp, `AV_NOPTS_VALUE` when unknown
  #[inline]
  pub fn dts(&self) -> i64 {
    unsafe { ffpkt_dts(self.as_ptr()) }
  }

  #[inline]
  pub fn set_dts(&mut self, dts: i64) {
    unsafe { ffpkt_set_dts(self.as_mut_ptr(), dts) }
  }

  #[inline]
  pub fn duration(&self) -> i64 {
    unsafe { ffpkt_duration(self.as_ptr()) }
  }

  #[inline]
  pub fn set_duration(&mut self, duration: i64) {
    unsafe { ffpkt_set_duration(self.as_mut_ptr(), duration) }
  }

  /// Convert pts, dts and duration from `src` to `dst` time base
  pub fn rescale_ts(&mut self, src: AVRational, dst: AVRational) {
    unsafe { av_packet_rescale_ts(self.as_mut_ptr(), src, dst) }
  }

  // ========================================================================
  // Stream and Position
  // ========================================================================

  #[inline]
  pub fn stream_index(&self) -> usize {
    unsafe { ffpkt_stream_index(self.as_ptr()) }.max(0) as usize
  }

  #[inline]
  pub fn set_stream_index(&mut self, index: usize) -> Result<()> {
    let index = to_c_int(index, "stream index")?;
    unsafe { ffpkt_set_stream_index(self.as_mut_ptr(), index) };
    Ok(())
  }

  /// Byte position in the input, if known
  pub fn pos(&self) -> Option<i64> {
    let pos = unsafe { ffpkt_pos(self.as_ptr()) };
    (pos >= 0).then_some(pos)
  }

  pub fn set_pos(&mut self, pos: Option<i64>) {
    unsafe { ffpkt_set_pos(self.as_mut_ptr(), pos.unwrap_or(-1)) }
  }

  // ========================================================================
  // Flags
  // ========================================================================

  #[inline]
  pub fn flags(&self) -> c_int {
    unsafe { ffpkt_flags(self.as_ptr()) }
  }

  #[inline]
  pub fn set_flags(&mut self, flags: c_int) {
    unsafe { ffpkt_set_flags(self.as_mut_ptr(), flags) }
  }

  #[inline]
  pub fn is_key(&self) -> bool {
    (self.flags() & pkt_flag::KEY) != 0
  }

  pub fn set_key(&mut self, key: bool) {
    let flags = if key {
      self.flags() | pkt_flag::KEY
    } else {
      self.flags() & !pkt_flag::KEY
    };
    self.set_flags(flags);
  }

  #[inline]
  pub fn is_corrupt(&self) -> bool {
    (self.flags() & pkt_flag::CORRUPT) != 0
  }

  // ========================================================================
  // Lifecycle
  // ========================================================================

  /// Drop the payload reference, keeping the packet for reuse
  pub fn unref(&mut self) {
    unsafe { av_packet_unref(self.as_mut_ptr()) }
  }

  /// New reference to the same (refcounted) payload
  pub fn try_clone(&self) -> Result<Self> {
    let mut new_pkt = Self::new()?;
    check(unsafe { av_packet_ref(new_pkt.as_mut_ptr(), self.as_ptr()) })?;
    Ok(new_pkt)
  }

  pub fn info(&self) -> PacketInfo {
    let flags = self.flags();
    PacketInfo {
      stream_index: self.stream_index(),
      size: self.size(),
      pts: Some(self.pts()).filter(|&v| v != AV_NOPTS_VALUE),
      dts: Some(self.dts()).filter(|&v| v != AV_NOPTS_VALUE),
      duration: self.duration(),
      pos: self.pos(),
      flags: FLAG_NAMES
        .iter()
        .filter(|(bit, _)| flags & bit != 0)
        .map(|(_, name)| *name)
        .collect(),
    }
  }
}

impl Drop for Packet {
  fn drop(&mut self) {
    unsafe {
      let mut ptr = self.ptr.as_ptr();
      av_packet_free(&mut ptr);
    }
  }
}

// Packet data can be sent between threads
unsafe impl Send for Packet {}

impl std::fmt::Debug for Packet {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Packet")
      .field("stream_index", &self.stream_index())
      .field("size", &self.size())
      .field("pts", &self.pts())
      .field("dts", &self.dts())
      .field("is_key", &self.is_key())
      .finish()
  }
}

/// Serializable snapshot of a packet's properties
#[derive(Debug, Clone, Serialize)]
pub struct PacketInfo {
  pub stream_index: usize,
  pub size: usize,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub pts: Option<i64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub dts: Option<i64>,
  #[serde(skip_serializing_if = "is_zero")]
  pub duration: i64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub pos: Option<i64>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub flags: Vec<&'static str>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_packet_allocation() {
    let pkt = Packet::new().unwrap();
    assert!(pkt.is_empty());
    assert_eq!(pkt.pts(), AV_NOPTS_VALUE);
    assert_eq!(pkt.pos(), None);
  }

  #[test]
  fn test_from_slice_copies_payload() {
    let pkt = Packet::from_slice(&[1, 2, 3, 4]).unwrap();
    assert_eq!(pkt.data(), &[1, 2, 3, 4]);
    assert_eq!(pkt.to_vec().len(), 4);
  }

  #[test]
  fn test_clone_shares_then_copies_on_write() {
    let original = Packet::from_slice(b"abcd").unwrap();
    let mut copy = original.try_clone().unwrap();
    copy.data_mut().unwrap()[0] = b'z';
    assert_eq!(original.data(), b"abcd");
    assert_eq!(copy.data(), b"zbcd");
  }

  #[test]
  fn test_key_flag_toggle() {
    let mut pkt = Packet::new().unwrap();
    pkt.set_key(true);
    assert!(pkt.is_key());
    pkt.set_key(false);
    assert!(!pkt.is_key());
  }

  #[test]
  fn test_stream_index_range() {
    let mut pkt = Packet::new().unwrap();
    pkt.set_stream_index(3).unwrap();
    assert_eq!(pkt.stream_index(), 3);
    assert!(matches!(pkt.set_stream_index(usize::MAX), Err(Error::InvalidArgument(_))));
    assert_eq!(pkt.stream_index(), 3);
  }

  #[test]
  fn test_rescale_ts() {
    let mut pkt = Packet::new().unwrap();
    pkt.set_pts(90_000);
    pkt.set_dts(90_000);
    pkt.set_duration(3_000);
    pkt.rescale_ts(AVRational::new(1, 90_000), AVRational::new(1, 1_000));
    assert_eq!(pkt.pts(), 1_000);
    assert_eq!(pkt.duration(), 33);
  }

  #[test]
  fn test_info_omits_unset_fields() {
    let mut pkt = Packet::from_slice(&[0; 16]).unwrap();
    pkt.set_key(true);
    pkt.set_pts(5);
    let value = serde_json::to_value(pkt.info()).unwrap();
    assert_eq!(
      value,
      serde_json::json!({"stream_index": 0, "size": 16, "pts": 5, "flags": ["key"]})
    );
  }

  #[test]
  fn test_raw_round_trip() {
    let pkt = Packet::from_slice(b"xy").unwrap();
    let raw = pkt.into_raw();
    let pkt = unsafe { Packet::from_raw(raw) }.unwrap();
    assert_eq!(pkt.data(), b"xy");
  }
}
