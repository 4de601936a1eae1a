//! libavutil function declarations
//!
//! Memory, frames, dictionaries, AVOptions, pixel/sample format tables,
//! logging and version queries.

use super::types::*;
use std::os::raw::{c_char, c_int, c_uint, c_void};

unsafe extern "C" {
  // ========================================================================
  // Frame Management
  // ========================================================================

  /// Allocate an AVFrame and set its fields to default values
  pub fn av_frame_alloc() -> *mut AVFrame;

  /// Free the frame and any dynamically allocated objects in it
  pub fn av_frame_free(frame: *mut *mut AVFrame);

  /// Set up a new reference to the data described by the frame
  pub fn av_frame_ref(dst: *mut AVFrame, src: *const AVFrame) -> c_int;

  /// Unreference all buffers referenced by frame and reset to defaults
  pub fn av_frame_unref(frame: *mut AVFrame);

  /// Create a new frame that references the same data as src
  pub fn av_frame_clone(src: *const AVFrame) -> *mut AVFrame;

  /// Allocate new buffers based on frame format/dimensions (video)
  /// or format/nb_samples/ch_layout (audio)
  ///
  /// # Arguments
  /// * `frame` - Frame with the shape fields set
  /// * `align` - Buffer size alignment (0 for default)
  pub fn av_frame_get_buffer(frame: *mut AVFrame, align: c_int) -> c_int;

  /// Ensure the frame is writable, copying data if needed
  pub fn av_frame_make_writable(frame: *mut AVFrame) -> c_int;

  /// Check if the frame is writable
  pub fn av_frame_is_writable(frame: *mut AVFrame) -> c_int;

  // ========================================================================
  // Memory Allocation
  // ========================================================================

  /// Allocate a memory block with alignment suitable for all memory accesses
  pub fn av_malloc(size: usize) -> *mut c_void;

  /// Allocate a zeroed memory block
  pub fn av_mallocz(size: usize) -> *mut c_void;

  /// Free a memory block which has been allocated with av_malloc
  pub fn av_free(ptr: *mut c_void);

  /// Free a memory block which has been allocated with av_malloc and set ptr to NULL
  ///
  /// `ptr` is a pointer to the pointer to free.
  pub fn av_freep(ptr: *mut c_void);

  // ========================================================================
  // Error Handling
  // ========================================================================

  /// Put a description of the AVERROR code errnum in errbuf
  pub fn av_strerror(errnum: c_int, errbuf: *mut c_char, errbuf_size: usize) -> c_int;

  // ========================================================================
  // Time / Rational Utilities
  // ========================================================================

  /// Rescale a 64-bit integer by 2 rational numbers
  pub fn av_rescale_q(a: i64, bq: AVRational, cq: AVRational) -> i64;

  // ========================================================================
  // Dictionary
  // ========================================================================

  /// Set the given entry in *pm, overwriting an existing entry.
  /// A NULL value deletes the entry.
  pub fn av_dict_set(
    pm: *mut *mut AVDictionary,
    key: *const c_char,
    value: *const c_char,
    flags: c_int,
  ) -> c_int;

  /// Free all the memory allocated for an AVDictionary struct
  pub fn av_dict_free(m: *mut *mut AVDictionary);

  /// Get a dictionary entry with matching key, starting after `prev`
  pub fn av_dict_get(
    m: *const AVDictionary,
    key: *const c_char,
    prev: *const AVDictionaryEntry,
    flags: c_int,
  ) -> *mut AVDictionaryEntry;

  /// Get number of entries in dictionary
  pub fn av_dict_count(m: *const AVDictionary) -> c_int;

  /// Copy entries from one AVDictionary struct into another
  pub fn av_dict_copy(dst: *mut *mut AVDictionary, src: *const AVDictionary, flags: c_int) -> c_int;

  // ========================================================================
  // AVOptions
  // ========================================================================

  /// Iterate over all AVOptions belonging to obj (or to a fake object
  /// holding only an AVClass pointer)
  pub fn av_opt_next(obj: *const c_void, prev: *const AVOption) -> *const AVOption;

  /// Set the field of obj with the given name to value
  pub fn av_opt_set(
    obj: *mut c_void,
    name: *const c_char,
    val: *const c_char,
    search_flags: c_int,
  ) -> c_int;

  /// Get a value of the option with the given name, formatted as a string
  /// allocated with av_malloc
  pub fn av_opt_get(
    obj: *mut c_void,
    name: *const c_char,
    search_flags: c_int,
    out_val: *mut *mut u8,
  ) -> c_int;

  /// Set all options from a dictionary; unconsumed entries are left in *options
  pub fn av_opt_set_dict2(
    obj: *mut c_void,
    options: *mut *mut AVDictionary,
    search_flags: c_int,
  ) -> c_int;

  // ========================================================================
  // Pixel Formats
  // ========================================================================

  /// Return the short name for a pixel format, NULL for unknown values
  pub fn av_get_pix_fmt_name(pix_fmt: c_int) -> *const c_char;

  /// Return the pixel format corresponding to name, AV_PIX_FMT_NONE if not found
  pub fn av_get_pix_fmt(name: *const c_char) -> c_int;

  /// Return a pixel format descriptor for the given format, NULL if invalid
  pub fn av_pix_fmt_desc_get(pix_fmt: c_int) -> *const AVPixFmtDescriptor;

  /// Iterate over all pixel format descriptors known to libavutil
  pub fn av_pix_fmt_desc_next(prev: *const AVPixFmtDescriptor) -> *const AVPixFmtDescriptor;

  /// Return the pixel format corresponding to a descriptor
  pub fn av_pix_fmt_desc_get_id(desc: *const AVPixFmtDescriptor) -> c_int;

  /// Number of bits per pixel used by the pixel format (without padding)
  pub fn av_get_bits_per_pixel(pixdesc: *const AVPixFmtDescriptor) -> c_int;

  /// Number of bits per pixel including padding
  pub fn av_get_padded_bits_per_pixel(pixdesc: *const AVPixFmtDescriptor) -> c_int;

  // ========================================================================
  // Sample Formats
  // ========================================================================

  /// Return the name of sample_fmt, or NULL if not recognized
  pub fn av_get_sample_fmt_name(sample_fmt: c_int) -> *const c_char;

  /// Return a sample format corresponding to name, AV_SAMPLE_FMT_NONE on error
  pub fn av_get_sample_fmt(name: *const c_char) -> c_int;

  /// Number of bytes per sample, or zero if unknown
  pub fn av_get_bytes_per_sample(sample_fmt: c_int) -> c_int;

  /// Check if the sample format is planar
  pub fn av_sample_fmt_is_planar(sample_fmt: c_int) -> c_int;

  /// Get the packed alternative form of the given sample format
  pub fn av_get_packed_sample_fmt(sample_fmt: c_int) -> c_int;

  /// Get the planar alternative form of the given sample format
  pub fn av_get_planar_sample_fmt(sample_fmt: c_int) -> c_int;

  // ========================================================================
  // Media Types / Picture Types
  // ========================================================================

  /// Return a string describing the media_type enum, NULL if media_type is unknown
  pub fn av_get_media_type_string(media_type: c_int) -> *const c_char;

  /// Return a single letter to describe the given picture type
  pub fn av_get_picture_type_char(pict_type: c_int) -> c_char;

  // ========================================================================
  // Color Properties
  // ========================================================================

  pub fn av_color_range_name(range: c_int) -> *const c_char;
  pub fn av_color_range_from_name(name: *const c_char) -> c_int;
  pub fn av_color_primaries_name(primaries: c_int) -> *const c_char;
  pub fn av_color_primaries_from_name(name: *const c_char) -> c_int;
  pub fn av_color_transfer_name(transfer: c_int) -> *const c_char;
  pub fn av_color_transfer_from_name(name: *const c_char) -> c_int;
  pub fn av_color_space_name(space: c_int) -> *const c_char;
  pub fn av_color_space_from_name(name: *const c_char) -> c_int;
  pub fn av_chroma_location_name(location: c_int) -> *const c_char;
  pub fn av_chroma_location_from_name(name: *const c_char) -> c_int;

  // ========================================================================
  // Logging
  // ========================================================================

  /// Set the log level
  pub fn av_log_set_level(level: c_int);

  /// Get the current log level
  pub fn av_log_get_level() -> c_int;

  pub fn av_log(avcl: *mut c_void, level: c_int, fmt: *const c_char, ...);

  // ========================================================================
  // Version Information
  // ========================================================================

  pub fn avutil_version() -> c_uint;
  pub fn avutil_configuration() -> *const c_char;
  pub fn avutil_license() -> *const c_char;

  /// Return an informative version string (e.g. "6.1.1")
  pub fn av_version_info() -> *const c_char;
}

/// `AV_PIX_FMT_NONE`
pub const AV_PIX_FMT_NONE: c_int = -1;

/// `AV_SAMPLE_FMT_NONE`
pub const AV_SAMPLE_FMT_NONE: c_int = -1;

/// Split an `AV_VERSION_INT` into (major, minor, micro)
#[inline]
pub fn version_triplet(version: c_uint) -> (u32, u32, u32) {
  (version >> 16, (version >> 8) & 0xff, version & 0xff)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_version_triplet() {
    assert_eq!(version_triplet((60 << 16) | (3 << 8) | 100), (60, 3, 100));
  }
}
