//! libavformat function declarations
//!
//! Provides muxing and demuxing functionality for container formats,
//! plus the buffered AVIOContext layer used for custom I/O.

use super::types::*;
use std::os::raw::{c_char, c_int, c_uint, c_void};

// ============================================================================
// Callback Types for Custom I/O
// ============================================================================

/// Read callback for custom I/O
///
/// # Arguments
/// * `opaque` - User-provided opaque pointer
/// * `buf` - Buffer to read into
/// * `buf_size` - Size of buffer
///
/// # Returns
/// Number of bytes read, AVERROR_EOF at end of stream, or negative AVERROR on error
pub type ReadPacketFn =
  unsafe extern "C" fn(opaque: *mut c_void, buf: *mut u8, buf_size: c_int) -> c_int;

/// Write callback for custom I/O
///
/// FFmpeg 7 declares `buf` as `const uint8_t *`, FFmpeg 6 as `uint8_t *`;
/// the ABI is the same.
///
/// # Returns
/// Number of bytes written, or negative AVERROR on error
pub type WritePacketFn =
  unsafe extern "C" fn(opaque: *mut c_void, buf: *const u8, buf_size: c_int) -> c_int;

/// Seek callback for custom I/O
///
/// # Arguments
/// * `opaque` - User-provided opaque pointer
/// * `offset` - Seek offset
/// * `whence` - Seek mode (SEEK_SET, SEEK_CUR, SEEK_END, or AVSEEK_SIZE)
///
/// # Returns
/// New position (or total size for AVSEEK_SIZE), or negative AVERROR on error
pub type SeekFn = unsafe extern "C" fn(opaque: *mut c_void, offset: i64, whence: c_int) -> i64;

unsafe extern "C" {
  // ========================================================================
  // Output Context (Muxing)
  // ========================================================================

  /// Allocate an AVFormatContext for output
  ///
  /// # Arguments
  /// * `ctx` - Pointer to receive the allocated context (set to NULL on failure)
  /// * `oformat` - Output format to use (can be NULL to auto-detect)
  /// * `format_name` - Short name of the format (e.g., "mp4", "wav")
  /// * `filename` - Filename for format detection (can be NULL)
  pub fn avformat_alloc_output_context2(
    ctx: *mut *mut AVFormatContext,
    oformat: *const AVOutputFormat,
    format_name: *const c_char,
    filename: *const c_char,
  ) -> c_int;

  /// Allocate an AVFormatContext
  pub fn avformat_alloc_context() -> *mut AVFormatContext;

  /// Free an AVFormatContext and all its streams
  ///
  /// Does not close the pb.
  pub fn avformat_free_context(ctx: *mut AVFormatContext);

  /// Add a new stream to a media file
  pub fn avformat_new_stream(ctx: *mut AVFormatContext, codec: *const AVCodec) -> *mut AVStream;

  /// Allocate the stream private data and write the stream header
  pub fn avformat_write_header(ctx: *mut AVFormatContext, options: *mut *mut AVDictionary)
    -> c_int;

  /// Write a packet, buffering internally to ensure correct interleaving
  ///
  /// Takes ownership of the packet's reference; the packet is blank on return.
  pub fn av_interleaved_write_frame(ctx: *mut AVFormatContext, pkt: *mut AVPacket) -> c_int;

  /// Write a packet directly to the muxer without interleaving
  ///
  /// A NULL packet flushes the muxer.
  pub fn av_write_frame(ctx: *mut AVFormatContext, pkt: *mut AVPacket) -> c_int;

  /// Write the stream trailer and free the file private data
  pub fn av_write_trailer(ctx: *mut AVFormatContext) -> c_int;

  // ========================================================================
  // Input Context (Demuxing)
  // ========================================================================

  /// Open an input stream and read the header
  ///
  /// A pre-allocated context with a custom pb gets `AVFMT_FLAG_CUSTOM_IO`.
  /// On failure the user-supplied context is freed and `*ps` set to NULL.
  pub fn avformat_open_input(
    ps: *mut *mut AVFormatContext,
    url: *const c_char,
    fmt: *const AVInputFormat,
    options: *mut *mut AVDictionary,
  ) -> c_int;

  /// Close an opened input AVFormatContext, free it and all its contents
  pub fn avformat_close_input(s: *mut *mut AVFormatContext);

  /// Read packets of a media file to get stream information
  pub fn avformat_find_stream_info(
    ic: *mut AVFormatContext,
    options: *mut *mut AVDictionary,
  ) -> c_int;

  /// Find the "best" stream in the file
  ///
  /// # Returns
  /// Stream index >= 0, AVERROR_STREAM_NOT_FOUND or AVERROR_DECODER_NOT_FOUND
  pub fn av_find_best_stream(
    ic: *mut AVFormatContext,
    media_type: c_int,
    wanted_stream_nb: c_int,
    related_stream: c_int,
    decoder_ret: *mut *const AVCodec,
    flags: c_int,
  ) -> c_int;

  /// Return the next frame of a stream
  ///
  /// # Returns
  /// * 0 on success
  /// * AVERROR_EOF at end of file
  pub fn av_read_frame(s: *mut AVFormatContext, pkt: *mut AVPacket) -> c_int;

  /// Seek to the keyframe at timestamp
  ///
  /// `stream_index` -1 means `timestamp` is in AV_TIME_BASE units.
  pub fn av_seek_frame(
    s: *mut AVFormatContext,
    stream_index: c_int,
    timestamp: i64,
    flags: c_int,
  ) -> c_int;

  /// Print detailed information about the format through av_log
  pub fn av_dump_format(
    ic: *mut AVFormatContext,
    index: c_int,
    url: *const c_char,
    is_output: c_int,
  );

  // ========================================================================
  // Format Registry
  // ========================================================================

  /// Iterate over all registered muxers
  pub fn av_muxer_iterate(opaque: *mut *mut c_void) -> *const AVOutputFormat;

  /// Iterate over all registered demuxers
  pub fn av_demuxer_iterate(opaque: *mut *mut c_void) -> *const AVInputFormat;

  /// Find an input format by short name
  pub fn av_find_input_format(short_name: *const c_char) -> *const AVInputFormat;

  /// Guess the output format by short name, filename, or MIME type
  pub fn av_guess_format(
    short_name: *const c_char,
    filename: *const c_char,
    mime_type: *const c_char,
  ) -> *const AVOutputFormat;

  /// The AVClass of AVFormatContext, for option introspection
  pub fn avformat_get_class() -> *const AVClass;

  // ========================================================================
  // Stream Helpers
  // ========================================================================

  /// Human-readable name of a single disposition flag, NULL for unknown
  pub fn av_disposition_to_string(disposition: c_int) -> *const c_char;

  /// Disposition flag for a name, negative AVERROR if unknown
  pub fn av_disposition_from_string(disp: *const c_char) -> c_int;

  // ========================================================================
  // I/O Context (Custom I/O)
  // ========================================================================

  /// Allocate and initialize an AVIOContext for custom I/O
  ///
  /// # Arguments
  /// * `buffer` - Memory block for buffering (must be allocated with av_malloc)
  /// * `buffer_size` - Size of the buffer
  /// * `write_flag` - 1 if the buffer should be writable, 0 otherwise
  /// * `opaque` - User-provided opaque pointer passed to callbacks
  /// * `read_packet` - Read callback (NULL for write-only)
  /// * `write_packet` - Write callback (NULL for read-only)
  /// * `seek` - Seek callback (NULL for non-seekable)
  ///
  /// # Safety
  /// FFmpeg may replace the buffer with another av_malloc'd block; the
  /// current `AVIOContext.buffer` must be freed with av_freep before
  /// avio_context_free.
  pub fn avio_alloc_context(
    buffer: *mut u8,
    buffer_size: c_int,
    write_flag: c_int,
    opaque: *mut c_void,
    read_packet: Option<ReadPacketFn>,
    write_packet: Option<WritePacketFn>,
    seek: Option<SeekFn>,
  ) -> *mut AVIOContext;

  /// Free the supplied IO context and everything associated with it
  ///
  /// # Safety
  /// The internal buffer is NOT freed. Caller must free it separately.
  pub fn avio_context_free(s: *mut *mut AVIOContext);

  /// Force flushing of buffered data to the output
  pub fn avio_flush(s: *mut AVIOContext);

  /// Read size bytes into buf; returns bytes read or AVERROR
  pub fn avio_read(s: *mut AVIOContext, buf: *mut u8, size: c_int) -> c_int;

  /// Write size bytes from buf
  pub fn avio_write(s: *mut AVIOContext, buf: *const u8, size: c_int);

  /// fseek() equivalent
  pub fn avio_seek(s: *mut AVIOContext, offset: i64, whence: c_int) -> i64;

  /// Get the filesize, or AVERROR
  pub fn avio_size(s: *mut AVIOContext) -> i64;

  /// Non-zero if and only if end of file has been reached
  pub fn avio_feof(s: *mut AVIOContext) -> c_int;

  /// Create and initialize an AVIOContext for accessing the resource at url
  pub fn avio_open(s: *mut *mut AVIOContext, url: *const c_char, flags: c_int) -> c_int;

  /// Close the resource and free it, setting the pointer to NULL
  pub fn avio_closep(s: *mut *mut AVIOContext) -> c_int;

  // ========================================================================
  // Version Information
  // ========================================================================

  pub fn avformat_version() -> c_uint;
  pub fn avformat_configuration() -> *const c_char;
  pub fn avformat_license() -> *const c_char;
}
