//! libavcodec function declarations
//!
//! Codec registry, codec contexts, packets and codec parameters.

use super::types::*;
use std::os::raw::{c_char, c_int, c_uint, c_void};

unsafe extern "C" {
  // ========================================================================
  // Codec Discovery
  // ========================================================================

  /// Find an encoder by codec ID
  pub fn avcodec_find_encoder(id: c_int) -> *const AVCodec;

  /// Find an encoder by name (e.g., "libx264", "pcm_s16le")
  pub fn avcodec_find_encoder_by_name(name: *const c_char) -> *const AVCodec;

  /// Find a decoder by codec ID
  pub fn avcodec_find_decoder(id: c_int) -> *const AVCodec;

  /// Find a decoder by name
  pub fn avcodec_find_decoder_by_name(name: *const c_char) -> *const AVCodec;

  /// Iterate over all registered codecs
  ///
  /// # Arguments
  /// * `opaque` - Cursor; must point to a NULL-initialized pointer before the first call
  pub fn av_codec_iterate(opaque: *mut *mut c_void) -> *const AVCodec;

  /// Non-zero if codec is an encoder
  pub fn av_codec_is_encoder(codec: *const AVCodec) -> c_int;

  /// Non-zero if codec is a decoder
  pub fn av_codec_is_decoder(codec: *const AVCodec) -> c_int;

  // ========================================================================
  // Codec Descriptors
  // ========================================================================

  /// Descriptor for the given codec ID, NULL if none
  pub fn avcodec_descriptor_get(id: c_int) -> *const AVCodecDescriptor;

  /// Iterate over all codec descriptors known to libavcodec
  pub fn avcodec_descriptor_next(prev: *const AVCodecDescriptor) -> *const AVCodecDescriptor;

  /// Descriptor with the given name, NULL if none
  pub fn avcodec_descriptor_get_by_name(name: *const c_char) -> *const AVCodecDescriptor;

  /// Name of a codec ID ("unknown_codec" when unknown, never NULL)
  pub fn avcodec_get_name(id: c_int) -> *const c_char;

  /// Media type of a codec ID
  pub fn avcodec_get_type(codec_id: c_int) -> c_int;

  // ========================================================================
  // Codec Context Lifecycle
  // ========================================================================

  /// Allocate an AVCodecContext and set its fields to default values
  pub fn avcodec_alloc_context3(codec: *const AVCodec) -> *mut AVCodecContext;

  /// Free the codec context and everything associated with it
  pub fn avcodec_free_context(avctx: *mut *mut AVCodecContext);

  /// Initialize the AVCodecContext to use the given AVCodec
  ///
  /// Entries of `options` the codec did not consume are left in the dictionary.
  pub fn avcodec_open2(
    avctx: *mut AVCodecContext,
    codec: *const AVCodec,
    options: *mut *mut AVDictionary,
  ) -> c_int;

  /// Non-zero if the context has been opened
  pub fn avcodec_is_open(avctx: *mut AVCodecContext) -> c_int;

  /// The AVClass of AVCodecContext, for option introspection
  pub fn avcodec_get_class() -> *const AVClass;

  // ========================================================================
  // Encoding (send frame, receive packet)
  // ========================================================================

  /// Supply a raw frame to the encoder
  ///
  /// # Returns
  /// * 0 on success
  /// * AVERROR(EAGAIN) - output not available, must read with receive_packet first
  /// * AVERROR_EOF - encoder has been flushed, no more output
  pub fn avcodec_send_frame(avctx: *mut AVCodecContext, frame: *const AVFrame) -> c_int;

  /// Read encoded data from the encoder
  ///
  /// # Returns
  /// * 0 on success
  /// * AVERROR(EAGAIN) - output not available, must send new input
  /// * AVERROR_EOF - encoder fully flushed
  pub fn avcodec_receive_packet(avctx: *mut AVCodecContext, avpkt: *mut AVPacket) -> c_int;

  // ========================================================================
  // Decoding (send packet, receive frame)
  // ========================================================================

  /// Supply raw packet data as input to a decoder (NULL packet to flush)
  pub fn avcodec_send_packet(avctx: *mut AVCodecContext, avpkt: *const AVPacket) -> c_int;

  /// Return decoded output data from a decoder
  pub fn avcodec_receive_frame(avctx: *mut AVCodecContext, frame: *mut AVFrame) -> c_int;

  /// Reset the internal codec state / flush internal buffers
  pub fn avcodec_flush_buffers(avctx: *mut AVCodecContext);

  // ========================================================================
  // Packet Management
  // ========================================================================

  /// Allocate an AVPacket and set its fields to default values
  pub fn av_packet_alloc() -> *mut AVPacket;

  /// Free the packet and unreference its buffer
  pub fn av_packet_free(pkt: *mut *mut AVPacket);

  /// Wipe the packet and unreference its buffer
  pub fn av_packet_unref(pkt: *mut AVPacket);

  /// Set up a new reference to the data described by src
  pub fn av_packet_ref(dst: *mut AVPacket, src: *const AVPacket) -> c_int;

  /// Create a new packet that references the same data as src
  pub fn av_packet_clone(src: *const AVPacket) -> *mut AVPacket;

  /// Allocate the payload of a packet (with padding)
  pub fn av_new_packet(pkt: *mut AVPacket, size: c_int) -> c_int;

  /// Ensure the packet data is writable, copying if needed
  pub fn av_packet_make_writable(pkt: *mut AVPacket) -> c_int;

  /// Convert valid timing fields in a packet from one timebase to another
  pub fn av_packet_rescale_ts(pkt: *mut AVPacket, tb_src: AVRational, tb_dst: AVRational);

  // ========================================================================
  // Codec Parameters
  // ========================================================================

  /// Allocate a new AVCodecParameters and set its fields to default values
  pub fn avcodec_parameters_alloc() -> *mut AVCodecParameters;

  /// Free an AVCodecParameters instance and everything associated with it
  pub fn avcodec_parameters_free(par: *mut *mut AVCodecParameters);

  /// Fill the parameters struct based on the values from the supplied codec context
  pub fn avcodec_parameters_from_context(
    par: *mut AVCodecParameters,
    codec: *const AVCodecContext,
  ) -> c_int;

  /// Fill the codec context based on the values from the supplied codec parameters
  pub fn avcodec_parameters_to_context(
    codec: *mut AVCodecContext,
    par: *const AVCodecParameters,
  ) -> c_int;

  /// Copy the contents of src to dst
  pub fn avcodec_parameters_copy(dst: *mut AVCodecParameters, src: *const AVCodecParameters)
    -> c_int;

  // ========================================================================
  // Version Information
  // ========================================================================

  pub fn avcodec_version() -> c_uint;
  pub fn avcodec_configuration() -> *const c_char;
  pub fn avcodec_license() -> *const c_char;
}

/// `AV_CODEC_ID_NONE`
pub const AV_CODEC_ID_NONE: c_int = 0;

/// `AV_CODEC_FLAG_GLOBAL_HEADER`: place global headers in extradata
pub const AV_CODEC_FLAG_GLOBAL_HEADER: c_int = 1 << 22;
