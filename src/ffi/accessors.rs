//! Rust declarations for C accessor functions
//!
//! These functions provide access to FFmpeg struct fields via the thin C accessor library.

use super::types::*;
use std::os::raw::{c_char, c_int, c_uint, c_void};

/// Sink receiving one formatted av_log line at a time
pub type LogSinkFn = unsafe extern "C" fn(level: c_int, line: *const c_char);

unsafe extern "C" {
  // ========================================================================
  // AVIOContext
  // ========================================================================

  pub fn fffio_get_seekable(s: *const AVIOContext) -> c_int;
  pub fn fffio_get_error(s: *const AVIOContext) -> c_int;
  pub fn fffio_clear_error(s: *mut AVIOContext);

  /// Free the current internal buffer, then the context; sets `*s` to NULL
  pub fn fffio_release(s: *mut *mut AVIOContext);

  // ========================================================================
  // AVFormatContext
  // ========================================================================

  pub fn fffmt_get_nb_streams(ctx: *const AVFormatContext) -> c_uint;
  pub fn fffmt_get_stream(ctx: *const AVFormatContext, index: c_uint) -> *mut AVStream;
  pub fn fffmt_get_duration(ctx: *const AVFormatContext) -> i64;
  pub fn fffmt_get_start_time(ctx: *const AVFormatContext) -> i64;
  pub fn fffmt_get_bit_rate(ctx: *const AVFormatContext) -> i64;

  pub fn fffmt_set_pb(ctx: *mut AVFormatContext, pb: *mut AVIOContext);
  pub fn fffmt_get_pb_ptr(ctx: *mut AVFormatContext) -> *mut *mut AVIOContext;
  pub fn fffmt_get_flags(ctx: *const AVFormatContext) -> c_int;
  pub fn fffmt_set_flags(ctx: *mut AVFormatContext, flags: c_int);
  pub fn fffmt_get_metadata(ctx: *const AVFormatContext) -> *mut AVDictionary;
  pub fn fffmt_get_metadata_ptr(ctx: *mut AVFormatContext) -> *mut *mut AVDictionary;
  pub fn fffmt_get_iformat(ctx: *const AVFormatContext) -> *const AVInputFormat;
  pub fn fffmt_get_oformat(ctx: *const AVFormatContext) -> *const AVOutputFormat;
  pub fn fffmt_get_url(ctx: *const AVFormatContext) -> *const c_char;
  pub fn fffmt_get_oformat_flags(ctx: *const AVFormatContext) -> c_int;

  // ========================================================================
  // AVInputFormat / AVOutputFormat
  // ========================================================================

  pub fn ffiformat_get_name(f: *const AVInputFormat) -> *const c_char;
  pub fn ffiformat_get_long_name(f: *const AVInputFormat) -> *const c_char;
  pub fn ffiformat_get_extensions(f: *const AVInputFormat) -> *const c_char;
  pub fn ffiformat_get_mime_type(f: *const AVInputFormat) -> *const c_char;
  pub fn ffiformat_get_flags(f: *const AVInputFormat) -> c_int;
  pub fn ffiformat_get_priv_class(f: *const AVInputFormat) -> *const AVClass;

  pub fn ffoformat_get_name(f: *const AVOutputFormat) -> *const c_char;
  pub fn ffoformat_get_long_name(f: *const AVOutputFormat) -> *const c_char;
  pub fn ffoformat_get_extensions(f: *const AVOutputFormat) -> *const c_char;
  pub fn ffoformat_get_mime_type(f: *const AVOutputFormat) -> *const c_char;
  pub fn ffoformat_get_flags(f: *const AVOutputFormat) -> c_int;
  pub fn ffoformat_get_audio_codec(f: *const AVOutputFormat) -> c_int;
  pub fn ffoformat_get_video_codec(f: *const AVOutputFormat) -> c_int;
  pub fn ffoformat_get_subtitle_codec(f: *const AVOutputFormat) -> c_int;
  pub fn ffoformat_get_priv_class(f: *const AVOutputFormat) -> *const AVClass;

  // ========================================================================
  // AVStream
  // ========================================================================

  pub fn ffstream_get_index(st: *const AVStream) -> c_int;
  pub fn ffstream_get_id(st: *const AVStream) -> c_int;
  pub fn ffstream_set_id(st: *mut AVStream, id: c_int);
  pub fn ffstream_get_time_base(st: *const AVStream, num: *mut c_int, den: *mut c_int);
  pub fn ffstream_set_time_base(st: *mut AVStream, num: c_int, den: c_int);
  pub fn ffstream_get_start_time(st: *const AVStream) -> i64;
  pub fn ffstream_get_duration(st: *const AVStream) -> i64;
  pub fn ffstream_get_nb_frames(st: *const AVStream) -> i64;
  pub fn ffstream_get_disposition(st: *const AVStream) -> c_int;
  pub fn ffstream_set_disposition(st: *mut AVStream, disposition: c_int);
  pub fn ffstream_get_avg_frame_rate(st: *const AVStream, num: *mut c_int, den: *mut c_int);
  pub fn ffstream_get_r_frame_rate(st: *const AVStream, num: *mut c_int, den: *mut c_int);
  pub fn ffstream_get_sample_aspect_ratio(st: *const AVStream, num: *mut c_int, den: *mut c_int);
  pub fn ffstream_get_codecpar(st: *mut AVStream) -> *mut AVCodecParameters;
  pub fn ffstream_get_codecpar_const(st: *const AVStream) -> *const AVCodecParameters;
  pub fn ffstream_get_metadata(st: *const AVStream) -> *mut AVDictionary;
  pub fn ffstream_get_metadata_ptr(st: *mut AVStream) -> *mut *mut AVDictionary;

  // ========================================================================
  // AVCodecParameters
  // ========================================================================

  pub fn ffcodecpar_get_codec_type(p: *const AVCodecParameters) -> c_int;
  pub fn ffcodecpar_get_codec_id(p: *const AVCodecParameters) -> c_int;
  pub fn ffcodecpar_get_codec_tag(p: *const AVCodecParameters) -> u32;
  pub fn ffcodecpar_get_format(p: *const AVCodecParameters) -> c_int;
  pub fn ffcodecpar_get_bit_rate(p: *const AVCodecParameters) -> i64;
  pub fn ffcodecpar_get_width(p: *const AVCodecParameters) -> c_int;
  pub fn ffcodecpar_get_height(p: *const AVCodecParameters) -> c_int;
  pub fn ffcodecpar_get_sample_rate(p: *const AVCodecParameters) -> c_int;
  pub fn ffcodecpar_get_channels(p: *const AVCodecParameters) -> c_int;
  pub fn ffcodecpar_get_frame_size(p: *const AVCodecParameters) -> c_int;
  pub fn ffcodecpar_get_profile(p: *const AVCodecParameters) -> c_int;
  pub fn ffcodecpar_get_level(p: *const AVCodecParameters) -> c_int;
  pub fn ffcodecpar_get_color_range(p: *const AVCodecParameters) -> c_int;
  pub fn ffcodecpar_get_color_primaries(p: *const AVCodecParameters) -> c_int;
  pub fn ffcodecpar_get_color_trc(p: *const AVCodecParameters) -> c_int;
  pub fn ffcodecpar_get_color_space(p: *const AVCodecParameters) -> c_int;
  pub fn ffcodecpar_get_chroma_location(p: *const AVCodecParameters) -> c_int;
  pub fn ffcodecpar_get_field_order(p: *const AVCodecParameters) -> c_int;
  pub fn ffcodecpar_get_bits_per_coded_sample(p: *const AVCodecParameters) -> c_int;
  pub fn ffcodecpar_get_extradata(p: *const AVCodecParameters) -> *const u8;
  pub fn ffcodecpar_get_extradata_size(p: *const AVCodecParameters) -> c_int;
  pub fn ffcodecpar_get_sample_aspect_ratio(
    p: *const AVCodecParameters,
    num: *mut c_int,
    den: *mut c_int,
  );
  pub fn ffcodecpar_describe_ch_layout(
    p: *const AVCodecParameters,
    buf: *mut c_char,
    size: usize,
  ) -> c_int;

  pub fn ffcodecpar_set_codec_type(p: *mut AVCodecParameters, codec_type: c_int);
  pub fn ffcodecpar_set_codec_id(p: *mut AVCodecParameters, codec_id: c_int);
  pub fn ffcodecpar_set_codec_tag(p: *mut AVCodecParameters, tag: u32);
  pub fn ffcodecpar_set_format(p: *mut AVCodecParameters, format: c_int);
  pub fn ffcodecpar_set_bit_rate(p: *mut AVCodecParameters, bit_rate: i64);
  pub fn ffcodecpar_set_width(p: *mut AVCodecParameters, width: c_int);
  pub fn ffcodecpar_set_height(p: *mut AVCodecParameters, height: c_int);
  pub fn ffcodecpar_set_sample_rate(p: *mut AVCodecParameters, sample_rate: c_int);
  pub fn ffcodecpar_set_frame_size(p: *mut AVCodecParameters, frame_size: c_int);
  /// Replaces the channel layout with the default layout for `channels`
  pub fn ffcodecpar_set_channels(p: *mut AVCodecParameters, channels: c_int);
  /// Copies `size` bytes into a freshly padded extradata buffer
  pub fn ffcodecpar_set_extradata(p: *mut AVCodecParameters, data: *const u8, size: c_int)
    -> c_int;

  // ========================================================================
  // AVPacket
  // ========================================================================

  pub fn ffpkt_data(pkt: *const AVPacket) -> *const u8;
  pub fn ffpkt_data_mut(pkt: *mut AVPacket) -> *mut u8;
  pub fn ffpkt_size(pkt: *const AVPacket) -> c_int;
  pub fn ffpkt_pts(pkt: *const AVPacket) -> i64;
  pub fn ffpkt_dts(pkt: *const AVPacket) -> i64;
  pub fn ffpkt_duration(pkt: *const AVPacket) -> i64;
  pub fn ffpkt_flags(pkt: *const AVPacket) -> c_int;
  pub fn ffpkt_stream_index(pkt: *const AVPacket) -> c_int;
  pub fn ffpkt_pos(pkt: *const AVPacket) -> i64;

  pub fn ffpkt_set_pts(pkt: *mut AVPacket, pts: i64);
  pub fn ffpkt_set_dts(pkt: *mut AVPacket, dts: i64);
  pub fn ffpkt_set_duration(pkt: *mut AVPacket, duration: i64);
  pub fn ffpkt_set_flags(pkt: *mut AVPacket, flags: c_int);
  pub fn ffpkt_set_stream_index(pkt: *mut AVPacket, stream_index: c_int);
  pub fn ffpkt_set_pos(pkt: *mut AVPacket, pos: i64);

  // ========================================================================
  // AVFrame
  // ========================================================================

  pub fn ffframe_get_width(f: *const AVFrame) -> c_int;
  pub fn ffframe_get_height(f: *const AVFrame) -> c_int;
  pub fn ffframe_get_format(f: *const AVFrame) -> c_int;
  pub fn ffframe_get_pts(f: *const AVFrame) -> i64;
  pub fn ffframe_get_duration(f: *const AVFrame) -> i64;
  pub fn ffframe_get_pict_type(f: *const AVFrame) -> c_int;
  pub fn ffframe_get_color_range(f: *const AVFrame) -> c_int;
  pub fn ffframe_get_color_primaries(f: *const AVFrame) -> c_int;
  pub fn ffframe_get_color_trc(f: *const AVFrame) -> c_int;
  pub fn ffframe_get_colorspace(f: *const AVFrame) -> c_int;
  pub fn ffframe_get_nb_samples(f: *const AVFrame) -> c_int;
  pub fn ffframe_get_sample_rate(f: *const AVFrame) -> c_int;
  pub fn ffframe_get_channels(f: *const AVFrame) -> c_int;
  pub fn ffframe_get_key_frame(f: *const AVFrame) -> c_int;

  pub fn ffframe_set_key_frame(f: *mut AVFrame, key: c_int);
  pub fn ffframe_set_width(f: *mut AVFrame, width: c_int);
  pub fn ffframe_set_height(f: *mut AVFrame, height: c_int);
  pub fn ffframe_set_format(f: *mut AVFrame, format: c_int);
  pub fn ffframe_set_pts(f: *mut AVFrame, pts: i64);
  pub fn ffframe_set_duration(f: *mut AVFrame, duration: i64);
  pub fn ffframe_set_pict_type(f: *mut AVFrame, pict_type: c_int);
  pub fn ffframe_set_color_range(f: *mut AVFrame, range: c_int);
  pub fn ffframe_set_color_primaries(f: *mut AVFrame, primaries: c_int);
  pub fn ffframe_set_color_trc(f: *mut AVFrame, trc: c_int);
  pub fn ffframe_set_colorspace(f: *mut AVFrame, colorspace: c_int);
  pub fn ffframe_set_nb_samples(f: *mut AVFrame, nb_samples: c_int);
  pub fn ffframe_set_sample_rate(f: *mut AVFrame, sample_rate: c_int);
  pub fn ffframe_set_channels(f: *mut AVFrame, channels: c_int);

  pub fn ffframe_data(f: *mut AVFrame, plane: c_int) -> *mut u8;
  pub fn ffframe_linesize(f: *const AVFrame, plane: c_int) -> c_int;

  // ========================================================================
  // AVCodecContext
  // ========================================================================

  pub fn ffctx_get_codec_type(c: *const AVCodecContext) -> c_int;
  pub fn ffctx_get_codec_id(c: *const AVCodecContext) -> c_int;
  pub fn ffctx_get_width(c: *const AVCodecContext) -> c_int;
  pub fn ffctx_get_height(c: *const AVCodecContext) -> c_int;
  pub fn ffctx_get_pix_fmt(c: *const AVCodecContext) -> c_int;
  pub fn ffctx_get_sample_fmt(c: *const AVCodecContext) -> c_int;
  pub fn ffctx_get_sample_rate(c: *const AVCodecContext) -> c_int;
  pub fn ffctx_get_channels(c: *const AVCodecContext) -> c_int;
  pub fn ffctx_get_frame_size(c: *const AVCodecContext) -> c_int;
  pub fn ffctx_get_bit_rate(c: *const AVCodecContext) -> i64;
  pub fn ffctx_get_flags(c: *const AVCodecContext) -> c_int;
  pub fn ffctx_get_time_base(c: *const AVCodecContext, num: *mut c_int, den: *mut c_int);

  pub fn ffctx_set_width(c: *mut AVCodecContext, width: c_int);
  pub fn ffctx_set_height(c: *mut AVCodecContext, height: c_int);
  pub fn ffctx_set_pix_fmt(c: *mut AVCodecContext, pix_fmt: c_int);
  pub fn ffctx_set_sample_fmt(c: *mut AVCodecContext, sample_fmt: c_int);
  pub fn ffctx_set_sample_rate(c: *mut AVCodecContext, sample_rate: c_int);
  pub fn ffctx_set_bit_rate(c: *mut AVCodecContext, bit_rate: i64);
  pub fn ffctx_set_gop_size(c: *mut AVCodecContext, gop_size: c_int);
  pub fn ffctx_set_thread_count(c: *mut AVCodecContext, thread_count: c_int);
  pub fn ffctx_set_flags(c: *mut AVCodecContext, flags: c_int);
  pub fn ffctx_set_channels(c: *mut AVCodecContext, channels: c_int);
  pub fn ffctx_set_time_base(c: *mut AVCodecContext, num: c_int, den: c_int);
  pub fn ffctx_set_framerate(c: *mut AVCodecContext, num: c_int, den: c_int);

  // ========================================================================
  // AVCodec / AVCodecDescriptor
  // ========================================================================

  pub fn ffcodec_get_name(c: *const AVCodec) -> *const c_char;
  pub fn ffcodec_get_long_name(c: *const AVCodec) -> *const c_char;
  pub fn ffcodec_get_wrapper_name(c: *const AVCodec) -> *const c_char;
  pub fn ffcodec_get_type(c: *const AVCodec) -> c_int;
  pub fn ffcodec_get_id(c: *const AVCodec) -> c_int;
  pub fn ffcodec_get_capabilities(c: *const AVCodec) -> c_int;
  pub fn ffcodec_get_priv_class(c: *const AVCodec) -> *const AVClass;

  pub fn ffcodecdesc_get_id(d: *const AVCodecDescriptor) -> c_int;
  pub fn ffcodecdesc_get_type(d: *const AVCodecDescriptor) -> c_int;
  pub fn ffcodecdesc_get_name(d: *const AVCodecDescriptor) -> *const c_char;
  pub fn ffcodecdesc_get_long_name(d: *const AVCodecDescriptor) -> *const c_char;
  pub fn ffcodecdesc_get_props(d: *const AVCodecDescriptor) -> c_int;

  // ========================================================================
  // AVFilter / AVFilterContext / AVFilterGraph / AVFilterInOut
  // ========================================================================

  pub fn fffilter_get_name(f: *const AVFilter) -> *const c_char;
  pub fn fffilter_get_description(f: *const AVFilter) -> *const c_char;
  pub fn fffilter_get_flags(f: *const AVFilter) -> c_int;
  pub fn fffilter_get_inputs(f: *const AVFilter) -> *const AVFilterPad;
  pub fn fffilter_get_outputs(f: *const AVFilter) -> *const AVFilterPad;
  pub fn fffilter_get_priv_class(f: *const AVFilter) -> *const AVClass;

  pub fn fffilterctx_get_name(c: *const AVFilterContext) -> *const c_char;
  pub fn fffilterctx_get_filter(c: *const AVFilterContext) -> *const AVFilter;
  pub fn fffilterctx_get_nb_inputs(c: *const AVFilterContext) -> c_uint;
  pub fn fffilterctx_get_nb_outputs(c: *const AVFilterContext) -> c_uint;

  pub fn ffgraph_get_nb_filters(g: *const AVFilterGraph) -> c_uint;
  pub fn ffgraph_get_filter(g: *const AVFilterGraph, index: c_uint) -> *mut AVFilterContext;

  /// Allocate an endpoint named `name` in front of `next`; NULL on allocation failure
  pub fn ffinout_prepend(
    name: *const c_char,
    ctx: *mut AVFilterContext,
    pad_idx: c_int,
    next: *mut AVFilterInOut,
  ) -> *mut AVFilterInOut;

  // ========================================================================
  // AVDictionaryEntry
  // ========================================================================

  pub fn ffdictentry_get_key(e: *const AVDictionaryEntry) -> *const c_char;
  pub fn ffdictentry_get_value(e: *const AVDictionaryEntry) -> *const c_char;

  // ========================================================================
  // AVOption
  // ========================================================================

  pub fn ffopt_get_name(o: *const AVOption) -> *const c_char;
  pub fn ffopt_get_help(o: *const AVOption) -> *const c_char;
  pub fn ffopt_get_unit(o: *const AVOption) -> *const c_char;
  pub fn ffopt_get_flags(o: *const AVOption) -> c_int;
  pub fn ffopt_get_min(o: *const AVOption) -> f64;
  pub fn ffopt_get_max(o: *const AVOption) -> f64;
  pub fn ffopt_get_default_i64(o: *const AVOption) -> i64;
  pub fn ffopt_get_default_dbl(o: *const AVOption) -> f64;
  pub fn ffopt_get_default_str(o: *const AVOption) -> *const c_char;
  /// Release-independent option type code, -1 for types this binding does not know
  pub fn ffopt_get_kind(o: *const AVOption) -> c_int;

  // ========================================================================
  // AVPixFmtDescriptor
  // ========================================================================

  pub fn ffpixdesc_get_name(d: *const AVPixFmtDescriptor) -> *const c_char;
  pub fn ffpixdesc_get_alias(d: *const AVPixFmtDescriptor) -> *const c_char;
  pub fn ffpixdesc_get_nb_components(d: *const AVPixFmtDescriptor) -> c_int;
  pub fn ffpixdesc_get_log2_chroma_w(d: *const AVPixFmtDescriptor) -> c_int;
  pub fn ffpixdesc_get_log2_chroma_h(d: *const AVPixFmtDescriptor) -> c_int;
  pub fn ffpixdesc_get_flags(d: *const AVPixFmtDescriptor) -> u64;

  // ========================================================================
  // Logging
  // ========================================================================

  /// Route av_log through `sink`, one formatted line per call
  pub fn fflog_install(sink: LogSinkFn);
  /// Reinstate av_log_default_callback
  pub fn fflog_restore_default();
}
