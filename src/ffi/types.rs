//! Core FFmpeg type definitions
//!
//! All FFmpeg structs are opaque (zero-sized) to avoid version-specific layout dependencies.
//! Field access is done via the thin C accessor library in accessors.c

use std::marker::PhantomData;
use std::os::raw::c_int;

// ============================================================================
// Rational Number
// ============================================================================

/// Rational number for time bases and frame rates
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct AVRational {
  /// Numerator
  pub num: c_int,
  /// Denominator
  pub den: c_int,
}

impl AVRational {
  pub const fn new(num: c_int, den: c_int) -> Self {
    Self { num, den }
  }

  pub fn as_f64(&self) -> f64 {
    if self.den == 0 {
      0.0
    } else {
      self.num as f64 / self.den as f64
    }
  }

  /// `0/0` and `0/1` both mean "unset" in FFmpeg
  pub fn is_zero(&self) -> bool {
    self.num == 0
  }

  /// Microsecond time base (1/1000000), the unit of `AV_TIME_BASE`
  pub const MICROSECONDS: Self = Self {
    num: 1,
    den: AV_TIME_BASE as c_int,
  };
}

impl serde::Serialize for AVRational {
  fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&format_args!("{}/{}", self.num, self.den))
  }
}

// ============================================================================
// Opaque FFmpeg Types
// ============================================================================

macro_rules! opaque_types {
  ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
    $(
      $(#[$meta])*
      #[repr(C)]
      pub struct $name {
        _opaque: [u8; 0],
        _marker: PhantomData<(*mut u8, std::marker::PhantomPinned)>,
      }
    )*
  };
}

opaque_types! {
  /// Codec implementation (static registry entry)
  AVCodec,
  /// Encoder/decoder instance
  AVCodecContext,
  /// Static per-codec-id description
  AVCodecDescriptor,
  /// Stream codec parameters
  AVCodecParameters,
  /// Uncompressed video/audio data
  AVFrame,
  /// Compressed data
  AVPacket,
  /// Demuxer or muxer instance
  AVFormatContext,
  /// Elementary stream inside a format context
  AVStream,
  /// Buffered byte I/O
  AVIOContext,
  /// Demuxer descriptor
  AVInputFormat,
  /// Muxer descriptor
  AVOutputFormat,
  /// Filter descriptor
  AVFilter,
  /// Filter pad array
  AVFilterPad,
  /// Filter instance inside a graph
  AVFilterContext,
  /// Filter graph
  AVFilterGraph,
  /// Linked list of open graph endpoints used by avfilter_graph_parse_ptr
  AVFilterInOut,
  /// Key-value options
  AVDictionary,
  /// Single dictionary entry
  AVDictionaryEntry,
  /// AVOptions table entry
  AVOption,
  /// Class descriptor carrying an options table
  AVClass,
  /// Pixel format descriptor
  AVPixFmtDescriptor,
}

// ============================================================================
// Constants
// ============================================================================

/// No timestamp value
pub const AV_NOPTS_VALUE: i64 = 0x8000000000000000u64 as i64;

/// Internal time base (microseconds)
pub const AV_TIME_BASE: i64 = 1_000_000;

/// Extra bytes allocated past the end of packet and extradata buffers
pub const AV_INPUT_BUFFER_PADDING_SIZE: usize = 64;

/// Maximum number of data planes in an AVFrame
pub const AV_NUM_DATA_POINTERS: usize = 8;

/// Packet flags
pub mod pkt_flag {
  use std::os::raw::c_int;

  pub const KEY: c_int = 0x0001;
  pub const CORRUPT: c_int = 0x0002;
  pub const DISCARD: c_int = 0x0004;
  pub const TRUSTED: c_int = 0x0008;
  pub const DISPOSABLE: c_int = 0x0010;
}

/// Seek whence values understood by AVIOContext seek callbacks
pub mod seek_whence {
  use std::os::raw::c_int;

  pub const SEEK_SET: c_int = 0;
  pub const SEEK_CUR: c_int = 1;
  pub const SEEK_END: c_int = 2;
  /// Return the stream size without seeking
  pub const AVSEEK_SIZE: c_int = 0x10000;
  /// Hint that the seek may be expensive; ORed into the other values
  pub const AVSEEK_FORCE: c_int = 0x20000;
}

/// avio_open flags
pub mod avio_flag {
  use std::os::raw::c_int;

  pub const READ: c_int = 1;
  pub const WRITE: c_int = 2;
  pub const READ_WRITE: c_int = READ | WRITE;
}

/// AVIOContext.seekable bits
pub mod avio_seekable {
  use std::os::raw::c_int;

  pub const NORMAL: c_int = 1 << 0;
  pub const TIME: c_int = 1 << 1;
}

/// AVInputFormat / AVOutputFormat flags
pub mod avfmt_flag {
  use std::os::raw::c_int;

  pub const NOFILE: c_int = 0x0001;
  pub const NEEDNUMBER: c_int = 0x0002;
  pub const EXPERIMENTAL: c_int = 0x0004;
  pub const SHOW_IDS: c_int = 0x0008;
  pub const GLOBALHEADER: c_int = 0x0040;
  pub const NOTIMESTAMPS: c_int = 0x0080;
  pub const GENERIC_INDEX: c_int = 0x0100;
  pub const TS_DISCONT: c_int = 0x0200;
  pub const VARIABLE_FPS: c_int = 0x0400;
  pub const NODIMENSIONS: c_int = 0x0800;
  pub const NOSTREAMS: c_int = 0x1000;
  pub const NOBINSEARCH: c_int = 0x2000;
  pub const NOGENSEARCH: c_int = 0x4000;
  pub const NO_BYTE_SEEK: c_int = 0x8000;
  pub const TS_NONSTRICT: c_int = 0x20000;
  pub const TS_NEGATIVE: c_int = 0x40000;
  pub const SEEK_TO_PTS: c_int = 0x4000000;
}

/// AVFormatContext.flags
pub mod avfmt_ctx_flag {
  use std::os::raw::c_int;

  pub const GENPTS: c_int = 0x0001;
  pub const IGNIDX: c_int = 0x0002;
  pub const NONBLOCK: c_int = 0x0004;
  pub const IGNDTS: c_int = 0x0008;
  pub const NOFILLIN: c_int = 0x0010;
  pub const NOPARSE: c_int = 0x0020;
  pub const NOBUFFER: c_int = 0x0040;
  /// The caller has supplied a custom AVIOContext; FFmpeg will not close it
  pub const CUSTOM_IO: c_int = 0x0080;
  pub const DISCARD_CORRUPT: c_int = 0x0100;
  pub const FLUSH_PACKETS: c_int = 0x0200;
}

/// av_seek_frame flags
pub mod avseek_flag {
  use std::os::raw::c_int;

  pub const BACKWARD: c_int = 1;
  pub const BYTE: c_int = 2;
  pub const ANY: c_int = 4;
  pub const FRAME: c_int = 8;
}

/// av_dict_set / av_dict_get flags
pub mod dict_flag {
  use std::os::raw::c_int;

  pub const MATCH_CASE: c_int = 1;
  pub const IGNORE_SUFFIX: c_int = 2;
  pub const DONT_STRDUP_KEY: c_int = 4;
  pub const DONT_STRDUP_VAL: c_int = 8;
  pub const DONT_OVERWRITE: c_int = 16;
  pub const APPEND: c_int = 32;
  pub const MULTIKEY: c_int = 64;
}

/// av_opt_* search flags
pub mod opt_search {
  use std::os::raw::c_int;

  pub const CHILDREN: c_int = 1 << 0;
  pub const FAKE_OBJ: c_int = 1 << 1;
}

/// AVOption.flags
pub mod opt_flag {
  use std::os::raw::c_int;

  pub const ENCODING_PARAM: c_int = 1 << 0;
  pub const DECODING_PARAM: c_int = 1 << 1;
  pub const AUDIO_PARAM: c_int = 1 << 3;
  pub const VIDEO_PARAM: c_int = 1 << 4;
  pub const SUBTITLE_PARAM: c_int = 1 << 5;
  pub const EXPORT: c_int = 1 << 6;
  pub const READONLY: c_int = 1 << 7;
  pub const BSF_PARAM: c_int = 1 << 8;
  pub const RUNTIME_PARAM: c_int = 1 << 15;
  pub const FILTERING_PARAM: c_int = 1 << 16;
  pub const DEPRECATED: c_int = 1 << 17;
}

/// Log levels for av_log_set_level
pub mod log_level {
  use std::os::raw::c_int;

  pub const QUIET: c_int = -8;
  pub const PANIC: c_int = 0;
  pub const FATAL: c_int = 8;
  pub const ERROR: c_int = 16;
  pub const WARNING: c_int = 24;
  pub const INFO: c_int = 32;
  pub const VERBOSE: c_int = 40;
  pub const DEBUG: c_int = 48;
  pub const TRACE: c_int = 56;
}

/// AVStream.disposition bits
pub mod disposition {
  use std::os::raw::c_int;

  pub const DEFAULT: c_int = 1 << 0;
  pub const DUB: c_int = 1 << 1;
  pub const ORIGINAL: c_int = 1 << 2;
  pub const COMMENT: c_int = 1 << 3;
  pub const LYRICS: c_int = 1 << 4;
  pub const KARAOKE: c_int = 1 << 5;
  pub const FORCED: c_int = 1 << 6;
  pub const HEARING_IMPAIRED: c_int = 1 << 7;
  pub const VISUAL_IMPAIRED: c_int = 1 << 8;
  pub const CLEAN_EFFECTS: c_int = 1 << 9;
  pub const ATTACHED_PIC: c_int = 1 << 10;
  pub const TIMED_THUMBNAILS: c_int = 1 << 11;
  pub const NON_DIEGETIC: c_int = 1 << 12;
  pub const CAPTIONS: c_int = 1 << 16;
  pub const DESCRIPTIONS: c_int = 1 << 17;
  pub const METADATA: c_int = 1 << 18;
  pub const DEPENDENT: c_int = 1 << 19;
  pub const STILL_IMAGE: c_int = 1 << 20;
}

/// AVCodec.capabilities bits
pub mod codec_cap {
  use std::os::raw::c_int;

  pub const DRAW_HORIZ_BAND: c_int = 1 << 0;
  pub const DR1: c_int = 1 << 1;
  pub const DELAY: c_int = 1 << 5;
  pub const SMALL_LAST_FRAME: c_int = 1 << 6;
  pub const SUBFRAMES: c_int = 1 << 8;
  pub const EXPERIMENTAL: c_int = 1 << 9;
  pub const CHANNEL_CONF: c_int = 1 << 10;
  pub const FRAME_THREADS: c_int = 1 << 12;
  pub const SLICE_THREADS: c_int = 1 << 13;
  pub const PARAM_CHANGE: c_int = 1 << 14;
  pub const OTHER_THREADS: c_int = 1 << 15;
  pub const VARIABLE_FRAME_SIZE: c_int = 1 << 16;
  pub const AVOID_PROBING: c_int = 1 << 17;
  pub const HARDWARE: c_int = 1 << 18;
  pub const HYBRID: c_int = 1 << 19;
  pub const ENCODER_REORDERED_OPAQUE: c_int = 1 << 20;
  pub const ENCODER_FLUSH: c_int = 1 << 21;
}

/// AVCodecDescriptor.props bits
pub mod codec_prop {
  use std::os::raw::c_int;

  pub const INTRA_ONLY: c_int = 1 << 0;
  pub const LOSSY: c_int = 1 << 1;
  pub const LOSSLESS: c_int = 1 << 2;
  pub const REORDER: c_int = 1 << 3;
  pub const FIELDS: c_int = 1 << 4;
  pub const BITMAP_SUB: c_int = 1 << 16;
  pub const TEXT_SUB: c_int = 1 << 17;
}

/// AVFilter.flags
pub mod filter_flag {
  use std::os::raw::c_int;

  pub const DYNAMIC_INPUTS: c_int = 1 << 0;
  pub const DYNAMIC_OUTPUTS: c_int = 1 << 1;
  pub const SLICE_THREADS: c_int = 1 << 2;
  pub const METADATA_ONLY: c_int = 1 << 3;
  pub const HWDEVICE: c_int = 1 << 4;
  pub const SUPPORT_TIMELINE_GENERIC: c_int = 1 << 16;
  pub const SUPPORT_TIMELINE_INTERNAL: c_int = 1 << 17;
}

/// AVPixFmtDescriptor.flags
pub mod pix_fmt_flag {
  pub const BE: u64 = 1 << 0;
  pub const PAL: u64 = 1 << 1;
  pub const BITSTREAM: u64 = 1 << 2;
  pub const HWACCEL: u64 = 1 << 3;
  pub const PLANAR: u64 = 1 << 4;
  pub const RGB: u64 = 1 << 5;
  pub const ALPHA: u64 = 1 << 7;
  pub const BAYER: u64 = 1 << 8;
  pub const FLOAT: u64 = 1 << 9;
}

/// av_buffersink_get_frame_flags / av_buffersrc_add_frame_flags
pub mod buffersrc_flag {
  use std::os::raw::c_int;

  pub const NO_CHECK_FORMAT: c_int = 1;
  pub const PUSH: c_int = 4;
  pub const KEEP_REF: c_int = 8;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_rational_as_f64() {
    assert_eq!(AVRational::new(1, 2).as_f64(), 0.5);
    assert_eq!(AVRational::new(1, 0).as_f64(), 0.0);
    assert_eq!(AVRational::MICROSECONDS.den, 1_000_000);
  }

  #[test]
  fn test_rational_serializes_as_fraction() {
    let json = serde_json::to_string(&AVRational::new(1, 8000)).unwrap();
    assert_eq!(json, "\"1/8000\"");
  }

  #[test]
  fn test_nopts_is_min_i64() {
    assert_eq!(AV_NOPTS_VALUE, i64::MIN);
  }
}
