//! Native enum stringification
//!
//! Small, stable FFmpeg enums are mirrored as closed Rust enums with their
//! native discriminants. The large, release-dependent registries (pixel
//! formats, codec IDs) are open newtypes whose names come from the library.
//!
//! Every type offers a total `describe(raw)` that never fails: unknown raw
//! values render as `"<kind>(<raw>)"`.

use crate::ffi::{avcodec, avutil};
use std::borrow::Cow;
use std::fmt;
use std::os::raw::c_int;

macro_rules! native_enum {
  (
    $(#[$meta:meta])*
    pub enum $name:ident: $kind:literal {
      $( $(#[$vmeta:meta])* $variant:ident = $raw:expr => $label:literal, )*
    }
    sentinels = [$($sentinel:ident),*];
  ) => {
    $(#[$meta])*
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    #[repr(i32)]
    pub enum $name {
      $( $(#[$vmeta])* $variant = $raw, )*
    }

    impl $name {
      /// Prefix used by [`Self::describe`] for unrecognised values
      pub const KIND: &'static str = $kind;

      /// Every declared constant, in declaration order
      pub const ALL: &'static [$name] = &[$($name::$variant),*];

      /// Short FFmpeg name
      pub fn name(self) -> &'static str {
        match self {
          $( $name::$variant => $label, )*
        }
      }

      pub fn from_raw(raw: c_int) -> Option<Self> {
        match raw {
          $( r if r == $raw => Some($name::$variant), )*
          _ => None,
        }
      }

      #[inline]
      pub fn as_raw(self) -> c_int {
        self as c_int
      }

      /// Placeholder values that do not name a real constant
      pub fn is_sentinel(self) -> bool {
        false $( || self == $name::$sentinel )*
      }

      /// Reverse lookup; sentinels are never returned
      pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
          .iter()
          .copied()
          .find(|v| !v.is_sentinel() && v.name() == name)
      }

      /// Total name lookup for a raw value
      pub fn describe(raw: c_int) -> Cow<'static, str> {
        match Self::from_raw(raw) {
          Some(v) => Cow::Borrowed(v.name()),
          None => Cow::Owned(format!("{}({})", $kind, raw)),
        }
      }
    }

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
      }
    }

    impl serde::Serialize for $name {
      fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
      }
    }
  };
}

native_enum! {
  /// `AVMediaType`
  pub enum MediaType: "media_type" {
    Unknown = -1 => "unknown",
    Video = 0 => "video",
    Audio = 1 => "audio",
    Data = 2 => "data",
    Subtitle = 3 => "subtitle",
    Attachment = 4 => "attachment",
  }
  sentinels = [Unknown];
}

native_enum! {
  /// `AVSampleFormat`
  pub enum SampleFormat: "sample_fmt" {
    None = -1 => "none",
    U8 = 0 => "u8",
    S16 = 1 => "s16",
    S32 = 2 => "s32",
    Flt = 3 => "flt",
    Dbl = 4 => "dbl",
    U8p = 5 => "u8p",
    S16p = 6 => "s16p",
    S32p = 7 => "s32p",
    Fltp = 8 => "fltp",
    Dblp = 9 => "dblp",
    S64 = 10 => "s64",
    S64p = 11 => "s64p",
  }
  sentinels = [None];
}

native_enum! {
  /// `AVPictureType`
  pub enum PictureType: "pict_type" {
    None = 0 => "none",
    I = 1 => "I",
    P = 2 => "P",
    B = 3 => "B",
    S = 4 => "S",
    Si = 5 => "SI",
    Sp = 6 => "SP",
    Bi = 7 => "BI",
  }
  sentinels = [None];
}

native_enum! {
  /// `AVFieldOrder`
  pub enum FieldOrder: "field_order" {
    Unknown = 0 => "unknown",
    Progressive = 1 => "progressive",
    /// Top coded first, top displayed first
    Tt = 2 => "tt",
    /// Bottom coded first, bottom displayed first
    Bb = 3 => "bb",
    /// Top coded first, bottom displayed first
    Tb = 4 => "tb",
    /// Bottom coded first, top displayed first
    Bt = 5 => "bt",
  }
  sentinels = [Unknown];
}

native_enum! {
  /// `AVColorRange`
  pub enum ColorRange: "color_range" {
    Unspecified = 0 => "unknown",
    /// Limited range
    Mpeg = 1 => "tv",
    /// Full range
    Jpeg = 2 => "pc",
  }
  sentinels = [];
}

native_enum! {
  /// `AVColorPrimaries` (reserved values are left to the fallback)
  pub enum ColorPrimaries: "color_primaries" {
    Bt709 = 1 => "bt709",
    Unspecified = 2 => "unknown",
    Bt470m = 4 => "bt470m",
    Bt470bg = 5 => "bt470bg",
    Smpte170m = 6 => "smpte170m",
    Smpte240m = 7 => "smpte240m",
    Film = 8 => "film",
    Bt2020 = 9 => "bt2020",
    Smpte428 = 10 => "smpte428",
    Smpte431 = 11 => "smpte431",
    Smpte432 = 12 => "smpte432",
    Ebu3213 = 22 => "ebu3213",
  }
  sentinels = [];
}

native_enum! {
  /// `AVColorTransferCharacteristic` (reserved values are left to the fallback)
  pub enum ColorTransfer: "color_trc" {
    Bt709 = 1 => "bt709",
    Unspecified = 2 => "unknown",
    Gamma22 = 4 => "bt470m",
    Gamma28 = 5 => "bt470bg",
    Smpte170m = 6 => "smpte170m",
    Smpte240m = 7 => "smpte240m",
    Linear = 8 => "linear",
    Log = 9 => "log100",
    LogSqrt = 10 => "log316",
    Iec61966_2_4 = 11 => "iec61966-2-4",
    Bt1361Ecg = 12 => "bt1361e",
    Iec61966_2_1 = 13 => "iec61966-2-1",
    Bt2020_10 = 14 => "bt2020-10",
    Bt2020_12 = 15 => "bt2020-12",
    Smpte2084 = 16 => "smpte2084",
    Smpte428 = 17 => "smpte428",
    AribStdB67 = 18 => "arib-std-b67",
  }
  sentinels = [];
}

native_enum! {
  /// `AVColorSpace` (reserved values are left to the fallback)
  pub enum ColorSpace: "colorspace" {
    Rgb = 0 => "gbr",
    Bt709 = 1 => "bt709",
    Unspecified = 2 => "unknown",
    Fcc = 4 => "fcc",
    Bt470bg = 5 => "bt470bg",
    Smpte170m = 6 => "smpte170m",
    Smpte240m = 7 => "smpte240m",
    Ycgco = 8 => "ycgco",
    Bt2020Ncl = 9 => "bt2020nc",
    Bt2020Cl = 10 => "bt2020c",
    Smpte2085 = 11 => "smpte2085",
    ChromaDerivedNcl = 12 => "chroma-derived-nc",
    ChromaDerivedCl = 13 => "chroma-derived-c",
    Ictcp = 14 => "ictcp",
  }
  sentinels = [];
}

native_enum! {
  /// `AVChromaLocation`
  pub enum ChromaLocation: "chroma_location" {
    Unspecified = 0 => "unspecified",
    Left = 1 => "left",
    Center = 2 => "center",
    TopLeft = 3 => "topleft",
    Top = 4 => "top",
    BottomLeft = 5 => "bottomleft",
    Bottom = 6 => "bottom",
  }
  sentinels = [];
}

native_enum! {
  /// `AVOptionType`, numbered by the accessor shim so the values stay
  /// stable across FFmpeg releases
  pub enum OptionType: "opt_type" {
    Flags = 0 => "flags",
    Int = 1 => "int",
    Int64 = 2 => "int64",
    Double = 3 => "double",
    Float = 4 => "float",
    String = 5 => "string",
    Rational = 6 => "rational",
    Binary = 7 => "binary",
    Dict = 8 => "dictionary",
    UInt64 = 9 => "uint64",
    Const = 10 => "const",
    ImageSize = 11 => "image_size",
    PixelFmt = 12 => "pix_fmt",
    SampleFmt = 13 => "sample_fmt",
    VideoRate = 14 => "video_rate",
    Duration = 15 => "duration",
    Color = 16 => "color",
    Bool = 17 => "bool",
    ChannelLayout = 18 => "channel_layout",
  }
  sentinels = [];
}

// ============================================================================
// Open registries
// ============================================================================

/// `AVPixelFormat`
///
/// Open newtype: the set of formats depends on the linked libavutil, so
/// names and reverse lookups are delegated to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PixelFormat(c_int);

impl PixelFormat {
  pub const KIND: &'static str = "pix_fmt";

  pub const NONE: Self = Self(avutil::AV_PIX_FMT_NONE);
  pub const YUV420P: Self = Self(0);
  pub const YUYV422: Self = Self(1);
  pub const RGB24: Self = Self(2);
  pub const BGR24: Self = Self(3);
  pub const YUV422P: Self = Self(4);
  pub const YUV444P: Self = Self(5);
  pub const GRAY8: Self = Self(8);
  pub const PAL8: Self = Self(11);
  pub const YUVJ420P: Self = Self(12);
  pub const NV12: Self = Self(23);
  pub const NV21: Self = Self(24);
  pub const ARGB: Self = Self(25);
  pub const RGBA: Self = Self(26);
  pub const ABGR: Self = Self(27);
  pub const BGRA: Self = Self(28);

  #[inline]
  pub const fn from_raw(raw: c_int) -> Self {
    Self(raw)
  }

  #[inline]
  pub const fn as_raw(self) -> c_int {
    self.0
  }

  pub fn is_none(self) -> bool {
    self == Self::NONE
  }

  /// Library name, `None` for values unknown to the linked libavutil
  pub fn name(self) -> Option<&'static str> {
    unsafe { super::static_str(avutil::av_get_pix_fmt_name(self.0)) }
  }

  /// Reverse lookup; `"none"` and unknown names yield `None`
  pub fn from_name(name: &str) -> Option<Self> {
    let c_name = super::to_cstring(name).ok()?;
    let raw = unsafe { avutil::av_get_pix_fmt(c_name.as_ptr()) };
    (raw != avutil::AV_PIX_FMT_NONE).then_some(Self(raw))
  }

  pub fn describe(raw: c_int) -> Cow<'static, str> {
    match Self(raw).name() {
      Some(name) => Cow::Borrowed(name),
      None => Cow::Owned(format!("{}({})", Self::KIND, raw)),
    }
  }
}

impl fmt::Display for PixelFormat {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&Self::describe(self.0))
  }
}

impl serde::Serialize for PixelFormat {
  fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&Self::describe(self.0))
  }
}

/// `AVCodecID`
///
/// Open newtype backed by libavcodec's codec descriptor table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CodecId(c_int);

impl CodecId {
  pub const KIND: &'static str = "codec_id";

  pub const NONE: Self = Self(avcodec::AV_CODEC_ID_NONE);
  pub const MPEG2VIDEO: Self = Self(2);
  pub const MJPEG: Self = Self(7);
  pub const MPEG4: Self = Self(12);
  pub const RAWVIDEO: Self = Self(13);
  pub const H264: Self = Self(27);
  pub const VP8: Self = Self(139);
  pub const VP9: Self = Self(167);
  pub const HEVC: Self = Self(173);
  pub const AV1: Self = Self(226);
  pub const PCM_S16LE: Self = Self(0x10000);
  pub const PCM_S16BE: Self = Self(0x10001);
  pub const MP2: Self = Self(0x15000);
  pub const MP3: Self = Self(0x15001);
  pub const AAC: Self = Self(0x15002);
  pub const FLAC: Self = Self(0x1500c);

  #[inline]
  pub const fn from_raw(raw: c_int) -> Self {
    Self(raw)
  }

  #[inline]
  pub const fn as_raw(self) -> c_int {
    self.0
  }

  pub fn is_none(self) -> bool {
    self == Self::NONE
  }

  /// Descriptor name, `None` for IDs without a descriptor
  pub fn name(self) -> Option<&'static str> {
    let desc = unsafe { avcodec::avcodec_descriptor_get(self.0) };
    if desc.is_null() {
      return None;
    }
    unsafe { super::static_str(crate::ffi::accessors::ffcodecdesc_get_name(desc)) }
  }

  /// Reverse lookup through the descriptor table; `"none"` yields `None`
  pub fn from_name(name: &str) -> Option<Self> {
    let c_name = super::to_cstring(name).ok()?;
    let desc = unsafe { avcodec::avcodec_descriptor_get_by_name(c_name.as_ptr()) };
    if desc.is_null() {
      return None;
    }
    let id = Self(unsafe { crate::ffi::accessors::ffcodecdesc_get_id(desc) });
    (!id.is_none()).then_some(id)
  }

  /// Media type of the codec ID
  pub fn media_type(self) -> MediaType {
    MediaType::from_raw(unsafe { avcodec::avcodec_get_type(self.0) }).unwrap_or(MediaType::Unknown)
  }

  pub fn describe(raw: c_int) -> Cow<'static, str> {
    match Self(raw).name() {
      Some(name) => Cow::Borrowed(name),
      None => Cow::Owned(format!("{}({})", Self::KIND, raw)),
    }
  }
}

impl fmt::Display for CodecId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&Self::describe(self.0))
  }
}

impl serde::Serialize for CodecId {
  fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&Self::describe(self.0))
  }
}

// ============================================================================
// Library-backed name lookups for the closed enums
// ============================================================================

impl MediaType {
  /// Name as reported by `av_get_media_type_string`
  pub fn library_name(self) -> Option<&'static str> {
    unsafe { super::static_str(avutil::av_get_media_type_string(self.as_raw())) }
  }
}

impl PictureType {
  /// Single-letter code from `av_get_picture_type_char` (`'?'` for none)
  pub fn as_char(self) -> char {
    (unsafe { avutil::av_get_picture_type_char(self.as_raw()) } as u8) as char
  }
}

impl SampleFormat {
  /// Name as reported by `av_get_sample_fmt_name`
  pub fn library_name(self) -> Option<&'static str> {
    unsafe { super::static_str(avutil::av_get_sample_fmt_name(self.as_raw())) }
  }
}

macro_rules! color_library_lookup {
  ($ty:ident, $name_fn:ident, $from_name_fn:ident) => {
    impl $ty {
      /// Name as reported by libavutil
      pub fn library_name(self) -> Option<&'static str> {
        unsafe { super::static_str(avutil::$name_fn(self.as_raw())) }
      }

      /// Reverse lookup through libavutil
      pub fn from_library_name(name: &str) -> Option<Self> {
        let c_name = super::to_cstring(name).ok()?;
        let raw = unsafe { avutil::$from_name_fn(c_name.as_ptr()) };
        if raw < 0 {
          None
        } else {
          Self::from_raw(raw)
        }
      }
    }
  };
}

color_library_lookup!(ColorRange, av_color_range_name, av_color_range_from_name);
color_library_lookup!(ColorPrimaries, av_color_primaries_name, av_color_primaries_from_name);
color_library_lookup!(ColorTransfer, av_color_transfer_name, av_color_transfer_from_name);
color_library_lookup!(ColorSpace, av_color_space_name, av_color_space_from_name);
color_library_lookup!(ChromaLocation, av_chroma_location_name, av_chroma_location_from_name);

#[cfg(test)]
mod tests {
  use super::*;

  fn assert_round_trip<T: Copy + PartialEq + fmt::Debug>(
    all: &[T],
    is_sentinel: impl Fn(T) -> bool,
    name: impl Fn(T) -> &'static str,
    from_name: impl Fn(&str) -> Option<T>,
  ) {
    for &value in all {
      if is_sentinel(value) {
        assert_eq!(from_name(name(value)), None, "{:?}", value);
      } else {
        assert_eq!(from_name(name(value)), Some(value), "{:?}", value);
      }
    }
  }

  #[test]
  fn test_closed_enum_name_round_trip() {
    macro_rules! round_trip {
      ($($ty:ident),*) => {
        $(assert_round_trip($ty::ALL, $ty::is_sentinel, $ty::name, $ty::from_name);)*
      };
    }
    round_trip!(
      MediaType,
      SampleFormat,
      PictureType,
      FieldOrder,
      ColorRange,
      ColorPrimaries,
      ColorTransfer,
      ColorSpace,
      ChromaLocation,
      OptionType
    );
  }

  #[test]
  fn test_raw_round_trip() {
    for &v in ColorSpace::ALL {
      assert_eq!(ColorSpace::from_raw(v.as_raw()), Some(v));
    }
    assert_eq!(SampleFormat::from_raw(-1), Some(SampleFormat::None));
    assert_eq!(MediaType::from_raw(42), None);
  }

  #[test]
  fn test_describe_falls_back_to_raw_value() {
    assert_eq!(MediaType::describe(1), "audio");
    assert_eq!(MediaType::describe(7), "media_type(7)");
    assert_eq!(ColorPrimaries::describe(3), "color_primaries(3)");
    assert_eq!(PixelFormat::describe(99_999), "pix_fmt(99999)");
    assert_eq!(CodecId::describe(-5), "codec_id(-5)");
  }

  #[test]
  fn test_names_match_libavutil() {
    for &v in MediaType::ALL.iter().filter(|v| !v.is_sentinel()) {
      assert_eq!(v.library_name(), Some(v.name()));
    }
    for &v in SampleFormat::ALL.iter().filter(|v| !v.is_sentinel()) {
      assert_eq!(v.library_name(), Some(v.name()));
    }
    for &v in ColorRange::ALL {
      assert_eq!(v.library_name(), Some(v.name()));
      assert_eq!(ColorRange::from_library_name(v.name()), Some(v));
    }
    for &v in ColorTransfer::ALL {
      assert_eq!(v.library_name(), Some(v.name()));
    }
    for &v in ColorSpace::ALL {
      assert_eq!(v.library_name(), Some(v.name()));
    }
    for &v in ChromaLocation::ALL {
      assert_eq!(v.library_name(), Some(v.name()));
    }
    assert_eq!(PictureType::I.as_char(), 'I');
    assert_eq!(PictureType::B.as_char(), 'B');
  }

  #[test]
  fn test_open_registries() {
    assert_eq!(PixelFormat::YUV420P.name(), Some("yuv420p"));
    assert_eq!(PixelFormat::from_name("rgba"), Some(PixelFormat::RGBA));
    assert_eq!(PixelFormat::from_name("none"), None);
    assert_eq!(PixelFormat::NONE.name(), None);

    assert_eq!(CodecId::PCM_S16LE.name(), Some("pcm_s16le"));
    assert_eq!(CodecId::from_name("rawvideo"), Some(CodecId::RAWVIDEO));
    assert_eq!(CodecId::from_name("definitely-not-a-codec"), None);
    assert_eq!(CodecId::H264.media_type(), MediaType::Video);
    assert_eq!(CodecId::AAC.media_type(), MediaType::Audio);
  }

  #[test]
  fn test_serialize_as_name() {
    assert_eq!(serde_json::to_string(&MediaType::Audio).unwrap(), "\"audio\"");
    assert_eq!(serde_json::to_string(&PixelFormat::NV12).unwrap(), "\"nv12\"");
    assert_eq!(
      serde_json::to_string(&PixelFormat::from_raw(123_456)).unwrap(),
      "\"pix_fmt(123456)\""
    );
  }
}
