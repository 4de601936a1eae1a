//! Filters and filter graphs
//!
//! [`Filter`] entries are static registry data. A [`FilterGraph`] owns every
//! filter instance added to it; [`FilterContextRef`] and [`FilterContextMut`]
//! are views into the graph and cannot outlive it.

use super::enums::{MediaType, PixelFormat, SampleFormat};
use super::frame::Frame;
use super::options::{OptionClass, OptionTarget};
use super::{borrowed_str, static_str, to_c_int, to_cstring, Error, Result};
use crate::ffi::accessors::{
  fffilter_get_description, fffilter_get_flags, fffilter_get_inputs, fffilter_get_name,
  fffilter_get_outputs, fffilter_get_priv_class, fffilterctx_get_filter, fffilterctx_get_name,
  fffilterctx_get_nb_inputs, fffilterctx_get_nb_outputs, ffgraph_get_filter,
  ffgraph_get_nb_filters, ffinout_prepend,
};
use crate::ffi::avfilter::{
  av_buffersink_get_frame_flags, av_buffersink_get_time_base, av_buffersrc_add_frame_flags,
  av_filter_iterate, avfilter_filter_pad_count, avfilter_get_by_name, avfilter_graph_alloc,
  avfilter_graph_config, avfilter_graph_create_filter, avfilter_graph_dump, avfilter_graph_free,
  avfilter_graph_get_filter, avfilter_graph_parse_ptr, avfilter_inout_free, avfilter_link,
  avfilter_pad_get_name, avfilter_pad_get_type,
};
use crate::ffi::avutil::av_free;
use crate::ffi::error::check_except_eagain_eof;
use crate::ffi::{
  check, filter_flag, AVFilter, AVFilterContext, AVFilterGraph, AVFilterInOut, AVRational,
};
use serde::Serialize;
use std::borrow::Cow;
use std::ffi::CStr;
use std::fmt;
use std::marker::PhantomData;
use std::os::raw::{c_int, c_uint, c_void};
use std::ptr::{self, NonNull};

const FLAG_NAMES: &[(c_int, &str)] = &[
  (filter_flag::DYNAMIC_INPUTS, "dynamic_inputs"),
  (filter_flag::DYNAMIC_OUTPUTS, "dynamic_outputs"),
  (filter_flag::SLICE_THREADS, "slice_threads"),
  (filter_flag::METADATA_ONLY, "metadata_only"),
  (filter_flag::HWDEVICE, "hwdevice"),
  (filter_flag::SUPPORT_TIMELINE_GENERIC, "timeline_generic"),
  (filter_flag::SUPPORT_TIMELINE_INTERNAL, "timeline_internal"),
];

// ============================================================================
// Registry
// ============================================================================

/// Registered filter
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Filter {
  ptr: NonNull<AVFilter>,
}

// SAFETY: filter definitions are static library data
unsafe impl Send for Filter {}
unsafe impl Sync for Filter {}

/// Input or output pad of a filter definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FilterPad {
  pub name: &'static str,
  pub media_type: MediaType,
}

impl Filter {
  /// # Safety
  /// `ptr` must be NULL or point to a registered filter
  pub unsafe fn from_ptr(ptr: *const AVFilter) -> Option<Self> {
    NonNull::new(ptr as *mut AVFilter).map(|ptr| Self { ptr })
  }

  #[inline]
  pub fn as_ptr(&self) -> *const AVFilter {
    self.ptr.as_ptr()
  }

  pub fn by_name(name: &str) -> Option<Self> {
    let c_name = to_cstring(name).ok()?;
    unsafe { Self::from_ptr(avfilter_get_by_name(c_name.as_ptr())) }
  }

  pub fn name(&self) -> &'static str {
    unsafe { static_str(fffilter_get_name(self.as_ptr())) }.unwrap_or("")
  }

  pub fn description(&self) -> Option<&'static str> {
    unsafe { static_str(fffilter_get_description(self.as_ptr())) }
  }

  /// Raw `AVFILTER_FLAG_*` bits
  pub fn flags(&self) -> c_int {
    unsafe { fffilter_get_flags(self.as_ptr()) }
  }

  /// Static input pads; filters with dynamic inputs may grow more per instance
  pub fn inputs(&self) -> Vec<FilterPad> {
    self.pads(false)
  }

  pub fn outputs(&self) -> Vec<FilterPad> {
    self.pads(true)
  }

  fn pads(&self, output: bool) -> Vec<FilterPad> {
    let count = unsafe { avfilter_filter_pad_count(self.as_ptr(), output as c_int) };
    let pads = unsafe {
      if output {
        fffilter_get_outputs(self.as_ptr())
      } else {
        fffilter_get_inputs(self.as_ptr())
      }
    };
    if pads.is_null() {
      return Vec::new();
    }
    (0..count as c_int)
      .map(|i| FilterPad {
        name: unsafe { static_str(avfilter_pad_get_name(pads, i)) }.unwrap_or(""),
        media_type: MediaType::from_raw(unsafe { avfilter_pad_get_type(pads, i) })
          .unwrap_or(MediaType::Unknown),
      })
      .collect()
  }

  /// Filter-private options
  pub fn priv_class(&self) -> Option<OptionClass> {
    unsafe { OptionClass::from_ptr(fffilter_get_priv_class(self.as_ptr())) }
  }

  pub fn info(&self) -> FilterInfo {
    let flags = self.flags();
    FilterInfo {
      name: self.name(),
      description: self.description(),
      inputs: self.inputs(),
      outputs: self.outputs(),
      flags: FLAG_NAMES
        .iter()
        .filter(|(bit, _)| flags & bit != 0)
        .map(|(_, name)| *name)
        .collect(),
    }
  }
}

impl fmt::Debug for Filter {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("Filter").field(&self.name()).finish()
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct FilterInfo {
  pub name: &'static str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<&'static str>,
  pub inputs: Vec<FilterPad>,
  pub outputs: Vec<FilterPad>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub flags: Vec<&'static str>,
}

/// Every registered filter, in registry order
pub fn filters() -> Filters {
  Filters {
    opaque: ptr::null_mut(),
  }
}

pub struct Filters {
  opaque: *mut c_void,
}

impl Iterator for Filters {
  type Item = Filter;

  fn next(&mut self) -> Option<Self::Item> {
    unsafe { Filter::from_ptr(av_filter_iterate(&mut self.opaque)) }
  }
}

fn required_filter(name: &str) -> Result<Filter> {
  Filter::by_name(name).ok_or_else(|| Error::NotFound {
    kind: "filter",
    name: name.to_owned(),
  })
}

// ============================================================================
// Filter instances
// ============================================================================

/// Read-only view of a filter instance inside a graph
#[derive(Clone, Copy)]
pub struct FilterContextRef<'g> {
  ptr: NonNull<AVFilterContext>,
  _marker: PhantomData<&'g FilterGraph>,
}

impl<'g> FilterContextRef<'g> {
  #[inline]
  pub fn as_ptr(&self) -> *const AVFilterContext {
    self.ptr.as_ptr()
  }

  /// Instance name, unique within the graph
  pub fn name(&self) -> Option<Cow<'g, str>> {
    unsafe { borrowed_str(fffilterctx_get_name(self.as_ptr())) }
  }

  pub fn filter(&self) -> Option<Filter> {
    unsafe { Filter::from_ptr(fffilterctx_get_filter(self.as_ptr())) }
  }

  pub fn nb_inputs(&self) -> usize {
    unsafe { fffilterctx_get_nb_inputs(self.as_ptr()) as usize }
  }

  pub fn nb_outputs(&self) -> usize {
    unsafe { fffilterctx_get_nb_outputs(self.as_ptr()) as usize }
  }

  pub fn info(&self) -> FilterContextInfo {
    FilterContextInfo {
      name: self.name().map(Cow::into_owned).unwrap_or_default(),
      filter: self.filter().map(|f| f.name()).unwrap_or(""),
      nb_inputs: self.nb_inputs(),
      nb_outputs: self.nb_outputs(),
    }
  }
}

impl fmt::Debug for FilterContextRef<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Debug::fmt(&self.info(), f)
  }
}

/// Mutable view of a filter instance; feeds sources and drains sinks
pub struct FilterContextMut<'g> {
  ptr: NonNull<AVFilterContext>,
  _marker: PhantomData<&'g mut FilterGraph>,
}

impl<'g> FilterContextMut<'g> {
  pub fn as_ref(&self) -> FilterContextRef<'_> {
    FilterContextRef {
      ptr: self.ptr,
      _marker: PhantomData,
    }
  }

  #[inline]
  pub fn as_mut_ptr(&mut self) -> *mut AVFilterContext {
    self.ptr.as_ptr()
  }

  fn expect_filter(&self, names: &[&str], role: &'static str) -> Result<()> {
    let filter = self.as_ref().filter().map(|f| f.name()).unwrap_or("");
    if names.contains(&filter) {
      Ok(())
    } else {
      Err(Error::InvalidArgument(format!("{} is not a {}", filter, role)))
    }
  }

  /// Feed a `buffer`/`abuffer` source; `None` signals end of stream
  ///
  /// The frame's data reference moves into the graph and the frame is left
  /// blank.
  pub fn push(&mut self, frame: Option<&mut Frame>) -> Result<()> {
    self.expect_filter(&["buffer", "abuffer"], "buffer source")?;
    let frame_ptr = frame.map_or(ptr::null_mut(), |f| f.as_mut_ptr());
    check(unsafe { av_buffersrc_add_frame_flags(self.as_mut_ptr(), frame_ptr, 0) })?;
    Ok(())
  }

  /// Take the next frame from a `buffersink`/`abuffersink`
  ///
  /// Returns Ok(false) when the graph needs more input or has reached the end.
  pub fn pull(&mut self, frame: &mut Frame) -> Result<bool> {
    self.expect_filter(&["buffersink", "abuffersink"], "buffer sink")?;
    frame.unref();
    let ret = unsafe { av_buffersink_get_frame_flags(self.as_mut_ptr(), frame.as_mut_ptr(), 0) };
    Ok(check_except_eagain_eof(ret)?.is_some())
  }

  /// Time base of frames leaving a sink, valid once the graph is configured
  pub fn sink_time_base(&self) -> AVRational {
    unsafe { av_buffersink_get_time_base(self.ptr.as_ptr()) }
  }
}

impl OptionTarget for FilterContextMut<'_> {
  fn option_object(&self) -> *mut c_void {
    self.ptr.as_ptr() as *mut c_void
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct FilterContextInfo {
  pub name: String,
  pub filter: &'static str,
  pub nb_inputs: usize,
  pub nb_outputs: usize,
}

// ============================================================================
// Graph
// ============================================================================

/// Open pad handed to [`FilterGraph::parse`]
#[derive(Debug, Clone, Copy)]
pub struct Endpoint<'a> {
  /// Label used in the description (`[in]`, `[out]`)
  pub label: &'a str,
  /// Instance name of the filter owning the pad
  pub filter: &'a str,
  pub pad: u32,
}

impl<'a> Endpoint<'a> {
  pub fn new(label: &'a str, filter: &'a str, pad: u32) -> Self {
    Self { label, filter, pad }
  }
}

/// Owned `AVFilterInOut` list
struct InOutList(*mut AVFilterInOut);

impl Drop for InOutList {
  fn drop(&mut self) {
    unsafe { avfilter_inout_free(&mut self.0) };
  }
}

/// Owned filter graph
pub struct FilterGraph {
  ptr: NonNull<AVFilterGraph>,
}

impl FilterGraph {
  pub fn new() -> Result<Self> {
    let ptr = unsafe { avfilter_graph_alloc() };
    NonNull::new(ptr)
      .map(|ptr| Self { ptr })
      .ok_or(Error::AllocationFailed("AVFilterGraph"))
  }

  #[inline]
  pub fn as_ptr(&self) -> *const AVFilterGraph {
    self.ptr.as_ptr()
  }

  #[inline]
  pub fn as_mut_ptr(&mut self) -> *mut AVFilterGraph {
    self.ptr.as_ptr()
  }

  /// Create an instance of `filter` named `name`, initialised from `args`
  pub fn add_filter(
    &mut self,
    filter: Filter,
    name: &str,
    args: Option<&str>,
  ) -> Result<FilterContextMut<'_>> {
    let c_name = to_cstring(name)?;
    let c_args = args.map(to_cstring).transpose()?;
    let mut ctx: *mut AVFilterContext = ptr::null_mut();
    check(unsafe {
      avfilter_graph_create_filter(
        &mut ctx,
        filter.as_ptr(),
        c_name.as_ptr(),
        c_args.as_ref().map_or(ptr::null(), |a| a.as_ptr()),
        ptr::null_mut(),
        self.as_mut_ptr(),
      )
    })?;
    let ptr = NonNull::new(ctx).ok_or(Error::AllocationFailed("AVFilterContext"))?;
    tracing::trace!(target: "ffbridge::filter", filter = filter.name(), name, args, "added filter");
    Ok(FilterContextMut {
      ptr,
      _marker: PhantomData,
    })
  }

  fn instance(&self, name: &str) -> Result<NonNull<AVFilterContext>> {
    let c_name = to_cstring(name)?;
    let ctx = unsafe { avfilter_graph_get_filter(self.ptr.as_ptr(), c_name.as_ptr()) };
    NonNull::new(ctx).ok_or_else(|| Error::NotFound {
      kind: "filter instance",
      name: name.to_owned(),
    })
  }

  pub fn filter(&self, name: &str) -> Option<FilterContextRef<'_>> {
    self.instance(name).ok().map(|ptr| FilterContextRef {
      ptr,
      _marker: PhantomData,
    })
  }

  pub fn filter_mut(&mut self, name: &str) -> Option<FilterContextMut<'_>> {
    self.instance(name).ok().map(|ptr| FilterContextMut {
      ptr,
      _marker: PhantomData,
    })
  }

  /// Connect output pad `src_pad` of `src` to input pad `dst_pad` of `dst`
  pub fn link(&mut self, src: &str, src_pad: u32, dst: &str, dst_pad: u32) -> Result<()> {
    let src_ctx = self.instance(src)?;
    let dst_ctx = self.instance(dst)?;
    check(unsafe {
      avfilter_link(src_ctx.as_ptr(), src_pad as c_uint, dst_ctx.as_ptr(), dst_pad as c_uint)
    })?;
    Ok(())
  }

  fn endpoint_list(&self, endpoints: &[Endpoint<'_>]) -> Result<InOutList> {
    let mut list = InOutList(ptr::null_mut());
    for endpoint in endpoints.iter().rev() {
      let ctx = self.instance(endpoint.filter)?;
      let label = to_cstring(endpoint.label)?;
      let pad = c_int::try_from(endpoint.pad)
        .map_err(|_| Error::InvalidArgument(format!("pad index out of range: {}", endpoint.pad)))?;
      let head = unsafe { ffinout_prepend(label.as_ptr(), ctx.as_ptr(), pad, list.0) };
      if head.is_null() {
        return Err(Error::AllocationFailed("AVFilterInOut"));
      }
      list.0 = head;
    }
    Ok(list)
  }

  /// Add the filters of a textual description
  ///
  /// `inputs` are open input pads that labels at the end of the description
  /// feed (typically a sink labelled `out`); `outputs` are open output pads
  /// that labels at its start read from (typically a source labelled `in`).
  pub fn parse(
    &mut self,
    description: &str,
    inputs: &[Endpoint<'_>],
    outputs: &[Endpoint<'_>],
  ) -> Result<()> {
    let c_desc = to_cstring(description)?;
    let mut inputs = self.endpoint_list(inputs)?;
    let mut outputs = self.endpoint_list(outputs)?;
    check(unsafe {
      avfilter_graph_parse_ptr(
        self.as_mut_ptr(),
        c_desc.as_ptr(),
        &mut inputs.0,
        &mut outputs.0,
        ptr::null_mut(),
      )
    })?;
    if !inputs.0.is_null() || !outputs.0.is_null() {
      tracing::debug!(target: "ffbridge::filter", description, "graph has unconnected pads");
    }
    Ok(())
  }

  /// Negotiate formats and configure every link
  pub fn config(&mut self) -> Result<()> {
    check(unsafe { avfilter_graph_config(self.as_mut_ptr(), ptr::null_mut()) })?;
    tracing::debug!(target: "ffbridge::filter", filters = self.nb_filters(), "configured graph");
    Ok(())
  }

  /// ASCII drawing of the configured graph
  pub fn dump(&self) -> Result<String> {
    let text = unsafe { avfilter_graph_dump(self.ptr.as_ptr(), ptr::null()) };
    if text.is_null() {
      return Err(Error::AllocationFailed("filter graph dump"));
    }
    let dump = unsafe { CStr::from_ptr(text) }.to_string_lossy().into_owned();
    unsafe { av_free(text as *mut c_void) };
    Ok(dump)
  }

  pub fn nb_filters(&self) -> usize {
    unsafe { ffgraph_get_nb_filters(self.as_ptr()) as usize }
  }

  /// Instances in creation order, including those created by `parse` and
  /// format negotiation
  pub fn filters(&self) -> GraphFilters<'_> {
    GraphFilters {
      graph: self.as_ptr(),
      next: 0,
      len: self.nb_filters() as c_uint,
      _marker: PhantomData,
    }
  }

  pub fn info(&self) -> FilterGraphInfo {
    FilterGraphInfo {
      filters: self.filters().map(|f| f.info()).collect(),
    }
  }
}

impl Drop for FilterGraph {
  fn drop(&mut self) {
    let mut ptr = self.ptr.as_ptr();
    unsafe { avfilter_graph_free(&mut ptr) };
  }
}

impl fmt::Debug for FilterGraph {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("FilterGraph")
      .field("filters", &self.info().filters)
      .finish()
  }
}

// SAFETY: the graph and its instances are only reached through &mut self
unsafe impl Send for FilterGraph {}

/// Instances of a [`FilterGraph`]
pub struct GraphFilters<'g> {
  graph: *const AVFilterGraph,
  next: c_uint,
  len: c_uint,
  _marker: PhantomData<&'g FilterGraph>,
}

impl<'g> Iterator for GraphFilters<'g> {
  type Item = FilterContextRef<'g>;

  fn next(&mut self) -> Option<Self::Item> {
    while self.next < self.len {
      let ctx = unsafe { ffgraph_get_filter(self.graph, self.next) };
      self.next += 1;
      if let Some(ptr) = NonNull::new(ctx) {
        return Some(FilterContextRef {
          ptr,
          _marker: PhantomData,
        });
      }
    }
    None
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct FilterGraphInfo {
  pub filters: Vec<FilterContextInfo>,
}

// ============================================================================
// Single-input, single-output chains
// ============================================================================

/// Parameters of a `buffer` video source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoSourceArgs {
  pub width: u32,
  pub height: u32,
  pub pixel_format: PixelFormat,
  pub time_base: AVRational,
  pub sample_aspect_ratio: AVRational,
}

impl VideoSourceArgs {
  pub fn new(width: u32, height: u32, pixel_format: PixelFormat, time_base: AVRational) -> Self {
    Self {
      width,
      height,
      pixel_format,
      time_base,
      sample_aspect_ratio: AVRational::new(1, 1),
    }
  }

  fn to_args(self) -> Result<String> {
    to_c_int(self.width, "width")?;
    to_c_int(self.height, "height")?;
    Ok(format!(
      "video_size={}x{}:pix_fmt={}:time_base={}/{}:pixel_aspect={}/{}",
      self.width,
      self.height,
      self.pixel_format.as_raw(),
      self.time_base.num,
      self.time_base.den,
      self.sample_aspect_ratio.num,
      self.sample_aspect_ratio.den,
    ))
  }
}

/// Parameters of an `abuffer` audio source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioSourceArgs {
  pub sample_rate: u32,
  pub sample_format: SampleFormat,
  pub channels: u32,
  pub time_base: AVRational,
}

impl AudioSourceArgs {
  /// Time base defaults to one tick per sample
  pub fn new(sample_rate: u32, sample_format: SampleFormat, channels: u32) -> Self {
    Self {
      sample_rate,
      sample_format,
      channels,
      time_base: AVRational::new(1, c_int::try_from(sample_rate).unwrap_or(c_int::MAX)),
    }
  }

  fn to_args(self) -> Result<String> {
    to_c_int(self.sample_rate, "sample rate")?;
    to_c_int(self.channels, "channel count")?;
    let layout = match self.channels {
      1 => "channel_layout=mono".to_owned(),
      2 => "channel_layout=stereo".to_owned(),
      n => format!("channels={}", n),
    };
    Ok(format!(
      "time_base={}/{}:sample_rate={}:sample_fmt={}:{}",
      self.time_base.num,
      self.time_base.den,
      self.sample_rate,
      self.sample_format.name(),
      layout,
    ))
  }
}

/// Graph with one buffer source (`in`) and one buffer sink (`out`) around a
/// parsed description
pub struct FilterChain {
  graph: FilterGraph,
}

impl FilterChain {
  pub const SOURCE: &'static str = "in";
  pub const SINK: &'static str = "out";

  /// Video chain, e.g. `"scale=320:240,format=rgb24"`
  pub fn video(source: VideoSourceArgs, description: &str) -> Result<Self> {
    Self::build("buffer", &source.to_args()?, "buffersink", description)
  }

  /// Audio chain, e.g. `"volume=0.5"`
  pub fn audio(source: AudioSourceArgs, description: &str) -> Result<Self> {
    Self::build("abuffer", &source.to_args()?, "abuffersink", description)
  }

  fn build(source: &str, args: &str, sink: &str, description: &str) -> Result<Self> {
    let mut graph = FilterGraph::new()?;
    graph.add_filter(required_filter(source)?, Self::SOURCE, Some(args))?;
    graph.add_filter(required_filter(sink)?, Self::SINK, None)?;
    graph.parse(
      description,
      &[Endpoint::new(Self::SINK, Self::SINK, 0)],
      &[Endpoint::new(Self::SOURCE, Self::SOURCE, 0)],
    )?;
    graph.config()?;
    Ok(Self { graph })
  }

  fn endpoint(&mut self, name: &'static str) -> Result<FilterContextMut<'_>> {
    self.graph.filter_mut(name).ok_or(Error::InvalidState("filter chain endpoint missing"))
  }

  /// Feed a frame; `None` flushes the chain
  pub fn push(&mut self, frame: Option<&mut Frame>) -> Result<()> {
    self.endpoint(Self::SOURCE)?.push(frame)
  }

  /// Returns Ok(false) when more input is needed or the chain is drained
  pub fn pull(&mut self, frame: &mut Frame) -> Result<bool> {
    self.endpoint(Self::SINK)?.pull(frame)
  }

  /// Time base of pulled frames
  pub fn time_base(&self) -> AVRational {
    self
      .graph
      .filter(Self::SINK)
      .map(|sink| unsafe { av_buffersink_get_time_base(sink.as_ptr()) })
      .unwrap_or_default()
  }

  pub fn graph(&self) -> &FilterGraph {
    &self.graph
  }
}

impl fmt::Debug for FilterChain {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("FilterChain").field("graph", &self.graph).finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_filter_lookup_and_pads() {
    let scale = Filter::by_name("scale").unwrap();
    assert_eq!(scale.name(), "scale");
    assert!(scale.description().is_some());
    assert_eq!(
      scale.inputs(),
      vec![FilterPad {
        name: "default",
        media_type: MediaType::Video
      }]
    );
    assert_eq!(scale.outputs().len(), 1);
    assert!(scale.priv_class().unwrap().find("flags").is_some());

    let buffer = Filter::by_name("buffer").unwrap();
    assert!(buffer.inputs().is_empty());
    assert!(Filter::by_name("no-such-filter").is_none());
  }

  #[test]
  fn test_filter_iteration_is_restartable() {
    let first: Vec<&str> = filters().map(|f| f.name()).collect();
    let second: Vec<&str> = filters().map(|f| f.name()).collect();
    assert_eq!(first, second);
    assert!(first.contains(&"anull"));
  }

  #[test]
  fn test_filter_info_json() {
    let value = serde_json::to_value(Filter::by_name("anull").unwrap().info()).unwrap();
    assert_eq!(value["name"], "anull");
    assert_eq!(value["inputs"][0]["media_type"], "audio");
  }

  #[test]
  fn test_video_chain_scales() {
    let args = VideoSourceArgs::new(64, 48, PixelFormat::YUV420P, AVRational::new(1, 25));
    let mut chain = FilterChain::video(args, "scale=32:24").unwrap();
    assert_eq!(chain.time_base(), AVRational::new(1, 25));

    let mut input = Frame::new_video(64, 48, PixelFormat::YUV420P).unwrap();
    input.set_pts(0);
    chain.push(Some(&mut input)).unwrap();

    let mut output = Frame::new().unwrap();
    assert!(chain.pull(&mut output).unwrap());
    assert_eq!((output.width(), output.height()), (32, 24));
    assert_eq!(output.pixel_format(), PixelFormat::YUV420P);
    assert_eq!(output.pts(), 0);

    chain.push(None).unwrap();
    assert!(!chain.pull(&mut output).unwrap());
  }

  #[test]
  fn test_audio_chain_passthrough() {
    let args = AudioSourceArgs::new(8000, SampleFormat::S16, 1);
    let mut chain = FilterChain::audio(args, "anull").unwrap();

    let mut input = Frame::new_audio(160, SampleFormat::S16, 8000, 1).unwrap();
    input.set_pts(0);
    chain.push(Some(&mut input)).unwrap();

    let mut output = Frame::new().unwrap();
    assert!(chain.pull(&mut output).unwrap());
    assert_eq!(output.nb_samples(), 160);
    assert_eq!(output.sample_format(), Some(SampleFormat::S16));
  }

  #[test]
  fn test_manual_graph() {
    let mut graph = FilterGraph::new().unwrap();
    let source = VideoSourceArgs::new(16, 16, PixelFormat::RGB24, AVRational::new(1, 30));
    let args = source.to_args().unwrap();
    graph.add_filter(Filter::by_name("buffer").unwrap(), "src", Some(&args)).unwrap();
    graph.add_filter(Filter::by_name("buffersink").unwrap(), "sink", None).unwrap();
    graph.link("src", 0, "sink", 0).unwrap();
    graph.config().unwrap();

    assert_eq!(graph.nb_filters(), 2);
    let names: Vec<String> = graph
      .filters()
      .filter_map(|f| f.name().map(Cow::into_owned))
      .collect();
    assert_eq!(names, vec!["src", "sink"]);
    assert!(graph.dump().unwrap().contains("src"));

    let value = serde_json::to_value(graph.info()).unwrap();
    assert_eq!(value["filters"][1]["filter"], "buffersink");
    assert_eq!(value["filters"][1]["nb_inputs"], 1);
  }

  #[test]
  fn test_source_args_out_of_int_range() {
    let audio = AudioSourceArgs::new(u32::MAX, SampleFormat::S16, 1);
    assert!(matches!(FilterChain::audio(audio, "anull"), Err(Error::InvalidArgument(_))));

    let video = VideoSourceArgs::new(u32::MAX, 16, PixelFormat::GRAY8, AVRational::new(1, 25));
    assert!(matches!(FilterChain::video(video, "null"), Err(Error::InvalidArgument(_))));
  }

  #[test]
  fn test_push_requires_buffer_source() {
    let mut graph = FilterGraph::new().unwrap();
    graph.add_filter(Filter::by_name("buffersink").unwrap(), "sink", None).unwrap();
    let mut sink = graph.filter_mut("sink").unwrap();
    assert!(matches!(sink.push(None), Err(Error::InvalidArgument(_))));
  }

  #[test]
  fn test_parse_with_unknown_endpoint() {
    let mut graph = FilterGraph::new().unwrap();
    let err = graph.parse("null", &[], &[Endpoint::new("in", "missing", 0)]).unwrap_err();
    assert!(matches!(err, Error::NotFound { kind: "filter instance", .. }));
  }

  #[test]
  fn test_invalid_description_fails() {
    let args = VideoSourceArgs::new(8, 8, PixelFormat::GRAY8, AVRational::new(1, 25));
    let err = FilterChain::video(args, "no_such_filter_xyz").unwrap_err();
    assert!(err.code().is_some());
  }
}
