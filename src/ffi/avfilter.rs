//! libavfilter function declarations
//!
//! Filter registry, filter graphs and the buffer source/sink endpoints.

use super::types::*;
use std::os::raw::{c_char, c_int, c_uint, c_void};

unsafe extern "C" {
  // ========================================================================
  // Filter Registry
  // ========================================================================

  /// Iterate over all registered filters
  pub fn av_filter_iterate(opaque: *mut *mut c_void) -> *const AVFilter;

  /// Get a filter definition matching the given name, NULL if none
  pub fn avfilter_get_by_name(name: *const c_char) -> *const AVFilter;

  /// Number of elements in a filter's static pad array
  pub fn avfilter_filter_pad_count(filter: *const AVFilter, is_output: c_int) -> c_uint;

  /// Name of the pad at index pad_idx
  pub fn avfilter_pad_get_name(pads: *const AVFilterPad, pad_idx: c_int) -> *const c_char;

  /// Media type of the pad at index pad_idx
  pub fn avfilter_pad_get_type(pads: *const AVFilterPad, pad_idx: c_int) -> c_int;

  /// The AVClass of AVFilterContext, for option introspection
  pub fn avfilter_get_class() -> *const AVClass;

  // ========================================================================
  // Filter Graph
  // ========================================================================

  /// Allocate a filter graph
  pub fn avfilter_graph_alloc() -> *mut AVFilterGraph;

  /// Free a graph, destroy its links, and set *graph to NULL
  pub fn avfilter_graph_free(graph: *mut *mut AVFilterGraph);

  /// Create and add a filter instance into an existing graph
  ///
  /// The instance is owned by the graph.
  pub fn avfilter_graph_create_filter(
    filt_ctx: *mut *mut AVFilterContext,
    filt: *const AVFilter,
    name: *const c_char,
    args: *const c_char,
    opaque: *mut c_void,
    graph_ctx: *mut AVFilterGraph,
  ) -> c_int;

  /// Link two filters together
  pub fn avfilter_link(
    src: *mut AVFilterContext,
    srcpad: c_uint,
    dst: *mut AVFilterContext,
    dstpad: c_uint,
  ) -> c_int;

  /// Add a graph described by a string to a graph
  ///
  /// `inputs` and `outputs` are updated in place to the still-open endpoints
  /// and must be freed by the caller with avfilter_inout_free.
  pub fn avfilter_graph_parse_ptr(
    graph: *mut AVFilterGraph,
    filters: *const c_char,
    inputs: *mut *mut AVFilterInOut,
    outputs: *mut *mut AVFilterInOut,
    log_ctx: *mut c_void,
  ) -> c_int;

  /// Check validity and configure all the links and formats in the graph
  pub fn avfilter_graph_config(graphctx: *mut AVFilterGraph, log_ctx: *mut c_void) -> c_int;

  /// Dump a graph into a human-readable string representation (av_malloc'd)
  pub fn avfilter_graph_dump(graph: *mut AVFilterGraph, options: *const c_char) -> *mut c_char;

  /// Get a filter instance identified by instance name from graph
  pub fn avfilter_graph_get_filter(
    graph: *mut AVFilterGraph,
    name: *const c_char,
  ) -> *mut AVFilterContext;

  // ========================================================================
  // Graph Endpoints
  // ========================================================================

  /// Free the supplied list of AVFilterInOut and set *inout to NULL
  pub fn avfilter_inout_free(inout: *mut *mut AVFilterInOut);

  // ========================================================================
  // Buffer Source / Sink
  // ========================================================================

  /// Add a frame to the buffer source (NULL frame signals EOF)
  pub fn av_buffersrc_add_frame_flags(
    buffer_src: *mut AVFilterContext,
    frame: *mut AVFrame,
    flags: c_int,
  ) -> c_int;

  /// Get a frame with filtered data from sink and put it in frame
  pub fn av_buffersink_get_frame_flags(
    ctx: *mut AVFilterContext,
    frame: *mut AVFrame,
    flags: c_int,
  ) -> c_int;

  /// Time base negotiated on the sink input link
  pub fn av_buffersink_get_time_base(ctx: *const AVFilterContext) -> AVRational;

  // ========================================================================
  // Version Information
  // ========================================================================

  pub fn avfilter_version() -> c_uint;
  pub fn avfilter_configuration() -> *const c_char;
  pub fn avfilter_license() -> *const c_char;
}
