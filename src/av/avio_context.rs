//! Custom I/O bridge for FFmpeg's AVIO layer
//!
//! An [`IoContext`] owns an `AVIOContext`, its av_malloc'd buffer and a boxed
//! [`IoBackend`]. FFmpeg drives the backend through generic `extern "C"`
//! trampolines whenever a demuxer or muxer needs bytes.

use super::io_buffer::{ChannelWriter, MemoryBuffer, ReadOnlyBuffer, SharedBuffer};
use super::{Error, Result};
use crate::ffi::accessors::{fffio_clear_error, fffio_get_error, fffio_get_seekable, fffio_release};
use crate::ffi::avformat::{
  avio_alloc_context, avio_feof, avio_flush, avio_read, avio_seek, avio_size, avio_write,
  ReadPacketFn, SeekFn, WritePacketFn,
};
use crate::ffi::avutil::{av_free, av_malloc};
use crate::ffi::error::{
  AVERROR_EINVAL, AVERROR_EIO, AVERROR_ENOMEM, AVERROR_ENOSYS, AVERROR_EOF, AVERROR_EXTERNAL,
};
use crate::ffi::{check, check_i64, seek_whence, AVIOContext, FFmpegError};
use std::any::Any;
use std::fmt;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::marker::PhantomData;
use std::mem::ManuallyDrop;
use std::os::raw::{c_int, c_void};
use std::panic::{self, AssertUnwindSafe};
use std::ptr::NonNull;

/// Default buffer size for AVIO operations (32KB)
pub const DEFAULT_BUFFER_SIZE: usize = 32 * 1024;

// ============================================================================
// Backend trait
// ============================================================================

/// Operations a backend supports
///
/// Only the advertised callbacks are registered with FFmpeg, which derives
/// seekability (and whether it may read back muxed output) from them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
  pub read: bool,
  pub write: bool,
  pub seek: bool,
}

impl Capabilities {
  pub const READ: Self = Self {
    read: true,
    write: false,
    seek: false,
  };
  pub const READ_SEEK: Self = Self {
    read: true,
    write: false,
    seek: true,
  };
  pub const WRITE: Self = Self {
    read: false,
    write: true,
    seek: false,
  };
  pub const WRITE_SEEK: Self = Self {
    read: false,
    write: true,
    seek: true,
  };
  pub const ALL: Self = Self {
    read: true,
    write: true,
    seek: true,
  };
}

/// Byte store driven by FFmpeg through an [`IoContext`]
///
/// Callbacks run synchronously on whichever thread issued the demux or mux
/// call. Unimplemented operations report `ErrorKind::Unsupported`, which
/// reaches FFmpeg as `ENOSYS`.
pub trait IoBackend {
  fn capabilities(&self) -> Capabilities;

  /// Copy up to `buf.len()` bytes; `Ok(0)` means end of stream
  fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    let _ = buf;
    Err(unsupported("read"))
  }

  /// Consume all of `buf`
  fn write(&mut self, buf: &[u8]) -> io::Result<()> {
    let _ = buf;
    Err(unsupported("write"))
  }

  /// Move to `pos` and return the new absolute position
  fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
    let _ = pos;
    Err(unsupported("seek"))
  }

  /// Total stream length; must leave the position where it was
  fn size(&mut self) -> io::Result<u64> {
    let current = self.seek(SeekFrom::Current(0))?;
    let end = self.seek(SeekFrom::End(0))?;
    self.seek(SeekFrom::Start(current))?;
    Ok(end)
  }
}

fn unsupported(op: &str) -> io::Error {
  io::Error::new(
    io::ErrorKind::Unsupported,
    format!("{} not supported by this backend", op),
  )
}

/// Translate a host I/O error to the AVERROR FFmpeg expects from a callback
pub(crate) fn io_error_code(err: &io::Error) -> c_int {
  if let Some(errno) = err.raw_os_error().filter(|&e| e > 0) {
    return -errno;
  }
  match err.kind() {
    io::ErrorKind::Unsupported => AVERROR_ENOSYS,
    io::ErrorKind::UnexpectedEof => AVERROR_EOF,
    io::ErrorKind::InvalidInput => AVERROR_EINVAL,
    io::ErrorKind::OutOfMemory => AVERROR_ENOMEM,
    _ => AVERROR_EIO,
  }
}

// ============================================================================
// Closure callbacks
// ============================================================================

type ReadCallback = Box<dyn FnMut(&mut [u8]) -> io::Result<usize> + Send>;
type WriteCallback = Box<dyn FnMut(&[u8]) -> io::Result<()> + Send>;
type SeekCallback = Box<dyn FnMut(SeekFrom) -> io::Result<u64> + Send>;
type SizeCallback = Box<dyn FnMut() -> io::Result<u64> + Send>;

/// Backend assembled from closures
///
/// ```ignore
/// let data = Arc::new(bytes);
/// let mut pos = 0;
/// let callbacks = Callbacks::new().on_read(move |buf| { /* copy from data */ Ok(n) });
/// ```
#[derive(Default)]
pub struct Callbacks {
  read: Option<ReadCallback>,
  write: Option<WriteCallback>,
  seek: Option<SeekCallback>,
  size: Option<SizeCallback>,
}

impl Callbacks {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn on_read(mut self, f: impl FnMut(&mut [u8]) -> io::Result<usize> + Send + 'static) -> Self {
    self.read = Some(Box::new(f));
    self
  }

  pub fn on_write(mut self, f: impl FnMut(&[u8]) -> io::Result<()> + Send + 'static) -> Self {
    self.write = Some(Box::new(f));
    self
  }

  pub fn on_seek(mut self, f: impl FnMut(SeekFrom) -> io::Result<u64> + Send + 'static) -> Self {
    self.seek = Some(Box::new(f));
    self
  }

  /// Size query; without it the size is found by seeking to the end and back
  pub fn on_size(mut self, f: impl FnMut() -> io::Result<u64> + Send + 'static) -> Self {
    self.size = Some(Box::new(f));
    self
  }
}

impl fmt::Debug for Callbacks {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Callbacks")
      .field("read", &self.read.is_some())
      .field("write", &self.write.is_some())
      .field("seek", &self.seek.is_some())
      .field("size", &self.size.is_some())
      .finish()
  }
}

impl IoBackend for Callbacks {
  fn capabilities(&self) -> Capabilities {
    Capabilities {
      read: self.read.is_some(),
      write: self.write.is_some(),
      seek: self.seek.is_some(),
    }
  }

  fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    match self.read.as_mut() {
      Some(f) => f(buf),
      None => Err(unsupported("read")),
    }
  }

  fn write(&mut self, buf: &[u8]) -> io::Result<()> {
    match self.write.as_mut() {
      Some(f) => f(buf),
      None => Err(unsupported("write")),
    }
  }

  fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
    match self.seek.as_mut() {
      Some(f) => f(pos),
      None => Err(unsupported("seek")),
    }
  }

  fn size(&mut self) -> io::Result<u64> {
    if let Some(f) = self.size.as_mut() {
      return f();
    }
    let current = self.seek(SeekFrom::Current(0))?;
    let end = self.seek(SeekFrom::End(0))?;
    self.seek(SeekFrom::Start(current))?;
    Ok(end)
  }
}

// ============================================================================
// std::io adapters
// ============================================================================

/// Forward-only input over any [`Read`]
#[derive(Debug)]
pub struct Reader<R>(pub R);

/// Seekable input over [`Read`] + [`Seek`] (files, cursors)
#[derive(Debug)]
pub struct SeekableReader<R>(pub R);

/// Streaming output over any [`Write`] (pipes, sockets)
#[derive(Debug)]
pub struct Writer<W>(pub W);

/// Seekable output over [`Write`] + [`Seek`]; lets muxers patch headers
#[derive(Debug)]
pub struct SeekableWriter<W>(pub W);

/// Read, write and seek over a single store
#[derive(Debug)]
pub struct Duplex<T>(pub T);

impl<R: Read> IoBackend for Reader<R> {
  fn capabilities(&self) -> Capabilities {
    Capabilities::READ
  }

  fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    self.0.read(buf)
  }
}

impl<R: Read + Seek> IoBackend for SeekableReader<R> {
  fn capabilities(&self) -> Capabilities {
    Capabilities::READ_SEEK
  }

  fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    self.0.read(buf)
  }

  fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
    self.0.seek(pos)
  }
}

impl<W: Write> IoBackend for Writer<W> {
  fn capabilities(&self) -> Capabilities {
    Capabilities::WRITE
  }

  fn write(&mut self, buf: &[u8]) -> io::Result<()> {
    self.0.write_all(buf)
  }
}

impl<W: Write + Seek> IoBackend for SeekableWriter<W> {
  fn capabilities(&self) -> Capabilities {
    Capabilities::WRITE_SEEK
  }

  fn write(&mut self, buf: &[u8]) -> io::Result<()> {
    self.0.write_all(buf)
  }

  fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
    self.0.seek(pos)
  }
}

impl<T: Read + Write + Seek> IoBackend for Duplex<T> {
  fn capabilities(&self) -> Capabilities {
    Capabilities::ALL
  }

  fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    self.0.read(buf)
  }

  fn write(&mut self, buf: &[u8]) -> io::Result<()> {
    self.0.write_all(buf)
  }

  fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
    self.0.seek(pos)
  }
}

// ============================================================================
// In-memory stores
// ============================================================================

impl IoBackend for MemoryBuffer {
  fn capabilities(&self) -> Capabilities {
    Capabilities::ALL
  }

  fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    Read::read(self, buf)
  }

  fn write(&mut self, buf: &[u8]) -> io::Result<()> {
    self.write_all(buf)
  }

  fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
    Seek::seek(self, pos)
  }

  fn size(&mut self) -> io::Result<u64> {
    Ok(self.len() as u64)
  }
}

impl IoBackend for SharedBuffer {
  fn capabilities(&self) -> Capabilities {
    Capabilities::ALL
  }

  fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    Read::read(self, buf)
  }

  fn write(&mut self, buf: &[u8]) -> io::Result<()> {
    self.write_all(buf)
  }

  fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
    Seek::seek(self, pos)
  }

  fn size(&mut self) -> io::Result<u64> {
    Ok(self.len() as u64)
  }
}

impl<S: AsRef<[u8]>> IoBackend for ReadOnlyBuffer<S> {
  fn capabilities(&self) -> Capabilities {
    Capabilities::READ_SEEK
  }

  fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    Read::read(self, buf)
  }

  fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
    Seek::seek(self, pos)
  }

  fn size(&mut self) -> io::Result<u64> {
    Ok(self.len() as u64)
  }
}

impl IoBackend for ChannelWriter {
  fn capabilities(&self) -> Capabilities {
    Capabilities::WRITE
  }

  fn write(&mut self, buf: &[u8]) -> io::Result<()> {
    self.write_all(buf)
  }
}

// ============================================================================
// IoContext
// ============================================================================

/// Buffer size and direction of an [`IoContext`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IoConfig {
  pub buffer_size: usize,
  /// Open for writing (muxing); otherwise reading (demuxing)
  pub writable: bool,
}

impl Default for IoConfig {
  fn default() -> Self {
    Self {
      buffer_size: DEFAULT_BUFFER_SIZE,
      writable: false,
    }
  }
}

impl IoConfig {
  /// Default buffer size, opened for writing
  pub fn writable() -> Self {
    Self {
      writable: true,
      ..Self::default()
    }
  }

  pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
    self.buffer_size = buffer_size;
    self
  }
}

/// Owned AVIOContext bridging FFmpeg to an [`IoBackend`]
///
/// Attach it to a format context by value (the format context owns and later
/// returns it) or by `&mut` (the borrow keeps it alive for the context's
/// lifetime). Dropping frees the buffer, the context and the backend exactly
/// once.
pub struct IoContext<B: IoBackend> {
  ptr: NonNull<AVIOContext>,
  backend: NonNull<B>,
  writable: bool,
  _owns: PhantomData<Box<B>>,
}

impl<B: IoBackend> IoContext<B> {
  /// Allocate a context with `config.buffer_size` bytes of buffering
  pub fn new(backend: B, config: IoConfig) -> Result<Self> {
    if config.buffer_size == 0 {
      return Err(Error::InvalidArgument("AVIO buffer size must be positive".into()));
    }
    let buffer_size = c_int::try_from(config.buffer_size).map_err(|_| {
      Error::InvalidArgument(format!("AVIO buffer size too large: {}", config.buffer_size))
    })?;

    let caps = backend.capabilities();
    if config.writable && !caps.write {
      return Err(Error::InvalidArgument(
        "writable I/O context needs a backend that can write".into(),
      ));
    }
    if !config.writable && !caps.read {
      return Err(Error::InvalidArgument(
        "readable I/O context needs a backend that can read".into(),
      ));
    }

    let buffer = unsafe { av_malloc(config.buffer_size) } as *mut u8;
    if buffer.is_null() {
      return Err(Error::AllocationFailed("AVIO buffer"));
    }

    let backend = Box::into_raw(Box::new(backend));

    // Read stays registered on writable contexts so muxers can read back
    // what they wrote (faststart)
    let read_cb: Option<ReadPacketFn> = caps.read.then_some(read_trampoline::<B> as ReadPacketFn);
    let write_cb: Option<WritePacketFn> =
      (caps.write && config.writable).then_some(write_trampoline::<B> as WritePacketFn);
    let seek_cb: Option<SeekFn> = caps.seek.then_some(seek_trampoline::<B> as SeekFn);

    let ptr = unsafe {
      avio_alloc_context(
        buffer,
        buffer_size,
        config.writable as c_int,
        backend as *mut c_void,
        read_cb,
        write_cb,
        seek_cb,
      )
    };

    let Some(ptr) = NonNull::new(ptr) else {
      unsafe {
        av_free(buffer as *mut c_void);
        drop(Box::from_raw(backend));
      }
      return Err(Error::AllocationFailed("AVIOContext"));
    };

    tracing::trace!(
      target: "ffbridge::io",
      buffer_size = config.buffer_size,
      writable = config.writable,
      seekable = caps.seek,
      "allocated I/O context"
    );

    Ok(Self {
      ptr,
      // SAFETY: Box::into_raw never returns null
      backend: unsafe { NonNull::new_unchecked(backend) },
      writable: config.writable,
      _owns: PhantomData,
    })
  }

  /// Read-only context with the default buffer size
  pub fn reader(backend: B) -> Result<Self> {
    Self::new(backend, IoConfig::default())
  }

  /// Writable context with the default buffer size
  pub fn writer(backend: B) -> Result<Self> {
    Self::new(backend, IoConfig::writable())
  }

  #[inline]
  pub fn as_ptr(&self) -> *mut AVIOContext {
    self.ptr.as_ptr()
  }

  #[inline]
  pub fn is_writable(&self) -> bool {
    self.writable
  }

  /// Whether FFmpeg considers the stream seekable
  pub fn is_seekable(&self) -> bool {
    unsafe { fffio_get_seekable(self.ptr.as_ptr()) != 0 }
  }

  pub fn backend(&self) -> &B {
    unsafe { self.backend.as_ref() }
  }

  /// Mutable access to the backend
  ///
  /// Bytes still sitting in the AVIO buffer are not visible to the backend
  /// until [`flush`](Self::flush).
  pub fn backend_mut(&mut self) -> &mut B {
    unsafe { self.backend.as_mut() }
  }

  /// Flush pending writes, release the FFmpeg side and return the backend
  pub fn into_backend(self) -> B {
    let mut this = ManuallyDrop::new(self);
    unsafe {
      this.release();
      *Box::from_raw(this.backend.as_ptr())
    }
  }

  // ==========================================================================
  // Buffered access
  // ==========================================================================

  /// Read through the AVIO buffer; `Ok(0)` at end of stream
  pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
    if buf.is_empty() {
      return Ok(0);
    }
    let len = buf.len().min(c_int::MAX as usize) as c_int;
    let ret = unsafe { avio_read(self.ptr.as_ptr(), buf.as_mut_ptr(), len) };
    if ret == AVERROR_EOF {
      return Ok(0);
    }
    Ok(check(ret)? as usize)
  }

  /// Write all of `data` into the AVIO buffer
  pub fn write_all(&mut self, data: &[u8]) -> Result<()> {
    if !self.writable {
      return Err(Error::InvalidState("I/O context is read-only"));
    }
    for chunk in data.chunks(c_int::MAX as usize) {
      unsafe { avio_write(self.ptr.as_ptr(), chunk.as_ptr(), chunk.len() as c_int) };
      self.take_error()?;
    }
    Ok(())
  }

  /// Seek; returns the new absolute position
  pub fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
    let (offset, whence) = match pos {
      SeekFrom::Start(offset) => (
        i64::try_from(offset)
          .map_err(|_| Error::InvalidArgument(format!("seek offset out of range: {}", offset)))?,
        seek_whence::SEEK_SET,
      ),
      SeekFrom::Current(offset) => (offset, seek_whence::SEEK_CUR),
      SeekFrom::End(offset) => (offset, seek_whence::SEEK_END),
    };
    let pos = check_i64(unsafe { avio_seek(self.ptr.as_ptr(), offset, whence) })?;
    Ok(pos as u64)
  }

  /// Current logical position
  pub fn tell(&mut self) -> Result<u64> {
    self.seek(SeekFrom::Current(0))
  }

  /// Total size as reported by the backend's size query
  pub fn size(&mut self) -> Result<u64> {
    Ok(check_i64(unsafe { avio_size(self.ptr.as_ptr()) })? as u64)
  }

  /// Push buffered bytes to the backend
  pub fn flush(&mut self) -> Result<()> {
    unsafe { avio_flush(self.ptr.as_ptr()) };
    self.take_error()
  }

  pub fn eof(&self) -> bool {
    unsafe { avio_feof(self.ptr.as_ptr()) != 0 }
  }

  /// Surface and clear the sticky error recorded by a failed callback
  fn take_error(&mut self) -> Result<()> {
    let code = unsafe { fffio_get_error(self.ptr.as_ptr()) };
    if code < 0 {
      unsafe { fffio_clear_error(self.ptr.as_ptr()) };
      return Err(FFmpegError::from_code(code).into());
    }
    Ok(())
  }

  /// Flush and free the AVIO side; the backend box is left to the caller
  ///
  /// # Safety
  /// Must be called exactly once, after which `ptr` is dangling.
  unsafe fn release(&mut self) {
    if self.writable {
      unsafe { avio_flush(self.ptr.as_ptr()) };
      let code = unsafe { fffio_get_error(self.ptr.as_ptr()) };
      if code < 0 {
        tracing::warn!(
          target: "ffbridge::io",
          error = %FFmpegError::from_code(code),
          "final flush failed"
        );
      }
    }
    let mut ptr = self.ptr.as_ptr();
    // Frees the current buffer (FFmpeg may have swapped it) and the context
    unsafe { fffio_release(&mut ptr) };
  }
}

impl<B: IoBackend> Drop for IoContext<B> {
  fn drop(&mut self) {
    unsafe {
      self.release();
      drop(Box::from_raw(self.backend.as_ptr()));
    }
  }
}

impl<B: IoBackend> fmt::Debug for IoContext<B> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("IoContext")
      .field("ptr", &self.ptr)
      .field("writable", &self.writable)
      .finish()
  }
}

// SAFETY: The context and the backend are only reached through &mut self or
// through a format context that holds the IoContext exclusively.
unsafe impl<B: IoBackend + Send> Send for IoContext<B> {}

// ============================================================================
// FFmpeg Callbacks
// ============================================================================

fn panic_message(payload: &(dyn Any + Send)) -> &str {
  if let Some(s) = payload.downcast_ref::<&str>() {
    s
  } else if let Some(s) = payload.downcast_ref::<String>() {
    s
  } else {
    "non-string panic payload"
  }
}

/// Run a host callback; a panic becomes `fallback` instead of unwinding into C
fn guard<T>(callback: &'static str, fallback: T, f: impl FnOnce() -> T) -> T {
  match panic::catch_unwind(AssertUnwindSafe(f)) {
    Ok(value) => value,
    Err(payload) => {
      tracing::error!(
        target: "ffbridge::io",
        callback,
        panic = panic_message(payload.as_ref()),
        "I/O callback panicked"
      );
      fallback
    }
  }
}

unsafe extern "C" fn read_trampoline<B: IoBackend>(
  opaque: *mut c_void,
  buf: *mut u8,
  buf_size: c_int,
) -> c_int {
  if opaque.is_null() || buf.is_null() || buf_size <= 0 {
    return AVERROR_EINVAL;
  }

  // SAFETY: opaque is the Box<B> installed by IoContext::new
  let backend = unsafe { &mut *(opaque as *mut B) };
  let data = unsafe { std::slice::from_raw_parts_mut(buf, buf_size as usize) };

  guard("read", AVERROR_EXTERNAL, || match backend.read(data) {
    Ok(0) => AVERROR_EOF,
    Ok(n) => n.min(buf_size as usize) as c_int,
    Err(e) => io_error_code(&e),
  })
}

unsafe extern "C" fn write_trampoline<B: IoBackend>(
  opaque: *mut c_void,
  buf: *const u8,
  buf_size: c_int,
) -> c_int {
  if opaque.is_null() || buf_size < 0 {
    return AVERROR_EINVAL;
  }
  if buf_size == 0 {
    return 0;
  }
  if buf.is_null() {
    return AVERROR_EINVAL;
  }

  // SAFETY: opaque is the Box<B> installed by IoContext::new
  let backend = unsafe { &mut *(opaque as *mut B) };
  let data = unsafe { std::slice::from_raw_parts(buf, buf_size as usize) };

  guard("write", AVERROR_EXTERNAL, || match backend.write(data) {
    Ok(()) => buf_size,
    Err(e) => io_error_code(&e),
  })
}

unsafe extern "C" fn seek_trampoline<B: IoBackend>(
  opaque: *mut c_void,
  offset: i64,
  whence: c_int,
) -> i64 {
  if opaque.is_null() {
    return AVERROR_EINVAL as i64;
  }

  // SAFETY: opaque is the Box<B> installed by IoContext::new
  let backend = unsafe { &mut *(opaque as *mut B) };
  let whence = whence & !seek_whence::AVSEEK_FORCE;

  guard("seek", AVERROR_EXTERNAL as i64, || {
    let result = match whence {
      seek_whence::AVSEEK_SIZE => backend.size(),
      seek_whence::SEEK_SET => match u64::try_from(offset) {
        Ok(offset) => backend.seek(SeekFrom::Start(offset)),
        Err(_) => return AVERROR_EINVAL as i64,
      },
      seek_whence::SEEK_CUR => backend.seek(SeekFrom::Current(offset)),
      seek_whence::SEEK_END => backend.seek(SeekFrom::End(offset)),
      _ => return AVERROR_EINVAL as i64,
    };
    match result {
      Ok(pos) => i64::try_from(pos).unwrap_or(i64::MAX),
      Err(e) => io_error_code(&e) as i64,
    }
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Cursor;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::Arc;

  fn opaque<B>(backend: &mut B) -> *mut c_void {
    backend as *mut B as *mut c_void
  }

  type CursorReader = SeekableReader<Cursor<Vec<u8>>>;

  #[test]
  fn test_size_query_keeps_position() {
    let mut backend = SeekableReader(Cursor::new((0u8..100).collect::<Vec<u8>>()));
    let mut buf = [0u8; 10];

    unsafe {
      let o = opaque(&mut backend);
      assert_eq!(read_trampoline::<CursorReader>(o, buf.as_mut_ptr(), 10), 10);
      let size_flags = [
        seek_whence::AVSEEK_SIZE,
        seek_whence::AVSEEK_SIZE | seek_whence::AVSEEK_FORCE,
      ];
      for whence in size_flags {
        assert_eq!(seek_trampoline::<CursorReader>(o, 0, whence), 100);
      }
      assert_eq!(read_trampoline::<CursorReader>(o, buf.as_mut_ptr(), 10), 10);
    }
    assert_eq!(buf[0], 10);
  }

  #[test]
  fn test_size_query_on_every_store() {
    let mut memory = MemoryBuffer::from_data(vec![7; 64]);
    let mut read_only = ReadOnlyBuffer::new(vec![1u8; 33]);
    let size = seek_whence::AVSEEK_SIZE;
    unsafe {
      assert_eq!(seek_trampoline::<MemoryBuffer>(opaque(&mut memory), 0, size), 64);
      let o = opaque(&mut read_only);
      assert_eq!(seek_trampoline::<ReadOnlyBuffer<Vec<u8>>>(o, 0, size), 33);
    }
    assert_eq!(memory.position(), 0);
    assert_eq!(read_only.position(), 0);
  }

  #[test]
  fn test_seek_modes() {
    let mut backend = MemoryBuffer::from_data(vec![0; 50]);
    unsafe {
      let o = opaque(&mut backend);
      assert_eq!(seek_trampoline::<MemoryBuffer>(o, 10, seek_whence::SEEK_SET), 10);
      assert_eq!(seek_trampoline::<MemoryBuffer>(o, 5, seek_whence::SEEK_CUR), 15);
      assert_eq!(seek_trampoline::<MemoryBuffer>(o, -10, seek_whence::SEEK_END), 40);
      let before_start = seek_trampoline::<MemoryBuffer>(o, -1, seek_whence::SEEK_SET);
      assert_eq!(before_start, AVERROR_EINVAL as i64);
      assert_eq!(seek_trampoline::<MemoryBuffer>(o, 0, 99), AVERROR_EINVAL as i64);
    }
  }

  #[test]
  fn test_read_at_end_reports_eof() {
    let mut backend = Reader(Cursor::new(Vec::<u8>::new()));
    let mut buf = [0u8; 4];
    let o = opaque(&mut backend);
    let ret = unsafe { read_trampoline::<Reader<Cursor<Vec<u8>>>>(o, buf.as_mut_ptr(), 4) };
    assert_eq!(ret, AVERROR_EOF);
  }

  #[test]
  fn test_unsupported_operations_map_to_enosys() {
    let mut backend = Writer(Vec::<u8>::new());
    let mut buf = [0u8; 4];
    unsafe {
      let o = opaque(&mut backend);
      assert_eq!(read_trampoline::<Writer<Vec<u8>>>(o, buf.as_mut_ptr(), 4), AVERROR_ENOSYS);
      let seek = seek_trampoline::<Writer<Vec<u8>>>(o, 0, seek_whence::SEEK_SET);
      assert_eq!(seek, AVERROR_ENOSYS as i64);
    }
  }

  #[test]
  fn test_io_error_mapping() {
    assert_eq!(io_error_code(&io::Error::from_raw_os_error(libc::EPIPE)), -libc::EPIPE);
    assert_eq!(io_error_code(&io::Error::from(io::ErrorKind::UnexpectedEof)), AVERROR_EOF);
    assert_eq!(io_error_code(&io::Error::from(io::ErrorKind::InvalidInput)), AVERROR_EINVAL);
    assert_eq!(io_error_code(&io::Error::from(io::ErrorKind::Other)), AVERROR_EIO);
  }

  #[test]
  fn test_panicking_callback_returns_external_error() {
    let mut backend = Callbacks::new()
      .on_read(|_| panic!("read exploded"))
      .on_write(|_| panic!("write exploded"))
      .on_seek(|_| panic!("seek exploded"));
    let mut buf = [0u8; 8];
    unsafe {
      let o = opaque(&mut backend);
      assert_eq!(read_trampoline::<Callbacks>(o, buf.as_mut_ptr(), 8), AVERROR_EXTERNAL);
      assert_eq!(write_trampoline::<Callbacks>(o, buf.as_ptr(), 8), AVERROR_EXTERNAL);
      let size = seek_trampoline::<Callbacks>(o, 0, seek_whence::AVSEEK_SIZE);
      assert_eq!(size, AVERROR_EXTERNAL as i64);
    }
  }

  #[test]
  fn test_callbacks_capabilities_follow_registration() {
    let callbacks = Callbacks::new().on_write(|_| Ok(()));
    assert_eq!(callbacks.capabilities(), Capabilities::WRITE);
    assert!(IoContext::reader(callbacks).is_err());
  }

  #[test]
  fn test_zero_buffer_size_rejected() {
    let config = IoConfig::default().with_buffer_size(0);
    let err = IoContext::new(MemoryBuffer::new(), config).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
  }

  #[test]
  fn test_write_then_read_round_trip() {
    let payload: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();
    let store = SharedBuffer::new();

    let config = IoConfig::writable().with_buffer_size(4096);
    let mut out = IoContext::new(store.clone(), config).unwrap();
    out.write_all(&payload).unwrap();
    out.flush().unwrap();
    drop(out);
    assert_eq!(store.len(), payload.len());

    let mut input = IoContext::reader(ReadOnlyBuffer::new(store.to_vec())).unwrap();
    assert_eq!(input.size().unwrap(), payload.len() as u64);

    let mut read_back = Vec::new();
    let mut chunk = vec![0u8; 7000];
    loop {
      let n = input.read(&mut chunk).unwrap();
      if n == 0 {
        break;
      }
      read_back.extend_from_slice(&chunk[..n]);
    }
    assert_eq!(read_back, payload);
    assert!(input.eof());
  }

  #[test]
  fn test_buffered_seek_and_tell() {
    let bytes: Vec<u8> = (0u8..=255).collect();
    let mut input = IoContext::reader(ReadOnlyBuffer::new(bytes)).unwrap();
    assert!(input.is_seekable());
    assert_eq!(input.seek(SeekFrom::Start(200)).unwrap(), 200);
    let mut b = [0u8; 1];
    input.read(&mut b).unwrap();
    assert_eq!(b[0], 200);
    assert_eq!(input.tell().unwrap(), 201);
  }

  #[test]
  fn test_forward_only_reader_is_not_seekable() {
    let input = IoContext::reader(Reader(Cursor::new(vec![1u8, 2, 3]))).unwrap();
    assert!(!input.is_seekable());
  }

  #[test]
  fn test_write_rejected_on_read_only_context() {
    let mut input = IoContext::reader(MemoryBuffer::new()).unwrap();
    assert!(matches!(input.write_all(b"x"), Err(Error::InvalidState(_))));
  }

  #[test]
  fn test_write_error_surfaces_on_flush() {
    let callbacks = Callbacks::new().on_write(|_| Err(io::Error::from_raw_os_error(libc::ENOSPC)));
    let mut out = IoContext::writer(callbacks).unwrap();
    out.write_all(b"data").unwrap();
    let err = out.flush().unwrap_err();
    assert_eq!(err.code(), Some(-libc::ENOSPC));
  }

  struct DropCounter(Arc<AtomicUsize>);

  impl Drop for DropCounter {
    fn drop(&mut self) {
      self.0.fetch_add(1, Ordering::SeqCst);
    }
  }

  impl IoBackend for DropCounter {
    fn capabilities(&self) -> Capabilities {
      Capabilities::READ
    }

    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
      Ok(0)
    }
  }

  #[test]
  fn test_backend_freed_exactly_once() {
    let drops = Arc::new(AtomicUsize::new(0));
    let ctx = IoContext::reader(DropCounter(drops.clone())).unwrap();
    assert_eq!(drops.load(Ordering::SeqCst), 0);
    drop(ctx);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn test_into_backend_hands_back_ownership() {
    let drops = Arc::new(AtomicUsize::new(0));
    let ctx = IoContext::reader(DropCounter(drops.clone())).unwrap();
    let backend = ctx.into_backend();
    assert_eq!(drops.load(Ordering::SeqCst), 0);
    drop(backend);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn test_into_backend_flushes_pending_writes() {
    let mut out = IoContext::writer(MemoryBuffer::new()).unwrap();
    out.write_all(b"pending").unwrap();
    let buffer = out.into_backend();
    assert_eq!(buffer.data(), b"pending");
  }
}
