//! In-memory backends for the custom I/O bridge
//!
//! Provides growable, shared, read-only and channel-backed stores that plug
//! into [`IoContext`](super::IoContext).

use crossbeam::channel::{self, Receiver, Sender};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::sync::{Arc, Mutex, MutexGuard};

/// Resolve a seek against a buffer of `len` bytes positioned at `position`
fn resolve_seek(pos: SeekFrom, position: usize, len: usize) -> io::Result<usize> {
  let new_pos = match pos {
    SeekFrom::Start(offset) => Some(i64::try_from(offset).unwrap_or(i64::MAX)),
    SeekFrom::End(offset) => (len as i64).checked_add(offset),
    SeekFrom::Current(offset) => (position as i64).checked_add(offset),
  };
  let Some(new_pos) = new_pos else {
    return Err(io::Error::new(io::ErrorKind::InvalidInput, "seek position overflows"));
  };

  if new_pos < 0 {
    return Err(io::Error::new(
      io::ErrorKind::InvalidInput,
      "Attempted to seek before start of buffer",
    ));
  }

  Ok(new_pos as usize)
}

// ============================================================================
// Read-Only Buffer (zero-copy input)
// ============================================================================

/// Read-only cursor over any byte container.
///
/// Borrowed slices, `Vec<u8>`, `Arc<[u8]>` or memory maps are read in place
/// without copying.
#[derive(Debug, Clone)]
pub struct ReadOnlyBuffer<S: AsRef<[u8]>> {
  source: S,
  position: usize,
}

impl<S: AsRef<[u8]>> ReadOnlyBuffer<S> {
  pub fn new(source: S) -> Self {
    Self {
      source,
      position: 0,
    }
  }

  #[inline]
  pub fn as_slice(&self) -> &[u8] {
    self.source.as_ref()
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.as_slice().len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  #[inline]
  pub fn position(&self) -> usize {
    self.position
  }

  /// Bytes left from the current position
  #[inline]
  pub fn remaining(&self) -> usize {
    self.len().saturating_sub(self.position)
  }

  pub fn into_inner(self) -> S {
    self.source
  }
}

impl<S: AsRef<[u8]>> Read for ReadOnlyBuffer<S> {
  fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    let data = self.source.as_ref();
    if self.position >= data.len() {
      return Ok(0);
    }

    let to_read = (data.len() - self.position).min(buf.len());
    buf[..to_read].copy_from_slice(&data[self.position..self.position + to_read]);
    self.position += to_read;

    Ok(to_read)
  }
}

impl<S: AsRef<[u8]>> Seek for ReadOnlyBuffer<S> {
  fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
    // Seeking past the end is allowed; the next read reports EOF
    self.position = resolve_seek(pos, self.position, self.len())?;
    Ok(self.position as u64)
  }
}

// ============================================================================
// Memory Buffer
// ============================================================================

/// Growable memory buffer supporting read, write and seek
///
/// Muxers that patch headers after the fact (WAV, MP4 faststart) seek back
/// and overwrite; seeking past the end and writing zero-fills the gap.
#[derive(Debug, Default, Clone)]
pub struct MemoryBuffer {
  data: Vec<u8>,
  position: usize,
  /// Maximum allowed size (0 = unlimited)
  max_size: usize,
}

impl MemoryBuffer {
  pub fn new() -> Self {
    Self::default()
  }

  /// Create a memory buffer with pre-allocated capacity
  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      data: Vec::with_capacity(capacity),
      ..Self::default()
    }
  }

  /// Create a memory buffer from existing data, positioned at the start
  pub fn from_data(data: Vec<u8>) -> Self {
    Self {
      data,
      ..Self::default()
    }
  }

  /// Set maximum allowed size (0 = unlimited)
  pub fn set_max_size(&mut self, max_size: usize) {
    self.max_size = max_size;
  }

  pub fn position(&self) -> usize {
    self.position
  }

  pub fn len(&self) -> usize {
    self.data.len()
  }

  pub fn is_empty(&self) -> bool {
    self.data.is_empty()
  }

  pub fn data(&self) -> &[u8] {
    &self.data
  }

  /// Take ownership of the buffer data, leaving the buffer empty
  pub fn take_data(&mut self) -> Vec<u8> {
    self.position = 0;
    std::mem::take(&mut self.data)
  }

  pub fn clear(&mut self) {
    self.data.clear();
    self.position = 0;
  }

  /// Bytes left from the current position
  pub fn remaining(&self) -> usize {
    self.data.len().saturating_sub(self.position)
  }
}

impl Write for MemoryBuffer {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    if buf.is_empty() {
      return Ok(0);
    }

    let required_len = self.position.saturating_add(buf.len());

    if self.max_size > 0 && required_len > self.max_size {
      return Err(io::Error::new(
        io::ErrorKind::WriteZero,
        format!(
          "Buffer would exceed maximum size ({} > {})",
          required_len, self.max_size
        ),
      ));
    }

    if required_len > self.data.len() {
      self.data.resize(required_len, 0);
    }

    self.data[self.position..required_len].copy_from_slice(buf);
    self.position = required_len;

    Ok(buf.len())
  }

  fn flush(&mut self) -> io::Result<()> {
    Ok(())
  }
}

impl Read for MemoryBuffer {
  fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    if self.position >= self.data.len() {
      return Ok(0);
    }

    let to_read = (self.data.len() - self.position).min(buf.len());
    buf[..to_read].copy_from_slice(&self.data[self.position..self.position + to_read]);
    self.position += to_read;

    Ok(to_read)
  }
}

impl Seek for MemoryBuffer {
  fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
    self.position = resolve_seek(pos, self.position, self.data.len())?;
    Ok(self.position as u64)
  }
}

// ============================================================================
// Shared Buffer
// ============================================================================

/// Cloneable handle to a [`MemoryBuffer`]
///
/// Hand one clone to the I/O bridge and keep another to inspect the bytes
/// while (or after) FFmpeg writes them.
#[derive(Debug, Default, Clone)]
pub struct SharedBuffer {
  inner: Arc<Mutex<MemoryBuffer>>,
}

impl SharedBuffer {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_capacity(capacity: usize) -> Self {
    Self::from_buffer(MemoryBuffer::with_capacity(capacity))
  }

  pub fn from_buffer(buffer: MemoryBuffer) -> Self {
    Self {
      inner: Arc::new(Mutex::new(buffer)),
    }
  }

  /// Lock the underlying buffer
  ///
  /// A poisoned lock is recovered: the buffer holds plain bytes, so a panic
  /// elsewhere cannot leave it logically inconsistent.
  pub fn lock(&self) -> MutexGuard<'_, MemoryBuffer> {
    self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  /// Copy of the current contents
  pub fn to_vec(&self) -> Vec<u8> {
    self.lock().data().to_vec()
  }

  pub fn len(&self) -> usize {
    self.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.lock().is_empty()
  }

  /// Number of live handles to this buffer
  pub fn handle_count(&self) -> usize {
    Arc::strong_count(&self.inner)
  }
}

impl Read for SharedBuffer {
  fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    self.lock().read(buf)
  }
}

impl Write for SharedBuffer {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    self.lock().write(buf)
  }

  fn flush(&mut self) -> io::Result<()> {
    Ok(())
  }
}

impl Seek for SharedBuffer {
  fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
    self.lock().seek(pos)
  }
}

// ============================================================================
// Channel Writer
// ============================================================================

/// Non-seekable sink that forwards every written chunk over a channel
///
/// Suited to streaming muxer output (e.g. fragmented MP4, MPEG-TS) to a
/// consumer thread. Dropping the writer closes the channel.
#[derive(Debug)]
pub struct ChannelWriter {
  sender: Sender<Vec<u8>>,
  bytes_sent: u64,
}

impl ChannelWriter {
  /// Unbounded channel
  pub fn unbounded() -> (Self, Receiver<Vec<u8>>) {
    let (sender, receiver) = channel::unbounded();
    (Self::new(sender), receiver)
  }

  /// Bounded channel; writes block while `capacity` chunks are queued
  pub fn bounded(capacity: usize) -> (Self, Receiver<Vec<u8>>) {
    let (sender, receiver) = channel::bounded(capacity);
    (Self::new(sender), receiver)
  }

  pub fn new(sender: Sender<Vec<u8>>) -> Self {
    Self {
      sender,
      bytes_sent: 0,
    }
  }

  /// Total bytes handed to the channel
  pub fn bytes_sent(&self) -> u64 {
    self.bytes_sent
  }
}

impl Write for ChannelWriter {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    if buf.is_empty() {
      return Ok(0);
    }
    self
      .sender
      .send(buf.to_vec())
      .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "Receiver disconnected"))?;
    self.bytes_sent += buf.len() as u64;
    Ok(buf.len())
  }

  fn flush(&mut self) -> io::Result<()> {
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_memory_buffer_write_read() {
    let mut buf = MemoryBuffer::new();

    buf.write_all(b"Hello, ").unwrap();
    buf.write_all(b"World!").unwrap();

    assert_eq!(buf.len(), 13);
    assert_eq!(buf.position(), 13);

    buf.seek(SeekFrom::Start(0)).unwrap();
    let mut output = vec![0u8; 13];
    buf.read_exact(&mut output).unwrap();
    assert_eq!(&output, b"Hello, World!");
  }

  #[test]
  fn test_memory_buffer_seek_write() {
    let mut buf = MemoryBuffer::new();
    buf.write_all(b"AAAA").unwrap();
    buf.seek(SeekFrom::Start(2)).unwrap();
    buf.write_all(b"BB").unwrap();
    assert_eq!(buf.data(), b"AABB");
  }

  #[test]
  fn test_memory_buffer_seek_past_end() {
    let mut buf = MemoryBuffer::new();
    buf.seek(SeekFrom::Start(5)).unwrap();
    buf.write_all(b"X").unwrap();
    assert_eq!(buf.data(), &[0, 0, 0, 0, 0, b'X']);
  }

  #[test]
  fn test_memory_buffer_seek_before_start_fails() {
    let mut buf = MemoryBuffer::from_data(vec![1, 2, 3]);
    let err = buf.seek(SeekFrom::Current(-1)).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    assert_eq!(buf.position(), 0);
  }

  #[test]
  fn test_seek_overflow_is_invalid_input() {
    let mut buf = MemoryBuffer::from_data(vec![0; 10]);
    buf.seek(SeekFrom::Start(4)).unwrap();
    let err = buf.seek(SeekFrom::End(i64::MAX)).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    let err = buf.seek(SeekFrom::Current(i64::MAX)).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    assert_eq!(buf.position(), 4);

    let mut shared = SharedBuffer::from_buffer(MemoryBuffer::from_data(vec![0; 10]));
    assert!(shared.seek(SeekFrom::End(i64::MAX)).is_err());

    let mut read_only = ReadOnlyBuffer::new(&[1u8, 2, 3][..]);
    let err = read_only.seek(SeekFrom::End(i64::MAX)).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
  }

  #[test]
  fn test_memory_buffer_max_size() {
    let mut buf = MemoryBuffer::new();
    buf.set_max_size(4);
    buf.write_all(b"1234").unwrap();
    assert!(buf.write(b"5").is_err());
  }

  #[test]
  fn test_memory_buffer_take_data() {
    let mut buf = MemoryBuffer::new();
    buf.write_all(b"test").unwrap();

    let data = buf.take_data();
    assert_eq!(&data, b"test");
    assert!(buf.is_empty());
    assert_eq!(buf.position(), 0);
  }

  #[test]
  fn test_read_only_buffer_borrows_slice() {
    let bytes = [10u8, 20, 30, 40];
    let mut buf = ReadOnlyBuffer::new(&bytes[..]);
    let mut out = [0u8; 3];
    assert_eq!(buf.read(&mut out).unwrap(), 3);
    assert_eq!(out, [10, 20, 30]);
    assert_eq!(buf.remaining(), 1);

    buf.seek(SeekFrom::End(10)).unwrap();
    assert_eq!(buf.read(&mut out).unwrap(), 0);
  }

  #[test]
  fn test_shared_buffer_handles_see_same_bytes() {
    let shared = SharedBuffer::new();
    let mut writer = shared.clone();
    writer.write_all(b"abc").unwrap();
    assert_eq!(shared.to_vec(), b"abc");
    assert_eq!(shared.handle_count(), 2);
    drop(writer);
    assert_eq!(shared.handle_count(), 1);
  }

  #[test]
  fn test_channel_writer_forwards_chunks() {
    let (mut writer, receiver) = ChannelWriter::unbounded();
    writer.write_all(b"one").unwrap();
    writer.write_all(b"two").unwrap();
    assert_eq!(writer.bytes_sent(), 6);
    drop(writer);

    let chunks: Vec<Vec<u8>> = receiver.iter().collect();
    assert_eq!(chunks, vec![b"one".to_vec(), b"two".to_vec()]);
  }

  #[test]
  fn test_channel_writer_reports_disconnect() {
    let (mut writer, receiver) = ChannelWriter::bounded(1);
    drop(receiver);
    let err = writer.write(b"x").unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
  }
}
