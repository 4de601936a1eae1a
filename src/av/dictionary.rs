//! AVDictionary wrappers
//!
//! [`Dictionary`] owns a dictionary (options handed to open calls, metadata
//! being built); [`DictionaryRef`] views one owned by a live FFmpeg object.

use super::{borrowed_str, to_cstring, Error, Result};
use crate::ffi::accessors::{ffdictentry_get_key, ffdictentry_get_value};
use crate::ffi::avutil::{av_dict_copy, av_dict_count, av_dict_free, av_dict_get, av_dict_set};
use crate::ffi::{check, dict_flag, AVDictionary, AVDictionaryEntry};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;
use std::ptr;

/// Owned dictionary; an empty dictionary is a NULL pointer, as in FFmpeg
pub struct Dictionary {
  ptr: *mut AVDictionary,
}

impl Dictionary {
  pub fn new() -> Self {
    Self {
      ptr: ptr::null_mut(),
    }
  }

  /// Build from key/value pairs, later keys overwriting earlier ones
  pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
  where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
  {
    let mut dict = Self::new();
    for (key, value) in pairs {
      dict.set(key.as_ref(), value.as_ref())?;
    }
    Ok(dict)
  }

  /// Take ownership of a raw dictionary
  ///
  /// # Safety
  /// `ptr` must be NULL or a dictionary nobody else will free
  pub unsafe fn from_raw(ptr: *mut AVDictionary) -> Self {
    Self { ptr }
  }

  /// Release ownership; the caller must free the result with av_dict_free
  pub fn into_raw(self) -> *mut AVDictionary {
    let ptr = self.ptr;
    std::mem::forget(self);
    ptr
  }

  /// Slot for FFmpeg calls taking `AVDictionary **`
  ///
  /// After an open call it holds the entries FFmpeg did not consume.
  pub(crate) fn as_mut_slot(&mut self) -> *mut *mut AVDictionary {
    &mut self.ptr
  }

  pub fn as_ptr(&self) -> *const AVDictionary {
    self.ptr
  }

  /// Insert or overwrite an entry
  pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
    if key.is_empty() {
      return Err(Error::InvalidArgument("dictionary key must not be empty".into()));
    }
    let key = to_cstring(key)?;
    let value = to_cstring(value)?;
    check(unsafe { av_dict_set(&mut self.ptr, key.as_ptr(), value.as_ptr(), 0) })?;
    Ok(())
  }

  /// Remove an entry; absent keys are ignored
  pub fn remove(&mut self, key: &str) -> Result<()> {
    let key = to_cstring(key)?;
    check(unsafe { av_dict_set(&mut self.ptr, key.as_ptr(), ptr::null(), 0) })?;
    Ok(())
  }

  pub fn get(&self, key: &str) -> Option<Cow<'_, str>> {
    self.as_view().get(key)
  }

  pub fn len(&self) -> usize {
    self.as_view().len()
  }

  pub fn is_empty(&self) -> bool {
    self.ptr.is_null() || self.len() == 0
  }

  /// Entries in insertion order
  pub fn iter(&self) -> Entries<'_> {
    self.as_view().iter()
  }

  /// Borrow as a read-only view
  pub fn as_view(&self) -> DictionaryRef<'_> {
    // SAFETY: the view's lifetime is tied to &self
    unsafe { DictionaryRef::from_ptr(self.ptr) }
  }

  /// Deep copy
  pub fn try_clone(&self) -> Result<Self> {
    self.as_view().to_dictionary()
  }

  /// Keys left over after FFmpeg consumed what it recognised
  pub(crate) fn keys(&self) -> Vec<String> {
    self.iter().map(|(k, _)| k.into_owned()).collect()
  }
}

impl Default for Dictionary {
  fn default() -> Self {
    Self::new()
  }
}

impl Drop for Dictionary {
  fn drop(&mut self) {
    if !self.ptr.is_null() {
      unsafe { av_dict_free(&mut self.ptr) };
    }
  }
}

impl fmt::Debug for Dictionary {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.as_view().fmt(f)
  }
}

impl Serialize for Dictionary {
  fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    self.as_view().serialize(serializer)
  }
}

// SAFETY: AVDictionary has no thread affinity; the owner has exclusive access
unsafe impl Send for Dictionary {}

// ============================================================================
// Borrowed view
// ============================================================================

/// Read-only view of a dictionary owned by a format context, stream or frame
///
/// Strings are read from FFmpeg on every call; copy them to keep them.
#[derive(Clone, Copy)]
pub struct DictionaryRef<'a> {
  ptr: *const AVDictionary,
  _marker: PhantomData<&'a AVDictionary>,
}

impl<'a> DictionaryRef<'a> {
  /// # Safety
  /// `ptr` must be NULL or stay valid and unmodified for `'a`
  pub unsafe fn from_ptr(ptr: *const AVDictionary) -> Self {
    Self {
      ptr,
      _marker: PhantomData,
    }
  }

  pub fn get(&self, key: &str) -> Option<Cow<'a, str>> {
    if self.ptr.is_null() {
      return None;
    }
    let key = to_cstring(key).ok()?;
    unsafe {
      let entry = av_dict_get(self.ptr, key.as_ptr(), ptr::null(), 0);
      if entry.is_null() {
        return None;
      }
      borrowed_str(ffdictentry_get_value(entry))
    }
  }

  pub fn len(&self) -> usize {
    if self.ptr.is_null() {
      return 0;
    }
    unsafe { av_dict_count(self.ptr) }.max(0) as usize
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn iter(&self) -> Entries<'a> {
    Entries {
      dict: self.ptr,
      prev: ptr::null(),
      _marker: PhantomData,
    }
  }

  /// Copy into an owned dictionary
  pub fn to_dictionary(&self) -> Result<Dictionary> {
    let mut dict = Dictionary::new();
    if !self.ptr.is_null() {
      check(unsafe { av_dict_copy(&mut dict.ptr, self.ptr, 0) })?;
    }
    Ok(dict)
  }
}

impl<'a> IntoIterator for DictionaryRef<'a> {
  type Item = (Cow<'a, str>, Cow<'a, str>);
  type IntoIter = Entries<'a>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

impl<'a> IntoIterator for &'a Dictionary {
  type Item = (Cow<'a, str>, Cow<'a, str>);
  type IntoIter = Entries<'a>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

impl fmt::Debug for DictionaryRef<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_map().entries(self.iter()).finish()
  }
}

impl Serialize for DictionaryRef<'_> {
  fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(self.len()))?;
    for (key, value) in self.iter() {
      map.serialize_entry(&key, &value)?;
    }
    map.end()
  }
}

/// Entry iterator in insertion order
pub struct Entries<'a> {
  dict: *const AVDictionary,
  prev: *const AVDictionaryEntry,
  _marker: PhantomData<&'a AVDictionary>,
}

impl<'a> Iterator for Entries<'a> {
  type Item = (Cow<'a, str>, Cow<'a, str>);

  fn next(&mut self) -> Option<Self::Item> {
    if self.dict.is_null() {
      return None;
    }
    loop {
      // An empty key with IGNORE_SUFFIX matches every entry
      let flags = dict_flag::IGNORE_SUFFIX;
      let entry = unsafe { av_dict_get(self.dict, c"".as_ptr(), self.prev, flags) };
      if entry.is_null() {
        return None;
      }
      self.prev = entry;
      unsafe {
        if let (Some(key), Some(value)) = (
          borrowed_str(ffdictentry_get_key(entry)),
          borrowed_str(ffdictentry_get_value(entry)),
        ) {
          return Some((key, value));
        }
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_set_get_overwrite() {
    let mut dict = Dictionary::new();
    assert!(dict.is_empty());
    assert!(dict.as_ptr().is_null());

    dict.set("title", "first").unwrap();
    dict.set("artist", "someone").unwrap();
    dict.set("title", "second").unwrap();

    assert_eq!(dict.len(), 2);
    assert_eq!(dict.get("title").as_deref(), Some("second"));
    assert_eq!(dict.get("missing"), None);
  }

  #[test]
  fn test_remove() {
    let mut dict = Dictionary::from_pairs([("a", "1"), ("b", "2")]).unwrap();
    dict.remove("a").unwrap();
    dict.remove("not-there").unwrap();
    assert_eq!(dict.keys(), vec!["b".to_string()]);
  }

  #[test]
  fn test_iteration_preserves_insertion_order() {
    let dict = Dictionary::from_pairs([("z", "26"), ("a", "1"), ("m", "13")]).unwrap();
    let keys: Vec<String> = dict.iter().map(|(k, _)| k.into_owned()).collect();
    assert_eq!(keys, ["z", "a", "m"]);
  }

  #[test]
  fn test_rejects_nul_and_empty_key() {
    let mut dict = Dictionary::new();
    assert!(dict.set("bad\0key", "v").is_err());
    assert!(dict.set("", "v").is_err());
    assert!(dict.is_empty());
  }

  #[test]
  fn test_try_clone_is_independent() {
    let mut original = Dictionary::from_pairs([("k", "v")]).unwrap();
    let copy = original.try_clone().unwrap();
    original.set("k", "changed").unwrap();
    assert_eq!(copy.get("k").as_deref(), Some("v"));
  }

  #[test]
  fn test_serializes_as_object() {
    let dict = Dictionary::from_pairs([("encoder", "ffbridge"), ("language", "eng")]).unwrap();
    let value = serde_json::to_value(&dict).unwrap();
    assert_eq!(value, serde_json::json!({"encoder": "ffbridge", "language": "eng"}));
  }

  #[test]
  fn test_null_view_is_empty() {
    let view = unsafe { DictionaryRef::from_ptr(ptr::null()) };
    assert!(view.is_empty());
    assert_eq!(view.iter().count(), 0);
    assert_eq!(serde_json::to_string(&view).unwrap(), "{}");
  }

  #[test]
  fn test_raw_round_trip() {
    let dict = Dictionary::from_pairs([("x", "y")]).unwrap();
    let raw = dict.into_raw();
    let back = unsafe { Dictionary::from_raw(raw) };
    assert_eq!(back.get("x").as_deref(), Some("y"));
  }
}
