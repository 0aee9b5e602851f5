// トランザクション／ブロック識別子のメモ化と、その診断用カウンタ。
use core::{
  fmt::{self, Debug},
  sync::atomic::{AtomicU64, Ordering},
};
use std::sync::OnceLock;

pub(crate) static TX_HASHES_CALCULATED: AtomicU64 = AtomicU64::new(0);
pub(crate) static TX_HASHES_CACHED: AtomicU64 = AtomicU64::new(0);
pub(crate) static BLOCK_HASHES_CALCULATED: AtomicU64 = AtomicU64::new(0);
pub(crate) static BLOCK_HASHES_CACHED: AtomicU64 = AtomicU64::new(0);

/// A snapshot of the process-wide identity-hash counters.
///
/// Each counter is loaded independently. The snapshot is not guaranteed to be coherent across
/// counters.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct HashStats {
  /// The amount of transaction identity hashes computed.
  pub tx_hashes_calculated: u64,
  /// The amount of transaction identity hashes served from an object's cache.
  pub tx_hashes_cached: u64,
  /// The amount of block identity hashes computed.
  pub block_hashes_calculated: u64,
  /// The amount of block identity hashes served from an object's cache.
  pub block_hashes_cached: u64,
}

/// Snapshot the process-wide identity-hash counters.
pub fn hash_stats() -> HashStats {
  HashStats {
    tx_hashes_calculated: TX_HASHES_CALCULATED.load(Ordering::Relaxed),
    tx_hashes_cached: TX_HASHES_CACHED.load(Ordering::Relaxed),
    block_hashes_calculated: BLOCK_HASHES_CALCULATED.load(Ordering::Relaxed),
    block_hashes_cached: BLOCK_HASHES_CACHED.load(Ordering::Relaxed),
  }
}

/// A memoized value.
///
/// A reader observing the value present may use it. A reader observing it absent computes it
/// locally, possibly redundantly with another thread. The first store wins and later stores are
/// discarded, which is sound as the value is a pure function of the object holding the cache.
///
/// Comparisons see through this type so caches never affect the equality of the objects holding
/// them.
pub(crate) struct Cached<T>(OnceLock<T>);

impl<T> Cached<T> {
  pub(crate) fn new() -> Self {
    Self(OnceLock::new())
  }

  pub(crate) fn get(&self) -> Option<&T> {
    self.0.get()
  }

  pub(crate) fn get_or_init(&self, f: impl FnOnce() -> T) -> &T {
    self.0.get_or_init(f)
  }

  pub(crate) fn invalidate(&mut self) {
    self.0 = OnceLock::new();
  }
}

impl<T: Clone> Clone for Cached<T> {
  fn clone(&self) -> Self {
    let res = Self::new();
    if let Some(value) = self.0.get() {
      let _ = res.0.set(value.clone());
    }
    res
  }
}

impl<T> Default for Cached<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T> Debug for Cached<T> {
  fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt.debug_struct("Cached").finish_non_exhaustive()
  }
}

impl<T> PartialEq for Cached<T> {
  fn eq(&self, _: &Self) -> bool {
    true
  }
}
impl<T> Eq for Cached<T> {}
