//! Object pools for the logging hot path
//!
//! Three independent free lists keep a steady-state log call from
//! allocating: finalized entries, pooled fields and byte buffers for the
//! encoders. Each list is a bounded `crossbeam-channel`, so acquire and
//! release are lock-free and safe from any thread. An acquired object is
//! owned by exactly one thread until it is released.
//!
//! Shared objects are never recycled: entries and fields live behind `Arc`
//! and are only returned to a pool when the releasing side holds the last
//! reference. Anything still referenced elsewhere (for instance by an
//! asynchronous handler) is left to its other owners.

use super::field::{Field, FieldValue};
use super::log_entry::{LogEntry, Origin};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

/// Default number of idle objects each pool keeps.
pub const DEFAULT_POOL_CAPACITY: usize = 1024;

/// Default capacity of a freshly allocated encoder buffer.
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// Buffers that grew beyond this are dropped instead of pooled.
pub const MAX_POOLED_BUFFER_SIZE: usize = 64 * 1024;

/// Snapshot of a pool's counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Acquisitions served from the free list
    pub hits: u64,
    /// Acquisitions that had to allocate
    pub misses: u64,
    /// Objects accepted back into the free list
    pub recycled: u64,
    /// Objects dropped on release (pool full or still shared)
    pub discarded: u64,
}

#[derive(Debug, Default)]
struct PoolCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    recycled: AtomicU64,
    discarded: AtomicU64,
}

/// Bounded thread-safe free list.
pub struct Pool<T> {
    sender: Sender<T>,
    receiver: Receiver<T>,
    counters: PoolCounters,
}

impl<T> Pool<T> {
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            counters: PoolCounters::default(),
        }
    }

    /// Take an idle object, if any.
    pub fn try_acquire(&self) -> Option<T> {
        match self.receiver.try_recv() {
            Ok(item) => {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                Some(item)
            }
            Err(_) => {
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Return an object; it is dropped when the pool is full.
    pub fn release(&self, item: T) -> bool {
        match self.sender.try_send(item) {
            Ok(()) => {
                self.counters.recycled.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(_) => {
                self.record_discarded();
                false
            }
        }
    }

    fn record_discarded(&self) {
        self.counters.discarded.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of idle objects
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.sender.capacity().unwrap_or(0)
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            recycled: self.counters.recycled.load(Ordering::Relaxed),
            discarded: self.counters.discarded.load(Ordering::Relaxed),
        }
    }
}

/// Pool of fields created by key/value parsing.
pub struct FieldPool {
    pool: Pool<Arc<Field>>,
}

impl FieldPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            pool: Pool::new(capacity),
        }
    }

    /// A field holding `name` and `value`, recycled when possible.
    pub fn acquire(&self, name: &str, value: FieldValue) -> Arc<Field> {
        if let Some(mut field) = self.pool.try_acquire() {
            if let Some(inner) = Arc::get_mut(&mut field) {
                inner.reset(name, value);
                return field;
            }
        }
        Arc::new(Field {
            name: name.to_string(),
            value,
        })
    }

    /// An idle field as it sits in the pool (always empty).
    pub fn try_acquire(&self) -> Option<Arc<Field>> {
        self.pool.try_acquire()
    }

    /// Reset and pool `field` unless another owner still references it.
    pub fn release(&self, mut field: Arc<Field>) {
        match Arc::get_mut(&mut field) {
            Some(inner) => {
                inner.reset("", FieldValue::Null);
                self.pool.release(field);
            }
            None => self.pool.record_discarded(),
        }
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    pub fn stats(&self) -> PoolStats {
        self.pool.stats()
    }
}

/// Pool of finalized entries.
pub struct EntryPool {
    pool: Pool<Arc<LogEntry>>,
}

impl EntryPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            pool: Pool::new(capacity),
        }
    }

    /// An empty entry tagged [`Origin::Pooled`].
    pub fn acquire(&self) -> Arc<LogEntry> {
        if let Some(mut entry) = self.pool.try_acquire() {
            if Arc::get_mut(&mut entry).is_some() {
                return entry;
            }
        }
        Arc::new(LogEntry::empty(Origin::Pooled))
    }

    /// Clear and pool `entry`.
    ///
    /// Retained entries, and pooled entries somebody still holds, are
    /// never reclaimed.
    pub fn release(&self, mut entry: Arc<LogEntry>, fields: &FieldPool) {
        if entry.origin() != Origin::Pooled {
            return;
        }
        match Arc::get_mut(&mut entry) {
            Some(inner) => {
                inner.clear(fields);
                self.pool.release(entry);
            }
            None => self.pool.record_discarded(),
        }
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    pub fn stats(&self) -> PoolStats {
        self.pool.stats()
    }
}

/// Pool of byte buffers used by encoding handlers.
pub struct BufferPool {
    pool: Pool<Vec<u8>>,
    buffer_size: usize,
}

impl BufferPool {
    pub fn new(capacity: usize, buffer_size: usize) -> Self {
        Self {
            pool: Pool::new(capacity),
            buffer_size,
        }
    }

    /// An empty buffer.
    pub fn acquire(&self) -> Vec<u8> {
        match self.pool.try_acquire() {
            Some(mut buf) => {
                buf.clear();
                buf
            }
            None => Vec::with_capacity(self.buffer_size),
        }
    }

    pub fn release(&self, mut buf: Vec<u8>) {
        if buf.capacity() > MAX_POOLED_BUFFER_SIZE {
            self.pool.record_discarded();
            return;
        }
        buf.clear();
        self.pool.release(buf);
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    pub fn stats(&self) -> PoolStats {
        self.pool.stats()
    }
}

/// The three pools a logger draws from.
pub struct Pools {
    pub fields: FieldPool,
    pub entries: EntryPool,
    pub buffers: BufferPool,
}

impl Pools {
    pub fn new(capacity: usize) -> Self {
        Self {
            fields: FieldPool::new(capacity),
            entries: EntryPool::new(capacity),
            buffers: BufferPool::new(capacity, DEFAULT_BUFFER_SIZE),
        }
    }

    /// Process-wide pools shared by every logger not given its own.
    pub fn global() -> Arc<Pools> {
        static GLOBAL: OnceLock<Arc<Pools>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(Pools::default())))
    }
}

impl Default for Pools {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_CAPACITY)
    }
}
