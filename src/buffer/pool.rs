use bytes::BytesMut;
use parking_lot::Mutex;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};

/// Capacity given to a freshly allocated buffer.
pub const INITIAL_CAPACITY: usize = 512;
/// Upper bound on idle buffers kept by a pool.
pub const MAX_POOLED_BUFFERS: usize = 1024;
/// Buffers that grew past this are freed on release instead of kept.
pub const MAX_RETAINED_CAPACITY: usize = 64 * 1024;

static GLOBAL: Pool = Pool::new();

/// The process-wide pool every `Logger` draws event buffers from.
pub fn global() -> &'static Pool {
    &GLOBAL
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    pub acquired: u64,
    pub reused: u64,
    pub allocated: u64,
    pub released: u64,
    pub discarded: u64,
}

struct PoolStatsCollector {
    acquired: AtomicU64,
    reused: AtomicU64,
    allocated: AtomicU64,
    released: AtomicU64,
    discarded: AtomicU64,
}

impl PoolStatsCollector {
    const fn new() -> Self {
        Self {
            acquired: AtomicU64::new(0),
            reused: AtomicU64::new(0),
            allocated: AtomicU64::new(0),
            released: AtomicU64::new(0),
            discarded: AtomicU64::new(0),
        }
    }

    fn snapshot(&self) -> PoolStats {
        PoolStats {
            acquired: self.acquired.load(Ordering::Relaxed),
            reused: self.reused.load(Ordering::Relaxed),
            allocated: self.allocated.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
        }
    }
}

/// Free-list of reusable byte buffers.
///
/// A buffer is either owned by exactly one `PooledBuffer` or sitting in the
/// free-list. Moving it between the two happens under the free-list lock, and
/// the guard is not `Clone`, so a buffer can neither be handed out twice nor
/// released twice.
pub struct Pool {
    free: Mutex<Vec<BytesMut>>,
    stats: PoolStatsCollector,
    max_pooled: usize,
    max_retained_capacity: usize,
}

impl Pool {
    pub const fn new() -> Self {
        Self::with_limits(MAX_POOLED_BUFFERS, MAX_RETAINED_CAPACITY)
    }

    pub const fn with_limits(max_pooled: usize, max_retained_capacity: usize) -> Self {
        Self {
            free: parking_lot::const_mutex(Vec::new()),
            stats: PoolStatsCollector::new(),
            max_pooled,
            max_retained_capacity,
        }
    }

    /// Takes an idle buffer, or allocates one when the free-list is empty.
    /// The buffer is always empty; recycled ones keep their capacity.
    pub fn acquire(&self) -> PooledBuffer<'_> {
        self.stats.acquired.fetch_add(1, Ordering::Relaxed);

        let recycled = self.free.lock().pop();
        let buf = if let Some(buf) = recycled {
            self.stats.reused.fetch_add(1, Ordering::Relaxed);
            buf
        } else {
            self.stats.allocated.fetch_add(1, Ordering::Relaxed);
            BytesMut::with_capacity(INITIAL_CAPACITY)
        };
        debug_assert!(buf.is_empty());

        PooledBuffer { buf, pool: self }
    }

    /// Returns a buffer to the pool. Same as dropping the guard.
    pub fn release(&self, buffer: PooledBuffer<'_>) {
        drop(buffer);
    }

    /// Idle buffers currently held.
    pub fn available(&self) -> usize {
        self.free.lock().len()
    }

    pub fn stats(&self) -> PoolStats {
        self.stats.snapshot()
    }

    fn give_back(&self, mut buf: BytesMut) {
        self.stats.released.fetch_add(1, Ordering::Relaxed);

        if buf.capacity() > self.max_retained_capacity {
            self.stats.discarded.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(capacity = buf.capacity(), "dropping oversized pooled buffer");
            return;
        }

        buf.clear();
        let mut free = self.free.lock();
        if free.len() >= self.max_pooled {
            drop(free);
            self.stats.discarded.fetch_add(1, Ordering::Relaxed);
            return;
        }
        free.push(buf);
    }
}

impl Default for Pool {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("available", &self.available())
            .field("stats", &self.stats())
            .finish()
    }
}

/// A buffer checked out of a `Pool`; goes back on drop.
pub struct PooledBuffer<'p> {
    buf: BytesMut,
    pool: &'p Pool,
}

impl Deref for PooledBuffer<'_> {
    type Target = BytesMut;

    fn deref(&self) -> &BytesMut {
        &self.buf
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut BytesMut {
        &mut self.buf
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        let buf = std::mem::take(&mut self.buf);
        self.pool.give_back(buf);
    }
}

impl fmt::Debug for PooledBuffer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledBuffer")
            .field("len", &self.buf.len())
            .field("capacity", &self.buf.capacity())
            .finish()
    }
}
