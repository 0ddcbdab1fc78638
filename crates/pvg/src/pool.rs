//! Fixed-slot scratch buffer pool.
//!
//! Buffers are handed out as [`PooledBuffer`] handles that go back on the free list when
//! dropped, so every exit path of the renting scope releases them, `?` returns included.

use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, PoisonError};

use thiserror::Error;

/// Pool failures. Exhaustion means the pool was sized too small for the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("buffer pool exhausted: all {capacity} slots of length {slot_len} are rented")]
    Exhausted { capacity: usize, slot_len: usize },
}

#[derive(Debug, Default)]
struct PoolState {
    free: Vec<Box<[f64]>>,
    outstanding: usize,
}

/// Free list of equally sized `f64` buffers with a cap on concurrently rented slots.
#[derive(Debug)]
pub struct BufferPool {
    slot_len: usize,
    capacity: usize,
    state: Mutex<PoolState>,
}

impl BufferPool {
    pub fn new(slot_len: usize, capacity: usize) -> Self {
        Self {
            slot_len,
            capacity,
            state: Mutex::new(PoolState::default()),
        }
    }

    pub fn slot_len(&self) -> usize {
        self.slot_len
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of handles currently rented.
    pub fn outstanding(&self) -> usize {
        self.lock().outstanding
    }

    /// Number of released buffers waiting for reuse.
    pub fn idle(&self) -> usize {
        self.lock().free.len()
    }

    /// Rent a zero-filled buffer of `slot_len` values.
    pub fn rent(&self) -> Result<PooledBuffer<'_>, PoolError> {
        let mut state = self.lock();
        if state.outstanding >= self.capacity {
            return Err(PoolError::Exhausted {
                capacity: self.capacity,
                slot_len: self.slot_len,
            });
        }
        state.outstanding += 1;
        let mut buf = state
            .free
            .pop()
            .unwrap_or_else(|| vec![0.0; self.slot_len].into_boxed_slice());
        drop(state);
        buf.fill(0.0);
        Ok(PooledBuffer { pool: self, buf })
    }

    fn release(&self, buf: Box<[f64]>) {
        let mut state = self.lock();
        state.outstanding = state.outstanding.saturating_sub(1);
        state.free.push(buf);
    }

    // A panic while the lock is held cannot leave the free list inconsistent, so a
    // poisoned mutex is still usable.
    fn lock(&self) -> std::sync::MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Rented buffer; returns itself to the pool on drop.
#[derive(Debug)]
pub struct PooledBuffer<'a> {
    pool: &'a BufferPool,
    buf: Box<[f64]>,
}

impl Deref for PooledBuffer<'_> {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.buf
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut [f64] {
        &mut self.buf
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buf));
    }
}
