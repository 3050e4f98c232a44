//! Forward-linked bucket sequences.
//!
//! Every bucket before the tail is full, only the tail may be partially filled.
//! A chain never releases single buckets - it is released whole.

use super::{BucketID, PoolInner};
use crate::Point;

/// The buckets making up one stroke's points, in insertion order.
///
/// The chain does not know which pool it lives in; the owner passes it in.
/// Dropping a chain without [`Chain::release`] leaks its buckets until the pool is destroyed.
#[derive(Debug, Default)]
pub struct Chain {
    head: Option<BucketID>,
    tail: Option<BucketID>,
    len: usize,
    /// Pool generation these buckets were issued in.
    generation: u64,
}
impl Chain {
    pub(crate) fn new(inner: &PoolInner) -> Self {
        Self {
            generation: inner.generation(),
            ..Default::default()
        }
    }
    /// Number of points stored. Meaningless if the pool has since been destroyed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
    #[must_use]
    pub fn head(&self) -> Option<BucketID> {
        self.head
    }
    /// Are this chain's buckets still owned by it?
    pub(crate) fn is_current(&self, inner: &PoolInner) -> bool {
        self.generation == inner.generation()
    }
    /// Forget buckets issued before the pool was destroyed. Returns true if anything was forgotten.
    pub(crate) fn revalidate(&mut self, inner: &PoolInner) -> bool {
        if self.is_current(inner) {
            false
        } else {
            *self = Self::new(inner);
            true
        }
    }
    /// Append a point, acquiring and linking a new tail bucket if the current one is full.
    pub(crate) fn append(&mut self, inner: &mut PoolInner, point: Point) {
        self.revalidate(inner);
        let tail = match self.tail {
            Some(tail) if inner.bucket(tail).is_some_and(|bucket| !bucket.is_full()) => tail,
            previous => {
                let fresh = inner.acquire();
                match previous {
                    Some(previous) => inner.link(previous, fresh),
                    None => self.head = Some(fresh),
                }
                self.tail = Some(fresh);
                fresh
            }
        };
        match inner.bucket_mut(tail).map(|bucket| bucket.push(point)) {
            Some(Ok(())) => self.len += 1,
            // Fresh buckets are empty, so only a missing bucket can land here.
            Some(Err(_)) | None => log::debug!("{tail:?} tail bucket unusable, point dropped"),
        }
    }
    /// Return every bucket to the pool, leaving the chain empty.
    /// Returns the number of buckets released.
    pub(crate) fn release(&mut self, inner: &mut PoolInner) -> usize {
        let released = if self.is_current(inner) {
            inner.release_chain(self.head)
        } else {
            // Already reclaimed by the pool's destruction.
            0
        };
        *self = Self::new(inner);
        released
    }
    /// Iterate over the filled portion of every bucket, head to tail.
    pub(crate) fn buckets<'a>(&self, inner: &'a PoolInner) -> Buckets<'a> {
        Buckets {
            inner: Some(inner),
            next: if self.is_current(inner) {
                self.head
            } else {
                None
            },
        }
    }
}

/// Iterator over the point slices of a chain, head to tail.
#[derive(Clone)]
pub struct Buckets<'a> {
    inner: Option<&'a PoolInner>,
    next: Option<BucketID>,
}
impl<'a> Buckets<'a> {
    /// An iterator yielding nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            inner: None,
            next: None,
        }
    }
}
impl<'a> Iterator for Buckets<'a> {
    type Item = &'a [Point];
    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next.take()?;
        let Some(bucket) = self.inner?.bucket(id) else {
            // Implementation bug!
            log::debug!("{id:?} linked into a chain, but not found in pool!");
            return None;
        };
        self.next = bucket.next();
        Some(bucket.points())
    }
}
impl std::iter::FusedIterator for Buckets<'_> {}
