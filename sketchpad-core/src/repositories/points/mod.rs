//! # Points
//!
//! Points have the largest size footprint of all resources, due to how numerous they are.
//! Strokes grow one point at a time and are created and thrown away constantly (every new stroke,
//! every undo), so point storage is handed out in uniform fixed-size [`Bucket`]s from a [`PointPool`].
//! Reuse is a free-list pop, growth is a bump into a pre-reserved [`region::Region`].
//!
//! A stroke links its buckets into a [`chain::Chain`].

pub mod chain;
mod region;

use region::Region;

use crate::Point;

/// Points held by a single bucket.
pub const BUCKET_CAPACITY: usize = 64;
/// Buckets reserved by every region after the first.
pub const REGION_BUCKETS: usize = 256;

/// Handle to a bucket within a [`PointPool`].
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct BucketID {
    region: u32,
    index: u32,
}

/// A fixed-capacity run of points, plus a link to the next bucket in the same chain.
///
/// Invariant: `len <= BUCKET_CAPACITY`.
#[derive(Copy, Clone)]
pub struct Bucket {
    points: [Point; BUCKET_CAPACITY],
    len: usize,
    next: Option<BucketID>,
}
impl Bucket {
    fn empty() -> Self {
        Self {
            points: [Point::zero(); BUCKET_CAPACITY],
            len: 0,
            next: None,
        }
    }
    /// The filled portion of this bucket, in insertion order.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points[..self.len]
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len >= BUCKET_CAPACITY
    }
    #[must_use]
    pub fn next(&self) -> Option<BucketID> {
        self.next
    }
    /// Append a point. Returns the point back if the bucket is full.
    pub fn push(&mut self, point: Point) -> Result<(), Point> {
        if let Some(slot) = self.points.get_mut(self.len) {
            *slot = point;
            self.len += 1;
            Ok(())
        } else {
            Err(point)
        }
    }
}
impl std::fmt::Debug for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bucket")
            .field("points", &self.points())
            .field("next", &self.next)
            .finish()
    }
}

/// A snapshot of a pool's memory usage.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct PoolUsage {
    /// Backing regions currently reserved.
    pub regions: usize,
    /// Buckets that could be carved without reserving a new region, plus those already carved.
    pub capacity: usize,
    /// Buckets carved from regions so far.
    pub carved: usize,
    /// Carved buckets sitting in the free list.
    pub free: usize,
    /// Bytes reserved by all regions.
    pub reserved_bytes: usize,
}
impl PoolUsage {
    /// Buckets currently owned by a stroke.
    #[must_use]
    pub fn in_use(&self) -> usize {
        self.carved.saturating_sub(self.free)
    }
}

pub(crate) struct PoolInner {
    regions: Vec<Region>,
    free: Vec<BucketID>,
    /// Bumped on every [`PointPool::destroy`]. Chains record the generation they were built in
    /// and are treated as empty once it no longer matches.
    generation: u64,
    capacity_hint: usize,
}
impl PoolInner {
    fn new(capacity_hint: usize) -> Self {
        let mut this = Self {
            regions: Vec::new(),
            free: Vec::new(),
            generation: 0,
            capacity_hint,
        };
        this.grow();
        this
    }
    /// Reserve a new region. The first is sized by the hint, later ones by [`REGION_BUCKETS`].
    fn grow(&mut self) {
        let capacity = if self.regions.is_empty() {
            self.capacity_hint.max(1)
        } else {
            REGION_BUCKETS
        };
        log::debug!(
            "reserving point region #{} for {capacity} buckets",
            self.regions.len()
        );
        self.regions.push(Region::new(capacity));
    }
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }
    pub(crate) fn acquire(&mut self) -> BucketID {
        let id = if let Some(id) = self.free.pop() {
            id
        } else {
            self.carve()
        };
        match self.bucket_mut(id) {
            Some(bucket) => *bucket = Bucket::empty(),
            None => log::debug!("{id:?} issued but not found in pool"),
        }
        log::trace!("acquired {id:?}");
        id
    }
    fn carve(&mut self) -> BucketID {
        loop {
            // Only the newest region can have space left.
            if let Some(last) = self.regions.len().checked_sub(1) {
                if let (Ok(region), Some(index)) =
                    (u32::try_from(last), self.regions[last].carve())
                {
                    return BucketID { region, index };
                }
            }
            self.grow();
        }
    }
    pub(crate) fn release(&mut self, id: BucketID) {
        log::trace!("released {id:?}");
        self.free.push(id);
    }
    /// Release every bucket reachable from `head`. Returns how many were released.
    pub(crate) fn release_chain(&mut self, head: Option<BucketID>) -> usize {
        let mut cursor = head;
        let mut released = 0;
        while let Some(id) = cursor {
            cursor = self.bucket(id).and_then(Bucket::next);
            self.release(id);
            released += 1;
        }
        released
    }
    pub(crate) fn bucket(&self, id: BucketID) -> Option<&Bucket> {
        self.regions.get(id.region as usize)?.get(id.index)
    }
    pub(crate) fn bucket_mut(&mut self, id: BucketID) -> Option<&mut Bucket> {
        self.regions.get_mut(id.region as usize)?.get_mut(id.index)
    }
    pub(crate) fn link(&mut self, from: BucketID, to: BucketID) {
        if let Some(bucket) = self.bucket_mut(from) {
            bucket.next = Some(to);
        }
    }
    fn usage(&self) -> PoolUsage {
        PoolUsage {
            regions: self.regions.len(),
            capacity: self.regions.iter().map(Region::capacity).sum(),
            carved: self.regions.iter().map(Region::carved).sum(),
            free: self.free.len(),
            reserved_bytes: self
                .regions
                .iter()
                .map(Region::size_bytes)
                .fold(0, usize::saturating_add),
        }
    }
    fn destroy(&mut self) {
        self.regions = Vec::new();
        self.free = Vec::new();
        self.generation = self.generation.wrapping_add(1);
    }
}

/// Default number of buckets reserved up front.
pub const DEFAULT_CAPACITY_HINT: usize = 1024;

/// A shared handle to a pool of point buckets. Cloning the handle shares the pool.
///
/// Access is serialized by an internal lock, so the pool may be shared between threads,
/// though the engine itself only ever touches it from one. Readers (see [`crate::stroke::StrokeReader`])
/// hold a shared lock - mutating any stroke of the same pool while one is alive on the same thread deadlocks.
#[derive(Clone)]
pub struct PointPool {
    inner: std::sync::Arc<parking_lot::RwLock<PoolInner>>,
}
impl PointPool {
    /// Create a pool with room for at least `capacity_hint` buckets before growing.
    ///
    /// Terminates the process if that memory cannot be reserved.
    #[must_use]
    pub fn new(capacity_hint: usize) -> Self {
        log::debug!("creating point pool for {capacity_hint} buckets");
        Self {
            inner: std::sync::Arc::new(parking_lot::RwLock::new(PoolInner::new(capacity_hint))),
        }
    }
    /// Take a bucket with no points and no successor, growing the pool if none are free.
    #[must_use = "dropping the ID leaks the bucket until the pool is destroyed"]
    pub fn acquire_bucket(&self) -> BucketID {
        self.inner.write().acquire()
    }
    /// Return a bucket to the free list.
    ///
    /// Nothing may refer to the bucket afterwards. This is not checked.
    pub fn release_bucket(&self, id: BucketID) {
        self.inner.write().release(id);
    }
    /// Run `f` on a bucket. None if the ID is not part of this pool.
    pub fn with_bucket<R>(&self, id: BucketID, f: impl FnOnce(&Bucket) -> R) -> Option<R> {
        self.inner.read_recursive().bucket(id).map(f)
    }
    /// Run `f` on a bucket mutably. None if the ID is not part of this pool.
    pub fn with_bucket_mut<R>(&self, id: BucketID, f: impl FnOnce(&mut Bucket) -> R) -> Option<R> {
        self.inner.write().bucket_mut(id).map(f)
    }
    /// Free all backing memory, invalidating every bucket ever issued.
    ///
    /// Strokes drawing from this pool become empty. The pool stays usable and will
    /// reserve fresh memory on the next request.
    pub fn destroy(&self) {
        let mut lock = self.inner.write();
        let usage = lock.usage();
        lock.destroy();
        log::debug!(
            "destroyed point pool, released {} regions ({} bytes)",
            usage.regions,
            usage.reserved_bytes
        );
    }
    #[must_use]
    pub fn usage(&self) -> PoolUsage {
        self.inner.read_recursive().usage()
    }
    /// Do both handles refer to the same pool?
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::sync::Arc::ptr_eq(&self.inner, &other.inner)
    }
    pub(crate) fn read(&self) -> parking_lot::RwLockReadGuard<'_, PoolInner> {
        self.inner.read_recursive()
    }
    pub(crate) fn write(&self) -> parking_lot::RwLockWriteGuard<'_, PoolInner> {
        self.inner.write()
    }
}
impl Default for PointPool {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY_HINT)
    }
}
