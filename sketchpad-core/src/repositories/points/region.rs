use super::Bucket;

/// A contiguous run of buckets on the heap, carved out front-to-back.
///
/// The backing storage is reserved in full on creation and never reallocated,
/// so carving never moves previously carved buckets.
pub struct Region {
    /// Carved buckets. `buckets.len()` is the bump position.
    buckets: Vec<Bucket>,
    /// Number of buckets this region may ever hold.
    capacity: usize,
}

impl Region {
    /// Reserve a region able to hold `capacity` buckets (at least one).
    ///
    /// `Self::try_new`, except terminates on allocation failure.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        match Self::try_new(capacity) {
            Some(region) => region,
            None => {
                log::error!(
                    "failed to reserve {} bytes of point storage",
                    Self::size_bytes_for(capacity)
                );
                log::logger().flush();
                std::alloc::handle_alloc_error(Self::layout(capacity))
            }
        }
    }
    /// Reserve a region able to hold `capacity` buckets (at least one).
    ///
    /// Returns None if the allocation failed. To fail on this condition,
    /// prefer [`std::alloc::handle_alloc_error`] over a panic.
    #[must_use]
    pub fn try_new(capacity: usize) -> Option<Self> {
        let capacity = capacity.max(1);
        let mut buckets = Vec::new();
        buckets.try_reserve_exact(capacity).ok()?;
        Some(Self { buckets, capacity })
    }
    fn layout(capacity: usize) -> std::alloc::Layout {
        std::alloc::Layout::array::<Bucket>(capacity.max(1))
            .unwrap_or_else(|_| std::alloc::Layout::new::<Bucket>())
    }
    const fn size_bytes_for(capacity: usize) -> usize {
        std::mem::size_of::<Bucket>().saturating_mul(capacity)
    }
    /// Take the next never-used bucket, returning its index in this region.
    /// None if the region is exhausted.
    pub fn carve(&mut self) -> Option<u32> {
        if self.remaining() == 0 {
            return None;
        }
        let index = u32::try_from(self.buckets.len()).ok()?;
        // Within the reservation, this never reallocates.
        self.buckets.push(Bucket::empty());
        Some(index)
    }
    #[must_use]
    pub fn get(&self, index: u32) -> Option<&Bucket> {
        self.buckets.get(usize::try_from(index).ok()?)
    }
    #[must_use]
    pub fn get_mut(&mut self, index: u32) -> Option<&mut Bucket> {
        self.buckets.get_mut(usize::try_from(index).ok()?)
    }
    /// Number of buckets ever carved from this region.
    #[must_use]
    pub fn carved(&self) -> usize {
        self.buckets.len()
    }
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.buckets.len())
    }
    /// Get the reserved heap size in bytes.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        Self::size_bytes_for(self.capacity)
    }
}

#[cfg(test)]
mod test {
    use super::Region;
    #[test]
    fn carve_until_exhausted() {
        let mut region = Region::new(3);
        assert_eq!(region.carve(), Some(0));
        assert_eq!(region.carve(), Some(1));
        assert_eq!(region.carve(), Some(2));
        assert_eq!(region.carve(), None);
        assert_eq!(region.carved(), 3);
        assert_eq!(region.remaining(), 0);
    }
    #[test]
    fn zero_capacity_holds_one() {
        let mut region = Region::new(0);
        assert_eq!(region.capacity(), 1);
        assert!(region.carve().is_some());
        assert!(region.carve().is_none());
    }
    #[test]
    fn carving_does_not_move_buckets() {
        let mut region = Region::new(8);
        let first = region.carve().unwrap();
        let before: *const _ = region.get(first).unwrap();
        for _ in 0..7 {
            region.carve().unwrap();
        }
        let after: *const _ = region.get(first).unwrap();
        assert_eq!(before, after);
    }
}
