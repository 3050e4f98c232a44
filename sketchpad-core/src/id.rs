//! # IDs
//! Strokes need an identity that survives being shuffled around the active list and
//! being cloned into the undo history. This is implemented in this module via the `SketchID<T>` type,
//! which generates process-unique IDs namespaced by the type T.
//!
//! To get a fresh ID, use `SketchID<YourNamespaceTy>`'s `Default` impl.

// Next available ID, per namespace.
static ID_SERVER: parking_lot::RwLock<
    std::collections::BTreeMap<std::any::TypeId, std::sync::atomic::AtomicU64>,
> = parking_lot::const_rwlock(std::collections::BTreeMap::new());

/// ID that is guaranteed unique within this execution of the program.
/// IDs with different types may share a value but should not be considered equal.
pub struct SketchID<T: std::any::Any> {
    id: std::num::NonZeroU64,
    _phantom: std::marker::PhantomData<T>,
}
impl<T: std::any::Any> Clone for SketchID<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T: std::any::Any> Copy for SketchID<T> {}
impl<T: std::any::Any> PartialEq for SketchID<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl<T: std::any::Any> Eq for SketchID<T> {}
impl<T: std::any::Any> std::hash::Hash for SketchID<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
// Safety - only a u64 is stored, the marker must not leak T's auto traits.
unsafe impl<T: std::any::Any> Send for SketchID<T> {}
unsafe impl<T: std::any::Any> Sync for SketchID<T> {}

impl<T: std::any::Any> SketchID<T> {
    /// Get the raw numeric value of this ID.
    /// IDs from differing namespaces may share the same numeric ID!
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id.get()
    }
    fn next() -> Self {
        let ty = std::any::TypeId::of::<T>();
        let read = ID_SERVER.upgradable_read();
        let raw = if let Some(counter) = read.get(&ty) {
            counter.fetch_add(1, std::sync::atomic::Ordering::Relaxed)
        } else {
            // First ID of this namespace. Rare, take the exclusive path.
            let mut write = parking_lot::RwLockUpgradableReadGuard::upgrade(read);
            write.insert(ty, 2.into());
            1
        };
        let Some(id) = std::num::NonZeroU64::new(raw) else {
            // Wrapped around after u64::MAX ids.
            #[cfg(not(test))]
            {
                log::error!("{} ID overflow! Aborting!", std::any::type_name::<T>());
                log::logger().flush();
                std::process::abort();
            }
            #[cfg(test)]
            {
                panic!("{} ID overflow! Aborting!", std::any::type_name::<T>())
            }
        };
        Self {
            id,
            _phantom: std::marker::PhantomData,
        }
    }
}
impl<T: std::any::Any> Default for SketchID<T> {
    fn default() -> Self {
        Self::next()
    }
}
impl<T: std::any::Any> std::fmt::Display for SketchID<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = std::any::type_name::<T>();
        // rsplit always yields at least one element.
        let short = name.rsplit("::").next().unwrap_or(name);
        write!(f, "{short}#{}", self.id)
    }
}
impl<T: std::any::Any> std::fmt::Debug for SketchID<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <Self as std::fmt::Display>::fmt(self, f)
    }
}

#[cfg(test)]
mod test {
    use super::SketchID;
    // Tests share the global ID server, so each uses its own namespace.

    #[test]
    fn first_id() {
        struct Namespace;
        type TestID = SketchID<Namespace>;

        let id = TestID::default();
        // Not a stable guarantee! Dont rely on this outside of tests.
        assert_eq!(id.id(), 1);
        assert_eq!(TestID::default().id(), 2);
    }
    #[test]
    fn ids_unique() {
        struct Namespace;
        type TestID = SketchID<Namespace>;

        let mut v: Vec<_> = (0..1024).map(|_| TestID::default()).collect();
        v.sort_unstable_by_key(SketchID::id);
        let length_before = v.len();
        v.dedup();
        assert_eq!(length_before, v.len(), "had duplicate ids");
    }
    #[test]
    fn display_names_namespace() {
        struct Marker;
        let id = SketchID::<Marker>::default();
        assert_eq!(format!("{id}"), format!("Marker#{}", id.id()));
    }
}
