//! # Active strokes
//!
//! The ordered set of visible strokes, oldest first. Order is both draw order (back-to-front) and the
//! order strokes were begun or restored in. Removing a stroke shifts every later stroke down by one.
//!
//! Removed strokes are not dropped. Their slots are cleared and kept past the end of the active range,
//! and [`StrokeList::begin`] reinitializes one of them instead of creating a fresh stroke.

use crate::{
    repositories::points::PointPool,
    stroke::{Stroke, StrokeID, StrokeStyle},
};

/// Default maximum number of active strokes.
pub const DEFAULT_MAX_STROKES: usize = 1024;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("active stroke list is full ({capacity} strokes)")]
pub struct CapacityError {
    pub capacity: usize,
}

struct Slot {
    id: StrokeID,
    stroke: Stroke,
}

pub struct StrokeList {
    /// `slots[..active]` are visible. The rest are cleared spares.
    slots: Vec<Slot>,
    active: usize,
    capacity: usize,
}
impl Default for StrokeList {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_STROKES)
    }
}
impl StrokeList {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            active: 0,
            capacity,
        }
    }
    /// Number of active strokes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.active
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active == 0
    }
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.active >= self.capacity
    }
    /// Number of cleared strokes kept for reuse.
    #[must_use]
    pub fn spares(&self) -> usize {
        self.slots.len() - self.active
    }
    /// Start a new, empty stroke at the end of the list.
    pub fn begin(&mut self, pool: &PointPool, style: StrokeStyle) -> Result<StrokeID, CapacityError> {
        if self.is_full() {
            return Err(CapacityError {
                capacity: self.capacity,
            });
        }
        let id = StrokeID::default();
        match self.slots.get_mut(self.active) {
            Some(slot) => {
                if slot.stroke.pool().is_some_and(|bound| bound.ptr_eq(pool)) {
                    slot.stroke.reinit(style);
                } else {
                    slot.stroke = Stroke::new(pool, style);
                }
                slot.id = id;
            }
            None => self.slots.push(Slot {
                id,
                stroke: Stroke::new(pool, style),
            }),
        }
        self.active += 1;
        Ok(id)
    }
    /// Append an existing stroke under the given id, replacing a spare if there is one.
    pub fn restore(&mut self, id: StrokeID, stroke: Stroke) -> Result<(), CapacityError> {
        if self.is_full() {
            return Err(CapacityError {
                capacity: self.capacity,
            });
        }
        let slot = Slot { id, stroke };
        match self.slots.get_mut(self.active) {
            Some(spare) => *spare = slot,
            None => self.slots.push(slot),
        }
        self.active += 1;
        Ok(())
    }
    /// Clear and remove the stroke at `index`, shifting later strokes down by one.
    /// Returns the removed stroke's id, None if out of range.
    pub fn remove_at(&mut self, index: usize) -> Option<StrokeID> {
        if index >= self.active {
            return None;
        }
        let slot = &mut self.slots[index];
        let id = slot.id;
        slot.stroke.clear();
        // Send the cleared slot to the front of the spares.
        self.slots[index..self.active].rotate_left(1);
        self.active -= 1;
        Some(id)
    }
    /// Clear and remove a stroke by id. Returns false if it is not active.
    pub fn remove(&mut self, id: StrokeID) -> bool {
        self.position(id)
            .and_then(|index| self.remove_at(index))
            .is_some()
    }
    /// Index of an active stroke, oldest first.
    #[must_use]
    pub fn position(&self, id: StrokeID) -> Option<usize> {
        self.slots[..self.active]
            .iter()
            .position(|slot| slot.id == id)
    }
    #[must_use]
    pub fn get(&self, id: StrokeID) -> Option<&Stroke> {
        let index = self.position(id)?;
        Some(&self.slots[index].stroke)
    }
    #[must_use]
    pub fn get_mut(&mut self, id: StrokeID) -> Option<&mut Stroke> {
        let index = self.position(id)?;
        Some(&mut self.slots[index].stroke)
    }
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<(StrokeID, &Stroke)> {
        self.slots[..self.active]
            .get(index)
            .map(|slot| (slot.id, &slot.stroke))
    }
    /// The most recent stroke.
    #[must_use]
    pub fn last(&self) -> Option<(StrokeID, &Stroke)> {
        self.active.checked_sub(1).and_then(|index| self.get_index(index))
    }
    /// Active strokes, back to front.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (StrokeID, &Stroke)> + '_ {
        self.slots[..self.active]
            .iter()
            .map(|slot| (slot.id, &slot.stroke))
    }
    /// Clear every active stroke, keeping them all as spares.
    pub fn clear(&mut self) {
        for slot in &mut self.slots[..self.active] {
            slot.stroke.clear();
        }
        self.active = 0;
    }
    /// Drop every spare stroke.
    pub fn drop_spares(&mut self) {
        self.slots.truncate(self.active);
    }
}
