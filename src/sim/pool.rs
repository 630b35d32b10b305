//! Homogeneous entity pools
//!
//! A pool is a slot arena: removed slots go on a free list and are reused by
//! later inserts, so steady-state spawning does not reallocate. Iteration
//! walks slots in index order and removal never moves a survivor, so the
//! relative order of surviving members is stable.

use serde::{Deserialize, Serialize};

use super::rect::Aabb;

/// Capability set shared by every pooled entity kind
pub trait Entity {
    /// Current bounding box
    fn bounds(&self) -> Aabb;
    /// Advance one frame; `base_speed` is the current scroll speed
    fn advance(&mut self, base_speed: f32);
    /// Off-screen, dead, or out of lifetime
    fn is_expired(&self, view: &Aabb) -> bool;
}

/// Slot arena with free-list reuse
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pool<T> {
    slots: Vec<Option<T>>,
    free: Vec<usize>,
    live: usize,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Pool<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Number of live members
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Insert a member, reusing a free slot when one exists. Returns the slot.
    pub fn insert(&mut self, value: T) -> usize {
        self.live += 1;
        if let Some(slot) = self.free.pop() {
            self.slots[slot] = Some(value);
            slot
        } else {
            self.slots.push(Some(value));
            self.slots.len() - 1
        }
    }

    pub fn get(&self, slot: usize) -> Option<&T> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut T> {
        self.slots.get_mut(slot).and_then(Option::as_mut)
    }

    /// Remove the member in `slot`, if any
    pub fn remove(&mut self, slot: usize) -> Option<T> {
        let value = self.slots.get_mut(slot)?.take()?;
        self.free.push(slot);
        self.live -= 1;
        Some(value)
    }

    /// Live members in slot order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut().filter_map(Option::as_mut)
    }

    /// Live members with their slot indices
    pub fn iter_slots(&self) -> impl Iterator<Item = (usize, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|v| (i, v)))
    }

    /// Remove every member for which `keep` is false. Returns the number removed.
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) -> usize {
        let mut removed = 0;
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.as_ref().is_some_and(|v| !keep(v)) {
                *slot = None;
                self.free.push(i);
                removed += 1;
            }
        }
        self.live -= removed;
        removed
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.live = 0;
    }
}

impl<T: Entity> Pool<T> {
    /// Advance every live member by one frame
    pub fn advance_all(&mut self, base_speed: f32) {
        for entity in self.iter_mut() {
            entity.advance(base_speed);
        }
    }

    /// Drop every expired member. Returns the number removed.
    pub fn prune_expired(&mut self, view: &Aabb) -> usize {
        self.retain(|e| !e.is_expired(view))
    }
}
