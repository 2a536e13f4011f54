//! Typed generational arena.
//!
//! Backing store for the selector AST and the element tree. Values are
//! addressed by [`Idx<T>`], a generational index that is typed by the value it
//! points at, so an id from one arena can never be confused with an id of a
//! different node kind. Removing a value bumps the slot generation, which makes
//! every outstanding id for that slot dangle safely (`get` returns `None`).

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Generational index into an [`Arena<T>`].
pub struct Idx<T> {
    index: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Idx<T> {
    fn new(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            _marker: PhantomData,
        }
    }

    /// Slot number, stable for the lifetime of the value.
    pub fn slot(self) -> u32 {
        self.index
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

// Manual impls: deriving would put bounds on `T`.
impl<T> Clone for Idx<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Idx<T> {}

impl<T> PartialEq for Idx<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for Idx<T> {}

impl<T> Hash for Idx<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> fmt::Debug for Idx<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Idx({}v{})", self.index, self.generation)
    }
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
    next_free: Option<u32>,
}

pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    free_head: Option<u32>,
    len: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Arena<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            len: 0,
        }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            slots: Vec::with_capacity(cap),
            free_head: None,
            len: 0,
        }
    }

    /// Store `value`, reusing the most recently freed slot if there is one.
    pub fn alloc(&mut self, value: T) -> Idx<T> {
        self.len += 1;
        match self.free_head {
            Some(i) => {
                let slot = &mut self.slots[i as usize];
                self.free_head = slot.next_free.take();
                slot.value = Some(value);
                Idx::new(i, slot.generation)
            }
            None => {
                let i = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    value: Some(value),
                    next_free: None,
                });
                Idx::new(i, 0)
            }
        }
    }

    pub fn get(&self, id: Idx<T>) -> Option<&T> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.value.as_ref()
    }

    pub fn get_mut(&mut self, id: Idx<T>) -> Option<&mut T> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.value.as_mut()
    }

    /// Take the value out of the arena. Outstanding ids for it go stale.
    pub fn remove(&mut self, id: Idx<T>) -> Option<T> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        slot.next_free = self.free_head;
        self.free_head = Some(id.index);
        self.len -= 1;
        Some(value)
    }

    pub fn contains(&self, id: Idx<T>) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Live values in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Idx<T>, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.value
                .as_ref()
                .map(|value| (Idx::new(i as u32, slot.generation), value))
        })
    }
}

impl<T> std::ops::Index<Idx<T>> for Arena<T> {
    type Output = T;

    /// Panics on a stale id; callers holding ids they allocated themselves
    /// from an append-only arena use this for direct access.
    fn index(&self, id: Idx<T>) -> &T {
        match self.get(id) {
            Some(value) => value,
            None => panic!("stale arena index {id:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_and_get() {
        let mut arena = Arena::new();
        let id = arena.alloc("div");
        assert_eq!(arena.get(id), Some(&"div"));
        assert_eq!(arena[id], "div");
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn removed_id_goes_stale() {
        let mut arena = Arena::new();
        let old = arena.alloc(10);
        assert_eq!(arena.remove(old), Some(10));
        let new = arena.alloc(20);
        assert_eq!(old.slot(), new.slot());
        assert_ne!(old.generation(), new.generation());
        assert_eq!(arena.get(old), None);
        assert_eq!(arena.get(new), Some(&20));
        assert!(!arena.contains(old));
    }

    #[test]
    fn double_remove_is_none() {
        let mut arena = Arena::new();
        let id = arena.alloc(1);
        assert_eq!(arena.remove(id), Some(1));
        assert_eq!(arena.remove(id), None);
        assert!(arena.is_empty());
    }

    #[test]
    fn free_slots_reused_lifo() {
        let mut arena = Arena::new();
        let a = arena.alloc('a');
        let b = arena.alloc('b');
        let _c = arena.alloc('c');
        arena.remove(b);
        arena.remove(a);
        assert_eq!(arena.alloc('d').slot(), a.slot());
        assert_eq!(arena.alloc('e').slot(), b.slot());
        assert_eq!(arena.len(), 3);
    }

    #[test]
    fn iter_skips_holes() {
        let mut arena = Arena::new();
        arena.alloc(1);
        let hole = arena.alloc(2);
        arena.alloc(3);
        arena.remove(hole);
        let values: Vec<i32> = arena.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![1, 3]);
    }

    #[test]
    fn get_mut_updates_in_place() {
        let mut arena = Arena::new();
        let id = arena.alloc(vec!["a"]);
        if let Some(v) = arena.get_mut(id) {
            v.push("b");
        }
        assert_eq!(arena[id], vec!["a", "b"]);
    }

    #[test]
    fn out_of_range_id() {
        let mut other = Arena::new();
        for i in 0..5 {
            other.alloc(i);
        }
        let far = other.alloc(99);
        let arena: Arena<i32> = Arena::new();
        assert_eq!(arena.get(far), None);
    }

    #[test]
    #[should_panic(expected = "stale arena index")]
    fn index_panics_on_stale_id() {
        let mut arena = Arena::new();
        let id = arena.alloc(1);
        arena.remove(id);
        let _ = arena[id];
    }
}
