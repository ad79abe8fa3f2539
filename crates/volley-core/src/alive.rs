use std::fmt::{self, Display};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::AliveError;

static NEXT_LIST_ID: AtomicU64 = AtomicU64::new(1);

/// A single-use ticket for one appended entry. Only the list that issued
/// it will accept it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handle {
    slot: usize,
    generation: u64,
    list_id: u64,
}

#[derive(Debug)]
enum SlotState<T> {
    Vacant { next_free: Option<usize> },
    Occupied { value: T, prev: Option<usize>, next: Option<usize> },
}

#[derive(Debug)]
struct Slot<T> {
    generation: u64,
    state: SlotState<T>,
}

/// The set of in-flight requests: a slot arena threaded with a doubly
/// linked occupancy order and a free list, so `append` and `remove` are
/// O(1) and removal never touches other entries.
///
/// Slots are recycled under a bumped generation, which is how a handle
/// that was already spent is told apart from a live one.
#[derive(Debug)]
pub struct AliveList<T> {
    slots: Vec<Slot<T>>,
    free: Option<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
    list_id: u64,
}

impl<T> Default for AliveList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> AliveList<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: None,
            head: None,
            tail: None,
            len: 0,
            list_id: NEXT_LIST_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Appends `value` at the tail and returns the handle that removes it.
    pub fn append(&mut self, value: T) -> Handle {
        let slot = match self.free {
            Some(slot) => {
                self.free = match self.slots[slot].state {
                    SlotState::Vacant { next_free } => next_free,
                    SlotState::Occupied { .. } => None,
                };
                slot
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    state: SlotState::Vacant { next_free: None },
                });
                self.slots.len() - 1
            }
        };

        self.slots[slot].state = SlotState::Occupied {
            value,
            prev: self.tail,
            next: None,
        };
        match self.tail {
            Some(tail) => self.set_next(tail, Some(slot)),
            None => self.head = Some(slot),
        }
        self.tail = Some(slot);
        self.len += 1;

        Handle {
            slot,
            generation: self.slots[slot].generation,
            list_id: self.list_id,
        }
    }

    /// Unlinks the handle's entry and returns its value. The handle must
    /// come from this list and must not have been removed before.
    pub fn remove(&mut self, handle: Handle) -> Result<T, AliveError> {
        if handle.list_id != self.list_id {
            return Err(AliveError::ForeignHandle);
        }

        let next_free = self.free;
        let slot = self
            .slots
            .get_mut(handle.slot)
            .filter(|slot| slot.generation == handle.generation)
            .ok_or(AliveError::StaleHandle)?;

        let replaced = std::mem::replace(&mut slot.state, SlotState::Vacant { next_free });
        let (value, prev, next) = match replaced {
            SlotState::Occupied { value, prev, next } => (value, prev, next),
            vacant => {
                slot.state = vacant;
                return Err(AliveError::StaleHandle);
            }
        };
        slot.generation += 1;

        self.free = Some(handle.slot);
        match prev {
            Some(prev) => self.set_next(prev, next),
            None => self.head = next,
        }
        match next {
            Some(next) => self.set_prev(next, prev),
            None => self.tail = prev,
        }
        self.len -= 1;

        Ok(value)
    }

    /// Visits live entries in insertion order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    fn set_next(&mut self, slot: usize, value: Option<usize>) {
        if let SlotState::Occupied { next, .. } = &mut self.slots[slot].state {
            *next = value;
        }
    }

    fn set_prev(&mut self, slot: usize, value: Option<usize>) {
        if let SlotState::Occupied { prev, .. } = &mut self.slots[slot].state {
            *prev = value;
        }
    }
}

impl<T: Display> AliveList<T> {
    /// Renders up to `limit` entries, eliding the middle of longer lists:
    /// `[ 1, 2 ... 8, 9, 10 ]`.
    pub fn preview(&self, limit: usize) -> String {
        if self.len == 0 {
            return "[]".to_string();
        }

        let values: Vec<String> = self.iter().map(|value| value.to_string()).collect();
        if self.len <= limit {
            return format!("[ {} ]", values.join(", "));
        }

        let heads = limit / 2;
        let tails = limit - heads;
        format!(
            "[ {} ... {} ]",
            values[..heads].join(", "),
            values[self.len - tails..].join(", ")
        )
    }
}

impl<T: Display> Display for AliveList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.preview(5))
    }
}

pub struct Iter<'a, T> {
    list: &'a AliveList<T>,
    cursor: Option<usize>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.cursor?;
        match &self.list.slots[slot].state {
            SlotState::Occupied { value, next, .. } => {
                self.cursor = *next;
                Some(value)
            }
            SlotState::Vacant { .. } => None,
        }
    }
}
