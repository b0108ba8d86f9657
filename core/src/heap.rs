//! Fixed-capacity cell store
//!
//! Every cell lives in one slot of a backing array allocated up front.
//! Free slots are chained into a singly-linked free list through their
//! `Cell::Free { next }` payload; allocation pops the head. The store never
//! grows: when the list is empty the caller must collect or give up.

use crate::error::{Error, Result};
use crate::language::{Cell, CellRef, Value};

/// A single heap slot.
pub(crate) struct Slot {
    pub(crate) cell: Cell,
    pub(crate) generation: u32,
    pub(crate) reached: bool,
}

pub struct Heap {
    slots: Vec<Slot>,
    free: Option<u32>,
    free_count: usize,
}

impl Heap {
    /// Create a heap of `capacity` cells, all of them on the free list.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.min(u32::MAX as usize);
        let slots = (0..capacity)
            .map(|i| Slot {
                cell: Cell::Free {
                    next: (i + 1 < capacity).then(|| i as u32 + 1),
                },
                generation: 0,
                reached: false,
            })
            .collect();

        Heap {
            slots,
            free: (capacity > 0).then_some(0),
            free_count: capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of cells on the free list.
    pub fn free_count(&self) -> usize {
        self.free_count
    }

    /// Number of cells not on the free list.
    pub fn live_count(&self) -> usize {
        self.slots.len() - self.free_count
    }

    pub fn is_exhausted(&self) -> bool {
        self.free.is_none()
    }

    /// Pop the head of the free list and store `cell` in it.
    ///
    /// Fails with `HeapExhausted` when the free list is empty; collection is
    /// the runtime's job, not the store's.
    pub fn allocate(&mut self, cell: Cell) -> Result<Value> {
        let Some(index) = self.free else {
            return Err(Error::heap_exhausted(self.capacity()));
        };

        let slot = &mut self.slots[index as usize];
        self.free = match slot.cell {
            Cell::Free { next } => next,
            // Only free cells are ever chained
            _ => None,
        };
        slot.cell = cell;
        slot.reached = false;
        self.free_count -= 1;

        Ok(Value::Cell(CellRef::new(index, slot.generation)))
    }

    /// Read the cell behind a handle.
    #[inline]
    pub fn get(&self, r: CellRef) -> Result<Cell> {
        match self.slots.get(r.index()) {
            Some(slot) if slot.generation == r.generation() && !slot.cell.is_free() => {
                Ok(slot.cell)
            }
            _ => Err(Error::dangling(r.index())),
        }
    }

    /// Overwrite the cell behind a live handle.
    pub fn set(&mut self, r: CellRef, cell: Cell) -> Result<()> {
        match self.slots.get_mut(r.index()) {
            Some(slot) if slot.generation == r.generation() && !slot.cell.is_free() => {
                slot.cell = cell;
                Ok(())
            }
            _ => Err(Error::dangling(r.index())),
        }
    }

    // === Collector access ===

    /// Slot behind a live handle, for marking.
    pub(crate) fn slot_mut(&mut self, r: CellRef) -> Option<&mut Slot> {
        self.slots
            .get_mut(r.index())
            .filter(|slot| slot.generation == r.generation() && !slot.cell.is_free())
    }

    pub(crate) fn slots_mut(&mut self) -> &mut [Slot] {
        &mut self.slots
    }

    /// Install a free list rebuilt by the sweeper.
    pub(crate) fn reset_free_list(&mut self, head: Option<u32>, count: usize) {
        self.free = head;
        self.free_count = count;
    }

    /// Walk the free list. Used to check the partition invariant.
    pub fn free_list_len(&self) -> usize {
        let mut count = 0;
        let mut current = self.free;
        while let Some(index) = current {
            count += 1;
            current = match self.slots[index as usize].cell {
                Cell::Free { next } => next,
                _ => None,
            };
        }
        count
    }
}
