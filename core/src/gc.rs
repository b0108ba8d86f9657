//! Mark-and-sweep collector
//!
//! Marking starts from the roots handed in by the runtime. Sweeping rebuilds
//! the free list from every unreached slot and clears the reached flags, so
//! flags never survive a cycle. Collection is stop-the-world: it runs inline
//! from allocation and nothing allocates while it runs.

use log::debug;

use crate::heap::Heap;
use crate::language::{Cell, Value};

/// Run one full cycle. Returns the number of cells that were in use and are
/// now back on the free list.
pub fn collect(heap: &mut Heap, roots: impl IntoIterator<Item = Value>) -> usize {
    for root in roots {
        mark(heap, root);
    }
    let reclaimed = sweep(heap);
    debug!(
        "gc: reclaimed {} cells, {} live of {}",
        reclaimed,
        heap.live_count(),
        heap.capacity()
    );
    reclaimed
}

/// Mark everything reachable from `value`.
///
/// Recurses into `first` and loops along `rest`, so long proper lists cost
/// no stack. Each cell is flagged before its children are visited and an
/// already-flagged cell stops the walk, which also terminates on cycles.
fn mark(heap: &mut Heap, mut value: Value) {
    while let Value::Cell(r) = value {
        let Some(slot) = heap.slot_mut(r) else {
            return;
        };
        if slot.reached {
            return;
        }
        slot.reached = true;
        let cell = slot.cell;

        match cell {
            Cell::Pair { first, rest } | Cell::Lambda { first, rest } => {
                mark(heap, first);
                value = rest;
            }
            _ => return,
        }
    }
}

fn sweep(heap: &mut Heap) -> usize {
    let mut reclaimed = 0;
    let mut head = None;
    let mut free = 0;

    // Walk backwards so the rebuilt list hands out low indices first
    for (index, slot) in heap.slots_mut().iter_mut().enumerate().rev() {
        if slot.reached {
            slot.reached = false;
            continue;
        }
        if !slot.cell.is_free() {
            reclaimed += 1;
            slot.generation = slot.generation.wrapping_add(1);
        }
        slot.cell = Cell::Free { next: head };
        head = Some(index as u32);
        free += 1;
    }

    heap.reset_free_list(head, free);
    reclaimed
}
