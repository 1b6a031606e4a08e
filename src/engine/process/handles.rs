//! Iteration handles.

use std::collections::{HashMap, VecDeque};

/// One space of iteration handles. Ids start at 1 and never repeat within a
/// process, so 0 is free to act as the failure sentinel. A drained handle
/// stays open: popping it again is not a fault, it just keeps yielding
/// nothing.
#[derive(Debug)]
pub(crate) struct HandleTable {
    next_id: i64,
    queues: HashMap<i64, VecDeque<String>>,
}

impl HandleTable {
    pub(crate) fn new() -> HandleTable {
        HandleTable {
            next_id: 1,
            queues: HashMap::new(),
        }
    }

    /// Opens a handle over `items`; the returned id is never 0.
    pub(crate) fn open(&mut self, items: Vec<String>) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        self.queues.insert(id, items.into());
        id
    }

    /// Pops the next item. `None` means the handle was never issued;
    /// `Some(None)` means it is drained.
    pub(crate) fn pop(&mut self, id: i64) -> Option<Option<String>> {
        self.queues.get_mut(&id).map(VecDeque::pop_front)
    }
}
