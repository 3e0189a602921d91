//! Generic ordered bounded table (§4.1 C2).
//!
//! An `OrderedTable<T>` is insertion-ordered, bounded by `max_len`, and
//! supports predicate-based lookup plus an O(1) move-to-tail so the least
//! recently touched row sits at the head, ready for LRU eviction. It is
//! intrusive in spirit only: rows are plain owned values, not linked nodes,
//! which is enough once the host no longer has to manage its own allocator.
//!
//! Both the RREQ origin table (§4.4) and the per-entry `seen_ids` FIFO
//! (§4.5) are instances of this same container, mirroring the reference
//! implementation's single `struct tbl` used for both roles.

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct OrderedTable<T> {
    head: VecDeque<T>,
    max_len: usize,
}

impl<T> OrderedTable<T> {
    pub fn new(max_len: usize) -> Self {
        Self { head: VecDeque::new(), max_len }
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn set_max_len(&mut self, max_len: usize) {
        self.max_len = max_len;
    }

    pub fn len(&self) -> usize {
        self.head.len()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_empty()
    }

    pub fn full(&self) -> bool {
        self.head.len() >= self.max_len
    }

    pub fn first(&self) -> Option<&T> {
        self.head.front()
    }

    pub fn add_tail(&mut self, value: T) {
        self.head.push_back(value);
    }

    /// Removes and returns the first row matching `pred`.
    pub fn find_detach<P>(&mut self, mut pred: P) -> Option<T>
    where
        P: FnMut(&T) -> bool,
    {
        let idx = self.head.iter().position(|row| pred(row))?;
        self.head.remove(idx)
    }

    /// Returns a reference to the first row matching `pred`, without
    /// removing it.
    pub fn find<P>(&self, mut pred: P) -> Option<&T>
    where
        P: FnMut(&T) -> bool,
    {
        self.head.iter().find(|row| pred(row))
    }

    /// Removes and returns the head (oldest / least-recently-touched) row.
    pub fn del_first(&mut self) -> Option<T> {
        self.head.pop_front()
    }

    /// Drops every row matching `pred` (or every row, if `pred` is `None`).
    pub fn flush<P>(&mut self, pred: Option<P>)
    where
        P: FnMut(&T) -> bool,
    {
        match pred {
            None => self.head.clear(),
            Some(mut pred) => self.head.retain(|row| !pred(row)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.head.iter()
    }
}
