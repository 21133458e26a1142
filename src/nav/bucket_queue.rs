//! Minimal bucket priority queue for the pathfinder
//!
//! Entries with equal priority dequeue FIFO, so searches are deterministic
//! given identical insertion order.

use std::collections::{BTreeMap, VecDeque};

#[derive(Debug, Clone)]
pub struct PriorityBucketQueue<T> {
    buckets: BTreeMap<u32, VecDeque<T>>,
    len: usize,
}

impl<T> PriorityBucketQueue<T> {
    pub fn new() -> Self {
        Self {
            buckets: BTreeMap::new(),
            len: 0,
        }
    }

    pub fn push(&mut self, priority: u32, item: T) {
        self.buckets.entry(priority).or_default().push_back(item);
        self.len += 1;
    }

    /// Remove the oldest entry of the lowest priority bucket
    pub fn pop(&mut self) -> Option<(u32, T)> {
        let priority = *self.buckets.keys().next()?;
        let bucket = self.buckets.get_mut(&priority)?;
        let item = bucket.pop_front()?;
        if bucket.is_empty() {
            self.buckets.remove(&priority);
        }
        self.len -= 1;
        Some((priority, item))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T> Default for PriorityBucketQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_lowest_priority_first() {
        let mut queue = PriorityBucketQueue::new();
        queue.push(5, "b");
        queue.push(1, "a");
        queue.push(9, "c");
        assert_eq!(queue.pop(), Some((1, "a")));
        assert_eq!(queue.pop(), Some((5, "b")));
        assert_eq!(queue.pop(), Some((9, "c")));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_fifo_within_bucket() {
        let mut queue = PriorityBucketQueue::new();
        queue.push(3, 'x');
        queue.push(3, 'y');
        queue.push(3, 'z');
        assert_eq!(queue.pop(), Some((3, 'x')));
        assert_eq!(queue.pop(), Some((3, 'y')));
        assert_eq!(queue.pop(), Some((3, 'z')));
    }

    #[test]
    fn test_len_tracks_push_pop() {
        let mut queue = PriorityBucketQueue::new();
        assert!(queue.is_empty());
        queue.push(0, ());
        queue.push(0, ());
        assert_eq!(queue.len(), 2);
        queue.pop();
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_interleaved_push_pop() {
        let mut queue = PriorityBucketQueue::new();
        queue.push(2, 1);
        queue.push(1, 2);
        assert_eq!(queue.pop(), Some((1, 2)));
        queue.push(1, 3);
        assert_eq!(queue.pop(), Some((1, 3)));
        assert_eq!(queue.pop(), Some((2, 1)));
    }
}
