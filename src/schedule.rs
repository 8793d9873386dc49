use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

struct Entry<T> {
    due: f64,
    seq: u64,
    task: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due
            .total_cmp(&other.due)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Tasks keyed by a wall-clock due time in milliseconds. Tasks due at the
/// same instant come out in insertion order.
pub struct TaskQueue<T> {
    heap: BinaryHeap<Reverse<Entry<T>>>,
    next_seq: u64,
}

impl<T> Default for TaskQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TaskQueue<T> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    pub fn push(&mut self, due_ms: f64, task: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Entry {
            due: due_ms,
            seq,
            task,
        }));
    }

    /// Removes and returns the earliest task if it is due at `now_ms`.
    pub fn pop_due(&mut self, now_ms: f64) -> Option<T> {
        if self.heap.peek()?.0.due > now_ms {
            return None;
        }
        self.heap.pop().map(|Reverse(entry)| entry.task)
    }

    /// Every task due at `now_ms`, earliest first.
    pub fn drain_due(&mut self, now_ms: f64) -> Vec<T> {
        let mut due = Vec::new();
        while let Some(task) = self.pop_due(now_ms) {
            due.push(task);
        }
        due
    }

    pub fn next_due(&self) -> Option<f64> {
        self.heap.peek().map(|entry| entry.0.due)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tasks_wait_until_due() {
        let mut queue = TaskQueue::new();
        queue.push(300.0, "late");
        queue.push(100.0, "early");

        assert!(queue.drain_due(50.0).is_empty());
        assert_eq!(queue.drain_due(100.0), vec!["early"]);
        assert_eq!(queue.next_due(), Some(300.0));
        assert_eq!(queue.drain_due(1000.0), vec!["late"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn ties_keep_insertion_order() {
        let mut queue = TaskQueue::new();
        for i in 0..5 {
            queue.push(200.0, i);
        }
        queue.push(100.0, 99);
        assert_eq!(queue.drain_due(200.0), vec![99, 0, 1, 2, 3, 4]);
    }
}
