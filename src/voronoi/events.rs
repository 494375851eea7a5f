//! Circle event queue for the sweep
//!
//! Circle events are never removed from the heap directly. Each arc keeps a
//! copy of its live event; when an arc's event is detached the stale heap
//! entry is simply skipped once it reaches the top.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::beachline::ArcId;
use crate::geometry::Point;

/// A potential vertex where an arc will vanish from the beach line
#[derive(Debug, Clone, Copy)]
pub(crate) struct CircleEvent {
    /// Unique id, used to recognise stale heap entries
    pub id: usize,
    /// The arc that vanishes
    pub arc: ArcId,
    /// Centre x (equal to the event x)
    pub x: f64,
    /// Sweep position of the event (bottom of the circle)
    pub y: f64,
    /// Centre y, i.e. the Voronoi vertex
    pub y_center: f64,
}

impl CircleEvent {
    #[inline]
    pub fn vertex(&self) -> Point {
        Point::new(self.x, self.y_center)
    }
}

/// Heap entry ordered so the event with the smallest `(y, x)` pops first
#[derive(Debug, Clone, Copy)]
struct Queued(CircleEvent);

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Queued {}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap
        other
            .0
            .y
            .total_cmp(&self.0.y)
            .then_with(|| other.0.x.total_cmp(&self.0.x))
            .then_with(|| other.0.id.cmp(&self.0.id))
    }
}

/// Min-queue of circle events with lazy invalidation
#[derive(Debug, Default)]
pub(crate) struct EventQueue {
    heap: BinaryHeap<Queued>,
    next_id: usize,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an id for a new event
    pub fn next_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn push(&mut self, event: CircleEvent) {
        self.heap.push(Queued(event));
    }

    /// Smallest live event, discarding stale entries on the way
    pub fn peek_live(&mut self, is_live: impl Fn(&CircleEvent) -> bool) -> Option<CircleEvent> {
        while let Some(top) = self.heap.peek() {
            if is_live(&top.0) {
                return Some(top.0);
            }
            self.heap.pop();
        }
        None
    }

    pub fn pop(&mut self) -> Option<CircleEvent> {
        self.heap.pop().map(|q| q.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: usize, x: f64, y: f64) -> CircleEvent {
        CircleEvent {
            id,
            arc: id,
            x,
            y,
            y_center: y - 1.0,
        }
    }

    #[test]
    fn test_pops_smallest_y_then_x() {
        let mut queue = EventQueue::new();
        queue.push(event(0, 5.0, 3.0));
        queue.push(event(1, 1.0, 7.0));
        queue.push(event(2, 2.0, 3.0));
        queue.push(event(3, 0.0, 1.0));

        let order: Vec<usize> = std::iter::from_fn(|| queue.pop()).map(|e| e.id).collect();
        assert_eq!(order, vec![3, 2, 0, 1]);
    }

    #[test]
    fn test_peek_skips_stale() {
        let mut queue = EventQueue::new();
        queue.push(event(0, 0.0, 1.0));
        queue.push(event(1, 0.0, 2.0));

        let live = queue.peek_live(|e| e.id != 0).unwrap();
        assert_eq!(live.id, 1);
        // the stale entry is gone for good
        assert_eq!(queue.pop().map(|e| e.id), Some(1));
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_ids_are_unique() {
        let mut queue = EventQueue::new();
        let a = queue.next_id();
        let b = queue.next_id();
        assert_ne!(a, b);
    }
}
