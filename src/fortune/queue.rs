//! Sweep event queue
//!
//! A max-heap on sweep height: the sweep line starts above every site and
//! moves toward smaller y. Circle event records live in an arena owned by the
//! queue so that a pending event can be cancelled by index after the beach
//! line around it has changed.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use glam::DVec2;

use super::beach_line::NodeId;
use crate::error::{Result, VoronoiError};

/// Index of a site in the input
pub type SiteId = usize;

/// Index of a circle event record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CircleId(usize);

/// A predicted vertex: the moment an arc gets squeezed out
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleEvent {
    /// Sweep height at which the event fires (the bottom of the circle)
    pub sweep_y: f64,
    pub center: DVec2,
    pub radius: f64,
    /// The arc that disappears; a weak reference into the beach line arena
    pub arc: NodeId,
    /// Cleared when a beach line change makes the prediction a false alarm
    pub alive: bool,
}

/// Something the sweep line has to stop at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Site(SiteId),
    Circle(CircleId),
}

#[derive(Debug, Clone, Copy)]
struct QueueEntry {
    y: f64,
    x: f64,
    event: Event,
    sequence: usize,
}

impl QueueEntry {
    fn kind_rank(&self) -> u8 {
        match self.event {
            Event::Site(_) => 0,
            Event::Circle(_) => 1,
        }
    }
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    // "Greater" pops first: higher y, then smaller x, then sites before
    // circles, then first pushed.
    fn cmp(&self, other: &Self) -> Ordering {
        self.y
            .total_cmp(&other.y)
            .then_with(|| other.x.total_cmp(&self.x))
            .then_with(|| other.kind_rank().cmp(&self.kind_rank()))
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Priority queue of pending sweep events
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<QueueEntry>,
    circles: Vec<CircleEvent>,
    sequence: usize,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Queue a site event at the site's position
    pub fn push_site(&mut self, site: SiteId, position: DVec2) {
        self.push(position.y, position.x, Event::Site(site));
    }

    /// Store a circle event record and queue it at the bottom of its circle
    pub fn push_circle(&mut self, event: CircleEvent) -> CircleId {
        let id = CircleId(self.circles.len());
        self.circles.push(event);
        self.push(event.sweep_y, event.center.x, Event::Circle(id));
        id
    }

    fn push(&mut self, y: f64, x: f64, event: Event) {
        self.heap.push(QueueEntry {
            y,
            x,
            event,
            sequence: self.sequence,
        });
        self.sequence += 1;
    }

    /// Remove the next event along the sweep
    ///
    /// # Errors
    ///
    /// Returns `EmptyQueue` when nothing is pending.
    pub fn pop(&mut self) -> Result<Event> {
        self.heap
            .pop()
            .map(|entry| entry.event)
            .ok_or(VoronoiError::EmptyQueue)
    }

    /// Sweep height of the next event without removing it
    pub fn peek_y(&self) -> Option<f64> {
        self.heap.peek().map(|entry| entry.y)
    }

    #[inline]
    pub fn circle(&self, id: CircleId) -> &CircleEvent {
        &self.circles[id.0]
    }

    /// Mark a circle event as a false alarm
    ///
    /// The entry stays in the heap and is skipped when popped.
    pub fn cancel(&mut self, id: CircleId) {
        let event = &mut self.circles[id.0];
        if event.alive {
            log::trace!(
                "false alarm: circle at ({:.4}, {:.4}) firing at y={:.4}",
                event.center.x,
                event.center.y,
                event.sweep_y
            );
        }
        event.alive = false;
    }

    /// Number of circle events ever queued
    pub fn circle_count(&self) -> usize {
        self.circles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circle(sweep_y: f64, x: f64) -> CircleEvent {
        CircleEvent {
            sweep_y,
            center: DVec2::new(x, sweep_y + 1.0),
            radius: 1.0,
            arc: NodeId::new(0),
            alive: true,
        }
    }

    #[test]
    fn test_pops_highest_first() {
        let mut queue = EventQueue::new();
        queue.push_site(0, DVec2::new(0.0, 1.0));
        queue.push_site(1, DVec2::new(0.0, 5.0));
        queue.push_site(2, DVec2::new(0.0, -3.0));

        assert_eq!(queue.pop().unwrap(), Event::Site(1));
        assert_eq!(queue.pop().unwrap(), Event::Site(0));
        assert_eq!(queue.pop().unwrap(), Event::Site(2));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_ties_break_by_x_then_kind() {
        let mut queue = EventQueue::new();
        queue.push_site(0, DVec2::new(10.0, 0.0));
        let c = queue.push_circle(circle(0.0, 5.0));
        queue.push_site(1, DVec2::new(5.0, 0.0));
        queue.push_site(2, DVec2::new(-5.0, 0.0));

        assert_eq!(queue.pop().unwrap(), Event::Site(2));
        assert_eq!(queue.pop().unwrap(), Event::Site(1));
        assert_eq!(queue.pop().unwrap(), Event::Circle(c));
        assert_eq!(queue.pop().unwrap(), Event::Site(0));
    }

    #[test]
    fn test_empty_queue_signals_error() {
        let mut queue = EventQueue::new();
        assert_eq!(queue.pop(), Err(VoronoiError::EmptyQueue));
        assert_eq!(queue.peek_y(), None);
    }

    #[test]
    fn test_cancel_keeps_entry_but_clears_flag() {
        let mut queue = EventQueue::new();
        let id = queue.push_circle(circle(-2.0, 0.0));
        queue.cancel(id);

        assert_eq!(queue.len(), 1);
        assert!(!queue.circle(id).alive);
        assert_eq!(queue.pop().unwrap(), Event::Circle(id));
        assert_eq!(queue.circle_count(), 1);
    }
}
