//! FIFO event queue owned by the backtest driver.
//!
//! Components never hold the queue. The driver lends `&mut EventQueue` to each
//! handler call, so there is exactly one writer at any time.

use crate::domain::Event;
use std::collections::VecDeque;

#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<Event>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: Event) {
        self.events.push_back(event);
    }

    /// Dequeue the oldest event, or `None` when drained.
    pub fn pop(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
