use std::fmt::{Debug, Formatter, Result as FmtResult};

use crate::models::event::{BreakerEvent, ListenerId};

type Listener = Box<dyn FnMut() + Send>;

/// Per-breaker registry of transition observers.
///
/// Listeners run inline, in registration order, from inside `trip()` and
/// `reset()`.
#[derive(Default)]
pub struct Listeners {
    next_id: u64,
    entries: Vec<(ListenerId, BreakerEvent, Listener)>,
}

impl Listeners {
    pub fn add<F>(&mut self, event: BreakerEvent, listener: F) -> ListenerId
    where
        F: FnMut() + Send + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, event, Box::new(listener)));
        id
    }

    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub fn emit(&mut self, event: BreakerEvent) {
        for (_, _, listener) in self
            .entries
            .iter_mut()
            .filter(|(_, registered, _)| *registered == event)
        {
            listener();
        }
    }

    pub fn count(&self, event: BreakerEvent) -> usize {
        self.entries
            .iter()
            .filter(|(_, registered, _)| *registered == event)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Debug for Listeners {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Listeners")
            .field("opened", &self.count(BreakerEvent::Opened))
            .field("closed", &self.count(BreakerEvent::Closed))
            .finish()
    }
}
