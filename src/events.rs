//! World events and observer subscriptions.
//!
//! Events fire synchronously inside the tick at the point where the change
//! happens; observers only ever see a world between ticks through
//! [`crate::World::state`].

use crate::organism::{OrganismId, OrganismSnapshot};
use crate::plant::{PlantId, PlantSnapshot};
use crate::stats::Stats;
use serde::{Deserialize, Serialize};

/// Something observable that happened during a tick
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum WorldEvent {
    /// Periodic aggregate statistics
    StatsUpdate(Stats),
    /// An organism was born or placed by the host
    OrganismBorn(OrganismSnapshot),
    /// An organism starved and was removed
    OrganismDied(OrganismId),
    /// A plant was consumed
    PlantEaten(PlantId),
    /// A plant grew or was placed by the host
    PlantGrown(PlantSnapshot),
    /// The population went extinct and the world was reseeded
    PopulationReset { tick: u64 },
}

/// Discriminant of [`WorldEvent`], for filtering
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    StatsUpdate,
    OrganismBorn,
    OrganismDied,
    PlantEaten,
    PlantGrown,
    PopulationReset,
}

impl WorldEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            WorldEvent::StatsUpdate(_) => EventKind::StatsUpdate,
            WorldEvent::OrganismBorn(_) => EventKind::OrganismBorn,
            WorldEvent::OrganismDied(_) => EventKind::OrganismDied,
            WorldEvent::PlantEaten(_) => EventKind::PlantEaten,
            WorldEvent::PlantGrown(_) => EventKind::PlantGrown,
            WorldEvent::PopulationReset { .. } => EventKind::PopulationReset,
        }
    }
}

/// Receives world events
pub trait WorldObserver {
    fn on_event(&mut self, event: &WorldEvent);
}

impl<F: FnMut(&WorldEvent)> WorldObserver for F {
    fn on_event(&mut self, event: &WorldEvent) {
        self(event)
    }
}

/// Handle returned by [`Observers::subscribe`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscription {
    id: SubscriptionId,
    filter: Option<EventKind>,
    observer: Box<dyn WorldObserver>,
}

/// Registry of observers, notified in subscription order
#[derive(Default)]
pub struct Observers {
    subscriptions: Vec<Subscription>,
    next_id: u64,
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receive every event
    pub fn subscribe(&mut self, observer: Box<dyn WorldObserver>) -> SubscriptionId {
        self.insert(None, observer)
    }

    /// Receive only events of one kind
    pub fn subscribe_to(&mut self, kind: EventKind, observer: Box<dyn WorldObserver>) -> SubscriptionId {
        self.insert(Some(kind), observer)
    }

    fn insert(&mut self, filter: Option<EventKind>, observer: Box<dyn WorldObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription { id, filter, observer });
        id
    }

    /// Returns false if the id was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Deliver an event to every matching observer
    pub fn emit(&mut self, event: &WorldEvent) {
        let kind = event.kind();
        for sub in &mut self.subscriptions {
            if sub.filter.map_or(true, |f| f == kind) {
                sub.observer.on_event(event);
            }
        }
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}
