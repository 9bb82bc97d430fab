// src/events/bus/event_bus.rs
//
// Activity event sink.
//
// RULES:
// 1. Delivery is synchronous, in subscription order, on the emitting thread
// 2. A panicking subscriber is logged and skipped
// 3. Every emission lands in an in-memory log the host can inspect

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use log::{debug, error};

use crate::events::types::DomainEvent;

type Subscriber = Box<dyn Fn(&dyn Any) + Send + Sync>;

/// Where the engine publishes lifecycle events. Hosts subscribe here
/// instead of holding on to the engine.
#[derive(Default)]
pub struct EventBus {
    subscribers: RwLock<HashMap<TypeId, Vec<Subscriber>>>,
    log: RwLock<Vec<EventLogEntry>>,
}

/// One emission, as recorded in the bus log
#[derive(Debug, Clone, PartialEq)]
pub struct EventLogEntry {
    pub event_type: &'static str,
    pub event_id: String,
    pub occurred_at: DateTime<Utc>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for every future `E`.
    ///
    /// ```ignore
    /// bus.subscribe::<ActivityEvent, _>(|event| {
    ///     println!("{} {}", event.kind, event.session.id);
    /// });
    /// ```
    pub fn subscribe<E, F>(&self, handler: F)
    where
        E: DomainEvent + 'static,
        F: Fn(&E) + Send + Sync + 'static,
    {
        let subscriber: Subscriber = Box::new(move |event: &dyn Any| {
            match event.downcast_ref::<E>() {
                Some(event) => handler(event),
                None => error!("Subscriber for {} got a foreign event", std::any::type_name::<E>()),
            }
        });

        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(TypeId::of::<E>())
            .or_default()
            .push(subscriber);
    }

    /// Record `event` and hand it to its subscribers before returning
    pub fn emit<E>(&self, event: E)
    where
        E: DomainEvent + 'static,
    {
        let entry = EventLogEntry {
            event_type: event.event_type(),
            event_id: event.event_id().to_string(),
            occurred_at: event.occurred_at(),
        };
        debug!("[EVENT] {} ({})", entry.event_type, entry.event_id);
        self.log.write().unwrap_or_else(PoisonError::into_inner).push(entry);

        let subscribers = self.subscribers.read().unwrap_or_else(PoisonError::into_inner);
        let Some(subscribers) = subscribers.get(&TypeId::of::<E>()) else {
            return;
        };
        for (idx, subscriber) in subscribers.iter().enumerate() {
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| subscriber(&event as &dyn Any))) {
                error!("Subscriber {} for {} panicked: {:?}", idx, event.event_type(), panic);
            }
        }
    }

    pub fn get_event_log(&self) -> Vec<EventLogEntry> {
        self.log.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn clear_event_log(&self) {
        self.log.write().unwrap_or_else(PoisonError::into_inner).clear();
    }

    #[cfg(test)]
    pub(crate) fn subscriber_count<E: 'static>(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&TypeId::of::<E>())
            .map_or(0, Vec::len)
    }
}
