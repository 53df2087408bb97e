// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Event gate, blocks signing flows on user interface events
//!
//! Waiters [register][EventBus::register] interest in an event class / id
//! _before_ triggering any display activity, then [wait][Registration::wait]
//! on the returned [Registration]. Events fired between registration and wait
//! are latched, so a fast user interaction can not be lost.
//!
//! Registrations are single-use and are removed from the bus when consumed
//! or dropped.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use crossbeam_channel::{Receiver, Sender, TrySendError};
use parking_lot::Mutex;
use strum::Display;

/// Event identifier within an [EventClass]
pub type EventId = i32;

/// Wildcard matching any event id
pub const ANY_ID: EventId = -1;

/// Event classes
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash, Display)]
pub enum EventClass {
    /// Signing flow events (eg. output confirmation activity)
    Process,
    /// Button presses
    Button,
}

/// Fired event
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Fired {
    pub class: EventClass,
    pub id: EventId,
    pub payload: Vec<u8>,
}

struct Handler {
    token: u64,
    class: EventClass,
    id: EventId,
    latch: Sender<Fired>,
}

impl Handler {
    fn matches(&self, class: EventClass, id: EventId) -> bool {
        self.class == class && (self.id == ANY_ID || id == ANY_ID || self.id == id)
    }
}

#[derive(Default)]
struct Inner {
    handlers: Mutex<Vec<Handler>>,
    next_token: AtomicU64,
}

/// Event bus, shared between the engine (waiting) and the UI (firing)
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<Inner>,
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Register interest in an event, returning a [Registration] to wait on
    pub fn register(&self, class: EventClass, id: EventId) -> Registration {
        let token = self.inner.next_token.fetch_add(1, Ordering::Relaxed);
        let (latch, rx) = crossbeam_channel::bounded(1);

        self.inner.handlers.lock().push(Handler {
            token,
            class,
            id,
            latch,
        });

        #[cfg(feature = "log")]
        log::trace!("registered handler {token} for {class}:{id}");

        Registration {
            bus: self.clone(),
            token,
            rx,
        }
    }

    /// Fire an event, delivering to all matching registrations
    ///
    /// Registrations that have already latched an event keep the first one.
    pub fn fire(&self, class: EventClass, id: EventId, payload: &[u8]) {
        #[cfg(feature = "log")]
        log::debug!("fire {class}:{id}");

        let handlers = self.inner.handlers.lock();
        for h in handlers.iter().filter(|h| h.matches(class, id)) {
            let evt = Fired {
                class,
                id,
                payload: payload.to_vec(),
            };
            match h.latch.try_send(evt) {
                Ok(()) => (),
                Err(TrySendError::Full(_)) => {
                    #[cfg(feature = "log")]
                    log::trace!("handler {} already latched", h.token);
                }
                Err(TrySendError::Disconnected(_)) => (),
            }
        }
    }

    /// Number of outstanding registrations
    pub fn registrations(&self) -> usize {
        self.inner.handlers.lock().len()
    }

    fn unregister(&self, token: u64) {
        let mut handlers = self.inner.handlers.lock();
        handlers.retain(|h| h.token != token);
    }
}

/// Single-use registration on an [EventBus]
pub struct Registration {
    bus: EventBus,
    token: u64,
    rx: Receiver<Fired>,
}

impl Registration {
    /// Wait for a matching event, a zero timeout waits indefinitely.
    ///
    /// Returns `None` on timeout.
    pub fn wait(self, timeout: Duration) -> Option<Fired> {
        let r = match timeout.is_zero() {
            true => self.rx.recv().ok(),
            false => self.rx.recv_timeout(timeout).ok(),
        };

        if r.is_none() {
            #[cfg(feature = "log")]
            log::debug!("handler {} timed out", self.token);
        }

        r
    }

    /// Explicitly release this registration without waiting
    pub fn unregister(self) {}
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.bus.unregister(self.token);
    }
}

/// Register for, then wait on a single event.
///
/// Only suitable where the event can not fire before this call, otherwise
/// [EventBus::register] prior to triggering the event source.
pub fn await_single_event(
    bus: &EventBus,
    class: EventClass,
    id: EventId,
    timeout: Duration,
) -> Option<Fired> {
    bus.register(class, id).wait(timeout)
}
