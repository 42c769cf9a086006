//! Activation routing: slot → shortcut name → listener.
//!
//! The backend delivers activations one at a time from its dispatch thread.
//! The router resolves the slot under the registry lock and calls the
//! listener after the lock is released, so a listener may re-enter the
//! registry (e.g. unregister the shortcut that just fired).

use async_channel::{Receiver, TrySendError};
use parking_lot::RwLock;
use std::sync::{Arc, Weak};
use tracing::{debug, trace, warn};

use super::backend::HotkeyBackend;
use super::registry::HotkeyRegistry;
use super::slots::SlotId;
use crate::shortcuts::ShortcutName;

/// One firing of a registered shortcut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationEvent {
    pub name: ShortcutName,
    pub slot: SlotId,
}

pub type ActivationListener = Arc<dyn Fn(&ActivationEvent) + Send + Sync>;

/// What `dispatch` did with an activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Delivered,
    /// The slot is not (or no longer) registered.
    Stale,
    /// Resolved, but no listener is installed.
    Unobserved,
}

pub struct HotkeyRouter<B: HotkeyBackend> {
    registry: Arc<HotkeyRegistry<B>>,
    listener: RwLock<Option<ActivationListener>>,
}

impl<B: HotkeyBackend + 'static> HotkeyRouter<B> {
    pub fn new(registry: Arc<HotkeyRegistry<B>>) -> Self {
        Self {
            registry,
            listener: RwLock::new(None),
        }
    }

    pub fn registry(&self) -> &Arc<HotkeyRegistry<B>> {
        &self.registry
    }

    pub fn dispatch(&self, slot: SlotId) -> DispatchOutcome {
        // Activation racing an unregistration; not an error
        let Some(name) = self.registry.resolve(slot) else {
            trace!(slot = slot.get(), "Dropping activation for unregistered slot");
            return DispatchOutcome::Stale;
        };

        let listener = self.listener.read().clone();
        match listener {
            Some(listener) => {
                debug!(shortcut = %name, slot = slot.get(), "Shortcut activated");
                listener(&ActivationEvent { name, slot });
                DispatchOutcome::Delivered
            }
            None => {
                debug!(shortcut = %name, slot = slot.get(), "Shortcut activated with no listener");
                DispatchOutcome::Unobserved
            }
        }
    }

    /// Install the single listener, replacing any previous one.
    pub fn set_listener<F>(&self, listener: F)
    where
        F: Fn(&ActivationEvent) + Send + Sync + 'static,
    {
        *self.listener.write() = Some(Arc::new(listener));
    }

    pub fn clear_listener(&self) {
        *self.listener.write() = None;
    }

    /// Install a channel-backed listener and return its receiving end.
    ///
    /// Delivery never waits on the channel: when it is full the activation
    /// is dropped with a warning.
    pub fn subscribe(&self, capacity: usize) -> Receiver<ActivationEvent> {
        let (tx, rx) = async_channel::bounded(capacity.max(1));
        self.set_listener(move |event| match tx.try_send(event.clone()) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => warn!(
                shortcut = %event.name,
                slot = event.slot.get(),
                "Activation channel full, dropping event"
            ),
            Err(TrySendError::Closed(_)) => {
                trace!("Activation channel closed, dropping event")
            }
        });
        rx
    }

    /// Attach this router to the backend's activation endpoint.
    ///
    /// The endpoint holds only a weak reference, so dropping the router
    /// turns later activations into no-ops.
    pub fn open_endpoint(self: &Arc<Self>) {
        let router: Weak<Self> = Arc::downgrade(self);
        self.registry.attach_endpoint(Arc::new(move |slot| {
            if let Some(router) = router.upgrade() {
                router.dispatch(slot);
            }
        }));
    }

    pub fn close_endpoint(&self) {
        self.registry.detach_endpoint();
    }
}
