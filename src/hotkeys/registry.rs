//! Shortcut name → slot → key descriptor bookkeeping.
//!
//! The registry is the only place that mints or releases slots. One mutex
//! covers the name map, the slot map, the allocator and the backend, so a
//! registration is either fully bound and recorded or not there at all.

use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::{debug, warn};

use super::backend::{ActivationSink, HotkeyBackend};
use super::slots::{SlotAllocator, SlotId};
use crate::error::{HotkeyError, Result};
use crate::logging::log_shortcut_event;
use crate::shortcuts::{encode, KeyDescriptor, ModifierSet, ShortcutName};

/// One active binding owned by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: ShortcutName,
    pub slot: SlotId,
    pub descriptor: KeyDescriptor,
    /// Whether the backend holds the binding. Stored registrations always do.
    pub bound: bool,
}

struct RegistryState<B> {
    backend: B,
    slots: SlotAllocator,
    by_name: HashMap<ShortcutName, Registration>,
    by_slot: HashMap<SlotId, ShortcutName>,
}

impl<B: HotkeyBackend> RegistryState<B> {
    /// Drop `name` from the maps and free its slot without touching the backend.
    fn forget(&mut self, name: &str) -> Option<Registration> {
        let registration = self.by_name.remove(name)?;
        if self.by_slot.remove(&registration.slot).is_none() {
            crate::debug_panic!("slot {} of '{}' missing from slot map", registration.slot, name);
        }
        self.slots.free(registration.slot);
        Some(registration)
    }

    /// Unbind and forget `name`, returning what it held.
    fn release(&mut self, name: &str) -> Option<Registration> {
        let registration = self.forget(name)?;
        self.backend.unbind(registration.slot);
        Some(registration)
    }

    fn holder_of(&self, descriptor: &KeyDescriptor) -> Option<Registration> {
        self.by_name
            .values()
            .find(|registration| registration.descriptor == *descriptor)
            .cloned()
    }

    /// Put a holder's OS binding back after a failed takeover of its combination.
    fn restore(&mut self, holder: &Registration) {
        if let Err(rejected) = self.backend.bind(holder.slot, &holder.descriptor) {
            self.forget(holder.name.as_str());
            warn!(
                shortcut = %holder.name,
                hotkey = %holder.descriptor,
                error = %rejected,
                "Could not restore binding after a failed registration; shortcut dropped"
            );
            log_shortcut_event(holder.name.as_str(), "evict", Some(holder.slot), false);
        }
    }
}

/// Maps shortcut names to live OS registrations.
pub struct HotkeyRegistry<B: HotkeyBackend> {
    state: Mutex<RegistryState<B>>,
}

impl<B: HotkeyBackend> HotkeyRegistry<B> {
    pub fn new(backend: B, slots: SlotAllocator) -> Self {
        Self {
            state: Mutex::new(RegistryState {
                backend,
                slots,
                by_name: HashMap::new(),
                by_slot: HashMap::new(),
            }),
        }
    }

    /// Register `name` for `modifiers` + `key_symbol`.
    ///
    /// An unsupported key symbol fails before anything is touched, so an
    /// existing registration for `name` survives it. Otherwise any previous
    /// registration of `name` is released first. Another name holding the same
    /// combination is evicted once the new bind succeeds; if allocation or the
    /// bind fails it keeps its registration. On `BindFailed` the slot is freed
    /// and `name` ends up unregistered.
    pub fn register(&self, name: &str, modifiers: ModifierSet, key_symbol: &str) -> Result<SlotId> {
        let descriptor = match encode(modifiers, key_symbol) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                log_shortcut_event(name, "register", None, false);
                return Err(e);
            }
        };
        self.register_descriptor(name, descriptor)
    }

    /// Register an already encoded descriptor.
    pub fn register_descriptor(&self, name: &str, descriptor: KeyDescriptor) -> Result<SlotId> {
        let mut state = self.state.lock();

        if let Some(previous) = state.release(name) {
            debug!(
                shortcut = name,
                slot = previous.slot.get(),
                hotkey = %previous.descriptor,
                "Released previous registration before re-registering"
            );
        }

        let slot = match state.slots.allocate() {
            Ok(slot) => slot,
            Err(e) => {
                drop(state);
                log_shortcut_event(name, "register", None, false);
                return Err(e);
            }
        };

        // The holder of the same combination keeps its record until the new
        // bind succeeds; only its OS binding is lifted so the combination is free.
        let holder = state.holder_of(&descriptor);
        if let Some(holder) = &holder {
            state.backend.unbind(holder.slot);
        }

        if let Err(rejected) = state.backend.bind(slot, &descriptor) {
            state.slots.free(slot);
            if let Some(holder) = &holder {
                state.restore(holder);
            }
            drop(state);
            log_shortcut_event(name, "register", Some(slot), false);
            return Err(HotkeyError::BindFailed {
                name: name.to_string(),
                descriptor,
                reason: rejected.0,
            });
        }

        if let Some(holder) = &holder {
            state.forget(holder.name.as_str());
            warn!(
                shortcut = name,
                displaced = %holder.name,
                hotkey = %descriptor,
                "Combination was registered under another name; the later registration wins"
            );
            log_shortcut_event(holder.name.as_str(), "evict", Some(holder.slot), true);
        }

        let name = ShortcutName::new(name);
        state.by_slot.insert(slot, name.clone());
        state.by_name.insert(
            name.clone(),
            Registration {
                name: name.clone(),
                slot,
                descriptor,
                bound: true,
            },
        );
        drop(state);

        log_shortcut_event(name.as_str(), "register", Some(slot), true);
        Ok(slot)
    }

    /// Release `name`. Unknown names are a no-op.
    pub fn unregister(&self, name: &str) {
        let released = self.state.lock().release(name);
        if let Some(registration) = released {
            log_shortcut_event(name, "unregister", Some(registration.slot), true);
        }
    }

    /// Release every registration and return how many there were.
    pub fn unregister_all(&self) -> usize {
        let released: Vec<Registration> = {
            let mut state = self.state.lock();
            let names: Vec<ShortcutName> = state.by_name.keys().cloned().collect();
            names
                .iter()
                .filter_map(|name| state.release(name.as_str()))
                .collect()
        };
        for registration in &released {
            log_shortcut_event(
                registration.name.as_str(),
                "unregister",
                Some(registration.slot),
                true,
            );
        }
        released.len()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.state.lock().by_name.contains_key(name)
    }

    /// Name currently bound to `slot`, if any.
    pub fn resolve(&self, slot: SlotId) -> Option<ShortcutName> {
        self.state.lock().by_slot.get(&slot).cloned()
    }

    pub fn registration(&self, name: &str) -> Option<Registration> {
        self.state.lock().by_name.get(name).cloned()
    }

    /// Snapshot of all registrations, ordered by slot.
    pub fn registrations(&self) -> Vec<Registration> {
        let mut registrations: Vec<Registration> =
            self.state.lock().by_name.values().cloned().collect();
        registrations.sort_by_key(|registration| registration.slot);
        registrations
    }

    pub fn len(&self) -> usize {
        self.state.lock().by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn outstanding_slots(&self) -> usize {
        self.state.lock().slots.outstanding()
    }

    pub(crate) fn attach_endpoint(&self, sink: ActivationSink) {
        self.state.lock().backend.attach(sink);
    }

    pub(crate) fn detach_endpoint(&self) {
        self.state.lock().backend.detach();
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
