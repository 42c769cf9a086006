//! Host-facing hotkey surface.
//!
//! `HotkeyService` owns one registry, one router and the backend endpoint.
//! Creating it opens the endpoint; `shutdown` (or dropping it) unregisters
//! every shortcut and closes the endpoint again.

use async_channel::Receiver;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use super::backend::HotkeyBackend;
use super::native::GlobalHotkeyBackend;
use super::registry::{HotkeyRegistry, Registration};
use super::router::{ActivationEvent, HotkeyRouter};
use super::slots::SlotId;
use crate::config::{Config, ShortcutBinding};
use crate::error::{HotkeyError, Result, ResultExt};
use crate::shortcuts::ModifierSet;

/// A configured shortcut that could not be registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedShortcut {
    pub name: String,
    pub error: HotkeyError,
}

pub struct HotkeyService<B: HotkeyBackend + 'static> {
    registry: Arc<HotkeyRegistry<B>>,
    router: Arc<HotkeyRouter<B>>,
    event_buffer: usize,
    shut_down: AtomicBool,
}

impl HotkeyService<GlobalHotkeyBackend> {
    /// Service backed by OS hotkeys.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::with_backend(GlobalHotkeyBackend::new()?, config))
    }
}

impl<B: HotkeyBackend + 'static> HotkeyService<B> {
    pub fn with_backend(backend: B, config: &Config) -> Self {
        let registry = Arc::new(HotkeyRegistry::new(backend, config.slots.allocator()));
        let router = Arc::new(HotkeyRouter::new(registry.clone()));
        router.open_endpoint();
        info!(
            first_slot = config.slots.first,
            last_slot = config.slots.last,
            recycle = config.slots.recycle,
            "Hotkey service started"
        );
        Self {
            registry,
            router,
            event_buffer: config.event_buffer,
            shut_down: AtomicBool::new(false),
        }
    }

    /// Register and forget; a failure is logged, never returned.
    pub fn register_shortcut(
        &self,
        name: &str,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    ) {
        self.try_register_shortcut(name, key, ctrl, shift, alt, meta)
            .warn_on_err();
    }

    pub fn try_register_shortcut(
        &self,
        name: &str,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    ) -> Result<SlotId> {
        let modifiers = ModifierSet::from_flags(ctrl, shift, alt, meta);
        self.registry.register(name, modifiers, key)
    }

    pub fn register_binding(&self, binding: &ShortcutBinding) -> Result<SlotId> {
        let descriptor = binding.descriptor()?;
        self.registry.register_descriptor(&binding.name, descriptor)
    }

    /// Register a batch of bindings, returning the ones that failed.
    ///
    /// A binding displaced by a later one with the same combination is
    /// reported as [`HotkeyError::Displaced`].
    pub fn register_bindings(&self, bindings: &[ShortcutBinding]) -> Vec<FailedShortcut> {
        let mut failed = Vec::new();
        let mut bound = Vec::new();
        for binding in bindings {
            match self.register_binding(binding) {
                Ok(_) => bound.push(binding),
                Err(error) => failed.push(FailedShortcut {
                    name: binding.name.clone(),
                    error,
                }),
            }
        }

        // Later bindings win a shared combination; name the losers
        for binding in bound.into_iter().rev() {
            if self.registry.is_registered(&binding.name)
                || failed.iter().any(|f| f.name == binding.name)
            {
                continue;
            }
            let Ok(descriptor) = binding.descriptor() else {
                continue;
            };
            let by = self
                .registry
                .registrations()
                .into_iter()
                .find(|registration| registration.descriptor == descriptor)
                .map(|registration| registration.name.to_string())
                .unwrap_or_default();
            failed.push(FailedShortcut {
                name: binding.name.clone(),
                error: HotkeyError::Displaced {
                    name: binding.name.clone(),
                    descriptor,
                    by,
                },
            });
        }

        if failed.is_empty() {
            info!(count = bindings.len(), "Registered all shortcuts");
        } else {
            let names: Vec<&str> = failed.iter().map(|f| f.name.as_str()).collect();
            warn!(
                registered = bindings.len() - failed.len(),
                failed = ?names,
                "Some shortcuts could not be registered"
            );
        }
        failed
    }

    pub fn unregister_shortcut(&self, name: &str) {
        self.registry.unregister(name);
    }

    pub fn unregister_all_shortcuts(&self) {
        self.registry.unregister_all();
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.registry.is_registered(name)
    }

    pub fn registered(&self) -> Vec<Registration> {
        self.registry.registrations()
    }

    /// Install the activation callback, replacing any previous one.
    pub fn on_activation<F>(&self, listener: F)
    where
        F: Fn(&ActivationEvent) + Send + Sync + 'static,
    {
        self.router.set_listener(listener);
    }

    /// Activation stream; replaces any callback set with `on_activation`.
    pub fn activations(&self) -> Receiver<ActivationEvent> {
        self.router.subscribe(self.event_buffer)
    }

    pub fn registry(&self) -> &Arc<HotkeyRegistry<B>> {
        &self.registry
    }

    pub fn router(&self) -> &Arc<HotkeyRouter<B>> {
        &self.router
    }

    /// Unregister everything and close the endpoint. Later calls do nothing.
    pub fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }
        let released = self.registry.unregister_all();
        self.router.close_endpoint();
        // Dropping the listener closes the activation stream
        self.router.clear_listener();
        info!(released, "Hotkey service stopped");
    }
}

impl<B: HotkeyBackend + 'static> Drop for HotkeyService<B> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
