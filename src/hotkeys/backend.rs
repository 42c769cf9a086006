//! The OS seam of the hotkey subsystem.
//!
//! A backend binds slots to key descriptors and owns the single endpoint that
//! receives activations. [`GlobalHotkeyBackend`](super::GlobalHotkeyBackend)
//! talks to the OS; [`InMemoryBackend`] keeps everything in process for dry
//! runs and tests.

use parking_lot::Mutex;
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::Arc;
use thiserror::Error;

use super::slots::SlotId;
use crate::shortcuts::KeyDescriptor;

/// Sink through which a backend delivers activations, one slot at a time.
pub type ActivationSink = Arc<dyn Fn(SlotId) + Send + Sync>;

/// The backend refused a binding. The message is the OS's reason.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct BindRejected(pub String);

/// OS hotkey-binding primitive plus its message-receiving endpoint.
///
/// Calls are serialized by the owning registry; implementations need no
/// locking of their own for bind/unbind.
pub trait HotkeyBackend: Send {
    /// Bind `slot` to `descriptor`. Must leave no binding behind on failure.
    fn bind(&mut self, slot: SlotId, descriptor: &KeyDescriptor) -> Result<(), BindRejected>;

    /// Release `slot`. Unknown slots are ignored.
    fn unbind(&mut self, slot: SlotId);

    /// Start delivering activations to `sink`, replacing any previous sink.
    fn attach(&mut self, sink: ActivationSink);

    /// Stop delivering activations.
    fn detach(&mut self);
}

#[derive(Default)]
struct InMemoryState {
    bindings: BTreeMap<SlotId, KeyDescriptor>,
    claimed: HashSet<KeyDescriptor>,
    /// Reasons for upcoming binds to fail, consumed one per bind.
    failures: VecDeque<String>,
    sink: Option<ActivationSink>,
}

/// Headless backend that behaves like the OS binding table.
///
/// It refuses a second binding of the same combination or of a combination
/// claimed "by another application" (see [`InMemoryHandle::claim`]).
pub struct InMemoryBackend {
    state: Arc<Mutex<InMemoryState>>,
}

/// Inspection and injection handle for an [`InMemoryBackend`].
///
/// Safe to use while the backend itself is owned by a registry.
#[derive(Clone)]
pub struct InMemoryHandle {
    state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryBackend {
    pub fn new() -> (Self, InMemoryHandle) {
        let state = Arc::new(Mutex::new(InMemoryState::default()));
        (
            Self {
                state: state.clone(),
            },
            InMemoryHandle { state },
        )
    }
}

impl HotkeyBackend for InMemoryBackend {
    fn bind(&mut self, slot: SlotId, descriptor: &KeyDescriptor) -> Result<(), BindRejected> {
        let mut state = self.state.lock();
        if let Some(reason) = state.failures.pop_front() {
            return Err(BindRejected(reason));
        }
        if state.bindings.contains_key(&slot) {
            return Err(BindRejected(format!("slot {} is already bound", slot)));
        }
        if state.claimed.contains(descriptor) {
            return Err(BindRejected(format!(
                "{} is held by another application",
                descriptor
            )));
        }
        if state.bindings.values().any(|bound| bound == descriptor) {
            return Err(BindRejected(format!("{} is already registered", descriptor)));
        }
        state.bindings.insert(slot, *descriptor);
        Ok(())
    }

    fn unbind(&mut self, slot: SlotId) {
        self.state.lock().bindings.remove(&slot);
    }

    fn attach(&mut self, sink: ActivationSink) {
        self.state.lock().sink = Some(sink);
    }

    fn detach(&mut self) {
        self.state.lock().sink = None;
    }
}

impl InMemoryHandle {
    /// All live bindings, ordered by slot.
    pub fn bindings(&self) -> Vec<(SlotId, KeyDescriptor)> {
        self.state
            .lock()
            .bindings
            .iter()
            .map(|(slot, descriptor)| (*slot, *descriptor))
            .collect()
    }

    pub fn binding(&self, slot: SlotId) -> Option<KeyDescriptor> {
        self.state.lock().bindings.get(&slot).copied()
    }

    pub fn slot_for(&self, descriptor: &KeyDescriptor) -> Option<SlotId> {
        self.state
            .lock()
            .bindings
            .iter()
            .find(|(_, bound)| *bound == descriptor)
            .map(|(slot, _)| *slot)
    }

    /// Pretend another application owns `descriptor`; later binds of it fail.
    pub fn claim(&self, descriptor: KeyDescriptor) {
        self.state.lock().claimed.insert(descriptor);
    }

    pub fn release_claim(&self, descriptor: &KeyDescriptor) {
        self.state.lock().claimed.remove(descriptor);
    }

    /// Make the next bind fail with `reason`, whatever it binds.
    pub fn fail_next_bind(&self, reason: &str) {
        self.state.lock().failures.push_back(reason.to_string());
    }

    pub fn is_attached(&self) -> bool {
        self.state.lock().sink.is_some()
    }

    /// Deliver an activation for `slot`, as the OS would after a key press.
    ///
    /// Returns false when no endpoint is attached. The slot need not be bound,
    /// which lets tests model activations racing an unregistration.
    pub fn fire(&self, slot: SlotId) -> bool {
        // Clone out of the lock so the sink can call back into the registry
        let sink = self.state.lock().sink.clone();
        match sink {
            Some(sink) => {
                sink(slot);
                true
            }
            None => false,
        }
    }

    /// Press the physical combination: fires the slot bound to it, if any.
    pub fn press(&self, descriptor: &KeyDescriptor) -> bool {
        match self.slot_for(descriptor) {
            Some(slot) => self.fire(slot),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shortcuts::{encode, ModifierSet};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn ctrl(key: &str) -> KeyDescriptor {
        encode(ModifierSet::CONTROL, key).unwrap()
    }

    #[test]
    fn bind_and_unbind_track_table() {
        let (mut backend, handle) = InMemoryBackend::new();
        let slot = SlotId::from_raw(1);
        backend.bind(slot, &ctrl("a")).unwrap();
        assert_eq!(handle.binding(slot), Some(ctrl("a")));
        assert_eq!(handle.slot_for(&ctrl("a")), Some(slot));

        backend.unbind(slot);
        assert!(handle.bindings().is_empty());
        backend.unbind(slot);
    }

    #[test]
    fn duplicate_combination_is_rejected() {
        let (mut backend, handle) = InMemoryBackend::new();
        backend.bind(SlotId::from_raw(1), &ctrl("a")).unwrap();
        let err = backend.bind(SlotId::from_raw(2), &ctrl("a")).unwrap_err();
        assert!(err.0.contains("already registered"));
        assert_eq!(handle.bindings().len(), 1);
    }

    #[test]
    fn claimed_combination_is_rejected() {
        let (mut backend, handle) = InMemoryBackend::new();
        handle.claim(ctrl("b"));
        assert!(backend.bind(SlotId::from_raw(1), &ctrl("b")).is_err());

        handle.release_claim(&ctrl("b"));
        assert!(backend.bind(SlotId::from_raw(1), &ctrl("b")).is_ok());
    }

    #[test]
    fn fire_reaches_attached_sink_only() {
        let (mut backend, handle) = InMemoryBackend::new();
        let hits = Arc::new(AtomicUsize::new(0));
        assert!(!handle.fire(SlotId::from_raw(3)));

        let counter = hits.clone();
        backend.attach(Arc::new(move |slot| {
            assert_eq!(slot.get(), 3);
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        assert!(handle.is_attached());
        assert!(handle.fire(SlotId::from_raw(3)));
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        backend.detach();
        assert!(!handle.fire(SlotId::from_raw(3)));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn injected_failures_are_consumed_in_order() {
        let (mut backend, handle) = InMemoryBackend::new();
        handle.fail_next_bind("first");
        handle.fail_next_bind("second");

        let err = backend.bind(SlotId::from_raw(1), &ctrl("c")).unwrap_err();
        assert_eq!(err, BindRejected("first".to_string()));
        let err = backend.bind(SlotId::from_raw(1), &ctrl("c")).unwrap_err();
        assert_eq!(err, BindRejected("second".to_string()));
        assert!(handle.bindings().is_empty());

        assert!(backend.bind(SlotId::from_raw(1), &ctrl("c")).is_ok());
    }
}
