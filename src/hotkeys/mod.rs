//! Global hotkey registration and activation routing.
//!
//! - `slots` - bounded slot id allocation
//! - `backend` - the `HotkeyBackend` seam and the in-memory backend
//! - `native` - OS backend on top of `global-hotkey`
//! - `registry` - name → slot → descriptor bookkeeping
//! - `router` - slot → name → listener dispatch
//! - `service` - the surface a host application uses

mod backend;
mod native;
mod registry;
mod router;
mod service;
mod slots;

pub use backend::{ActivationSink, BindRejected, HotkeyBackend, InMemoryBackend, InMemoryHandle};
pub use native::GlobalHotkeyBackend;
pub use registry::{HotkeyRegistry, Registration};
pub use router::{ActivationEvent, ActivationListener, DispatchOutcome, HotkeyRouter};
pub use service::{FailedShortcut, HotkeyService};
pub use slots::{SlotAllocator, SlotId, SlotPolicy, FIRST_SLOT, LAST_SLOT};
