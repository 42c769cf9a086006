//! OS backend built on the `global-hotkey` crate.
//!
//! Threads involved:
//! - `hotkey-pump` owns the `GlobalHotKeyManager` (not `Send` on Windows) and,
//!   on Windows, runs the message loop its hidden window needs.
//! - `hotkey-events` is process-wide and drains `GlobalHotKeyEvent::receiver()`
//!   into the [`ActivationHub`].
//! - `hotkey-dispatch` runs one per backend and calls the attached sink.
//!
//! OS-side threads only push into channels. A bind that waits on the OS while
//! holding the registry lock therefore never waits on a sink that needs it.
//!
//! NOTE: on macOS, Carbon delivers hotkey events through the main run loop, so
//! the host application must be running its event loop.

use async_channel::{Receiver, Sender, TryRecvError};
use global_hotkey::{
    hotkey::{Code, HotKey, Modifiers},
    Error as GlobalHotkeyError, GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, trace, warn};

use super::backend::{ActivationSink, BindRejected, HotkeyBackend};
use super::slots::SlotId;
use crate::error::HotkeyError;
use crate::shortcuts::{KeyDescriptor, ModifierSet};

/// How long the Windows pump sleeps between message/request sweeps
const PUMP_INTERVAL: Duration = Duration::from_millis(10);

const PUMP_STOPPED: &str = "hotkey pump thread has stopped";

/// The OS hotkey table as seen from the pump thread.
pub(crate) trait OsHotkeys {
    /// Poll for OS messages instead of blocking on requests.
    const POLLS_MESSAGES: bool = false;

    fn register(&self, hotkey: HotKey) -> Result<(), String>;

    fn unregister(&self, hotkey: HotKey) -> Result<(), String>;

    /// Dispatch queued OS messages of the pump thread.
    fn pump_messages(&self) {}
}

impl OsHotkeys for GlobalHotKeyManager {
    const POLLS_MESSAGES: bool = cfg!(target_os = "windows");

    fn register(&self, hotkey: HotKey) -> Result<(), String> {
        GlobalHotKeyManager::register(self, hotkey).map_err(|e| describe_error(&e))
    }

    fn unregister(&self, hotkey: HotKey) -> Result<(), String> {
        GlobalHotKeyManager::unregister(self, hotkey).map_err(|e| describe_error(&e))
    }

    #[cfg(target_os = "windows")]
    fn pump_messages(&self) {
        use windows::Win32::UI::WindowsAndMessaging::{
            DispatchMessageW, PeekMessageW, TranslateMessage, MSG, PM_REMOVE,
        };

        let mut msg = MSG::default();
        // SAFETY: `msg` is a valid MSG for the duration of each call; WM_HOTKEY
        // for the manager's window is queued on this thread.
        unsafe {
            while PeekMessageW(&mut msg, None, 0, 0, PM_REMOVE).as_bool() {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
    }
}

// ============================================
// ACTIVATION HUB
// ============================================

struct Route {
    slot: SlotId,
    activations: Sender<SlotId>,
}

/// global-hotkey id -> (slot, owning backend's activation queue).
#[derive(Default)]
pub(crate) struct ActivationHub {
    routes: RwLock<HashMap<u32, Route>>,
}

impl ActivationHub {
    fn route(&self, hotkey_id: u32, slot: SlotId, activations: Sender<SlotId>) {
        self.routes
            .write()
            .insert(hotkey_id, Route { slot, activations });
    }

    fn unroute(&self, hotkey_id: u32) {
        self.routes.write().remove(&hotkey_id);
    }

    /// Queue a key press for the backend that bound `hotkey_id`. Never blocks.
    pub(crate) fn forward_press(&self, hotkey_id: u32) -> bool {
        let route = self
            .routes
            .read()
            .get(&hotkey_id)
            .map(|route| (route.slot, route.activations.clone()));
        match route {
            Some((slot, activations)) => activations.try_send(slot).is_ok(),
            None => {
                trace!(hotkey_id, "Press for unrouted hotkey id");
                false
            }
        }
    }
}

static PROCESS_HUB: OnceLock<Arc<ActivationHub>> = OnceLock::new();

/// The hub fed by the crate's process-wide event channel.
fn process_hub() -> Arc<ActivationHub> {
    PROCESS_HUB
        .get_or_init(|| {
            let hub = Arc::new(ActivationHub::default());
            let forwarder = hub.clone();
            let spawned = thread::Builder::new()
                .name("hotkey-events".to_string())
                .spawn(move || {
                    let events = GlobalHotKeyEvent::receiver();
                    while let Ok(event) = events.recv() {
                        // Only respond to key PRESS, not release
                        if event.state == HotKeyState::Pressed {
                            forwarder.forward_press(event.id);
                        }
                    }
                });
            if let Err(e) = spawned {
                error!(error = %e, "Failed to start hotkey event forwarder");
            }
            hub
        })
        .clone()
}

// ============================================
// PUMP THREAD
// ============================================

type Reply = Sender<Result<(), String>>;

enum PumpRequest {
    Register { hotkey: HotKey, reply: Reply },
    Unregister { hotkey: HotKey, reply: Reply },
}

fn run_pump<O: OsHotkeys>(os: O, requests: Receiver<PumpRequest>) {
    if O::POLLS_MESSAGES {
        loop {
            os.pump_messages();
            loop {
                match requests.try_recv() {
                    Ok(request) => execute(&os, request),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Closed) => return,
                }
            }
            thread::sleep(PUMP_INTERVAL);
        }
    } else {
        while let Ok(request) = requests.recv_blocking() {
            execute(&os, request);
        }
    }
}

fn execute<O: OsHotkeys>(os: &O, request: PumpRequest) {
    let (result, reply) = match request {
        PumpRequest::Register { hotkey, reply } => (os.register(hotkey), reply),
        PumpRequest::Unregister { hotkey, reply } => (os.unregister(hotkey), reply),
    };
    let _ = reply.try_send(result);
}

// ============================================
// BACKEND
// ============================================

pub struct GlobalHotkeyBackend {
    requests: Sender<PumpRequest>,
    hub: Arc<ActivationHub>,
    /// Slot -> HotKey object (needed for proper unregistration)
    hotkeys: HashMap<SlotId, HotKey>,
    activations: Sender<SlotId>,
    sink: Arc<RwLock<Option<ActivationSink>>>,
    pump: Option<JoinHandle<()>>,
}

impl GlobalHotkeyBackend {
    /// Start the OS endpoint on its own pump thread.
    pub fn new() -> Result<Self, HotkeyError> {
        Self::start(process_hub(), || {
            GlobalHotKeyManager::new().map_err(|e| e.to_string())
        })
    }

    /// Start with `create` building the OS table on the pump thread.
    pub(crate) fn start<O, F>(hub: Arc<ActivationHub>, create: F) -> Result<Self, HotkeyError>
    where
        O: OsHotkeys + 'static,
        F: FnOnce() -> Result<O, String> + Send + 'static,
    {
        let (activations, activation_rx) = async_channel::unbounded::<SlotId>();
        let sink: Arc<RwLock<Option<ActivationSink>>> = Arc::new(RwLock::new(None));
        let dispatch_sink = sink.clone();
        thread::Builder::new()
            .name("hotkey-dispatch".to_string())
            .spawn(move || {
                while let Ok(slot) = activation_rx.recv_blocking() {
                    // Clone out so the sink runs without the endpoint lock
                    let sink = dispatch_sink.read().clone();
                    match sink {
                        Some(sink) => sink(slot),
                        None => trace!(slot = slot.get(), "Activation with no endpoint attached"),
                    }
                }
            })
            .map_err(|e| HotkeyError::Backend(format!("cannot start dispatch thread: {}", e)))?;

        let (requests, request_rx) = async_channel::unbounded();
        let (ready_tx, ready_rx) = async_channel::bounded::<Result<(), String>>(1);
        let pump = thread::Builder::new()
            .name("hotkey-pump".to_string())
            .spawn(move || {
                let os = match create() {
                    Ok(os) => os,
                    Err(reason) => {
                        let _ = ready_tx.try_send(Err(reason));
                        return;
                    }
                };
                let _ = ready_tx.try_send(Ok(()));
                run_pump(os, request_rx);
            })
            .map_err(|e| HotkeyError::Backend(format!("cannot start hotkey pump: {}", e)))?;

        let ready = ready_rx
            .recv_blocking()
            .unwrap_or_else(|_| Err(PUMP_STOPPED.to_string()));
        if let Err(reason) = ready {
            let _ = pump.join();
            return Err(HotkeyError::Backend(reason));
        }

        Ok(Self {
            requests,
            hub,
            hotkeys: HashMap::new(),
            activations,
            sink,
            pump: Some(pump),
        })
    }

    /// Run one request on the pump thread and wait for its answer.
    fn request(&self, make: impl FnOnce(Reply) -> PumpRequest) -> Result<(), String> {
        let (reply, answer) = async_channel::bounded(1);
        self.requests
            .send_blocking(make(reply))
            .map_err(|_| PUMP_STOPPED.to_string())?;
        answer
            .recv_blocking()
            .unwrap_or_else(|_| Err(PUMP_STOPPED.to_string()))
    }
}

impl HotkeyBackend for GlobalHotkeyBackend {
    fn bind(&mut self, slot: SlotId, descriptor: &KeyDescriptor) -> Result<(), BindRejected> {
        let hotkey = to_hotkey(descriptor)
            .ok_or_else(|| BindRejected(format!("no key code for {}", descriptor)))?;

        self.request(|reply| PumpRequest::Register { hotkey, reply })
            .map_err(BindRejected)?;

        self.hub.route(hotkey.id(), slot, self.activations.clone());
        self.hotkeys.insert(slot, hotkey);
        debug!(slot = slot.get(), hotkey_id = hotkey.id(), "Bound OS hotkey");
        Ok(())
    }

    fn unbind(&mut self, slot: SlotId) {
        let Some(hotkey) = self.hotkeys.remove(&slot) else {
            return;
        };
        self.hub.unroute(hotkey.id());

        if let Err(reason) = self.request(|reply| PumpRequest::Unregister { hotkey, reply }) {
            // Internal tracking is already updated; the OS side is best effort
            warn!(
                slot = slot.get(),
                hotkey_id = hotkey.id(),
                error = %reason,
                "Failed to unregister OS hotkey"
            );
        }
    }

    fn attach(&mut self, sink: ActivationSink) {
        *self.sink.write() = Some(sink);
    }

    fn detach(&mut self) {
        *self.sink.write() = None;
    }
}

impl Drop for GlobalHotkeyBackend {
    fn drop(&mut self) {
        let slots: Vec<SlotId> = self.hotkeys.keys().copied().collect();
        for slot in slots {
            self.unbind(slot);
        }
        self.requests.close();
        self.activations.close();
        if let Some(pump) = self.pump.take() {
            let _ = pump.join();
        }
    }
}

fn to_hotkey(descriptor: &KeyDescriptor) -> Option<HotKey> {
    let flags = descriptor.modifiers();
    let mut modifiers = Modifiers::empty();
    if flags.contains(ModifierSet::CONTROL) {
        modifiers |= Modifiers::CONTROL;
    }
    if flags.contains(ModifierSet::SHIFT) {
        modifiers |= Modifiers::SHIFT;
    }
    if flags.contains(ModifierSet::ALT) {
        modifiers |= Modifiers::ALT;
    }
    if flags.contains(ModifierSet::META) {
        modifiers |= Modifiers::META;
    }

    let code = key_code_to_code(descriptor.key_code())?;
    Some(HotKey::new(Some(modifiers), code))
}

fn key_code_to_code(key_code: u32) -> Option<Code> {
    let code = match char::from_u32(key_code)? {
        'A' => Code::KeyA,
        'B' => Code::KeyB,
        'C' => Code::KeyC,
        'D' => Code::KeyD,
        'E' => Code::KeyE,
        'F' => Code::KeyF,
        'G' => Code::KeyG,
        'H' => Code::KeyH,
        'I' => Code::KeyI,
        'J' => Code::KeyJ,
        'K' => Code::KeyK,
        'L' => Code::KeyL,
        'M' => Code::KeyM,
        'N' => Code::KeyN,
        'O' => Code::KeyO,
        'P' => Code::KeyP,
        'Q' => Code::KeyQ,
        'R' => Code::KeyR,
        'S' => Code::KeyS,
        'T' => Code::KeyT,
        'U' => Code::KeyU,
        'V' => Code::KeyV,
        'W' => Code::KeyW,
        'X' => Code::KeyX,
        'Y' => Code::KeyY,
        'Z' => Code::KeyZ,
        '0' => Code::Digit0,
        '1' => Code::Digit1,
        '2' => Code::Digit2,
        '3' => Code::Digit3,
        '4' => Code::Digit4,
        '5' => Code::Digit5,
        '6' => Code::Digit6,
        '7' => Code::Digit7,
        '8' => Code::Digit8,
        '9' => Code::Digit9,
        _ => return None,
    };
    Some(code)
}

/// Format a registration error with helpful context
fn describe_error(e: &GlobalHotkeyError) -> String {
    match e {
        GlobalHotkeyError::AlreadyRegistered(hk) => format!(
            "already registered by another application or by this process (hotkey id {})",
            hk.id()
        ),
        GlobalHotkeyError::FailedToRegister(msg) => {
            format!("system rejected the combination: {}", msg)
        }
        GlobalHotkeyError::OsError(os_err) => format!("OS error: {}", os_err),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "native_tests.rs"]
mod tests;
