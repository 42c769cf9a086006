//! Hotkey slot allocation.
//!
//! A slot is the small integer id the OS uses for one hotkey binding. Ids come
//! from a bounded range; the default is the Windows application hotkey space
//! `1..=0xBFFF` (0xC000 and above belong to shared DLL atoms).

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use crate::config::SlotConfig;
use crate::error::HotkeyError;

/// Lowest id handed out by default.
pub const FIRST_SLOT: u16 = 0x0001;
/// Highest id an application may use with `RegisterHotKey`.
pub const LAST_SLOT: u16 = 0xBFFF;

/// Identifier of one OS-level hotkey binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(u16);

impl SlotId {
    /// Wrap an id delivered by the OS (e.g. the `wParam` of `WM_HOTKEY`).
    pub const fn from_raw(id: u16) -> Self {
        Self(id)
    }

    pub fn get(self) -> u16 {
        self.0
    }
}

impl From<SlotId> for u32 {
    fn from(slot: SlotId) -> Self {
        slot.0 as u32
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What happens to an id once it is freed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SlotPolicy {
    /// Never hand a freed id out again while the process lives.
    ///
    /// A late activation for a released slot can then never be mistaken for a
    /// newer binding.
    #[default]
    Monotonic,
    /// Reuse freed ids, lowest first. For long-lived hosts with unbounded churn.
    Recycle,
}

/// Hands out and reclaims slot ids.
#[derive(Debug)]
pub struct SlotAllocator {
    first: u16,
    last: u16,
    /// Next never-used id; `None` once the range has been walked.
    next: Option<u16>,
    outstanding: HashSet<SlotId>,
    free_list: BTreeSet<SlotId>,
    policy: SlotPolicy,
}

impl Default for SlotAllocator {
    fn default() -> Self {
        Self::new(FIRST_SLOT, LAST_SLOT, SlotPolicy::Monotonic)
    }
}

impl SlotAllocator {
    /// Create an allocator over `first..=last`.
    ///
    /// Slot 0 is never handed out; an inverted range yields an allocator that
    /// is exhausted from the start.
    pub fn new(first: u16, last: u16, policy: SlotPolicy) -> Self {
        let first = first.max(1);
        Self {
            first,
            last,
            next: (first <= last).then_some(first),
            outstanding: HashSet::new(),
            free_list: BTreeSet::new(),
            policy,
        }
    }

    pub fn from_config(config: &SlotConfig) -> Self {
        Self::new(config.first, config.last, config.policy())
    }

    pub fn allocate(&mut self) -> Result<SlotId, HotkeyError> {
        let slot = match self.free_list.pop_first() {
            Some(slot) => slot,
            None => {
                let id = self.next.ok_or(HotkeyError::SlotsExhausted {
                    first: SlotId(self.first),
                    last: SlotId(self.last),
                })?;
                self.next = if id < self.last { Some(id + 1) } else { None };
                SlotId(id)
            }
        };
        self.outstanding.insert(slot);
        Ok(slot)
    }

    /// Release a slot. Freeing an id that is not outstanding is a no-op.
    pub fn free(&mut self, slot: SlotId) {
        if !self.outstanding.remove(&slot) {
            return;
        }
        if self.policy == SlotPolicy::Recycle {
            self.free_list.insert(slot);
        }
    }

    pub fn is_outstanding(&self, slot: SlotId) -> bool {
        self.outstanding.contains(&slot)
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.len()
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocates_increasing_ids_from_one() {
        let mut slots = SlotAllocator::default();
        assert_eq!(slots.allocate().unwrap().get(), 1);
        assert_eq!(slots.allocate().unwrap().get(), 2);
        assert_eq!(slots.allocate().unwrap().get(), 3);
        assert_eq!(slots.outstanding(), 3);
    }

    #[test]
    fn monotonic_never_reuses_freed_ids() {
        let mut slots = SlotAllocator::default();
        let a = slots.allocate().unwrap();
        slots.free(a);
        let b = slots.allocate().unwrap();
        assert_ne!(a, b);
        assert!(!slots.is_outstanding(a));
        assert!(slots.is_outstanding(b));
    }

    #[test]
    fn free_is_idempotent() {
        let mut slots = SlotAllocator::new(1, 10, SlotPolicy::Recycle);
        let a = slots.allocate().unwrap();
        slots.free(a);
        slots.free(a);
        slots.free(SlotId(9));
        assert_eq!(slots.outstanding(), 0);
        // A double free must not put the id on the free list twice
        assert_eq!(slots.allocate().unwrap(), a);
        assert_ne!(slots.allocate().unwrap(), a);
    }

    #[test]
    fn recycle_reuses_lowest_freed_id() {
        let mut slots = SlotAllocator::new(1, 100, SlotPolicy::Recycle);
        let ids: Vec<_> = (0..5).map(|_| slots.allocate().unwrap()).collect();
        slots.free(ids[3]);
        slots.free(ids[1]);
        assert_eq!(slots.allocate().unwrap(), ids[1]);
        assert_eq!(slots.allocate().unwrap(), ids[3]);
        assert_eq!(slots.allocate().unwrap().get(), 6);
    }

    #[test]
    fn exhaustion_is_reported_with_range() {
        let mut slots = SlotAllocator::new(0x10, 0x11, SlotPolicy::Monotonic);
        assert_eq!(slots.allocate().unwrap().get(), 0x10);
        assert_eq!(slots.allocate().unwrap().get(), 0x11);
        assert_eq!(
            slots.allocate(),
            Err(HotkeyError::SlotsExhausted {
                first: SlotId(0x10),
                last: SlotId(0x11)
            })
        );
    }

    #[test]
    fn monotonic_stays_exhausted_after_free() {
        let mut slots = SlotAllocator::new(1, 1, SlotPolicy::Monotonic);
        let only = slots.allocate().unwrap();
        slots.free(only);
        assert!(slots.allocate().is_err());
    }

    #[test]
    fn recycle_recovers_from_exhaustion() {
        let mut slots = SlotAllocator::new(1, 1, SlotPolicy::Recycle);
        let only = slots.allocate().unwrap();
        assert!(slots.allocate().is_err());
        slots.free(only);
        assert_eq!(slots.allocate().unwrap(), only);
    }

    #[test]
    fn last_slot_of_default_range_is_reachable() {
        let mut slots = SlotAllocator::new(LAST_SLOT, LAST_SLOT, SlotPolicy::Monotonic);
        assert_eq!(slots.allocate().unwrap().get(), 0xBFFF);
        assert!(slots.allocate().is_err());
    }

    #[test]
    fn slot_zero_is_never_handed_out() {
        let mut slots = SlotAllocator::new(0, 3, SlotPolicy::Monotonic);
        assert_eq!(slots.allocate().unwrap().get(), 1);
    }

    #[test]
    fn inverted_range_is_empty() {
        let mut slots = SlotAllocator::new(5, 4, SlotPolicy::Monotonic);
        assert!(slots.allocate().is_err());
    }
}
