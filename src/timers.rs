//! owned, cancelable one-shot timers for the fishing state machine
//!
//! Each logical delay has its own slot. Scheduling into a busy slot replaces
//! the old timer, and a reset clears every slot, so a delay that belonged to
//! an earlier phase can never fire into a later one.
use std::time::Duration;

use bevy::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerSlot {
    /// cast animation → hook launch
    Launch,
    /// grounded + still → auto-retract
    Settle,
    /// waiting → bite
    Bite,
    /// bite → fish escapes
    BiteWindow,
    /// reeling → caught
    Reel,
    /// caught → callback + reset
    CatchDisplay,
}

impl TimerSlot {
    pub const ALL: [TimerSlot; 6] = [
        TimerSlot::Launch,
        TimerSlot::Settle,
        TimerSlot::Bite,
        TimerSlot::BiteWindow,
        TimerSlot::Reel,
        TimerSlot::CatchDisplay,
    ];

    fn idx(self) -> usize {
        self as usize
    }
}

/// Identifies one scheduled delay; stale once its slot is rescheduled or cleared.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerHandle {
    pub slot: TimerSlot,
    generation: u64,
}

#[derive(Debug, Clone)]
struct Pending {
    timer: Timer,
    generation: u64,
}

#[derive(Debug, Clone, Default)]
pub struct FishingTimers {
    slots: [Option<Pending>; 6],
    next_generation: u64,
}

impl FishingTimers {
    pub fn schedule(&mut self, slot: TimerSlot, delay: Duration) -> TimerHandle {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.slots[slot.idx()] = Some(Pending {
            timer: Timer::new(delay, TimerMode::Once),
            generation,
        });
        TimerHandle { slot, generation }
    }

    pub fn cancel(&mut self, slot: TimerSlot) -> bool {
        self.slots[slot.idx()].take().is_some()
    }

    pub fn cancel_all(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
    }

    pub fn is_pending(&self, slot: TimerSlot) -> bool {
        self.slots[slot.idx()].is_some()
    }

    pub fn pending_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// `true` while `handle` is still the live timer of its slot.
    pub fn is_current(&self, handle: TimerHandle) -> bool {
        self.slots[handle.slot.idx()]
            .as_ref()
            .is_some_and(|p| p.generation == handle.generation)
    }

    pub fn tick(&mut self, delta: Duration) {
        for pending in self.slots.iter_mut().flatten() {
            pending.timer.tick(delta);
        }
    }

    /// Take the next expired timer, in slot order. Call repeatedly; a timer
    /// cancelled between calls is never returned.
    pub fn next_fired(&mut self) -> Option<TimerHandle> {
        for slot in TimerSlot::ALL {
            let fired = self.slots[slot.idx()]
                .as_ref()
                .is_some_and(|p| p.timer.finished());
            if fired {
                let pending = self.slots[slot.idx()].take()?;
                return Some(TimerHandle {
                    slot,
                    generation: pending.generation,
                });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn fires_once_after_delay() {
        let mut t = FishingTimers::default();
        t.schedule(TimerSlot::Bite, ms(100));
        t.tick(ms(60));
        assert_eq!(t.next_fired(), None);
        t.tick(ms(60));
        let fired = t.next_fired().unwrap();
        assert_eq!(fired.slot, TimerSlot::Bite);
        assert_eq!(t.next_fired(), None);
        assert!(!t.is_pending(TimerSlot::Bite));
    }

    #[test]
    fn rescheduling_replaces_the_old_timer() {
        let mut t = FishingTimers::default();
        let old = t.schedule(TimerSlot::Settle, ms(100));
        t.tick(ms(90));
        let new = t.schedule(TimerSlot::Settle, ms(100));
        assert!(!t.is_current(old));
        assert!(t.is_current(new));
        t.tick(ms(20));
        assert_eq!(t.next_fired(), None);
        t.tick(ms(90));
        assert_eq!(t.next_fired(), Some(new));
    }

    #[test]
    fn cancel_all_drops_expired_timers_too() {
        let mut t = FishingTimers::default();
        t.schedule(TimerSlot::BiteWindow, ms(10));
        t.schedule(TimerSlot::Reel, ms(10));
        t.tick(ms(50));
        let first = t.next_fired().unwrap();
        assert_eq!(first.slot, TimerSlot::BiteWindow);
        t.cancel_all();
        assert_eq!(t.next_fired(), None);
        assert_eq!(t.pending_count(), 0);
        assert!(!t.is_current(first));
    }

    #[test]
    fn cancel_single_slot() {
        let mut t = FishingTimers::default();
        t.schedule(TimerSlot::Launch, ms(10));
        t.schedule(TimerSlot::Bite, ms(10));
        assert!(t.cancel(TimerSlot::Launch));
        assert!(!t.cancel(TimerSlot::Launch));
        t.tick(ms(20));
        assert_eq!(t.next_fired().map(|h| h.slot), Some(TimerSlot::Bite));
    }

    #[test]
    fn zero_delay_fires_on_first_tick() {
        let mut t = FishingTimers::default();
        t.schedule(TimerSlot::CatchDisplay, Duration::ZERO);
        t.tick(Duration::ZERO);
        assert!(t.next_fired().is_some());
    }
}
