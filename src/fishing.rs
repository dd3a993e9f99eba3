//! the fishing interaction: cast, wait, bite, reel, land
//!
//! The machine is frame-driven. Every call to [`FishingStateMachine::update`]
//! ticks the owned timers, applies the input edges, fires due timers and then
//! watches the hook while it is in flight. Any failure along the way resets
//! the rod to `Idle`; nothing here is fatal.
use std::fmt;
use std::time::Duration;

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::catch::{determine_caught_item, CaughtItem};
use crate::config::FishingConfig;
use crate::error::WorldResult;
use crate::hook::{plan_cast, rod_tip, CastPlan, Facing, Hook, HookPhysics};
use crate::population::{FishPopulation, ZoneType};
use crate::timers::{FishingTimers, TimerSlot};
use crate::water::WaterQuery;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FishingState {
    #[default]
    Idle,
    Casting,
    WaitingForBite,
    Bite,
    Reeling,
    Caught,
}

impl fmt::Display for FishingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One frame of input. Buttons are edges: `true` only on the press frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInput {
    pub delta: Duration,
    pub player: Vec2,
    pub facing: Facing,
    pub cast: bool,
    pub reel: bool,
    pub retract: bool,
    /// Pointer in world space; `None` when it is outside the window.
    pub pointer: Option<Vec2>,
}

/// Side effects of a frame, in the order they happened.
#[derive(Clone, Debug, PartialEq)]
pub enum FishingEvent {
    CastStarted(CastPlan),
    HookLaunched { origin: Vec2, velocity: Vec2 },
    HookLanded { position: Vec2, zone: Option<ZoneType> },
    BiteStarted { position: Vec2 },
    ReelStarted,
    Caught(CaughtItem),
    FishEscaped,
    AutoRetracted,
    Reset,
}

/// How the last attempt ended.
#[derive(Clone, Debug, PartialEq)]
pub enum FishingOutcome {
    Landed(CaughtItem),
    Escaped,
    Retracted,
    AutoRetracted,
    Failed(String),
}

pub type CatchCallback = Box<dyn FnMut(&CaughtItem) + Send + Sync>;

pub struct FishingStateMachine {
    cfg: FishingConfig,
    state: FishingState,
    timers: FishingTimers,
    rng: StdRng,
    hook: Hook,
    pending_cast: Option<CastPlan>,
    /// time the hook has been airborne this cast
    flight: Duration,
    last_hook_position: Option<Vec2>,
    population: Option<FishPopulation>,
    pending_catch: Option<CaughtItem>,
    on_catch: Option<CatchCallback>,
    last_outcome: Option<FishingOutcome>,
}

impl fmt::Debug for FishingStateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FishingStateMachine")
            .field("state", &self.state)
            .field("hook", &self.hook)
            .field("last_outcome", &self.last_outcome)
            .finish_non_exhaustive()
    }
}

impl FishingStateMachine {
    pub fn new(cfg: FishingConfig, seed: u64) -> Self {
        Self {
            cfg,
            state: FishingState::Idle,
            timers: FishingTimers::default(),
            rng: StdRng::seed_from_u64(seed),
            hook: Hook::default(),
            pending_cast: None,
            flight: Duration::ZERO,
            last_hook_position: None,
            population: None,
            pending_catch: None,
            on_catch: None,
            last_outcome: None,
        }
    }

    /// Register the single catch listener; replaces any previous one.
    pub fn on_catch(&mut self, callback: CatchCallback) {
        self.on_catch = Some(callback);
    }

    pub fn state(&self) -> FishingState {
        self.state
    }

    pub fn hook(&self) -> &Hook {
        &self.hook
    }

    /// Last observed hook position while it is out.
    pub fn hook_position(&self) -> Option<Vec2> {
        self.hook.active.then_some(self.hook.position)
    }

    pub fn config(&self) -> &FishingConfig {
        &self.cfg
    }

    pub fn auto_retract_enabled(&self) -> bool {
        self.cfg.auto_retract_enabled
    }

    pub fn set_auto_retract(&mut self, enabled: bool) {
        self.cfg.auto_retract_enabled = enabled;
        if !enabled {
            self.timers.cancel(TimerSlot::Settle);
        }
    }

    pub fn last_outcome(&self) -> Option<&FishingOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn timers(&self) -> &FishingTimers {
        &self.timers
    }

    /// Advance one frame.
    pub fn update(
        &mut self,
        frame: &FrameInput,
        water: &dyn WaterQuery,
        hook: &mut dyn HookPhysics,
    ) -> Vec<FishingEvent> {
        let mut events = Vec::new();
        if let Err(err) = self.step(frame, water, hook, &mut events) {
            error!("fishing failed in {}: {err}; resetting", self.state);
            self.last_outcome = Some(FishingOutcome::Failed(err.to_string()));
            self.reset(hook, &mut events);
        }
        events
    }

    /// Back to `Idle`: every timer cancelled, hook hidden, per-cast state cleared.
    pub fn reset(&mut self, hook: &mut dyn HookPhysics, events: &mut Vec<FishingEvent>) {
        self.timers.cancel_all();
        if self.hook.active {
            if let Err(err) = hook.deactivate() {
                warn!("hook did not deactivate cleanly: {err}");
            }
        }
        self.hook = Hook::default();
        self.pending_cast = None;
        self.flight = Duration::ZERO;
        self.last_hook_position = None;
        self.population = None;
        self.pending_catch = None;
        self.transition(FishingState::Idle);
        events.push(FishingEvent::Reset);
    }

    fn transition(&mut self, next: FishingState) {
        if self.state != next {
            debug!("fishing {} -> {}", self.state, next);
            self.state = next;
        }
    }

    fn step(
        &mut self,
        frame: &FrameInput,
        water: &dyn WaterQuery,
        hook: &mut dyn HookPhysics,
        events: &mut Vec<FishingEvent>,
    ) -> WorldResult<()> {
        self.timers.tick(frame.delta);
        if self.state == FishingState::Casting && self.hook.active {
            self.flight += frame.delta;
        }

        self.handle_input(frame, hook, events);
        if self.state == FishingState::Idle && events.last() == Some(&FishingEvent::Reset) {
            return Ok(());
        }

        while let Some(fired) = self.timers.next_fired() {
            self.on_timer(fired.slot, water, hook, events)?;
        }

        if self.state == FishingState::Casting && self.hook.active {
            self.track_hook(water, hook, events)?;
        }
        Ok(())
    }

    fn handle_input(
        &mut self,
        frame: &FrameInput,
        hook: &mut dyn HookPhysics,
        events: &mut Vec<FishingEvent>,
    ) {
        match self.state {
            FishingState::Idle if frame.cast => {
                let tip = rod_tip(frame.player, frame.facing, &self.cfg);
                // no pointer: lob half a cast the way the angler faces
                let pointer = frame.pointer.unwrap_or_else(|| {
                    let dir = Vec2::new(frame.facing.sign(), self.cfg.fallback_upward).normalize();
                    tip + dir * self.cfg.max_cast_distance * 0.5
                });
                let plan = plan_cast(tip, pointer, frame.facing, &self.cfg);
                self.pending_cast = Some(plan);
                self.timers.schedule(TimerSlot::Launch, self.cfg.cast_sync_delay);
                self.transition(FishingState::Casting);
                events.push(FishingEvent::CastStarted(plan));
            }
            FishingState::Bite if frame.reel => {
                self.timers.cancel(TimerSlot::BiteWindow);
                self.timers.schedule(TimerSlot::Reel, self.cfg.reel_duration);
                self.transition(FishingState::Reeling);
                events.push(FishingEvent::ReelStarted);
            }
            FishingState::Casting | FishingState::WaitingForBite if frame.retract => {
                self.last_outcome = Some(FishingOutcome::Retracted);
                self.reset(hook, events);
            }
            _ => {}
        }
    }

    fn on_timer(
        &mut self,
        slot: TimerSlot,
        water: &dyn WaterQuery,
        hook: &mut dyn HookPhysics,
        events: &mut Vec<FishingEvent>,
    ) -> WorldResult<()> {
        match (slot, self.state) {
            (TimerSlot::Launch, FishingState::Casting) => {
                let Some(plan) = self.pending_cast.take() else {
                    return Ok(());
                };
                hook.launch(plan.origin, plan.velocity)?;
                self.hook = Hook {
                    position: plan.origin,
                    velocity: plan.velocity,
                    active: true,
                    grounded: false,
                };
                self.flight = Duration::ZERO;
                self.last_hook_position = Some(plan.origin);
                events.push(FishingEvent::HookLaunched {
                    origin: plan.origin,
                    velocity: plan.velocity,
                });
            }
            (TimerSlot::Settle, FishingState::Casting) => {
                let position = hook.position()?;
                if hook.is_touching_ground()? && !water.is_in_water(position) {
                    debug!("hook settled on dry ground at {position}");
                    self.last_outcome = Some(FishingOutcome::AutoRetracted);
                    events.push(FishingEvent::AutoRetracted);
                    self.reset(hook, events);
                }
            }
            (TimerSlot::Bite, FishingState::WaitingForBite) => {
                self.timers.schedule(TimerSlot::BiteWindow, self.cfg.bite_window);
                self.transition(FishingState::Bite);
                events.push(FishingEvent::BiteStarted {
                    position: self.hook.position,
                });
            }
            (TimerSlot::BiteWindow, FishingState::Bite) => {
                debug!("fish escaped");
                self.last_outcome = Some(FishingOutcome::Escaped);
                events.push(FishingEvent::FishEscaped);
                self.reset(hook, events);
            }
            (TimerSlot::Reel, FishingState::Reeling) => {
                let item = determine_caught_item(
                    &mut self.rng,
                    self.population.as_ref(),
                    &self.cfg.odds,
                );
                self.timers.schedule(TimerSlot::CatchDisplay, self.cfg.catch_display);
                self.pending_catch = Some(item.clone());
                self.transition(FishingState::Caught);
                events.push(FishingEvent::Caught(item));
            }
            (TimerSlot::CatchDisplay, FishingState::Caught) => {
                if let Some(item) = self.pending_catch.take() {
                    info!("caught {} ({})", item.item_type, item.category);
                    if let Some(callback) = self.on_catch.as_mut() {
                        callback(&item);
                    }
                    self.last_outcome = Some(FishingOutcome::Landed(item));
                }
                self.reset(hook, events);
            }
            (slot, state) => debug!("dropping {slot:?} timer in {state}"),
        }
        Ok(())
    }

    fn track_hook(
        &mut self,
        water: &dyn WaterQuery,
        hook: &mut dyn HookPhysics,
        events: &mut Vec<FishingEvent>,
    ) -> WorldResult<()> {
        let position = hook.position()?;
        let grounded = hook.is_touching_ground()?;
        let moved = self
            .last_hook_position
            .map_or(f32::INFINITY, |last| last.distance(position));
        self.hook.velocity = position - self.hook.position;
        self.hook.position = position;
        self.hook.grounded = grounded;
        self.last_hook_position = Some(position);

        if water.is_in_water(position) {
            hook.hold()?;
            self.hook.velocity = Vec2::ZERO;
            let zone = water.water_type_at(position);
            self.population = water.fish_population_at(position).cloned();
            self.timers.cancel(TimerSlot::Settle);
            let delay = self.sample_bite_delay();
            self.timers.schedule(TimerSlot::Bite, delay);
            self.transition(FishingState::WaitingForBite);
            events.push(FishingEvent::HookLanded { position, zone });
            return Ok(());
        }

        if !self.cfg.auto_retract_enabled || self.flight < self.cfg.settle_grace {
            self.timers.cancel(TimerSlot::Settle);
            return Ok(());
        }
        if grounded && moved < self.cfg.settle_movement_threshold {
            if !self.timers.is_pending(TimerSlot::Settle) {
                self.timers.schedule(TimerSlot::Settle, self.cfg.settle_delay);
            }
        } else {
            self.timers.cancel(TimerSlot::Settle);
        }
        Ok(())
    }

    fn sample_bite_delay(&mut self) -> Duration {
        let min = self.cfg.bite_delay_min.as_millis() as u64;
        let max = self.cfg.bite_delay_max.as_millis() as u64;
        Duration::from_millis(self.rng.gen_range(min..=max))
    }
}
