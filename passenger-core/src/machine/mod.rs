//! Passenger lifecycle: detached, attempting to enter, seated.
//!
//! Two entry points drive the machine from a single host thread: [`tick`]
//! on a fixed interval for passive re-validation, and [`handle_intent`] on the
//! interaction key for active transitions. Every failure path funnels through
//! [`InteractionStateMachine::reset`] and lands in [`ModState::Detached`].
//!
//! [`tick`]: InteractionStateMachine::tick
//! [`handle_intent`]: InteractionStateMachine::handle_intent
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::clock::{Clock, Timestamp, elapsed_since};
use crate::config::PassengerConfig;
use crate::finder::VehicleSeatFinder;
use crate::notice::{Notice, Notifier, emit};
use crate::seat::Seat;
use crate::seat_layout::SeatLayout;
use crate::world::{HostWorld, KnockOffPolicy, VehicleId, WorldCommands, WorldQuery};

mod intent;
pub mod snapshot;
mod tick;

pub use snapshot::DiagnosticSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModState {
    /// Not attempting or holding a seat.
    #[default]
    Detached,
    /// Enter task issued, awaiting confirmation.
    AttemptingEnter,
    /// Confirmed in a seat of the target vehicle.
    Seated,
}

impl ModState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Detached => "detached",
            Self::AttemptingEnter => "attempting_enter",
            Self::Seated => "seated",
        }
    }
}

impl fmt::Display for ModState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session context and transition logic for the controlled character.
#[derive(Debug, Clone)]
pub struct InteractionStateMachine {
    config: PassengerConfig,
    state: ModState,
    target_vehicle: Option<VehicleId>,
    last_passive_check: Option<Timestamp>,
    last_enter_attempt: Option<Timestamp>,
    last_detached_scan: Option<Timestamp>,
    seat_layout: SeatLayout,
}

impl InteractionStateMachine {
    #[must_use]
    pub fn new(config: PassengerConfig) -> Self {
        Self {
            config,
            state: ModState::Detached,
            target_vehicle: None,
            last_passive_check: None,
            last_enter_attempt: None,
            last_detached_scan: None,
            seat_layout: SeatLayout::default(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> ModState {
        self.state
    }

    #[must_use]
    pub const fn target_vehicle(&self) -> Option<VehicleId> {
        self.target_vehicle
    }

    #[must_use]
    pub const fn seat_layout(&self) -> &SeatLayout {
        &self.seat_layout
    }

    #[must_use]
    pub const fn config(&self) -> &PassengerConfig {
        &self.config
    }

    /// Periodic entry point. Returns the state after re-validation.
    pub fn tick<W, N>(&mut self, world: &mut W, notifier: &mut N) -> ModState
    where
        W: HostWorld,
        N: Notifier + ?Sized,
    {
        let next = match self.state {
            ModState::Detached => self.scan_detached(world, notifier),
            ModState::AttemptingEnter => self.check_entry(world, notifier),
            ModState::Seated => self.validate_seated(world, notifier),
        };
        self.transition(next)
    }

    /// Interaction-key entry point. Ignored while an entry is pending.
    pub fn handle_intent<W, N>(&mut self, world: &mut W, notifier: &mut N) -> ModState
    where
        W: HostWorld,
        N: Notifier + ?Sized,
    {
        let next = match self.state {
            ModState::Detached => self.request_ride(world, notifier),
            ModState::Seated => self.interact_seated(world, notifier),
            ModState::AttemptingEnter => return self.state,
        };
        self.transition(next)
    }

    /// Free seat of the current vehicle nearest to a point in the vehicle's
    /// horizontal frame, answered from the seat layout cache.
    #[must_use]
    pub fn nearest_free_seat<W: WorldQuery + ?Sized>(
        &self,
        world: &W,
        local_point: Vec2,
    ) -> Option<Seat> {
        let vehicle = self.target_vehicle.filter(|_| self.state == ModState::Seated)?;
        let free = VehicleSeatFinder::all_free_seats(world, vehicle);
        self.seat_layout.closest_seat(&free, local_point)
    }

    /// Shared failure path: drop the target, discard the seat cache, cancel the
    /// character's tasks and restart the passive-validation window. The entry
    /// timer is left untouched.
    pub fn reset<W: HostWorld>(&mut self, world: &mut W) -> ModState {
        if let Some(vehicle) = self.target_vehicle.take() {
            log::debug!("releasing target {vehicle}");
        }
        self.seat_layout.clear();
        let player = world.player();
        world.set_knock_off_policy(player, KnockOffPolicy::Default);
        world.clear_tasks(player);
        self.last_passive_check = Some(world.now());
        self.state = ModState::Detached;
        ModState::Detached
    }

    fn transition(&mut self, next: ModState) -> ModState {
        if next != self.state {
            log::debug!("passenger state {} -> {}", self.state, next);
        }
        self.state = next;
        debug_assert!(
            self.state == ModState::Detached || self.target_vehicle.is_some(),
            "non-detached state without a target vehicle"
        );
        debug_assert!(
            self.state == ModState::Seated || self.seat_layout.is_empty(),
            "seat layout cached outside the seated state"
        );
        next
    }

    /// Become seated in `vehicle`, building the seat layout cache and applying
    /// the knocked-off policy for whichever seat the player ended up in.
    fn settle_in<W: WorldQuery + WorldCommands + ?Sized>(
        &mut self,
        world: &mut W,
        vehicle: VehicleId,
    ) -> ModState {
        self.target_vehicle = Some(vehicle);
        self.seat_layout = SeatLayout::build(world, vehicle);
        let policy = knock_off_policy_for(world, vehicle, world.ped_seat(world.player()));
        apply_knock_off_policy(world, policy);
        self.state = ModState::Seated;
        ModState::Seated
    }

    fn notify<N: Notifier + ?Sized>(&self, notifier: &mut N, notice: Notice) {
        emit(notifier, self.config.settings.verbosity, notice);
    }
}

/// Knocked-off policy a seat calls for: motorcycle pillions must never be
/// thrown off, everyone else keeps the host default.
#[must_use]
pub fn knock_off_policy_for<W: WorldQuery + ?Sized>(
    world: &W,
    vehicle: VehicleId,
    seat: Option<Seat>,
) -> KnockOffPolicy {
    match seat {
        Some(seat) if world.vehicle_is_motorcycle(vehicle) && !seat.is_driver() => {
            KnockOffPolicy::Never
        }
        _ => KnockOffPolicy::Default,
    }
}

fn apply_knock_off_policy<W: WorldQuery + WorldCommands + ?Sized>(
    world: &mut W,
    policy: KnockOffPolicy,
) {
    let player = world.player();
    if world.ped_knock_off_policy(player) != policy {
        world.set_knock_off_policy(player, policy);
    }
}

fn elapsed<W: Clock + ?Sized>(world: &W, mark: Option<Timestamp>) -> Duration {
    elapsed_since(world.now(), mark)
}
