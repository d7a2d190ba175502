//! Passive re-validation performed on every tick.
use super::{
    InteractionStateMachine, ModState, apply_knock_off_policy, elapsed, knock_off_policy_for,
};
use crate::notice::{Notice, Notifier};
use crate::world::{HostWorld, VehicleId};

impl InteractionStateMachine {
    /// Detached has no periodic work unless vehicle adoption is enabled, in
    /// which case a vehicle the character already occupies is picked up.
    pub(super) fn scan_detached<W, N>(&mut self, world: &mut W, notifier: &mut N) -> ModState
    where
        W: HostWorld,
        N: Notifier + ?Sized,
    {
        if !self.config.parameters.adopt_occupied_vehicle {
            return ModState::Detached;
        }
        if elapsed(world, self.last_detached_scan) < self.config.parameters.detached_scan_period() {
            return ModState::Detached;
        }
        self.last_detached_scan = Some(world.now());

        let player = world.player();
        match world.ped_vehicle(player) {
            Some(vehicle) if world.vehicle_exists(vehicle) => {
                self.notify(notifier, Notice::AdoptedVehicle);
                self.settle_in(world, vehicle)
            }
            _ => {
                self.target_vehicle = None;
                self.seat_layout.clear();
                ModState::Detached
            }
        }
    }

    /// Confirm or abandon a pending entry.
    pub(super) fn check_entry<W, N>(&mut self, world: &mut W, notifier: &mut N) -> ModState
    where
        W: HostWorld,
        N: Notifier + ?Sized,
    {
        let Some(vehicle) = self.target_vehicle else {
            log::warn!("entry pending without a target vehicle");
            return self.reset(world);
        };
        if !world.vehicle_exists(vehicle) || self.has_drifted(world, vehicle) {
            log::warn!("target {vehicle} lost during entry");
            self.notify(notifier, Notice::EntryAbandoned);
            return self.reset(world);
        }

        let player = world.player();
        if world.ped_is_in_vehicle(player, vehicle) {
            self.notify(notifier, Notice::Entered);
            return self.settle_in(world, vehicle);
        }

        if elapsed(world, self.last_enter_attempt) > self.config.parameters.entry_timeout() {
            log::warn!("timed out entering {vehicle}");
            self.notify(notifier, Notice::EntryTimedOut);
            return self.reset(world);
        }
        ModState::AttemptingEnter
    }

    /// Seated: react to an explicit exit at once, otherwise re-check occupancy
    /// at most once per validation period.
    pub(super) fn validate_seated<W, N>(&mut self, world: &mut W, notifier: &mut N) -> ModState
    where
        W: HostWorld,
        N: Notifier + ?Sized,
    {
        if world.exit_control_active() {
            self.notify(notifier, Notice::ActivelyExited);
            return self.reset(world);
        }
        let Some(vehicle) = self.target_vehicle else {
            log::warn!("seated without a target vehicle");
            return self.reset(world);
        };
        if !world.vehicle_exists(vehicle) {
            log::warn!("target {vehicle} no longer exists");
            self.notify(notifier, Notice::PassivelyExited);
            return self.reset(world);
        }

        if elapsed(world, self.last_passive_check) <= self.config.parameters.validation_period() {
            return ModState::Seated;
        }
        self.last_passive_check = Some(world.now());

        let player = world.player();
        if !world.ped_is_in_vehicle(player, vehicle) {
            self.notify(notifier, Notice::PassivelyExited);
            return self.reset(world);
        }
        let policy = knock_off_policy_for(world, vehicle, world.ped_seat(player));
        apply_knock_off_policy(world, policy);
        ModState::Seated
    }

    fn has_drifted<W: HostWorld>(&self, world: &W, vehicle: VehicleId) -> bool {
        let player = world.player();
        match (world.vehicle_position(vehicle), world.ped_position(player)) {
            (Some(vehicle_at), Some(player_at)) => {
                vehicle_at.distance(player_at) > self.config.parameters.drift_radius()
            }
            _ => true,
        }
    }
}
