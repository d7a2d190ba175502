//! Hostage-ride behaviour applied when the riding character aims a weapon.
//!
//! Occupants are always locked in before the driver's task changes so there
//! is no window in which a passenger can leave during the reassignment.
use serde::{Deserialize, Serialize};

use crate::constants::{COERCED_AGGRESSIVENESS, COERCED_DRIVE_SPEED};
use crate::flags::{CombatAttributes, DrivingStyle, FleeAttributes};
use crate::world::{DecisionProfile, PedId, Reaction, VehicleId, WorldCommands, WorldQuery};

/// Task handed to a coerced driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverOrder {
    ToWaypoint,
    Cruise,
}

/// What a coercion pass changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CoercionReport {
    pub occupants_threatened: usize,
    pub driver: Option<PedId>,
    pub order: Option<DriverOrder>,
}

pub struct OccupantCoercion;

impl OccupantCoercion {
    /// Threaten every occupant other than `actor`, then take over the driver.
    pub fn coerce<W: WorldQuery + WorldCommands + ?Sized>(
        world: &mut W,
        vehicle: VehicleId,
        actor: PedId,
    ) -> CoercionReport {
        let occupants_threatened = Self::threaten_occupants(world, vehicle, actor);
        let mut report = CoercionReport {
            occupants_threatened,
            ..CoercionReport::default()
        };
        if let Some(driver) = world.driver(vehicle)
            && Self::is_coercible_driver(world, driver, actor)
        {
            report.order = Self::redirect_driver(world, driver, actor);
            Self::make_driver_reckless(world, driver);
            report.driver = Some(driver);
        }
        report
    }

    /// Frighten every occupant except `actor` and forbid them from leaving.
    /// Returns how many occupants were affected.
    pub fn threaten_occupants<W: WorldQuery + WorldCommands + ?Sized>(
        world: &mut W,
        vehicle: VehicleId,
        actor: PedId,
    ) -> usize {
        let mut threatened = 0;
        for ped in world.occupants(vehicle) {
            if ped == actor {
                continue;
            }
            world.play_reaction(ped, Reaction::Frightened);
            world.set_flee_attributes(ped, FleeAttributes::hostage(), true);
            threatened += 1;
        }
        if threatened > 0 {
            log::info!("threatened {threatened} occupant(s) of {vehicle}");
        }
        threatened
    }

    /// Replace the driver's task with a reckless run to the waypoint, or an
    /// open-ended cruise when no waypoint is set. Returns `None` when the
    /// driver cannot be coerced.
    pub fn redirect_driver<W: WorldQuery + WorldCommands + ?Sized>(
        world: &mut W,
        driver: PedId,
        actor: PedId,
    ) -> Option<DriverOrder> {
        if !Self::is_coercible_driver(world, driver, actor) {
            return None;
        }
        let vehicle = world.ped_vehicle(driver)?;
        let style = DrivingStyle::reckless();

        world.play_reaction(driver, Reaction::Frightened);
        world.clear_tasks(driver);
        let order = if let Some(waypoint) = world.waypoint() {
            world.drive_to(driver, vehicle, waypoint, COERCED_DRIVE_SPEED, style);
            DriverOrder::ToWaypoint
        } else {
            world.cruise(driver, vehicle, COERCED_DRIVE_SPEED, style);
            DriverOrder::Cruise
        };
        log::info!("driver {driver} redirected: {order:?}");
        Some(order)
    }

    /// Standing modification of the driver entity; persists until the host clears it.
    pub fn make_driver_reckless<W: WorldCommands + ?Sized>(world: &mut W, driver: PedId) {
        world.set_driving_style(driver, DrivingStyle::reckless());
        world.set_agitated(driver, true);
        world.set_flee_attributes(driver, FleeAttributes::USE_VEHICLE, true);
        world.set_combat_attributes(driver, CombatAttributes::FLEE_WHILST_IN_VEHICLE, true);
        world.set_driving_aggressiveness(driver, COERCED_AGGRESSIVENESS);
        world.set_driving_speed(driver, COERCED_DRIVE_SPEED, COERCED_DRIVE_SPEED);
        world.set_decision_profile(driver, DecisionProfile::Gang);
        world.set_targetable(driver, true);
        log::info!("driver {driver} became reckless");
    }

    fn is_coercible_driver<W: WorldQuery + ?Sized>(world: &W, driver: PedId, actor: PedId) -> bool {
        driver != actor && world.ped_exists(driver) && world.ped_is_alive(driver)
    }
}
