//! Flag sets passed through to host entity commands.
use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    /// Options for an enter-vehicle task.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct EnterVehicleFlags: u32 {
        /// Never pull an occupant out of the requested seat.
        const DONT_JACK_ANYONE = 1 << 0;
    }
}

bitflags::bitflags! {
    /// Traversal style applied to an autonomous driver.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct DrivingStyle: u32 {
        const SWERVE_AROUND_ALL_VEHICLES = 1 << 2;
        const STEER_AROUND_STATIONARY_VEHICLES = 1 << 3;
        const STEER_AROUND_PEDS = 1 << 4;
        const STEER_AROUND_OBJECTS = 1 << 5;
        const DONT_STEER_AROUND_PLAYER_PED = 1 << 6;
        const GO_OFF_ROAD_WHEN_AVOIDING = 1 << 8;
        const USE_SHORT_CUT_LINKS = 1 << 18;
        const CHANGE_LANES_AROUND_OBSTRUCTIONS = 1 << 19;
        const STOP_AT_DESTINATION = 1 << 24;
    }
}

impl DrivingStyle {
    /// Style used by a coerced driver. Obstacles are avoided by any means
    /// except slowing down, and the rider is never treated as one.
    #[must_use]
    pub const fn reckless() -> Self {
        Self::SWERVE_AROUND_ALL_VEHICLES
            .union(Self::STEER_AROUND_STATIONARY_VEHICLES)
            .union(Self::STEER_AROUND_PEDS)
            .union(Self::STEER_AROUND_OBJECTS)
            .union(Self::DONT_STEER_AROUND_PLAYER_PED)
            .union(Self::GO_OFF_ROAD_WHEN_AVOIDING)
            .union(Self::USE_SHORT_CUT_LINKS)
            .union(Self::CHANGE_LANES_AROUND_OBSTRUCTIONS)
            .union(Self::STOP_AT_DESTINATION)
    }
}

bitflags::bitflags! {
    /// Flee behaviour toggles on a ped.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct FleeAttributes: u32 {
        const USE_VEHICLE = 1 << 1;
        const CAN_SCREAM = 1 << 2;
        const DISABLE_EXIT_VEHICLE = 1 << 6;
    }
}

impl FleeAttributes {
    /// Occupant held hostage: may scream, may not leave the vehicle.
    #[must_use]
    pub const fn hostage() -> Self {
        Self::CAN_SCREAM.union(Self::DISABLE_EXIT_VEHICLE)
    }
}

bitflags::bitflags! {
    /// Combat behaviour toggles on a ped.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct CombatAttributes: u32 {
        const FLEE_WHILST_IN_VEHICLE = 1 << 14;
    }
}
