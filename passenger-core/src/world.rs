//! Capability surface the host engine exposes to the passenger core.
//!
//! The engine binding and the in-memory [`crate::sim::SimWorld`] both
//! implement these traits; the core never talks to the engine any other way.
use glam::Vec3;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::time::Duration;

use crate::clock::Clock;
use crate::flags::{CombatAttributes, DrivingStyle, EnterVehicleFlags, FleeAttributes};
use crate::seat::{MAX_SEATS, Seat};

/// Opaque handle to a ped. Validity is always re-checked through the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PedId(pub u32);

/// Opaque handle to a vehicle. Holding one does not keep the vehicle alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleId(pub u32);

impl fmt::Display for PedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ped#{}", self.0)
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vehicle#{}", self.0)
    }
}

/// Inline list of vehicle occupants.
pub type Occupants = SmallVec<[PedId; MAX_SEATS]>;

/// On-foot locomotion of a ped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementState {
    #[default]
    Still,
    Walking,
    Running,
    Sprinting,
}

impl MovementState {
    #[must_use]
    pub const fn is_hurrying(self) -> bool {
        matches!(self, Self::Running | Self::Sprinting)
    }
}

/// Approach speed for an enter-vehicle task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveSpeed {
    Walk,
    Run,
}

impl MoveSpeed {
    #[must_use]
    pub const fn for_movement(movement: MovementState) -> Self {
        if movement.is_hurrying() {
            Self::Run
        } else {
            Self::Walk
        }
    }
}

/// Whether the host may knock a ped off an exposed vehicle seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnockOffPolicy {
    #[default]
    Default,
    Never,
}

/// Ambient reaction played on a ped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reaction {
    /// Shouted, critical fright.
    Frightened,
}

/// Decision-making profile assigned to a ped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionProfile {
    #[default]
    Default,
    Gang,
}

/// Parameters of an enter-vehicle task.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnterVehicleTask {
    pub vehicle: VehicleId,
    pub seat: Seat,
    /// `None` lets the task run until cancelled.
    pub timeout: Option<Duration>,
    pub speed: MoveSpeed,
    pub flags: EnterVehicleFlags,
}

/// Read-only queries against the simulated world.
pub trait WorldQuery {
    /// The character the player controls.
    fn player(&self) -> PedId;

    fn ped_exists(&self, ped: PedId) -> bool;
    fn ped_is_alive(&self, ped: PedId) -> bool;
    fn ped_position(&self, ped: PedId) -> Option<Vec3>;
    fn ped_vehicle(&self, ped: PedId) -> Option<VehicleId>;
    fn ped_seat(&self, ped: PedId) -> Option<Seat>;
    fn ped_is_aiming(&self, ped: PedId) -> bool;
    fn ped_movement(&self, ped: PedId) -> MovementState;
    fn ped_knock_off_policy(&self, ped: PedId) -> KnockOffPolicy;

    /// Exit-vehicle control was just pressed or is being held.
    fn exit_control_active(&self) -> bool;

    fn closest_vehicle(&self, point: Vec3, radius: f32) -> Option<VehicleId>;
    fn vehicle_exists(&self, vehicle: VehicleId) -> bool;
    fn vehicle_position(&self, vehicle: VehicleId) -> Option<Vec3>;
    /// Seats excluding the driver.
    fn passenger_capacity(&self, vehicle: VehicleId) -> u8;
    fn vehicle_is_motorcycle(&self, vehicle: VehicleId) -> bool;
    fn is_seat_free(&self, vehicle: VehicleId, seat: Seat) -> bool;
    fn occupants(&self, vehicle: VehicleId) -> Occupants;
    fn driver(&self, vehicle: VehicleId) -> Option<PedId>;

    /// World position of a named anchor on the vehicle model.
    fn anchor_position(&self, vehicle: VehicleId, anchor: &str) -> Option<Vec3>;
    /// Offset of a named anchor from the vehicle's reference point, in the vehicle's frame.
    fn anchor_offset(&self, vehicle: VehicleId, anchor: &str) -> Option<Vec3>;

    /// Active navigation waypoint, if one is set.
    fn waypoint(&self) -> Option<Vec3>;

    /// Ped is inside `vehicle` (any seat).
    fn ped_is_in_vehicle(&self, ped: PedId, vehicle: VehicleId) -> bool {
        self.ped_vehicle(ped) == Some(vehicle)
    }
}

/// Commands issued to world entities. All are fire-and-forget.
pub trait WorldCommands {
    fn enter_vehicle(&mut self, ped: PedId, task: EnterVehicleTask);
    fn warp_into_vehicle(&mut self, ped: PedId, vehicle: VehicleId, seat: Seat);
    fn drive_to(
        &mut self,
        ped: PedId,
        vehicle: VehicleId,
        target: Vec3,
        speed: f32,
        style: DrivingStyle,
    );
    fn cruise(&mut self, ped: PedId, vehicle: VehicleId, speed: f32, style: DrivingStyle);
    fn clear_tasks(&mut self, ped: PedId);

    fn set_knock_off_policy(&mut self, ped: PedId, policy: KnockOffPolicy);
    fn play_reaction(&mut self, ped: PedId, reaction: Reaction);
    fn set_flee_attributes(&mut self, ped: PedId, attributes: FleeAttributes, enabled: bool);
    fn set_combat_attributes(&mut self, ped: PedId, attributes: CombatAttributes, enabled: bool);
    fn set_driving_style(&mut self, ped: PedId, style: DrivingStyle);
    fn set_agitated(&mut self, ped: PedId, agitated: bool);
    fn set_driving_aggressiveness(&mut self, ped: PedId, aggressiveness: f32);
    fn set_driving_speed(&mut self, ped: PedId, cruise: f32, max: f32);
    fn set_decision_profile(&mut self, ped: PedId, profile: DecisionProfile);
    fn set_targetable(&mut self, ped: PedId, targetable: bool);
}

/// Everything the state machine needs from its host.
pub trait HostWorld: WorldQuery + WorldCommands + Clock {}

impl<T> HostWorld for T where T: WorldQuery + WorldCommands + Clock {}
