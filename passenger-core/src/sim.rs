//! In-memory world used by the scenario tester and the test suites.
//!
//! Vehicles never rotate, so anchor positions are the vehicle position plus
//! the anchor offset. Every command is appended to an ordered log.
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use crate::clock::{Clock, ManualClock, Timestamp};
use crate::flags::{CombatAttributes, DrivingStyle, EnterVehicleFlags, FleeAttributes};
use crate::seat::{MAX_SEATS, Seat};
use crate::world::{
    DecisionProfile, EnterVehicleTask, KnockOffPolicy, MovementState, Occupants, PedId, Reaction,
    VehicleId, WorldCommands, WorldQuery,
};

const PLAYER: PedId = PedId(0);

#[derive(Debug, Clone, PartialEq)]
pub struct SimVehicle {
    pub position: Vec3,
    pub passenger_capacity: u8,
    pub motorcycle: bool,
    pub exists: bool,
    /// Anchor offsets in the vehicle frame, keyed by anchor name.
    pub anchors: HashMap<String, Vec3>,
    seats: [Option<PedId>; MAX_SEATS],
}

impl SimVehicle {
    /// Vehicle without any known anchors.
    #[must_use]
    pub fn with_capacity(position: Vec3, passenger_capacity: u8) -> Self {
        Self {
            position,
            passenger_capacity: passenger_capacity.min(u8::try_from(MAX_SEATS - 1).unwrap_or(7)),
            motorcycle: false,
            exists: true,
            anchors: HashMap::new(),
            seats: [None; MAX_SEATS],
        }
    }

    /// Four-door car with the standard front and rear seat anchors.
    #[must_use]
    pub fn sedan(position: Vec3) -> Self {
        let mut vehicle = Self::with_capacity(position, 3);
        for (anchor, offset) in [
            ("seat_dside_f", Vec3::new(-0.5, 0.5, 0.4)),
            ("seat_pside_f", Vec3::new(0.5, 0.5, 0.4)),
            ("seat_dside_r", Vec3::new(-0.5, -0.5, 0.4)),
            ("seat_pside_r", Vec3::new(0.5, -0.5, 0.4)),
        ] {
            vehicle.anchors.insert(anchor.to_string(), offset);
        }
        vehicle
    }

    /// Eight-seat coach exposing every anchor in the topology table.
    #[must_use]
    pub fn coach(position: Vec3) -> Self {
        let mut vehicle = Self::sedan(position);
        vehicle.passenger_capacity = 7;
        for (anchor, offset) in [
            ("seat_dside_r1", Vec3::new(-0.5, -1.5, 0.4)),
            ("seat_pside_r1", Vec3::new(0.5, -1.5, 0.4)),
            ("seat_dside_r2", Vec3::new(-0.5, -2.5, 0.4)),
            ("seat_pside_r2", Vec3::new(0.5, -2.5, 0.4)),
        ] {
            vehicle.anchors.insert(anchor.to_string(), offset);
        }
        vehicle
    }

    /// Two-seat bike; its anchors do not follow the car naming.
    #[must_use]
    pub fn motorcycle(position: Vec3) -> Self {
        let mut vehicle = Self::with_capacity(position, 1);
        vehicle.motorcycle = true;
        vehicle
            .anchors
            .insert("seat_f".to_string(), Vec3::new(0.0, 0.2, 0.6));
        vehicle
            .anchors
            .insert("seat_r".to_string(), Vec3::new(0.0, -0.3, 0.7));
        vehicle
    }

    #[must_use]
    pub fn occupant(&self, seat: Seat) -> Option<PedId> {
        self.seats.get(usize::from(seat.ordinal())).copied().flatten()
    }

    fn has_seat(&self, seat: Seat) -> bool {
        seat.ordinal() <= self.passenger_capacity
    }
}

/// Autonomous task currently assigned to a simulated ped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SimTask {
    Enter(EnterVehicleTask),
    DriveTo {
        vehicle: VehicleId,
        target: Vec3,
        style: DrivingStyle,
    },
    Cruise {
        vehicle: VehicleId,
        style: DrivingStyle,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimPed {
    pub position: Vec3,
    pub exists: bool,
    pub alive: bool,
    pub vehicle: Option<VehicleId>,
    pub seat: Option<Seat>,
    pub aiming: bool,
    pub movement: MovementState,
    pub knock_off: KnockOffPolicy,
    pub flee: FleeAttributes,
    pub combat: CombatAttributes,
    pub driving_style: DrivingStyle,
    pub agitated: bool,
    pub aggressiveness: f32,
    pub cruise_speed: f32,
    pub max_speed: f32,
    pub decision: DecisionProfile,
    pub targetable: bool,
    pub task: Option<SimTask>,
}

impl SimPed {
    fn at(position: Vec3) -> Self {
        Self {
            position,
            exists: true,
            alive: true,
            vehicle: None,
            seat: None,
            aiming: false,
            movement: MovementState::Still,
            knock_off: KnockOffPolicy::Default,
            flee: FleeAttributes::empty(),
            combat: CombatAttributes::empty(),
            driving_style: DrivingStyle::empty(),
            agitated: false,
            aggressiveness: 0.5,
            cruise_speed: 10.0,
            max_speed: 20.0,
            decision: DecisionProfile::Default,
            targetable: false,
            task: None,
        }
    }
}

/// One entry of the command log.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum SimCommand {
    EnterVehicle {
        ped: PedId,
        task: EnterVehicleTask,
    },
    Warp {
        ped: PedId,
        vehicle: VehicleId,
        seat: Seat,
    },
    DriveTo {
        ped: PedId,
        vehicle: VehicleId,
        target: Vec3,
    },
    Cruise {
        ped: PedId,
        vehicle: VehicleId,
    },
    ClearTasks {
        ped: PedId,
    },
    SetKnockOff {
        ped: PedId,
        policy: KnockOffPolicy,
    },
    Reaction {
        ped: PedId,
        reaction: Reaction,
    },
    SetFlee {
        ped: PedId,
        attributes: FleeAttributes,
        enabled: bool,
    },
    SetCombat {
        ped: PedId,
        attributes: CombatAttributes,
        enabled: bool,
    },
    SetDrivingStyle {
        ped: PedId,
        style: DrivingStyle,
    },
    SetAgitated {
        ped: PedId,
    },
    SetAggressiveness {
        ped: PedId,
    },
    SetDrivingSpeed {
        ped: PedId,
    },
    SetDecision {
        ped: PedId,
        profile: DecisionProfile,
    },
    SetTargetable {
        ped: PedId,
    },
}

impl SimCommand {
    /// Commands that start a new movement or driving task.
    #[must_use]
    pub const fn is_movement_task(&self) -> bool {
        matches!(
            self,
            Self::EnterVehicle { .. } | Self::Warp { .. } | Self::DriveTo { .. } | Self::Cruise { .. }
        )
    }
}

#[derive(Debug, Clone)]
pub struct SimWorld {
    clock: ManualClock,
    peds: BTreeMap<PedId, SimPed>,
    vehicles: BTreeMap<VehicleId, SimVehicle>,
    waypoint: Option<Vec3>,
    exit_control: bool,
    next_ped: u32,
    next_vehicle: u32,
    log: Vec<SimCommand>,
}

impl SimWorld {
    /// Empty world with the player standing at `player_position`.
    #[must_use]
    pub fn new(player_position: Vec3) -> Self {
        let mut peds = BTreeMap::new();
        peds.insert(PLAYER, SimPed::at(player_position));
        Self {
            clock: ManualClock::starting_at(Timestamp::from_millis(60_000)),
            peds,
            vehicles: BTreeMap::new(),
            waypoint: None,
            exit_control: false,
            next_ped: 1,
            next_vehicle: 1,
            log: Vec::new(),
        }
    }

    pub fn spawn_vehicle(&mut self, vehicle: SimVehicle) -> VehicleId {
        let id = VehicleId(self.next_vehicle);
        self.next_vehicle += 1;
        self.vehicles.insert(id, vehicle);
        id
    }

    pub fn spawn_ped(&mut self, position: Vec3) -> PedId {
        let id = PedId(self.next_ped);
        self.next_ped += 1;
        self.peds.insert(id, SimPed::at(position));
        id
    }

    #[must_use]
    pub fn ped(&self, ped: PedId) -> Option<&SimPed> {
        self.peds.get(&ped)
    }

    pub fn ped_mut(&mut self, ped: PedId) -> Option<&mut SimPed> {
        self.peds.get_mut(&ped)
    }

    #[must_use]
    pub fn vehicle(&self, vehicle: VehicleId) -> Option<&SimVehicle> {
        self.vehicles.get(&vehicle)
    }

    /// Place a ped in a seat, displacing whoever sat there.
    pub fn seat_ped(&mut self, ped: PedId, vehicle: VehicleId, seat: Seat) {
        self.unseat_ped(ped);
        let Some(sim_vehicle) = self.vehicles.get_mut(&vehicle) else {
            return;
        };
        if !sim_vehicle.exists || !sim_vehicle.has_seat(seat) {
            return;
        }
        let slot = usize::from(seat.ordinal());
        let displaced = sim_vehicle.seats[slot].replace(ped);
        let position = sim_vehicle.position;
        if let Some(displaced) = displaced
            && let Some(state) = self.peds.get_mut(&displaced)
        {
            state.vehicle = None;
            state.seat = None;
            state.position = position + Vec3::new(2.0, 0.0, 0.0);
        }
        if let Some(state) = self.peds.get_mut(&ped) {
            state.vehicle = Some(vehicle);
            state.seat = Some(seat);
            state.position = position;
        }
    }

    /// Take a ped out of whatever vehicle it occupies and stand it beside it.
    pub fn unseat_ped(&mut self, ped: PedId) {
        let Some(state) = self.peds.get_mut(&ped) else {
            return;
        };
        let (Some(vehicle), Some(seat)) = (state.vehicle.take(), state.seat.take()) else {
            return;
        };
        if let Some(sim_vehicle) = self.vehicles.get_mut(&vehicle) {
            sim_vehicle.seats[usize::from(seat.ordinal())] = None;
            state.position = sim_vehicle.position + Vec3::new(2.0, 0.0, 0.0);
        }
    }

    /// Remove a vehicle from the world; its occupants are left standing.
    pub fn destroy_vehicle(&mut self, vehicle: VehicleId) {
        let occupants = self.occupants(vehicle);
        for ped in occupants {
            self.unseat_ped(ped);
        }
        if let Some(sim_vehicle) = self.vehicles.get_mut(&vehicle) {
            sim_vehicle.exists = false;
        }
    }

    /// Move a vehicle, carrying its occupants along.
    pub fn move_vehicle(&mut self, vehicle: VehicleId, position: Vec3) {
        let occupants = self.occupants(vehicle);
        if let Some(sim_vehicle) = self.vehicles.get_mut(&vehicle) {
            sim_vehicle.position = position;
        }
        for ped in occupants {
            if let Some(state) = self.peds.get_mut(&ped) {
                state.position = position;
            }
        }
    }

    pub fn move_ped(&mut self, ped: PedId, position: Vec3) {
        if let Some(state) = self.peds.get_mut(&ped) {
            state.position = position;
        }
    }

    pub fn kill_ped(&mut self, ped: PedId) {
        if let Some(state) = self.peds.get_mut(&ped) {
            state.alive = false;
        }
    }

    pub fn set_aiming(&mut self, ped: PedId, aiming: bool) {
        if let Some(state) = self.peds.get_mut(&ped) {
            state.aiming = aiming;
        }
    }

    pub fn set_movement(&mut self, ped: PedId, movement: MovementState) {
        if let Some(state) = self.peds.get_mut(&ped) {
            state.movement = movement;
        }
    }

    pub fn set_exit_control(&mut self, active: bool) {
        self.exit_control = active;
    }

    pub fn set_waypoint(&mut self, waypoint: Option<Vec3>) {
        self.waypoint = waypoint;
    }

    pub fn advance(&self, delta: Duration) {
        self.clock.advance(delta);
    }

    #[must_use]
    pub const fn clock(&self) -> &ManualClock {
        &self.clock
    }

    #[must_use]
    pub fn command_log(&self) -> &[SimCommand] {
        &self.log
    }

    pub fn clear_command_log(&mut self) {
        self.log.clear();
    }

    #[must_use]
    pub fn pending_entry(&self, ped: PedId) -> Option<EnterVehicleTask> {
        match self.peds.get(&ped)?.task {
            Some(SimTask::Enter(task)) => Some(task),
            _ => None,
        }
    }

    /// Complete every pending enter task that can succeed right now.
    ///
    /// A task toward an occupied seat only completes when jacking is allowed.
    /// Returns the peds that were seated.
    pub fn resolve_entries(&mut self) -> Vec<PedId> {
        let pending: Vec<(PedId, EnterVehicleTask)> = self
            .peds
            .iter()
            .filter_map(|(&ped, state)| match state.task {
                Some(SimTask::Enter(task)) if state.alive => Some((ped, task)),
                _ => None,
            })
            .collect();

        let mut seated = Vec::new();
        for (ped, task) in pending {
            let Some(vehicle) = self.vehicles.get(&task.vehicle) else {
                continue;
            };
            if !vehicle.exists || !vehicle.has_seat(task.seat) {
                continue;
            }
            let occupied = vehicle.occupant(task.seat).is_some();
            if occupied && task.flags.contains(EnterVehicleFlags::DONT_JACK_ANYONE) {
                continue;
            }
            self.seat_ped(ped, task.vehicle, task.seat);
            if let Some(state) = self.peds.get_mut(&ped) {
                state.task = None;
            }
            seated.push(ped);
        }
        seated
    }

    fn record(&mut self, command: SimCommand) {
        self.log.push(command);
    }

    fn with_ped(&mut self, ped: PedId, apply: impl FnOnce(&mut SimPed)) {
        if let Some(state) = self.peds.get_mut(&ped) {
            apply(state);
        }
    }
}

impl Clock for SimWorld {
    fn now(&self) -> Timestamp {
        self.clock.now()
    }
}

impl WorldQuery for SimWorld {
    fn player(&self) -> PedId {
        PLAYER
    }

    fn ped_exists(&self, ped: PedId) -> bool {
        self.peds.get(&ped).is_some_and(|state| state.exists)
    }

    fn ped_is_alive(&self, ped: PedId) -> bool {
        self.peds.get(&ped).is_some_and(|state| state.alive)
    }

    fn ped_position(&self, ped: PedId) -> Option<Vec3> {
        self.peds.get(&ped).map(|state| state.position)
    }

    fn ped_vehicle(&self, ped: PedId) -> Option<VehicleId> {
        self.peds.get(&ped)?.vehicle
    }

    fn ped_seat(&self, ped: PedId) -> Option<Seat> {
        self.peds.get(&ped)?.seat
    }

    fn ped_is_aiming(&self, ped: PedId) -> bool {
        self.peds.get(&ped).is_some_and(|state| state.aiming)
    }

    fn ped_movement(&self, ped: PedId) -> MovementState {
        self.peds
            .get(&ped)
            .map_or(MovementState::Still, |state| state.movement)
    }

    fn ped_knock_off_policy(&self, ped: PedId) -> KnockOffPolicy {
        self.peds
            .get(&ped)
            .map_or(KnockOffPolicy::Default, |state| state.knock_off)
    }

    fn exit_control_active(&self) -> bool {
        self.exit_control
    }

    fn closest_vehicle(&self, point: Vec3, radius: f32) -> Option<VehicleId> {
        self.vehicles
            .iter()
            .filter(|(_, vehicle)| vehicle.exists)
            .map(|(&id, vehicle)| (id, vehicle.position.distance(point)))
            .filter(|&(_, distance)| distance <= radius)
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(id, _)| id)
    }

    fn vehicle_exists(&self, vehicle: VehicleId) -> bool {
        self.vehicles.get(&vehicle).is_some_and(|v| v.exists)
    }

    fn vehicle_position(&self, vehicle: VehicleId) -> Option<Vec3> {
        self.vehicles
            .get(&vehicle)
            .filter(|v| v.exists)
            .map(|v| v.position)
    }

    fn passenger_capacity(&self, vehicle: VehicleId) -> u8 {
        self.vehicles
            .get(&vehicle)
            .filter(|v| v.exists)
            .map_or(0, |v| v.passenger_capacity)
    }

    fn vehicle_is_motorcycle(&self, vehicle: VehicleId) -> bool {
        self.vehicles.get(&vehicle).is_some_and(|v| v.motorcycle)
    }

    fn is_seat_free(&self, vehicle: VehicleId, seat: Seat) -> bool {
        self.vehicles
            .get(&vehicle)
            .is_some_and(|v| v.exists && v.has_seat(seat) && v.occupant(seat).is_none())
    }

    fn occupants(&self, vehicle: VehicleId) -> Occupants {
        self.vehicles
            .get(&vehicle)
            .map(|v| v.seats.iter().flatten().copied().collect())
            .unwrap_or_default()
    }

    fn driver(&self, vehicle: VehicleId) -> Option<PedId> {
        self.vehicles.get(&vehicle)?.occupant(Seat::Driver)
    }

    fn anchor_position(&self, vehicle: VehicleId, anchor: &str) -> Option<Vec3> {
        let sim_vehicle = self.vehicles.get(&vehicle).filter(|v| v.exists)?;
        sim_vehicle
            .anchors
            .get(anchor)
            .map(|&offset| sim_vehicle.position + offset)
    }

    fn anchor_offset(&self, vehicle: VehicleId, anchor: &str) -> Option<Vec3> {
        self.vehicles
            .get(&vehicle)
            .filter(|v| v.exists)?
            .anchors
            .get(anchor)
            .copied()
    }

    fn waypoint(&self) -> Option<Vec3> {
        self.waypoint
    }
}

impl WorldCommands for SimWorld {
    fn enter_vehicle(&mut self, ped: PedId, task: EnterVehicleTask) {
        self.record(SimCommand::EnterVehicle { ped, task });
        self.with_ped(ped, |state| state.task = Some(SimTask::Enter(task)));
    }

    fn warp_into_vehicle(&mut self, ped: PedId, vehicle: VehicleId, seat: Seat) {
        self.record(SimCommand::Warp { ped, vehicle, seat });
        self.seat_ped(ped, vehicle, seat);
    }

    fn drive_to(
        &mut self,
        ped: PedId,
        vehicle: VehicleId,
        target: Vec3,
        speed: f32,
        style: DrivingStyle,
    ) {
        self.record(SimCommand::DriveTo {
            ped,
            vehicle,
            target,
        });
        self.with_ped(ped, |state| {
            state.cruise_speed = speed;
            state.task = Some(SimTask::DriveTo {
                vehicle,
                target,
                style,
            });
        });
    }

    fn cruise(&mut self, ped: PedId, vehicle: VehicleId, speed: f32, style: DrivingStyle) {
        self.record(SimCommand::Cruise { ped, vehicle });
        self.with_ped(ped, |state| {
            state.cruise_speed = speed;
            state.task = Some(SimTask::Cruise { vehicle, style });
        });
    }

    fn clear_tasks(&mut self, ped: PedId) {
        self.record(SimCommand::ClearTasks { ped });
        self.with_ped(ped, |state| state.task = None);
    }

    fn set_knock_off_policy(&mut self, ped: PedId, policy: KnockOffPolicy) {
        self.record(SimCommand::SetKnockOff { ped, policy });
        self.with_ped(ped, |state| state.knock_off = policy);
    }

    fn play_reaction(&mut self, ped: PedId, reaction: Reaction) {
        self.record(SimCommand::Reaction { ped, reaction });
    }

    fn set_flee_attributes(&mut self, ped: PedId, attributes: FleeAttributes, enabled: bool) {
        self.record(SimCommand::SetFlee {
            ped,
            attributes,
            enabled,
        });
        self.with_ped(ped, |state| state.flee.set(attributes, enabled));
    }

    fn set_combat_attributes(&mut self, ped: PedId, attributes: CombatAttributes, enabled: bool) {
        self.record(SimCommand::SetCombat {
            ped,
            attributes,
            enabled,
        });
        self.with_ped(ped, |state| state.combat.set(attributes, enabled));
    }

    fn set_driving_style(&mut self, ped: PedId, style: DrivingStyle) {
        self.record(SimCommand::SetDrivingStyle { ped, style });
        self.with_ped(ped, |state| state.driving_style = style);
    }

    fn set_agitated(&mut self, ped: PedId, agitated: bool) {
        self.record(SimCommand::SetAgitated { ped });
        self.with_ped(ped, |state| state.agitated = agitated);
    }

    fn set_driving_aggressiveness(&mut self, ped: PedId, aggressiveness: f32) {
        self.record(SimCommand::SetAggressiveness { ped });
        self.with_ped(ped, |state| state.aggressiveness = aggressiveness);
    }

    fn set_driving_speed(&mut self, ped: PedId, cruise: f32, max: f32) {
        self.record(SimCommand::SetDrivingSpeed { ped });
        self.with_ped(ped, |state| {
            state.cruise_speed = cruise;
            state.max_speed = max;
        });
    }

    fn set_decision_profile(&mut self, ped: PedId, profile: DecisionProfile) {
        self.record(SimCommand::SetDecision { ped, profile });
        self.with_ped(ped, |state| state.decision = profile);
    }

    fn set_targetable(&mut self, ped: PedId, targetable: bool) {
        self.record(SimCommand::SetTargetable { ped });
        self.with_ped(ped, |state| state.targetable = targetable);
    }
}
