//! Active transitions triggered by the interaction key.
use super::{InteractionStateMachine, ModState, apply_knock_off_policy, knock_off_policy_for};
use crate::coercion::{CoercionReport, DriverOrder, OccupantCoercion};
use crate::finder::VehicleSeatFinder;
use crate::flags::EnterVehicleFlags;
use crate::notice::{Notice, Notifier};
use crate::seat::Seat;
use crate::world::{EnterVehicleTask, HostWorld, MoveSpeed, VehicleId};

impl InteractionStateMachine {
    /// Detached: find the nearest vehicle and start walking to a seat.
    pub(super) fn request_ride<W, N>(&mut self, world: &mut W, notifier: &mut N) -> ModState
    where
        W: HostWorld,
        N: Notifier + ?Sized,
    {
        let player = world.player();
        let radius = self.config.parameters.proximity_radius;
        let Some(vehicle) = world
            .ped_position(player)
            .and_then(|at| world.closest_vehicle(at, radius))
        else {
            self.notify(notifier, Notice::NoVehicleFound);
            return self.reset(world);
        };
        if world.passenger_capacity(vehicle) == 0 {
            self.notify(notifier, Notice::NoPassengerSeat);
            return self.reset(world);
        }
        self.target_vehicle = Some(vehicle);

        if world.ped_is_in_vehicle(player, vehicle) {
            self.settle_in(world, vehicle);
            return self.interact_seated(world, notifier);
        }

        let (seat, flags) = match VehicleSeatFinder::first_free_passenger_seat(world, vehicle) {
            Some(seat) => (seat, EnterVehicleFlags::DONT_JACK_ANYONE),
            None => (Seat::Passenger, EnterVehicleFlags::empty()),
        };
        let task = EnterVehicleTask {
            vehicle,
            seat,
            timeout: None,
            speed: MoveSpeed::for_movement(world.ped_movement(player)),
            flags,
        };
        world.enter_vehicle(player, task);
        self.last_enter_attempt = Some(world.now());
        log::debug!("entering {vehicle} toward {seat} ({:?})", task.speed);
        self.notify(notifier, Notice::AttemptSeat { seat });
        self.state = ModState::AttemptingEnter;
        ModState::AttemptingEnter
    }

    /// Seated: cycle seats, or take the vehicle hostage while aiming.
    pub(super) fn interact_seated<W, N>(&mut self, world: &mut W, notifier: &mut N) -> ModState
    where
        W: HostWorld,
        N: Notifier + ?Sized,
    {
        let player = world.player();
        let vehicle = match self.target_vehicle {
            Some(vehicle)
                if world.vehicle_exists(vehicle) && world.ped_is_in_vehicle(player, vehicle) =>
            {
                vehicle
            }
            _ => {
                log::warn!("interaction without a valid seated vehicle");
                return self.reset(world);
            }
        };
        self.last_passive_check = Some(world.now());

        if world.ped_is_aiming(player) {
            let report = OccupantCoercion::coerce(world, vehicle, player);
            self.report_coercion(notifier, report);
        } else {
            self.cycle_seat(world, notifier, vehicle);
        }
        ModState::Seated
    }

    fn cycle_seat<W, N>(&mut self, world: &mut W, notifier: &mut N, vehicle: VehicleId)
    where
        W: HostWorld,
        N: Notifier + ?Sized,
    {
        let player = world.player();
        let capacity = world.passenger_capacity(vehicle);
        let Some(seat) = next_free_seat(world, vehicle, world.ped_seat(player), capacity) else {
            self.notify(notifier, Notice::NoFreeSeat);
            return;
        };
        if world.vehicle_is_motorcycle(vehicle) {
            let policy = knock_off_policy_for(world, vehicle, Some(seat));
            apply_knock_off_policy(world, policy);
        }
        world.warp_into_vehicle(player, vehicle, seat);
        self.notify(notifier, Notice::SwitchedSeat { seat });
    }

    fn report_coercion<N: Notifier + ?Sized>(&self, notifier: &mut N, report: CoercionReport) {
        if report.occupants_threatened > 0 {
            self.notify(
                notifier,
                Notice::OccupantsThreatened {
                    count: report.occupants_threatened,
                },
            );
        }
        match report.order {
            Some(DriverOrder::ToWaypoint) => self.notify(notifier, Notice::DriverToWaypoint),
            Some(DriverOrder::Cruise) => self.notify(notifier, Notice::DriverCruising),
            None => {}
        }
        if report.driver.is_some() {
            self.notify(notifier, Notice::DriverReckless);
        }
    }
}

/// Circular scan over ordinals `0..=capacity`, starting after `current`.
/// An unknown current seat starts the scan at the driver's ordinal.
fn next_free_seat<W: HostWorld>(
    world: &W,
    vehicle: VehicleId,
    current: Option<Seat>,
    capacity: u8,
) -> Option<Seat> {
    let span = u16::from(capacity) + 1;
    let start = current.map_or(u16::from(capacity), |seat| u16::from(seat.ordinal()));
    (1..=span)
        .map(|step| (start + step) % span)
        .filter_map(|ordinal| u8::try_from(ordinal).ok().and_then(Seat::from_ordinal))
        .find(|&seat| world.is_seat_free(vehicle, seat))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PassengerConfig;
    use crate::sim::{SimCommand, SimVehicle, SimWorld};
    use crate::world::{KnockOffPolicy, MovementState, WorldQuery};
    use glam::Vec3;

    fn machine() -> InteractionStateMachine {
        InteractionStateMachine::new(PassengerConfig::default())
    }

    #[test]
    fn ride_request_without_vehicle_stays_detached() {
        let mut world = SimWorld::new(Vec3::ZERO);
        world.spawn_vehicle(SimVehicle::sedan(Vec3::new(40.0, 0.0, 0.0)));
        let mut notices: Vec<Notice> = Vec::new();
        let mut machine = InteractionStateMachine::new(PassengerConfig {
            settings: crate::config::ScriptSettings {
                verbosity: crate::config::Verbosity::Debug,
                ..Default::default()
            },
            ..Default::default()
        });
        assert_eq!(
            machine.handle_intent(&mut world, &mut notices),
            ModState::Detached
        );
        assert_eq!(notices, vec![Notice::NoVehicleFound]);
    }

    #[test]
    fn running_character_requests_run_speed() {
        let mut world = SimWorld::new(Vec3::ZERO);
        let car = world.spawn_vehicle(SimVehicle::sedan(Vec3::new(4.0, 0.0, 0.0)));
        world.set_movement(world.player(), MovementState::Sprinting);
        let mut machine = machine();
        assert_eq!(
            machine.handle_intent(&mut world, &mut ()),
            ModState::AttemptingEnter
        );
        let task = world.pending_entry(world.player()).unwrap();
        assert_eq!(task.vehicle, car);
        assert_eq!(task.speed, MoveSpeed::Run);
        assert_eq!(task.seat, Seat::Passenger);
        assert!(task.flags.contains(EnterVehicleFlags::DONT_JACK_ANYONE));
    }

    #[test]
    fn full_vehicle_falls_back_to_front_passenger_with_jacking() {
        let mut world = SimWorld::new(Vec3::ZERO);
        let car = world.spawn_vehicle(SimVehicle::sedan(Vec3::new(2.0, 0.0, 0.0)));
        for seat in [Seat::Passenger, Seat::LeftRear, Seat::RightRear] {
            let ped = world.spawn_ped(Vec3::ZERO);
            world.seat_ped(ped, car, seat);
        }
        let mut machine = machine();
        machine.handle_intent(&mut world, &mut ());
        let task = world.pending_entry(world.player()).unwrap();
        assert_eq!(task.seat, Seat::Passenger);
        assert!(task.flags.is_empty());
    }

    #[test]
    fn intent_while_attempting_is_ignored() {
        let mut world = SimWorld::new(Vec3::ZERO);
        world.spawn_vehicle(SimVehicle::sedan(Vec3::new(2.0, 0.0, 0.0)));
        let mut machine = machine();
        machine.handle_intent(&mut world, &mut ());
        let issued = world.command_log().len();
        assert_eq!(
            machine.handle_intent(&mut world, &mut ()),
            ModState::AttemptingEnter
        );
        assert_eq!(world.command_log().len(), issued);
    }

    #[test]
    fn cycling_wraps_to_the_single_free_seat() {
        for start in [Seat::Driver, Seat::Passenger, Seat::RightRear] {
            let mut world = SimWorld::new(Vec3::ZERO);
            let car = world.spawn_vehicle(SimVehicle::sedan(Vec3::ZERO));
            world.seat_ped(world.player(), car, start);
            for seat in Seat::up_to_capacity(3) {
                if seat != start && seat != Seat::LeftRear {
                    let ped = world.spawn_ped(Vec3::ZERO);
                    world.seat_ped(ped, car, seat);
                }
            }
            assert_eq!(
                next_free_seat(&world, car, Some(start), 3),
                Some(Seat::LeftRear)
            );
        }
    }

    #[test]
    fn cycling_a_full_vehicle_raises_no_free_seat() {
        let mut world = SimWorld::new(Vec3::ZERO);
        let car = world.spawn_vehicle(SimVehicle::sedan(Vec3::ZERO));
        world.seat_ped(world.player(), car, Seat::Passenger);
        for seat in [Seat::Driver, Seat::LeftRear, Seat::RightRear] {
            let ped = world.spawn_ped(Vec3::ZERO);
            world.seat_ped(ped, car, seat);
        }
        let mut machine = machine();
        let mut notices: Vec<Notice> = Vec::new();
        assert_eq!(
            machine.handle_intent(&mut world, &mut notices),
            ModState::Seated
        );
        assert_eq!(notices, vec![Notice::NoFreeSeat]);
        assert!(
            !world
                .command_log()
                .iter()
                .any(|cmd| matches!(cmd, SimCommand::Warp { .. }))
        );
    }

    #[test]
    fn motorcycle_warp_sets_policy_before_placement() {
        let mut world = SimWorld::new(Vec3::ZERO);
        let bike = world.spawn_vehicle(SimVehicle::motorcycle(Vec3::ZERO));
        world.seat_ped(world.player(), bike, Seat::Driver);
        let mut machine = machine();
        machine.handle_intent(&mut world, &mut ());

        let player = world.player();
        assert_eq!(world.ped_seat(player), Some(Seat::Passenger));
        assert_eq!(world.ped_knock_off_policy(player), KnockOffPolicy::Never);
        let log = world.command_log();
        let policy_at = log
            .iter()
            .position(|cmd| matches!(cmd, SimCommand::SetKnockOff { .. }))
            .unwrap();
        let warp_at = log
            .iter()
            .position(|cmd| matches!(cmd, SimCommand::Warp { .. }))
            .unwrap();
        assert!(policy_at < warp_at);

        machine.handle_intent(&mut world, &mut ());
        assert_eq!(world.ped_seat(player), Some(Seat::Driver));
        assert_eq!(world.ped_knock_off_policy(player), KnockOffPolicy::Default);
    }
}
