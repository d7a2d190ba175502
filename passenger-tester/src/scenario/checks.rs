use anyhow::{Context, Result, ensure};
use passenger_core::sim::{SimCommand, SimVehicle};
use passenger_core::{
    EnterVehicleFlags, FleeAttributes, InteractionStateMachine, ModState, Notice, PassengerConfig,
    Seat, SimWorld, Vec3, Verbosity, WorldQuery, world::KnockOffPolicy,
};
use rand::Rng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;
use std::time::Duration;

use super::layout::{Layout, random_point};

fn machine(adopt: bool) -> InteractionStateMachine {
    let mut config = PassengerConfig::default();
    config.settings.verbosity = Verbosity::Debug;
    config.parameters.adopt_occupied_vehicle = adopt;
    InteractionStateMachine::new(config)
}

pub fn ride_happy_path(rng: &mut ChaCha20Rng) -> Result<()> {
    let mut world = SimWorld::new(Vec3::ZERO);
    let layout = Layout::random(rng, 9.0, 0.5);
    let (vehicle, _) = layout.spawn(&mut world);
    let (expected_seat, may_jack) = Layout::expected_entry_seat(&world, vehicle);
    let mut machine = machine(false);

    let state = machine.handle_intent(&mut world, &mut ());
    ensure!(
        state == ModState::AttemptingEnter,
        "ride request ended in {state}"
    );
    let task = world
        .pending_entry(world.player())
        .context("no enter task issued")?;
    ensure!(
        task.seat == expected_seat,
        "targeted {} instead of {expected_seat}",
        task.seat
    );
    ensure!(
        task.flags.contains(EnterVehicleFlags::DONT_JACK_ANYONE) != may_jack,
        "jacking flags {:?} for seat {}",
        task.flags,
        task.seat
    );

    world.resolve_entries();
    let state = machine.tick(&mut world, &mut ());
    ensure!(state == ModState::Seated, "confirmed entry ended in {state}");
    ensure!(
        machine.seat_layout().len() == usize::from(layout.capacity) + 1,
        "seat layout has {} nodes for capacity {}",
        machine.seat_layout().len(),
        layout.capacity
    );
    Ok(())
}

pub fn zero_capacity(rng: &mut ChaCha20Rng) -> Result<()> {
    let mut world = SimWorld::new(Vec3::ZERO);
    world.spawn_vehicle(SimVehicle::with_capacity(random_point(rng, 1.0, 9.0), 0));
    let mut machine = machine(false);
    let mut notices: Vec<Notice> = Vec::new();

    for _ in 0..rng.gen_range(1..4) {
        let state = machine.handle_intent(&mut world, &mut notices);
        ensure!(state == ModState::Detached, "request moved to {state}");
        machine.tick(&mut world, &mut notices);
    }
    ensure!(
        notices.iter().all(|notice| *notice == Notice::NoPassengerSeat),
        "unexpected notices {notices:?}"
    );
    ensure!(
        !world
            .command_log()
            .iter()
            .any(|cmd| matches!(cmd, SimCommand::EnterVehicle { .. })),
        "enter task issued for a zero-capacity vehicle"
    );
    Ok(())
}

pub fn entry_timeout(rng: &mut ChaCha20Rng) -> Result<()> {
    let mut world = SimWorld::new(Vec3::ZERO);
    Layout::random(rng, 9.0, 0.3).spawn(&mut world);
    let mut machine = machine(false);
    machine.handle_intent(&mut world, &mut ());

    let within = rng.gen_range(0..=5_000);
    world.advance(Duration::from_millis(within));
    let state = machine.tick(&mut world, &mut ());
    ensure!(
        state == ModState::AttemptingEnter,
        "gave up after {within}ms"
    );

    world.advance(Duration::from_millis(5_001 - within + rng.gen_range(0..2_000)));
    let state = machine.tick(&mut world, &mut ());
    ensure!(state == ModState::Detached, "still {state} after timeout");
    ensure!(
        machine.target_vehicle().is_none(),
        "target kept after timeout"
    );
    Ok(())
}

pub fn vehicle_drift(rng: &mut ChaCha20Rng) -> Result<()> {
    let mut world = SimWorld::new(Vec3::ZERO);
    let (vehicle, _) = Layout::random(rng, 9.0, 0.3).spawn(&mut world);
    let mut machine = machine(false);
    machine.handle_intent(&mut world, &mut ());

    let limit = machine.config().parameters.drift_radius();
    let destination = random_point(rng, 0.5, limit * 2.0);
    let distance = destination.length();
    if (distance - limit).abs() < 0.01 {
        return Ok(());
    }
    world.move_vehicle(vehicle, destination);
    let state = machine.tick(&mut world, &mut ());
    let expected = if distance > limit {
        ModState::Detached
    } else {
        ModState::AttemptingEnter
    };
    ensure!(
        state == expected,
        "vehicle {distance:.1}m away left machine {state}, expected {expected}"
    );
    Ok(())
}

pub fn destroyed_while_seated(rng: &mut ChaCha20Rng) -> Result<()> {
    let mut world = SimWorld::new(Vec3::ZERO);
    let mut layout = Layout::random(rng, 9.0, 0.4);
    if layout.occupied.len() > usize::from(layout.capacity) {
        layout.occupied.clear();
    }
    let (vehicle, _) = layout.spawn(&mut world);
    let preferred = Seat::from_ordinal(rng.gen_range(0..=layout.capacity));
    Layout::seat_player(&mut world, vehicle, preferred).context("no seat for player")?;

    let mut machine = machine(true);
    let state = machine.tick(&mut world, &mut ());
    ensure!(state == ModState::Seated, "adoption ended in {state}");

    world.advance(Duration::from_millis(rng.gen_range(0..20_000)));
    world.destroy_vehicle(vehicle);
    world.clear_command_log();
    let state = machine.tick(&mut world, &mut ());
    ensure!(state == ModState::Detached, "still {state} after destruction");
    ensure!(
        machine.seat_layout().is_empty(),
        "seat layout survived reset"
    );
    ensure!(
        !world
            .command_log()
            .iter()
            .any(SimCommand::is_movement_task),
        "reset issued a movement task"
    );
    Ok(())
}

pub fn seat_cycling(rng: &mut ChaCha20Rng) -> Result<()> {
    let (mut layout, free) = Layout::single_free(rng);
    let start = *layout
        .occupied
        .choose(rng)
        .context("layout without occupied seats")?;
    layout.occupied.retain(|&seat| seat != start);

    let mut world = SimWorld::new(Vec3::ZERO);
    let (vehicle, _) = layout.spawn(&mut world);
    world.seat_ped(world.player(), vehicle, start);
    let mut machine = machine(false);

    let state = machine.handle_intent(&mut world, &mut ());
    ensure!(state == ModState::Seated, "cycling ended in {state}");
    let seat = world.ped_seat(world.player());
    ensure!(
        seat == Some(free),
        "cycled from {start} to {seat:?}, expected {free}"
    );
    Ok(())
}

pub fn coercion_ordering(rng: &mut ChaCha20Rng) -> Result<()> {
    let mut layout = Layout::random(rng, 9.0, 0.6);
    let player_seat = Seat::from_ordinal(rng.gen_range(1..=layout.capacity))
        .context("capacity without passenger seats")?;
    layout.occupied.retain(|&seat| seat != player_seat);
    if !layout.has_driver() {
        layout.occupied.push(Seat::Driver);
    }

    let mut world = SimWorld::new(Vec3::ZERO);
    let (vehicle, bystanders) = layout.spawn(&mut world);
    world.seat_ped(world.player(), vehicle, player_seat);
    let driver = world.driver(vehicle).context("driver missing")?;
    let waypoint = rng
        .gen_bool(0.5)
        .then(|| random_point(rng, 50.0, 500.0));
    world.set_waypoint(waypoint);

    let mut machine = machine(true);
    machine.tick(&mut world, &mut ());
    world.set_aiming(world.player(), true);
    world.clear_command_log();
    let mut notices: Vec<Notice> = Vec::new();
    let state = machine.handle_intent(&mut world, &mut notices);
    ensure!(state == ModState::Seated, "coercion ended in {state}");

    ensure!(
        notices.contains(&Notice::OccupantsThreatened {
            count: bystanders.len()
        }),
        "threat notice missing from {notices:?}"
    );
    let expected_order = if waypoint.is_some() {
        Notice::DriverToWaypoint
    } else {
        Notice::DriverCruising
    };
    ensure!(
        notices.contains(&expected_order),
        "expected {expected_order:?} in {notices:?}"
    );

    let log = world.command_log();
    let last_lock = log
        .iter()
        .rposition(|cmd| {
            matches!(cmd, SimCommand::SetFlee { attributes, .. }
                if attributes.contains(FleeAttributes::DISABLE_EXIT_VEHICLE))
        })
        .context("no occupant was locked in")?;
    let takeover = log
        .iter()
        .position(|cmd| matches!(cmd, SimCommand::ClearTasks { ped } if *ped == driver))
        .context("driver task never replaced")?;
    ensure!(
        last_lock < takeover,
        "driver taken over at {takeover} before last lock at {last_lock}"
    );
    for ped in bystanders {
        let flee = world.ped(ped).context("bystander vanished")?.flee;
        ensure!(
            flee.contains(FleeAttributes::hostage()),
            "{ped} not held: {flee:?}"
        );
    }
    Ok(())
}

pub fn motorcycle_pillion(rng: &mut ChaCha20Rng) -> Result<()> {
    let mut world = SimWorld::new(Vec3::ZERO);
    let bike = world.spawn_vehicle(SimVehicle::motorcycle(Vec3::ZERO));
    let player = world.player();
    let mut machine = machine(true);

    if rng.gen_bool(0.5) {
        let rider = world.spawn_ped(Vec3::ZERO);
        world.seat_ped(rider, bike, Seat::Driver);
        world.seat_ped(player, bike, Seat::Passenger);
        machine.tick(&mut world, &mut ());
        world.advance(Duration::from_secs(11));
        let state = machine.tick(&mut world, &mut ());
        ensure!(state == ModState::Seated, "pillion validation ended in {state}");
    } else {
        world.seat_ped(player, bike, Seat::Driver);
        let state = machine.handle_intent(&mut world, &mut ());
        ensure!(state == ModState::Seated, "pillion swap ended in {state}");
        ensure!(
            world.ped_seat(player) == Some(Seat::Passenger),
            "player stayed in {:?}",
            world.ped_seat(player)
        );
    }

    let policy = world.ped_knock_off_policy(player);
    ensure!(
        policy == KnockOffPolicy::Never,
        "pillion rider left with {policy:?}"
    );
    Ok(())
}
