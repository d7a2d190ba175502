use passenger_core::sim::{SimCommand, SimVehicle};
use passenger_core::{
    InteractionStateMachine, ModState, PassengerConfig, Seat, SeatTopology, SimWorld, Vec2, Vec3,
    VehicleId, VehicleSeatFinder, WorldQuery,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

const SEEDS: u64 = 64;

/// Coach with a random subset of seats occupied by bystanders.
fn random_coach(rng: &mut ChaCha20Rng) -> (SimWorld, VehicleId, u8) {
    let mut world = SimWorld::new(Vec3::ZERO);
    let capacity = rng.gen_range(1..=7u8);
    let mut coach = SimVehicle::coach(Vec3::new(rng.gen_range(-5.0..5.0), 3.0, 0.0));
    coach.passenger_capacity = capacity;
    let vehicle = world.spawn_vehicle(coach);
    for seat in Seat::up_to_capacity(capacity) {
        if rng.gen_bool(0.5) {
            let ped = world.spawn_ped(Vec3::ZERO);
            world.seat_ped(ped, vehicle, seat);
        }
    }
    (world, vehicle, capacity)
}

#[test]
fn first_free_seat_is_lowest_free_ordinal() {
    for seed in 0..SEEDS {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let (world, vehicle, _) = random_coach(&mut rng);
        let free = VehicleSeatFinder::all_free_seats(&world, vehicle);
        let first = VehicleSeatFinder::first_free_seat(&world, vehicle);

        assert_eq!(first.is_none(), free.is_empty(), "seed {seed}");
        if let Some(first) = first {
            assert!(
                free.iter().all(|seat| first.ordinal() <= seat.ordinal()),
                "seed {seed}"
            );
            assert!(world.is_seat_free(vehicle, first));
        }
    }
}

#[test]
fn closest_free_seat_minimises_anchor_distance() {
    for seed in 0..SEEDS {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let (world, vehicle, _) = random_coach(&mut rng);
        let free = VehicleSeatFinder::all_free_seats(&world, vehicle);
        let point = Vec3::new(rng.gen_range(-8.0..8.0), rng.gen_range(-8.0..8.0), 0.0);

        let Some(best) = VehicleSeatFinder::closest_free_seat(&world, vehicle, &free, point) else {
            assert!(free.is_empty(), "seed {seed}");
            continue;
        };
        assert!(free.contains(&best));
        let distance = |seat: Seat| {
            let anchor = SeatTopology::anchor_name(seat).unwrap();
            world.anchor_position(vehicle, anchor).unwrap().distance(point)
        };
        for &other in &free {
            assert!(distance(best) <= distance(other), "seed {seed}");
        }
    }
    let world = SimWorld::new(Vec3::ZERO);
    assert_eq!(
        VehicleSeatFinder::closest_free_seat(&world, VehicleId(1), &[], Vec3::ZERO),
        None
    );
}

#[test]
fn cycling_finds_the_single_free_seat_from_any_start() {
    for seed in 0..SEEDS {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let capacity = rng.gen_range(1..=7u8);
        let free = Seat::from_ordinal(rng.gen_range(0..=capacity)).unwrap();
        let start = Seat::up_to_capacity(capacity)
            .filter(|&seat| seat != free)
            .nth(rng.gen_range(0..usize::from(capacity)))
            .unwrap();

        let mut world = SimWorld::new(Vec3::ZERO);
        let mut coach = SimVehicle::coach(Vec3::ZERO);
        coach.passenger_capacity = capacity;
        let vehicle = world.spawn_vehicle(coach);
        world.seat_ped(world.player(), vehicle, start);
        for seat in Seat::up_to_capacity(capacity) {
            if seat != free && seat != start {
                let ped = world.spawn_ped(Vec3::ZERO);
                world.seat_ped(ped, vehicle, seat);
            }
        }

        let mut machine = InteractionStateMachine::new(PassengerConfig::default());
        assert_eq!(machine.handle_intent(&mut world, &mut ()), ModState::Seated);
        assert_eq!(
            world.ped_seat(world.player()),
            Some(free),
            "seed {seed}: {start} -> {free}"
        );
        let warps = world
            .command_log()
            .iter()
            .filter(|cmd| matches!(cmd, SimCommand::Warp { .. }))
            .count();
        assert_eq!(warps, 1);
    }
}

#[test]
fn seat_layout_is_answered_from_cache() {
    let mut world = SimWorld::new(Vec3::ZERO);
    let vehicle = world.spawn_vehicle(SimVehicle::coach(Vec3::ZERO));
    world.seat_ped(world.player(), vehicle, Seat::Passenger);
    // Aiming in an empty coach threatens nobody and keeps the seat.
    world.set_aiming(world.player(), true);
    let mut machine = InteractionStateMachine::new(PassengerConfig::default());
    assert_eq!(machine.handle_intent(&mut world, &mut ()), ModState::Seated);

    assert_eq!(machine.seat_layout().vehicle(), Some(vehicle));
    assert_eq!(machine.seat_layout().len(), 8);
    let rear_left = machine.seat_layout().offset(Seat::LeftRear).unwrap();
    assert_eq!(
        machine.nearest_free_seat(&world, rear_left),
        Some(Seat::LeftRear)
    );
    assert_eq!(
        machine.nearest_free_seat(&world, Vec2::new(0.1, 0.6)),
        Some(Seat::Driver)
    );
}
