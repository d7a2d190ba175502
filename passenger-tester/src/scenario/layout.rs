use passenger_core::sim::SimVehicle;
use passenger_core::{PedId, Seat, SimWorld, Vec3, VehicleId, VehicleSeatFinder, WorldQuery};
use rand::Rng;
use rand_chacha::ChaCha20Rng;

/// Seeded vehicle arrangement around a player standing at the origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub capacity: u8,
    pub occupied: Vec<Seat>,
    pub position: Vec3,
}

impl Layout {
    /// Coach-style vehicle within `max_distance` of the origin, with each seat
    /// independently occupied with probability `fill`.
    pub fn random(rng: &mut ChaCha20Rng, max_distance: f32, fill: f64) -> Self {
        let capacity = rng.gen_range(1..=7u8);
        let occupied = Seat::up_to_capacity(capacity)
            .filter(|_| rng.gen_bool(fill))
            .collect();
        Self {
            capacity,
            occupied,
            position: random_point(rng, 1.0, max_distance),
        }
    }

    /// Layout with exactly one free seat.
    pub fn single_free(rng: &mut ChaCha20Rng) -> (Self, Seat) {
        let capacity = rng.gen_range(1..=7u8);
        let free_ordinal = rng.gen_range(0..=capacity);
        let free = Seat::from_ordinal(free_ordinal).unwrap_or(Seat::Driver);
        let occupied = Seat::up_to_capacity(capacity)
            .filter(|&seat| seat != free)
            .collect();
        let layout = Self {
            capacity,
            occupied,
            position: Vec3::ZERO,
        };
        (layout, free)
    }

    #[must_use]
    pub fn has_driver(&self) -> bool {
        self.occupied.contains(&Seat::Driver)
    }

    /// Spawn the vehicle and one bystander per occupied seat.
    pub fn spawn(&self, world: &mut SimWorld) -> (VehicleId, Vec<PedId>) {
        let mut coach = SimVehicle::coach(self.position);
        coach.passenger_capacity = self.capacity;
        let vehicle = world.spawn_vehicle(coach);
        let occupants = self
            .occupied
            .iter()
            .map(|&seat| {
                let ped = world.spawn_ped(self.position);
                world.seat_ped(ped, vehicle, seat);
                ped
            })
            .collect();
        (vehicle, occupants)
    }

    /// Seat a ride request is expected to target, and whether it may jack.
    pub fn expected_entry_seat(world: &SimWorld, vehicle: VehicleId) -> (Seat, bool) {
        VehicleSeatFinder::first_free_passenger_seat(world, vehicle)
            .map_or((Seat::Passenger, true), |seat| (seat, false))
    }

    /// Put the player into `seat`, or the first free seat when `seat` is taken.
    pub fn seat_player(world: &mut SimWorld, vehicle: VehicleId, seat: Option<Seat>) -> Option<Seat> {
        let seat = seat
            .filter(|&seat| world.is_seat_free(vehicle, seat))
            .or_else(|| VehicleSeatFinder::first_free_seat(world, vehicle))?;
        world.seat_ped(world.player(), vehicle, seat);
        Some(seat)
    }
}

/// Point on the ground plane at a random bearing and distance from the origin.
pub fn random_point(rng: &mut ChaCha20Rng, min_distance: f32, max_distance: f32) -> Vec3 {
    let distance = rng.gen_range(min_distance..max_distance);
    let bearing = rng.gen_range(0.0..std::f32::consts::TAU);
    Vec3::new(distance * bearing.cos(), distance * bearing.sin(), 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn layouts_are_deterministic_per_seed() {
        let a = Layout::random(&mut ChaCha20Rng::seed_from_u64(7), 9.0, 0.5);
        let b = Layout::random(&mut ChaCha20Rng::seed_from_u64(7), 9.0, 0.5);
        assert_eq!(a, b);
        assert!(a.position.length() < 9.0);
    }

    #[test]
    fn single_free_layout_leaves_one_seat() {
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        let (layout, free) = Layout::single_free(&mut rng);
        assert_eq!(layout.occupied.len(), usize::from(layout.capacity));
        assert!(!layout.occupied.contains(&free));
    }
}
