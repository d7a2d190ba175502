//! Stateless seat-availability queries over a vehicle's live occupancy.
use glam::Vec3;
use smallvec::SmallVec;

use crate::seat::{MAX_SEATS, Seat, SeatTopology};
use crate::world::{VehicleId, WorldQuery};

/// Free seats in ordinal order.
pub type FreeSeats = SmallVec<[Seat; MAX_SEATS]>;

pub struct VehicleSeatFinder;

impl VehicleSeatFinder {
    /// Lowest-ordinal free seat, driver included.
    #[must_use]
    pub fn first_free_seat<W: WorldQuery + ?Sized>(world: &W, vehicle: VehicleId) -> Option<Seat> {
        Self::scan(world, vehicle).next()
    }

    /// Lowest-ordinal free seat behind or beside the driver.
    #[must_use]
    pub fn first_free_passenger_seat<W: WorldQuery + ?Sized>(
        world: &W,
        vehicle: VehicleId,
    ) -> Option<Seat> {
        Self::scan(world, vehicle).find(|seat| !seat.is_driver())
    }

    #[must_use]
    pub fn all_free_seats<W: WorldQuery + ?Sized>(world: &W, vehicle: VehicleId) -> FreeSeats {
        Self::scan(world, vehicle).collect()
    }

    /// Candidate whose anchor lies nearest to `point`.
    ///
    /// A seat whose anchor the vehicle does not expose is measured from the
    /// vehicle's reference point instead.
    #[must_use]
    pub fn closest_free_seat<W: WorldQuery + ?Sized>(
        world: &W,
        vehicle: VehicleId,
        free_seats: &[Seat],
        point: Vec3,
    ) -> Option<Seat> {
        let reference = world.vehicle_position(vehicle).unwrap_or(point);
        free_seats
            .iter()
            .map(|&seat| {
                let position = SeatTopology::anchor_name(seat)
                    .and_then(|anchor| world.anchor_position(vehicle, anchor))
                    .unwrap_or(reference);
                (seat, position.distance(point))
            })
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(seat, _)| seat)
    }

    fn scan<'a, W: WorldQuery + ?Sized>(
        world: &'a W,
        vehicle: VehicleId,
    ) -> impl Iterator<Item = Seat> + 'a {
        let capacity = world.passenger_capacity(vehicle);
        let seats = if capacity == 0 {
            None
        } else {
            Some(Seat::up_to_capacity(capacity))
        };
        seats
            .into_iter()
            .flatten()
            .filter(move |&seat| world.is_seat_free(vehicle, seat))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimVehicle, SimWorld};
    use crate::world::PedId;

    fn sedan_world(occupied: &[Seat]) -> (SimWorld, VehicleId) {
        let mut world = SimWorld::new(Vec3::ZERO);
        let vehicle = world.spawn_vehicle(SimVehicle::sedan(Vec3::new(3.0, 0.0, 0.0)));
        for (idx, &seat) in occupied.iter().enumerate() {
            let ped = world.spawn_ped(Vec3::ZERO);
            assert_ne!(ped, PedId(0), "ped {idx} collides with player");
            world.seat_ped(ped, vehicle, seat);
        }
        (world, vehicle)
    }

    #[test]
    fn first_free_is_lowest_ordinal() {
        let (world, vehicle) = sedan_world(&[Seat::Driver, Seat::Passenger]);
        assert_eq!(
            VehicleSeatFinder::first_free_seat(&world, vehicle),
            Some(Seat::LeftRear)
        );
        let all = VehicleSeatFinder::all_free_seats(&world, vehicle);
        assert_eq!(all.as_slice(), &[Seat::LeftRear, Seat::RightRear]);
    }

    #[test]
    fn driver_counts_for_first_free_but_not_for_passenger_scan() {
        let (world, vehicle) = sedan_world(&[Seat::Passenger]);
        assert_eq!(
            VehicleSeatFinder::first_free_seat(&world, vehicle),
            Some(Seat::Driver)
        );
        assert_eq!(
            VehicleSeatFinder::first_free_passenger_seat(&world, vehicle),
            Some(Seat::LeftRear)
        );
    }

    #[test]
    fn full_or_zero_capacity_vehicles_have_no_free_seat() {
        let (world, vehicle) = sedan_world(&[
            Seat::Driver,
            Seat::Passenger,
            Seat::LeftRear,
            Seat::RightRear,
        ]);
        assert_eq!(VehicleSeatFinder::first_free_seat(&world, vehicle), None);
        assert!(VehicleSeatFinder::all_free_seats(&world, vehicle).is_empty());

        let mut world = SimWorld::new(Vec3::ZERO);
        let trailer = world.spawn_vehicle(SimVehicle::with_capacity(Vec3::ZERO, 0));
        assert_eq!(VehicleSeatFinder::first_free_seat(&world, trailer), None);
        assert!(VehicleSeatFinder::all_free_seats(&world, trailer).is_empty());
    }

    #[test]
    fn closest_free_seat_picks_nearest_anchor() {
        let (world, vehicle) = sedan_world(&[Seat::Driver]);
        let free = VehicleSeatFinder::all_free_seats(&world, vehicle);
        // Sedan anchors sit half a metre either side of the vehicle origin (3, 0).
        let right_rear_side = Vec3::new(4.5, -1.0, 0.0);
        assert_eq!(
            VehicleSeatFinder::closest_free_seat(&world, vehicle, &free, right_rear_side),
            Some(Seat::RightRear)
        );
        let front_right = Vec3::new(4.5, 1.0, 0.0);
        assert_eq!(
            VehicleSeatFinder::closest_free_seat(&world, vehicle, &free, front_right),
            Some(Seat::Passenger)
        );
        assert_eq!(
            VehicleSeatFinder::closest_free_seat(&world, vehicle, &[], front_right),
            None
        );
    }
}
