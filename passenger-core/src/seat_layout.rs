//! Per-vehicle cache of horizontal seat offsets, built once per seating.
use glam::Vec2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::geometry::round_cm;
use crate::seat::{MAX_SEATS, Seat, SeatTopology};
use crate::world::{VehicleId, WorldQuery};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeatNode {
    pub seat: Seat,
    /// Offset from the vehicle reference point, rounded to centimetres.
    /// Zero when the anchor is unknown.
    pub offset: Vec2,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeatLayout {
    vehicle: Option<VehicleId>,
    nodes: SmallVec<[SeatNode; MAX_SEATS]>,
}

impl SeatLayout {
    /// Record every seat from the driver through the last passenger seat.
    pub fn build<W: WorldQuery + ?Sized>(world: &W, vehicle: VehicleId) -> Self {
        let nodes = Seat::up_to_capacity(world.passenger_capacity(vehicle))
            .map(|seat| {
                let offset = SeatTopology::anchor_name(seat)
                    .and_then(|anchor| world.anchor_offset(vehicle, anchor))
                    .map_or(Vec2::ZERO, |offset| round_cm(offset.truncate()));
                SeatNode { seat, offset }
            })
            .collect();
        Self {
            vehicle: Some(vehicle),
            nodes,
        }
    }

    pub fn clear(&mut self) {
        self.vehicle = None;
        self.nodes.clear();
    }

    #[must_use]
    pub const fn vehicle(&self) -> Option<VehicleId> {
        self.vehicle
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn nodes(&self) -> &[SeatNode] {
        &self.nodes
    }

    #[must_use]
    pub fn offset(&self, seat: Seat) -> Option<Vec2> {
        self.nodes
            .iter()
            .find(|node| node.seat == seat)
            .map(|node| node.offset)
    }

    /// Candidate seat nearest to a point given in the vehicle's horizontal frame.
    #[must_use]
    pub fn closest_seat(&self, candidates: &[Seat], local_point: Vec2) -> Option<Seat> {
        candidates
            .iter()
            .filter_map(|&seat| self.offset(seat).map(|offset| (seat, offset)))
            .min_by(|(_, a), (_, b)| a.distance(local_point).total_cmp(&b.distance(local_point)))
            .map(|(seat, _)| seat)
    }
}
