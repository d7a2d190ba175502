//! Seat identifiers and the seat-to-anchor topology table.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Total number of seat roles a vehicle can expose (driver plus seven passengers).
pub const MAX_SEATS: usize = 8;

/// Seat role inside a vehicle. The ordinal defines the seat-cycling order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Seat {
    Driver,
    Passenger,
    LeftRear,
    RightRear,
    ExtraSeat1,
    ExtraSeat2,
    ExtraSeat3,
    ExtraSeat4,
}

impl Seat {
    pub const ALL: [Self; MAX_SEATS] = [
        Self::Driver,
        Self::Passenger,
        Self::LeftRear,
        Self::RightRear,
        Self::ExtraSeat1,
        Self::ExtraSeat2,
        Self::ExtraSeat3,
        Self::ExtraSeat4,
    ];

    #[must_use]
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Self::ALL.get(usize::from(ordinal)).copied()
    }

    #[must_use]
    pub const fn is_driver(self) -> bool {
        matches!(self, Self::Driver)
    }

    /// Seats present on a vehicle with the given passenger capacity, in ordinal order.
    pub fn up_to_capacity(passenger_capacity: u8) -> impl Iterator<Item = Self> {
        (0..=passenger_capacity).map_while(Self::from_ordinal)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Driver => "driver",
            Self::Passenger => "passenger",
            Self::LeftRear => "left_rear",
            Self::RightRear => "right_rear",
            Self::ExtraSeat1 => "extra_seat_1",
            Self::ExtraSeat2 => "extra_seat_2",
            Self::ExtraSeat3 => "extra_seat_3",
            Self::ExtraSeat4 => "extra_seat_4",
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static mapping from seat role to the structural anchor nearest that seat.
///
/// Layouts with two seats (motorcycles, quads) do not follow the car naming,
/// so a missing or misplaced anchor means "offset unknown" rather than an error.
pub struct SeatTopology;

impl SeatTopology {
    #[must_use]
    pub const fn anchor_name(seat: Seat) -> Option<&'static str> {
        Some(match seat {
            Seat::Driver => "seat_dside_f",
            Seat::Passenger => "seat_pside_f",
            Seat::LeftRear => "seat_dside_r",
            Seat::RightRear => "seat_pside_r",
            Seat::ExtraSeat1 => "seat_dside_r1",
            Seat::ExtraSeat2 => "seat_pside_r1",
            Seat::ExtraSeat3 => "seat_dside_r2",
            Seat::ExtraSeat4 => "seat_pside_r2",
        })
    }
}
