//! Diagnostic signals forwarded to the host's notification layer.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::Verbosity;
use crate::constants::{
    NOTICE_ACTIVE_EXIT, NOTICE_ADOPTED, NOTICE_ATTEMPT_SEAT, NOTICE_DRIVER_CRUISING,
    NOTICE_DRIVER_RECKLESS, NOTICE_DRIVER_TO_WAYPOINT, NOTICE_ENTERED, NOTICE_ENTRY_ABANDONED,
    NOTICE_ENTRY_TIMEOUT, NOTICE_NO_FREE_SEAT, NOTICE_NO_PASSENGER_SEAT, NOTICE_NO_VEHICLE,
    NOTICE_OCCUPANTS_THREATENED, NOTICE_PASSIVE_EXIT, NOTICE_SWITCHED_SEAT,
};
use crate::seat::Seat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// Ride request found no vehicle within range.
    NoVehicleFound,
    /// Nearest vehicle has no passenger seats.
    NoPassengerSeat,
    /// Enter task issued toward a seat.
    AttemptSeat { seat: Seat },
    Entered,
    EntryTimedOut,
    /// Target vehicle vanished or drifted away during entry.
    EntryAbandoned,
    ActivelyExited,
    /// Passive validation found the character no longer seated.
    PassivelyExited,
    /// Detached scan adopted the vehicle the character already occupies.
    AdoptedVehicle,
    SwitchedSeat { seat: Seat },
    NoFreeSeat,
    OccupantsThreatened { count: usize },
    DriverToWaypoint,
    DriverCruising,
    DriverReckless,
}

impl Notice {
    /// Level at which this notice is shown.
    #[must_use]
    pub const fn verbosity(self) -> Verbosity {
        match self {
            Self::NoFreeSeat => Verbosity::Warning,
            Self::AttemptSeat { .. }
            | Self::SwitchedSeat { .. }
            | Self::OccupantsThreatened { .. }
            | Self::DriverToWaypoint
            | Self::DriverReckless => Verbosity::Info,
            Self::NoVehicleFound
            | Self::NoPassengerSeat
            | Self::Entered
            | Self::EntryTimedOut
            | Self::EntryAbandoned
            | Self::ActivelyExited
            | Self::PassivelyExited
            | Self::AdoptedVehicle
            | Self::DriverCruising => Verbosity::Debug,
        }
    }

    /// Stable key for host-side localization.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::NoVehicleFound => NOTICE_NO_VEHICLE,
            Self::NoPassengerSeat => NOTICE_NO_PASSENGER_SEAT,
            Self::AttemptSeat { .. } => NOTICE_ATTEMPT_SEAT,
            Self::Entered => NOTICE_ENTERED,
            Self::EntryTimedOut => NOTICE_ENTRY_TIMEOUT,
            Self::EntryAbandoned => NOTICE_ENTRY_ABANDONED,
            Self::ActivelyExited => NOTICE_ACTIVE_EXIT,
            Self::PassivelyExited => NOTICE_PASSIVE_EXIT,
            Self::AdoptedVehicle => NOTICE_ADOPTED,
            Self::SwitchedSeat { .. } => NOTICE_SWITCHED_SEAT,
            Self::NoFreeSeat => NOTICE_NO_FREE_SEAT,
            Self::OccupantsThreatened { .. } => NOTICE_OCCUPANTS_THREATENED,
            Self::DriverToWaypoint => NOTICE_DRIVER_TO_WAYPOINT,
            Self::DriverCruising => NOTICE_DRIVER_CRUISING,
            Self::DriverReckless => NOTICE_DRIVER_RECKLESS,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoVehicleFound => f.write_str("No vehicle found."),
            Self::NoPassengerSeat => f.write_str("No passenger seat available."),
            Self::AttemptSeat { seat } => write!(f, "Attempt seat {seat}."),
            Self::Entered => f.write_str("Entered vehicle."),
            Self::EntryTimedOut => f.write_str("Timeout entering vehicle."),
            Self::EntryAbandoned => f.write_str("Target vehicle lost while entering."),
            Self::ActivelyExited => f.write_str("Player actively exited vehicle."),
            Self::PassivelyExited => f.write_str("Player no longer in target vehicle."),
            Self::AdoptedVehicle => f.write_str("Already seated, tracking current vehicle."),
            Self::SwitchedSeat { seat } => write!(f, "Switch to {seat}."),
            Self::NoFreeSeat => f.write_str("No free seat available."),
            Self::OccupantsThreatened { .. } => {
                f.write_str("Peds threatened not to leave vehicle.")
            }
            Self::DriverToWaypoint => f.write_str("Driver going to waypoint."),
            Self::DriverCruising => f.write_str("Driver cruising."),
            Self::DriverReckless => f.write_str("Driver became reckless."),
        }
    }
}

/// Receiver for notices that pass the configured verbosity.
pub trait Notifier {
    fn notify(&mut self, notice: Notice);
}

/// Discards every notice.
impl Notifier for () {
    fn notify(&mut self, _notice: Notice) {}
}

impl Notifier for Vec<Notice> {
    fn notify(&mut self, notice: Notice) {
        self.push(notice);
    }
}

impl<N: Notifier + ?Sized> Notifier for &mut N {
    fn notify(&mut self, notice: Notice) {
        (**self).notify(notice);
    }
}

/// Log a notice and forward it when the verbosity admits it.
pub(crate) fn emit<N: Notifier + ?Sized>(notifier: &mut N, verbosity: Verbosity, notice: Notice) {
    log::log!(
        notice.verbosity().log_level(),
        "{} ({})",
        notice,
        notice.key()
    );
    if verbosity.admits(notice.verbosity()) {
        notifier.notify(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_filters_by_verbosity() {
        let mut sink: Vec<Notice> = Vec::new();
        emit(&mut sink, Verbosity::Warning, Notice::Entered);
        emit(&mut sink, Verbosity::Warning, Notice::NoFreeSeat);
        emit(&mut sink, Verbosity::Info, Notice::DriverReckless);
        assert_eq!(sink, vec![Notice::NoFreeSeat, Notice::DriverReckless]);
    }

    #[test]
    fn keys_and_messages_are_stable() {
        assert_eq!(Notice::NoVehicleFound.key(), "notice.no-vehicle");
        assert_eq!(
            Notice::AttemptSeat {
                seat: Seat::LeftRear
            }
            .to_string(),
            "Attempt seat left_rear."
        );
        assert_eq!(Notice::NoFreeSeat.verbosity(), Verbosity::Warning);
    }

    #[test]
    fn notices_serialize_with_kind_tag() {
        let json = serde_json::to_string(&Notice::SwitchedSeat {
            seat: Seat::RightRear,
        })
        .unwrap();
        assert_eq!(json, r#"{"kind":"switched_seat","seat":"right_rear"}"#);
    }
}
