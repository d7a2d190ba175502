use serde::{Deserialize, Serialize};
use std::fmt;

use super::{InteractionStateMachine, ModState};
use crate::clock::{Clock, Timestamp};
use crate::seat_layout::SeatNode;
use crate::world::{KnockOffPolicy, VehicleId, WorldQuery};

/// Point-in-time view of the machine for a host debug overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticSnapshot {
    pub state: ModState,
    pub target_vehicle: Option<VehicleId>,
    /// Whole seconds since the last passive validation, if any.
    pub since_passive_check_secs: Option<u64>,
    pub since_enter_attempt_secs: Option<u64>,
    pub since_detached_scan_secs: Option<u64>,
    pub knock_off: KnockOffPolicy,
    pub seats: Vec<SeatNode>,
}

impl InteractionStateMachine {
    #[must_use]
    pub fn snapshot<W: WorldQuery + Clock + ?Sized>(&self, world: &W) -> DiagnosticSnapshot {
        let now = world.now();
        let since = |mark: Option<Timestamp>| mark.map(|at| now.saturating_since(at).as_secs());
        DiagnosticSnapshot {
            state: self.state,
            target_vehicle: self.target_vehicle,
            since_passive_check_secs: since(self.last_passive_check),
            since_enter_attempt_secs: since(self.last_enter_attempt),
            since_detached_scan_secs: since(self.last_detached_scan),
            knock_off: world.ped_knock_off_policy(world.player()),
            seats: self.seat_layout.nodes().to_vec(),
        }
    }
}

fn write_secs(f: &mut fmt::Formatter<'_>, label: &str, secs: Option<u64>) -> fmt::Result {
    match secs {
        Some(secs) => writeln!(f, "{label}: {secs}s"),
        None => writeln!(f, "{label}: -"),
    }
}

impl fmt::Display for DiagnosticSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "state: {}", self.state)?;
        match self.target_vehicle {
            Some(vehicle) => writeln!(f, "target: {vehicle}")?,
            None => writeln!(f, "target: none")?,
        }
        write_secs(f, "passive check", self.since_passive_check_secs)?;
        write_secs(f, "enter attempt", self.since_enter_attempt_secs)?;
        write_secs(f, "detached scan", self.since_detached_scan_secs)?;
        writeln!(f, "knock off: {:?}", self.knock_off)?;
        for node in &self.seats {
            writeln!(
                f,
                "  {:<12} ({:+.2}, {:+.2})",
                node.seat.as_str(),
                node.offset.x,
                node.offset.y
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::PassengerConfig;
    use crate::machine::{InteractionStateMachine, ModState};
    use crate::seat::Seat;
    use crate::sim::{SimVehicle, SimWorld};
    use crate::world::{KnockOffPolicy, WorldQuery};
    use glam::Vec3;
    use std::time::Duration;

    #[test]
    fn snapshot_of_fresh_machine_is_empty() {
        let world = SimWorld::new(Vec3::ZERO);
        let snapshot = InteractionStateMachine::new(PassengerConfig::default()).snapshot(&world);
        assert_eq!(snapshot.state, ModState::Detached);
        assert_eq!(snapshot.since_enter_attempt_secs, None);
        assert_eq!(snapshot.knock_off, KnockOffPolicy::Default);
        assert!(snapshot.seats.is_empty());
        assert!(snapshot.to_string().contains("target: none"));
    }

    #[test]
    fn snapshot_reports_timers_and_cached_seats() {
        let mut world = SimWorld::new(Vec3::ZERO);
        let car = world.spawn_vehicle(SimVehicle::sedan(Vec3::ZERO));
        world.seat_ped(world.player(), car, Seat::Passenger);
        let mut machine = InteractionStateMachine::new(PassengerConfig::default());
        machine.handle_intent(&mut world, &mut ());
        world.advance(Duration::from_secs(3));

        let snapshot = machine.snapshot(&world);
        assert_eq!(snapshot.state, ModState::Seated);
        assert_eq!(snapshot.target_vehicle, Some(car));
        assert_eq!(snapshot.since_passive_check_secs, Some(3));
        assert_eq!(snapshot.seats.len(), 4);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["state"], "seated");
        assert!(snapshot.to_string().contains("left_rear"));
    }
}
