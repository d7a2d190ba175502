//! Passenger Core
//!
//! Platform-agnostic interaction logic for riding as a passenger: requesting
//! a ride, choosing and cycling seats, and taking a vehicle's occupants
//! hostage. The engine is reached only through the capability traits in
//! [`world`]; [`sim::SimWorld`] provides an in-memory implementation.

pub mod clock;
pub mod coercion;
pub mod config;
pub mod constants;
pub mod finder;
pub mod flags;
pub mod geometry;
pub mod machine;
pub mod notice;
pub mod seat;
pub mod seat_layout;
pub mod sim;
pub mod world;

use anyhow::Context;
use std::time::Duration;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock, Timestamp};
pub use coercion::{CoercionReport, DriverOrder, OccupantCoercion};
pub use config::{ConfigError, InteractionParameters, PassengerConfig, ScriptSettings, Verbosity};
pub use finder::{FreeSeats, VehicleSeatFinder};
pub use flags::{CombatAttributes, DrivingStyle, EnterVehicleFlags, FleeAttributes};
pub use glam::{Vec2, Vec3};
pub use machine::{DiagnosticSnapshot, InteractionStateMachine, ModState};
pub use notice::{Notice, Notifier};
pub use seat::{Seat, SeatTopology};
pub use seat_layout::{SeatLayout, SeatNode};
pub use sim::SimWorld;
pub use world::{HostWorld, PedId, VehicleId, WorldCommands, WorldQuery};

/// Trait for abstracting settings persistence
/// Platform-specific implementations should provide this
pub trait SettingsStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load persisted settings, `None` when nothing has been saved yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings exist but cannot be read or parsed.
    fn load_settings(&self) -> Result<Option<PassengerConfig>, Self::Error>;

    /// Persist settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be written.
    fn save_settings(&self, config: &PassengerConfig) -> Result<(), Self::Error>;
}

/// Host-facing wrapper owning the state machine, the world and the notifier.
pub struct PassengerScript<W, N>
where
    W: HostWorld,
    N: Notifier,
{
    machine: InteractionStateMachine,
    world: W,
    notifier: N,
}

impl<W, N> PassengerScript<W, N>
where
    W: HostWorld,
    N: Notifier,
{
    pub fn new(config: PassengerConfig, world: W, notifier: N) -> Self {
        Self {
            machine: InteractionStateMachine::new(config),
            world,
            notifier,
        }
    }

    /// Load settings from `store`, falling back to defaults when they are
    /// missing or invalid, and write the effective settings back.
    ///
    /// # Errors
    ///
    /// Returns an error if the effective settings cannot be saved.
    pub fn bootstrap<S: SettingsStore>(store: &S, world: W, notifier: N) -> anyhow::Result<Self> {
        let config = match store.load_settings() {
            Ok(Some(config)) => match config.validate() {
                Ok(()) => config,
                Err(err) => {
                    log::warn!("invalid passenger settings, using defaults: {err}");
                    PassengerConfig::default()
                }
            },
            Ok(None) => {
                log::debug!("no passenger settings saved, using defaults");
                PassengerConfig::default()
            }
            Err(err) => {
                log::warn!("failed to load passenger settings, using defaults: {err}");
                PassengerConfig::default()
            }
        };
        store
            .save_settings(&config)
            .context("failed to save passenger settings")?;
        Ok(Self::new(config, world, notifier))
    }

    /// Timer callback.
    pub fn on_tick(&mut self) -> ModState {
        self.machine.tick(&mut self.world, &mut self.notifier)
    }

    /// Key callback. Keys other than the configured interaction key are ignored.
    pub fn on_key(&mut self, key: &str) -> ModState {
        if !self.machine.config().is_interaction_key(key) {
            return self.machine.state();
        }
        self.machine.handle_intent(&mut self.world, &mut self.notifier)
    }

    /// Tick interval the host should schedule.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.machine.config().settings.interval_ms))
    }

    #[must_use]
    pub fn snapshot(&self) -> DiagnosticSnapshot {
        self.machine.snapshot(&self.world)
    }

    #[must_use]
    pub const fn machine(&self) -> &InteractionStateMachine {
        &self.machine
    }

    #[must_use]
    pub const fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    #[must_use]
    pub const fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn into_parts(self) -> (InteractionStateMachine, W, N) {
        (self.machine, self.world, self.notifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::convert::Infallible;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct MemoryStore {
        saved: Rc<RefCell<Option<PassengerConfig>>>,
    }

    impl SettingsStore for MemoryStore {
        type Error = Infallible;

        fn load_settings(&self) -> Result<Option<PassengerConfig>, Self::Error> {
            Ok(self.saved.borrow().clone())
        }

        fn save_settings(&self, config: &PassengerConfig) -> Result<(), Self::Error> {
            *self.saved.borrow_mut() = Some(config.clone());
            Ok(())
        }
    }

    #[derive(Debug)]
    struct ReadOnlyStore;

    #[derive(Debug, thiserror::Error)]
    #[error("settings are read-only")]
    struct ReadOnly;

    impl SettingsStore for ReadOnlyStore {
        type Error = ReadOnly;

        fn load_settings(&self) -> Result<Option<PassengerConfig>, Self::Error> {
            Err(ReadOnly)
        }

        fn save_settings(&self, _config: &PassengerConfig) -> Result<(), Self::Error> {
            Err(ReadOnly)
        }
    }

    #[test]
    fn bootstrap_writes_defaults_when_nothing_saved() {
        let store = MemoryStore::default();
        let script =
            PassengerScript::bootstrap(&store, SimWorld::new(Vec3::ZERO), Vec::<Notice>::new())
                .unwrap();
        assert_eq!(script.interval(), Duration::from_millis(200));
        assert_eq!(*store.saved.borrow(), Some(PassengerConfig::default()));
    }

    #[test]
    fn bootstrap_replaces_invalid_settings() {
        let store = MemoryStore::default();
        let mut broken = PassengerConfig::default();
        broken.settings.interaction_key = "  ".to_string();
        *store.saved.borrow_mut() = Some(broken);

        let script = PassengerScript::bootstrap(&store, SimWorld::new(Vec3::ZERO), ()).unwrap();
        assert_eq!(script.machine().config(), &PassengerConfig::default());
        assert_eq!(*store.saved.borrow(), Some(PassengerConfig::default()));
    }

    #[test]
    fn bootstrap_surfaces_save_failures() {
        let err = PassengerScript::bootstrap(&ReadOnlyStore, SimWorld::new(Vec3::ZERO), ())
            .err()
            .unwrap();
        assert!(err.to_string().contains("failed to save passenger settings"));
    }

    #[test]
    fn only_the_interaction_key_triggers_intents() {
        let mut world = SimWorld::new(Vec3::ZERO);
        world.spawn_vehicle(sim::SimVehicle::sedan(Vec3::new(3.0, 0.0, 0.0)));
        let mut script = PassengerScript::new(PassengerConfig::default(), world, ());

        assert_eq!(script.on_key("H"), ModState::Detached);
        assert!(script.world().command_log().is_empty());
        assert_eq!(script.on_key("g"), ModState::AttemptingEnter);
        assert_eq!(script.on_tick(), ModState::AttemptingEnter);
    }
}
