use anyhow::Result;
use rand_chacha::ChaCha20Rng;

pub mod checks;
pub mod layout;

pub type ScenarioCheck = fn(&mut ChaCha20Rng) -> Result<()>;

/// A named property exercised once per seeded iteration.
#[derive(Clone, Copy)]
pub struct TestScenario {
    pub key: &'static str,
    pub name: &'static str,
    pub check: ScenarioCheck,
}

impl TestScenario {
    const fn new(key: &'static str, name: &'static str, check: ScenarioCheck) -> Self {
        Self { key, name, check }
    }
}

const CATALOG: [TestScenario; 8] = [
    TestScenario::new("ride", "Ride Request Happy Path", checks::ride_happy_path),
    TestScenario::new(
        "zero-capacity",
        "Zero Capacity Vehicle",
        checks::zero_capacity,
    ),
    TestScenario::new("entry-timeout", "Entry Timeout", checks::entry_timeout),
    TestScenario::new("drift", "Vehicle Drift During Entry", checks::vehicle_drift),
    TestScenario::new(
        "destroyed",
        "Vehicle Destroyed While Seated",
        checks::destroyed_while_seated,
    ),
    TestScenario::new("cycling", "Seat Cycling", checks::seat_cycling),
    TestScenario::new(
        "coercion",
        "Hostage Coercion Ordering",
        checks::coercion_ordering,
    ),
    TestScenario::new(
        "motorcycle",
        "Motorcycle Pillion",
        checks::motorcycle_pillion,
    ),
];

pub fn get_scenario(name: &str) -> Option<TestScenario> {
    let key = match name.to_lowercase().as_str() {
        "ride" | "ride-request" | "happy-path" => "ride",
        "zero-capacity" | "zero" => "zero-capacity",
        "entry-timeout" | "timeout" => "entry-timeout",
        "drift" | "vehicle-drift" => "drift",
        "destroyed" | "destroyed-while-seated" => "destroyed",
        "cycling" | "seat-cycling" => "cycling",
        "coercion" | "hostage" => "coercion",
        "motorcycle" | "pillion" => "motorcycle",
        _ => return None,
    };
    CATALOG.iter().find(|scenario| scenario.key == key).copied()
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    CATALOG
        .iter()
        .map(|scenario| (scenario.key, scenario.name))
        .collect()
}

/// Every catalogued scenario key, in catalog order.
pub fn all_keys() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|scenario| scenario.key)
}
