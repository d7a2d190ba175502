//! Centralized defaults and tuning constants for the passenger core.
//!
//! Host-adjustable values are only defaults for [`crate::config`]; the rest
//! define fixed behaviour and change only through reviewed code.

// Settings defaults --------------------------------------------------------
pub(crate) const DEFAULT_INTERVAL_MS: u32 = 200;
pub(crate) const DEFAULT_INTERACTION_KEY: &str = "G";
pub(crate) const DEFAULT_PROXIMITY_RADIUS: f32 = 10.0;
pub(crate) const DEFAULT_ENTRY_TIMEOUT_SECS: u32 = 5;
pub(crate) const DEFAULT_VALIDATION_PERIOD_SECS: u32 = 10;
pub(crate) const DEFAULT_DETACHED_SCAN_PERIOD_SECS: u32 = 10;

// Entry tuning -------------------------------------------------------------
/// Multiple of the proximity radius a pending entry may drift before it is abandoned.
pub(crate) const DRIFT_RADIUS_FACTOR: f32 = 4.0;

// Coercion tuning ----------------------------------------------------------
/// Speed handed to drive and cruise tasks; effectively unbounded.
pub const COERCED_DRIVE_SPEED: f32 = 9_999.0;
pub const COERCED_AGGRESSIVENESS: f32 = 1.0;

// Notice keys --------------------------------------------------------------
pub(crate) const NOTICE_NO_VEHICLE: &str = "notice.no-vehicle";
pub(crate) const NOTICE_NO_PASSENGER_SEAT: &str = "notice.no-passenger-seat";
pub(crate) const NOTICE_ATTEMPT_SEAT: &str = "notice.attempt-seat";
pub(crate) const NOTICE_ENTERED: &str = "notice.entered";
pub(crate) const NOTICE_ENTRY_TIMEOUT: &str = "notice.entry-timeout";
pub(crate) const NOTICE_ENTRY_ABANDONED: &str = "notice.entry-abandoned";
pub(crate) const NOTICE_ACTIVE_EXIT: &str = "notice.active-exit";
pub(crate) const NOTICE_PASSIVE_EXIT: &str = "notice.passive-exit";
pub(crate) const NOTICE_ADOPTED: &str = "notice.adopted";
pub(crate) const NOTICE_SWITCHED_SEAT: &str = "notice.switched-seat";
pub(crate) const NOTICE_NO_FREE_SEAT: &str = "notice.no-free-seat";
pub(crate) const NOTICE_OCCUPANTS_THREATENED: &str = "notice.occupants-threatened";
pub(crate) const NOTICE_DRIVER_TO_WAYPOINT: &str = "notice.driver-to-waypoint";
pub(crate) const NOTICE_DRIVER_CRUISING: &str = "notice.driver-cruising";
pub(crate) const NOTICE_DRIVER_RECKLESS: &str = "notice.driver-reckless";
