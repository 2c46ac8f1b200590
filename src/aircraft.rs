//! Per-aircraft kinematic state, waypoint following, and report generation.

use chrono::{DateTime, SecondsFormat, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::geodesy::{self, Point};

const MAX_TURN_RATE_DEG_S: f64 = 3.0;
const MAX_ACCEL_KT_S: f64 = 2.0;
const WAYPOINT_ARRIVAL_KM: f64 = 5.0;
const MIN_PLAN_LEG_KM: f64 = 185.0;
const MAX_PLAN_LEG_KM: f64 = 555.0;

const AIRLINE_PREFIXES: [&str; 10] =
    ["UAL", "DAL", "AAL", "SWA", "JBU", "DL", "AA", "UA", "WN", "B6"];

/// Aircraft category, with its own kinematic envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Jet,
    Prop,
}

/// The kinematic envelope a category draws its initial state from.
///
/// `initial_speed` is the narrower cruise-speed range aircraft of this
/// category spawn into; `min_speed`/`max_speed` are the wider operational
/// bounds enforced by clamping on every subsequent update.
pub struct Envelope {
    pub min_speed: f64,
    pub max_speed: f64,
    pub initial_speed: (f64, f64),
    pub initial_altitude: (f64, f64),
    pub climb_rate: (f64, f64),
}

impl Category {
    pub fn envelope(self) -> Envelope {
        match self {
            Category::Jet => Envelope {
                min_speed: 200.0,
                max_speed: 600.0,
                initial_speed: (400.0, 550.0),
                initial_altitude: (25000.0, 42000.0),
                climb_rate: (1500.0, 3000.0),
            },
            Category::Prop => Envelope {
                min_speed: 80.0,
                max_speed: 250.0,
                initial_speed: (150.0, 220.0),
                initial_altitude: (8000.0, 18000.0),
                climb_rate: (500.0, 1200.0),
            },
        }
    }
}

/// A navigation fix the aircraft steers toward.
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
}

/// Emergency squawk categories. An unrecognised string falls back to `General`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmergencyKind {
    General,
    Communication,
    Hijack,
}

impl EmergencyKind {
    fn squawk(self) -> &'static str {
        match self {
            EmergencyKind::General => "7700",
            EmergencyKind::Communication => "7600",
            EmergencyKind::Hijack => "7500",
        }
    }

    fn parse(kind: &str) -> Self {
        match kind {
            "communication" => EmergencyKind::Communication,
            "hijack" => EmergencyKind::Hijack,
            _ => EmergencyKind::General,
        }
    }
}

/// Immutable snapshot of an aircraft's state, ready for publication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub icao_address: String,
    pub callsign: String,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: i32,
    pub ground_speed: i32,
    pub heading: i32,
    pub timestamp: String,
    pub squawk: String,
    pub aircraft_type: Category,
}

/// One simulated aircraft: identity, kinematic state, and flight plan.
#[derive(Debug, Clone)]
pub struct Aircraft {
    pub icao_address: String,
    pub callsign: String,
    pub category: Category,

    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub ground_speed: f64,
    pub heading: f64,

    pub min_speed: f64,
    pub max_speed: f64,
    pub climb_rate: f64,

    pub target_heading: f64,
    pub target_speed: f64,
    pub target_altitude: f64,

    pub emergency_state: bool,
    pub conflict_state: bool,
    pub squawk: String,

    pub waypoints: Vec<Waypoint>,
    pub current_waypoint_index: usize,
}

impl Aircraft {
    /// Construct a new aircraft with randomised initial state drawn from
    /// its category envelope, and a freshly generated flight plan.
    pub fn new(icao_address: String, category: Category, rng: &mut impl Rng) -> Self {
        let envelope = category.envelope();

        let latitude = rng.gen_range(-60.0..60.0);
        let longitude = rng.gen_range(-180.0..180.0);
        let altitude = rng.gen_range(envelope.initial_altitude.0..=envelope.initial_altitude.1);
        let ground_speed = rng.gen_range(envelope.initial_speed.0..=envelope.initial_speed.1);
        let heading = rng.gen_range(0.0..360.0);
        let climb_rate = rng.gen_range(envelope.climb_rate.0..=envelope.climb_rate.1);

        let callsign = Self::random_callsign(rng);
        let waypoints = Self::generate_plan(latitude, longitude, rng);

        Self {
            icao_address,
            callsign,
            category,
            latitude,
            longitude,
            altitude,
            ground_speed,
            heading,
            min_speed: envelope.min_speed,
            max_speed: envelope.max_speed,
            climb_rate,
            target_heading: heading,
            target_speed: ground_speed,
            target_altitude: altitude,
            emergency_state: false,
            conflict_state: false,
            squawk: "1200".to_string(),
            waypoints,
            current_waypoint_index: 0,
        }
    }

    fn random_callsign(rng: &mut impl Rng) -> String {
        let prefix = AIRLINE_PREFIXES[rng.gen_range(0..AIRLINE_PREFIXES.len())];
        let number: u32 = rng.gen_range(1000..=9999);
        format!("{prefix}{number}")
    }

    /// Generate a chain of 3-5 waypoints from `(lat, lon)`, each 185-555 km
    /// from the previous at a uniform random bearing.
    fn generate_plan(lat: f64, lon: f64, rng: &mut impl Rng) -> Vec<Waypoint> {
        let count = rng.gen_range(3..=5);
        let mut waypoints = Vec::with_capacity(count);
        let mut current = Point::new(lat, lon);

        for i in 0..count {
            let distance_km = rng.gen_range(MIN_PLAN_LEG_KM..=MAX_PLAN_LEG_KM);
            let bearing = rng.gen_range(0.0..360.0);
            let next = geodesy::destination(current, bearing, distance_km);

            waypoints.push(Waypoint {
                latitude: next.lat,
                longitude: next.lon,
                name: format!("WPT{}", i + 1),
            });
            current = next;
        }

        waypoints
    }

    fn position(&self) -> Point {
        Point::new(self.latitude, self.longitude)
    }

    /// Advance the aircraft's state by `dt` seconds. Applies waypoint
    /// tracking, control-law slewing of heading/speed/altitude, translation
    /// along the resulting heading, and small random noise, in that order.
    pub fn advance(&mut self, dt: f64, rng: &mut impl Rng) {
        self.track_waypoint(rng);
        self.slew_heading(dt);
        self.slew_speed(dt);
        self.slew_altitude(dt);
        self.translate(dt);
        self.apply_noise(rng);
    }

    fn track_waypoint(&mut self, rng: &mut impl Rng) {
        if self.current_waypoint_index >= self.waypoints.len() {
            self.regenerate_plan(rng);
            return;
        }

        let wp = &self.waypoints[self.current_waypoint_index];
        let target = Point::new(wp.latitude, wp.longitude);
        let d = geodesy::distance_km(self.position(), target);
        let b = geodesy::bearing(self.position(), target);

        self.target_heading = b;

        if d < WAYPOINT_ARRIVAL_KM {
            self.current_waypoint_index += 1;
            if self.current_waypoint_index >= self.waypoints.len() {
                self.regenerate_plan(rng);
            }
        }
    }

    fn regenerate_plan(&mut self, rng: &mut impl Rng) {
        self.waypoints = Self::generate_plan(self.latitude, self.longitude, rng);
        self.current_waypoint_index = 0;
    }

    fn slew_heading(&mut self, dt: f64) {
        let dh = geodesy::normalize_heading_diff(self.target_heading - self.heading);
        let max_step = MAX_TURN_RATE_DEG_S * dt;

        if dh.abs() > max_step {
            self.heading += dh.signum() * max_step;
        } else {
            self.heading = self.target_heading;
        }
        self.heading = geodesy::normalize_unsigned(self.heading);
    }

    fn slew_speed(&mut self, dt: f64) {
        let dv = self.target_speed - self.ground_speed;
        let max_step = MAX_ACCEL_KT_S * dt;

        if dv.abs() > max_step {
            self.ground_speed += dv.signum() * max_step;
        } else {
            self.ground_speed = self.target_speed;
        }
        self.clamp_speed();
    }

    fn slew_altitude(&mut self, dt: f64) {
        let max_rate = self.climb_rate / 60.0;
        let da = self.target_altitude - self.altitude;
        let max_step = max_rate * dt;

        if da.abs() > max_step {
            self.altitude += da.signum() * max_step;
        } else {
            self.altitude = self.target_altitude;
        }
        self.clamp_altitude();
    }

    fn translate(&mut self, dt: f64) {
        let d_km = self.ground_speed * 1.852 * dt / 3600.0;
        if d_km > 0.0 {
            let dest = geodesy::destination(self.position(), self.heading, d_km);
            self.latitude = dest.lat;
            self.longitude = dest.lon;
        }
    }

    fn apply_noise(&mut self, rng: &mut impl Rng) {
        self.heading = geodesy::normalize_unsigned(self.heading + rng.gen_range(-0.5..=0.5));
        self.ground_speed += rng.gen_range(-2.0..=2.0);
        self.clamp_speed();
        self.altitude += rng.gen_range(-50.0..=50.0);
        self.clamp_altitude();
    }

    fn clamp_speed(&mut self) {
        self.ground_speed = self.ground_speed.clamp(self.min_speed, self.max_speed);
    }

    fn clamp_altitude(&mut self) {
        self.altitude = self.altitude.clamp(1000.0, 60000.0);
    }

    /// Trigger an emergency: sets `emergency_state` and the matching squawk.
    /// An unrecognised `kind` defaults to a general emergency (squawk 7700).
    pub fn trigger_emergency(&mut self, kind: &str) {
        self.emergency_state = true;
        self.squawk = EmergencyKind::parse(kind).squawk().to_string();
    }

    /// Clear any active emergency, restoring squawk 1200.
    pub fn clear_emergency(&mut self) {
        self.emergency_state = false;
        self.squawk = "1200".to_string();
    }

    /// Annotate whether this aircraft is currently in a separation conflict.
    /// Surveillance-only; has no effect on kinematics.
    pub fn set_conflict(&mut self, in_conflict: bool) {
        self.conflict_state = in_conflict;
    }

    /// Snapshot the current state as a `Report`, rounding/truncating per
    /// the wire format (6 fractional digits for lat/lon, integer ft/kt/deg).
    pub fn report(&self, now: DateTime<Utc>) -> Report {
        Report {
            icao_address: self.icao_address.clone(),
            callsign: self.callsign.clone(),
            latitude: round6(self.latitude),
            longitude: round6(self.longitude),
            altitude: self.altitude as i32,
            ground_speed: self.ground_speed as i32,
            heading: (self.heading as i32).rem_euclid(360),
            timestamp: now.to_rfc3339_opts(SecondsFormat::Micros, false),
            squawk: self.squawk.clone(),
            aircraft_type: self.category,
        }
    }
}

fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}
