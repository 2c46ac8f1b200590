//! Owns the whole aircraft fleet: construction, tick advancement, pairwise
//! separation scanning, and emergency sampling.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use chrono::{DateTime, Utc};

use crate::aircraft::{Aircraft, Category, Report};
use crate::emitter::Emitter;
use crate::geodesy::{self, Point};

const ICAO_RESAMPLE_ATTEMPTS: usize = 100;
const SEPARATION_HORIZONTAL_NM: f64 = 5.0;
const SEPARATION_VERTICAL_FT: f64 = 1000.0;

/// Pure counters over the current fleet state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FleetStats {
    pub n: usize,
    pub n_emergency: usize,
    pub n_conflict: usize,
}

/// Owns every simulated aircraft for the lifetime of the process.
pub struct Fleet {
    aircraft: Vec<Aircraft>,
    rng: StdRng,
}

impl Fleet {
    /// Build a fleet of `num_aircraft`, with category chosen per-slot with
    /// probability `jet_ratio` of being a jet. `seed` drives every random
    /// draw made during construction and subsequent ticks.
    pub fn new(num_aircraft: usize, jet_ratio: f64, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut used_icaos: HashSet<String> = HashSet::new();
        let mut aircraft = Vec::with_capacity(num_aircraft);

        for _ in 0..num_aircraft {
            let icao = Self::resample_icao(&mut rng, &mut used_icaos);
            let category = if rng.gen::<f64>() < jet_ratio {
                Category::Jet
            } else {
                Category::Prop
            };
            aircraft.push(Aircraft::new(icao, category, &mut rng));
        }

        Self { aircraft, rng }
    }

    fn resample_icao(rng: &mut impl Rng, used: &mut HashSet<String>) -> String {
        for _ in 0..ICAO_RESAMPLE_ATTEMPTS {
            let candidate = format!("{:06X}", rng.gen_range(0u32..=0xFFFFFF));
            if used.insert(candidate.clone()) {
                return candidate;
            }
        }
        // Exhausted the resample budget; accept whatever collision occurs.
        // The spec does not require uniqueness.
        format!("{:06X}", rng.gen_range(0u32..=0xFFFFFF))
    }

    pub fn aircraft(&self) -> &[Aircraft] {
        &self.aircraft
    }

    pub fn aircraft_mut(&mut self) -> &mut [Aircraft] {
        &mut self.aircraft
    }

    /// Advance every aircraft's kinematic state by `dt` seconds.
    pub fn advance_all(&mut self, dt: f64) {
        for ac in &mut self.aircraft {
            ac.advance(dt, &mut self.rng);
        }
    }

    /// Pairwise separation scan over all `C(n, 2)` pairs. A pair is in
    /// conflict iff horizontal distance < 5 nm and vertical separation
    /// < 1000 ft. Clears every `conflict_state` first, then sets it on
    /// both aircraft of each conflicting pair. Returns the conflict count.
    pub fn separation_scan(&mut self) -> usize {
        for ac in &mut self.aircraft {
            ac.set_conflict(false);
        }

        let n = self.aircraft.len();
        let mut conflicts = 0;

        for i in 0..n {
            for j in (i + 1)..n {
                let p1 = Point::new(self.aircraft[i].latitude, self.aircraft[i].longitude);
                let p2 = Point::new(self.aircraft[j].latitude, self.aircraft[j].longitude);

                let horizontal = geodesy::distance_nm(p1, p2);
                let vertical = (self.aircraft[i].altitude - self.aircraft[j].altitude).abs();

                if horizontal < SEPARATION_HORIZONTAL_NM && vertical < SEPARATION_VERTICAL_FT {
                    self.aircraft[i].set_conflict(true);
                    self.aircraft[j].set_conflict(true);
                    conflicts += 1;
                }
            }
        }

        conflicts
    }

    /// For each aircraft not already in an emergency, trigger one with
    /// independent probability `freq`, drawing a uniform emergency kind.
    pub fn sample_emergencies(&mut self, freq: f64) {
        const KINDS: [&str; 3] = ["general", "communication", "hijack"];

        for ac in &mut self.aircraft {
            if !ac.emergency_state && self.rng.gen::<f64>() < freq {
                let kind = KINDS[self.rng.gen_range(0..KINDS.len())];
                ac.trigger_emergency(kind);
            }
        }
    }

    /// For each aircraft, independently roll the emitter's Bernoulli test
    /// and invoke `f` with that aircraft's report if it fires. Owns the
    /// fleet's RNG so the scheduler never needs direct access to it.
    pub fn for_each_due_report(
        &mut self,
        emitter: &Emitter,
        now: DateTime<Utc>,
        mut f: impl FnMut(Report),
    ) {
        for ac in &mut self.aircraft {
            if emitter.should_emit(&mut self.rng) {
                f(ac.report(now));
            }
        }
    }

    pub fn stats(&self) -> FleetStats {
        FleetStats {
            n: self.aircraft.len(),
            n_emergency: self.aircraft.iter().filter(|a| a.emergency_state).count(),
            n_conflict: self.aircraft.iter().filter(|a| a.conflict_state).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separation_detects_close_conflicting_pair() {
        let mut fleet = Fleet::new(2, 1.0, 1);
        {
            let ac = fleet.aircraft_mut();
            ac[0].latitude = 0.0;
            ac[0].longitude = 0.0;
            ac[0].altitude = 35000.0;
            ac[1].latitude = 0.0;
            ac[1].longitude = 0.01;
            ac[1].altitude = 35000.0;
        }

        let count = fleet.separation_scan();
        assert_eq!(count, 1);
        assert!(fleet.aircraft()[0].conflict_state);
        assert!(fleet.aircraft()[1].conflict_state);

        fleet.aircraft_mut()[1].altitude = 35000.0 + 1500.0;
        let count = fleet.separation_scan();
        assert_eq!(count, 0);
        assert!(!fleet.aircraft()[0].conflict_state);
        assert!(!fleet.aircraft()[1].conflict_state);
    }

    #[test]
    fn separation_scan_clears_stale_conflicts() {
        let mut fleet = Fleet::new(2, 1.0, 2);
        {
            let ac = fleet.aircraft_mut();
            ac[0].latitude = 0.0;
            ac[0].longitude = 0.0;
            ac[0].altitude = 35000.0;
            ac[1].latitude = 0.0;
            ac[1].longitude = 0.01;
            ac[1].altitude = 35000.0;
        }
        assert_eq!(fleet.separation_scan(), 1);

        fleet.aircraft_mut()[1].longitude = 5.0;
        assert_eq!(fleet.separation_scan(), 0);
        assert!(!fleet.aircraft()[0].conflict_state);
    }

    #[test]
    fn stats_reflect_counts() {
        let mut fleet = Fleet::new(5, 0.5, 3);
        fleet.aircraft_mut()[0].trigger_emergency("general");
        let stats = fleet.stats();
        assert_eq!(stats.n, 5);
        assert_eq!(stats.n_emergency, 1);
    }

    #[test]
    fn fleet_size_matches_request() {
        let fleet = Fleet::new(75, 0.7, 4);
        assert_eq!(fleet.aircraft().len(), 75);
    }
}
