//! Decides, per tick per aircraft, whether a position report should be
//! published this tick.
//!
//! The Bernoulli test below is reproduced verbatim from the source
//! behaviour: `U[0,1) < 1 / U[min_interval, max_interval]`. At a 10 Hz tick
//! rate this over-emits relative to the plain reading of
//! `message_interval_{min,max}` as seconds between messages — the expected
//! inter-arrival is the harmonic mean of the interval bounds, sampled once
//! *per tick*, not once per expected message. This is a documented
//! property (see DESIGN.md), not a bug to silently fix.

use rand::Rng;

/// Per-aircraft emission scheduler.
pub struct Emitter {
    min_interval: f64,
    max_interval: f64,
}

impl Emitter {
    pub fn new(min_interval: f64, max_interval: f64) -> Self {
        Self {
            min_interval,
            max_interval,
        }
    }

    /// Draw the two uniforms and return whether this tick should emit.
    pub fn should_emit(&self, rng: &mut impl Rng) -> bool {
        let interval = if self.max_interval > self.min_interval {
            rng.gen_range(self.min_interval..self.max_interval)
        } else {
            self.min_interval
        };
        rng.gen::<f64>() < 1.0 / interval
    }
}
