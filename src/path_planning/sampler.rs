//! Goal-biased, obstacle-rejecting configuration sampler

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::common::Configuration;
use crate::utils::grid_map::OccupancyMap;

pub struct Sampler {
    rng: StdRng,
    goal: Configuration,
    goal_sample_rate: f64,
    heading_range: f64,
}

impl Sampler {
    /// `seed` fixes the sample sequence; `None` seeds from the OS
    pub fn new(goal: Configuration, goal_sample_rate: f64, heading_range: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Sampler {
            rng,
            goal,
            goal_sample_rate: goal_sample_rate.max(0.0).min(1.0),
            heading_range,
        }
    }

    /// Either the goal itself or a uniformly drawn configuration on a free cell.
    ///
    /// Loops until a free cell is hit, so the map must contain at least one.
    pub fn sample(&mut self, map: &OccupancyMap) -> Configuration {
        if self.rng.gen_bool(self.goal_sample_rate) {
            return self.goal;
        }
        loop {
            let q = self.uniform(map);
            if map.is_free(q.x, q.y) {
                return q;
            }
        }
    }

    fn uniform(&mut self, map: &OccupancyMap) -> Configuration {
        let x = self.rng.gen_range(0.0..map.columns() as f64);
        let y = self.rng.gen_range(0.0..map.rows() as f64);
        let heading = if self.heading_range > 0.0 {
            self.rng.gen_range(0.0..self.heading_range)
        } else {
            0.0
        };
        Configuration::new(x, y, heading)
    }
}
