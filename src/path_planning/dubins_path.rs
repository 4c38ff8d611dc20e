// Dubins path planner
//
// Shortest forward-only curve between two oriented configurations with a
// bounded turning radius. Each path is one of six words built from left arcs,
// right arcs and straight segments.

use std::f64::consts::PI;

use crate::common::{Configuration, EdgeModel, PlannerError, PlannerResult, Point2D};
use crate::path_planning::edge::{Edge, EdgeShape};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Left,
    Straight,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DubinsWord {
    Lsl,
    Lsr,
    Rsl,
    Rsr,
    Rlr,
    Lrl,
}

impl DubinsWord {
    pub const ALL: [DubinsWord; 6] = [
        DubinsWord::Lsl,
        DubinsWord::Lsr,
        DubinsWord::Rsl,
        DubinsWord::Rsr,
        DubinsWord::Rlr,
        DubinsWord::Lrl,
    ];

    pub fn segments(self) -> [SegmentKind; 3] {
        use SegmentKind::*;
        match self {
            DubinsWord::Lsl => [Left, Straight, Left],
            DubinsWord::Lsr => [Left, Straight, Right],
            DubinsWord::Rsl => [Right, Straight, Left],
            DubinsWord::Rsr => [Right, Straight, Right],
            DubinsWord::Rlr => [Right, Left, Right],
            DubinsWord::Lrl => [Left, Right, Left],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DubinsPath {
    pub word: DubinsWord,
    /// Segment lengths in world units
    pub lengths: [f64; 3],
    pub radius: f64,
}

fn mod2pi(theta: f64) -> f64 {
    theta - 2.0 * PI * (theta / (2.0 * PI)).floor()
}

/// Normalized problem: start at the origin facing `alpha`, goal at distance
/// `d` on the x axis facing `beta`, unit turning radius.
struct Intermediate {
    alpha: f64,
    beta: f64,
    d: f64,
    sa: f64,
    sb: f64,
    ca: f64,
    cb: f64,
    c_ab: f64,
    d_sq: f64,
}

impl Intermediate {
    fn new(q0: &Configuration, q1: &Configuration, radius: f64) -> Self {
        let dx = q1.x - q0.x;
        let dy = q1.y - q0.y;
        let d = (dx * dx + dy * dy).sqrt() / radius;
        let theta = if d > 0.0 { mod2pi(dy.atan2(dx)) } else { 0.0 };
        let alpha = mod2pi(q0.heading - theta);
        let beta = mod2pi(q1.heading - theta);
        Intermediate {
            alpha,
            beta,
            d,
            sa: alpha.sin(),
            sb: beta.sin(),
            ca: alpha.cos(),
            cb: beta.cos(),
            c_ab: (alpha - beta).cos(),
            d_sq: d * d,
        }
    }

    /// Normalized (t, p, q) for `word`, if that word is feasible
    fn solve(&self, word: DubinsWord) -> Option<[f64; 3]> {
        let Intermediate { alpha, beta, d, sa, sb, ca, cb, c_ab, d_sq } = *self;
        match word {
            DubinsWord::Lsl => {
                let p_sq = 2.0 + d_sq - 2.0 * c_ab + 2.0 * d * (sa - sb);
                if p_sq < 0.0 {
                    return None;
                }
                let tmp = (cb - ca).atan2(d + sa - sb);
                Some([mod2pi(tmp - alpha), p_sq.sqrt(), mod2pi(beta - tmp)])
            }
            DubinsWord::Rsr => {
                let p_sq = 2.0 + d_sq - 2.0 * c_ab + 2.0 * d * (sb - sa);
                if p_sq < 0.0 {
                    return None;
                }
                let tmp = (ca - cb).atan2(d - sa + sb);
                Some([mod2pi(alpha - tmp), p_sq.sqrt(), mod2pi(tmp - beta)])
            }
            DubinsWord::Lsr => {
                let p_sq = -2.0 + d_sq + 2.0 * c_ab + 2.0 * d * (sa + sb);
                if p_sq < 0.0 {
                    return None;
                }
                let p = p_sq.sqrt();
                let tmp = (-ca - cb).atan2(d + sa + sb) - (-2.0_f64).atan2(p);
                Some([mod2pi(tmp - alpha), p, mod2pi(tmp - beta)])
            }
            DubinsWord::Rsl => {
                let p_sq = -2.0 + d_sq + 2.0 * c_ab - 2.0 * d * (sa + sb);
                if p_sq < 0.0 {
                    return None;
                }
                let p = p_sq.sqrt();
                let tmp = (ca + cb).atan2(d - sa - sb) - (2.0_f64).atan2(p);
                Some([mod2pi(alpha - tmp), p, mod2pi(beta - tmp)])
            }
            DubinsWord::Rlr => {
                let tmp = (6.0 - d_sq + 2.0 * c_ab + 2.0 * d * (sa - sb)) / 8.0;
                if tmp.abs() > 1.0 {
                    return None;
                }
                let p = mod2pi(2.0 * PI - tmp.acos());
                let t = mod2pi(alpha - (ca - cb).atan2(d - sa + sb) + p / 2.0);
                Some([t, p, mod2pi(alpha - beta - t + p)])
            }
            DubinsWord::Lrl => {
                let tmp = (6.0 - d_sq + 2.0 * c_ab + 2.0 * d * (sb - sa)) / 8.0;
                if tmp.abs() > 1.0 {
                    return None;
                }
                let p = mod2pi(2.0 * PI - tmp.acos());
                let t = mod2pi(-alpha - (ca - cb).atan2(d + sa - sb) + p / 2.0);
                Some([t, p, mod2pi(beta - alpha - t + p)])
            }
        }
    }
}

/// Move `length` along a single segment starting at `q`
fn advance(q: &Configuration, kind: SegmentKind, length: f64, radius: f64) -> Configuration {
    let th = q.heading;
    match kind {
        SegmentKind::Straight => Configuration::new(
            q.x + length * th.cos(),
            q.y + length * th.sin(),
            th,
        ),
        SegmentKind::Left => {
            let phi = length / radius;
            Configuration::new(
                q.x + radius * ((th + phi).sin() - th.sin()),
                q.y + radius * (th.cos() - (th + phi).cos()),
                th + phi,
            )
        }
        SegmentKind::Right => {
            let phi = length / radius;
            Configuration::new(
                q.x + radius * (th.sin() - (th - phi).sin()),
                q.y + radius * ((th - phi).cos() - th.cos()),
                th - phi,
            )
        }
    }
}

impl DubinsPath {
    /// Shortest Dubins path from `q0` to `q1`, or `None` for non-finite input
    pub fn shortest(q0: &Configuration, q1: &Configuration, radius: f64) -> Option<Self> {
        if !(radius > 0.0) {
            return None;
        }
        let inter = Intermediate::new(q0, q1, radius);
        DubinsWord::ALL
            .iter()
            .filter_map(|&word| inter.solve(word).map(|params| (word, params)))
            .filter(|(_, params)| params.iter().all(|p| p.is_finite()))
            .min_by(|a, b| {
                let la: f64 = a.1.iter().sum();
                let lb: f64 = b.1.iter().sum();
                la.total_cmp(&lb)
            })
            .map(|(word, params)| DubinsPath {
                word,
                lengths: [params[0] * radius, params[1] * radius, params[2] * radius],
                radius,
            })
    }

    pub fn length(&self) -> f64 {
        self.lengths.iter().sum()
    }

    /// Configuration reached after travelling `s` along the path from `q0`
    pub fn interpolate(&self, q0: &Configuration, s: f64) -> Configuration {
        let mut remaining = s.max(0.0);
        let mut q = *q0;
        for (&kind, &len) in self.word.segments().iter().zip(self.lengths.iter()) {
            if remaining <= len {
                return advance(&q, kind, remaining, self.radius);
            }
            q = advance(&q, kind, len, self.radius);
            remaining -= len;
        }
        q
    }

    /// Configurations at arc lengths 0, step, 2*step, ... strictly below the
    /// path length
    pub fn sample_many(&self, q0: &Configuration, step: f64) -> Vec<Configuration> {
        let total = self.length();
        let n = (total / step).ceil() as usize;
        (0..n.max(1))
            .map(|i| i as f64 * step)
            .take_while(|&s| s < total || s == 0.0)
            .map(|s| self.interpolate(q0, s))
            .collect()
    }
}

/// Configuration for the curvature-bounded edge model
#[derive(Debug, Clone)]
pub struct DubinsConfig {
    /// Minimum turning radius
    pub turning_radius: f64,
    /// Arc-length step for collision checking
    pub step: f64,
    /// Arc-length step for reported polylines
    pub display_step: f64,
}

impl Default for DubinsConfig {
    fn default() -> Self {
        Self {
            turning_radius: 0.2,
            step: 0.01,
            display_step: 0.1,
        }
    }
}

impl DubinsConfig {
    pub fn validate(&self) -> PlannerResult<()> {
        if !(self.turning_radius > 0.0) {
            return Err(PlannerError::InvalidParameter(format!(
                "turning radius must be positive, got {}",
                self.turning_radius
            )));
        }
        if !(self.step > 0.0) || !(self.display_step > 0.0) {
            return Err(PlannerError::InvalidParameter(
                "curve sampling steps must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Nonholonomic edge model: shortest Dubins curve between oriented configurations
#[derive(Debug, Clone)]
pub struct DubinsCurve {
    config: DubinsConfig,
}

impl DubinsCurve {
    pub fn new(config: DubinsConfig) -> PlannerResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DubinsConfig {
        &self.config
    }
}

impl EdgeModel for DubinsCurve {
    fn name(&self) -> &'static str {
        "dubins"
    }

    fn connect(&self, from: &Configuration, to: &Configuration) -> Option<Edge> {
        let path = DubinsPath::shortest(from, to, self.config.turning_radius)?;
        Some(Edge::new(*from, *to, path.length(), EdgeShape::Dubins(path)))
    }

    fn collision_step(&self) -> f64 {
        self.config.step
    }

    fn polyline(&self, edge: &Edge) -> Vec<Point2D> {
        edge.sample(self.config.display_step)
    }
}
