//! Line-oriented problem description.
//!
//! ```text
//! <columns>
//! <rows>
//! <rows lines of grid, top row first, '#' = obstacle>
//! <start x>
//! <start y>
//! <goal x>
//! <goal y>
//! ```

use std::str::FromStr;

use log::warn;

use crate::common::{Point2D, PlannerError, PlannerResult};
use crate::utils::grid_map::OccupancyMap;

#[derive(Debug, Clone)]
pub struct Problem {
    pub map: OccupancyMap,
    pub start: Point2D,
    pub goal: Point2D,
}

impl Problem {
    pub fn parse(text: &str) -> PlannerResult<Self> {
        let lines: Vec<&str> = text.lines().map(|l| l.trim_end_matches('\r')).collect();
        let line = |i: usize| line_at(&lines, i);

        let columns: usize = parse_number(line(0)?, 1)?;
        let rows: usize = parse_number(line(1)?, 2)?;

        let mut grid_rows = Vec::new();
        for i in 2..rows.saturating_add(2) {
            grid_rows.push(line(i)?);
        }
        let map = OccupancyMap::from_rows(columns, rows, &grid_rows).map_err(|e| match e {
            PlannerError::InvalidParameter(msg) => PlannerError::ParseError(msg),
            other => other,
        })?;

        let base = rows + 2;
        let mut coords = [0.0_f64; 4];
        for (k, value) in coords.iter_mut().enumerate() {
            *value = parse_number(line(base + k)?, base + k + 1)?;
        }
        let start = Point2D::new(coords[0], coords[1]);
        let goal = Point2D::new(coords[2], coords[3]);

        if !map.is_free(start.x, start.y) {
            warn!("start ({}, {}) is not on a free cell", start.x, start.y);
        }
        if !map.is_free(goal.x, goal.y) {
            warn!("goal ({}, {}) is not on a free cell; planning will not terminate", goal.x, goal.y);
        }

        Ok(Problem { map, start, goal })
    }
}

impl FromStr for Problem {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Problem::parse(s)
    }
}

fn line_at<'a>(lines: &[&'a str], i: usize) -> PlannerResult<&'a str> {
    lines
        .get(i)
        .copied()
        .ok_or_else(|| PlannerError::parse(i + 1, "unexpected end of input"))
}

fn parse_number<T: FromStr>(raw: &str, line_no: usize) -> PlannerResult<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| PlannerError::parse(line_no, format!("'{}': {}", raw.trim(), e)))
}
