//! Plotting of planning results with gnuplot.
//!
//! Layers are collected first and rendered into a single set of axes when
//! the figure is saved, so obstacles, the explored tree and the solution path
//! share one coordinate frame.

use gnuplot::{AutoOption, AxesCommon, Caption, Color, Figure, LineWidth, PointSize, PointSymbol};

use crate::common::{PlannerError, PlannerResult, Point2D};
use crate::path_planning::solution::Solution;
use crate::utils::grid_map::OccupancyMap;

/// Color palette for consistent styling
pub mod colors {
    pub const BLACK: &str = "#000000";
    pub const RED: &str = "#FF0000";
    pub const GREEN: &str = "#00AA00";
    pub const BLUE: &str = "#0000FF";
    pub const GRAY: &str = "#A0A0A0";

    pub const OBSTACLE: &str = BLACK;
    pub const TREE: &str = GRAY;
    pub const START: &str = GREEN;
    pub const GOAL: &str = BLUE;
    pub const PATH: &str = RED;
}

/// Style for line rendering
#[derive(Debug, Clone)]
pub struct PathStyle {
    pub color: String,
    pub line_width: f64,
    pub caption: String,
}

impl PathStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            line_width: 2.0,
            caption: caption.to_string(),
        }
    }

    pub fn with_line_width(mut self, width: f64) -> Self {
        self.line_width = width;
        self
    }
}

impl Default for PathStyle {
    fn default() -> Self {
        Self::new(colors::PATH, "Path")
    }
}

/// Style for point rendering
#[derive(Debug, Clone)]
pub struct PointStyle {
    pub color: String,
    pub size: f64,
    pub symbol: char,
    pub caption: String,
}

impl PointStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            size: 1.0,
            symbol: 'O',
            caption: caption.to_string(),
        }
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn with_symbol(mut self, symbol: char) -> Self {
        self.symbol = symbol;
        self
    }
}

#[derive(Debug, Clone)]
enum Layer {
    Lines { x: Vec<f64>, y: Vec<f64>, style: PathStyle },
    Points { x: Vec<f64>, y: Vec<f64>, style: PointStyle },
}

pub struct Visualizer {
    layers: Vec<Layer>,
    title: String,
    x_range: Option<(f64, f64)>,
    y_range: Option<(f64, f64)>,
    aspect_ratio: Option<f64>,
}

impl Visualizer {
    pub fn new() -> Self {
        Self {
            layers: Vec::new(),
            title: String::new(),
            x_range: None,
            y_range: None,
            aspect_ratio: Some(1.0),
        }
    }

    pub fn set_title(&mut self, title: &str) -> &mut Self {
        self.title = title.to_string();
        self
    }

    pub fn set_x_range(&mut self, min: f64, max: f64) -> &mut Self {
        self.x_range = Some((min, max));
        self
    }

    pub fn set_y_range(&mut self, min: f64, max: f64) -> &mut Self {
        self.y_range = Some((min, max));
        self
    }

    /// Set aspect ratio (None for auto)
    pub fn set_aspect_ratio(&mut self, ratio: Option<f64>) -> &mut Self {
        self.aspect_ratio = ratio;
        self
    }

    /// Number of layers queued for rendering
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Plot a polyline
    pub fn plot_path(&mut self, points: &[Point2D], style: &PathStyle) -> &mut Self {
        self.layers.push(Layer::Lines {
            x: points.iter().map(|p| p.x).collect(),
            y: points.iter().map(|p| p.y).collect(),
            style: style.clone(),
        });
        self
    }

    /// Plot disconnected segments as one layer; gnuplot breaks lines at NaN
    pub fn plot_segments(&mut self, segments: &[(Point2D, Point2D)], style: &PathStyle) -> &mut Self {
        let mut x = Vec::with_capacity(segments.len() * 3);
        let mut y = Vec::with_capacity(segments.len() * 3);
        for (a, b) in segments {
            x.extend_from_slice(&[a.x, b.x, f64::NAN]);
            y.extend_from_slice(&[a.y, b.y, f64::NAN]);
        }
        self.layers.push(Layer::Lines {
            x,
            y,
            style: style.clone(),
        });
        self
    }

    /// Plot occupied cells as squares at their centers
    pub fn plot_obstacles(&mut self, cells: &[Point2D]) -> &mut Self {
        let style = PointStyle::new(colors::OBSTACLE, "Obstacles")
            .with_symbol('S')
            .with_size(1.0);
        self.plot_points(cells, &style)
    }

    pub fn plot_points(&mut self, points: &[Point2D], style: &PointStyle) -> &mut Self {
        self.layers.push(Layer::Points {
            x: points.iter().map(|p| p.x).collect(),
            y: points.iter().map(|p| p.y).collect(),
            style: style.clone(),
        });
        self
    }

    pub fn plot_start(&mut self, point: Point2D) -> &mut Self {
        self.plot_points(&[point], &PointStyle::new(colors::START, "Start").with_size(1.5))
    }

    pub fn plot_goal(&mut self, point: Point2D) -> &mut Self {
        self.plot_points(&[point], &PointStyle::new(colors::GOAL, "Goal").with_size(1.5))
    }

    /// Save plot to SVG file
    pub fn save_svg(&self, path: &str) -> PlannerResult<()> {
        let mut figure = self.render();
        figure
            .save_to_svg(path, 800, 800)
            .map_err(|e| PlannerError::VisualizationError(e.to_string()))
    }

    fn render(&self) -> Figure {
        let mut figure = Figure::new();
        let axes = figure.axes2d();

        for layer in &self.layers {
            match layer {
                Layer::Lines { x, y, style } => {
                    axes.lines(
                        x,
                        y,
                        &[Caption(&style.caption), Color(&style.color), LineWidth(style.line_width)],
                    );
                }
                Layer::Points { x, y, style } => {
                    axes.points(
                        x,
                        y,
                        &[
                            Caption(&style.caption),
                            Color(&style.color),
                            PointSymbol(style.symbol),
                            PointSize(style.size),
                        ],
                    );
                }
            }
        }

        if !self.title.is_empty() {
            axes.set_title(&self.title, &[]);
        }
        axes.set_x_label("x", &[]);
        axes.set_y_label("y", &[]);
        if let Some((min, max)) = self.x_range {
            axes.set_x_range(AutoOption::Fix(min), AutoOption::Fix(max));
        }
        if let Some((min, max)) = self.y_range {
            axes.set_y_range(AutoOption::Fix(min), AutoOption::Fix(max));
        }
        if let Some(ratio) = self.aspect_ratio {
            axes.set_aspect_ratio(AutoOption::Fix(ratio));
        }
        figure
    }
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Obstacles, explored tree, solution path and endpoints on the map frame
pub fn plot_solution(map: &OccupancyMap, solution: &Solution, start: Point2D, goal: Point2D) -> Visualizer {
    let mut vis = Visualizer::new();
    vis.set_title("grid_rrt")
        .set_x_range(0.0, map.columns() as f64)
        .set_y_range(0.0, map.rows() as f64);

    vis.plot_obstacles(&map.obstacle_cells());
    vis.plot_segments(
        &solution.explored,
        &PathStyle::new(colors::TREE, "Tree").with_line_width(1.0),
    );
    vis.plot_path(&solution.path.points, &PathStyle::default());
    vis.plot_start(start);
    vis.plot_goal(goal);
    vis
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Path2D;

    #[test]
    fn test_path_style() {
        let style = PathStyle::new(colors::RED, "Test Path").with_line_width(3.0);
        assert_eq!(style.line_width, 3.0);
        assert_eq!(style.color, colors::RED);
    }

    #[test]
    fn test_segments_are_separated() {
        let mut vis = Visualizer::new();
        let segments = [
            (Point2D::new(0.0, 0.0), Point2D::new(1.0, 1.0)),
            (Point2D::new(2.0, 0.0), Point2D::new(2.0, 1.0)),
        ];
        vis.plot_segments(&segments, &PathStyle::default());
        match &vis.layers[0] {
            Layer::Lines { x, y, .. } => {
                assert_eq!(x.len(), 6);
                assert!(x[2].is_nan() && y[5].is_nan());
                assert_eq!((x[3], y[4]), (2.0, 1.0));
            }
            Layer::Points { .. } => panic!("expected a line layer"),
        }
    }

    #[test]
    fn test_plot_solution_layers() {
        let map = OccupancyMap::from_rows(3, 2, &["#..", "..#"]).unwrap();
        let solution = Solution {
            cost: 1.0,
            path: Path2D::from_points(vec![Point2D::new(0.5, 0.5), Point2D::new(1.5, 0.5)]),
            explored: vec![(Point2D::new(0.5, 0.5), Point2D::new(1.5, 0.5))],
        };
        let vis = plot_solution(&map, &solution, Point2D::new(0.5, 0.5), Point2D::new(1.5, 0.5));
        // obstacles, tree, path, start, goal
        assert_eq!(vis.layer_count(), 5);
        assert_eq!(vis.x_range, Some((0.0, 3.0)));
    }
}
