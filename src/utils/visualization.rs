//! Visualization utilities for near_kpiece
//!
//! Plots 2-D projections of planner output using gnuplot.

use gnuplot::{AutoOption, AxesCommon, Caption, Color, Figure, LineWidth, PointSize, PointSymbol};
use nalgebra::DVector;

use crate::common::{Path, Point2D};
use crate::state_space::{BallObstacle, GoalBox};

/// Number of segments used to draw a circle
const CIRCLE_SEGMENTS: usize = 48;

/// Color palette for consistent styling
pub mod colors {
    pub const BLACK: &str = "#000000";
    pub const RED: &str = "#FF0000";
    pub const GREEN: &str = "#00FF00";
    pub const BLUE: &str = "#0000FF";
    pub const LIGHT_GRAY: &str = "#C0C0C0";

    pub const OBSTACLE: &str = BLACK;
    pub const START: &str = GREEN;
    pub const GOAL: &str = BLUE;
    pub const PATH: &str = RED;
    pub const TREE: &str = LIGHT_GRAY;
}

/// Style for path rendering
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
}

/// Plots the first two coordinates of planner states
pub struct Visualizer {
    figure: Figure,
    title: String,
    x_range: Option<(f64, f64)>,
    y_range: Option<(f64, f64)>,
    aspect_ratio: Option<f64>,
}

impl Visualizer {
    pub fn new() -> Self {
        Self {
            figure: Figure::new(),
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

    /// Plot every tree edge as a thin segment from parent to child
    pub fn plot_tree(&mut self, tree: &[(DVector<f64>, Option<usize>)]) -> &mut Self {
        let axes = self.figure.axes2d();
        for (state, parent) in tree {
            if let Some(parent) = parent.and_then(|p| tree.get(p)) {
                let a = Point2D::from_state(&parent.0);
                let b = Point2D::from_state(state);
                axes.lines(&[a.x, b.x], &[a.y, b.y], &[Color(colors::TREE)]);
            }
        }
        self
    }

    pub fn plot_path(&mut self, path: &Path<DVector<f64>>, style: &PathStyle) -> &mut Self {
        let points: Vec<Point2D> = path.states.iter().map(Point2D::from_state).collect();
        let x: Vec<f64> = points.iter().map(|p| p.x).collect();
        let y: Vec<f64> = points.iter().map(|p| p.y).collect();

        self.figure.axes2d().lines(
            &x,
            &y,
            &[Caption(&style.caption), Color(&style.color), LineWidth(style.line_width)],
        );
        self
    }

    /// Plot ball obstacles as circle outlines
    pub fn plot_obstacles(&mut self, obstacles: &[BallObstacle]) -> &mut Self {
        let axes = self.figure.axes2d();
        for (i, obstacle) in obstacles.iter().enumerate() {
            let center = Point2D::from_state(&obstacle.center);
            let (x, y): (Vec<f64>, Vec<f64>) = (0..=CIRCLE_SEGMENTS)
                .map(|k| {
                    let angle = 2.0 * std::f64::consts::PI * k as f64 / CIRCLE_SEGMENTS as f64;
                    (
                        center.x + obstacle.radius * angle.cos(),
                        center.y + obstacle.radius * angle.sin(),
                    )
                })
                .unzip();
            if i == 0 {
                axes.lines(&x, &y, &[Caption("Obstacles"), Color(colors::OBSTACLE)]);
            } else {
                axes.lines(&x, &y, &[Color(colors::OBSTACLE)]);
            }
        }
        self
    }

    /// Plot the outline of a goal box
    pub fn plot_goal_box(&mut self, goal: &GoalBox) -> &mut Self {
        let low = Point2D::from_state(goal.low());
        let high = Point2D::from_state(goal.high());
        self.figure.axes2d().lines(
            &[low.x, high.x, high.x, low.x, low.x],
            &[low.y, low.y, high.y, high.y, low.y],
            &[Caption("Goal"), Color(colors::GOAL), LineWidth(2.0)],
        );
        self
    }

    pub fn plot_point(&mut self, point: Point2D, style: &PointStyle) -> &mut Self {
        self.figure.axes2d().points(
            &[point.x],
            &[point.y],
            &[
                Caption(&style.caption),
                Color(&style.color),
                PointSymbol(style.symbol),
                PointSize(style.size),
            ],
        );
        self
    }

    pub fn plot_start(&mut self, state: &DVector<f64>) -> &mut Self {
        let style = PointStyle::new(colors::START, "Start").with_size(1.5);
        self.plot_point(Point2D::from_state(state), &style)
    }

    pub fn show(&mut self) -> Result<(), String> {
        self.apply_settings();
        self.figure.show().map_err(|e| e.to_string()).map(|_| ())
    }

    pub fn save_png(&mut self, path: &str, width: u32, height: u32) -> Result<(), String> {
        self.apply_settings();
        self.figure.save_to_png(path, width, height).map_err(|e| e.to_string())
    }

    fn apply_settings(&mut self) {
        let axes = self.figure.axes2d();

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
    }
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visualizer_creation() {
        let vis = Visualizer::new();
        assert!(vis.aspect_ratio.is_some());
        assert!(vis.title.is_empty());
    }

    #[test]
    fn test_path_style() {
        let style = PathStyle::new(colors::GREEN, "Tree path").with_line_width(3.0);
        assert_eq!(style.line_width, 3.0);
        assert_eq!(style.color, colors::GREEN);
        assert_eq!(PathStyle::default().caption, "Path");
    }
}
