//! Plotting of the road, traffic and planned paths with gnuplot
//!
//! Plot calls only record layers; everything is drawn onto a single set of
//! axes when the figure is shown or saved.

use gnuplot::{AutoOption, AxesCommon, Caption, Color, Figure, LineWidth, PointSize, PointSymbol};

use crate::common::{FrameTransform, Path2D, PlannerError, PlannerResult, Point2D, Pose2D, Visualizable};
use crate::road::{FrenetFrame, LaneLayout, ReferenceCurve};

pub mod colors {
    pub const BLACK: &str = "#000000";
    pub const RED: &str = "#FF0000";
    pub const BLUE: &str = "#0000FF";
    pub const GRAY: &str = "#808080";
    pub const ORANGE: &str = "#FFA500";

    pub const ROAD: &str = BLACK;
    pub const LANE_MARKING: &str = GRAY;
    pub const PATH: &str = RED;
    pub const EGO: &str = BLUE;
    pub const TRAFFIC: &str = ORANGE;
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
        Self::new(colors::PATH, "Planned path")
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
    x_label: String,
    y_label: String,
    x_range: Option<(f64, f64)>,
    y_range: Option<(f64, f64)>,
    aspect_ratio: Option<f64>,
}

impl Visualizer {
    pub fn new() -> Self {
        Self {
            layers: Vec::new(),
            title: String::new(),
            x_label: "X [m]".to_string(),
            y_label: "Y [m]".to_string(),
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

    /// Number of recorded layers
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn plot_path(&mut self, path: &Path2D, style: &PathStyle) -> &mut Self {
        self.plot_path_xy(&path.x_coords(), &path.y_coords(), style)
    }

    pub fn plot_path_xy(&mut self, x: &[f64], y: &[f64], style: &PathStyle) -> &mut Self {
        self.layers.push(Layer::Lines { x: x.to_vec(), y: y.to_vec(), style: style.clone() });
        self
    }

    pub fn plot_points(&mut self, points: &[Point2D], style: &PointStyle) -> &mut Self {
        self.layers.push(Layer::Points {
            x: points.iter().map(|p| p.x).collect(),
            y: points.iter().map(|p| p.y).collect(),
            style: style.clone(),
        });
        self
    }

    /// Plot the ego vehicle with a heading tick
    pub fn plot_ego(&mut self, pose: &Pose2D, size: f64) -> &mut Self {
        self.plot_points(&[pose.position()], &PointStyle::new(colors::EGO, "Ego").with_size(size));

        let tick = size * 2.0;
        let end_x = pose.x + tick * pose.yaw.cos();
        let end_y = pose.y + tick * pose.yaw.sin();
        self.plot_path_xy(
            &[pose.x, end_x],
            &[pose.y, end_y],
            &PathStyle::new(colors::EGO, "").with_line_width(2.0),
        )
    }

    pub fn plot_traffic(&mut self, vehicles: &[Point2D]) -> &mut Self {
        if vehicles.is_empty() {
            return self;
        }
        self.plot_points(
            vehicles,
            &PointStyle::new(colors::TRAFFIC, "Traffic").with_symbol('S').with_size(1.2),
        )
    }

    /// Plot the reference curve and every lane boundary as closed loops
    pub fn plot_road(&mut self, frame: &FrenetFrame, lanes: &LaneLayout) -> &mut Self {
        let curve = frame.curve();
        for boundary in 0..=lanes.lane_count {
            let d = boundary as f64 * lanes.lane_width;
            let mut points: Vec<Point2D> = curve.samples().iter()
                .map(|p| frame.to_cartesian(p.progress, d))
                .collect();
            if let Some(&first) = points.first() {
                points.push(first);
            }
            let style = if boundary == 0 || boundary == lanes.lane_count {
                PathStyle::new(colors::ROAD, if boundary == 0 { "Road edge" } else { "" })
                    .with_line_width(1.5)
            } else {
                PathStyle::new(colors::LANE_MARKING, "").with_line_width(0.5)
            };
            self.plot_path(&Path2D::from_points(points), &style);
        }
        self
    }

    pub fn show(&self) -> PlannerResult<()> {
        let mut figure = self.render();
        figure.show()
            .map(|_| ())
            .map_err(|e| PlannerError::Visualization(e.to_string()))
    }

    pub fn save_png(&self, path: &str, width: u32, height: u32) -> PlannerResult<()> {
        let mut figure = self.render();
        figure.save_to_png(path, width, height)
            .map_err(|e| PlannerError::Visualization(e.to_string()))
    }

    pub fn save_svg(&self, path: &str) -> PlannerResult<()> {
        let mut figure = self.render();
        figure.save_to_svg(path, 800, 600)
            .map_err(|e| PlannerError::Visualization(e.to_string()))
    }

    fn render(&self) -> Figure {
        let mut figure = Figure::new();
        let axes = figure.axes2d();

        for layer in &self.layers {
            match layer {
                Layer::Lines { x, y, style } => {
                    axes.lines(x, y, &[
                        Caption(&style.caption),
                        Color(&style.color),
                        LineWidth(style.line_width),
                    ]);
                }
                Layer::Points { x, y, style } => {
                    axes.points(x, y, &[
                        Caption(&style.caption),
                        Color(&style.color),
                        PointSymbol(style.symbol),
                        PointSize(style.size),
                    ]);
                }
            }
        }

        if !self.title.is_empty() {
            axes.set_title(&self.title, &[]);
        }
        axes.set_x_label(&self.x_label, &[]);
        axes.set_y_label(&self.y_label, &[]);
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

impl Visualizable for Path2D {
    fn visualize(&self, vis: &mut Visualizer) {
        vis.plot_path(self, &PathStyle::default());
    }
}

impl Visualizable for ReferenceCurve {
    fn visualize(&self, vis: &mut Visualizer) {
        let points: Vec<Point2D> = self.samples().iter().map(|p| p.position()).collect();
        vis.plot_points(&points, &PointStyle::new(colors::GRAY, "Waypoints").with_size(0.5));
    }
}
