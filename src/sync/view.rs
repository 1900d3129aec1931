use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::core::GeoPosition;
use crate::sync::imagery::ImageryLayer;

/// RGBA color, components in 0.0..=1.0
pub type Color = [f32; 4];

pub const RED: Color = [1.0, 0.0, 0.0, 1.0];

/// Opaque handle to a marker placed on a [`MapView`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerHandle(pub u64);

/// Opaque handle to an imagery layer placed on a [`MapView`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerHandle(pub u64);

/// Map projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProjectionMode {
    #[default]
    Scene2D,
    Scene3D,
}

/// A value that varies with camera distance.
///
/// At or below `near` meters the value is `near_value`, at or beyond `far` it
/// is `far_value`, linear in between.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearFarScalar {
    pub near: f64,
    pub near_value: f64,
    pub far: f64,
    pub far_value: f64,
}

impl NearFarScalar {
    pub const fn new(near: f64, near_value: f64, far: f64, far_value: f64) -> Self {
        Self { near, near_value, far, far_value }
    }

    /// Value at the given camera distance in meters
    pub fn value_at(&self, distance: f64) -> f64 {
        if self.far <= self.near {
            return if distance <= self.near { self.near_value } else { self.far_value };
        }
        let t = ((distance - self.near) / (self.far - self.near)).clamp(0.0, 1.0);
        self.near_value + (self.far_value - self.near_value) * t
    }
}

/// Style of a permanent flash point
#[derive(Debug, Clone, PartialEq)]
pub struct PointStyle {
    pub color: Color,
    pub pixel_size: f32,
    pub glow_power: f64,
}

/// Style of a transient lightning icon (billboard)
#[derive(Debug, Clone, PartialEq)]
pub struct IconStyle {
    pub image: String,
    pub scale_by_distance: NearFarScalar,
    pub translucency_by_distance: NearFarScalar,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MarkerStyle {
    Point(PointStyle),
    Icon(IconStyle),
}

impl MarkerStyle {
    pub fn is_point(&self) -> bool {
        matches!(self, MarkerStyle::Point(_))
    }

    pub fn is_icon(&self) -> bool {
        matches!(self, MarkerStyle::Icon(_))
    }
}

/// Vertical "current time" line on the chart's time axis
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorLine {
    pub id: String,
    /// Position on the x axis (epoch milliseconds)
    pub value: f64,
    pub color: Color,
    pub width: f32,
}

/// The scatter series plotted on the chart (start time vs observe seconds)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScatterSeries {
    pub name: String,
    pub title: String,
    pub subtitle: String,
    pub points: Vec<[f64; 2]>,
}

/// Map rendering surface.
///
/// Implementations for a real globe renderer live outside this crate; the
/// in-memory [`MemoryMapView`](crate::sync::MemoryMapView) backs tests and
/// the headless runner.
pub trait MapView: Send {
    /// Place a marker and return its handle
    fn add_marker(&mut self, position: GeoPosition, style: &MarkerStyle) -> MarkerHandle;

    /// Remove one marker. Unknown handles are ignored.
    fn remove_marker(&mut self, handle: MarkerHandle);

    /// Remove every marker
    fn clear_all(&mut self);

    fn set_projection_mode(&mut self, mode: ProjectionMode);

    fn add_imagery_layer(&mut self, layer: &ImageryLayer) -> LayerHandle;

    fn remove_imagery_layer(&mut self, handle: LayerHandle);
}

/// Time-series chart surface
pub trait ChartView: Send {
    /// Add or replace the indicator line with `line.id`
    fn set_indicator_line(&mut self, line: &IndicatorLine);

    /// Remove the indicator line with `id`, if present
    fn remove_indicator_line(&mut self, id: &str);

    /// Replace the plotted data
    fn set_series(&mut self, series: &ScatterSeries);
}

/// The map's animation clock
pub trait VirtualClock: Send {
    fn set_current_time(&mut self, time: DateTime<Utc>);

    /// Frame the clock's timeline on a window
    fn zoom_to(&mut self, _start: DateTime<Utc>, _end: DateTime<Utc>) {}
}
