//! View synchronization.
//!
//! [`ViewSynchronizer`] is the only place where playback touches the map,
//! the chart and the virtual clock. It translates "render this flash" or
//! "move the time indicator" into calls on the capability traits in
//! [`view`], so the playback engine never sees a renderer.

pub mod imagery;
pub mod memory;
pub mod view;

pub use imagery::ImageryLayer;
pub use memory::{MemoryChartView, MemoryClock, MemoryMapView};
pub use view::{
    ChartView, IconStyle, IndicatorLine, LayerHandle, MapView, MarkerHandle, MarkerStyle,
    NearFarScalar, PointStyle, ProjectionMode, ScatterSeries, VirtualClock, RED,
};

use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;
use crate::core::{EventSequence, FlashEvent};

/// Id of the chart's "current time" line
pub const INDICATOR_ID: &str = "plot-line";

/// Image used for the transient lightning marker
pub const LIGHTNING_ICON: &str = "static/images/lightning4.png";

/// Scale and translucency falloff of the lightning icon: 2.0 at 150 m, 0.5 at 15 000 km
pub const ICON_FALLOFF: NearFarScalar = NearFarScalar::new(1.5e2, 2.0, 1.5e7, 0.5);

const POINT_PIXEL_SIZE: f32 = 10.0;
const INDICATOR_WIDTH: f32 = 2.0;

/// Routes playback output to the map, chart and clock
pub struct ViewSynchronizer<M, C, K> {
    map: M,
    chart: C,
    clock: K,
    icon: IconStyle,
    cloud_layer: Option<LayerHandle>,
}

impl<M: MapView, C: ChartView, K: VirtualClock> ViewSynchronizer<M, C, K> {
    pub fn new(map: M, chart: C, clock: K) -> Self {
        Self {
            map,
            chart,
            clock,
            icon: IconStyle {
                image: LIGHTNING_ICON.to_string(),
                scale_by_distance: ICON_FALLOFF,
                translucency_by_distance: ICON_FALLOFF,
            },
            cloud_layer: None,
        }
    }

    /// Use a different image for the transient icon
    pub fn with_icon_image(mut self, image: impl Into<String>) -> Self {
        self.icon.image = image.into();
        self
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn chart(&self) -> &C {
        &self.chart
    }

    pub fn clock(&self) -> &K {
        &self.clock
    }

    /// Load the chart series and frame the clock on `day`
    pub fn prepare(&mut self, sequence: &EventSequence, day: NaiveDate) {
        let date = day.format("%Y-%m-%d");
        self.chart.set_series(&ScatterSeries {
            name: format!("Date: {}", date),
            title: format!(
                "Flash Start Time vs Flash Observe Time of {} Individual Flashes",
                sequence.len()
            ),
            subtitle: "Source: GHRC DAAC".to_string(),
            points: sequence.chart_points(),
        });

        let start = day.and_hms_opt(0, 0, 0).map(|t| t.and_utc());
        let end = day.and_hms_opt(23, 59, 59).map(|t| t.and_utc());
        if let (Some(start), Some(end)) = (start, end) {
            self.clock.set_current_time(start);
            self.clock.zoom_to(start, end);
        }
    }

    /// Permanent red point, glowing by observe duration
    pub fn add_point_marker(&mut self, event: &FlashEvent) -> MarkerHandle {
        let style = MarkerStyle::Point(PointStyle {
            color: RED,
            pixel_size: POINT_PIXEL_SIZE,
            glow_power: event.observe_seconds,
        });
        self.map.add_marker(event.position(), &style)
    }

    /// Lightning icon, to be removed on the next tick
    pub fn add_transient_marker(&mut self, event: &FlashEvent) -> MarkerHandle {
        let style = MarkerStyle::Icon(self.icon.clone());
        self.map.add_marker(event.position(), &style)
    }

    pub fn remove_marker(&mut self, handle: MarkerHandle) {
        self.map.remove_marker(handle);
    }

    pub fn clear_all_markers(&mut self) {
        self.map.clear_all();
    }

    /// Move the chart's time indicator to `timestamp_millis`
    pub fn set_time_indicator(&mut self, timestamp_millis: i64) {
        self.chart.remove_indicator_line(INDICATOR_ID);
        self.chart.set_indicator_line(&IndicatorLine {
            id: INDICATOR_ID.to_string(),
            value: timestamp_millis as f64,
            color: RED,
            width: INDICATOR_WIDTH,
        });
    }

    pub fn clear_time_indicator(&mut self) {
        self.chart.remove_indicator_line(INDICATOR_ID);
    }

    pub fn set_clock(&mut self, timestamp_millis: i64) {
        let time = DateTime::<Utc>::from_timestamp_millis(timestamp_millis).unwrap_or_default();
        self.clock.set_current_time(time);
    }

    pub fn set_projection(&mut self, mode: ProjectionMode) {
        debug!("Projection set to {:?}", mode);
        self.map.set_projection_mode(mode);
    }

    /// Show the cloud overlay. Does nothing if one is already shown.
    pub fn show_imagery(&mut self, layer: &ImageryLayer) {
        if self.cloud_layer.is_none() {
            debug!("Adding imagery layer {}", layer.url);
            self.cloud_layer = Some(self.map.add_imagery_layer(layer));
        }
    }

    pub fn hide_imagery(&mut self) {
        if let Some(handle) = self.cloud_layer.take() {
            self.map.remove_imagery_layer(handle);
        }
    }

    pub fn imagery_shown(&self) -> bool {
        self.cloud_layer.is_some()
    }
}

/// Synchronizer over the in-memory views
pub type MemorySynchronizer = ViewSynchronizer<MemoryMapView, MemoryChartView, MemoryClock>;

impl MemorySynchronizer {
    pub fn in_memory() -> Self {
        Self::new(MemoryMapView::new(), MemoryChartView::new(), MemoryClock::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(t: i64) -> FlashEvent {
        FlashEvent::new(34.5, 2.8, 93.0, t)
    }

    #[test]
    fn test_markers_carry_styles() {
        let mut sync = MemorySynchronizer::in_memory();
        let p = sync.add_point_marker(&event(0));
        let i = sync.add_transient_marker(&event(0));

        let markers: Vec<_> = sync.map().markers().collect();
        assert_eq!(markers.len(), 2);
        match &markers.iter().find(|(h, _)| **h == p).unwrap().1.style {
            MarkerStyle::Point(s) => {
                assert_eq!(s.glow_power, 93.0);
                assert_eq!(s.pixel_size, 10.0);
            }
            other => panic!("expected point, got {:?}", other),
        }
        match &markers.iter().find(|(h, _)| **h == i).unwrap().1.style {
            MarkerStyle::Icon(s) => {
                assert_eq!(s.image, LIGHTNING_ICON);
                assert_eq!(s.scale_by_distance, ICON_FALLOFF);
            }
            other => panic!("expected icon, got {:?}", other),
        }

        sync.remove_marker(i);
        assert_eq!(sync.map().icon_count(), 0);
        sync.clear_all_markers();
        assert_eq!(sync.map().marker_count(), 0);
    }

    #[test]
    fn test_time_indicator_replaced() {
        let mut sync = MemorySynchronizer::in_memory();
        sync.set_time_indicator(100);
        sync.set_time_indicator(200);
        assert_eq!(sync.chart().indicator(INDICATOR_ID), Some(200.0));
        assert_eq!(sync.chart().line_count(), 1);

        sync.clear_time_indicator();
        assert_eq!(sync.chart().indicator(INDICATOR_ID), None);
    }

    #[test]
    fn test_set_clock() {
        let mut sync = MemorySynchronizer::in_memory();
        sync.set_clock(1_551_657_600_000);
        assert_eq!(sync.clock().current().unwrap().to_rfc3339(), "2019-03-04T00:00:00+00:00");
    }

    #[test]
    fn test_prepare_loads_series_and_frames_day() {
        let mut sync = MemorySynchronizer::in_memory();
        let seq = EventSequence::from_events(vec![event(2_000), event(1_000)]);
        let day = NaiveDate::from_ymd_opt(2019, 3, 4).unwrap();
        sync.prepare(&seq, day);

        let series = sync.chart().series().unwrap();
        assert_eq!(series.name, "Date: 2019-03-04");
        assert_eq!(series.points.len(), 2);
        assert!(series.title.contains("of 2 Individual Flashes"));

        let (start, end) = sync.clock().window().unwrap();
        assert_eq!(start.to_rfc3339(), "2019-03-04T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2019-03-04T23:59:59+00:00");
        assert_eq!(sync.clock().current(), Some(start));
    }

    #[test]
    fn test_imagery_toggle_is_idempotent() {
        let mut sync = MemorySynchronizer::in_memory();
        let layer = ImageryLayer::daily_clouds(NaiveDate::from_ymd_opt(2019, 3, 4).unwrap());

        sync.show_imagery(&layer);
        sync.show_imagery(&layer);
        assert_eq!(sync.map().layers().count(), 1);
        assert!(sync.imagery_shown());

        sync.hide_imagery();
        sync.hide_imagery();
        assert_eq!(sync.map().layers().count(), 0);
    }

    #[test]
    fn test_projection() {
        let mut sync = MemorySynchronizer::in_memory();
        assert_eq!(sync.map().projection(), ProjectionMode::Scene2D);
        sync.set_projection(ProjectionMode::Scene3D);
        assert_eq!(sync.map().projection(), ProjectionMode::Scene3D);
    }
}
