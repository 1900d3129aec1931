use std::collections::{BTreeMap, HashMap};
use chrono::{DateTime, Utc};
use crate::core::GeoPosition;
use crate::sync::imagery::ImageryLayer;
use crate::sync::view::{
    ChartView, IndicatorLine, LayerHandle, MapView, MarkerHandle, MarkerStyle, ProjectionMode,
    ScatterSeries, VirtualClock,
};

/// A marker held by [`MemoryMapView`]
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedMarker {
    pub position: GeoPosition,
    pub style: MarkerStyle,
}

/// Map view that keeps its scene in memory.
///
/// Used by tests and by the headless runner, where nothing is drawn but
/// the scene can still be inspected.
#[derive(Debug, Default)]
pub struct MemoryMapView {
    markers: BTreeMap<MarkerHandle, PlacedMarker>,
    layers: BTreeMap<LayerHandle, ImageryLayer>,
    projection: ProjectionMode,
    next_id: u64,
    markers_added: u64,
    clears: u64,
}

impl MemoryMapView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Number of permanent point markers currently placed
    pub fn point_count(&self) -> usize {
        self.markers.values().filter(|m| m.style.is_point()).count()
    }

    /// Number of transient icon markers currently placed
    pub fn icon_count(&self) -> usize {
        self.markers.values().filter(|m| m.style.is_icon()).count()
    }

    pub fn contains(&self, handle: MarkerHandle) -> bool {
        self.markers.contains_key(&handle)
    }

    pub fn markers(&self) -> impl Iterator<Item = (&MarkerHandle, &PlacedMarker)> {
        self.markers.iter()
    }

    /// Markers added since creation, including removed ones
    pub fn markers_added(&self) -> u64 {
        self.markers_added
    }

    /// How many times `clear_all` was called
    pub fn clears(&self) -> u64 {
        self.clears
    }

    pub fn projection(&self) -> ProjectionMode {
        self.projection
    }

    pub fn layers(&self) -> impl Iterator<Item = &ImageryLayer> {
        self.layers.values()
    }

    fn next_handle(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl MapView for MemoryMapView {
    fn add_marker(&mut self, position: GeoPosition, style: &MarkerStyle) -> MarkerHandle {
        let handle = MarkerHandle(self.next_handle());
        self.markers.insert(handle, PlacedMarker { position, style: style.clone() });
        self.markers_added += 1;
        handle
    }

    fn remove_marker(&mut self, handle: MarkerHandle) {
        self.markers.remove(&handle);
    }

    fn clear_all(&mut self) {
        self.markers.clear();
        self.clears += 1;
    }

    fn set_projection_mode(&mut self, mode: ProjectionMode) {
        self.projection = mode;
    }

    fn add_imagery_layer(&mut self, layer: &ImageryLayer) -> LayerHandle {
        let handle = LayerHandle(self.next_handle());
        self.layers.insert(handle, layer.clone());
        handle
    }

    fn remove_imagery_layer(&mut self, handle: LayerHandle) {
        self.layers.remove(&handle);
    }
}

/// Chart view that records indicator movements
#[derive(Debug, Default)]
pub struct MemoryChartView {
    lines: HashMap<String, IndicatorLine>,
    history: Vec<f64>,
    series: Option<ScatterSeries>,
}

impl MemoryChartView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of the indicator line `id`
    pub fn indicator(&self, id: &str) -> Option<f64> {
        self.lines.get(id).map(|l| l.value)
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Every value any indicator was set to, in order
    pub fn history(&self) -> &[f64] {
        &self.history
    }

    pub fn series(&self) -> Option<&ScatterSeries> {
        self.series.as_ref()
    }
}

impl ChartView for MemoryChartView {
    fn set_indicator_line(&mut self, line: &IndicatorLine) {
        self.history.push(line.value);
        self.lines.insert(line.id.clone(), line.clone());
    }

    fn remove_indicator_line(&mut self, id: &str) {
        self.lines.remove(id);
    }

    fn set_series(&mut self, series: &ScatterSeries) {
        self.series = Some(series.clone());
    }
}

/// Virtual clock that just remembers what it was told
#[derive(Debug, Default)]
pub struct MemoryClock {
    current: Option<DateTime<Utc>>,
    window: Option<(DateTime<Utc>, DateTime<Utc>)>,
    updates: u64,
}

impl MemoryClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<DateTime<Utc>> {
        self.current
    }

    pub fn window(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        self.window
    }

    pub fn updates(&self) -> u64 {
        self.updates
    }
}

impl VirtualClock for MemoryClock {
    fn set_current_time(&mut self, time: DateTime<Utc>) {
        self.current = Some(time);
        self.updates += 1;
    }

    fn zoom_to(&mut self, start: DateTime<Utc>, end: DateTime<Utc>) {
        self.window = Some((start, end));
    }
}
