use std::sync::Arc;
use tracing::{debug, info, trace};
use crate::core::EventSequence;
use crate::playback::{PlaybackState, Step};
use crate::sync::{ChartView, MapView, MarkerHandle, ViewSynchronizer, VirtualClock};

/// Playback engine for flash events.
///
/// Walks the sorted sequence one timestamp group per tick and loops forever.
/// The engine never schedules anything itself; whoever owns it calls
/// [`tick`](Self::tick) on a timer.
pub struct PlaybackEngine {
    events: Arc<EventSequence>,
    /// Last rendered index, `None` before the first event
    cursor: Option<usize>,
    /// Transient icons placed by the latest tick
    active_markers: Vec<MarkerHandle>,
    state: PlaybackState,
    loops: u64,
}

impl PlaybackEngine {
    pub fn new(events: Arc<EventSequence>) -> Self {
        Self {
            events,
            cursor: None,
            active_markers: Vec::new(),
            state: PlaybackState::Idle,
            loops: 0,
        }
    }

    pub fn events(&self) -> &EventSequence {
        &self.events
    }

    /// Index of the last rendered event
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == PlaybackState::Running
    }

    pub fn active_markers(&self) -> &[MarkerHandle] {
        &self.active_markers
    }

    /// How many times playback wrapped around
    pub fn loops(&self) -> u64 {
        self.loops
    }

    /// Move the cursor over the next group of equal-timestamp events.
    ///
    /// Touches no view. Past the last event the cursor is reset and
    /// [`Step::Wrapped`] is returned.
    pub fn advance(&mut self) -> Step {
        let next = self.cursor.map_or(0, |c| c + 1);
        if next >= self.events.len() {
            self.cursor = None;
            self.loops += 1;
            return Step::Wrapped;
        }

        let run = self.events.run_at(next);
        self.cursor = Some(run.end - 1);
        Step::Rendered(run)
    }

    /// Reset the map and the cursor and enter the running state
    pub fn start<M: MapView, C: ChartView, K: VirtualClock>(&mut self, views: &mut ViewSynchronizer<M, C, K>) {
        views.clear_all_markers();
        self.active_markers.clear();
        self.cursor = None;
        self.state = PlaybackState::Running;
        info!("Playback started ({} events, {} groups)", self.events.len(), self.events.group_count());
    }

    /// Render the next timestamp group.
    ///
    /// Returns `None` without touching anything when not running.
    pub fn tick<M: MapView, C: ChartView, K: VirtualClock>(&mut self, views: &mut ViewSynchronizer<M, C, K>) -> Option<Step> {
        if self.state != PlaybackState::Running {
            return None;
        }

        for handle in self.active_markers.drain(..) {
            views.remove_marker(handle);
        }

        let step = self.advance();
        match &step {
            Step::Wrapped => {
                views.clear_all_markers();
                views.clear_time_indicator();
                debug!("Playback wrapped (loop {})", self.loops);
            }
            Step::Rendered(run) => {
                let group = &self.events.as_slice()[run.clone()];
                let timestamp = group[0].timestamp_millis;

                views.set_time_indicator(timestamp);
                for event in group {
                    trace!("Flash at ({}, {})", event.longitude, event.latitude);
                    views.add_point_marker(event);
                    self.active_markers.push(views.add_transient_marker(event));
                }
                views.set_clock(timestamp);

                debug!("Rendered {} flash(es) at {}", group.len(), timestamp);
            }
        }

        Some(step)
    }

    /// Leave the running state and show every event at once
    pub fn stop<M: MapView, C: ChartView, K: VirtualClock>(&mut self, views: &mut ViewSynchronizer<M, C, K>) {
        self.state = PlaybackState::Idle;
        views.clear_all_markers();
        views.clear_time_indicator();
        self.active_markers.clear();
        self.cursor = None;
        self.show_overview(views);
        info!("Playback stopped");
    }

    /// Place one permanent point per event
    pub fn show_overview<M: MapView, C: ChartView, K: VirtualClock>(&self, views: &mut ViewSynchronizer<M, C, K>) {
        for event in self.events.iter() {
            views.add_point_marker(event);
        }
    }
}

/// One playback session: the engine plus the views it drives.
///
/// The controller owns this behind a lock and hands it to the timer task.
pub struct PlaybackSession<M, C, K> {
    pub engine: PlaybackEngine,
    pub views: ViewSynchronizer<M, C, K>,
}

impl<M: MapView, C: ChartView, K: VirtualClock> PlaybackSession<M, C, K> {
    pub fn new(events: Arc<EventSequence>, views: ViewSynchronizer<M, C, K>) -> Self {
        Self {
            engine: PlaybackEngine::new(events),
            views,
        }
    }

    pub fn start(&mut self) {
        self.engine.start(&mut self.views);
    }

    pub fn tick(&mut self) -> Option<Step> {
        self.engine.tick(&mut self.views)
    }

    pub fn stop(&mut self) {
        self.engine.stop(&mut self.views);
    }

    pub fn show_overview(&mut self) {
        self.engine.show_overview(&mut self.views);
    }
}
