use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};
use crate::playback::{PlaybackConfig, PlaybackSession};
use crate::sync::{ChartView, ImageryLayer, MapView, ProjectionMode, VirtualClock};

/// Shortest tick the controller will schedule
const MIN_TICK: Duration = Duration::from_millis(1);

/// Keeps the live timer count accurate however the timer task ends
struct TimerGuard(Arc<AtomicUsize>);

impl TimerGuard {
    fn new(count: Arc<AtomicUsize>) -> Self {
        count.fetch_add(1, Ordering::SeqCst);
        Self(count)
    }
}

impl Drop for TimerGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Start/stop surface for playback, plus the toggles the UI binds to.
///
/// Owns the session and the single timer task that ticks it.
pub struct PlaybackController<M, C, K> {
    session: Arc<Mutex<PlaybackSession<M, C, K>>>,
    config: PlaybackConfig,
    timer: Option<JoinHandle<()>>,
    live_timers: Arc<AtomicUsize>,
}

impl<M, C, K> PlaybackController<M, C, K>
where
    M: MapView + 'static,
    C: ChartView + 'static,
    K: VirtualClock + 'static,
{
    pub fn new(session: PlaybackSession<M, C, K>, config: PlaybackConfig) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            config,
            timer: None,
            live_timers: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Number of timer tasks currently alive (0 or 1)
    pub fn active_timers(&self) -> usize {
        self.live_timers.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Start playback from the first event, restarting if already running
    pub async fn start(&mut self) {
        self.cancel_timer().await;
        self.session.lock().await.start();

        let session = self.session.clone();
        let period = self.config.tick_interval.max(MIN_TICK);
        let guard = TimerGuard::new(self.live_timers.clone());

        self.timer = Some(tokio::spawn(async move {
            let _guard = guard;
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            // The first tick completes immediately; rendering begins one period in
            ticker.tick().await;
            loop {
                ticker.tick().await;
                session.lock().await.tick();
            }
        }));
        debug!("Playback timer scheduled every {:?}", period);
    }

    /// Stop playback and show the overview
    pub async fn stop(&mut self) {
        self.cancel_timer().await;
        self.session.lock().await.stop();
    }

    /// Animation checkbox
    pub async fn enable_animation_toggle(&mut self, on: bool) {
        if on {
            self.start().await;
        } else {
            self.stop().await;
        }
    }

    /// 3-D globe when checked, flat map otherwise
    pub async fn enable_projection_toggle(&self, on: bool) {
        let mode = if on { ProjectionMode::Scene3D } else { ProjectionMode::Scene2D };
        self.session.lock().await.views.set_projection(mode);
    }

    /// Daily cloud imagery for the configured date
    pub async fn enable_cloud_layer_toggle(&self, on: bool) {
        let mut session = self.session.lock().await;
        if on {
            session.views.show_imagery(&ImageryLayer::daily_clouds(self.config.date));
        } else {
            session.views.hide_imagery();
        }
    }

    /// Run `f` against the locked session
    pub async fn with_session<R>(&self, f: impl FnOnce(&mut PlaybackSession<M, C, K>) -> R) -> R {
        let mut session = self.session.lock().await;
        f(&mut *session)
    }

    /// Abort the timer task and wait until it is gone
    async fn cancel_timer(&mut self) {
        if let Some(handle) = self.timer.take() {
            handle.abort();
            // Resolves once the task is dropped; a cancelled JoinError is expected
            let _ = handle.await;
            info!("Playback timer cancelled");
        }
    }
}

impl<M, C, K> Drop for PlaybackController<M, C, K> {
    fn drop(&mut self) {
        if let Some(handle) = self.timer.take() {
            handle.abort();
        }
    }
}
