//! Application context and the frame loop that drives it.
//!
//! The frame loop is the only code that touches the registry. Refreshes run
//! on their own task and hand results back over a channel, tagged with the
//! generation that requested them.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::catalog::{CacheStats, CatalogSource, CategorizedObject, ElementCache};
use crate::projector::{Camera, Viewport};
use crate::registry::{SatelliteRegistry, SceneSink};
use crate::snapshot::SnapshotSink;

pub type SharedCache<C> = Arc<Mutex<ElementCache<C>>>;

/// Requests from the outside world, applied between frames.
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    Refresh,
    SetOrbits(bool),
    SetLabels(bool),
    Resize(Viewport),
}

#[derive(Debug)]
pub struct RefreshResult {
    pub generation: u64,
    pub objects: Vec<CategorizedObject>,
    pub stats: CacheStats,
}

pub struct AppContext<S> {
    registry: SatelliteRegistry<S>,
    camera: Camera,
    viewport: Viewport,
    generation: u64,
}

impl<S: SceneSink> AppContext<S> {
    pub fn new(registry: SatelliteRegistry<S>, camera: Camera, viewport: Viewport) -> Self {
        Self {
            registry,
            camera,
            viewport,
            generation: 0,
        }
    }

    pub fn registry(&self) -> &SatelliteRegistry<S> {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut SatelliteRegistry<S> {
        &mut self.registry
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Start a new refresh; any result from an earlier one becomes stale.
    pub fn begin_refresh(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Ingest `result` unless a newer refresh has been started since.
    pub fn apply_refresh(&mut self, result: RefreshResult, now: DateTime<Utc>) -> bool {
        if result.generation != self.generation {
            debug!(
                "Discarding refresh {} (current is {})",
                result.generation, self.generation
            );
            return false;
        }
        self.registry.ingest(result.objects, now);
        true
    }

    /// One frame: move satellites, then place labels. Returns the number of
    /// visible labels.
    pub fn tick(&mut self, now: DateTime<Utc>) -> usize {
        self.registry.update_all(now);
        let transform = self.camera.transform(&self.viewport);
        self.registry.update_labels(&transform, &self.viewport)
    }

    /// Returns the generation to fetch when the control asks for a refresh.
    pub fn apply_control(&mut self, control: Control) -> Option<u64> {
        match control {
            Control::Refresh => return Some(self.begin_refresh()),
            Control::SetOrbits(visible) => self.registry.set_orbits_visible(visible),
            Control::SetLabels(visible) => self.registry.set_labels_visible(visible),
            Control::Resize(viewport) if viewport.is_valid() => {
                debug!("Viewport resized to {}x{}", viewport.width, viewport.height);
                self.viewport = viewport;
            }
            Control::Resize(viewport) => {
                warn!(
                    "Ignoring invalid viewport {}x{}",
                    viewport.width, viewport.height
                );
            }
        }
        None
    }
}

/// Fetch every group on a separate task and send the result back.
pub fn spawn_refresh<C>(
    cache: SharedCache<C>,
    groups: Arc<[String]>,
    generation: u64,
    results: mpsc::Sender<RefreshResult>,
) -> JoinHandle<()>
where
    C: CatalogSource + 'static,
{
    tokio::spawn(async move {
        let (objects, stats) = {
            let mut cache = cache.lock().await;
            let objects = cache.fetch_all(&groups, Utc::now()).await;
            (objects, cache.stats())
        };
        let result = RefreshResult {
            generation,
            objects,
            stats,
        };
        if results.send(result).await.is_err() {
            debug!("Frame loop gone, dropping refresh {}", generation);
        }
    })
}

/// Run frames until the control channel closes.
///
/// An initial refresh is started right away.
pub async fn run_frame_loop<C>(
    mut ctx: AppContext<SnapshotSink>,
    cache: SharedCache<C>,
    groups: Vec<String>,
    frame_interval: Duration,
    mut controls: mpsc::Receiver<Control>,
) where
    C: CatalogSource + 'static,
{
    let groups: Arc<[String]> = groups.into();
    let (result_tx, mut results) = mpsc::channel(4);

    let generation = ctx.begin_refresh();
    spawn_refresh(cache.clone(), groups.clone(), generation, result_tx.clone());

    let mut interval = tokio::time::interval(frame_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let now = Utc::now();
                let visible = ctx.tick(now);
                let diagnostics = ctx.registry().debug_info();
                ctx.registry_mut().sink_mut().publish(diagnostics, visible, now);
            }
            Some(result) = results.recv() => {
                ctx.registry_mut().sink_mut().set_cache_stats(result.stats.clone());
                ctx.apply_refresh(result, Utc::now());
            }
            control = controls.recv() => match control {
                Some(control) => {
                    if let Some(generation) = ctx.apply_control(control) {
                        info!("Refreshing satellite data");
                        spawn_refresh(cache.clone(), groups.clone(), generation, result_tx.clone());
                    }
                }
                None => {
                    info!("Control channel closed, stopping frame loop");
                    break;
                }
            },
        }
    }
}
