use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use crate::catalog::CategorizedObject;
use crate::categorize::color_for;
use crate::projector::{project, CameraTransform, LabelPlacement, Viewport};
use crate::propagate::{sample_path, OrbitalState};
use crate::registry::scene::SceneSink;
use crate::registry::types::{
    LabelResource, RegistryDiagnostics, RegistrySettings, TrackedSatellite,
};

/// The set of satellites on screen, keyed by catalog id.
///
/// Owns the sink; every resource the sink holds was created through here
/// and is released through here.
pub struct SatelliteRegistry<S> {
    sink: S,
    settings: RegistrySettings,
    entries: BTreeMap<u32, TrackedSatellite>,
    creation_errors: u64,
    propagation_failures: u64,
}

impl<S: SceneSink> SatelliteRegistry<S> {
    pub fn new(sink: S, settings: RegistrySettings) -> Self {
        Self {
            sink,
            settings,
            entries: BTreeMap::new(),
            creation_errors: 0,
            propagation_failures: 0,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn settings(&self) -> &RegistrySettings {
        &self.settings
    }

    /// Replace the tracked set with `objects`, positioned at `instant`.
    ///
    /// Only the first `max_satellites` objects are considered.
    pub fn ingest(&mut self, objects: Vec<CategorizedObject>, instant: DateTime<Utc>) {
        self.clear();

        let limit = self.settings.max_satellites;
        if objects.len() > limit {
            debug!(
                "Ignoring {} satellites beyond the limit of {}",
                objects.len() - limit,
                limit
            );
        }
        for object in objects.into_iter().take(limit) {
            self.track(object, instant);
        }
        info!("Tracking {} satellites", self.entries.len());
    }

    fn track(&mut self, object: CategorizedObject, instant: DateTime<Utc>) {
        let id = object.norad_id();
        if self.entries.contains_key(&id) {
            debug!("Replacing duplicate entry for {}", id);
            self.release(id);
        }

        let color = color_for(object.category);
        let state = match OrbitalState::from_record(&object.record) {
            Ok(state) => Some(state),
            Err(e) => {
                debug!("Error preparing {} ({}): {}", object.name(), id, e);
                self.propagation_failures += 1;
                None
            }
        };
        let position = match state.as_ref().map(|s| s.position_at(instant)) {
            Some(Ok(position)) => Some(position),
            Some(Err(e)) => {
                debug!("Error calculating position for {}: {}", object.name(), e);
                self.propagation_failures += 1;
                None
            }
            None => None,
        };
        let path = state
            .as_ref()
            .map(|s| sample_path(s, instant, &self.settings.path))
            .unwrap_or_default();

        if let Err(e) = self.sink.add_satellite(&object, position.as_ref(), color) {
            warn!("Error creating satellite {}: {}", object.name(), e);
            self.creation_errors += 1;
            return;
        }

        let orbit_path = if path.is_empty() {
            None
        } else {
            match self
                .sink
                .add_orbit_path(id, &path, color, self.settings.show_orbits)
            {
                Ok(()) => Some(path),
                Err(e) => {
                    warn!("Error creating orbit path for {}: {}", object.name(), e);
                    self.creation_errors += 1;
                    None
                }
            }
        };

        self.entries.insert(
            id,
            TrackedSatellite {
                object,
                color,
                state,
                position,
                orbit_path,
                label: LabelResource::Absent,
            },
        );
    }

    fn release(&mut self, id: u32) {
        let Some(entry) = self.entries.remove(&id) else {
            return;
        };
        if entry.label == LabelResource::Present {
            self.sink.remove_label(id);
        }
        if entry.orbit_path.is_some() {
            self.sink.remove_orbit_path(id);
        }
        self.sink.remove_satellite(id);
    }

    pub fn clear(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        let ids: Vec<u32> = self.entries.keys().copied().collect();
        for id in ids {
            self.release(id);
        }
        debug!("Cleared all satellites");
    }

    /// Move every satellite to its position at `instant`.
    ///
    /// A satellite that fails to propagate stays where it was.
    pub fn update_all(&mut self, instant: DateTime<Utc>) {
        for (id, entry) in self.entries.iter_mut() {
            let Some(state) = &entry.state else {
                continue;
            };
            match state.position_at(instant) {
                Ok(position) => {
                    self.sink.update_satellite(*id, &position);
                    entry.position = Some(position);
                }
                Err(e) => {
                    debug!("Error calculating position for {}: {}", entry.object.name(), e);
                    self.propagation_failures += 1;
                }
            }
        }
    }

    /// Place labels for the current camera and return how many are visible.
    ///
    /// Labels are created on first use. Satellites without a fix get a
    /// hidden label.
    pub fn update_labels(&mut self, transform: &CameraTransform, viewport: &Viewport) -> usize {
        if !self.settings.show_labels {
            return 0;
        }

        let mut visible = 0;
        for (id, entry) in self.entries.iter_mut() {
            if entry.label == LabelResource::Absent {
                entry.label = match self.sink.create_label(*id, entry.object.name()) {
                    Ok(()) => LabelResource::Present,
                    Err(e) => {
                        warn!("Error creating label for {}: {}", entry.object.name(), e);
                        self.creation_errors += 1;
                        LabelResource::Failed
                    }
                };
            }
            if entry.label != LabelResource::Present {
                continue;
            }

            let placement = entry
                .position
                .as_ref()
                .map(|p| project(p, transform, viewport))
                .unwrap_or(LabelPlacement::HIDDEN);
            if placement.visible {
                visible += 1;
            }
            self.sink.place_label(*id, &placement);
        }
        visible
    }

    pub fn set_orbits_visible(&mut self, visible: bool) {
        self.settings.show_orbits = visible;
        for (id, entry) in &self.entries {
            if entry.orbit_path.is_some() {
                self.sink.set_orbit_visible(*id, visible);
            }
        }
    }

    /// Disabling labels destroys them; enabling leaves creation to the next
    /// [`update_labels`](Self::update_labels).
    pub fn set_labels_visible(&mut self, visible: bool) {
        self.settings.show_labels = visible;
        if visible {
            return;
        }
        for (id, entry) in self.entries.iter_mut() {
            if entry.label == LabelResource::Present {
                self.sink.remove_label(*id);
            }
            entry.label = LabelResource::Absent;
        }
    }

    pub fn get(&self, id: u32) -> Option<&TrackedSatellite> {
        self.entries.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedSatellite> {
        self.entries.values()
    }

    pub fn debug_info(&self) -> RegistryDiagnostics {
        let mut categories = BTreeMap::new();
        for entry in self.entries.values() {
            *categories.entry(entry.object.category.to_string()).or_insert(0) += 1;
        }

        let fixes: Vec<_> = self.entries.values().filter_map(|e| e.position).collect();
        let distinct: BTreeSet<[i64; 3]> = fixes
            .iter()
            .map(|p| [p.x, p.y, p.z].map(|c| (c * 1000.0).round() as i64))
            .collect();

        RegistryDiagnostics {
            tracked: self.entries.len(),
            categories,
            orbit_paths: self.entries.values().filter(|e| e.orbit_path.is_some()).count(),
            labels: self
                .entries
                .values()
                .filter(|e| e.label == LabelResource::Present)
                .count(),
            show_orbits: self.settings.show_orbits,
            show_labels: self.settings.show_labels,
            creation_errors: self.creation_errors,
            propagation_failures: self.propagation_failures,
            without_fix: self.entries.len() - fixes.len(),
            distinct_positions: distinct.len(),
            stacked: fixes.len() > 1 && distinct.len() == 1,
        }
    }
}
