use std::collections::HashMap;

use approx::assert_relative_eq;
use chrono::{DateTime, Duration, Utc};
use sat_o_view::catalog::{CatalogError, CatalogSource, ElementCache};
use sat_o_view::categorize::{Category, Rgb};
use sat_o_view::projector::{project, Camera, Viewport};
use sat_o_view::propagate::{state_at, PathSettings};
use sat_o_view::registry::{RegistrySettings, SatelliteRegistry};
use sat_o_view::snapshot::{SharedScene, SnapshotSink};

const STATIONS: &str = r#"[
  {"OBJECT_NAME":"ISS (ZARYA)","OBJECT_ID":"1998-067A","EPOCH":"2008-09-20T12:25:40.104192",
   "MEAN_MOTION":15.72125391,"ECCENTRICITY":0.0006703,"INCLINATION":51.6416,
   "RA_OF_ASC_NODE":247.4627,"ARG_OF_PERICENTER":130.536,"MEAN_ANOMALY":325.0288,
   "CLASSIFICATION_TYPE":"U","NORAD_CAT_ID":25544,"ELEMENT_SET_NO":292,"REV_AT_EPOCH":56353,
   "BSTAR":-1.1606e-5,"MEAN_MOTION_DOT":-2.182e-5,"MEAN_MOTION_DDOT":0},
  {"OBJECT_NAME":"BROKEN","NORAD_CAT_ID":99998,"EPOCH":"2008-09-20T00:00:00","MEAN_MOTION":0}
]"#;

struct StaticSource(HashMap<&'static str, &'static str>);

impl CatalogSource for StaticSource {
    async fn fetch_group(&self, group: &str) -> Result<String, CatalogError> {
        self.0
            .get(group)
            .map(|payload| payload.to_string())
            .ok_or_else(|| CatalogError::Status {
                group: group.to_string(),
                status: 404,
            })
    }
}

fn epoch() -> DateTime<Utc> {
    "2008-09-20T12:25:40.104192Z".parse().unwrap()
}

#[tokio::test]
async fn catalog_to_screen() {
    let source = StaticSource(HashMap::from([("stations", STATIONS)]));
    let mut cache = ElementCache::new(source);
    let groups = vec!["stations".to_string(), "weather".to_string()];

    let objects = cache.fetch_all(&groups, epoch()).await;
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0].category, Category::Stations);

    let shared = SharedScene::default();
    let mut registry = SatelliteRegistry::new(
        SnapshotSink::new(shared.clone()),
        RegistrySettings {
            path: PathSettings {
                steps: 20,
                step: Duration::minutes(5),
            },
            ..RegistrySettings::default()
        },
    );
    registry.ingest(objects.clone(), epoch());

    let iss = registry.get(25544).unwrap();
    assert_eq!(iss.color, Rgb::new(0xff6b6b));
    let radius = iss.position.unwrap().norm();
    assert!((1.0..1.1).contains(&radius), "radius {radius}");
    assert_eq!(iss.orbit_path.as_ref().unwrap().len(), 21);

    let later = epoch() + Duration::minutes(30);
    registry.update_all(later);
    let moved = registry.get(25544).unwrap().position.unwrap();
    assert_relative_eq!(moved, state_at(&objects[0].record, later).unwrap());

    let viewport = Viewport::new(1280.0, 720.0);
    let transform = Camera::default().transform(&viewport);
    let visible = registry.update_labels(&transform, &viewport);
    assert_eq!(visible, 1);
    assert!(project(&moved, &transform, &viewport).visible);

    let diagnostics = registry.debug_info();
    registry.sink_mut().publish(diagnostics, visible, later);
    let snapshot = shared.snapshot();
    let view = &snapshot.satellites[&25544];
    assert_eq!(view.category, Category::Stations);
    assert!(view.label.unwrap().visible);
    assert_eq!(snapshot.orbit_paths[&25544].points.len(), 21);

    registry.clear();
    assert!(registry.is_empty());
    assert!(registry.sink().working().satellites.is_empty());
    assert!(registry.sink().working().orbit_paths.is_empty());
}

#[tokio::test]
async fn cached_group_is_served_without_the_source() {
    let source = StaticSource(HashMap::from([("stations", STATIONS)]));
    let mut cache = ElementCache::new(source);
    let first = cache.fetch("stations", epoch()).await;
    let again = cache.fetch("stations", epoch() + Duration::minutes(10)).await;

    assert_eq!(first, again);
    assert_eq!(cache.stats().network_fetches, 1);
}
