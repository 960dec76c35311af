use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::catalog::error::CatalogError;
use crate::categorize::{categorize, Category};

/// One catalog entry as the service sends it (CCSDS OMM keys).
///
/// Every field is optional here; [`OrbitalElementRecord::try_from`] decides
/// what is acceptable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct RawOmm {
    pub object_name: Option<String>,
    pub object_id: Option<String>,
    pub epoch: Option<String>,
    pub mean_motion: Option<f64>,
    pub eccentricity: Option<f64>,
    pub inclination: Option<f64>,
    pub ra_of_asc_node: Option<f64>,
    pub arg_of_pericenter: Option<f64>,
    pub mean_anomaly: Option<f64>,
    pub classification_type: Option<String>,
    pub norad_cat_id: Option<u64>,
    pub element_set_no: Option<u64>,
    pub rev_at_epoch: Option<u64>,
    pub bstar: Option<f64>,
    pub mean_motion_dot: Option<f64>,
    pub mean_motion_ddot: Option<f64>,
}

/// Validated mean orbital elements of one tracked object.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitalElementRecord {
    pub norad_id: u32,
    pub name: String,
    pub designator: Option<String>,
    pub epoch: DateTime<Utc>,
    pub inclination_deg: f64,
    pub raan_deg: f64,
    pub eccentricity: f64,
    pub arg_of_perigee_deg: f64,
    pub mean_anomaly_deg: f64,
    /// Revolutions per day.
    pub mean_motion: f64,
    pub mean_motion_dot: f64,
    pub mean_motion_ddot: f64,
    pub bstar: f64,
    pub classification: char,
    pub element_set_no: u32,
    pub rev_at_epoch: u32,
}

impl TryFrom<RawOmm> for OrbitalElementRecord {
    type Error = CatalogError;

    fn try_from(raw: RawOmm) -> Result<Self, Self::Error> {
        let norad_id = match raw.norad_cat_id {
            Some(id @ 1..=99_999) => id as u32,
            other => {
                return Err(CatalogError::InvalidRecord {
                    norad_id: other,
                    reason: "catalog id missing or out of range".into(),
                })
            }
        };
        let invalid = |reason: String| CatalogError::InvalidRecord {
            norad_id: Some(norad_id as u64),
            reason,
        };

        let epoch = raw
            .epoch
            .as_deref()
            .ok_or_else(|| invalid("missing epoch".into()))
            .and_then(|s| parse_epoch(s).ok_or_else(|| invalid(format!("bad epoch {s:?}"))))?;

        let mean_motion = raw
            .mean_motion
            .filter(|n| n.is_finite() && *n > 0.0)
            .ok_or_else(|| invalid(format!("bad mean motion {:?}", raw.mean_motion)))?;

        let eccentricity = raw
            .eccentricity
            .filter(|e| (0.0..1.0).contains(e))
            .ok_or_else(|| invalid(format!("bad eccentricity {:?}", raw.eccentricity)))?;

        let angle = |value: Option<f64>, field: &str| {
            value
                .filter(|v| v.is_finite())
                .ok_or_else(|| invalid(format!("bad {field} {value:?}")))
        };
        let inclination_deg = angle(raw.inclination, "inclination")?;
        let raan_deg = angle(raw.ra_of_asc_node, "right ascension")?;
        let arg_of_perigee_deg = angle(raw.arg_of_pericenter, "argument of perigee")?;
        let mean_anomaly_deg = angle(raw.mean_anomaly, "mean anomaly")?;

        let drag = |value: Option<f64>| value.filter(|v| v.is_finite()).unwrap_or(0.0);

        let name = raw
            .object_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("NORAD {}", norad_id));

        let classification = match raw.classification_type.as_deref().map(str::trim) {
            Some("C") => 'C',
            Some("S") => 'S',
            _ => 'U',
        };

        Ok(OrbitalElementRecord {
            norad_id,
            name,
            designator: raw
                .object_id
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            epoch,
            inclination_deg,
            raan_deg,
            eccentricity,
            arg_of_perigee_deg,
            mean_anomaly_deg,
            mean_motion,
            mean_motion_dot: drag(raw.mean_motion_dot),
            mean_motion_ddot: drag(raw.mean_motion_ddot),
            bstar: drag(raw.bstar),
            classification,
            element_set_no: raw.element_set_no.map(|n| (n % 10_000) as u32).unwrap_or(999),
            rev_at_epoch: raw.rev_at_epoch.map(|n| (n % 100_000) as u32).unwrap_or(0),
        })
    }
}

/// Catalog epochs come without a zone designator; treat them as UTC.
fn parse_epoch(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    s.trim_end_matches('Z')
        .parse::<NaiveDateTime>()
        .ok()
        .map(|naive| naive.and_utc())
}

/// A record together with its display category and the group it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorizedObject {
    pub record: OrbitalElementRecord,
    pub category: Category,
    pub group: String,
}

impl CategorizedObject {
    pub fn new(record: OrbitalElementRecord, group: &str) -> Self {
        let category = categorize(&record.name, group);
        Self {
            record,
            category,
            group: group.to_string(),
        }
    }

    pub fn norad_id(&self) -> u32 {
        self.record.norad_id
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn iss() -> RawOmm {
        RawOmm {
            object_name: Some("ISS (ZARYA)".into()),
            object_id: Some("1998-067A".into()),
            epoch: Some("2008-09-20T12:25:40.104192".into()),
            mean_motion: Some(15.72125391),
            eccentricity: Some(0.0006703),
            inclination: Some(51.6416),
            ra_of_asc_node: Some(247.4627),
            arg_of_pericenter: Some(130.536),
            mean_anomaly: Some(325.0288),
            classification_type: Some("U".into()),
            norad_cat_id: Some(25544),
            element_set_no: Some(292),
            rev_at_epoch: Some(56353),
            bstar: Some(-1.1606e-5),
            mean_motion_dot: Some(-2.182e-5),
            mean_motion_ddot: Some(0.0),
        }
    }

    #[test]
    fn accepts_complete_record() {
        let record = OrbitalElementRecord::try_from(iss()).unwrap();
        assert_eq!(record.norad_id, 25544);
        assert_eq!(record.designator.as_deref(), Some("1998-067A"));
        assert_eq!(record.classification, 'U');
        assert_eq!(
            record.epoch,
            Utc.with_ymd_and_hms(2008, 9, 20, 12, 25, 40).unwrap()
                + chrono::Duration::microseconds(104_192)
        );
    }

    #[test]
    fn epoch_accepts_zone_suffix_and_whole_seconds() {
        assert!(parse_epoch("2024-01-01T00:00:00Z").is_some());
        assert!(parse_epoch("2024-01-01T00:00:00").is_some());
        assert!(parse_epoch("2024-01-01").is_none());
    }

    #[test]
    fn rejects_zero_mean_motion() {
        let raw = RawOmm {
            mean_motion: Some(0.0),
            ..iss()
        };
        assert!(matches!(
            OrbitalElementRecord::try_from(raw),
            Err(CatalogError::InvalidRecord { norad_id: Some(25544), .. })
        ));
    }

    #[test]
    fn rejects_missing_id_and_hyperbolic_orbit() {
        let raw = RawOmm {
            norad_cat_id: None,
            ..iss()
        };
        assert!(OrbitalElementRecord::try_from(raw).is_err());

        let raw = RawOmm {
            eccentricity: Some(1.2),
            ..iss()
        };
        assert!(OrbitalElementRecord::try_from(raw).is_err());
    }

    #[test]
    fn fills_optional_fields() {
        let raw = RawOmm {
            object_name: None,
            object_id: Some("  ".into()),
            bstar: None,
            element_set_no: None,
            ..iss()
        };
        let record = OrbitalElementRecord::try_from(raw).unwrap();
        assert_eq!(record.name, "NORAD 25544");
        assert_eq!(record.designator, None);
        assert_eq!(record.bstar, 0.0);
        assert_eq!(record.element_set_no, 999);
    }

    #[test]
    fn categorized_object_uses_source_group() {
        let record = OrbitalElementRecord::try_from(iss()).unwrap();
        let object = CategorizedObject::new(record, "active");
        assert_eq!(object.category, Category::Stations);
        assert_eq!(object.group, "active");
        assert_eq!(object.norad_id(), 25544);
    }
}
