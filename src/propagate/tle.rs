//! Two-line element set encoding.
//!
//! The catalog delivers mean elements as JSON fields; SGP4 wants the classic
//! fixed-column text form. Every field is range-checked before formatting so
//! the output is always 69 columns with a valid checksum, or an error.

use chrono::{DateTime, Datelike, Timelike, Utc};

use crate::catalog::OrbitalElementRecord;
use crate::propagate::error::PropagationError;

const LINE_BODY_LEN: usize = 68;

pub fn format_tle(record: &OrbitalElementRecord) -> Result<(String, String), PropagationError> {
    if !(1..=99_999).contains(&record.norad_id) {
        return Err(PropagationError::unrepresentable("catalog id", record.norad_id));
    }
    if !(record.mean_motion > 0.0 && record.mean_motion < 100.0) {
        return Err(PropagationError::unrepresentable("mean motion", record.mean_motion));
    }

    let line1 = format!(
        "1 {:05}{} {:<8} {} {} {} {} 0 {:4}",
        record.norad_id,
        record.classification,
        designator_field(record.designator.as_deref()),
        epoch_field(&record.epoch)?,
        first_derivative_field(record.mean_motion_dot)?,
        exponent_field(record.mean_motion_ddot, "mean motion second derivative")?,
        exponent_field(record.bstar, "drag term")?,
        record.element_set_no % 10_000,
    );

    let line2 = format!(
        "2 {:05} {} {} {} {} {} {:11.8}{:5}",
        record.norad_id,
        inclination_field(record.inclination_deg)?,
        angle_field(record.raan_deg, "right ascension")?,
        eccentricity_field(record.eccentricity)?,
        angle_field(record.arg_of_perigee_deg, "argument of perigee")?,
        angle_field(record.mean_anomaly_deg, "mean anomaly")?,
        record.mean_motion,
        record.rev_at_epoch % 100_000,
    );

    Ok((with_checksum(line1)?, with_checksum(line2)?))
}

/// Modulo-10 sum of the digits, minus signs counting as one.
pub fn checksum(line: &str) -> u8 {
    let sum: u32 = line
        .bytes()
        .take(LINE_BODY_LEN)
        .map(|b| match b {
            b'0'..=b'9' => (b - b'0') as u32,
            b'-' => 1,
            _ => 0,
        })
        .sum();
    (sum % 10) as u8
}

fn with_checksum(line: String) -> Result<String, PropagationError> {
    if line.len() != LINE_BODY_LEN {
        return Err(PropagationError::unrepresentable("tle line", line));
    }
    let sum = checksum(&line);
    Ok(format!("{line}{sum}"))
}

/// `1998-067A` becomes `98067A`. Anything unrecognized is left blank.
fn designator_field(designator: Option<&str>) -> String {
    let Some((year, rest)) = designator.and_then(|d| d.trim().split_once('-')) else {
        return String::new();
    };
    let launch = rest.get(..3).unwrap_or_default();
    let piece = rest.get(3..).unwrap_or_default();

    let valid = year.len() == 4
        && year.bytes().all(|b| b.is_ascii_digit())
        && launch.len() == 3
        && launch.bytes().all(|b| b.is_ascii_digit())
        && (1..=3).contains(&piece.len())
        && piece.bytes().all(|b| b.is_ascii_alphabetic());

    if valid {
        format!("{}{}{}", &year[2..], launch, piece.to_ascii_uppercase())
    } else {
        String::new()
    }
}

/// Two-digit year followed by the fractional day of year, `YYDDD.DDDDDDDD`.
fn epoch_field(epoch: &DateTime<Utc>) -> Result<String, PropagationError> {
    let year = epoch.year();
    if !(1957..=2056).contains(&year) {
        return Err(PropagationError::unrepresentable("epoch year", year));
    }
    let seconds = epoch.num_seconds_from_midnight() as f64 + epoch.nanosecond() as f64 * 1e-9;
    let day = epoch.ordinal() as f64 + seconds / 86_400.0;
    Ok(format!("{:02}{:012.8}", year % 100, day))
}

/// Signed fraction with the leading zero dropped, e.g. `-.00002182`.
fn first_derivative_field(value: f64) -> Result<String, PropagationError> {
    let digits = format!("{:.8}", value.abs());
    let fraction = digits
        .strip_prefix('0')
        .filter(|f| value.is_finite() && f.len() == 9)
        .ok_or_else(|| PropagationError::unrepresentable("mean motion derivative", value))?;
    let sign = if value < 0.0 { '-' } else { ' ' };
    Ok(format!("{sign}{fraction}"))
}

/// Assumed-decimal mantissa with a one digit exponent, e.g. `-11606-4`
/// for -0.11606e-4.
fn exponent_field(value: f64, field: &'static str) -> Result<String, PropagationError> {
    if !value.is_finite() {
        return Err(PropagationError::unrepresentable(field, value));
    }
    let sign = if value < 0.0 { '-' } else { ' ' };
    let magnitude = value.abs();
    if magnitude == 0.0 {
        return Ok(format!("{sign}00000-0"));
    }

    let mut exponent = magnitude.log10().floor() as i32 + 1;
    let mut mantissa = (magnitude / 10f64.powi(exponent) * 1e5).round() as u32;
    if mantissa >= 100_000 {
        mantissa /= 10;
        exponent += 1;
    }

    if exponent < -9 {
        return Ok(format!("{sign}00000-0"));
    }
    if exponent > 9 {
        return Err(PropagationError::unrepresentable(field, value));
    }

    let exponent_sign = if exponent < 0 { '-' } else { '+' };
    Ok(format!("{sign}{mantissa:05}{exponent_sign}{}", exponent.abs()))
}

fn eccentricity_field(eccentricity: f64) -> Result<String, PropagationError> {
    let digits = (eccentricity * 1e7).round();
    if !(0.0..1e7).contains(&digits) {
        return Err(PropagationError::unrepresentable("eccentricity", eccentricity));
    }
    Ok(format!("{:07}", digits as u32))
}

fn inclination_field(inclination: f64) -> Result<String, PropagationError> {
    if !(0.0..=180.0).contains(&inclination) {
        return Err(PropagationError::unrepresentable("inclination", inclination));
    }
    Ok(format!("{:8.4}", inclination))
}

fn angle_field(angle: f64, field: &'static str) -> Result<String, PropagationError> {
    if !angle.is_finite() {
        return Err(PropagationError::unrepresentable(field, angle));
    }
    let formatted = format!("{:8.4}", angle.rem_euclid(360.0));
    if formatted.len() != 8 {
        return Err(PropagationError::unrepresentable(field, angle));
    }
    Ok(formatted)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::catalog::{parse_payload, testing::ISS_PAYLOAD};
    use approx::assert_relative_eq;
    use rstest::rstest;

    pub(crate) fn iss_record() -> OrbitalElementRecord {
        parse_payload(ISS_PAYLOAD).unwrap().remove(0)
    }

    #[test]
    fn formats_reference_iss_element_set() {
        let (line1, line2) = format_tle(&iss_record()).unwrap();
        assert_eq!(
            line1,
            "1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927"
        );
        assert_eq!(
            line2,
            "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537"
        );
    }

    #[test]
    fn output_is_accepted_by_sgp4() {
        let record = iss_record();
        let (line1, line2) = format_tle(&record).unwrap();
        let elements =
            sgp4::Elements::from_tle(Some(record.name.clone()), line1.as_bytes(), line2.as_bytes())
                .unwrap();
        assert_eq!(elements.norad_id, 25544);
        assert_relative_eq!(elements.mean_motion, 15.72125391, epsilon = 1e-8);
        assert_relative_eq!(elements.eccentricity, 0.0006703, epsilon = 1e-9);
        assert_relative_eq!(elements.drag_term, -1.1606e-5, epsilon = 1e-12);
    }

    #[test]
    fn checksum_counts_digits_and_minus_signs() {
        assert_eq!(checksum("1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  292"), 7);
        assert_eq!(checksum("-- 9"), 1);
    }

    #[rstest]
    #[case(0.0, " 00000-0")]
    #[case(-1.1606e-5, "-11606-4")]
    #[case(2.7326e-4, " 27326-3")]
    #[case(9.999996e-5, " 10000-3")]
    #[case(0.5, " 50000+0")]
    #[case(1e-12, " 00000-0")]
    fn exponent_fields(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(exponent_field(value, "drag term").unwrap(), expected);
    }

    #[rstest]
    #[case(Some("1998-067A"), "98067A")]
    #[case(Some("2019-029BD"), "19029BD")]
    #[case(Some("UNKNOWN"), "")]
    #[case(Some("1998-67A"), "")]
    #[case(None, "")]
    fn designator_fields(#[case] designator: Option<&str>, #[case] expected: &str) {
        assert_eq!(designator_field(designator), expected);
    }

    #[test]
    fn rejects_unencodable_values() {
        let zero_motion = OrbitalElementRecord {
            mean_motion: 0.0,
            ..iss_record()
        };
        assert!(matches!(
            format_tle(&zero_motion),
            Err(PropagationError::Unrepresentable { field: "mean motion", .. })
        ));

        let nan_motion = OrbitalElementRecord {
            mean_motion: f64::NAN,
            ..iss_record()
        };
        assert!(format_tle(&nan_motion).is_err());

        let huge_drag = OrbitalElementRecord {
            bstar: 3.0e12,
            ..iss_record()
        };
        assert!(format_tle(&huge_drag).is_err());

        let wide_id = OrbitalElementRecord {
            norad_id: 270_000,
            ..iss_record()
        };
        assert!(format_tle(&wide_id).is_err());
    }

    #[test]
    fn first_derivative_keeps_sign_column() {
        assert_eq!(first_derivative_field(0.0).unwrap(), " .00000000");
        assert_eq!(first_derivative_field(1.6717e-4).unwrap(), " .00016717");
        assert!(first_derivative_field(1.5).is_err());
    }
}
