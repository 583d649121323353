//! APRS position report decoding.
//!
//! OGN beacons are APRS position reports with an OGN-specific comment, e.g.
//!
//! ```text
//! FLRDDA5BA>APRS,qAS,LFMX:/165829h4415.41N/00600.03E'342/049/A=005524 !W03! id0ADDA5BA -454fpm
//! └─source─┘ └───path───┘ │└─time─┘└─lat──┘│└──lon───┘│└crs/spd┘└─alt──┘ └prec┘
//!                          data type      table      symbol
//! ```
//!
//! Only uncompressed positions are decoded. Everything the tracker does not
//! use (receiver status, climb rate, signal quality) is ignored.

use chrono::Utc;

use super::error::DecodeError;
use crate::coord::Coordinates;
use crate::tracking::Beacon;

/// Length of an uncompressed position: `DDMM.mmN` + table + `DDDMM.mmE` + symbol.
const POSITION_LEN: usize = 19;

/// Length of the `DDHHMMz` / `HHMMSSh` timestamp.
const TIMESTAMP_LEN: usize = 7;

const FEET_TO_METERS: f64 = 0.3048;
const KNOTS_TO_KMH: f64 = 1.852;

/// Turns one feed line into a beacon.
pub trait BeaconDecoder: Send + Sync {
    /// Decode a single line; failures are per line and never fatal.
    fn decode(&self, line: &str) -> Result<Beacon, DecodeError>;
}

/// Decoder for APRS position reports as sent by the OGN APRS-IS servers.
#[derive(Debug, Clone, Copy, Default)]
pub struct AprsDecoder;

impl AprsDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl BeaconDecoder for AprsDecoder {
    fn decode(&self, line: &str) -> Result<Beacon, DecodeError> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return Err(DecodeError::Empty);
        }
        if line.starts_with('#') {
            return Err(DecodeError::ServerComment);
        }

        let (source, rest) = line
            .split_once('>')
            .ok_or_else(|| DecodeError::Malformed("missing '>' after source".to_string()))?;
        if source.is_empty() {
            return Err(DecodeError::Malformed("empty source".to_string()));
        }

        let (_path, info) = rest
            .split_once(':')
            .ok_or_else(|| DecodeError::Malformed("missing ':' before payload".to_string()))?;

        let mut chars = info.chars();
        let data_type = chars
            .next()
            .ok_or_else(|| DecodeError::Malformed("empty payload".to_string()))?;
        let body = chars.as_str();

        let body = match data_type {
            '!' | '=' => body,
            '/' | '@' => body
                .get(TIMESTAMP_LEN..)
                .ok_or_else(|| DecodeError::Malformed("truncated timestamp".to_string()))?,
            other => return Err(DecodeError::UnsupportedType(other)),
        };

        decode_position(source, body)
    }
}

/// Decode the position and comment that follow the data type (and timestamp).
fn decode_position(source: &str, body: &str) -> Result<Beacon, DecodeError> {
    let position = body
        .get(..POSITION_LEN)
        .ok_or_else(|| DecodeError::Malformed("truncated position".to_string()))?;
    let comment = &body[POSITION_LEN..];

    if !position.is_ascii() {
        return Err(DecodeError::Malformed("non-ASCII position".to_string()));
    }
    // Compressed positions start with the symbol table instead of a digit
    if !position.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(DecodeError::Malformed(
            "compressed positions are not supported".to_string(),
        ));
    }

    let lat = parse_angle(&position[0..8], 2, 'N', 'S', 90.0)?;
    let lon = parse_angle(&position[9..18], 3, 'E', 'W', 180.0)?;
    let (lat_extra, lon_extra) = precision_extension(comment).unwrap_or((0.0, 0.0));

    let mut beacon = Beacon {
        source_id: source.to_string(),
        position: Coordinates::new(lat.apply(lat_extra), lon.apply(lon_extra)),
        altitude_m: None,
        course_deg: None,
        ground_speed_kmh: None,
        decoded_at: Utc::now(),
    };

    if let Some((course, speed_knots)) = course_speed(comment) {
        beacon.course_deg = (1..=360).contains(&course).then_some(course);
        beacon.ground_speed_kmh = Some(f64::from(speed_knots) * KNOTS_TO_KMH);
    }
    beacon.altitude_m = altitude_feet(comment).map(|ft| f64::from(ft) * FEET_TO_METERS);

    Ok(beacon)
}

/// Signed degrees plus minutes, kept apart so the precision extension can be
/// added to the minutes before conversion.
struct Angle {
    negative: bool,
    degrees: f64,
    minutes: f64,
}

impl Angle {
    fn apply(&self, extra_minutes: f64) -> f64 {
        let value = self.degrees + (self.minutes + extra_minutes) / 60.0;
        if self.negative {
            -value
        } else {
            value
        }
    }
}

/// Parse `DDMM.mmH` (latitude, 2 degree digits) or `DDDMM.mmH` (longitude).
fn parse_angle(
    field: &str,
    degree_digits: usize,
    positive: char,
    negative: char,
    max_degrees: f64,
) -> Result<Angle, DecodeError> {
    let malformed = || DecodeError::Malformed(format!("invalid coordinate '{}'", field));

    let hemisphere = field.chars().last().ok_or_else(malformed)?;
    let degrees: f64 = field[..degree_digits].parse().map_err(|_| malformed())?;
    let minutes: f64 = field[degree_digits..field.len() - 1]
        .parse()
        .map_err(|_| malformed())?;

    if !(0.0..60.0).contains(&minutes) || degrees + minutes / 60.0 > max_degrees {
        return Err(malformed());
    }

    let negative = match hemisphere {
        h if h == positive => false,
        h if h == negative => true,
        _ => return Err(malformed()),
    };

    Ok(Angle {
        negative,
        degrees,
        minutes,
    })
}

/// `ccc/sss` course (degrees) and speed (knots) directly after the position.
fn course_speed(comment: &str) -> Option<(u16, u16)> {
    let ext = comment.get(..7)?;
    let (course, speed) = ext.split_once('/')?;
    if course.len() != 3 {
        return None;
    }
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !all_digits(course) || !all_digits(speed) {
        return None;
    }
    Some((course.parse().ok()?, speed.parse().ok()?))
}

/// `/A=nnnnnn` altitude in feet anywhere in the comment.
fn altitude_feet(comment: &str) -> Option<i32> {
    let start = comment.find("/A=")? + 3;
    comment.get(start..start + 6)?.parse().ok()
}

/// OGN `!Wxy!` extension: third decimal digit of the latitude and longitude
/// minutes.
fn precision_extension(comment: &str) -> Option<(f64, f64)> {
    let start = comment.find("!W")?;
    let ext = comment.get(start + 2..start + 5)?.as_bytes();
    if ext[2] != b'!' || !ext[0].is_ascii_digit() || !ext[1].is_ascii_digit() {
        return None;
    }
    Some((
        f64::from(ext[0] - b'0') / 1000.0,
        f64::from(ext[1] - b'0') / 1000.0,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const OGN_LINE: &str = "FLRDDA5BA>APRS,qAS,LFMX:/165829h4415.41N/00600.03E'342/049/A=005524 !W03! id0ADDA5BA -454fpm -1.1rot 8.8dB 0e +51.2kHz gps4x5";

    fn decode(line: &str) -> Result<Beacon, DecodeError> {
        AprsDecoder::new().decode(line)
    }

    #[test]
    fn test_decode_ogn_beacon() {
        let beacon = decode(OGN_LINE).unwrap();
        assert_eq!(beacon.source_id, "FLRDDA5BA");

        // 44°15.410' + 0.000 and 6°00.030' + 0.003
        assert!((beacon.position.latitude - (44.0 + 15.410 / 60.0)).abs() < 1e-9);
        assert!((beacon.position.longitude - (6.0 + 0.033 / 60.0)).abs() < 1e-9);

        assert_eq!(beacon.course_deg, Some(342));
        assert!((beacon.ground_speed_kmh.unwrap() - 49.0 * 1.852).abs() < 1e-9);
        assert!((beacon.altitude_m.unwrap() - 5524.0 * 0.3048).abs() < 1e-9);
    }

    #[test]
    fn test_decode_southern_western_hemisphere() {
        let beacon = decode("ICA3D2B51>APRS,qAS,SAFR:!3330.00S\\07030.00W^").unwrap();
        assert!((beacon.position.latitude - (-33.5)).abs() < 1e-9);
        assert!((beacon.position.longitude - (-70.5)).abs() < 1e-9);
        assert!(beacon.altitude_m.is_none());
        assert!(beacon.course_deg.is_none());
    }

    #[test]
    fn test_decode_without_timestamp_and_extensions() {
        let beacon = decode("FLRDEF123>APRS:=4630.00N/00636.00E'").unwrap();
        assert!((beacon.position.latitude - 46.5).abs() < 1e-9);
        assert!((beacon.position.longitude - 6.6).abs() < 1e-9);
        assert!(beacon.ground_speed_kmh.is_none());
    }

    #[test]
    fn test_zero_course_means_unknown() {
        let beacon = decode("FLRDEF123>APRS:!4630.00N/00636.00E'000/000/A=001000").unwrap();
        assert!(beacon.course_deg.is_none());
        assert_eq!(beacon.ground_speed_kmh, Some(0.0));
        assert!((beacon.altitude_m.unwrap() - 304.8).abs() < 1e-9);
    }

    #[test]
    fn test_server_comment() {
        assert_eq!(
            decode("# aprsc 2.1.14-g408ed49 1 Jan 2024 12:00:00 GMT GLIDERN1 1.2.3.4:14580"),
            Err(DecodeError::ServerComment)
        );
    }

    #[test]
    fn test_empty_line() {
        assert_eq!(decode(""), Err(DecodeError::Empty));
        assert_eq!(decode("  \r\n"), Err(DecodeError::Empty));
    }

    #[test]
    fn test_unsupported_type() {
        assert_eq!(
            decode("GLIDERN1>OGNSDR,TCPIP*,qAC,GLIDERN1:>165903h v0.2.8 CPU:0.5"),
            Err(DecodeError::UnsupportedType('>'))
        );
    }

    #[test]
    fn test_malformed_lines() {
        for line in [
            "no separators at all",
            "FLRDEF123>APRS",
            ">APRS:!4630.00N/00636.00E'",
            "FLRDEF123>APRS:!4630.00N/006",
            "FLRDEF123>APRS:/1658",
            "FLRDEF123>APRS:!4690.00N/00636.00E'",
            "FLRDEF123>APRS:!9130.00N/00636.00E'",
            "FLRDEF123>APRS:!4630.00X/00636.00E'",
            "FLRDEF123>APRS:!/5L!!<*e7>{?!",
        ] {
            assert!(
                matches!(decode(line), Err(DecodeError::Malformed(_))),
                "expected malformed for {line:?}"
            );
        }
    }

    #[test]
    fn test_non_ascii_does_not_panic() {
        assert!(decode("FLRDEF123>APRS:!46ü0.00N/00636.00E'").is_err());
        assert!(decode("FLRDEF123>APRS:!4630.00N/00636.00E'ü/é").is_ok());
    }

    #[test]
    fn test_precision_extension_requires_closing_bang() {
        assert_eq!(precision_extension("!W5"), None);
        assert_eq!(precision_extension("!W12x"), None);
        assert_eq!(precision_extension(" !W55! "), Some((0.005, 0.005)));
    }
}
