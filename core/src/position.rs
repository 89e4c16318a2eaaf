//! APRS position report information fields
//!
//! Two renderings are supported: the plain-text "basic" form with
//! degrees/decimal-minutes coordinates, and the 13-character compressed form
//! that packs latitude and longitude as base-91 numbers.

use crate::error::{AprsWaveError, Result};
use crate::DEFAULT_DESTINATION;

/// APRS data type identifier: position without timestamp, no messaging
const POSITION_DTI: u8 = b'!';

/// Primary symbol table
const SYMBOL_TABLE: u8 = b'/';

/// Symbol code for a house / QTH
const SYMBOL_CODE: u8 = b'-';

/// Length of the compressed position before the comment
pub const COMPRESSED_LEN: usize = 13;

/// Compressed course/speed bytes meaning "no data"
const NO_CS: [u8; 2] = [b' ', b's'];

/// Compression type byte emitted alongside [`NO_CS`]
const NO_CS_TYPE: u8 = b'T';

/// Compression type: current fix, RMC source, software origin
const CS_TYPE_COURSE_SPEED: u8 = b'!' + 0b0011_1010;

/// Compression type: current fix, GGA source, software origin
const CS_TYPE_ALTITUDE: u8 = b'!' + 0b0011_0010;

const BASE91_ZERO: u8 = b'!';

/// Encode `value` as `digits` base-91 characters, most significant first.
///
/// Each character lies in `'!'..='{'`. Fails when the value needs more digits
/// than requested.
pub fn base91_encode(value: u64, digits: usize) -> Result<String> {
    let overflow = || AprsWaveError::Base91Overflow { value, digits };

    let mut remainder = value;
    let mut encoded = String::with_capacity(digits);
    for power in (0..digits).rev() {
        let place = u32::try_from(power)
            .ok()
            .and_then(|p| 91u64.checked_pow(p))
            .ok_or_else(overflow)?;
        let digit = remainder / place;
        if digit > 90 {
            return Err(overflow());
        }
        encoded.push((BASE91_ZERO + digit as u8) as char);
        remainder -= digit * place;
    }

    if remainder != 0 {
        return Err(overflow());
    }
    Ok(encoded)
}

/// Information field rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PositionFormat {
    /// `!DDMM.mmN/DDDMM.mmW-` plain text
    #[default]
    Basic,
    /// `/YYYYXXXX-csT` base-91
    Compressed,
}

/// A single station position report
#[derive(Debug, Clone, PartialEq)]
pub struct PositionReport {
    callsign: String,
    ssid: u8,
    destination: String,
    destination_ssid: u8,
    latitude: f64,
    longitude: f64,
    altitude: Option<f64>,
    course: Option<u16>,
    speed: Option<f64>,
    comment: String,
    format: PositionFormat,
}

impl PositionReport {
    /// Report for `callsign` at the given signed coordinates (degrees)
    pub fn new(callsign: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            callsign: callsign.into(),
            ssid: 0,
            destination: DEFAULT_DESTINATION.to_string(),
            destination_ssid: 0,
            latitude,
            longitude,
            altitude: None,
            course: None,
            speed: None,
            comment: String::new(),
            format: PositionFormat::Basic,
        }
    }

    pub fn with_ssid(mut self, ssid: u8) -> Self {
        self.ssid = ssid;
        self
    }

    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = destination.into();
        self
    }

    /// Digipeater path code carried in the destination SSID
    pub fn with_destination_ssid(mut self, ssid: u8) -> Self {
        self.destination_ssid = ssid;
        self
    }

    /// Altitude in feet
    pub fn with_altitude(mut self, feet: f64) -> Self {
        self.altitude = Some(feet);
        self
    }

    /// Course in degrees (1-360, 0 for unknown)
    pub fn with_course(mut self, degrees: u16) -> Self {
        self.course = Some(degrees);
        self
    }

    /// Speed in knots
    pub fn with_speed(mut self, knots: f64) -> Self {
        self.speed = Some(knots);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn with_format(mut self, format: PositionFormat) -> Self {
        self.format = format;
        self
    }

    pub fn callsign(&self) -> &str {
        &self.callsign
    }

    pub fn ssid(&self) -> u8 {
        self.ssid
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn destination_ssid(&self) -> u8 {
        self.destination_ssid
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn altitude(&self) -> Option<f64> {
        self.altitude
    }

    pub fn course(&self) -> Option<u16> {
        self.course
    }

    pub fn speed(&self) -> Option<f64> {
        self.speed
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn format(&self) -> PositionFormat {
        self.format
    }

    /// Render the information field in the report's configured format
    pub fn information_field(&self) -> Result<Vec<u8>> {
        match self.format {
            PositionFormat::Basic => self.basic_field(),
            PositionFormat::Compressed => self.compressed_field(),
        }
    }

    fn check_range(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(AprsWaveError::InvalidPosition(format!(
                "latitude {} outside -90..90",
                self.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(AprsWaveError::InvalidPosition(format!(
                "longitude {} outside -180..180",
                self.longitude
            )));
        }
        Ok(())
    }

    /// Course and speed only count when both are present
    fn course_speed(&self) -> Option<(u16, f64)> {
        self.course.zip(self.speed)
    }

    /// Plain-text position, `!DDMM.mmN/DDDMM.mmW-` followed by the comment
    pub fn basic_field(&self) -> Result<Vec<u8>> {
        self.check_range()?;

        let (lat_hemisphere, lat) = if self.latitude < 0.0 {
            ('S', -self.latitude)
        } else {
            ('N', self.latitude)
        };
        // zero longitude falls on the western branch
        let (lon_hemisphere, lon) = if self.longitude > 0.0 {
            ('E', self.longitude)
        } else {
            ('W', -self.longitude)
        };

        let mut field = String::new();
        field.push(POSITION_DTI as char);
        field.push_str(&degrees_minutes(lat, 2));
        field.push(lat_hemisphere);
        field.push(SYMBOL_TABLE as char);
        field.push_str(&degrees_minutes(lon, 3));
        field.push(lon_hemisphere);
        field.push(SYMBOL_CODE as char);

        if let Some((course, speed)) = self.course_speed() {
            if course > 360 {
                return Err(AprsWaveError::InvalidPosition(format!(
                    "course {} outside 0..360",
                    course
                )));
            }
            let knots = speed.round();
            if !(0.0..=999.0).contains(&knots) {
                return Err(AprsWaveError::InvalidPosition(format!(
                    "speed {} outside 0..999 knots",
                    speed
                )));
            }
            field.push_str(&format!("{:03}/{:03}", course, knots as u16));
        }

        if let Some(altitude) = self.altitude {
            if !altitude.is_finite() {
                return Err(AprsWaveError::InvalidPosition(format!(
                    "altitude {} ft is not a number",
                    altitude
                )));
            }
            let feet = altitude.round() as i64;
            if !(-99_999..=999_999).contains(&feet) {
                return Err(AprsWaveError::InvalidPosition(format!(
                    "altitude {} ft does not fit in six characters",
                    feet
                )));
            }
            if feet < 0 {
                field.push_str(&format!("/A=-{:05}", -feet));
            } else {
                field.push_str(&format!("/A={:06}", feet));
            }
        }

        field.push_str(&self.comment);
        Ok(field.into_bytes())
    }

    /// Compressed position, `/YYYYXXXX-csT` followed by the comment
    pub fn compressed_field(&self) -> Result<Vec<u8>> {
        self.check_range()?;

        let lat_value = (380_926.0 * (90.0 - self.latitude)).round();
        let lon_value = (190_463.0 * (180.0 + self.longitude)).round();

        let mut field = Vec::with_capacity(COMPRESSED_LEN + self.comment.len());
        field.push(SYMBOL_TABLE);
        field.extend_from_slice(base91_encode(lat_value as u64, 4)?.as_bytes());
        field.extend_from_slice(base91_encode(lon_value as u64, 4)?.as_bytes());
        field.push(SYMBOL_CODE);
        field.extend_from_slice(&self.compressed_extension()?);

        debug_assert_eq!(field.len(), COMPRESSED_LEN);
        field.extend_from_slice(self.comment.as_bytes());
        Ok(field)
    }

    /// The `csT` trailer: course/speed, altitude, or "no data"
    fn compressed_extension(&self) -> Result<[u8; 3]> {
        if let Some((course, speed)) = self.course_speed() {
            if course > 360 || !speed.is_finite() || speed < 0.0 {
                return Err(AprsWaveError::InvalidPosition(format!(
                    "course/speed {}/{} cannot be compressed",
                    course, speed
                )));
            }
            let c = base91_encode(u64::from(course % 360) / 4, 1)?;
            let s = base91_encode(((speed + 1.0).ln() / 1.08f64.ln()).round() as u64, 1)?;
            return Ok([c.as_bytes()[0], s.as_bytes()[0], CS_TYPE_COURSE_SPEED]);
        }

        if let Some(altitude) = self.altitude {
            if !altitude.is_finite() || altitude < 1.0 {
                return Err(AprsWaveError::InvalidPosition(format!(
                    "altitude {} ft cannot be compressed",
                    altitude
                )));
            }
            let cs = base91_encode((altitude.ln() / 1.002f64.ln()).round() as u64, 2)?;
            let cs = cs.as_bytes();
            return Ok([cs[0], cs[1], CS_TYPE_ALTITUDE]);
        }

        Ok([NO_CS[0], NO_CS[1], NO_CS_TYPE])
    }
}

/// `DDMM.mm` (or `DDDMM.mm`) for a non-negative angle
fn degrees_minutes(angle: f64, degree_digits: usize) -> String {
    let hundredths = (angle * 6000.0).round() as u64;
    let degrees = hundredths / 6000;
    let minutes = hundredths % 6000;
    format!(
        "{:0width$}{:02}.{:02}",
        degrees,
        minutes / 100,
        minutes % 100,
        width = degree_digits
    )
}
