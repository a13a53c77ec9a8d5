use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use time::{Date, Month, PrimitiveDateTime, Time};

use crate::error::SpeedError;

/// Reads the `DateTimeOriginal` EXIF tag of an image.
///
/// Fail-fast: any missing or malformed tag is a [`SpeedError::MissingTimestamp`].
pub fn capture_time(path: &Path) -> Result<PrimitiveDateTime, SpeedError> {
    let missing = |reason: String| SpeedError::MissingTimestamp {
        path: path.to_path_buf(),
        reason,
    };

    let file = File::open(path).map_err(|e| SpeedError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut reader = BufReader::new(file);
    let exif = exif::Reader::new()
        .read_from_container(&mut reader)
        .map_err(|e| missing(format!("no EXIF data: {e}")))?;

    let field = exif
        .get_field(exif::Tag::DateTimeOriginal, exif::In::PRIMARY)
        .ok_or_else(|| missing("no DateTimeOriginal tag".into()))?;

    let ascii = match &field.value {
        exif::Value::Ascii(v) if !v.is_empty() => v[0].as_slice(),
        _ => return Err(missing("DateTimeOriginal is not an ASCII value".into())),
    };
    let dt = exif::DateTime::from_ascii(ascii)
        .map_err(|e| missing(format!("unparseable DateTimeOriginal: {e}")))?;

    let month =
        Month::try_from(dt.month).map_err(|e| missing(format!("bad month {}: {e}", dt.month)))?;
    let date = Date::from_calendar_date(dt.year as i32, month, dt.day)
        .map_err(|e| missing(format!("bad date: {e}")))?;
    let time = Time::from_hms(dt.hour, dt.minute, dt.second)
        .map_err(|e| missing(format!("bad time of day: {e}")))?;
    Ok(PrimitiveDateTime::new(date, time))
}

/// Absolute elapsed time between two capture timestamps, seconds.
///
/// Zero elapsed time (identical timestamps, e.g. second-granularity EXIF on
/// a burst) cannot feed a speed estimate and is rejected.
pub fn elapsed_seconds(
    t1: PrimitiveDateTime,
    t2: PrimitiveDateTime,
) -> Result<f64, SpeedError> {
    let dt = (t2 - t1).as_seconds_f64().abs();
    if dt <= 0.0 {
        return Err(SpeedError::InvalidElapsedTime(dt));
    }
    Ok(dt)
}
