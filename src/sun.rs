//! Astronomical info provider
//!
//! Sunrise/sunset for the configured observer location, formatted for
//! the dashboard banner. Polar day/night and out-of-range coordinates
//! surface as typed errors rather than crashing the request.

use crate::error::{DashSrvError, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use spa::{sunrise_and_set, StdFloatOps, SunriseAndSet};

/// Sunrise and sunset for the given date at the given coordinate, in
/// the target timezone.
pub fn sun_times(
    latitude: f64,
    longitude: f64,
    date: NaiveDate,
    tz: Tz,
) -> Result<(DateTime<Tz>, DateTime<Tz>)> {
    // Anchor the computation at local noon so it lands on the right
    // civil date regardless of the timezone's UTC offset.
    let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN);
    let local_noon = tz
        .from_local_datetime(&date.and_time(noon))
        .earliest()
        .ok_or_else(|| DashSrvError::Astronomy(format!("no local noon on {date} in {tz}")))?;

    match sunrise_and_set::<StdFloatOps>(local_noon.with_timezone(&chrono::Utc), latitude, longitude)
        .map_err(|e| DashSrvError::Astronomy(format!("{e:?}")))?
    {
        SunriseAndSet::Daylight(rise, set) => {
            let rise = DateTime::<chrono::Utc>::from(rise).with_timezone(&tz);
            let set = DateTime::<chrono::Utc>::from(set).with_timezone(&tz);
            Ok((rise, set))
        }
        SunriseAndSet::PolarDay => Err(DashSrvError::Astronomy(format!(
            "polar day at ({latitude}, {longitude}) on {date}"
        ))),
        SunriseAndSet::PolarNight => Err(DashSrvError::Astronomy(format!(
            "polar night at ({latitude}, {longitude}) on {date}"
        ))),
    }
}

/// Banner string for the dashboard, e.g. "Sunrise 06:12, sunset 18:43".
pub fn daily_info(latitude: f64, longitude: f64, date: NaiveDate, tz: Tz) -> Result<String> {
    let (rise, set) = sun_times(latitude, longitude, date, tz)?;
    Ok(format!(
        "Sunrise {}, sunset {}",
        rise.format("%H:%M"),
        set.format("%H:%M")
    ))
}
