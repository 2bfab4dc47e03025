// SPDX-FileCopyrightText: 2026 smsq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Daily reset of the per-day counters.

use chrono::{DateTime, Local, NaiveTime, TimeZone};
use smsq_core::SmsqError;
use smsq_prometheus::record_rollover;
use tracing::info;

use crate::Relay;

/// Unix time of the most recent midnight at or before `now` in `now`'s zone.
///
/// Falls back to the earliest valid instant of the day when midnight does
/// not exist (a DST gap), and to `now` itself if the zone yields nothing.
pub fn local_midnight<Tz: TimeZone>(now: &DateTime<Tz>) -> i64 {
    let tz = now.timezone();
    let naive = now.date_naive().and_time(NaiveTime::MIN);
    if let Some(midnight) = tz.from_local_datetime(&naive).earliest() {
        return midnight.timestamp();
    }
    // DST gap at midnight: probe forward by the hour.
    for hour in 1..=3 {
        let probe = naive + chrono::Duration::hours(hour);
        if let Some(dt) = tz.from_local_datetime(&probe).earliest() {
            return dt.timestamp();
        }
    }
    now.timestamp()
}

impl Relay {
    /// Resets the daily counters if a local midnight has passed since the
    /// last reset.
    pub async fn rollover(&self) -> Result<bool, SmsqError> {
        self.rollover_at(local_midnight(&Local::now())).await
    }

    /// Applies a rollover for the day starting at `midnight` if it is later
    /// than the stored boundary. Returns `true` if counters were reset.
    pub async fn rollover_at(&self, midnight: i64) -> Result<bool, SmsqError> {
        let stored = self.store.stored_midnight().await?;
        if midnight <= stored {
            return Ok(false);
        }
        self.store.apply_rollover(midnight).await?;
        record_rollover();
        info!(midnight, previous = stored, "daily counters reset");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn utc_midnight() {
        let now = Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap();
        let expected = Utc.with_ymd_and_hms(2023, 11, 14, 0, 0, 0).unwrap();
        assert_eq!(local_midnight(&now), expected.timestamp());
    }

    #[test]
    fn offset_zone_uses_its_own_calendar_day() {
        let tz = FixedOffset::east_opt(3 * 3600).unwrap();
        // 22:13 UTC is already 01:13 on the 15th at +03:00.
        let now = Utc
            .with_ymd_and_hms(2023, 11, 14, 22, 13, 20)
            .unwrap()
            .with_timezone(&tz);
        let expected = tz.with_ymd_and_hms(2023, 11, 15, 0, 0, 0).unwrap();
        assert_eq!(local_midnight(&now), expected.timestamp());
    }

    #[test]
    fn exactly_midnight_maps_to_itself() {
        let now = Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap();
        assert_eq!(local_midnight(&now), now.timestamp());
    }
}
