//! Civil calendar in one fixed timezone, independent of the host's local zone.
//!
//! Every computation reads the underlying time source exactly once, so the
//! date and the distance to the next boundary always describe the same instant.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, FixedOffset, TimeDelta, TimeZone, Utc};

use quartet_types::CivilDate;

/// Source of "now" as a UTC instant.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A settable clock for tests and replays.
#[derive(Debug)]
pub struct ManualTimeSource {
    now: Mutex<DateTime<Utc>>,
}

impl ManualTimeSource {
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    pub fn advance(&self, by: TimeDelta) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Calendar adapter for the game's civil timezone.
#[derive(Clone)]
pub struct CivilClock {
    zone: FixedOffset,
    source: Arc<dyn TimeSource>,
}

impl std::fmt::Debug for CivilClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CivilClock")
            .field("zone", &self.zone)
            .finish_non_exhaustive()
    }
}

impl CivilClock {
    #[must_use]
    pub fn new(zone: FixedOffset, source: Arc<dyn TimeSource>) -> Self {
        Self { zone, source }
    }

    /// Wall clock in the zone `utc_offset_minutes` east of UTC.
    ///
    /// Returns `None` if the offset is a day or more.
    #[must_use]
    pub fn system(utc_offset_minutes: i32) -> Option<Self> {
        let zone = FixedOffset::east_opt(utc_offset_minutes.checked_mul(60)?)?;
        Some(Self::new(zone, Arc::new(SystemTimeSource)))
    }

    #[must_use]
    pub fn zone(&self) -> FixedOffset {
        self.zone
    }

    #[must_use]
    pub fn today(&self) -> CivilDate {
        self.date_at(self.source.now())
    }

    /// Today's ordinal in the civil calendar, January 1st is 1.
    #[must_use]
    pub fn day_of_year(&self) -> u16 {
        self.today().day_of_year()
    }

    /// Time remaining until the next civil midnight. Zero if the boundary has
    /// already passed by the time it is computed.
    #[must_use]
    pub fn until_next_midnight(&self) -> Duration {
        let now = self.source.now();
        let Some(boundary) = self.next_midnight_after(now) else {
            return Duration::ZERO;
        };
        (boundary - now).to_std().unwrap_or(Duration::ZERO)
    }

    #[must_use]
    pub fn ms_until_next_midnight(&self) -> u64 {
        u64::try_from(self.until_next_midnight().as_millis()).unwrap_or(u64::MAX)
    }

    fn date_at(&self, instant: DateTime<Utc>) -> CivilDate {
        CivilDate::new(instant.with_timezone(&self.zone).date_naive())
    }

    // The boundary comes from tomorrow's calendar fields mapped back through
    // the zone, never from `now + 24h`.
    fn next_midnight_after(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let tomorrow = self.date_at(now).next_day()?;
        let midnight = tomorrow.naive().and_hms_opt(0, 0, 0)?;
        self.zone
            .from_local_datetime(&midnight)
            .earliest()
            .map(|local| local.with_timezone(&Utc))
    }
}
