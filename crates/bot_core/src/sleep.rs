//! Daily sleep window arithmetic.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SleepWindowError {
    #[error("unparsable time of day '{0}' (expected HH:MM)")]
    InvalidTime(String),
    #[error("go-to-sleep and wake-up times are identical")]
    EmptyWindow,
    #[error("utc offset of {0} minutes is out of range")]
    InvalidOffset(i32),
}

/// Where `now` sits relative to the window, and the next transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepPhase {
    Awake { sleep_at: DateTime<Utc> },
    Asleep { wake_at: DateTime<Utc> },
}

impl SleepPhase {
    pub fn is_asleep(&self) -> bool {
        matches!(self, SleepPhase::Asleep { .. })
    }

    pub fn next_transition(&self) -> DateTime<Utc> {
        match *self {
            SleepPhase::Awake { sleep_at } => sleep_at,
            SleepPhase::Asleep { wake_at } => wake_at,
        }
    }
}

/// A (go-to-sleep, wake-up) pair of local times; may wrap midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SleepWindow {
    go_to_sleep: NaiveTime,
    wake_up: NaiveTime,
    offset: FixedOffset,
}

impl SleepWindow {
    pub fn new(
        go_to_sleep: NaiveTime,
        wake_up: NaiveTime,
        offset: FixedOffset,
    ) -> Result<Self, SleepWindowError> {
        if go_to_sleep == wake_up {
            return Err(SleepWindowError::EmptyWindow);
        }
        Ok(Self {
            go_to_sleep,
            wake_up,
            offset,
        })
    }

    pub fn parse(
        go_to_sleep: &str,
        wake_up: &str,
        utc_offset_minutes: i32,
    ) -> Result<Self, SleepWindowError> {
        let time = |raw: &str| {
            NaiveTime::parse_from_str(raw.trim(), "%H:%M")
                .map_err(|_| SleepWindowError::InvalidTime(raw.to_string()))
        };
        let offset = FixedOffset::east_opt(utc_offset_minutes.saturating_mul(60))
            .ok_or(SleepWindowError::InvalidOffset(utc_offset_minutes))?;
        Self::new(time(go_to_sleep)?, time(wake_up)?, offset)
    }

    pub fn go_to_sleep(&self) -> NaiveTime {
        self.go_to_sleep
    }

    pub fn wake_up(&self) -> NaiveTime {
        self.wake_up
    }

    fn at(&self, date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
        let local = date.and_time(time);
        let utc = local - Duration::seconds(i64::from(self.offset.local_minus_utc()));
        Utc.from_utc_datetime(&utc)
    }

    fn length(&self) -> Duration {
        let span = self.wake_up - self.go_to_sleep;
        if span > Duration::zero() {
            span
        } else {
            span + Duration::days(1)
        }
    }

    /// Compares today's go-to-sleep and wake-up instants with `now`; each of
    /// the four orderings maps to a phase and its next transition, rolling a
    /// time to tomorrow when both have already passed.
    pub fn phase(&self, now: DateTime<Utc>) -> SleepPhase {
        let today = now.with_timezone(&self.offset).date_naive();
        let day = Duration::days(1);
        let go = self.at(today, self.go_to_sleep);
        let wake = self.at(today, self.wake_up);
        match (go <= now, wake <= now) {
            (true, true) => {
                if go > wake {
                    SleepPhase::Asleep { wake_at: wake + day }
                } else {
                    SleepPhase::Awake { sleep_at: go + day }
                }
            }
            (true, false) => SleepPhase::Asleep { wake_at: wake },
            (false, true) => SleepPhase::Awake { sleep_at: go },
            (false, false) => {
                if go < wake {
                    SleepPhase::Awake { sleep_at: go }
                } else {
                    SleepPhase::Asleep { wake_at: wake }
                }
            }
        }
    }

    /// The window `now` is in, or the next one.
    pub fn current_or_next(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        match self.phase(now) {
            SleepPhase::Asleep { wake_at } => (wake_at - self.length(), wake_at),
            SleepPhase::Awake { sleep_at } => (sleep_at, sleep_at + self.length()),
        }
    }

    /// True when `instant` lies strictly inside the current or next window.
    pub fn lands_inside(&self, now: DateTime<Utc>, instant: DateTime<Utc>) -> bool {
        let (start, end) = self.current_or_next(now);
        instant > start && instant < end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, h, m, 0).single().unwrap()
    }

    fn night() -> SleepWindow {
        SleepWindow::parse("23:00", "07:00", 0).unwrap()
    }

    #[test]
    fn identical_times_are_rejected() {
        assert_eq!(
            SleepWindow::parse("06:00", "06:00", 0),
            Err(SleepWindowError::EmptyWindow)
        );
        assert!(matches!(
            SleepWindow::parse("25:00", "06:00", 0),
            Err(SleepWindowError::InvalidTime(_))
        ));
    }

    #[test]
    fn phase_covers_all_orderings() {
        let w = night();
        // both passed, go after wake: asleep until tomorrow morning
        assert_eq!(
            w.phase(at(23, 30)),
            SleepPhase::Asleep {
                wake_at: at(7, 0) + Duration::days(1)
            }
        );
        // wake passed, go ahead
        assert_eq!(w.phase(at(12, 0)), SleepPhase::Awake { sleep_at: at(23, 0) });
        // neither passed, go after wake: still in last night's window
        assert_eq!(w.phase(at(3, 0)), SleepPhase::Asleep { wake_at: at(7, 0) });

        let day_nap = SleepWindow::parse("01:00", "07:00", 0).unwrap();
        // go passed, wake ahead
        assert_eq!(day_nap.phase(at(2, 0)), SleepPhase::Asleep { wake_at: at(7, 0) });
        // neither passed, go before wake
        assert_eq!(day_nap.phase(at(0, 30)), SleepPhase::Awake { sleep_at: at(1, 0) });
        // both passed, go before wake
        assert_eq!(
            day_nap.phase(at(8, 0)),
            SleepPhase::Awake {
                sleep_at: at(1, 0) + Duration::days(1)
            }
        );
    }

    #[test]
    fn offset_shifts_local_times() {
        let w = SleepWindow::parse("23:00", "07:00", 120).unwrap();
        // 20:30 UTC is 22:30 local
        assert_eq!(w.phase(at(20, 30)), SleepPhase::Awake { sleep_at: at(21, 0) });
    }

    #[test]
    fn lands_inside_is_strict() {
        let w = night();
        let now = at(22, 0);
        assert!(w.lands_inside(now, at(23, 0) + Duration::hours(2)));
        assert!(!w.lands_inside(now, at(23, 0)));
        assert!(!w.lands_inside(now, at(22, 30)));
        assert!(!w.lands_inside(now, at(7, 0) + Duration::days(1)));
    }
}
