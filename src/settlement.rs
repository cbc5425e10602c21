// 5.0: the settlement clock. daily mark-to-market happens at a configured
// wall-clock time in the series' timezone; this module owns the civil-date +
// time-of-day composition that produces the next settlement instant.
//
// timezone handling goes through chrono's TimeZone trait, so an IANA zone
// type gets real DST rules while Utc/FixedOffset get plain arithmetic.
// local times made ambiguous by a fall-back fold resolve to the earliest
// instant; local times erased by a spring-forward gap scan forward in
// 30-minute steps to the next representable instant.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone};

/// Produces settlement instants from bar timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementClock {
    time_of_day: NaiveTime,
}

impl SettlementClock {
    pub fn new(time_of_day: NaiveTime) -> Self {
        Self { time_of_day }
    }

    pub fn time_of_day(&self) -> NaiveTime {
        self.time_of_day
    }

    /// The settlement instant on the calendar date of `ts`, in `ts`'s zone.
    /// Seeds the schedule when the first bar is processed.
    pub fn on_bar_date<Tz: TimeZone>(&self, ts: &DateTime<Tz>) -> DateTime<Tz> {
        compose(&ts.timezone(), ts.date_naive(), self.time_of_day)
    }

    /// The settlement instant on the calendar day after `ts`'s date.
    /// Rolls the schedule after a settlement fires.
    pub fn on_next_date<Tz: TimeZone>(&self, ts: &DateTime<Tz>) -> DateTime<Tz> {
        let next_day = ts.clone() + Duration::days(1);
        compose(&ts.timezone(), next_day.date_naive(), self.time_of_day)
    }
}

fn compose<Tz: TimeZone>(tz: &Tz, date: NaiveDate, time: NaiveTime) -> DateTime<Tz> {
    let mut naive = date.and_time(time);
    loop {
        match tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) => return dt,
            LocalResult::Ambiguous(earliest, _) => return earliest,
            // spring-forward gap: the wall-clock time does not exist on this
            // date; settle at the first representable instant after it
            LocalResult::None => naive = naive + Duration::minutes(30),
        }
    }
}
