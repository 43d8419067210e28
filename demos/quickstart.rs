use chrono::{DateTime, Datelike, FixedOffset, Local, NaiveDate};
use moonclock::{
    DailyRecord, EngineConfig, FetchError, Location, MoonClock, RecordSource, SyncError,
    SyncedTime, WallClock,
};

/// Same rise/set times every day; the age advances one synodic day per date.
struct FixedTimes;

impl RecordSource for FixedTimes {
    fn fetch_daily_record(
        &mut self,
        date: NaiveDate,
        _location: &Location,
        utc_offset: FixedOffset,
    ) -> Result<DailyRecord, FetchError> {
        let at = |h, m| {
            date.and_hms_opt(h, m, 0)
                .and_then(|t| t.and_local_timezone(utc_offset).single())
        };
        let rejected = |reason: String| FetchError::Rejected { date, reason };

        let midnight = at(0, 0).ok_or_else(|| rejected("no local midnight".into()))?;
        let age = (f64::from(date.num_days_from_ce()) / 29.530_588).fract();
        Ok(DailyRecord::new(age, midnight)
            .map_err(|e| rejected(e.to_string()))?
            .with_sunrise(at(6, 41))
            .with_sunset(at(17, 55))
            .with_moonrise(at(11, 2))
            .with_moonset(at(1, 37)))
    }
}

/// The host clock; syncing is a no-op.
struct HostClock;

impl WallClock for HostClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }

    fn sync(&mut self, _timezone: Option<&str>) -> Result<SyncedTime, SyncError> {
        let now = self.now();
        Ok(SyncedTime {
            now,
            utc_offset: *now.offset(),
        })
    }
}

fn main() -> Result<(), moonclock::EngineError> {
    let config = EngineConfig {
        latitude: 47.56,
        longitude: -122.39,
        ..EngineConfig::default()
    };
    let mut engine = MoonClock::start(config, FixedTimes, HostClock)?;

    for _ in 0..8 {
        let report = engine.tick()?;
        let shown = report
            .shown
            .map(|s| format!("{} {}", s.glyph(), s.label))
            .unwrap_or_default();
        println!(
            "{} {}  moon {} (frame {:2})  {}",
            report.date_label, report.time_label, report.percent_label, report.phase.frame, shown
        );
    }
    Ok(())
}
