use chrono::{DateTime, FixedOffset, NaiveDate, TimeDelta};
use moonclock::{
    Body, DailyRecord, Day, Direction, EngineConfig, EngineError, FetchError, Location, MoonClock,
    RecordSource, Slot, SyncError, SyncedTime, WallClock,
};
use std::cell::RefCell;
use std::rc::Rc;

// ── Fakes ─────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct ClockState {
    now: DateTime<FixedOffset>,
    sync_ok: bool,
    sync_offset: Option<FixedOffset>,
    sync_latency: TimeDelta,
    sync_calls: u32,
}

#[derive(Clone, Debug)]
struct FakeClock(Rc<RefCell<ClockState>>);

impl FakeClock {
    fn at(now: DateTime<FixedOffset>) -> Self {
        FakeClock(Rc::new(RefCell::new(ClockState {
            now,
            sync_ok: true,
            sync_offset: None,
            sync_latency: TimeDelta::zero(),
            sync_calls: 0,
        })))
    }

    fn set(&self, now: DateTime<FixedOffset>) {
        self.0.borrow_mut().now = now;
    }

    fn advance(&self, by: TimeDelta) {
        let mut state = self.0.borrow_mut();
        state.now = state.now + by;
    }
}

impl WallClock for FakeClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0.borrow().now
    }

    fn sync(&mut self, _timezone: Option<&str>) -> Result<SyncedTime, SyncError> {
        let mut state = self.0.borrow_mut();
        state.sync_calls += 1;
        if !state.sync_ok {
            return Err(SyncError::Unreachable("worldtimeapi down".into()));
        }
        let offset = state.sync_offset.unwrap_or(*state.now.offset());
        state.now = (state.now + state.sync_latency).with_timezone(&offset);
        Ok(SyncedTime {
            now: state.now,
            utc_offset: offset,
        })
    }
}

#[derive(Debug)]
struct SourceState {
    failing: bool,
    requests: Vec<(NaiveDate, FixedOffset)>,
}

/// Deterministic records: the moon ages 0.034 per day from 0.2 on
/// 2024-03-01, and every day has the same rise/set times, except that the
/// moon never sets on the 1st.
#[derive(Clone, Debug)]
struct FakeSource(Rc<RefCell<SourceState>>);

impl FakeSource {
    fn new() -> Self {
        FakeSource(Rc::new(RefCell::new(SourceState {
            failing: false,
            requests: Vec::new(),
        })))
    }

    fn fail(&self, failing: bool) {
        self.0.borrow_mut().failing = failing;
    }

    fn requests(&self) -> Vec<(NaiveDate, FixedOffset)> {
        self.0.borrow().requests.clone()
    }
}

fn local(date: NaiveDate, h: u32, m: u32, offset: FixedOffset) -> DateTime<FixedOffset> {
    date.and_hms_opt(h, m, 0)
        .unwrap()
        .and_local_timezone(offset)
        .unwrap()
}

impl RecordSource for FakeSource {
    fn fetch_daily_record(
        &mut self,
        date: NaiveDate,
        _location: &Location,
        utc_offset: FixedOffset,
    ) -> Result<DailyRecord, FetchError> {
        let mut state = self.0.borrow_mut();
        state.requests.push((date, utc_offset));
        if state.failing {
            return Err(FetchError::Transient("HTTP 503".into()));
        }

        let epoch = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let days = (date - epoch).num_days() as f64;
        let age = (0.2 + 0.034 * days).rem_euclid(1.0);
        let moonset = (date != epoch).then(|| local(date, 23, 30, utc_offset));

        DailyRecord::new(age, local(date, 0, 0, utc_offset))
            .map(|r| {
                r.with_sunrise(Some(local(date, 6, 40, utc_offset)))
                    .with_sunset(Some(local(date, 17, 50, utc_offset)))
                    .with_moonrise(Some(local(date, 10, 0, utc_offset)))
                    .with_moonset(moonset)
            })
            .map_err(|e| FetchError::Rejected {
                date,
                reason: e.to_string(),
            })
    }
}

fn pst() -> FixedOffset {
    FixedOffset::west_opt(8 * 3_600).unwrap()
}

fn march(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
}

fn config() -> EngineConfig {
    EngineConfig {
        latitude: 47.56,
        longitude: -122.39,
        fetch_retry_delay_secs: 0,
        ..EngineConfig::default()
    }
}

type Harness = (MoonClock<FakeSource, FakeClock>, FakeSource, FakeClock);

fn started(now: DateTime<FixedOffset>) -> Harness {
    let source = FakeSource::new();
    let clock = FakeClock::at(now);
    let engine = MoonClock::start(config(), source.clone(), clock.clone()).expect("start");
    (engine, source, clock)
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[test]
fn first_tick_reports_phase_and_upcoming_sunrise() {
    let (mut engine, source, _clock) = started(local(march(1), 5, 40, pst()));
    assert_eq!(source.requests(), vec![(march(1), pst()), (march(2), pst())]);

    let report = engine.tick().unwrap();

    let sun = report.sun.unwrap();
    assert_eq!(sun.at, local(march(1), 6, 40, pst()));
    assert_eq!(sun.direction, Direction::Rise);
    assert_eq!(sun.day, Day::Today);
    assert_eq!(report.risen(Body::Sun), Some(false));

    assert!((0.0..1.0).contains(&report.phase.age));
    assert!(report.phase.age > 0.2 && report.phase.age < 0.234);
    assert_eq!(report.phase.frame, moonclock::frame_index(report.phase.age));
    assert_eq!(report.percent_label, report.phase.label());

    let shown = report.shown.unwrap();
    assert_eq!(shown.event.slot, Slot::TodaySunrise);
    assert_eq!(shown.label, "6:40");
    assert_eq!(shown.glyph().as_char(), '↑');

    assert_eq!(report.time_label, "5:40");
    assert_eq!(report.date_label, "3/1");
    assert!(!report.awake);
}

#[test]
fn moon_without_set_today_looks_to_tomorrow() {
    let (mut engine, _source, _clock) = started(local(march(1), 12, 0, pst()));
    let report = engine.tick().unwrap();

    let moon = report.moon.unwrap();
    assert_eq!(moon.day, Day::Tomorrow);
    assert_eq!(moon.direction, Direction::Rise);
    assert_eq!(moon.at, local(march(2), 10, 0, pst()));

    let sun = report.sun.unwrap();
    assert_eq!(sun.direction, Direction::Set);
    assert!(report.any_risen());
    assert!(report.awake);
}

#[test]
fn rotation_visits_every_slot_once_per_eight_ticks() {
    let (mut engine, _source, clock) = started(local(march(1), 9, 0, pst()));
    let mut slots = Vec::new();
    for _ in 0..8 {
        let report = engine.tick().unwrap();
        slots.push(report.shown.map(|s| s.event.slot));
        clock.advance(TimeDelta::seconds(10));
    }

    // Today's moonset is missing, so that tick shows nothing.
    assert_eq!(
        slots,
        vec![
            Some(Slot::TodaySunrise),
            Some(Slot::TodaySunset),
            Some(Slot::TodayMoonrise),
            None,
            Some(Slot::TomorrowSunrise),
            Some(Slot::TomorrowSunset),
            Some(Slot::TomorrowMoonrise),
            Some(Slot::TomorrowMoonset),
        ]
    );
    assert_eq!(engine.rotation().current(), Slot::TodaySunrise);
}

#[test]
fn rollover_at_midnight_fetches_the_following_day() {
    let (mut engine, source, clock) = started(local(march(1), 23, 30, pst()));
    engine.tick().unwrap();

    clock.set(local(march(2), 0, 0, pst()));
    let report = engine.tick().unwrap();

    let window = engine.window();
    assert_eq!(window.today().date(), march(2));
    assert_eq!(window.tomorrow().date(), march(3));
    assert_eq!(
        window.tomorrow().midnight(),
        window.today().midnight() + TimeDelta::seconds(86_400)
    );
    assert_eq!(source.requests().last(), Some(&(march(3), pst())));
    assert!((report.phase.age - window.today().age()).abs() < 1e-12);
}

#[test]
fn exhausted_rollover_poisons_the_engine() {
    let (mut engine, source, clock) = started(local(march(1), 20, 0, pst()));
    engine.tick().unwrap();
    let before = *engine.window();

    source.fail(true);
    clock.set(local(march(2), 0, 5, pst()));
    let err = engine.tick().unwrap_err();

    assert!(err.is_fatal());
    match &err {
        EngineError::RolloverFailed { expired_at, cause } => {
            assert_eq!(*expired_at, local(march(2), 0, 0, pst()));
            assert!(matches!(
                **cause,
                EngineError::Fetch(FetchError::Exhausted { attempts: 5, .. })
            ));
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(*engine.window(), before);
    // Five attempts for the rollover on top of the two startup fetches.
    assert_eq!(source.requests().len(), 7);

    source.fail(false);
    assert_eq!(engine.tick().unwrap_err(), err);
    assert_eq!(source.requests().len(), 7);
    assert!(engine.poisoned().is_some());
}

#[test]
fn failed_sync_backs_off_and_keeps_running() {
    let start = local(march(1), 9, 0, pst());
    let (mut engine, _source, clock) = started(start);
    clock.0.borrow_mut().sync_ok = false;

    clock.set(start + TimeDelta::minutes(61));
    let report = engine.tick().unwrap();
    assert_eq!(report.now, start + TimeDelta::minutes(61));
    assert_eq!(engine.scheduler().last_sync(), start + TimeDelta::minutes(30));
    assert_eq!(clock.0.borrow().sync_calls, 2);

    // Not due again until more than an hour after the pushed-back time.
    clock.set(start + TimeDelta::minutes(90));
    engine.tick().unwrap();
    assert_eq!(clock.0.borrow().sync_calls, 2);

    clock.set(start + TimeDelta::minutes(91));
    engine.tick().unwrap();
    assert_eq!(clock.0.borrow().sync_calls, 3);
    assert_eq!(engine.scheduler().last_sync(), start + TimeDelta::minutes(60));
}

#[test]
fn successful_sync_records_post_sync_time_and_new_offset() {
    let start = local(march(1), 9, 0, pst());
    let (mut engine, source, clock) = started(start);
    let pdt = FixedOffset::west_opt(7 * 3_600).unwrap();
    {
        let mut state = clock.0.borrow_mut();
        state.sync_latency = TimeDelta::seconds(3);
        state.sync_offset = Some(pdt);
    }

    clock.set(start + TimeDelta::minutes(61));
    let report = engine.tick().unwrap();

    let synced = (start + TimeDelta::minutes(61) + TimeDelta::seconds(3)).with_timezone(&pdt);
    assert_eq!(engine.scheduler().last_sync(), synced);
    assert_eq!(report.now, synced);
    assert_eq!(engine.utc_offset(), pdt);
    assert_eq!(report.time_label, "11:01");

    // The next rollover asks for the day in the new offset.
    clock.set(local(march(2), 1, 0, pdt));
    engine.tick().unwrap();
    assert_eq!(source.requests().last(), Some(&(march(3), pdt)));
}

#[test]
fn startup_survives_sync_failure_but_not_fetch_failure() {
    let now = local(march(1), 9, 0, pst());

    let clock = FakeClock::at(now);
    clock.0.borrow_mut().sync_ok = false;
    let engine = MoonClock::start(config(), FakeSource::new(), clock).unwrap();
    assert_eq!(engine.scheduler().last_sync(), now);

    let source = FakeSource::new();
    source.fail(true);
    let err = MoonClock::start(config(), source.clone(), FakeClock::at(now)).unwrap_err();
    assert!(err.is_fatal());
    assert!(matches!(err, EngineError::Startup(FetchError::Exhausted { .. })));
    assert_eq!(source.requests().len(), 5);
}

#[test]
fn startup_dates_follow_the_configured_offset_when_unsynced() {
    // 03:00 UTC on the 2nd is still the evening of the 1st at -08:00.
    let utc_now = local(march(2), 3, 0, FixedOffset::east_opt(0).unwrap());
    let clock = FakeClock::at(utc_now);
    clock.0.borrow_mut().sync_ok = false;
    let source = FakeSource::new();

    let engine = MoonClock::start(config(), source.clone(), clock).unwrap();

    assert_eq!(source.requests(), vec![(march(1), pst()), (march(2), pst())]);
    assert_eq!(engine.today().date(), march(1));
    assert!(!engine.window().is_expired(utc_now));
}

#[test]
fn invalid_config_is_rejected_before_any_io() {
    let source = FakeSource::new();
    let bad = EngineConfig {
        sync_backoff_secs: 7_200,
        ..config()
    };
    let err = MoonClock::start(bad, source.clone(), FakeClock::at(local(march(1), 9, 0, pst())))
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidConfig(_)));
    assert!(source.requests().is_empty());
}

#[test]
fn countdown_mode_labels_time_remaining() {
    let cfg = EngineConfig {
        countdown: true,
        ..config()
    };
    let engine = MoonClock::start(
        cfg,
        FakeSource::new(),
        FakeClock::at(local(march(1), 4, 25, pst())),
    );
    let report = engine.unwrap().tick().unwrap();
    assert_eq!(report.shown.unwrap().label, "2:15");
}

#[cfg(feature = "serde")]
#[test]
fn config_deserializes_with_defaults() {
    let cfg: EngineConfig = serde_json::from_str(
        r#"{
            "latitude": 47.56,
            "longitude": -122.39,
            "timezone": "America/Los_Angeles",
            "countdown": true
        }"#,
    )
    .unwrap();
    assert_eq!(cfg.timezone.as_deref(), Some("America/Los_Angeles"));
    assert!(cfg.countdown);
    assert_eq!(cfg.sync_interval_secs, 3_600);
    cfg.validate().unwrap();
}

#[cfg(feature = "serde")]
#[test]
fn records_serialize_instants_as_rfc3339() {
    let midnight = moonclock::parse_timestamp("2024-03-01T00:00:00-08:00").unwrap();
    let record = DailyRecord::new(0.25, midnight).unwrap();
    let json = serde_json::to_string(&record).unwrap();
    assert!(json.contains("2024-03-01T00:00:00-08:00"));
}
