use std::cell::RefCell;
use std::convert::Infallible;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use arbiter::{
    Actuator, ArbiterError, ChannelId, ConfigError, ExclusiveRecord,
    GateOutcome, HoldGate, HoldMode, Holder, LineId, SampleSource,
    SensorSample,
};
use embassy_futures::join::join;
use embassy_futures::select::select;
use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, NoopRawMutex};
use embassy_time::{Duration, Instant, Timer};
use futures::executor::block_on;

// ---------------------------------------------------------------------------
// Mocks
// ---------------------------------------------------------------------------

/// Logs every output write in order.
#[derive(Clone, Default)]
struct Board {
    writes: Rc<RefCell<Vec<(u8, bool)>>>,
}

impl Board {
    fn is_on(&self, line: u8) -> bool {
        self.writes
            .borrow()
            .iter()
            .rev()
            .find(|(l, _)| *l == line)
            .map(|(_, on)| *on)
            .unwrap_or(false)
    }

    fn switched_on(&self) -> Vec<(u8, bool)> {
        self.writes.borrow().iter().copied().filter(|(_, on)| *on).collect()
    }
}

impl Actuator for Board {
    fn set_output(&mut self, line: LineId, on: bool) {
        self.writes.borrow_mut().push((line.0, on));
    }
}

/// A potentiometer that creeps up by one count per reading.
struct Ramp(u16);

impl SampleSource for Ramp {
    async fn sample(&mut self) -> u16 {
        self.0 += 1;
        self.0
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const WINDOW: Duration = Duration::from_millis(200);
const NO_WAIT: Duration = Duration::from_ticks(0);

const FIXED_BUTTON: LineId = LineId(1);
const SAMPLER_BUTTON: LineId = LineId(2);
const FIXED_LED: u8 = 3;
const SAMPLER_LED: u8 = 4;

type Record = ExclusiveRecord<NoopRawMutex, SensorSample>;

fn at(ms: u64) -> Instant {
    Instant::from_millis(ms)
}

fn sampling(duration_ms: u64, period_ms: u64) -> HoldMode<Ramp> {
    HoldMode::Sampling {
        source: Ramp(0),
        duration: Duration::from_millis(duration_ms),
        period: Duration::from_millis(period_ms),
    }
}

// ---------------------------------------------------------------------------
// Exclusive record
// ---------------------------------------------------------------------------

#[futures_test::test]
async fn quick_attempt_is_refused_while_sampler_holds_record() {
    let record = Record::new(SensorSample::EMPTY);
    let gate = HoldGate::new([FIXED_BUTTON, SAMPLER_BUTTON], WINDOW, &record);
    let board = Board::default();
    let mut sampler = Holder::new(
        ChannelId(1),
        LineId(SAMPLER_LED),
        &gate,
        board.clone(),
        sampling(100, 10),
    )
    .unwrap();

    join(sampler.hold_once(), async {
        assert!(record.is_held());
        assert!(board.is_on(SAMPLER_LED));

        // Zero-timeout attempt fails at once without running the body.
        let ran = AtomicBool::new(false);
        let attempt = record
            .with_exclusive_access(NO_WAIT, |_| ran.store(true, Ordering::SeqCst))
            .await;
        assert_eq!(attempt, Err(ArbiterError::LockTimeout));
        assert!(!ran.load(Ordering::SeqCst));

        // A bounded wait shorter than the hold also gives up.
        let waited = record.lock_within(Duration::from_millis(20)).await;
        assert_eq!(waited.err(), Some(ArbiterError::LockTimeout));
        assert!(record.is_held());
    })
    .await;

    assert!(!record.is_held());
    assert!(!board.is_on(SAMPLER_LED));

    let last = record.snapshot(NO_WAIT).await.unwrap();
    assert!(last.value >= 2);
    assert_ne!(last.timestamp, Instant::from_ticks(0));
}

#[futures_test::test]
async fn body_error_still_releases_lock() {
    let record = Record::new(SensorSample::EMPTY);

    let outcome = record
        .with_exclusive_access(NO_WAIT, |sample| -> Result<(), &'static str> {
            sample.value = 7;
            Err("sensor fault")
        })
        .await;

    assert_eq!(outcome, Ok(Err("sensor fault")));
    assert!(!record.is_held());
    assert_eq!(record.snapshot(NO_WAIT).await.unwrap().value, 7);
}

#[futures_test::test]
async fn timeout_does_not_run_body_or_leak_lock() {
    let record = Record::new(SensorSample::EMPTY);

    let guard = record.try_lock().unwrap();
    assert!(record.is_held());

    let started = Instant::now();
    let ran = AtomicBool::new(false);
    let outcome = record
        .with_exclusive_access(Duration::from_millis(20), |_| {
            ran.store(true, Ordering::SeqCst)
        })
        .await;
    assert_eq!(outcome, Err(ArbiterError::LockTimeout));
    assert!(started.elapsed() >= Duration::from_millis(20));
    assert!(!ran.load(Ordering::SeqCst));

    drop(guard);
    assert!(!record.is_held());
    assert!(record.try_lock().is_ok());
}

#[test]
fn panicking_body_releases_lock() {
    let record = Record::new(SensorSample::EMPTY);

    let result = catch_unwind(AssertUnwindSafe(|| {
        block_on(record.with_exclusive_access(NO_WAIT, |_| -> () {
            panic!("holder crashed")
        }))
    }));

    assert!(result.is_err());
    assert!(!record.is_held());
    assert!(record.try_lock().is_ok());
}

#[test]
fn guards_are_mutually_exclusive_across_threads() {
    const THREADS: usize = 6;
    const ROUNDS: usize = 500;

    static RECORD: ExclusiveRecord<CriticalSectionRawMutex, (usize, usize)> =
        ExclusiveRecord::new((0, 0));
    static INSIDE: AtomicUsize = AtomicUsize::new(0);

    std::thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                for _ in 0..ROUNDS {
                    block_on(async {
                        let mut pair = RECORD.lock().await;
                        assert_eq!(INSIDE.fetch_add(1, Ordering::SeqCst), 0);
                        assert!(RECORD.is_held());
                        pair.0 += 1;
                        std::hint::spin_loop();
                        pair.1 += 1;
                        assert_eq!(pair.0, pair.1);
                        INSIDE.fetch_sub(1, Ordering::SeqCst);
                    });
                }
            });
        }
    });

    assert!(!RECORD.is_held());
    let total = block_on(RECORD.snapshot(NO_WAIT)).unwrap();
    assert_eq!(total, (THREADS * ROUNDS, THREADS * ROUNDS));
}

// ---------------------------------------------------------------------------
// Hold gate
// ---------------------------------------------------------------------------

#[test]
fn gate_resumes_idle_holder() {
    let record = Record::new(SensorSample::EMPTY);
    let gate = HoldGate::new([FIXED_BUTTON, SAMPLER_BUTTON], WINDOW, &record);

    assert_eq!(
        gate.on_edge(FIXED_BUTTON, at(1_000)),
        GateOutcome::Resumed(ChannelId(0))
    );
    let wake = gate.wake_handle(ChannelId(0)).unwrap();
    assert!(wake.is_pending());
    assert!(!gate.wake_handle(ChannelId(1)).unwrap().is_pending());
    assert!(gate.wake_handle(ChannelId(2)).is_none());
}

#[test]
fn gate_ignores_bounces_and_foreign_lines() {
    let record = Record::new(SensorSample::EMPTY);
    let gate = HoldGate::new([FIXED_BUTTON, SAMPLER_BUTTON], WINDOW, &record);

    assert_eq!(
        gate.on_edge(SAMPLER_BUTTON, at(1_000)),
        GateOutcome::Resumed(ChannelId(1))
    );
    assert_eq!(gate.on_edge(SAMPLER_BUTTON, at(1_080)), GateOutcome::Ignored);
    assert_eq!(gate.on_edge(LineId(30), at(1_000)), GateOutcome::Ignored);
}

#[test]
fn gate_refuses_presses_while_record_is_held() {
    let record = Record::new(SensorSample::EMPTY);
    let gate = HoldGate::new([FIXED_BUTTON, SAMPLER_BUTTON], WINDOW, &record);

    let guard = record.try_lock().unwrap();
    assert_eq!(
        gate.on_edge(FIXED_BUTTON, at(1_000)),
        GateOutcome::Busy(ChannelId(0))
    );
    assert!(!gate.wake_handle(ChannelId(0)).unwrap().is_pending());

    drop(guard);
    assert_eq!(
        gate.on_edge(FIXED_BUTTON, at(2_000)),
        GateOutcome::Resumed(ChannelId(0))
    );
}

// ---------------------------------------------------------------------------
// Holders
// ---------------------------------------------------------------------------

#[test]
fn holder_outside_the_gate_is_rejected() {
    let record = Record::new(SensorSample::EMPTY);
    let gate = HoldGate::new([FIXED_BUTTON, SAMPLER_BUTTON], WINDOW, &record);
    let board = Board::default();

    let stray = Holder::<_, _, Infallible, 2>::new(
        ChannelId(2),
        LineId(FIXED_LED),
        &gate,
        board.clone(),
        HoldMode::Fixed(WINDOW),
    );
    assert_eq!(
        stray.err(),
        Some(ArbiterError::Config(ConfigError::UnknownChannel(ChannelId(2))))
    );
    // Rejected before touching the output.
    assert!(board.writes.borrow().is_empty());
}

#[futures_test::test]
async fn fixed_holder_runs_once_per_resume() {
    const HOLD: Duration = Duration::from_millis(30);
    let record = Record::new(SensorSample::EMPTY);
    let gate = HoldGate::new([FIXED_BUTTON, SAMPLER_BUTTON], WINDOW, &record);
    let board = Board::default();
    let mut fixed = Holder::<_, _, Infallible, 2>::new(
        ChannelId(0),
        LineId(FIXED_LED),
        &gate,
        board.clone(),
        HoldMode::Fixed(HOLD),
    )
    .unwrap();
    assert!(!board.is_on(FIXED_LED));

    gate.on_edge(FIXED_BUTTON, at(1_000));
    select(fixed.run(), async {
        Timer::after_millis(5).await;
        assert!(record.is_held());
        assert!(board.is_on(FIXED_LED));

        Timer::after(HOLD).await;
        assert!(!record.is_held());
        assert!(!board.is_on(FIXED_LED));

        // Back to sleeping on its wake handle.
        Timer::after_millis(20).await;
        assert!(!record.is_held());
    })
    .await;

    assert_eq!(board.switched_on(), vec![(FIXED_LED, true)]);
}

#[futures_test::test]
async fn holders_take_turns_on_the_record() {
    let record = Record::new(SensorSample::EMPTY);
    let gate = HoldGate::new([FIXED_BUTTON, SAMPLER_BUTTON], WINDOW, &record);
    let board = Board::default();
    let mut sampler = Holder::new(
        ChannelId(1),
        LineId(SAMPLER_LED),
        &gate,
        board.clone(),
        sampling(40, 10),
    )
    .unwrap();
    let mut fixed = Holder::<_, _, Infallible, 2>::new(
        ChannelId(0),
        LineId(FIXED_LED),
        &gate,
        board.clone(),
        HoldMode::Fixed(Duration::from_millis(20)),
    )
    .unwrap();
    board.writes.borrow_mut().clear();

    // The fixed holder blocks on the lock until the sampler is done.
    join(sampler.hold_once(), fixed.hold_once()).await;

    assert_eq!(
        *board.writes.borrow(),
        vec![
            (SAMPLER_LED, true),
            (SAMPLER_LED, false),
            (FIXED_LED, true),
            (FIXED_LED, false),
        ]
    );
    assert!(!record.is_held());
}
