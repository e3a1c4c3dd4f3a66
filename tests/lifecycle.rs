//! End-to-end scenarios through the public API: a blinker driving a
//! subsystem off its own timer, default-command fallback around a bounded
//! command, the event stream for a preemption, and the paced runner
//! delivering events to subscribers.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use commandeer::{
    Command, CommandSpec, Config, Context, EventKind, FnCommand, ManualClock, Runner, Scheduler,
    Subscribe, SubscriberSet, Subsystem, Timer,
};

/// The classic blinker: owns the LED, flips it on a period measured by its
/// own timer.
struct Blink {
    timer: Timer,
    period: Duration,
    led: Arc<AtomicBool>,
    flips: Arc<AtomicUsize>,
}

impl Command for Blink {
    fn name(&self) -> &str {
        "blink"
    }

    fn initialize(&mut self, _ctx: &mut Context<'_>) {
        self.timer.reset();
        self.timer.start();
        self.led.store(true, Ordering::Relaxed);
    }

    fn execute(&mut self, _ctx: &mut Context<'_>) {
        if self.timer.has_period_elapsed(self.period) {
            self.led.fetch_xor(true, Ordering::Relaxed);
            self.flips.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn is_finished(&self, _ctx: &Context<'_>) -> bool {
        false
    }

    fn interrupted(&mut self, _ctx: &mut Context<'_>) {
        self.led.store(false, Ordering::Relaxed);
    }
}

#[test]
fn blinker_flips_on_its_own_period() {
    let clock = Arc::new(ManualClock::new());
    let mut sched = Scheduler::with_clock(Config::default(), clock.clone());
    let led_sub = sched.register(Subsystem::new("led"));

    let led = Arc::new(AtomicBool::new(false));
    let flips = Arc::new(AtomicUsize::new(0));
    let blink = sched.add(
        CommandSpec::new(Blink {
            timer: Timer::with_clock(clock.clone()),
            period: Duration::from_millis(100),
            led: Arc::clone(&led),
            flips: Arc::clone(&flips),
        })
        .requires(led_sub),
    );

    sched.start(blink);
    sched.tick(); // admitted
    sched.tick(); // initialized: led on, timer at zero
    assert!(led.load(Ordering::Relaxed));
    assert_eq!(flips.load(Ordering::Relaxed), 0);

    for _ in 0..5 {
        clock.advance(Duration::from_millis(110));
        sched.tick();
    }
    assert_eq!(flips.load(Ordering::Relaxed), 5);

    // Preempting the blinker runs its interrupted teardown, parking the LED.
    let takeover = sched.add(
        CommandSpec::new(FnCommand::new("takeover").finished_when(|_ctx| false)).requires(led_sub),
    );
    sched.start(takeover);
    sched.tick();
    assert!(!led.load(Ordering::Relaxed));
    assert_eq!(sched.current_command(led_sub), Some(takeover));
}

#[test]
fn default_command_falls_back_after_bounded_command() {
    let clock = Arc::new(ManualClock::new());
    let mut sched = Scheduler::with_clock(Config::default(), clock.clone());
    let arm = sched.register(Subsystem::new("arm"));

    let hold = sched.add(
        CommandSpec::new(FnCommand::new("hold").finished_when(|_ctx| false)).requires(arm),
    );
    sched.set_default_command(arm, hold);

    let raise = sched.add(
        CommandSpec::new(
            FnCommand::new("raise").finished_when(|ctx| ctx.is_timed_out()),
        )
        .requires(arm)
        .with_timeout(Duration::from_millis(500)),
    );

    sched.tick();
    assert_eq!(sched.current_command(arm), Some(hold));

    sched.start(raise);
    sched.tick();
    assert_eq!(sched.current_command(arm), Some(raise));
    sched.tick(); // raise initializes; its timeout clock starts here

    // The bounded command times itself out; the default reclaims the arm in
    // the same tick's default phase.
    clock.advance(Duration::from_millis(500));
    sched.tick();
    assert_eq!(sched.current_command(arm), Some(hold));
    assert!(!sched.is_running(raise));
}

#[test]
fn preemption_publishes_the_expected_event_sequence() {
    let mut sched = Scheduler::new(Config::default());
    let mut rx = sched.bus().subscribe();

    let r = sched.register(Subsystem::new("r"));
    let first = sched.add(
        CommandSpec::new(FnCommand::new("first").finished_when(|_ctx| false)).requires(r),
    );
    let second = sched.add(
        CommandSpec::new(FnCommand::new("second").finished_when(|_ctx| false)).requires(r),
    );

    sched.start(first);
    sched.tick();
    sched.tick();
    sched.start(second);
    sched.tick();

    let mut kinds = Vec::new();
    let mut seqs = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        kinds.push(ev.kind);
        seqs.push(ev.seq);
    }
    assert_eq!(
        kinds,
        vec![
            EventKind::CommandQueued,      // first queued
            EventKind::CommandAdmitted,    // first admitted
            EventKind::CommandQueued,      // second queued
            EventKind::CommandPreempted,   // first evicted
            EventKind::CommandInterrupted, // first torn down
            EventKind::CommandAdmitted,    // second admitted
        ]
    );
    assert!(seqs.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn conflict_drop_is_visible_on_the_bus_but_not_to_the_caller() {
    let mut sched = Scheduler::new(Config::default());
    let r = sched.register(Subsystem::new("claw"));
    let holder = sched.add(
        CommandSpec::new(FnCommand::new("holder").finished_when(|_ctx| false))
            .requires(r)
            .with_interruptible(false),
    );
    sched.start(holder);
    sched.tick();

    let mut rx = sched.bus().subscribe();
    let loser = sched.add(
        CommandSpec::new(FnCommand::new("loser").finished_when(|_ctx| false)).requires(r),
    );
    sched.start(loser);
    sched.tick();

    let mut rejected = None;
    while let Ok(ev) = rx.try_recv() {
        if ev.kind == EventKind::AdmissionRejected {
            rejected = Some(ev);
        }
    }
    let rejected = rejected.expect("drop should be observable");
    assert_eq!(rejected.reason.as_deref(), Some("conflict"));
    assert_eq!(rejected.subsystem.as_deref(), Some("claw"));
    assert_eq!(rejected.command_id, Some(loser));
    assert!(!sched.is_running(loser));
}

/// Collects event kinds from the fan-out path.
struct Collector {
    kinds: Mutex<Vec<EventKind>>,
}

#[async_trait::async_trait]
impl Subscribe for Collector {
    async fn on_event(&self, event: &commandeer::Event) {
        self.kinds.lock().unwrap().push(event.kind);
    }

    fn name(&self) -> &'static str {
        "collector"
    }
}

#[tokio::test]
async fn runner_paces_ticks_and_feeds_subscribers() {
    let cfg = Config {
        tick_period: Duration::from_millis(5),
        ..Config::default()
    };
    let mut sched = Scheduler::new(cfg);
    let bus = sched.bus();

    let collector = Arc::new(Collector {
        kinds: Mutex::new(Vec::new()),
    });
    let subs: Vec<Arc<dyn Subscribe>> = vec![collector.clone() as _];
    let set = Arc::new(SubscriberSet::new(subs));
    assert_eq!(set.len(), 1);

    let listener_token = CancellationToken::new();
    let listener = set.clone().spawn_listener(&bus, listener_token.clone());

    // One-shot command: finishes on its first run.
    let once = sched.add(CommandSpec::new(FnCommand::new("once").on_execute(|_ctx| {})));
    sched.start(once);

    let runner = Runner::new(sched).unwrap();
    let token = CancellationToken::new();
    let stopper = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(60)).await;
        stopper.cancel();
    });

    let sched = runner.run(token).await;
    assert!(sched.ticks() >= 2);
    assert!(!sched.is_running(once));

    // Let the fan-out drain, then stop the listener.
    tokio::time::sleep(Duration::from_millis(20)).await;
    listener_token.cancel();
    let _ = listener.await;

    let kinds = collector.kinds.lock().unwrap().clone();
    assert!(kinds.contains(&EventKind::CommandQueued));
    assert!(kinds.contains(&EventKind::CommandAdmitted));
    assert!(kinds.contains(&EventKind::CommandFinished));
}
