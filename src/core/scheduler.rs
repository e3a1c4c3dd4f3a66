//! # Scheduler: command arena, arbitration, and the per-tick protocol.
//!
//! The [`Scheduler`] owns every registered command and subsystem and runs
//! the whole system one tick at a time. There is no hidden global instance:
//! construct one, thread it through your polling loop (or hand it to a
//! [`Runner`](crate::Runner)), and keep exactly one logical thread of
//! control calling [`Scheduler::tick`].
//!
//! ## Tick protocol
//! ```text
//! tick()
//!   ├─ Run phase
//!   │    for each running command (insertion order):
//!   │      run hooks (initialize once, then execute)
//!   │      finished or canceled ─► remove: release subsystems,
//!   │                              fire end/interrupted exactly once
//!   ├─ Admission phase
//!   │    drain queued starts (FIFO, deduplicated at enqueue):
//!   │      any requirement held non-interruptibly ─► drop attempt whole
//!   │      otherwise ─► cancel + remove interruptible owners (preemption),
//!   │                   take ownership of every requirement, join running set
//!   │    queue is cleared unconditionally; dropped attempts are not retried
//!   └─ Default phase
//!        each idle subsystem ─► try to admit its default command
//!        each subsystem ─► confirm (reset change-observation flag)
//! ```
//!
//! ## Rules
//! - A command is in the running set **iff** every subsystem it requires
//!   points back at it.
//! - Grants are all-or-nothing: one non-interruptible conflict rejects the
//!   whole attempt and preempts nothing.
//! - Invalid operations (mutating a locked command, starting or canceling an
//!   owned command, unknown ids) are silent no-ops. This is policy, not an
//!   oversight: the control loop prefers predictable flow over signaling,
//!   and observers can watch the event bus instead.
//! - A canceled command still reports `running` until the next run phase
//!   removes it; callers must tolerate the lag.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use crate::commands::{Command, CommandSpec};
use crate::events::{AdmissionSource, Bus, Event, EventKind};
use crate::time::{Clock, SystemClock};

use super::config::Config;
use super::context::Context;
use super::ids::{CommandId, GroupId, SubsystemId};
use super::subsystem::Subsystem;

/// Runtime record for one registered command.
struct CommandEntry {
    name: Arc<str>,
    hooks: Box<dyn Command>,
    requirements: BTreeSet<SubsystemId>,
    timeout: Option<Duration>,
    interruptible: bool,
    owner: Option<GroupId>,
    locked: bool,
    initialized: bool,
    running: bool,
    canceled: bool,
    /// Clock reading at first run after the latest (re)start.
    started_at: Option<u32>,
}

/// Cooperative command scheduler.
///
/// Owns registered commands ([`Scheduler::add`]) and subsystems
/// ([`Scheduler::register`]); everything else refers to them by id.
///
/// ## Example
/// ```rust
/// use commandeer::{Config, Scheduler, Subsystem, CommandSpec, FnCommand};
///
/// let mut sched = Scheduler::new(Config::default());
/// let led = sched.register(Subsystem::new("led"));
///
/// let blink = sched.add(
///     CommandSpec::new(
///         FnCommand::new("blink")
///             .on_execute(|_ctx| { /* drive the hardware */ })
///             .finished_when(|_ctx| false),
///     )
///     .requires(led),
/// );
///
/// sched.start(blink);
/// sched.tick();
/// assert!(sched.is_running(blink));
/// assert_eq!(sched.current_command(led), Some(blink));
/// ```
pub struct Scheduler {
    config: Config,
    clock: Arc<dyn Clock>,
    bus: Bus,

    commands: BTreeMap<CommandId, CommandEntry>,
    subsystems: Vec<Subsystem>,

    /// Currently active commands, in admission order.
    running: Vec<CommandId>,
    /// Start requests awaiting the next admission phase (FIFO, deduplicated).
    additions: Vec<CommandId>,

    /// Requests raised by hooks through [`Context`], applied after the hook
    /// returns.
    deferred_starts: Vec<CommandId>,
    deferred_cancels: Vec<CommandId>,

    /// Guard against admissions processed from inside a grant.
    adding: bool,
    enabled: bool,
    running_changed: bool,
    ticks: u64,
}

impl Scheduler {
    /// Creates a scheduler on the real monotonic clock.
    pub fn new(config: Config) -> Self {
        Self::with_clock(config, Arc::new(SystemClock::new()))
    }

    /// Creates a scheduler on the given clock (tests, simulation).
    pub fn with_clock(config: Config, clock: Arc<dyn Clock>) -> Self {
        let bus = Bus::new(config.bus_capacity_clamped());
        Self {
            config,
            clock,
            bus,
            commands: BTreeMap::new(),
            subsystems: Vec::new(),
            running: Vec::new(),
            additions: Vec::new(),
            deferred_starts: Vec::new(),
            deferred_cancels: Vec::new(),
            adding: false,
            enabled: true,
            running_changed: false,
            ticks: 0,
        }
    }

    // ---------------------------
    // Registration
    // ---------------------------

    /// Registers a subsystem for arbitration and default-command fallback.
    pub fn register(&mut self, subsystem: Subsystem) -> SubsystemId {
        let id = SubsystemId(self.subsystems.len());
        self.subsystems.push(subsystem);
        id
    }

    /// Registers a command, assigning it the next process-wide identity.
    ///
    /// The command starts idle; call [`Scheduler::start`] to queue it for
    /// admission. Identities are never reused, even after [`Scheduler::reset_all`].
    pub fn add(&mut self, spec: CommandSpec) -> CommandId {
        let id = CommandId::next();
        let (hooks, name, timeout, interruptible, requirements) = spec.into_parts();
        let name: Arc<str> = match name {
            Some(n) => Arc::from(n.as_ref()),
            None => Arc::from(hooks.name()),
        };
        self.commands.insert(
            id,
            CommandEntry {
                name,
                hooks,
                requirements: requirements.into_iter().collect(),
                timeout,
                interruptible,
                owner: None,
                locked: false,
                initialized: false,
                running: false,
                canceled: false,
                started_at: None,
            },
        );
        id
    }

    // ---------------------------
    // Command control
    // ---------------------------

    /// Queues a command for admission on the next tick.
    ///
    /// Locks the command against further requirement/timeout changes. A
    /// command attached to an owner is not started (the owner drives it),
    /// and re-queueing an already-queued identity is a no-op.
    pub fn start(&mut self, id: CommandId) {
        let Some(entry) = self.commands.get_mut(&id) else {
            return;
        };
        entry.locked = true;
        if entry.owner.is_some() {
            return;
        }
        if self.additions.contains(&id) {
            return;
        }
        let name = Arc::clone(&entry.name);
        self.additions.push(id);
        self.bus.publish(
            Event::new(EventKind::CommandQueued)
                .with_command(name)
                .with_command_id(id),
        );
    }

    /// Marks a running command canceled.
    ///
    /// Teardown happens on the next removal pass, not synchronously: the
    /// command keeps reporting `running` until then. No-op for commands that
    /// have an owner or are not running.
    pub fn cancel(&mut self, id: CommandId) {
        let Some(entry) = self.commands.get_mut(&id) else {
            return;
        };
        if entry.owner.is_some() {
            return;
        }
        if entry.running {
            entry.canceled = true;
        }
    }

    /// Owner-side cancel: bypasses the owner check for the aggregate that
    /// actually owns the command. No-op unless `owner` matches.
    pub fn cancel_from_owner(&mut self, id: CommandId, owner: GroupId) {
        let Some(entry) = self.commands.get_mut(&id) else {
            return;
        };
        if entry.owner != Some(owner) {
            return;
        }
        if entry.running {
            entry.canceled = true;
        }
    }

    /// Attaches a command to an aggregate owner.
    ///
    /// Locks the command; at most one owner, ever. Owned commands refuse
    /// direct [`Scheduler::start`] / [`Scheduler::cancel`].
    pub fn set_parent(&mut self, id: CommandId, owner: GroupId) {
        let Some(entry) = self.commands.get_mut(&id) else {
            return;
        };
        if entry.owner.is_some() {
            return;
        }
        entry.locked = true;
        entry.owner = Some(owner);
    }

    /// Adds a required subsystem to an unlocked command (duplicates
    /// collapse). Ignored once the command is locked.
    pub fn require(&mut self, id: CommandId, subsystem: SubsystemId) {
        let Some(entry) = self.commands.get_mut(&id) else {
            return;
        };
        if entry.locked {
            return;
        }
        entry.requirements.insert(subsystem);
    }

    /// Sets or clears the timeout of an unlocked command. Ignored once the
    /// command is locked.
    pub fn set_timeout(&mut self, id: CommandId, timeout: Option<Duration>) {
        let Some(entry) = self.commands.get_mut(&id) else {
            return;
        };
        if entry.locked {
            return;
        }
        entry.timeout = timeout;
    }

    /// Sets whether the command may be preempted. Not lock-gated.
    pub fn set_interruptible(&mut self, id: CommandId, interruptible: bool) {
        if let Some(entry) = self.commands.get_mut(&id) {
            entry.interruptible = interruptible;
        }
    }

    /// Configures a subsystem's default command.
    ///
    /// Ignored unless the command already declares the subsystem among its
    /// requirements; a default that does not drive its own subsystem would
    /// break the fallback invariant.
    pub fn set_default_command(&mut self, subsystem: SubsystemId, command: CommandId) {
        let declares = self
            .commands
            .get(&command)
            .is_some_and(|e| e.requirements.contains(&subsystem));
        if !declares {
            return;
        }
        if let Some(s) = self.subsystems.get_mut(subsystem.0) {
            s.set_default(Some(command));
        }
    }

    /// Removes a subsystem's default command.
    pub fn clear_default_command(&mut self, subsystem: SubsystemId) {
        if let Some(s) = self.subsystems.get_mut(subsystem.0) {
            s.set_default(None);
        }
    }

    // ---------------------------
    // Tick protocol
    // ---------------------------

    /// Runs one full scheduler iteration: run phase, admission phase,
    /// default-command phase.
    ///
    /// Must be driven by exactly one logical thread of control; the phases
    /// run to completion in order and never suspend.
    pub fn tick(&mut self) {
        self.ticks = self.ticks.wrapping_add(1);
        self.running_changed = false;

        // Run phase. Iterate over a snapshot so removals cannot disturb the
        // rest of the pass.
        let active: Vec<CommandId> = self.running.clone();
        for id in active {
            if !self.running.contains(&id) {
                continue;
            }
            let keep = self.run_command(id);
            self.drain_deferred();
            if !keep {
                self.remove(id);
                self.running_changed = true;
            }
        }

        // Admission phase. The queue is cleared unconditionally: attempts
        // dropped on conflict are not retried on later ticks.
        let pending = std::mem::take(&mut self.additions);
        for id in pending {
            self.process_addition(id, AdmissionSource::Request);
        }

        // Default-command phase.
        for ix in 0..self.subsystems.len() {
            if self.subsystems[ix].current_command().is_none() {
                if let Some(default) = self.subsystems[ix].default_command() {
                    self.process_addition(default, AdmissionSource::Default);
                    if self.running.contains(&default) {
                        self.subsystems[ix].mark_default_initialized();
                    }
                }
            }
            self.subsystems[ix].confirm();
        }
    }

    /// Runs one command's hooks for this tick; returns whether it stays in
    /// the running set.
    fn run_command(&mut self, id: CommandId) -> bool {
        let now = self.clock.now_millis();
        let Some(entry) = self.commands.get_mut(&id) else {
            return false;
        };
        if entry.canceled {
            return false;
        }

        let first_run = !entry.initialized;
        if first_run {
            entry.initialized = true;
            entry.started_at = Some(now);
        }
        let elapsed = elapsed_since(now, entry.started_at);
        let timed_out = entry.timeout.is_some_and(|t| elapsed >= t);

        let mut ctx = Context::new(
            elapsed,
            timed_out,
            false,
            &mut self.deferred_starts,
            &mut self.deferred_cancels,
            &self.bus,
        );
        if first_run {
            entry.hooks.initialize(&mut ctx);
        }
        entry.hooks.execute(&mut ctx);
        !entry.hooks.is_finished(&ctx)
    }

    /// Attempts to admit one command, preempting interruptible owners.
    fn process_addition(&mut self, id: CommandId, source: AdmissionSource) {
        if self.adding {
            return;
        }
        if self.running.contains(&id) {
            return;
        }
        let Some(entry) = self.commands.get(&id) else {
            return;
        };
        let name = Arc::clone(&entry.name);
        let requirements: Vec<SubsystemId> = entry.requirements.iter().copied().collect();

        // All-or-nothing: one non-interruptible conflict rejects the whole
        // attempt, and nothing else is preempted either.
        for &sub in &requirements {
            let Some(owner) = self.owner_of(sub) else {
                continue;
            };
            let interruptible = self
                .commands
                .get(&owner)
                .is_none_or(|o| o.interruptible);
            if !interruptible {
                let blocking = self.subsystem_name(sub);
                let mut ev = Event::new(EventKind::AdmissionRejected)
                    .with_command(name)
                    .with_command_id(id)
                    .with_reason("conflict");
                if let Some(s) = blocking {
                    ev = ev.with_subsystem(s);
                }
                self.bus.publish(ev);
                return;
            }
        }

        // Grant: evict interruptible owners, then take every requirement.
        // Start requests raised by their teardown hooks are dropped while
        // `adding` is set.
        self.adding = true;
        for &sub in &requirements {
            if let Some(owner) = self.owner_of(sub) {
                let mut ev = Event::new(EventKind::CommandPreempted).with_command_id(owner);
                if let Some(o) = self.commands.get(&owner) {
                    ev = ev.with_command(Arc::clone(&o.name));
                }
                if let Some(s) = self.subsystem_name(sub) {
                    ev = ev.with_subsystem(s);
                }
                self.bus.publish(ev);

                self.cancel(owner);
                self.remove(owner);
            }
            if let Some(s) = self.subsystems.get_mut(sub.0) {
                s.set_current(Some(id));
            }
        }
        self.adding = false;

        self.running.push(id);
        if let Some(entry) = self.commands.get_mut(&id) {
            entry.running = true;
            entry.started_at = None;
        }
        self.running_changed = true;
        self.bus.publish(
            Event::new(EventKind::CommandAdmitted)
                .with_command(name)
                .with_command_id(id)
                .with_source(source),
        );
    }

    /// Removes a command from the running set.
    ///
    /// Releases every subsystem it required, then fires exactly one
    /// lifecycle-completion hook (`interrupted` if canceled, else `end`) if
    /// the command ever initialized, and clears its lifecycle flags. The
    /// command stays registered and may be started again. No-op if the
    /// command is not running.
    pub fn remove(&mut self, id: CommandId) {
        let Some(pos) = self.running.iter().position(|&c| c == id) else {
            return;
        };
        self.running.remove(pos);

        let requirements: Vec<SubsystemId> = match self.commands.get(&id) {
            Some(entry) => entry.requirements.iter().copied().collect(),
            None => Vec::new(),
        };
        for sub in requirements {
            if let Some(s) = self.subsystems.get_mut(sub.0) {
                s.set_current(None);
            }
        }
        self.notify_removed(id);
    }

    /// Fires the completion hook and resets lifecycle flags.
    fn notify_removed(&mut self, id: CommandId) {
        let now = self.clock.now_millis();
        let in_admission = self.adding;

        let Some(entry) = self.commands.get_mut(&id) else {
            return;
        };
        let name = Arc::clone(&entry.name);
        let was_initialized = entry.initialized;
        let was_canceled = entry.canceled;
        let elapsed = elapsed_since(now, entry.started_at);

        if was_initialized {
            let timed_out = entry.timeout.is_some_and(|t| elapsed >= t);
            let mut ctx = Context::new(
                elapsed,
                timed_out,
                in_admission,
                &mut self.deferred_starts,
                &mut self.deferred_cancels,
                &self.bus,
            );
            if was_canceled {
                entry.hooks.interrupted(&mut ctx);
            } else {
                entry.hooks.end(&mut ctx);
            }
        }
        entry.initialized = false;
        entry.canceled = false;
        entry.running = false;

        if was_initialized {
            let kind = if was_canceled {
                EventKind::CommandInterrupted
            } else {
                EventKind::CommandFinished
            };
            self.bus.publish(
                Event::new(kind)
                    .with_command(name)
                    .with_command_id(id)
                    .with_elapsed(elapsed),
            );
        }
        self.drain_deferred();
    }

    /// Removes running commands until none remain.
    pub fn remove_all(&mut self) {
        while let Some(&id) = self.running.first() {
            self.remove(id);
        }
    }

    /// Completely resets the scheduler: removes all running commands, then
    /// forgets every registered command and subsystem and clears the queues.
    ///
    /// Results are undefined if invoked from inside a hook while a tick is
    /// in progress (hooks cannot reach the scheduler, so this cannot happen
    /// without unsafe contortions).
    pub fn reset_all(&mut self) {
        self.remove_all();
        self.subsystems.clear();
        self.additions.clear();
        self.deferred_starts.clear();
        self.deferred_cancels.clear();
        self.commands.clear();
    }

    /// Applies start/cancel requests raised by hooks through [`Context`].
    fn drain_deferred(&mut self) {
        let starts = std::mem::take(&mut self.deferred_starts);
        for id in starts {
            self.start(id);
        }
        let cancels = std::mem::take(&mut self.deferred_cancels);
        for id in cancels {
            self.cancel(id);
        }
    }

    // ---------------------------
    // Queries
    // ---------------------------

    /// Whether the command is in the running set.
    ///
    /// May stay true briefly after [`Scheduler::cancel`], until the next run
    /// phase processes the removal.
    pub fn is_running(&self, id: CommandId) -> bool {
        self.commands.get(&id).is_some_and(|e| e.running)
    }

    /// Whether the command has been marked canceled.
    pub fn is_canceled(&self, id: CommandId) -> bool {
        self.commands.get(&id).is_some_and(|e| e.canceled)
    }

    /// Whether the command may be preempted by a conflicting admission.
    pub fn is_interruptible(&self, id: CommandId) -> bool {
        self.commands.get(&id).is_none_or(|e| e.interruptible)
    }

    /// Time since the command's first run after its latest start; zero when
    /// it has not initialized.
    pub fn time_since_initialized(&self, id: CommandId) -> Duration {
        let now = self.clock.now_millis();
        self.commands
            .get(&id)
            .map_or(Duration::ZERO, |e| elapsed_since(now, e.started_at))
    }

    /// Whether the command's elapsed time has reached its timeout; false
    /// when no timeout is configured.
    pub fn is_timed_out(&self, id: CommandId) -> bool {
        let now = self.clock.now_millis();
        self.commands.get(&id).is_some_and(|e| {
            e.timeout
                .is_some_and(|t| elapsed_since(now, e.started_at) >= t)
        })
    }

    /// Whether the command declares the subsystem among its requirements.
    pub fn does_require(&self, id: CommandId, subsystem: SubsystemId) -> bool {
        self.commands
            .get(&id)
            .is_some_and(|e| e.requirements.contains(&subsystem))
    }

    /// Display name of the command.
    pub fn name_of(&self, id: CommandId) -> Option<&str> {
        self.commands.get(&id).map(|e| &*e.name)
    }

    /// The aggregate owner, if the command is attached to one.
    pub fn owner(&self, id: CommandId) -> Option<GroupId> {
        self.commands.get(&id).and_then(|e| e.owner)
    }

    /// Currently running commands, in admission order.
    pub fn running_commands(&self) -> &[CommandId] {
        &self.running
    }

    /// Read access to a registered subsystem.
    pub fn subsystem(&self, id: SubsystemId) -> Option<&Subsystem> {
        self.subsystems.get(id.0)
    }

    /// The command currently owning the subsystem.
    pub fn current_command(&self, subsystem: SubsystemId) -> Option<CommandId> {
        self.owner_of(subsystem)
    }

    /// The subsystem's configured default command.
    pub fn default_command(&self, subsystem: SubsystemId) -> Option<CommandId> {
        self.subsystems
            .get(subsystem.0)
            .and_then(|s| s.default_command())
    }

    /// Whether the running set changed during the last tick.
    pub fn running_changed(&self) -> bool {
        self.running_changed
    }

    /// Number of ticks executed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Enables or disables the scheduler.
    ///
    /// Reserved for input-polling extensions; the run/admission/default
    /// phases are not gated by it and always execute.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Current enabled state.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// A handle to the event bus (cheap clone).
    pub fn bus(&self) -> Bus {
        self.bus.clone()
    }

    /// The configuration this scheduler was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn owner_of(&self, subsystem: SubsystemId) -> Option<CommandId> {
        self.subsystems
            .get(subsystem.0)
            .and_then(|s| s.current_command())
    }

    fn subsystem_name(&self, subsystem: SubsystemId) -> Option<Arc<str>> {
        self.subsystems.get(subsystem.0).map(|s| s.name_arc())
    }
}

fn elapsed_since(now: u32, started_at: Option<u32>) -> Duration {
    match started_at {
        Some(start) => Duration::from_millis(u64::from(now.wrapping_sub(start))),
        None => Duration::ZERO,
    }
}
