//! Scheduled tasks attached before or after a phase's step.
//!
//! A [`TaskQueue`] is drained once per successful pulse of its owning
//! [`RunService`](crate::run_service::RunService). Each [`Task`] carries its
//! own lifecycle bookkeeping in a [`TaskControl`], which the callback
//! receives so it can suspend or kill itself for a later cycle.

use std::collections::BTreeMap;
use std::time::Duration;

use antfarm_types::TaskState;
use tracing::debug;

use crate::clock::seconds_to_duration;

/// Errors raised while configuring a task.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    /// A time value was negative or not a number.
    #[error("invalid task argument: {reason}")]
    InvalidArgument {
        /// What was wrong.
        reason: String,
    },
}

fn to_duration(label: &str, seconds: f64) -> Result<Duration, TaskError> {
    seconds_to_duration(seconds).map_err(|err| TaskError::InvalidArgument {
        reason: format!("{label}: {err}"),
    })
}

/// Lifecycle state of one task, visible to its callback.
#[derive(Debug, Clone)]
pub struct TaskControl {
    name: String,
    state: TaskState,
    start: Option<Duration>,
    runtime: Duration,
    lifetime: Duration,
    timeout: Option<Duration>,
    suspend_duration: Duration,
    wake_at: Option<Duration>,
    duration: Option<Duration>,
    killed: bool,
    runs: u64,
    env: BTreeMap<String, String>,
}

impl TaskControl {
    fn new(name: String) -> Self {
        Self {
            name,
            state: TaskState::Suspended,
            start: None,
            runtime: Duration::ZERO,
            lifetime: Duration::ZERO,
            timeout: None,
            suspend_duration: Duration::ZERO,
            wake_at: None,
            duration: None,
            killed: false,
            runs: 0,
            env: BTreeMap::new(),
        }
    }

    /// Task name, used in logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current lifecycle state.
    pub const fn state(&self) -> TaskState {
        self.state
    }

    /// Sum of the deltas of every cycle in which the callback ran.
    pub const fn runtime(&self) -> Duration {
        self.runtime
    }

    /// Time since the first cycle that saw this task.
    pub const fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Number of times the callback has run.
    pub const fn runs(&self) -> u64 {
        self.runs
    }

    /// Whether the task has been killed and will be dropped next cycle.
    pub const fn is_killed(&self) -> bool {
        self.killed
    }

    /// Mark the task for removal on its next cycle.
    pub const fn kill(&mut self) {
        self.killed = true;
    }

    /// Sleep for `seconds`, starting from the next cycle that sees the task.
    pub fn suspend_for(&mut self, seconds: f64) -> Result<(), TaskError> {
        self.suspend_duration = to_duration("suspend", seconds)?;
        self.wake_at = None;
        self.state = TaskState::Suspended;
        Ok(())
    }

    /// Drop the task once its lifetime exceeds `seconds`.
    pub fn set_timeout(&mut self, seconds: f64) -> Result<(), TaskError> {
        self.timeout = Some(to_duration("timeout", seconds)?);
        Ok(())
    }

    /// Drop the task once its accumulated runtime exceeds `seconds`.
    pub fn set_duration(&mut self, seconds: f64) -> Result<(), TaskError> {
        self.duration = Some(to_duration("duration", seconds)?);
        Ok(())
    }

    /// Read a value from the task's environment bag.
    pub fn env(&self, key: &str) -> Option<&str> {
        self.env.get(key).map(String::as_str)
    }

    /// Store a value in the task's environment bag.
    pub fn set_env(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.env.insert(key.into(), value.into());
    }
}

/// Callback invoked on each cycle a task runs.
pub type TaskCallback<C> = Box<dyn FnMut(&mut TaskControl, &mut C) + Send>;

/// A named callback with lifecycle bookkeeping.
pub struct Task<C> {
    control: TaskControl,
    callback: TaskCallback<C>,
}

impl<C> Task<C> {
    /// A task with no timeout or duration limit.
    ///
    /// It starts suspended with a zero sleep, so it wakes and runs on the
    /// first cycle of the queue it joins.
    pub fn new(
        name: impl Into<String>,
        callback: impl FnMut(&mut TaskControl, &mut C) + Send + 'static,
    ) -> Self {
        Self {
            control: TaskControl::new(name.into()),
            callback: Box::new(callback),
        }
    }

    /// Start suspended for `seconds`.
    pub fn with_suspend(mut self, seconds: f64) -> Result<Self, TaskError> {
        self.control.suspend_for(seconds)?;
        Ok(self)
    }

    /// Drop once the task's lifetime exceeds `seconds`.
    pub fn with_timeout(mut self, seconds: f64) -> Result<Self, TaskError> {
        self.control.set_timeout(seconds)?;
        Ok(self)
    }

    /// Drop once the task's runtime exceeds `seconds`.
    pub fn with_duration(mut self, seconds: f64) -> Result<Self, TaskError> {
        self.control.set_duration(seconds)?;
        Ok(self)
    }

    /// Seed the environment bag.
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.control.set_env(key, value);
        self
    }

    /// The task's lifecycle state.
    pub const fn control(&self) -> &TaskControl {
        &self.control
    }
}

impl<C> std::fmt::Debug for Task<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("control", &self.control)
            .finish_non_exhaustive()
    }
}

/// What a single [`TaskQueue::execute`] cycle did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskCycle {
    /// Callbacks invoked.
    pub executed: usize,
    /// Tasks removed from the queue.
    pub dropped: usize,
}

/// An ordered collection of tasks run once per phase pulse.
pub struct TaskQueue<C> {
    tasks: Vec<Task<C>>,
}

impl<C> TaskQueue<C> {
    /// An empty queue.
    pub const fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Append a task. It first runs on the next cycle.
    pub fn push(&mut self, task: Task<C>) {
        self.tasks.push(task);
    }

    /// Number of queued tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Queued tasks in execution order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task<C>> {
        self.tasks.iter()
    }

    /// Run one cycle at time `now`, crediting `delta` to tasks that run.
    ///
    /// Per task, in order: record the start on first sight, refresh the
    /// lifetime, drop on timeout, keep sleeping or wake if suspended, drop
    /// if killed, drop if the runtime budget is spent, otherwise accumulate
    /// `delta` into the runtime and invoke the callback.
    pub fn execute(&mut self, now: Duration, delta: Duration, ctx: &mut C) -> TaskCycle {
        let mut cycle = TaskCycle::default();

        self.tasks.retain_mut(|task| {
            let control = &mut task.control;
            let start = *control.start.get_or_insert(now);
            control.lifetime = now.saturating_sub(start);

            if let Some(timeout) = control.timeout
                && control.lifetime > timeout
            {
                debug!(task = %control.name, lifetime = ?control.lifetime, "task timed out");
                control.state = TaskState::End;
                cycle.dropped = cycle.dropped.saturating_add(1);
                return false;
            }

            if control.state == TaskState::Suspended {
                let wake_at = *control
                    .wake_at
                    .get_or_insert(now.saturating_add(control.suspend_duration));
                if now < wake_at {
                    return true;
                }
                control.state = TaskState::Running;
                control.wake_at = None;
            }

            if control.killed {
                debug!(task = %control.name, "task killed");
                control.state = TaskState::End;
                cycle.dropped = cycle.dropped.saturating_add(1);
                return false;
            }

            if let Some(limit) = control.duration
                && control.runtime > limit
            {
                debug!(task = %control.name, runtime = ?control.runtime, "task finished its duration");
                control.state = TaskState::End;
                cycle.dropped = cycle.dropped.saturating_add(1);
                return false;
            }

            control.runtime = control.runtime.saturating_add(delta);
            control.runs = control.runs.saturating_add(1);
            (task.callback)(&mut task.control, ctx);
            cycle.executed = cycle.executed.saturating_add(1);
            true
        });

        cycle
    }
}

impl<C> Default for TaskQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> std::fmt::Debug for TaskQueue<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.tasks.iter()).finish()
    }
}
