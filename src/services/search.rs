//! Debounced binding between a raw search input and a list's search field.
//!
//! The binder is driven by the caller's clock: every call takes `now`, so the
//! same code runs under a real event loop and in deterministic tests.

use std::time::{Duration, Instant};

use crate::domain::Resource;
use crate::dto::query::FilterPatch;
use crate::repository::CollectionReader;
use crate::services::ServiceResult;
use crate::services::list::ListController;

pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(500);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Pending {
        deadline: Instant,
    },
    /// Pending with an upper bound on the total delay of a burst.
    MaxPending {
        deadline: Instant,
        max_deadline: Instant,
    },
}

#[derive(Debug)]
pub struct SearchBinder {
    quiet_period: Duration,
    max_wait: Option<Duration>,
    value: String,
    last_propagated: String,
    state: TimerState,
    torn_down: bool,
}

impl Default for SearchBinder {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_PERIOD)
    }
}

impl SearchBinder {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            max_wait: None,
            value: String::new(),
            last_propagated: String::new(),
            state: TimerState::Idle,
            torn_down: false,
        }
    }

    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }

    /// Starts from a value that is already applied to the list.
    pub fn with_initial(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self.last_propagated.clone_from(&self.value);
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Records a keystroke and restarts the quiet period.
    pub fn input(&mut self, value: impl Into<String>, now: Instant) {
        if self.torn_down {
            return;
        }
        self.value = value.into();
        let deadline = now + self.quiet_period;

        self.state = match (self.state, self.max_wait) {
            (TimerState::MaxPending { max_deadline, .. }, _) => TimerState::MaxPending {
                deadline,
                max_deadline,
            },
            (_, Some(max_wait)) => TimerState::MaxPending {
                deadline,
                max_deadline: now + max_wait,
            },
            (_, None) => TimerState::Pending { deadline },
        };
    }

    /// Instant at which the pending value settles, if any.
    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            TimerState::Idle => None,
            TimerState::Pending { deadline } => Some(deadline),
            TimerState::MaxPending {
                deadline,
                max_deadline,
            } => Some(deadline.min(max_deadline)),
        }
    }

    /// Returns the settled value once its deadline has passed and it differs
    /// from the last propagated one.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let deadline = self.deadline()?;
        if now < deadline {
            return None;
        }

        self.state = TimerState::Idle;
        if self.value == self.last_propagated {
            return None;
        }
        self.last_propagated.clone_from(&self.value);
        Some(self.value.clone())
    }

    /// Cancels the pending timer for good.
    pub fn teardown(&mut self) {
        self.state = TimerState::Idle;
        self.torn_down = true;
    }

    /// Pushes a settled value into the list's search parameter. Returns
    /// whether a propagation happened.
    pub fn flush_into<T, R>(
        &mut self,
        now: Instant,
        controller: &mut ListController<T>,
        repo: &R,
    ) -> ServiceResult<bool>
    where
        T: Resource,
        R: CollectionReader<T> + ?Sized,
    {
        match self.poll(now) {
            Some(value) => {
                controller.update_filters(repo, FilterPatch::new().search(value))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
