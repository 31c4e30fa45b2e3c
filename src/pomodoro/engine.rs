use log::{debug, info};
use serde::Serialize;

use super::command::Command;
use super::pomodoro::{
    BREAK_COMPLETE_MESSAGE, FOCUS_COMPLETE_MESSAGE, GRACE_PERIOD, Mode, NOTIFICATION_TITLE,
    SETTINGS_SAVED_MESSAGE,
};
use super::progress::DailyProgress;
use super::settings::{Durations, Theme};
use crate::clock::{Clock, ClockEvent, SubscriptionId};
use crate::display::{DisplaySink, clock_labels};
use crate::error::ValidationError;
use crate::notify::Notifier;
use crate::storage::Storage;

/// Full engine state, for status output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub mode: Mode,
    pub durations: Durations,
    pub remaining_seconds: u32,
    pub initial_seconds: u32,
    pub running: bool,
    pub awaiting_reset: bool,
    pub completed_pomodoros: u32,
    pub total_focus_time: u32,
    pub percent_of_goal: f64,
    pub theme: String,
}

/// The countdown state machine.
///
/// Idle (full interval) -> Running -> Idle at 00:00 -> after `GRACE_PERIOD`
/// back to Idle with a full interval. `switch_mode` and `reset` bring any
/// state back to a paused full interval.
///
/// Running is exactly "owns a tick subscription". Clock events carrying an
/// id the engine no longer owns are ignored, so a cancelled tick or grace
/// timer cannot change state.
pub struct TimerEngine<S, D, N, C> {
    mode: Mode,
    durations: Durations,
    theme: Theme,
    remaining_seconds: u32,
    initial_seconds: u32,
    progress: DailyProgress,
    ticker: Option<SubscriptionId>,
    grace: Option<SubscriptionId>,
    storage: S,
    display: D,
    notifier: N,
    clock: C,
}

impl<S, D, N, C> TimerEngine<S, D, N, C>
where
    S: Storage,
    D: DisplaySink,
    N: Notifier,
    C: Clock,
{
    /// Loads settings, theme and today's progress, then draws everything.
    pub fn new(storage: S, display: D, notifier: N, clock: C) -> Self {
        let durations = Durations::load(&storage);
        let theme = Theme::load(&storage);
        let progress = DailyProgress::load(&storage, clock.today());
        let mode = Mode::Focus;
        let initial_seconds = durations.seconds(mode);

        info!(
            "Loaded settings {}/{}/{} min, {} completed today",
            durations.pomodoro, durations.short_break, durations.long_break, progress.completed
        );

        let mut engine = Self {
            mode,
            durations,
            theme,
            remaining_seconds: initial_seconds,
            initial_seconds,
            progress,
            ticker: None,
            grace: None,
            storage,
            display,
            notifier,
            clock,
        };
        engine.refresh();
        engine
    }

    pub fn is_running(&self) -> bool {
        self.ticker.is_some()
    }

    /// True during the grace window after a completion.
    pub fn awaiting_reset(&self) -> bool {
        self.grace.is_some()
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            mode: self.mode,
            durations: self.durations,
            remaining_seconds: self.remaining_seconds,
            initial_seconds: self.initial_seconds,
            running: self.is_running(),
            awaiting_reset: self.awaiting_reset(),
            completed_pomodoros: self.progress.completed,
            total_focus_time: self.progress.focus_minutes,
            percent_of_goal: self.progress.percent_of_goal(),
            theme: self.theme.to_string(),
        }
    }

    /// Runs one user command. `Ok(false)` means a mode switch was declined.
    pub fn execute(&mut self, command: Command) -> Result<bool, ValidationError> {
        debug!("Command: {:?}", command);
        match command {
            Command::Start => self.start(),
            Command::Pause => self.pause(),
            Command::Reset => self.reset(),
            Command::SwitchMode { mode, confirmed } => {
                return Ok(self.switch_mode(mode, || confirmed));
            }
            Command::ApplySettings(durations) => self.apply_settings(durations)?,
            Command::SetTheme { theme } => self.set_theme(Theme::new(&theme)?),
            Command::Refresh => self.refresh(),
        }
        Ok(true)
    }

    pub fn handle_clock(&mut self, event: ClockEvent) {
        match event {
            ClockEvent::Tick(id) => self.on_tick(id),
            ClockEvent::Elapsed(id) => self.on_grace_elapsed(id),
        }
    }

    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        if self.cancel_grace() || self.remaining_seconds == 0 {
            self.load_interval();
        }
        self.ticker = Some(self.clock.subscribe_ticks());
        debug!("Started {} with {}s left", self.mode, self.remaining_seconds);
        self.render_timer();
    }

    pub fn pause(&mut self) {
        if let Some(id) = self.ticker.take() {
            self.clock.cancel(id);
            debug!("Paused {} with {}s left", self.mode, self.remaining_seconds);
        }
    }

    pub fn reset(&mut self) {
        self.cancel_grace();
        self.pause();
        self.load_interval();
        self.render_timer();
    }

    /// One second of countdown. Ignored unless `id` is the live tick
    /// subscription.
    pub fn on_tick(&mut self, id: SubscriptionId) {
        if self.ticker != Some(id) {
            debug!("Dropping stale tick {:?}", id);
            return;
        }
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        self.render_timer();
        if self.remaining_seconds == 0 {
            self.complete_interval();
        }
    }

    /// End of the grace window: back to a full interval.
    pub fn on_grace_elapsed(&mut self, id: SubscriptionId) {
        if self.grace != Some(id) {
            debug!("Dropping stale grace timer {:?}", id);
            return;
        }
        self.reset();
    }

    fn complete_interval(&mut self) {
        self.pause();

        if self.mode == Mode::Focus {
            let today = self.clock.today();
            self.progress.record_focus(today, self.durations.pomodoro);
            self.progress.save(&mut self.storage);
            self.render_progress();
            info!(
                "Focus complete: {} today, {} minutes",
                self.progress.completed, self.progress.focus_minutes
            );
            self.notifier.notify(NOTIFICATION_TITLE, FOCUS_COMPLETE_MESSAGE);
        } else {
            info!("{} complete", self.mode);
            self.notifier.notify(NOTIFICATION_TITLE, BREAK_COMPLETE_MESSAGE);
        }

        self.remaining_seconds = 0;
        self.render_timer();

        self.cancel_grace();
        self.grace = Some(self.clock.schedule_after(GRACE_PERIOD));
    }

    /// Switches to `mode` at its full duration. While running, `confirm` is
    /// asked first and a `false` leaves everything untouched. Returns whether
    /// the switch happened.
    pub fn switch_mode(&mut self, mode: Mode, confirm: impl FnOnce() -> bool) -> bool {
        if self.is_running() && !confirm() {
            debug!("Mode switch to {} declined", mode);
            return false;
        }

        self.cancel_grace();
        self.pause();
        self.mode = mode;
        self.load_interval();
        self.display.render_mode(mode);
        self.render_timer();
        info!("Switched to {} mode", mode);
        true
    }

    /// Validates and stores new durations. A running countdown keeps its
    /// length; the new values apply from the next reset or mode switch.
    pub fn apply_settings(&mut self, durations: Durations) -> Result<(), ValidationError> {
        durations.validate()?;

        self.durations = durations;
        self.durations.save(&mut self.storage);

        if !self.is_running() {
            self.cancel_grace();
            self.load_interval();
            self.render_timer();
        }

        info!(
            "Settings saved: {}/{}/{} min",
            durations.pomodoro, durations.short_break, durations.long_break
        );
        self.notifier.notify(NOTIFICATION_TITLE, SETTINGS_SAVED_MESSAGE);
        Ok(())
    }

    pub fn set_theme(&mut self, theme: Theme) {
        theme.save(&mut self.storage);
        self.display.render_theme(&theme);
        self.theme = theme;
    }

    pub fn refresh(&mut self) {
        self.display.render_mode(self.mode);
        self.display.render_theme(&self.theme);
        self.render_timer();
        self.render_progress();
    }

    fn load_interval(&mut self) {
        self.initial_seconds = self.durations.seconds(self.mode);
        self.remaining_seconds = self.initial_seconds;
    }

    /// Returns whether a pending auto-reset was cancelled.
    fn cancel_grace(&mut self) -> bool {
        match self.grace.take() {
            Some(id) => {
                self.clock.cancel(id);
                true
            }
            None => false,
        }
    }

    fn elapsed_fraction(&self) -> f64 {
        if self.initial_seconds == 0 {
            return 0.0;
        }
        let elapsed = self.initial_seconds.saturating_sub(self.remaining_seconds);
        (f64::from(elapsed) / f64::from(self.initial_seconds)).clamp(0.0, 1.0)
    }

    fn render_timer(&mut self) {
        let (minutes, seconds) = clock_labels(self.remaining_seconds);
        let progress = self.elapsed_fraction();
        self.display.render(&minutes, &seconds, progress);
    }

    fn render_progress(&mut self) {
        self.display.render_progress(
            self.progress.completed,
            self.progress.focus_minutes,
            self.progress.percent_of_goal(),
        );
    }
}
