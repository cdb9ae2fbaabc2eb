//! Break-before-make switching between the grid and inverter relays.
//!
//! The two relays feed the same load from incompatible sources, so they
//! must never be closed together. Every change of [`Mode`] runs under one
//! lock and opens the old relay, waits the settle delay, and only then
//! closes the new one. Switching off opens both at once with no delay.

use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::error::SwitchError;
use crate::line::Line;
use crate::mode::Mode;

/// Pause between opening one relay and closing the other.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Outcome of a mode change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The requested mode was already active; nothing was written.
    Unchanged(Mode),
    /// The relays were switched.
    Switched { from: Mode, to: Mode },
}

/// Commanded levels of both lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineLevels {
    pub grid: bool,
    pub inverter: bool,
}

impl LineLevels {
    /// Levels that `mode` requires once a transition has completed.
    pub const fn for_mode(mode: Mode) -> Self {
        Self {
            grid: matches!(mode, Mode::Grid),
            inverter: matches!(mode, Mode::Inverter),
        }
    }
}

#[derive(Debug)]
struct Relay {
    line: Box<dyn Line>,
    energized: bool,
}

impl Relay {
    fn new(line: Box<dyn Line>) -> Self {
        Self {
            line,
            energized: false,
        }
    }

    fn drive(&mut self, energized: bool) {
        self.line.set(energized);
        self.energized = energized;
    }
}

#[derive(Debug)]
struct Relays {
    mode: Mode,
    grid: Relay,
    inverter: Relay,
}

impl Relays {
    fn apply(&mut self, target: Mode, settle_delay: Duration) {
        match target {
            Mode::Inverter => {
                self.grid.drive(false);
                thread::sleep(settle_delay);
                self.inverter.drive(true);
            }
            Mode::Grid => {
                self.inverter.drive(false);
                thread::sleep(settle_delay);
                self.grid.drive(true);
            }
            Mode::Off => {
                self.inverter.drive(false);
                self.grid.drive(false);
            }
        }
        self.mode = target;
    }
}

/// Owns both relay lines and the current [`Mode`].
///
/// Calls may come from any thread. [`PowerController::set_mode`] blocks for
/// the settle delay and for any transition already in flight, so async
/// callers should run it on a blocking thread.
#[derive(Debug)]
pub struct PowerController {
    relays: Mutex<Relays>,
    settle_delay: Duration,
}

impl PowerController {
    /// Takes ownership of both lines and forces them off.
    ///
    /// # Arguments
    ///
    /// * `grid` - Line driving the grid relay
    /// * `inverter` - Line driving the inverter relay
    /// * `settle_delay` - Pause between opening one relay and closing the other
    ///
    /// # Returns
    ///
    /// A controller in [`Mode::Off`] with both lines de-energized.
    pub fn new(grid: Box<dyn Line>, inverter: Box<dyn Line>, settle_delay: Duration) -> Self {
        let mut relays = Relays {
            mode: Mode::Off,
            grid: Relay::new(grid),
            inverter: Relay::new(inverter),
        };
        relays.grid.drive(false);
        relays.inverter.drive(false);

        Self {
            relays: Mutex::new(relays),
            settle_delay,
        }
    }

    pub fn current_mode(&self) -> Mode {
        self.relays.lock().mode
    }

    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    pub fn lines(&self) -> LineLevels {
        let relays = self.relays.lock();
        LineLevels {
            grid: relays.grid.energized,
            inverter: relays.inverter.energized,
        }
    }

    /// Switches to `target`, or does nothing if it is already active.
    ///
    /// The lock is held for the whole transition, including the settle
    /// delay, so a transition can never be interleaved with another one.
    pub fn set_mode(&self, target: Mode) -> Transition {
        let mut relays = self.relays.lock();
        let from = relays.mode;
        if from == target {
            debug!(mode = %target, "mode already active");
            return Transition::Unchanged(target);
        }

        relays.apply(target, self.settle_delay);
        info!(%from, to = %target, "switched power mode");
        Transition::Switched { from, to: target }
    }

    /// Parses `name` and switches to it.
    ///
    /// # Errors
    ///
    /// Returns [`SwitchError::UnknownMode`] if `name` is not a mode. Nothing
    /// is written in that case.
    pub fn set_mode_named(&self, name: &str) -> Result<Transition, SwitchError> {
        let target = name
            .parse::<Mode>()
            .inspect_err(|err| warn!(%err, "rejected mode change"))?;
        Ok(self.set_mode(target))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::line::{LineJournal, MemoryLine};

    const SETTLE: Duration = Duration::from_millis(30);

    fn journaled(settle_delay: Duration) -> (PowerController, LineJournal) {
        let journal = LineJournal::new();
        let controller = PowerController::new(
            Box::new(MemoryLine::journaled("grid", &journal)),
            Box::new(MemoryLine::journaled("inverter", &journal)),
            settle_delay,
        );
        (controller, journal)
    }

    #[test]
    fn starts_off_with_both_lines_forced_low() {
        let (controller, journal) = journaled(SETTLE);

        assert_eq!(controller.current_mode(), Mode::Off);
        assert_eq!(controller.lines(), LineLevels::for_mode(Mode::Off));
        let writes: Vec<(&str, bool)> = journal
            .events()
            .iter()
            .map(|e| (e.line, e.energized))
            .collect();
        assert_eq!(writes, vec![("grid", false), ("inverter", false)]);
    }

    #[test]
    fn grid_to_inverter_opens_grid_before_closing_inverter() {
        let (controller, journal) = journaled(SETTLE);
        controller.set_mode(Mode::Grid);
        let before = journal.write_count();

        let transition = controller.set_mode(Mode::Inverter);

        assert_eq!(
            transition,
            Transition::Switched {
                from: Mode::Grid,
                to: Mode::Inverter
            }
        );
        let events = journal.events();
        let switch = &events[before..];
        assert_eq!(switch.len(), 2);
        assert_eq!((switch[0].line, switch[0].energized), ("grid", false));
        assert_eq!((switch[1].line, switch[1].energized), ("inverter", true));
        assert!(switch[1].at.duration_since(switch[0].at) >= SETTLE);
        assert_eq!(controller.lines(), LineLevels::for_mode(Mode::Inverter));
    }

    #[test]
    fn inverter_to_grid_opens_inverter_before_closing_grid() {
        let (controller, journal) = journaled(SETTLE);
        controller.set_mode(Mode::Inverter);
        let before = journal.write_count();

        controller.set_mode(Mode::Grid);

        let events = journal.events();
        let switch = &events[before..];
        assert_eq!((switch[0].line, switch[0].energized), ("inverter", false));
        assert_eq!((switch[1].line, switch[1].energized), ("grid", true));
        assert!(switch[1].at.duration_since(switch[0].at) >= SETTLE);
        assert_eq!(controller.current_mode(), Mode::Grid);
    }

    #[test]
    fn repeating_the_active_mode_writes_nothing() {
        let (controller, journal) = journaled(Duration::from_millis(200));
        controller.set_mode(Mode::Grid);
        let before = journal.write_count();

        let started = Instant::now();
        let transition = controller.set_mode(Mode::Grid);

        assert_eq!(transition, Transition::Unchanged(Mode::Grid));
        assert_eq!(journal.write_count(), before);
        assert!(started.elapsed() < Duration::from_millis(200));
    }

    #[test]
    fn off_opens_both_lines_without_waiting() {
        let settle = Duration::from_millis(200);
        for from in [Mode::Grid, Mode::Inverter] {
            let (controller, journal) = journaled(settle);
            controller.set_mode(from);

            let started = Instant::now();
            controller.set_mode(Mode::Off);

            assert!(started.elapsed() < settle);
            assert!(!journal.level("grid"));
            assert!(!journal.level("inverter"));
            assert_eq!(controller.lines(), LineLevels::for_mode(Mode::Off));
        }
    }

    #[test]
    fn unknown_name_is_rejected_without_touching_lines() {
        let (controller, journal) = journaled(SETTLE);
        controller.set_mode(Mode::Inverter);
        let before = journal.write_count();

        let err = controller.set_mode_named("solar").unwrap_err();

        assert!(matches!(err, SwitchError::UnknownMode(ref s) if s == "solar"));
        assert_eq!(controller.current_mode(), Mode::Inverter);
        assert_eq!(journal.write_count(), before);
    }

    #[test]
    fn named_switch_applies_the_parsed_mode() {
        let (controller, _journal) = journaled(SETTLE);
        let transition = controller.set_mode_named("grid").unwrap();
        assert_eq!(
            transition,
            Transition::Switched {
                from: Mode::Off,
                to: Mode::Grid
            }
        );
    }

    #[test]
    fn every_edge_ends_with_levels_matching_the_mode() {
        for from in Mode::ALL {
            for to in Mode::ALL {
                let (controller, journal) = journaled(Duration::from_millis(1));
                controller.set_mode(from);
                controller.set_mode(to);

                assert_eq!(controller.current_mode(), to);
                assert_eq!(controller.lines(), LineLevels::for_mode(to));
                assert_eq!(journal.level("grid"), to == Mode::Grid);
                assert_eq!(journal.level("inverter"), to == Mode::Inverter);
                assert!(!journal.overlap_detected(), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn default_settle_delay_is_100ms() {
        assert_eq!(DEFAULT_SETTLE_DELAY, Duration::from_millis(100));
    }
}
