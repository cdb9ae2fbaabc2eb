//! Shared test fixtures for integration tests.

use std::sync::Arc;
use std::time::Duration;

use powerswitch::api::AppState;
use powerswitch::controller::PowerController;
use powerswitch::line::{LineJournal, MemoryLine};

/// Settle delay used by the fixtures; short enough to keep tests fast.
pub const TEST_SETTLE_DELAY: Duration = Duration::from_millis(20);

/// Controller over two journaled memory lines named `grid` and `inverter`.
///
/// Returns `(controller, journal)`; the journal sees every line write,
/// including the two forced-off writes made at construction.
pub fn journaled_controller(settle_delay: Duration) -> (Arc<PowerController>, LineJournal) {
    let journal = LineJournal::new();
    let controller = PowerController::new(
        Box::new(MemoryLine::journaled("grid", &journal)),
        Box::new(MemoryLine::journaled("inverter", &journal)),
        settle_delay,
    );
    (Arc::new(controller), journal)
}

/// API state over a journaled controller with the default 200-only replies.
#[allow(dead_code)]
pub fn journaled_app_state() -> (Arc<AppState>, LineJournal) {
    let (controller, journal) = journaled_controller(TEST_SETTLE_DELAY);
    (Arc::new(AppState::new(controller, false)), journal)
}
