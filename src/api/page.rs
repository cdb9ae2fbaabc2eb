//! Embedded control page.

use crate::mode::Mode;

/// Token in the template replaced with the current mode.
pub const MODE_PLACEHOLDER: &str = "{{mode}}";

const TEMPLATE: &str = include_str!("control.html");

/// Renders the control page showing `mode`.
pub fn render(mode: Mode) -> String {
    TEMPLATE.replace(MODE_PLACEHOLDER, mode.as_str())
}
