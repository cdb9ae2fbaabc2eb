//! Power routing modes.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::SwitchError;

/// Where the switched load currently draws power from.
///
/// The text form (`off`, `grid`, `inverter`) is what the HTTP surface,
/// the config file and the log output use.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Both relays open.
    #[default]
    Off,
    /// Grid relay closed, inverter relay open.
    Grid,
    /// Inverter relay closed, grid relay open.
    Inverter,
}

impl Mode {
    /// Every mode, in display order.
    pub const ALL: [Self; 3] = [Self::Off, Self::Grid, Self::Inverter];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Grid => "grid",
            Self::Inverter => "inverter",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = SwitchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| SwitchError::UnknownMode(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_form_round_trips_for_every_mode() {
        for mode in Mode::ALL {
            assert_eq!(mode.to_string().parse::<Mode>().ok(), Some(mode));
        }
    }

    #[test]
    fn parsing_is_exact() {
        for bad in ["", "Grid", "INVERTER", " off", "solar"] {
            let err = bad.parse::<Mode>().unwrap_err();
            assert!(matches!(err, SwitchError::UnknownMode(ref s) if s == bad));
        }
    }

    #[test]
    fn defaults_to_off() {
        assert_eq!(Mode::default(), Mode::Off);
    }
}
