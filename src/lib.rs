//! Remote control for a grid/inverter relay pair.
//!
//! [`controller::PowerController`] owns both relay lines and guarantees
//! break-before-make switching; [`api`] exposes it over HTTP together with a
//! small control page.

pub mod api;
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod line;
pub mod mode;

pub use controller::{LineLevels, PowerController, Transition};
pub use error::SwitchError;
pub use mode::Mode;
