//! Convenient re-exports for common status-repeater types.
pub use crate::{
    clock::{Clock, MonotonicClock},
    error::BuildError,
    key::{DefaultFormatKey, FormatKey},
    repeater::{StatusRepeater, StatusRepeaterBuilder, StatusRepeaterLayer, DEFAULT_WINDOW},
    stats::RepeaterStats,
    store::SuppressionStore,
};
