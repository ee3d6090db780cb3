//! Fuzzy multi-select picker.
//!
//! The widget core is UI-agnostic: [`MultiSelect`] is a state record that
//! consumes [`Event`]s and returns [`Command`]s. The `multipick` binary hosts
//! it in a terminal.

pub mod catalog;
pub mod config;
pub mod error;
pub mod filter;
pub mod input;
pub mod logging;
pub mod nav;
pub mod selection;
pub mod source;
pub mod widget;
pub mod window;

pub use catalog::{Catalog, Group, Item};
pub use config::Config;
pub use error::{Error, Result};
pub use filter::{CaseMatching, FuzzyFilter, MatchKey, MatchOptions};
pub use nav::NavState;
pub use selection::Selection;
pub use source::OptionSource;
pub use widget::{Chip, Command, Event, FocusTarget, Key, MultiSelect, Props, Row};
pub use window::{visible_slice, ViewWindow};
