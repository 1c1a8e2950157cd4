//! Debounced remote-search select
//!
//! - `option`: option identity and display data
//! - `provider`: the async collaborator that answers queries
//! - `controller`: debounce timer, request sequencing, open/closed state
//! - `selection`: committed `{id, label}` value
//! - `region`: outside-click hit-testing
//! - `select`: the composed widget

pub mod controller;
pub mod option;
pub mod provider;
pub mod region;
pub mod select;
pub mod selection;

pub use controller::{
    ControllerState, SearchController, SearchSession, SearchSettings, DEFAULT_DEBOUNCE,
    DEFAULT_FOCUS_DELAY,
};
pub use option::{OptionId, SearchOption};
pub use provider::{OptionProvider, StaticOptions};
pub use region::{Bounds, HitRegion, Point};
pub use select::{NavKey, PointerTarget, SearchableSelect, SelectEvent};
pub use selection::{Committed, Selection, SelectionState};
