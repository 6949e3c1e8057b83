//! Event registry for the Liveline platform.
//!
//! Creates and reads live-event metadata and enforces the event lifecycle
//! state machine. An event starts `upcoming`, goes `live` when coverage
//! begins, and is frozen once `ended`. The transition table is closed:
//!
//! | From | To |
//! |------|----|
//! | `upcoming` | `live` |
//! | `upcoming` | `ended` |
//! | `live` | `ended` |
//!
//! Everything else — re-opening an ended event, rewinding to `upcoming`,
//! or writing an arbitrary status string — is rejected with a typed error
//! before any row is touched. Transitions are applied with a
//! compare-and-set on the observed current status, so two editors racing
//! to end the same event cannot interleave.

mod error;
mod event;
mod store;

pub use error::RegistryError;
pub use event::{CreateEventParams, Event};
pub use store::{
    create_event, delete_event, get_event, get_event_by_slug, list_events, set_status, slugify,
};
