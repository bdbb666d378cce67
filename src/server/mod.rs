//! Listener lifecycle, admission control and host notifications.

pub mod admission;
pub mod events;
pub mod listener;

pub use admission::{AdmissionController, AdmissionSlot};
pub use events::{EventSink, LogEvent};
pub use listener::{Server, ServerHandle};
