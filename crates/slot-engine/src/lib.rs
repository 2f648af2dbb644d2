//! # slot-engine
//!
//! Bookable free-slot computation for calendar scheduling.
//!
//! Given busy intervals from a calendar provider, a search window, a meeting
//! length, and a buffer, the engine proposes fixed-length slots that stay
//! clear of busy time and never start in the past. Everything is pure: the
//! provider and the clock are passed in through the [`source`] traits.
//!
//! ## Modules
//!
//! - [`slots`]: the availability engine (`compute_free_slots`)
//! - [`interval`]: intervals, windows, slot requests, and free slots
//! - [`events`]: provider event JSON → busy intervals
//! - [`source`]: `Clock` and `BusySource` seams with in-memory implementations
//! - [`request`]: caller-facing query shapes with boundary defaults
//! - [`draft`]: create/update request → provider event body
//! - [`error`]: Error types

pub mod draft;
pub mod error;
pub mod events;
pub mod interval;
pub mod request;
pub mod slots;
pub mod source;

pub use draft::{EventDraft, EventPatch, EventResource};
pub use error::SlotError;
pub use events::{busy_intervals, EventTime, ProviderEvent};
pub use interval::{FreeSlot, SearchWindow, SlotRequest, TimeInterval};
pub use request::{ScheduleQuery, SlotQuery};
pub use slots::{compute_free_slots, find_available_slots};
pub use source::{BusySource, Clock, FixedClock, StaticSource, SystemClock};
