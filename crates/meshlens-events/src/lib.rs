//! # Meshlens Events
//!
//! Engine log translation and incremental collection.
//!
//! ## Core Components
//!
//! - [`EngineEvent`]: Typed view of one engine event variant
//! - [`translate`] / [`translate_batch`]: Raw record to leveled [`EventRecord`]
//! - [`EventHistory`]: Deduplicated, append-only history fed once per poll
//!
//! ## Collection
//!
//! Every snapshot carries the engine's whole bounded event buffer. The last
//! raw record already in the history is used as a cursor:
//!
//! 1. Empty history: take the whole batch
//! 2. Cursor found in the batch: take everything after its last occurrence
//! 3. Cursor missing: the buffer wrapped around, take the whole batch and
//!    report [`Absorbed::Gap`]
//!
//! Raw records are compared byte for byte and only translated when shown.
//!
//! ## Example
//!
//! ```rust,ignore
//! use meshlens_events::{Absorbed, EventHistory};
//!
//! let mut history = EventHistory::new();
//! if let Absorbed::Gap(n) = history.absorb(&snapshot.raw_events) {
//!     println!("{} events after a gap", n);
//! }
//! for record in history.records() {
//!     println!("{}", record.display_text());
//! }
//! ```

pub mod history;
pub mod kind;
pub mod translator;

pub use history::{Absorbed, EventHistory};
pub use kind::EngineEvent;
pub use translator::{translate, translate_batch};

// Re-export core types for convenience
pub use meshlens_core::{EventError, EventLevel, EventRecord, EventResult, RawEvent};
