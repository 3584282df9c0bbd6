// Chart document model: bucketed entity storage, editing, undo/redo, queries

mod bucket;
mod chart;
pub mod config;
mod density;
mod error;
mod handle;
mod history;
mod note;
mod note_ops;
mod query;
mod selection;
mod store;
mod timing;
mod timing_ops;

/// Milliseconds on the chart timeline.
pub type Time = i64;
/// Zero-based playable column.
pub type Column = usize;
/// Floor of `time / bucket_width`.
pub type BucketIndex = i64;

pub use bucket::Bucket;
pub use chart::{ChangeCallback, Chart};
pub use config::ChartConfig;
pub use error::ChartError;
pub use handle::EntityId;
pub use history::{Batch, History};
pub use note::{Note, NoteKind, NoteType, SustainKind, SustainPart, TimeSpan};
pub use selection::Selection;
pub use store::BucketStore;
pub use timing::{ScrollVelocity, StopPoint, TempoPoint};
