// Bulk chart edits: selection transforms, stream generation and global shift

mod convert;
mod global_shift;
mod lane_shuffle;
mod quantize;
mod stream;
mod time_transform;
pub mod transform;

pub use convert::{ConvertToSustains, ConvertToTaps};
pub use global_shift::GlobalShift;
pub use lane_shuffle::{Mirror, Shuffle};
pub use quantize::Quantize;
pub use stream::{StreamGenerator, StreamPattern};
pub use time_transform::{Reverse, Scale};
pub use transform::{SelectionTransform, apply_transform};
