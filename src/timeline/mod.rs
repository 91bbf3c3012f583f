//! Time-indexed lookup primitives shared by every replay stream.
mod buffer;
mod index;
mod interpolate;

pub use buffer::{BufferWindow, StreamBuffer, SubjectBuffers};
pub use index::{Timestamped, index_at_or_before, latest_at_or_before};
pub use interpolate::{Interpolate, interpolate_at, interpolate_between, lerp};
