//! Layout planner and relinker
//!
//! Turns a virtual tree into a fresh, fully compacted archive. Layout order
//! is fixed by flattening before any offset is known; offsets are assigned
//! afterwards and written back into the parent entries through stored
//! [`Slot`]s.
//!
//! # Example
//!
//! ```no_run
//! use ggpk_formats::{archive::open_archive, layout::defragment};
//!
//! let root = open_archive("Content.ggpk")?;
//! let summary = defragment(&root, "Content.defrag.ggpk")?;
//! println!("{} bytes written", summary.bytes_written);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod descriptor;
mod error;
mod planner;
mod writer;

pub use descriptor::{DirDescriptor, FileDescriptor, Slot};
pub use error::{LayoutError, LayoutResult};
pub use planner::{LayoutPlan, plan};
pub use writer::{WriteSummary, defragment, write_archive};
