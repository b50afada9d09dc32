//! Task sources: the collaborators that supply problem items to an episode.
//!
//! Every source implements the [`TaskSource`] trait so that the observation
//! sampler can read from it uniformly. [`InMemoryTaskSource`] holds a fixed
//! list of items and can be loaded from a JSON file.

pub mod memory;
pub mod traits;

pub use memory::InMemoryTaskSource;
pub use traits::{DataPoint, TaskSource};
