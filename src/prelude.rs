//! The types most callers need, importable in one line.

pub use crate::build::{FeedBuilder, PlacementConfig};
pub use crate::feed::Feed;
pub use crate::geometry::Side;
pub use crate::plan::NetworkPlan;
