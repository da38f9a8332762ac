//! Pipeline module.
//!
//! This module provides the end-to-end claims pipeline and its builder.

mod builder;

pub use builder::{ClaimsPipeline, ClaimsPipelineBuilder};
