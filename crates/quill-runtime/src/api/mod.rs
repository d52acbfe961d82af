//! Embedding helpers
//!
//! Builders for the host side of the API. The stack and call operations
//! themselves are methods on [`Context`](crate::Context).

pub mod native;

pub use native::{BuildError, NativeFunctionBuilder};
