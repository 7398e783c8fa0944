//! Setting handlers for different configuration patterns.

pub mod backend;
pub mod field;
pub mod overlay;

pub use backend::*;
pub use field::*;
pub use overlay::*;
