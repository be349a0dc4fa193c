//! Data models for the member picker.

mod filter;
mod member;
mod report;

pub use filter::*;
pub use member::*;
pub use report::*;
