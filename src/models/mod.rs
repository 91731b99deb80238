//! Data models for the academy website.
//!
//! Field names follow the stored row shape (snake_case) so admin clients can
//! send partial rows straight back.

mod contact;
mod course;
mod page;
mod session;

pub use contact::*;
pub use course::*;
pub use page::*;
pub use session::*;
