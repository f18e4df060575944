//! Domain models for the clinic desk.

mod notice;
mod patient;
mod route;

pub use notice::*;
pub use patient::*;
pub use route::*;
