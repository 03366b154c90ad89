pub mod error;
pub mod feature_flags;

// Deedflow domain modules (canonical locations for all portal domain types)
pub mod calendar;
pub mod case;
pub mod common;
pub mod document;
pub mod message;
pub mod notification;
pub mod task;
pub mod user;

pub use error::*;
pub use feature_flags::*;

// Re-export all domain types
pub use calendar::*;
pub use case::*;
pub use common::*;
pub use document::*;
pub use message::*;
pub use notification::*;
pub use task::*;
pub use user::*;
