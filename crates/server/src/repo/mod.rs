pub mod calendar;
pub mod case;
pub mod document;
pub mod message;
pub mod notification;
pub mod task;
pub mod user;
