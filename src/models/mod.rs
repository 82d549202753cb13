pub mod api;
pub mod face;
pub mod job;
pub mod person;
