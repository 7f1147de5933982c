// Read-only routes
pub mod listings;
pub mod msgs;
pub mod orders;
pub mod search;
pub mod students;
