// Routes that change the state of the marketplace
pub mod listings;
pub mod msgs;
pub mod orders;
pub mod students;
