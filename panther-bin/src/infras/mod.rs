// Rocket basics, i.e. config fairings, the JSON envelope and catchers.
pub mod basics;
// Rocket-based database infra
pub mod database;
// Request guards for students and listings
pub mod guards;
