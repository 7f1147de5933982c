// Elementary guards for tables in database
mod listings;
mod users;

pub use self::{listings::*, users::*};
