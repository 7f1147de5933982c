use diesel::{connection::SimpleConnection, SqliteConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use error::{PantherDbError, PantherDbResult as Result};

pub mod enums;
pub mod error;
pub mod listings;
pub mod messages;
pub mod orders;
pub mod saved;
#[rustfmt::skip]
mod schema;
pub mod tags;
pub mod test_utils;
pub mod users;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Enum representing order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Ascending
    Asc,
    /// Descending
    Desc,
}

impl Order {
    /// Parse a user-supplied direction. Anything unrecognized falls back to ascending.
    pub fn from_direction(direction: &str) -> Self {
        if direction.eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }
}

// SQLite pragmas are per connection, so every connection checked out of a pool has to be configured again.
pub fn configure(conn: &mut SqliteConnection) -> Result<()> {
    conn.batch_execute("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")?;
    Ok(())
}

pub fn run_migrations(conn: &mut SqliteConnection) -> Result<()> {
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| PantherDbError::MigrationError(e.to_string()))?;
    Ok(())
}
