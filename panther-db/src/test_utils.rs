use crate::{configure, run_migrations};
use diesel::{Connection, SqliteConnection};
use std::path::PathBuf;

// A helper function to create a in-memory SQLite DB in order to test. The database is discarded after the test
pub fn establish_connection() -> SqliteConnection {
    let mut conn = SqliteConnection::establish(":memory:")
        .unwrap_or_else(|_| panic!("Error creating test database"));

    // Enforce foreign key relation
    configure(&mut conn).unwrap();
    run_migrations(&mut conn).unwrap();
    conn
}

// A file-backed database shared by several connections. The file is removed on drop.
pub struct TempDb {
    path: PathBuf,
}

impl TempDb {
    pub fn new() -> Self {
        let path = std::env::temp_dir().join(format!("panther-{}.sqlite", uuid::Uuid::new_v4()));
        let db = Self { path };
        run_migrations(&mut db.connect()).unwrap();
        db
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    pub fn connect(&self) -> SqliteConnection {
        let mut conn = SqliteConnection::establish(&self.path.to_string_lossy())
            .unwrap_or_else(|_| panic!("Error opening test database"));
        configure(&mut conn).unwrap();
        conn
    }
}

impl Default for TempDb {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

// Register a student with throwaway phone and password
pub fn register_student(conn: &mut SqliteConnection, name: &str, email: &str) -> crate::users::UserId {
    crate::users::UserForm::new(name, email, "412-555-0100", "strongpasswd")
        .create(conn, &crate::users::EmailDomains::default())
        .unwrap()
}
