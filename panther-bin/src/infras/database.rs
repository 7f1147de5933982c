use diesel::SqliteConnection;
use panther_db::error::PantherDbResult;
use rocket::{fairing, Build, Rocket};

#[database("panther")]
pub struct DbConn(diesel::SqliteConnection);

impl DbConn {
    // Run a database operation on a properly configured pooled connection
    pub async fn exec<T, F>(&self, f: F) -> PantherDbResult<T>
    where
        F: FnOnce(&mut SqliteConnection) -> PantherDbResult<T> + Send + 'static,
        T: Send + 'static,
    {
        self.run(move |c| {
            panther_db::configure(c)?;
            f(c)
        })
        .await
    }
}

pub async fn run_migrations(rocket: Rocket<Build>) -> fairing::Result {
    let conn = match DbConn::get_one(&rocket).await {
        Some(c) => c,
        None => {
            log::error!("no database connection available for migrations");
            return Err(rocket);
        }
    };

    match conn.exec(panther_db::run_migrations).await {
        Ok(()) => Ok(rocket),
        Err(e) => {
            log::error!("failed to run database migrations: {}", e);
            Err(rocket)
        }
    }
}
