// A few rules of thumb.
// Use request guards to resolve ids from paths, queries and cookies.
// Every route answers with the JSON envelope, failures included.
// Handle database errors with `into_failure()` so the status code follows the error kind.

#[macro_use]
extern crate rocket;
#[macro_use]
extern crate rocket_sync_db_pools;

pub use infras::{basics::*, database::DbConn};
use panther_db::users::EmailDomains;
use rocket::{
    fairing::AdHoc,
    figment::{
        providers::{Format, Serialized, Toml},
        Figment,
    },
    shield::Shield,
    Build, Rocket,
};
use std::path::PathBuf;
use structopt::StructOpt;

mod infras;
mod services;
mod views;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "panther-bin",
    about = "The web server for Panther Exchange, a campus marketplace"
)]
struct PantherOpts {
    /// Path to the TOML configuration file.
    #[structopt(short, long, parse(from_os_str))]
    config: PathBuf,
}

pub fn build(figment: Figment) -> Rocket<Build> {
    // Registration falls back to the university domain if the config doesn't say otherwise
    let figment = figment.join(Serialized::default("registration", EmailDomains::default()));

    rocket::custom(figment)
        .attach(DbConn::fairing())
        .attach(Shield::new())
        .attach(create_fairing::<EmailDomains>("registration"))
        .attach(AdHoc::try_on_ignite(
            "Run database migrations",
            infras::database::run_migrations,
        ))
        .mount(
            "/students",
            routes![
                services::students::register,
                services::students::login,
                services::students::logout,
                views::students::my_listings,
            ],
        )
        .mount(
            "/listings",
            routes![
                views::listings::home,
                views::listings::detail,
                views::listings::saved,
                views::listings::sort,
                services::listings::create_listing,
                services::listings::delete_listing,
                services::listings::tag_listing,
                services::listings::save,
                services::listings::unsave,
            ],
        )
        .mount(
            "/search",
            routes![views::search::keyword, views::search::category],
        )
        .mount(
            "/orders",
            routes![services::orders::purchase, views::orders::orders_of],
        )
        .mount(
            "/messages",
            routes![
                services::msgs::send,
                views::msgs::inbox_of,
                views::msgs::inbox,
                views::msgs::chat,
            ],
        )
        .register(
            "/",
            catchers![
                infras::basics::bad_request,
                infras::basics::unauthorized,
                infras::basics::not_found,
                infras::basics::unprocessable,
                infras::basics::internal_error
            ],
        )
}

#[launch]
fn rocket() -> Rocket<Build> {
    let args: PantherOpts = PantherOpts::from_args();

    // This helps us manage run-time Rocket.toml easily
    let figment = Figment::from(rocket::Config::default()).merge(Toml::file(args.config).nested());

    // According to the documentation, this will not read `Rocket.toml`
    // only Rocket::build reads it.
    build(figment)
}

#[cfg(test)]
mod tests;
