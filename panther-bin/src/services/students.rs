use crate::{
    infras::guards::*, success, ApiResult, DbConn, IntoFailure,
};
use panther_db::users::{EmailDomains, RoleSet, Roles, UserForm, UserId};
use rocket::{
    http::{Cookie as HttpCookie, CookieJar, SameSite},
    serde::json::Json,
    State,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInfo {
    name: String,
    email: String,
    phone: String,
    password: String,
    #[serde(default)]
    payment_method: Option<String>,
    #[serde(default)]
    payment_info: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginInfo {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginData {
    id: String,
    name: String,
    email: String,
    roles: RoleSet,
}

#[post("/register", data = "<info>")]
pub async fn register(
    info: Json<RegisterInfo>,
    domains: &State<EmailDomains>,
    conn: DbConn,
) -> ApiResult<String> {
    let info = info.into_inner();
    let domains = domains.inner().clone();
    let id = conn
        .exec(move |c| {
            UserForm::new(info.name, info.email, info.phone, info.password)
                .payment(info.payment_method, info.payment_info)
                .create(c, &domains)
        })
        .await
        .into_failure()?;
    log::info!("student {} registered", id.get_id());
    success(id.get_id().to_string(), "registered")
}

#[post("/login", data = "<info>")]
pub async fn login(
    info: Json<LoginInfo>,
    jar: &CookieJar<'_>,
    conn: DbConn,
) -> ApiResult<LoginData> {
    let info = info.into_inner();
    let data = conn
        .exec(move |c| {
            let id: UserId = UserId::login(c, &info.email, &info.password)?;
            let user = id.get_info(c)?;
            Ok(LoginData {
                id: user.get_id().to_string(),
                name: user.get_name().to_string(),
                email: user.get_email().to_string(),
                roles: Roles::of(c, &id)?,
            })
        })
        .await
        .into_failure()?;

    jar.add_private(
        HttpCookie::build(("uid", data.id.clone()))
            .http_only(true)
            .same_site(SameSite::Strict),
    );
    log::info!("student {} logged in", data.id);
    success(data, "logged in")
}

#[get("/logout")]
pub async fn logout(user: Option<UserIdGuard<Cookie>>, jar: &CookieJar<'_>) -> ApiResult<bool> {
    if let Some(user) = user {
        log::info!("student {} logged out", user.id.get_id());
    }
    jar.remove_private("uid");
    success(true, "logged out")
}
