use panther_db::error::{ErrorKind, PantherDbError};
use rocket::{
    fairing::{AdHoc, Fairing},
    http::Status,
    response::{self, Responder},
    serde::json::Json,
    Request,
};
use serde::{Deserialize, Serialize};

/// The response body shared by every route
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub msg: String,
}

impl<T> Envelope<T> {
    pub fn success(data: T, msg: impl ToString) -> Self {
        Self {
            success: true,
            data: Some(data),
            msg: msg.to_string(),
        }
    }
}

impl Envelope<()> {
    pub fn failure(msg: impl ToString) -> Self {
        Self {
            success: false,
            data: None,
            msg: msg.to_string(),
        }
    }
}

pub type ApiResult<T> = Result<Json<Envelope<T>>, Failure>;

pub fn success<T>(data: T, msg: impl ToString) -> ApiResult<T> {
    Ok(Json(Envelope::success(data, msg)))
}

// A failure envelope together with its status code
#[derive(Debug)]
pub struct Failure {
    status: Status,
    msg: String,
}

impl Failure {
    pub fn new(status: Status, msg: impl ToString) -> Self {
        Self {
            status,
            msg: msg.to_string(),
        }
    }
}

impl From<PantherDbError> for Failure {
    fn from(e: PantherDbError) -> Self {
        let status = match e.kind() {
            ErrorKind::Validation | ErrorKind::BusinessRule => Status::BadRequest,
            ErrorKind::NotOwner => Status::Forbidden,
            ErrorKind::NotFound => Status::NotFound,
            ErrorKind::Conflict => Status::Conflict,
            ErrorKind::Internal => Status::InternalServerError,
        };
        if status == Status::InternalServerError {
            // Storage details stay in the log
            log::error!("request failed: {}", e);
            Self::new(status, "internal server error")
        } else {
            log::warn!("request refused: {}", e);
            Self::new(status, e)
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Failure {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'o> {
        (self.status, Json(Envelope::failure(self.msg))).respond_to(req)
    }
}

pub trait IntoFailure<T> {
    fn into_failure(self) -> Result<T, Failure>;
}

impl<T, E> IntoFailure<T> for Result<T, E>
where
    E: Into<Failure>,
{
    fn into_failure(self) -> Result<T, Failure> {
        self.map_err(Into::into)
    }
}

pub fn create_fairing<'a, T: Deserialize<'a> + Sync + Send + 'static>(
    name: &'static str,
) -> impl Fairing {
    AdHoc::try_on_ignite(name, move |rocket| async move {
        let config: T = match rocket.figment().extract_inner(name) {
            Ok(c) => c,
            Err(e) => {
                log::error!("Invalid configuration: {:?}", e);
                return Err(rocket);
            }
        };

        Ok(rocket.manage(config))
    })
}

#[catch(400)]
pub fn bad_request() -> Json<Envelope<()>> {
    Json(Envelope::failure("malformed request"))
}

#[catch(401)]
pub fn unauthorized() -> Json<Envelope<()>> {
    Json(Envelope::failure("please log in first"))
}

#[catch(404)]
pub fn not_found(req: &Request<'_>) -> Json<Envelope<()>> {
    Json(Envelope::failure(format!("nothing found at {}", req.uri())))
}

// Bodies that fail to deserialize are input errors like any other
#[catch(422)]
pub fn unprocessable() -> (Status, Json<Envelope<()>>) {
    (
        Status::BadRequest,
        Json(Envelope::failure("missing or malformed field")),
    )
}

#[catch(500)]
pub fn internal_error() -> Json<Envelope<()>> {
    Json(Envelope::failure("internal server error"))
}
