use crate::DbConn;
use panther_db::{error::PantherDbError, users::*};
use rocket::{
    form::{self, FromFormField, ValueField},
    http::Status,
    outcome::{try_outcome, IntoOutcome, Outcome},
    request::{self, FromParam, FromRequest},
    Request,
};
use std::{convert::Infallible, marker::PhantomData};

// Student ID specified in path, query or body
pub struct Param;

// Student ID stored in private cookie
pub struct Cookie;

pub struct UserGuard(String);

impl<'v> FromFormField<'v> for UserGuard {
    #[inline]
    fn from_value(field: ValueField<'v>) -> form::Result<'v, Self> {
        Ok(UserGuard(field.value.to_string()))
    }
}

impl<'a> FromParam<'a> for UserGuard {
    type Error = Infallible;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        Ok(UserGuard(param.to_string()))
    }
}

impl UserGuard {
    pub fn new(id: impl ToString) -> Self {
        Self(id.to_string())
    }

    pub async fn to_id_param(&self, db: &DbConn) -> Result<UserIdGuard<Param>, PantherDbError> {
        let uid_inner = self.0.clone();
        db.exec(move |c| {
            Ok(UserIdGuard {
                id: UserId::find(c, &uid_inner)?,
                plhdr: PhantomData,
            })
        })
        .await
    }
}

// This request guard gets us a student if the ID is specified and validated
pub struct UserIdGuard<T> {
    pub id: UserId,
    plhdr: PhantomData<T>,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for UserIdGuard<Cookie> {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let db = try_outcome!(request.guard::<DbConn>().await);
        let uid = request
            .cookies()
            .get_private("uid")
            .map(|cookie| cookie.value().to_string());
        let uid = try_outcome!(uid.or_error((Status::Unauthorized, ())));
        let found = db
            .exec(move |c| {
                Ok(UserIdGuard {
                    id: UserId::find(c, &uid)?,
                    plhdr: PhantomData,
                })
            })
            .await;
        match found {
            Ok(guard) => Outcome::Success(guard),
            // A cookie of a student that no longer exists is as good as no cookie
            Err(PantherDbError::StudentNotFound) => Outcome::Error((Status::Unauthorized, ())),
            Err(e) => {
                log::error!("failed to resolve the session: {}", e);
                Outcome::Error((Status::InternalServerError, ()))
            }
        }
    }
}
