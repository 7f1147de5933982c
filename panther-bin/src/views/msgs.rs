use crate::{infras::guards::*, success, ApiResult, DbConn, IntoFailure};
use panther_db::messages::{InboxEntry, Message, Messages};

#[get("/inbox/<student_id>")]
pub async fn inbox_of(student_id: UserGuard, conn: DbConn) -> ApiResult<Vec<InboxEntry>> {
    let student = student_id.to_id_param(&conn).await.into_failure()?;
    let entries = conn
        .exec(move |c| Messages::inbox(c, &student.id))
        .await
        .into_failure()?;
    success(entries, "")
}

#[get("/inbox")]
pub async fn inbox(user: UserIdGuard<Cookie>, conn: DbConn) -> ApiResult<Vec<InboxEntry>> {
    let entries = conn
        .exec(move |c| Messages::inbox(c, &user.id))
        .await
        .into_failure()?;
    success(entries, "")
}

#[get("/chat?<user_id>")]
pub async fn chat(
    user: UserIdGuard<Cookie>,
    user_id: UserGuard,
    conn: DbConn,
) -> ApiResult<Vec<Message>> {
    let other = user_id.to_id_param(&conn).await.into_failure()?;
    let conv = conn
        .exec(move |c| Messages::get_conv(c, user.id.get_id(), other.id.get_id()))
        .await
        .into_failure()?;
    success(conv, "")
}
