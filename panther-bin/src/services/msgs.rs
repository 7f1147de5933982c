use crate::{success, ApiResult, DbConn, IntoFailure};
use panther_db::messages::Messages;
use rocket::serde::json::Json;
use serde::Deserialize;

// Sender and receiver are checked inside `Messages::send` so the errors stay specific
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessage {
    sender_id: String,
    receiver_id: String,
    content: String,
}

#[post("/send", data = "<info>")]
pub async fn send(info: Json<SendMessage>, conn: DbConn) -> ApiResult<String> {
    let info = info.into_inner();
    let id = conn
        .exec(move |c| Messages::send(c, &info.sender_id, &info.receiver_id, &info.content))
        .await
        .into_failure()?;
    success(id.get_id().to_string(), "message sent")
}
