use crate::{infras::guards::*, success, ApiResult, DbConn, IntoFailure};
use panther_db::orders::Orders;
use rocket::serde::json::Json;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    student_id: String,
    listing_id: String,
    #[serde(default)]
    payment_method: Option<String>,
}

#[post("/purchase", data = "<info>")]
pub async fn purchase(info: Json<Purchase>, conn: DbConn) -> ApiResult<bool> {
    let info = info.into_inner();
    let buyer = UserGuard::new(&info.student_id)
        .to_id_param(&conn)
        .await
        .into_failure()?;
    let listing = ListingGuard::new(&info.listing_id)
        .to_id(&conn)
        .await
        .into_failure()?;

    let payment = info.payment_method;
    let order = conn
        .exec(move |c| Orders::purchase(c, &listing, &buyer.id, payment.as_deref()))
        .await
        .into_failure()?;
    log::info!("order {} placed", order.get_id());
    success(true, "purchase complete")
}
