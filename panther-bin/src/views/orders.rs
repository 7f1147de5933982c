use crate::{infras::guards::*, success, ApiResult, DbConn, IntoFailure};
use panther_db::orders::{OrderInfo, Orders};

#[get("/of/<student_id>")]
pub async fn orders_of(student_id: UserGuard, conn: DbConn) -> ApiResult<Vec<OrderInfo>> {
    let student = student_id.to_id_param(&conn).await.into_failure()?;
    let orders = conn
        .exec(move |c| Orders::of_student(c, &student.id))
        .await
        .into_failure()?;
    success(orders, "")
}
