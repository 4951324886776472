use actix_web::{Responder, web};
use serde::Serialize;
use sqlx::SqlitePool;
use utoipa::ToSchema;

use crate::{
    auth::auth::AuthUser,
    error::AppResult,
    model::{employee::Employee, payslip::Payslip},
    store,
};

const RECENT_PAYSLIPS: i64 = 10;

#[derive(Serialize, ToSchema)]
pub struct Dashboard {
    /// Every employee, ordered by last name
    pub employees: Vec<Employee>,
    /// The ten most recently created payslips
    pub recent_payslips: Vec<Payslip>,
}

#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, body = Dashboard),
        (status = 401)
    ),
    tag = "Dashboard",
    security(("bearer_auth" = []))
)]
pub async fn dashboard(_auth: AuthUser, pool: web::Data<SqlitePool>) -> AppResult<impl Responder> {
    let employees = store::employee::list(pool.get_ref()).await?;
    let recent_payslips = store::payslip::recent(pool.get_ref(), RECENT_PAYSLIPS).await?;

    Ok(web::Json(Dashboard {
        employees,
        recent_payslips,
    }))
}
