use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};

use crate::{
    auth::auth::AuthUser,
    error::{AppError, AppResult},
    model::employee::Employee,
    payroll::ytd::YtdTotals,
    store::{self, employee::EmployeeFields},
    utils::date::{optional_iso_date, require_iso_date},
};

/// Body for both create and update. Update overwrites every field except
/// `date_of_birth`, which is only changed when supplied.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct EmployeePayload {
    #[schema(example = "EMP-001")]
    pub employee_code: Option<String>,
    #[schema(example = "John")]
    pub first_name: Option<String>,
    #[schema(example = "Doe")]
    pub last_name: Option<String>,
    #[schema(example = "Operations")]
    pub department: Option<String>,
    #[schema(example = "Guard")]
    pub position: Option<String>,
    #[schema(example = "john.doe@company.com", format = "email")]
    pub email: Option<String>,
    pub nis_number: Option<String>,
    pub tax_reference: Option<String>,
    pub bank_name: Option<String>,
    pub bank_account: Option<String>,
    #[schema(example = "1980-05-17", format = "date")]
    pub date_of_birth: Option<String>,
}

fn required(field: &str, value: Option<String>) -> AppResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::validation(format!("{field} is required")))
}

fn optional(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl EmployeePayload {
    pub fn into_fields(self) -> AppResult<EmployeeFields> {
        Ok(EmployeeFields {
            date_of_birth: optional_iso_date("date_of_birth", self.date_of_birth.as_deref())?,
            employee_code: required("employee_code", self.employee_code)?,
            first_name: required("first_name", self.first_name)?,
            last_name: required("last_name", self.last_name)?,
            department: required("department", self.department)?,
            position: required("position", self.position)?,
            email: required("email", self.email)?,
            nis_number: optional(self.nis_number),
            tax_reference: optional(self.tax_reference),
            bank_name: optional(self.bank_name),
            bank_account: optional(self.bank_account),
        })
    }
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct YtdQuery {
    /// Last day included in the totals (`YYYY-MM-DD`)
    #[schema(example = "2026-06-30")]
    pub period_end: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeYtdResponse {
    pub employee_id: i64,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub from: chrono::NaiveDate,
    #[schema(example = "2026-06-30", format = "date", value_type = String)]
    pub to: chrono::NaiveDate,
    pub totals: YtdTotals,
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/employee",
    request_body = EmployeePayload,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 400, description = "Missing field or malformed date"),
        (status = 409, description = "Employee code already exists")
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
#[instrument(skip(pool, payload), fields(operator = auth.user_id))]
pub async fn create_employee(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    payload: web::Json<EmployeePayload>,
) -> AppResult<impl Responder> {
    let fields = payload.into_inner().into_fields()?;
    let employee = store::employee::insert(pool.get_ref(), &fields).await?;

    info!(employee_id = employee.id, "Employee created");
    Ok(HttpResponse::Created().json(employee))
}

/// List employees, ordered by last name
#[utoipa::path(
    get,
    path = "/api/employee",
    responses((status = 200, description = "All employees", body = [Employee])),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn list_employees(
    _auth: AuthUser,
    pool: web::Data<SqlitePool>,
) -> AppResult<impl Responder> {
    let employees = store::employee::list(pool.get_ref()).await?;
    Ok(web::Json(employees))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/employee/{employee_id}",
    params(("employee_id", Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn get_employee(
    _auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> AppResult<impl Responder> {
    let employee = store::employee::find(pool.get_ref(), path.into_inner()).await?;
    Ok(web::Json(employee))
}

/// Update Employee
#[utoipa::path(
    put,
    path = "/api/employee/{employee_id}",
    params(("employee_id", Path, description = "Employee ID")),
    request_body = EmployeePayload,
    responses(
        (status = 200, description = "Employee updated", body = Employee),
        (status = 400, description = "Missing field or malformed date"),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Employee code already exists")
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
#[instrument(skip(pool, path, payload), fields(operator = auth.user_id))]
pub async fn update_employee(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    payload: web::Json<EmployeePayload>,
) -> AppResult<impl Responder> {
    let employee_id = path.into_inner();
    let fields = payload.into_inner().into_fields()?;

    let employee = store::employee::update(pool.get_ref(), employee_id, &fields).await?;

    info!(employee_id, "Employee updated");
    Ok(web::Json(employee))
}

/// Year-to-date totals through a period end
#[utoipa::path(
    get,
    path = "/api/employee/{employee_id}/ytd",
    params(("employee_id", Path, description = "Employee ID"), YtdQuery),
    responses(
        (
            status = 200,
            description = "Totals from 1 January through period_end",
            body = EmployeeYtdResponse
        ),
        (status = 400, description = "period_end missing or malformed"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn employee_ytd(
    _auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    query: web::Query<YtdQuery>,
) -> AppResult<impl Responder> {
    let employee = store::employee::find(pool.get_ref(), path.into_inner()).await?;
    let period_end = require_iso_date("period_end", query.period_end.as_deref())?;

    let totals = store::payslip::ytd(pool.get_ref(), employee.id, period_end).await?;
    let (from, to) = crate::payroll::ytd::window(period_end);

    Ok(web::Json(EmployeeYtdResponse {
        employee_id: employee.id,
        from,
        to,
        totals,
    }))
}
