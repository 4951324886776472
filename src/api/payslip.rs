use actix_web::{HttpResponse, Responder, web};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::{
    auth::auth::AuthUser,
    config::Config,
    error::AppResult,
    model::{employee::Employee, payslip::Payslip},
    payroll::{
        calculator::{PayInputs, compute},
        statement::PayStatement,
        ytd::YtdTotals,
    },
    store::{
        self,
        payslip::{NewPayslip, PayslipEdit},
    },
    utils::{
        amount::lenient_amount,
        date::{ensure_period, require_iso_date},
    },
};

/// Raw figures for a new payslip. Amounts accept numbers or numeric text;
/// anything else, or a missing value, counts as zero.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePayslip {
    #[schema(example = "2026-01-01", format = "date")]
    pub period_start: Option<String>,
    #[schema(example = "2026-01-31", format = "date")]
    pub period_end: Option<String>,

    #[serde(default, deserialize_with = "lenient_amount")]
    #[schema(value_type = f64, example = 100000)]
    pub basic_pay: Decimal,
    #[serde(default, deserialize_with = "lenient_amount")]
    #[schema(value_type = f64, example = 0)]
    pub overtime_pay: Decimal,
    #[serde(default, deserialize_with = "lenient_amount")]
    #[schema(value_type = f64, example = 0)]
    pub allowances: Decimal,
    #[serde(default, deserialize_with = "lenient_amount")]
    #[schema(value_type = f64, example = 0)]
    pub hours_worked: Decimal,
    #[serde(default, deserialize_with = "lenient_amount")]
    #[schema(value_type = f64, example = 0)]
    pub rate_per_hour: Decimal,
}

/// Every stored value as the operator wants it. Deductions and net pay are
/// taken verbatim; nothing is recomputed.
#[derive(Debug, Deserialize, ToSchema)]
pub struct EditPayslip {
    #[schema(example = "2026-01-01", format = "date")]
    pub period_start: Option<String>,
    #[schema(example = "2026-01-31", format = "date")]
    pub period_end: Option<String>,

    #[serde(default, deserialize_with = "lenient_amount")]
    #[schema(value_type = f64)]
    pub basic_pay: Decimal,
    #[serde(default, deserialize_with = "lenient_amount")]
    #[schema(value_type = f64)]
    pub overtime_pay: Decimal,
    #[serde(default, deserialize_with = "lenient_amount")]
    #[schema(value_type = f64)]
    pub allowances: Decimal,
    #[serde(default, deserialize_with = "lenient_amount")]
    #[schema(value_type = f64)]
    pub hours_worked: Decimal,
    #[serde(default, deserialize_with = "lenient_amount")]
    #[schema(value_type = f64)]
    pub rate_per_hour: Decimal,
    #[serde(default, deserialize_with = "lenient_amount")]
    #[schema(value_type = f64)]
    pub tax: Decimal,
    #[serde(default, deserialize_with = "lenient_amount")]
    #[schema(value_type = f64)]
    pub social_insurance: Decimal,
    #[serde(default, deserialize_with = "lenient_amount")]
    #[schema(value_type = f64)]
    pub other_deductions: Decimal,
    #[serde(default, deserialize_with = "lenient_amount")]
    #[schema(value_type = f64)]
    pub net_pay: Decimal,
}

#[derive(Serialize, ToSchema)]
pub struct PayslipView {
    pub payslip: Payslip,
    pub employee: Employee,
    #[schema(value_type = String)]
    pub gross: Decimal,
    /// Totals from 1 January through this payslip's period end
    pub ytd: YtdTotals,
}

async fn view(pool: &SqlitePool, payslip: Payslip) -> AppResult<PayslipView> {
    let employee = store::employee::find(pool, payslip.employee_id).await?;
    let ytd = store::payslip::ytd(pool, payslip.employee_id, payslip.period_end).await?;

    Ok(PayslipView {
        gross: payslip.gross(),
        payslip,
        employee,
        ytd,
    })
}

/// Compute and store a payslip
#[utoipa::path(
    post,
    path = "/api/employee/{employee_id}/payslips",
    params(("employee_id", Path, description = "Employee ID")),
    request_body = CreatePayslip,
    responses(
        (status = 201, description = "Payslip computed and stored", body = PayslipView),
        (status = 400, description = "Period dates missing, malformed or reversed"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Payslip",
    security(("bearer_auth" = []))
)]
#[instrument(skip(pool, path, payload), fields(operator = auth.user_id))]
pub async fn create_payslip(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    payload: web::Json<CreatePayslip>,
) -> AppResult<impl Responder> {
    let employee = store::employee::find(pool.get_ref(), path.into_inner()).await?;

    let period_start = require_iso_date("period_start", payload.period_start.as_deref())?;
    let period_end = require_iso_date("period_end", payload.period_end.as_deref())?;
    ensure_period(period_start, period_end)?;

    let inputs = PayInputs {
        basic: payload.basic_pay,
        overtime: payload.overtime_pay,
        allowances: payload.allowances,
        hours_worked: payload.hours_worked,
        rate_per_hour: payload.rate_per_hour,
    };
    let pay = compute(employee.age(), &inputs);

    let payslip = store::payslip::insert(
        pool.get_ref(),
        &NewPayslip {
            employee_id: employee.id,
            period_start,
            period_end,
            inputs,
            pay,
            created_by: Some(auth.user_id),
        },
    )
    .await?;

    info!(payslip_id = payslip.id, employee_id = employee.id, net = %pay.net, "Payslip created");
    Ok(HttpResponse::Created().json(view(pool.get_ref(), payslip).await?))
}

/// Payslips of one employee, latest period first
#[utoipa::path(
    get,
    path = "/api/employee/{employee_id}/payslips",
    params(("employee_id", Path, description = "Employee ID")),
    responses(
        (status = 200, body = [Payslip]),
        (status = 404, description = "Employee not found")
    ),
    tag = "Payslip",
    security(("bearer_auth" = []))
)]
pub async fn list_employee_payslips(
    _auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> AppResult<impl Responder> {
    let employee = store::employee::find(pool.get_ref(), path.into_inner()).await?;
    let payslips = store::payslip::list_for_employee(pool.get_ref(), employee.id).await?;

    Ok(web::Json(payslips))
}

/// Payslip with year-to-date totals
#[utoipa::path(
    get,
    path = "/api/payslip/{payslip_id}",
    params(("payslip_id", Path, description = "Payslip ID")),
    responses(
        (status = 200, body = PayslipView),
        (status = 404, description = "Payslip not found")
    ),
    tag = "Payslip",
    security(("bearer_auth" = []))
)]
pub async fn get_payslip(
    _auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> AppResult<impl Responder> {
    let payslip = store::payslip::find(pool.get_ref(), path.into_inner()).await?;
    Ok(web::Json(view(pool.get_ref(), payslip).await?))
}

/// Edit a payslip. Stored values are overwritten as entered.
#[utoipa::path(
    put,
    path = "/api/payslip/{payslip_id}",
    params(("payslip_id", Path, description = "Payslip ID")),
    request_body = EditPayslip,
    responses(
        (status = 200, body = PayslipView),
        (status = 400, description = "Period dates missing, malformed or reversed"),
        (status = 404, description = "Payslip not found")
    ),
    tag = "Payslip",
    security(("bearer_auth" = []))
)]
#[instrument(skip(pool, path, payload), fields(operator = auth.user_id))]
pub async fn update_payslip(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    payload: web::Json<EditPayslip>,
) -> AppResult<impl Responder> {
    let payslip_id = path.into_inner();

    let period_start = require_iso_date("period_start", payload.period_start.as_deref())?;
    let period_end = require_iso_date("period_end", payload.period_end.as_deref())?;
    ensure_period(period_start, period_end)?;

    let edit = PayslipEdit {
        period_start,
        period_end,
        inputs: PayInputs {
            basic: payload.basic_pay,
            overtime: payload.overtime_pay,
            allowances: payload.allowances,
            hours_worked: payload.hours_worked,
            rate_per_hour: payload.rate_per_hour,
        },
        tax: payload.tax,
        social_insurance: payload.social_insurance,
        other_deductions: payload.other_deductions,
        net_pay: payload.net_pay,
    };

    let payslip = store::payslip::update(pool.get_ref(), payslip_id, &edit).await?;

    info!(payslip_id, "Payslip updated");
    Ok(web::Json(view(pool.get_ref(), payslip).await?))
}

/// Re-run the calculator on the stored figures and the employee's current age
#[utoipa::path(
    post,
    path = "/api/payslip/{payslip_id}/recompute",
    params(("payslip_id", Path, description = "Payslip ID")),
    responses(
        (status = 200, body = PayslipView),
        (status = 404, description = "Payslip not found")
    ),
    tag = "Payslip",
    security(("bearer_auth" = []))
)]
#[instrument(skip(pool, path), fields(operator = auth.user_id))]
pub async fn recompute_payslip(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> AppResult<impl Responder> {
    let payslip = store::payslip::find(pool.get_ref(), path.into_inner()).await?;
    let employee = store::employee::find(pool.get_ref(), payslip.employee_id).await?;

    let pay = compute(employee.age(), &payslip.inputs());
    let payslip = store::payslip::store_breakdown(pool.get_ref(), payslip.id, &pay).await?;

    info!(payslip_id = payslip.id, "Payslip recomputed");
    Ok(web::Json(view(pool.get_ref(), payslip).await?))
}

/// Data for the printable pay statement
#[utoipa::path(
    get,
    path = "/api/payslip/{payslip_id}/statement",
    params(("payslip_id", Path, description = "Payslip ID")),
    responses(
        (status = 200, body = PayStatement),
        (status = 404, description = "Payslip not found")
    ),
    tag = "Payslip",
    security(("bearer_auth" = []))
)]
pub async fn payslip_statement(
    _auth: AuthUser,
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
    path: web::Path<i64>,
) -> AppResult<impl Responder> {
    let payslip = store::payslip::find(pool.get_ref(), path.into_inner()).await?;
    let PayslipView { payslip, employee, ytd, .. } = view(pool.get_ref(), payslip).await?;

    Ok(web::Json(PayStatement::new(&config.company_name, employee, payslip, ytd)))
}

#[cfg(test)]
mod tests {
    use actix_web::{App, http::StatusCode, test};
    use chrono::{Datelike, Local, NaiveDate};
    use serde_json::{Value, json};

    use crate::{
        auth::jwt::generate_access_token,
        db::test_pool,
        model::{role::Role, user::User},
        routes,
        store::employee::sample_fields,
    };

    use super::*;

    macro_rules! app {
        ($pool:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($pool.clone()))
                    .app_data(web::Data::new(Config::for_tests()))
                    .configure(|cfg| routes::configure(cfg, Config::for_tests())),
            )
            .await
        };
    }

    async fn operator(pool: &SqlitePool) -> (&'static str, String) {
        let user: User = store::user::insert(pool, "Pat", "pat@example.com", "hash", Role::Clerk)
            .await
            .unwrap();
        let token = generate_access_token(&user, "test-secret", 600).unwrap();
        ("Authorization", format!("Bearer {token}"))
    }

    /// Employee whose age today is `age`.
    async fn employee_aged(pool: &SqlitePool, code: &str, age: Option<i32>) -> Employee {
        let mut fields = sample_fields(code);
        fields.date_of_birth = age.map(|age| {
            let today = Local::now().date_naive();
            NaiveDate::from_ymd_opt(today.year() - age, 1, 1).unwrap()
        });
        store::employee::insert(pool, &fields).await.unwrap()
    }

    fn amount(value: &Value) -> Decimal {
        value.as_str().unwrap().parse().unwrap()
    }

    fn slip_body(end: &str, basic: Value) -> Value {
        json!({
            "period_start": format!("{}-01", &end[..7]),
            "period_end": end,
            "basic_pay": basic,
        })
    }

    #[actix_web::test]
    async fn test_create_computes_deductions() {
        let pool = test_pool().await;
        let auth = operator(&pool).await;
        let young = employee_aged(&pool, "E45", Some(45)).await;
        let senior = employee_aged(&pool, "E65", Some(65)).await;
        let unknown = employee_aged(&pool, "E00", None).await;
        let app = app!(pool);

        for (employee, basic, si, tax, net) in [
            (&young, 100000, "5600.00", "0", "94400.00"),
            (&senior, 150000, "0", "5600.00", "144400.00"),
            (&unknown, 200000, "0", "19600.00", "180400.00"),
        ] {
            let req = test::TestRequest::post()
                .uri(&format!("/api/employee/{}/payslips", employee.id))
                .insert_header(auth.clone())
                .set_json(slip_body("2026-01-31", json!(basic)))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::CREATED);

            let body: Value = test::read_body_json(resp).await;
            let stored = &body["payslip"];

            assert_eq!(amount(&body["gross"]), Decimal::from(basic));
            assert_eq!(amount(&stored["social_insurance"]), si.parse::<Decimal>().unwrap());
            assert_eq!(amount(&stored["tax"]), tax.parse::<Decimal>().unwrap());
            assert_eq!(amount(&stored["net_pay"]), net.parse::<Decimal>().unwrap());
            assert_eq!(stored["other_deductions"], "0");
            assert!(stored["created_by"].is_number());
        }
    }

    #[actix_web::test]
    async fn test_non_numeric_amounts_count_as_zero() {
        let pool = test_pool().await;
        let auth = operator(&pool).await;
        let employee = employee_aged(&pool, "E30", Some(30)).await;
        let app = app!(pool);

        let req = test::TestRequest::post()
            .uri(&format!("/api/employee/{}/payslips", employee.id))
            .insert_header(auth)
            .set_json(json!({
                "period_start": "2026-02-01",
                "period_end": "2026-02-28",
                "basic_pay": "lots",
                "overtime_pay": null,
                "hours_worked": "10",
                "rate_per_hour": 50
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["payslip"]["basic_pay"], "0");
        assert_eq!(body["gross"], "500");
        assert_eq!(body["payslip"]["social_insurance"], "28.00");
    }

    #[actix_web::test]
    async fn test_create_rejects_bad_periods_and_unknown_employee() {
        let pool = test_pool().await;
        let auth = operator(&pool).await;
        let employee = employee_aged(&pool, "E30", Some(30)).await;
        let app = app!(pool);

        for body in [
            json!({ "period_start": "2026-02-01", "period_end": "28.02.2026" }),
            json!({ "period_end": "2026-02-28" }),
            json!({ "period_start": "2026-03-01", "period_end": "2026-02-28" }),
        ] {
            let req = test::TestRequest::post()
                .uri(&format!("/api/employee/{}/payslips", employee.id))
                .insert_header(auth.clone())
                .set_json(body)
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
        }

        let req = test::TestRequest::post()
            .uri("/api/employee/999/payslips")
            .insert_header(auth.clone())
            .set_json(slip_body("2026-02-28", json!(1000)))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get().uri("/api/payslip/999").insert_header(auth).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_edit_keeps_entered_values_until_recompute() {
        let pool = test_pool().await;
        let auth = operator(&pool).await;
        let employee = employee_aged(&pool, "E00", None).await;
        let app = app!(pool);

        let req = test::TestRequest::post()
            .uri(&format!("/api/employee/{}/payslips", employee.id))
            .insert_header(auth.clone())
            .set_json(slip_body("2026-01-31", json!(100000)))
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;
        let id = &created["payslip"]["id"];

        let req = test::TestRequest::put()
            .uri(&format!("/api/payslip/{id}"))
            .insert_header(auth.clone())
            .set_json(json!({
                "period_start": "2026-01-01",
                "period_end": "2026-01-31",
                "basic_pay": 200000,
                "tax": 0,
                "social_insurance": 0,
                "other_deductions": "150.50",
                "net_pay": 100000
            }))
            .to_request();
        let edited: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(edited["payslip"]["basic_pay"], "200000");
        assert_eq!(edited["payslip"]["tax"], "0");
        assert_eq!(edited["payslip"]["net_pay"], "100000");
        assert_eq!(edited["ytd"]["other_deductions"], "150.50");

        let req = test::TestRequest::post()
            .uri(&format!("/api/payslip/{id}/recompute"))
            .insert_header(auth)
            .to_request();
        let recomputed: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(recomputed["payslip"]["tax"], "19600.00");
        assert_eq!(recomputed["payslip"]["net_pay"], "180400.00");
        assert_eq!(recomputed["payslip"]["other_deductions"], "150.50");
    }

    #[actix_web::test]
    async fn test_view_and_statement_include_ytd() {
        let pool = test_pool().await;
        let auth = operator(&pool).await;
        let employee = employee_aged(&pool, "E45", Some(45)).await;
        let app = app!(pool);

        let mut last = Value::Null;
        for end in ["2025-12-31", "2026-01-31", "2026-02-28", "2026-03-31"] {
            let req = test::TestRequest::post()
                .uri(&format!("/api/employee/{}/payslips", employee.id))
                .insert_header(auth.clone())
                .set_json(slip_body(end, json!(1000)))
                .to_request();
            let created: Value = test::call_and_read_body_json(&app, req).await;
            if end == "2026-02-28" {
                last = created["payslip"]["id"].clone();
            }
        }

        let req = test::TestRequest::get()
            .uri(&format!("/api/payslip/{last}"))
            .insert_header(auth.clone())
            .to_request();
        let view: Value = test::call_and_read_body_json(&app, req).await;

        // January and February only
        assert_eq!(view["ytd"]["basic_pay"], "2000");
        assert_eq!(view["ytd"]["social_insurance"], "112.00");

        let req = test::TestRequest::get()
            .uri(&format!("/api/payslip/{last}/statement"))
            .insert_header(auth.clone())
            .to_request();
        let statement: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(statement["filename"], "Payslip_Doe_2026-02-28.pdf");
        assert_eq!(statement["company_name"], "Acme Security");
        assert_eq!(statement["employee_name"], "Jane Doe");
        assert_eq!(statement["ytd"]["net_pay"], "1888.00");

        let req = test::TestRequest::get()
            .uri(&format!("/api/employee/{}/payslips", employee.id))
            .insert_header(auth)
            .to_request();
        let listed: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(listed.len(), 4);
        assert_eq!(listed[0]["period_end"], "2026-03-31");
    }

    #[actix_web::test]
    async fn test_year_to_date_survives_amounts_at_decimal_max() {
        let pool = test_pool().await;
        let auth = operator(&pool).await;
        let employee = employee_aged(&pool, "E00", None).await;
        let app = app!(pool);

        let max = Decimal::MAX.to_string();
        for end in ["2026-01-31", "2026-02-28"] {
            let req = test::TestRequest::post()
                .uri(&format!("/api/employee/{}/payslips", employee.id))
                .insert_header(auth.clone())
                .set_json(slip_body(end, json!(max)))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::CREATED);

            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["ytd"]["basic_pay"], max.as_str());
        }

        let req = test::TestRequest::get()
            .uri(&format!("/api/employee/{}/ytd?period_end=2026-12-31", employee.id))
            .insert_header(auth)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["totals"]["basic_pay"], max.as_str());
    }
}
