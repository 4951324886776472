use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::model::payslip::Payslip;
use crate::payroll::calculator::{PayBreakdown, PayInputs};
use crate::payroll::ytd::{self, YtdTotals};

/// A freshly computed payslip, ready to persist.
#[derive(Debug, Clone)]
pub struct NewPayslip {
    pub employee_id: i64,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub inputs: PayInputs,
    pub pay: PayBreakdown,
    pub created_by: Option<i64>,
}

/// Operator-entered overwrite of a stored payslip. Nothing is recomputed.
#[derive(Debug, Clone)]
pub struct PayslipEdit {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub inputs: PayInputs,
    pub tax: Decimal,
    pub social_insurance: Decimal,
    pub other_deductions: Decimal,
    pub net_pay: Decimal,
}

fn text(amount: Decimal) -> String {
    amount.to_string()
}

pub async fn insert(pool: &SqlitePool, slip: &NewPayslip) -> AppResult<Payslip> {
    let payslip = sqlx::query_as::<_, Payslip>(
        r#"
        INSERT INTO payslips
        (employee_id, period_start, period_end, basic_pay, overtime_pay, allowances,
         hours_worked, rate_per_hour, tax, social_insurance, other_deductions, net_pay,
         created_by, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, '0', ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(slip.employee_id)
    .bind(slip.period_start)
    .bind(slip.period_end)
    .bind(text(slip.inputs.basic))
    .bind(text(slip.inputs.overtime))
    .bind(text(slip.inputs.allowances))
    .bind(text(slip.inputs.hours_worked))
    .bind(text(slip.inputs.rate_per_hour))
    .bind(text(slip.pay.tax))
    .bind(text(slip.pay.social_insurance))
    .bind(text(slip.pay.net))
    .bind(slip.created_by)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    debug!(payslip_id = payslip.id, employee_id = payslip.employee_id, "Payslip created");
    Ok(payslip)
}

pub async fn find(pool: &SqlitePool, payslip_id: i64) -> AppResult<Payslip> {
    sqlx::query_as::<_, Payslip>("SELECT * FROM payslips WHERE id = ?")
        .bind(payslip_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("Payslip"))
}

/// Newest first, by creation time.
pub async fn recent(pool: &SqlitePool, limit: i64) -> AppResult<Vec<Payslip>> {
    let payslips = sqlx::query_as::<_, Payslip>(
        "SELECT * FROM payslips ORDER BY created_at DESC, id DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(payslips)
}

pub async fn list_for_employee(pool: &SqlitePool, employee_id: i64) -> AppResult<Vec<Payslip>> {
    let payslips = sqlx::query_as::<_, Payslip>(
        "SELECT * FROM payslips WHERE employee_id = ? ORDER BY period_end DESC, id DESC",
    )
    .bind(employee_id)
    .fetch_all(pool)
    .await?;

    Ok(payslips)
}

pub async fn update(pool: &SqlitePool, payslip_id: i64, edit: &PayslipEdit) -> AppResult<Payslip> {
    sqlx::query_as::<_, Payslip>(
        r#"
        UPDATE payslips
        SET period_start = ?, period_end = ?, basic_pay = ?, overtime_pay = ?, allowances = ?,
            hours_worked = ?, rate_per_hour = ?, tax = ?, social_insurance = ?,
            other_deductions = ?, net_pay = ?
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(edit.period_start)
    .bind(edit.period_end)
    .bind(text(edit.inputs.basic))
    .bind(text(edit.inputs.overtime))
    .bind(text(edit.inputs.allowances))
    .bind(text(edit.inputs.hours_worked))
    .bind(text(edit.inputs.rate_per_hour))
    .bind(text(edit.tax))
    .bind(text(edit.social_insurance))
    .bind(text(edit.other_deductions))
    .bind(text(edit.net_pay))
    .bind(payslip_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Payslip"))
}

/// Overwrite the calculator-owned columns; other deductions stay as entered.
pub async fn store_breakdown(
    pool: &SqlitePool,
    payslip_id: i64,
    pay: &PayBreakdown,
) -> AppResult<Payslip> {
    sqlx::query_as::<_, Payslip>(
        "UPDATE payslips SET tax = ?, social_insurance = ?, net_pay = ? WHERE id = ? RETURNING *",
    )
    .bind(text(pay.tax))
    .bind(text(pay.social_insurance))
    .bind(text(pay.net))
    .bind(payslip_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Payslip"))
}

/// Payslips whose period end falls inside `[from, to]`.
pub async fn in_window(
    pool: &SqlitePool,
    employee_id: i64,
    from: NaiveDate,
    to: NaiveDate,
) -> AppResult<Vec<Payslip>> {
    let payslips = sqlx::query_as::<_, Payslip>(
        "SELECT * FROM payslips WHERE employee_id = ? AND period_end >= ? AND period_end <= ?",
    )
    .bind(employee_id)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    Ok(payslips)
}

/// Year-to-date totals for an employee through `period_end`.
pub async fn ytd(
    pool: &SqlitePool,
    employee_id: i64,
    period_end: NaiveDate,
) -> AppResult<YtdTotals> {
    let (from, to) = ytd::window(period_end);
    let payslips = in_window(pool, employee_id, from, to).await?;

    Ok(YtdTotals::from_payslips(&payslips))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::payroll::calculator::compute;
    use crate::store::employee::{self, sample_fields};
    use chrono::Datelike;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn new_slip(employee_id: i64, end: NaiveDate, basic: Decimal) -> NewPayslip {
        let inputs = PayInputs {
            basic,
            ..Default::default()
        };

        NewPayslip {
            employee_id,
            period_start: end.with_day(1).unwrap(),
            period_end: end,
            inputs,
            pay: compute(Some(45), &inputs),
            created_by: None,
        }
    }

    #[actix_web::test]
    async fn test_insert_round_trips_exact_amounts() {
        let pool = test_pool().await;
        let emp = employee::insert(&pool, &sample_fields("EMP-001")).await.unwrap();

        let slip = insert(&pool, &new_slip(emp.id, date(2026, 1, 31), dec!(100000))).await.unwrap();
        let stored = find(&pool, slip.id).await.unwrap();

        assert_eq!(stored, slip);
        assert_eq!(stored.social_insurance, dec!(5600.00));
        assert_eq!(stored.net_pay, dec!(94400.00));
        assert_eq!(stored.other_deductions, Decimal::ZERO);
        assert_eq!(stored.gross(), dec!(100000));
    }

    #[actix_web::test]
    async fn test_payslip_requires_existing_employee() {
        let pool = test_pool().await;

        let err = insert(&pool, &new_slip(99, date(2026, 1, 31), dec!(1))).await.unwrap_err();
        assert_eq!(err.to_string(), "Referenced record does not exist or is still referenced");
        assert!(matches!(find(&pool, 1).await, Err(AppError::NotFound("Payslip"))));
    }

    #[actix_web::test]
    async fn test_ytd_window_edges() {
        let pool = test_pool().await;
        let emp = employee::insert(&pool, &sample_fields("EMP-001")).await.unwrap();
        let other = employee::insert(&pool, &sample_fields("EMP-002")).await.unwrap();

        for (end, basic) in [
            (date(2025, 12, 31), dec!(1)),    // previous year
            (date(2026, 1, 1), dec!(10)),     // first day of window
            (date(2026, 6, 30), dec!(100)),   // inside
            (date(2026, 7, 31), dec!(1000)),  // query date itself
            (date(2026, 8, 31), dec!(10000)), // after query date
        ] {
            insert(&pool, &new_slip(emp.id, end, basic)).await.unwrap();
        }
        insert(&pool, &new_slip(other.id, date(2026, 3, 31), dec!(99999))).await.unwrap();

        let totals = ytd(&pool, emp.id, date(2026, 7, 31)).await.unwrap();

        assert_eq!(totals.basic_pay, dec!(1110));
        assert_eq!(totals.social_insurance, dec!(62.16));
    }

    #[actix_web::test]
    async fn test_ytd_without_payslips_is_zero() {
        let pool = test_pool().await;
        let emp = employee::insert(&pool, &sample_fields("EMP-001")).await.unwrap();

        let totals = ytd(&pool, emp.id, date(2026, 12, 31)).await.unwrap();
        assert_eq!(totals, YtdTotals::default());
    }

    #[actix_web::test]
    async fn test_edit_overwrites_without_recomputing() {
        let pool = test_pool().await;
        let emp = employee::insert(&pool, &sample_fields("EMP-001")).await.unwrap();
        let slip = insert(&pool, &new_slip(emp.id, date(2026, 1, 31), dec!(100000))).await.unwrap();

        let edit = PayslipEdit {
            period_start: date(2026, 2, 1),
            period_end: date(2026, 2, 28),
            inputs: PayInputs {
                basic: dec!(200000),
                ..Default::default()
            },
            tax: dec!(1),
            social_insurance: dec!(2),
            other_deductions: dec!(3),
            net_pay: dec!(4),
        };

        let edited = update(&pool, slip.id, &edit).await.unwrap();

        assert_eq!(edited.basic_pay, dec!(200000));
        assert_eq!(edited.tax, dec!(1));
        assert_eq!(edited.net_pay, dec!(4));
        assert_eq!(edited.period_end, date(2026, 2, 28));
        assert_eq!(edited.created_at, slip.created_at);

        let recomputed = store_breakdown(&pool, slip.id, &compute(None, &edited.inputs()))
            .await
            .unwrap();
        assert_eq!(recomputed.tax, dec!(19600.00));
        assert_eq!(recomputed.social_insurance, Decimal::ZERO);
        assert_eq!(recomputed.net_pay, dec!(180400.00));
        assert_eq!(recomputed.other_deductions, dec!(3));
    }

    #[actix_web::test]
    async fn test_recent_is_newest_first_and_limited() {
        let pool = test_pool().await;
        let emp = employee::insert(&pool, &sample_fields("EMP-001")).await.unwrap();

        let mut ids = Vec::new();
        for month in 1..=12 {
            let end = date(2026, month, 28);
            ids.push(insert(&pool, &new_slip(emp.id, end, dec!(1))).await.unwrap().id);
        }

        let recent = recent(&pool, 10).await.unwrap();
        let recent_ids: Vec<_> = recent.iter().map(|p| p.id).collect();

        ids.reverse();
        assert_eq!(recent_ids, ids[..10].to_vec());
    }
}
