use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::model::employee::Employee;

/// Validated employee fields, used for both create and full-overwrite update.
#[derive(Debug, Clone)]
pub struct EmployeeFields {
    pub employee_code: String,
    pub first_name: String,
    pub last_name: String,
    pub department: String,
    pub position: String,
    pub email: String,
    pub nis_number: Option<String>,
    pub tax_reference: Option<String>,
    pub bank_name: Option<String>,
    pub bank_account: Option<String>,
    /// On update, `None` keeps the stored date of birth.
    pub date_of_birth: Option<NaiveDate>,
}

pub async fn insert(pool: &SqlitePool, fields: &EmployeeFields) -> AppResult<Employee> {
    let employee = sqlx::query_as::<_, Employee>(
        r#"
        INSERT INTO employees
        (employee_code, first_name, last_name, department, position, email,
         nis_number, tax_reference, bank_name, bank_account, date_of_birth)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&fields.employee_code)
    .bind(&fields.first_name)
    .bind(&fields.last_name)
    .bind(&fields.department)
    .bind(&fields.position)
    .bind(&fields.email)
    .bind(&fields.nis_number)
    .bind(&fields.tax_reference)
    .bind(&fields.bank_name)
    .bind(&fields.bank_account)
    .bind(fields.date_of_birth)
    .fetch_one(pool)
    .await?;

    debug!(employee_id = employee.id, code = %employee.employee_code, "Employee created");
    Ok(employee)
}

pub async fn find(pool: &SqlitePool, employee_id: i64) -> AppResult<Employee> {
    sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = ?")
        .bind(employee_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("Employee"))
}

/// All employees ordered by last name.
pub async fn list(pool: &SqlitePool) -> AppResult<Vec<Employee>> {
    let employees = sqlx::query_as::<_, Employee>(
        "SELECT * FROM employees ORDER BY last_name, first_name, id",
    )
    .fetch_all(pool)
    .await?;

    Ok(employees)
}

pub async fn update(
    pool: &SqlitePool,
    employee_id: i64,
    fields: &EmployeeFields,
) -> AppResult<Employee> {
    sqlx::query_as::<_, Employee>(
        r#"
        UPDATE employees
        SET employee_code = ?, first_name = ?, last_name = ?, department = ?, position = ?,
            email = ?, nis_number = ?, tax_reference = ?, bank_name = ?, bank_account = ?,
            date_of_birth = COALESCE(?, date_of_birth)
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(&fields.employee_code)
    .bind(&fields.first_name)
    .bind(&fields.last_name)
    .bind(&fields.department)
    .bind(&fields.position)
    .bind(&fields.email)
    .bind(&fields.nis_number)
    .bind(&fields.tax_reference)
    .bind(&fields.bank_name)
    .bind(&fields.bank_account)
    .bind(fields.date_of_birth)
    .bind(employee_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Employee"))
}

#[cfg(test)]
pub(crate) fn sample_fields(code: &str) -> EmployeeFields {
    EmployeeFields {
        employee_code: code.to_string(),
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        department: "Operations".to_string(),
        position: "Guard".to_string(),
        email: "jane.doe@example.com".to_string(),
        nis_number: Some("A123456".to_string()),
        tax_reference: None,
        bank_name: None,
        bank_account: None,
        date_of_birth: NaiveDate::from_ymd_opt(1981, 4, 2),
    }
}
