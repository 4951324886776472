use crate::api::dashboard::Dashboard;
use crate::api::employee::{EmployeePayload, EmployeeYtdResponse, YtdQuery};
use crate::api::payslip::{CreatePayslip, EditPayslip, PayslipView};
use crate::auth::handlers::LoginResponse;
use crate::model::{employee::Employee, payslip::Payslip, role::Role, user::User};
use crate::models::{CreateUserReq, LoginReqDto};
use crate::payroll::{statement::PayStatement, ytd::YtdTotals};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Payroll API",
        version = "1.0.0",
        description = r#"
## Payroll

Back office for a small company's payroll clerks.

### 🔹 Key Features
- **Employees**
  - Register, edit, list and view employee records
- **Payslips**
  - Compute social insurance and income tax from a pay period's figures
  - Edit stored figures, recompute on demand
  - Year-to-date totals and printable statement data
- **Dashboard**
  - Employee roster and the latest payslips

### 💷 Deductions
- Social insurance: 5.6% of gross for employees under 60
- Income tax: 28% of gross above 130,000 per period

### 🔐 Security
Every `/api` endpoint requires a **JWT Bearer** access token from `/auth/login`.
Only **Admin** operators may create accounts.

### 📦 Response Format
- JSON bodies; money is sent as decimal strings
- Errors are `{ "error": "message" }`
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::refresh_token,
        crate::auth::handlers::logout,
        crate::auth::handlers::me,

        crate::api::user::create_user,
        crate::api::dashboard::dashboard,

        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,
        crate::api::employee::employee_ytd,

        crate::api::payslip::create_payslip,
        crate::api::payslip::list_employee_payslips,
        crate::api::payslip::get_payslip,
        crate::api::payslip::update_payslip,
        crate::api::payslip::recompute_payslip,
        crate::api::payslip::payslip_statement
    ),
    components(
        schemas(
            LoginReqDto,
            LoginResponse,
            CreateUserReq,
            User,
            Role,
            Dashboard,
            Employee,
            EmployeePayload,
            YtdQuery,
            EmployeeYtdResponse,
            Payslip,
            CreatePayslip,
            EditPayslip,
            PayslipView,
            PayStatement,
            YtdTotals
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Sessions and tokens"),
        (name = "Users", description = "Operator accounts"),
        (name = "Dashboard", description = "Landing overview"),
        (name = "Employee", description = "Employee records"),
        (name = "Payslip", description = "Payslip computation and statements"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let doc = ApiDoc::openapi();

        for path in [
            "/auth/login",
            "/api/employee/{employee_id}/payslips",
            "/api/payslip/{payslip_id}/statement",
            "/api/employee/{employee_id}/ytd",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }

        let schemes = &doc.components.unwrap().security_schemes;
        assert!(schemes.contains_key("bearer_auth"));
    }
}
