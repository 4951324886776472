use crate::{
    api::{dashboard, employee, payslip, user},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
    error::AppError,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let requests_per_min = requests_per_min.max(1);
        let per_ms = (60_000 / u64::from(requests_per_min)).max(1);

        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .expect("period and burst size are clamped to non-zero values");
        Governor::new(&cfg)
    }

    // malformed bodies, queries and paths are validation failures
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _| AppError::validation(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _| AppError::validation(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _| AppError::validation(err.to_string()).into()),
    );

    // Public routes
    cfg.service(
        web::scope("/auth")
            .wrap(build_limiter(config.rate_login_per_min))
            .route("/login", web::post().to(handlers::login))
            .route("/refresh", web::post().to(handlers::refresh_token))
            .route("/logout", web::post().to(handlers::logout)),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            .route("/me", web::get().to(handlers::me))
            .route("/dashboard", web::get().to(dashboard::dashboard))
            .route("/users", web::post().to(user::create_user))
            .service(
                web::scope("/employee")
                    // /employee
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    // /employee/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(employee::get_employee))
                            .route(web::put().to(employee::update_employee)),
                    )
                    // /employee/{id}/ytd?period_end=
                    .service(
                        web::resource("/{id}/ytd").route(web::get().to(employee::employee_ytd)),
                    )
                    // /employee/{id}/payslips
                    .service(
                        web::resource("/{id}/payslips")
                            .route(web::get().to(payslip::list_employee_payslips))
                            .route(web::post().to(payslip::create_payslip)),
                    ),
            )
            .service(
                web::scope("/payslip")
                    // /payslip/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(payslip::get_payslip))
                            .route(web::put().to(payslip::update_payslip)),
                    )
                    .service(
                        web::resource("/{id}/recompute")
                            .route(web::post().to(payslip::recompute_payslip)),
                    )
                    .service(
                        web::resource("/{id}/statement")
                            .route(web::get().to(payslip::payslip_statement)),
                    ),
            ),
    );
}

// LOGIN
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days)

// API REQUEST
//  └─ Authorization: Bearer access_token

// ACCESS EXPIRED
//  └─ POST /auth/refresh with refresh_token
//       └─ returns new access_token + rotated refresh_token
