use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, require_admin_role,
    require_employee_role, require_superadmin_role, require_user_auth,
    security_headers_middleware, trace_id, RateLimiterState,
};
use crate::routes::{
    auth, dashboard, employees, files, forms, health, profile, reports, sites, superadmin, tasks,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
}

pub fn create_app(config: Config, pool: PgPool) -> Router {
    let config = Arc::new(config);

    // Create rate limiter if rate limiting is enabled (rate_limit_per_minute > 0)
    let rate_limiter = if config.security.rate_limit_per_minute > 0 {
        Some(Arc::new(RateLimiterState::new(
            config.security.rate_limit_per_minute,
        )))
    } else {
        None
    };

    let state = AppState {
        pool,
        config: config.clone(),
        rate_limiter,
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // Production: only allow specified origins
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Authentication routes (no bearer token required)
    let auth_routes = Router::new()
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/refresh", post(auth::refresh))
        .route("/api/v1/auth/forgot-password", post(auth::forgot_password))
        .route("/api/v1/auth/reset-password", post(auth::reset_password));

    // Admin panel routes (admin or superadmin)
    // Middleware order: auth runs first, then the role check, then rate limiting
    let panel_routes = Router::new()
        .route("/api/v1/panel/dashboard", get(dashboard::panel_dashboard))
        // Task assignment
        .route(
            "/api/v1/panel/tasks",
            get(tasks::list_tasks).post(tasks::assign_task),
        )
        .route("/api/v1/panel/tasks/import", post(tasks::import_tasks))
        .route("/api/v1/panel/tasks/:task_code", delete(tasks::delete_task))
        // Employee management
        .route(
            "/api/v1/panel/employees",
            get(employees::list_employees).post(employees::create_employee),
        )
        .route(
            "/api/v1/panel/employees/import",
            post(employees::import_employees),
        )
        .route(
            "/api/v1/panel/employees/export",
            get(employees::export_employees),
        )
        .route(
            "/api/v1/panel/employees/:id",
            get(employees::get_employee)
                .put(employees::update_employee)
                .delete(employees::delete_employee),
        )
        .route(
            "/api/v1/panel/employees/:id/suspend",
            post(employees::suspend_employee),
        )
        .route(
            "/api/v1/panel/employees/:id/activate",
            post(employees::activate_employee),
        )
        // Site catalogue
        .route("/api/v1/panel/sites", get(sites::list_sites))
        .route("/api/v1/panel/sites/import", post(sites::import_sites))
        .route("/api/v1/panel/sites/export", get(sites::export_sites))
        // Report review
        .route("/api/v1/panel/reports", get(reports::list_reports))
        .route("/api/v1/panel/reports/:id", get(reports::get_report))
        .route(
            "/api/v1/panel/reports/:id/review",
            post(reports::review_report),
        )
        .route(
            "/api/v1/panel/reports/:id/export/csv",
            get(reports::export_report_csv),
        )
        .route(
            "/api/v1/panel/reports/:id/export/pdf",
            get(reports::export_report_pdf),
        )
        // Form templates
        .route(
            "/api/v1/panel/forms/:group",
            get(forms::get_template).post(forms::upload_template),
        )
        .route(
            "/api/v1/panel/forms/:group/export",
            get(forms::export_template),
        )
        // Own profile
        .route(
            "/api/v1/panel/profile",
            get(profile::get_profile).put(profile::update_profile),
        )
        .route(
            "/api/v1/panel/change-password",
            post(profile::change_password),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .route_layer(middleware::from_fn(require_admin_role))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_user_auth,
        ));

    // Field employee routes
    let employee_routes = Router::new()
        .route(
            "/api/v1/employee/dashboard",
            get(dashboard::employee_dashboard),
        )
        .route("/api/v1/employee/tasks", get(tasks::my_tasks))
        .route(
            "/api/v1/employee/reports",
            get(reports::my_reports).post(reports::submit_report),
        )
        .route("/api/v1/employee/reports/:id", get(reports::my_report))
        .route(
            "/api/v1/employee/reports/:id/files",
            post(reports::upload_report_file),
        )
        .route(
            "/api/v1/employee/profile",
            get(profile::get_profile).put(profile::update_profile),
        )
        .route(
            "/api/v1/employee/change-password",
            post(profile::change_password),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .route_layer(middleware::from_fn(require_employee_role))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_user_auth,
        ));

    // Superadmin routes
    let superadmin_routes = Router::new()
        .route("/api/v1/superadmin/dashboard", get(superadmin::dashboard))
        .route(
            "/api/v1/superadmin/statewise",
            get(superadmin::statewise_summary),
        )
        .route(
            "/api/v1/superadmin/admins",
            get(superadmin::list_admins).post(superadmin::create_admin),
        )
        .route(
            "/api/v1/superadmin/admins/:id",
            put(superadmin::update_admin).delete(superadmin::deactivate_admin),
        )
        .route(
            "/api/v1/superadmin/employees",
            get(superadmin::list_employees).post(superadmin::create_employee),
        )
        .route(
            "/api/v1/superadmin/employees/:id",
            put(superadmin::update_employee).delete(superadmin::delete_employee),
        )
        .route(
            "/api/v1/superadmin/conflicts",
            get(superadmin::list_conflicts),
        )
        .route(
            "/api/v1/superadmin/conflicts/:id/resolve",
            post(superadmin::resolve_conflict),
        )
        .route("/api/v1/superadmin/tasks", get(superadmin::list_tasks))
        .route(
            "/api/v1/superadmin/profile",
            get(profile::get_profile).put(profile::update_profile),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .route_layer(middleware::from_fn(require_superadmin_role))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_user_auth,
        ));

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler))
        .route("/media/*path", get(files::serve_media));

    // Merge all routes
    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(panel_routes)
        .merge(employee_routes)
        .merge(superadmin_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn(security_headers_middleware)) // Security headers
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(middleware::from_fn(metrics_middleware)) // Prometheus metrics
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id)) // Request ID and logging
        .layer(cors)
        .with_state(state)
}
