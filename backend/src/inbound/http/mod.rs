//! HTTP inbound adapter exposing the REST API under `/api/v1`.

use actix_web::web;

pub mod auth;
pub mod comments;
pub mod error;
pub mod health;
pub mod quality;
pub mod requests;
pub mod session;
pub mod session_config;
pub mod state;
pub mod statistics;
#[cfg(test)]
pub mod test_utils;
pub mod users;

pub use error::ApiResult;

/// Register every API handler; the caller supplies the scope and session
/// middleware.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use repair_desk::inbound::http::configure_api;
///
/// let app = App::new().service(web::scope("/api/v1").configure(configure_api));
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::login)
        .service(auth::logout)
        .service(auth::me)
        .service(requests::list_requests)
        .service(requests::create_request)
        .service(requests::get_request)
        .service(requests::change_status)
        .service(requests::status_history)
        .service(requests::assign_technician)
        .service(requests::assigned_tasks)
        .service(comments::list_comments)
        .service(comments::add_comment)
        .service(quality::quality_overview)
        .service(quality::problem_requests)
        .service(quality::extend_deadline)
        .service(quality::engage_specialist)
        .service(statistics::statistics)
        .service(users::list_users)
        .service(users::create_user)
        .service(users::update_user)
        .service(users::delete_user)
        .service(users::list_technicians);
}
