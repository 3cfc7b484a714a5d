//! Test helpers for inbound HTTP components.

use std::collections::HashMap;
use std::sync::Arc;

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use serde_json::{Value, json};

use crate::Trace;
use crate::domain::test_fixtures::fixture_clock;
use crate::domain::{Role, UserId};
use crate::inbound::http::configure_api;
use crate::inbound::http::error::json_config;
use crate::inbound::http::state::{HttpState, Repositories};
use crate::test_support::{InMemoryRepairDesk, seed_user};

/// Password shared by every seeded account.
pub const PASSWORD: &str = "correct horse";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Extract the session cookie a response set.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}

const SEED_USERS: &[(&str, Role, &str)] = &[
    ("admin", Role::Administrator, "Администратор Системы"),
    ("manager", Role::Manager, "Менеджер Анна"),
    ("quality", Role::QualityManager, "Контролёр Качества"),
    ("tech", Role::Technician, "Кузнецов Олег"),
    ("tech2", Role::Technician, "Петров Пётр"),
    ("operator", Role::Operator, "Оператор Ольга"),
    ("customer", Role::Customer, "Иванов Иван"),
];

/// In-memory desk with one account per role and the clock pinned to
/// 2024-01-15.
pub struct TestDesk {
    pub store: InMemoryRepairDesk,
    pub state: HttpState,
    ids: HashMap<&'static str, UserId>,
}

impl TestDesk {
    pub async fn new() -> Self {
        let store = InMemoryRepairDesk::new();
        let mut ids = HashMap::new();
        for (username, role, full_name) in SEED_USERS {
            let user = seed_user(&store, username, PASSWORD, *role, full_name)
                .await
                .expect("seed user");
            ids.insert(*username, user.id);
        }

        let shared = Arc::new(store.clone());
        let state = HttpState::from_repositories(
            Repositories {
                users: shared.clone(),
                requests: shared.clone(),
                ledger: shared.clone(),
                comments: shared,
            },
            fixture_clock(2024, 1, 15),
            3,
        );
        Self { store, state, ids }
    }

    /// Id of a seeded account.
    pub fn user_id(&self, username: &str) -> UserId {
        *self.ids.get(username).expect("seeded username")
    }

    /// Log a seeded account in and return its session cookie.
    pub async fn login<S, B>(&self, app: &S, username: &str) -> Cookie<'static>
    where
        S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    {
        let res = test::call_service(
            app,
            test::TestRequest::post()
                .uri("/api/v1/login")
                .set_json(json!({ "username": username, "password": PASSWORD }))
                .to_request(),
        )
        .await;
        assert!(res.status().is_success(), "login failed for {username}");
        session_cookie(&res)
    }
}

/// Send `req` with `cookie` and decode the JSON body (`Null` when empty).
pub async fn send<S, B>(
    app: &S,
    req: test::TestRequest,
    cookie: &Cookie<'static>,
) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = test::call_service(app, req.cookie(cookie.clone()).to_request()).await;
    let status = res.status();
    let body = test::read_body(res).await;
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("json body")
    };
    (status, json)
}

/// Full API app over `state`, with the test session middleware.
pub fn api_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .app_data(json_config())
        .wrap(Trace)
        .service(
            web::scope("/api/v1")
                .wrap(test_session_middleware())
                .configure(configure_api),
        )
}
