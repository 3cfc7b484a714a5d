//! Repair request handlers: intake, lookup, status changes, assignment.
//!
//! ```text
//! GET  /api/v1/requests?q=REQ-2024
//! POST /api/v1/requests {"equipmentType":"Холодильник",...}
//! GET  /api/v1/requests/{id}
//! POST /api/v1/requests/{id}/status {"status":"in_repair"}
//! GET  /api/v1/requests/{id}/history
//! PUT  /api/v1/requests/{id}/assignee {"technicianId":4}
//! GET  /api/v1/tasks
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};

use crate::domain::{
    CustomerLookup, Request, RequestDraft, RequestId, RequestStatus, StatusHistoryView,
    TransitionOutcome, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::current_actor;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Filters for `GET /api/v1/requests`; a customer name wins over `q`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestListQuery {
    pub q: Option<String>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
}

/// Body for `POST /api/v1/requests`.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestBody {
    pub equipment_type: String,
    pub equipment_model: String,
    pub problem_description: String,
    pub customer_name: String,
    pub customer_phone: String,
    #[serde(default)]
    pub status: Option<RequestStatus>,
    #[serde(default)]
    pub assigned_to: Option<UserId>,
}

impl From<CreateRequestBody> for RequestDraft {
    fn from(body: CreateRequestBody) -> Self {
        Self {
            equipment_type: body.equipment_type,
            equipment_model: body.equipment_model,
            problem_description: body.problem_description,
            customer_name: body.customer_name,
            customer_phone: body.customer_phone,
            initial_status: body.status,
            assigned_to: body.assigned_to,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeBody {
    pub status: RequestStatus,
}

/// `null` technician unassigns.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssigneeBody {
    pub technician_id: Option<UserId>,
}

/// Requests visible to the caller, optionally filtered by `q` or customer.
#[get("/requests")]
pub async fn list_requests(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<RequestListQuery>,
) -> ApiResult<web::Json<Vec<Request>>> {
    let actor = current_actor(&state, &session).await?;
    let RequestListQuery {
        q,
        customer_name,
        customer_phone,
    } = query.into_inner();

    let found = match (customer_name, q) {
        (Some(name), _) => {
            let lookup = CustomerLookup {
                name,
                phone: customer_phone,
            };
            state.requests.list_by_customer(&actor, &lookup).await?
        }
        (None, Some(term)) => state.requests.search(&actor, &term).await?,
        (None, None) => state.requests.list_all(&actor).await?,
    };
    Ok(web::Json(found))
}

/// File a request; the number is allocated from the creation year.
#[post("/requests")]
pub async fn create_request(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateRequestBody>,
) -> ApiResult<HttpResponse> {
    let actor = current_actor(&state, &session).await?;
    let created = state
        .requests
        .create(&actor, RequestDraft::from(payload.into_inner()))
        .await?;
    Ok(HttpResponse::Created().json(created))
}

/// One request, if visible to the caller.
#[get("/requests/{id}")]
pub async fn get_request(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
) -> ApiResult<web::Json<Request>> {
    let actor = current_actor(&state, &session).await?;
    let request = state
        .requests
        .get(&actor, RequestId::new(path.into_inner()))
        .await?;
    Ok(web::Json(request))
}

/// Change status. Same-status requests answer `unchanged` and write nothing.
#[post("/requests/{id}/status")]
pub async fn change_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
    payload: web::Json<StatusChangeBody>,
) -> ApiResult<web::Json<TransitionOutcome>> {
    let actor = current_actor(&state, &session).await?;
    let outcome = state
        .ledger
        .transition(&actor, RequestId::new(path.into_inner()), payload.status)
        .await?;
    Ok(web::Json(outcome))
}

/// Status history, newest first.
#[get("/requests/{id}/history")]
pub async fn status_history(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
) -> ApiResult<web::Json<Vec<StatusHistoryView>>> {
    let actor = current_actor(&state, &session).await?;
    let history = state
        .ledger
        .history(&actor, RequestId::new(path.into_inner()))
        .await?;
    Ok(web::Json(history))
}

/// Assign a technician, or clear the assignee with `null`.
#[put("/requests/{id}/assignee")]
pub async fn assign_technician(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
    payload: web::Json<AssigneeBody>,
) -> ApiResult<web::Json<Request>> {
    let actor = current_actor(&state, &session).await?;
    let request = state
        .assignments
        .assign(
            &actor,
            RequestId::new(path.into_inner()),
            payload.technician_id,
        )
        .await?;
    Ok(web::Json(request))
}

/// Open work assigned to the caller, most urgent first.
#[get("/tasks")]
pub async fn assigned_tasks(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Request>>> {
    let actor = current_actor(&state, &session).await?;
    Ok(web::Json(state.requests.list_assigned_tasks(&actor).await?))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;
    use serde_json::{Value, json};

    use crate::inbound::http::test_utils::{TestDesk, api_app, send};

    fn fridge(customer: &str) -> Value {
        json!({
            "equipmentType": "Холодильник",
            "equipmentModel": "Atlant XM-4021",
            "problemDescription": "Не морозит",
            "customerName": customer,
            "customerPhone": "+7 (999) 111-22-33",
        })
    }

    #[actix_web::test]
    async fn first_request_of_the_year_is_numbered_one() {
        let desk = TestDesk::new().await;
        let app = test::init_service(api_app(desk.state.clone())).await;
        let operator = desk.login(&app, "operator").await;

        let (status, body) = send(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/requests")
                .set_json(fridge("Иванов Иван")),
            &operator,
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["number"], "REQ-2024-0001");
        assert_eq!(body["status"], "new");
        assert_eq!(body["createdOn"], "2024-01-15");
        assert_eq!(body["assignedTo"], Value::Null);
    }

    #[actix_web::test]
    async fn customer_cannot_choose_initial_status() {
        let desk = TestDesk::new().await;
        let app = test::init_service(api_app(desk.state.clone())).await;
        let customer = desk.login(&app, "customer").await;
        let mut body = fridge("Иванов Иван");
        body["status"] = json!("in_repair");

        let (status, body) = send(
            &app,
            test::TestRequest::post().uri("/api/v1/requests").set_json(body),
            &customer,
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "forbidden");
    }

    #[actix_web::test]
    async fn missing_fields_are_reported() {
        let desk = TestDesk::new().await;
        let app = test::init_service(api_app(desk.state.clone())).await;
        let operator = desk.login(&app, "operator").await;
        let mut body = fridge("Иванов Иван");
        body["equipmentModel"] = json!("   ");

        let (status, body) = send(
            &app,
            test::TestRequest::post().uri("/api/v1/requests").set_json(body),
            &operator,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_request");
    }

    #[actix_web::test]
    async fn two_transitions_leave_two_history_entries() {
        let desk = TestDesk::new().await;
        let app = test::init_service(api_app(desk.state.clone())).await;
        let operator = desk.login(&app, "operator").await;
        let tech = desk.login(&app, "tech").await;
        let (_, created) = send(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/requests")
                .set_json(fridge("Иванов Иван")),
            &operator,
        )
        .await;
        let id = created["id"].as_i64().expect("id");

        for target in ["in_repair", "completed"] {
            let (status, outcome) = send(
                &app,
                test::TestRequest::post()
                    .uri(&format!("/api/v1/requests/{id}/status"))
                    .set_json(json!({ "status": target })),
                &tech,
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(outcome["outcome"], "recorded");
        }

        let (_, history) = send(
            &app,
            test::TestRequest::get().uri(&format!("/api/v1/requests/{id}/history")),
            &tech,
        )
        .await;
        let history = history.as_array().expect("history array");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0]["oldStatus"], "in_repair");
        assert_eq!(history[0]["newStatus"], "completed");
        assert_eq!(history[0]["changedByName"], "Кузнецов Олег");
        assert_eq!(history[1]["oldStatus"], "new");

        let (_, request) = send(
            &app,
            test::TestRequest::get().uri(&format!("/api/v1/requests/{id}")),
            &tech,
        )
        .await;
        assert_eq!(request["completedOn"], "2024-01-15");
    }

    #[actix_web::test]
    async fn same_status_is_reported_unchanged() {
        let desk = TestDesk::new().await;
        let app = test::init_service(api_app(desk.state.clone())).await;
        let operator = desk.login(&app, "operator").await;
        let (_, created) = send(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/requests")
                .set_json(fridge("Иванов Иван")),
            &operator,
        )
        .await;
        let id = created["id"].as_i64().expect("id");

        let (_, outcome) = send(
            &app,
            test::TestRequest::post()
                .uri(&format!("/api/v1/requests/{id}/status"))
                .set_json(json!({ "status": "new" })),
            &operator,
        )
        .await;
        assert_eq!(outcome["outcome"], "unchanged");

        let (_, history) = send(
            &app,
            test::TestRequest::get().uri(&format!("/api/v1/requests/{id}/history")),
            &operator,
        )
        .await;
        assert_eq!(history, json!([]));
    }

    #[rstest]
    #[case("customer", StatusCode::FORBIDDEN)]
    #[case("admin", StatusCode::OK)]
    #[actix_web::test]
    async fn assignment_is_gated_by_role(#[case] username: &str, #[case] expected: StatusCode) {
        let desk = TestDesk::new().await;
        let app = test::init_service(api_app(desk.state.clone())).await;
        let operator = desk.login(&app, "operator").await;
        let (_, created) = send(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/requests")
                .set_json(fridge("Иванов Иван")),
            &operator,
        )
        .await;
        let id = created["id"].as_i64().expect("id");
        let cookie = desk.login(&app, username).await;

        let (status, body) = send(
            &app,
            test::TestRequest::put()
                .uri(&format!("/api/v1/requests/{id}/assignee"))
                .set_json(json!({ "technicianId": desk.user_id("tech") })),
            &cookie,
        )
        .await;

        assert_eq!(status, expected);
        if expected == StatusCode::OK {
            assert_eq!(body["assignedTo"], json!(desk.user_id("tech")));
            assert_eq!(body["assignedOn"], "2024-01-15");
        }
    }

    #[actix_web::test]
    async fn customers_only_see_their_own_requests() {
        let desk = TestDesk::new().await;
        let app = test::init_service(api_app(desk.state.clone())).await;
        let operator = desk.login(&app, "operator").await;
        let customer = desk.login(&app, "customer").await;
        let mut ids = Vec::new();
        for name in ["Иванов Иван", "Сидоров Сидор"] {
            let (_, created) = send(
                &app,
                test::TestRequest::post()
                    .uri("/api/v1/requests")
                    .set_json(fridge(name)),
                &operator,
            )
            .await;
            ids.push(created["id"].as_i64().expect("id"));
        }

        let (_, own) = send(&app, test::TestRequest::get().uri("/api/v1/requests"), &customer).await;
        let own = own.as_array().expect("list");
        assert_eq!(own.len(), 1);
        assert_eq!(own[0]["customerName"], "Иванов Иван");

        let (status, _) = send(
            &app,
            test::TestRequest::get().uri(&format!("/api/v1/requests/{}", ids[1])),
            &customer,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn search_matches_number_and_customer() {
        let desk = TestDesk::new().await;
        let app = test::init_service(api_app(desk.state.clone())).await;
        let operator = desk.login(&app, "operator").await;
        for name in ["Иванов Иван", "Сидоров Сидор"] {
            send(
                &app,
                test::TestRequest::post()
                    .uri("/api/v1/requests")
                    .set_json(fridge(name)),
                &operator,
            )
            .await;
        }

        let (_, by_number) = send(
            &app,
            test::TestRequest::get().uri("/api/v1/requests?q=REQ-2024-0002"),
            &operator,
        )
        .await;
        assert_eq!(by_number.as_array().map(Vec::len), Some(1));
        assert_eq!(by_number[0]["customerName"], "Сидоров Сидор");

        let (_, all) = send(&app, test::TestRequest::get().uri("/api/v1/requests"), &operator).await;
        assert_eq!(all.as_array().map(Vec::len), Some(2));
    }

    #[actix_web::test]
    async fn tasks_list_open_assignments() {
        let desk = TestDesk::new().await;
        let app = test::init_service(api_app(desk.state.clone())).await;
        let admin = desk.login(&app, "admin").await;
        let tech = desk.login(&app, "tech").await;
        let mut body = fridge("Иванов Иван");
        body["assignedTo"] = json!(desk.user_id("tech"));
        send(
            &app,
            test::TestRequest::post().uri("/api/v1/requests").set_json(body),
            &admin,
        )
        .await;

        let (status, tasks) = send(&app, test::TestRequest::get().uri("/api/v1/tasks"), &tech).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(tasks.as_array().map(Vec::len), Some(1));
    }
}
