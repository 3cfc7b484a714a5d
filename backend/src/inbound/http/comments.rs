//! Comment thread handlers.
//!
//! ```text
//! GET  /api/v1/requests/{id}/comments
//! POST /api/v1/requests/{id}/comments {"text":"Заказан компрессор","isTechnicalNote":true}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{CommentDraft, CommentView, RequestId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::current_actor;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentBody {
    pub text: String,
    #[serde(default)]
    pub is_technical_note: bool,
    #[serde(default)]
    pub parts_ordered: Option<String>,
}

impl From<CommentBody> for CommentDraft {
    fn from(body: CommentBody) -> Self {
        Self {
            text: body.text,
            is_technical_note: body.is_technical_note,
            parts_ordered: body.parts_ordered,
        }
    }
}

/// Comments oldest first, with author name and role.
#[get("/requests/{id}/comments")]
pub async fn list_comments(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
) -> ApiResult<web::Json<Vec<CommentView>>> {
    let actor = current_actor(&state, &session).await?;
    let comments = state
        .comments
        .list(&actor, RequestId::new(path.into_inner()))
        .await?;
    Ok(web::Json(comments))
}

/// Add a comment; technical notes may record ordered parts.
#[post("/requests/{id}/comments")]
pub async fn add_comment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
    payload: web::Json<CommentBody>,
) -> ApiResult<HttpResponse> {
    let actor = current_actor(&state, &session).await?;
    let comment = state
        .comments
        .add(
            &actor,
            RequestId::new(path.into_inner()),
            CommentDraft::from(payload.into_inner()),
        )
        .await?;
    Ok(HttpResponse::Created().json(comment))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::json;

    use crate::inbound::http::test_utils::{TestDesk, api_app, send};

    async fn seeded_request<S, B>(desk: &TestDesk, app: &S, customer: &str) -> i64
    where
        S: actix_web::dev::Service<
                actix_http::Request,
                Response = actix_web::dev::ServiceResponse<B>,
                Error = actix_web::Error,
            >,
        B: actix_web::body::MessageBody,
    {
        let operator = desk.login(app, "operator").await;
        let (_, created) = send(
            app,
            test::TestRequest::post().uri("/api/v1/requests").set_json(json!({
                "equipmentType": "Стиральная машина",
                "equipmentModel": "Bosch WAN28",
                "problemDescription": "Не сливает воду",
                "customerName": customer,
                "customerPhone": "+79990000000",
            })),
            &operator,
        )
        .await;
        created["id"].as_i64().expect("id")
    }

    #[actix_web::test]
    async fn comments_carry_author_details_in_order() {
        let desk = TestDesk::new().await;
        let app = test::init_service(api_app(desk.state.clone())).await;
        let id = seeded_request(&desk, &app, "Иванов Иван").await;
        let tech = desk.login(&app, "tech").await;
        let customer = desk.login(&app, "customer").await;

        let (status, added) = send(
            &app,
            test::TestRequest::post()
                .uri(&format!("/api/v1/requests/{id}/comments"))
                .set_json(json!({
                    "text": "Заказан насос",
                    "isTechnicalNote": true,
                    "partsOrdered": "  насос слива  ",
                })),
            &tech,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(added["partsOrdered"], "насос слива");

        send(
            &app,
            test::TestRequest::post()
                .uri(&format!("/api/v1/requests/{id}/comments"))
                .set_json(json!({ "text": "Когда будет готово?" })),
            &customer,
        )
        .await;

        let (_, thread) = send(
            &app,
            test::TestRequest::get().uri(&format!("/api/v1/requests/{id}/comments")),
            &customer,
        )
        .await;
        let thread = thread.as_array().expect("comments");
        assert_eq!(thread.len(), 2);
        assert_eq!(thread[0]["authorName"], "Кузнецов Олег");
        assert_eq!(thread[0]["authorRole"], "technician");
        assert_eq!(thread[0]["isTechnicalNote"], true);
        assert_eq!(thread[1]["authorRole"], "customer");
    }

    #[actix_web::test]
    async fn blank_comment_is_rejected() {
        let desk = TestDesk::new().await;
        let app = test::init_service(api_app(desk.state.clone())).await;
        let id = seeded_request(&desk, &app, "Иванов Иван").await;
        let tech = desk.login(&app, "tech").await;

        let (status, body) = send(
            &app,
            test::TestRequest::post()
                .uri(&format!("/api/v1/requests/{id}/comments"))
                .set_json(json!({ "text": "   " })),
            &tech,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_request");
    }

    #[actix_web::test]
    async fn other_customers_cannot_comment() {
        let desk = TestDesk::new().await;
        let app = test::init_service(api_app(desk.state.clone())).await;
        let id = seeded_request(&desk, &app, "Сидоров Сидор").await;
        let customer = desk.login(&app, "customer").await;

        let (status, _) = send(
            &app,
            test::TestRequest::post()
                .uri(&format!("/api/v1/requests/{id}/comments"))
                .set_json(json!({ "text": "Это моя заявка?" })),
            &customer,
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
