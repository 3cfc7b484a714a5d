//! Quality review handlers.
//!
//! ```text
//! GET  /api/v1/quality/overview
//! GET  /api/v1/quality/problems
//! POST /api/v1/requests/{id}/deadline-extensions {"days":5,"reason":"...","customerAgreed":true}
//! POST /api/v1/requests/{id}/specialists {"specialistId":7,"reason":"..."}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{
    CommentValidationError, DeadlineExtension, Error, ProblemRequest, QualityOverview, RequestId,
    SpecialistEngagement, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::current_actor;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadlineExtensionBody {
    pub days: u8,
    pub reason: String,
    #[serde(default)]
    pub customer_agreed: bool,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialistBody {
    pub specialist_id: UserId,
    pub reason: String,
}

fn invalid(err: &CommentValidationError) -> Error {
    Error::invalid_request(err.to_string())
}

/// Overdue and awaiting-pickup counts with the problem list.
#[get("/quality/overview")]
pub async fn quality_overview(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<QualityOverview>> {
    let actor = current_actor(&state, &session).await?;
    Ok(web::Json(state.quality.overview(&actor).await?))
}

/// Overdue or stalled requests.
#[get("/quality/problems")]
pub async fn problem_requests(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ProblemRequest>>> {
    let actor = current_actor(&state, &session).await?;
    Ok(web::Json(state.quality.problem_requests(&actor).await?))
}

/// Record an agreed deadline extension as a technical note.
#[post("/requests/{id}/deadline-extensions")]
pub async fn extend_deadline(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
    payload: web::Json<DeadlineExtensionBody>,
) -> ApiResult<HttpResponse> {
    let actor = current_actor(&state, &session).await?;
    let DeadlineExtensionBody {
        days,
        reason,
        customer_agreed,
    } = payload.into_inner();
    let extension =
        DeadlineExtension::new(days, reason, customer_agreed).map_err(|err| invalid(&err))?;
    let note = state
        .quality
        .extend_deadline(&actor, RequestId::new(path.into_inner()), extension)
        .await?;
    Ok(HttpResponse::Created().json(note))
}

/// Engage another technician on the request.
#[post("/requests/{id}/specialists")]
pub async fn engage_specialist(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
    payload: web::Json<SpecialistBody>,
) -> ApiResult<HttpResponse> {
    let actor = current_actor(&state, &session).await?;
    let SpecialistBody {
        specialist_id,
        reason,
    } = payload.into_inner();
    let engagement =
        SpecialistEngagement::new(specialist_id, reason).map_err(|err| invalid(&err))?;
    let note = state
        .quality
        .engage_specialist(&actor, RequestId::new(path.into_inner()), engagement)
        .await?;
    Ok(HttpResponse::Created().json(note))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;
    use serde_json::json;

    use crate::inbound::http::test_utils::{TestDesk, api_app, send};

    async fn request_id<S, B>(desk: &TestDesk, app: &S) -> i64
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
                "equipmentType": "Кондиционер",
                "equipmentModel": "LG S12EQ",
                "problemDescription": "Не охлаждает",
                "customerName": "Иванов Иван",
                "customerPhone": "+79994444444",
            })),
            &operator,
        )
        .await;
        created["id"].as_i64().expect("id")
    }

    #[rstest]
    #[case(0, true)]
    #[case(31, true)]
    #[case(5, false)]
    #[actix_web::test]
    async fn extension_input_is_validated(#[case] days: u8, #[case] agreed: bool) {
        let desk = TestDesk::new().await;
        let app = test::init_service(api_app(desk.state.clone())).await;
        let id = request_id(&desk, &app).await;
        let quality = desk.login(&app, "quality").await;

        let (status, body) = send(
            &app,
            test::TestRequest::post()
                .uri(&format!("/api/v1/requests/{id}/deadline-extensions"))
                .set_json(json!({ "days": days, "reason": "ждём запчасть", "customerAgreed": agreed })),
            &quality,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_request");
    }

    #[actix_web::test]
    async fn extension_is_recorded_as_technical_note() {
        let desk = TestDesk::new().await;
        let app = test::init_service(api_app(desk.state.clone())).await;
        let id = request_id(&desk, &app).await;
        let quality = desk.login(&app, "quality").await;

        let (status, note) = send(
            &app,
            test::TestRequest::post()
                .uri(&format!("/api/v1/requests/{id}/deadline-extensions"))
                .set_json(json!({ "days": 5, "reason": "ждём компрессор", "customerAgreed": true })),
            &quality,
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(note["isTechnicalNote"], true);
        assert_eq!(
            note["body"],
            "Deadline extended by 5 day(s). Reason: ждём компрессор. Customer agreement confirmed."
        );
    }

    #[rstest]
    #[case("tech", StatusCode::CREATED)]
    #[case("operator", StatusCode::BAD_REQUEST)]
    #[actix_web::test]
    async fn specialist_must_be_a_technician(
        #[case] specialist: &str,
        #[case] expected: StatusCode,
    ) {
        let desk = TestDesk::new().await;
        let app = test::init_service(api_app(desk.state.clone())).await;
        let id = request_id(&desk, &app).await;
        let quality = desk.login(&app, "quality").await;

        let (status, _) = send(
            &app,
            test::TestRequest::post()
                .uri(&format!("/api/v1/requests/{id}/specialists"))
                .set_json(json!({
                    "specialistId": desk.user_id(specialist),
                    "reason": "сложный случай",
                })),
            &quality,
        )
        .await;

        assert_eq!(status, expected);
    }

    #[actix_web::test]
    async fn overview_is_for_quality_staff() {
        let desk = TestDesk::new().await;
        let app = test::init_service(api_app(desk.state.clone())).await;
        request_id(&desk, &app).await;
        let quality = desk.login(&app, "quality").await;
        let manager = desk.login(&app, "manager").await;

        let (status, overview) = send(
            &app,
            test::TestRequest::get().uri("/api/v1/quality/overview"),
            &quality,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(overview["overdueAfterDays"], 3);
        assert_eq!(overview["overdueCount"], 0);

        let (status, _) = send(
            &app,
            test::TestRequest::get().uri("/api/v1/quality/problems"),
            &manager,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
