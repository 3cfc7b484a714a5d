//! `GET /api/v1/statistics`: completion counts, average repair time, and the
//! per-equipment breakdown.

use actix_web::{get, web};

use crate::domain::StatisticsSummary;
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::current_actor;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Totals, average completion days, and counts per equipment type.
#[get("/statistics")]
pub async fn statistics(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<StatisticsSummary>> {
    let actor = current_actor(&state, &session).await?;
    Ok(web::Json(state.statistics.summary(&actor).await?))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;

    use crate::inbound::http::test_utils::{TestDesk, api_app, send};

    #[rstest]
    #[case("manager", StatusCode::OK)]
    #[case("admin", StatusCode::OK)]
    #[case("tech", StatusCode::FORBIDDEN)]
    #[case("customer", StatusCode::FORBIDDEN)]
    #[actix_web::test]
    async fn statistics_are_for_management(#[case] username: &str, #[case] expected: StatusCode) {
        let desk = TestDesk::new().await;
        let app = test::init_service(api_app(desk.state.clone())).await;
        let cookie = desk.login(&app, username).await;

        let (status, _) = send(&app, test::TestRequest::get().uri("/api/v1/statistics"), &cookie).await;

        assert_eq!(status, expected);
    }

    #[actix_web::test]
    async fn empty_desk_reports_zero_average() {
        let desk = TestDesk::new().await;
        let app = test::init_service(api_app(desk.state.clone())).await;
        let cookie = desk.login(&app, "manager").await;

        let (_, body) = send(&app, test::TestRequest::get().uri("/api/v1/statistics"), &cookie).await;

        insta::assert_json_snapshot!(body, @r#"
        {
          "averageCompletionDays": 0.0,
          "completedCount": 0,
          "perEquipmentTypeCounts": [],
          "totalCount": 0
        }
        "#);
    }
}
