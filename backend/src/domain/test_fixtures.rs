//! Shared builders for domain unit tests.

use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use mockable::Clock;

use super::{
    CurrentActorContext, FullName, Request, RequestId, RequestNumber, RequestStatus, Role, User,
    UserId, Username,
};

pub(crate) fn actor(id: i32, role: Role, name: &str) -> CurrentActorContext {
    CurrentActorContext::new(
        UserId::new(id),
        role,
        FullName::new(name).expect("fixture name"),
        None,
    )
}

pub(crate) fn sample_user(id: i32, role: Role, name: &str) -> User {
    User {
        id: UserId::new(id),
        username: Username::new(format!("user{id}")).expect("fixture username"),
        role,
        full_name: FullName::new(name).expect("fixture name"),
        phone: None,
        created_on: NaiveDate::from_ymd_opt(2024, 1, 1).expect("fixture date"),
    }
}

pub(crate) fn sample_request(id: i32, customer_name: &str) -> Request {
    let sequence = u32::try_from(id).expect("positive fixture id");
    Request {
        id: RequestId::new(id),
        number: RequestNumber::new(2024, sequence),
        created_on: NaiveDate::from_ymd_opt(2024, 1, 10).expect("fixture date"),
        equipment_type: "Сплит-система".to_owned(),
        equipment_model: "LG S12EQ".to_owned(),
        problem_description: "Не охлаждает".to_owned(),
        customer_name: customer_name.to_owned(),
        customer_phone: "+79994444444".to_owned(),
        status: RequestStatus::New,
        assigned_to: None,
        assigned_on: None,
        completed_on: None,
    }
}

/// Clock pinned to a fixed instant.
pub(crate) struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn fixture_clock(year: i32, month: u32, day: u32) -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: Utc
            .with_ymd_and_hms(year, month, day, 10, 0, 0)
            .single()
            .expect("fixture timestamp"),
    })
}
