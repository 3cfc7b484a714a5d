//! Repair desk wired over the in-memory store for integration suites.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use repair_desk::domain::{CurrentActorContext, RequestDraft, Role};
use repair_desk::inbound::http::state::{HttpState, Repositories};
use repair_desk::test_support::{InMemoryRepairDesk, seed_user};

/// Clock the scenarios can move between years.
#[derive(Debug, Clone)]
pub struct MutableClock(Arc<Mutex<DateTime<Utc>>>);

impl MutableClock {
    pub fn at(year: i32, month: u32, day: u32) -> Self {
        Self(Arc::new(Mutex::new(timestamp(year, month, day))))
    }

    pub fn set(&self, year: i32, month: u32, day: u32) {
        *self.0.lock().expect("clock mutex") = timestamp(year, month, day);
    }
}

fn timestamp(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 10, 0, 0)
        .single()
        .expect("valid timestamp")
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.0.lock().expect("clock mutex")
    }
}

const ACCOUNTS: [(&str, Role, &str); 5] = [
    ("admin", Role::Administrator, "Администратор"),
    ("operator", Role::Operator, "Петрова Анна"),
    ("tech", Role::Technician, "Кузнецов Олег"),
    ("quality", Role::QualityManager, "Смирнов Павел"),
    ("customer", Role::Customer, "Иванов Иван"),
];

/// Seeded store plus the service graph the HTTP layer uses.
pub struct Desk {
    pub state: HttpState,
    pub clock: MutableClock,
    actors: HashMap<&'static str, CurrentActorContext>,
}

impl Desk {
    /// Seed one account per role and wire services with the clock on
    /// 2024-01-15.
    pub async fn seeded() -> Self {
        let store = InMemoryRepairDesk::new();
        let clock = MutableClock::at(2024, 1, 15);
        let shared = Arc::new(store.clone());
        let state = HttpState::from_repositories(
            Repositories {
                users: shared.clone(),
                requests: shared.clone(),
                ledger: shared.clone(),
                comments: shared,
            },
            Arc::new(clock.clone()),
            3,
        );

        let mut actors = HashMap::new();
        for (username, role, full_name) in ACCOUNTS {
            let user = seed_user(&store, username, "secret", role, full_name)
                .await
                .expect("seed user");
            let actor = state
                .auth
                .resolve_actor(user.id)
                .await
                .expect("resolve seeded actor");
            actors.insert(username, actor);
        }

        Self {
            state,
            clock,
            actors,
        }
    }

    /// Session context of a seeded account.
    pub fn actor(&self, username: &str) -> CurrentActorContext {
        self.actors
            .get(username)
            .cloned()
            .unwrap_or_else(|| panic!("no seeded account named {username}"))
    }
}

/// A complete intake form for the seeded customer.
pub fn intake_form() -> RequestDraft {
    RequestDraft {
        equipment_type: "Кондиционер".to_owned(),
        equipment_model: "Daikin FTXB35C".to_owned(),
        problem_description: "Не включается".to_owned(),
        customer_name: "Иванов Иван".to_owned(),
        customer_phone: "+79991234567".to_owned(),
        initial_status: None,
        assigned_to: None,
    }
}
