//! Request numbers stay unique and gap-free under concurrent intake.

// Shared harness has helpers unused by some suites.
#[allow(dead_code)]
#[path = "support/desk.rs"]
mod desk;

use desk::{Desk, intake_form};
use futures::future::join_all;
use repair_desk::domain::RequestNumber;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_intake_allocates_every_sequence_once() {
    let desk = Desk::seeded().await;
    let operator = desk.actor("operator");

    let handles = (0..24).map(|_| {
        let requests = desk.state.requests.clone();
        let operator = operator.clone();
        tokio::spawn(async move { requests.create(&operator, intake_form()).await })
    });
    let mut sequences: Vec<u32> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| {
            let request = joined.expect("task joined").expect("request created");
            assert_eq!(request.number.year(), 2024);
            request.number.sequence()
        })
        .collect();
    sequences.sort_unstable();

    assert_eq!(sequences, (1..=24).collect::<Vec<u32>>());
}

#[tokio::test]
async fn numbering_restarts_with_the_calendar_year() {
    let desk = Desk::seeded().await;
    let operator = desk.actor("operator");

    let first = desk
        .state
        .requests
        .create(&operator, intake_form())
        .await
        .expect("2024 request");
    desk.clock.set(2025, 1, 2);
    let second = desk
        .state
        .requests
        .create(&operator, intake_form())
        .await
        .expect("2025 request");

    assert_eq!(first.number, RequestNumber::new(2024, 1));
    assert_eq!(second.number.to_string(), "REQ-2025-0001");
}
