//! PostgreSQL-backed [`RequestRepository`].
//!
//! Number allocation takes a transaction-scoped advisory lock keyed on the
//! calendar year, counts that year's requests, and inserts, all in one
//! transaction. Concurrent creates in the same year therefore serialize; the
//! unique index on `request_number` remains the backstop.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use diesel::prelude::*;
use diesel::sql_types::Integer;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{RequestRepository, RequestRepositoryError};
use crate::domain::{
    CustomerLookup, NewRequest, Request, RequestId, RequestNumber, UserId, year_bounds,
};

use super::error_mapping::{REQUEST_NUMBER_UNIQUE, StorageFailure};
use super::models::{NewRequestRow, RequestRow};
use super::pool::DbPool;
use super::schema::requests;

/// Advisory lock class reserved for request numbering.
const NUMBERING_LOCK_CLASS: i32 = 0x5245_5121;

/// Diesel implementation of the [`RequestRepository`] port.
#[derive(Clone)]
pub struct DieselRequestRepository {
    pool: DbPool,
}

impl DieselRequestRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: impl Into<StorageFailure>) -> RequestRepositoryError {
    match failure.into() {
        StorageFailure::Connection(message) => RequestRepositoryError::connection(message),
        StorageFailure::Query(message) => RequestRepositoryError::query(message),
        StorageFailure::UniqueViolation { constraint } => RequestRepositoryError::query(format!(
            "unexpected unique violation on {}",
            constraint.as_deref().unwrap_or("unknown constraint")
        )),
        StorageFailure::ForeignKeyViolation { .. } => {
            RequestRepositoryError::query("unexpected foreign key violation")
        }
    }
}

/// Map a write failure, recognising the assignee foreign key.
fn map_assignee_failure(
    error: diesel::result::Error,
    assignee: Option<UserId>,
) -> RequestRepositoryError {
    match (StorageFailure::from(error), assignee) {
        (StorageFailure::ForeignKeyViolation { .. }, Some(user_id)) => {
            RequestRepositoryError::unknown_user(user_id.get())
        }
        (failure, _) => map_failure(failure),
    }
}

fn decode_all(rows: Vec<RequestRow>) -> Result<Vec<Request>, RequestRepositoryError> {
    rows.into_iter()
        .map(|row| row.into_request().map_err(map_failure))
        .collect()
}

/// `ILIKE` pattern matching `term` anywhere, with wildcards escaped.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

type NewestFirst = (
    diesel::helper_types::Desc<requests::created_on>,
    diesel::helper_types::Desc<requests::id>,
);

fn newest_first() -> NewestFirst {
    (requests::created_on.desc(), requests::id.desc())
}

/// Failure inside the numbering transaction.
#[derive(Debug)]
enum NumberingError {
    Storage(diesel::result::Error),
    /// The year's request count does not fit a sequence number.
    CountOverflow,
}

impl From<diesel::result::Error> for NumberingError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Storage(error)
    }
}

fn existing_sequence(existing: i64) -> Result<u32, NumberingError> {
    u32::try_from(existing).map_err(|_| NumberingError::CountOverflow)
}

fn map_numbering_failure(
    error: NumberingError,
    created_on: NaiveDate,
    assignee: Option<UserId>,
) -> RequestRepositoryError {
    let NumberingError::Storage(error) = error else {
        return RequestRepositoryError::query("request count overflow");
    };
    let failure = StorageFailure::from(error);
    if failure.violates_unique(REQUEST_NUMBER_UNIQUE) {
        RequestRepositoryError::duplicate_number(format!("REQ-{}", created_on.year()))
    } else if let (StorageFailure::ForeignKeyViolation { .. }, Some(user_id)) = (&failure, assignee)
    {
        RequestRepositoryError::unknown_user(user_id.get())
    } else {
        map_failure(failure)
    }
}

async fn insert_numbered(
    conn: &mut AsyncPgConnection,
    request: &NewRequest,
    created_on: NaiveDate,
    (year_start, year_end): (NaiveDate, NaiveDate),
) -> Result<RequestRow, NumberingError> {
    let year = created_on.year();
    diesel::sql_query("SELECT pg_advisory_xact_lock($1, $2)")
        .bind::<Integer, _>(NUMBERING_LOCK_CLASS)
        .bind::<Integer, _>(year)
        .execute(conn)
        .await?;

    let existing: i64 = requests::table
        .filter(requests::created_on.ge(year_start))
        .filter(requests::created_on.lt(year_end))
        .count()
        .get_result(conn)
        .await?;
    let number = RequestNumber::next_in_year(year, existing_sequence(existing)?);
    let number_text = number.to_string();

    let row = NewRequestRow {
        request_number: &number_text,
        created_on,
        equipment_type: &request.equipment_type,
        equipment_model: &request.equipment_model,
        problem_description: &request.problem_description,
        customer_name: &request.customer_name,
        customer_phone: &request.customer_phone,
        status: request.status.as_str(),
        assigned_to: request.assigned_to.map(UserId::get),
        assigned_on: request.assigned_to.map(|_| created_on),
    };
    let inserted = diesel::insert_into(requests::table)
        .values(&row)
        .returning(RequestRow::as_returning())
        .get_result(conn)
        .await?;
    Ok(inserted)
}

#[async_trait]
impl RequestRepository for DieselRequestRepository {
    async fn create(
        &self,
        request: &NewRequest,
        created_on: NaiveDate,
    ) -> Result<Request, RequestRepositoryError> {
        let bounds = year_bounds(created_on)
            .ok_or_else(|| RequestRepositoryError::query("creation date out of range"))?;
        let mut conn = self.pool.checkout().await.map_err(map_failure)?;

        let inserted = conn
            .transaction(|conn| {
                async move { insert_numbered(conn, request, created_on, bounds).await }
                    .scope_boxed()
            })
            .await
            .map_err(|err| map_numbering_failure(err, created_on, request.assigned_to))?;
        inserted.into_request().map_err(map_failure)
    }

    async fn find_by_id(&self, id: RequestId) -> Result<Option<Request>, RequestRepositoryError> {
        let mut conn = self.pool.checkout().await.map_err(map_failure)?;
        let row: Option<RequestRow> = requests::table
            .find(id.get())
            .select(RequestRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_failure)?;
        row.map(|row| row.into_request().map_err(map_failure))
            .transpose()
    }

    async fn list_all(&self) -> Result<Vec<Request>, RequestRepositoryError> {
        let mut conn = self.pool.checkout().await.map_err(map_failure)?;
        let rows: Vec<RequestRow> = requests::table
            .select(RequestRow::as_select())
            .order_by(newest_first())
            .load(&mut conn)
            .await
            .map_err(map_failure)?;
        decode_all(rows)
    }

    async fn search(&self, term: &str) -> Result<Vec<Request>, RequestRepositoryError> {
        let pattern = contains_pattern(term.trim());
        let mut conn = self.pool.checkout().await.map_err(map_failure)?;
        let rows: Vec<RequestRow> = requests::table
            .filter(
                requests::request_number
                    .ilike(pattern.as_str())
                    .or(requests::customer_name.ilike(pattern.as_str())),
            )
            .select(RequestRow::as_select())
            .order_by(newest_first())
            .load(&mut conn)
            .await
            .map_err(map_failure)?;
        decode_all(rows)
    }

    async fn list_by_customer(
        &self,
        customer: &CustomerLookup,
    ) -> Result<Vec<Request>, RequestRepositoryError> {
        let mut conn = self.pool.checkout().await.map_err(map_failure)?;
        // Phone numbers were recorded inconsistently, so the name alone decides.
        let rows: Vec<RequestRow> = requests::table
            .filter(requests::customer_name.eq(customer.name.as_str()))
            .select(RequestRow::as_select())
            .order_by(newest_first())
            .load(&mut conn)
            .await
            .map_err(map_failure)?;
        decode_all(rows)
    }

    async fn list_assigned_to(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Request>, RequestRepositoryError> {
        let mut conn = self.pool.checkout().await.map_err(map_failure)?;
        let rows: Vec<RequestRow> = requests::table
            .filter(requests::assigned_to.eq(user_id.get()))
            .select(RequestRow::as_select())
            .order_by(newest_first())
            .load(&mut conn)
            .await
            .map_err(map_failure)?;
        decode_all(rows)
    }

    async fn assign(
        &self,
        id: RequestId,
        assignee: Option<UserId>,
        assigned_on: Option<NaiveDate>,
    ) -> Result<Option<Request>, RequestRepositoryError> {
        let mut conn = self.pool.checkout().await.map_err(map_failure)?;
        let row: Option<RequestRow> = diesel::update(requests::table.find(id.get()))
            .set((
                requests::assigned_to.eq(assignee.map(UserId::get)),
                requests::assigned_on.eq(assigned_on),
            ))
            .returning(RequestRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| map_assignee_failure(err, assignee))?;
        row.map(|row| row.into_request().map_err(map_failure))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("REQ-2024", "%REQ-2024%")]
    #[case("100%", "%100\\%%")]
    #[case("a_b", "%a\\_b%")]
    fn search_patterns_escape_wildcards(#[case] term: &str, #[case] expected: &str) {
        assert_eq!(contains_pattern(term), expected);
    }

    #[rstest]
    #[case(0, Some(0))]
    #[case(41, Some(41))]
    #[case(i64::from(u32::MAX), Some(u32::MAX))]
    #[case(i64::from(u32::MAX) + 1, None)]
    #[case(-1, None)]
    fn year_counts_outside_u32_are_rejected(#[case] existing: i64, #[case] expected: Option<u32>) {
        assert_eq!(existing_sequence(existing).ok(), expected);
    }

    #[rstest]
    fn count_overflow_is_a_query_failure() {
        let created_on = NaiveDate::from_ymd_opt(2024, 3, 1).expect("date");

        let err = map_numbering_failure(NumberingError::CountOverflow, created_on, None);

        assert_eq!(
            err.to_string(),
            "request repository query failed: request count overflow"
        );
    }
}
