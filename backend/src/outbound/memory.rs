//! In-memory implementation of every repository port.
//!
//! Drives the handler and behavioural tests without PostgreSQL. All tables
//! sit behind one mutex, so request numbering and status transitions are as
//! atomic here as under PostgreSQL's locks.
//! Deleting a user follows the schema's foreign keys: comments and history
//! rows by that user are removed, and assignments to them are cleared.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};

use crate::domain::ports::{
    CommentRepository, CommentRepositoryError, RequestRepository, RequestRepositoryError,
    StatusLedgerError, StatusLedgerRepository, StoredCredentials, UserRepository,
    UserRepositoryError,
};
use crate::domain::{
    Comment, CommentView, CustomerLookup, NewComment, NewRequest, NewUser, PasswordDigest,
    Request, RequestId, RequestNumber, Role, StatusChange, StatusHistoryEntry, StatusHistoryView,
    TransitionOutcome, User, UserChanges, UserId, sort_history_newest_first, sort_newest_first,
};

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password_digest: PasswordDigest,
}

#[derive(Debug, Default)]
struct Tables {
    last_user_id: i32,
    last_request_id: i32,
    last_comment_id: i32,
    last_history_id: i32,
    users: BTreeMap<i32, StoredUser>,
    requests: BTreeMap<i32, Request>,
    comments: Vec<Comment>,
    history: Vec<StatusHistoryEntry>,
}

fn allocate(counter: &mut i32) -> i32 {
    *counter += 1;
    *counter
}

impl Tables {
    fn author(&self, id: UserId) -> Option<&User> {
        self.users.get(&id.get()).map(|stored| &stored.user)
    }

    fn sorted_requests(&self, keep: impl Fn(&Request) -> bool) -> Vec<Request> {
        let mut found: Vec<Request> = self
            .requests
            .values()
            .filter(|request| keep(request))
            .cloned()
            .collect();
        sort_newest_first(&mut found);
        found
    }
}

/// Shared in-memory store. Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepairDesk {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryRepairDesk {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, String> {
        self.tables
            .lock()
            .map_err(|_| "in-memory store lock poisoned".to_owned())
    }
}

#[async_trait]
impl UserRepository for InMemoryRepairDesk {
    async fn create(&self, user: &NewUser) -> Result<User, UserRepositoryError> {
        let mut tables = self.lock().map_err(UserRepositoryError::query)?;
        if tables
            .users
            .values()
            .any(|stored| stored.user.username == user.username)
        {
            return Err(UserRepositoryError::duplicate_username(
                user.username.as_ref(),
            ));
        }
        let id = allocate(&mut tables.last_user_id);
        let created = User {
            id: UserId::new(id),
            username: user.username.clone(),
            role: user.role,
            full_name: user.full_name.clone(),
            phone: user.phone.clone(),
            created_on: user.created_on,
        };
        tables.users.insert(
            id,
            StoredUser {
                user: created.clone(),
                password_digest: user.password_digest.clone(),
            },
        );
        Ok(created)
    }

    async fn update(
        &self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut tables = self.lock().map_err(UserRepositoryError::query)?;
        let Some(stored) = tables.users.get_mut(&id.get()) else {
            return Ok(None);
        };
        stored.user.role = changes.role;
        stored.user.full_name = changes.full_name.clone();
        stored.user.phone = changes.phone.clone();
        if let Some(digest) = &changes.password_digest {
            stored.password_digest = digest.clone();
        }
        Ok(Some(stored.user.clone()))
    }

    async fn delete(&self, id: UserId) -> Result<bool, UserRepositoryError> {
        let mut tables = self.lock().map_err(UserRepositoryError::query)?;
        if tables.users.remove(&id.get()).is_none() {
            return Ok(false);
        }
        tables.comments.retain(|comment| comment.author_id != id);
        tables.history.retain(|entry| entry.changed_by != id);
        for request in tables.requests.values_mut() {
            if request.assigned_to == Some(id) {
                request.assigned_to = None;
            }
        }
        Ok(true)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserRepositoryError> {
        let tables = self.lock().map_err(UserRepositoryError::query)?;
        Ok(tables.author(id).cloned())
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<StoredCredentials>, UserRepositoryError> {
        let tables = self.lock().map_err(UserRepositoryError::query)?;
        Ok(tables
            .users
            .values()
            .find(|stored| stored.user.username.as_ref() == username)
            .map(|stored| StoredCredentials {
                user: stored.user.clone(),
                password_digest: stored.password_digest.clone(),
            }))
    }

    async fn list(&self) -> Result<Vec<User>, UserRepositoryError> {
        let tables = self.lock().map_err(UserRepositoryError::query)?;
        Ok(tables
            .users
            .values()
            .map(|stored| stored.user.clone())
            .collect())
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, UserRepositoryError> {
        let tables = self.lock().map_err(UserRepositoryError::query)?;
        let mut found: Vec<User> = tables
            .users
            .values()
            .filter(|stored| stored.user.role == role)
            .map(|stored| stored.user.clone())
            .collect();
        found.sort_by(|left, right| {
            left.full_name
                .as_ref()
                .cmp(right.full_name.as_ref())
                .then_with(|| left.id.cmp(&right.id))
        });
        Ok(found)
    }
}

#[async_trait]
impl RequestRepository for InMemoryRepairDesk {
    async fn create(
        &self,
        request: &NewRequest,
        created_on: NaiveDate,
    ) -> Result<Request, RequestRepositoryError> {
        let mut tables = self.lock().map_err(RequestRepositoryError::query)?;
        if let Some(assignee) = request.assigned_to
            && tables.author(assignee).is_none()
        {
            return Err(RequestRepositoryError::unknown_user(assignee.get()));
        }

        let year = created_on.year();
        let existing = tables
            .requests
            .values()
            .filter(|stored| stored.created_on.year() == year)
            .count();
        let existing = u32::try_from(existing)
            .map_err(|_| RequestRepositoryError::query("request count overflow"))?;
        let number = RequestNumber::next_in_year(year, existing);
        if tables.requests.values().any(|stored| stored.number == number) {
            return Err(RequestRepositoryError::duplicate_number(number.to_string()));
        }

        let id = allocate(&mut tables.last_request_id);
        let created = Request {
            id: RequestId::new(id),
            number,
            created_on,
            equipment_type: request.equipment_type.clone(),
            equipment_model: request.equipment_model.clone(),
            problem_description: request.problem_description.clone(),
            customer_name: request.customer_name.clone(),
            customer_phone: request.customer_phone.clone(),
            status: request.status,
            assigned_to: request.assigned_to,
            assigned_on: request.assigned_to.map(|_| created_on),
            completed_on: None,
        };
        tables.requests.insert(id, created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: RequestId) -> Result<Option<Request>, RequestRepositoryError> {
        let tables = self.lock().map_err(RequestRepositoryError::query)?;
        Ok(tables.requests.get(&id.get()).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Request>, RequestRepositoryError> {
        let tables = self.lock().map_err(RequestRepositoryError::query)?;
        Ok(tables.sorted_requests(|_| true))
    }

    async fn search(&self, term: &str) -> Result<Vec<Request>, RequestRepositoryError> {
        let tables = self.lock().map_err(RequestRepositoryError::query)?;
        Ok(tables.sorted_requests(|request| request.matches_term(term)))
    }

    async fn list_by_customer(
        &self,
        customer: &CustomerLookup,
    ) -> Result<Vec<Request>, RequestRepositoryError> {
        let tables = self.lock().map_err(RequestRepositoryError::query)?;
        Ok(tables.sorted_requests(|request| request.matches_customer(customer)))
    }

    async fn list_assigned_to(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Request>, RequestRepositoryError> {
        let tables = self.lock().map_err(RequestRepositoryError::query)?;
        Ok(tables.sorted_requests(|request| request.assigned_to == Some(user_id)))
    }

    async fn assign(
        &self,
        id: RequestId,
        assignee: Option<UserId>,
        assigned_on: Option<NaiveDate>,
    ) -> Result<Option<Request>, RequestRepositoryError> {
        let mut tables = self.lock().map_err(RequestRepositoryError::query)?;
        if let Some(user) = assignee
            && tables.author(user).is_none()
        {
            return Err(RequestRepositoryError::unknown_user(user.get()));
        }
        let Some(request) = tables.requests.get_mut(&id.get()) else {
            return Ok(None);
        };
        request.assigned_to = assignee;
        request.assigned_on = assigned_on;
        Ok(Some(request.clone()))
    }
}

#[async_trait]
impl StatusLedgerRepository for InMemoryRepairDesk {
    async fn transition(
        &self,
        change: &StatusChange,
    ) -> Result<TransitionOutcome, StatusLedgerError> {
        let mut tables = self.lock().map_err(StatusLedgerError::query)?;
        if tables.author(change.changed_by).is_none() {
            return Err(StatusLedgerError::unknown_user(change.changed_by.get()));
        }
        let Some(request) = tables.requests.get_mut(&change.request_id.get()) else {
            return Err(StatusLedgerError::request_not_found(
                change.request_id.get(),
            ));
        };

        let current = request.status;
        if current == change.new_status {
            return Ok(TransitionOutcome::Unchanged { status: current });
        }
        request.status = change.new_status;
        request.completed_on = change.completion_date();

        let entry = StatusHistoryEntry {
            id: allocate(&mut tables.last_history_id),
            request_id: change.request_id,
            old_status: Some(current),
            new_status: change.new_status,
            changed_by: change.changed_by,
            changed_at: change.at,
        };
        tables.history.push(entry.clone());
        Ok(TransitionOutcome::Recorded { entry })
    }

    async fn history(
        &self,
        request_id: RequestId,
    ) -> Result<Vec<StatusHistoryView>, StatusLedgerError> {
        let tables = self.lock().map_err(StatusLedgerError::query)?;
        let mut views: Vec<StatusHistoryView> = tables
            .history
            .iter()
            .filter(|entry| entry.request_id == request_id)
            .filter_map(|entry| {
                tables.author(entry.changed_by).map(|user| StatusHistoryView {
                    entry: entry.clone(),
                    changed_by_name: user.full_name.to_string(),
                    changed_by_role: user.role,
                })
            })
            .collect();
        sort_history_newest_first(&mut views);
        Ok(views)
    }
}

#[async_trait]
impl CommentRepository for InMemoryRepairDesk {
    async fn append(&self, comment: &NewComment) -> Result<Comment, CommentRepositoryError> {
        let mut tables = self.lock().map_err(CommentRepositoryError::query)?;
        if !tables.requests.contains_key(&comment.request_id.get()) {
            return Err(CommentRepositoryError::missing_reference(format!(
                "request {} does not exist",
                comment.request_id
            )));
        }
        if tables.author(comment.author_id).is_none() {
            return Err(CommentRepositoryError::missing_reference(format!(
                "user {} does not exist",
                comment.author_id
            )));
        }
        let stored = Comment {
            id: allocate(&mut tables.last_comment_id),
            request_id: comment.request_id,
            author_id: comment.author_id,
            body: comment.body.clone(),
            is_technical_note: comment.is_technical_note,
            parts_ordered: comment.parts_ordered.clone(),
            created_at: comment.created_at,
        };
        tables.comments.push(stored.clone());
        Ok(stored)
    }

    async fn list_for_request(
        &self,
        request_id: RequestId,
    ) -> Result<Vec<CommentView>, CommentRepositoryError> {
        let tables = self.lock().map_err(CommentRepositoryError::query)?;
        let mut views: Vec<CommentView> = tables
            .comments
            .iter()
            .filter(|comment| comment.request_id == request_id)
            .filter_map(|comment| {
                tables.author(comment.author_id).map(|user| CommentView {
                    comment: comment.clone(),
                    author_name: user.full_name.to_string(),
                    author_role: user.role,
                })
            })
            .collect();
        views.sort_by(|left, right| {
            left.comment
                .created_at
                .cmp(&right.comment.created_at)
                .then_with(|| left.comment.id.cmp(&right.comment.id))
        });
        Ok(views)
    }
}
