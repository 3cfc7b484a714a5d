//! The acting user passed explicitly into every domain call.

use super::{Error, FullName, Operation, PermissionModel, Request, Role, User, UserId};

/// Who is performing an operation.
///
/// Built by the inbound adapter from the authenticated session; the domain
/// never reads session state itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentActorContext {
    user_id: UserId,
    role: Role,
    full_name: FullName,
    phone: Option<String>,
}

impl CurrentActorContext {
    /// Construct a context from explicit parts.
    #[must_use]
    pub fn new(user_id: UserId, role: Role, full_name: FullName, phone: Option<String>) -> Self {
        Self {
            user_id,
            role,
            full_name,
            phone,
        }
    }

    /// Acting user id.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Acting user role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Acting user full name.
    #[must_use]
    pub fn full_name(&self) -> &FullName {
        &self.full_name
    }

    /// Acting user phone, if recorded.
    #[must_use]
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    /// Whether the role grants `operation`.
    #[must_use]
    pub fn can(&self, operation: Operation) -> bool {
        PermissionModel::authorize(self.role, operation)
    }

    /// Fail with `forbidden` unless the role grants `operation`.
    pub fn require(&self, operation: Operation) -> Result<(), Error> {
        if self.can(operation) {
            Ok(())
        } else {
            tracing::info!(
                user_id = %self.user_id,
                role = %self.role,
                operation = %operation,
                "operation denied"
            );
            Err(Error::forbidden(format!(
                "role {} may not {}",
                self.role, operation
            )))
        }
    }

    /// Whether the request is visible: all requests for roles with
    /// [`Operation::ViewAllRequests`], otherwise only those filed under the
    /// actor's own name.
    #[must_use]
    pub fn can_see(&self, request: &Request) -> bool {
        if self.can(Operation::ViewAllRequests) {
            return true;
        }
        self.can(Operation::ViewOwnRequests)
            && request.customer_name == self.full_name.as_ref()
    }
}

impl From<&User> for CurrentActorContext {
    fn from(user: &User) -> Self {
        Self::new(user.id, user.role, user.full_name.clone(), user.phone.clone())
    }
}
