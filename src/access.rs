//! Ownership policy for the admin surface.
//!
//! Superusers act on every row. Everyone else is confined to rows whose owner is
//! themselves. Collection queries take an [`OwnerScope`]; single-object actions
//! go through [`ensure_owner`].

use serde::Serialize;

use crate::error::{AppError, AppResult};

/// The authenticated user behind an admin request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub user_id: i64,
    pub username: String,
    pub is_superuser: bool,
    pub is_property_owner: bool,
}

impl Principal {
    /// Whether the principal may use the admin surface at all.
    pub fn is_staff(&self) -> bool {
        self.is_superuser || self.is_property_owner
    }
}

/// Row filter derived from a principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerScope {
    Everything,
    OwnedBy(i64),
}

impl OwnerScope {
    pub fn for_principal(principal: &Principal) -> Self {
        if principal.is_superuser {
            OwnerScope::Everything
        } else {
            OwnerScope::OwnedBy(principal.user_id)
        }
    }

    pub fn permits(&self, owner: Option<i64>) -> bool {
        match self {
            OwnerScope::Everything => true,
            OwnerScope::OwnedBy(user_id) => owner == Some(*user_id),
        }
    }
}

/// Fail with `PermissionDenied` unless `principal` may act on a row owned by `owner`.
pub fn ensure_owner(principal: &Principal, owner: Option<i64>, what: &str) -> AppResult<()> {
    if OwnerScope::for_principal(principal).permits(owner) {
        Ok(())
    } else {
        Err(AppError::PermissionDenied(format!(
            "You can only manage {} you own.",
            what
        )))
    }
}

pub fn ensure_staff(principal: &Principal) -> AppResult<()> {
    if principal.is_staff() {
        Ok(())
    } else {
        Err(AppError::PermissionDenied(
            "Admin access requires a property owner account.".to_string(),
        ))
    }
}

/// Owner to store when a principal saves an accommodation.
///
/// A new record, or one without an owner, is assigned to the principal. Only a
/// superuser may choose the owner explicitly; anyone else keeps the stored owner.
pub fn resolve_owner(
    principal: &Principal,
    is_new: bool,
    stored_owner: Option<i64>,
    requested_owner: Option<i64>,
) -> Option<i64> {
    let candidate = if principal.is_superuser {
        requested_owner
    } else {
        stored_owner
    };

    if is_new || candidate.is_none() {
        Some(principal.user_id)
    } else {
        candidate
    }
}
