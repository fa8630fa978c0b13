//! The owner a cart belongs to.

use crate::ids::{SessionId, UserId};
use serde::{Deserialize, Serialize};

/// Session and, once logged in, user that own a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartContext {
    /// Browsing session.
    pub session_id: SessionId,
    /// Authenticated user, if any.
    pub user_id: Option<UserId>,
}

impl CartContext {
    /// Context for an anonymous visitor.
    pub fn guest(session_id: impl Into<SessionId>) -> Self {
        Self {
            session_id: session_id.into(),
            user_id: None,
        }
    }

    /// Context for an authenticated user.
    pub fn user(session_id: impl Into<SessionId>, user_id: impl Into<UserId>) -> Self {
        Self {
            session_id: session_id.into(),
            user_id: Some(user_id.into()),
        }
    }

    /// True when no user is logged in.
    pub fn is_guest(&self) -> bool {
        self.user_id.is_none()
    }
}
