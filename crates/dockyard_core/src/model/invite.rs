//! Project invitation record.
//!
//! # Invariants
//! - `token` is unique across all invites.
//! - `user_id` is set once the invite has been accepted.

use super::{
    require_email, require_optional_reference, require_reference, require_text, RecordId,
    ValidationError,
};
use serde::{Deserialize, Serialize};

const ENTITY: &str = "invite";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invite {
    pub id: RecordId,
    pub token: String,
    /// Epoch milliseconds; `None` never expires.
    pub expiry: Option<i64>,
    pub email: String,
    pub project_id: RecordId,
    pub user_id: Option<RecordId>,
}

impl Invite {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(ENTITY, "token", &self.token)?;
        require_email(ENTITY, &self.email)?;
        require_reference(ENTITY, "project_id", self.project_id)?;
        require_optional_reference(ENTITY, "user_id", self.user_id)
    }

    pub fn is_expired_at(&self, now_epoch_ms: i64) -> bool {
        self.expiry.is_some_and(|expiry| expiry <= now_epoch_ms)
    }

    pub fn is_accepted(&self) -> bool {
        self.user_id.is_some()
    }
}
