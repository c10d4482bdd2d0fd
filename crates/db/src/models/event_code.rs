//! Event code models and DTOs.

use kyotsu_core::codes::{format_event_code, short_uuid};
use kyotsu_core::severity::Severity;
use kyotsu_core::types::{CodeId, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `event_codes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EventCode {
    pub id: CodeId,
    pub prefix_id: DbId,
    /// Assigned by the `trg_auto_increment` trigger on insert.
    pub increment: i32,
    pub custom_message: Option<String>,
    pub hint: Option<String>,
    #[sqlx(try_from = "String")]
    pub severity: Severity,
    pub dev_note: Option<String>,
    pub is_deprecated: bool,
    pub use_generic_message: bool,
    pub is_private: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An event code joined with the composed path of its prefix.
#[derive(Debug, Clone, FromRow)]
pub struct EventCodeWithPath {
    #[sqlx(flatten)]
    pub event_code: EventCode,
    pub prefix_path: String,
}

impl EventCodeWithPath {
    /// Full code string, e.g. `AUTH.LOGIN0003`.
    pub fn code(&self) -> String {
        format_event_code(&self.prefix_path, self.event_code.increment)
    }
}

/// Admin representation of an event code.
#[derive(Debug, Clone, Serialize)]
pub struct EventCodeView {
    #[serde(flatten)]
    pub event_code: EventCode,
    pub code: String,
    pub prefix_path: String,
    pub short_id: String,
}

impl From<EventCodeWithPath> for EventCodeView {
    fn from(row: EventCodeWithPath) -> Self {
        let code = row.code();
        let short_id = short_uuid(&row.event_code.id);
        Self {
            event_code: row.event_code,
            code,
            prefix_path: row.prefix_path,
            short_id,
        }
    }
}

/// DTO for creating an event code. New codes are never deprecated.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEventCode {
    pub prefix_id: DbId,
    pub custom_message: Option<String>,
    pub hint: Option<String>,
    pub severity: Severity,
    pub dev_note: Option<String>,
    /// Defaults to `false`.
    pub use_generic_message: Option<bool>,
    /// Defaults to `false`.
    pub is_private: Option<bool>,
}

/// DTO for updating an event code. The prefix and increment are immutable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEventCode {
    #[serde(default, deserialize_with = "super::double_option")]
    pub custom_message: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::double_option")]
    pub hint: Option<Option<String>>,
    pub severity: Option<Severity>,
    #[serde(default, deserialize_with = "super::double_option")]
    pub dev_note: Option<Option<String>>,
    pub is_deprecated: Option<bool>,
    pub use_generic_message: Option<bool>,
    pub is_private: Option<bool>,
}

/// Query parameters for `GET /api/v1/admin/event-codes`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventCodeListParams {
    pub prefix_id: Option<DbId>,
    pub severity: Option<Severity>,
    /// Deprecated codes are hidden unless this is set.
    #[serde(default)]
    pub include_deprecated: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
