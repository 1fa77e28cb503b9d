use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A knowledge-base document uploaded through the admin back-office.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub original_filename: String,
    pub uploaded_at: DateTime<Utc>,
    pub user_email: String,
}
