//! Delete confirmation body.

use serde::Serialize;

/// Body of a successful `DELETE /api/movies/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteResponse {
    /// Always `"Entry deleted successfully"`.
    pub message: &'static str,
    /// The deleted id.
    pub id: i64,
}

impl DeleteResponse {
    /// Confirms the deletion of `id`.
    pub fn new(id: i64) -> Self {
        Self {
            message: "Entry deleted successfully",
            id,
        }
    }
}
