//! Shared response envelope types.

use serde::Serialize;

/// Standard `{ "data": ... }` envelope used by resource endpoints.
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}
