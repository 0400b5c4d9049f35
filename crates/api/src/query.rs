//! Shared query parameter types.

use serde::Deserialize;

/// Limit/offset pagination parameters.
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaginationParams {
    /// Effective limit, clamped to `1..=max`.
    pub fn limit_or(&self, default: i64, max: i64) -> i64 {
        self.limit.unwrap_or(default).clamp(1, max)
    }

    /// Effective offset, never negative.
    pub fn offset_or_zero(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_is_clamped() {
        let params = PaginationParams {
            limit: Some(10_000),
            offset: Some(-5),
        };
        assert_eq!(params.limit_or(50, 200), 200);
        assert_eq!(params.offset_or_zero(), 0);
    }

    #[test]
    fn defaults_apply_when_unset() {
        let params = PaginationParams {
            limit: None,
            offset: None,
        };
        assert_eq!(params.limit_or(50, 200), 50);
        assert_eq!(params.offset_or_zero(), 0);
    }
}
