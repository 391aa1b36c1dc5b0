//! List pagination bounds.

/// Default page size for source listings.
pub const DEFAULT_LIST_LIMIT: i64 = 25;

/// Maximum page size for source listings.
pub const MAX_LIST_LIMIT: i64 = 100;

/// Clamp a user-provided limit to `[1, max]`, using `default` when absent.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, max)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_bounds() {
        assert_eq!(clamp_limit(None, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT), 25);
        assert_eq!(clamp_limit(Some(500), DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT), 100);
        assert_eq!(clamp_limit(Some(0), DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT), 1);
    }

    #[test]
    fn offset_is_never_negative() {
        assert_eq!(clamp_offset(Some(-3)), 0);
        assert_eq!(clamp_offset(None), 0);
        assert_eq!(clamp_offset(Some(40)), 40);
    }
}
