pub mod behavior;
pub mod ranking;
pub mod recommendations;
pub mod similarity;

pub use behavior::BehaviorService;
pub use recommendations::RecommendationService;
pub use similarity::SimilarityFinder;

/// Default result count when the caller does not specify a usable limit.
pub const DEFAULT_LIMIT: usize = 10;

/// Coerces a caller-supplied limit to a positive count.
///
/// Missing, zero, and negative values all fall back to the default rather
/// than erroring.
pub fn effective_limit(limit: Option<i64>) -> usize {
    match limit {
        Some(n) if n > 0 => n as usize,
        _ => DEFAULT_LIMIT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_limits_pass_through() {
        assert_eq!(effective_limit(Some(3)), 3);
        assert_eq!(effective_limit(Some(100)), 100);
    }

    #[test]
    fn non_positive_limits_default() {
        assert_eq!(effective_limit(None), DEFAULT_LIMIT);
        assert_eq!(effective_limit(Some(0)), DEFAULT_LIMIT);
        assert_eq!(effective_limit(Some(-5)), DEFAULT_LIMIT);
    }
}
