//! Exponential backoff schedule.

use std::time::Duration;

/// Delay before retry `retry` (1-indexed): `base * 2^retry`.
///
/// Retry 0 is the first attempt and never waits.
pub fn calculate_backoff(retry: u32, base: Duration) -> Duration {
    if retry == 0 {
        return Duration::ZERO;
    }
    let factor = 2u32.saturating_pow(retry.min(31));
    base.saturating_mul(factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_calculation() {
        let base = Duration::from_secs(1);
        assert_eq!(calculate_backoff(0, base), Duration::ZERO);
        assert_eq!(calculate_backoff(1, base), Duration::from_secs(2));
        assert_eq!(calculate_backoff(2, base), Duration::from_secs(4));
        assert_eq!(calculate_backoff(3, base), Duration::from_secs(8));
    }

    #[test]
    fn test_backoff_saturates() {
        let huge = calculate_backoff(64, Duration::from_secs(u64::MAX / 2));
        assert_eq!(huge, Duration::MAX);
    }
}
