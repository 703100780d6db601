/// Defaults: 10 workers, 3 attempts, 1 s between attempts.
pub const DEFAULT_CONCURRENCY: usize = 10;
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;

pub const MAX_CONCURRENCY: usize = 64;

/// Parse a numeric knob, falling back to `default_value` on empty or garbage
/// input and clamping the result to `min..=max`.
pub fn parse_bounded<T>(raw: Option<&str>, default_value: T, min: T, max: T) -> T
where
    T: std::str::FromStr + Ord + Copy,
{
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default_value)
        .clamp(min, max)
}

/// Worker pool size from `HEADERDOC_CONCURRENCY`
pub fn concurrency_from_env() -> usize {
    let raw = std::env::var("HEADERDOC_CONCURRENCY").ok();
    parse_bounded(raw.as_deref(), DEFAULT_CONCURRENCY, 1, MAX_CONCURRENCY)
}

pub(crate) fn max_attempts_from_env() -> usize {
    let raw = std::env::var("HEADERDOC_MAX_ATTEMPTS").ok();
    parse_bounded(raw.as_deref(), DEFAULT_MAX_ATTEMPTS, 1, 100)
}

pub(crate) fn retry_delay_ms_from_env() -> u64 {
    let raw = std::env::var("HEADERDOC_RETRY_DELAY_MS").ok();
    parse_bounded(raw.as_deref(), DEFAULT_RETRY_DELAY_MS, 0, 600_000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bounded_defaults_and_clamps() {
        let parse = |raw| parse_bounded(raw, DEFAULT_CONCURRENCY, 1, MAX_CONCURRENCY);
        assert_eq!(parse(None), DEFAULT_CONCURRENCY);
        assert_eq!(parse(Some("")), DEFAULT_CONCURRENCY);
        assert_eq!(parse(Some("   ")), DEFAULT_CONCURRENCY);
        assert_eq!(parse(Some("2")), 2);
        assert_eq!(parse(Some("0")), 1);
        assert_eq!(parse(Some("999")), MAX_CONCURRENCY);
        assert_eq!(parse(Some("abc")), DEFAULT_CONCURRENCY);
        assert_eq!(parse(Some(" 5 ")), 5);
    }

    #[test]
    fn parse_bounded_works_for_delays() {
        assert_eq!(parse_bounded(Some("250"), 1_000_u64, 0, 600_000), 250);
        assert_eq!(parse_bounded(Some("-1"), 1_000_u64, 0, 600_000), 1_000);
    }
}
