//! Environment variable helpers
//!
//! Credentials and tuning knobs arrive through `.env` files and the process
//! environment; these helpers give every caller the same trimming and
//! validation behavior.

use tracing::warn;

/// Read an environment variable, trimmed; `None` when unset or blank.
pub fn var_trimmed(key: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        },
        Err(_) => None,
    }
}

/// Read a millisecond delay override, clamped to a floor.
///
/// Invalid values are logged and ignored so a typo in `.env` never disables
/// rate limiting.
pub fn delay_override_ms(key: &str, floor_ms: u64) -> Option<u64> {
    let raw = var_trimmed(key)?;
    match raw.parse::<u64>() {
        Ok(ms) => Some(ms.max(floor_ms)),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring invalid delay override");
            None
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_var_trimmed() {
        std::env::set_var("LSX_TEST_TRIM", "  abc  ");
        assert_eq!(var_trimmed("LSX_TEST_TRIM").unwrap(), "abc");

        std::env::set_var("LSX_TEST_BLANK", "   ");
        assert_eq!(var_trimmed("LSX_TEST_BLANK"), None);

        assert_eq!(var_trimmed("LSX_TEST_UNSET_XYZ"), None);
    }

    #[test]
    fn test_delay_override_floor() {
        std::env::set_var("LSX_TEST_DELAY", "10");
        assert_eq!(delay_override_ms("LSX_TEST_DELAY", 50), Some(50));

        std::env::set_var("LSX_TEST_DELAY_BIG", "250");
        assert_eq!(delay_override_ms("LSX_TEST_DELAY_BIG", 50), Some(250));
    }

    #[test]
    fn test_delay_override_invalid() {
        std::env::set_var("LSX_TEST_DELAY_BAD", "fast");
        assert_eq!(delay_override_ms("LSX_TEST_DELAY_BAD", 50), None);
    }
}
