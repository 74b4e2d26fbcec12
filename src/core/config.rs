use crate::core::errors::{Error, Result};
use log::{info, warn};
use std::env;
use std::time::Duration;

/*-------------------------------------------------------------------------------------------------
  Configuration
-------------------------------------------------------------------------------------------------*/

/// Source of the AWS IP Ranges JSON; see
/// [AWS IP address ranges](https://docs.aws.amazon.com/vpc/latest/userguide/aws-ip-ranges.html).
pub const DEFAULT_URL: &str = "https://ip-ranges.amazonaws.com/ip-ranges.json";

/// Cache key the AWS IP Ranges JSON is stored under.
pub const CACHE_KEY: &str = "AWS_IPS";

/// 24 hours.
pub const DEFAULT_CACHE_TIME: i64 = 24 * 60 * 60;

/// 5 seconds.
pub const DEFAULT_TIMEOUT: u64 = 5000;

pub const ENV_URL: &str = "AWSIPCACHE_URL";
pub const ENV_CACHE_DIR: &str = "AWSIPCACHE_CACHE_DIR";
pub const ENV_CACHE_TIME: &str = "AWSIPCACHE_CACHE_TIME";
pub const ENV_TIMEOUT: &str = "AWSIPCACHE_TIMEOUT";

/*-------------------------------------------------------------------------------------------------
  Helper Functions
-------------------------------------------------------------------------------------------------*/

/// Get and parse an environment variable value; unset or invalid values yield `None`.
pub(crate) fn get_env_var<T: std::str::FromStr>(env_var: &str) -> Option<T> {
    env::var(env_var).ok().and_then(|value| {
        value
            .parse::<T>()
            .inspect(|_| info!("Using {}: {}", env_var, value))
            .inspect_err(|_| warn!("Invalid {}: {}", env_var, value))
            .ok()
    })
}

/// Validate a cache time (in seconds); the cache time must be a positive number of seconds.
pub(crate) fn validate_cache_time(cache_time: i64) -> Result<Duration> {
    u64::try_from(cache_time)
        .ok()
        .filter(|seconds| *seconds > 0)
        .map(Duration::from_secs)
        .ok_or_else(|| {
            Error::Config(format!(
                "cache time must be a positive number of seconds, got {cache_time}"
            ))
        })
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_cache_time() {
        assert_eq!(validate_cache_time(1).unwrap(), Duration::from_secs(1));
        assert_eq!(
            validate_cache_time(DEFAULT_CACHE_TIME).unwrap(),
            Duration::from_secs(86400)
        );
    }

    #[test]
    fn test_validate_cache_time_rejects_non_positive_values() {
        for cache_time in [0, -5, i64::MIN] {
            assert!(matches!(
                validate_cache_time(cache_time),
                Err(Error::Config(_))
            ));
        }
    }

    #[test]
    fn test_get_env_var_unset() {
        assert_eq!(
            get_env_var::<u64>("AWSIPCACHE_TEST_GET_ENV_VAR_UNSET"),
            None
        );
    }
}
