use thiserror::Error as ThisError;

/*-------------------------------------------------------------------------------------------------
  Errors and Results
-------------------------------------------------------------------------------------------------*/

/// Errors surfaced by the cache, the fetcher, the refresh controller, and the query layer.
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid client or cache configuration (for example, a non-positive cache time).
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The dataset could not be retrieved from the source URL.
    #[error("failed to fetch `{url}`{}: {reason}", http_status(.status))]
    Fetch {
        url: String,
        status: Option<u16>,
        reason: String,
    },

    /// A stored cache entry could not be decoded.
    #[error("corrupt cache entry `{key}`: {reason}")]
    CorruptCache { key: String, reason: String },

    /// A string passed to an address lookup is not an IPv4 or IPv6 address.
    #[error("invalid IP address `{address}`: {reason}")]
    InvalidAddress { address: String, reason: String },

    /// No entry is stored under the requested cache key.
    #[error("no cache entry stored for `{0}`")]
    CacheMiss(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn http_status(status: &Option<u16>) -> String {
    status
        .map(|code| format!(" (HTTP {code})"))
        .unwrap_or_default()
}

// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/*--------------------------------------------------------------------------------------
  Log Error Function
--------------------------------------------------------------------------------------*/

#[cfg(test)]
pub(crate) fn log_error(error: &Error) {
    log::error!("{}", error);
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_message_includes_status() {
        let error = Error::Fetch {
            url: "https://example.com/ip-ranges.json".to_string(),
            status: Some(503),
            reason: "Service Unavailable".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "failed to fetch `https://example.com/ip-ranges.json` (HTTP 503): Service Unavailable"
        );
    }

    #[test]
    fn test_fetch_error_message_without_status() {
        let error = Error::Fetch {
            url: "https://example.com/ip-ranges.json".to_string(),
            status: None,
            reason: "connection refused".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "failed to fetch `https://example.com/ip-ranges.json`: connection refused"
        );
    }
}
