//! Fetch, cache, and query the [AWS IP address ranges][aws-ip-ranges].
//!
//! The AWS IP Ranges JSON is cached in a directory on disk with a configurable expiry.
//! Processes pointed at the same cache directory share the cached JSON; each request checks
//! the cache and only fetches from AWS when the cached entry is missing or expired.
//!
//! ```no_run
//! let client = awsipcache::ClientBuilder::new()
//!     .cache_dir("/tmp/awsipcache")
//!     .cache_time(60 * 60) // 1 hour
//!     .build()?;
//!
//! // Each query checks the cache (and refreshes it when expired)
//! let is_aws = client.is_aws_ip("3.141.102.225", None)?;
//! let s3_cidrs = client.cidrs_by_service("S3")?;
//!
//! // Run several queries over one snapshot of the dataset
//! let dataset = client.get_dataset()?;
//! let regions = dataset.distinct_regions();
//! # Ok::<(), awsipcache::Error>(())
//! ```
//!
//! [aws-ip-ranges]: https://docs.aws.amazon.com/vpc/latest/userguide/aws-ip-ranges.html

mod core;

/*-------------------------------------------------------------------------------------------------
  Library Interface
-------------------------------------------------------------------------------------------------*/

pub use crate::core::cache::{CacheStore, FileCache};
pub use crate::core::client::{get_dataset, Client, ClientBuilder};
pub use crate::core::config::{CACHE_KEY, DEFAULT_URL};
pub use crate::core::dataset::{parse_address, Dataset, PrefixEntry};
pub use crate::core::errors::{Error, Result};
pub use crate::core::fetcher::{Fetcher, HttpFetcher};
pub use crate::core::filter::{Filter, IpVersion};

/*--------------------------------------------------------------------------------------
  Re-exports
--------------------------------------------------------------------------------------*/

pub use ipnetwork;
