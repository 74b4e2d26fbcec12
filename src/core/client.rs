use crate::core::cache::{CacheStore, FileCache};
use crate::core::config::{self, get_env_var, validate_cache_time, CACHE_KEY};
use crate::core::dataset::{parse_address, Dataset};
use crate::core::errors::{Error, Result};
use crate::core::fetcher::{Fetcher, HttpFetcher};
use ipnetwork::IpNetwork;
use log::info;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/*-------------------------------------------------------------------------------------------------
  Simple Interface
-------------------------------------------------------------------------------------------------*/

/// _**Simple library interface**_ retrieves and decodes the AWS IP Ranges using a client
/// configured from the environment (see [ClientBuilder::new]).
///
/// ```no_run
/// let dataset = awsipcache::get_dataset()?;
/// let is_aws = dataset.is_aws_ip("3.141.102.225", Some("EC2"))?;
/// # Ok::<(), awsipcache::Error>(())
/// ```
pub fn get_dataset() -> Result<Dataset> {
    ClientBuilder::new().build()?.get_dataset()
}

/*-------------------------------------------------------------------------------------------------
  Client Builder
-------------------------------------------------------------------------------------------------*/

/// A builder for the [Client] struct that allows you to customize the client configuration.
///
/// ```
/// let client = awsipcache::ClientBuilder::new()
///     .url("https://ip-ranges.amazonaws.com/ip-ranges.json")
///     .cache_dir(std::env::temp_dir().join("awsipcache-doc"))
///     .cache_time(60 * 60) // 1 hour
///     .timeout(5000) // 5 seconds
///     .build()?;
/// # Ok::<(), awsipcache::Error>(())
/// ```
///
/// The [ClientBuilder::new] method attempts to source configuration values from environment
/// variables when set and uses default values when the environment variables are not set.
/// [ClientBuilder::default] ignores the environment.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    url: String,
    cache_dir: Option<PathBuf>,
    cache_time: i64,
    timeout: u64,
}

/*--------------------------------------------------------------------------------------
  Client Builder Implementation
--------------------------------------------------------------------------------------*/

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            url: config::DEFAULT_URL.to_string(),
            cache_dir: None,                       // Fresh temporary directory
            cache_time: config::DEFAULT_CACHE_TIME, // 24 hours
            timeout: config::DEFAULT_TIMEOUT,       // 5 seconds
        }
    }
}

impl ClientBuilder {
    /// Create a new [ClientBuilder] reading initial configuration values from environment
    /// variables when set and default values when the environment variables are not set.
    ///
    /// The environment variables used to set the initial configuration values are:
    /// - `AWSIPCACHE_URL`
    /// - `AWSIPCACHE_CACHE_DIR`
    /// - `AWSIPCACHE_CACHE_TIME`
    /// - `AWSIPCACHE_TIMEOUT`
    pub fn new() -> Self {
        let default = ClientBuilder::default();

        Self {
            url: get_env_var(config::ENV_URL).unwrap_or(default.url),
            cache_dir: get_env_var(config::ENV_CACHE_DIR).or(default.cache_dir),
            cache_time: get_env_var(config::ENV_CACHE_TIME).unwrap_or(default.cache_time),
            timeout: get_env_var(config::ENV_TIMEOUT).unwrap_or(default.timeout),
        }
    }

    /*-------------------------------------------------------------------------
      Setters
    -------------------------------------------------------------------------*/

    /// Set the URL used to retrieve the AWS IP Ranges; defaults to
    /// `https://ip-ranges.amazonaws.com/ip-ranges.json`.
    pub fn url(&mut self, url: &str) -> &mut Self {
        self.url = url.to_string();
        self
    }

    /// Set the directory used to cache the AWS IP Ranges JSON. Processes that share a cache
    /// directory share the cached JSON. Defaults to a fresh temporary directory per client.
    pub fn cache_dir<P: AsRef<Path>>(&mut self, cache_dir: P) -> &mut Self {
        self.cache_dir = Some(cache_dir.as_ref().to_path_buf());
        self
    }

    /// Set the cache-time duration - the amount of time (in seconds) the cached AWS IP Ranges
    /// JSON is considered fresh; defaults to 24 hours (`86400` seconds). Must be positive.
    pub fn cache_time(&mut self, cache_time: i64) -> &mut Self {
        self.cache_time = cache_time;
        self
    }

    /// Set the maximum time (in milliseconds) to wait for the AWS IP Ranges JSON to be
    /// retrieved from the URL; defaults to `5000` milliseconds (5 seconds).
    pub fn timeout(&mut self, timeout: u64) -> &mut Self {
        self.timeout = timeout;
        self
    }

    /*-------------------------------------------------------------------------
      Build Method
    -------------------------------------------------------------------------*/

    /// Build a [Client] backed by a [FileCache] and an [HttpFetcher]. An invalid cache time is
    /// rejected before the cache directory is created.
    pub fn build(&self) -> Result<Client> {
        validate_cache_time(self.cache_time)?;

        let cache = match &self.cache_dir {
            Some(cache_dir) => FileCache::new(cache_dir, self.cache_time)?,
            None => FileCache::temporary(self.cache_time)?,
        };
        let fetcher = HttpFetcher::new(self.timeout)?;

        Client::from_parts(cache, fetcher, &self.url, self.cache_time)
    }
}

/*-------------------------------------------------------------------------------------------------
  Client
-------------------------------------------------------------------------------------------------*/

/// A client for retrieving the AWS IP Ranges from the cache, when a fresh entry is available,
/// or from the URL when the cached entry is missing or expired.
///
/// Every query method performs its own cache check, so results are never older than the
/// configured cache time. To run several queries over one snapshot, call
/// [Client::get_dataset] once and use the [Dataset] methods.
///
/// ```no_run
/// let client = awsipcache::ClientBuilder::new().cache_dir("/tmp/awsipcache").build()?;
/// let regions = client.distinct_regions()?;
/// # Ok::<(), awsipcache::Error>(())
/// ```
#[derive(Debug)]
pub struct Client<S = FileCache, F = HttpFetcher> {
    cache: S,
    fetcher: F,
    url: String,
    cache_time: Duration,
}

/*--------------------------------------------------------------------------------------
  Client Implementation
--------------------------------------------------------------------------------------*/

impl<S: CacheStore, F: Fetcher> Client<S, F> {
    /// Assemble a client from a cache store and a fetcher. Entries written by the client expire
    /// `cache_time` seconds after they are written; the cache time must be positive.
    pub fn from_parts(cache: S, fetcher: F, url: &str, cache_time: i64) -> Result<Self> {
        Ok(Self {
            cache,
            fetcher,
            url: url.to_string(),
            cache_time: validate_cache_time(cache_time)?,
        })
    }

    /*-------------------------------------------------------------------------
      Getters
    -------------------------------------------------------------------------*/

    /// URL used to retrieve the AWS IP Ranges.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Time the cached AWS IP Ranges JSON is considered fresh.
    pub fn cache_time(&self) -> Duration {
        self.cache_time
    }

    /// Cache store holding the AWS IP Ranges JSON.
    pub fn cache(&self) -> &S {
        &self.cache
    }

    /// Fetcher used when the cached entry is missing or expired.
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /*-------------------------------------------------------------------------
      Get Dataset
    -------------------------------------------------------------------------*/

    /// Retrieve and decode the AWS IP Ranges. Uses the cached JSON when a fresh entry exists;
    /// otherwise requests the JSON from the URL (once, without retries), caches it, and
    /// decodes it.
    ///
    /// Cached JSON that fails to decode is reported as [Error::CorruptCache] rather than
    /// re-fetched. Fetched JSON that fails to decode is reported as [Error::Fetch] and is not
    /// cached. A failed fetch never falls back to an expired cache entry.
    pub fn get_dataset(&self) -> Result<Dataset> {
        if self.cache.exists(CACHE_KEY)? {
            info!("Cache entry `{}` is fresh; use cache", CACHE_KEY);
            let json = self.cache.get(CACHE_KEY)?;
            return Dataset::from_json(&json).map_err(|error| Error::CorruptCache {
                key: CACHE_KEY.to_string(),
                reason: error.to_string(),
            });
        }

        info!(
            "Cache entry `{}` is missing or expired; refresh from {}",
            CACHE_KEY, self.url
        );
        let json = self.fetcher.fetch(&self.url)?;
        let dataset = Dataset::from_json(&json).map_err(|error| Error::Fetch {
            url: self.url.clone(),
            status: None,
            reason: format!("invalid AWS IP Ranges JSON: {error}"),
        })?;

        self.cache.put(CACHE_KEY, &json, self.cache_time)?;
        Ok(dataset)
    }

    /*-------------------------------------------------------------------------
      Queries
    -------------------------------------------------------------------------*/

    /// See [Dataset::all_cidrs].
    pub fn all_cidrs(&self) -> Result<Vec<IpNetwork>> {
        Ok(self.get_dataset()?.all_cidrs())
    }

    /// See [Dataset::cidrs_by_region].
    pub fn cidrs_by_region(&self, region: &str) -> Result<Vec<IpNetwork>> {
        Ok(self.get_dataset()?.cidrs_by_region(region))
    }

    /// See [Dataset::cidrs_by_service].
    pub fn cidrs_by_service(&self, service: &str) -> Result<Vec<IpNetwork>> {
        Ok(self.get_dataset()?.cidrs_by_service(service))
    }

    /// See [Dataset::cidrs_by_network_border_group].
    pub fn cidrs_by_network_border_group(
        &self,
        network_border_group: &str,
    ) -> Result<Vec<IpNetwork>> {
        Ok(self
            .get_dataset()?
            .cidrs_by_network_border_group(network_border_group))
    }

    /// See [Dataset::distinct_regions].
    pub fn distinct_regions(&self) -> Result<BTreeSet<String>> {
        Ok(self.get_dataset()?.distinct_regions())
    }

    /// See [Dataset::distinct_services].
    pub fn distinct_services(&self) -> Result<BTreeSet<String>> {
        Ok(self.get_dataset()?.distinct_services())
    }

    /// See [Dataset::distinct_network_border_groups].
    pub fn distinct_network_border_groups(&self) -> Result<BTreeSet<String>> {
        Ok(self.get_dataset()?.distinct_network_border_groups())
    }

    /// Whether `address` belongs to the AWS IP Ranges, optionally restricted to prefixes used
    /// by `service`. A malformed address is rejected with [Error::InvalidAddress] before the
    /// dataset is retrieved.
    pub fn is_aws_ip(&self, address: &str, service: Option<&str>) -> Result<bool> {
        let address = parse_address(address)?;
        Ok(self.get_dataset()?.contains(address, service))
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
