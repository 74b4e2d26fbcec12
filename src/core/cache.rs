use crate::core::config::validate_cache_time;
use crate::core::errors::{Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, info};
use std::fs;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::{NamedTempFile, TempDir};

/*-------------------------------------------------------------------------------------------------
  Cache Store
-------------------------------------------------------------------------------------------------*/

/// Key-value store whose entries expire a fixed time after they are written.
pub trait CacheStore {
    /// Whether a value is stored under `key` and has not expired. An entry expires at exactly
    /// `write time + ttl`.
    fn exists(&self, key: &str) -> Result<bool>;

    /// The bytes stored under `key`, whether or not the entry has expired; fails with
    /// [Error::CacheMiss] when nothing is stored. Check [CacheStore::exists] first.
    fn get(&self, key: &str) -> Result<Vec<u8>>;

    /// Store `value` under `key`, replacing any prior value, expiring `ttl` from now.
    fn put(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()>;
}

/*-------------------------------------------------------------------------------------------------
  File Cache
-------------------------------------------------------------------------------------------------*/

/// A [CacheStore] backed by a directory on disk. Independent processes may share a cache
/// directory: each entry is a single `<key>.cache` file that is replaced atomically, so readers
/// see either the previous or the new entry, never a partial write. On Unix, entry files are
/// written with mode `0644`; users that refresh a shared cache need write access to the
/// directory itself.
///
/// ```
/// use awsipcache::{CacheStore, FileCache};
///
/// let cache = FileCache::temporary(60 * 60)?; // 1 hour
/// cache.put("greeting", b"hello", cache.cache_time())?;
///
/// assert!(cache.exists("greeting")?);
/// assert_eq!(cache.get("greeting")?, b"hello");
/// # Ok::<(), awsipcache::Error>(())
/// ```
#[derive(Debug)]
pub struct FileCache {
    root: PathBuf,
    cache_time: Duration,

    // Keeps a temporary root alive (and removes it on drop).
    _temp_dir: Option<TempDir>,
}

/*--------------------------------------------------------------------------------------
  File Cache Implementation
--------------------------------------------------------------------------------------*/

impl FileCache {
    /// Open a file cache rooted at `root` (created if absent) with a default cache time of
    /// `cache_time` seconds. A zero or negative cache time is rejected before the file system
    /// is touched.
    pub fn new<P: AsRef<Path>>(root: P, cache_time: i64) -> Result<Self> {
        let cache_time = validate_cache_time(cache_time)?;
        let root = root.as_ref().to_path_buf();

        fs::create_dir_all(&root)?;
        info!("Cache directory: {:?}", &root);

        Ok(Self {
            root,
            cache_time,
            _temp_dir: None,
        })
    }

    /// Open a file cache in a fresh temporary directory that is removed when the cache is
    /// dropped.
    pub fn temporary(cache_time: i64) -> Result<Self> {
        let cache_time = validate_cache_time(cache_time)?;
        let temp_dir = tempfile::Builder::new().prefix("awsipcache-").tempdir()?;
        info!("Temporary cache directory: {:?}", temp_dir.path());

        Ok(Self {
            root: temp_dir.path().to_path_buf(),
            cache_time,
            _temp_dir: Some(temp_dir),
        })
    }

    /*-------------------------------------------------------------------------
      Getters
    -------------------------------------------------------------------------*/

    /// Directory the cache entries are stored in.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Default time-to-live for new entries.
    pub fn cache_time(&self) -> Duration {
        self.cache_time
    }

    /*-------------------------------------------------------------------------
      Clock-Explicit Operations
    -------------------------------------------------------------------------*/

    pub(crate) fn exists_at(&self, key: &str, now: DateTime<Utc>) -> Result<bool> {
        let expires_at = match self.read_expiry(key)? {
            Some(expires_at) => expires_at,
            None => {
                debug!("Cache entry `{}` not found", key);
                return Ok(false);
            }
        };

        let live = now < expires_at;
        debug!(
            "Cache entry `{}` expires at {}; {}",
            key,
            expires_at,
            if live { "fresh" } else { "expired" }
        );
        Ok(live)
    }

    pub(crate) fn put_at(
        &self,
        key: &str,
        value: &[u8],
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| Error::Config(format!("cache time out of range: {ttl:?}")))?;
        let path = self.entry_path(key)?;

        // Write the complete entry to a temporary file in the same directory, then atomically
        // rename it over the entry file.
        let mut file = NamedTempFile::new_in(&self.root)?;
        set_shared_permissions(file.as_file())?;
        writeln!(
            file,
            "{}",
            expires_at.to_rfc3339_opts(SecondsFormat::Nanos, true)
        )?;
        file.write_all(value)?;
        file.as_file().sync_all()?;
        file.persist(&path).map_err(|error| error.error)?;

        info!(
            "Cached `{}` ({} bytes) to {:?}; expires at {}",
            key,
            value.len(),
            &path,
            expires_at
        );
        Ok(())
    }

    /*-------------------------------------------------------------------------
      Private Methods
    -------------------------------------------------------------------------*/

    fn entry_path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) {
            return Err(Error::Config(format!("invalid cache key: {key:?}")));
        }
        Ok(self.root.join(format!("{key}.cache")))
    }

    /// Read the expiry header of the entry stored under `key`, if any.
    fn read_expiry(&self, key: &str) -> Result<Option<DateTime<Utc>>> {
        let file = match fs::File::open(self.entry_path(key)?) {
            Ok(file) => file,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(error.into()),
        };

        let mut header = String::new();
        BufReader::new(file)
            .read_line(&mut header)
            .map_err(|error| corrupt(key, error))?;

        parse_expiry(key, &header).map(Some)
    }
}

impl CacheStore for FileCache {
    fn exists(&self, key: &str) -> Result<bool> {
        self.exists_at(key, Utc::now())
    }

    fn get(&self, key: &str) -> Result<Vec<u8>> {
        let mut contents = match fs::read(self.entry_path(key)?) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Err(Error::CacheMiss(key.to_string()))
            }
            Err(error) => return Err(error.into()),
        };

        let header_len = contents
            .iter()
            .position(|byte| *byte == b'\n')
            .ok_or_else(|| corrupt(key, "missing expiry header"))?;

        let header = std::str::from_utf8(&contents[..header_len])
            .map_err(|error| corrupt(key, error))?;
        parse_expiry(key, header)?;

        debug!("Read cache entry `{}` from {:?}", key, &self.root);
        Ok(contents.split_off(header_len + 1))
    }

    fn put(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        self.put_at(key, value, ttl, Utc::now())
    }
}

/*-------------------------------------------------------------------------------------------------
  Helper Functions
-------------------------------------------------------------------------------------------------*/

/// Entry files are readable by every user sharing the cache directory.
#[cfg(unix)]
fn set_shared_permissions(file: &fs::File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_shared_permissions(_file: &fs::File) -> io::Result<()> {
    Ok(())
}

fn parse_expiry(key: &str, header: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(header.trim_end())
        .map(|expires_at| expires_at.with_timezone(&Utc))
        .map_err(|error| corrupt(key, format!("invalid expiry header: {error}")))
}

fn corrupt<E: ToString>(key: &str, reason: E) -> Error {
    Error::CorruptCache {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::errors::log_error;
    use chrono::TimeZone;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;
    use test_log::test;

    /*----------------------------------------------------------------------------------
      In-Memory Cache Store
    ----------------------------------------------------------------------------------*/

    /// In-memory [CacheStore] used to exercise the refresh logic without touching disk.
    #[derive(Debug, Default)]
    pub(crate) struct MemoryCache {
        entries: RefCell<HashMap<String, (DateTime<Utc>, Vec<u8>)>>,
        pub(crate) puts: RefCell<usize>,
    }

    impl MemoryCache {
        pub(crate) fn with_entry(key: &str, value: &[u8], expires_at: DateTime<Utc>) -> Self {
            let cache = MemoryCache::default();
            cache
                .entries
                .borrow_mut()
                .insert(key.to_string(), (expires_at, value.to_vec()));
            cache
        }

        pub(crate) fn stored(&self, key: &str) -> Option<Vec<u8>> {
            self.entries
                .borrow()
                .get(key)
                .map(|(_, value)| value.clone())
        }
    }

    impl CacheStore for MemoryCache {
        fn exists(&self, key: &str) -> Result<bool> {
            Ok(self
                .entries
                .borrow()
                .get(key)
                .is_some_and(|(expires_at, _)| Utc::now() < *expires_at))
        }

        fn get(&self, key: &str) -> Result<Vec<u8>> {
            self.stored(key)
                .ok_or_else(|| Error::CacheMiss(key.to_string()))
        }

        fn put(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
            let expires_at = Utc::now() + chrono::Duration::from_std(ttl).unwrap();
            self.entries
                .borrow_mut()
                .insert(key.to_string(), (expires_at, value.to_vec()));
            *self.puts.borrow_mut() += 1;
            Ok(())
        }
    }

    /*----------------------------------------------------------------------------------
      Test Helper Functions
    ----------------------------------------------------------------------------------*/

    fn test_cache() -> (FileCache, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::new(temp_dir.path(), 60).unwrap();
        (cache, temp_dir)
    }

    const TTL: Duration = Duration::from_secs(60);

    /*----------------------------------------------------------------------------------
      Construction
    ----------------------------------------------------------------------------------*/

    #[test]
    fn test_new_creates_root_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("nested").join("cache");

        let cache = FileCache::new(&root, 60).inspect_err(log_error).unwrap();
        assert!(root.is_dir());
        assert_eq!(cache.root(), root);
        assert_eq!(cache.cache_time(), TTL);
    }

    #[test]
    fn test_new_rejects_invalid_cache_time_before_touching_disk() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("never-created");

        for cache_time in [0, -5] {
            let result = FileCache::new(&root, cache_time);
            assert!(matches!(result, Err(Error::Config(_))));
        }
        assert!(!root.exists());
        assert!(matches!(FileCache::temporary(0), Err(Error::Config(_))));
    }

    #[test]
    fn test_temporary_root_is_removed_on_drop() {
        let cache = FileCache::temporary(60).unwrap();
        let root = cache.root().to_path_buf();
        assert!(root.is_dir());

        drop(cache);
        assert!(!root.exists());
    }

    /*----------------------------------------------------------------------------------
      Put, Get, and Exists
    ----------------------------------------------------------------------------------*/

    #[test]
    fn test_missing_entry() {
        let (cache, _temp_dir) = test_cache();
        assert!(!cache.exists("AWS_IPS").unwrap());
        assert!(matches!(cache.get("AWS_IPS"), Err(Error::CacheMiss(key)) if key == "AWS_IPS"));
    }

    #[test]
    fn test_put_then_get_is_byte_identical() {
        let (cache, _temp_dir) = test_cache();
        let value: Vec<u8> = b"{\"prefixes\": []}\n\nline two\r\n\x00\xff".to_vec();

        cache.put("AWS_IPS", &value, TTL).inspect_err(log_error).unwrap();

        assert!(cache.exists("AWS_IPS").unwrap());
        assert_eq!(cache.get("AWS_IPS").unwrap(), value);
    }

    #[test]
    fn test_put_empty_value() {
        let (cache, _temp_dir) = test_cache();
        cache.put("empty", b"", TTL).unwrap();
        assert_eq!(cache.get("empty").unwrap(), b"");
    }

    #[test]
    fn test_put_overwrites_prior_value() {
        let (cache, _temp_dir) = test_cache();
        cache.put("AWS_IPS", b"first", TTL).unwrap();
        cache.put("AWS_IPS", b"second", TTL).unwrap();
        assert_eq!(cache.get("AWS_IPS").unwrap(), b"second");
    }

    #[test]
    fn test_put_leaves_only_the_entry_file() {
        let (cache, temp_dir) = test_cache();
        cache.put("AWS_IPS", b"first", TTL).unwrap();
        cache.put("AWS_IPS", b"second", TTL).unwrap();

        let files: Vec<PathBuf> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        assert_eq!(files, vec![temp_dir.path().join("AWS_IPS.cache")]);
    }

    #[test]
    fn test_shared_root_between_caches() {
        let temp_dir = TempDir::new().unwrap();
        let writer = FileCache::new(temp_dir.path(), 60).unwrap();
        let reader = FileCache::new(temp_dir.path(), 60).unwrap();

        writer.put("AWS_IPS", b"shared", TTL).unwrap();
        assert!(reader.exists("AWS_IPS").unwrap());
        assert_eq!(reader.get("AWS_IPS").unwrap(), b"shared");
    }

    #[test]
    fn test_concurrent_reader_sees_whole_entries() {
        let temp_dir = TempDir::new().unwrap();
        let writer = FileCache::new(temp_dir.path(), 60).unwrap();
        let reader = FileCache::new(temp_dir.path(), 60).unwrap();
        let small = vec![b'a'; 2 * 1024 * 1024];
        let large = vec![b'b'; 3 * 1024 * 1024];
        writer.put("AWS_IPS", &small, TTL).unwrap();

        let done = AtomicBool::new(false);
        thread::scope(|scope| {
            scope.spawn(|| {
                for round in 0..100 {
                    let value = if round % 2 == 0 { &large } else { &small };
                    writer.put("AWS_IPS", value, TTL).unwrap();
                }
                done.store(true, Ordering::SeqCst);
            });

            let mut reads = 0;
            while !done.load(Ordering::SeqCst) || reads < 200 {
                let value = reader.get("AWS_IPS").unwrap();
                assert!(value == small || value == large, "partial entry: {} bytes", value.len());
                reads += 1;
            }
        });
    }

    #[cfg(unix)]
    #[test]
    fn test_entry_file_is_readable_by_other_users() {
        use std::os::unix::fs::PermissionsExt;

        let (cache, temp_dir) = test_cache();
        cache.put("AWS_IPS", b"shared", TTL).unwrap();

        let metadata = fs::metadata(temp_dir.path().join("AWS_IPS.cache")).unwrap();
        assert_eq!(metadata.permissions().mode() & 0o777, 0o644);
    }

    #[test]
    fn test_invalid_key() {
        let (cache, _temp_dir) = test_cache();
        assert!(matches!(cache.put("../escape", b"x", TTL), Err(Error::Config(_))));
        assert!(matches!(cache.exists(""), Err(Error::Config(_))));
    }

    /*----------------------------------------------------------------------------------
      Expiry
    ----------------------------------------------------------------------------------*/

    #[test]
    fn test_ttl_boundary() {
        let (cache, _temp_dir) = test_cache();
        let written = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let ttl = chrono::Duration::seconds(60);
        let second = chrono::Duration::seconds(1);

        cache.put_at("AWS_IPS", b"data", TTL, written).unwrap();

        assert!(cache.exists_at("AWS_IPS", written).unwrap());
        assert!(cache.exists_at("AWS_IPS", written + ttl - second).unwrap());
        // Expiry is exclusive: the entry is stale at exactly write time + ttl
        assert!(!cache.exists_at("AWS_IPS", written + ttl).unwrap());
        assert!(!cache.exists_at("AWS_IPS", written + ttl + second).unwrap());
    }

    #[test]
    fn test_expired_entry_bytes_remain_readable() {
        let (cache, _temp_dir) = test_cache();
        let long_ago = Utc::now() - chrono::Duration::days(2);

        cache.put_at("AWS_IPS", b"stale", TTL, long_ago).unwrap();

        assert!(!cache.exists("AWS_IPS").unwrap());
        assert_eq!(cache.get("AWS_IPS").unwrap(), b"stale");
    }

    /*----------------------------------------------------------------------------------
      Corruption
    ----------------------------------------------------------------------------------*/

    #[test]
    fn test_corrupt_header() {
        let (cache, temp_dir) = test_cache();
        fs::write(temp_dir.path().join("AWS_IPS.cache"), b"not a timestamp\n{}").unwrap();

        assert!(matches!(cache.exists("AWS_IPS"), Err(Error::CorruptCache { .. })));
        assert!(matches!(cache.get("AWS_IPS"), Err(Error::CorruptCache { .. })));
    }

    #[test]
    fn test_missing_header() {
        let (cache, temp_dir) = test_cache();
        fs::write(temp_dir.path().join("AWS_IPS.cache"), b"no newline at all").unwrap();

        assert!(matches!(cache.get("AWS_IPS"), Err(Error::CorruptCache { .. })));
    }
}
