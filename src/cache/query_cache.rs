//! File-backed store of saved query results.
//!
//! Records are keyed by their (lat, lon, date) triple, with a secondary
//! index on capture time for listing saved queries newest first. The whole
//! store is held in memory and rewritten to disk after every change.

use crate::cache::error::CacheError;
use crate::types::cached_query::CachedQuery;
use crate::types::location::{LatLon, QueryKey};
use crate::types::metric::MetricType;
use crate::types::weather_data::WeatherData;
use crate::utils::ensure_cache_dir_exists;
use bincode::config::{Configuration, Fixint, LittleEndian};
use bincode::error::DecodeError;
use chrono::{DateTime, Duration, SubsecRound, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const CACHE_FILE_NAME: &str = "queries.bin";
const BINCODE_CONFIG: Configuration<LittleEndian, Fixint> =
    bincode::config::standard().with_fixed_int_encoding();

/// Layout version written at the start of the cache file. A file with any
/// other version is wiped on open.
pub const SCHEMA_VERSION: u32 = 2;

#[derive(Deserialize)]
struct StoredQueries {
    next_id: u64,
    records: Vec<CachedQuery>,
}

// Borrowed twin of `StoredQueries`; both encode to the same bytes.
#[derive(Serialize)]
struct StoredQueriesRef<'a> {
    next_id: u64,
    records: Vec<&'a CachedQuery>,
}

enum LoadedFile {
    Current(StoredQueries),
    Outdated(u32),
    Corrupt(Box<DecodeError>),
}

/// Whether an upsert created a record or overwrote an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertKind {
    Inserted,
    Updated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub id: u64,
    pub kind: UpsertKind,
}

#[derive(Debug)]
pub struct QueryCache {
    cache_file: PathBuf,
    next_id: u64,
    records: HashMap<u64, CachedQuery>,
    by_key: HashMap<QueryKey, u64>,
    by_time: BTreeSet<(DateTime<Utc>, u64)>,
}

impl QueryCache {
    /// Opens the store in `cache_dir`, creating the directory if needed.
    ///
    /// A missing file gives an empty store. A file written with a different
    /// [`SCHEMA_VERSION`] is wiped. A file that cannot be decoded is renamed
    /// to `queries.bin.corrupt` and the store starts empty.
    pub async fn open(cache_dir: &Path) -> Result<Self, CacheError> {
        ensure_cache_dir_exists(cache_dir).await?;
        let cache_file = cache_dir.join(CACHE_FILE_NAME);
        let mut cache = Self::empty(cache_file.clone());

        if !cache_file.exists() {
            debug!("No query cache at {}, starting empty", cache_file.display());
            return Ok(cache);
        }

        let path_clone = cache_file.clone();
        let loaded =
            tokio::task::spawn_blocking(move || Self::read_cache_file(&path_clone)).await??;
        match loaded {
            LoadedFile::Current(stored) => {
                cache.next_id = stored.next_id;
                for record in stored.records {
                    cache.index(record);
                }
                info!(
                    "Loaded {} saved queries from {}",
                    cache.len(),
                    cache_file.display()
                );
            }
            LoadedFile::Outdated(found) => {
                warn!(
                    "Query cache {} has schema version {}, expected {}. Clearing it.",
                    cache_file.display(),
                    found,
                    SCHEMA_VERSION
                );
                cache.write_snapshot(Vec::new(), cache.next_id).await?;
            }
            LoadedFile::Corrupt(e) => {
                let aside = cache_file.with_extension("bin.corrupt");
                warn!(
                    "Query cache {} is unreadable ({}), moved it to {}",
                    cache_file.display(),
                    e,
                    aside.display()
                );
                tokio::fs::rename(&cache_file, &aside)
                    .await
                    .map_err(|e| CacheError::CacheWrite(aside.clone(), e))?;
            }
        }
        Ok(cache)
    }

    fn empty(cache_file: PathBuf) -> Self {
        Self {
            cache_file,
            next_id: 1,
            records: HashMap::new(),
            by_key: HashMap::new(),
            by_time: BTreeSet::new(),
        }
    }

    fn read_cache_file(path: &Path) -> Result<LoadedFile, CacheError> {
        let bytes =
            std::fs::read(path).map_err(|e| CacheError::CacheRead(path.to_path_buf(), e))?;

        let (version, header_len) =
            match bincode::serde::decode_from_slice::<u32, _>(&bytes, BINCODE_CONFIG) {
                Ok(header) => header,
                Err(e) => return Ok(LoadedFile::Corrupt(Box::new(e))),
            };
        if version != SCHEMA_VERSION {
            return Ok(LoadedFile::Outdated(version));
        }
        let body = &bytes[header_len..];
        Ok(
            match bincode::serde::decode_from_slice::<StoredQueries, _>(body, BINCODE_CONFIG) {
                Ok((stored, _)) => LoadedFile::Current(stored),
                Err(e) => LoadedFile::Corrupt(Box::new(e)),
            },
        )
    }

    fn index(&mut self, record: CachedQuery) {
        let key = match record.key() {
            Ok(key) => key,
            Err(e) => {
                warn!("Skipping saved query #{}: {}", record.id, e);
                return;
            }
        };
        if let Some(previous) = self.by_key.insert(key, record.id) {
            if let Some(old) = self.records.remove(&previous) {
                self.by_time.remove(&(old.timestamp, old.id));
            }
        }
        self.next_id = self.next_id.max(record.id + 1);
        self.by_time.insert((record.timestamp, record.id));
        self.records.insert(record.id, record);
    }

    /// Looks up the saved query for `key`.
    pub fn find(&self, key: &QueryKey) -> Option<&CachedQuery> {
        self.by_key.get(key).and_then(|id| self.records.get(id))
    }

    pub fn get(&self, id: u64) -> Option<&CachedQuery> {
        self.records.get(&id)
    }

    /// Saves `data` under `key`, overwriting the types, data and timestamp of
    /// an existing record for the same key.
    ///
    /// The file is rewritten first. If that fails the in-memory store is
    /// left as it was.
    pub async fn upsert(
        &mut self,
        key: QueryKey,
        selected_types: Vec<MetricType>,
        data: WeatherData,
    ) -> Result<UpsertOutcome, CacheError> {
        let (id, kind) = match self.by_key.get(&key) {
            Some(id) => (*id, UpsertKind::Updated),
            None => (self.next_id, UpsertKind::Inserted),
        };
        let LatLon(lat, lon) = key.location();
        let record = CachedQuery {
            id,
            lat,
            lon,
            date: key.date(),
            selected_types,
            data,
            timestamp: self.next_timestamp(),
        };

        let snapshot: Vec<&CachedQuery> = self
            .records
            .values()
            .filter(|stored| stored.id != id)
            .chain(std::iter::once(&record))
            .collect();
        self.write_snapshot(snapshot, self.next_id.max(id + 1)).await?;

        self.index(record);
        Ok(UpsertOutcome { id, kind })
    }

    /// Saved queries, newest capture first.
    pub fn recent(&self) -> impl Iterator<Item = &CachedQuery> + '_ {
        self.by_time
            .iter()
            .rev()
            .filter_map(|(_, id)| self.records.get(id))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Removes every saved query. Ids keep counting up from where they were.
    pub async fn clear(&mut self) -> Result<(), CacheError> {
        self.write_snapshot(Vec::new(), self.next_id).await?;
        self.records.clear();
        self.by_key.clear();
        self.by_time.clear();
        info!("Cleared query cache at {}", self.cache_file.display());
        Ok(())
    }

    // Millisecond precision, strictly after the newest stored capture.
    fn next_timestamp(&self) -> DateTime<Utc> {
        let now = Utc::now().trunc_subsecs(3);
        match self.by_time.last() {
            Some((newest, _)) if now <= *newest => *newest + Duration::milliseconds(1),
            _ => now,
        }
    }

    async fn write_snapshot(
        &self,
        mut records: Vec<&CachedQuery>,
        next_id: u64,
    ) -> Result<(), CacheError> {
        records.sort_by_key(|record| record.id);
        let view = StoredQueriesRef { next_id, records };

        let encode_err = |e| CacheError::CacheEncode(Box::new(e));
        let mut bytes =
            bincode::serde::encode_to_vec(SCHEMA_VERSION, BINCODE_CONFIG).map_err(encode_err)?;
        bytes.extend(bincode::serde::encode_to_vec(&view, BINCODE_CONFIG).map_err(encode_err)?);

        let cache_file = self.cache_file.clone();
        let written = bytes.len();
        tokio::task::spawn_blocking(move || Self::write_atomically(&cache_file, &bytes))
            .await??;
        debug!(
            "Wrote query cache ({} bytes) to {}",
            written,
            self.cache_file.display()
        );
        Ok(())
    }

    fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), CacheError> {
        let write_err = |e| CacheError::CacheWrite(path.to_path_buf(), e);
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut temp_file = NamedTempFile::new_in(dir).map_err(write_err)?;
        temp_file.write_all(bytes).map_err(write_err)?;
        temp_file.as_file().sync_all().map_err(write_err)?;
        temp_file.persist(path).map_err(|e| write_err(e.error))?;
        Ok(())
    }
}
