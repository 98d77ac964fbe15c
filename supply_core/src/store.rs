//! The supplement store and its `.sup` file persistence.
//!
//! A `.sup` file is a JSON document holding the ordered supplement list and
//! the time it was last saved. Every load runs one decrement pass for the
//! whole days elapsed since that time; saving replaces the file atomically.

use crate::usage::{self, decrement_pass};
use crate::{Error, LoadError, Result, SaveError, Supplement, SupplementUpdate};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use uuid::Uuid;

/// On-disk layout of a `.sup` file
#[derive(Debug, Serialize, Deserialize)]
struct SupFile {
    #[serde(alias = "save_date", deserialize_with = "deserialize_saved_at")]
    last_saved_at: DateTime<Utc>,
    supplements: Vec<Supplement>,
}

fn deserialize_saved_at<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_saved_at(&raw).map_err(serde::de::Error::custom)
}

/// Accept an RFC 3339 datetime, a naive datetime (taken as UTC), or a bare
/// date (midnight UTC)
fn parse_saved_at(raw: &str) -> std::result::Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("invalid timestamp {raw:?}, expected an ISO-8601 date or datetime"))
}

/// Ordered collection of supplements plus the time it was last persisted
#[derive(Clone, Debug, PartialEq)]
pub struct Store {
    supplements: Vec<Supplement>,
    last_saved_at: DateTime<Utc>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// An empty store stamped with the current time
    pub fn new() -> Self {
        Self::new_at(Utc::now())
    }

    pub fn new_at(now: DateTime<Utc>) -> Self {
        Self {
            supplements: Vec::new(),
            last_saved_at: now,
        }
    }

    pub fn last_saved_at(&self) -> DateTime<Utc> {
        self.last_saved_at
    }

    /// All supplements in list order
    pub fn list(&self) -> &[Supplement] {
        &self.supplements
    }

    pub fn len(&self) -> usize {
        self.supplements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.supplements.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&Supplement> {
        self.supplements.iter().find(|s| s.id == id)
    }

    fn position(&self, id: Uuid) -> Result<usize> {
        self.supplements
            .iter()
            .position(|s| s.id == id)
            .ok_or(Error::NotFound(id))
    }

    /// Validate and append a supplement, returning its id
    pub fn add(&mut self, supplement: Supplement) -> Result<Uuid> {
        supplement.validate()?;
        if self.get(supplement.id).is_some() {
            return Err(Error::DuplicateId(supplement.id));
        }

        let id = supplement.id;
        tracing::debug!("Adding supplement {:?} ({})", supplement.name, id);
        self.supplements.push(supplement);
        Ok(id)
    }

    /// Apply a partial edit. The record is only replaced if the edited
    /// version passes validation.
    ///
    /// The zero-dose rule is only checked when the edit touches the dose or
    /// the tracking flag, so older records holding a zero dose stay editable.
    pub fn update(&mut self, id: Uuid, update: &SupplementUpdate) -> Result<&Supplement> {
        let index = self.position(id)?;
        let updated = update.apply_to(&self.supplements[index]);
        if update.touches_usage() {
            updated.validate()?;
        } else {
            updated.validate_stored()?;
        }

        self.supplements[index] = updated;
        Ok(&self.supplements[index])
    }

    pub fn remove(&mut self, id: Uuid) -> Result<Supplement> {
        let index = self.position(id)?;
        Ok(self.supplements.remove(index))
    }

    /// Supplements whose name or tags contain `query`, in list order.
    ///
    /// The iterator is lazy and can be cloned to restart the scan.
    pub fn search<'a>(
        &'a self,
        query: &'a str,
    ) -> impl Iterator<Item = &'a Supplement> + Clone + 'a {
        self.supplements.iter().filter(move |s| s.matches(query))
    }

    /// Supplements with a known days remaining at or below `threshold_days`
    pub fn low_stock(&self, threshold_days: f64) -> impl Iterator<Item = &Supplement> + Clone {
        self.supplements
            .iter()
            .filter(move |s| s.is_low(threshold_days))
    }

    /// The supplement that runs out first, with its days remaining
    pub fn next_empty(&self) -> Option<(&Supplement, f64)> {
        usage::next_empty(&self.supplements)
    }

    /// Run the decrement pass if at least one whole day has passed since
    /// the last save or refresh. Returns whether a pass ran.
    pub fn refresh(&mut self) -> bool {
        self.refresh_at(Utc::now())
    }

    pub fn refresh_at(&mut self, now: DateTime<Utc>) -> bool {
        let days = usage::elapsed_days(self.last_saved_at, now);
        if days == 0 {
            return false;
        }

        tracing::debug!("Refreshing counts for {} elapsed day(s)", days);
        self.supplements = decrement_pass(&self.supplements, self.last_saved_at, now);
        self.last_saved_at = usage::advance_baseline(self.last_saved_at, now);
        true
    }

    /// Read a store from a `.sup` file, applying the decrement pass for the
    /// time elapsed since the file was saved
    pub fn load_from(path: &Path, now: DateTime<Utc>) -> std::result::Result<Self, LoadError> {
        let contents = read_locked(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let file: SupFile = serde_json::from_str(&contents).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        for (index, supplement) in file.supplements.iter().enumerate() {
            supplement
                .validate_stored()
                .map_err(|source| LoadError::InvalidRecord {
                    path: path.to_path_buf(),
                    index,
                    source,
                })?;
        }

        let days = usage::elapsed_days(file.last_saved_at, now);
        let mut supplements = decrement_pass(&file.supplements, file.last_saved_at, now);
        dedupe_ids(&mut supplements);

        tracing::debug!(
            "Loaded {} supplements from {:?} ({} day(s) since last save)",
            supplements.len(),
            path,
            days
        );

        Ok(Self {
            supplements,
            last_saved_at: usage::advance_baseline(file.last_saved_at, now),
        })
    }

    /// Replace this store with the contents of `path`.
    ///
    /// On failure the store is left exactly as it was.
    pub fn load(&mut self, path: &Path) -> std::result::Result<(), LoadError> {
        self.load_at(path, Utc::now())
    }

    pub fn load_at(
        &mut self,
        path: &Path,
        now: DateTime<Utc>,
    ) -> std::result::Result<(), LoadError> {
        *self = Self::load_from(path, now)?;
        Ok(())
    }

    /// Write the store to `path`, stamping it with the current time
    pub fn save(&mut self, path: &Path) -> std::result::Result<(), SaveError> {
        self.save_at(path, Utc::now())
    }

    /// Write the store to `path` as of `now`.
    ///
    /// Whole days not yet decremented are applied and the timestamp moves
    /// forward by exactly those days, so a partial day carries over to the
    /// next open. Nothing in memory changes unless the write succeeds.
    pub fn save_at(
        &mut self,
        path: &Path,
        now: DateTime<Utc>,
    ) -> std::result::Result<(), SaveError> {
        let file = SupFile {
            last_saved_at: usage::advance_baseline(self.last_saved_at, now),
            supplements: decrement_pass(&self.supplements, self.last_saved_at, now),
        };

        let contents =
            serde_json::to_string_pretty(&file).map_err(|source| SaveError::Serialize {
                path: path.to_path_buf(),
                source,
            })?;

        write_atomic(path, contents.as_bytes())?;

        tracing::debug!("Saved {} supplements to {:?}", file.supplements.len(), path);
        self.supplements = file.supplements;
        self.last_saved_at = file.last_saved_at;
        Ok(())
    }
}

/// Read the whole file under a shared lock
fn read_locked(path: &Path) -> io::Result<String> {
    let file = File::open(path)?;
    FileExt::lock_shared(&file)?;

    let mut contents = String::new();
    let read = BufReader::new(&file).read_to_string(&mut contents);
    FileExt::unlock(&file)?;
    read?;

    Ok(contents)
}

/// Atomically replace `path` by writing a synced temp file beside it and
/// renaming it into place
fn write_atomic(path: &Path, contents: &[u8]) -> std::result::Result<(), SaveError> {
    let io_err = |source: io::Error| SaveError::Io {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(io_err)?;

    let temp = NamedTempFile::new_in(parent).map_err(io_err)?;
    FileExt::lock_exclusive(temp.as_file()).map_err(io_err)?;

    {
        let mut writer = BufWriter::new(temp.as_file());
        writer.write_all(contents).map_err(io_err)?;
        writer.flush().map_err(io_err)?;
    }

    temp.as_file().sync_all().map_err(io_err)?;
    FileExt::unlock(temp.as_file()).map_err(io_err)?;

    temp.persist(path).map_err(|e| SaveError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;

    Ok(())
}

/// Hand-edited files can repeat an id; later copies get a fresh one
fn dedupe_ids(supplements: &mut [Supplement]) {
    let mut seen = HashSet::new();
    for supplement in supplements.iter_mut() {
        if !seen.insert(supplement.id) {
            tracing::debug!("Duplicate id {} for {:?}, reassigning", supplement.id, supplement.name);
            supplement.id = Uuid::new_v4();
            seen.insert(supplement.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ValidationError;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 8, 0, 0).unwrap()
    }

    fn sample_store() -> Store {
        let mut store = Store::new_at(t0());

        let mut d3 = Supplement::new("Vitamin D3", 30.0, 2.0);
        d3.initial_count = 60.0;
        d3.cost = 12.5;
        d3.tags = vec!["vitamins".into()];
        d3.link = Some("https://example.com/d3".into());
        store.add(d3).unwrap();

        let mut creatine = Supplement::new("Creatine", 500.0, 5.0);
        creatine.auto_decrement = false;
        creatine.tags = vec!["training".into(), "powder".into()];
        store.add(creatine).unwrap();

        store
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("stack.sup");

        let mut store = sample_store();
        store.save_at(&path, t0()).unwrap();

        let loaded = Store::load_from(&path, t0()).unwrap();
        assert_eq!(loaded, store);
        assert_eq!(loaded.list()[0].name, "Vitamin D3");
        assert_eq!(loaded.list()[1].name, "Creatine");
    }

    #[test]
    fn test_load_applies_elapsed_decrement_once() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("stack.sup");

        let mut store = sample_store();
        store.save_at(&path, t0()).unwrap();

        let now = t0() + Duration::days(5) + Duration::hours(3);
        let loaded = Store::load_from(&path, now).unwrap();

        assert_eq!(loaded.list()[0].current_count, 20.0);
        // Untracked record is untouched
        assert_eq!(loaded.list()[1].current_count, 500.0);
        // The three leftover hours stay pending
        assert_eq!(loaded.last_saved_at(), t0() + Duration::days(5));
    }

    #[test]
    fn test_load_clamps_at_zero() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("stack.sup");

        let mut store = sample_store();
        store.save_at(&path, t0()).unwrap();

        let loaded = Store::load_from(&path, t0() + Duration::days(20)).unwrap();
        assert_eq!(loaded.list()[0].current_count, 0.0);
    }

    #[test]
    fn test_load_legacy_format() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("legacy.sup");

        let json = r#"{
            "supplements": [
                {
                    "name": "Fish Oil",
                    "current_count": 90,
                    "initial_count": 120,
                    "cost": 24.99,
                    "tags": ["omega"],
                    "link": "",
                    "daily_dose": 3,
                    "last_updated": "2024-05-01"
                }
            ],
            "save_date": "2024-05-01"
        }"#;
        std::fs::write(&path, json).unwrap();

        let loaded = Store::load_from(&path, t0()).unwrap();
        let fish_oil = &loaded.list()[0];

        assert!(fish_oil.auto_decrement);
        // 2024-05-01T00:00Z to 2024-05-10T08:00Z is nine whole days
        assert_eq!(fish_oil.current_count, 90.0 - 27.0);
        assert_eq!(fish_oil.initial_count, 120.0);
    }

    #[test]
    fn test_load_tolerates_unknown_fields() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("future.sup");

        let json = r#"{
            "last_saved_at": "2024-05-10T08:00:00Z",
            "format_version": 3,
            "supplements": [
                {
                    "name": "Zinc",
                    "current_count": 40,
                    "initial_count": 100,
                    "cost": 6,
                    "tags": [],
                    "link": null,
                    "daily_dose": 1,
                    "auto_decrement": false,
                    "color": "blue"
                }
            ]
        }"#;
        std::fs::write(&path, json).unwrap();

        let loaded = Store::load_from(&path, t0()).unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(!loaded.list()[0].auto_decrement);
    }

    #[test]
    fn test_malformed_json_leaves_store_unchanged() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("broken.sup");
        std::fs::write(&path, "{ invalid json }").unwrap();

        let mut store = sample_store();
        let before = store.clone();

        let result = store.load_at(&path, t0() + Duration::days(3));
        assert!(matches!(result, Err(LoadError::Parse { .. })));
        assert_eq!(store, before);
    }

    #[test]
    fn test_missing_required_field_is_load_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("partial.sup");

        let json = r#"{
            "last_saved_at": "2024-05-10",
            "supplements": [
                {"name": "Good", "current_count": 1, "initial_count": 1, "cost": 1, "daily_dose": 1},
                {"name": "No dose", "current_count": 1, "initial_count": 1, "cost": 1}
            ]
        }"#;
        std::fs::write(&path, json).unwrap();

        let mut store = sample_store();
        let before = store.clone();
        assert!(matches!(
            store.load_at(&path, t0()),
            Err(LoadError::Parse { .. })
        ));
        assert_eq!(store, before);
    }

    #[test]
    fn test_negative_count_is_load_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("negative.sup");

        let json = r#"{
            "last_saved_at": "2024-05-10",
            "supplements": [
                {"name": "Bad", "current_count": -4, "initial_count": 1, "cost": 1, "daily_dose": 1}
            ]
        }"#;
        std::fs::write(&path, json).unwrap();

        match Store::load_from(&path, t0()) {
            Err(LoadError::InvalidRecord { index, source, .. }) => {
                assert_eq!(index, 0);
                assert!(matches!(source, ValidationError::Negative { .. }));
            }
            other => panic!("Expected InvalidRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nope.sup");

        assert!(matches!(
            Store::load_from(&path, t0()),
            Err(LoadError::Io { .. })
        ));
    }

    #[test]
    fn test_failed_save_keeps_state() {
        let temp_dir = tempfile::tempdir().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();
        let path = blocker.join("stack.sup");

        let mut store = sample_store();
        let before = store.clone();

        let result = store.save_at(&path, t0() + Duration::days(2));
        assert!(matches!(result, Err(SaveError::Io { .. })));
        assert_eq!(store, before);
        assert_eq!(store.last_saved_at(), t0());
    }

    #[test]
    fn test_failed_persist_leaves_previous_target() {
        let temp_dir = tempfile::tempdir().unwrap();
        let target = temp_dir.path().join("occupied");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("keep.txt"), "keep").unwrap();

        let mut store = sample_store();
        let result = store.save_at(&target, t0());

        assert!(matches!(result, Err(SaveError::Persist { .. })));
        assert!(target.join("keep.txt").exists());
        assert_eq!(store.last_saved_at(), t0());

        // Only the untouched directory remains, no stray temp files
        let entries: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_save_applies_pending_days() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("stack.sup");

        let mut store = sample_store();
        let later = t0() + Duration::days(4);
        store.save_at(&path, later).unwrap();

        assert_eq!(store.list()[0].current_count, 22.0);
        assert_eq!(store.last_saved_at(), later);

        let loaded = Store::load_from(&path, later).unwrap();
        assert_eq!(loaded.list()[0].current_count, 22.0);
    }

    #[test]
    fn test_frequent_saves_keep_partial_days() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("stack.sup");

        let mut store = sample_store();
        store.save_at(&path, t0()).unwrap();

        // Open and save every 20 hours: no single cycle sees a whole day
        for cycle in 1..=5 {
            let now = t0() + Duration::hours(20 * cycle);
            store.load_at(&path, now).unwrap();
            store.save_at(&path, now).unwrap();
        }

        // 100 hours is four whole days, 8 doses of D3
        let loaded = Store::load_from(&path, t0() + Duration::hours(100)).unwrap();
        assert_eq!(loaded.list()[0].current_count, 22.0);
        assert_eq!(loaded.list()[1].current_count, 500.0);
        assert_eq!(loaded.last_saved_at(), t0() + Duration::days(4));
    }

    #[test]
    fn test_save_creates_parent_and_no_stray_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("stack.sup");

        sample_store().save_at(&path, t0()).unwrap();

        assert!(path.exists());
        let extras: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "stack.sup")
            .collect();
        assert!(extras.is_empty(), "Found extras: {:?}", extras);
    }

    #[test]
    fn test_refresh_requires_full_day() {
        let mut store = sample_store();

        assert!(!store.refresh_at(t0() + Duration::hours(23)));
        assert_eq!(store.list()[0].current_count, 30.0);
        assert_eq!(store.last_saved_at(), t0());

        let later = t0() + Duration::hours(49);
        assert!(store.refresh_at(later));
        assert_eq!(store.list()[0].current_count, 26.0);
        assert_eq!(store.list()[1].current_count, 500.0);
        assert_eq!(store.last_saved_at(), t0() + Duration::days(2));

        // One more hour completes the third day
        assert!(store.refresh_at(t0() + Duration::hours(72)));
        assert_eq!(store.list()[0].current_count, 24.0);
    }

    #[test]
    fn test_add_rejects_invalid_and_duplicate() {
        let mut store = sample_store();

        let bad = Supplement::new("", 10.0, 1.0);
        assert!(matches!(
            store.add(bad),
            Err(Error::Validation(ValidationError::EmptyName))
        ));

        let dup = store.list()[0].clone();
        assert!(matches!(store.add(dup), Err(Error::DuplicateId(_))));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_update_validates_before_commit() {
        let mut store = sample_store();
        let id = store.list()[0].id;

        let bad = SupplementUpdate {
            daily_dose: Some(0.0),
            ..Default::default()
        };
        assert!(matches!(
            store.update(id, &bad),
            Err(Error::Validation(ValidationError::ZeroDailyDose))
        ));
        assert_eq!(store.get(id).unwrap().daily_dose, 2.0);

        let good = SupplementUpdate {
            name: Some("Vitamin D3 5000IU".into()),
            current_count: Some(60.0),
            ..Default::default()
        };
        let updated = store.update(id, &good).unwrap();
        assert_eq!(updated.name, "Vitamin D3 5000IU");
        assert_eq!(updated.current_count, 60.0);
    }

    #[test]
    fn test_zero_dose_record_stays_editable() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("old.sup");

        let json = r#"{
            "last_saved_at": "2024-05-10T08:00:00Z",
            "supplements": [
                {"name": "Old", "current_count": 10, "initial_count": 10, "cost": 4, "daily_dose": 0}
            ]
        }"#;
        std::fs::write(&path, json).unwrap();

        let mut store = Store::load_from(&path, t0()).unwrap();
        let id = store.list()[0].id;

        let cost = SupplementUpdate {
            cost: Some(5.0),
            ..Default::default()
        };
        assert_eq!(store.update(id, &cost).unwrap().cost, 5.0);

        let negative = SupplementUpdate {
            cost: Some(-1.0),
            ..Default::default()
        };
        assert!(matches!(
            store.update(id, &negative),
            Err(Error::Validation(ValidationError::Negative { .. }))
        ));

        for usage in [
            SupplementUpdate {
                auto_decrement: Some(true),
                ..Default::default()
            },
            SupplementUpdate {
                daily_dose: Some(0.0),
                ..Default::default()
            },
        ] {
            assert!(matches!(
                store.update(id, &usage),
                Err(Error::Validation(ValidationError::ZeroDailyDose))
            ));
        }
        assert_eq!(store.get(id).unwrap().cost, 5.0);

        let fixed = SupplementUpdate {
            daily_dose: Some(1.0),
            ..Default::default()
        };
        assert_eq!(store.update(id, &fixed).unwrap().daily_dose, 1.0);
    }

    #[test]
    fn test_remove_and_not_found() {
        let mut store = sample_store();
        let id = store.list()[0].id;

        let removed = store.remove(id).unwrap();
        assert_eq!(removed.name, "Vitamin D3");
        assert_eq!(store.list()[0].name, "Creatine");

        assert!(matches!(store.remove(id), Err(Error::NotFound(_))));
        assert!(matches!(
            store.update(id, &SupplementUpdate::default()),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_search_is_restartable() {
        let store = sample_store();

        let hits = store.search("POWDER");
        let first: Vec<_> = hits.clone().map(|s| s.name.as_str()).collect();
        let second: Vec<_> = hits.map(|s| s.name.as_str()).collect();

        assert_eq!(first, vec!["Creatine"]);
        assert_eq!(first, second);
        assert_eq!(store.search("").count(), 2);
    }

    #[test]
    fn test_low_stock_and_next_empty() {
        let store = sample_store();

        let low: Vec<_> = store.low_stock(15.0).map(|s| s.name.as_str()).collect();
        assert_eq!(low, vec!["Vitamin D3"]);
        assert_eq!(store.low_stock(14.0).count(), 0);

        let (supp, days) = store.next_empty().unwrap();
        assert_eq!(supp.name, "Vitamin D3");
        assert_eq!(days, 15.0);
    }

    #[test]
    fn test_duplicate_ids_reassigned_on_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("dupes.sup");

        let id = "7f1c4f5e-3a7b-4c59-9a3e-2f1d0c6b8a11";
        let json = format!(
            r#"{{
                "last_saved_at": "2024-05-10T08:00:00Z",
                "supplements": [
                    {{"id": "{id}", "name": "A", "current_count": 1, "initial_count": 1, "cost": 1, "daily_dose": 1}},
                    {{"id": "{id}", "name": "B", "current_count": 1, "initial_count": 1, "cost": 1, "daily_dose": 1}}
                ]
            }}"#
        );
        std::fs::write(&path, json).unwrap();

        let loaded = Store::load_from(&path, t0()).unwrap();
        assert_eq!(loaded.list()[0].id.to_string(), id);
        assert_ne!(loaded.list()[1].id, loaded.list()[0].id);
    }

    #[test]
    fn test_parse_saved_at_formats() {
        assert_eq!(parse_saved_at("2024-05-10T08:00:00Z").unwrap(), t0());
        assert_eq!(parse_saved_at("2024-05-10T10:00:00+02:00").unwrap(), t0());
        assert_eq!(parse_saved_at("2024-05-10T08:00:00").unwrap(), t0());
        assert_eq!(parse_saved_at("2024-05-10T08:00").unwrap(), t0());
        assert_eq!(
            parse_saved_at("2024-05-10").unwrap(),
            Utc.with_ymd_and_hms(2024, 5, 10, 0, 0, 0).unwrap()
        );
        assert!(parse_saved_at("yesterday").is_err());
    }
}
