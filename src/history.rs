use crate::config;
use crate::model::{DeviceId, HistoryRecord};
use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Backing store for past searches, scoped by device.
pub trait HistoryStore {
    fn fetch_history(&self, device: &DeviceId) -> Result<Vec<HistoryRecord>>;

    fn fetch_record(&self, device: &DeviceId, id: &str) -> Result<Option<HistoryRecord>>;

    /// Returns how many records were removed.
    fn clear_history(&mut self, device: &DeviceId) -> Result<usize>;

    /// Fails if the id is already taken on the record's device.
    fn record_search(&mut self, record: HistoryRecord) -> Result<()>;

    /// Appends in one write. Ids already taken on their device are skipped;
    /// returns how many records were added.
    fn record_searches(&mut self, records: Vec<HistoryRecord>) -> Result<usize>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    pub rows: usize,
    pub imported: usize,
}

/// Reads a JSON array of `library` rows and stores them under `device`.
/// Rows that fail boundary normalisation are skipped, not fatal.
pub fn import_file(
    store: &mut dyn HistoryStore,
    device: &DeviceId,
    path: &Path,
) -> Result<ImportReport> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let mut rows: Vec<Value> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    for row in &mut rows {
        if let Some(fields) = row.as_object_mut() {
            fields.insert(
                String::from("device_id"),
                Value::String(device.as_str().to_string()),
            );
        }
    }

    let total = rows.len();
    let records = parse_rows(rows);
    let imported = store.record_searches(records)?;
    log::info!("imported {imported} of {total} rows for {device}");
    Ok(ImportReport {
        rows: total,
        imported,
    })
}

/// Any store failure reads as "no history".
pub fn fetch_or_empty(store: &dyn HistoryStore, device: &DeviceId) -> Vec<HistoryRecord> {
    match store.fetch_history(device) {
        Ok(records) => records,
        Err(err) => {
            log::warn!("failed to fetch history for {device}: {err:#}");
            Vec::new()
        }
    }
}

pub fn sort_newest_first(records: &mut [HistoryRecord]) {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Rows live in one JSON array, shaped like the remote `library` table.
/// Rows are kept raw so unreadable or foreign rows survive rewrites.
#[derive(Debug, Clone)]
pub struct JsonHistoryStore {
    path: PathBuf,
}

impl JsonHistoryStore {
    pub fn open_default() -> Result<Self> {
        config::ensure_config_dir()?;
        Ok(Self::at(config::history_path()?))
    }

    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_rows(&self) -> Result<Vec<Value>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<Value> = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse {}", self.path.display()))?;
        Ok(rows)
    }

    fn save_rows(&self, rows: &[Value]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        if self.path.exists() {
            let backup = self.path.with_extension("json.bak");
            let _ = fs::copy(&self.path, &backup);
        }
        let json = serde_json::to_string_pretty(rows)?;
        fs::write(&self.path, json)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }
}

impl HistoryStore for JsonHistoryStore {
    fn fetch_history(&self, device: &DeviceId) -> Result<Vec<HistoryRecord>> {
        let rows = self.load_rows()?;
        let records: Vec<HistoryRecord> = rows
            .into_iter()
            .filter(|row| row_device(row) == Some(device.as_str()))
            .filter_map(parse_row)
            .collect();
        log::debug!("fetched {} history records for {device}", records.len());
        Ok(records)
    }

    fn fetch_record(&self, device: &DeviceId, id: &str) -> Result<Option<HistoryRecord>> {
        let rows = self.load_rows()?;
        Ok(rows
            .into_iter()
            .filter(|row| row_device(row) == Some(device.as_str()))
            .filter(|row| row_id(row).as_deref() == Some(id))
            .find_map(parse_row))
    }

    fn clear_history(&mut self, device: &DeviceId) -> Result<usize> {
        let mut rows = self.load_rows()?;
        let before = rows.len();
        rows.retain(|row| row_device(row) != Some(device.as_str()));
        let removed = before - rows.len();
        if removed > 0 {
            self.save_rows(&rows)?;
        }
        log::info!("cleared {removed} history records for {device}");
        Ok(removed)
    }

    fn record_search(&mut self, record: HistoryRecord) -> Result<()> {
        let mut rows = self.load_rows()?;
        let taken = rows.iter().any(|row| {
            row_device(row) == Some(record.device_id.as_str())
                && row_id(row).as_deref() == Some(record.id.as_str())
        });
        if taken {
            bail!(
                "history record {} already exists for {}",
                record.id,
                record.device_id
            );
        }
        rows.push(encode_record(&record)?);
        self.save_rows(&rows)
    }

    fn record_searches(&mut self, records: Vec<HistoryRecord>) -> Result<usize> {
        let mut rows = self.load_rows()?;
        let mut taken: HashSet<(String, String)> = rows
            .iter()
            .filter_map(|row| Some((row_device(row)?.to_string(), row_id(row)?)))
            .collect();

        let mut added = 0;
        for record in records {
            let key = (record.device_id.as_str().to_string(), record.id.clone());
            if !taken.insert(key) {
                log::warn!(
                    "skipping duplicate history record {} for {}",
                    record.id,
                    record.device_id
                );
                continue;
            }
            rows.push(encode_record(&record)?);
            added += 1;
        }

        if added > 0 {
            self.save_rows(&rows)?;
        }
        Ok(added)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryHistoryStore {
    pub records: Vec<HistoryRecord>,
}

impl MemoryHistoryStore {
    pub fn with_records(records: Vec<HistoryRecord>) -> Self {
        Self { records }
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn fetch_history(&self, device: &DeviceId) -> Result<Vec<HistoryRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|record| &record.device_id == device)
            .cloned()
            .collect())
    }

    fn fetch_record(&self, device: &DeviceId, id: &str) -> Result<Option<HistoryRecord>> {
        Ok(self
            .records
            .iter()
            .find(|record| &record.device_id == device && record.id == id)
            .cloned())
    }

    fn clear_history(&mut self, device: &DeviceId) -> Result<usize> {
        let before = self.records.len();
        self.records.retain(|record| &record.device_id != device);
        Ok(before - self.records.len())
    }

    fn record_search(&mut self, record: HistoryRecord) -> Result<()> {
        if self.contains(&record) {
            bail!(
                "history record {} already exists for {}",
                record.id,
                record.device_id
            );
        }
        self.records.push(record);
        Ok(())
    }

    fn record_searches(&mut self, records: Vec<HistoryRecord>) -> Result<usize> {
        let mut added = 0;
        for record in records {
            if self.contains(&record) {
                log::warn!(
                    "skipping duplicate history record {} for {}",
                    record.id,
                    record.device_id
                );
                continue;
            }
            self.records.push(record);
            added += 1;
        }
        Ok(added)
    }
}

impl MemoryHistoryStore {
    fn contains(&self, record: &HistoryRecord) -> bool {
        self.records
            .iter()
            .any(|stored| stored.device_id == record.device_id && stored.id == record.id)
    }
}

fn encode_record(record: &HistoryRecord) -> Result<Value> {
    serde_json::to_value(record)
        .with_context(|| format!("failed to encode history record {}", record.id))
}

pub fn parse_rows(rows: Vec<Value>) -> Vec<HistoryRecord> {
    rows.into_iter().filter_map(parse_row).collect()
}

fn row_device(row: &Value) -> Option<&str> {
    row.get("device_id").and_then(Value::as_str)
}

fn row_id(row: &Value) -> Option<String> {
    match row.get("id")? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Rows without an id, title or readable `created_at` never reach the stats.
fn parse_row(mut row: Value) -> Option<HistoryRecord> {
    let numeric_id = match row.get("id") {
        Some(Value::Number(id)) => Some(id.to_string()),
        _ => None,
    };
    if let Some(id) = numeric_id {
        row["id"] = Value::String(id);
    }
    let id = row_id(&row).unwrap_or_else(|| String::from("?"));
    match serde_json::from_value::<HistoryRecord>(row) {
        Ok(record) => Some(record),
        Err(err) => {
            log::warn!("skipping malformed history row {id}: {err}");
            None
        }
    }
}
