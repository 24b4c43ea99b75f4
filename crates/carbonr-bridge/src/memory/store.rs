//! Shared table storage behind the in-memory backend.
//!
//! A table is a folder path holding committed data and index files. The
//! store also records every backend option a builder handed over, so tests
//! can check what reached the storage layer.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use carbonr_core::{Schema, Value};
use uuid::Uuid;

use crate::call::Method;

/// Version string reported by `getVersionDetails`.
pub const SDK_VERSION: &str = "2.0.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Data,
    Index,
}

#[derive(Debug, Clone)]
pub struct StoredFile {
    pub name: String,
    pub kind: FileKind,
    pub schema: Schema,
    /// Empty for index files.
    pub rows: Vec<Vec<Value>>,
    pub written_by: String,
    pub version: String,
}

/// One backend option as received by a reader or writer build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    pub path: String,
    pub key: String,
    pub value: String,
}

#[derive(Debug, Default)]
struct StoreState {
    folders: BTreeMap<String, Vec<StoredFile>>,
    sink: Vec<ConfigEntry>,
    calls: BTreeMap<String, usize>,
}

/// Cheap to clone; all clones see the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<StoreState>>,
}

pub(crate) fn normalize(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        path.to_string()
    } else {
        trimmed.to_string()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit a table without going through a writer. Returns the data file path.
    pub fn seed_table(&self, path: &str, schema: &Schema, rows: Vec<Vec<Value>>) -> String {
        self.commit(path, schema.clone(), rows, "carbonr fixture")
    }

    /// Add one data file plus its index file to `path`.
    pub(crate) fn commit(&self, path: &str, schema: Schema, rows: Vec<Vec<Value>>, written_by: &str) -> String {
        let folder = normalize(path);
        let mut state = self.inner.borrow_mut();
        let files = state.folders.entry(folder.clone()).or_default();
        let part = files.iter().filter(|f| f.kind == FileKind::Data).count();
        let id = Uuid::new_v4().simple().to_string();
        let data_name = format!("part-{}-{}.carbondata", part, id);
        files.push(StoredFile {
            name: data_name.clone(),
            kind: FileKind::Data,
            schema: schema.clone(),
            rows,
            written_by: written_by.to_string(),
            version: SDK_VERSION.to_string(),
        });
        files.push(StoredFile {
            name: format!("{}.carbonindex", id),
            kind: FileKind::Index,
            schema,
            rows: Vec::new(),
            written_by: written_by.to_string(),
            version: SDK_VERSION.to_string(),
        });
        format!("{}/{}", folder, data_name)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.inner.borrow().folders.contains_key(&normalize(path))
    }

    /// Full paths of the files of one kind under a table folder.
    pub fn file_paths(&self, path: &str, kind: FileKind) -> Vec<String> {
        let folder = normalize(path);
        self.inner
            .borrow()
            .folders
            .get(&folder)
            .map(|files| {
                files
                    .iter()
                    .filter(|f| f.kind == kind)
                    .map(|f| format!("{}/{}", folder, f.name))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All rows of a table across its data files, in commit order.
    pub fn rows(&self, path: &str) -> Vec<Vec<Value>> {
        self.table(path).map(|(_, rows)| rows).unwrap_or_default()
    }

    pub fn row_count(&self, path: &str) -> usize {
        let folder = normalize(path);
        self.inner
            .borrow()
            .folders
            .get(&folder)
            .map(|files| files.iter().map(|f| f.rows.len()).sum())
            .unwrap_or(0)
    }

    /// Schema of the first data file plus every row; `None` without data files.
    pub(crate) fn table(&self, path: &str) -> Option<(Schema, Vec<Vec<Value>>)> {
        let state = self.inner.borrow();
        let files = state.folders.get(&normalize(path))?;
        let mut data = files.iter().filter(|f| f.kind == FileKind::Data);
        let first = data.next()?;
        let mut rows = first.rows.clone();
        for f in data {
            rows.extend(f.rows.iter().cloned());
        }
        Some((first.schema.clone(), rows))
    }

    /// A file addressed by its full path (`<folder>/<name>`).
    pub(crate) fn file(&self, file_path: &str) -> Option<StoredFile> {
        let (folder, name) = file_path.rsplit_once('/')?;
        let state = self.inner.borrow();
        state
            .folders
            .get(&normalize(folder))?
            .iter()
            .find(|f| f.name == name)
            .cloned()
    }

    pub(crate) fn first_data_file(&self, folder: &str) -> Option<StoredFile> {
        let state = self.inner.borrow();
        state
            .folders
            .get(&normalize(folder))?
            .iter()
            .find(|f| f.kind == FileKind::Data)
            .cloned()
    }

    pub(crate) fn record_config(&self, path: &str, key: &str, value: &str) {
        self.inner.borrow_mut().sink.push(ConfigEntry {
            path: path.to_string(),
            key: key.to_string(),
            value: value.to_string(),
        });
    }

    /// Every backend option received so far, oldest first.
    pub fn config_sink(&self) -> Vec<ConfigEntry> {
        self.inner.borrow().sink.clone()
    }

    /// Last value received for `key`, from any build.
    pub fn received(&self, key: &str) -> Option<String> {
        self.inner
            .borrow()
            .sink
            .iter()
            .rev()
            .find(|e| e.key == key)
            .map(|e| e.value.clone())
    }

    pub(crate) fn count_call(&self, method: &Method) {
        let class = method.class.rsplit('/').next().unwrap_or(method.class);
        let key = format!("{}.{}", class, method.name);
        *self.inner.borrow_mut().calls.entry(key).or_insert(0) += 1;
    }

    /// Calls made to `Class.method` (simple class name), e.g. `CarbonReader.hasNext`.
    pub fn calls(&self, name: &str) -> usize {
        self.inner.borrow().calls.get(name).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.inner.borrow().calls.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carbonr_core::{DataType, Field};

    fn schema() -> Schema {
        Schema::new(vec![Field::new("id", DataType::Int)])
    }

    #[test]
    fn commit_adds_data_and_index_files() {
        let store = MemoryStore::new();
        let data = store.seed_table("/tmp/t1/", &schema(), vec![vec![Value::Int(1)]]);
        assert!(data.starts_with("/tmp/t1/part-0-"));
        assert!(data.ends_with(".carbondata"));
        assert_eq!(store.file_paths("/tmp/t1", FileKind::Index).len(), 1);
        assert!(store.file(&data).is_some());
    }

    #[test]
    fn rows_span_data_files_in_commit_order() {
        let store = MemoryStore::new();
        store.seed_table("t", &schema(), vec![vec![Value::Int(1)]]);
        let second = store.seed_table("t", &schema(), vec![vec![Value::Int(2)], vec![Value::Int(3)]]);
        assert!(second.contains("part-1-"));
        assert_eq!(store.row_count("t"), 3);
        assert_eq!(store.rows("t")[2], vec![Value::Int(3)]);
    }

    #[test]
    fn sink_remembers_last_value() {
        let store = MemoryStore::new();
        store.record_config("s3a://b/t", "fs.s3a.access.key", "old");
        store.record_config("s3a://b/t", "fs.s3a.access.key", "new");
        assert_eq!(store.received("fs.s3a.access.key").as_deref(), Some("new"));
        assert_eq!(store.config_sink().len(), 2);
        assert_eq!(store.received("missing"), None);
    }
}
