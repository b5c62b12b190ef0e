use anyhow::Context;
use std::collections::HashSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::model::StudentRecord;

/// Key under which the whole roster is stored as one JSON array.
pub const STUDENTS_KEY: &str = "students";

/// A key-value slot store holding serialized blobs.
pub trait Backend {
    fn read(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn write(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upserted {
    Appended,
    Replaced,
}

/// In-memory roster kept in insertion order, written through to `backend` in
/// full after every mutation.
pub struct RecordStore<B> {
    backend: B,
    records: Vec<StudentRecord>,
}

impl<B: Backend> RecordStore<B> {
    pub fn open(backend: B) -> anyhow::Result<Self> {
        let mut store = Self {
            backend,
            records: Vec::new(),
        };
        store.load()?;
        Ok(store)
    }

    /// Replaces the in-memory roster with whatever the backend holds. A missing
    /// or unparseable blob loads as an empty roster; only a failed backend read
    /// is an error.
    pub fn load(&mut self) -> anyhow::Result<&[StudentRecord]> {
        let raw = self
            .backend
            .read(STUDENTS_KEY)
            .context("failed to read stored roster")?;

        self.records = match raw {
            None => {
                info!("no stored roster; starting empty");
                Vec::new()
            }
            Some(blob) => match serde_json::from_str::<Vec<StudentRecord>>(&blob) {
                Ok(records) => {
                    let records = dedup_by_id(records);
                    info!(count = records.len(), "loaded stored roster");
                    records
                }
                Err(e) => {
                    warn!(error = %e, "stored roster is unreadable; starting empty");
                    Vec::new()
                }
            },
        };
        Ok(&self.records)
    }

    pub fn all(&self) -> &[StudentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn find_by_id(&self, id: &str) -> Option<&StudentRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find_by_id(id).is_some()
    }

    /// Fresh time-ordered id not held by any current record.
    pub fn mint_id(&self) -> String {
        loop {
            let id = Uuid::now_v7().to_string();
            if !self.contains(&id) {
                return id;
            }
        }
    }

    pub fn upsert(&mut self, record: StudentRecord) -> anyhow::Result<Upserted> {
        let mut next = self.records.clone();
        let outcome = match next.iter().position(|r| r.id == record.id) {
            Some(idx) => {
                next[idx] = record;
                Upserted::Replaced
            }
            None => {
                next.push(record);
                Upserted::Appended
            }
        };
        self.commit(next)?;
        Ok(outcome)
    }

    /// Returns whether a record was removed. Absent ids are not an error.
    pub fn remove(&mut self, id: &str) -> anyhow::Result<bool> {
        let mut next = self.records.clone();
        next.retain(|r| r.id != id);
        let removed = next.len() != self.records.len();
        self.commit(next)?;
        Ok(removed)
    }

    // The snapshot is persisted before it replaces the in-memory roster, so a
    // failed write leaves both sides at the previous state.
    fn commit(&mut self, next: Vec<StudentRecord>) -> anyhow::Result<()> {
        let blob = serde_json::to_string(&next).context("failed to serialize roster")?;
        self.backend
            .write(STUDENTS_KEY, &blob)
            .context("failed to write roster")?;
        debug!(count = next.len(), bytes = blob.len(), "roster persisted");
        self.records = next;
        Ok(())
    }
}

fn dedup_by_id(records: Vec<StudentRecord>) -> Vec<StudentRecord> {
    let mut seen = HashSet::new();
    let before = records.len();
    let out: Vec<StudentRecord> = records
        .into_iter()
        .filter(|r| seen.insert(r.id.clone()))
        .collect();
    if out.len() != before {
        warn!(dropped = before - out.len(), "stored roster had duplicate ids");
    }
    out
}


#[cfg(test)]
mod tests {
    use super::memory::MemoryBackend;
    use super::*;
    use crate::roster::model::StudentFields;

    fn student(id: &str, first: &str) -> StudentRecord {
        StudentRecord::from_fields(
            id.to_string(),
            StudentFields {
                first_name: first.into(),
                last_name: "Lee".into(),
                dob: "2010-05-01".into(),
                gender: "F".into(),
                grade: "5".into(),
                address: "1 Elm St".into(),
                parent_name: "Ray Lee".into(),
                parent_contact: "555-0100".into(),
                ..StudentFields::default()
            },
        )
    }

    fn ids<B: Backend>(store: &RecordStore<B>) -> Vec<&str> {
        store.all().iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn empty_backend_loads_empty() {
        let store = RecordStore::open(MemoryBackend::default()).expect("open");
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn corrupt_blob_loads_empty() {
        let backend = MemoryBackend::with_blob(STUDENTS_KEY, "{not json");
        let store = RecordStore::open(backend).expect("open");
        assert_eq!(store.len(), 0);

        let backend = MemoryBackend::with_blob(STUDENTS_KEY, r#"{"id":"1"}"#);
        let store = RecordStore::open(backend).expect("open");
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn upsert_appends_then_replaces_in_place() {
        let mut store = RecordStore::open(MemoryBackend::default()).expect("open");
        assert_eq!(store.upsert(student("a", "Ana")).expect("a"), Upserted::Appended);
        assert_eq!(store.upsert(student("b", "Ben")).expect("b"), Upserted::Appended);
        assert_eq!(store.upsert(student("c", "Cy")).expect("c"), Upserted::Appended);

        let outcome = store.upsert(student("b", "Bea")).expect("replace");
        assert_eq!(outcome, Upserted::Replaced);
        assert_eq!(ids(&store), vec!["a", "b", "c"]);
        assert_eq!(store.find_by_id("b").expect("b").first_name, "Bea");
    }

    #[test]
    fn every_mutation_writes_the_whole_roster() {
        let backend = MemoryBackend::default();
        let mut store = RecordStore::open(backend.clone()).expect("open");
        store.upsert(student("a", "Ana")).expect("a");
        store.upsert(student("b", "Ben")).expect("b");
        store.remove("a").expect("remove");
        store.remove("missing").expect("remove missing");
        assert_eq!(backend.write_count(), 4);

        let blob = backend.get(STUDENTS_KEY).expect("blob");
        let persisted: Vec<StudentRecord> = serde_json::from_str(&blob).expect("json");
        assert_eq!(persisted, store.all());
    }

    #[test]
    fn reload_restores_order_and_fields() {
        let backend = MemoryBackend::default();
        let mut store = RecordStore::open(backend.clone()).expect("open");
        store.upsert(student("a", "Ana")).expect("a");
        store.upsert(student("b", "Ben")).expect("b");

        let reopened = RecordStore::open(backend).expect("reopen");
        assert_eq!(reopened.all(), store.all());
    }

    #[test]
    fn remove_absent_is_noop() {
        let mut store = RecordStore::open(MemoryBackend::default()).expect("open");
        store.upsert(student("a", "Ana")).expect("a");
        assert!(!store.remove("zzz").expect("remove"));
        assert_eq!(store.len(), 1);
        assert!(store.remove("a").expect("remove"));
        assert!(store.find_by_id("a").is_none());
    }

    #[test]
    fn failed_write_leaves_roster_unchanged() {
        let mut backend = MemoryBackend::default();
        let mut store = RecordStore::open(backend.clone()).expect("open");
        store.upsert(student("a", "Ana")).expect("a");

        backend.fail_writes = true;
        let mut failing = RecordStore::open(backend.clone()).expect("reopen");
        assert!(failing.upsert(student("b", "Ben")).is_err());
        assert!(failing.remove("a").is_err());
        assert_eq!(ids(&failing), vec!["a"]);
        assert_eq!(backend.write_count(), 1);
    }

    #[test]
    fn duplicate_ids_in_blob_keep_first() {
        let blob =
            serde_json::to_string(&vec![student("a", "Ana"), student("a", "Dup")]).expect("json");
        let store =
            RecordStore::open(MemoryBackend::with_blob(STUDENTS_KEY, &blob)).expect("open");
        assert_eq!(store.len(), 1);
        assert_eq!(store.all()[0].first_name, "Ana");
    }

    #[test]
    fn minted_ids_are_unique() {
        let mut store = RecordStore::open(MemoryBackend::default()).expect("open");
        for n in 0..50 {
            let id = store.mint_id();
            assert!(!store.contains(&id));
            store.upsert(student(&id, &format!("S{n}"))).expect("insert");
        }
        let unique: HashSet<&str> = ids(&store).into_iter().collect();
        assert_eq!(unique.len(), 50);
    }
}
