use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use super::model::{StudentFields, StudentRecord};
use super::store::{Backend, RecordStore, Upserted};
use super::validate::{self, Candidate, FieldError};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditState {
    #[default]
    Idle,
    Editing(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Committed {
        record: StudentRecord,
        created: bool,
    },
    Invalid(Vec<FieldError>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub removed: bool,
    pub editing_cleared: bool,
}

/// Owns the store and the edit-in-progress state for one session.
pub struct RecordController<B> {
    store: RecordStore<B>,
    state: EditState,
    search_term: String,
}

impl<B: Backend> RecordController<B> {
    pub fn new(store: RecordStore<B>) -> Self {
        Self {
            store,
            state: EditState::Idle,
            search_term: String::new(),
        }
    }

    pub fn store(&self) -> &RecordStore<B> {
        &self.store
    }

    pub fn editing_id(&self) -> Option<&str> {
        match &self.state {
            EditState::Idle => None,
            EditState::Editing(id) => Some(id),
        }
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn validate(&self, fields: &StudentFields) -> Result<Candidate, Vec<FieldError>> {
        validate::validate(fields)
    }

    pub fn submit(&mut self, fields: &StudentFields) -> anyhow::Result<SubmitOutcome> {
        self.submit_on(fields, Local::now().date_naive())
    }

    /// Creates a record while idle, replaces the edited record while editing.
    /// Invalid input and write failures leave both the roster and the edit
    /// state as they were.
    pub fn submit_on(
        &mut self,
        fields: &StudentFields,
        today: NaiveDate,
    ) -> anyhow::Result<SubmitOutcome> {
        let candidate = match validate::validate_on(fields, today) {
            Ok(c) => c,
            Err(errors) => {
                debug!(failures = errors.len(), "submit rejected");
                return Ok(SubmitOutcome::Invalid(errors));
            }
        };

        let id = match &self.state {
            EditState::Editing(id) => id.clone(),
            EditState::Idle => self.store.mint_id(),
        };
        let record = candidate.into_record(id);
        let upserted = self.store.upsert(record.clone())?;
        self.state = EditState::Idle;

        let created = upserted == Upserted::Appended;
        info!(student_id = %record.id, created, "student saved");
        Ok(SubmitOutcome::Committed { record, created })
    }

    /// Enters editing for `id` and returns the record to prefill the form, or
    /// `None` without changing state when no such record exists.
    pub fn request_edit(&mut self, id: &str) -> Option<StudentRecord> {
        let record = self.store.find_by_id(id)?.clone();
        self.state = EditState::Editing(record.id.clone());
        debug!(student_id = %id, "editing student");
        Some(record)
    }

    pub fn request_delete(&mut self, id: &str) -> anyhow::Result<DeleteOutcome> {
        let removed = self.store.remove(id)?;
        let editing_cleared = self.editing_id() == Some(id);
        if editing_cleared {
            self.state = EditState::Idle;
        }
        if removed {
            info!(student_id = %id, "student deleted");
        }
        Ok(DeleteOutcome {
            removed,
            editing_cleared,
        })
    }

    pub fn cancel_edit(&mut self) {
        self.state = EditState::Idle;
    }

    /// Records with `term` in a searchable field, ignoring case, in roster
    /// order. An empty term matches everything.
    pub fn search(&self, term: &str) -> Vec<&StudentRecord> {
        let needle = term.to_lowercase();
        self.store
            .all()
            .iter()
            .filter(|r| needle.is_empty() || r.matches(&needle))
            .collect()
    }

    pub fn search_changed(&mut self, term: &str) -> Vec<&StudentRecord> {
        self.search_term = term.to_string();
        self.current_view()
    }

    pub fn current_view(&self) -> Vec<&StudentRecord> {
        self.search(&self.search_term)
    }
}
