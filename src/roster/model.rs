use serde::{Deserialize, Serialize};

/// One persisted student. Field names on the wire are camelCase and match the
/// blob stored under the `students` workspace key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub dob: String,
    pub gender: String,
    pub grade: String,
    #[serde(default)]
    pub section: String,
    pub address: String,
    pub parent_name: String,
    pub parent_contact: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub medical_info: String,
}

/// Raw form bundle as submitted by the UI. Absent keys read as empty strings so
/// that validation, not deserialization, reports missing required fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StudentFields {
    pub first_name: String,
    pub last_name: String,
    pub dob: String,
    pub gender: String,
    pub grade: String,
    pub section: String,
    pub address: String,
    pub parent_name: String,
    pub parent_contact: String,
    pub email: String,
    pub medical_info: String,
}

impl StudentFields {
    pub fn trimmed(&self) -> Self {
        Self {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            dob: self.dob.trim().to_string(),
            gender: self.gender.trim().to_string(),
            grade: self.grade.trim().to_string(),
            section: self.section.trim().to_string(),
            address: self.address.trim().to_string(),
            parent_name: self.parent_name.trim().to_string(),
            parent_contact: self.parent_contact.trim().to_string(),
            email: self.email.trim().to_string(),
            medical_info: self.medical_info.trim().to_string(),
        }
    }
}

impl StudentRecord {
    pub fn from_fields(id: String, fields: StudentFields) -> Self {
        Self {
            id,
            first_name: fields.first_name,
            last_name: fields.last_name,
            dob: fields.dob,
            gender: fields.gender,
            grade: fields.grade,
            section: fields.section,
            address: fields.address,
            parent_name: fields.parent_name,
            parent_contact: fields.parent_contact,
            email: fields.email,
            medical_info: fields.medical_info,
        }
    }

    /// Current values for prefilling the edit form.
    pub fn fields(&self) -> StudentFields {
        StudentFields {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            dob: self.dob.clone(),
            gender: self.gender.clone(),
            grade: self.grade.clone(),
            section: self.section.clone(),
            address: self.address.clone(),
            parent_name: self.parent_name.clone(),
            parent_contact: self.parent_contact.clone(),
            email: self.email.clone(),
            medical_info: self.medical_info.clone(),
        }
    }

    /// `needle` must already be lowercased.
    pub fn matches(&self, needle: &str) -> bool {
        [
            &self.first_name,
            &self.last_name,
            &self.grade,
            &self.parent_name,
            &self.parent_contact,
        ]
        .iter()
        .any(|v| v.to_lowercase().contains(needle))
    }
}

/// Table row shown in the student list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRow {
    pub id: String,
    pub short_id: String,
    pub display_name: String,
    pub grade_label: String,
    pub parent_name: String,
    pub parent_contact: String,
}

impl From<&StudentRecord> for StudentRow {
    fn from(s: &StudentRecord) -> Self {
        let grade_label = if s.section.is_empty() {
            format!("Grade {}", s.grade)
        } else {
            format!("Grade {} ({})", s.grade, s.section)
        };
        Self {
            id: s.id.clone(),
            short_id: s.id.chars().take(6).collect(),
            display_name: format!("{} {}", s.first_name, s.last_name),
            grade_label,
            parent_name: s.parent_name.clone(),
            parent_contact: s.parent_contact.clone(),
        }
    }
}
