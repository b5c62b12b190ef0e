use chrono::{Local, NaiveDate};
use serde::Serialize;

use super::model::{StudentFields, StudentRecord};

const DOB_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// A trimmed field bundle that passed validation. Only `validate_on` builds one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    fields: StudentFields,
}

impl Candidate {
    pub fn fields(&self) -> &StudentFields {
        &self.fields
    }

    pub fn into_record(self, id: String) -> StudentRecord {
        StudentRecord::from_fields(id, self.fields)
    }
}

fn required_fields(f: &StudentFields) -> [(&'static str, &'static str, &str); 8] {
    [
        ("firstName", "First Name", f.first_name.as_str()),
        ("lastName", "Last Name", f.last_name.as_str()),
        ("dob", "Date of Birth", f.dob.as_str()),
        ("gender", "Gender", f.gender.as_str()),
        ("grade", "Grade", f.grade.as_str()),
        ("address", "Address", f.address.as_str()),
        ("parentName", "Parent Name", f.parent_name.as_str()),
        ("parentContact", "Parent Contact", f.parent_contact.as_str()),
    ]
}

pub fn validate(fields: &StudentFields) -> Result<Candidate, Vec<FieldError>> {
    validate_on(fields, Local::now().date_naive())
}

/// Checks every rule and reports all failures together. `today` is the first
/// date a birth date may not fall on.
pub fn validate_on(
    fields: &StudentFields,
    today: NaiveDate,
) -> Result<Candidate, Vec<FieldError>> {
    let fields = fields.trimmed();
    let mut errors = Vec::new();

    for (field, label, value) in required_fields(&fields) {
        if value.is_empty() {
            errors.push(FieldError::new(field, format!("{label} is required")));
        }
    }

    if !fields.dob.is_empty() {
        match NaiveDate::parse_from_str(&fields.dob, DOB_FORMAT) {
            Ok(dob) if dob < today => {}
            Ok(_) => errors.push(FieldError::new("dob", "Date of Birth must be in the past")),
            Err(_) => errors.push(FieldError::new(
                "dob",
                "Date of Birth must be a valid date (YYYY-MM-DD)",
            )),
        }
    }

    if errors.is_empty() {
        Ok(Candidate { fields })
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).expect("date")
    }

    fn complete() -> StudentFields {
        StudentFields {
            first_name: "Ana".into(),
            last_name: "Lee".into(),
            dob: "2010-05-01".into(),
            gender: "F".into(),
            grade: "5".into(),
            address: "1 Elm St".into(),
            parent_name: "Ray Lee".into(),
            parent_contact: "555-0100".into(),
            ..StudentFields::default()
        }
    }

    fn failed_fields(res: Result<Candidate, Vec<FieldError>>) -> Vec<&'static str> {
        res.expect_err("should fail").into_iter().map(|e| e.field).collect()
    }

    #[test]
    fn accepts_complete_bundle_and_trims() {
        let mut f = complete();
        f.first_name = "  Ana ".into();
        f.email = " ana@example.com\t".into();
        let c = validate_on(&f, today()).expect("valid");
        assert_eq!(c.fields().first_name, "Ana");
        assert_eq!(c.fields().email, "ana@example.com");
    }

    #[test]
    fn optional_fields_may_be_blank() {
        let c = validate_on(&complete(), today()).expect("valid");
        assert!(c.fields().section.is_empty());
        assert!(c.fields().medical_info.is_empty());
    }

    #[test]
    fn reports_every_missing_required_field() {
        let fields = failed_fields(validate_on(&StudentFields::default(), today()));
        assert_eq!(
            fields,
            vec![
                "firstName",
                "lastName",
                "dob",
                "gender",
                "grade",
                "address",
                "parentName",
                "parentContact"
            ]
        );
    }

    #[test]
    fn whitespace_only_counts_as_missing() {
        let mut f = complete();
        f.parent_name = "   ".into();
        let errs = validate_on(&f, today()).expect_err("invalid");
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].field, "parentName");
        assert_eq!(errs[0].message, "Parent Name is required");
    }

    #[test]
    fn dob_must_be_strictly_before_today() {
        let mut f = complete();
        f.dob = "2024-03-15".into();
        assert_eq!(failed_fields(validate_on(&f, today())), vec!["dob"]);

        f.dob = "2030-01-01".into();
        let errs = validate_on(&f, today()).expect_err("future");
        assert_eq!(errs[0].message, "Date of Birth must be in the past");

        f.dob = "2024-03-14".into();
        assert!(validate_on(&f, today()).is_ok());
    }

    #[test]
    fn unparseable_dob_is_rejected() {
        let mut f = complete();
        f.dob = "last tuesday".into();
        let errs = validate_on(&f, today()).expect_err("garbage date");
        assert_eq!(errs.len(), 1);
        assert!(errs[0].message.contains("valid date"));

        f.dob = "2023-02-30".into();
        assert_eq!(failed_fields(validate_on(&f, today())), vec!["dob"]);
    }

    #[test]
    fn date_and_required_failures_reported_together() {
        let mut f = complete();
        f.first_name.clear();
        f.dob = "2099-12-31".into();
        assert_eq!(failed_fields(validate_on(&f, today())), vec!["firstName", "dob"]);
    }
}
