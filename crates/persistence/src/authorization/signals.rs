//! Visibility signals derived from a document body.
//!
//! Some documents can only be authorized once their content is known: a
//! report is visible to whoever can see the patient or place it is about,
//! a contact to whoever can see its place in the hierarchy. These signals
//! are the subjects a document relates to.

use serde_json::Value;

const CONTACT_TYPES: &[&str] = &[
    "contact",
    "person",
    "clinic",
    "health_center",
    "district_hospital",
];

/// Subject fields a report may reference, as paths into the body.
const REPORT_SUBJECT_PATHS: &[&[&str]] = &[
    &["patient_id"],
    &["place_id"],
    &["fields", "patient_id"],
    &["fields", "patient_uuid"],
    &["fields", "place_id"],
    &["contact", "_id"],
];

/// Body-derived visibility signals for one document.
///
/// # Examples
///
/// ```
/// use outpost_persistence::authorization::DocumentSignals;
/// use serde_json::json;
///
/// let signals = DocumentSignals::from_doc(&json!({
///     "_id": "report-1",
///     "type": "data_record",
///     "fields": {"patient_id": "p-1"},
/// }));
/// assert_eq!(signals.subjects(), ["p-1"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentSignals {
    doc_type: Option<String>,
    subjects: Vec<String>,
}

impl DocumentSignals {
    /// Derives signals from a document body.
    pub fn from_doc(doc: &Value) -> Self {
        let doc_type = doc.get("type").and_then(Value::as_str).map(str::to_string);
        let mut subjects = Vec::new();

        if doc_type.as_deref().is_some_and(|t| CONTACT_TYPES.contains(&t)) {
            // A contact is its own subject, then every ancestor up the chain
            if let Some(id) = doc.get("_id").and_then(Value::as_str) {
                push_unique(&mut subjects, id);
            }
            let mut parent = doc.get("parent");
            while let Some(node) = parent {
                if let Some(id) = node.get("_id").and_then(Value::as_str) {
                    push_unique(&mut subjects, id);
                }
                parent = node.get("parent");
            }
        } else {
            for path in REPORT_SUBJECT_PATHS {
                if let Some(subject) = lookup(doc, path) {
                    push_unique(&mut subjects, subject);
                }
            }
        }

        Self { doc_type, subjects }
    }

    /// The document's `type` field, if any.
    pub fn doc_type(&self) -> Option<&str> {
        self.doc_type.as_deref()
    }

    /// Subjects the document relates to, in discovery order.
    pub fn subjects(&self) -> &[String] {
        &self.subjects
    }
}

fn lookup<'a>(doc: &'a Value, path: &[&str]) -> Option<&'a str> {
    path.iter()
        .try_fold(doc, |node, key| node.get(key))
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
}

fn push_unique(subjects: &mut Vec<String>, subject: &str) {
    if !subjects.iter().any(|s| s == subject) {
        subjects.push(subject.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_contact_ancestry() {
        let signals = DocumentSignals::from_doc(&json!({
            "_id": "person-1",
            "type": "person",
            "parent": {"_id": "clinic-1", "parent": {"_id": "hc-1"}},
        }));
        assert_eq!(signals.doc_type(), Some("person"));
        assert_eq!(signals.subjects(), ["person-1", "clinic-1", "hc-1"]);
    }

    #[test]
    fn test_report_subjects_deduplicated() {
        let signals = DocumentSignals::from_doc(&json!({
            "_id": "r-1",
            "type": "data_record",
            "patient_id": "p-1",
            "fields": {"patient_uuid": "p-1", "place_id": "clinic-1"},
            "contact": {"_id": "chw-1"},
        }));
        assert_eq!(signals.subjects(), ["p-1", "clinic-1", "chw-1"]);
    }

    #[test]
    fn test_no_signals() {
        let signals = DocumentSignals::from_doc(&json!({"_id": "settings"}));
        assert!(signals.subjects().is_empty());
        assert_eq!(signals.doc_type(), None);

        let empty = DocumentSignals::from_doc(&json!({"patient_id": ""}));
        assert!(empty.subjects().is_empty());
    }
}
