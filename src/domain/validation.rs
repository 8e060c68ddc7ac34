use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use super::ProfileDraft;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\S+@\S+\.\S+").expect("email pattern is a valid regex")
});

/// Per-field validation messages, keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<&'static str, String>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }

    fn add(&mut self, field: &'static str, message: &str) {
        self.0.entry(field).or_insert_with(|| message.to_string());
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.values().map(String::as_str).collect();
        write!(f, "{}", messages.join("; "))
    }
}

pub fn validate_draft(draft: &ProfileDraft) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if draft.name.trim().is_empty() {
        errors.add("name", "Name is required");
    }
    if draft.email.trim().is_empty() {
        errors.add("email", "Email is required");
    } else if !EMAIL_PATTERN.is_match(draft.email.trim()) {
        errors.add("email", "Email is invalid");
    }
    if draft.phone.trim().is_empty() {
        errors.add("phone", "Phone is required");
    }
    if draft.address.trim().is_empty() {
        errors.add("address", "Address is required");
    }
    if draft.description.trim().is_empty() {
        errors.add("description", "Description is required");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
