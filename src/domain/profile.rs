use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A latitude/longitude pair as returned by the geocoder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.7},{:.7}", self.lat, self.lng)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub photo: String,
    pub description: String,
    pub address: String,
    pub email: String,
    pub phone: String,
    pub interests: Vec<String>,
    pub coordinates: Option<Coordinate>,
    pub joined_at: DateTime<Utc>,
}

impl Profile {
    /// Builds a profile from a validated draft.
    pub fn from_draft(id: String, draft: ProfileDraft, joined_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            photo: draft.photo,
            description: draft.description,
            address: draft.address,
            email: draft.email,
            phone: draft.phone,
            interests: draft.interests,
            coordinates: None,
            joined_at,
        }
    }

    /// Avatar fallback: first letter of every word of the name.
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .collect()
    }

    /// The address up to the first comma.
    pub fn short_address(&self) -> &str {
        self.address.split(',').next().unwrap_or("").trim()
    }

    pub fn has_photo(&self) -> bool {
        !self.photo.trim().is_empty()
    }

    pub fn has_coordinates(&self) -> bool {
        self.coordinates.is_some()
    }

    /// Applies an edit payload. Fields the payload omits keep their value,
    /// and `id`, `joined_at` and `coordinates` are never touched here.
    pub fn apply(&mut self, update: ProfileUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(photo) = update.photo {
            self.photo = photo;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(address) = update.address {
            self.address = address;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(phone) = update.phone {
            self.phone = phone;
        }
        if let Some(interests) = update.interests {
            self.interests = normalize_interests(interests);
        }
    }

    pub(crate) fn as_draft(&self) -> ProfileDraft {
        ProfileDraft {
            name: self.name.clone(),
            photo: self.photo.clone(),
            description: self.description.clone(),
            address: self.address.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            interests: self.interests.clone(),
        }
    }
}

/// Create payload: everything the form submits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileDraft {
    pub name: String,
    pub photo: String,
    pub description: String,
    pub address: String,
    pub email: String,
    pub phone: String,
    pub interests: Vec<String>,
}

impl ProfileDraft {
    /// Trims every text field and cleans up the interest list.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            photo: self.photo.trim().to_string(),
            description: self.description.trim().to_string(),
            address: self.address.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            interests: normalize_interests(self.interests),
        }
    }
}

/// Edit payload. `None` means "leave as is".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub photo: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub interests: Option<Vec<String>>,
}

impl From<ProfileDraft> for ProfileUpdate {
    fn from(draft: ProfileDraft) -> Self {
        Self {
            name: Some(draft.name),
            photo: Some(draft.photo),
            description: Some(draft.description),
            address: Some(draft.address),
            email: Some(draft.email),
            phone: Some(draft.phone),
            interests: Some(draft.interests),
        }
    }
}

/// Trims entries, drops blanks and keeps the first occurrence of duplicates.
pub fn normalize_interests<I, S>(interests: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for interest in interests {
        let trimmed = interest.as_ref().trim();
        if !trimmed.is_empty() && !out.iter().any(|i| i == trimmed) {
            out.push(trimmed.to_string());
        }
    }
    out
}

/// Splits the comma-separated interest field of the HTML form.
pub fn parse_interest_list(raw: &str) -> Vec<String> {
    normalize_interests(raw.split(','))
}
