use serde::Deserialize;

use crate::domain::{parse_interest_list, Profile, ProfileDraft, ValidationErrors};
use crate::maps::MapStatusReport;

/// Profile as the card, detail and list templates display it.
#[derive(Debug, Clone)]
pub struct ProfileCard {
    pub id: String,
    pub name: String,
    pub photo: String,
    pub has_photo: bool,
    pub initials: String,
    pub short_address: String,
    pub address: String,
    pub description: String,
    pub email: String,
    pub phone: String,
    pub interests: Vec<String>,
    pub has_location: bool,
    pub joined: String,
}

impl From<&Profile> for ProfileCard {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id.clone(),
            name: profile.name.clone(),
            photo: profile.photo.clone(),
            has_photo: profile.has_photo(),
            initials: profile.initials(),
            short_address: profile.short_address().to_string(),
            address: profile.address.clone(),
            description: profile.description.clone(),
            email: profile.email.clone(),
            phone: profile.phone.clone(),
            interests: profile.interests.clone(),
            has_location: profile.has_coordinates(),
            joined: profile.joined_at.format("%B %-d, %Y").to_string(),
        }
    }
}

pub fn cards(profiles: &[Profile]) -> Vec<ProfileCard> {
    profiles.iter().map(ProfileCard::from).collect()
}

/// One entry of the interest selector.
#[derive(Debug, Clone, PartialEq)]
pub struct InterestOption {
    pub name: String,
    pub selected: bool,
}

pub fn interest_options(interests: Vec<String>, selected: Option<&str>) -> Vec<InterestOption> {
    interests
        .into_iter()
        .map(|name| {
            let selected = selected == Some(name.as_str());
            InterestOption { name, selected }
        })
        .collect()
}

/// Toast shown after a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Added,
    Updated,
    Deleted,
}

impl Notice {
    pub fn title(&self) -> &'static str {
        match self {
            Notice::Added => "Profile Added",
            Notice::Updated => "Profile Updated",
            Notice::Deleted => "Profile Deleted",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Notice::Added => "New profile has been successfully added.",
            Notice::Updated => "Profile has been successfully updated.",
            Notice::Deleted => "Profile has been successfully deleted.",
        }
    }
}

/// The HTML form; interests arrive as one comma-separated field.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ProfileForm {
    pub name: String,
    pub photo: String,
    pub description: String,
    pub address: String,
    pub email: String,
    pub phone: String,
    pub interests: String,
}

impl ProfileForm {
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            name: profile.name.clone(),
            photo: profile.photo.clone(),
            description: profile.description.clone(),
            address: profile.address.clone(),
            email: profile.email.clone(),
            phone: profile.phone.clone(),
            interests: profile.interests.join(", "),
        }
    }

    pub fn to_draft(&self) -> ProfileDraft {
        ProfileDraft {
            name: self.name.clone(),
            photo: self.photo.clone(),
            description: self.description.clone(),
            address: self.address.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            interests: parse_interest_list(&self.interests),
        }
    }
}

/// Messages under each form field, empty when the field is fine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldErrors {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub description: String,
}

impl From<&ValidationErrors> for FieldErrors {
    fn from(errors: &ValidationErrors) -> Self {
        let message = |field: &str| errors.get(field).unwrap_or_default().to_string();
        Self {
            name: message("name"),
            email: message("email"),
            phone: message("phone"),
            address: message("address"),
            description: message("description"),
        }
    }
}

/// What the map modal shows: a map image, an error panel or the
/// empty-location message.
#[derive(Debug, Clone, Default)]
pub struct MapPanel {
    pub profile_id: String,
    pub profile_name: String,
    pub address: String,
    pub session: String,
    pub ready: bool,
    pub empty: bool,
    pub image_url: String,
    pub marker_count: usize,
    pub error_title: String,
    pub error_detail: String,
    pub guidance: String,
}

impl MapPanel {
    pub fn without_location(profile: &Profile) -> Self {
        Self {
            profile_id: profile.id.clone(),
            profile_name: profile.name.clone(),
            address: profile.address.clone(),
            empty: true,
            ..Default::default()
        }
    }

    pub fn from_report(profile: &Profile, report: &MapStatusReport) -> Self {
        let mut panel = Self {
            profile_id: profile.id.clone(),
            profile_name: profile.name.clone(),
            address: profile.address.clone(),
            ready: report.is_ready(),
            ..Default::default()
        };

        if panel.ready {
            panel.session = report.session.to_string();
        }
        if let Some(map) = &report.map {
            panel.image_url = map.image_url.clone().unwrap_or_default();
            panel.marker_count = map.markers.len();
        }
        if let Some(error) = &report.error {
            panel.error_title = error.title().to_string();
            panel.error_detail = error.to_string();
            panel.guidance = error.guidance().to_string();
        }
        panel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::seed_profiles;

    #[test]
    fn test_form_round_trips_interests() {
        let profile = seed_profiles().remove(0);
        let form = ProfileForm::from_profile(&profile);
        assert_eq!(form.interests, "Programming, AI, Photography");
        assert_eq!(form.to_draft().interests, profile.interests);
    }

    #[test]
    fn test_interest_options_mark_selection() {
        let options = interest_options(vec!["AI".into(), "Art".into()], Some("Art"));
        assert!(!options[0].selected);
        assert!(options[1].selected);
    }

    #[test]
    fn test_field_errors_from_validation() {
        let draft = ProfileDraft { email: "bad".into(), ..Default::default() };
        let errors = crate::domain::validate_draft(&draft).unwrap_err();
        let fields = FieldErrors::from(&errors);
        assert_eq!(fields.name, "Name is required");
        assert_eq!(fields.email, "Email is invalid");
    }
}
