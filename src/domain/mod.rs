mod profile;
mod validation;

pub use profile::{
    normalize_interests, parse_interest_list, Coordinate, Profile, ProfileDraft, ProfileUpdate,
};
pub use validation::{validate_draft, ValidationErrors};
