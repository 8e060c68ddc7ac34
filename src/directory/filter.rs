use serde::Deserialize;

use crate::domain::Profile;

/// Search box + interest selector.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ProfileFilter {
    pub search: Option<String>,
    pub interest: Option<String>,
}

impl ProfileFilter {
    pub fn new(search: Option<String>, interest: Option<String>) -> Self {
        Self { search, interest }
    }

    /// The search term, unless it is empty.
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().filter(|s| !s.is_empty())
    }

    /// The selected interest; empty means "All Interests".
    pub fn interest(&self) -> Option<&str> {
        self.interest.as_deref().filter(|s| !s.is_empty())
    }

    pub fn matches(&self, profile: &Profile) -> bool {
        let matches_search = match self.search_term() {
            Some(term) => {
                let term = term.to_lowercase();
                [&profile.name, &profile.description, &profile.address]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&term))
            }
            None => true,
        };
        let matches_interest = match self.interest() {
            Some(interest) => profile.interests.iter().any(|i| i == interest),
            None => true,
        };
        matches_search && matches_interest
    }

    /// Keeps matching profiles in their original order.
    pub fn apply(&self, profiles: Vec<Profile>) -> Vec<Profile> {
        profiles.into_iter().filter(|p| self.matches(p)).collect()
    }
}

/// Every interest used by any profile, first occurrence first.
pub fn collect_interests(profiles: &[Profile]) -> Vec<String> {
    let mut interests: Vec<String> = Vec::new();
    for interest in profiles.iter().flat_map(|p| p.interests.iter()) {
        if !interests.contains(interest) {
            interests.push(interest.clone());
        }
    }
    interests
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::seed_profiles;

    fn names(profiles: &[Profile]) -> Vec<&str> {
        profiles.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_empty_filter_returns_everything() {
        let profiles = seed_profiles();
        assert_eq!(ProfileFilter::default().apply(profiles.clone()).len(), profiles.len());
        let blank = ProfileFilter::new(Some(String::new()), Some(String::new()));
        assert_eq!(blank.apply(profiles.clone()).len(), profiles.len());
    }

    #[test]
    fn test_search_is_case_insensitive_across_fields() {
        let profiles = seed_profiles();

        let by_name = ProfileFilter::new(Some("jane".into()), None).apply(profiles.clone());
        assert_eq!(names(&by_name), vec!["Jane Smith"]);

        let by_description = ProfileFilter::new(Some("MACHINE".into()), None).apply(profiles.clone());
        assert_eq!(names(&by_description), vec!["Mike Johnson"]);

        let by_address = ProfileFilter::new(Some(", ca ".into()), None).apply(profiles.clone());
        assert_eq!(names(&by_address), vec!["John Doe", "Jane Smith"]);

        let none = ProfileFilter::new(Some("zzz".into()), None).apply(profiles);
        assert!(none.is_empty());
    }

    #[test]
    fn test_interest_filter() {
        let profiles = seed_profiles();
        let design = ProfileFilter::new(None, Some("Design".into())).apply(profiles.clone());
        assert_eq!(names(&design), vec!["Jane Smith"]);

        // Interests match exactly.
        let lower = ProfileFilter::new(None, Some("design".into())).apply(profiles);
        assert!(lower.is_empty());
    }

    #[test]
    fn test_search_and_interest_combine() {
        let profiles = seed_profiles();
        let filter = ProfileFilter::new(Some("engineer".into()), Some("AI".into()));
        assert_eq!(names(&filter.apply(profiles.clone())), vec!["John Doe"]);

        let filter = ProfileFilter::new(Some("engineer".into()), Some("Art".into()));
        assert!(filter.apply(profiles).is_empty());
    }

    #[test]
    fn test_collect_interests_keeps_first_seen_order() {
        let mut profiles = seed_profiles();
        profiles[2].interests.push("AI".to_string());
        let interests = collect_interests(&profiles);
        assert_eq!(interests[0], "Programming");
        assert_eq!(interests.iter().filter(|i| i.as_str() == "AI").count(), 1);
        assert_eq!(interests.len(), 9);
    }
}
