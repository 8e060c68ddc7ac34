use chrono::Utc;

use crate::domain::{Coordinate, Profile};

struct Seed {
    id: &'static str,
    name: &'static str,
    photo: &'static str,
    description: &'static str,
    address: &'static str,
    email: &'static str,
    phone: &'static str,
    interests: &'static [&'static str],
    coordinates: (f64, f64),
}

const SEEDS: &[Seed] = &[
    Seed {
        id: "1",
        name: "John Doe",
        photo: "https://images.unsplash.com/photo-1472099645785-5658abf4ff4e?w=150&h=150&fit=crop&crop=face",
        description: "Software engineer passionate about web development and AI.",
        address: "1600 Amphitheatre Parkway, Mountain View, CA 94043",
        email: "john.doe@example.com",
        phone: "+1 (555) 123-4567",
        interests: &["Programming", "AI", "Photography"],
        coordinates: (37.4220656, -122.0840897),
    },
    Seed {
        id: "2",
        name: "Jane Smith",
        photo: "https://images.unsplash.com/photo-1494790108755-2616b612b8e5?w=150&h=150&fit=crop&crop=face",
        description: "UX designer with a love for creating intuitive user experiences.",
        address: "1 Hacker Way, Menlo Park, CA 94025",
        email: "jane.smith@example.com",
        phone: "+1 (555) 987-6543",
        interests: &["Design", "Art", "Travel"],
        coordinates: (37.4845938, -122.1479938),
    },
    Seed {
        id: "3",
        name: "Mike Johnson",
        photo: "https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?w=150&h=150&fit=crop&crop=face",
        description: "Data scientist exploring the world of machine learning.",
        address: "410 Terry Ave N, Seattle, WA 98109",
        email: "mike.johnson@example.com",
        phone: "+1 (555) 456-7890",
        interests: &["Data Science", "Machine Learning", "Basketball"],
        coordinates: (47.6205099, -122.3492774),
    },
];

/// The sample profiles a fresh directory starts with.
pub fn seed_profiles() -> Vec<Profile> {
    let joined_at = Utc::now();
    SEEDS
        .iter()
        .map(|seed| Profile {
            id: seed.id.to_string(),
            name: seed.name.to_string(),
            photo: seed.photo.to_string(),
            description: seed.description.to_string(),
            address: seed.address.to_string(),
            email: seed.email.to_string(),
            phone: seed.phone.to_string(),
            interests: seed.interests.iter().map(|i| i.to_string()).collect(),
            coordinates: Some(Coordinate::new(seed.coordinates.0, seed.coordinates.1)),
            joined_at,
        })
        .collect()
}
