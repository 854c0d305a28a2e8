// 💬 Testimonial - one carousel slide

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    pub id: String,
    /// Author name
    pub name: String,
    #[serde(default)]
    pub role: String,
    /// Initials shown in place of a picture
    pub avatar: String,
    /// 1-5 stars
    pub rating: u8,
    /// The quote
    pub text: String,
    #[serde(default)]
    pub location: String,
    /// Only approved testimonials reach the carousel
    #[serde(default = "default_approved")]
    pub approved: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

fn default_approved() -> bool {
    true
}

impl Testimonial {
    pub fn new(name: &str, text: &str, rating: u8) -> Self {
        Testimonial {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            role: String::new(),
            avatar: initials(name),
            rating,
            text: text.to_string(),
            location: String::new(),
            approved: true,
            created_at: Utc::now(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if (1..=5).contains(&self.rating) {
            Ok(())
        } else {
            Err(format!("rating {} outside 1-5", self.rating))
        }
    }
}

/// "João Silva" -> "JS"
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect()
}
