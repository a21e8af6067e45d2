use anyhow::Result;
use girlgram_types::models::NewCircle;
use tracing::info;

use crate::Database;

/// (name, description, icon, color) of the circles every fresh install starts with.
pub const DEFAULT_CIRCLES: [(&str, &str, &str, &str); 5] = [
    ("Study & School Life", "Academic support and study tips", "fas fa-book", "blue"),
    ("Mental Wellness & Self-Care", "Mental health and wellness support", "fas fa-heart", "green"),
    ("Creative Space", "Art, writing, music and creativity", "fas fa-palette", "purple"),
    ("Style & Beauty", "Fashion and beauty discussions", "fas fa-sparkles", "pink"),
    ("College & Career", "Career advice and college prep", "fas fa-graduation-cap", "yellow"),
];

impl Database {
    /// Create the default circles if no circle exists yet. Returns how many were created.
    ///
    /// The emptiness check and the inserts are separate statements, so two
    /// first calls racing each other can both seed.
    pub fn seed_default_circles(&self) -> Result<usize> {
        if !self.get_all_circles()?.is_empty() {
            return Ok(0);
        }

        for (name, description, icon, color) in DEFAULT_CIRCLES {
            self.create_circle(&NewCircle {
                name: name.to_string(),
                description: Some(description.to_string()),
                icon: Some(icon.to_string()),
                color: Some(color.to_string()),
            })?;
        }

        info!("Seeded {} default circles", DEFAULT_CIRCLES.len());
        Ok(DEFAULT_CIRCLES.len())
    }
}
