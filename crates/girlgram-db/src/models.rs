//! Row mapping between SQLite rows and the shared `girlgram-types` models.
//!
//! Joined queries select several entities side by side, so every mapper
//! takes the column offset its entity starts at.

use chrono::{DateTime, Utc};
use girlgram_types::models::{Circle, Comment, Post, User};
use rusqlite::Row;
use rusqlite::types::Type;

pub(crate) const USER_COLUMNS: &str = "u.id, u.email, u.first_name, u.last_name, u.profile_image_url, \
     u.age, u.bio, u.interests, u.created_at, u.updated_at";
pub(crate) const USER_WIDTH: usize = 10;
pub(crate) const USER_RETURNING: &str = "id, email, first_name, last_name, profile_image_url, \
     age, bio, interests, created_at, updated_at";

pub(crate) const CIRCLE_COLUMNS: &str = "c.id, c.name, c.description, c.icon, c.color, c.created_at";
pub(crate) const CIRCLE_WIDTH: usize = 6;
pub(crate) const CIRCLE_RETURNING: &str = "id, name, description, icon, color, created_at";

pub(crate) const POST_COLUMNS: &str =
    "p.id, p.author_id, p.circle_id, p.content, p.image_url, p.created_at, p.updated_at";
pub(crate) const POST_WIDTH: usize = 7;
pub(crate) const POST_RETURNING: &str =
    "id, author_id, circle_id, content, image_url, created_at, updated_at";

pub(crate) const COMMENT_COLUMNS: &str = "cm.id, cm.post_id, cm.author_id, cm.content, cm.created_at";
pub(crate) const COMMENT_WIDTH: usize = 5;
pub(crate) const COMMENT_RETURNING: &str = "id, post_id, author_id, content, created_at";

/// SQL expression producing the current time in the stored timestamp format.
pub(crate) const NOW: &str = "strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";

pub(crate) fn timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    raw.parse::<DateTime<Utc>>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn interests(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Vec<String>>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| serde_json::from_str(&s))
        .transpose()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn encode_interests(interests: Option<&[String]>) -> anyhow::Result<Option<String>> {
    Ok(interests.map(serde_json::to_string).transpose()?)
}

pub(crate) fn user_at(row: &Row<'_>, at: usize) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(at)?,
        email: row.get(at + 1)?,
        first_name: row.get(at + 2)?,
        last_name: row.get(at + 3)?,
        profile_image_url: row.get(at + 4)?,
        age: row.get(at + 5)?,
        bio: row.get(at + 6)?,
        interests: interests(row, at + 7)?,
        created_at: timestamp(row, at + 8)?,
        updated_at: timestamp(row, at + 9)?,
    })
}

pub(crate) fn circle_at(row: &Row<'_>, at: usize) -> rusqlite::Result<Circle> {
    Ok(Circle {
        id: row.get(at)?,
        name: row.get(at + 1)?,
        description: row.get(at + 2)?,
        icon: row.get(at + 3)?,
        color: row.get(at + 4)?,
        created_at: timestamp(row, at + 5)?,
    })
}

pub(crate) fn post_at(row: &Row<'_>, at: usize) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(at)?,
        author_id: row.get(at + 1)?,
        circle_id: row.get(at + 2)?,
        content: row.get(at + 3)?,
        image_url: row.get(at + 4)?,
        created_at: timestamp(row, at + 5)?,
        updated_at: timestamp(row, at + 6)?,
    })
}

pub(crate) fn comment_at(row: &Row<'_>, at: usize) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get(at)?,
        post_id: row.get(at + 1)?,
        author_id: row.get(at + 2)?,
        content: row.get(at + 3)?,
        created_at: timestamp(row, at + 4)?,
    })
}
