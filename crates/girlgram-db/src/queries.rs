use anyhow::Result;
use girlgram_types::models::{
    Circle, Comment, CommentWithAuthor, NewCircle, Post, PostWithAuthorAndCircle, ProfileUpdate,
    UpsertUser, User,
};
use rusqlite::types::ToSql;
use rusqlite::{Connection, Row};
use tracing::debug;

use crate::Database;
use crate::models::{
    CIRCLE_COLUMNS, CIRCLE_RETURNING, CIRCLE_WIDTH, COMMENT_COLUMNS, COMMENT_RETURNING,
    COMMENT_WIDTH, NOW, POST_COLUMNS, POST_RETURNING, POST_WIDTH, USER_COLUMNS, USER_RETURNING,
    USER_WIDTH, circle_at, comment_at, encode_interests, post_at, user_at,
};

/// Page size used when the caller does not ask for one.
pub const DEFAULT_LIMIT: u32 = 20;

/// Which posts a feed-style query covers.
enum FeedScope<'a> {
    All,
    Circle(i64),
    Author(&'a str),
}

impl Database {
    // -- Users --

    pub fn get_user(&self, id: &str) -> Result<Option<User>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users u WHERE u.id = ?1"),
                [id],
                |row| user_at(row, 0),
            )
            .optional()
        })
    }

    /// Insert the user, or refresh the identity-provider fields of an existing row.
    /// Profile fields the member edited (age, bio, interests) survive re-login.
    pub fn upsert_user(&self, user: &UpsertUser) -> Result<User> {
        self.with_conn(|conn| {
            let row = conn.query_row(
                &format!(
                    "INSERT INTO users (id, email, first_name, last_name, profile_image_url)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     ON CONFLICT(id) DO UPDATE SET
                        email = excluded.email,
                        first_name = excluded.first_name,
                        last_name = excluded.last_name,
                        profile_image_url = excluded.profile_image_url,
                        updated_at = {NOW}
                     RETURNING {USER_RETURNING}"
                ),
                rusqlite::params![
                    user.id,
                    user.email,
                    user.first_name,
                    user.last_name,
                    user.profile_image_url
                ],
                |row| user_at(row, 0),
            )?;
            Ok(row)
        })
    }

    /// Apply a partial profile update. Returns `None` if the user does not exist.
    pub fn update_user_profile(&self, id: &str, update: &ProfileUpdate) -> Result<Option<User>> {
        let interests = encode_interests(update.interests.as_deref())?;

        self.with_conn(|conn| {
            conn.query_row(
                &format!(
                    "UPDATE users SET
                        email = COALESCE(?2, email),
                        first_name = COALESCE(?3, first_name),
                        last_name = COALESCE(?4, last_name),
                        profile_image_url = COALESCE(?5, profile_image_url),
                        age = COALESCE(?6, age),
                        bio = COALESCE(?7, bio),
                        interests = COALESCE(?8, interests),
                        updated_at = {NOW}
                     WHERE id = ?1
                     RETURNING {USER_RETURNING}"
                ),
                rusqlite::params![
                    id,
                    update.email,
                    update.first_name,
                    update.last_name,
                    update.profile_image_url,
                    update.age,
                    update.bio,
                    interests
                ],
                |row| user_at(row, 0),
            )
            .optional()
        })
    }

    // -- Circles --

    pub fn get_all_circles(&self) -> Result<Vec<Circle>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {CIRCLE_COLUMNS} FROM circles c ORDER BY c.id"))?;
            let rows = stmt
                .query_map([], |row| circle_at(row, 0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn create_circle(&self, circle: &NewCircle) -> Result<Circle> {
        self.with_conn(|conn| {
            let row = conn.query_row(
                &format!(
                    "INSERT INTO circles (name, description, icon, color) VALUES (?1, ?2, ?3, ?4)
                     RETURNING {CIRCLE_RETURNING}"
                ),
                rusqlite::params![circle.name, circle.description, circle.icon, circle.color],
                |row| circle_at(row, 0),
            )?;
            Ok(row)
        })
    }

    pub fn get_user_circles(&self, user_id: &str) -> Result<Vec<Circle>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CIRCLE_COLUMNS}
                 FROM user_circles uc
                 JOIN circles c ON uc.circle_id = c.id
                 WHERE uc.user_id = ?1
                 ORDER BY uc.joined_at, uc.id"
            ))?;
            let rows = stmt
                .query_map([user_id], |row| circle_at(row, 0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Add a membership. Returns false when the user already belonged to the circle.
    pub fn join_circle(&self, user_id: &str, circle_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO user_circles (user_id, circle_id) VALUES (?1, ?2)
                 ON CONFLICT(user_id, circle_id) DO NOTHING",
                rusqlite::params![user_id, circle_id],
            )?;
            Ok(inserted > 0)
        })
    }

    /// Remove a membership. Returns false when there was none to remove.
    pub fn leave_circle(&self, user_id: &str, circle_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM user_circles WHERE user_id = ?1 AND circle_id = ?2",
                rusqlite::params![user_id, circle_id],
            )?;
            Ok(removed > 0)
        })
    }

    // -- Posts --

    pub fn create_post(
        &self,
        author_id: &str,
        circle_id: i64,
        content: &str,
        image_url: Option<&str>,
    ) -> Result<Post> {
        self.with_conn(|conn| {
            let row = conn.query_row(
                &format!(
                    "INSERT INTO posts (author_id, circle_id, content, image_url)
                     VALUES (?1, ?2, ?3, ?4)
                     RETURNING {POST_RETURNING}"
                ),
                rusqlite::params![author_id, circle_id, content, image_url],
                |row| post_at(row, 0),
            )?;
            Ok(row)
        })
    }

    /// Newest posts across every circle, annotated for `viewer_id`.
    pub fn get_feed_posts(&self, viewer_id: &str, limit: u32) -> Result<Vec<PostWithAuthorAndCircle>> {
        self.with_conn(|conn| query_annotated_posts(conn, viewer_id, FeedScope::All, limit))
    }

    pub fn get_posts_by_circle(
        &self,
        circle_id: i64,
        viewer_id: &str,
        limit: u32,
    ) -> Result<Vec<PostWithAuthorAndCircle>> {
        self.with_conn(|conn| {
            query_annotated_posts(conn, viewer_id, FeedScope::Circle(circle_id), limit)
        })
    }

    pub fn get_user_posts(
        &self,
        author_id: &str,
        viewer_id: &str,
        limit: u32,
    ) -> Result<Vec<PostWithAuthorAndCircle>> {
        self.with_conn(|conn| {
            query_annotated_posts(conn, viewer_id, FeedScope::Author(author_id), limit)
        })
    }

    /// Delete a post owned by `author_id`, along with its likes and comments.
    /// Returns false, touching nothing, if the post is missing or owned by someone else.
    pub fn delete_post(&self, post_id: i64, author_id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let owned = tx
                .query_row(
                    "SELECT 1 FROM posts WHERE id = ?1 AND author_id = ?2",
                    rusqlite::params![post_id, author_id],
                    |_| Ok(()),
                )
                .optional()?
                .is_some();

            if !owned {
                return Ok(false);
            }

            let likes = tx.execute("DELETE FROM likes WHERE post_id = ?1", [post_id])?;
            let comments = tx.execute("DELETE FROM comments WHERE post_id = ?1", [post_id])?;
            tx.execute("DELETE FROM posts WHERE id = ?1", [post_id])?;
            tx.commit()?;

            debug!(post_id, likes, comments, "Deleted post with dependents");
            Ok(true)
        })
    }

    // -- Likes --

    /// Returns false when the user had already liked the post.
    pub fn like_post(&self, post_id: i64, user_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO likes (post_id, user_id) VALUES (?1, ?2)
                 ON CONFLICT(post_id, user_id) DO NOTHING",
                rusqlite::params![post_id, user_id],
            )?;
            Ok(inserted > 0)
        })
    }

    /// Returns false when there was no like to remove.
    pub fn unlike_post(&self, post_id: i64, user_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM likes WHERE post_id = ?1 AND user_id = ?2",
                rusqlite::params![post_id, user_id],
            )?;
            Ok(removed > 0)
        })
    }

    // -- Comments --

    pub fn add_comment(&self, post_id: i64, author_id: &str, content: &str) -> Result<Comment> {
        self.with_conn(|conn| {
            let row = conn.query_row(
                &format!(
                    "INSERT INTO comments (post_id, author_id, content) VALUES (?1, ?2, ?3)
                     RETURNING {COMMENT_RETURNING}"
                ),
                rusqlite::params![post_id, author_id, content],
                |row| comment_at(row, 0),
            )?;
            Ok(row)
        })
    }

    /// Comments on a post, newest first.
    pub fn get_post_comments(&self, post_id: i64) -> Result<Vec<CommentWithAuthor>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COMMENT_COLUMNS}, {USER_COLUMNS}
                 FROM comments cm
                 JOIN users u ON cm.author_id = u.id
                 WHERE cm.post_id = ?1
                 ORDER BY cm.created_at DESC, cm.id DESC"
            ))?;
            let rows = stmt
                .query_map([post_id], |row| {
                    Ok(CommentWithAuthor {
                        comment: comment_at(row, 0)?,
                        author: user_at(row, COMMENT_WIDTH)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

/// Posts joined with author and circle, with like/comment counts computed
/// as distinct counts over left-joined children so childless posts report 0.
fn query_annotated_posts(
    conn: &Connection,
    viewer_id: &str,
    scope: FeedScope<'_>,
    limit: u32,
) -> Result<Vec<PostWithAuthorAndCircle>> {
    let filter = match scope {
        FeedScope::All => "",
        FeedScope::Circle(_) => "WHERE p.circle_id = ?3",
        FeedScope::Author(_) => "WHERE p.author_id = ?3",
    };

    let sql = format!(
        "SELECT {POST_COLUMNS}, {USER_COLUMNS}, {CIRCLE_COLUMNS},
                COUNT(DISTINCT l.id),
                COUNT(DISTINCT cm.id),
                COUNT(DISTINCT CASE WHEN l.user_id = ?1 THEN l.id END) > 0
         FROM posts p
         JOIN users u ON p.author_id = u.id
         JOIN circles c ON p.circle_id = c.id
         LEFT JOIN likes l ON l.post_id = p.id
         LEFT JOIN comments cm ON cm.post_id = p.id
         {filter}
         GROUP BY p.id
         ORDER BY p.created_at DESC, p.id DESC
         LIMIT ?2"
    );

    let mut params: Vec<&dyn ToSql> = Vec::with_capacity(3);
    params.push(&viewer_id);
    params.push(&limit);
    match &scope {
        FeedScope::All => {}
        FeedScope::Circle(circle_id) => params.push(circle_id),
        FeedScope::Author(author_id) => params.push(author_id),
    }

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params.as_slice(), annotated_post)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn annotated_post(row: &Row<'_>) -> rusqlite::Result<PostWithAuthorAndCircle> {
    let author_at = POST_WIDTH;
    let circle_at_offset = author_at + USER_WIDTH;
    let counts_at = circle_at_offset + CIRCLE_WIDTH;

    Ok(PostWithAuthorAndCircle {
        post: post_at(row, 0)?,
        author: user_at(row, author_at)?,
        circle: circle_at(row, circle_at_offset)?,
        likes_count: row.get(counts_at)?,
        comments_count: row.get(counts_at + 1)?,
        is_liked: row.get(counts_at + 2)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
