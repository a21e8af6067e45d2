pub mod auth;
pub mod circles;
pub mod comments;
pub mod error;
pub mod init;
pub mod likes;
pub mod middleware;
pub mod posts;
pub mod routes;
pub mod state;
pub mod users;
mod validation;

pub use routes::router;
pub use state::{AppState, AppStateInner, IdentityProvider};
