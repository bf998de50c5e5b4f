pub mod http;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::app::Result;
use crate::domain::{NewStory, Story};

pub use http::HttpApi;
pub use memory::MemoryApi;

/// A user record as the server reports it, including denormalized favorites
/// and own stories.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub favorites: Vec<Story>,
    #[serde(default)]
    pub stories: Vec<Story>,
}

/// Result of a successful login or signup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: UserRecord,
}

/// Remote story service.
///
/// Every mutating call takes the caller's token. Implementations map
/// rejections onto `Validation`, `Auth` and `NotFound`, and everything else
/// onto `Network`.
#[async_trait]
pub trait StoryApi: Send + Sync {
    async fn get_stories(&self) -> Result<Vec<Story>>;

    async fn create_story(&self, token: &str, story: &NewStory) -> Result<Story>;

    async fn delete_story(&self, token: &str, story_id: &str) -> Result<()>;

    async fn add_favorite(&self, token: &str, username: &str, story_id: &str) -> Result<()>;

    async fn remove_favorite(&self, token: &str, username: &str, story_id: &str) -> Result<()>;

    async fn login(&self, username: &str, password: &str) -> Result<Session>;

    async fn signup(&self, username: &str, password: &str, name: &str) -> Result<Session>;

    async fn get_user(&self, token: &str, username: &str) -> Result<UserRecord>;
}
