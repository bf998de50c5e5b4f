use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::api::{StoryApi, UserRecord};
use crate::app::{Result, StorylineError};
use crate::domain::Story;

/// A logged-in user with their own stories and favorites.
///
/// Both collections are keyed by `story_id` and keep insertion order.
#[derive(Debug, Clone)]
pub struct User {
    pub username: String,
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
    token: String,
    own_stories: IndexMap<String, Story>,
    favorites: IndexMap<String, Story>,
}

impl User {
    pub fn from_record(record: UserRecord, token: String) -> Self {
        let username = record.username;

        let mut own_stories = IndexMap::new();
        for story in record.stories {
            if story.username == username {
                own_stories.insert(story.story_id.clone(), story);
            } else {
                tracing::warn!(
                    "Dropping story {} owned by {} from {}'s stories",
                    story.story_id,
                    story.username,
                    username
                );
            }
        }

        let favorites = record
            .favorites
            .into_iter()
            .map(|s| (s.story_id.clone(), s))
            .collect();

        Self {
            username,
            name: record.name,
            created_at: record.created_at,
            token,
            own_stories,
            favorites,
        }
    }

    pub async fn login(api: &dyn StoryApi, username: &str, password: &str) -> Result<Self> {
        let session = api.login(username, password).await?;
        tracing::info!("Logged in as {}", session.user.username);
        Ok(Self::from_record(session.user, session.token))
    }

    pub async fn signup(
        api: &dyn StoryApi,
        username: &str,
        password: &str,
        name: &str,
    ) -> Result<Self> {
        let session = api.signup(username, password, name).await?;
        tracing::info!("Signed up as {}", session.user.username);
        Ok(Self::from_record(session.user, session.token))
    }

    /// Rebuild a user from a known username and token.
    pub async fn fetch(api: &dyn StoryApi, username: &str, token: &str) -> Result<Self> {
        if token.is_empty() {
            return Err(StorylineError::Auth("No token available".into()));
        }
        let record = api.get_user(token, username).await?;
        Ok(Self::from_record(record, token.to_string()))
    }

    pub fn token(&self) -> Result<&str> {
        if self.token.is_empty() {
            return Err(StorylineError::Auth(format!(
                "No token available for {}",
                self.username
            )));
        }
        Ok(&self.token)
    }

    pub fn is_favorite(&self, story_id: &str) -> bool {
        self.favorites.contains_key(story_id)
    }

    pub fn owns(&self, story_id: &str) -> bool {
        self.own_stories.contains_key(story_id)
    }

    pub fn favorites(&self) -> impl Iterator<Item = &Story> {
        self.favorites.values()
    }

    pub fn own_stories(&self) -> impl Iterator<Item = &Story> {
        self.own_stories.values()
    }

    pub fn favorite_count(&self) -> usize {
        self.favorites.len()
    }

    pub fn own_story_count(&self) -> usize {
        self.own_stories.len()
    }

    /// Look a story up in the user's own collections.
    pub fn find_story(&self, story_id: &str) -> Option<&Story> {
        self.favorites
            .get(story_id)
            .or_else(|| self.own_stories.get(story_id))
    }

    /// Mark `story` as a favorite on the server, then locally.
    ///
    /// Returns `Ok(false)` without contacting the server when it is already
    /// a favorite.
    pub async fn add_story_to_favorites(&mut self, api: &dyn StoryApi, story: &Story) -> Result<bool> {
        if self.is_favorite(&story.story_id) {
            tracing::debug!("Story {} is already a favorite", story.story_id);
            return Ok(false);
        }

        api.add_favorite(self.token()?, &self.username, &story.story_id)
            .await?;
        Ok(self.apply_favorite(story))
    }

    /// Unmark `story` on the server, then locally.
    ///
    /// Returns `Ok(false)` without contacting the server when it is not a
    /// favorite.
    pub async fn remove_story_from_favorites(
        &mut self,
        api: &dyn StoryApi,
        story: &Story,
    ) -> Result<bool> {
        if !self.is_favorite(&story.story_id) {
            tracing::debug!("Story {} is not a favorite", story.story_id);
            return Ok(false);
        }

        api.remove_favorite(self.token()?, &self.username, &story.story_id)
            .await?;
        Ok(self.apply_unfavorite(&story.story_id))
    }

    /// Record a server-confirmed favorite. Returns whether the set changed.
    pub fn apply_favorite(&mut self, story: &Story) -> bool {
        if self.is_favorite(&story.story_id) {
            return false;
        }
        tracing::info!("{} favorited {}", self.username, story.story_id);
        self.favorites
            .insert(story.story_id.clone(), story.clone());
        true
    }

    /// Record a server-confirmed unfavorite. Returns whether the set changed.
    pub fn apply_unfavorite(&mut self, story_id: &str) -> bool {
        let removed = self.favorites.shift_remove(story_id).is_some();
        if removed {
            tracing::info!("{} unfavorited {}", self.username, story_id);
        }
        removed
    }

    pub(crate) fn record_own_story(&mut self, story: &Story) {
        if story.username != self.username {
            tracing::warn!(
                "Story {} belongs to {}, not {}",
                story.story_id,
                story.username,
                self.username
            );
            return;
        }
        self.own_stories
            .shift_insert(0, story.story_id.clone(), story.clone());
    }

    pub(crate) fn forget_story(&mut self, story_id: &str) {
        self.own_stories.shift_remove(story_id);
        self.favorites.shift_remove(story_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MemoryApi;
    use tokio_test::{assert_err, assert_ok};

    async fn logged_in(api: &MemoryApi) -> User {
        api.add_user("joel", "pw", "Joel");
        User::login(api, "joel", "pw").await.unwrap()
    }

    #[tokio::test]
    async fn test_favorite_then_unfavorite() {
        let api = MemoryApi::demo();
        let mut user = logged_in(&api).await;
        let story = Story::new("demo-1", "T", "J", "http://x.com", "ada");

        assert!(!user.is_favorite("demo-1"));
        assert!(assert_ok!(user.add_story_to_favorites(&api, &story).await));
        assert!(user.is_favorite("demo-1"));
        assert_eq!(api.favorite_ids("joel"), vec!["demo-1"]);

        assert!(assert_ok!(user.remove_story_from_favorites(&api, &story).await));
        assert!(!user.is_favorite("demo-1"));
        assert!(api.favorite_ids("joel").is_empty());
    }

    #[tokio::test]
    async fn test_favoriting_twice_keeps_one_entry() {
        let api = MemoryApi::demo();
        let mut user = logged_in(&api).await;
        let story = Story::new("demo-1", "T", "J", "http://x.com", "ada");

        assert!(assert_ok!(user.add_story_to_favorites(&api, &story).await));
        let calls = api.calls();
        assert!(!assert_ok!(user.add_story_to_favorites(&api, &story).await));

        assert_eq!(user.favorite_count(), 1);
        assert_eq!(api.calls(), calls);
    }

    #[tokio::test]
    async fn test_failed_unfavorite_leaves_set_unchanged() {
        let api = MemoryApi::demo();
        let mut user = logged_in(&api).await;
        let story = Story::new("demo-2", "T", "J", "http://x.com", "ada");
        user.add_story_to_favorites(&api, &story).await.unwrap();

        api.set_offline(true);
        let err = assert_err!(user.remove_story_from_favorites(&api, &story).await);
        assert!(matches!(err, StorylineError::Network(_)));
        assert!(user.is_favorite("demo-2"));
    }

    #[tokio::test]
    async fn test_missing_token_is_auth_error() {
        let api = MemoryApi::demo();
        let record = UserRecord {
            username: "joel".into(),
            name: "Joel".into(),
            created_at: None,
            favorites: vec![],
            stories: vec![],
        };
        let mut user = User::from_record(record, String::new());
        let story = Story::new("demo-1", "T", "J", "http://x.com", "ada");

        let err = assert_err!(user.add_story_to_favorites(&api, &story).await);
        assert!(matches!(err, StorylineError::Auth(_)));
        assert_eq!(api.calls(), 0);
    }

    #[test]
    fn test_from_record_keeps_only_owned_stories() {
        let record = UserRecord {
            username: "joel".into(),
            name: "Joel".into(),
            created_at: None,
            favorites: vec![Story::new("f", "T", "J", "http://x.com", "ada")],
            stories: vec![
                Story::new("mine", "T", "J", "http://x.com", "joel"),
                Story::new("theirs", "T", "J", "http://x.com", "ada"),
            ],
        };
        let user = User::from_record(record, "tok".into());

        assert!(user.owns("mine"));
        assert!(!user.owns("theirs"));
        assert!(user.is_favorite("f"));
        assert!(user.own_stories().all(|s| s.username == user.username));
    }

    #[test]
    fn test_forget_story_clears_both_collections() {
        let story = Story::new("s", "T", "J", "http://x.com", "joel");
        let record = UserRecord {
            username: "joel".into(),
            name: "Joel".into(),
            created_at: None,
            favorites: vec![story.clone()],
            stories: vec![story],
        };
        let mut user = User::from_record(record, "tok".into());

        user.forget_story("s");
        assert!(!user.owns("s"));
        assert!(!user.is_favorite("s"));
    }

    #[tokio::test]
    async fn test_fetch_rebuilds_user_from_token() {
        let api = MemoryApi::demo();
        let user = User::fetch(&api, "demo", "token-demo").await.unwrap();
        assert_eq!(user.name, "Demo User");
        assert!(user.owns("demo-3"));

        let err = User::fetch(&api, "demo", "").await.unwrap_err();
        assert!(matches!(err, StorylineError::Auth(_)));
    }
}
