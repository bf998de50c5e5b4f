//! In-process story service.
//!
//! Mirrors the remote service's rules closely enough to drive the client
//! offline (`--demo`) and in tests. Can be switched offline to simulate
//! transport failures.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use crate::api::{Session, StoryApi, UserRecord};
use crate::app::{Result, StorylineError};
use crate::domain::{NewStory, Story};

#[derive(Debug, Clone)]
struct Account {
    password: String,
    name: String,
    token: String,
    created_at: chrono::DateTime<Utc>,
    favorites: Vec<String>,
}

#[derive(Debug, Default)]
struct Inner {
    /// Newest first.
    stories: Vec<Story>,
    accounts: HashMap<String, Account>,
    next_id: usize,
}

impl Inner {
    fn username_for(&self, token: &str) -> Result<String> {
        self.accounts
            .iter()
            .find(|(_, account)| account.token == token)
            .map(|(username, _)| username.clone())
            .ok_or_else(|| StorylineError::Auth("Invalid token".into()))
    }

    fn story(&self, story_id: &str) -> Result<&Story> {
        self.stories
            .iter()
            .find(|s| s.story_id == story_id)
            .ok_or_else(|| StorylineError::NotFound(story_id.to_string()))
    }

    fn record(&self, username: &str) -> Result<UserRecord> {
        let account = self
            .accounts
            .get(username)
            .ok_or_else(|| StorylineError::NotFound(format!("No user {}", username)))?;

        let favorites = account
            .favorites
            .iter()
            .filter_map(|id| self.story(id).ok().cloned())
            .collect();
        let stories = self
            .stories
            .iter()
            .filter(|s| s.username == username)
            .cloned()
            .collect();

        Ok(UserRecord {
            username: username.to_string(),
            name: account.name.clone(),
            created_at: Some(account.created_at),
            favorites,
            stories,
        })
    }

    fn session(&self, username: &str) -> Result<Session> {
        let token = self
            .accounts
            .get(username)
            .map(|a| a.token.clone())
            .ok_or_else(|| StorylineError::Auth("Invalid credentials".into()))?;
        Ok(Session {
            token,
            user: self.record(username)?,
        })
    }
}

pub struct MemoryApi {
    inner: Mutex<Inner>,
    offline: AtomicBool,
    calls: AtomicUsize,
}

impl MemoryApi {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            offline: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    /// A service seeded with a `demo`/`demo` account and a few stories.
    pub fn demo() -> Self {
        let api = Self::new();
        api.add_user("demo", "demo", "Demo User");
        api.add_user("ada", "ada", "Ada Lovelace");
        api.seed_story(Story::new(
            "demo-1",
            "The Rust Programming Language",
            "Steve Klabnik",
            "https://doc.rust-lang.org/book/",
            "ada",
        ));
        api.seed_story(Story::new(
            "demo-2",
            "Tokio tutorial",
            "Tokio team",
            "https://tokio.rs/tokio/tutorial",
            "ada",
        ));
        api.seed_story(Story::new(
            "demo-3",
            "My first story",
            "Demo User",
            "http://localhost:8080/first",
            "demo",
        ));
        api
    }

    /// Register an account and return its token.
    pub fn add_user(&self, username: &str, password: &str, name: &str) -> String {
        let token = format!("token-{}", username);
        self.lock().accounts.insert(
            username.to_string(),
            Account {
                password: password.to_string(),
                name: name.to_string(),
                token: token.clone(),
                created_at: Utc::now(),
                favorites: Vec::new(),
            },
        );
        token
    }

    /// Insert a story as the newest entry without any checks.
    pub fn seed_story(&self, story: Story) {
        self.lock().stories.insert(0, story);
    }

    /// While offline every call fails with a network error.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of calls received so far, including failed ones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn favorite_ids(&self, username: &str) -> Vec<String> {
        self.lock()
            .accounts
            .get(username)
            .map(|a| a.favorites.clone())
            .unwrap_or_default()
    }

    /// Recovers the data from a poisoned lock.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_inner<T>(&self, f: impl FnOnce(&mut Inner) -> Result<T>) -> Result<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(StorylineError::Network("service unreachable".into()));
        }
        f(&mut self.lock())
    }
}

impl Default for MemoryApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StoryApi for MemoryApi {
    async fn get_stories(&self) -> Result<Vec<Story>> {
        self.with_inner(|inner| Ok(inner.stories.clone()))
    }

    async fn create_story(&self, token: &str, story: &NewStory) -> Result<Story> {
        self.with_inner(|inner| {
            let username = inner.username_for(token)?;
            story.validate()?;

            inner.next_id += 1;
            let created = Story {
                story_id: format!("story-{}", inner.next_id),
                title: story.title.clone(),
                author: story.author.clone(),
                url: story.url.clone(),
                username,
                created_at: Utc::now(),
            };
            inner.stories.insert(0, created.clone());
            Ok(created)
        })
    }

    async fn delete_story(&self, token: &str, story_id: &str) -> Result<()> {
        self.with_inner(|inner| {
            let username = inner.username_for(token)?;
            let owner = inner.story(story_id)?.username.clone();
            if owner != username {
                return Err(StorylineError::Auth(format!(
                    "{} does not own story {}",
                    username, story_id
                )));
            }
            inner.stories.retain(|s| s.story_id != story_id);
            for account in inner.accounts.values_mut() {
                account.favorites.retain(|id| id != story_id);
            }
            Ok(())
        })
    }

    async fn add_favorite(&self, token: &str, username: &str, story_id: &str) -> Result<()> {
        self.with_inner(|inner| {
            if inner.username_for(token)? != username {
                return Err(StorylineError::Auth("Token does not match user".into()));
            }
            inner.story(story_id)?;
            if let Some(account) = inner.accounts.get_mut(username) {
                if !account.favorites.iter().any(|id| id == story_id) {
                    account.favorites.push(story_id.to_string());
                }
            }
            Ok(())
        })
    }

    async fn remove_favorite(&self, token: &str, username: &str, story_id: &str) -> Result<()> {
        self.with_inner(|inner| {
            if inner.username_for(token)? != username {
                return Err(StorylineError::Auth("Token does not match user".into()));
            }
            inner.story(story_id)?;
            if let Some(account) = inner.accounts.get_mut(username) {
                account.favorites.retain(|id| id != story_id);
            }
            Ok(())
        })
    }

    async fn login(&self, username: &str, password: &str) -> Result<Session> {
        self.with_inner(|inner| {
            match inner.accounts.get(username) {
                Some(account) if account.password == password => {}
                _ => return Err(StorylineError::Auth("Invalid credentials".into())),
            }
            inner.session(username)
        })
    }

    async fn signup(&self, username: &str, password: &str, name: &str) -> Result<Session> {
        self.with_inner(|inner| {
            if username.is_empty() || password.is_empty() {
                return Err(StorylineError::Validation(
                    "username and password are required".into(),
                ));
            }
            if inner.accounts.contains_key(username) {
                return Err(StorylineError::Validation(format!(
                    "Username {} already taken",
                    username
                )));
            }
            inner.accounts.insert(
                username.to_string(),
                Account {
                    password: password.to_string(),
                    name: name.to_string(),
                    token: format!("token-{}", username),
                    created_at: Utc::now(),
                    favorites: Vec::new(),
                },
            );
            inner.session(username)
        })
    }

    async fn get_user(&self, token: &str, username: &str) -> Result<UserRecord> {
        self.with_inner(|inner| {
            if inner.username_for(token)? != username {
                return Err(StorylineError::Auth("Token does not match user".into()));
            }
            inner.record(username)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_story_is_newest_first() {
        let api = MemoryApi::demo();
        let token = api.add_user("joel", "pw", "Joel");
        let created = api
            .create_story(&token, &NewStory::new("J", "T", "http://x.com"))
            .await
            .unwrap();

        let stories = api.get_stories().await.unwrap();
        assert_eq!(stories[0], created);
        assert_eq!(created.username, "joel");
    }

    #[tokio::test]
    async fn test_create_story_rejects_bad_token() {
        let api = MemoryApi::new();
        let err = api
            .create_story("nope", &NewStory::new("J", "T", "http://x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorylineError::Auth(_)));
    }

    #[tokio::test]
    async fn test_delete_requires_owner() {
        let api = MemoryApi::demo();
        let token = api.add_user("joel", "pw", "Joel");
        let err = api.delete_story(&token, "demo-1").await.unwrap_err();
        assert!(matches!(err, StorylineError::Auth(_)));
    }

    #[tokio::test]
    async fn test_delete_drops_favorites_everywhere() {
        let api = MemoryApi::demo();
        let token = api.add_user("joel", "pw", "Joel");
        api.add_favorite(&token, "joel", "demo-3").await.unwrap();

        api.delete_story("token-demo", "demo-3").await.unwrap();
        assert!(api.favorite_ids("joel").is_empty());
    }

    #[tokio::test]
    async fn test_offline_fails_with_network_and_counts_calls() {
        let api = MemoryApi::demo();
        api.set_offline(true);
        let err = api.get_stories().await.unwrap_err();
        assert!(matches!(err, StorylineError::Network(_)));
        assert_eq!(api.calls(), 1);
    }

    #[tokio::test]
    async fn test_poisoned_lock_still_serves_calls() {
        let api = std::sync::Arc::new(MemoryApi::new());
        let holder = api.clone();
        let _ = std::thread::spawn(move || {
            let _guard = holder.inner.lock();
            panic!("panic while holding the lock");
        })
        .join();
        assert!(api.inner.is_poisoned());

        let token = api.add_user("joel", "pw", "Joel");
        api.seed_story(Story::new("a", "A", "J", "http://a.com", "joel"));
        api.add_favorite(&token, "joel", "a").await.unwrap();

        assert_eq!(api.get_stories().await.unwrap().len(), 1);
        assert_eq!(api.favorite_ids("joel"), vec!["a"]);
    }

    #[tokio::test]
    async fn test_login_and_signup() {
        let api = MemoryApi::demo();
        let session = api.login("demo", "demo").await.unwrap();
        assert_eq!(session.token, "token-demo");
        assert_eq!(session.user.stories.len(), 1);

        assert!(api.login("demo", "wrong").await.is_err());

        let session = api.signup("new", "pw", "New").await.unwrap();
        assert_eq!(session.user.name, "New");
        assert!(api.signup("new", "pw", "Again").await.is_err());
    }
}
