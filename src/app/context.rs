use std::sync::Arc;

use crate::api::{HttpApi, MemoryApi, StoryApi};
use crate::app::error::{Result, StorylineError};
use crate::app::state::AppState;
use crate::config::ApiConfig;
use crate::domain::{StoryList, User};

/// Account the client acts as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub token: String,
}

pub struct AppContext {
    pub api: Arc<dyn StoryApi>,
    pub credentials: Option<Credentials>,
}

impl AppContext {
    pub fn new(config: &ApiConfig, credentials: Option<Credentials>) -> Result<Self> {
        let api = HttpApi::with_page_size(&config.base_url, config.timeout(), config.page_size)?;
        Ok(Self::with_api(Arc::new(api), credentials))
    }

    /// Context backed by a seeded in-process service, logged in as `demo`.
    pub fn demo() -> Self {
        let credentials = Credentials {
            username: "demo".to_string(),
            token: "token-demo".to_string(),
        };
        Self::with_api(Arc::new(MemoryApi::demo()), Some(credentials))
    }

    pub fn with_api(api: Arc<dyn StoryApi>, credentials: Option<Credentials>) -> Self {
        Self { api, credentials }
    }

    pub fn credentials(&self) -> Result<&Credentials> {
        self.credentials.as_ref().ok_or_else(|| {
            StorylineError::Auth(
                "No credentials configured; set [credentials] or pass --username/--token".into(),
            )
        })
    }

    pub async fn current_user(&self) -> Result<User> {
        let credentials = self.credentials()?;
        User::fetch(self.api.as_ref(), &credentials.username, &credentials.token).await
    }

    /// Fetch all stories and, when credentials are known, the user.
    pub async fn load_state(&self) -> Result<AppState> {
        let stories = StoryList::fetch_all(self.api.as_ref());
        match self.credentials {
            Some(_) => {
                let (stories, user) = tokio::try_join!(stories, self.current_user())?;
                Ok(AppState::new(stories, Some(user)))
            }
            None => Ok(AppState::new(stories.await?, None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_demo_context_loads_user_and_stories() {
        let ctx = AppContext::demo();
        let state = ctx.load_state().await.unwrap();

        assert_eq!(state.stories.len(), 3);
        let user = state.user.as_ref().unwrap();
        assert_eq!(user.username, "demo");
        assert!(user.owns("demo-3"));
    }

    #[tokio::test]
    async fn test_anonymous_context_has_no_user() {
        let ctx = AppContext::with_api(Arc::new(MemoryApi::demo()), None);
        let state = ctx.load_state().await.unwrap();

        assert!(state.user.is_none());
        assert!(matches!(ctx.credentials(), Err(StorylineError::Auth(_))));
    }

    #[test]
    fn test_new_rejects_bad_base_url() {
        let config = ApiConfig {
            base_url: "::nope::".into(),
            ..ApiConfig::default()
        };
        assert!(AppContext::new(&config, None).is_err());
    }
}
