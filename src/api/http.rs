use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::api::{Session, StoryApi, UserRecord};
use crate::app::{Result, StorylineError};
use crate::domain::{NewStory, Story};

pub const DEFAULT_BASE_URL: &str = "https://hack-or-snooze-v3.herokuapp.com";
pub const DEFAULT_PAGE_SIZE: usize = 25;

#[derive(Serialize)]
struct TokenBody<'a> {
    token: &'a str,
}

#[derive(Serialize)]
struct CreateStoryBody<'a> {
    token: &'a str,
    story: &'a NewStory,
}

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Serialize)]
struct UserBody<'a> {
    user: Credentials<'a>,
}

#[derive(Deserialize)]
struct StoriesEnvelope {
    stories: Vec<Story>,
}

#[derive(Deserialize)]
struct StoryEnvelope {
    story: Story,
}

#[derive(Deserialize)]
struct UserEnvelope {
    user: UserRecord,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

/// reqwest-backed client for the story service.
pub struct HttpApi {
    client: Client,
    base_url: String,
    page_size: usize,
}

impl HttpApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Self::with_page_size(base_url, timeout, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(base_url: &str, timeout: Duration, page_size: usize) -> Result<Self> {
        Url::parse(base_url)?;

        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .user_agent("storyline/0.1.0")
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            page_size,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

/// Map a non-success response onto the error taxonomy.
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .ok()
        .and_then(|e| e.error.message.or(e.error.title))
        .unwrap_or_else(|| status.to_string());

    Err(match status {
        StatusCode::BAD_REQUEST => StorylineError::Validation(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StorylineError::Auth(message),
        StatusCode::NOT_FOUND => StorylineError::NotFound(message),
        _ => StorylineError::Network(format!("{}: {}", status, message)),
    })
}

#[async_trait]
impl StoryApi for HttpApi {
    async fn get_stories(&self) -> Result<Vec<Story>> {
        let response = self
            .client
            .get(self.endpoint("stories"))
            .query(&[("skip", 0), ("limit", self.page_size)])
            .send()
            .await?;

        let envelope: StoriesEnvelope = check(response).await?.json().await?;
        tracing::debug!("Fetched {} stories", envelope.stories.len());
        Ok(envelope.stories)
    }

    async fn create_story(&self, token: &str, story: &NewStory) -> Result<Story> {
        let response = self
            .client
            .post(self.endpoint("stories"))
            .json(&CreateStoryBody { token, story })
            .send()
            .await?;

        let envelope: StoryEnvelope = check(response).await?.json().await?;
        Ok(envelope.story)
    }

    async fn delete_story(&self, token: &str, story_id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.endpoint(&format!("stories/{}", story_id)))
            .json(&TokenBody { token })
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }

    async fn add_favorite(&self, token: &str, username: &str, story_id: &str) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint(&format!("users/{}/favorites/{}", username, story_id)))
            .json(&TokenBody { token })
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }

    async fn remove_favorite(&self, token: &str, username: &str, story_id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.endpoint(&format!("users/{}/favorites/{}", username, story_id)))
            .json(&TokenBody { token })
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }

    async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let response = self
            .client
            .post(self.endpoint("login"))
            .json(&UserBody {
                user: Credentials {
                    username,
                    password,
                    name: None,
                },
            })
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }

    async fn signup(&self, username: &str, password: &str, name: &str) -> Result<Session> {
        let response = self
            .client
            .post(self.endpoint("signup"))
            .json(&UserBody {
                user: Credentials {
                    username,
                    password,
                    name: Some(name),
                },
            })
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }

    async fn get_user(&self, token: &str, username: &str) -> Result<UserRecord> {
        let response = self
            .client
            .get(self.endpoint(&format!("users/{}", username)))
            .query(&[("token", token)])
            .send()
            .await?;

        let envelope: UserEnvelope = check(response).await?.json().await?;
        Ok(envelope.user)
    }
}
