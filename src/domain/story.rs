use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::app::{Result, StorylineError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub story_id: String,
    pub title: String,
    pub author: String,
    pub url: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl Story {
    pub fn new(story_id: &str, title: &str, author: &str, url: &str, username: &str) -> Self {
        Self {
            story_id: story_id.to_string(),
            title: title.to_string(),
            author: author.to_string(),
            url: url.to_string(),
            username: username.to_string(),
            created_at: Utc::now(),
        }
    }

    /// Host (and port, when present) of the story's url, for display.
    ///
    /// Falls back to the raw url when it cannot be parsed.
    pub fn host_name(&self) -> String {
        match Url::parse(&self.url) {
            Ok(parsed) => match (parsed.host_str(), parsed.port()) {
                (Some(host), Some(port)) => format!("{}:{}", host, port),
                (Some(host), None) => host.to_string(),
                (None, _) => self.url.clone(),
            },
            Err(_) => self.url.clone(),
        }
    }
}

/// Fields a user supplies when submitting a story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStory {
    pub author: String,
    pub title: String,
    pub url: String,
}

impl NewStory {
    pub fn new(author: &str, title: &str, url: &str) -> Self {
        Self {
            author: author.trim().to_string(),
            title: title.trim().to_string(),
            url: url.trim().to_string(),
        }
    }

    /// Reject submissions the server would refuse before a request is made.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("author", &self.author),
            ("title", &self.title),
            ("url", &self.url),
        ] {
            if value.is_empty() {
                return Err(StorylineError::Validation(format!("{} is required", field)));
            }
        }

        let parsed = Url::parse(&self.url)
            .map_err(|e| StorylineError::Validation(format!("url {}: {}", self.url, e)))?;
        if parsed.host_str().is_none() {
            return Err(StorylineError::Validation(format!(
                "url has no host: {}",
                self.url
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_name_plain() {
        let story = Story::new("a", "T", "J", "http://x.com", "joel");
        assert_eq!(story.host_name(), "x.com");
    }

    #[test]
    fn test_host_name_strips_path_and_query() {
        let story = Story::new("a", "T", "J", "https://news.example.org/a/b?c=d", "joel");
        assert_eq!(story.host_name(), "news.example.org");
    }

    #[test]
    fn test_host_name_keeps_port() {
        let story = Story::new("a", "T", "J", "http://localhost:8080/x", "joel");
        assert_eq!(story.host_name(), "localhost:8080");
    }

    #[test]
    fn test_host_name_unparseable_falls_back() {
        let story = Story::new("a", "T", "J", "not a url", "joel");
        assert_eq!(story.host_name(), "not a url");
    }

    #[test]
    fn test_story_wire_format_is_camel_case() {
        let json = r#"{
            "storyId": "abc",
            "title": "T",
            "author": "J",
            "url": "http://x.com",
            "username": "joel",
            "createdAt": "2024-01-02T03:04:05.000Z",
            "updatedAt": "2024-01-02T03:04:05.000Z"
        }"#;
        let story: Story = serde_json::from_str(json).unwrap();
        assert_eq!(story.story_id, "abc");
        assert_eq!(story.created_at.to_rfc3339(), "2024-01-02T03:04:05+00:00");
    }

    #[test]
    fn test_new_story_trims_fields() {
        let new_story = NewStory::new("  J ", "T\n", " http://x.com ");
        assert_eq!(new_story.author, "J");
        assert_eq!(new_story.title, "T");
        assert_eq!(new_story.url, "http://x.com");
    }

    #[test]
    fn test_validate_accepts_complete_story() {
        assert!(NewStory::new("J", "T", "http://x.com").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_field() {
        let err = NewStory::new("J", "", "http://x.com").validate().unwrap_err();
        assert!(matches!(err, StorylineError::Validation(msg) if msg.contains("title")));
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let err = NewStory::new("J", "T", "x dot com").validate().unwrap_err();
        assert!(matches!(err, StorylineError::Validation(_)));

        let err = NewStory::new("J", "T", "mailto:j@x.com").validate().unwrap_err();
        assert!(matches!(err, StorylineError::Validation(msg) if msg.contains("no host")));
    }
}
