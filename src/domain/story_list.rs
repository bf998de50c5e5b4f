use indexmap::IndexMap;

use crate::api::StoryApi;
use crate::app::{Result, StorylineError};
use crate::domain::{NewStory, Story, User};

/// All known stories in server order (newest first), keyed by `story_id`.
#[derive(Debug, Clone, Default)]
pub struct StoryList {
    stories: IndexMap<String, Story>,
}

impl StoryList {
    /// Build a list, keeping the first occurrence of any repeated id.
    pub fn new(stories: Vec<Story>) -> Self {
        let mut map = IndexMap::with_capacity(stories.len());
        for story in stories {
            if map.contains_key(&story.story_id) {
                tracing::warn!("Ignoring duplicate story {}", story.story_id);
                continue;
            }
            map.insert(story.story_id.clone(), story);
        }
        Self { stories: map }
    }

    pub async fn fetch_all(api: &dyn StoryApi) -> Result<Self> {
        let stories = api.get_stories().await?;
        tracing::debug!("Loaded {} stories", stories.len());
        Ok(Self::new(stories))
    }

    /// Submit a story as `user`. It is inserted at the front only once the
    /// server has confirmed it.
    pub async fn add_story(
        &mut self,
        api: &dyn StoryApi,
        user: &mut User,
        new_story: &NewStory,
    ) -> Result<Story> {
        let story = api.create_story(user.token()?, new_story).await?;
        tracing::info!("Created story {} ({})", story.story_id, story.title);

        self.stories
            .shift_insert(0, story.story_id.clone(), story.clone());
        user.record_own_story(&story);
        Ok(story)
    }

    /// Delete a story as `user`, then drop it from this list and from the
    /// user's collections.
    ///
    /// Fails with `NotFound` without contacting the server when the id is
    /// unknown locally. When the server answers `NotFound` the story is
    /// dropped locally as well before the error is returned.
    pub async fn remove_story(
        &mut self,
        api: &dyn StoryApi,
        user: &mut User,
        story_id: &str,
    ) -> Result<Story> {
        let known = self
            .stories
            .get(story_id)
            .or_else(|| user.find_story(story_id))
            .cloned()
            .ok_or_else(|| StorylineError::NotFound(story_id.to_string()))?;

        match api.delete_story(user.token()?, story_id).await {
            Ok(()) => tracing::info!("Deleted story {}", story_id),
            Err(err) if err.is_not_found() => {
                tracing::info!("Story {} already deleted on the server", story_id);
                self.stories.shift_remove(story_id);
                user.forget_story(story_id);
                return Err(err);
            }
            Err(err) => return Err(err),
        }

        self.stories.shift_remove(story_id);
        user.forget_story(story_id);
        Ok(known)
    }

    pub fn contains(&self, story_id: &str) -> bool {
        self.stories.contains_key(story_id)
    }

    pub fn get(&self, story_id: &str) -> Option<&Story> {
        self.stories.get(story_id)
    }

    pub fn first(&self) -> Option<&Story> {
        self.stories.first().map(|(_, story)| story)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Story> {
        self.stories.values()
    }

    pub fn len(&self) -> usize {
        self.stories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }
}
