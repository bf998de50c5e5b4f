use crate::domain::{Story, StoryList, User};

/// The single live story list and the logged-in user, if any.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub stories: StoryList,
    pub user: Option<User>,
}

impl AppState {
    pub fn new(stories: StoryList, user: Option<User>) -> Self {
        Self { stories, user }
    }

    /// Resolve a story id against the list first, then the user's own
    /// collections (which may hold stories outside the fetched page).
    pub fn find_story(&self, story_id: &str) -> Option<&Story> {
        self.stories
            .get(story_id)
            .or_else(|| self.user.as_ref().and_then(|u| u.find_story(story_id)))
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::UserRecord;

    #[test]
    fn test_find_story_falls_back_to_user_collections() {
        let listed = Story::new("a", "A", "J", "http://a.com", "joel");
        let favorite_only = Story::new("old", "Old", "J", "http://old.com", "ada");
        let user = User::from_record(
            UserRecord {
                username: "joel".into(),
                name: "Joel".into(),
                created_at: None,
                favorites: vec![favorite_only.clone()],
                stories: vec![],
            },
            "tok".into(),
        );
        let state = AppState::new(StoryList::new(vec![listed.clone()]), Some(user));

        assert_eq!(state.find_story("a"), Some(&listed));
        assert_eq!(state.find_story("old"), Some(&favorite_only));
        assert_eq!(state.find_story("missing"), None);
    }
}
