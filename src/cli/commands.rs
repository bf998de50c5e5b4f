use crate::app::{AppContext, AppState, Result, StorylineError};
use crate::domain::{NewStory, Story, User};
use crate::view::markup::{NO_FAVORITES, NO_OWN_STORIES};

/// One line per story: favorite marker (when logged in), title, host, id.
fn format_story(story: &Story, favorite: Option<bool>) -> String {
    let marker = match favorite {
        Some(true) => "★ ",
        Some(false) => "☆ ",
        None => "",
    };
    format!(
        "{}{} ({})\n  by {}, posted by {} [{}]",
        marker,
        story.title,
        story.host_name(),
        story.author,
        story.username,
        story.story_id
    )
}

fn print_stories<'a>(stories: impl Iterator<Item = &'a Story>, user: Option<&User>) {
    for story in stories {
        let favorite = user.map(|u| u.is_favorite(&story.story_id));
        println!("{}", format_story(story, favorite));
    }
}

/// State with a logged-in user, or an `Auth` error naming what is missing.
async fn logged_in_state(ctx: &AppContext) -> Result<AppState> {
    ctx.credentials()?;
    ctx.load_state().await
}

fn user_mut(state: &mut AppState) -> Result<&mut User> {
    state
        .user
        .as_mut()
        .ok_or_else(|| StorylineError::Auth("Not logged in".into()))
}

pub async fn list_stories(ctx: &AppContext) -> Result<()> {
    let state = ctx.load_state().await?;

    if state.stories.is_empty() {
        println!("No stories");
        return Ok(());
    }

    print_stories(state.stories.iter(), state.user.as_ref());
    Ok(())
}

pub async fn list_own_stories(ctx: &AppContext) -> Result<()> {
    let user = ctx.current_user().await?;

    if user.own_story_count() == 0 {
        println!("{}", NO_OWN_STORIES);
        return Ok(());
    }

    print_stories(user.own_stories(), Some(&user));
    Ok(())
}

pub async fn list_favorites(ctx: &AppContext) -> Result<()> {
    let user = ctx.current_user().await?;

    if user.favorite_count() == 0 {
        println!("{}", NO_FAVORITES);
        return Ok(());
    }

    print_stories(user.favorites(), Some(&user));
    Ok(())
}

pub async fn submit_story(ctx: &AppContext, author: &str, title: &str, url: &str) -> Result<Story> {
    let new_story = NewStory::new(author, title, url);
    new_story.validate()?;

    let mut state = logged_in_state(ctx).await?;
    let AppState { stories, user } = &mut state;
    let user = user
        .as_mut()
        .ok_or_else(|| StorylineError::Auth("Not logged in".into()))?;

    let story = stories.add_story(ctx.api.as_ref(), user, &new_story).await?;
    println!("Submitted story: {} ({})", story.title, story.host_name());
    println!("  id: {}", story.story_id);
    Ok(story)
}

pub async fn delete_story(ctx: &AppContext, story_id: &str) -> Result<()> {
    let mut state = logged_in_state(ctx).await?;
    let AppState { stories, user } = &mut state;
    let user = user
        .as_mut()
        .ok_or_else(|| StorylineError::Auth("Not logged in".into()))?;

    let story = stories.remove_story(ctx.api.as_ref(), user, story_id).await?;
    println!("Deleted story: {}", story.title);
    Ok(())
}

/// Add or remove a favorite. Returns whether anything changed.
pub async fn set_favorite(ctx: &AppContext, story_id: &str, favorite: bool) -> Result<bool> {
    let mut state = logged_in_state(ctx).await?;
    let story = state
        .find_story(story_id)
        .cloned()
        .ok_or_else(|| StorylineError::NotFound(story_id.to_string()))?;
    let user = user_mut(&mut state)?;

    let changed = if favorite {
        user.add_story_to_favorites(ctx.api.as_ref(), &story).await?
    } else {
        user.remove_story_from_favorites(ctx.api.as_ref(), &story)
            .await?
    };

    match (favorite, changed) {
        (true, true) => println!("Added to favorites: {}", story.title),
        (true, false) => println!("Already a favorite: {}", story.title),
        (false, true) => println!("Removed from favorites: {}", story.title),
        (false, false) => println!("Not a favorite: {}", story.title),
    }
    Ok(changed)
}

fn print_session(user: &User) -> Result<()> {
    println!("Logged in as {} ({})", user.username, user.name);
    println!("Add this to the [credentials] section of your config:");
    println!("  username = \"{}\"", user.username);
    println!("  token = \"{}\"", user.token()?);
    Ok(())
}

pub async fn login(ctx: &AppContext, username: Option<&str>, password: &str) -> Result<User> {
    let username =
        username.ok_or_else(|| StorylineError::Auth("login needs --username".into()))?;
    let user = User::login(ctx.api.as_ref(), username, password).await?;
    print_session(&user)?;
    Ok(user)
}

pub async fn signup(
    ctx: &AppContext,
    username: Option<&str>,
    password: &str,
    name: &str,
) -> Result<User> {
    let username =
        username.ok_or_else(|| StorylineError::Auth("signup needs --username".into()))?;
    let user = User::signup(ctx.api.as_ref(), username, password, name).await?;
    print_session(&user)?;
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MemoryApi, StoryApi};
    use crate::app::Credentials;
    use std::sync::Arc;
    use tokio_test::{assert_err, assert_ok};

    fn context(api: &Arc<MemoryApi>, username: Option<&str>) -> AppContext {
        let credentials = username.map(|u| Credentials {
            username: u.to_string(),
            token: format!("token-{}", u),
        });
        AppContext::with_api(api.clone(), credentials)
    }

    #[test]
    fn test_format_story_marks_favorites() {
        let story = Story::new("s1", "Title", "J", "http://x.com/a", "joel");
        assert_eq!(
            format_story(&story, Some(true)),
            "★ Title (x.com)\n  by J, posted by joel [s1]"
        );
        assert!(format_story(&story, None).starts_with("Title"));
    }

    #[tokio::test]
    async fn test_submit_then_delete() {
        let api = Arc::new(MemoryApi::demo());
        let ctx = context(&api, Some("demo"));

        let story = assert_ok!(submit_story(&ctx, "J", "T", "http://x.com").await);
        assert_eq!(api.get_stories().await.unwrap()[0], story);

        assert_ok!(delete_story(&ctx, &story.story_id).await);
        assert!(api
            .get_stories()
            .await
            .unwrap()
            .iter()
            .all(|s| s.story_id != story.story_id));
    }

    #[tokio::test]
    async fn test_submit_without_credentials_is_auth_error() {
        let api = Arc::new(MemoryApi::demo());
        let ctx = context(&api, None);

        let err = assert_err!(submit_story(&ctx, "J", "T", "http://x.com").await);
        assert!(matches!(err, StorylineError::Auth(_)));
        assert_eq!(api.calls(), 0);
    }

    #[tokio::test]
    async fn test_favorite_twice_changes_once() {
        let api = Arc::new(MemoryApi::demo());
        let ctx = context(&api, Some("demo"));

        assert!(assert_ok!(set_favorite(&ctx, "demo-1", true).await));
        assert!(!assert_ok!(set_favorite(&ctx, "demo-1", true).await));
        assert_eq!(api.favorite_ids("demo"), vec!["demo-1"]);

        assert!(assert_ok!(set_favorite(&ctx, "demo-1", false).await));
        assert!(api.favorite_ids("demo").is_empty());
    }

    #[tokio::test]
    async fn test_favorite_unknown_story_is_not_found() {
        let api = Arc::new(MemoryApi::demo());
        let ctx = context(&api, Some("demo"));

        let err = assert_err!(set_favorite(&ctx, "missing", true).await);
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_someone_elses_story_is_rejected() {
        let api = Arc::new(MemoryApi::demo());
        let ctx = context(&api, Some("demo"));

        let err = assert_err!(delete_story(&ctx, "demo-1").await);
        assert!(matches!(err, StorylineError::Auth(_)));
        assert_eq!(api.get_stories().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_login_requires_username() {
        let api = Arc::new(MemoryApi::demo());
        let ctx = context(&api, None);

        assert_err!(login(&ctx, None, "demo").await);
        let user = assert_ok!(login(&ctx, Some("demo"), "demo").await);
        assert_eq!(user.token().unwrap(), "token-demo");
    }

    #[tokio::test]
    async fn test_listing_commands_succeed() {
        let api = Arc::new(MemoryApi::demo());
        let ctx = context(&api, Some("demo"));

        assert_ok!(list_stories(&ctx).await);
        assert_ok!(list_own_stories(&ctx).await);
        assert_ok!(list_favorites(&ctx).await);
        assert_err!(list_favorites(&context(&api, None)).await);
    }
}
