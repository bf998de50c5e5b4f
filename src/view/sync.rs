//! Keeps the rendered story lists in step with [`AppState`] and routes
//! clicks back into story and favorite operations.
//!
//! Handlers are bound once per region container. A click is resolved from
//! the target's ancestry at dispatch time: the nearest delegated control,
//! then the nearest list item, whose id is the story id.

use std::collections::HashMap;
use std::sync::Arc;

use crate::api::StoryApi;
use crate::app::{AppState, Result, StorylineError};
use crate::domain::{NewStory, Story, StoryList, User};
use crate::view::document::{Document, NodeId};
use crate::view::markup::{self, NO_FAVORITES, NO_OWN_STORIES};
use crate::view::star::{FavoriteState, Glyph, OUTLINE, PENDING, SOLID};
use crate::view::{FormField, Region};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Handler {
    ToggleFavorite,
    DeleteStory,
}

#[derive(Debug, Clone, Copy)]
struct Delegate {
    region: Region,
    selector: &'static str,
    handler: Handler,
}

/// What a click resolved to.
#[derive(Debug)]
pub enum Dispatch {
    /// No handler is bound for the target.
    Unhandled,
    /// A favorite toggle for this story is already in flight.
    Ignored,
    /// The star has been flipped; send the request and hand the outcome to
    /// [`ViewSync::finish_favorite`].
    Favorite(FavoriteRequest),
    Delete { story_id: String },
}

/// A favorite toggle waiting to be sent.
#[derive(Debug, Clone)]
pub struct FavoriteRequest {
    pub story: Story,
    pub favorite: bool,
    username: String,
    token: String,
}

impl FavoriteRequest {
    pub async fn send(self, api: Arc<dyn StoryApi>) -> FavoriteOutcome {
        let result = if self.favorite {
            api.add_favorite(&self.token, &self.username, &self.story.story_id)
                .await
        } else {
            api.remove_favorite(&self.token, &self.username, &self.story.story_id)
                .await
        };

        FavoriteOutcome {
            story: self.story,
            favorite: self.favorite,
            username: self.username,
            result,
        }
    }
}

#[derive(Debug)]
pub struct FavoriteOutcome {
    pub story: Story,
    pub favorite: bool,
    /// Who the request was sent for.
    pub username: String,
    pub result: Result<()>,
}

pub struct ViewSync {
    api: Arc<dyn StoryApi>,
    state: AppState,
    document: Document,
    delegates: Vec<Delegate>,
    toggles: HashMap<String, FavoriteState>,
}

impl ViewSync {
    pub fn new(api: Arc<dyn StoryApi>, state: AppState) -> Self {
        let mut sync = Self {
            api,
            state,
            document: Document::new(),
            delegates: Vec::new(),
            toggles: HashMap::new(),
        };

        for region in Region::LISTS {
            sync.on(region, "star", Handler::ToggleFavorite);
        }
        sync.on(Region::OwnStories, "trash-can", Handler::DeleteStory);

        sync
    }

    fn on(&mut self, region: Region, selector: &'static str, handler: Handler) {
        self.delegates.push(Delegate {
            region,
            selector,
            handler,
        });
    }

    pub fn api(&self) -> Arc<dyn StoryApi> {
        self.api.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn user(&self) -> Option<&User> {
        self.state.user.as_ref()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// The story rendered around `node`, if any.
    pub fn story_for(&self, node: NodeId) -> Option<&Story> {
        let li = self.document.closest(node, |n| n.tag == "li")?;
        let story_id = self.document.get(li)?.id.as_deref()?;
        self.state.find_story(story_id)
    }

    pub fn is_toggle_pending(&self, story_id: &str) -> bool {
        self.toggles.get(story_id).is_some_and(|s| s.is_pending())
    }

    // Rendering

    pub fn put_stories_on_page(&mut self) {
        tracing::debug!("put_stories_on_page");
        self.render(Region::AllStories);
        self.document.show(Region::AllStories);
    }

    pub fn put_favorites_on_page(&mut self) {
        tracing::debug!("put_favorites_on_page");
        self.render(Region::Favorites);
        if self.state.is_logged_in() {
            self.document.show(Region::Favorites);
        }
    }

    pub fn put_own_stories_on_page(&mut self) {
        tracing::debug!("put_own_stories_on_page");
        self.render(Region::OwnStories);
        if self.state.is_logged_in() {
            self.document.show(Region::OwnStories);
        }
    }

    /// Show one list, hiding the others and the submit form.
    pub fn navigate(&mut self, region: Region) -> Result<()> {
        if region != Region::AllStories && !self.state.is_logged_in() {
            return Err(StorylineError::Auth("Log in to see your stories".into()));
        }

        for r in Region::ALL {
            self.document.hide(r);
        }
        match region {
            Region::AllStories => self.put_stories_on_page(),
            Region::Favorites => self.put_favorites_on_page(),
            Region::OwnStories => self.put_own_stories_on_page(),
            Region::SubmitForm => self.open_submit_form()?,
        }
        Ok(())
    }

    pub fn open_submit_form(&mut self) -> Result<()> {
        if !self.state.is_logged_in() {
            return Err(StorylineError::Auth("Log in to submit stories".into()));
        }
        self.document.show(Region::SubmitForm);
        Ok(())
    }

    pub fn close_submit_form(&mut self) {
        self.document.hide(Region::SubmitForm);
        self.document.reset_form();
    }

    /// Clear a list region and rebuild it from state. Visibility is left
    /// alone.
    fn render(&mut self, region: Region) {
        self.document.empty(region);
        let user = self.state.user.as_ref();

        match region {
            Region::AllStories => {
                for story in self.state.stories.iter() {
                    let star = star_state(&self.toggles, user, &story.story_id);
                    self.document
                        .append(region, markup::story_markup(story, star, false));
                }
            }
            Region::Favorites => {
                let Some(user) = user else { return };
                if user.favorite_count() == 0 {
                    self.document
                        .append(region, markup::message_markup(NO_FAVORITES));
                }
                for story in user.favorites() {
                    let star = star_state(&self.toggles, Some(user), &story.story_id);
                    self.document
                        .append(region, markup::story_markup(story, star, false));
                }
            }
            Region::OwnStories => {
                let Some(user) = user else { return };
                if user.own_story_count() == 0 {
                    self.document
                        .append(region, markup::message_markup(NO_OWN_STORIES));
                }
                for story in user.own_stories() {
                    let star = star_state(&self.toggles, Some(user), &story.story_id);
                    self.document
                        .append(region, markup::story_markup(story, star, true));
                }
            }
            Region::SubmitForm => {}
        }
    }

    fn render_lists(&mut self) {
        for region in Region::LISTS {
            self.render(region);
        }
    }

    /// Set the star on every rendered copy of a story.
    fn paint_star(&mut self, story_id: &str, state: FavoriteState) {
        for li in self.document.items_for(story_id) {
            let Some(icon) = self.document.find_class(li, "fa-star") else {
                continue;
            };
            self.document.remove_class(icon, SOLID);
            self.document.remove_class(icon, OUTLINE);
            self.document.add_class(icon, state.glyph().class());
            if state.is_pending() {
                self.document.add_class(icon, PENDING);
            } else {
                self.document.remove_class(icon, PENDING);
            }
        }
    }

    // Session

    pub fn login(&mut self, user: User) {
        tracing::info!("Showing stories for {}", user.username);
        self.state.user = Some(user);
        self.toggles.clear();
        self.render_lists();
    }

    pub fn logout(&mut self) -> Option<User> {
        let user = self.state.user.take();
        if let Some(ref user) = user {
            tracing::info!("Logged out {}", user.username);
        }
        self.toggles.clear();
        self.document.hide(Region::Favorites);
        self.document.hide(Region::OwnStories);
        self.close_submit_form();
        self.render_lists();
        user
    }

    /// Refetch stories (and the user, when logged in) and re-render.
    pub async fn refresh(&mut self) -> Result<()> {
        let stories = StoryList::fetch_all(self.api.as_ref()).await?;
        let user = match self.state.user.as_ref() {
            Some(user) => {
                Some(User::fetch(self.api.as_ref(), &user.username, user.token()?).await?)
            }
            None => None,
        };

        self.state.stories = stories;
        if user.is_some() {
            self.state.user = user;
        }
        self.render_lists();
        Ok(())
    }

    // Events

    /// Resolve a click on `target` through the delegated handlers.
    ///
    /// Favorite toggles flip the star before returning; deletes are only
    /// resolved to a story id.
    pub fn dispatch_click(&mut self, target: NodeId) -> Result<Dispatch> {
        let Some(region) = self.document.region_of(target) else {
            return Ok(Dispatch::Unhandled);
        };

        let matched = self
            .delegates
            .iter()
            .filter(|d| d.region == region)
            .find_map(|d| {
                self.document
                    .closest(target, |n| n.has_class(d.selector))
                    .map(|control| (d.handler, control))
            });
        let Some((handler, control)) = matched else {
            return Ok(Dispatch::Unhandled);
        };

        let story_id = self
            .document
            .closest(control, |n| n.tag == "li")
            .and_then(|li| self.document.get(li))
            .and_then(|n| n.id.clone())
            .ok_or_else(|| StorylineError::Other("Control outside of a story item".into()))?;

        match handler {
            Handler::ToggleFavorite => self.begin_favorite(control, &story_id),
            Handler::DeleteStory => Ok(Dispatch::Delete { story_id }),
        }
    }

    fn begin_favorite(&mut self, control: NodeId, story_id: &str) -> Result<Dispatch> {
        tracing::debug!("toggle_story_favorite {}", story_id);

        let user = self
            .state
            .user
            .as_ref()
            .ok_or_else(|| StorylineError::Auth("Log in to favorite stories".into()))?;

        if self.is_toggle_pending(story_id) {
            tracing::debug!("Favorite toggle for {} already in flight", story_id);
            return Ok(Dispatch::Ignored);
        }

        let story = self
            .state
            .find_story(story_id)
            .cloned()
            .ok_or_else(|| StorylineError::NotFound(story_id.to_string()))?;

        let icon = self
            .document
            .find_class(control, "fa-star")
            .unwrap_or(control);
        let shown = if self.document.has_class(icon, SOLID) {
            Glyph::Solid
        } else {
            Glyph::Outline
        };
        let Some(pending) = FavoriteState::from_glyph(shown).begin() else {
            return Ok(Dispatch::Ignored);
        };

        let request = FavoriteRequest {
            story,
            favorite: pending.wants_favorite(),
            username: user.username.clone(),
            token: user.token()?.to_string(),
        };

        self.toggles.insert(story_id.to_string(), pending);
        self.paint_star(story_id, pending);
        Ok(Dispatch::Favorite(request))
    }

    /// Apply a server answer to a toggle started by [`dispatch_click`].
    ///
    /// On success the favorites set is updated; on failure the star goes
    /// back to what it showed before the click and the error is returned.
    /// A confirmed change nobody is waiting for (the toggle was cleared by a
    /// login) still updates the favorites of the same user.
    ///
    /// [`dispatch_click`]: Self::dispatch_click
    pub fn finish_favorite(&mut self, outcome: FavoriteOutcome) -> Result<()> {
        let story_id = outcome.story.story_id.clone();
        let Some(pending) = self.toggles.remove(&story_id) else {
            self.apply_untracked(outcome);
            return Ok(());
        };

        match outcome.result {
            Ok(()) => {
                if let Some(user) = self.state.user.as_mut() {
                    if outcome.favorite {
                        user.apply_favorite(&outcome.story);
                    } else {
                        user.apply_unfavorite(&story_id);
                    }
                }
                self.paint_star(&story_id, pending.settle(true));
                Ok(())
            }
            Err(err) => {
                tracing::warn!("Favorite toggle for {} failed: {}", story_id, err);
                self.paint_star(&story_id, pending.settle(false));
                Err(err)
            }
        }
    }

    fn apply_untracked(&mut self, outcome: FavoriteOutcome) {
        let story_id = outcome.story.story_id.as_str();
        let Some(user) = self
            .state
            .user
            .as_mut()
            .filter(|u| u.username == outcome.username)
        else {
            tracing::debug!("No toggle in flight for {}, dropping outcome", story_id);
            return;
        };
        if outcome.result.is_err() {
            return;
        }

        if !outcome.favorite {
            user.apply_unfavorite(story_id);
        } else if self.state.stories.contains(story_id) {
            user.apply_favorite(&outcome.story);
        } else {
            return;
        }
        tracing::debug!("Applied late favorite outcome for {}", story_id);

        let settled = star_state(&self.toggles, self.state.user.as_ref(), story_id);
        if let Some(settled) = settled {
            self.paint_star(story_id, settled);
        }
    }

    /// Dispatch a click and run its handler to completion.
    pub async fn click(&mut self, target: NodeId) -> Result<()> {
        match self.dispatch_click(target)? {
            Dispatch::Unhandled | Dispatch::Ignored => Ok(()),
            Dispatch::Favorite(request) => {
                let outcome = request.send(self.api.clone()).await;
                self.finish_favorite(outcome)
            }
            Dispatch::Delete { story_id } => self.delete_story(&story_id).await,
        }
    }

    /// Delete a story and rebuild every list. Deleting a story that is
    /// already gone is not an error.
    pub async fn delete_story(&mut self, story_id: &str) -> Result<()> {
        tracing::debug!("delete_story {}", story_id);

        let AppState { stories, user } = &mut self.state;
        let user = user
            .as_mut()
            .ok_or_else(|| StorylineError::Auth("Log in to delete stories".into()))?;

        match stories.remove_story(self.api.as_ref(), user, story_id).await {
            Ok(_) => {}
            Err(err) if err.is_not_found() => {
                tracing::debug!("Story {} already gone", story_id);
            }
            Err(err) => {
                tracing::warn!("Deleting {} failed: {}", story_id, err);
                return Err(err);
            }
        }

        self.toggles.remove(story_id);
        self.render_lists();
        Ok(())
    }

    /// Submit the story in the form. On success the lists are rebuilt and
    /// the form is reset and hidden.
    pub async fn submit_story(&mut self) -> Result<Story> {
        tracing::debug!("submit_new_story");

        let AppState { stories, user } = &mut self.state;
        let user = user
            .as_mut()
            .ok_or_else(|| StorylineError::Auth("Log in to submit stories".into()))?;

        let new_story = NewStory::new(
            self.document.value(FormField::Author),
            self.document.value(FormField::Title),
            self.document.value(FormField::Url),
        );
        new_story.validate()?;

        let story = match stories.add_story(self.api.as_ref(), user, &new_story).await {
            Ok(story) => story,
            Err(err) => {
                tracing::warn!("Submitting story failed: {}", err);
                return Err(err);
            }
        };

        self.render(Region::AllStories);
        self.render(Region::OwnStories);
        self.close_submit_form();
        Ok(story)
    }
}

/// Star to draw for a story, or `None` when nobody is logged in. An
/// in-flight toggle wins over the favorites set.
fn star_state(
    toggles: &HashMap<String, FavoriteState>,
    user: Option<&User>,
    story_id: &str,
) -> Option<FavoriteState> {
    let user = user?;
    let state = toggles.get(story_id).copied().unwrap_or_else(|| {
        if user.is_favorite(story_id) {
            FavoriteState::Favorited
        } else {
            FavoriteState::Unfavorited
        }
    });
    Some(state)
}
