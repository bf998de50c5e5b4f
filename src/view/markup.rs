use crate::domain::Story;
use crate::view::document::Element;
use crate::view::star::{FavoriteState, PENDING};

pub const NO_FAVORITES: &str = "No favorites added!";
pub const NO_OWN_STORIES: &str = "No stories added by user yet!";

/// Markup for one story. The list item's id is the story id.
///
/// `star` is `None` when nobody is logged in; the trash can is only drawn
/// when `show_delete` is set.
pub fn story_markup(story: &Story, star: Option<FavoriteState>, show_delete: bool) -> Element {
    let mut li = Element::new("li").id(&story.story_id);

    if show_delete {
        li = li.child(
            Element::new("span")
                .class("trash-can")
                .child(Element::new("i").class("fas fa-trash-alt")),
        );
    }

    if let Some(state) = star {
        let mut icon = Element::new("i").class(state.glyph().class()).class("fa-star");
        if state.is_pending() {
            icon = icon.class(PENDING);
        }
        li = li.child(Element::new("span").class("star").child(icon));
    }

    li.child(
        Element::new("a")
            .class("story-link")
            .href(&story.url)
            .text(story.title.as_str()),
    )
    .child(
        Element::new("small")
            .class("story-hostname")
            .text(format!("({})", story.host_name())),
    )
    .child(
        Element::new("small")
            .class("story-author")
            .text(format!("by {}", story.author)),
    )
    .child(
        Element::new("small")
            .class("story-user")
            .text(format!("posted by {}", story.username)),
    )
}

pub fn message_markup(text: &str) -> Element {
    Element::new("h5").text(text)
}
