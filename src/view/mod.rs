pub mod document;
pub mod markup;
pub mod star;
pub mod sync;

pub use document::{Document, Element, NodeId};
pub use star::{FavoriteState, Glyph};
pub use sync::{Dispatch, FavoriteOutcome, FavoriteRequest, ViewSync};

/// Named containers on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    AllStories,
    OwnStories,
    Favorites,
    SubmitForm,
}

impl Region {
    pub const ALL: [Region; 4] = [
        Region::AllStories,
        Region::OwnStories,
        Region::Favorites,
        Region::SubmitForm,
    ];

    /// Regions that hold story lists.
    pub const LISTS: [Region; 3] = [Region::AllStories, Region::OwnStories, Region::Favorites];

    pub fn dom_id(self) -> &'static str {
        match self {
            Region::AllStories => "all-stories-list",
            Region::OwnStories => "my-stories",
            Region::Favorites => "favorited-stories",
            Region::SubmitForm => "submit-form",
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Region::SubmitForm => "form",
            _ => "ol",
        }
    }
}

/// Inputs of the submission form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Author,
    Title,
    Url,
}

impl FormField {
    pub const ALL: [FormField; 3] = [FormField::Author, FormField::Title, FormField::Url];

    pub fn dom_id(self) -> &'static str {
        match self {
            FormField::Author => "author-input",
            FormField::Title => "title-input",
            FormField::Url => "url-input",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FormField::Author => "Author",
            FormField::Title => "Title",
            FormField::Url => "URL",
        }
    }

    pub fn next(self) -> Self {
        match self {
            FormField::Author => FormField::Title,
            FormField::Title => FormField::Url,
            FormField::Url => FormField::Author,
        }
    }
}
