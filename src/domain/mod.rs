pub mod story;
pub mod story_list;
pub mod user;

pub use story::{NewStory, Story};
pub use story_list::StoryList;
pub use user::User;
