pub mod context;
pub mod error;
pub mod state;

pub use context::{AppContext, Credentials};
pub use error::{Result, StorylineError};
pub use state::AppState;
