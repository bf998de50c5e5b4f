//! # Storyline
//!
//! A terminal client for a shared story board: browse submitted stories,
//! post your own, delete them, and keep a list of favorites.
//!
//! ## Architecture
//!
//! ```text
//! StoryApi (HTTP / in-memory) → StoryList + User → ViewSync → TUI / CLI
//! ```
//!
//! - [`api`]: The remote service boundary
//! - [`domain`]: Stories, the story list and the logged-in user
//! - [`view`]: Rendered story lists with delegated click handling
//! - [`tui`]: Terminal user interface built with ratatui
//!
//! ## Quick Start
//!
//! ```bash
//! # Get a token
//! storyline login --username alice --password secret
//!
//! # List stories
//! storyline list
//!
//! # Try everything offline
//! storyline --demo tui
//! ```

/// Application context and error handling.
///
/// [`AppContext`](app::AppContext) holds the API client and credentials;
/// [`AppState`](app::AppState) holds the loaded stories and user.
pub mod app;

/// The story service.
///
/// - [`StoryApi`](api::StoryApi): Async trait over the remote endpoints
/// - [`HttpApi`](api::HttpApi): reqwest-based implementation
/// - [`MemoryApi`](api::MemoryApi): In-process implementation for tests and `--demo`
pub mod api;

/// Configuration management.
///
/// Loads from `~/.config/storyline/config.toml`, supporting:
/// - API base URL, timeout and page size
/// - Saved credentials
/// - Custom keybindings
pub mod config;

/// Command-line interface using clap.
///
/// - `list`, `mine`, `favorites` - Print stories
/// - `submit`, `delete <id>` - Manage your stories
/// - `favorite <id>`, `unfavorite <id>` - Manage favorites
/// - `login`, `signup` - Obtain a session token
/// - `tui` - Launch the TUI
pub mod cli;

/// Core domain models.
///
/// - [`Story`](domain::Story) and [`NewStory`](domain::NewStory)
/// - [`StoryList`](domain::StoryList): All stories, newest first
/// - [`User`](domain::User): Own stories and favorites
pub mod domain;

/// Terminal user interface.
///
/// Tabs for all stories, favorites and your own stories, a detail pane
/// and a submit form. Keybindings: j/k navigate, Tab switches lists,
/// s toggles a favorite, d deletes, n submits, o opens, R refreshes.
pub mod tui;

/// Page model the interfaces render from.
///
/// A [`Document`](view::Document) of story list regions kept in step with
/// application state by [`ViewSync`](view::ViewSync).
pub mod view;
