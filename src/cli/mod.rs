pub mod commands;

use clap::{Parser, Subcommand};

use crate::app::Credentials;
use crate::config::{ApiConfig, CredentialsConfig};

#[derive(Parser)]
#[command(name = "storyline")]
#[command(about = "A terminal client for a shared story board", long_about = None)]
pub struct Cli {
    /// Account to act as (overrides [credentials] in the config file)
    #[arg(long, global = true)]
    pub username: Option<String>,

    /// Session token for --username
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Base URL of the story service
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Use a seeded in-process service, logged in as "demo"
    #[arg(long, global = true)]
    pub demo: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List all stories, newest first
    List,
    /// List stories you submitted
    Mine,
    /// List your favorite stories
    Favorites,
    /// Submit a new story
    Submit {
        #[arg(long)]
        author: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        url: String,
    },
    /// Delete one of your stories
    Delete {
        story_id: String,
    },
    /// Add a story to your favorites
    Favorite {
        story_id: String,
    },
    /// Remove a story from your favorites
    Unfavorite {
        story_id: String,
    },
    /// Log in with --username and print a session token
    Login {
        #[arg(long)]
        password: String,
    },
    /// Create an account with --username and print a session token
    Signup {
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: String,
    },
    /// Launch the TUI
    Tui,
}

impl Cli {
    /// API settings with command-line overrides applied.
    pub fn api_config(&self, config: &ApiConfig) -> ApiConfig {
        let mut api = config.clone();
        if let Some(ref base_url) = self.base_url {
            api.base_url = base_url.clone();
        }
        api
    }

    /// Credentials from flags, falling back to the config file field by
    /// field. `None` unless both a username and a token are known.
    pub fn credentials(&self, config: &CredentialsConfig) -> Option<Credentials> {
        let username = self.username.clone().or_else(|| config.username.clone())?;
        let token = self.token.clone().or_else(|| config.token.clone())?;
        if username.is_empty() || token.is_empty() {
            return None;
        }
        Some(Credentials { username, token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "storyline", "login", "--username", "joel", "--password", "pw",
        ])
        .unwrap();
        assert_eq!(cli.username.as_deref(), Some("joel"));
        assert!(matches!(cli.command, Commands::Login { ref password } if password == "pw"));
    }

    #[test]
    fn test_submit_requires_all_fields() {
        assert!(Cli::try_parse_from(["storyline", "submit", "--title", "T"]).is_err());
        let cli = Cli::try_parse_from([
            "storyline", "submit", "--author", "J", "--title", "T", "--url", "http://x.com",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Submit { .. }));
    }

    #[test]
    fn test_credentials_merge_flags_over_config() {
        let config = CredentialsConfig {
            username: Some("joel".into()),
            token: Some("from-config".into()),
        };

        let cli = Cli::try_parse_from(["storyline", "--token", "from-flag", "list"]).unwrap();
        let credentials = cli.credentials(&config).unwrap();
        assert_eq!(credentials.username, "joel");
        assert_eq!(credentials.token, "from-flag");

        let cli = Cli::try_parse_from(["storyline", "list"]).unwrap();
        assert!(cli.credentials(&CredentialsConfig::default()).is_none());
    }

    #[test]
    fn test_base_url_override() {
        let cli =
            Cli::try_parse_from(["storyline", "--base-url", "http://localhost:5000", "tui"])
                .unwrap();
        let api = cli.api_config(&ApiConfig::default());
        assert_eq!(api.base_url, "http://localhost:5000");
        assert_eq!(api.page_size, ApiConfig::default().page_size);
    }
}
