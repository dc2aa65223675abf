//! `recipehub`: command-line frontend for the RecipeHub API.

mod commands;
mod logging;
mod output;

use std::path::PathBuf;

use clap::Parser as _;
use recipehub_client::TimeFilter;

#[tokio::main]
async fn main() {
    logging::init();

    if let Err(err) = commands::run(Cli::parse()).await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

/// Search, share and manage recipes on RecipeHub
#[derive(Debug, clap::Parser)]
#[command(name = "recipehub", version)]
pub struct Cli {
    /// Base URL of the RecipeHub API (overrides RECIPEHUB_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Log in and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "RECIPEHUB_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account and log in
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        #[arg(long, env = "RECIPEHUB_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
    },

    /// Revoke the refresh token and forget the session
    Logout,

    /// Print the logged in user
    Whoami,

    /// Check a token, or the stored session when no token is given
    Validate { token: Option<String> },

    /// Search and manage recipes
    #[command(subcommand)]
    #[command(alias = "recipe")]
    Recipes(RecipeCommands),

    /// View profiles and manage your account
    #[command(subcommand)]
    Profile(ProfileCommands),
}

#[derive(Debug, clap::Subcommand)]
pub enum RecipeCommands {
    /// Search the catalog
    Search {
        /// Matches recipe ids, names and ingredients
        term: Option<String>,
        /// quick, medium, long or all
        #[arg(long)]
        time: Option<TimeFilter>,
        /// Exact recipe id; other filters are ignored
        #[arg(long)]
        id: Option<String>,
    },

    /// Show a recipe
    Show { slug: String },

    /// List recipes by an author
    Author {
        email: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 12)]
        limit: u32,
    },

    /// List your own recipes
    Mine,

    /// Create a recipe from a JSON file
    Create { file: PathBuf },

    /// Apply the changes in a JSON file to a recipe
    Update { slug: String, file: PathBuf },

    /// Delete a recipe
    Delete { slug: String },
}

#[derive(Debug, clap::Subcommand)]
pub enum ProfileCommands {
    /// Show a user and their latest recipes
    Show { username: String },

    /// Update your profile from a JSON file
    Update { file: PathBuf },

    /// Delete your account
    Delete,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parses_nested_recipe_commands() {
        let cli = Cli::try_parse_from([
            "recipehub", "recipes", "search", "curry", "--time", "quick",
        ])
        .unwrap();

        match cli.command {
            Commands::Recipes(RecipeCommands::Search { term, time, id }) => {
                assert_eq!(term.as_deref(), Some("curry"));
                assert_eq!(time, Some(TimeFilter::Quick));
                assert_eq!(id, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn api_url_is_accepted_after_the_subcommand() {
        let cli = Cli::try_parse_from([
            "recipehub", "whoami", "--api-url", "http://localhost:9000/api/v1",
        ])
        .unwrap();

        assert_eq!(cli.api_url.as_deref(), Some("http://localhost:9000/api/v1"));
        assert!(matches!(cli.command, Commands::Whoami));
    }

    #[test]
    fn author_listing_defaults_to_first_page() {
        let cli =
            Cli::try_parse_from(["recipehub", "recipes", "author", "ada@example.com"]).unwrap();

        match cli.command {
            Commands::Recipes(RecipeCommands::Author { page, limit, .. }) => {
                assert_eq!((page, limit), (1, 12));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
