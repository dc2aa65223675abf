//! Dispatch of parsed commands onto the client services.

use anyhow::{bail, Context};
use recipehub_client::{
    ClientConfig, CreateRecipe, LoginRequest, RecipeHub, RecipeQuery, RegisterRequest,
    UpdateRecipe, UserUpdate,
};
use serde_json::json;
use tracing::debug;

use crate::{
    output::{print_json, read_json},
    Cli, Commands, ProfileCommands, RecipeCommands,
};

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = ClientConfig::load().context("failed to load configuration")?;
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }
    debug!(api_url = %config.api_url, "using API");

    let hub = RecipeHub::from_config(&config).context("failed to set up the client")?;

    match cli.command {
        Commands::Login { email, password } => {
            let user = hub.auth().login(&LoginRequest { email, password }).await?;
            print_json(&user)
        }
        Commands::Register {
            email,
            username,
            password,
            first_name,
            last_name,
        } => {
            let details = RegisterRequest {
                email,
                username,
                password,
                first_name,
                last_name,
                ..Default::default()
            };
            let user = hub.auth().register(&details).await?;
            print_json(&user)
        }
        Commands::Logout => {
            hub.auth().logout().await;
            Ok(())
        }
        Commands::Whoami => match hub.session().user() {
            Some(user) => print_json(&user),
            None => bail!("not logged in"),
        },
        Commands::Validate { token: Some(token) } => {
            hub.auth().validate_token(&token).await?;
            print_json(&json!({ "valid": true }))
        }
        Commands::Validate { token: None } => {
            let valid = hub.auth().check_session().await;
            print_json(&json!({ "valid": valid }))
        }
        Commands::Recipes(command) => recipes(&hub, command).await,
        Commands::Profile(command) => profile(&hub, command).await,
    }
}

async fn recipes(hub: &RecipeHub, command: RecipeCommands) -> anyhow::Result<()> {
    let recipes = hub.recipes();
    match command {
        RecipeCommands::Search { term, time, id } => {
            let query = RecipeQuery {
                search: term,
                time,
                id,
            };
            print_json(&recipes.search(&query).await?)
        }
        RecipeCommands::Show { slug } => print_json(&recipes.get(&slug).await?),
        RecipeCommands::Author { email, page, limit } => {
            print_json(&recipes.by_author(&email, page, limit).await?)
        }
        RecipeCommands::Mine => print_json(&recipes.mine().await?),
        RecipeCommands::Create { file } => {
            let recipe: CreateRecipe = read_json(&file)?;
            print_json(&recipes.create(&recipe).await?)
        }
        RecipeCommands::Update { slug, file } => {
            let changes: UpdateRecipe = read_json(&file)?;
            print_json(&recipes.update(&slug, &changes).await?)
        }
        RecipeCommands::Delete { slug } => {
            recipes.delete(&slug).await?;
            Ok(())
        }
    }
}

async fn profile(hub: &RecipeHub, command: ProfileCommands) -> anyhow::Result<()> {
    let users = hub.users();
    match command {
        ProfileCommands::Show { username } => print_json(&users.profile(&username).await?),
        ProfileCommands::Update { file } => {
            let changes: UserUpdate = read_json(&file)?;
            print_json(&users.update_me(&changes).await?)
        }
        ProfileCommands::Delete => {
            users.delete_me().await?;
            Ok(())
        }
    }
}
