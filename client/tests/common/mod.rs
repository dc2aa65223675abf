#![allow(dead_code)]

use recipehub_client::{AuthTokens, ClientConfig, RecipeHub, SessionStore, User};
use serde_json::{json, Value};

pub fn user_json(username: &str) -> Value {
    json!({
        "id": format!("id-{username}"),
        "email": format!("{username}@example.com"),
        "username": username,
        "createdAt": "2024-05-01T10:00:00Z",
        "updatedAt": "2024-05-01T10:00:00Z"
    })
}

pub fn user(username: &str) -> User {
    serde_json::from_value(user_json(username)).unwrap()
}

pub fn auth_json(username: &str, access: &str, refresh: &str) -> Value {
    json!({
        "user": user_json(username),
        "tokens": { "accessToken": access, "refreshToken": refresh }
    })
}

pub fn recipe_json(slug: &str, name: &str) -> Value {
    json!({
        "id": format!("id-{slug}"),
        "slug": slug,
        "name": name,
        "ingredients": ["Salt"],
        "instructions": ["Cook"],
        "cookingTime": "20 minutes",
        "servings": 2
    })
}

pub fn logged_in(access: &str, refresh: &str) -> SessionStore {
    let session = SessionStore::in_memory();
    session.login(user("ada"), AuthTokens::new(access, refresh));
    session
}

pub fn hub(server_url: &str, session: SessionStore) -> RecipeHub {
    let config = ClientConfig {
        api_url: format!("{server_url}/api/v1"),
        catalog_url: server_url.to_string(),
        storage_path: None,
        timeout_secs: 5,
    };
    RecipeHub::new(&config, session).unwrap()
}
