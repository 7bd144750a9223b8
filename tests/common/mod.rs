//! Shared fixtures: an in-memory SQLite database with the schema applied and
//! an in-memory blob store behind the asset store.

#![allow(dead_code)]

use std::sync::Arc;

use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

use portfo_backend::assets::{AssetRef, AssetStore, AssetUpload};
use portfo_backend::db::users::find_or_create_from_auth;
use portfo_backend::models::users::CreateUserFromAuth;
use portfo_backend::storage::memory::MemoryBlobStore;
use portfo_backend::templates::first::{FirstTemplateForm, FirstTemplateProject};
use portfo_backend::templates::second::{SecondTemplateForm, SecondTemplateProject};
use portfo_backend::templates::PhotoInput;

pub const ASSETS_URL: &str = "http://localhost:8080/api/assets";

pub struct TestContext {
    pub db: DatabaseConnection,
    pub assets: AssetStore,
    pub blobs: Arc<MemoryBlobStore>,
}

pub async fn setup() -> TestContext {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    let blobs = Arc::new(MemoryBlobStore::new());
    let assets = AssetStore::new(blobs.clone(), ASSETS_URL);

    TestContext { db, assets, blobs }
}

/// Insert a user row and return its id, for use as an owner id.
pub async fn create_user(db: &DatabaseConnection, email: &str) -> Uuid {
    let id = Uuid::new_v4();
    find_or_create_from_auth(
        db,
        CreateUserFromAuth {
            id,
            email: email.to_string(),
            display_name: None,
            avatar_url: None,
            auth_provider: "google".to_string(),
        },
    )
    .await
    .expect("Failed to create user");
    id
}

pub fn upload(file_name: &str, bytes: &[u8]) -> PhotoInput {
    PhotoInput::Upload(AssetUpload::new(file_name, bytes.to_vec()))
}

pub fn keep(path: &str) -> PhotoInput {
    PhotoInput::Keep(AssetRef::new(path))
}

pub fn first_form(full_name: &str, role: &str) -> FirstTemplateForm {
    FirstTemplateForm {
        photo: upload("me.png", b"first-profile-photo"),
        username: "alice".to_string(),
        full_name: full_name.to_string(),
        location: "Lisbon".to_string(),
        role: role.to_string(),
        bio: "Builds things for the web.".to_string(),
        links: vec!["https://github.com/alice".to_string()],
        projects: vec![FirstTemplateProject {
            photo: upload("shop.jpg", b"project-photo"),
            name: "Shop".to_string(),
            link: "https://shop.example.com".to_string(),
        }],
    }
}

pub fn second_form(full_name: &str, role: &str) -> SecondTemplateForm {
    SecondTemplateForm {
        photo: upload("portrait.png", b"second-profile-photo"),
        phone_number: "+47 555 01 00".to_string(),
        full_name: full_name.to_string(),
        location: "Oslo".to_string(),
        role: role.to_string(),
        bio: "Designs posters.".to_string(),
        links: vec![],
        projects: vec![],
    }
}

pub fn second_project(name: &str, created: chrono::DateTime<chrono::Utc>) -> SecondTemplateProject {
    SecondTemplateProject {
        photo: PhotoInput::Empty,
        name: name.to_string(),
        description: format!("{name} description"),
        link: String::new(),
        creation_date: Some(created),
    }
}
