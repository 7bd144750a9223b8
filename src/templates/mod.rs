//! The two portfolio templates and the mapping between editable form state,
//! the persisted document, and the read-only preview.
//!
//! Every stage shares one shape, [`Document`], parameterised by how photos
//! are held:
//!
//! - [`DraftDocument`]: photos as form attachments ([`PhotoInput`]),
//! - [`PortfolioDocument`]: photos as stored [`AssetRef`]s,
//! - [`ResolvedDocument`]: photos as fetchable URLs.
//!
//! Template-specific code only maps fields in and out of that shape.

pub mod first;
pub mod second;
pub mod validation;

use chrono::{DateTime, Utc};
use futures_util::future::try_join_all;
use serde::{Deserialize, Serialize};

use crate::assets::{AssetRef, AssetStore, AssetUpload};
use crate::error::{AssetResolutionError, PortfolioError};
use crate::models::portfolio::{self, TemplateKind};

pub use first::{FirstTemplateForm, FirstTemplatePreview};
pub use second::{SecondTemplateForm, SecondTemplatePreview};
pub use validation::ValidationResult;

/// A photo slot in an edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PhotoInput {
    /// A newly attached file, stored on save.
    Upload(AssetUpload),
    /// A photo loaded from the existing record, kept as-is.
    Keep(AssetRef),
    #[default]
    Empty,
}

impl PhotoInput {
    pub fn is_present(&self) -> bool {
        !matches!(self, PhotoInput::Empty)
    }
}

/// Flat profile fields shared by both templates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileFields {
    pub username: Option<String>,
    pub phone_number: Option<String>,
    pub full_name: String,
    pub location: String,
    pub role: String,
    pub bio: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectEntry<P> {
    pub photo: P,
    pub name: String,
    pub link: String,
    pub description: Option<String>,
    pub creation_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document<P> {
    pub template_kind: TemplateKind,
    pub photo: P,
    pub profile: ProfileFields,
    pub links: Vec<String>,
    pub projects: Vec<ProjectEntry<P>>,
}

pub type DraftDocument = Document<PhotoInput>;
pub type PortfolioDocument = Document<Option<AssetRef>>;
pub type ResolvedDocument = Document<Option<String>>;

impl PortfolioDocument {
    /// Every asset the document references, profile photo first.
    pub fn asset_refs(&self) -> impl Iterator<Item = &AssetRef> {
        self.photo
            .iter()
            .chain(self.projects.iter().filter_map(|p| p.photo.as_ref()))
    }
}

/// Editable form state for either template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "template", rename_all = "lowercase")]
pub enum TemplateForm {
    First(FirstTemplateForm),
    Second(SecondTemplateForm),
}

impl TemplateForm {
    pub fn kind(&self) -> TemplateKind {
        match self {
            TemplateForm::First(_) => TemplateKind::First,
            TemplateForm::Second(_) => TemplateKind::Second,
        }
    }

    pub fn validate(&self) -> ValidationResult {
        match self {
            TemplateForm::First(form) => first::validate(form),
            TemplateForm::Second(form) => second::validate(form),
        }
    }

    fn into_draft(self) -> DraftDocument {
        match self {
            TemplateForm::First(form) => form.into_draft(),
            TemplateForm::Second(form) => form.into_draft(),
        }
    }

    /// Rebuild form state from a stored document, keeping every stored photo.
    pub fn from_document(document: PortfolioDocument) -> Self {
        match document.template_kind {
            TemplateKind::First => TemplateForm::First(FirstTemplateForm::from_document(document)),
            TemplateKind::Second => {
                TemplateForm::Second(SecondTemplateForm::from_document(document))
            }
        }
    }
}

/// Store every attached photo and produce the persistable document.
///
/// Photos are uploaded one at a time. Blobs this call actually wrote are
/// pushed onto `created`, including when a later step fails, so the caller
/// can clean them up.
pub async fn to_persisted(
    form: TemplateForm,
    assets: &AssetStore,
    created: &mut Vec<AssetRef>,
) -> Result<PortfolioDocument, PortfolioError> {
    stage_document(form.into_draft(), assets, created).await
}

async fn stage_document(
    draft: DraftDocument,
    assets: &AssetStore,
    created: &mut Vec<AssetRef>,
) -> Result<PortfolioDocument, PortfolioError> {
    let photo = stage_photo(draft.photo, assets, created).await?;

    let mut projects = Vec::with_capacity(draft.projects.len());
    for project in draft.projects {
        projects.push(ProjectEntry {
            photo: stage_photo(project.photo, assets, created).await?,
            name: project.name,
            link: project.link,
            description: project.description,
            creation_date: project.creation_date,
        });
    }

    Ok(Document {
        template_kind: draft.template_kind,
        photo,
        profile: draft.profile,
        links: draft.links,
        projects,
    })
}

async fn stage_photo(
    photo: PhotoInput,
    assets: &AssetStore,
    created: &mut Vec<AssetRef>,
) -> Result<Option<AssetRef>, PortfolioError> {
    match photo {
        PhotoInput::Upload(upload) => {
            let stored = assets.store(&upload).await?;
            if stored.created {
                created.push(stored.asset_ref.clone());
            }
            Ok(Some(stored.asset_ref))
        }
        PhotoInput::Keep(asset_ref) => {
            if !assets.contains(&asset_ref).await? {
                return Err(AssetResolutionError::Missing(asset_ref.into_inner()).into());
            }
            Ok(Some(asset_ref))
        }
        PhotoInput::Empty => Ok(None),
    }
}

/// Record metadata carried into every preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewMeta {
    pub id: uuid::Uuid,
    pub name: String,
    pub status: portfolio::PortfolioStatus,
    pub link: String,
}

impl From<&portfolio::Model> for PreviewMeta {
    fn from(record: &portfolio::Model) -> Self {
        Self {
            id: record.id,
            name: record.display_name.clone(),
            status: record.status,
            link: record.public_link.clone(),
        }
    }
}

/// Read-only rendering data for either template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "template", rename_all = "lowercase")]
pub enum TemplatePreview {
    First(FirstTemplatePreview),
    Second(SecondTemplatePreview),
}

/// Resolve every stored asset to a URL and build the preview.
///
/// Any unresolvable asset fails the whole preview.
pub async fn from_persisted(
    record: &portfolio::Model,
    document: PortfolioDocument,
    assets: &AssetStore,
) -> Result<TemplatePreview, AssetResolutionError> {
    let resolved = resolve_document(document, assets).await?;
    let meta = PreviewMeta::from(record);

    Ok(match resolved.template_kind {
        TemplateKind::First => TemplatePreview::First(FirstTemplatePreview::new(meta, resolved)),
        TemplateKind::Second => {
            TemplatePreview::Second(SecondTemplatePreview::new(meta, resolved))
        }
    })
}

async fn resolve_document(
    document: PortfolioDocument,
    assets: &AssetStore,
) -> Result<ResolvedDocument, AssetResolutionError> {
    let photo = resolve_optional(document.photo.as_ref(), assets).await?;

    let project_urls = try_join_all(
        document
            .projects
            .iter()
            .map(|project| resolve_optional(project.photo.as_ref(), assets)),
    )
    .await?;

    let projects = document
        .projects
        .into_iter()
        .zip(project_urls)
        .map(|(project, photo)| ProjectEntry {
            photo,
            name: project.name,
            link: project.link,
            description: project.description,
            creation_date: project.creation_date,
        })
        .collect();

    Ok(Document {
        template_kind: document.template_kind,
        photo,
        profile: document.profile,
        links: document.links,
        projects,
    })
}

async fn resolve_optional(
    asset_ref: Option<&AssetRef>,
    assets: &AssetStore,
) -> Result<Option<String>, AssetResolutionError> {
    match asset_ref {
        Some(asset_ref) => assets.resolve(asset_ref).await.map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::storage::memory::MemoryBlobStore;

    fn assets() -> (AssetStore, Arc<MemoryBlobStore>) {
        let blobs = Arc::new(MemoryBlobStore::new());
        (AssetStore::new(blobs.clone(), "http://assets.test"), blobs)
    }

    fn second_form() -> SecondTemplateForm {
        SecondTemplateForm {
            photo: PhotoInput::Upload(AssetUpload::new("me.png", b"me".to_vec())),
            phone_number: "+1 555 0100".into(),
            full_name: "Bob Jones".into(),
            location: "Oslo".into(),
            role: "Designer".into(),
            bio: "Designs things".into(),
            links: vec![],
            projects: vec![second::SecondTemplateProject {
                photo: PhotoInput::Upload(AssetUpload::new("p.png", b"project".to_vec())),
                name: "Poster".into(),
                description: "A poster".into(),
                link: "https://example.com/poster".into(),
                creation_date: None,
            }],
        }
    }

    #[tokio::test]
    async fn staging_reports_only_new_blobs() {
        let (assets, _) = assets();
        assets
            .store(&AssetUpload::new("me.png", b"me".to_vec()))
            .await
            .unwrap();

        let mut created = Vec::new();
        let document = to_persisted(TemplateForm::Second(second_form()), &assets, &mut created)
            .await
            .unwrap();

        assert_eq!(created.len(), 1);
        assert_eq!(document.projects[0].photo.as_ref(), Some(&created[0]));
        assert_eq!(document.asset_refs().count(), 2);
    }

    #[tokio::test]
    async fn keeping_a_missing_asset_fails_and_reports_new_blobs() {
        let (assets, _) = assets();
        let mut form = second_form();
        form.projects[0].photo = PhotoInput::Keep(AssetRef::new("images/gone.png"));

        let mut created = Vec::new();
        let err = to_persisted(TemplateForm::Second(form), &assets, &mut created)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PortfolioError::AssetResolution(AssetResolutionError::Missing(_))
        ));
        let profile = AssetStore::path_for(&AssetUpload::new("me.png", b"me".to_vec()));
        assert_eq!(created, vec![profile]);
    }

    #[test]
    fn form_json_is_tagged_by_template() {
        let json = serde_json::json!({
            "template": "second",
            "full_name": "Bob Jones",
            "photo": { "kind": "keep", "value": "images/abc.png" }
        });
        let form: TemplateForm = serde_json::from_value(json).unwrap();
        assert_eq!(form.kind(), TemplateKind::Second);
        let TemplateForm::Second(form) = form else {
            panic!("expected second template");
        };
        assert_eq!(form.photo, PhotoInput::Keep(AssetRef::new("images/abc.png")));
        assert!(form.projects.is_empty());
    }
}
