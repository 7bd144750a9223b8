//! First template: username-based profile with simple project cards.
//! All profile fields and the photo are required.

use serde::{Deserialize, Serialize};

use super::validation::{self, ValidationResult, url_is_valid};
use super::{
    Document, DraftDocument, PhotoInput, PortfolioDocument, PreviewMeta, ProfileFields,
    ProjectEntry, ResolvedDocument,
};
use crate::models::portfolio::TemplateKind;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirstTemplateProject {
    pub photo: PhotoInput,
    pub name: String,
    pub link: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirstTemplateForm {
    pub photo: PhotoInput,
    pub username: String,
    pub full_name: String,
    pub location: String,
    pub role: String,
    pub bio: String,
    pub links: Vec<String>,
    pub projects: Vec<FirstTemplateProject>,
}

/// Reject the form on the first missing field or malformed link.
pub fn validate(form: &FirstTemplateForm) -> ValidationResult {
    let missing = validation::require_field(&form.username, "Username")
        .or_else(|| validation::require_field(&form.full_name, "Full name"))
        .or_else(|| {
            (!form.photo.is_present()).then(|| {
                ValidationResult::invalid("Cannot save portfolio data. Photo is required!")
            })
        })
        .or_else(|| validation::require_field(&form.location, "Location"))
        .or_else(|| validation::require_field(&form.role, "Role"))
        .or_else(|| validation::require_field(&form.bio, "Bio"))
        .or_else(|| validation::check_links(&form.links));
    if let Some(rejected) = missing {
        return rejected;
    }

    form.projects
        .iter()
        .map(validate_project)
        .find(|result| !result.is_valid)
        .unwrap_or_else(ValidationResult::valid)
}

pub fn validate_project(project: &FirstTemplateProject) -> ValidationResult {
    if project.name.is_empty() {
        return validation::invalid_project("Project name is required!");
    }
    if project.link.is_empty() {
        return validation::invalid_project("Project link is required!");
    }
    if !url_is_valid(&project.link) {
        return validation::invalid_project("Project link is not a valid URL!");
    }
    ValidationResult::valid()
}

impl FirstTemplateForm {
    pub(super) fn into_draft(self) -> DraftDocument {
        Document {
            template_kind: TemplateKind::First,
            photo: self.photo,
            profile: ProfileFields {
                username: Some(self.username),
                phone_number: None,
                full_name: self.full_name,
                location: self.location,
                role: self.role,
                bio: self.bio,
            },
            links: self.links,
            projects: self
                .projects
                .into_iter()
                .map(|p| ProjectEntry {
                    photo: p.photo,
                    name: p.name,
                    link: p.link,
                    description: None,
                    creation_date: None,
                })
                .collect(),
        }
    }

    pub(super) fn from_document(document: PortfolioDocument) -> Self {
        Self {
            photo: keep(document.photo),
            username: document.profile.username.unwrap_or_default(),
            full_name: document.profile.full_name,
            location: document.profile.location,
            role: document.profile.role,
            bio: document.profile.bio,
            links: document.links,
            projects: document
                .projects
                .into_iter()
                .map(|p| FirstTemplateProject {
                    photo: keep(p.photo),
                    name: p.name,
                    link: p.link,
                })
                .collect(),
        }
    }
}

fn keep(asset_ref: Option<crate::assets::AssetRef>) -> PhotoInput {
    asset_ref.map_or(PhotoInput::Empty, PhotoInput::Keep)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirstProjectPreview {
    pub photo_url: Option<String>,
    pub name: String,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirstTemplatePreview {
    #[serde(flatten)]
    pub meta: PreviewMeta,
    pub photo_url: Option<String>,
    pub username: String,
    pub full_name: String,
    pub location: String,
    pub role: String,
    pub bio: String,
    pub links: Vec<String>,
    pub projects: Vec<FirstProjectPreview>,
}

impl FirstTemplatePreview {
    pub(super) fn new(meta: PreviewMeta, document: ResolvedDocument) -> Self {
        Self {
            meta,
            photo_url: document.photo,
            username: document.profile.username.unwrap_or_default(),
            full_name: document.profile.full_name,
            location: document.profile.location,
            role: document.profile.role,
            bio: document.profile.bio,
            links: document.links,
            projects: document
                .projects
                .into_iter()
                .map(|p| FirstProjectPreview {
                    photo_url: p.photo,
                    name: p.name,
                    link: p.link,
                })
                .collect(),
        }
    }
}
