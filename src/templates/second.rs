//! Second template: contact-oriented profile with dated, described projects.
//!
//! Only well-formedness is checked on save: every link and every non-empty
//! project link must be an absolute URL. Profile fields and photos may be
//! left empty.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{self, ValidationResult, url_is_valid};
use super::{
    Document, DraftDocument, PhotoInput, PortfolioDocument, PreviewMeta, ProfileFields,
    ProjectEntry, ResolvedDocument,
};
use crate::models::portfolio::TemplateKind;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecondTemplateProject {
    pub photo: PhotoInput,
    pub name: String,
    pub description: String,
    pub link: String,
    pub creation_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecondTemplateForm {
    pub photo: PhotoInput,
    pub phone_number: String,
    pub full_name: String,
    pub location: String,
    pub role: String,
    pub bio: String,
    pub links: Vec<String>,
    pub projects: Vec<SecondTemplateProject>,
}

pub fn validate(form: &SecondTemplateForm) -> ValidationResult {
    if let Some(rejected) = validation::check_links(&form.links) {
        return rejected;
    }

    let bad_project = form
        .projects
        .iter()
        .any(|p| !p.link.is_empty() && !url_is_valid(&p.link));
    if bad_project {
        return validation::invalid_project("Project link is not a valid URL!");
    }

    ValidationResult::valid()
}

impl SecondTemplateForm {
    pub(super) fn into_draft(self) -> DraftDocument {
        Document {
            template_kind: TemplateKind::Second,
            photo: self.photo,
            profile: ProfileFields {
                username: None,
                phone_number: Some(self.phone_number),
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
                    description: Some(p.description),
                    creation_date: p.creation_date,
                })
                .collect(),
        }
    }

    pub(super) fn from_document(document: PortfolioDocument) -> Self {
        let keep = |asset_ref: Option<crate::assets::AssetRef>| {
            asset_ref.map_or(PhotoInput::Empty, PhotoInput::Keep)
        };

        Self {
            photo: keep(document.photo),
            phone_number: document.profile.phone_number.unwrap_or_default(),
            full_name: document.profile.full_name,
            location: document.profile.location,
            role: document.profile.role,
            bio: document.profile.bio,
            links: document.links,
            projects: document
                .projects
                .into_iter()
                .map(|p| SecondTemplateProject {
                    photo: keep(p.photo),
                    name: p.name,
                    description: p.description.unwrap_or_default(),
                    link: p.link,
                    creation_date: p.creation_date,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondProjectPreview {
    pub photo_url: Option<String>,
    pub name: String,
    pub link: String,
    pub description: String,
    pub creation_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondTemplatePreview {
    #[serde(flatten)]
    pub meta: PreviewMeta,
    pub photo_url: Option<String>,
    pub phone_number: String,
    pub full_name: String,
    pub location: String,
    pub role: String,
    pub bio: String,
    pub links: Vec<String>,
    pub projects: Vec<SecondProjectPreview>,
}

impl SecondTemplatePreview {
    pub(super) fn new(meta: PreviewMeta, document: ResolvedDocument) -> Self {
        Self {
            meta,
            photo_url: document.photo,
            phone_number: document.profile.phone_number.unwrap_or_default(),
            full_name: document.profile.full_name,
            location: document.profile.location,
            role: document.profile.role,
            bio: document.profile.bio,
            links: document.links,
            projects: document
                .projects
                .into_iter()
                .map(|p| SecondProjectPreview {
                    photo_url: p.photo,
                    name: p.name,
                    link: p.link,
                    description: p.description.unwrap_or_default(),
                    creation_date: p.creation_date,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_form_is_accepted() {
        assert!(validate(&SecondTemplateForm::default()).is_valid);
    }

    #[test]
    fn malformed_links_are_rejected() {
        let form = SecondTemplateForm {
            links: vec!["https://example.com".into(), "not a url".into()],
            ..Default::default()
        };
        assert!(validate(&form).message.contains("Link number 2"));

        let form = SecondTemplateForm {
            projects: vec![SecondTemplateProject {
                link: "poster".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(!validate(&form).is_valid);
    }

    #[test]
    fn project_without_link_is_accepted() {
        let form = SecondTemplateForm {
            projects: vec![SecondTemplateProject {
                name: "Sketch".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(validate(&form).is_valid);
    }
}
