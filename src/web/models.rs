use serde::{Deserialize, Serialize};

use crate::db::entities::{project, tag};

// --- Request Structs ---

#[derive(Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tag_ids: Option<Vec<i32>>,
}

/// Partial update: absent fields leave the stored value untouched. An
/// explicit `tag_ids` replaces the whole association set; `[]` clears it.
#[derive(Deserialize)]
pub struct UpdateProjectRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub tag_ids: Option<Vec<i32>>,
}

#[derive(Deserialize)]
pub struct TagIdsRequest {
    pub tag_ids: Vec<i32>,
}

#[derive(Deserialize)]
pub struct CreateTagRequest {
    pub name: String,
}

#[derive(Deserialize)]
pub struct UpdateTagRequest {
    pub name: String,
}

// --- Response Structs ---

#[derive(Serialize, Clone, Debug)]
pub struct TagResponse {
    pub id: i32,
    pub name: String,
}

impl From<tag::Model> for TagResponse {
    fn from(tag_model: tag::Model) -> Self {
        Self {
            id: tag_model.id,
            name: tag_model.name,
        }
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct ProjectResponse {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub status: String,
    pub tags: Vec<TagResponse>,
    pub created_at: String,
    pub updated_at: String,
}

impl ProjectResponse {
    pub fn from_parts(project_model: project::Model, tags: Vec<tag::Model>) -> Self {
        Self {
            id: project_model.id,
            name: project_model.name,
            description: project_model.description,
            status: project_model.status,
            tags: tags.into_iter().map(TagResponse::from).collect(),
            created_at: project_model.created_at.to_rfc3339(),
            updated_at: project_model.updated_at.to_rfc3339(),
        }
    }
}
