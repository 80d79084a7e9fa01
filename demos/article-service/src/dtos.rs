use route_kit::Shape;
use serde::{Deserialize, Serialize};

/// An article as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Shape)]
pub struct ArticleDto {
    pub id: String,
    pub title: String,
    pub content: String,
}

/// Payload for creating an article.
#[derive(Debug, Clone, Serialize, Deserialize, Shape)]
pub struct ArticleMutationDto {
    #[shape(binding = "required,min=4,max=255")]
    pub title: String,
    #[shape(binding = "required")]
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Shape)]
pub struct ArticleParams {
    #[shape(binding = "required")]
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Shape)]
pub struct CreatedId {
    pub id: String,
}

/// Body of every 4xx response.
#[derive(Debug, Clone, Serialize, Deserialize, Shape)]
pub struct ErrorBody {
    pub error: String,
}
