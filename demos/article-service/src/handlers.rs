use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use uuid::Uuid;

use crate::dtos::{ArticleDto, ArticleMutationDto, ArticleParams, CreatedId, ErrorBody};
use crate::store::{Article, ArticleStore};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("article {0} not found")]
    NotFound(Uuid),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        };
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

impl From<Article> for ArticleDto {
    fn from(article: Article) -> Self {
        Self {
            id: article.id.to_string(),
            title: article.title,
            content: article.content,
        }
    }
}

/// Get all articles
pub async fn list_articles(State(store): State<ArticleStore>) -> Json<Vec<ArticleDto>> {
    Json(store.list().await.into_iter().map(ArticleDto::from).collect())
}

/// Create an article
pub async fn create_article(
    State(store): State<ArticleStore>,
    Json(payload): Json<ArticleMutationDto>,
) -> Result<Json<CreatedId>, ApiError> {
    route_kit::validate(&payload).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let id = store.create(payload.title, payload.content).await;
    tracing::info!(%id, "article created");
    Ok(Json(CreatedId { id: id.to_string() }))
}

/// Get an article by its id
pub async fn get_article(
    State(store): State<ArticleStore>,
    Path(params): Path<ArticleParams>,
) -> Result<Json<ArticleDto>, ApiError> {
    let id = Uuid::parse_str(&params.id)
        .map_err(|e| ApiError::BadRequest(format!("invalid article id {:?}: {e}", params.id)))?;
    let article = store.get(id).await.ok_or(ApiError::NotFound(id))?;
    Ok(Json(article.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_get() {
        let store = ArticleStore::new();
        let created = create_article(
            State(store.clone()),
            Json(ArticleMutationDto {
                title: "Hello world".into(),
                content: "First post".into(),
            }),
        )
        .await
        .unwrap();

        let fetched = get_article(
            State(store.clone()),
            Path(ArticleParams {
                id: created.0.id.clone(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(fetched.0.title, "Hello world");

        let listed = list_articles(State(store)).await;
        assert_eq!(listed.0, vec![fetched.0]);
    }

    #[tokio::test]
    async fn short_title_is_rejected() {
        let result = create_article(
            State(ArticleStore::new()),
            Json(ArticleMutationDto {
                title: "Hi".into(),
                content: "x".into(),
            }),
        )
        .await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn title_over_declared_max_is_rejected() {
        let store = ArticleStore::new();
        let result = create_article(
            State(store.clone()),
            Json(ArticleMutationDto {
                title: "a".repeat(256),
                content: "x".into(),
            }),
        )
        .await;
        match result {
            Err(ApiError::BadRequest(reason)) => assert!(reason.contains("title"), "{reason}"),
            other => panic!("expected a bad request, got {other:?}"),
        }

        let missing_content = create_article(
            State(store.clone()),
            Json(ArticleMutationDto {
                title: "a".repeat(255),
                content: String::new(),
            }),
        )
        .await;
        assert!(matches!(missing_content, Err(ApiError::BadRequest(ref r)) if r.contains("content")));
        assert!(store.list().await.is_empty());
    }

    #[tokio::test]
    async fn unknown_and_malformed_ids() {
        let store = ArticleStore::new();
        let missing = get_article(
            State(store.clone()),
            Path(ArticleParams {
                id: Uuid::new_v4().to_string(),
            }),
        )
        .await;
        assert_eq!(missing.unwrap_err().into_response().status(), StatusCode::NOT_FOUND);

        let malformed = get_article(State(store), Path(ArticleParams { id: "nope".into() })).await;
        assert_eq!(malformed.unwrap_err().into_response().status(), StatusCode::BAD_REQUEST);
    }
}
