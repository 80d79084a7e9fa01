use std::sync::Arc;

use indexmap::IndexMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub content: String,
}

/// In-memory article storage, shared by all handlers.
#[derive(Debug, Clone, Default)]
pub struct ArticleStore {
    articles: Arc<RwLock<IndexMap<Uuid, Article>>>,
}

impl ArticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, title: String, content: String) -> Uuid {
        let id = Uuid::new_v4();
        self.articles
            .write()
            .await
            .insert(id, Article { id, title, content });
        id
    }

    pub async fn list(&self) -> Vec<Article> {
        self.articles.read().await.values().cloned().collect()
    }

    pub async fn get(&self, id: Uuid) -> Option<Article> {
        self.articles.read().await.get(&id).cloned()
    }
}
