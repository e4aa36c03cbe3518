//! Demo resource guarded by per-method scopes.

use std::sync::{Arc, RwLock};

use axum::{
    Extension, Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use scopegate_auth::PrincipalId;

use crate::app::errors;
use crate::context::CallerContext;

#[derive(Debug, Clone, Serialize)]
pub struct Article {
    pub id: usize,
    pub title: String,
    pub author: Option<PrincipalId>,
}

#[derive(Debug, Deserialize)]
pub struct CreateArticle {
    pub title: String,
}

#[derive(Debug, Clone, Default)]
pub struct ArticleStore {
    articles: Arc<RwLock<Vec<Article>>>,
}

/// GET /articles
pub async fn list(Extension(store): Extension<ArticleStore>) -> Response {
    match store.articles.read() {
        Ok(articles) => Json(serde_json::json!({ "articles": &*articles })).into_response(),
        Err(_) => errors::json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "store_error",
            "article store unavailable",
        ),
    }
}

/// POST /articles
pub async fn create(
    Extension(store): Extension<ArticleStore>,
    Extension(caller): Extension<CallerContext>,
    Json(body): Json<CreateArticle>,
) -> Response {
    let title = body.title.trim();
    if title.is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "title must not be empty",
        );
    }

    let Ok(mut articles) = store.articles.write() else {
        return errors::json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "store_error",
            "article store unavailable",
        );
    };

    let article = Article {
        id: articles.len() + 1,
        title: title.to_string(),
        author: caller.principal_id(),
    };
    articles.push(article.clone());

    (StatusCode::CREATED, Json(article)).into_response()
}
