//! API Handlers
//!
//! HTTP request handlers for the demo article service. Reads go through the
//! cache-aside layer; writes hit the repository first and then notify the
//! cache through its mutation hooks.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::Value;

use crate::cache::{CacheAside, Fetched, MemoryStore, MutationObserver};
use crate::config::{CacheSettings, Config};
use crate::error::{CacheError, Result};
use crate::filters::{FilterValue, Filters};
use crate::models::{Article, ArticleRequest, DeleteResponse, HealthResponse, StatsResponse};
use crate::repository::MemoryRepository;

/// Cache-aside layer over the article repository.
pub type ArticleCache = CacheAside<Article, MemoryRepository<Article>, MemoryStore>;

/// Query parameter that selects the language variant.
const LANG_PARAM: &str = "lang";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Cache-aside layer for articles
    pub cache: Arc<ArticleCache>,
    /// Article persistence
    pub repository: Arc<MemoryRepository<Article>>,
    /// Backing key-value store
    pub store: Arc<MemoryStore>,
    next_id: Arc<AtomicU64>,
}

impl AppState {
    /// Creates a new AppState with empty storage.
    pub fn new(settings: CacheSettings) -> Self {
        let repository = Arc::new(MemoryRepository::new());
        let store = Arc::new(MemoryStore::new());
        let cache = Arc::new(CacheAside::new(repository.clone(), store.clone(), settings));

        Self {
            cache,
            repository,
            store,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.cache_settings()?))
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

/// Splits query pairs into the language selector and ordered filters.
///
/// Comma-separated values become membership filters.
fn split_query(pairs: Vec<(String, String)>) -> (Option<String>, Filters) {
    let mut lang = None;
    let mut filters = Filters::new();

    for (name, value) in pairs {
        if name == LANG_PARAM {
            lang.get_or_insert(value);
            continue;
        }
        let filter = if value.contains(',') {
            FilterValue::List(value.split(',').map(|v| Value::from(v.trim())).collect())
        } else {
            FilterValue::Scalar(Value::from(value))
        };
        filters.push(name, filter);
    }

    (lang, filters)
}

/// Handler for GET /articles
///
/// Lists the latest articles through the cache. Query parameters other than
/// `lang` filter the list, in the order given.
pub async fn list_handler(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Fetched<Vec<Value>>>> {
    let (lang, filters) = split_query(pairs);
    let params = (!filters.is_empty()).then_some(&filters);

    let fetched = state.cache.fetch_collection(lang.as_deref(), params).await?;
    Ok(Json(fetched))
}

/// Handler for GET /articles/:id
///
/// Returns `data: null` when the article does not exist.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Fetched<Option<Value>>>> {
    let (lang, _) = split_query(pairs);

    let fetched = state.cache.fetch_single(&id, lang.as_deref(), None).await?;
    Ok(Json(fetched))
}

/// Handler for POST /articles
pub async fn create_handler(
    State(state): State<AppState>,
    Json(req): Json<ArticleRequest>,
) -> Result<(StatusCode, Json<Article>)> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let article = Article {
        id: state.next_id(),
        status: req.status,
        tag: req.tag,
        title: req.title,
        created_at: Utc::now(),
    };

    state.repository.insert(article.clone());
    state.cache.on_created(&article).await?;

    Ok((StatusCode::CREATED, Json(article)))
}

/// Handler for PUT /articles/:id
pub async fn update_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<ArticleRequest>,
) -> Result<Json<Article>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let existing = state
        .repository
        .get(&id)
        .ok_or_else(|| CacheError::NotFound(format!("article {}", id)))?;

    let article = Article {
        id,
        status: req.status,
        tag: req.tag,
        title: req.title,
        created_at: existing.created_at,
    };

    if !state.repository.update(article.clone()) {
        return Err(CacheError::NotFound(format!("article {}", id)));
    }
    state.cache.on_updated(&article).await?;

    Ok(Json(article))
}

/// Handler for DELETE /articles/:id
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<DeleteResponse>> {
    let removed = state
        .repository
        .remove(&id)
        .ok_or_else(|| CacheError::NotFound(format!("article {}", id)))?;

    state.cache.on_deleted(&removed).await?;

    Ok(Json(DeleteResponse::new(id)))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.cache.stats().into())
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
