//! Handlers for `/articles` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/articles` | `?page&pageSize&category&tag&keyword` |
//! | `GET`    | `/articles/recommend` | `?limit`, default 5 |
//! | `GET`    | `/articles/archive` | `{"YYYY-MM": [article, ...]}` |
//! | `GET`    | `/articles/:id` | Counts a view; 404 if not found |
//! | `POST`   | `/articles` | Authenticated; 201 |
//! | `PUT`    | `/articles/:id` | Author or admin only |
//! | `DELETE` | `/articles/:id` | Author or admin only; 204 |
//! | `GET`    | `/articles/:id/interaction` | `{"liked","collected"}` for the caller |
//! | `POST`   | `/articles/:id/like` | Toggle; `{"liked": bool}` |
//! | `POST`   | `/articles/:id/collect` | Toggle; `{"collected": bool}` |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use quill_core::{
  article::{Article, ArticleId, ArticlePatch, NewArticle},
  interaction::{Interaction, MarkKind},
  listing::{Archive, DEFAULT_RECOMMEND_LIMIT, Page, PageRequest},
  store::{ArticleQuery, BlogStore},
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
  ApiState,
  auth::Caller,
  error::ApiError,
  extract::{JsonBody, PathParam, QueryParams},
};

// ─── List ─────────────────────────────────────────────────────────────────────

/// Raw query parameters. Numbers are parsed leniently so junk falls back to
/// the defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
  pub page:      Option<String>,
  pub page_size: Option<String>,
  pub category:  Option<String>,
  pub tag:       Option<String>,
  pub keyword:   Option<String>,
}

impl ListParams {
  pub fn into_query(self) -> ArticleQuery {
    fn present(s: Option<String>) -> Option<String> {
      s.filter(|s| !s.trim().is_empty())
    }
    ArticleQuery {
      page:     PageRequest::from_params(self.page.as_deref(), self.page_size.as_deref()),
      category: present(self.category),
      tag:      present(self.tag),
      keyword:  present(self.keyword),
    }
  }
}

/// `GET /articles`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  QueryParams(params): QueryParams<ListParams>,
) -> Result<Json<Page<Article>>, ApiError>
where
  S: BlogStore,
{
  let page = state
    .store
    .list_articles(params.into_query())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(page))
}

#[derive(Debug, Deserialize)]
pub struct RecommendParams {
  pub limit: Option<String>,
}

/// `GET /articles/recommend`
pub async fn recommend<S>(
  State(state): State<ApiState<S>>,
  QueryParams(params): QueryParams<RecommendParams>,
) -> Result<Json<Vec<Article>>, ApiError>
where
  S: BlogStore,
{
  let limit = params
    .limit
    .and_then(|s| s.trim().parse::<u32>().ok())
    .filter(|n| *n > 0)
    .unwrap_or(DEFAULT_RECOMMEND_LIMIT);

  let articles = state
    .store
    .recommend_articles(limit)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(articles))
}

/// `GET /articles/archive`
pub async fn archive<S>(State(state): State<ApiState<S>>) -> Result<Json<Archive>, ApiError>
where
  S: BlogStore,
{
  let archive = state.store.archive().await.map_err(ApiError::store)?;
  Ok(Json(archive))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /articles/:id`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  PathParam(id): PathParam<ArticleId>,
) -> Result<Json<Article>, ApiError>
where
  S: BlogStore,
{
  let article = state.store.get_article(id).await.map_err(ApiError::store)?;
  Ok(Json(article))
}

// ─── Create / update / delete ─────────────────────────────────────────────────

/// `POST /articles`
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  caller: Caller,
  JsonBody(body): JsonBody<NewArticle>,
) -> Result<impl IntoResponse, ApiError>
where
  S: BlogStore,
{
  let article = state
    .store
    .create_article(caller.identity.user_id, body)
    .await
    .map_err(ApiError::store)?;

  tracing::info!(article_id = article.id, author_id = article.author_id, "article created");
  Ok((StatusCode::CREATED, Json(article)))
}

/// Load an article without counting a view and check the caller may edit it.
async fn editable<S>(state: &ApiState<S>, caller: &Caller, id: ArticleId) -> Result<(), ApiError>
where
  S: BlogStore,
{
  let article = state
    .store
    .find_article(id)
    .await
    .map_err(ApiError::store)?
    .ok_or(quill_core::Error::ArticleNotFound(id))?;
  article.check_editable_by(&caller.identity)?;
  Ok(())
}

/// `PUT /articles/:id`
pub async fn update<S>(
  State(state): State<ApiState<S>>,
  PathParam(id): PathParam<ArticleId>,
  caller: Caller,
  JsonBody(patch): JsonBody<ArticlePatch>,
) -> Result<Json<Article>, ApiError>
where
  S: BlogStore,
{
  editable(&state, &caller, id).await?;
  let article = state
    .store
    .update_article(id, patch)
    .await
    .map_err(ApiError::store)?;

  tracing::info!(article_id = id, user_id = caller.identity.user_id, "article updated");
  Ok(Json(article))
}

/// `DELETE /articles/:id`
pub async fn delete<S>(
  State(state): State<ApiState<S>>,
  PathParam(id): PathParam<ArticleId>,
  caller: Caller,
) -> Result<StatusCode, ApiError>
where
  S: BlogStore,
{
  editable(&state, &caller, id).await?;
  state.store.delete_article(id).await.map_err(ApiError::store)?;

  tracing::info!(article_id = id, user_id = caller.identity.user_id, "article deleted");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Interaction ──────────────────────────────────────────────────────────────

/// `GET /articles/:id/interaction`
pub async fn interaction<S>(
  State(state): State<ApiState<S>>,
  PathParam(id): PathParam<ArticleId>,
  caller: Caller,
) -> Result<Json<Interaction>, ApiError>
where
  S: BlogStore,
{
  let status = state
    .store
    .interaction(caller.identity.user_id, id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(status))
}

async fn toggle<S>(
  state: &ApiState<S>,
  kind: MarkKind,
  caller: &Caller,
  id: ArticleId,
) -> Result<bool, ApiError>
where
  S: BlogStore,
{
  let user_id = caller.identity.user_id;
  let marked = state
    .store
    .toggle_mark(kind, user_id, id)
    .await
    .map_err(ApiError::store)?;

  tracing::debug!(?kind, article_id = id, user_id, marked, "mark toggled");
  Ok(marked)
}

/// `POST /articles/:id/like`
pub async fn like<S>(
  State(state): State<ApiState<S>>,
  PathParam(id): PathParam<ArticleId>,
  caller: Caller,
) -> Result<Json<Value>, ApiError>
where
  S: BlogStore,
{
  let liked = toggle(&state, MarkKind::Like, &caller, id).await?;
  Ok(Json(json!({ "liked": liked })))
}

/// `POST /articles/:id/collect`
pub async fn collect<S>(
  State(state): State<ApiState<S>>,
  PathParam(id): PathParam<ArticleId>,
  caller: Caller,
) -> Result<Json<Value>, ApiError>
where
  S: BlogStore,
{
  let collected = toggle(&state, MarkKind::Collect, &caller, id).await?;
  Ok(Json(json!({ "collected": collected })))
}
