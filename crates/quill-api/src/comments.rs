//! Handlers for `/comments` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/comments?articleId=` | Root comments with their replies |
//! | `POST`   | `/comments` | Body: `{"articleId","content","parentId"?}`; 201 |
//! | `DELETE` | `/comments/:id` | Author only; 204 |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use quill_core::{
  article::ArticleId,
  comment::{CommentId, CommentThread, NewComment},
  store::BlogStore,
};
use serde::Deserialize;

use crate::{
  ApiState,
  auth::Caller,
  error::ApiError,
  extract::{JsonBody, PathParam, QueryParams},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
  pub article_id: Option<ArticleId>,
}

/// `GET /comments?articleId=<id>`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  QueryParams(params): QueryParams<ListParams>,
) -> Result<Json<Vec<CommentThread>>, ApiError>
where
  S: BlogStore,
{
  let article_id = params
    .article_id
    .ok_or(quill_core::Error::MissingField("articleId"))?;
  let threads = state
    .store
    .list_comments(article_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(threads))
}

/// `POST /comments`
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  caller: Caller,
  JsonBody(body): JsonBody<NewComment>,
) -> Result<impl IntoResponse, ApiError>
where
  S: BlogStore,
{
  let comment = state
    .store
    .add_comment(caller.identity.user_id, body)
    .await
    .map_err(ApiError::store)?;

  tracing::info!(
    comment_id = comment.id,
    article_id = comment.article_id,
    parent_id = ?comment.parent_id,
    "comment added"
  );
  Ok((StatusCode::CREATED, Json(comment)))
}

/// `DELETE /comments/:id`
pub async fn delete<S>(
  State(state): State<ApiState<S>>,
  PathParam(id): PathParam<CommentId>,
  caller: Caller,
) -> Result<StatusCode, ApiError>
where
  S: BlogStore,
{
  state
    .store
    .delete_comment(id, caller.identity.user_id)
    .await
    .map_err(ApiError::store)?;

  tracing::info!(comment_id = id, user_id = caller.identity.user_id, "comment deleted");
  Ok(StatusCode::NO_CONTENT)
}
