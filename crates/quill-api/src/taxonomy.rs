//! Handlers for `/categories` and `/tags`.

use axum::{Json, extract::State};
use quill_core::{
  store::BlogStore,
  taxonomy::{Category, Tag},
};

use crate::{ApiState, error::ApiError};

/// `GET /categories`
pub async fn categories<S>(State(state): State<ApiState<S>>) -> Result<Json<Vec<Category>>, ApiError>
where
  S: BlogStore,
{
  Ok(Json(state.store.list_categories().await.map_err(ApiError::store)?))
}

/// `GET /tags`
pub async fn tags<S>(State(state): State<ApiState<S>>) -> Result<Json<Vec<Tag>>, ApiError>
where
  S: BlogStore,
{
  Ok(Json(state.store.list_tags().await.map_err(ApiError::store)?))
}
