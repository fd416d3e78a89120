//! Unary RPC handlers of the `directory.Directory` service.
//!
//! Each method is `POST /directory.Directory/<Method>` with the request
//! message as the JSON body. Unparsable bodies are `invalid_argument`.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use models::{Player, PlayerId};
use tracing::debug;

use crate::errors::RpcError;
use crate::state::AppState;

pub const GET_PLAYER: &str = "/directory.Directory/GetPlayer";
pub const UPDATE_PLAYER: &str = "/directory.Directory/UpdatePlayer";
pub const CREATE_PLAYER: &str = "/directory.Directory/CreatePlayer";
pub const DELETE_PLAYER: &str = "/directory.Directory/DeletePlayer";

// `null` decodes to `None`, which the directory rejects as a missing id.
pub async fn get_player(
    State(state): State<AppState>,
    payload: Result<Json<Option<PlayerId>>, JsonRejection>,
) -> Result<Json<Player>, RpcError> {
    let Json(id) = payload?;
    let player = state.directory.get_player(id).await?;
    Ok(Json(player))
}

pub async fn update_player(
    State(state): State<AppState>,
    payload: Result<Json<Player>, JsonRejection>,
) -> Result<Json<Player>, RpcError> {
    let Json(player) = payload?;
    let player = state.directory.update_player(player).await?;
    Ok(Json(player))
}

pub async fn create_player(
    State(state): State<AppState>,
    payload: Result<Json<Player>, JsonRejection>,
) -> Result<Json<Player>, RpcError> {
    let Json(player) = payload?;
    let player = state.directory.create_player(player).await?;
    debug!(player_id = ?player.key_id(), "create_player ok");
    Ok(Json(player))
}

pub async fn delete_player(
    State(state): State<AppState>,
    payload: Result<Json<Option<PlayerId>>, JsonRejection>,
) -> Result<Json<PlayerId>, RpcError> {
    let Json(id) = payload?;
    let id = state.directory.delete_player(id).await?;
    Ok(Json(id))
}
