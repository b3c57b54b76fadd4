//! Playback source resolution.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::services::{EmbedProvider, EmbedTarget, ResolvedEmbed};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct WatchQuery {
    pub season: Option<u32>,
    pub episode: Option<u32>,
    pub source: Option<String>,
}

impl WatchQuery {
    pub fn target(&self, id: i64) -> EmbedTarget {
        EmbedTarget::from_parts(id, self.season, self.episode)
    }
}

#[derive(Debug, Serialize)]
pub struct EmbedResponse {
    pub target: EmbedTarget,
    pub embed: ResolvedEmbed,
    pub providers: Vec<EmbedProvider>,
}

/// GET /api/embed/:id
pub async fn get_embed(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<WatchQuery>,
) -> Json<EmbedResponse> {
    let target = query.target(id);
    Json(EmbedResponse {
        target,
        embed: state.embed.resolve(target, query.source.as_deref()),
        providers: state.embed.providers().to_vec(),
    })
}
