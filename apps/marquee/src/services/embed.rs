//! Playback embed URLs from configured provider templates.

use serde::Serialize;

use crate::config::EmbedConfig;
use crate::error::{AppError, Result};

/// What to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EmbedTarget {
    Movie { id: i64 },
    Episode { id: i64, season: u32, episode: u32 },
}

impl EmbedTarget {
    /// An episode only when both season and episode are given.
    pub fn from_parts(id: i64, season: Option<u32>, episode: Option<u32>) -> Self {
        match (season, episode) {
            (Some(season), Some(episode)) => EmbedTarget::Episode {
                id,
                season,
                episode,
            },
            _ => EmbedTarget::Movie { id },
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            EmbedTarget::Movie { id } | EmbedTarget::Episode { id, .. } => *id,
        }
    }

    pub fn is_episode(&self) -> bool {
        matches!(self, EmbedTarget::Episode { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedProvider {
    pub id: String,
    pub label: String,
    pub quality: String,
    #[serde(skip)]
    movie_template: String,
    #[serde(skip)]
    episode_template: String,
}

impl EmbedProvider {
    pub fn url_for(&self, target: EmbedTarget) -> String {
        match target {
            EmbedTarget::Movie { id } => self.movie_template.replace("{id}", &id.to_string()),
            EmbedTarget::Episode {
                id,
                season,
                episode,
            } => self
                .episode_template
                .replace("{id}", &id.to_string())
                .replace("{season}", &season.to_string())
                .replace("{episode}", &episode.to_string()),
        }
    }
}

/// A resolved iframe source.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedEmbed {
    pub provider: String,
    pub url: String,
}

/// The configured provider list. Never empty.
#[derive(Debug, Clone)]
pub struct EmbedResolver {
    providers: Vec<EmbedProvider>,
}

impl EmbedResolver {
    pub fn from_config(config: &EmbedConfig) -> Result<Self> {
        if config.providers.is_empty() {
            return Err(AppError::Internal(
                "At least one embed provider must be configured".to_string(),
            ));
        }

        let providers = config
            .providers
            .iter()
            .map(|p| EmbedProvider {
                id: p.id.clone(),
                label: p.label.clone(),
                quality: p.quality.clone(),
                movie_template: p.movie_template.clone(),
                episode_template: p.episode_template.clone(),
            })
            .collect();

        Ok(Self { providers })
    }

    pub fn providers(&self) -> &[EmbedProvider] {
        &self.providers
    }

    /// Provider by id, or the first one when the id is missing or unknown.
    pub fn provider(&self, id: Option<&str>) -> &EmbedProvider {
        let default = &self.providers[0];
        match id {
            Some(id) => self.providers.iter().find(|p| p.id == id).unwrap_or_else(|| {
                tracing::debug!(source = %id, fallback = %default.id, "Unknown embed source");
                default
            }),
            None => default,
        }
    }

    pub fn resolve(&self, target: EmbedTarget, source: Option<&str>) -> ResolvedEmbed {
        let provider = self.provider(source);
        ResolvedEmbed {
            provider: provider.id.clone(),
            url: provider.url_for(target),
        }
    }
}
