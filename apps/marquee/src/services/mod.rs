//! Clients for the external collaborators: the TMDB metadata API and the
//! playback embed providers.

pub mod embed;
pub mod tmdb;

pub use embed::{EmbedProvider, EmbedResolver, EmbedTarget, ResolvedEmbed};
pub use tmdb::TmdbClient;
