//! Two-stage fetch: type listing, then one detail request per listed Pokemon

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::api::{NamedResource, PokemonDetail, PokemonSource, SourceError};
use crate::theme::{self, CardGradient};
use crate::types::{PokemonType, UnknownType};

/// Only this many listing entries get a detail request.
pub const LISTING_LIMIT: usize = 20;

pub const USER_MESSAGE: &str = "Pokémon could not be loaded. Try again later.";

#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum FetchError {
    #[error("unknown pokemon type: {0}")]
    UnknownType(String),
    #[error("type listing for {pokemon_type} unavailable: {reason}")]
    ListingUnavailable { pokemon_type: String, reason: String },
    #[error("details for {name} unavailable: {reason}")]
    DetailUnavailable { name: String, reason: String },
}

impl FetchError {
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::UnknownType(_) => "unknown_type",
            FetchError::ListingUnavailable { .. } => "listing_unavailable",
            FetchError::DetailUnavailable { .. } => "detail_unavailable",
        }
    }

    /// The one message shown to the user, whatever the kind.
    pub fn user_message(&self) -> &'static str {
        USER_MESSAGE
    }
}

impl From<UnknownType> for FetchError {
    fn from(err: UnknownType) -> Self {
        FetchError::UnknownType(err.0)
    }
}

/// A listed Pokemon merged with its detail response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PokemonRecord {
    pub name: String,
    pub image_url: Option<String>,
    /// Type names as returned by the source, primary first.
    pub types: Vec<String>,
}

impl PokemonRecord {
    pub fn from_detail(name: String, detail: &PokemonDetail) -> Self {
        Self {
            name,
            image_url: detail.image_url(),
            types: detail.type_names(),
        }
    }

    pub fn primary_type(&self) -> Option<&str> {
        self.types.first().map(String::as_str)
    }

    pub fn card_gradient(&self) -> CardGradient {
        theme::card_gradient(self.primary_type())
    }
}

#[derive(Clone)]
pub struct PokemonAggregator {
    source: Arc<dyn PokemonSource>,
    concurrency: usize,
}

impl PokemonAggregator {
    pub fn new(source: Arc<dyn PokemonSource>, concurrency: usize) -> Self {
        Self {
            source,
            concurrency: concurrency.max(1),
        }
    }

    /// Validate a raw type name before touching the network.
    pub async fn fetch_by_type_name(&self, name: &str) -> Result<Vec<PokemonRecord>, FetchError> {
        let pokemon_type: PokemonType = name.parse()?;
        self.fetch_by_type(pokemon_type).await
    }

    /// Records for the first [`LISTING_LIMIT`] Pokemon of a type, in listing
    /// order. Any failed detail request fails the whole call.
    pub async fn fetch_by_type(
        &self,
        pokemon_type: PokemonType,
    ) -> Result<Vec<PokemonRecord>, FetchError> {
        tracing::info!(%pokemon_type, "fetching type listing");
        let listing = self
            .source
            .type_listing(pokemon_type)
            .await
            .map_err(|err| {
                tracing::warn!(%pokemon_type, error = %err, "type listing failed");
                FetchError::ListingUnavailable {
                    pokemon_type: pokemon_type.to_string(),
                    reason: err.to_string(),
                }
            })?;

        let listed = listing.pokemon.len();
        let entries: Vec<_> = listing
            .pokemon
            .into_iter()
            .take(LISTING_LIMIT)
            .map(|entry| entry.pokemon)
            .collect();
        tracing::info!(
            %pokemon_type,
            listed,
            kept = entries.len(),
            "fetching pokemon details"
        );

        let records = self.fetch_details(entries).await?;
        tracing::info!(%pokemon_type, count = records.len(), "pokemon loaded");
        Ok(records)
    }

    async fn fetch_details(
        &self,
        entries: Vec<NamedResource>,
    ) -> Result<Vec<PokemonRecord>, FetchError> {
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut join_set = JoinSet::new();
        for (index, entry) in entries.iter().cloned().enumerate() {
            let source = Arc::clone(&self.source);
            let semaphore = Arc::clone(&semaphore);
            join_set.spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => {
                        tracing::debug!(name = %entry.name, "fetching detail");
                        source
                            .pokemon_detail(&entry.url)
                            .await
                            .map(|detail| PokemonRecord::from_detail(entry.name, &detail))
                    }
                    Err(_) => Err(SourceError::Request("detail semaphore closed".to_string())),
                };
                (index, result)
            });
        }

        let mut slots: Vec<Option<PokemonRecord>> = vec![None; entries.len()];
        while let Some(joined) = join_set.join_next().await {
            let (index, result) = joined.map_err(|err| FetchError::DetailUnavailable {
                name: "unknown".to_string(),
                reason: err.to_string(),
            })?;
            match result {
                Ok(record) => slots[index] = Some(record),
                Err(err) => {
                    let name = entries[index].name.clone();
                    tracing::warn!(%name, error = %err, "detail request failed");
                    join_set.abort_all();
                    return Err(FetchError::DetailUnavailable {
                        name,
                        reason: err.to_string(),
                    });
                }
            }
        }

        Ok(slots.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ArtworkSprites, OtherSprites, PokemonTypeSlot, TypeName};

    #[test]
    fn record_takes_image_and_types_from_detail() {
        let mut detail = PokemonDetail::default();
        detail.sprites.front_default = Some("https://img/front.png".into());
        detail.sprites.other = Some(OtherSprites {
            official_artwork: Some(ArtworkSprites { front_default: None }),
        });
        detail.types = vec![PokemonTypeSlot {
            type_info: TypeName {
                name: "water".into(),
            },
        }];

        let record = PokemonRecord::from_detail("squirtle".into(), &detail);
        assert_eq!(record.image_url.as_deref(), Some("https://img/front.png"));
        assert_eq!(record.primary_type(), Some("water"));
        assert_eq!(record.card_gradient().from, "#6890F0");
    }

    #[test]
    fn every_kind_shares_the_user_message() {
        let errors = [
            FetchError::UnknownType("shadow".into()),
            FetchError::ListingUnavailable {
                pokemon_type: "fire".into(),
                reason: "status 500".into(),
            },
            FetchError::DetailUnavailable {
                name: "charizard".into(),
                reason: "status 404".into(),
            },
        ];
        let kinds: Vec<_> = errors.iter().map(FetchError::kind).collect();
        assert_eq!(
            kinds,
            vec!["unknown_type", "listing_unavailable", "detail_unavailable"]
        );
        assert!(errors.iter().all(|err| err.user_message() == USER_MESSAGE));
    }

    #[test]
    fn unknown_type_converts() {
        let err: FetchError = UnknownType("bird".into()).into();
        assert_eq!(err, FetchError::UnknownType("bird".into()));
    }
}
