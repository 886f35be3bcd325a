//! PokeAPI client: wire types and the HTTP-backed data source

use std::sync::OnceLock;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::types::PokemonType;

pub const API_BASE: &str = "https://pokeapi.co/api/v2";
pub const DEFAULT_DETAIL_CONCURRENCY: usize = 20;
pub const BASE_URL_ENV: &str = "POKEAPI_BASE_URL";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    /// Maximum number of detail requests in flight at once.
    pub detail_concurrency: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: API_BASE.to_string(),
            detail_concurrency: DEFAULT_DETAIL_CONCURRENCY,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            if !base_url.trim().is_empty() {
                config.base_url = base_url;
            }
        }
        config
    }

    pub fn type_url(&self, pokemon_type: PokemonType) -> String {
        format!(
            "{}/type/{}",
            self.base_url.trim_end_matches('/'),
            pokemon_type.as_str()
        )
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NamedResource {
    pub name: String,
    pub url: String,
}

/// `GET /type/{type}`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypeListing {
    pub pokemon: Vec<TypePokemonEntry>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypePokemonEntry {
    pub pokemon: NamedResource,
}

/// `GET {detail-url}`, reduced to the fields the gallery needs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PokemonDetail {
    #[serde(default)]
    pub sprites: Sprites,
    #[serde(default)]
    pub types: Vec<PokemonTypeSlot>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Sprites {
    pub front_default: Option<String>,
    #[serde(default)]
    pub other: Option<OtherSprites>,
}

/// Only the hyphenated key PokeAPI sends is read.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OtherSprites {
    #[serde(rename = "official-artwork", default)]
    pub official_artwork: Option<ArtworkSprites>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtworkSprites {
    pub front_default: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PokemonTypeSlot {
    #[serde(rename = "type")]
    pub type_info: TypeName,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypeName {
    pub name: String,
}

impl PokemonDetail {
    /// Official artwork first, then the plain front sprite.
    pub fn image_url(&self) -> Option<String> {
        self.sprites
            .other
            .as_ref()
            .and_then(|other| other.official_artwork.as_ref())
            .and_then(|artwork| artwork.front_default.clone())
            .filter(|url| !url.is_empty())
            .or_else(|| {
                self.sprites
                    .front_default
                    .clone()
                    .filter(|url| !url.is_empty())
            })
    }

    pub fn type_names(&self) -> Vec<String> {
        self.types
            .iter()
            .map(|slot| slot.type_info.name.clone())
            .collect()
    }
}

// ============================================================================
// Source
// ============================================================================

#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("response parse error: {0}")]
    Parse(String),
}

/// The two read-only endpoints the gallery consumes.
#[async_trait]
pub trait PokemonSource: Send + Sync {
    async fn type_listing(&self, pokemon_type: PokemonType) -> Result<TypeListing, SourceError>;

    async fn pokemon_detail(&self, url: &str) -> Result<PokemonDetail, SourceError>;
}

pub struct HttpSource {
    client: reqwest::Client,
    config: ApiConfig,
}

impl HttpSource {
    pub fn new(config: ApiConfig) -> Self {
        Self::with_client(config, http_client().clone())
    }

    pub fn with_client(config: ApiConfig, client: reqwest::Client) -> Self {
        Self { client, config }
    }

    /// Raw body of a successful GET; artwork goes through here.
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, SourceError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| SourceError::Request(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|err| SourceError::Request(err.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, SourceError> {
        let bytes = self.fetch_bytes(url).await?;
        serde_json::from_slice(&bytes).map_err(|err| SourceError::Parse(err.to_string()))
    }
}

#[async_trait]
impl PokemonSource for HttpSource {
    async fn type_listing(&self, pokemon_type: PokemonType) -> Result<TypeListing, SourceError> {
        let url = self.config.type_url(pokemon_type);
        tracing::debug!(%url, "requesting type listing");
        self.fetch_json(&url).await
    }

    async fn pokemon_detail(&self, url: &str) -> Result<PokemonDetail, SourceError> {
        tracing::debug!(%url, "requesting pokemon detail");
        self.fetch_json(url).await
    }
}

fn http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(reqwest::Client::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CHARIZARD: &str = r#"{
        "id": 6,
        "name": "charizard",
        "sprites": {
            "front_default": "https://img/sprites/6.png",
            "back_default": null,
            "other": {
                "official-artwork": {
                    "front_default": "https://img/artwork/6.png",
                    "front_shiny": null
                },
                "home": { "front_default": "https://img/home/6.png" }
            }
        },
        "types": [
            { "slot": 1, "type": { "name": "fire", "url": "https://pokeapi.co/api/v2/type/10/" } },
            { "slot": 2, "type": { "name": "flying", "url": "https://pokeapi.co/api/v2/type/3/" } }
        ]
    }"#;

    #[test]
    fn detail_prefers_official_artwork() {
        let detail: PokemonDetail = serde_json::from_str(CHARIZARD).unwrap();
        assert_eq!(detail.image_url().as_deref(), Some("https://img/artwork/6.png"));
        assert_eq!(detail.type_names(), vec!["fire", "flying"]);
    }

    #[test]
    fn detail_falls_back_to_front_sprite() {
        let detail: PokemonDetail = serde_json::from_str(
            r#"{
                "sprites": {
                    "front_default": "https://img/sprites/4.png",
                    "other": { "official-artwork": { "front_default": null } }
                },
                "types": [{ "type": { "name": "fire" } }]
            }"#,
        )
        .unwrap();
        assert_eq!(detail.image_url().as_deref(), Some("https://img/sprites/4.png"));
    }

    #[test]
    fn detail_without_images_has_no_url() {
        let detail: PokemonDetail = serde_json::from_str(
            r#"{ "sprites": { "front_default": null, "other": null }, "types": [] }"#,
        )
        .unwrap();
        assert_eq!(detail.image_url(), None);
    }

    #[test]
    fn only_hyphenated_artwork_key_is_read() {
        // Both spellings in one payload must not collide.
        let detail: PokemonDetail = serde_json::from_str(
            r#"{
                "sprites": {
                    "front_default": "https://img/front.png",
                    "other": {
                        "official-artwork": { "front_default": "https://img/a.png" },
                        "official_artwork": { "front_default": "https://img/b.png" }
                    }
                },
                "types": []
            }"#,
        )
        .unwrap();
        assert_eq!(detail.image_url().as_deref(), Some("https://img/a.png"));

        let detail: PokemonDetail = serde_json::from_str(
            r#"{
                "sprites": {
                    "front_default": "https://img/front.png",
                    "other": { "official_artwork": { "front_default": "https://img/b.png" } }
                },
                "types": []
            }"#,
        )
        .unwrap();
        assert_eq!(detail.image_url().as_deref(), Some("https://img/front.png"));
    }

    #[test]
    fn listing_keeps_source_order() {
        let listing: TypeListing = serde_json::from_str(
            r#"{
                "damage_relations": {},
                "pokemon": [
                    { "pokemon": { "name": "charmander", "url": "u/4" }, "slot": 1 },
                    { "pokemon": { "name": "charmeleon", "url": "u/5" }, "slot": 1 }
                ]
            }"#,
        )
        .unwrap();
        let names: Vec<_> = listing
            .pokemon
            .iter()
            .map(|entry| entry.pokemon.name.as_str())
            .collect();
        assert_eq!(names, vec!["charmander", "charmeleon"]);
    }

    #[test]
    fn type_url_joins_base_and_name() {
        let config = ApiConfig {
            base_url: "http://localhost:8080/api/".into(),
            ..ApiConfig::default()
        };
        assert_eq!(
            config.type_url(PokemonType::Ghost),
            "http://localhost:8080/api/type/ghost"
        );
        assert_eq!(
            ApiConfig::default().type_url(PokemonType::Fire),
            "https://pokeapi.co/api/v2/type/fire"
        );
    }

    /// Serve one canned HTTP response on a local port and return its base URL.
    async fn serve_once(status_line: &str, body: &str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 2048];
            let _ = socket.read(&mut request).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });
        format!("http://{addr}")
    }

    fn local_source(base_url: String) -> HttpSource {
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        HttpSource::with_client(
            ApiConfig {
                base_url,
                ..ApiConfig::default()
            },
            client,
        )
    }

    #[tokio::test]
    async fn server_error_status_is_reported() {
        let base = serve_once("500 Internal Server Error", "").await;
        let source = local_source(base);

        let result = source.type_listing(PokemonType::Fire).await;

        assert_eq!(result, Err(SourceError::Status(500)));
    }

    #[tokio::test]
    async fn listing_is_parsed_from_a_live_response() {
        let body = r#"{"pokemon":[{"pokemon":{"name":"vulpix","url":"u/37"},"slot":1}]}"#;
        let base = serve_once("200 OK", body).await;
        let source = local_source(base);

        let listing = source.type_listing(PokemonType::Fire).await.unwrap();

        assert_eq!(listing.pokemon.len(), 1);
        assert_eq!(listing.pokemon[0].pokemon.name, "vulpix");
    }

    #[tokio::test]
    async fn malformed_body_is_a_parse_error() {
        let base = serve_once("200 OK", "<html></html>").await;
        let source = local_source(base.clone());

        let result = source.pokemon_detail(&format!("{base}/pokemon/37")).await;

        assert!(matches!(result, Err(SourceError::Parse(_))));
    }

    #[tokio::test]
    async fn bytes_are_returned_untouched() {
        let base = serve_once("200 OK", "GIF89a").await;
        let source = local_source(base.clone());

        let bytes = source.fetch_bytes(&format!("{base}/art.gif")).await.unwrap();

        assert_eq!(bytes, b"GIF89a".to_vec());
    }
}
