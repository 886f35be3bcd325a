use crate::types::PokemonType;

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Run the two-stage fetch; the outcome is tagged with `generation`.
    FetchByType {
        pokemon_type: PokemonType,
        generation: u64,
    },
    /// Download and decode one card's artwork.
    FetchImage { url: String },
}
