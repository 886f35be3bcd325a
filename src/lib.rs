//! Typedex - browse Pokémon by type in the terminal
//!
//! Library half of the binary: state, reducer, the PokeAPI client and
//! aggregator, and the components. Exposed so integration tests can drive it.

pub mod action;
pub mod aggregator;
pub mod api;
pub mod color;
pub mod components;
pub mod effect;
pub mod logging;
pub mod reducer;
pub mod sprite;
pub mod state;
pub mod theme;
pub mod types;
