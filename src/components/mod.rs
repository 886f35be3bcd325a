pub mod gallery;
pub mod pokedex_view;
pub mod type_picker;

// Re-export core Component trait
pub use tui_dispatch::Component;

pub use gallery::{Gallery, GalleryProps};
pub use pokedex_view::{PokedexView, PokedexViewProps, BASE_BACKGROUND};
pub use type_picker::{TypePicker, TypePickerProps, PLACEHOLDER_LABEL};
