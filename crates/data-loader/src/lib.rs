//! # Data Loader Crate
//!
//! Loads the movie catalog consumed by the recommendation core.
//!
//! ## Main Components
//!
//! - **types**: Domain types (MovieRecord, LanguageTable, GenreTable, Catalog)
//! - **parser**: Parse the delimited data files into Rust structs
//! - **index**: Assemble and validate the Catalog
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::Catalog;
//! use std::path::Path;
//!
//! let catalog = Catalog::load_from_dir(Path::new("data"))?;
//! let code = catalog.languages().code_for_name("English");
//! println!("{} movies, English = {:?}", catalog.len(), code);
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod index;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use types::{
    // Type aliases
    MovieId,
    GenreId,
    // Core types
    MovieRecord,
    Language,
    LanguageTable,
    GenreDetails,
    GenreTable,
    Catalog,
};
pub use index::{GENRES_FILE, LANGUAGES_FILE, MOVIES_FILE};
