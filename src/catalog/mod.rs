mod cache;
mod error;
mod parsing;
mod source;
mod types;

pub use cache::{CacheEntryInfo, CacheKey, CacheStats, ElementCache, DEFAULT_BUCKET};
pub use error::CatalogError;
pub use parsing::parse_payload;
pub use source::{CatalogSource, CelestrakSource, DEFAULT_BASE_URL};
pub use types::{CategorizedObject, OrbitalElementRecord, RawOmm};

#[cfg(test)]
pub(crate) use cache::testing;
