use std::{
    fs, io,
    path::{Path, PathBuf},
};

use guess_schema::{Entity, EntityId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog service unavailable: {0}")]
    Unavailable(String),
    #[error("entity {0} not found")]
    NotFound(EntityId),
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read catalog from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Read-only source of anime records.
pub trait CatalogProvider {
    /// Every playable entity with its full attribute set.
    fn fetch_catalog(&self) -> Result<Vec<Entity>, CatalogError>;

    fn fetch_entity_detail(&self, id: EntityId) -> Result<Entity, CatalogError>;

    /// Best-effort text search.
    fn search_entities(&self, query: &str) -> Result<Vec<Entity>, CatalogError>;
}

/// In-memory catalog, typically loaded from a JSON array of entities.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    entities: Vec<Entity>,
}

impl StaticCatalog {
    pub fn new(entities: Vec<Entity>) -> Self {
        Self { entities }
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }
}

impl CatalogProvider for StaticCatalog {
    fn fetch_catalog(&self) -> Result<Vec<Entity>, CatalogError> {
        Ok(self.entities.clone())
    }

    fn fetch_entity_detail(&self, id: EntityId) -> Result<Entity, CatalogError> {
        self.entities
            .iter()
            .find(|entity| entity.id == id)
            .cloned()
            .ok_or(CatalogError::NotFound(id))
    }

    fn search_entities(&self, query: &str) -> Result<Vec<Entity>, CatalogError> {
        Ok(search_cached(&self.entities, query)
            .into_iter()
            .cloned()
            .collect())
    }
}

/// Case-insensitive substring search over an already fetched catalog.
pub fn search_cached<'a>(cached: &'a [Entity], query: &str) -> Vec<&'a Entity> {
    cached
        .iter()
        .filter(|entity| entity.title_contains(query))
        .collect()
}

fn best_match<'a, I>(candidates: I, query: &str) -> Option<&'a Entity>
where
    I: IntoIterator<Item = &'a Entity>,
    I::IntoIter: Clone,
{
    let candidates = candidates.into_iter();
    candidates
        .clone()
        .find(|entity| entity.title_matches(query))
        .or_else(|| candidates.clone().next())
}

/// Resolves a typed title to a full entity record.
///
/// Remote search is tried first. A failed or empty remote search falls back
/// to a substring search of `cached`. An exact title match is preferred over
/// the first hit. Records missing from `cached` are completed with a detail
/// lookup when the provider can supply one.
pub fn resolve_guess(
    provider: &dyn CatalogProvider,
    cached: &[Entity],
    query: &str,
) -> Option<Entity> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }

    let remote = match provider.search_entities(query) {
        Ok(results) => results,
        Err(err) => {
            tracing::warn!(
                target: "anime_guess::catalog",
                query,
                error = %err,
                "catalog.search_failed"
            );
            Vec::new()
        }
    };

    if let Some(hit) = best_match(remote.iter(), query) {
        if let Some(known) = cached.iter().find(|entity| entity.id == hit.id) {
            return Some(known.clone());
        }
        return match provider.fetch_entity_detail(hit.id) {
            Ok(detail) => Some(detail),
            Err(err) => {
                tracing::warn!(
                    target: "anime_guess::catalog",
                    id = %hit.id,
                    error = %err,
                    "catalog.detail_failed"
                );
                Some(hit.clone())
            }
        };
    }

    let local = search_cached(cached, query);
    let found = best_match(local.iter().copied(), query).cloned();
    if found.is_some() {
        tracing::debug!(
            target: "anime_guess::catalog",
            query,
            "catalog.resolved_from_cache"
        );
    }
    found
}
