use std::time::Duration;

use guess_core::{CatalogError, CatalogProvider, GameReporter, ReportError};
use guess_schema::{AchievementUnlock, Entity, EntityId, ScoreSubmission};
use reqwest::{blocking::Client, StatusCode};
use serde::de::DeserializeOwned;

/// Blocking client for the game backend: catalog reads plus score and
/// achievement writes.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    client: Client,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("anime-guess/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<(StatusCode, Option<T>), CatalogError> {
        let response = self
            .client
            .get(self.url(path))
            .query(query)
            .send()
            .map_err(|err| CatalogError::Unavailable(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Ok((status, None));
        }
        let body = response
            .json()
            .map_err(|err| CatalogError::Unavailable(format!("invalid body from {path}: {err}")))?;
        Ok((status, Some(body)))
    }

    fn post_json<T: serde::Serialize>(&self, path: &str, body: &T) -> Result<(), ReportError> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .map_err(|err| ReportError::Unavailable(err.to_string()))?;
        if !response.status().is_success() {
            return Err(ReportError::Rejected {
                status: response.status().as_u16(),
            });
        }
        Ok(())
    }
}

fn unexpected(path: &str, status: StatusCode) -> CatalogError {
    CatalogError::Unavailable(format!("HTTP {status} from {path}"))
}

impl CatalogProvider for HttpBackend {
    fn fetch_catalog(&self) -> Result<Vec<Entity>, CatalogError> {
        match self.get_json("/anime", &[])? {
            (_, Some(entities)) => Ok(entities),
            (status, None) => Err(unexpected("/anime", status)),
        }
    }

    fn fetch_entity_detail(&self, id: EntityId) -> Result<Entity, CatalogError> {
        let path = format!("/anime/{id}");
        match self.get_json(&path, &[])? {
            (_, Some(entity)) => Ok(entity),
            (status, None) if status == StatusCode::NOT_FOUND => Err(CatalogError::NotFound(id)),
            (status, None) => Err(unexpected(&path, status)),
        }
    }

    fn search_entities(&self, query: &str) -> Result<Vec<Entity>, CatalogError> {
        match self.get_json("/anime/search", &[("q", query)])? {
            (_, Some(entities)) => Ok(entities),
            (status, None) => Err(unexpected("/anime/search", status)),
        }
    }
}

impl GameReporter for HttpBackend {
    fn submit_score(&self, submission: &ScoreSubmission) -> Result<(), ReportError> {
        self.post_json("/scores", submission)
    }

    fn unlock_achievement(&self, unlock: &AchievementUnlock) -> Result<(), ReportError> {
        self.post_json("/achievements/unlock", unlock)
    }
}
