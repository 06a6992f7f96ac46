//! Client for the page/shape persistence API.
//!
//! The board works without a backend: [`hydrate`] tries the API once and
//! leaves the scene untouched when anything goes wrong.

use crate::config::BoardConfig;
use crate::scene::{Action, Page, Scene, StatePatch};
use crate::shapes::{PageId, Shape, ShapeId, ShapePatch};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors talking to the persistence API.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server returned {code}: {message}")]
    Status { code: u16, message: String },
    #[error("invalid response: {0}")]
    Decode(String),
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Page and shape operations offered by the backend.
pub trait PersistenceApi {
    fn list_pages(&self) -> RemoteResult<Vec<Page>>;

    /// Create a page. The server picks a default name when `name` is `None`.
    fn create_page(&self, name: Option<&str>) -> RemoteResult<Page>;

    fn delete_page(&self, id: PageId) -> RemoteResult<()>;

    fn list_shapes(&self, page_id: PageId) -> RemoteResult<Vec<Shape>>;

    fn create_shape(&self, page_id: PageId, shape: &Shape) -> RemoteResult<Shape>;

    fn update_shape(
        &self,
        page_id: PageId,
        shape_id: ShapeId,
        patch: &ShapePatch,
    ) -> RemoteResult<Shape>;

    fn delete_shape(&self, page_id: PageId, shape_id: ShapeId) -> RemoteResult<()>;
}

#[derive(Serialize)]
struct NewPage<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Blocking HTTP implementation of [`PersistenceApi`].
pub struct HttpPersistence {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpPersistence {
    /// Client for the API at `base_url` (scheme and host, no `/api`).
    pub fn new(base_url: impl Into<String>, timeout: std::time::Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &BoardConfig) -> Self {
        Self::new(config.api_url.clone(), config.api_timeout)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn decode<T: DeserializeOwned>(response: ureq::Response) -> RemoteResult<T> {
        response
            .into_json::<T>()
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }
}

impl From<ureq::Error> for RemoteError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, response) => {
                let body = response.into_string().unwrap_or_default();
                let message = serde_json::from_str::<ErrorBody>(&body)
                    .map(|b| b.message)
                    .unwrap_or(body);
                RemoteError::Status { code, message }
            }
            ureq::Error::Transport(transport) => RemoteError::Transport(transport.to_string()),
        }
    }
}

impl PersistenceApi for HttpPersistence {
    fn list_pages(&self) -> RemoteResult<Vec<Page>> {
        let response = self.agent.get(&self.url("/pages")).call()?;
        Self::decode(response)
    }

    fn create_page(&self, name: Option<&str>) -> RemoteResult<Page> {
        let response = self
            .agent
            .post(&self.url("/pages"))
            .send_json(NewPage { name })?;
        Self::decode(response)
    }

    fn delete_page(&self, id: PageId) -> RemoteResult<()> {
        self.agent.delete(&self.url(&format!("/pages/{id}"))).call()?;
        Ok(())
    }

    fn list_shapes(&self, page_id: PageId) -> RemoteResult<Vec<Shape>> {
        let response = self
            .agent
            .get(&self.url(&format!("/pages/{page_id}/shapes")))
            .call()?;
        Self::decode(response)
    }

    fn create_shape(&self, page_id: PageId, shape: &Shape) -> RemoteResult<Shape> {
        let response = self
            .agent
            .post(&self.url(&format!("/pages/{page_id}/shapes")))
            .send_json(shape)?;
        Self::decode(response)
    }

    fn update_shape(
        &self,
        page_id: PageId,
        shape_id: ShapeId,
        patch: &ShapePatch,
    ) -> RemoteResult<Shape> {
        let response = self
            .agent
            .put(&self.url(&format!("/pages/{page_id}/shapes/{shape_id}")))
            .send_json(patch)?;
        Self::decode(response)
    }

    fn delete_shape(&self, page_id: PageId, shape_id: ShapeId) -> RemoteResult<()> {
        self.agent
            .delete(&self.url(&format!("/pages/{page_id}/shapes/{shape_id}")))
            .call()?;
        Ok(())
    }
}

/// Replace the scene's pages with the backend's, if it has any.
///
/// The first page becomes active with an empty collection and nothing
/// selected, then its shapes are fetched. Failures are logged and leave the scene as it was at that
/// step. Returns true if pages were loaded.
pub fn hydrate(scene: &mut Scene, api: &dyn PersistenceApi) -> bool {
    let pages = match api.list_pages() {
        Ok(pages) => pages,
        Err(e) => {
            log::warn!("persistence unavailable, staying local: {e}");
            return false;
        }
    };
    let Some(first) = pages.first().map(|p| p.id) else {
        log::debug!("backend has no pages, keeping local state");
        return false;
    };

    scene.apply(Action::InitFromLocal(Box::new(StatePatch {
        pages: Some(pages),
        active_page_id: Some(Some(first)),
        shapes_by_page: Some(HashMap::new()),
        selection: Some(None),
        ..StatePatch::default()
    })));

    match api.list_shapes(first) {
        Ok(shapes) => scene.apply(Action::SetShapes {
            page_id: first,
            shapes,
        }),
        Err(e) => log::warn!("failed to load shapes for page {first}: {e}"),
    }
    true
}
