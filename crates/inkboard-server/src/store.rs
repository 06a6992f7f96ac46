//! In-memory page and shape store.
//!
//! Shapes are kept as raw JSON objects; the server only cares about `id`
//! and `pageId`.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::{PoisonError, RwLock};
use uuid::Uuid;

pub type ShapeObject = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    pub name: String,
}

/// Pages in creation order plus one shape list per page.
pub struct MemoryStore {
    pages: RwLock<Vec<Page>>,
    shapes: DashMap<String, Vec<ShapeObject>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Empty store. Use [`MemoryStore::seeded`] for a usable server.
    pub fn new() -> Self {
        Self {
            pages: RwLock::new(Vec::new()),
            shapes: DashMap::new(),
        }
    }

    /// Store holding a single page, `Project 1`.
    pub fn seeded() -> Self {
        let store = Self::new();
        store.create_page(None);
        store
    }

    pub fn list_pages(&self) -> Vec<Page> {
        self.pages
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Create a page; `None` picks `Project N` where N is the new page count.
    pub fn create_page(&self, name: Option<String>) -> Page {
        let mut pages = self.pages.write().unwrap_or_else(PoisonError::into_inner);
        let page = Page {
            id: Uuid::new_v4().to_string(),
            name: name.unwrap_or_else(|| format!("Project {}", pages.len() + 1)),
        };
        pages.push(page.clone());
        self.shapes.insert(page.id.clone(), Vec::new());
        page
    }

    /// Remove a page and its shapes. Unknown ids are ignored.
    pub fn delete_page(&self, id: &str) {
        self.pages
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|p| p.id != id);
        self.shapes.remove(id);
    }

    pub fn page_exists(&self, id: &str) -> bool {
        self.pages
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|p| p.id == id)
    }

    pub fn list_shapes(&self, page_id: &str) -> Vec<ShapeObject> {
        self.shapes
            .get(page_id)
            .map(|list| list.clone())
            .unwrap_or_default()
    }

    pub fn add_shape(&self, page_id: &str, shape: ShapeObject) -> ShapeObject {
        self.shapes
            .entry(page_id.to_string())
            .or_default()
            .push(shape.clone());
        shape
    }

    /// Shallow-merge `patch` into the shape. `None` if it doesn't exist.
    pub fn update_shape(
        &self,
        page_id: &str,
        shape_id: &str,
        patch: ShapeObject,
    ) -> Option<ShapeObject> {
        let mut list = self.shapes.get_mut(page_id)?;
        let shape = list.iter_mut().find(|s| shape_id_of(s) == Some(shape_id))?;
        shape.extend(patch);
        Some(shape.clone())
    }

    /// Remove a shape. Unknown ids are ignored.
    pub fn remove_shape(&self, page_id: &str, shape_id: &str) {
        if let Some(mut list) = self.shapes.get_mut(page_id) {
            list.retain(|s| shape_id_of(s) != Some(shape_id));
        }
    }
}

fn shape_id_of(shape: &ShapeObject) -> Option<&str> {
    shape.get("id").and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> ShapeObject {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn test_seeded_store_has_project_one() {
        let store = MemoryStore::seeded();
        let pages = store.list_pages();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].name, "Project 1");
        assert!(store.list_shapes(&pages[0].id).is_empty());
    }

    #[test]
    fn test_default_names_count_existing_pages() {
        let store = MemoryStore::seeded();
        assert_eq!(store.create_page(None).name, "Project 2");
        assert_eq!(store.create_page(Some("Ideas".into())).name, "Ideas");
        assert_eq!(store.create_page(None).name, "Project 4");
    }

    #[test]
    fn test_delete_page_drops_shapes() {
        let store = MemoryStore::seeded();
        let page = store.create_page(None);
        store.add_shape(&page.id, object(json!({"id": "a"})));
        store.delete_page(&page.id);
        assert!(!store.page_exists(&page.id));
        assert!(store.list_shapes(&page.id).is_empty());
        // Deleting again is harmless.
        store.delete_page(&page.id);
        assert_eq!(store.list_pages().len(), 1);
    }

    #[test]
    fn test_update_is_shallow_merge() {
        let store = MemoryStore::seeded();
        let page = store.list_pages()[0].id.clone();
        store.add_shape(
            &page,
            object(json!({"id": "s1", "type": "rectangle", "x": 1, "width": 5})),
        );
        let updated = store
            .update_shape(&page, "s1", object(json!({"x": 10, "color": "#ff0000"})))
            .unwrap();
        assert_eq!(
            Value::Object(updated),
            json!({"id": "s1", "type": "rectangle", "x": 10, "width": 5, "color": "#ff0000"})
        );
        assert!(store.update_shape(&page, "missing", ShapeObject::new()).is_none());
        assert!(store.update_shape("nope", "s1", ShapeObject::new()).is_none());
    }

    #[test]
    fn test_remove_shape_is_idempotent() {
        let store = MemoryStore::seeded();
        let page = store.list_pages()[0].id.clone();
        store.add_shape(&page, object(json!({"id": "a"})));
        store.add_shape(&page, object(json!({"id": "b"})));
        store.remove_shape(&page, "a");
        store.remove_shape(&page, "a");
        let ids: Vec<_> = store
            .list_shapes(&page)
            .iter()
            .filter_map(|s| shape_id_of(s).map(str::to_string))
            .collect();
        assert_eq!(ids, vec!["b".to_string()]);
    }
}
