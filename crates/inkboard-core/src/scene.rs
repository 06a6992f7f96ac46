//! Scene store: pages, their shapes, tool settings and the selection.
//!
//! All mutation goes through [`Scene::apply`] with a closed set of [`Action`]s.
//! Operations that refer to something missing are no-ops.

use crate::shapes::{PageId, SerializableColor, Shape, ShapeId, ShapePatch};
use crate::tools::{ToolKind, ToolStyle};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A named page (tab) with its own shape collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: PageId,
    pub name: String,
}

impl Page {
    pub fn new(id: PageId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Default page name for the `n`-th page (1-based).
pub fn default_page_name(n: usize) -> String {
    format!("Project {n}")
}

/// The whole application state. Also the local snapshot format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Scene {
    pages: Vec<Page>,
    active_page_id: Option<PageId>,
    /// Shapes per page, in draw order (back to front).
    shapes_by_page: HashMap<PageId, Vec<Shape>>,
    tool: ToolKind,
    #[serde(flatten)]
    style: ToolStyle,
    selection: Option<ShapeId>,
}

/// A subset of the scene state, merged over the current state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatePatch {
    pub pages: Option<Vec<Page>>,
    /// `Some(None)` clears the active page.
    pub active_page_id: Option<Option<PageId>>,
    pub shapes_by_page: Option<HashMap<PageId, Vec<Shape>>>,
    pub tool: Option<ToolKind>,
    pub color: Option<SerializableColor>,
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
    pub stroke_width: Option<f64>,
    pub selection: Option<Option<ShapeId>>,
}

impl From<Scene> for StatePatch {
    fn from(scene: Scene) -> Self {
        Self {
            pages: Some(scene.pages),
            active_page_id: Some(scene.active_page_id),
            shapes_by_page: Some(scene.shapes_by_page),
            tool: Some(scene.tool),
            color: Some(scene.style.color),
            font_family: Some(scene.style.font_family),
            font_size: Some(scene.style.font_size),
            stroke_width: Some(scene.style.stroke_width),
            selection: Some(scene.selection),
        }
    }
}

/// Every state transition the scene supports.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    InitFromLocal(Box<StatePatch>),
    AddPage {
        id: Option<PageId>,
        name: Option<String>,
    },
    SetActivePage(PageId),
    RenamePage {
        id: PageId,
        name: String,
    },
    DeletePage(PageId),
    SetTool(ToolKind),
    SetColor(SerializableColor),
    SetFont(String),
    SetFontSize(f64),
    SetStroke(f64),
    SetShapes {
        page_id: PageId,
        shapes: Vec<Shape>,
    },
    AddShape {
        page_id: PageId,
        shape: Shape,
    },
    UpdateShape {
        page_id: PageId,
        shape_id: ShapeId,
        patch: ShapePatch,
    },
    DeleteShape {
        page_id: PageId,
        shape_id: ShapeId,
    },
    Select(Option<ShapeId>),
}

impl Scene {
    /// Create an empty scene with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one transition.
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::InitFromLocal(patch) => self.merge(*patch),
            Action::AddPage { id, name } => {
                let id = id.unwrap_or_else(Uuid::new_v4);
                let name = name.unwrap_or_else(|| default_page_name(self.pages.len() + 1));
                self.pages.push(Page::new(id, name));
                self.shapes_by_page.insert(id, Vec::new());
                self.active_page_id = Some(id);
                self.selection = None;
            }
            Action::SetActivePage(id) => {
                self.active_page_id = Some(id);
                self.selection = None;
            }
            Action::RenamePage { id, name } => {
                if let Some(page) = self.pages.iter_mut().find(|p| p.id == id) {
                    page.name = name;
                }
            }
            Action::DeletePage(id) => {
                self.pages.retain(|p| p.id != id);
                self.shapes_by_page.remove(&id);
                if self.active_page_id == Some(id) {
                    self.active_page_id = self.pages.first().map(|p| p.id);
                }
                self.selection = None;
            }
            Action::SetTool(tool) => self.tool = tool,
            Action::SetColor(color) => self.style.color = color,
            Action::SetFont(family) => self.style.font_family = family,
            Action::SetFontSize(size) => self.style.font_size = size,
            Action::SetStroke(width) => self.style.stroke_width = width,
            Action::SetShapes { page_id, shapes } => {
                let selection_gone = self.active_page_id == Some(page_id)
                    && self
                        .selection
                        .is_some_and(|id| !shapes.iter().any(|s| s.id() == id));
                if selection_gone {
                    self.selection = None;
                }
                self.shapes_by_page.insert(page_id, shapes);
            }
            Action::AddShape { page_id, shape } => {
                let shapes = self.shapes_by_page.entry(page_id).or_default();
                let id = shape.id();
                if shapes.iter().any(|s| s.id() == id) {
                    log::debug!("shape {id} already exists on page {page_id}, ignoring add");
                    return;
                }
                shapes.push(shape);
                self.selection = Some(id);
            }
            Action::UpdateShape {
                page_id,
                shape_id,
                patch,
            } => match self.shape_mut(page_id, shape_id) {
                Some(shape) => shape.apply_patch(&patch),
                None => log::debug!("update for missing shape {shape_id} on page {page_id}"),
            },
            Action::DeleteShape { page_id, shape_id } => {
                if let Some(shapes) = self.shapes_by_page.get_mut(&page_id) {
                    shapes.retain(|s| s.id() != shape_id);
                }
                if self.selection == Some(shape_id) {
                    self.selection = None;
                }
            }
            Action::Select(id) => self.selection = id,
        }
    }

    fn merge(&mut self, patch: StatePatch) {
        let StatePatch {
            pages,
            active_page_id,
            shapes_by_page,
            tool,
            color,
            font_family,
            font_size,
            stroke_width,
            selection,
        } = patch;

        if let Some(pages) = pages {
            self.pages = pages;
        }
        if let Some(active) = active_page_id {
            self.active_page_id = active;
        }
        if let Some(shapes) = shapes_by_page {
            self.shapes_by_page = shapes;
        }
        if let Some(tool) = tool {
            self.tool = tool;
        }
        if let Some(color) = color {
            self.style.color = color;
        }
        if let Some(family) = font_family {
            self.style.font_family = family;
        }
        if let Some(size) = font_size {
            self.style.font_size = size;
        }
        if let Some(width) = stroke_width {
            self.style.stroke_width = width;
        }
        if let Some(selection) = selection {
            self.selection = selection;
        }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page(&self, id: PageId) -> Option<&Page> {
        self.pages.iter().find(|p| p.id == id)
    }

    pub fn active_page_id(&self) -> Option<PageId> {
        self.active_page_id
    }

    pub fn active_page(&self) -> Option<&Page> {
        self.active_page_id.and_then(|id| self.page(id))
    }

    /// Shapes of a page in draw order. Empty for unknown pages.
    pub fn shapes(&self, page_id: PageId) -> &[Shape] {
        self.shapes_by_page
            .get(&page_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Shapes of the active page, or nothing when no page is active.
    pub fn active_shapes(&self) -> &[Shape] {
        match self.active_page_id {
            Some(id) => self.shapes(id),
            None => &[],
        }
    }

    pub fn shape(&self, page_id: PageId, shape_id: ShapeId) -> Option<&Shape> {
        self.shapes(page_id).iter().find(|s| s.id() == shape_id)
    }

    fn shape_mut(&mut self, page_id: PageId, shape_id: ShapeId) -> Option<&mut Shape> {
        self.shapes_by_page
            .get_mut(&page_id)?
            .iter_mut()
            .find(|s| s.id() == shape_id)
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn style(&self) -> &ToolStyle {
        &self.style
    }

    pub fn selection(&self) -> Option<ShapeId> {
        self.selection
    }

    /// The selected shape, if it lives on the active page.
    pub fn selected_shape(&self) -> Option<&Shape> {
        let page_id = self.active_page_id?;
        self.shape(page_id, self.selection?)
    }

    /// Serialize the scene to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize a scene from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
