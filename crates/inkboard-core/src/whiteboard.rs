//! Whiteboard: the single owner of scene and interaction state.

use crate::input::{ClickTracker, InputEvent};
use crate::interaction::{Effect, Interaction};
use crate::scene::{Action, Scene};
use crate::shapes::{Shape, ShapeId};
use crate::text_edit::TextEditor;
use crate::text_measure::{ApproximateMeasure, TextMeasure};
use std::time::Instant;

/// What a renderer needs for one frame.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// Committed shapes of the active page, back to front.
    pub shapes: &'a [Shape],
    /// Shape being drawn, painted above everything else.
    pub transient: Option<&'a Shape>,
    pub selection: Option<ShapeId>,
}

/// Routes input and external actions through one state owner.
pub struct Whiteboard {
    scene: Scene,
    interaction: Interaction,
    measure: Box<dyn TextMeasure>,
    clicks: Option<ClickTracker>,
}

impl Default for Whiteboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Whiteboard {
    /// Empty board measuring text with [`ApproximateMeasure`].
    pub fn new() -> Self {
        Self::with_scene(Scene::new())
    }

    pub fn with_scene(scene: Scene) -> Self {
        Self {
            scene,
            interaction: Interaction::new(),
            measure: Box::new(ApproximateMeasure),
            clicks: None,
        }
    }

    /// Use `measure` for text widths.
    pub fn with_measure(mut self, measure: impl TextMeasure + 'static) -> Self {
        self.measure = Box::new(measure);
        self
    }

    /// Synthesize double-clicks from raw pointer releases.
    pub fn with_click_detection(mut self) -> Self {
        self.clicks = Some(ClickTracker::new());
        self
    }

    /// Handle one input event.
    pub fn handle(&mut self, event: InputEvent) -> Vec<Effect> {
        self.handle_at(event, Instant::now())
    }

    /// Handle one input event that happened at `now`.
    pub fn handle_at(&mut self, event: InputEvent, now: Instant) -> Vec<Effect> {
        let double_click = match (&mut self.clicks, &event) {
            (Some(clicks), InputEvent::Pointer(pointer)) => clicks.track(pointer, now),
            _ => None,
        };

        let mut effects = self
            .interaction
            .handle(&mut self.scene, self.measure.as_ref(), event);
        if let Some(position) = double_click {
            effects.extend(self.interaction.handle(
                &mut self.scene,
                self.measure.as_ref(),
                InputEvent::DoubleClick { position },
            ));
        }
        coalesce_redraws(effects)
    }

    /// Apply an action from outside the canvas (toolbar, tabs).
    ///
    /// An open text edit is committed and any unfinished gesture dropped first.
    pub fn dispatch(&mut self, action: Action) -> Vec<Effect> {
        let mut effects = self.interaction.settle(&mut self.scene, self.measure.as_ref());
        self.scene.apply(action);
        effects.push(Effect::Redraw);
        coalesce_redraws(effects)
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn transient(&self) -> Option<&Shape> {
        self.interaction.transient()
    }

    pub fn editor(&self) -> Option<&TextEditor> {
        self.interaction.editor()
    }

    pub fn measure(&self) -> &dyn TextMeasure {
        self.measure.as_ref()
    }

    /// Data for drawing the active page.
    pub fn frame(&self) -> Frame<'_> {
        Frame {
            shapes: self.scene.active_shapes(),
            transient: self.interaction.transient(),
            selection: self.scene.selection(),
        }
    }

    /// Copy of the persistent state.
    pub fn snapshot(&self) -> Scene {
        self.scene.clone()
    }

    /// Replace the state wholesale, e.g. after hydration. Open edits are dropped.
    pub fn restore(&mut self, scene: Scene) {
        self.interaction = Interaction::new();
        self.scene = scene;
    }

    /// Mutable access for collaborators that drive the scene directly.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }
}

/// Keep a single `Redraw`, at the end.
fn coalesce_redraws(effects: Vec<Effect>) -> Vec<Effect> {
    let redraw = effects.contains(&Effect::Redraw);
    let mut out: Vec<Effect> = effects
        .into_iter()
        .filter(|e| *e != Effect::Redraw)
        .collect();
    if redraw {
        out.push(Effect::Redraw);
    }
    out
}
