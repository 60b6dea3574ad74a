//! The interactive posing engine.
//!
//! [`PoseEngine`] owns the scene graph and every piece of interaction state:
//! mouse buttons, the previous cursor position, the selection set, the
//! history stacks and the whole-figure pose. Input events and commands are
//! the only writers.

mod commands;
mod input;
mod picking;
mod render_frame;

use std::collections::HashMap;
use std::path::Path;

use glam::{Mat4, Vec2};

use puppet_core::{
    load_scene_file, trackball, DisplayOptions, FigurePose, History, InteractionMode, NodeDescription,
    NodeHandle, NodeId, NodeSnapshot, Options, PuppetError, Result, SceneGraph, Selection,
};

pub use commands::Command;
pub use input::{ButtonAction, MouseButton};

/// Window and framebuffer size.
///
/// Cursor positions arrive in window coordinates; read-back happens in
/// framebuffer pixels, which differ on high-DPI displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Window width.
    pub width: u32,
    /// Window height.
    pub height: u32,
    /// Framebuffer width.
    pub framebuffer_width: u32,
    /// Framebuffer height.
    pub framebuffer_height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1024, 768)
    }
}

#[allow(clippy::cast_precision_loss)]
impl Viewport {
    /// A viewport whose framebuffer matches the window.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            framebuffer_width: width,
            framebuffer_height: height,
        }
    }

    /// Window centre in window coordinates.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32) / 2.0
    }

    /// Framebuffer aspect ratio.
    #[must_use]
    pub fn aspect(&self) -> f32 {
        self.framebuffer_width as f32 / self.framebuffer_height.max(1) as f32
    }

    /// Trackball diameter in pixels.
    #[must_use]
    pub fn trackball_diameter(&self, fraction: f32) -> f32 {
        fraction * self.framebuffer_width.min(self.framebuffer_height) as f32
    }

    /// Converts a window-space cursor position to framebuffer pixels with the
    /// origin at the bottom left.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn to_framebuffer(&self, cursor: Vec2) -> (u32, u32) {
        let width = self.width.max(1) as f32;
        let height = self.height.max(1) as f32;
        let x = cursor.x * self.framebuffer_width as f32 / width;
        let y = (height - cursor.y) * self.framebuffer_height as f32 / height;
        let max_x = self.framebuffer_width.saturating_sub(1) as f32;
        let max_y = self.framebuffer_height.saturating_sub(1) as f32;
        (x.clamp(0.0, max_x) as u32, y.clamp(0.0, max_y) as u32)
    }
}

/// Mouse button and cursor state between events.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MouseState {
    /// Left button held.
    pub left: bool,
    /// Middle button held.
    pub middle: bool,
    /// Right button held.
    pub right: bool,
    /// Cursor position at the previous event.
    pub prev: Vec2,
}

/// The posing engine.
#[derive(Debug)]
pub struct PoseEngine {
    graph: SceneGraph,
    root: NodeHandle,
    initial: HashMap<NodeId, NodeSnapshot>,
    selection: Selection,
    history: History,
    figure: FigurePose,
    mode: InteractionMode,
    display: DisplayOptions,
    options: Options,
    mouse: MouseState,
    viewport: Viewport,
    circle: Vec<Vec2>,
    show_overlay: bool,
    quit_requested: bool,
}

impl PoseEngine {
    /// Takes ownership of a loaded scene.
    ///
    /// A missing root means the loader failed; this is logged and refused.
    /// The state of every node is recorded as the reset target, then the
    /// engine is put through [`Self::reset_all`].
    pub fn new(graph: SceneGraph, root: Option<NodeHandle>, options: Options) -> Result<Self> {
        let Some(root) = root.filter(|&r| graph.node(r).is_some()) else {
            log::error!("scene has no root node; refusing to start");
            return Err(PuppetError::MissingRoot);
        };

        let initial = graph
            .pre_order(root)
            .into_iter()
            .filter_map(|h| graph.node(h))
            .map(|n| (n.id(), NodeSnapshot::capture(n)))
            .collect();

        let mut engine = Self {
            graph,
            root,
            initial,
            selection: Selection::new(),
            history: History::new(),
            figure: FigurePose::placed(Mat4::from_translation(options.figure_offset)),
            mode: InteractionMode::default(),
            display: DisplayOptions::default(),
            circle: trackball::circle_points(options.circle_points),
            options,
            mouse: MouseState::default(),
            viewport: Viewport::default(),
            show_overlay: true,
            quit_requested: false,
        };
        engine.reset_all();
        log::info!("pose engine started with {} nodes", engine.initial.len());
        Ok(engine)
    }

    /// Builds the scene from a description.
    pub fn from_description(description: &NodeDescription, options: Options) -> Result<Self> {
        let (graph, root) = SceneGraph::from_description(description)?;
        Self::new(graph, Some(root), options)
    }

    /// Loads a JSON scene description from disk.
    pub fn load(path: impl AsRef<Path>, options: Options) -> Result<Self> {
        let (graph, root) = load_scene_file(path)?;
        Self::new(graph, Some(root), options)
    }

    /// The scene graph.
    #[must_use]
    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    /// The scene root.
    #[must_use]
    pub fn root(&self) -> NodeHandle {
        self.root
    }

    /// Resolves an id to a handle under the root.
    pub fn find_node(&mut self, id: NodeId) -> Option<NodeHandle> {
        self.graph.find_by_id(self.root, id)
    }

    /// The active selection set.
    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Undo/redo history.
    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// The whole-figure pose.
    #[must_use]
    pub fn figure(&self) -> &FigurePose {
        &self.figure
    }

    /// Current interaction mode.
    #[must_use]
    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Current display toggles.
    #[must_use]
    pub fn display(&self) -> DisplayOptions {
        self.display
    }

    /// Engine options.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Mouse state.
    #[must_use]
    pub fn mouse(&self) -> MouseState {
        self.mouse
    }

    /// Current viewport.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Whether the overlay is shown.
    #[must_use]
    pub fn show_overlay(&self) -> bool {
        self.show_overlay
    }

    /// Whether a quit was requested.
    #[must_use]
    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Perspective projection for the current viewport.
    #[must_use]
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh_gl(
            self.options.field_of_view_deg.to_radians(),
            self.viewport.aspect(),
            self.options.near,
            self.options.far,
        )
    }

    /// Local transform of the root's first child composed with the root's,
    /// used to place the trackball pivot.
    fn pivot_local(&self) -> Option<Mat4> {
        let root = self.graph.node(self.root)?;
        let first = *root.children().first()?;
        Some(root.transform() * self.graph.node(first)?.transform())
    }
}
