use puppet_core::{DisplayOptions, InteractionMode};

use super::{MouseState, PoseEngine};

/// Discrete engine commands, issued from the keyboard or the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Clear the figure translation.
    ResetPosition,
    /// Clear the trackball rotation.
    ResetOrientation,
    /// Return every node to its loaded state and empty the selection.
    ResetJoints,
    /// All resets, plus mode, display toggles, mouse state and history.
    ResetAll,
    /// Step back one committed gesture.
    Undo,
    /// Step forward one undone gesture.
    Redo,
    /// Ask the host to close.
    Quit,
    /// Show or hide the overlay.
    ToggleOverlay,
    /// Switch interaction mode.
    SetMode(InteractionMode),
    /// Trackball circle.
    ToggleCircle,
    /// Depth testing.
    ToggleZBuffer,
    /// Back-face culling.
    ToggleBackface,
    /// Front-face culling.
    ToggleFrontface,
}

impl Command {
    /// Keyboard shortcut lookup, case-insensitive.
    #[must_use]
    pub fn from_key(key: char) -> Option<Self> {
        let command = match key.to_ascii_lowercase() {
            'i' => Self::ResetPosition,
            'o' => Self::ResetOrientation,
            's' => Self::ResetJoints,
            'a' => Self::ResetAll,
            'u' => Self::Undo,
            'r' => Self::Redo,
            'q' => Self::Quit,
            'm' => Self::ToggleOverlay,
            'p' => Self::SetMode(InteractionMode::Position),
            'j' => Self::SetMode(InteractionMode::Joint),
            'c' => Self::ToggleCircle,
            'z' => Self::ToggleZBuffer,
            'b' => Self::ToggleBackface,
            'f' => Self::ToggleFrontface,
            _ => return None,
        };
        Some(command)
    }
}

impl PoseEngine {
    /// Runs a command.
    pub fn execute(&mut self, command: Command) {
        log::debug!("command {command:?}");
        match command {
            Command::ResetPosition => self.reset_position(),
            Command::ResetOrientation => self.reset_orientation(),
            Command::ResetJoints => self.reset_joints(),
            Command::ResetAll => self.reset_all(),
            Command::Undo => {
                self.undo();
            }
            Command::Redo => {
                self.redo();
            }
            Command::Quit => self.quit_requested = true,
            Command::ToggleOverlay => self.show_overlay = !self.show_overlay,
            Command::SetMode(mode) => self.set_mode(mode),
            Command::ToggleCircle => self.display.circle = !self.display.circle,
            Command::ToggleZBuffer => self.display.zbuffer = !self.display.zbuffer,
            Command::ToggleBackface => self.display.backface = !self.display.backface,
            Command::ToggleFrontface => self.display.frontface = !self.display.frontface,
        }
    }

    /// Clears the figure translation.
    pub fn reset_position(&mut self) {
        self.figure.reset_translation();
    }

    /// Clears the trackball rotation.
    pub fn reset_orientation(&mut self) {
        self.figure.reset_rotation();
    }

    /// Empties the selection and restores every node to its loaded state.
    pub fn reset_joints(&mut self) {
        self.selection.clear(&mut self.graph);
        for handle in self.graph.pre_order(self.root) {
            let Some(node) = self.graph.node_mut(handle) else {
                continue;
            };
            if let Some(snapshot) = self.initial.get(&node.id()) {
                snapshot.apply(node);
            }
        }
    }

    /// Returns the engine to its just-loaded state.
    pub fn reset_all(&mut self) {
        self.mode = InteractionMode::Position;
        self.display = DisplayOptions::default();
        self.mouse = MouseState::default();
        self.reset_orientation();
        self.reset_position();
        self.reset_joints();
        self.history.clear();
        log::info!("reset all");
    }

    /// Undoes the last committed gesture. Returns false if there was none.
    pub fn undo(&mut self) -> bool {
        let restored = self
            .history
            .undo(&mut self.graph, self.root, &mut self.selection);
        log::debug!("undo restored {} nodes", restored.len());
        !restored.is_empty()
    }

    /// Redoes the last undone gesture. Returns false if there was none.
    pub fn redo(&mut self) -> bool {
        let restored = self
            .history
            .redo(&mut self.graph, self.root, &mut self.selection);
        log::debug!("redo restored {} nodes", restored.len());
        !restored.is_empty()
    }

    /// Switches interaction mode.
    pub fn set_mode(&mut self, mode: InteractionMode) {
        if self.mode != mode {
            log::debug!("interaction mode {mode:?}");
        }
        self.mode = mode;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_key() {
        assert_eq!(Command::from_key('U'), Some(Command::Undo));
        assert_eq!(Command::from_key('u'), Some(Command::Undo));
        assert_eq!(
            Command::from_key('j'),
            Some(Command::SetMode(InteractionMode::Joint))
        );
        assert_eq!(Command::from_key('F'), Some(Command::ToggleFrontface));
        assert_eq!(Command::from_key('x'), None);
        assert_eq!(Command::from_key('1'), None);
    }

    #[test]
    fn test_every_binding_is_distinct() {
        let keys = "iosaurqmpjczbf";
        let commands: Vec<_> = keys.chars().filter_map(Command::from_key).collect();
        assert_eq!(commands.len(), keys.len());
        for (i, a) in commands.iter().enumerate() {
            for b in &commands[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
