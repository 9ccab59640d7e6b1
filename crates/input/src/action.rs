use std::str::FromStr;

use glam::Vec2;

/// One of the four horizontal movement directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Back,
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown direction or key: {0:?}")]
pub struct ParseDirectionError(pub String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    /// Accepts direction names and the arrow/WASD key codes the desktop
    /// boundary reports.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "forward" | "ArrowUp" | "KeyW" => Ok(Self::Forward),
            "back" | "ArrowDown" | "KeyS" => Ok(Self::Back),
            "left" | "ArrowLeft" | "KeyA" => Ok(Self::Left),
            "right" | "ArrowRight" | "KeyD" => Ok(Self::Right),
            other => Err(ParseDirectionError(other.to_string())),
        }
    }
}

/// A high-level input action produced by the input boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// A direction became held.
    Press(Direction),
    /// A direction was released.
    Release(Direction),
    /// Start the drop into the field.
    Begin,
    /// Unbound input.
    Noop,
}

/// Which directions are currently held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveIntent {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
}

impl MoveIntent {
    pub fn set(&mut self, direction: Direction, held: bool) {
        match direction {
            Direction::Forward => self.forward = held,
            Direction::Back => self.back = held,
            Direction::Left => self.left = held,
            Direction::Right => self.right = held,
        }
    }

    pub fn with(mut self, direction: Direction) -> Self {
        self.set(direction, true);
        self
    }

    /// `(strafe, advance)`: +x is right, +y is forward. Opposing keys cancel.
    pub fn axes(&self) -> Vec2 {
        Vec2::new(
            self.right as i8 as f32 - self.left as i8 as f32,
            self.forward as i8 as f32 - self.back as i8 as f32,
        )
    }

    pub fn is_idle(&self) -> bool {
        self.axes() == Vec2::ZERO
    }
}

/// Input accumulated between frames.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    intent: MoveIntent,
    begin_requested: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Press(d) => self.intent.set(d, true),
            Action::Release(d) => self.intent.set(d, false),
            Action::Begin => {
                tracing::debug!("begin requested");
                self.begin_requested = true;
            }
            Action::Noop => {}
        }
    }

    pub fn intent(&self) -> MoveIntent {
        self.intent
    }

    /// Consume a pending begin trigger.
    pub fn take_begin(&mut self) -> bool {
        std::mem::take(&mut self.begin_requested)
    }
}
