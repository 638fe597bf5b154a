//! Jump input
//!
//! Keyboard, touch and mouse all feed one logical button. A press fires once;
//! holding it down does not refire until it is released.

/// Key codes (`KeyboardEvent.code`) that count as jump
pub const JUMP_KEYS: [&str; 3] = ["Space", "ArrowUp", "KeyW"];

pub fn is_jump_key(code: &str) -> bool {
    JUMP_KEYS.contains(&code)
}

/// Edge-detecting jump button
#[derive(Debug, Clone, Default)]
pub struct JumpButton {
    held: bool,
    pressed: bool,
}

impl JumpButton {
    pub fn new() -> Self {
        Self::default()
    }

    /// Button went down. Auto-repeat while held is ignored.
    pub fn press(&mut self) {
        if !self.held {
            self.held = true;
            self.pressed = true;
        }
    }

    pub fn release(&mut self) {
        self.held = false;
    }

    /// Take the pending press, if any
    pub fn take_press(&mut self) -> bool {
        std::mem::take(&mut self.pressed)
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    /// Forget everything (on session start)
    pub fn reset(&mut self) {
        self.held = false;
        self.pressed = false;
    }
}
