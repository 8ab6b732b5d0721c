//! Input commands and screen geometry.
//!
//! Parsing is permissive by policy: an unrecognized mouse-button token
//! falls back to [`MouseButton::Left`] and unknown modifier tokens
//! contribute no bit to the mask. Malformed-but-typed input is never an
//! error at this layer.

use serde::{Deserialize, Serialize};

/// Mouse button selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    /// Primary button.
    #[default]
    Left,
    /// Secondary button.
    Right,
    /// Wheel button.
    Middle,
}

impl MouseButton {
    /// Parse a wire token. Unknown tokens default to `Left`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "right" => Self::Right,
            "middle" | "wheel" => Self::Middle,
            _ => Self::Left,
        }
    }
}

/// Keyboard modifier bitmask.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Modifiers(u8);

impl Modifiers {
    /// Empty mask.
    pub const NONE: Self = Self(0);
    /// Control key.
    pub const CTRL: Self = Self(1);
    /// Alt key.
    pub const ALT: Self = Self(1 << 1);
    /// Shift key.
    pub const SHIFT: Self = Self(1 << 2);
    /// OS key (Windows / Command).
    pub const META: Self = Self(1 << 3);

    /// Parse a comma-separated modifier list (e.g. `"ctrl, alt"`).
    ///
    /// Tokens are case-insensitive. Unknown tokens are ignored.
    #[must_use]
    pub fn parse_csv(raw: &str) -> Self {
        let mut mask = Self::NONE;
        for token in raw.split(',') {
            match token.trim().to_ascii_lowercase().as_str() {
                "ctrl" | "control" => mask |= Self::CTRL,
                "alt" => mask |= Self::ALT,
                "shift" => mask |= Self::SHIFT,
                "win" | "windows" | "meta" => mask |= Self::META,
                _ => {}
            }
        }
        mask
    }

    /// Whether all bits of `other` are set in `self`.
    #[must_use]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether no modifier is set.
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Raw bit representation.
    #[must_use]
    pub fn bits(self) -> u8 {
        self.0
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for Modifiers {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// A rectangular screen region in virtual-desktop coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Full virtual-desktop dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// A single attached monitor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorInfo {
    /// Zero-based monitor index.
    pub index: u32,
    /// Left edge in virtual-desktop coordinates.
    pub x: i32,
    /// Top edge in virtual-desktop coordinates.
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Whether this is the primary monitor.
    pub is_primary: bool,
}

/// A parsed input command headed for the desktop provider.
///
/// Every variant except `MouseMove` is acknowledged back to the caller
/// after the provider accepts it; `MouseMove` is one-way to bound event
/// rate under fast pointer motion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum InputCommand {
    /// Click at a point.
    #[serde(rename_all = "camelCase")]
    MouseClick {
        /// Pointer x.
        x: i32,
        /// Pointer y.
        y: i32,
        /// Button to click.
        button: MouseButton,
        /// Whether to double-click.
        double_click: bool,
    },
    /// Move the pointer. One-way; never acknowledged.
    MouseMove {
        /// Pointer x.
        x: i32,
        /// Pointer y.
        y: i32,
    },
    /// Press-drag-release between two points.
    #[serde(rename_all = "camelCase")]
    MouseDrag {
        /// Start x.
        from_x: i32,
        /// Start y.
        from_y: i32,
        /// End x.
        to_x: i32,
        /// End y.
        to_y: i32,
        /// Button held during the drag.
        button: MouseButton,
    },
    /// Scroll the wheel at a point.
    MouseWheel {
        /// Pointer x.
        x: i32,
        /// Pointer y.
        y: i32,
        /// Scroll delta (positive = away from the user).
        delta: i32,
    },
    /// Press or release a single key.
    #[serde(rename_all = "camelCase")]
    KeyPress {
        /// Virtual key code.
        key_code: u16,
        /// `true` = key down, `false` = key up.
        is_down: bool,
    },
    /// Type a text string.
    TypeText {
        /// Text to type.
        text: String,
    },
    /// Press a key with modifiers held.
    #[serde(rename_all = "camelCase")]
    KeyCombination {
        /// Held modifiers.
        modifiers: Modifiers,
        /// Virtual key code.
        key_code: u16,
    },
}

impl InputCommand {
    /// Wire name of the command, used to tag acknowledgment events.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::MouseClick { .. } => "mouseClick",
            Self::MouseMove { .. } => "mouseMove",
            Self::MouseDrag { .. } => "mouseDrag",
            Self::MouseWheel { .. } => "mouseWheel",
            Self::KeyPress { .. } => "keyPress",
            Self::TypeText { .. } => "typeText",
            Self::KeyCombination { .. } => "keyCombination",
        }
    }

    /// Whether an acknowledgment event is emitted after dispatch.
    #[must_use]
    pub fn acknowledges(&self) -> bool {
        !matches!(self, Self::MouseMove { .. })
    }
}
