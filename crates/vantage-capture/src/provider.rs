//! The desktop capability trait and the no-capability stand-in.

use async_trait::async_trait;

use vantage_core::input::{InputCommand, MonitorInfo, MouseButton, Region, ScreenSize};

use crate::errors::ProviderError;

/// External capture/input capability.
///
/// Implementations wrap whatever the host platform offers (a native
/// capture library, a virtual display, a recording fixture in tests).
/// Every method may block on OS-level I/O, so callers run on the worker
/// pool and bound each call with [`crate::with_deadline`].
#[async_trait]
pub trait DesktopProvider: Send + Sync {
    /// Full virtual-desktop dimensions.
    async fn screen_size(&self) -> Result<ScreenSize, ProviderError>;

    /// Attached monitors.
    async fn monitors(&self) -> Result<Vec<MonitorInfo>, ProviderError>;

    /// Capture the full virtual desktop. `quality` is 1..=100.
    async fn capture_full(&self, quality: u8) -> Result<Vec<u8>, ProviderError>;

    /// Capture a rectangular region.
    async fn capture_region(&self, region: Region, quality: u8) -> Result<Vec<u8>, ProviderError>;

    /// Capture a single monitor by index.
    async fn capture_monitor(&self, index: u32, quality: u8) -> Result<Vec<u8>, ProviderError>;

    /// Click at a point.
    async fn mouse_click(
        &self,
        x: i32,
        y: i32,
        button: MouseButton,
        double_click: bool,
    ) -> Result<(), ProviderError>;

    /// Move the pointer.
    async fn mouse_move(&self, x: i32, y: i32) -> Result<(), ProviderError>;

    /// Press-drag-release between two points.
    async fn mouse_drag(
        &self,
        from_x: i32,
        from_y: i32,
        to_x: i32,
        to_y: i32,
        button: MouseButton,
    ) -> Result<(), ProviderError>;

    /// Scroll the wheel at a point.
    async fn mouse_wheel(&self, x: i32, y: i32, delta: i32) -> Result<(), ProviderError>;

    /// Press or release a single key.
    async fn key_press(&self, key_code: u16, is_down: bool) -> Result<(), ProviderError>;

    /// Type a text string.
    async fn type_text(&self, text: &str) -> Result<(), ProviderError>;

    /// Press a key with modifiers held.
    async fn key_combination(
        &self,
        modifiers: vantage_core::input::Modifiers,
        key_code: u16,
    ) -> Result<(), ProviderError>;

    /// Dispatch a parsed [`InputCommand`] to the matching injection method.
    async fn dispatch_input(&self, command: &InputCommand) -> Result<(), ProviderError> {
        match *command {
            InputCommand::MouseClick {
                x,
                y,
                button,
                double_click,
            } => self.mouse_click(x, y, button, double_click).await,
            InputCommand::MouseMove { x, y } => self.mouse_move(x, y).await,
            InputCommand::MouseDrag {
                from_x,
                from_y,
                to_x,
                to_y,
                button,
            } => self.mouse_drag(from_x, from_y, to_x, to_y, button).await,
            InputCommand::MouseWheel { x, y, delta } => self.mouse_wheel(x, y, delta).await,
            InputCommand::KeyPress { key_code, is_down } => {
                self.key_press(key_code, is_down).await
            }
            InputCommand::TypeText { ref text } => self.type_text(text).await,
            InputCommand::KeyCombination {
                modifiers,
                key_code,
            } => self.key_combination(modifiers, key_code).await,
        }
    }
}

/// Provider for deployments without a desktop capability.
///
/// Every call fails with [`ProviderError::Unsupported`], which surfaces to
/// the caller as an operation-scoped error event.
pub struct UnsupportedProvider;

#[async_trait]
impl DesktopProvider for UnsupportedProvider {
    async fn screen_size(&self) -> Result<ScreenSize, ProviderError> {
        Err(ProviderError::unsupported("screenSize"))
    }

    async fn monitors(&self) -> Result<Vec<MonitorInfo>, ProviderError> {
        Err(ProviderError::unsupported("monitors"))
    }

    async fn capture_full(&self, _quality: u8) -> Result<Vec<u8>, ProviderError> {
        Err(ProviderError::unsupported("captureFull"))
    }

    async fn capture_region(
        &self,
        _region: Region,
        _quality: u8,
    ) -> Result<Vec<u8>, ProviderError> {
        Err(ProviderError::unsupported("captureRegion"))
    }

    async fn capture_monitor(&self, _index: u32, _quality: u8) -> Result<Vec<u8>, ProviderError> {
        Err(ProviderError::unsupported("captureMonitor"))
    }

    async fn mouse_click(
        &self,
        _x: i32,
        _y: i32,
        _button: MouseButton,
        _double_click: bool,
    ) -> Result<(), ProviderError> {
        Err(ProviderError::unsupported("mouseClick"))
    }

    async fn mouse_move(&self, _x: i32, _y: i32) -> Result<(), ProviderError> {
        Err(ProviderError::unsupported("mouseMove"))
    }

    async fn mouse_drag(
        &self,
        _from_x: i32,
        _from_y: i32,
        _to_x: i32,
        _to_y: i32,
        _button: MouseButton,
    ) -> Result<(), ProviderError> {
        Err(ProviderError::unsupported("mouseDrag"))
    }

    async fn mouse_wheel(&self, _x: i32, _y: i32, _delta: i32) -> Result<(), ProviderError> {
        Err(ProviderError::unsupported("mouseWheel"))
    }

    async fn key_press(&self, _key_code: u16, _is_down: bool) -> Result<(), ProviderError> {
        Err(ProviderError::unsupported("keyPress"))
    }

    async fn type_text(&self, _text: &str) -> Result<(), ProviderError> {
        Err(ProviderError::unsupported("typeText"))
    }

    async fn key_combination(
        &self,
        _modifiers: vantage_core::input::Modifiers,
        _key_code: u16,
    ) -> Result<(), ProviderError> {
        Err(ProviderError::unsupported("keyCombination"))
    }
}
