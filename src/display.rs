use crate::error::Result;
use log::debug;
use opencv::highgui;
use opencv::prelude::*;

/// Preview surface for rendered frames.
pub trait Display {
    fn show(&mut self, frame: &Mat) -> Result<()>;

    /// Key pressed since the last poll, if any.
    fn poll_key(&mut self) -> Result<Option<char>>;

    fn close(&mut self) -> Result<()>;
}

pub struct HighguiWindow {
    name: String,
    open: bool,
}

impl HighguiWindow {
    pub fn new(name: &str) -> Result<Self> {
        highgui::named_window_def(name)?;
        Ok(Self {
            name: name.to_owned(),
            open: true,
        })
    }

    /// Blocks until any key is pressed.
    pub fn wait_for_key(&mut self) -> Result<()> {
        highgui::wait_key(0)?;
        Ok(())
    }
}

impl Display for HighguiWindow {
    fn show(&mut self, frame: &Mat) -> Result<()> {
        highgui::imshow(&self.name, frame)?;
        Ok(())
    }

    fn poll_key(&mut self) -> Result<Option<char>> {
        Ok(key_from_code(highgui::wait_key(1)?))
    }

    fn close(&mut self) -> Result<()> {
        if self.open {
            self.open = false;
            highgui::destroy_all_windows()?;
            debug!("Closed window {}", self.name);
        }
        Ok(())
    }
}

impl Drop for HighguiWindow {
    fn drop(&mut self) {
        _ = self.close();
    }
}

/// `wait_key` returns -1 when nothing was pressed; only the low byte
/// identifies the key.
pub fn key_from_code(code: i32) -> Option<char> {
    if code < 0 {
        return None;
    }
    Some(((code & 0xFF) as u8) as char)
}
