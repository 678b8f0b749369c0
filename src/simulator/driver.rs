use anyhow::{Context, Result};
use enigo::Keyboard as _;
use enigo::Mouse as _;
use enigo::{Coordinate, Direction, Enigo, Key, Settings};
use tracing::{info, trace};

/// Low-level input injection seam.
///
/// The activity loop only ever needs these four operations, so they form the
/// trait boundary in front of Enigo. Implementations must not panic; errors
/// propagate to the loop, which logs them and keeps running.
pub trait InputDriver: Send {
    /// Current cursor position in absolute screen coordinates.
    fn cursor_position(&mut self) -> Result<(i32, i32)>;

    /// Displace the cursor relative to its current position.
    fn move_relative(&mut self, dx: i32, dy: i32) -> Result<()>;

    /// Move the cursor to absolute screen coordinates.
    fn move_absolute(&mut self, x: i32, y: i32) -> Result<()>;

    /// Click Shift once — a neutral key that does not affect applications.
    fn tap_neutral_key(&mut self) -> Result<()>;
}

/// Driver backed by a real Enigo handle, constructed lazily on first use.
pub struct EnigoDriver {
    enigo: Option<Enigo>,
}

impl EnigoDriver {
    #[must_use]
    pub fn new() -> Self {
        Self { enigo: None }
    }

    fn ensure_enigo(&mut self) -> Result<&mut Enigo> {
        if self.enigo.is_none() {
            trace!(target: "notidle::driver", "Initializing Enigo");
            self.enigo =
                Some(Enigo::new(&Settings::default()).context("Failed to initialize Enigo")?);
        }
        Ok(self.enigo.as_mut().expect("Enigo must be initialized"))
    }
}

impl Default for EnigoDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl InputDriver for EnigoDriver {
    fn cursor_position(&mut self) -> Result<(i32, i32)> {
        let enigo = self.ensure_enigo()?;
        let pos = enigo.location().context("Failed to read cursor position")?;
        trace!(target: "notidle::driver", x = pos.0, y = pos.1, "cursor_position");
        Ok(pos)
    }

    fn move_relative(&mut self, dx: i32, dy: i32) -> Result<()> {
        let enigo = self.ensure_enigo()?;
        trace!(target: "notidle::driver", dx, dy, "move_relative");
        enigo.move_mouse(dx, dy, Coordinate::Rel)?;
        Ok(())
    }

    fn move_absolute(&mut self, x: i32, y: i32) -> Result<()> {
        let enigo = self.ensure_enigo()?;
        trace!(target: "notidle::driver", x, y, "move_absolute");
        enigo.move_mouse(x, y, Coordinate::Abs)?;
        Ok(())
    }

    fn tap_neutral_key(&mut self) -> Result<()> {
        let enigo = self.ensure_enigo()?;
        trace!(target: "notidle::driver", "tap_neutral_key");
        enigo.key(Key::Shift, Direction::Click)?;
        Ok(())
    }
}

/// Driver that only logs intended actions and tracks a virtual cursor.
/// Selected by `--dry-run`; useful on machines where injecting real input is
/// unwanted (or impossible, e.g. headless sessions).
pub struct DryRunDriver {
    x: i32,
    y: i32,
}

impl DryRunDriver {
    #[must_use]
    pub fn new() -> Self {
        Self { x: 0, y: 0 }
    }
}

impl Default for DryRunDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl InputDriver for DryRunDriver {
    fn cursor_position(&mut self) -> Result<(i32, i32)> {
        info!(target: "notidle::driver", x = self.x, y = self.y, "DRY-RUN cursor_position");
        Ok((self.x, self.y))
    }

    fn move_relative(&mut self, dx: i32, dy: i32) -> Result<()> {
        self.x += dx;
        self.y += dy;
        info!(target: "notidle::driver", dx, dy, "DRY-RUN move_relative");
        Ok(())
    }

    fn move_absolute(&mut self, x: i32, y: i32) -> Result<()> {
        self.x = x;
        self.y = y;
        info!(target: "notidle::driver", x, y, "DRY-RUN move_absolute");
        Ok(())
    }

    fn tap_neutral_key(&mut self) -> Result<()> {
        info!(target: "notidle::driver", "DRY-RUN tap_neutral_key");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dry_run_tracks_virtual_cursor() {
        let mut driver = DryRunDriver::new();
        assert_eq!(driver.cursor_position().unwrap(), (0, 0));

        driver.move_relative(5, 5).unwrap();
        assert_eq!(driver.cursor_position().unwrap(), (5, 5));

        driver.move_absolute(0, 0).unwrap();
        assert_eq!(driver.cursor_position().unwrap(), (0, 0));

        driver.tap_neutral_key().unwrap();
    }
}
