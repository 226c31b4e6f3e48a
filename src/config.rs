//! Init-time configuration for the ILI9341.
//!
//! [`Config::default`] reproduces the reference bring-up: VCOM `0x54`/`0x00`, memory access
//! control `0x04`, no memory-write after init, and the controller-recommended reset and
//! sleep-out waits.

use crate::{MemoryAccess, Mode};

/// Shortest wait after the lines are parked before touching reset, in milliseconds.
pub const MIN_STABILIZE_MS: u8 = 15;
/// Shortest time the reset line is held low, in milliseconds.
pub const MIN_RESET_LOW_MS: u8 = 15;
/// Shortest settle time after reset is released, in milliseconds.
pub const MIN_POST_RESET_MS: u8 = 15;
/// Shortest wait after Sleep Out before the next command, in milliseconds.
pub const MIN_SLEEP_OUT_MS: u8 = 10;

/// Waits used by [`Ili9341::init`](crate::Ili9341::init), in milliseconds.
///
/// Values below the controller minimums are raised to the minimums when the config is
/// applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timings {
    /// After all lines are driven high.
    pub stabilize_ms: u8,
    /// Reset held high before the reset pulse.
    pub reset_high_ms: u8,
    /// Reset held low.
    pub reset_low_ms: u8,
    /// After reset is released.
    pub post_reset_ms: u8,
    /// After Sleep Out.
    pub sleep_out_ms: u8,
}

impl Default for Timings {
    fn default() -> Self {
        Timings {
            stabilize_ms: MIN_STABILIZE_MS,
            reset_high_ms: 5,
            reset_low_ms: MIN_RESET_LOW_MS,
            post_reset_ms: MIN_POST_RESET_MS,
            sleep_out_ms: MIN_SLEEP_OUT_MS,
        }
    }
}

impl Timings {
    pub(crate) fn clamped(&self) -> Self {
        Timings {
            stabilize_ms: self.stabilize_ms.max(MIN_STABILIZE_MS),
            reset_high_ms: self.reset_high_ms,
            reset_low_ms: self.reset_low_ms.max(MIN_RESET_LOW_MS),
            post_reset_ms: self.post_reset_ms.max(MIN_POST_RESET_MS),
            sleep_out_ms: self.sleep_out_ms.max(MIN_SLEEP_OUT_MS),
        }
    }
}

/// A configuration for the display. Builder methods override single settings and leave the
/// rest at the reference values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub(crate) vcom_high: u8,
    pub(crate) vcom_low: u8,
    pub(crate) memory_access: u8,
    pub(crate) landscape: bool,
    pub(crate) memory_write_after_init: bool,
    pub(crate) timings: Timings,
}

impl Default for Config {
    fn default() -> Self {
        let reference = MemoryAccess::REFERENCE;
        Config {
            vcom_high: 0x54,
            vcom_low: 0x00,
            memory_access: reference.mode(),
            landscape: reference.is_landscape(),
            memory_write_after_init: false,
            timings: Timings::default(),
        }
    }
}

impl Config {
    /// Same as [`Config::default`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the two VCOM Control 1 levels sent during init.
    pub fn vcom(self, high: u8, low: u8) -> Self {
        Self {
            vcom_high: high,
            vcom_low: low,
            ..self
        }
    }

    /// Set the Memory Access Control byte sent during init, either from an [`Orientation`]
    /// preset or verbatim bits via [`MemoryAccess`].
    ///
    /// [`Orientation`]: crate::Orientation
    pub fn memory_access<MODE: Mode>(self, mode: MODE) -> Self {
        Self {
            memory_access: mode.mode(),
            landscape: mode.is_landscape(),
            ..self
        }
    }

    /// Issue Memory Write as the last init command, so pixel data can be streamed straight
    /// into the power-on full-frame window without setting one first.
    pub fn memory_write_after_init(self, enable: bool) -> Self {
        Self {
            memory_write_after_init: enable,
            ..self
        }
    }

    /// Override the init waits.
    pub fn timings(self, timings: Timings) -> Self {
        Self { timings, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Orientation;

    #[test]
    fn default_is_reference_bring_up() {
        let config = Config::new();
        assert_eq!((config.vcom_high, config.vcom_low), (0x54, 0x00));
        assert_eq!(config.memory_access, 0b0000_0100);
        assert!(!config.landscape);
        assert!(!config.memory_write_after_init);
        assert_eq!(config.timings, Timings::default());
    }

    #[test]
    fn builders_override_single_fields() {
        let config = Config::new()
            .vcom(0x3E, 0x28)
            .memory_access(Orientation::Landscape)
            .memory_write_after_init(true);
        assert_eq!((config.vcom_high, config.vcom_low), (0x3E, 0x28));
        assert_eq!(config.memory_access, 0x28);
        assert!(config.landscape);
        assert!(config.memory_write_after_init);
        assert_eq!(config.timings, Timings::default());
    }

    #[test]
    fn short_waits_are_raised_to_minimums() {
        let timings = Timings {
            stabilize_ms: 1,
            reset_high_ms: 0,
            reset_low_ms: 2,
            post_reset_ms: 3,
            sleep_out_ms: 4,
        }
        .clamped();
        assert_eq!(timings.stabilize_ms, MIN_STABILIZE_MS);
        assert_eq!(timings.reset_high_ms, 0);
        assert_eq!(timings.reset_low_ms, MIN_RESET_LOW_MS);
        assert_eq!(timings.post_reset_ms, MIN_POST_RESET_MS);
        assert_eq!(timings.sleep_out_ms, MIN_SLEEP_OUT_MS);
    }

    #[test]
    fn long_waits_are_kept() {
        let timings = Timings {
            stabilize_ms: 150,
            reset_high_ms: 250,
            reset_low_ms: 150,
            post_reset_ms: 150,
            sleep_out_ms: 120,
        };
        assert_eq!(timings.clamped(), timings);
    }
}
