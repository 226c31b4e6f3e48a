//! Errors reported by the driver.
//!
//! The bus is write-only, so nothing here comes from the controller itself. Errors are
//! either a pin driver refusing a level change, or the caller issuing operations in an
//! order the controller would silently mishandle.

use core::fmt;

pub use display_interface::DisplayError;

/// Errors that can occur when driving the display
#[derive(Clone, Debug)]
pub enum Error {
    /// A transport or reset line could not be driven.
    Interface(DisplayError),
    /// The backlight line could not be driven.
    Backlight,
    /// An addressing or pixel operation was issued before [`init`](crate::Ili9341::init).
    NotInitialized,
    /// [`init`](crate::Ili9341::init) was called a second time.
    AlreadyInitialized,
    /// Pixel data was written without an address window and a Memory Write in effect.
    NoActiveWindow,
    /// A window axis starts after it ends.
    InvalidWindow {
        /// First address on the axis
        start: u16,
        /// Last address on the axis
        end: u16,
    },
    /// The fixed scroll areas do not fit on the panel.
    InvalidScrollArea {
        /// Lines fixed at the top
        fixed_top: u16,
        /// Lines fixed at the bottom
        fixed_bottom: u16,
    },
}

impl From<DisplayError> for Error {
    fn from(err: DisplayError) -> Self {
        Error::Interface(err)
    }
}

/// [`DisplayError`] has no `PartialEq`, so interface errors compare by variant.
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Error::Interface(a), Error::Interface(b)) => {
                core::mem::discriminant(a) == core::mem::discriminant(b)
            }
            (Error::Backlight, Error::Backlight)
            | (Error::NotInitialized, Error::NotInitialized)
            | (Error::AlreadyInitialized, Error::AlreadyInitialized)
            | (Error::NoActiveWindow, Error::NoActiveWindow) => true,
            (
                Error::InvalidWindow { start, end },
                Error::InvalidWindow {
                    start: other_start,
                    end: other_end,
                },
            ) => start == other_start && end == other_end,
            (
                Error::InvalidScrollArea {
                    fixed_top,
                    fixed_bottom,
                },
                Error::InvalidScrollArea {
                    fixed_top: other_top,
                    fixed_bottom: other_bottom,
                },
            ) => fixed_top == other_top && fixed_bottom == other_bottom,
            _ => false,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Interface(err) => write!(f, "Interface error: {:?}", err),
            Error::Backlight => write!(f, "Backlight pin error"),
            Error::NotInitialized => write!(f, "Display not initialized"),
            Error::AlreadyInitialized => write!(f, "Display already initialized"),
            Error::NoActiveWindow => write!(f, "No address window is active"),
            Error::InvalidWindow { start, end } => {
                write!(f, "Invalid window: start {} after end {}", start, end)
            }
            Error::InvalidScrollArea {
                fixed_top,
                fixed_bottom,
            } => write!(
                f,
                "Invalid scroll area: {} fixed top + {} fixed bottom lines",
                fixed_top, fixed_bottom
            ),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::Interface(_) => defmt::write!(f, "Interface error"),
            Error::Backlight => defmt::write!(f, "Backlight pin error"),
            Error::NotInitialized => defmt::write!(f, "Display not initialized"),
            Error::AlreadyInitialized => defmt::write!(f, "Display already initialized"),
            Error::NoActiveWindow => defmt::write!(f, "No address window is active"),
            Error::InvalidWindow { start, end } => {
                defmt::write!(f, "Invalid window: start {} after end {}", start, end)
            }
            Error::InvalidScrollArea {
                fixed_top,
                fixed_bottom,
            } => defmt::write!(
                f,
                "Invalid scroll area: {} fixed top + {} fixed bottom lines",
                fixed_top,
                fixed_bottom
            ),
        }
    }
}
