#![no_std]

//! ILI9341 Display Driver over a bit-banged serial bus
//!
//! ### Usage
//!
//! To control the display you need to set up:
//!
//! * Interface for communicating with display ([`BitBangInterface`] over four GPIO lines,
//!   or any other [`WriteOnlyDataCommand`] such as the [display-interface-spi crate])
//! * Reset and backlight pins
//! * Configuration (VCOM, memory access mode, init waits) and a delay for [`Ili9341::init`]
//!
//! ```ignore
//! let iface = BitBangInterface::new(cs, rs, sda, scl)?;
//!
//! let mut display = Ili9341::new(iface, reset, backlight, ili9341_bitbang::DisplaySize240x320);
//! display.init(&mut delay, &Config::default())?;
//!
//! display.draw_pixel(10, 20, 0xF800)?;
//! ```
//!
//! [display-interface-spi crate]: https://crates.io/crates/display-interface-spi
use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::OutputPin;

use core::iter::{once, repeat};
use display_interface::DataFormat::{U16BEIter, U8Iter};
use display_interface::WriteOnlyDataCommand;

pub mod config;
pub mod error;
pub mod interface;

#[cfg(feature = "graphics")]
mod graphics_core;

pub use config::{Config, Timings};
pub use error::{DisplayError, Error};
pub use interface::BitBangInterface;

type Result<T = (), E = Error> = core::result::Result<T, E>;

/// COLMOD value for 16 bits per pixel (RGB565) on both the RGB and MCU interfaces.
const PIXEL_FORMAT_RGB565: u8 = 0x55;

/// Trait that defines display size information
pub trait DisplaySize {
    /// Number of column addresses with no row/column exchange
    const WIDTH: usize;
    /// Number of page addresses with no row/column exchange
    const HEIGHT: usize;
}

/// Generic display size of 240x320 pixels
pub struct DisplaySize240x320;

impl DisplaySize for DisplaySize240x320 {
    const WIDTH: usize = 240;
    const HEIGHT: usize = 320;
}

/// Source of the Memory Access Control (`0x36`) byte.
///
/// Implemented by the [`Orientation`] presets and by [`MemoryAccess`] for boards that need
/// a different bit pattern.
pub trait Mode {
    fn mode(&self) -> u8;

    fn is_landscape(&self) -> bool;
}

/// Common orientation presets, all in BGR color order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Orientation {
    Portrait,
    PortraitFlipped,
    Landscape,
    LandscapeFlipped,
}

impl Mode for Orientation {
    fn mode(&self) -> u8 {
        match self {
            Self::Portrait => 0x40 | 0x08,
            Self::Landscape => 0x20 | 0x08,
            Self::PortraitFlipped => 0x80 | 0x08,
            Self::LandscapeFlipped => 0x40 | 0x80 | 0x20 | 0x08,
        }
    }

    fn is_landscape(&self) -> bool {
        match self {
            Self::Landscape | Self::LandscapeFlipped => true,
            Self::Portrait | Self::PortraitFlipped => false,
        }
    }
}

/// Raw Memory Access Control bits, passed to the controller unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MemoryAccess(u8);

impl MemoryAccess {
    /// MY: row address order
    pub const ROW_ADDRESS_ORDER: u8 = 0x80;
    /// MX: column address order
    pub const COLUMN_ADDRESS_ORDER: u8 = 0x40;
    /// MV: row/column exchange
    pub const ROW_COLUMN_EXCHANGE: u8 = 0x20;
    /// ML: vertical refresh order
    pub const VERTICAL_REFRESH_ORDER: u8 = 0x10;
    /// BGR color filter order
    pub const BGR: u8 = 0x08;
    /// MH: horizontal refresh order
    pub const HORIZONTAL_REFRESH_ORDER: u8 = 0x04;

    /// The bit pattern used by the reference bring-up.
    pub const REFERENCE: MemoryAccess = MemoryAccess(Self::HORIZONTAL_REFRESH_ORDER);

    pub const fn from_bits(bits: u8) -> Self {
        MemoryAccess(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl Mode for MemoryAccess {
    fn mode(&self) -> u8 {
        self.0
    }

    fn is_landscape(&self) -> bool {
        self.0 & Self::ROW_COLUMN_EXCHANGE != 0
    }
}

/// Specify state of specific mode of operation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModeState {
    On,
    Off,
}

/// Where the controller is in its command protocol, as far as the driver has driven it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// [`Ili9341::init`] has not completed.
    Uninit,
    /// Awake and idle; no pixel data is accepted.
    Idle,
    /// An address window is set and Memory Write was issued, so data bytes land in GRAM.
    WindowSet,
}

/// There are two ways to put pixels on the screen: [`Ili9341::draw_pixel`] targets one
/// pixel, and [`Ili9341::set_address_window`] followed by [`Ili9341::write_pixels`] streams
/// any number of rgb565 values into a rectangle.
///
/// The hardware makes it efficient to draw rectangles on the screen:
///
/// - A window is prepared on the column address axis and the page address axis
/// - Every pair of bytes received is interpreted as a pixel value in rgb565
/// - As soon as a pixel is received, the column address is incremented, and the next word
///   fills the adjacent column, or the first column of the next page when the page ended
///
/// In the `(x, y)` coordinates used by [`Ili9341::draw_pixel`] and the `draw_raw_*`
/// methods, `x` runs along the page axis and `y` along the column axis, so streamed data
/// advances along `y` first. [`Ili9341::width`] and [`Ili9341::height`] follow the same
/// convention.
///
/// The embedded-graphics `DrawTarget` (feature `graphics`) uses the transposed frame:
/// its `x` is the column axis and its `y` the page axis, so its `size()` reports
/// `height() x width()`. A point `(x, y)` drawn through embedded-graphics lands where
/// `draw_pixel(y, x, ..)` would put it.
///
/// The driver tracks the protocol [`State`]: addressing needs a completed
/// [`Ili9341::init`], and pixel data needs an active window. Out-of-order calls return an
/// error without touching the bus.
pub struct Ili9341<IFACE, RESET, BL> {
    interface: IFACE,
    reset: RESET,
    backlight: BL,
    state: State,
    columns: u16,
    pages: u16,
    native_pages: u16,
    landscape: bool,
}

impl<IFACE, RESET, BL> Ili9341<IFACE, RESET, BL> {
    /// Take ownership of the interface and the reset and backlight lines. Nothing is sent
    /// until [`Ili9341::init`].
    pub fn new<SIZE>(interface: IFACE, reset: RESET, backlight: BL, _display_size: SIZE) -> Self
    where
        SIZE: DisplaySize,
    {
        Ili9341 {
            interface,
            reset,
            backlight,
            state: State::Uninit,
            columns: SIZE::WIDTH as u16,
            pages: SIZE::HEIGHT as u16,
            native_pages: SIZE::HEIGHT as u16,
            landscape: false,
        }
    }

    /// Get the current x extent (page addresses). It can change based on the current
    /// orientation
    pub fn width(&self) -> u16 {
        self.pages
    }

    /// Get the current y extent (column addresses). It can change based on the current
    /// orientation
    pub fn height(&self) -> u16 {
        self.columns
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Release the interface and the reset and backlight lines.
    pub fn release(self) -> (IFACE, RESET, BL) {
        (self.interface, self.reset, self.backlight)
    }

    fn apply_landscape(&mut self, landscape: bool) {
        if self.landscape ^ landscape {
            core::mem::swap(&mut self.columns, &mut self.pages);
        }
        self.landscape = landscape;
    }

    fn require_initialized(&self) -> Result {
        if self.state == State::Uninit {
            log::warn!("ili9341: command issued before init");
            return Err(Error::NotInitialized);
        }
        Ok(())
    }

    fn require_window(&self) -> Result {
        match self.state {
            State::WindowSet => Ok(()),
            State::Idle => {
                log::warn!("ili9341: pixel data without an address window");
                Err(Error::NoActiveWindow)
            }
            State::Uninit => self.require_initialized(),
        }
    }
}

impl<IFACE, RESET, BL> Ili9341<IFACE, RESET, BL>
where
    IFACE: WriteOnlyDataCommand,
    RESET: OutputPin,
    BL: OutputPin,
{
    /// Reset and configure the controller, then wake it and turn the display on.
    ///
    /// Must be called exactly once before any other command. The transport lines are
    /// expected to be parked high already ([`BitBangInterface::new`] does this).
    pub fn init<DELAY>(&mut self, delay: &mut DELAY, config: &Config) -> Result
    where
        DELAY: DelayMs<u8>,
    {
        if self.state != State::Uninit {
            log::warn!("ili9341: init called twice");
            return Err(Error::AlreadyInitialized);
        }
        let timings = config.timings.clamped();

        self.reset.set_high().map_err(|_| DisplayError::RSError)?;
        self.backlight.set_high().map_err(|_| Error::Backlight)?;
        delay.delay_ms(timings.stabilize_ms);

        // Hardware reset, active low
        self.reset.set_high().map_err(|_| DisplayError::RSError)?;
        delay.delay_ms(timings.reset_high_ms);
        self.reset.set_low().map_err(|_| DisplayError::RSError)?;
        delay.delay_ms(timings.reset_low_ms);
        self.reset.set_high().map_err(|_| DisplayError::RSError)?;
        delay.delay_ms(timings.post_reset_ms);
        log::debug!("ili9341: hardware reset done");

        self.command(Command::VcomControl1, &[config.vcom_high, config.vcom_low])?;
        self.command(Command::MemoryAccessControl, &[config.memory_access])?;
        self.apply_landscape(config.landscape);
        self.command(Command::PixelFormatSet, &[PIXEL_FORMAT_RGB565])?;

        self.command(Command::SleepModeOff, &[])?;
        // Oscillator and supplies need to settle after Sleep Out
        delay.delay_ms(timings.sleep_out_ms);
        self.command(Command::DisplayOn, &[])?;
        self.state = State::Idle;

        if config.memory_write_after_init {
            self.command(Command::MemoryWrite, &[])?;
            self.state = State::WindowSet;
        }
        log::debug!(
            "ili9341: init done, madctl {:#04x}, {}x{}",
            config.memory_access,
            self.width(),
            self.height()
        );
        Ok(())
    }

    /// Control the backlight line. Works in any state.
    pub fn backlight(&mut self, mode: ModeState) -> Result {
        let level = match mode {
            ModeState::On => self.backlight.set_high(),
            ModeState::Off => self.backlight.set_low(),
        };
        level.map_err(|_| Error::Backlight)
    }
}

impl<IFACE, RESET, BL> Ili9341<IFACE, RESET, BL>
where
    IFACE: WriteOnlyDataCommand,
{
    fn command(&mut self, cmd: Command, args: &[u8]) -> Result {
        self.interface.send_commands(U8Iter(&mut once(cmd as u8)))?;
        self.interface.send_data(U8Iter(&mut args.iter().cloned()))?;
        Ok(())
    }

    /// Any command other than pixel data ends a Memory Write, so the window is gone
    /// afterwards.
    fn control(&mut self, cmd: Command, args: &[u8]) -> Result {
        self.require_initialized()?;
        self.state = State::Idle;
        self.command(cmd, args)
    }

    /// Target the rectangle `row_start..=row_end` x `col_start..=col_end` of GRAM and issue
    /// Memory Write, so subsequent [`Ili9341::write_pixels`] calls fill it.
    ///
    /// Rows go on the column address axis (`0x2A`) and columns on the page address axis
    /// (`0x2B`), each sent as big-endian start and end.
    pub fn set_address_window(
        &mut self,
        row_start: u16,
        row_end: u16,
        col_start: u16,
        col_end: u16,
    ) -> Result {
        self.require_initialized()?;
        check_axis(row_start, row_end)?;
        check_axis(col_start, col_end)?;
        log::trace!(
            "ili9341: window rows {}..={} cols {}..={}",
            row_start,
            row_end,
            col_start,
            col_end
        );

        self.state = State::Idle;
        self.command(Command::ColumnAddressSet, &address_bytes(row_start, row_end))?;
        self.command(Command::PageAddressSet, &address_bytes(col_start, col_end))?;
        self.command(Command::MemoryWrite, &[])?;
        self.state = State::WindowSet;
        Ok(())
    }

    /// Stream rgb565 values into the active window, high byte first.
    ///
    /// The window stays active, so consecutive calls continue where the last one stopped.
    pub fn write_pixels<I: IntoIterator<Item = u16>>(&mut self, data: I) -> Result {
        self.require_window()?;
        self.interface.send_data(U16BEIter(&mut data.into_iter()))?;
        Ok(())
    }

    /// Write `count` pixels of one color into the active window.
    pub fn fill_window(&mut self, color: u16, count: usize) -> Result {
        self.write_pixels(repeat(color).take(count))
    }

    /// Set a single pixel.
    ///
    /// Re-targets a window at `(x, y)` every time, so it costs 13 transport writes per
    /// pixel; use [`Ili9341::set_address_window`] and [`Ili9341::write_pixels`] for areas.
    pub fn draw_pixel(&mut self, x: u16, y: u16, color: u16) -> Result {
        self.set_address_window(y, y.saturating_add(1), x, x.saturating_add(1))?;
        self.write_pixels(once(color))
    }

    /// Draw a rectangle on the screen, represented by corner (x0, y0) and opposite corner
    /// (x1, y1).
    ///
    /// The border is included.
    ///
    /// This method accepts an iterator of rgb565 pixel values, consumed along `y` first.
    ///
    /// The iterator is useful to avoid wasting memory by holding a buffer for
    /// the whole screen when it is not necessary.
    pub fn draw_raw_iter<I: IntoIterator<Item = u16>>(
        &mut self,
        x0: u16,
        y0: u16,
        x1: u16,
        y1: u16,
        data: I,
    ) -> Result {
        self.set_address_window(y0, y1, x0, x1)?;
        self.write_pixels(data)
    }

    /// Draw a rectangle on the screen, represented by corner (x0, y0) and opposite corner
    /// (x1, y1).
    ///
    /// The border is included.
    ///
    /// This method accepts a raw buffer of words that will be copied to the screen
    /// video memory.
    ///
    /// The expected format is rgb565.
    pub fn draw_raw_slice(&mut self, x0: u16, y0: u16, x1: u16, y1: u16, data: &[u16]) -> Result {
        self.draw_raw_iter(x0, y0, x1, y1, data.iter().copied())
    }

    /// Fill a rectangle, border included, with one rgb565 color.
    pub fn fill_rect(&mut self, x0: u16, y0: u16, x1: u16, y1: u16, color: u16) -> Result {
        self.set_address_window(y0, y1, x0, x1)?;
        // One run per page; a full 65536 x 65536 window does not fit a 32-bit count.
        let run = (y1 - y0) as usize + 1;
        let pages = x1 as u32 - x0 as u32 + 1;
        self.write_pixels((0..pages).flat_map(move |_| repeat(color).take(run)))
    }

    /// Fill entire screen with specified color u16 value
    pub fn clear_screen(&mut self, color: u16) -> Result {
        self.fill_rect(0, 0, self.width() - 1, self.height() - 1, color)
    }

    /// Change the orientation of the screen
    pub fn set_orientation<MODE>(&mut self, mode: MODE) -> Result
    where
        MODE: Mode,
    {
        self.control(Command::MemoryAccessControl, &[mode.mode()])?;
        self.apply_landscape(mode.is_landscape());
        Ok(())
    }

    /// Configures the screen for hardware-accelerated vertical scrolling.
    ///
    /// Scrolling runs along the native page axis; `fixed_top_lines` and
    /// `fixed_bottom_lines` stay in place and must fit on the panel together.
    pub fn configure_vertical_scroll(
        &mut self,
        fixed_top_lines: u16,
        fixed_bottom_lines: u16,
    ) -> Result<Scroller> {
        let height = self.native_pages;
        let scroll_lines = height
            .checked_sub(fixed_top_lines)
            .and_then(|rest| rest.checked_sub(fixed_bottom_lines))
            .ok_or(Error::InvalidScrollArea {
                fixed_top: fixed_top_lines,
                fixed_bottom: fixed_bottom_lines,
            })?;

        self.control(
            Command::VerticalScrollDefine,
            &[
                (fixed_top_lines >> 8) as u8,
                (fixed_top_lines & 0xff) as u8,
                (scroll_lines >> 8) as u8,
                (scroll_lines & 0xff) as u8,
                (fixed_bottom_lines >> 8) as u8,
                (fixed_bottom_lines & 0xff) as u8,
            ],
        )?;

        Ok(Scroller::new(fixed_top_lines, fixed_bottom_lines, height))
    }

    /// Advance the scrolling area by `num_lines`, wrapping inside it.
    pub fn scroll_vertically(&mut self, scroller: &mut Scroller, num_lines: u16) -> Result {
        let scroll_lines = scroller.height - scroller.fixed_top_lines - scroller.fixed_bottom_lines;
        if scroll_lines > 0 {
            let offset = (scroller.top_offset - scroller.fixed_top_lines) as u32 + num_lines as u32;
            scroller.top_offset = scroller.fixed_top_lines + (offset % scroll_lines as u32) as u16;
        }

        self.control(
            Command::VerticalScrollAddr,
            &[
                (scroller.top_offset >> 8) as u8,
                (scroller.top_offset & 0xff) as u8,
            ],
        )
    }

    /// Control the screen sleep mode:
    pub fn sleep_mode(&mut self, mode: ModeState) -> Result {
        match mode {
            ModeState::On => self.control(Command::SleepModeOn, &[]),
            ModeState::Off => self.control(Command::SleepModeOff, &[]),
        }
    }

    /// Control the screen display mode
    pub fn display_mode(&mut self, mode: ModeState) -> Result {
        match mode {
            ModeState::On => self.control(Command::DisplayOn, &[]),
            ModeState::Off => self.control(Command::DisplayOff, &[]),
        }
    }

    /// Invert the pixel color on screen
    pub fn invert_mode(&mut self, mode: ModeState) -> Result {
        match mode {
            ModeState::On => self.control(Command::InvertOn, &[]),
            ModeState::Off => self.control(Command::InvertOff, &[]),
        }
    }

    /// Idle mode reduces the number of colors to 8
    pub fn idle_mode(&mut self, mode: ModeState) -> Result {
        match mode {
            ModeState::On => self.control(Command::IdleModeOn, &[]),
            ModeState::Off => self.control(Command::IdleModeOff, &[]),
        }
    }
}

fn check_axis(start: u16, end: u16) -> Result {
    if start > end {
        return Err(Error::InvalidWindow { start, end });
    }
    Ok(())
}

/// Big-endian start and end of one window axis.
fn address_bytes(start: u16, end: u16) -> [u8; 4] {
    [
        (start >> 8) as u8,
        (start & 0xff) as u8,
        (end >> 8) as u8,
        (end & 0xff) as u8,
    ]
}

/// Scroller must be provided in order to scroll the screen. It can only be obtained
/// by configuring the screen for scrolling.
pub struct Scroller {
    top_offset: u16,
    fixed_bottom_lines: u16,
    fixed_top_lines: u16,
    height: u16,
}

impl Scroller {
    fn new(fixed_top_lines: u16, fixed_bottom_lines: u16, height: u16) -> Scroller {
        Scroller {
            top_offset: fixed_top_lines,
            fixed_top_lines,
            fixed_bottom_lines,
            height,
        }
    }

    /// The page address currently shown first in the scrolling area.
    pub fn top_offset(&self) -> u16 {
        self.top_offset
    }
}

#[derive(Clone, Copy)]
enum Command {
    SleepModeOn = 0x10,
    SleepModeOff = 0x11,
    InvertOff = 0x20,
    InvertOn = 0x21,
    DisplayOff = 0x28,
    DisplayOn = 0x29,
    ColumnAddressSet = 0x2a,
    PageAddressSet = 0x2b,
    MemoryWrite = 0x2c,
    VerticalScrollDefine = 0x33,
    MemoryAccessControl = 0x36,
    VerticalScrollAddr = 0x37,
    IdleModeOff = 0x38,
    IdleModeOn = 0x39,
    PixelFormatSet = 0x3a,
    VcomControl1 = 0xc5,
}
