//! Bit-banged serial transport for the ILI9341.
//!
//! The controller is wired with four lines besides reset and backlight: an active-low
//! chip select, a mode line (RS, low for commands and high for data), a serial data line
//! and a bit clock. Each byte is shifted out MSB first; the controller samples the data
//! line on the rising edge of the clock. Every byte is gated by its own chip-select pulse,
//! so a byte is the unit of one transport call.
//!
//! [`BitBangInterface`] implements [`WriteOnlyDataCommand`], so it plugs into
//! [`Ili9341`](crate::Ili9341) the same way a hardware SPI interface would.

use display_interface::{DataFormat, DisplayError, WriteOnlyDataCommand};
use embedded_hal::digital::v2::OutputPin;

/// Level of the mode (RS) line while a byte is clocked out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ByteKind {
    /// RS low
    Command,
    /// RS high
    Data,
}

/// Two-wire (clock + data) transport with mode and chip-select lines, driven by GPIO.
pub struct BitBangInterface<CS, RS, SDA, SCL> {
    cs: CS,
    rs: RS,
    sda: SDA,
    scl: SCL,
}

impl<CS, RS, SDA, SCL> BitBangInterface<CS, RS, SDA, SCL>
where
    CS: OutputPin,
    RS: OutputPin,
    SDA: OutputPin,
    SCL: OutputPin,
{
    /// Take ownership of the four transport lines and park them at their idle-high level.
    pub fn new(cs: CS, rs: RS, sda: SDA, scl: SCL) -> Result<Self, DisplayError> {
        let mut iface = BitBangInterface { cs, rs, sda, scl };
        iface.cs.set_high().map_err(|_| DisplayError::CSError)?;
        iface.rs.set_high().map_err(|_| DisplayError::DCError)?;
        iface.sda.set_high().map_err(|_| DisplayError::BusWriteError)?;
        iface.scl.set_high().map_err(|_| DisplayError::BusWriteError)?;
        Ok(iface)
    }

    /// Shift one byte out, most significant bit first.
    ///
    /// For each bit the clock is pulled low, the data line is set, and the clock is raised,
    /// so the data line never changes while the clock is high. The clock is left high.
    /// Chip select and mode are not touched.
    pub fn write_byte(&mut self, value: u8) -> Result<(), DisplayError> {
        for bit in (0..8).rev() {
            self.scl.set_low().map_err(|_| DisplayError::BusWriteError)?;
            let level = if (value >> bit) & 0b1 == 1 {
                self.sda.set_high()
            } else {
                self.sda.set_low()
            };
            level.map_err(|_| DisplayError::BusWriteError)?;
            self.scl.set_high().map_err(|_| DisplayError::BusWriteError)?;
        }
        Ok(())
    }

    /// Send a single command byte in its own chip-select frame.
    pub fn write_command(&mut self, opcode: u8) -> Result<(), DisplayError> {
        self.write_frame(ByteKind::Command, opcode)
    }

    /// Send a single data byte in its own chip-select frame.
    pub fn write_data(&mut self, byte: u8) -> Result<(), DisplayError> {
        self.write_frame(ByteKind::Data, byte)
    }

    fn write_frame(&mut self, kind: ByteKind, byte: u8) -> Result<(), DisplayError> {
        self.cs.set_low().map_err(|_| DisplayError::CSError)?;
        let mode = match kind {
            ByteKind::Command => self.rs.set_low(),
            ByteKind::Data => self.rs.set_high(),
        };
        let sent = mode
            .map_err(|_| DisplayError::DCError)
            .and_then(|()| self.write_byte(byte));
        // Release the bus even if the byte failed halfway.
        let released = self.cs.set_high().map_err(|_| DisplayError::CSError);
        sent.and(released)
    }

    fn write_words(
        &mut self,
        kind: ByteKind,
        words: &mut dyn Iterator<Item = u16>,
        split: fn(u16) -> [u8; 2],
    ) -> Result<(), DisplayError> {
        for word in words {
            for byte in split(word) {
                self.write_frame(kind, byte)?;
            }
        }
        Ok(())
    }

    fn write_format(&mut self, kind: ByteKind, buf: DataFormat<'_>) -> Result<(), DisplayError> {
        match buf {
            DataFormat::U8(bytes) => {
                for &byte in bytes {
                    self.write_frame(kind, byte)?;
                }
                Ok(())
            }
            DataFormat::U8Iter(bytes) => {
                for byte in bytes {
                    self.write_frame(kind, byte)?;
                }
                Ok(())
            }
            DataFormat::U16(words) => {
                self.write_words(kind, &mut words.iter().copied(), u16::to_ne_bytes)
            }
            DataFormat::U16BE(words) => {
                self.write_words(kind, &mut words.iter().copied(), u16::to_be_bytes)
            }
            DataFormat::U16LE(words) => {
                self.write_words(kind, &mut words.iter().copied(), u16::to_le_bytes)
            }
            DataFormat::U16BEIter(words) => self.write_words(kind, words, u16::to_be_bytes),
            DataFormat::U16LEIter(words) => self.write_words(kind, words, u16::to_le_bytes),
            _ => Err(DisplayError::DataFormatNotImplemented),
        }
    }
}

impl<CS, RS, SDA, SCL> BitBangInterface<CS, RS, SDA, SCL> {
    /// Give the lines back.
    pub fn release(self) -> (CS, RS, SDA, SCL) {
        (self.cs, self.rs, self.sda, self.scl)
    }
}

impl<CS, RS, SDA, SCL> WriteOnlyDataCommand for BitBangInterface<CS, RS, SDA, SCL>
where
    CS: OutputPin,
    RS: OutputPin,
    SDA: OutputPin,
    SCL: OutputPin,
{
    fn send_commands(&mut self, cmds: DataFormat<'_>) -> Result<(), DisplayError> {
        self.write_format(ByteKind::Command, cmds)
    }

    fn send_data(&mut self, buf: DataFormat<'_>) -> Result<(), DisplayError> {
        self.write_format(ByteKind::Data, buf)
    }
}
