//! The driver talks to any `WriteOnlyDataCommand`. A hardware SPI transport and the
//! bit-banged one must put the same (mode, byte) stream on the wire.

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

use display_interface_spi::SPIInterface;
use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::blocking::spi;
use embedded_hal::digital::v2::OutputPin;

use ili9341_bitbang::{BitBangInterface, Config, DisplaySize240x320, Ili9341, State};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Wire {
    Cmd(u8),
    Data(u8),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Line {
    Cs,
    Mode,
    Sda,
    Scl,
}

#[derive(Default)]
struct Bus {
    cs: bool,
    mode: bool,
    sda: bool,
    scl: bool,
    bits: u32,
    byte: u8,
    wire: Vec<Wire>,
}

impl Bus {
    fn new() -> Rc<RefCell<Bus>> {
        Rc::new(RefCell::new(Bus {
            cs: true,
            mode: true,
            sda: true,
            scl: true,
            ..Bus::default()
        }))
    }

    fn latch(&mut self, byte: u8) {
        self.wire.push(if self.mode {
            Wire::Data(byte)
        } else {
            Wire::Cmd(byte)
        });
    }

    fn set(&mut self, line: Line, level: bool) {
        match line {
            Line::Cs => {
                if !self.cs && level && self.bits > 0 {
                    assert_eq!(self.bits, 8);
                    let byte = self.byte;
                    self.latch(byte);
                }
                self.bits = 0;
                self.byte = 0;
                self.cs = level;
            }
            Line::Mode => self.mode = level,
            Line::Sda => self.sda = level,
            Line::Scl => {
                if !self.cs && !self.scl && level {
                    self.byte = (self.byte << 1) | self.sda as u8;
                    self.bits += 1;
                }
                self.scl = level;
            }
        }
    }
}

struct BusPin {
    line: Line,
    bus: Rc<RefCell<Bus>>,
}

impl OutputPin for BusPin {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.bus.borrow_mut().set(self.line, false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.bus.borrow_mut().set(self.line, true);
        Ok(())
    }
}

/// Hardware SPI stand-in: latches whole bytes with the current mode line level.
struct BusSpi {
    bus: Rc<RefCell<Bus>>,
}

impl spi::Write<u8> for BusSpi {
    type Error = Infallible;

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        let mut bus = self.bus.borrow_mut();
        assert!(!bus.cs, "SPI write outside chip select");
        for &byte in words {
            bus.latch(byte);
        }
        Ok(())
    }
}

struct Idle;

impl OutputPin for Idle {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

struct NoDelay;

impl DelayMs<u8> for NoDelay {
    fn delay_ms(&mut self, _ms: u8) {}
}

fn pin(bus: &Rc<RefCell<Bus>>, line: Line) -> BusPin {
    BusPin {
        line,
        bus: bus.clone(),
    }
}

fn exercise<IFACE>(display: &mut Ili9341<IFACE, Idle, Idle>)
where
    IFACE: display_interface::WriteOnlyDataCommand,
{
    display.init(&mut NoDelay, &Config::default()).unwrap();
    assert_eq!(display.state(), State::Idle);
    display.draw_pixel(10, 300, 0xF81F).unwrap();
    display
        .draw_raw_slice(0, 0, 1, 1, &[0x0001, 0x0203, 0x0405, 0x0607])
        .unwrap();
    display.fill_rect(100, 50, 139, 89, 0x07E0).unwrap();
}

fn bit_banged() -> Vec<Wire> {
    let bus = Bus::new();
    let iface = BitBangInterface::new(
        pin(&bus, Line::Cs),
        pin(&bus, Line::Mode),
        pin(&bus, Line::Sda),
        pin(&bus, Line::Scl),
    )
    .unwrap();
    let mut display = Ili9341::new(iface, Idle, Idle, DisplaySize240x320);
    exercise(&mut display);
    let wire = bus.borrow().wire.clone();
    wire
}

fn hardware_spi() -> Vec<Wire> {
    let bus = Bus::new();
    let iface = SPIInterface::new(
        BusSpi { bus: bus.clone() },
        pin(&bus, Line::Mode),
        pin(&bus, Line::Cs),
    );
    let mut display = Ili9341::new(iface, Idle, Idle, DisplaySize240x320);
    exercise(&mut display);
    let wire = bus.borrow().wire.clone();
    wire
}

#[test]
fn init_opens_with_reference_sequence() {
    let wire = bit_banged();
    assert_eq!(
        wire[..9],
        [
            Wire::Cmd(0xC5),
            Wire::Data(0x54),
            Wire::Data(0x00),
            Wire::Cmd(0x36),
            Wire::Data(0x04),
            Wire::Cmd(0x3A),
            Wire::Data(0x55),
            Wire::Cmd(0x11),
            Wire::Cmd(0x29),
        ]
    );
}

#[test]
fn pixel_bytes_follow_init() {
    let wire = bit_banged();
    assert_eq!(
        wire[9..22],
        [
            Wire::Cmd(0x2A),
            Wire::Data(0x01),
            Wire::Data(0x2C),
            Wire::Data(0x01),
            Wire::Data(0x2D),
            Wire::Cmd(0x2B),
            Wire::Data(0x00),
            Wire::Data(0x0A),
            Wire::Data(0x00),
            Wire::Data(0x0B),
            Wire::Cmd(0x2C),
            Wire::Data(0xF8),
            Wire::Data(0x1F),
        ]
    );
}

#[test]
fn spi_and_bit_bang_put_the_same_bytes_on_the_wire() {
    let bit_banged = bit_banged();
    let hardware = hardware_spi();
    // init + pixel + 2x2 slice + 40x40 rectangle
    assert_eq!(bit_banged.len(), 9 + 13 + (11 + 8) + (11 + 40 * 40 * 2));
    assert_eq!(bit_banged, hardware);
}
