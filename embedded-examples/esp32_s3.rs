//! Bring up an ILI9341 panel on an ESP32-S3, with the serial bus bit-banged on plain GPIOs.
//!
//! Wiring: GPIO38 chip select, GPIO4 RS, GPIO48 SDA, GPIO45 SCL, GPIO5 reset and GPIO6
//! backlight. Build it as a binary in a project that depends on `esp32s3-hal`,
//! `esp-backtrace` and `xtensa-lx-rt`.

#![no_main]
#![no_std]

use core::fmt::Write;

use embedded_graphics::{
    mono_font::{ascii::FONT_6X10, MonoTextStyle},
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
    text::{Alignment, Text},
};
use esp32s3_hal::{
    clock::ClockControl, gpio::IO, pac::Peripherals, prelude::*, timer::TimerGroup, Delay, Rtc,
    Serial,
};
use esp_backtrace as _;
use ili9341_bitbang::{BitBangInterface, Config, DisplaySize240x320, Ili9341, Orientation};
use xtensa_lx_rt::entry;

#[entry]
fn main() -> ! {
    let peripherals = Peripherals::take().unwrap();
    let system = peripherals.DPORT.split();
    let clocks = ClockControl::boot_defaults(system.clock_control).freeze();

    let timer_group0 = TimerGroup::new(peripherals.TIMG0, &clocks);
    let mut wdt = timer_group0.wdt;
    let mut serial0 = Serial::new(peripherals.UART0);
    let mut rtc = Rtc::new(peripherals.RTC_CNTL);

    // Disable watchdog timer
    wdt.disable();
    rtc.rwdt.disable();

    let io = IO::new(peripherals.GPIO, peripherals.IO_MUX);
    let mut delay = Delay::new(&clocks);

    let cs = io.pins.gpio38.into_push_pull_output();
    let rs = io.pins.gpio4.into_push_pull_output();
    let sda = io.pins.gpio48.into_push_pull_output();
    let scl = io.pins.gpio45.into_push_pull_output();
    let reset = io.pins.gpio5.into_push_pull_output();
    let backlight = io.pins.gpio6.into_push_pull_output();

    let iface = BitBangInterface::new(cs, rs, sda, scl).unwrap();
    let mut lcd = Ili9341::new(iface, reset, backlight, DisplaySize240x320);

    writeln!(serial0, "Resetting display").unwrap();
    lcd.init(&mut delay, &Config::new().memory_access(Orientation::Portrait))
        .unwrap();

    lcd.clear_screen(0x0000).unwrap();
    lcd.fill_rect(10, 10, 49, 49, 0xF800).unwrap();
    for i in 0..100 {
        lcd.draw_pixel(60 + i, 60 + i, 0xFFFF).unwrap();
    }

    Rectangle::new(Point::new(20, 120), Size::new(200, 60))
        .into_styled(PrimitiveStyle::with_stroke(Rgb565::GREEN, 2))
        .draw(&mut lcd)
        .unwrap();

    let style = MonoTextStyle::new(&FONT_6X10, Rgb565::RED);
    Text::with_alignment(
        "First line\nSecond line",
        Point::new(120, 150),
        style,
        Alignment::Center,
    )
    .draw(&mut lcd)
    .unwrap();

    writeln!(serial0, "Frame drawn").unwrap();

    loop {}
}
