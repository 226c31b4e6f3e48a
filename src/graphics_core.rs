//! [`DrawTarget`] support for embedded-graphics.
//!
//! The draw target uses the controller's native raster: embedded-graphics `x` is the
//! column address and `y` the page address. Column addresses advance first while pixel
//! data streams in, which matches the row-major order embedded-graphics produces, so
//! rectangles go out as one window and one pixel stream.

use display_interface::WriteOnlyDataCommand;
use embedded_graphics_core::draw_target::DrawTarget;
use embedded_graphics_core::{
    pixelcolor::{raw::RawU16, Rgb565},
    prelude::*,
    primitives::Rectangle,
};

use crate::{Error, Ili9341};

impl<IFACE, RESET, BL> OriginDimensions for Ili9341<IFACE, RESET, BL> {
    fn size(&self) -> Size {
        Size::new(self.columns as u32, self.pages as u32)
    }
}

impl<IFACE, RESET, BL> Ili9341<IFACE, RESET, BL>
where
    IFACE: WriteOnlyDataCommand,
{
    /// Window in raster coordinates; the caller has clipped it to the screen.
    fn raster_window(&mut self, area: &Rectangle) -> Result<bool, Error> {
        match area.bottom_right() {
            Some(bottom_right) => {
                self.set_address_window(
                    area.top_left.x as u16,
                    bottom_right.x as u16,
                    area.top_left.y as u16,
                    bottom_right.y as u16,
                )?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl<IFACE, RESET, BL> DrawTarget for Ili9341<IFACE, RESET, BL>
where
    IFACE: WriteOnlyDataCommand,
{
    type Error = Error;

    type Color = Rgb565;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if self.bounding_box().contains(point) {
                let x = point.x as u16;
                let y = point.y as u16;

                self.set_address_window(x, x, y, y)?;
                self.write_pixels(core::iter::once(RawU16::from(color).into_inner()))?;
            }
        }
        Ok(())
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        let drawable_area = area.intersection(&self.bounding_box());

        if !self.raster_window(&drawable_area)? {
            // No pixels are on screen
            return Ok(());
        }

        if area == &drawable_area {
            // All pixels are on screen
            self.write_pixels(colors.into_iter().map(|color| RawU16::from(color).into_inner()))
        } else {
            // Some pixels are on screen
            self.write_pixels(
                area.points()
                    .zip(colors)
                    .filter(|(point, _)| drawable_area.contains(*point))
                    .map(|(_, color)| RawU16::from(color).into_inner()),
            )
        }
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let drawable_area = area.intersection(&self.bounding_box());

        if self.raster_window(&drawable_area)? {
            let count = drawable_area.size.width as usize * drawable_area.size.height as usize;
            self.fill_window(RawU16::from(color).into_inner(), count)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use crate::interface::test_spy::Sent::{Cmd, Data};
    use crate::interface::test_spy::{NoPin, Recorder, Sent, Spy};
    use crate::{Config, DisplaySize240x320, Error, Ili9341, Orientation};

    use embedded_graphics::{
        pixelcolor::Rgb565,
        prelude::*,
        primitives::{PrimitiveStyle, Rectangle},
    };

    fn display() -> Ili9341<Recorder, NoPin, NoPin> {
        let mut display = Ili9341::new(Recorder::new(), NoPin, NoPin, DisplaySize240x320);
        display
            .init(&mut Spy::new().delay(), &Config::default())
            .unwrap();
        display.interface.sent.clear();
        display
    }

    fn window(x0: u8, y0: u16, x1: u8, y1: u16) -> [Sent; 11] {
        [
            Cmd(0x2A),
            Data(0x00),
            Data(x0),
            Data(0x00),
            Data(x1),
            Cmd(0x2B),
            Data((y0 >> 8) as u8),
            Data(y0 as u8),
            Data((y1 >> 8) as u8),
            Data(y1 as u8),
            Cmd(0x2C),
        ]
    }

    #[test]
    fn size_is_native_raster() {
        let mut display = display();
        assert_eq!(display.size(), Size::new(240, 320));
        display.set_orientation(Orientation::Landscape).unwrap();
        assert_eq!(display.size(), Size::new(320, 240));
    }

    #[test]
    fn size_is_transposed_against_width_and_height() {
        let mut display = display();
        for landscape in [false, true] {
            if landscape {
                display.set_orientation(Orientation::Landscape).unwrap();
            }
            let size = display.size();
            assert_eq!(size.width, display.height() as u32);
            assert_eq!(size.height, display.width() as u32);
        }
    }

    #[test]
    fn pixel_gets_exact_window() {
        let mut display = display();
        Pixel(Point::new(5, 300), Rgb565::BLUE)
            .draw(&mut display)
            .unwrap();

        let sent = &display.interface.sent;
        assert_eq!(sent[..11], window(5, 300, 5, 300));
        assert_eq!(sent[11..], [Data(0x00), Data(0x1F)]);
    }

    #[test]
    fn off_screen_pixels_are_skipped() {
        let mut display = display();
        Pixel(Point::new(240, 0), Rgb565::RED)
            .draw(&mut display)
            .unwrap();
        Pixel(Point::new(-1, 10), Rgb565::RED)
            .draw(&mut display)
            .unwrap();
        assert!(display.interface.sent.is_empty());
    }

    #[test]
    fn filled_rectangle_is_one_window() {
        let mut display = display();
        Rectangle::new(Point::new(2, 3), Size::new(4, 5))
            .into_styled(PrimitiveStyle::with_fill(Rgb565::RED))
            .draw(&mut display)
            .unwrap();

        let sent = &display.interface.sent;
        assert_eq!(sent[..11], window(2, 3, 5, 7));
        assert_eq!(sent[11..].len(), 4 * 5 * 2);
        assert!(sent[11..]
            .chunks(2)
            .all(|px| px == [Data(0xF8), Data(0x00)]));
    }

    #[test]
    fn contiguous_fill_is_clipped() {
        let mut display = display();
        let area = Rectangle::new(Point::new(238, 0), Size::new(4, 1));
        let colors = [Rgb565::RED, Rgb565::GREEN, Rgb565::BLUE, Rgb565::WHITE];
        display.fill_contiguous(&area, colors).unwrap();

        let sent = &display.interface.sent;
        assert_eq!(sent[..11], window(238, 0, 239, 0));
        assert_eq!(
            sent[11..],
            [Data(0xF8), Data(0x00), Data(0x07), Data(0xE0)]
        );
    }

    #[test]
    fn clear_fills_every_pixel() {
        let mut display = display();
        display.clear(Rgb565::BLACK).unwrap();

        let sent = &display.interface.sent;
        assert_eq!(sent[..11], window(0, 0, 239, 319));
        assert_eq!(sent.len(), 11 + 240 * 320 * 2);
    }

    #[test]
    fn drawing_before_init_fails() {
        let mut display = Ili9341::new(Recorder::new(), NoPin, NoPin, DisplaySize240x320);
        assert_eq!(
            display.clear(Rgb565::BLACK),
            Err(Error::NotInitialized)
        );
    }
}
