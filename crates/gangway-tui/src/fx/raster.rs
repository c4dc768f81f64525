use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;

/// One visible cell lifted out of the rendered card: the glyph plus the
/// foreground style it was drawn with. Background is deliberately left
/// behind so scattered fragments pick up whatever backdrop they fly
/// over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CellPixel {
    pub(crate) symbol: char,
    pub(crate) style: Style,
}

/// Snapshot of a card region at capture time, cell-resolution.
#[derive(Debug, Clone)]
pub(crate) struct Raster {
    width: u16,
    height: u16,
    cells: Vec<Option<CellPixel>>,
}

impl Raster {
    pub(crate) fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width as usize * height as usize],
        }
    }

    pub(crate) fn width(&self) -> u16 {
        self.width
    }

    pub(crate) fn height(&self) -> u16 {
        self.height
    }

    fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub(crate) fn get(&self, x: u16, y: u16) -> Option<CellPixel> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells[self.index(x, y)]
    }

    pub(crate) fn set(&mut self, x: u16, y: u16, pixel: CellPixel) {
        if x < self.width && y < self.height {
            let index = self.index(x, y);
            self.cells[index] = Some(pixel);
        }
    }

    /// True when nothing visible was captured; the dissolve degrades to
    /// an immediate navigation in that case.
    pub(crate) fn is_blank(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }
}

/// Capture port between the rendered frame and the dissolve engine.
/// Production captures straight from the frame buffer; tests hand the
/// engine synthetic rasters instead.
pub(crate) trait Rasterizer {
    fn capture(&self, buffer: &Buffer, area: Rect) -> Option<Raster>;
}

#[derive(Debug, Default)]
pub(crate) struct BufferRasterizer;

impl Rasterizer for BufferRasterizer {
    fn capture(&self, buffer: &Buffer, area: Rect) -> Option<Raster> {
        let area = area.intersection(buffer.area);
        if area.width == 0 || area.height == 0 {
            return None;
        }

        let mut raster = Raster::new(area.width, area.height);
        for y in 0..area.height {
            for x in 0..area.width {
                let Some(cell) = buffer.cell((area.x + x, area.y + y)) else {
                    continue;
                };
                let symbol = cell.symbol().chars().next().unwrap_or(' ');
                if symbol == ' ' {
                    continue;
                }
                raster.set(
                    x,
                    y,
                    CellPixel {
                        symbol,
                        style: Style::default().fg(cell.fg).add_modifier(cell.modifier),
                    },
                );
            }
        }

        Some(raster)
    }
}

#[cfg(test)]
mod tests {
    use ratatui::style::{Color, Style};

    use super::*;

    fn styled(symbol: char) -> CellPixel {
        CellPixel {
            symbol,
            style: Style::default().fg(Color::White),
        }
    }

    #[test]
    fn captures_only_visible_cells() {
        let area = Rect::new(0, 0, 10, 3);
        let mut buffer = Buffer::empty(area);
        buffer.set_string(2, 1, "hi", Style::default().fg(Color::Cyan));

        let raster = BufferRasterizer
            .capture(&buffer, area)
            .expect("non-empty area");

        assert_eq!(raster.get(2, 1).expect("captured").symbol, 'h');
        assert_eq!(raster.get(3, 1).expect("captured").symbol, 'i');
        assert!(raster.get(0, 0).is_none());
        assert!(!raster.is_blank());
    }

    #[test]
    fn zero_sized_area_captures_nothing() {
        let buffer = Buffer::empty(Rect::new(0, 0, 10, 3));
        assert!(
            BufferRasterizer
                .capture(&buffer, Rect::new(0, 0, 0, 3))
                .is_none()
        );
    }

    #[test]
    fn capture_area_is_clipped_to_the_buffer() {
        let buffer = Buffer::empty(Rect::new(0, 0, 5, 5));
        let raster = BufferRasterizer
            .capture(&buffer, Rect::new(3, 3, 10, 10))
            .expect("clipped capture");

        assert_eq!(raster.width(), 2);
        assert_eq!(raster.height(), 2);
        assert!(raster.is_blank());
    }

    #[test]
    fn out_of_bounds_set_and_get_are_safe() {
        let mut raster = Raster::new(4, 2);
        raster.set(10, 10, styled('x'));
        assert!(raster.get(10, 10).is_none());
        assert!(raster.is_blank());
    }
}
