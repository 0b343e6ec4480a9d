use ratatui::prelude::*;

/// A grid of styled cells that a logical game board is scaled onto.
///
/// Games draw in their own board units (pixels or tiles); the raster maps
/// them to terminal cells and turns the result into `Line`s.
pub struct Raster {
    cols: usize,
    rows: usize,
    sx: f32,
    sy: f32,
    cells: Vec<(char, Style)>,
}

impl Raster {
    pub fn new(cols: usize, rows: usize, board_w: f32, board_h: f32, bg: Color) -> Self {
        let sx = if board_w > 0.0 { cols as f32 / board_w } else { 0.0 };
        let sy = if board_h > 0.0 { rows as f32 / board_h } else { 0.0 };
        Self {
            cols,
            rows,
            sx,
            sy,
            cells: vec![(' ', Style::default().bg(bg)); cols * rows],
        }
    }

    pub fn from_area(area: Rect, board_w: f32, board_h: f32, bg: Color) -> Self {
        Self::new(area.width as usize, area.height as usize, board_w, board_h, bg)
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Cell containing a board point, if it is on screen
    pub fn to_cell(&self, x: f32, y: f32) -> Option<(usize, usize)> {
        let cx = (x * self.sx).floor();
        let cy = (y * self.sy).floor();
        if cx < 0.0 || cy < 0.0 {
            return None;
        }
        let (cx, cy) = (cx as usize, cy as usize);
        (cx < self.cols && cy < self.rows).then_some((cx, cy))
    }

    /// Write one cell. A style without a background keeps the cell's background.
    pub fn put(&mut self, col: usize, row: usize, ch: char, style: Style) {
        if col >= self.cols || row >= self.rows {
            return;
        }
        let cell = &mut self.cells[row * self.cols + col];
        let bg = style.bg.or(cell.1.bg);
        let mut style = style;
        style.bg = bg;
        *cell = (ch, style);
    }

    pub fn plot(&mut self, x: f32, y: f32, ch: char, style: Style) {
        if let Some((col, row)) = self.to_cell(x, y) {
            self.put(col, row, ch, style);
        }
    }

    /// Fill the cells covered by a board rectangle. Anything touching the
    /// board gets at least one cell; rectangles fully off it draw nothing.
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, ch: char, style: Style) {
        if x + w <= 0.0 || y + h <= 0.0 {
            return;
        }
        let c0 = (x * self.sx).floor().max(0.0);
        let r0 = (y * self.sy).floor().max(0.0);
        if c0 >= self.cols as f32 || r0 >= self.rows as f32 {
            return;
        }
        let c1 = ((x + w) * self.sx).ceil().max(c0 + 1.0);
        let r1 = ((y + h) * self.sy).ceil().max(r0 + 1.0);
        let c1 = (c1 as usize).min(self.cols);
        let r1 = (r1 as usize).min(self.rows);
        for row in r0 as usize..r1 {
            for col in c0 as usize..c1 {
                self.put(col, row, ch, style);
            }
        }
    }

    /// Write text starting at a cell, clipped to the raster
    pub fn text(&mut self, col: usize, row: usize, text: &str, style: Style) {
        for (i, ch) in text.chars().enumerate() {
            self.put(col + i, row, ch, style);
        }
    }

    pub fn char_at(&self, col: usize, row: usize) -> Option<char> {
        (col < self.cols && row < self.rows).then(|| self.cells[row * self.cols + col].0)
    }

    pub fn into_lines(self) -> Vec<Line<'static>> {
        let cols = self.cols.max(1);
        self.cells
            .chunks(cols)
            .map(|row| {
                let spans: Vec<Span<'static>> = row
                    .iter()
                    .map(|&(ch, style)| Span::styled(String::from(ch), style))
                    .collect();
                Line::from(spans)
            })
            .collect()
    }
}
