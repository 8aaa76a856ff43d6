//! Grid of flowable cells.
//!
//! Columns have explicit widths or share the available width equally.
//! Rows have explicit heights or grow to fit their tallest cell plus
//! padding. All cells in a table share one alignment.

use super::{Flowable, HAlign};
use crate::writer::ContentStreamBuilder;

/// Vertical placement of cell content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VAlign {
    /// Against the top padding
    #[default]
    Top,
    /// Centered between the paddings
    Middle,
    /// Against the bottom padding
    Bottom,
}

/// Cell padding in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellPadding {
    /// Left padding
    pub left: f32,
    /// Right padding
    pub right: f32,
    /// Top padding
    pub top: f32,
    /// Bottom padding
    pub bottom: f32,
}

impl Default for CellPadding {
    fn default() -> Self {
        Self {
            left: 6.0,
            right: 6.0,
            top: 3.0,
            bottom: 3.0,
        }
    }
}

/// A table of flowables.
pub struct Table {
    rows: Vec<Vec<Box<dyn Flowable>>>,
    col_widths: Option<Vec<f32>>,
    row_heights: Option<Vec<f32>>,
    align: HAlign,
    valign: VAlign,
    padding: CellPadding,
    widths: Vec<f32>,
    heights: Vec<f32>,
    cell_sizes: Vec<Vec<(f32, f32)>>,
}

impl Table {
    /// Create a table; every row should have the same number of cells.
    pub fn new(rows: Vec<Vec<Box<dyn Flowable>>>) -> Self {
        Self {
            rows,
            col_widths: None,
            row_heights: None,
            align: HAlign::Left,
            valign: VAlign::Top,
            padding: CellPadding::default(),
            widths: Vec::new(),
            heights: Vec::new(),
            cell_sizes: Vec::new(),
        }
    }

    /// A single cell of fixed height with content anchored at the top.
    ///
    /// Used to reserve a block of the page regardless of how much text
    /// the cell holds.
    pub fn fixed_height(content: Box<dyn Flowable>, height: f32) -> Self {
        Self::new(vec![vec![content]]).with_row_heights(vec![height])
    }

    /// Fixed column widths.
    pub fn with_col_widths(mut self, widths: Vec<f32>) -> Self {
        self.col_widths = Some(widths);
        self
    }

    /// Fixed row heights.
    pub fn with_row_heights(mut self, heights: Vec<f32>) -> Self {
        self.row_heights = Some(heights);
        self
    }

    /// Cell alignment.
    pub fn with_alignment(mut self, align: HAlign, valign: VAlign) -> Self {
        self.align = align;
        self.valign = valign;
        self
    }

    /// Cell padding.
    pub fn with_padding(mut self, padding: CellPadding) -> Self {
        self.padding = padding;
        self
    }

    /// Row heights from the last `wrap`.
    pub fn row_heights(&self) -> &[f32] {
        &self.heights
    }

    /// Column widths from the last `wrap`.
    pub fn col_widths(&self) -> &[f32] {
        &self.widths
    }

    fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    fn fixed_row_height(&self, row: usize) -> Option<f32> {
        self.row_heights
            .as_ref()
            .and_then(|heights| heights.get(row).copied())
    }
}

impl Flowable for Table {
    fn wrap(&mut self, avail_width: f32, avail_height: f32) -> (f32, f32) {
        let columns = self.column_count();
        self.widths = match &self.col_widths {
            Some(widths) => widths.clone(),
            None if columns > 0 => vec![avail_width / columns as f32; columns],
            None => Vec::new(),
        };

        let padding = self.padding;
        let mut heights = Vec::with_capacity(self.rows.len());
        let mut cell_sizes = Vec::with_capacity(self.rows.len());

        for row_index in 0..self.rows.len() {
            let fixed = self.fixed_row_height(row_index);
            let inner_height = fixed.unwrap_or(avail_height) - padding.top - padding.bottom;
            let mut sizes = Vec::new();
            let mut tallest: f32 = 0.0;

            for (col, cell) in self.rows[row_index].iter_mut().enumerate() {
                let col_width = self.widths.get(col).copied().unwrap_or(0.0);
                let inner_width = (col_width - padding.left - padding.right).max(0.0);
                let (w, h) = cell.wrap(inner_width, inner_height.max(0.0));
                tallest = tallest.max(h + cell.space_before());
                sizes.push((w, h));
            }

            heights.push(fixed.unwrap_or(tallest + padding.top + padding.bottom));
            cell_sizes.push(sizes);
        }

        self.heights = heights;
        self.cell_sizes = cell_sizes;
        (self.widths.iter().sum(), self.heights.iter().sum())
    }

    fn draw(&self, canvas: &mut ContentStreamBuilder, x: f32, y: f32) {
        let padding = self.padding;
        let mut row_top = y + self.heights.iter().sum::<f32>();

        for (row_index, row) in self.rows.iter().enumerate() {
            let row_height = self.heights.get(row_index).copied().unwrap_or(0.0);
            let inner_top = row_top - padding.top;
            let inner_bottom = row_top - row_height + padding.bottom;
            let mut cell_left = x;

            for (col, cell) in row.iter().enumerate() {
                let col_width = self.widths.get(col).copied().unwrap_or(0.0);
                let (w, h) = self
                    .cell_sizes
                    .get(row_index)
                    .and_then(|sizes| sizes.get(col))
                    .copied()
                    .unwrap_or((0.0, 0.0));

                let inner_left = cell_left + padding.left;
                let inner_width = col_width - padding.left - padding.right;
                let cell_x = inner_left + self.align.offset(inner_width, w);
                let cell_y = match self.valign {
                    VAlign::Top => inner_top - h,
                    VAlign::Middle => inner_bottom + (inner_top - inner_bottom - h) / 2.0,
                    VAlign::Bottom => inner_bottom,
                };
                cell.draw(canvas, cell_x, cell_y);
                cell_left += col_width;
            }
            row_top -= row_height;
        }
    }

    fn h_align(&self) -> HAlign {
        HAlign::Center
    }
}
