use serde::{Deserialize, Serialize};

use crate::assembly::Assembly;
use crate::connector::{ConnectorArena, ConnectorId, TabPolarity};
use crate::error::LayoutError;
use crate::geom::Vec2;
use crate::piece::{link, Piece, PixelRect, Side};
use crate::random::{edge_seed, PUZZLE_SEED};

pub const CONNECTOR_RATIO_MIN: f32 = 0.0;
pub const CONNECTOR_RATIO_MAX: f32 = 0.5;
pub const CONNECTOR_RATIO_DEFAULT: f32 = 0.2;
pub const DEFAULT_COLS: u32 = 4;
pub const DEFAULT_ROWS: u32 = 3;
pub const DEFAULT_IMAGE_WIDTH: u32 = 1200;
pub const DEFAULT_IMAGE_HEIGHT: u32 = 840;

const EDGE_HORIZONTAL: u32 = 0;
const EDGE_VERTICAL: u32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGrid {
    pub cols: u32,
    pub rows: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    pub dx: u32,
    pub dy: u32,
}

impl TileGrid {
    pub fn new(cols: u32, rows: u32, image_width: u32, image_height: u32) -> Result<Self, LayoutError> {
        if cols == 0 || rows == 0 {
            return Err(LayoutError::EmptyGrid { cols, rows });
        }
        if image_width < cols || image_height < rows {
            return Err(LayoutError::ImageTooSmall {
                width: image_width,
                height: image_height,
                cols,
                rows,
            });
        }
        let tile_width = image_width / cols;
        let tile_height = image_height / rows;
        Ok(Self {
            cols,
            rows,
            tile_width,
            tile_height,
            dx: image_width - tile_width * cols,
            dy: image_height - tile_height * rows,
        })
    }

    pub fn total(&self) -> usize {
        self.cols as usize * self.rows as usize
    }

    pub fn min_tile_side(&self) -> u32 {
        self.tile_width.min(self.tile_height)
    }

    /// Remainder pixels go to the last column and row.
    pub fn cell_rect(&self, col: u32, row: u32) -> PixelRect {
        let extra_w = if col + 1 == self.cols { self.dx } else { 0 };
        let extra_h = if row + 1 == self.rows { self.dy } else { 0 };
        PixelRect {
            x: col * self.tile_width,
            y: row * self.tile_height,
            width: self.tile_width + extra_w,
            height: self.tile_height + extra_h,
        }
    }

    pub fn piece_id(&self, col: u32, row: u32) -> usize {
        row as usize * self.cols as usize + col as usize
    }

    /// Largest tab that keeps the tabs entering one cell from the top and the
    /// left (or receding from its right and bottom) disjoint.
    pub fn max_tab_size(&self) -> f32 {
        self.min_tile_side() as f32 / 3.0
    }

    pub fn validate_tab_size(&self, tab_size: f32) -> Result<(), LayoutError> {
        let limit = self.max_tab_size();
        if !tab_size.is_finite() || tab_size < 0.0 || tab_size > limit {
            return Err(LayoutError::TabTooLarge { tab_size, limit });
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub cols: u32,
    pub rows: u32,
    pub image_width: u32,
    pub image_height: u32,
    /// Tab size in [0, 0.5]; 0.5 maps to the largest tab the grid allows.
    pub connector_ratio: f32,
    pub polarity: TabPolarity,
    pub seed: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            cols: DEFAULT_COLS,
            rows: DEFAULT_ROWS,
            image_width: DEFAULT_IMAGE_WIDTH,
            image_height: DEFAULT_IMAGE_HEIGHT,
            connector_ratio: CONNECTOR_RATIO_DEFAULT,
            polarity: TabPolarity::default(),
            seed: PUZZLE_SEED,
        }
    }
}

impl LayoutConfig {
    pub fn grid(&self) -> Result<TileGrid, LayoutError> {
        TileGrid::new(self.cols, self.rows, self.image_width, self.image_height)
    }

    pub fn tab_size(&self) -> Result<f32, LayoutError> {
        let ratio = self.connector_ratio;
        if !(CONNECTOR_RATIO_MIN..=CONNECTOR_RATIO_MAX).contains(&ratio) {
            return Err(LayoutError::ConnectorRatioOutOfRange {
                value: ratio,
                min: CONNECTOR_RATIO_MIN,
                max: CONNECTOR_RATIO_MAX,
            });
        }
        let grid = self.grid()?;
        Ok(grid.max_tab_size() * (ratio / CONNECTOR_RATIO_MAX))
    }

    pub fn build(&self) -> Result<Assembly, LayoutError> {
        let tab_size = self.tab_size()?;
        build_with(
            self.cols,
            self.rows,
            self.image_width,
            self.image_height,
            tab_size,
            self.polarity,
            self.seed,
        )
    }
}

/// Builds a puzzle with every fresh tab pointing out of its generating piece.
pub fn build(
    cols: u32,
    rows: u32,
    image_width: u32,
    image_height: u32,
    tab_size: f32,
) -> Result<Assembly, LayoutError> {
    build_with(
        cols,
        rows,
        image_width,
        image_height,
        tab_size,
        TabPolarity::Outward,
        PUZZLE_SEED,
    )
}

pub fn build_with(
    cols: u32,
    rows: u32,
    image_width: u32,
    image_height: u32,
    tab_size: f32,
    polarity: TabPolarity,
    seed: u32,
) -> Result<Assembly, LayoutError> {
    let grid = TileGrid::new(cols, rows, image_width, image_height)?;
    grid.validate_tab_size(tab_size)?;

    let mut arena = ConnectorArena::new();
    let mut slots: Vec<Option<Piece>> = vec![None; grid.total()];
    let mut right_of_prev_col: Vec<Option<ConnectorId>> = vec![None; rows as usize];

    for col in 0..cols {
        let mut bottom_of_prev_row: Option<ConnectorId> = None;
        for row in 0..rows {
            let rect = grid.cell_rect(col, row);
            let x0 = rect.x as f32;
            let y0 = rect.y as f32;
            let x1 = (rect.x + rect.width) as f32;
            let y1 = (rect.y + rect.height) as f32;
            let upper_left = Vec2::new(x0, y0);
            let upper_right = Vec2::new(x1, y0);
            let lower_right = Vec2::new(x1, y1);
            let lower_left = Vec2::new(x0, y1);

            let top = match bottom_of_prev_row {
                Some(above) => arena.sibling(above)?,
                None => arena.straight(upper_left, upper_right),
            };
            let left = match right_of_prev_col[row as usize] {
                Some(prev) => arena.sibling(prev)?,
                None => arena.straight(lower_left, upper_left),
            };
            let right = if col + 1 < cols {
                arena.random_interior(
                    upper_right,
                    lower_right,
                    tab_size,
                    polarity,
                    edge_seed(seed, EDGE_VERTICAL, col, row),
                )
            } else {
                arena.straight(upper_right, lower_right)
            };
            let bottom = if row + 1 < rows {
                arena.random_interior(
                    lower_right,
                    lower_left,
                    tab_size,
                    polarity,
                    edge_seed(seed, EDGE_HORIZONTAL, col, row),
                )
            } else {
                arena.straight(lower_right, lower_left)
            };

            let id = grid.piece_id(col, row);
            slots[id] = Some(Piece::new(id, col, row, rect, [top, right, bottom, left], &arena));
            bottom_of_prev_row = (row + 1 < rows).then_some(bottom);
            right_of_prev_col[row as usize] = (col + 1 < cols).then_some(right);
        }
    }

    let mut pieces: Vec<Piece> = slots.into_iter().flatten().collect();
    for row in 0..rows {
        for col in 0..cols {
            let id = grid.piece_id(col, row);
            if row > 0 {
                link(&mut pieces, id, Side::Top, grid.piece_id(col, row - 1));
            }
            if col > 0 {
                link(&mut pieces, id, Side::Left, grid.piece_id(col - 1, row));
            }
        }
    }

    tracing::info!(
        cols,
        rows,
        tile_width = grid.tile_width,
        tile_height = grid.tile_height,
        tab_size,
        connectors = arena.len(),
        "built puzzle layout"
    );
    Ok(Assembly::new(grid, pieces, arena))
}
