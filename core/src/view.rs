use serde::Serialize;

use crate::assembly::{Assembly, Progress};
use crate::geom::Vec2;
use crate::group::GroupId;
use crate::piece::{PieceId, PixelRect, TextureRect};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PieceView {
    pub id: PieceId,
    pub col: u32,
    pub row: u32,
    pub group: GroupId,
    pub inner: PixelRect,
    pub texture: TextureRect,
    pub position: Vec2,
    pub outline: Vec<Vec2>,
    pub connected: [bool; 4],
    pub rim: Vec<Vec<Vec2>>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GroupView {
    pub id: GroupId,
    pub offset: Vec2,
    pub dragging: bool,
    pub members: Vec<PieceId>,
}

/// Everything a renderer needs to draw the current state.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PuzzleView {
    pub image_width: u32,
    pub image_height: u32,
    pub cols: u32,
    pub rows: u32,
    pub pieces: Vec<PieceView>,
    pub groups: Vec<GroupView>,
    pub z_order: Vec<GroupId>,
    pub progress: Progress,
    pub solved: bool,
}

impl Assembly {
    pub fn piece_view(&self, id: PieceId) -> Option<PieceView> {
        let piece = self.piece(id)?;
        let (col, row) = piece.cell();
        Some(PieceView {
            id,
            col,
            row,
            group: self.owner_of(id)?,
            inner: piece.inner(),
            texture: piece.texture_rect(),
            position: self.piece_position(id)?,
            outline: piece.outline().to_vec(),
            connected: piece.connected(),
            rim: piece.rim().to_vec(),
        })
    }

    pub fn view(&self) -> PuzzleView {
        let grid = self.grid();
        let pieces = (0..self.pieces().len())
            .filter_map(|id| self.piece_view(id))
            .collect();
        let groups = self
            .groups()
            .map(|group| GroupView {
                id: group.id(),
                offset: group.offset(),
                dragging: group.is_dragging(),
                members: group.members().to_vec(),
            })
            .collect();
        PuzzleView {
            image_width: grid.tile_width * grid.cols + grid.dx,
            image_height: grid.tile_height * grid.rows + grid.dy,
            cols: grid.cols,
            rows: grid.rows,
            pieces,
            groups,
            z_order: self.z_order().to_vec(),
            progress: self.progress(),
            solved: self.is_solved(),
        }
    }
}
