use serde::{Deserialize, Serialize};

use crate::connector::{ConnectorArena, ConnectorId};
use crate::geom::{bounds, Vec2};

pub type PieceId = usize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    /// Outline order, clockwise from the top.
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];
    /// Order in which nearby counter-pieces are probed.
    pub const PROBE_ORDER: [Side; 4] = [Side::Top, Side::Bottom, Side::Right, Side::Left];

    pub fn index(self) -> usize {
        match self {
            Side::Top => 0,
            Side::Right => 1,
            Side::Bottom => 2,
            Side::Left => 3,
        }
    }

    pub fn opposite(self) -> Side {
        match self {
            Side::Top => Side::Bottom,
            Side::Right => Side::Left,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Side::Top | Side::Bottom)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }

    /// Integer mid-point, rounded towards the top-left like pixel centres.
    pub fn mid(&self) -> Vec2 {
        Vec2::new(
            (self.x + self.width / 2) as f32,
            (self.y + self.height / 2) as f32,
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextureRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Clone, Debug)]
pub struct Piece {
    id: PieceId,
    col: u32,
    row: u32,
    inner: PixelRect,
    connectors: [ConnectorId; 4],
    connected: [bool; 4],
    counter_pieces: [Option<PieceId>; 4],
    home: Vec2,
    extent: Vec2,
    outline: Vec<Vec2>,
    rim: Vec<Vec<Vec2>>,
}

impl Piece {
    /// `connectors` are in outline order: top, right, bottom, left.
    pub fn new(
        id: PieceId,
        col: u32,
        row: u32,
        inner: PixelRect,
        connectors: [ConnectorId; 4],
        arena: &ConnectorArena,
    ) -> Self {
        let mut global = Vec::new();
        for connector in connectors.iter().filter_map(|id| arena.get(*id)) {
            global.extend_from_slice(connector.points());
        }
        let (min, max) = bounds(&global).unwrap_or((inner.origin(), inner.origin()));
        let outline = global.iter().map(|p| *p - min).collect();
        let mut piece = Self {
            id,
            col,
            row,
            inner,
            connectors,
            connected: [false; 4],
            counter_pieces: [None; 4],
            home: min,
            extent: max - min,
            outline,
            rim: Vec::new(),
        };
        piece.refresh_rim(arena);
        piece
    }

    pub fn id(&self) -> PieceId {
        self.id
    }

    pub fn cell(&self) -> (u32, u32) {
        (self.col, self.row)
    }

    pub fn inner(&self) -> PixelRect {
        self.inner
    }

    pub fn inner_width(&self) -> f32 {
        self.inner.width as f32
    }

    pub fn inner_height(&self) -> f32 {
        self.inner.height as f32
    }

    pub fn connector(&self, side: Side) -> ConnectorId {
        self.connectors[side.index()]
    }

    pub fn connectors(&self) -> [ConnectorId; 4] {
        self.connectors
    }

    pub fn is_connected(&self, side: Side) -> bool {
        self.connected[side.index()]
    }

    pub fn connected(&self) -> [bool; 4] {
        self.connected
    }

    pub fn counter_piece(&self, side: Side) -> Option<PieceId> {
        self.counter_pieces[side.index()]
    }

    /// Top-left of the outline bounding box in image space. Group offsets are
    /// applied on top of this, so it never changes after layout.
    pub fn home(&self) -> Vec2 {
        self.home
    }

    /// Mid-point of the inner rectangle in image space.
    pub fn home_mid(&self) -> Vec2 {
        self.inner.mid()
    }

    pub fn outline(&self) -> &[Vec2] {
        &self.outline
    }

    pub fn rim(&self) -> &[Vec<Vec2>] {
        &self.rim
    }

    pub fn texture_rect(&self) -> TextureRect {
        TextureRect {
            x: self.home.x,
            y: self.home.y,
            width: self.extent.x,
            height: self.extent.y,
        }
    }

    /// Proximity radius for snapping to the counter-piece on `side`.
    pub fn snap_radius(&self, side: Side) -> f32 {
        if side.is_vertical() {
            self.inner_height() / 4.0
        } else {
            self.inner_width() / 4.0
        }
    }

    pub fn is_complete(&self) -> bool {
        Side::ALL
            .iter()
            .all(|side| self.counter_piece(*side).is_none() || self.is_connected(*side))
    }

    /// Returns true if the flag changed.
    pub(crate) fn mark_connected(&mut self, side: Side) -> bool {
        let slot = &mut self.connected[side.index()];
        let changed = !*slot;
        *slot = true;
        changed
    }

    pub(crate) fn refresh_rim(&mut self, arena: &ConnectorArena) {
        let home = self.home;
        self.rim = Side::ALL
            .iter()
            .filter(|side| !self.connected[side.index()])
            .filter_map(|side| arena.get(self.connectors[side.index()]))
            .map(|connector| connector.polyline().into_iter().map(|p| p - home).collect())
            .collect();
    }
}

/// Wires `a` and `b` as counter-pieces across `side` of `a`.
pub(crate) fn link(pieces: &mut [Piece], a: PieceId, side: Side, b: PieceId) {
    pieces[a].counter_pieces[side.index()] = Some(b);
    pieces[b].counter_pieces[side.opposite().index()] = Some(a);
}
