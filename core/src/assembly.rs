use serde::Serialize;

use crate::connector::{Connector, ConnectorArena, ConnectorId};
use crate::error::AssemblyError;
use crate::geom::{polygon_contains, Vec2};
use crate::group::{Group, GroupId};
use crate::layout::TileGrid;
use crate::piece::{Piece, PieceId, Side};
use crate::random::{rand_range, rand_unit, scatter_seed};

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssemblyEvent {
    Merged {
        source: GroupId,
        target: GroupId,
        pieces: Vec<PieceId>,
    },
    EdgeConnected {
        piece: PieceId,
        side: Side,
        counter: PieceId,
    },
    Solved,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub connected: usize,
    pub total: usize,
}

/// Result of a hit test: `local` is the pointer in the group frame, ready to
/// be passed to [`Assembly::drag_start`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pick {
    pub group: GroupId,
    pub piece: PieceId,
    pub local: Vec2,
}

/// Pieces, their connectors and the groups that currently hold them.
///
/// Group membership is an explicit table (`owner`); z-order runs bottom to
/// top.
#[derive(Clone, Debug)]
pub struct Assembly {
    grid: TileGrid,
    pieces: Vec<Piece>,
    connectors: ConnectorArena,
    groups: Vec<Option<Group>>,
    owner: Vec<GroupId>,
    z_order: Vec<GroupId>,
}

impl Assembly {
    pub(crate) fn new(grid: TileGrid, pieces: Vec<Piece>, connectors: ConnectorArena) -> Self {
        let total = pieces.len();
        let groups = (0..total).map(|id| Some(Group::singleton(id, id))).collect();
        Self {
            grid,
            pieces,
            connectors,
            groups,
            owner: (0..total).collect(),
            z_order: (0..total).collect(),
        }
    }

    pub fn grid(&self) -> TileGrid {
        self.grid
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(id)
    }

    pub fn piece_at_cell(&self, col: u32, row: u32) -> Option<&Piece> {
        if col >= self.grid.cols || row >= self.grid.rows {
            return None;
        }
        self.pieces.get(self.grid.piece_id(col, row))
    }

    pub fn connectors(&self) -> &ConnectorArena {
        &self.connectors
    }

    pub fn connector(&self, id: ConnectorId) -> Option<&Connector> {
        self.connectors.get(id)
    }

    pub fn piece_connector(&self, piece: PieceId, side: Side) -> Option<&Connector> {
        let piece = self.pieces.get(piece)?;
        self.connectors.get(piece.connector(side))
    }

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(id).and_then(|entry| entry.as_ref())
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter().filter_map(|entry| entry.as_ref())
    }

    pub fn group_count(&self) -> usize {
        self.groups().count()
    }

    pub fn owner_of(&self, piece: PieceId) -> Option<GroupId> {
        self.owner.get(piece).copied()
    }

    pub fn z_order(&self) -> &[GroupId] {
        &self.z_order
    }

    fn group_mut(&mut self, id: GroupId) -> Result<&mut Group, AssemblyError> {
        self.groups
            .get_mut(id)
            .and_then(|entry| entry.as_mut())
            .ok_or(AssemblyError::UnknownGroup(id))
    }

    fn group_offset_of(&self, piece: PieceId) -> Option<Vec2> {
        let group = self.owner.get(piece)?;
        self.group(*group).map(|group| group.offset())
    }

    /// Global top-left of the piece's outline bounding box.
    pub fn piece_position(&self, piece: PieceId) -> Option<Vec2> {
        let offset = self.group_offset_of(piece)?;
        Some(offset + self.pieces.get(piece)?.home())
    }

    /// Global mid-point of the piece's inner rectangle.
    pub fn piece_mid(&self, piece: PieceId) -> Option<Vec2> {
        let offset = self.group_offset_of(piece)?;
        Some(offset + self.pieces.get(piece)?.home_mid())
    }

    pub fn drag_start(&mut self, group: GroupId, pointer_local: Vec2) -> Result<bool, AssemblyError> {
        let started = self.group_mut(group)?.begin_drag(pointer_local);
        if started {
            self.z_order.retain(|id| *id != group);
            self.z_order.push(group);
            tracing::trace!(group, x = pointer_local.x, y = pointer_local.y, "drag start");
        }
        Ok(started)
    }

    pub fn drag_move(&mut self, group: GroupId, pointer: Vec2) -> Result<bool, AssemblyError> {
        Ok(self.group_mut(group)?.drag_to(pointer))
    }

    /// Ends the drag and merges the group into a neighbour if one of its
    /// pieces was dropped next to its counter-piece.
    pub fn drag_end(&mut self, group: GroupId) -> Result<Vec<AssemblyEvent>, AssemblyError> {
        if !self.group_mut(group)?.end_drag() {
            return Ok(Vec::new());
        }
        self.check_for_connections(group)
    }

    /// First counter-piece, probing top, bottom, right, left, that sits
    /// within snapping distance of where it belongs relative to `piece`.
    pub fn nearby_counter_piece(&self, piece: PieceId) -> Option<PieceId> {
        let current = self.pieces.get(piece)?;
        let own_group = self.owner_of(piece)?;
        let mid = self.piece_mid(piece)?;
        for side in Side::PROBE_ORDER {
            if current.is_connected(side) {
                continue;
            }
            let Some(counter_id) = current.counter_piece(side) else {
                continue;
            };
            if self.owner_of(counter_id) == Some(own_group) {
                continue;
            }
            let Some(counter) = self.pieces.get(counter_id) else {
                continue;
            };
            let Some(counter_mid) = self.piece_mid(counter_id) else {
                continue;
            };
            let detection = mid + (counter.home_mid() - current.home_mid());
            let distance = detection.distance(counter_mid);
            tracing::trace!(piece, counter = counter_id, ?side, distance, "counter-piece distance");
            if distance <= current.snap_radius(side) {
                return Some(counter_id);
            }
        }
        None
    }

    pub fn check_for_connections(&mut self, group: GroupId) -> Result<Vec<AssemblyEvent>, AssemblyError> {
        let members = self
            .group(group)
            .ok_or(AssemblyError::UnknownGroup(group))?
            .members();
        let matched = members
            .iter()
            .find_map(|piece| self.nearby_counter_piece(*piece));
        let Some(counter) = matched else {
            return Ok(Vec::new());
        };
        let target = self
            .owner_of(counter)
            .ok_or(AssemblyError::UnknownPiece(counter))?;
        self.merge_into(group, target)
    }

    /// Moves every piece of `source` into `target` and discards `source`.
    ///
    /// Pieces keep their home positions, so the moved pieces land exactly on
    /// their grid slots in the target frame.
    pub fn merge_into(&mut self, source: GroupId, target: GroupId) -> Result<Vec<AssemblyEvent>, AssemblyError> {
        if source == target {
            return Err(AssemblyError::SelfMerge(source));
        }
        if self.group(target).is_none() {
            return Err(AssemblyError::UnknownGroup(target));
        }
        let moved = self.group_mut(source)?.take_members();
        self.groups[source] = None;
        self.z_order.retain(|id| *id != source);

        if let Some(target_group) = self.groups[target].as_mut() {
            for piece in &moved {
                target_group.push_member(*piece);
                self.owner[*piece] = target;
            }
        }
        tracing::debug!(source, target, moved = moved.len(), "merged groups");

        let mut events = vec![AssemblyEvent::Merged {
            source,
            target,
            pieces: moved,
        }];
        let members = self
            .group(target)
            .map(|group| group.members().to_vec())
            .unwrap_or_default();
        for piece in members {
            events.extend(self.connect_counter_pieces_in_group(piece));
        }
        if self.is_solved() {
            tracing::info!(pieces = self.pieces.len(), "puzzle solved");
            events.push(AssemblyEvent::Solved);
        }
        Ok(events)
    }

    /// Marks every edge of `piece` whose counter-piece shares its group as
    /// connected, on both sides, and rebuilds the affected rims.
    pub fn connect_counter_pieces_in_group(&mut self, piece: PieceId) -> Vec<AssemblyEvent> {
        let Some(group) = self.owner_of(piece) else {
            return Vec::new();
        };
        let Some(current) = self.pieces.get(piece) else {
            return Vec::new();
        };
        let joined: Vec<(Side, PieceId)> = Side::ALL
            .iter()
            .filter_map(|side| current.counter_piece(*side).map(|counter| (*side, counter)))
            .filter(|(_, counter)| self.owner.get(*counter) == Some(&group))
            .collect();

        let mut events = Vec::new();
        for (side, counter) in joined {
            let own_changed = self.pieces[piece].mark_connected(side);
            let counter_changed = self.pieces[counter].mark_connected(side.opposite());
            if counter_changed {
                self.pieces[counter].refresh_rim(&self.connectors);
            }
            if own_changed || counter_changed {
                tracing::debug!(piece, counter, ?side, "edge connected");
                events.push(AssemblyEvent::EdgeConnected {
                    piece,
                    side,
                    counter,
                });
            }
        }
        self.pieces[piece].refresh_rim(&self.connectors);
        events
    }

    pub fn progress(&self) -> Progress {
        let mut progress = Progress {
            connected: 0,
            total: 0,
        };
        for piece in &self.pieces {
            for side in [Side::Right, Side::Bottom] {
                if piece.counter_piece(side).is_some() {
                    progress.total += 1;
                    if piece.is_connected(side) {
                        progress.connected += 1;
                    }
                }
            }
        }
        progress
    }

    pub fn is_solved(&self) -> bool {
        self.group_count() == 1 && self.pieces.iter().all(Piece::is_complete)
    }

    /// Seeded random placement of every group inside `area_width` x
    /// `area_height`, plus a seeded shuffle of the z-order.
    pub fn scatter(&mut self, seed: u32, area_width: f32, area_height: f32) {
        let seed = scatter_seed(seed, self.grid.cols as usize, self.grid.rows as usize);
        let mut placements = Vec::new();
        for group in self.groups() {
            let mut min = Vec2::new(f32::INFINITY, f32::INFINITY);
            let mut max = Vec2::new(f32::NEG_INFINITY, f32::NEG_INFINITY);
            for member in group.members() {
                let piece = &self.pieces[*member];
                let rect = piece.texture_rect();
                min = min.min(piece.home());
                max = max.max(piece.home() + Vec2::new(rect.width, rect.height));
            }
            if !min.x.is_finite() || !min.y.is_finite() {
                continue;
            }
            let size = max - min;
            let max_x = (area_width - size.x).max(0.0);
            let max_y = (area_height - size.y).max(0.0);
            let salt = (group.id() as u32) << 1;
            let x = rand_range(seed, salt, 0.0, max_x);
            let y = rand_range(seed, salt + 1, 0.0, max_y);
            placements.push((group.id(), Vec2::new(x, y) - min));
        }
        for (id, offset) in placements {
            if let Some(group) = self.groups[id].as_mut() {
                group.set_offset(offset);
            }
        }

        for i in (1..self.z_order.len()).rev() {
            let salt = 0xC0DE_u32 + i as u32;
            let j = ((rand_unit(seed, salt) * (i as f32 + 1.0)) as usize).min(i);
            self.z_order.swap(i, j);
        }
        tracing::debug!(groups = self.z_order.len(), area_width, area_height, "scattered groups");
    }

    /// Topmost piece whose outline contains `point`.
    pub fn pick(&self, point: Vec2) -> Option<Pick> {
        for &group_id in self.z_order.iter().rev() {
            let Some(group) = self.group(group_id) else {
                continue;
            };
            for &piece_id in group.members() {
                let piece = &self.pieces[piece_id];
                let local = point - group.offset() - piece.home();
                if polygon_contains(piece.outline(), local) {
                    return Some(Pick {
                        group: group_id,
                        piece: piece_id,
                        local: group.to_local(point),
                    });
                }
            }
        }
        None
    }
}
