use serde::{Deserialize, Serialize};

use crate::geom::Vec2;
use crate::piece::PieceId;

pub type GroupId = usize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum DragState {
    #[default]
    Idle,
    /// `grab` is the pointer position in the group frame at drag start.
    Dragging { grab: Vec2 },
}

/// Rigid cluster of pieces. Member positions are `offset + piece.home()`.
#[derive(Clone, Debug, PartialEq)]
pub struct Group {
    id: GroupId,
    members: Vec<PieceId>,
    offset: Vec2,
    drag: DragState,
}

impl Group {
    pub fn singleton(id: GroupId, piece: PieceId) -> Self {
        Self {
            id,
            members: vec![piece],
            offset: Vec2::ZERO,
            drag: DragState::Idle,
        }
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn members(&self) -> &[PieceId] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    pub fn to_local(&self, point: Vec2) -> Vec2 {
        point - self.offset
    }

    pub(crate) fn set_offset(&mut self, offset: Vec2) {
        self.offset = offset;
    }

    /// Idle -> Dragging. Returns false if a drag is already running.
    pub(crate) fn begin_drag(&mut self, pointer_local: Vec2) -> bool {
        if self.is_dragging() {
            return false;
        }
        self.drag = DragState::Dragging {
            grab: pointer_local,
        };
        true
    }

    pub(crate) fn drag_to(&mut self, pointer: Vec2) -> bool {
        match self.drag {
            DragState::Dragging { grab } => {
                self.offset = pointer - grab;
                true
            }
            DragState::Idle => false,
        }
    }

    /// Dragging -> Idle. Returns false if no drag was running.
    pub(crate) fn end_drag(&mut self) -> bool {
        let was_dragging = self.is_dragging();
        self.drag = DragState::Idle;
        was_dragging
    }

    pub(crate) fn take_members(&mut self) -> Vec<PieceId> {
        std::mem::take(&mut self.members)
    }

    pub(crate) fn push_member(&mut self, piece: PieceId) {
        self.members.push(piece);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_keeps_grab_offset() {
        let mut group = Group::singleton(3, 3);
        assert!(!group.drag_to(Vec2::new(50.0, 50.0)));
        assert_eq!(group.offset(), Vec2::ZERO);

        assert!(group.begin_drag(Vec2::new(12.0, 8.0)));
        assert!(!group.begin_drag(Vec2::new(0.0, 0.0)));
        assert!(group.drag_to(Vec2::new(112.0, 58.0)));
        assert_eq!(group.offset(), Vec2::new(100.0, 50.0));
        assert!(group.end_drag());
        assert!(!group.end_drag());
        assert_eq!(group.drag_state(), DragState::Idle);
    }
}
