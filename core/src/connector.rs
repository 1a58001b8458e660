use serde::{Deserialize, Serialize};

use crate::error::ConnectorError;
use crate::geom::{Line, Vec2};
use crate::random::rand_unit;

pub type ConnectorId = usize;

const TAB_STEP: f32 = 1.0 / 3.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabPolarity {
    /// Every fresh tab sticks out of the piece that generated it.
    #[default]
    Outward,
    /// A seeded coin flip per edge decides between a tab and a blank.
    Seeded,
}

impl TabPolarity {
    pub fn flips(self, edge_seed: u32) -> bool {
        match self {
            TabPolarity::Outward => false,
            TabPolarity::Seeded => rand_unit(edge_seed, 8) < 0.5,
        }
    }
}

/// Boundary between two neighbouring pieces, or a straight border segment.
///
/// `points` runs from `from` up to but excluding `to`, so the connectors of a
/// piece concatenate into a closed outline.
#[derive(Clone, Debug, PartialEq)]
pub struct Connector {
    points: Vec<Vec2>,
    from: Vec2,
    to: Vec2,
    sibling: Option<ConnectorId>,
}

impl Connector {
    pub fn straight(from: Vec2, to: Vec2) -> Self {
        Self {
            points: vec![from],
            from,
            to,
            sibling: None,
        }
    }

    pub fn interior(from: Vec2, to: Vec2, tab_size: f32) -> Self {
        let line = to - from;
        let normal = line.perp_cw().normalized();
        let mut points = Vec::with_capacity(5);
        points.push(from);
        let mut next = from + line * TAB_STEP;
        points.push(next);
        next = next + normal * tab_size;
        points.push(next);
        next = next + line * TAB_STEP;
        points.push(next);
        next = next + normal * -tab_size;
        points.push(next);
        Self {
            points,
            from,
            to,
            sibling: None,
        }
    }

    /// Reflection across the `from -> to` line: a tab becomes a blank.
    pub fn mirrored(&self) -> Self {
        let line = self.reference_line();
        Self {
            points: self.points.iter().map(|p| line.mirror_point(*p)).collect(),
            from: self.from,
            to: self.to,
            sibling: None,
        }
    }

    fn reversed(&self) -> Self {
        let mut points: Vec<Vec2> = self.points.iter().skip(1).copied().collect();
        points.push(self.to);
        points.reverse();
        Self {
            points,
            from: self.to,
            to: self.from,
            sibling: None,
        }
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// Points plus the closing `to` point, for drawing the edge on its own.
    pub fn polyline(&self) -> Vec<Vec2> {
        let mut line = self.points.clone();
        line.push(self.to);
        line
    }

    pub fn from_point(&self) -> Vec2 {
        self.from
    }

    pub fn to_point(&self) -> Vec2 {
        self.to
    }

    pub fn sibling(&self) -> Option<ConnectorId> {
        self.sibling
    }

    pub fn is_border(&self) -> bool {
        self.points.len() == 1 && self.sibling.is_none()
    }

    pub fn reference_line(&self) -> Line {
        Line::through(self.from, self.to)
    }

    pub fn stickout(&self) -> f32 {
        let line = self.reference_line();
        self.points
            .iter()
            .map(|p| line.signed_distance(*p))
            .fold(0.0, f32::max)
    }

    pub fn stickin(&self) -> f32 {
        let line = self.reference_line();
        self.points
            .iter()
            .map(|p| line.signed_distance(*p))
            .fold(0.0, f32::min)
    }
}

/// Owns every connector of a puzzle; sibling links are ids into this arena.
#[derive(Clone, Debug, Default)]
pub struct ConnectorArena {
    connectors: Vec<Connector>,
}

impl ConnectorArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.connectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connectors.is_empty()
    }

    pub fn get(&self, id: ConnectorId) -> Option<&Connector> {
        self.connectors.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ConnectorId, &Connector)> {
        self.connectors.iter().enumerate()
    }

    fn push(&mut self, connector: Connector) -> ConnectorId {
        self.connectors.push(connector);
        self.connectors.len() - 1
    }

    pub fn straight(&mut self, from: Vec2, to: Vec2) -> ConnectorId {
        self.push(Connector::straight(from, to))
    }

    pub fn random_interior(
        &mut self,
        from: Vec2,
        to: Vec2,
        tab_size: f32,
        polarity: TabPolarity,
        edge_seed: u32,
    ) -> ConnectorId {
        let tab = Connector::interior(from, to, tab_size);
        if polarity.flips(edge_seed) {
            self.push(tab.mirrored())
        } else {
            self.push(tab)
        }
    }

    /// Generates the matching connector for the piece on the other side and
    /// links both ways. A connector only ever gets one sibling.
    pub fn sibling(&mut self, id: ConnectorId) -> Result<ConnectorId, ConnectorError> {
        let original = self.connectors.get(id).ok_or(ConnectorError::Unknown(id))?;
        if original.sibling.is_some() {
            return Err(ConnectorError::SiblingExists(id));
        }
        let mut created = original.reversed();
        created.sibling = Some(id);
        let created_id = self.push(created);
        self.connectors[id].sibling = Some(created_id);
        Ok(created_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f32, expected: f32) {
        let delta = (actual - expected).abs();
        assert!(
            delta <= 1e-4,
            "expected {:.6} got {:.6} (delta {:.6})",
            expected,
            actual,
            delta
        );
    }

    #[test]
    fn interior_tab_is_five_point_zigzag() {
        let tab = Connector::interior(Vec2::new(0.0, 0.0), Vec2::new(30.0, 0.0), 6.0);
        let points = tab.points();
        assert_eq!(points.len(), 5);
        assert_eq!(points[0], Vec2::new(0.0, 0.0));
        assert_close(points[1].x, 10.0);
        assert_close(points[2].y, -6.0);
        assert_close(points[3].x, 20.0);
        assert_close(points[3].y, -6.0);
        assert_close(points[4].y, 0.0);
        assert_close(tab.stickout(), 6.0);
        assert_close(tab.stickin(), 0.0);
    }

    #[test]
    fn mirrored_tab_recedes() {
        let tab = Connector::interior(Vec2::new(0.0, 0.0), Vec2::new(0.0, 30.0), 4.0);
        let blank = tab.mirrored();
        assert_close(blank.stickout(), 0.0);
        assert_close(blank.stickin(), -4.0);
        assert_eq!(blank.from_point(), tab.from_point());
        assert_eq!(blank.to_point(), tab.to_point());
    }

    #[test]
    fn outward_polarity_never_flips() {
        for seed in 0..64 {
            assert!(!TabPolarity::Outward.flips(seed));
        }
        let flipped = (0..256).filter(|seed| TabPolarity::Seeded.flips(*seed)).count();
        assert!(flipped > 0 && flipped < 256);
    }

    #[test]
    fn sibling_links_both_ways() {
        let mut arena = ConnectorArena::new();
        let id = arena.random_interior(
            Vec2::new(0.0, 0.0),
            Vec2::new(30.0, 0.0),
            5.0,
            TabPolarity::Outward,
            0,
        );
        let sibling = arena.sibling(id).unwrap();
        assert_eq!(arena.get(id).unwrap().sibling(), Some(sibling));
        assert_eq!(arena.get(sibling).unwrap().sibling(), Some(id));
        assert_eq!(arena.sibling(id), Err(ConnectorError::SiblingExists(id)));
        assert_eq!(arena.sibling(99), Err(ConnectorError::Unknown(99)));
    }
}
