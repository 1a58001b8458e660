pub mod assembly;
pub mod connector;
pub mod error;
pub mod geom;
pub mod group;
pub mod layout;
pub mod piece;
pub mod random;
pub mod view;

pub use assembly::{Assembly, AssemblyEvent, Pick, Progress};
pub use connector::{Connector, ConnectorArena, ConnectorId, TabPolarity};
pub use error::{AssemblyError, ConnectorError, LayoutError};
pub use geom::{Line, Vec2};
pub use group::{DragState, Group, GroupId};
pub use layout::{build, build_with, LayoutConfig, TileGrid};
pub use piece::{Piece, PieceId, PixelRect, Side, TextureRect};
pub use view::{GroupView, PieceView, PuzzleView};
