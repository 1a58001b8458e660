use crate::connector::ConnectorId;
use crate::group::GroupId;
use crate::piece::PieceId;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConnectorError {
    #[error("connector {0} already has a sibling")]
    SiblingExists(ConnectorId),
    #[error("unknown connector {0}")]
    Unknown(ConnectorId),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("grid must be at least 1x1, got {cols}x{rows}")]
    EmptyGrid { cols: u32, rows: u32 },
    #[error("image {width}x{height} is too small for a {cols}x{rows} grid")]
    ImageTooSmall {
        width: u32,
        height: u32,
        cols: u32,
        rows: u32,
    },
    #[error("connector ratio must be between {min} and {max}, but {value} was provided")]
    ConnectorRatioOutOfRange { value: f32, min: f32, max: f32 },
    #[error("tab size {tab_size} must be between 0 and {limit} (a third of the smaller tile side)")]
    TabTooLarge { tab_size: f32, limit: f32 },
    #[error(transparent)]
    Connector(#[from] ConnectorError),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssemblyError {
    #[error("group {0} does not exist")]
    UnknownGroup(GroupId),
    #[error("piece {0} does not exist")]
    UnknownPiece(PieceId),
    #[error("cannot merge group {0} into itself")]
    SelfMerge(GroupId),
}
