use thiserror::Error;

/// Errors that can occur when building or coupling a mesh.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeshError {
    #[error("cell {cell} has non-positive or non-finite volume {volume}")]
    NonPositiveVolume { cell: usize, volume: f64 },

    #[error("face {face} has a zero or non-finite area vector")]
    DegenerateFace { face: usize },

    #[error("face {face} references cell {cell}, which is out of range")]
    CellOutOfRange { face: usize, cell: usize },

    #[error("face {face} has the same owner and neighbour")]
    SelfNeighbour { face: usize },

    #[error("interior face {face} follows a boundary face")]
    InteriorAfterBoundary { face: usize },

    #[error("patch `{patch}` starts at face {start}, expected {expected}")]
    PatchGap {
        patch: String,
        expected: usize,
        start: usize,
    },

    #[error("patches cover {covered} faces but the mesh has {faces}")]
    UncoveredFaces { covered: usize, faces: usize },

    #[error("patch `{0}` is defined more than once")]
    DuplicatePatch(String),

    #[error("no patch named `{0}`")]
    UnknownPatch(String),

    #[error("patch `{0}` cannot be coupled to itself")]
    SelfCoupled(String),

    #[error("patch `{0}` is already coupled")]
    AlreadyCoupled(String),

    #[error("patches `{a}` and `{b}` have different sizes")]
    PatchSizeMismatch { a: String, b: String },

    #[error("structured mesh dimensions must be non-zero with positive finite spacing")]
    InvalidDimensions,
}
