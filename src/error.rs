use thiserror::Error;

/// Errors raised by [`CompactIntSet`](crate::intset::CompactIntSet) and its cursor.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IntSetError {
    #[error("invalid argument: {0} is outside the storable range 0..u32::MAX")]
    InvalidArgument(i64),
    #[error("invalid operation: {0}")]
    InvalidOperation(&'static str),
}

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("unable to read graph file: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: expected two whitespace separated endpoints, found {found:?}")]
    Parse { line: usize, found: String },
    #[error("graph has more vertices than a u32 index can address")]
    TooManyVertices,
    #[error("corrupt graph image: {0}")]
    Wire(#[from] WireError),
    #[error("inconsistent graph image: {0}")]
    InvalidImage(String),
    #[error(transparent)]
    IntSet(#[from] IntSetError),
}

#[derive(Debug, Error)]
pub enum WireError {
    #[error("payload too short to hold a header ({0} bytes)")]
    Truncated(usize),
    #[error("unexpected payload magic {0:?}")]
    BadMagic([u8; 4]),
    #[error("unsupported wire version {found} (expected {expected})")]
    UnsupportedVersion { found: u16, expected: u16 },
    #[error("codec failure: {0}")]
    Codec(#[from] bincode::Error),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("motif order must be between 2 and {max}, got {found}")]
    MotifOrder { found: usize, max: usize },
    #[error("at least one worker thread per PE is required")]
    NoThreads,
    #[error("expected {expected} PEs but the world has {found}")]
    PeCount { expected: usize, found: usize },
}

#[derive(Debug, Error)]
pub enum CollectiveError {
    #[error("collective setup failed: {0}")]
    Setup(String),
    #[error("broadcast root {0} supplied no payload")]
    MissingRootPayload(usize),
    #[error("broadcast completed but no payload arrived on rank {0}")]
    NothingReceived(usize),
    #[error("gather is missing the payload of rank {0}")]
    MissingGather(usize),
}

/// Top level error for a motif counting run.
#[derive(Debug, Error)]
pub enum MotifError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Wire(#[from] WireError),
    #[error(transparent)]
    Collective(#[from] CollectiveError),
    #[error(transparent)]
    IntSet(#[from] IntSetError),
    #[error("graph load failed on the coordinator: {0}")]
    RemoteLoadFailed(String),
    #[error("worker {worker} on rank {rank} panicked during enumeration")]
    WorkerPanicked { rank: usize, worker: usize },
    #[error("rank {rank} failed before gathering: {reason}")]
    PeerFailed { rank: usize, reason: String },
}
