use fl_alloc::AllocError;
use fl_core::FlError;
use fl_graph::GraphError;
use fl_spatial::SpatialError;
use fl_stock::StockError;
use thiserror::Error;

/// Setup failures.  A built simulation never fails while running.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("layout error: {0}")]
    Layout(String),

    #[error("content source error: {0}")]
    Content(String),

    #[error(transparent)]
    Core(#[from] FlError),

    #[error("placement error: {0}")]
    Spatial(#[from] SpatialError),

    #[error("waypoint graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("stocking error: {0}")]
    Stock(#[from] StockError),

    #[error("allocator setup error: {0}")]
    Alloc(#[from] AllocError),
}

pub type SimResult<T> = Result<T, SimError>;
