//! LIBRIS application library
//!
//! Authors and books resource modules plus the bootstrap that wires them to
//! the database and HTTP layers.

pub mod app;
pub mod error;
pub mod modules;
pub mod utils;

pub use app::App;
pub use error::StoreError;
