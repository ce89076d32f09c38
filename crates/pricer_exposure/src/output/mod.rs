//! Cube serialisation.

mod cube_writer;

pub use cube_writer::{CubeWriter, CubeWriterError, CUBE_HEADER};
