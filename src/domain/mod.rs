pub mod coords;
pub mod grid;
pub mod spiral;
pub mod tile;
