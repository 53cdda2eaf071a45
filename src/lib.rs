pub mod art;
pub mod catalog;
pub mod color;
pub mod config;
pub mod density;
pub mod error;
pub mod grid;
pub mod math;
pub mod mix;
pub mod nail;
pub mod rand;
pub mod sampling;
pub mod shapes;
