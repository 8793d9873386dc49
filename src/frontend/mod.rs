pub mod camera;
pub mod canvas;
pub mod controls;
pub mod sink;
