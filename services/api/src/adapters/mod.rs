pub mod db;
pub mod gateway;
pub mod model;
pub mod renderer;
