pub mod blob;
pub mod positional;
