pub mod map_only;
pub mod picker;
