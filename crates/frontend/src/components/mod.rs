pub mod location_panel;
pub mod map_view;
