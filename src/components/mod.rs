pub mod drop_zone;
pub mod result_panel;
pub mod sidebar;
pub mod status_badge;
