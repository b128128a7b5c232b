pub mod customization;
pub mod tracked_link;
