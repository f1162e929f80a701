pub mod edit;
pub mod info;
pub mod remove;
pub mod thumbnails;
