// src/storage/mod.rs

//! On-disk persistence: tracking logs, page records, media indexes.

mod media;
mod pages;
mod scaffold;
mod tracking;

pub use media::MediaStore;
pub use pages::{GoalDirs, PageStore};
pub use scaffold::scaffold_site;
pub use tracking::{Log, TrackingFiles};
