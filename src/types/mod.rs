// ABOUTME: Validated domain types shared across the pipeline.
// ABOUTME: Names are checked once at construction so later stages can trust them.

mod image_ref;
mod names;

pub use image_ref::{ImageRef, ImageRepository, ParseImageRefError};
pub use names::{ApplicationName, EnvironmentName, NameError, VersionLabel};
