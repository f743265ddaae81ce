//! Host (Gardener core) types consumed as validation context
//!
//! Only the fields the provider validators look at are modelled:
//! - Worker pools with their volumes and zones
//! - Cloud profile machine images and capability definitions

pub mod machine_image;
pub mod worker;

pub use machine_image::*;
pub use worker::*;
