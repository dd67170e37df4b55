//! Output document generation.

pub mod sitemap;
