//! TrimForge — trim sheet layout engine.
//!
//! A trim sheet is a single square texture packed with horizontal or vertical
//! strips that many meshes share through UV mapping. This crate holds the
//! whole pipeline: the document model ([`sheet`]), exact-fit validation
//! ([`validate`]), strip generators ([`generators`]), the cross-zone
//! projection synchronizer ([`projection`]), pure document mutators
//! ([`ops`]), the multi-pass CPU rasterizer ([`raster`]), and JSON/PNG
//! persistence ([`io`]). The [`cli`] module drives it all headlessly.

#![allow(clippy::too_many_arguments)]

pub mod cli;
pub mod color;
pub mod generators;
pub mod io;
pub mod logger;
pub mod ops;
pub mod projection;
pub mod raster;
pub mod sheet;
pub mod text;
pub mod validate;
