//! Segmented indoor map renderer.
//!
//! This crate turns a pre-computed, multi-floor route into something a person
//! can follow: it loads per-floor vector floor plans, frames each route
//! segment with an animated camera, draws the route overlay in the floor's
//! native coordinate space, and resolves pointer hover/selection over the
//! plan's shapes to rooms from an external directory. The host (browser
//! shell, desktop UI or the bundled CLI) performs I/O and presentation;
//! everything stateful lives in [`engine::EngineCore`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine wiring every component and emitting [`engine::Action`]s |
//! | [`plan`] | Floor-plan parsing, coordinate-space normalization, scene graph |
//! | [`loader`] | Floor catalog, async floor sources, stale-load suppression |
//! | [`camera`] | Camera transform, coordinate conversions, auto-fit math |
//! | [`viewport`] | Camera ownership and animated fit/reset transitions |
//! | [`route`] | Route payloads and the immutable navigation path model |
//! | [`navigator`] | Segment stepping and transition instructions |
//! | [`render`] | Route overlay drawing and SVG output |
//! | [`hit`] | Room-key resolution, hit-testing, highlight and tooltip state |
//! | [`rooms`] | Read-only room directory |
//! | [`input`] | Pointer/wheel input types and the pan gesture state |
//! | [`client`] | HTTP client for the route and room services |
//! | [`config`] | Environment-driven configuration |
//! | [`error`] | Error taxonomy shared by all components |
//! | [`consts`] | Shared numeric and visual constants |

pub mod camera;
pub mod client;
pub mod config;
pub mod consts;
pub mod engine;
pub mod error;
pub mod hit;
pub mod input;
pub mod loader;
pub mod navigator;
pub mod plan;
pub mod render;
pub mod rooms;
pub mod route;
pub mod viewport;

pub use error::MapError;
