/// Map module
///
/// This module owns everything map-related:
/// - Web-Mercator projection math (projection.rs)
/// - OSM raster tile fetching and caching (tiles.rs)
/// - Marker clustering (cluster.rs)
/// - The map/selection controller holding camera, markers and the
///   fly-to animation (controller.rs)
/// - The iced widget that renders it all and publishes interactions
///   (view.rs)

pub mod cluster;
pub mod controller;
pub mod projection;
pub mod tiles;
pub mod view;
