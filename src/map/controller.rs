/// The map/selection controller
///
/// Owns the single map-widget state: camera, tile manager, the marker
/// registry and the fly-to animation. The controller has a strict
/// lifecycle: it starts `Uninitialized`, becomes `Ready` exactly once when
/// the hosting view initializes it, and ends `Disposed` when the window
/// goes away. Every operation on a controller that is not `Ready` is a
/// silent no-op, so a late animation tick or a completion timer firing
/// after disposal can never touch dead state.

use cgmath::{Vector2, VectorSpace};
use std::collections::HashMap;
use std::time::{Duration, Instant};

use super::cluster::GeoBounds;
use super::projection;
use super::tiles::TileManager;
use crate::config::AppConfig;
use crate::state::data::Internship;

/// Marker appearance, classified once at marker creation from the record's
/// student years. Not re-evaluated until the next `set_records`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerStyle {
    Default,
    Recent,
}

/// One pin on the map, bound to a company record by id
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: i64,
    /// (latitude, longitude)
    pub position: (f64, f64),
    pub style: MarkerStyle,
    pub highlighted: bool,
}

/// Camera position over the map
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// (latitude, longitude)
    pub center: (f64, f64),
    pub zoom: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Uninitialized,
    Ready,
    Disposed,
}

/// An in-flight fly-to, interpolated in zoom-0 world pixels
struct FlyAnimation {
    from: Vector2<f64>,
    to: Vector2<f64>,
    from_zoom: f64,
    to_zoom: f64,
    started_at: Instant,
    duration: Duration,
}

pub struct MapController {
    lifecycle: Lifecycle,
    settings: AppConfig,
    tiles: Option<TileManager>,
    markers: Vec<Marker>,
    marker_index: HashMap<i64, usize>,
    camera: Camera,
    animation: Option<FlyAnimation>,
    /// Last (selected, zoom target) pair, reasserted after camera events
    last_selection: (Option<i64>, Option<i64>),
}

impl MapController {
    pub fn new() -> Self {
        Self {
            lifecycle: Lifecycle::Uninitialized,
            settings: AppConfig::default(),
            tiles: None,
            markers: Vec::new(),
            marker_index: HashMap::new(),
            camera: Camera {
                center: (0.0, 0.0),
                zoom: 0.0,
            },
            animation: None,
            last_selection: (None, None),
        }
    }

    /// Create the widget state exactly once. Calling this again while
    /// Ready (or after disposal) does nothing.
    pub fn initialize(&mut self, config: &AppConfig) {
        if self.lifecycle != Lifecycle::Uninitialized {
            return;
        }

        println!("🗺️  Initializing map widget");
        self.settings = config.clone();
        self.tiles = Some(TileManager::new(config.tile_url.clone()));
        self.camera = Camera {
            center: config.initial_center,
            zoom: config.initial_zoom,
        };
        self.lifecycle = Lifecycle::Ready;
    }

    /// Tear down the widget state. Later operations become no-ops.
    pub fn dispose(&mut self) {
        if self.lifecycle == Lifecycle::Disposed {
            return;
        }

        println!("🗺️  Map widget disposed");
        self.lifecycle = Lifecycle::Disposed;
        self.tiles = None;
        self.markers.clear();
        self.marker_index.clear();
        self.animation = None;
    }

    pub fn is_ready(&self) -> bool {
        self.lifecycle == Lifecycle::Ready
    }

    /// Replace the whole marker set from the filtered record list.
    ///
    /// No diffing: the previous markers are dropped and one marker is
    /// created per record with a valid coordinate pair. Records without a
    /// usable position are skipped with a warning; they stay visible in
    /// the list views, just never on the map.
    pub fn set_records(&mut self, records: &[Internship], threshold_year: i32) {
        if !self.is_ready() {
            return;
        }

        self.markers.clear();
        self.marker_index.clear();

        for record in records {
            let position = match record.coordinates {
                Some((lat, lon)) if lat.is_finite() && lon.is_finite() => (lat, lon),
                _ => {
                    eprintln!(
                        "⚠️  No pin for {}: invalid coordinates {:?}",
                        record.company_name, record.coordinates
                    );
                    continue;
                }
            };

            let style = if record.has_recent_activity(threshold_year) {
                MarkerStyle::Recent
            } else {
                MarkerStyle::Default
            };

            self.marker_index.insert(record.id, self.markers.len());
            self.markers.push(Marker {
                id: record.id,
                position,
                style,
                highlighted: false,
            });
        }
    }

    /// Recompute the highlighted state of every marker: highlighted iff the
    /// marker's id matches the selected record or the zoom target. Markers
    /// matching neither get the highlight explicitly removed, so repeated
    /// calls with the same arguments are idempotent.
    pub fn set_selection(&mut self, selected: Option<i64>, zoom_target: Option<i64>) {
        if !self.is_ready() {
            return;
        }

        self.last_selection = (selected, zoom_target);
        for marker in &mut self.markers {
            marker.highlighted = selected == Some(marker.id) || zoom_target == Some(marker.id);
        }
    }

    /// Reassert the last selection. Camera-driven re-clustering (zoom and
    /// pan events) routes here for the life of the widget.
    pub fn refresh_highlights(&mut self) {
        let (selected, zoom_target) = self.last_selection;
        self.set_selection(selected, zoom_target);
    }

    /// Start an eased camera animation to the target's pin. Returns whether
    /// the animation started, so the caller knows to schedule the
    /// fixed-duration completion timer. A new fly-to while one is running
    /// simply wins.
    pub fn fly_to(&mut self, target: &Internship) -> bool {
        if !self.is_ready() {
            return false;
        }

        let (lat, lon) = match target.coordinates {
            Some((lat, lon)) if lat.is_finite() && lon.is_finite() => (lat, lon),
            _ => {
                eprintln!(
                    "⚠️  Cannot fly to {}: invalid coordinates {:?}",
                    target.company_name, target.coordinates
                );
                return false;
            }
        };

        let (from_x, from_y) = projection::project(self.camera.center.0, self.camera.center.1);
        let (to_x, to_y) = projection::project(lat, lon);

        self.animation = Some(FlyAnimation {
            from: Vector2::new(from_x, from_y),
            to: Vector2::new(to_x, to_y),
            from_zoom: self.camera.zoom,
            to_zoom: self.settings.fly_to_zoom,
            started_at: Instant::now(),
            duration: Duration::from_secs_f64(self.settings.fly_to_seconds),
        });
        true
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Advance the fly-to animation. The terminal tick lands exactly on the
    /// target camera.
    pub fn tick(&mut self, now: Instant) {
        if !self.is_ready() {
            return;
        }

        let Some(animation) = &self.animation else {
            return;
        };

        let elapsed = now.saturating_duration_since(animation.started_at);
        let progress = (elapsed.as_secs_f64() / animation.duration.as_secs_f64()).min(1.0);
        let eased = ease_out_cubic(progress);

        let center_px = animation.from.lerp(animation.to, eased);
        let zoom = animation.from_zoom + (animation.to_zoom - animation.from_zoom) * eased;
        self.camera = Camera {
            center: projection::unproject(center_px.x, center_px.y),
            zoom,
        };

        if progress >= 1.0 {
            self.animation = None;
        }
    }

    /// Apply a user pan/zoom from the widget. User movement cancels any
    /// running fly-to.
    pub fn set_camera(&mut self, center: (f64, f64), zoom: f64) {
        if !self.is_ready() {
            return;
        }

        self.animation = None;
        self.camera = Camera {
            center,
            zoom: zoom.clamp(0.0, self.settings.max_zoom),
        };
    }

    /// Jump the camera to fit a cluster's bounds (cluster click). Always
    /// zooms in at least one level so repeated clicks break the cluster up.
    pub fn zoom_to_bounds(&mut self, bounds: GeoBounds, viewport: (f32, f32)) {
        if !self.is_ready() {
            return;
        }

        let (x1, y1) = projection::project(bounds.max_lat, bounds.min_lon);
        let (x2, y2) = projection::project(bounds.min_lat, bounds.max_lon);
        let span_x = (x2 - x1).abs();
        let span_y = (y2 - y1).abs();

        // Fit with some breathing room around the markers
        let fit = |viewport: f32, span: f64| -> f64 {
            if span < 1e-9 {
                self.settings.max_zoom
            } else {
                (viewport as f64 * 0.8 / span).log2()
            }
        };

        let target = fit(viewport.0, span_x)
            .min(fit(viewport.1, span_y))
            .max(self.camera.zoom + 1.0)
            .clamp(0.0, self.settings.max_zoom);

        self.animation = None;
        self.camera = Camera {
            center: bounds.center(),
            zoom: target,
        };
    }

    pub fn camera(&self) -> Camera {
        self.camera
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Look up a marker through the id association
    pub fn marker(&self, id: i64) -> Option<&Marker> {
        self.marker_index.get(&id).map(|&index| &self.markers[index])
    }

    pub fn tiles(&self) -> Option<&TileManager> {
        self.tiles.as_ref()
    }

    pub fn settings(&self) -> &AppConfig {
        &self.settings
    }
}

impl Default for MapController {
    fn default() -> Self {
        Self::new()
    }
}

fn ease_out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, name: &str, coordinates: Option<(f64, f64)>) -> Internship {
        Internship {
            id,
            company_name: name.to_string(),
            coordinates,
            address: String::new(),
            city: String::new(),
            description: String::new(),
            website: String::new(),
            email: String::new(),
            phone: String::new(),
            tags: Vec::new(),
            students: Vec::new(),
        }
    }

    fn record_with_year(id: i64, year: &str, coordinates: Option<(f64, f64)>) -> Internship {
        let mut record = record(id, "Acme", coordinates);
        record.students.push(crate::state::data::Student {
            id: 0,
            name: String::new(),
            duration: String::new(),
            year: year.to_string(),
            role: String::new(),
            description: String::new(),
        });
        record
    }

    fn ready_controller() -> MapController {
        let mut controller = MapController::new();
        controller.initialize(&AppConfig::default());
        controller
    }

    #[test]
    fn records_without_valid_coordinates_get_no_marker() {
        let mut controller = ready_controller();
        controller.set_records(
            &[
                record(1, "Acme", Some((52.1, 5.2))),
                record(2, "Beta", None),
                record(3, "Gamma", Some((f64::NAN, 5.2))),
                record(4, "Delta", Some((52.0, f64::INFINITY))),
            ],
            2024,
        );

        assert_eq!(controller.markers().len(), 1);
        assert!(controller.marker(1).is_some());
        assert!(controller.marker(2).is_none());
        assert!(controller.marker(3).is_none());
    }

    #[test]
    fn set_records_fully_replaces_the_marker_set() {
        let mut controller = ready_controller();
        controller.set_records(&[record(1, "Acme", Some((52.1, 5.2)))], 2024);
        controller.set_records(&[record(2, "Beta", Some((51.9, 4.5)))], 2024);

        assert_eq!(controller.markers().len(), 1);
        assert!(controller.marker(1).is_none());
        assert!(controller.marker(2).is_some());
    }

    #[test]
    fn marker_style_is_classified_at_creation() {
        let mut controller = ready_controller();
        controller.set_records(&[record_with_year(1, "2025", Some((52.1, 5.2)))], 2024);
        assert_eq!(controller.marker(1).unwrap().style, MarkerStyle::Recent);

        // Same data, stricter threshold: only a new set_records reclassifies
        controller.set_records(&[record_with_year(1, "2025", Some((52.1, 5.2)))], 2026);
        assert_eq!(controller.marker(1).unwrap().style, MarkerStyle::Default);
    }

    #[test]
    fn selection_highlights_selected_and_zoom_target() {
        let mut controller = ready_controller();
        controller.set_records(
            &[
                record(1, "Acme", Some((52.1, 5.2))),
                record(2, "Beta", Some((51.9, 4.5))),
                record(3, "Gamma", Some((51.4, 5.4))),
            ],
            2024,
        );

        controller.set_selection(Some(1), Some(2));
        assert!(controller.marker(1).unwrap().highlighted);
        assert!(controller.marker(2).unwrap().highlighted);
        assert!(!controller.marker(3).unwrap().highlighted);
    }

    #[test]
    fn selection_is_idempotent_and_clears_stale_highlights() {
        let mut controller = ready_controller();
        controller.set_records(
            &[
                record(1, "Acme", Some((52.1, 5.2))),
                record(2, "Beta", Some((51.9, 4.5))),
            ],
            2024,
        );

        controller.set_selection(Some(1), None);
        controller.set_selection(Some(1), None);
        let once: Vec<bool> = controller.markers().iter().map(|m| m.highlighted).collect();
        assert_eq!(once, vec![true, false]);

        // Moving the selection must unset the old highlight
        controller.set_selection(Some(2), None);
        assert!(!controller.marker(1).unwrap().highlighted);
        assert!(controller.marker(2).unwrap().highlighted);
    }

    #[test]
    fn refresh_reasserts_highlights_on_a_rebuilt_marker_set() {
        let mut controller = ready_controller();
        let records = [
            record(1, "Acme", Some((52.1, 5.2))),
            record(2, "Beta", Some((51.9, 4.5))),
        ];

        controller.set_records(&records, 2024);
        controller.set_selection(Some(2), None);

        // Rebuild drops all highlights; the camera-event refresh brings
        // the remembered selection back
        controller.set_records(&records, 2024);
        assert!(!controller.marker(2).unwrap().highlighted);
        controller.refresh_highlights();
        assert!(controller.marker(2).unwrap().highlighted);
    }

    #[test]
    fn operations_before_initialization_are_no_ops() {
        let mut controller = MapController::new();
        controller.set_records(&[record(1, "Acme", Some((52.1, 5.2)))], 2024);
        controller.set_selection(Some(1), None);
        controller.tick(Instant::now());
        assert!(controller.markers().is_empty());
        assert!(!controller.fly_to(&record(1, "Acme", Some((52.1, 5.2)))));
    }

    #[test]
    fn reinitializing_a_ready_controller_keeps_its_state() {
        let mut controller = ready_controller();
        controller.set_records(&[record(1, "Acme", Some((52.1, 5.2)))], 2024);

        controller.initialize(&AppConfig::default());
        assert_eq!(controller.markers().len(), 1);
    }

    #[test]
    fn fly_to_animates_to_target_zoom() {
        let mut controller = ready_controller();
        let target = record(1, "Acme", Some((52.1, 5.2)));

        assert!(controller.fly_to(&target));
        assert!(controller.is_animating());

        controller.tick(Instant::now() + Duration::from_secs(2));
        assert!(!controller.is_animating());

        let camera = controller.camera();
        assert!((camera.zoom - 14.0).abs() < 1e-9);
        assert!((camera.center.0 - 52.1).abs() < 1e-6);
        assert!((camera.center.1 - 5.2).abs() < 1e-6);
    }

    #[test]
    fn fly_to_without_coordinates_does_not_start() {
        let mut controller = ready_controller();
        assert!(!controller.fly_to(&record(1, "Acme", None)));
        assert!(!controller.fly_to(&record(1, "Acme", Some((f64::NAN, 5.2)))));
        assert!(!controller.is_animating());
    }

    #[test]
    fn a_second_fly_to_wins() {
        let mut controller = ready_controller();
        assert!(controller.fly_to(&record(1, "Acme", Some((52.1, 5.2)))));
        assert!(controller.fly_to(&record(2, "Beta", Some((51.0, 4.0)))));

        controller.tick(Instant::now() + Duration::from_secs(2));
        let camera = controller.camera();
        assert!((camera.center.0 - 51.0).abs() < 1e-6);
        assert!((camera.center.1 - 4.0).abs() < 1e-6);
    }

    #[test]
    fn tag_filtered_unmapped_company_lists_without_a_pin() {
        let mut controller = ready_controller();
        let mut acme = record(1, "Acme", Some((52.1, 5.2)));
        acme.tags.push("java".to_string());
        let mut beta = record(2, "Beta", None);
        beta.tags.push("python".to_string());
        let records = vec![acme, beta];

        // The python filter keeps only the unmapped company: it shows up
        // in the list view but never on the map
        let filtered =
            crate::state::filter::filter(&records, "", &["python".to_string()]);
        assert_eq!(filtered.iter().map(|r| r.id).collect::<Vec<_>>(), vec![2]);

        controller.set_records(&filtered, 2024);
        assert!(controller.markers().is_empty());
    }

    #[test]
    fn selection_churn_does_not_disturb_a_running_fly_to() {
        let mut controller = ready_controller();
        controller.set_records(&[record(1, "Acme", Some((52.1, 5.2)))], 2024);
        assert!(controller.fly_to(&record(1, "Acme", Some((52.1, 5.2)))));

        controller.set_selection(Some(1), Some(1));
        controller.set_selection(None, Some(1));
        controller.set_selection(Some(1), None);
        assert!(controller.is_animating());

        controller.tick(Instant::now() + Duration::from_secs(2));
        assert!(!controller.is_animating());
        assert!((controller.camera().zoom - 14.0).abs() < 1e-9);
    }

    #[test]
    fn user_camera_movement_cancels_the_animation() {
        let mut controller = ready_controller();
        assert!(controller.fly_to(&record(1, "Acme", Some((52.1, 5.2)))));
        controller.set_camera((53.0, 6.0), 9.0);
        assert!(!controller.is_animating());
        assert_eq!(controller.camera().center, (53.0, 6.0));
    }

    #[test]
    fn late_ticks_after_disposal_are_no_ops() {
        let mut controller = ready_controller();
        controller.set_records(&[record(1, "Acme", Some((52.1, 5.2)))], 2024);
        assert!(controller.fly_to(&record(1, "Acme", Some((52.1, 5.2)))));

        controller.dispose();
        let before = controller.camera();

        // The pending completion timer firing late must not touch anything
        controller.tick(Instant::now() + Duration::from_secs(2));
        controller.set_selection(Some(1), None);
        controller.set_records(&[record(2, "Beta", Some((51.9, 4.5)))], 2024);

        assert_eq!(controller.camera(), before);
        assert!(controller.markers().is_empty());
        assert!(controller.tiles().is_none());
    }

    #[test]
    fn zoom_to_bounds_zooms_in_on_the_cluster() {
        let mut controller = ready_controller();
        let bounds = GeoBounds {
            min_lat: 52.05,
            max_lat: 52.15,
            min_lon: 5.05,
            max_lon: 5.15,
        };

        let before = controller.camera().zoom;
        controller.zoom_to_bounds(bounds, (800.0, 600.0));
        let camera = controller.camera();

        assert!(camera.zoom > before);
        assert!(camera.zoom <= controller.settings().max_zoom);
        assert!((camera.center.0 - 52.1).abs() < 0.01);
        assert!((camera.center.1 - 5.1).abs() < 0.01);
    }
}
