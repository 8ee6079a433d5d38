/// The map widget
///
/// An iced `advanced::Widget` that renders the tile layer, the clustered
/// company pins and the attribution line, and translates mouse input into
/// application messages: wheel zoom around the cursor, drag panning, and
/// click selection with a small movement threshold to tell clicks and
/// drags apart. Clicking a pin only publishes the record id; the camera
/// never moves from a marker click itself.

use iced::advanced::image::Renderer as _;
use iced::advanced::renderer::Renderer as _;
use iced::advanced::text::{Renderer as _, Text};
use iced::advanced::{self, layout, renderer, widget, Layout, Widget};
use iced::{
    alignment, mouse, Border, Color, Element, Event, Length, Pixels, Point, Radians, Rectangle,
    Size, Theme,
};

use super::cluster::{self, ClusterNode};
use super::controller::{MapController, MarkerStyle};
use super::projection::{lat_to_y, lon_to_x, x_to_lon, y_to_lat, TILE_SIZE};
use super::tiles::TileCoords;
use crate::Message;

/// Movement below this many pixels between press and release counts as
/// a click, not a drag
const CLICK_THRESHOLD: f32 = 5.0;

/// Pin diameter in pixels
const PIN_SIZE: f32 = 12.0;
const PIN_SIZE_HIGHLIGHTED: f32 = 18.0;

/// Cluster bubble diameter in pixels
const CLUSTER_SIZE: f32 = 34.0;

pub struct MapView<'a> {
    pub controller: &'a MapController,
}

impl<'a> MapView<'a> {
    pub fn new(controller: &'a MapController) -> Self {
        Self { controller }
    }

    fn nodes(&self, zoom: f64) -> Vec<ClusterNode> {
        let settings = self.controller.settings();
        cluster::cluster_markers(
            self.controller.markers(),
            zoom,
            settings.cluster_radius,
            settings.cluster_disable_zoom,
        )
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct MapState {
    is_dragging: bool,
    press_position: Option<Point>,
    last_cursor: Option<Point>,
    // Track values between prop updates so several events in one frame
    // stay consistent
    current_center: (f64, f64),
    current_zoom: f64,
    last_prop_center: Option<(f64, f64)>,
    last_prop_zoom: Option<f64>,
}

impl<'a> Widget<Message, Theme, iced::Renderer> for MapView<'a> {
    fn size(&self) -> Size<Length> {
        Size {
            width: Length::Fill,
            height: Length::Fill,
        }
    }

    fn tag(&self) -> widget::tree::Tag {
        widget::tree::Tag::of::<MapState>()
    }

    fn state(&self) -> widget::tree::State {
        widget::tree::State::new(MapState::default())
    }

    fn layout(
        &self,
        _tree: &mut widget::Tree,
        _renderer: &iced::Renderer,
        limits: &layout::Limits,
    ) -> layout::Node {
        layout::Node::new(limits.max())
    }

    fn draw(
        &self,
        tree: &widget::Tree,
        renderer: &mut iced::Renderer,
        _theme: &Theme,
        _style: &renderer::Style,
        layout: Layout<'_>,
        _cursor: mouse::Cursor,
        _viewport: &Rectangle,
    ) {
        let state = tree.state.downcast_ref::<MapState>();
        let bounds = layout.bounds();

        if !self.controller.is_ready() {
            renderer.fill_quad(
                renderer::Quad {
                    bounds,
                    ..Default::default()
                },
                Color::from_rgb(0.08, 0.08, 0.1),
            );
            return;
        }

        // Prefer internal state during interactions for zero-latency feedback
        let camera = self.controller.camera();
        let zoom = if state.last_prop_zoom.is_some() {
            state.current_zoom
        } else {
            camera.zoom
        };
        let (center_lat, center_lon) = if state.last_prop_center.is_some() {
            state.current_center
        } else {
            camera.center
        };

        let zoom_scale = 2.0f64.powf(zoom);
        let camera_center_x = lon_to_x(center_lon, 0.0);
        let camera_center_y = lat_to_y(center_lat, 0.0);

        let half_w = (bounds.width as f64 / 2.0) / zoom_scale;
        let half_h = (bounds.height as f64 / 2.0) / zoom_scale;
        let view_left = camera_center_x - half_w;
        let view_right = camera_center_x + half_w;
        let view_top = camera_center_y - half_h;
        let view_bottom = camera_center_y + half_h;

        let to_screen = |wx: f64, wy: f64| -> Point {
            Point::new(
                bounds.x + bounds.width / 2.0 + ((wx - camera_center_x) * zoom_scale) as f32,
                bounds.y + bounds.height / 2.0 + ((wy - camera_center_y) * zoom_scale) as f32,
            )
        };

        renderer.with_layer(bounds, |renderer| {
            renderer.fill_quad(
                renderer::Quad {
                    bounds,
                    ..Default::default()
                },
                Color::from_rgb(0.83, 0.87, 0.9),
            );

            // --- Tile layer ---
            let Some(tiles) = self.controller.tiles() else {
                return;
            };

            let z = zoom.floor().clamp(0.0, 19.0) as u32;
            let num_tiles = 2u32.pow(z);
            let tile_size_z0 = TILE_SIZE / 2.0f64.powf(z as f64);

            let min_tx = (view_left / tile_size_z0).floor() as i32;
            let max_tx = (view_right / tile_size_z0).ceil() as i32;
            let min_ty = (view_top / tile_size_z0).floor() as i32;
            let max_ty = (view_bottom / tile_size_z0).ceil() as i32;

            for tx in min_tx..=max_tx {
                if tx < 0 || tx >= num_tiles as i32 {
                    continue;
                }
                for ty in min_ty..=max_ty {
                    if ty < 0 || ty >= num_tiles as i32 {
                        continue;
                    }

                    let coords = TileCoords {
                        x: tx as u32,
                        y: ty as u32,
                        z,
                    };
                    let top_left = to_screen(tx as f64 * tile_size_z0, ty as f64 * tile_size_z0);
                    let current_tile_size = (tile_size_z0 * zoom_scale) as f32;
                    let tile_rect = Rectangle {
                        x: top_left.x,
                        y: top_left.y,
                        width: current_tile_size,
                        height: current_tile_size,
                    };

                    if let Some(handle) = tiles.get_tile(coords) {
                        renderer.draw_image(
                            advanced::image::Image {
                                handle,
                                filter_method: iced::widget::image::FilterMethod::Linear,
                                rotation: Radians(0.0),
                                opacity: 1.0,
                                snap: false,
                            },
                            tile_rect,
                        );
                    } else {
                        renderer.fill_quad(
                            renderer::Quad {
                                bounds: tile_rect,
                                ..Default::default()
                            },
                            Color::from_rgb(0.9, 0.9, 0.9),
                        );
                        tiles.request_tile(coords);
                    }
                }
            }
        });

        // --- Marker layer ---
        // Separate layer so pins always sit on top of the tiles
        renderer.with_layer(bounds, |renderer| {
            for node in self.nodes(zoom) {
                match node {
                    ClusterNode::Single {
                        position,
                        style,
                        highlighted,
                        ..
                    } => {
                        let (wx, wy) = (lon_to_x(position.1, 0.0), lat_to_y(position.0, 0.0));
                        if wx < view_left || wx > view_right || wy < view_top || wy > view_bottom {
                            continue;
                        }
                        let screen = to_screen(wx, wy);

                        let size = if highlighted {
                            PIN_SIZE_HIGHLIGHTED
                        } else {
                            PIN_SIZE
                        };
                        let fill = if highlighted {
                            Color::from_rgb(0.95, 0.6, 0.1)
                        } else {
                            match style {
                                MarkerStyle::Recent => Color::from_rgb(0.13, 0.65, 0.35),
                                MarkerStyle::Default => Color::from_rgb(0.15, 0.4, 0.85),
                            }
                        };

                        renderer.fill_quad(
                            renderer::Quad {
                                bounds: Rectangle {
                                    x: screen.x - size / 2.0,
                                    y: screen.y - size / 2.0,
                                    width: size,
                                    height: size,
                                },
                                border: Border {
                                    color: Color::WHITE,
                                    width: if highlighted { 2.0 } else { 1.0 },
                                    radius: (size / 2.0).into(),
                                },
                                ..Default::default()
                            },
                            fill,
                        );
                    }
                    ClusterNode::Cluster {
                        count, position, ..
                    } => {
                        let (wx, wy) = (lon_to_x(position.1, 0.0), lat_to_y(position.0, 0.0));
                        if wx < view_left || wx > view_right || wy < view_top || wy > view_bottom {
                            continue;
                        }
                        let screen = to_screen(wx, wy);

                        renderer.fill_quad(
                            renderer::Quad {
                                bounds: Rectangle {
                                    x: screen.x - CLUSTER_SIZE / 2.0,
                                    y: screen.y - CLUSTER_SIZE / 2.0,
                                    width: CLUSTER_SIZE,
                                    height: CLUSTER_SIZE,
                                },
                                border: Border {
                                    color: Color::from_rgba(1.0, 1.0, 1.0, 0.9),
                                    width: 3.0,
                                    radius: (CLUSTER_SIZE / 2.0).into(),
                                },
                                ..Default::default()
                            },
                            Color::from_rgb(0.15, 0.45, 0.8),
                        );

                        renderer.fill_text(
                            Text {
                                content: count.to_string(),
                                bounds: Size::new(CLUSTER_SIZE, CLUSTER_SIZE),
                                size: Pixels(13.0),
                                line_height: advanced::text::LineHeight::default(),
                                font: iced::Font::default(),
                                horizontal_alignment: alignment::Horizontal::Center,
                                vertical_alignment: alignment::Vertical::Center,
                                shaping: advanced::text::Shaping::Basic,
                                wrapping: advanced::text::Wrapping::default(),
                            },
                            screen,
                            Color::WHITE,
                            bounds,
                        );
                    }
                }
            }

            // Attribution, required for OSM tiles
            let attribution = "© OpenStreetMap contributors";
            let badge = Rectangle {
                x: bounds.x + bounds.width - 200.0,
                y: bounds.y + bounds.height - 18.0,
                width: 200.0,
                height: 18.0,
            };
            renderer.fill_quad(
                renderer::Quad {
                    bounds: badge,
                    ..Default::default()
                },
                Color::from_rgba(1.0, 1.0, 1.0, 0.7),
            );
            renderer.fill_text(
                Text {
                    content: attribution.to_string(),
                    bounds: badge.size(),
                    size: Pixels(11.0),
                    line_height: advanced::text::LineHeight::default(),
                    font: iced::Font::default(),
                    horizontal_alignment: alignment::Horizontal::Center,
                    vertical_alignment: alignment::Vertical::Center,
                    shaping: advanced::text::Shaping::Advanced,
                    wrapping: advanced::text::Wrapping::default(),
                },
                badge.center(),
                Color::from_rgb(0.25, 0.25, 0.25),
                bounds,
            );
        });
    }

    fn on_event(
        &mut self,
        tree: &mut widget::Tree,
        event: Event,
        layout: Layout<'_>,
        cursor: mouse::Cursor,
        _renderer: &iced::Renderer,
        _clipboard: &mut dyn advanced::Clipboard,
        shell: &mut advanced::Shell<'_, Message>,
        _viewport: &Rectangle,
    ) -> iced::event::Status {
        if !self.controller.is_ready() {
            return iced::event::Status::Ignored;
        }

        let state = tree.state.downcast_mut::<MapState>();
        let bounds = layout.bounds();
        let camera = self.controller.camera();

        // Sync internal state when the camera changed externally (fly-to,
        // cluster zoom)
        if state.last_prop_center != Some(camera.center) || state.last_prop_zoom != Some(camera.zoom)
        {
            state.current_center = camera.center;
            state.current_zoom = camera.zoom;
            state.last_prop_center = Some(camera.center);
            state.last_prop_zoom = Some(camera.zoom);
        }

        let current_zoom = state.current_zoom;
        let (center_lat, center_lon) = state.current_center;

        let camera_x = lon_to_x(center_lon, 0.0);
        let camera_y = lat_to_y(center_lat, 0.0);
        let scale = 2.0f64.powf(current_zoom);

        let cursor_point = cursor.position_in(bounds);
        let cursor_z0 = cursor_point.map(|p| {
            let rx = (p.x as f64) - (bounds.width as f64 / 2.0);
            let ry = (p.y as f64) - (bounds.height as f64 / 2.0);
            (camera_x + rx / scale, camera_y + ry / scale)
        });

        match event {
            Event::Mouse(mouse::Event::WheelScrolled { delta }) => {
                if let Some(p) = cursor_point {
                    let d = match delta {
                        mouse::ScrollDelta::Lines { y, .. } => y as f64,
                        mouse::ScrollDelta::Pixels { y, .. } => (y as f64) / 100.0,
                    };
                    let min_zoom = (bounds.width as f64 / TILE_SIZE).log2().max(0.0);
                    let max_zoom = self.controller.settings().max_zoom;
                    let new_zoom = (current_zoom + d * 0.2).clamp(min_zoom, max_zoom);

                    if (new_zoom - current_zoom).abs() > 0.001 {
                        let new_scale = 2.0f64.powf(new_zoom);

                        // Keep the point under the cursor fixed while zooming
                        let mx = (p.x as f64) - (bounds.width as f64 / 2.0);
                        let my = (p.y as f64) - (bounds.height as f64 / 2.0);
                        let new_camera_x = camera_x + mx / scale - mx / new_scale;
                        let new_camera_y = camera_y + my / scale - my / new_scale;

                        let new_half_w = (bounds.width as f64 / 2.0) / new_scale;
                        let clamped_x = new_camera_x.clamp(new_half_w, TILE_SIZE - new_half_w);
                        let clamped_y = new_camera_y.clamp(0.0, TILE_SIZE);

                        let new_center = (y_to_lat(clamped_y, 0.0), x_to_lon(clamped_x, 0.0));
                        state.current_center = new_center;
                        state.current_zoom = new_zoom;

                        shell.publish(Message::CameraMoved {
                            center: new_center,
                            zoom: new_zoom,
                        });
                        return iced::event::Status::Captured;
                    }
                }
            }
            Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                if cursor.is_over(bounds) {
                    if let Some(position) = cursor.position() {
                        state.is_dragging = true;
                        state.press_position = Some(position);
                        state.last_cursor = Some(position);
                        return iced::event::Status::Captured;
                    }
                }
            }
            Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                let was_dragging = state.is_dragging;
                let press_pos = state.press_position;
                let release_pos = cursor.position();

                state.is_dragging = false;
                state.press_position = None;
                state.last_cursor = None;

                if was_dragging {
                    if let (Some(p1), Some(p2)) = (press_pos, release_pos) {
                        let moved = (p1.x - p2.x).hypot(p1.y - p2.y);
                        if moved < CLICK_THRESHOLD {
                            if let Some((wx, wy)) = cursor_z0 {
                                if let Some(message) = self.hit_test(
                                    wx,
                                    wy,
                                    current_zoom,
                                    scale,
                                    (bounds.width, bounds.height),
                                ) {
                                    shell.publish(message);
                                }
                            }
                        }
                    }
                    return iced::event::Status::Captured;
                }
            }
            Event::Mouse(mouse::Event::CursorMoved { position }) => {
                if state.is_dragging {
                    if let Some(last_pos) = state.last_cursor {
                        let delta = position - last_pos;
                        state.last_cursor = Some(position);

                        let new_wx = camera_x - delta.x as f64 / scale;
                        let new_wy = camera_y - delta.y as f64 / scale;

                        let half_vw = (bounds.width as f64 / 2.0) / scale;
                        let half_vh = (bounds.height as f64 / 2.0) / scale;

                        let clamped_x = if half_vw * 2.0 >= TILE_SIZE {
                            TILE_SIZE / 2.0
                        } else {
                            new_wx.clamp(half_vw, TILE_SIZE - half_vw)
                        };
                        let clamped_y = if half_vh * 2.0 >= TILE_SIZE {
                            TILE_SIZE / 2.0
                        } else {
                            new_wy.clamp(half_vh, TILE_SIZE - half_vh)
                        };

                        let new_center = (y_to_lat(clamped_y, 0.0), x_to_lon(clamped_x, 0.0));
                        state.current_center = new_center;

                        shell.publish(Message::CameraMoved {
                            center: new_center,
                            zoom: current_zoom,
                        });
                        return iced::event::Status::Captured;
                    }
                }
            }
            _ => {}
        }

        iced::event::Status::Ignored
    }

    fn mouse_interaction(
        &self,
        _tree: &widget::Tree,
        layout: Layout<'_>,
        cursor: mouse::Cursor,
        _viewport: &Rectangle,
        _renderer: &iced::Renderer,
    ) -> mouse::Interaction {
        if cursor.is_over(layout.bounds()) {
            mouse::Interaction::Pointer
        } else {
            mouse::Interaction::default()
        }
    }
}

impl<'a> MapView<'a> {
    /// Find what was clicked at a zoom-0 world position. Pins win over
    /// clusters so a lone company next to a bubble stays selectable.
    fn hit_test(
        &self,
        wx: f64,
        wy: f64,
        zoom: f64,
        scale: f64,
        viewport: (f32, f32),
    ) -> Option<Message> {
        let nodes = self.nodes(zoom);

        for node in &nodes {
            if let ClusterNode::Single { id, position, .. } = node {
                let tx = lon_to_x(position.1, 0.0);
                let ty = lat_to_y(position.0, 0.0);
                let dist_sq = (tx - wx).powi(2) + (ty - wy).powi(2);
                let radius = (PIN_SIZE_HIGHLIGHTED as f64 / 2.0 + 2.0) / scale;
                if dist_sq < radius * radius {
                    return Some(Message::MarkerClicked(*id));
                }
            }
        }

        for node in &nodes {
            if let ClusterNode::Cluster { position, bounds, .. } = node {
                let tx = lon_to_x(position.1, 0.0);
                let ty = lat_to_y(position.0, 0.0);
                let dist_sq = (tx - wx).powi(2) + (ty - wy).powi(2);
                let radius = (CLUSTER_SIZE as f64 / 2.0) / scale;
                if dist_sq < radius * radius {
                    return Some(Message::ClusterClicked {
                        bounds: *bounds,
                        viewport,
                    });
                }
            }
        }

        None
    }
}

impl<'a> From<MapView<'a>> for Element<'a, Message> {
    fn from(view: MapView<'a>) -> Self {
        Self::new(view)
    }
}
