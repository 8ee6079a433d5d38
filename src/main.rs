use iced::widget::{button, column, container, row, stack, text};
use iced::{window, Alignment, Element, Length, Subscription, Task, Theme};
use rfd::FileDialog;
use std::path::PathBuf;
use std::time::{Duration, Instant};

mod config;
mod map;
mod state;
mod ui;

use config::AppConfig;
use map::cluster::GeoBounds;
use map::controller::MapController;
use map::view::MapView;
use state::data::Internship;
use state::{filter, normalize};

/// Main application state
struct Stagekaart {
    config: AppConfig,
    /// The full, immutable record list
    internships: Vec<Internship>,
    /// The current filtered view of it
    filtered: Vec<Internship>,
    search_term: String,
    selected_tags: Vec<String>,
    /// Company shown in the detail panel
    selected: Option<i64>,
    /// Transient fly-to target, cleared when the animation completes
    zoom_target: Option<i64>,
    map: MapController,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// Search term edited
    SearchChanged(String),
    /// A search dropdown result was clicked
    SearchResultClicked(i64),
    /// A company list row was clicked
    CompanyClicked(i64),
    /// A map pin was clicked
    MarkerClicked(i64),
    /// A cluster bubble was clicked
    ClusterClicked {
        bounds: GeoBounds,
        viewport: (f32, f32),
    },
    /// A tag chip (or the clear chip) was toggled
    TagToggled(String),
    /// The detail panel close button
    PanelClosed,
    /// User panned or zoomed the map
    CameraMoved { center: (f64, f64), zoom: f64 },
    /// Fly-to animation frame
    AnimationTick(Instant),
    /// The fixed-duration fly-to completion timer fired
    ZoomComplete,
    /// User clicked "Open data file"
    OpenDataFile,
    /// Background data load finished
    DataLoaded(Result<Vec<Internship>, String>),
    /// The window wants to close; dispose the map first
    CloseRequested(window::Id),
}

impl Stagekaart {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        let config = AppConfig::load();

        // The render target exists for the life of the window, so the map
        // widget state is created exactly once, right here
        let mut map = MapController::new();
        map.initialize(&config);

        // Optional data file override on the command line
        let data_file = std::env::args()
            .nth(1)
            .map(PathBuf::from)
            .unwrap_or_else(|| config.data_file.clone());

        let app = Stagekaart {
            config,
            internships: Vec::new(),
            filtered: Vec::new(),
            search_term: String::new(),
            selected_tags: Vec::new(),
            selected: None,
            zoom_target: None,
            map,
            status: format!("Loading {}...", data_file.display()),
        };

        let load = Task::perform(normalize::load_internships(data_file), |result| {
            Message::DataLoaded(result.map_err(|e| e.to_string()))
        });

        (app, load)
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::SearchChanged(term) => {
                self.search_term = term;
                self.refilter();
                Task::none()
            }
            Message::TagToggled(tag) => {
                filter::toggle_tag(&mut self.selected_tags, &tag);
                self.refilter();
                Task::none()
            }
            Message::SearchResultClicked(id) => {
                // Clear the search when selecting a result
                self.search_term.clear();
                self.refilter();
                self.select_company(id)
            }
            Message::CompanyClicked(id) | Message::MarkerClicked(id) => self.select_company(id),
            Message::PanelClosed => {
                // Only the selection clears; a pending zoom target keeps
                // its own lifecycle
                self.selected = None;
                self.sync_selection();
                Task::none()
            }
            Message::ClusterClicked { bounds, viewport } => {
                self.map.zoom_to_bounds(bounds, viewport);
                self.map.refresh_highlights();
                Task::none()
            }
            Message::CameraMoved { center, zoom } => {
                self.map.set_camera(center, zoom);
                // Re-clustering may rebuild the visible nodes, so the
                // highlight state is reasserted after every camera event
                self.map.refresh_highlights();
                Task::none()
            }
            Message::AnimationTick(now) => {
                self.map.tick(now);
                Task::none()
            }
            Message::ZoomComplete => {
                // Clearing an already-empty target is a no-op; overlapping
                // timers may both land here
                self.zoom_target = None;
                self.sync_selection();
                Task::none()
            }
            Message::OpenDataFile => {
                let file = FileDialog::new()
                    .set_title("Select a company data file")
                    .add_filter("JSON", &["json"])
                    .pick_file();

                if let Some(path) = file {
                    self.status = format!("Loading {}...", path.display());
                    return Task::perform(normalize::load_internships(path), |result| {
                        Message::DataLoaded(result.map_err(|e| e.to_string()))
                    });
                }
                Task::none()
            }
            Message::DataLoaded(Ok(internships)) => {
                self.status = format!("Ready. {} companies in the library.", internships.len());
                self.internships = internships;
                self.selected = None;
                self.zoom_target = None;
                self.refilter();
                Task::none()
            }
            Message::DataLoaded(Err(error)) => {
                eprintln!("⚠️  Could not load company data: {}", error);
                self.status = format!("Could not load company data: {}", error);
                self.internships = Vec::new();
                self.refilter();
                Task::none()
            }
            Message::CloseRequested(id) => {
                // Deterministic teardown before the window goes away; the
                // pending fly-to timer firing afterwards is a no-op
                self.map.dispose();
                window::close(id)
            }
        }
    }

    /// Recompute the filtered list and push it to the map. The marker set
    /// is always replaced before the selection is re-applied, so the
    /// highlight pass sees the new markers.
    fn refilter(&mut self) {
        self.filtered = filter::filter(&self.internships, &self.search_term, &self.selected_tags);
        self.map
            .set_records(&self.filtered, self.config.threshold_year());
        self.sync_selection();
    }

    fn sync_selection(&mut self) {
        self.map.set_selection(self.selected, self.zoom_target);
    }

    /// Select a company and fly the camera to its pin. The completion
    /// timer mirrors the animation duration; it always fires once per
    /// scheduled fly and clears the zoom target.
    fn select_company(&mut self, id: i64) -> Task<Message> {
        let Some(record) = self.internships.iter().find(|record| record.id == id).cloned() else {
            return Task::none();
        };

        self.selected = Some(id);
        self.zoom_target = Some(id);
        self.sync_selection();

        if self.map.fly_to(&record) {
            let wait = Duration::from_secs_f64(self.config.fly_to_seconds);
            Task::perform(tokio::time::sleep(wait), |_| Message::ZoomComplete)
        } else {
            // A company without a pin cannot be flown to; drop the zoom
            // target right away so no pending zoom state leaks
            self.zoom_target = None;
            self.sync_selection();
            Task::none()
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let header = row![
            column![
                text("Stagekaart").size(24),
                text("Waar onze studenten afgelopen jaar stage hebben gelopen.")
                    .size(12)
                    .color([0.45, 0.45, 0.45]),
            ]
            .spacing(2)
            .width(Length::Fill),
            button(text("Open data file").size(13))
                .on_press(Message::OpenDataFile)
                .padding([6.0, 10.0])
                .style(button::secondary),
            container(ui::search::search_bar(&self.search_term, &self.filtered)).width(320.0),
        ]
        .spacing(12)
        .padding(12)
        .align_y(Alignment::Start);

        let available = filter::available_tags(&self.internships);
        let counts = filter::tag_counts(&self.internships, &available);
        let stats = filter::stats(&self.internships);

        let map_area = stack![
            Element::from(MapView::new(&self.map)),
            container(ui::tags::tag_filter(
                &available,
                &self.selected_tags,
                &counts,
                stats
            ))
            .center_x(Length::Fill)
            .padding(12),
        ]
        .width(Length::Fill)
        .height(Length::Fill);

        let selected_record = self
            .selected
            .and_then(|id| self.internships.iter().find(|record| record.id == id));

        let side_panel: Element<Message> = match selected_record {
            Some(record) => ui::panel::internship_panel(record),
            None => ui::company_list::company_list(&self.filtered),
        };

        let content = row![
            container(map_area)
                .width(Length::FillPortion(2))
                .height(Length::Fill),
            container(side_panel)
                .width(Length::FillPortion(1))
                .height(Length::Fill)
                .style(container::bordered_box),
        ]
        .height(Length::Fill);

        column![
            header,
            content,
            text(&self.status).size(12).color([0.4, 0.4, 0.4]),
        ]
        .spacing(4)
        .height(Length::Fill)
        .into()
    }

    fn subscription(&self) -> Subscription<Message> {
        let mut subscriptions = vec![window::close_requests().map(Message::CloseRequested)];

        // Only tick while a fly-to is actually running
        if self.map.is_animating() {
            subscriptions
                .push(iced::time::every(Duration::from_millis(16)).map(Message::AnimationTick));
        }

        Subscription::batch(subscriptions)
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Light
    }
}

fn main() -> iced::Result {
    iced::application("Stagekaart", Stagekaart::update, Stagekaart::view)
        .theme(Stagekaart::theme)
        .subscription(Stagekaart::subscription)
        .window(window::Settings {
            // The close request routes through update() so the map widget
            // gets disposed deterministically first
            exit_on_close_request: false,
            ..Default::default()
        })
        .window_size(iced::Size::new(1280.0, 800.0))
        .centered()
        .run_with(Stagekaart::new)
}
