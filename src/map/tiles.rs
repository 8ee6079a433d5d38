/// OSM raster tile fetching and caching
///
/// Tiles live in a small LRU memory cache backed by an on-disk cache under
/// the user cache directory. Misses are fetched on background threads; a
/// tile that is not there yet renders as a gray quad and gets requested.

use iced::widget::image;
use lru::LruCache;
use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Memory cache capacity in tiles
const MEMORY_TILES: usize = 300;

/// HTTP User-Agent, required by the OSM tile usage policy
const USER_AGENT: &str = "stagekaart/0.1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoords {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl TileCoords {
    fn url(&self, template: &str) -> String {
        template
            .replace("{z}", &self.z.to_string())
            .replace("{x}", &self.x.to_string())
            .replace("{y}", &self.y.to_string())
    }
}

pub struct TileManager {
    url_template: String,
    tiles: Arc<Mutex<LruCache<TileCoords, image::Handle>>>,
    pending: Arc<Mutex<HashSet<TileCoords>>>,
}

impl TileManager {
    pub fn new(url_template: String) -> Self {
        Self {
            url_template,
            tiles: Arc::new(Mutex::new(LruCache::new(
                NonZeroUsize::new(MEMORY_TILES).unwrap(),
            ))),
            pending: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn get_tile(&self, coords: TileCoords) -> Option<image::Handle> {
        let mut tiles = self.tiles.lock().unwrap();
        tiles.get(&coords).cloned()
    }

    /// Kick off a background fetch for a missing tile. Duplicate requests
    /// while a fetch is in flight are dropped.
    pub fn request_tile(&self, coords: TileCoords) {
        {
            let mut pending = self.pending.lock().unwrap();
            if pending.contains(&coords) {
                return;
            }
            let tiles = self.tiles.lock().unwrap();
            if tiles.contains(&coords) {
                return;
            }
            pending.insert(coords);
        }

        let tiles_arc = Arc::clone(&self.tiles);
        let pending_arc = Arc::clone(&self.pending);
        let url = coords.url(&self.url_template);
        let cache_path = disk_cache_path(coords);

        std::thread::spawn(move || {
            // Disk cache first
            if cache_path.exists() {
                if let Ok(bytes) = std::fs::read(&cache_path) {
                    let handle = image::Handle::from_bytes(bytes);
                    tiles_arc.lock().unwrap().put(coords, handle);
                    pending_arc.lock().unwrap().remove(&coords);
                    return;
                }
            }

            // Then the network
            let response = ureq::get(&url)
                .set("User-Agent", USER_AGENT)
                .timeout(std::time::Duration::from_secs(10))
                .call();

            match response {
                Ok(response) => {
                    let mut bytes = Vec::new();
                    if std::io::Read::read_to_end(&mut response.into_reader(), &mut bytes).is_ok() {
                        let handle = image::Handle::from_bytes(bytes.clone());
                        tiles_arc.lock().unwrap().put(coords, handle);

                        if let Some(parent) = cache_path.parent() {
                            let _ = std::fs::create_dir_all(parent);
                        }
                        let _ = std::fs::write(&cache_path, bytes);
                    }
                }
                Err(e) => {
                    eprintln!("⚠️  Failed to fetch tile {:?}: {}", coords, e);
                }
            }
            pending_arc.lock().unwrap().remove(&coords);
        });
    }
}

/// Tile cache location, ~/.cache/stagekaart/tiles on Linux
fn disk_cache_path(coords: TileCoords) -> PathBuf {
    let mut path = dirs::cache_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."));

    path.push("stagekaart");
    path.push("tiles");
    path.push(coords.z.to_string());
    path.push(coords.x.to_string());
    path.push(format!("{}.png", coords.y));
    path
}
