/// Offline batch geocoder
///
/// Pre-populates the coordinates in the company data file. Not part of the
/// running app: run it once against a JSON array of addresses and paste the
/// results back into the data file.
///
/// Usage: geocode <addresses.json> <output.json>
///
/// The input is a JSON array of {companyName, address, city}. Every entry
/// is looked up against the free OpenStreetMap Nominatim service, which
/// requires at most one request per second, so the batch sleeps between
/// requests. Failures and no-matches produce null fields and never abort
/// the batch.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Nominatim usage policy: identify yourself and stay under 1 req/s
const USER_AGENT: &str = "stagekaart-geocode/0.1";
const REQUEST_DELAY: Duration = Duration::from_millis(1100);

#[derive(Debug, Deserialize)]
struct AddressEntry {
    #[serde(rename = "companyName")]
    company_name: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    city: String,
}

#[derive(Debug, Serialize)]
struct GeocodeResult {
    #[serde(rename = "companyName")]
    company_name: String,
    address: String,
    city: String,
    coordinates: Option<(f64, f64)>,
    #[serde(rename = "displayName")]
    display_name: Option<String>,
    confidence: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct NominatimHit {
    lat: String,
    lon: String,
    display_name: String,
    #[serde(default)]
    importance: Option<f64>,
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: geocode <addresses.json> <output.json>");
        std::process::exit(2);
    }

    let contents = match std::fs::read_to_string(&args[1]) {
        Ok(contents) => contents,
        Err(e) => {
            eprintln!("❌ Cannot read {}: {}", args[1], e);
            std::process::exit(1);
        }
    };

    let entries: Vec<AddressEntry> = match serde_json::from_str(&contents) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("❌ Cannot parse {}: {}", args[1], e);
            std::process::exit(1);
        }
    };

    let total = entries.len();
    let mut results = Vec::with_capacity(total);

    for (index, entry) in entries.into_iter().enumerate() {
        println!("🔍 Processing {}/{}: {}", index + 1, total, entry.company_name);

        let hit = geocode_address(&entry.address, &entry.city);
        if hit.is_none() {
            eprintln!("⚠️  No coordinates found for: {}", entry.company_name);
        }

        results.push(GeocodeResult {
            company_name: entry.company_name,
            address: entry.address,
            city: entry.city,
            coordinates: hit.as_ref().map(|hit| hit.0),
            display_name: hit.as_ref().map(|hit| hit.1.clone()),
            confidence: hit.as_ref().and_then(|hit| hit.2),
        });

        // Rate limiting: wait between requests
        if index + 1 < total {
            std::thread::sleep(REQUEST_DELAY);
        }
    }

    let found = results.iter().filter(|r| r.coordinates.is_some()).count();
    let json = serde_json::to_string_pretty(&results).expect("results always serialize");

    if let Err(e) = std::fs::write(&args[2], json) {
        eprintln!("❌ Cannot write {}: {}", args[2], e);
        std::process::exit(1);
    }

    println!("✅ Geocoded {}/{} addresses into {}", found, total, args[2]);
}

/// One address lookup. Network errors and no-matches both come back as
/// None; the caller decides how loudly to complain.
fn geocode_address(address: &str, city: &str) -> Option<((f64, f64), String, Option<f64>)> {
    let query = if city.is_empty() {
        format!("{}, Netherlands", address)
    } else {
        format!("{}, {}, Netherlands", address, city)
    };

    let response = ureq::get("https://nominatim.openstreetmap.org/search")
        .set("User-Agent", USER_AGENT)
        .query("format", "json")
        .query("q", &query)
        .query("countrycodes", "nl")
        .query("limit", "1")
        .query("addressdetails", "1")
        .timeout(Duration::from_secs(10))
        .call();

    let response = match response {
        Ok(response) => response,
        Err(e) => {
            eprintln!("⚠️  Geocoding error for {}: {}", address, e);
            return None;
        }
    };

    let hits: Vec<NominatimHit> = match response.into_json() {
        Ok(hits) => hits,
        Err(e) => {
            eprintln!("⚠️  Malformed geocoding response for {}: {}", address, e);
            return None;
        }
    };

    let hit = hits.into_iter().next()?;
    let lat = hit.lat.parse::<f64>().ok()?;
    let lon = hit.lon.parse::<f64>().ok()?;

    println!("📍 Found {} at ({}, {})", hit.display_name, lat, lon);
    Some(((lat, lon), hit.display_name, hit.importance))
}
