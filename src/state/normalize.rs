/// Normalization of the raw company data file
///
/// The data file is a JSON export in the upstream CMS shape: a top-level
/// `data` array of loosely-typed company records (tags as a comma-separated
/// string or an array, coordinates as numbers or numeric strings, most
/// fields optional). This module turns that into the canonical
/// `Internship` list the rest of the app consumes. Defects in individual
/// fields degrade to defaults and never fail the load.

use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;

use super::data::{Internship, Student};

/// Placeholder shown when a record carries no company name
const UNKNOWN_COMPANY: &str = "Onbekend bedrijf";

/// Errors while loading the company data file
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDocument {
    data: Vec<RawCompany>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCompany {
    id: Option<i64>,
    #[serde(rename = "companyName")]
    company_name: Option<String>,
    tags: Option<Value>,
    lat: Option<Value>,
    lon: Option<Value>,
    address: Option<String>,
    city: Option<String>,
    description: Option<String>,
    website: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    studenten: Option<Vec<RawStudent>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawStudent {
    id: Option<i64>,
    name: Option<String>,
    duration: Option<String>,
    year: Option<Value>,
    role: Option<String>,
    description: Option<String>,
}

/// Load and normalize the company data file
pub async fn load_internships(path: PathBuf) -> Result<Vec<Internship>, DataError> {
    let display = path.display().to_string();

    let contents = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| DataError::Io {
            path: display.clone(),
            source,
        })?;

    let internships = normalize_str(&contents).map_err(|source| DataError::Parse {
        path: display.clone(),
        source,
    })?;

    println!("📦 Loaded {} companies from {}", internships.len(), display);
    Ok(internships)
}

/// Parse and normalize a raw JSON document
pub fn normalize_str(contents: &str) -> Result<Vec<Internship>, serde_json::Error> {
    let document: RawDocument = serde_json::from_str(contents)?;
    Ok(normalize(document))
}

fn normalize(document: RawDocument) -> Vec<Internship> {
    document
        .data
        .into_iter()
        .enumerate()
        .map(|(index, company)| {
            let coordinates = match (&company.lat, &company.lon) {
                (Some(lat), Some(lon)) => match (value_to_f64(lat), value_to_f64(lon)) {
                    (Some(lat), Some(lon)) => Some((lat, lon)),
                    _ => None,
                },
                _ => None,
            };

            Internship {
                id: company.id.unwrap_or(index as i64 + 1),
                company_name: company
                    .company_name
                    .filter(|name| !name.trim().is_empty())
                    .unwrap_or_else(|| UNKNOWN_COMPANY.to_string()),
                coordinates,
                address: company.address.unwrap_or_default(),
                city: company.city.unwrap_or_default(),
                description: company.description.unwrap_or_default(),
                website: ensure_url_protocol(&company.website.unwrap_or_default()),
                email: company.email.unwrap_or_default(),
                phone: company.phone.unwrap_or_default(),
                tags: normalize_tags(company.tags),
                students: company
                    .studenten
                    .unwrap_or_default()
                    .into_iter()
                    .enumerate()
                    .map(|(student_index, student)| Student {
                        id: student.id.unwrap_or(student_index as i64),
                        name: student.name.unwrap_or_default(),
                        duration: student.duration.unwrap_or_default(),
                        year: student.year.map(value_to_year).unwrap_or_default(),
                        role: student.role.unwrap_or_default(),
                        description: student.description.unwrap_or_default(),
                    })
                    .collect(),
            }
        })
        .collect()
}

/// Make sure a website URL carries a scheme. Blank input stays blank.
pub fn ensure_url_protocol(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let lower = trimmed.to_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return trimmed.to_string();
    }

    format!("https://{}", trimmed.trim_start_matches('/'))
}

/// Tags arrive either as "Java, Python" or as a proper array
fn normalize_tags(tags: Option<Value>) -> Vec<String> {
    match tags {
        Some(Value::String(joined)) => joined
            .split(',')
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect(),
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| item.as_str().map(|tag| tag.to_string()))
            .collect(),
        _ => Vec::new(),
    }
}

/// Accept a coordinate as a JSON number or a numeric string.
/// Non-finite values are rejected so they can never reach the map.
fn value_to_f64(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|number| number.is_finite())
}

/// Year as display text: integers render as integers, anything else
/// is kept verbatim
fn value_to_year(value: Value) -> String {
    match value {
        Value::Number(number) => number
            .as_i64()
            .map(|year| year.to_string())
            .unwrap_or_else(|| number.to_string()),
        Value::String(text) => match text.trim().parse::<i64>() {
            Ok(year) => year.to_string(),
            Err(_) => text,
        },
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_string_is_split_and_trimmed() {
        let input = r#"{"data": [{"companyName": "Acme", "tags": "Java, Python , ,C#"}]}"#;
        let records = normalize_str(input).unwrap();
        assert_eq!(records[0].tags, vec!["Java", "Python", "C#"]);
    }

    #[test]
    fn tags_array_is_taken_as_is() {
        let input = r#"{"data": [{"companyName": "Acme", "tags": ["Java", "Python"]}]}"#;
        let records = normalize_str(input).unwrap();
        assert_eq!(records[0].tags, vec!["Java", "Python"]);
    }

    #[test]
    fn missing_tags_become_empty() {
        let input = r#"{"data": [{"companyName": "Acme"}]}"#;
        let records = normalize_str(input).unwrap();
        assert!(records[0].tags.is_empty());
    }

    #[test]
    fn coordinates_accept_numbers_and_numeric_strings() {
        let input = r#"{"data": [
            {"companyName": "A", "lat": 52.1, "lon": 5.2},
            {"companyName": "B", "lat": "51.9", "lon": "4.5"}
        ]}"#;
        let records = normalize_str(input).unwrap();
        assert_eq!(records[0].coordinates, Some((52.1, 5.2)));
        assert_eq!(records[1].coordinates, Some((51.9, 4.5)));
    }

    #[test]
    fn malformed_coordinates_are_dropped() {
        let input = r#"{"data": [
            {"companyName": "A", "lat": "onbekend", "lon": 5.2},
            {"companyName": "B", "lat": 52.1},
            {"companyName": "C"}
        ]}"#;
        let records = normalize_str(input).unwrap();
        assert!(records.iter().all(|record| record.coordinates.is_none()));
    }

    #[test]
    fn missing_id_falls_back_to_index() {
        let input = r#"{"data": [{"companyName": "A"}, {"id": 7, "companyName": "B"}]}"#;
        let records = normalize_str(input).unwrap();
        assert_eq!(records[0].id, 1);
        assert_eq!(records[1].id, 7);
    }

    #[test]
    fn missing_company_name_gets_placeholder() {
        let input = r#"{"data": [{"id": 1}, {"id": 2, "companyName": "  "}]}"#;
        let records = normalize_str(input).unwrap();
        assert_eq!(records[0].company_name, UNKNOWN_COMPANY);
        assert_eq!(records[1].company_name, UNKNOWN_COMPANY);
    }

    #[test]
    fn website_gets_a_scheme() {
        assert_eq!(ensure_url_protocol("acme.nl"), "https://acme.nl");
        assert_eq!(ensure_url_protocol("//acme.nl"), "https://acme.nl");
        assert_eq!(ensure_url_protocol("  https://acme.nl "), "https://acme.nl");
        assert_eq!(ensure_url_protocol("HTTP://acme.nl"), "HTTP://acme.nl");
        assert_eq!(ensure_url_protocol("   "), "");
    }

    #[test]
    fn students_are_normalized_with_defaults() {
        let input = r#"{"data": [{
            "companyName": "Acme",
            "studenten": [
                {"name": "Kim", "year": 2024, "role": "Backend"},
                {"id": 9, "year": "2023"},
                {"year": "laatste jaar"}
            ]
        }]}"#;
        let records = normalize_str(input).unwrap();
        let students = &records[0].students;
        assert_eq!(students.len(), 3);
        assert_eq!(students[0].id, 0);
        assert_eq!(students[0].year, "2024");
        assert_eq!(students[1].id, 9);
        assert_eq!(students[1].year, "2023");
        assert_eq!(students[2].year, "laatste jaar");
        assert!(students[2].name.is_empty());
    }

    #[test]
    fn empty_document_yields_no_records() {
        assert!(normalize_str(r#"{"data": []}"#).unwrap().is_empty());
        assert!(normalize_str(r#"{}"#).unwrap().is_empty());
    }
}
