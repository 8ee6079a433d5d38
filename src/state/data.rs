/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the normalization layer and the UI layer. Records are immutable
/// after normalization.

/// Represents a single company with its internship listings
#[derive(Debug, Clone, PartialEq)]
pub struct Internship {
    /// Unique record ID
    pub id: i64,
    /// Company display name (never empty after normalization)
    pub company_name: String,
    /// (latitude, longitude), both finite. None means the record is
    /// unmapped: it stays visible in the list and search views but
    /// never gets a pin.
    pub coordinates: Option<(f64, f64)>,
    /// Street address
    pub address: String,
    /// City name
    pub city: String,
    /// Company description
    pub description: String,
    /// Website URL (scheme guaranteed by normalization, or empty)
    pub website: String,
    /// Contact email
    pub email: String,
    /// Contact phone number
    pub phone: String,
    /// Technology tags (order preserved, may repeat across records)
    pub tags: Vec<String>,
    /// Students who interned at this company
    pub students: Vec<Student>,
}

/// One student internship entry at a company
#[derive(Debug, Clone, PartialEq)]
pub struct Student {
    /// Upstream entry ID (falls back to the entry index)
    pub id: i64,
    /// Student name
    pub name: String,
    /// Internship duration, free text (e.g. "5 maanden")
    pub duration: String,
    /// Internship year as display text; parsed on demand where a
    /// numeric year is needed
    pub year: String,
    /// Role during the internship
    pub role: String,
    /// What the student worked on
    pub description: String,
}

impl Internship {
    /// Whether any student year parses to an integer at or past the
    /// threshold year. Used for the marker style classification.
    pub fn has_recent_activity(&self, threshold_year: i32) -> bool {
        self.students
            .iter()
            .filter_map(|s| s.year.trim().parse::<i32>().ok())
            .any(|year| year >= threshold_year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(year: &str) -> Student {
        Student {
            id: 0,
            name: String::new(),
            duration: String::new(),
            year: year.to_string(),
            role: String::new(),
            description: String::new(),
        }
    }

    fn company(students: Vec<Student>) -> Internship {
        Internship {
            id: 1,
            company_name: "Acme".to_string(),
            coordinates: None,
            address: String::new(),
            city: String::new(),
            description: String::new(),
            website: String::new(),
            email: String::new(),
            phone: String::new(),
            tags: vec![],
            students,
        }
    }

    #[test]
    fn recent_activity_matches_threshold() {
        let record = company(vec![student("2023"), student("2025")]);
        assert!(record.has_recent_activity(2024));
        assert!(record.has_recent_activity(2025));
        assert!(!record.has_recent_activity(2026));
    }

    #[test]
    fn unparseable_years_are_ignored() {
        let record = company(vec![student(""), student("laatste jaar")]);
        assert!(!record.has_recent_activity(2000));
    }

    #[test]
    fn year_with_whitespace_still_parses() {
        let record = company(vec![student(" 2025 ")]);
        assert!(record.has_recent_activity(2025));
    }
}
