/// Search and tag filtering
///
/// Pure functions computing the filtered view of the company list from the
/// free-text search term and the selected tag set. No side effects; input
/// order is preserved.

use std::collections::{HashMap, HashSet};

use super::data::Internship;

/// Sentinel tag that resets the tag selection instead of toggling
pub const CLEAR_TAGS: &str = "clear";

/// Aggregate numbers shown under the tag chips
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub companies: usize,
    pub internships: usize,
    pub cities: usize,
}

/// Compute the filtered company list.
///
/// A non-empty search term keeps companies whose name contains it
/// case-insensitively; a non-empty tag selection keeps companies carrying
/// any selected tag. Both clauses compose with AND.
pub fn filter(records: &[Internship], term: &str, selected_tags: &[String]) -> Vec<Internship> {
    let term_lower = term.to_lowercase();

    records
        .iter()
        .filter(|record| {
            term.is_empty() || record.company_name.to_lowercase().contains(&term_lower)
        })
        .filter(|record| {
            selected_tags.is_empty()
                || record
                    .tags
                    .iter()
                    .any(|tag| selected_tags.iter().any(|selected| selected == tag))
        })
        .cloned()
        .collect()
}

/// Toggle a tag in the selection. The "clear" sentinel empties the
/// selection instead.
pub fn toggle_tag(selected: &mut Vec<String>, tag: &str) {
    if tag == CLEAR_TAGS {
        selected.clear();
    } else if let Some(position) = selected.iter().position(|existing| existing == tag) {
        selected.remove(position);
    } else {
        selected.push(tag.to_string());
    }
}

/// All tags across the full (unfiltered) list, deduplicated and sorted
pub fn available_tags(records: &[Internship]) -> Vec<String> {
    let mut tags: Vec<String> = records
        .iter()
        .flat_map(|record| record.tags.iter().cloned())
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    tags.sort();
    tags
}

/// Per-tag company counts, always against the full list
pub fn tag_counts(records: &[Internship], tags: &[String]) -> HashMap<String, usize> {
    tags.iter()
        .map(|tag| {
            let count = records
                .iter()
                .filter(|record| record.tags.iter().any(|candidate| candidate == tag))
                .count();
            (tag.clone(), count)
        })
        .collect()
}

/// Aggregate stats over the full list
pub fn stats(records: &[Internship]) -> Stats {
    let cities: HashSet<&str> = records
        .iter()
        .map(|record| record.city.trim())
        .filter(|city| !city.is_empty())
        .collect();

    Stats {
        companies: records.len(),
        internships: records.iter().map(|record| record.students.len()).sum(),
        cities: cities.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::Student;

    fn record(id: i64, name: &str, tags: &[&str]) -> Internship {
        Internship {
            id,
            company_name: name.to_string(),
            coordinates: None,
            address: String::new(),
            city: String::new(),
            description: String::new(),
            website: String::new(),
            email: String::new(),
            phone: String::new(),
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
            students: Vec::new(),
        }
    }

    fn sample() -> Vec<Internship> {
        vec![
            record(1, "Acme", &["java"]),
            record(2, "Beta", &["python"]),
            record(3, "Acme Cloud", &["java", "python"]),
        ]
    }

    #[test]
    fn empty_filter_is_identity() {
        let records = sample();
        let filtered = filter(&records, "", &[]);
        assert_eq!(filtered, records);
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let records = sample();
        let filtered = filter(&records, "aCm", &[]);
        assert_eq!(
            filtered.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![1, 3]
        );
    }

    #[test]
    fn search_with_no_match_is_empty() {
        let records = sample();
        assert!(filter(&records, "gamma", &[]).is_empty());
    }

    #[test]
    fn tag_filter_is_or_across_tags() {
        let records = sample();
        let selected = vec!["python".to_string(), "java".to_string()];
        let filtered = filter(&records, "", &selected);
        assert_eq!(filtered.len(), 3);

        let selected = vec!["python".to_string()];
        let filtered = filter(&records, "", &selected);
        assert_eq!(
            filtered.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![2, 3]
        );
    }

    #[test]
    fn search_and_tags_compose_with_and() {
        let records = sample();
        let selected = vec!["python".to_string()];
        let filtered = filter(&records, "acme", &selected);
        assert_eq!(filtered.iter().map(|r| r.id).collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn toggle_adds_removes_and_clears() {
        let mut selected = Vec::new();

        toggle_tag(&mut selected, "java");
        assert_eq!(selected, vec!["java"]);

        toggle_tag(&mut selected, "python");
        toggle_tag(&mut selected, "java");
        assert_eq!(selected, vec!["python"]);

        toggle_tag(&mut selected, CLEAR_TAGS);
        assert!(selected.is_empty());

        // Clearing an empty selection stays empty
        toggle_tag(&mut selected, CLEAR_TAGS);
        assert!(selected.is_empty());
    }

    #[test]
    fn available_tags_are_deduplicated_and_sorted() {
        let records = sample();
        assert_eq!(available_tags(&records), vec!["java", "python"]);
    }

    #[test]
    fn tag_counts_use_the_full_list() {
        let records = sample();
        let tags = available_tags(&records);
        let counts = tag_counts(&records, &tags);
        assert_eq!(counts["java"], 2);
        assert_eq!(counts["python"], 2);
    }

    #[test]
    fn stats_count_companies_internships_and_cities() {
        let mut records = sample();
        records[0].city = "Utrecht".to_string();
        records[1].city = "Utrecht".to_string();
        records[2].city = "Amersfoort".to_string();
        records[0].students.push(Student {
            id: 0,
            name: "Kim".to_string(),
            duration: String::new(),
            year: "2025".to_string(),
            role: String::new(),
            description: String::new(),
        });

        let stats = stats(&records);
        assert_eq!(stats.companies, 3);
        assert_eq!(stats.internships, 1);
        assert_eq!(stats.cities, 2);
    }
}
