/// UI building blocks
///
/// Pure view functions over the filtered company list and the current
/// selection:
/// - Search bar with a results dropdown (search.rs)
/// - Tag chips with counts and the stats line (tags.rs)
/// - The all-companies list (company_list.rs)
/// - The company detail panel (panel.rs)

pub mod company_list;
pub mod panel;
pub mod search;
pub mod tags;
