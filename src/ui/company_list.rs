/// The all-companies list
///
/// Shown in the side panel while nothing is selected. Every row is
/// clickable and selects its company, exactly like clicking the marker.

use iced::widget::{column, container, horizontal_rule, mouse_area, row, scrollable, text};
use iced::{Element, Length};

use crate::state::data::Internship;
use crate::Message;

/// How many tags a row previews before collapsing into "+n"
const TAG_PREVIEW: usize = 3;

pub fn company_list(internships: &[Internship]) -> Element<'_, Message> {
    let header = column![
        text("All Companies").size(20),
        text(format!("{} companies available", internships.len()))
            .size(13)
            .color([0.45, 0.45, 0.45]),
    ]
    .spacing(2)
    .padding(16);

    let rows = internships
        .iter()
        .flat_map(|internship| {
            [
                list_row(internship),
                horizontal_rule(1).into(),
            ]
        })
        .collect::<Vec<_>>();

    column![
        header,
        horizontal_rule(1),
        scrollable(column(rows)).height(Length::Fill),
    ]
    .width(Length::Fill)
    .into()
}

fn list_row(internship: &Internship) -> Element<'_, Message> {
    let students = internship.students.len();
    let students_label = if students == 1 {
        "1 student".to_string()
    } else {
        format!("{} students", students)
    };

    let mut tag_bits: Vec<String> = internship
        .tags
        .iter()
        .take(TAG_PREVIEW)
        .cloned()
        .collect();
    if internship.tags.len() > TAG_PREVIEW {
        tag_bits.push(format!("+{}", internship.tags.len() - TAG_PREVIEW));
    }

    let mut details = column![
        text(internship.company_name.as_str()).size(14),
        text(internship.city.as_str()).size(12).color([0.5, 0.5, 0.5]),
    ]
    .spacing(2);

    if !tag_bits.is_empty() {
        details = details.push(
            text(tag_bits.join(" · "))
                .size(11)
                .color([0.35, 0.45, 0.65]),
        );
    }

    mouse_area(
        container(
            row![
                details.width(Length::Fill),
                text(students_label).size(11).color([0.3, 0.55, 0.35]),
            ]
            .spacing(8),
        )
        .padding(12)
        .width(Length::Fill),
    )
    .on_press(Message::CompanyClicked(internship.id))
    .into()
}
