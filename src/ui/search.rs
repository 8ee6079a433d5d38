/// Search bar with a live results dropdown
///
/// The dropdown lists the filtered companies while a term is typed;
/// clicking a result selects that company. An empty result set shows an
/// explicit "no companies found" line instead of an error state.

use iced::widget::{column, container, mouse_area, scrollable, text, text_input};
use iced::{Element, Length};

use crate::state::data::Internship;
use crate::Message;

pub fn search_bar<'a>(term: &str, results: &'a [Internship]) -> Element<'a, Message> {
    let input = text_input("Search companies...", term)
        .on_input(Message::SearchChanged)
        .padding(8)
        .size(14);

    if term.is_empty() {
        return container(input).width(Length::Fill).into();
    }

    let dropdown: Element<'a, Message> = if results.is_empty() {
        container(
            text(format!("No companies found matching \"{}\"", term))
                .size(13)
                .color([0.5, 0.5, 0.5]),
        )
        .padding(12)
        .width(Length::Fill)
        .style(container::rounded_box)
        .into()
    } else {
        let rows = results.iter().map(result_row).collect::<Vec<_>>();

        container(
            scrollable(column(rows).spacing(2).padding(4)).height(Length::Shrink),
        )
        .max_height(260.0)
        .width(Length::Fill)
        .style(container::rounded_box)
        .into()
    };

    column![input, dropdown].spacing(4).width(Length::Fill).into()
}

fn result_row(internship: &Internship) -> Element<'_, Message> {
    let students = internship.students.len();
    let students_label = if students == 1 {
        "1 student".to_string()
    } else {
        format!("{} students", students)
    };

    mouse_area(
        container(
            column![
                text(internship.company_name.as_str()).size(14),
                text(internship.city.as_str()).size(12).color([0.4, 0.4, 0.4]),
                text(students_label).size(11).color([0.5, 0.5, 0.5]),
            ]
            .spacing(1),
        )
        .padding(6)
        .width(Length::Fill),
    )
    .on_press(Message::SearchResultClicked(internship.id))
    .into()
}
