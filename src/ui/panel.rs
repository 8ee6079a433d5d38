/// Company detail panel
///
/// Replaces the company list while a company is selected: company info,
/// technology tags, location, contact details and the per-student
/// internship entries. The close button only clears the selection; a
/// pending zoom target is left alone.

use iced::widget::{button, column, container, horizontal_rule, row, scrollable, text};
use iced::{Element, Length};

use crate::state::data::{Internship, Student};
use crate::Message;

pub fn internship_panel(internship: &Internship) -> Element<'_, Message> {
    let header = row![
        text("Company Details").size(20).width(Length::Fill),
        button(text("✕").size(16))
            .on_press(Message::PanelClosed)
            .style(button::text),
    ]
    .padding(16)
    .align_y(iced::Alignment::Center);

    let mut info = column![
        text(internship.company_name.as_str()).size(18),
        text(internship.city.as_str()).size(13).color([0.45, 0.45, 0.45]),
    ]
    .spacing(2);

    if !internship.description.is_empty() {
        info = info
            .push(section_title(format!("About {}", internship.company_name)))
            .push(text(internship.description.as_str()).size(13));
    }

    if !internship.tags.is_empty() {
        info = info
            .push(section_title("Technology Focus".to_string()))
            .push(
                text(internship.tags.join(" · "))
                    .size(13)
                    .color([0.35, 0.45, 0.65]),
            );
    }

    if !internship.address.is_empty() {
        info = info
            .push(section_title("Location".to_string()))
            .push(text(internship.address.as_str()).size(13));
    }

    info = info.push(section_title("Contact Information".to_string()));
    if internship.email.is_empty() && internship.phone.is_empty() && internship.website.is_empty() {
        info = info.push(
            text("For contact information, please visit the company website.")
                .size(13)
                .color([0.5, 0.5, 0.5]),
        );
    } else {
        for (label, value) in [
            ("Email", &internship.email),
            ("Phone", &internship.phone),
            ("Website", &internship.website),
        ] {
            if !value.is_empty() {
                info = info.push(
                    row![
                        text(label).size(13).color([0.5, 0.5, 0.5]).width(70.0),
                        text(value.as_str()).size(13),
                    ]
                    .spacing(8),
                );
            }
        }
    }

    let mut students = column![section_title(format!(
        "Student Internships ({})",
        internship.students.len()
    ))]
    .spacing(8);

    for student in &internship.students {
        students = students.push(student_card(student));
    }

    column![
        header,
        horizontal_rule(1),
        scrollable(
            column![info, students]
                .spacing(16)
                .padding(16)
        )
        .height(Length::Fill),
    ]
    .width(Length::Fill)
    .into()
}

fn section_title<'a>(label: String) -> Element<'a, Message> {
    text(label).size(14).color([0.2, 0.2, 0.2]).into()
}

fn student_card(student: &Student) -> Element<'_, Message> {
    let mut card = column![
        row![
            column![
                text(student.name.as_str()).size(14),
                text(student.role.as_str()).size(12).color([0.25, 0.45, 0.75]),
            ]
            .spacing(1)
            .width(Length::Fill),
            column![
                text(student.duration.as_str()).size(11).color([0.5, 0.5, 0.5]),
                text(student.year.as_str()).size(11).color([0.5, 0.5, 0.5]),
            ]
            .spacing(1),
        ]
        .spacing(8),
    ]
    .spacing(4);

    if !student.description.is_empty() {
        card = card.push(text(student.description.as_str()).size(12));
    }

    container(card)
        .padding(10)
        .width(Length::Fill)
        .style(container::rounded_box)
        .into()
}
