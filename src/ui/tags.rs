/// Tag filter chips
///
/// One chip per available tag with its company count, rendered as a
/// wrapping row over the map. Selected chips toggle off again; the clear
/// chip resets the whole selection through the filter engine's sentinel.
/// A small stats line sits underneath.

use iced::widget::{button, column, container, text};
use iced::{Alignment, Element};
use std::collections::HashMap;

use crate::state::filter::{Stats, CLEAR_TAGS};
use crate::Message;

pub fn tag_filter(
    available: &[String],
    selected: &[String],
    counts: &HashMap<String, usize>,
    stats: Stats,
) -> Element<'static, Message> {
    let mut chips: Vec<Element<'static, Message>> = available
        .iter()
        .map(|tag| {
            let count = counts.get(tag).copied().unwrap_or(0);
            let is_selected = selected.iter().any(|candidate| candidate == tag);

            button(text(format!("{} ({})", tag, count)).size(12))
                .on_press(Message::TagToggled(tag.clone()))
                .padding([4.0, 8.0])
                .style(if is_selected {
                    button::primary
                } else {
                    button::secondary
                })
                .into()
        })
        .collect();

    if !selected.is_empty() {
        chips.push(
            button(text("Clear all").size(12))
                .on_press(Message::TagToggled(CLEAR_TAGS.to_string()))
                .padding([4.0, 8.0])
                .style(button::danger)
                .into(),
        );
    }

    let stats_line = text(format!(
        "{} companies · {} internships · {} cities",
        stats.companies, stats.internships, stats.cities
    ))
    .size(12)
    .color([0.35, 0.35, 0.35]);

    container(
        column![
            iced_aw::Wrap::with_elements(chips).spacing(4.0).line_spacing(4.0),
            stats_line,
        ]
        .spacing(6)
        .align_x(Alignment::Center),
    )
    .padding(8)
    .style(container::rounded_box)
    .into()
}
