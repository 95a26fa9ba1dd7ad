/// View building blocks for the main window
///
/// Each function renders one part of the window from application state.
/// None of them mutate anything; interaction goes out as `Message`s.
use iced::widget::image::Image;
use iced::widget::{button, column, container, progress_bar, row, text, text_editor};
use iced::{Alignment, Border, Color, ContentFit, Element, Length, Theme};

use crate::state::conversion::{Conversion, ExtractedText};
use crate::state::data::ImageFile;
use crate::state::selection::PreviewHandle;
use crate::Message;

/// Click-to-browse button plus drop target
pub fn upload_area<'a>(
    file: Option<&'a ImageFile>,
    hovering: bool,
    enabled: bool,
) -> Element<'a, Message> {
    let hint = if hovering {
        "Release to load the image".to_string()
    } else {
        match file {
            Some(file) => format!("{} ({}KB)", file.name, file.len() / 1024),
            None => "Drop an image here or browse".to_string(),
        }
    };

    let browse = button(text(if file.is_some() { "Choose another image" } else { "Browse..." }))
        .on_press_maybe(enabled.then_some(Message::PickImage))
        .padding(10);

    let content = column![text(hint).size(16), browse]
        .spacing(12)
        .align_x(Alignment::Center);

    container(content)
        .width(Length::Fill)
        .padding(24)
        .center_x(Length::Fill)
        .style(move |theme: &Theme| {
            let palette = theme.extended_palette();
            let border_color = if hovering {
                palette.primary.strong.color
            } else {
                palette.background.strong.color
            };
            container::Style {
                background: Some(palette.background.weak.color.into()),
                border: Border {
                    color: border_color,
                    width: 2.0,
                    radius: 8.0.into(),
                },
                ..container::Style::default()
            }
        })
        .into()
}

/// Preview of the selected image
pub fn preview<'a>(preview: &'a PreviewHandle) -> Element<'a, Message> {
    container(
        Image::new(preview.handle().clone())
            .width(Length::Fill)
            .height(Length::Fixed(280.0))
            .content_fit(ContentFit::Contain),
    )
    .width(Length::Fill)
    .center_x(Length::Fill)
    .into()
}

/// The single action button, with a progress bar while a job runs
pub fn action<'a>(conversion: &Conversion, has_image: bool) -> Element<'a, Message> {
    let convert = button(text(conversion.button_label()).size(18))
        .on_press_maybe(conversion.can_convert(has_image).then_some(Message::Convert))
        .padding(12);

    if conversion.status().is_active() {
        column![
            convert,
            progress_bar(0.0..=100.0, f32::from(conversion.progress())).height(Length::Fixed(8.0)),
        ]
        .spacing(10)
        .align_x(Alignment::Center)
        .into()
    } else {
        convert.into()
    }
}

/// Red banner with an error message
pub fn error_banner<'a>(message: &'a str) -> Element<'a, Message> {
    container(text(message).color(Color::WHITE))
        .width(Length::Fill)
        .padding(12)
        .style(|theme: &Theme| {
            let danger = theme.extended_palette().danger.base.color;
            container::Style {
                background: Some(danger.into()),
                border: Border {
                    radius: 6.0.into(),
                    ..Border::default()
                },
                ..container::Style::default()
            }
        })
        .into()
}

/// Extracted text (read-only, selectable) with a copy button
pub fn result<'a>(
    extracted: &'a ExtractedText,
    output: &'a text_editor::Content,
    notice: Option<&'a str>,
) -> Element<'a, Message> {
    let header = row![
        text(format!(
            "Extracted text ({} characters, {})",
            extracted.text.chars().count(),
            extracted.completed_at.format("%H:%M:%S")
        ))
        .size(16)
        .width(Length::Fill),
        button("Copy").on_press(Message::CopyText).padding(8),
    ]
    .spacing(10)
    .align_y(Alignment::Center);

    let mut content = column![
        header,
        text_editor(output)
            .on_action(Message::EditorAction)
            .height(Length::Fixed(220.0)),
    ]
    .spacing(10);

    if let Some(notice) = notice {
        content = content.push(text(notice).size(14));
    }

    content.into()
}
