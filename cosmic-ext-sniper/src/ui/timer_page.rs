//! Timer page: parameter fields, readout and controls.

use crate::app::{FieldTexts, Message};
use crate::fl;
use cosmic::iced::widget::{column, row, text};
use cosmic::iced::{Alignment, Length};
use cosmic::widget::{self, icon};
use cosmic::Element;
use sniper_timer::Field;

/// Size of the remaining-time readout.
const READOUT_TEXT_SIZE: u16 = 80;

/// Width of the label column next to each field.
const LABEL_WIDTH: f32 = 110.0;

/// Parameters for rendering the timer page.
pub struct TimerPageParams<'a> {
    pub fields: &'a FieldTexts,
    pub readout: String,
    pub error: Option<&'a str>,
}

/// Render the timer page.
pub fn view(params: TimerPageParams<'_>) -> Element<'_, Message> {
    let TimerPageParams {
        fields,
        readout,
        error,
    } = params;

    let header = row![
        icon::from_name("alarm-symbolic").size(32),
        text(fl!("app-title")).size(20),
    ]
    .spacing(8)
    .align_y(Alignment::Center);

    let inputs = column![
        field_row(fl!("lag-label"), &fields.lag, Field::Lag),
        field_row(fl!("target-frame-label"), &fields.target_frame, Field::TargetFrame),
        field_row(fl!("frame-hit-label"), &fields.frame_hit, Field::FrameHit),
    ]
    .spacing(8);

    let readout_row = row![
        text(fl!("time-label")).size(14).width(Length::Fixed(LABEL_WIDTH)),
        text(readout).size(READOUT_TEXT_SIZE),
    ]
    .spacing(8)
    .align_y(Alignment::Center);

    // Both Start and Stop stay pressable: Start restarts, Stop is idempotent
    let controls = row![
        widget::button::standard(fl!("update")).on_press(Message::UpdateLag),
        widget::button::suggested(fl!("start")).on_press(Message::Start),
        widget::button::destructive(fl!("stop")).on_press(Message::Stop),
    ]
    .spacing(8);

    let mut content = column![
        header,
        widget::divider::horizontal::default(),
        inputs,
        readout_row,
        controls,
        text(fl!("toggle-hint")).size(12),
    ]
    .spacing(12)
    .padding(16)
    .width(Length::Fill);

    if let Some(err) = error {
        content = content.push(
            widget::container(
                column![text(fl!("error")).size(14), text(err).size(12)].spacing(4),
            )
            .padding([4, 8])
            .width(Length::Fill)
            .class(cosmic::theme::Container::Card),
        );
    }

    content.into()
}

/// A label with its digits-only text field.
fn field_row<'a>(label: String, value: &'a str, field: Field) -> Element<'a, Message> {
    row![
        text(label).size(14).width(Length::Fixed(LABEL_WIDTH)),
        widget::text_input("0", value)
            .on_input(move |text| Message::FieldInput(field, text))
            .width(Length::Fixed(160.0)),
    ]
    .spacing(8)
    .align_y(Alignment::Center)
    .into()
}
