use super::markdown::render_markdown;
use crate::runtime::InputBuffer;
use crate::transcript::{Transcript, Turn};
use chrono::Local;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Position, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Padding, Paragraph, Wrap},
    Frame,
};

const SEND_LABEL: &str = "[ Send ]";
const SEND_WIDTH: u16 = 10;
const TOGGLE_WIDTH: u16 = 4;

/// Everything a redraw reads
pub struct View<'a> {
    pub transcript: &'a Transcript,
    pub input: &'a InputBuffer,
    pub dark_mode: bool,
    pub pending: usize,
    pub notice: Option<&'a str>,
}

/// Clickable regions from the last draw
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HitAreas {
    pub send_button: Rect,
    pub theme_toggle: Rect,
}

struct Theme {
    background: Color,
    text: Color,
    user: Color,
    system: Color,
    muted: Color,
    accent: Color,
    notice: Color,
}

impl Theme {
    fn for_mode(dark_mode: bool) -> Self {
        if dark_mode {
            Self {
                background: Color::Rgb(24, 24, 27),
                text: Color::Rgb(228, 228, 231),
                user: Color::LightCyan,
                system: Color::Rgb(228, 228, 231),
                muted: Color::DarkGray,
                accent: Color::Cyan,
                notice: Color::LightYellow,
            }
        } else {
            Self {
                background: Color::White,
                text: Color::Black,
                user: Color::Blue,
                system: Color::Black,
                muted: Color::Gray,
                accent: Color::Blue,
                notice: Color::Red,
            }
        }
    }

    fn base(&self) -> Style {
        Style::new().fg(self.text).bg(self.background)
    }
}

pub fn render(frame: &mut Frame, view: &View<'_>) -> HitAreas {
    let theme = Theme::for_mode(view.dark_mode);
    let area = frame.area();
    frame.render_widget(Block::new().style(theme.base()), area);

    let [header_area, body_area, input_area, status_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    let theme_toggle = render_header(frame, header_area, view, &theme);
    render_transcript(frame, body_area, view, &theme);
    let send_button = render_input(frame, input_area, view, &theme);
    render_status(frame, status_area, view, &theme);

    HitAreas {
        send_button,
        theme_toggle,
    }
}

fn render_header(frame: &mut Frame, area: Rect, view: &View<'_>, theme: &Theme) -> Rect {
    let title = Line::from(Span::styled(" Chatbot", Style::new().fg(theme.accent).bold()));
    frame.render_widget(Paragraph::new(title), area);

    // Moon offers dark mode, sun offers light mode
    let glyph = if view.dark_mode { " 🌞 " } else { " 🌙 " };
    let width = TOGGLE_WIDTH.min(area.width);
    let toggle = Rect::new(area.right() - width, area.y, width, area.height.min(1));
    frame.render_widget(Paragraph::new(glyph), toggle);
    toggle
}

fn turn_lines(turn: &Turn, theme: &Theme) -> Vec<Line<'static>> {
    let (label, color, alignment) = if turn.is_user() {
        ("you", theme.user, Alignment::Right)
    } else {
        ("bot", theme.system, Alignment::Left)
    };

    let stamp = turn.created_at().with_timezone(&Local).format("%H:%M");
    let mut lines = vec![Line::from(Span::styled(
        format!("{label} · {stamp}"),
        Style::new().fg(theme.muted),
    ))
    .alignment(alignment)];

    lines.extend(
        render_markdown(turn.text(), Style::new().fg(color))
            .into_iter()
            .map(|line| line.alignment(alignment)),
    );
    lines
}

fn render_transcript(frame: &mut Frame, area: Rect, view: &View<'_>, theme: &Theme) {
    let block = Block::new().padding(Padding::horizontal(1));

    if view.transcript.is_empty() {
        let hint = Paragraph::new(Line::from("Say something to start the conversation."))
            .style(Style::new().fg(theme.muted))
            .alignment(Alignment::Center)
            .block(block.padding(Padding::new(1, 1, area.height / 2, 0)));
        frame.render_widget(hint, area);
        return;
    }

    let mut lines = Vec::new();
    for turn in view.transcript.current() {
        if !lines.is_empty() {
            lines.push(Line::default());
        }
        lines.extend(turn_lines(turn, theme));
    }

    let inner = block.inner(area);
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });

    // Follow the newest turn
    let overflow = paragraph
        .line_count(inner.width)
        .saturating_sub(usize::from(inner.height));
    let scroll = u16::try_from(overflow).unwrap_or(u16::MAX);

    frame.render_widget(paragraph.scroll((scroll, 0)), area);
}

fn render_input(frame: &mut Frame, area: Rect, view: &View<'_>, theme: &Theme) -> Rect {
    let [field_area, button_area] =
        Layout::horizontal([Constraint::Min(1), Constraint::Length(SEND_WIDTH)]).areas(area);

    let block = Block::bordered()
        .title(" Message ")
        .border_style(Style::new().fg(theme.accent));
    let inner = block.inner(field_area);

    let before_cursor: String = view.input.text().chars().take(view.input.cursor()).collect();
    let cursor_col = u16::try_from(Line::from(before_cursor).width()).unwrap_or(u16::MAX);
    // Scroll horizontally so the cursor stays inside the field
    let offset = cursor_col.saturating_sub(inner.width.saturating_sub(1));

    let field = if view.input.is_empty() {
        Paragraph::new(Span::styled(
            "Type a message…",
            Style::new().fg(theme.muted).add_modifier(Modifier::ITALIC),
        ))
    } else {
        Paragraph::new(view.input.text().to_string()).scroll((0, offset))
    };
    frame.render_widget(field.block(block), field_area);
    // offset keeps the cursor within the field, so this never passes the right edge
    frame.set_cursor_position(Position::new(inner.x + (cursor_col - offset), inner.y));

    let button_style = if view.input.text().trim().is_empty() {
        Style::new().fg(theme.muted)
    } else {
        Style::new().fg(theme.accent).bold()
    };
    let button = Paragraph::new(Span::styled(SEND_LABEL, button_style))
        .alignment(Alignment::Center)
        .block(Block::new().padding(Padding::top(1)));
    frame.render_widget(button, button_area);
    button_area
}

fn render_status(frame: &mut Frame, area: Rect, view: &View<'_>, theme: &Theme) {
    let pending = match view.pending {
        0 => String::new(),
        1 => "1 reply pending ".to_string(),
        n => format!("{n} replies pending "),
    };
    let pending_width = u16::try_from(pending.chars().count()).unwrap_or(u16::MAX);
    let [left, right] =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(pending_width)]).areas(area);

    let left_line = match view.notice {
        Some(notice) => Line::from(Span::styled(format!(" {notice}"), Style::new().fg(theme.notice))),
        None => Line::from(Span::styled(
            " Enter send · Ctrl+D theme · Esc quit",
            Style::new().fg(theme.muted),
        )),
    };
    frame.render_widget(Paragraph::new(left_line), left);
    frame.render_widget(
        Paragraph::new(Span::styled(pending, Style::new().fg(theme.accent))),
        right,
    );
}
