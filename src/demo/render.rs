use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use super::counter::{Counter, Route};
use super::pages::Pages;

const BORDER: Color = Color::Rgb(0x40, 0x40, 0x40);
const TEXT: Color = Color::Rgb(0xe5, 0xe5, 0xe5);
const MUTED: Color = Color::Rgb(0x6b, 0x72, 0x80);
const ACCENT: Color = Color::Rgb(0xda, 0x77, 0x56);
const ERROR: Color = Color::Rgb(0xef, 0x44, 0x44);

/// What the frame shows besides the model.
pub struct Status {
    pub url: String,
    pub history: usize,
    pub travel: Option<usize>,
    pub errors: usize,
}

pub fn draw(frame: &mut Frame<'_>, model: &Counter, pages: &Pages, status: &Status) {
    let [header, body, host, footer] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(5),
        Constraint::Length(6),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    frame.render_widget(header_widget(model, status), header);

    let title = pages
        .active_key()
        .copied()
        .unwrap_or(Route::Counter)
        .title();
    let lines: Vec<Line> = pages
        .active_node()
        .map(|node| node.lines())
        .unwrap_or_default()
        .into_iter()
        .map(|line| Line::from(Span::styled(line, Style::default().fg(TEXT))))
        .collect();
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .title(format!(" {} ", title))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(BORDER)),
        ),
        body,
    );

    let visible = pages
        .host()
        .visible()
        .map(|route| route.path())
        .unwrap_or("-");
    let mut host_lines = vec![Line::from(Span::styled(
        format!("visible: {}  instances: {}  renders: {}", visible, pages.len(), pages.render_count()),
        Style::default().fg(MUTED),
    ))];
    host_lines.extend(
        pages
            .host()
            .log()
            .map(|entry| Line::from(Span::styled(entry.clone(), Style::default().fg(MUTED)))),
    );
    frame.render_widget(
        Paragraph::new(host_lines).block(
            Block::default()
                .title(" page host ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(BORDER)),
        ),
        host,
    );

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            "+/- count  l later  r reset  tab page  a external nav  u undo  q quit",
            Style::default().fg(MUTED),
        ))),
        footer,
    );
}

fn header_widget(model: &Counter, status: &Status) -> Paragraph<'static> {
    let separator = Style::default().fg(MUTED);
    let mut spans = vec![
        Span::styled("  ", separator),
        Span::styled(
            status.url.clone(),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::styled("  │  ", separator),
        Span::styled(format!("count {}", model.count), Style::default().fg(TEXT)),
        Span::styled("  │  ", separator),
        Span::styled(format!("history {}", status.history), Style::default().fg(TEXT)),
    ];
    if let Some(index) = status.travel {
        spans.push(Span::styled("  │  ", separator));
        spans.push(Span::styled(
            format!("viewing snapshot {}", index),
            Style::default().fg(ACCENT),
        ));
    }
    if status.errors > 0 {
        spans.push(Span::styled("  │  ", separator));
        spans.push(Span::styled(
            format!("{} errors", status.errors),
            Style::default().fg(ERROR),
        ));
    }

    Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::TOP | Borders::BOTTOM)
            .border_style(Style::default().fg(BORDER)),
    )
}
