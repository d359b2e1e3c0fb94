use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
};
use crate::app::{App, ChatRole, InputMode, Screen, UploadPhase};
use crate::backend::JobStatus;
use crate::timestamp;

/// Style a chat line with its embedded timestamps highlighted, the way the
/// rest of the answer text stays plain.
fn highlight_timestamps(text: &str) -> Line<'static> {
    let ranges = timestamp::timestamp_ranges(text);
    if ranges.is_empty() {
        return Line::from(text.to_string());
    }

    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut cursor = 0;
    for range in ranges {
        if range.start > cursor {
            spans.push(Span::raw(text[cursor..range.start].to_string()));
        }
        spans.push(Span::styled(
            text[range.clone()].to_string(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::UNDERLINED),
        ));
        cursor = range.end;
    }
    if cursor < text.len() {
        spans.push(Span::raw(text[cursor..].to_string()));
    }

    Line::from(spans)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    match app.screen {
        Screen::Upload => render_upload_screen(app, frame, body_area),
        Screen::Chat => render_chat_screen(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let lecture_indicator = match &app.current_lecture {
        Some(name) => format!(" Chatting with: {}", name),
        None => String::new(),
    };

    let title = Line::from(vec![
        Span::styled(" Lecture Chat ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(lecture_indicator, Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_upload_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    // Center a fixed-width column; the terminal may be narrower, in which
    // case the column just shrinks.
    let [_, column, _] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(64),
        Constraint::Min(0),
    ])
    .areas(area);

    let [_, intro_area, input_area, hint_area, status_area, gauge_area, _] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(column);

    let intro = Paragraph::new(vec![
        Line::from(Span::styled(
            "Welcome to Lecture Chat",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from("Upload a lecture video and start chatting with its content!"),
    ])
    .centered();
    frame.render_widget(intro, intro_area);

    // Path input with horizontal scrolling so the cursor stays visible
    let editing = app.input_mode == InputMode::Editing;
    let input_border_color = if editing { Color::Yellow } else { Color::DarkGray };
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(input_border_color))
        .title(" Lecture video path ");

    let inner_width = input_area.width.saturating_sub(2) as usize;
    let cursor_pos = app.path_cursor;
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };
    let visible_text: String = app
        .path_input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);
    frame.render_widget(input, input_area);

    if editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((input_area.x + cursor_x + 1, input_area.y + 1));
    }

    let hint = Paragraph::new("Supported: MP4, MKV, WEBM. Max size: 3GB")
        .style(Style::default().fg(Color::DarkGray))
        .centered();
    frame.render_widget(hint, hint_area);

    // Validation / outcome / pipeline status lines
    let mut lines: Vec<Line> = Vec::new();
    if let Some(error) = &app.validation_error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    } else if let Some(outcome) = &app.upload_outcome {
        let color = if outcome.success { Color::Green } else { Color::Red };
        lines.push(Line::from(Span::styled(
            outcome.message.clone(),
            Style::default().fg(color),
        )));
        // The backend stores the file under a timestamped name.
        if let Some(filename) = &outcome.filename {
            lines.push(Line::from(Span::styled(
                format!("Stored as: {}", filename),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    match app.phase {
        UploadPhase::Processing => {
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            let status = app
                .job
                .as_ref()
                .map(|job| job.status.label())
                .unwrap_or("queued");
            lines.push(Line::from(Span::styled(
                format!("Processing, please wait{} ({})", dots, status),
                Style::default().fg(Color::Blue),
            )));
        }
        UploadPhase::Failed => {
            if let Some(job) = &app.job {
                if job.status == JobStatus::Error {
                    let detail = job.error.as_deref().unwrap_or("Processing failed.");
                    lines.push(Line::from(Span::styled(
                        format!("Error: {}", detail),
                        Style::default().fg(Color::Red),
                    )));
                }
            }
        }
        UploadPhase::Idle | UploadPhase::Uploading => {}
    }

    let status = Paragraph::new(Text::from(lines)).centered();
    frame.render_widget(status, status_area);

    // Transfer gauge while uploading, job gauge while the backend reports
    // processing progress.
    match app.phase {
        UploadPhase::Uploading => {
            let gauge = Gauge::default()
                .block(Block::default().borders(Borders::ALL).title(" Uploading "))
                .gauge_style(Style::default().fg(Color::Cyan))
                .percent(app.upload_progress.min(100) as u16);
            frame.render_widget(gauge, gauge_area);
        }
        UploadPhase::Processing => {
            if let Some(percent) = app.job.as_ref().and_then(|job| job.progress) {
                let gauge = Gauge::default()
                    .block(Block::default().borders(Borders::ALL).title(" Processing "))
                    .gauge_style(Style::default().fg(Color::Blue))
                    .percent(percent.min(100) as u16);
                frame.render_widget(gauge, gauge_area);
            }
        }
        UploadPhase::Idle | UploadPhase::Failed => {}
    }
}

fn render_chat_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, status_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(3),
    ])
    .areas(area);

    // Store chat area dimensions for scroll calculations (inner size minus borders)
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(match &app.current_lecture {
            Some(name) => format!(" {} ", name),
            None => " No lecture loaded ".to_string(),
        });

    let chat_text = if app.chat_messages.is_empty() && !app.query_loading {
        Text::from(Span::styled(
            "Ask a question about the lecture...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for msg in &app.chat_messages {
            match msg.role {
                ChatRole::User => {
                    lines.push(Line::from(Span::styled(
                        "You:",
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    )));
                    lines.push(Line::from(msg.content.clone()));
                }
                ChatRole::Assistant => {
                    lines.push(Line::from(Span::styled(
                        "Assistant:",
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    )));
                    for line in msg.content.lines() {
                        lines.push(highlight_timestamps(line));
                    }
                    if let Some(ts) = &msg.timestamp {
                        lines.push(Line::from(Span::styled(
                            format!("[{}] press 't' to jump", ts),
                            Style::default().fg(Color::DarkGray),
                        )));
                    }
                }
            }
            lines.push(Line::default());
        }

        if app.query_loading {
            lines.push(Line::from(Span::styled(
                "Assistant:",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Thinking{}", dots),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    let chat = Paragraph::new(chat_text)
        .block(chat_block)
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));
    frame.render_widget(chat, chat_area);

    let status = if let Some(error) = &app.lecture_error {
        Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        ))
    } else {
        Line::from(Span::styled(
            "Press 'u' to upload a new lecture",
            Style::default().fg(Color::DarkGray),
        ))
    };
    frame.render_widget(Paragraph::new(status), status_area);

    // Query input at the bottom
    let editing = app.input_mode == InputMode::Editing;
    let input_border_color = if editing { Color::Yellow } else { Color::DarkGray };
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(input_border_color))
        .title(" Ask about the lecture ");

    let inner_width = input_area.width.saturating_sub(2) as usize;
    let cursor_pos = app.query_cursor;
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };
    let visible_text: String = app
        .query_input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);
    frame.render_widget(input, input_area);

    if editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((input_area.x + cursor_x + 1, input_area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = match app.screen {
        Screen::Upload => " UPLOAD ",
        Screen::Chat => " CHAT ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = match (app.screen, app.input_mode) {
        (Screen::Upload, InputMode::Editing) => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" upload ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" done ", label_style),
            Span::styled(" Ctrl-c ", key_style),
            Span::styled(" quit ", label_style),
        ],
        (Screen::Upload, InputMode::Normal) => vec![
            Span::styled(" i ", key_style),
            Span::styled(" edit path ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ],
        (Screen::Chat, InputMode::Editing) => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" done ", label_style),
        ],
        (Screen::Chat, InputMode::Normal) => vec![
            Span::styled(" i ", key_style),
            Span::styled(" type ", label_style),
            Span::styled(" j/k ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" t ", key_style),
            Span::styled(" jump ", label_style),
            Span::styled(" u ", key_style),
            Span::styled(" new lecture ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ],
    };

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    spans.extend(hints);

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
