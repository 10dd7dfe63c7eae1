use glam::Vec2;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Context, Line as CanvasLine, Rectangle};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};

use officeverse::{Region, ZoneGeometry};

use crate::app::{App, NoticeKind};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(chunks[1]);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(body[1]);

    render_header(frame, chunks[0], app);
    render_map(frame, body[0], app);
    render_presence(frame, side[0], app);
    render_notices(frame, side[1], app);
    render_prompts(frame, chunks[2], app);
    render_help(frame, chunks[3], app);
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let sync = app.sync();
    let room = sync.room_id().unwrap_or("lobby");
    let title = format!(" Officeverse - Room {} ", room);

    let (status, status_color) = if app.is_connected() {
        ("connected", Color::Green)
    } else {
        ("offline", Color::Red)
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let stats = sync.stats();
    let line = Line::from(vec![
        Span::styled(status, Style::default().fg(status_color)),
        Span::raw(format!(
            "  |  {} (id {})  |  Players: {}  |  Sent: {}  Recv: {}  |  Uptime: {}",
            sync.local().name,
            sync.local().id,
            sync.registry().len() + 1,
            stats.messages_sent,
            stats.messages_received,
            format_duration(app.uptime().as_secs()),
        )),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_map(frame: &mut Frame, area: Rect, app: &App) {
    let sync = app.sync();
    let size = sync.map().size().max(Vec2::ONE);
    let current_zone = sync.zones().current().map(str::to_string);

    let canvas = Canvas::default()
        .block(
            Block::default()
                .title(" Office ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue)),
        )
        .marker(Marker::Braille)
        .x_bounds([0.0, size.x as f64])
        .y_bounds([0.0, size.y as f64])
        .paint(move |ctx| {
            for zone in sync.map().zones() {
                let color = if current_zone.as_deref() == Some(zone.name.as_str()) {
                    Color::Yellow
                } else {
                    Color::DarkGray
                };
                draw_region(ctx, &zone.region, size.y, color);
                let label = to_canvas(zone.region.center(), size.y);
                ctx.print(
                    label.0,
                    label.1,
                    Span::styled(zone.name.clone(), Style::default().fg(color)),
                );
            }

            ctx.layer();

            for entity in sync.registry().entities() {
                let (x, y) = to_canvas(entity.position(), size.y);
                let highlight = app.nearby() == Some(entity.id);
                let mut style = Style::default().fg(skin_color(entity.skin));
                if highlight {
                    style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
                }
                ctx.print(x, y, Span::styled(format!("@{}", entity.name), style));
            }

            let local = sync.local();
            let (x, y) = to_canvas(local.position, size.y);
            ctx.print(
                x,
                y,
                Span::styled(
                    format!("#{}", local.name),
                    Style::default()
                        .fg(skin_color(sync.tint()))
                        .add_modifier(Modifier::BOLD),
                ),
            );
        });

    frame.render_widget(canvas, area);
}

fn draw_region(ctx: &mut Context, region: &Region, height: f32, color: Color) {
    match region {
        Region::Rect { min, max } => {
            ctx.draw(&Rectangle {
                x: min.x as f64,
                y: (height - max.y) as f64,
                width: (max.x - min.x) as f64,
                height: (max.y - min.y) as f64,
                color,
            });
        }
        Region::Polygon(points) => {
            for (i, a) in points.iter().enumerate() {
                let b = points[(i + 1) % points.len()];
                let (x1, y1) = to_canvas(*a, height);
                let (x2, y2) = to_canvas(b, height);
                ctx.draw(&CanvasLine::new(x1, y1, x2, y2, color));
            }
        }
    }
}

/// World y grows downwards, canvas y upwards.
fn to_canvas(point: Vec2, height: f32) -> (f64, f64) {
    (point.x as f64, (height - point.y) as f64)
}

fn render_presence(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" Nearby ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let origin = app.sync().local().position;
    let items: Vec<ListItem> = app
        .sync()
        .registry()
        .entities()
        .map(|entity| {
            let distance = entity.position().distance(origin);
            let style = if app.nearby() == Some(entity.id) {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<12}", entity.name), style),
                Span::styled(
                    format!(" {:>5.0}px  {}", distance, entity.animation_key()),
                    Style::default().fg(Color::Gray),
                ),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

fn render_notices(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" Messages ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let visible = area.height.saturating_sub(2) as usize;
    let notices: Vec<_> = app.notices().collect();
    let items: Vec<ListItem> = notices
        .iter()
        .skip(notices.len().saturating_sub(visible))
        .map(|notice| {
            let color = match notice.kind {
                NoticeKind::Info => Color::Gray,
                NoticeKind::Alert => Color::White,
                NoticeKind::Warn => Color::Red,
            };
            ListItem::new(Span::styled(notice.text.clone(), Style::default().fg(color)))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

fn render_prompts(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().borders(Borders::ALL);

    let line = if let Some(question) = app.pending_confirm() {
        Line::from(vec![
            Span::styled(question.to_string(), Style::default().fg(Color::Red)),
            Span::raw("  [y/n]"),
        ])
    } else {
        let mut spans = Vec::new();
        if let Some(prompt) = app.zone_prompt() {
            spans.push(Span::styled(
                prompt.to_string(),
                Style::default().fg(Color::Yellow),
            ));
        }
        if app.nearby().is_some() {
            if !spans.is_empty() {
                spans.push(Span::raw("   "));
            }
            spans.push(Span::styled(
                officeverse::presence::INTERACTION_PROMPT,
                Style::default().fg(Color::Green),
            ));
        }
        if let Some(target) = app.chat_target() {
            spans.push(Span::raw(format!("   chat: {}", target)));
        }
        Line::from(spans)
    };

    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_help(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" Controls ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let mut text = String::from("Arrows: move  |  F: zone  |  E: nearby  |  q/Esc: quit");
    if app.sync().zen_active() {
        text.push_str("  |  zen mode");
    }

    let paragraph = Paragraph::new(text).block(block).style(
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
    );

    frame.render_widget(paragraph, area);
}

fn skin_color(skin: u32) -> Color {
    Color::Rgb((skin >> 16) as u8, (skin >> 8) as u8, skin as u8)
}

fn format_duration(secs: u64) -> String {
    let hours = secs / 3600;
    let mins = (secs % 3600) / 60;
    let secs = secs % 60;
    format!("{:02}:{:02}:{:02}", hours, mins, secs)
}
