use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph};

use super::{Field, MenuState};
use crate::net::NetworkClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    MainMenu,
    Join,
    Joining,
}

pub fn render(frame: &mut Frame, menu: &MenuState, client: Option<&NetworkClient>) {
    let area = frame.area();

    let block = Block::default()
        .title(" Cell Wars ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta));
    frame.render_widget(block, area);

    let inner = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([Constraint::Min(0)])
        .split(area)[0];

    match menu.screen {
        Screen::MainMenu => render_main_menu(frame, inner, menu.selected_index),
        Screen::Join => render_join(frame, inner, menu),
        Screen::Joining => render_joining(frame, inner, client),
    }
}

fn render_main_menu(frame: &mut Frame, area: Rect, selected: usize) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(area);

    let title = r#"
   ___     _ _  __      __
  / __|___| | | \ \    / /_ _ _ _ ___
 | (__/ -_) | |  \ \/\/ / _` | '_(_-<
  \___\___|_|_|   \_/\_/\__,_|_| /__/
"#;

    let title_widget = Paragraph::new(title)
        .style(Style::default().fg(Color::Magenta))
        .alignment(Alignment::Center);
    frame.render_widget(title_widget, chunks[0]);

    let menu_items: Vec<ListItem> = ["  Join Server", "  Quit"]
        .into_iter()
        .enumerate()
        .map(|(i, label)| {
            let item = ListItem::new(label);
            if i == selected {
                item.style(
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                item.style(Style::default().fg(Color::White))
            }
        })
        .collect();

    let list = List::new(menu_items).block(
        Block::default()
            .title(" Menu ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );

    let menu_area = centered_rect(40, 6, chunks[2]);
    frame.render_widget(list, menu_area);

    let help = Paragraph::new("↑↓ Navigate  Enter Select  Q Quit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(help, chunks[3]);
}

fn render_join(frame: &mut Frame, area: Rect, menu: &MenuState) {
    let dialog_area = centered_rect(50, 14, area);
    frame.render_widget(Clear, dialog_area);

    let dialog = Block::default()
        .title(" Join Server ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta));
    frame.render_widget(dialog, dialog_area);

    let inner = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(dialog_area);

    render_field(
        frame,
        [inner[0], inner[1]],
        "Name:",
        &menu.name_input,
        menu.focus == Field::Name,
    );
    render_field(
        frame,
        [inner[2], inner[3]],
        "Server Address:",
        &menu.address_input,
        menu.focus == Field::Address,
    );

    if let Some(err) = &menu.error {
        let error_text = Paragraph::new(err.as_str())
            .style(Style::default().fg(Color::Red))
            .alignment(Alignment::Center);
        frame.render_widget(error_text, inner[4]);
    }

    let help = Paragraph::new("Tab Switch  Enter Join  Esc Back")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(help, inner[5]);
}

fn render_field(frame: &mut Frame, areas: [Rect; 2], label: &str, value: &str, focused: bool) {
    let label = Paragraph::new(label).style(Style::default().fg(Color::White));
    frame.render_widget(label, areas[0]);

    let border = if focused {
        Color::Yellow
    } else {
        Color::DarkGray
    };
    let cursor = if focused { "_" } else { "" };
    let input = Paragraph::new(format!("{}{}", value, cursor))
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border)),
        );
    frame.render_widget(input, areas[1]);
}

fn render_joining(frame: &mut Frame, area: Rect, client: Option<&NetworkClient>) {
    let dialog_area = centered_rect(40, 8, area);
    frame.render_widget(Clear, dialog_area);

    let dialog = Block::default()
        .title(" Joining ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    frame.render_widget(dialog, dialog_area);

    let inner = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(dialog_area);

    let status = match client {
        Some(client) => format!(
            "Joining as {}\nStatus: {:?}\n\nPlease wait...",
            client.name(),
            client.state()
        ),
        None => "Initializing connection...".to_string(),
    };

    let status_text = Paragraph::new(status)
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Center);
    frame.render_widget(status_text, inner[0]);

    let help = Paragraph::new("Esc Cancel")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(help, inner[1]);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}
