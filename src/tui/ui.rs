use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Line},
    widgets::{Block, Borders, BorderType, List, ListItem, Paragraph, Tabs, Wrap},
    Frame,
};
use crate::tui::app::App;

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3), // Header/Tabs
                Constraint::Min(0),    // Main Content
                Constraint::Length(3), // Input
                Constraint::Length(1), // Status Bar
            ]
            .as_ref(),
        )
        .split(f.area());

    draw_header(f, app, chunks[0]);

    match app.tab_index {
        0 => draw_chat(f, app, chunks[1]),
        1 => draw_profile(f, app, chunks[1]),
        2 => draw_logs(f, app, chunks[1]),
        3 => draw_config(f, app, chunks[1]),
        _ => {},
    }

    draw_input(f, app, chunks[2]);
    draw_status_bar(f, app, chunks[3]);
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = app.tabs.iter().enumerate().map(|(i, t)| {
        let style = if i == app.tab_index {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Line::from(Span::styled(t, style))
    }).collect();

    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded).title(" Pescabot RS "))
        .select(app.tab_index)
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

    f.render_widget(tabs, area);
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let status_text = format!(
        " {} | ESC: Quit | TAB: Switch Tab | @id: Switch User | sent {} / replies {} ",
        app.status, app.stats.messages_sent, app.stats.replies_received
    );
    let status_bar = Paragraph::new(status_text)
        .style(Style::default().fg(Color::Black).bg(Color::Green));
    f.render_widget(status_bar, area);
}

fn draw_input(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(format!(" {} ", app.user_id));
    let input = Paragraph::new(format!("> {}", app.input))
        .block(block)
        .style(Style::default().fg(Color::White));
    f.render_widget(input, area);
}

fn draw_chat(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).border_type(BorderType::Rounded).title(" Conversa ");

    let mut lines: Vec<Line> = Vec::new();
    for entry in &app.chat {
        let color = if entry.is_reply { Color::Green } else { Color::Cyan };
        lines.push(Line::from(vec![
            Span::styled(format!("[{}] ", entry.time), Style::default().fg(Color::DarkGray)),
            Span::styled(format!("{}:", entry.from), Style::default().fg(color).add_modifier(Modifier::BOLD)),
        ]));
        for text_line in entry.text.lines() {
            lines.push(Line::from(format!("  {}", text_line)));
        }
    }

    // Keep the newest lines in view.
    let visible = area.height.saturating_sub(2) as usize;
    let skip = lines.len().saturating_sub(visible);
    let lines: Vec<Line> = lines.into_iter().skip(skip).collect();

    let chat = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    f.render_widget(chat, area);
}

fn draw_profile(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(area);

    let info_block = Block::default().borders(Borders::ALL).border_type(BorderType::Rounded).title(" Jogador ");
    let inv_block = Block::default().borders(Borders::ALL).border_type(BorderType::Rounded).title(" Inventário ");

    let record = match &app.profile {
        Some(record) => record,
        None => {
            let p = Paragraph::new(format!("{} ainda não jogou.", app.user_id)).block(info_block);
            f.render_widget(p, chunks[0]);
            f.render_widget(List::new(Vec::<ListItem>::new()).block(inv_block), chunks[1]);
            return;
        }
    };

    let info_text = vec![
        Line::from(vec![Span::styled("Dinheiro: ", Style::default().fg(Color::Yellow)), Span::raw(format!("R$ {}", record.money))]),
        Line::from(vec![Span::styled("Vara:     ", Style::default().fg(Color::Magenta)), Span::raw(&record.equipped_rod)]),
        Line::from(vec![Span::styled("Iscas:    ", Style::default().fg(Color::Red)), Span::raw(record.bait_count.to_string())]),
        Line::from(""),
        Line::from(vec![Span::styled("Pescarias: ", Style::default().fg(Color::Blue)), Span::raw(record.stats.total_catches.to_string())]),
        Line::from(format!("  comuns {}", record.stats.common_caught)),
        Line::from(format!("  raros  {}", record.stats.rare_caught)),
        Line::from(format!("  lixo   {}", record.stats.junk_caught)),
    ];
    f.render_widget(Paragraph::new(info_text).block(info_block), chunks[0]);

    let inv_items: Vec<ListItem> = record.inventory.iter().map(|(name, count)| {
        ListItem::new(format!("{} x {}", count, name))
    }).collect();
    f.render_widget(List::new(inv_items).block(inv_block), chunks[1]);
}

fn draw_logs(f: &mut Frame, app: &App, area: Rect) {
    let logs_block = Block::default().borders(Borders::ALL).border_type(BorderType::Rounded).title(" Logs ");
    let logs: Vec<ListItem> = app.logs.iter().rev().map(|l| {
        ListItem::new(Line::from(vec![
            Span::styled(">> ", Style::default().fg(Color::Blue)),
            Span::raw(l.clone()),
        ]))
    }).collect();
    let logs_list = List::new(logs).block(logs_block);
    f.render_widget(logs_list, area);
}

fn draw_config(f: &mut Frame, app: &App, area: Rect) {
    let config_block = Block::default().borders(Borders::ALL).border_type(BorderType::Rounded).title(" Configuration ");
    let system = &app.config.system;

    let seed = system.rng_seed.map(|s| s.to_string()).unwrap_or_else(|| "entropy".to_string());
    let text = vec![
        Line::from(vec![Span::styled("Backend:        ", Style::default().fg(Color::Yellow)), Span::raw(format!("{:?}", system.backend))]),
        Line::from(vec![Span::styled("Data dir:       ", Style::default().fg(Color::Yellow)), Span::raw(&system.data_dir)]),
        Line::from(vec![Span::styled("Database:       ", Style::default().fg(Color::Yellow)), Span::raw(&system.database_path)]),
        Line::from(vec![Span::styled("Log file:       ", Style::default().fg(Color::Yellow)), Span::raw(&system.log_file)]),
        Line::from(vec![Span::styled("RNG seed:       ", Style::default().fg(Color::Green)), Span::raw(seed)]),
        Line::from(vec![Span::styled("Starting money: ", Style::default().fg(Color::Green)), Span::raw(app.config.game.starting_money.to_string())]),
    ];
    let p = Paragraph::new(text).block(config_block).wrap(Wrap { trim: true });
    f.render_widget(p, area);
}
