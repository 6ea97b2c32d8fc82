// Terminal drawing: node list, detail card, status, charts, and the side panels
use crate::application::simulation_service::SimulationFrame;
use crate::domain::dashboard::{ChartData, Dashboard, DetailCard, TileData};
use crate::domain::node::{Node, NodeStatus};
use crate::presentation::console::{Console, Mode, Panel};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Axis, Block, Borders, Chart, Dataset, Gauge, GraphType, List, ListItem, ListState, Paragraph,
    Wrap,
};

const SERIES_COLORS: [Color; 2] = [Color::Cyan, Color::Magenta];

const KEY_HINT: &str =
    "j/k move  Enter select  n add  d remove  r refresh  s simulate  : command  ? help  q quit";

/// Everything one frame needs.
pub struct View<'a> {
    pub nodes: &'a [Node],
    pub selected: Option<&'a str>,
    pub dashboard: &'a Dashboard,
    pub console: &'a Console,
}

pub fn draw(frame: &mut Frame, view: &View) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1), Constraint::Length(1)])
        .split(frame.area());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(rows[0]);

    draw_node_list(frame, columns[0], view);
    match view.console.panel() {
        Panel::Dashboard => draw_dashboard(frame, columns[1], view.dashboard),
        Panel::Help(text) => {
            let help = Paragraph::new(text.as_str())
                .block(Block::default().borders(Borders::ALL).title("Help"));
            frame.render_widget(help, columns[1]);
        }
        Panel::Simulation(sim) => draw_simulation(frame, columns[1], sim),
    }

    draw_prompt(frame, rows[1], view.console);
    let hint = Paragraph::new(KEY_HINT).style(Style::default().fg(Color::Gray));
    frame.render_widget(hint, rows[2]);
}

fn draw_node_list(frame: &mut Frame, area: Rect, view: &View) {
    let items: Vec<ListItem> = if view.nodes.is_empty() {
        vec![ListItem::new(Line::from("(no nodes)"))]
    } else {
        view.nodes
            .iter()
            .map(|node| {
                let mut heading = vec![
                    Span::styled(marker(node.status), Style::default().fg(status_color(node.status))),
                    Span::raw(format!(" {} [{}]", node.name, node.id)),
                ];
                if view.selected == Some(node.id.as_str()) {
                    heading.push(Span::styled("  viewing", Style::default().fg(Color::Cyan)));
                }
                ListItem::new(vec![
                    Line::from(heading),
                    Line::styled(
                        format!("  {:.6}, {:.6}", node.lat, node.lng),
                        Style::default().fg(Color::DarkGray),
                    ),
                ])
            })
            .collect()
    };

    let mut state = ListState::default();
    state.select(view.console.cursor(view.nodes));
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Nodes"))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");
    frame.render_stateful_widget(list, area, &mut state);
}

fn marker(status: NodeStatus) -> &'static str {
    match status {
        NodeStatus::Active => "●",
        NodeStatus::Warning => "▲",
        NodeStatus::Error => "✖",
    }
}

fn status_color(status: NodeStatus) -> Color {
    match status {
        NodeStatus::Active => Color::Green,
        NodeStatus::Warning => Color::Yellow,
        NodeStatus::Error => Color::Red,
    }
}

fn draw_dashboard(frame: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Length(5), Constraint::Min(0)])
        .split(area);

    draw_detail_card(frame, sections[0], dashboard.detail.as_ref());
    draw_status(frame, sections[1], dashboard);
    draw_charts(frame, sections[2], &dashboard.charts);
}

fn draw_detail_card(frame: &mut Frame, area: Rect, detail: Option<&DetailCard>) {
    let (title, lines) = match detail {
        None => (
            "No Node Selected".to_string(),
            vec![Line::from("Select a node to view its details")],
        ),
        Some(card) => (
            format!("{} [{}]", card.node_name, card.status.label()),
            card.tiles
                .iter()
                .map(|tile| tile_line(tile, card.motor_running))
                .collect(),
        ),
    };

    let card = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(title, Style::default().fg(Color::Cyan))),
    );
    frame.render_widget(card, area);
}

fn tile_line(tile: &TileData, motor_running: Option<bool>) -> Line<'static> {
    let mut value = tile.formatted();
    if tile.value.is_some_and(f64::is_finite) {
        value.push_str(&tile.unit);
    }
    let mut spans = vec![
        Span::raw(format!("{:<22}", tile.title)),
        Span::styled(value, Style::default().add_modifier(Modifier::BOLD)),
    ];
    if tile.id == "motor_current" {
        match motor_running {
            Some(true) => spans.push(Span::styled("  Motor ON", Style::default().fg(Color::Green))),
            Some(false) => spans.push(Span::styled("  Motor OFF", Style::default().fg(Color::Red))),
            None => {}
        }
    }
    Line::from(spans)
}

fn draw_status(frame: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let status = &dashboard.status;
    let mut lines = Vec::new();
    if let Some(error) = &status.error {
        lines.push(Line::styled(
            format!("Error: {} - Using mock data", error),
            Style::default().fg(Color::Red),
        ));
    }
    if let Some(window) = status.window {
        lines.push(Line::from(format!(
            "Window: {} - {} UTC",
            window.start.format("%m-%d %H:%M"),
            window.end.format("%m-%d %H:%M")
        )));
    }
    let mut updated = match status.last_updated {
        Some(at) => format!("Last updated: {}", at.format("%H:%M:%S")),
        None => "Not updated yet".to_string(),
    };
    if status.loading {
        updated.push_str("  Refreshing...");
    }
    lines.push(Line::from(updated));

    let block = Block::default()
        .borders(Borders::ALL)
        .title(dashboard.title.as_str());
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_charts(frame: &mut Frame, area: Rect, charts: &[ChartData]) {
    if charts.is_empty() {
        let waiting = Paragraph::new("waiting for data")
            .block(Block::default().borders(Borders::ALL).title("Charts"));
        frame.render_widget(waiting, area);
        return;
    }

    let constraints: Vec<Constraint> = charts
        .iter()
        .map(|_| Constraint::Ratio(1, charts.len() as u32))
        .collect();
    let areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (chart, area) in charts.iter().zip(areas.iter()) {
        draw_chart(frame, *area, chart);
    }
}

fn draw_chart(frame: &mut Frame, area: Rect, chart: &ChartData) {
    // x is the point index; the time labels go on the axis ends.
    let data: Vec<Vec<(f64, f64)>> = chart
        .series
        .iter()
        .map(|series| {
            series
                .points
                .iter()
                .enumerate()
                .map(|(i, p)| (i as f64, p.value))
                .collect()
        })
        .collect();

    let datasets: Vec<Dataset> = chart
        .series
        .iter()
        .zip(&data)
        .zip(SERIES_COLORS.iter().cycle())
        .map(|((series, points), color)| {
            Dataset::default()
                .name(series.name.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(*color))
                .data(points)
        })
        .collect();

    let last_index = data.iter().map(Vec::len).max().unwrap_or(0).saturating_sub(1).max(1);
    let (low, high) = padded_range(chart.value_range());
    let (first, last) = chart.time_span().unwrap_or(("", ""));
    let digits = chart.fraction_digits;
    let title = match &chart.unit {
        Some(unit) => format!("{} ({})", chart.title, unit),
        None => chart.title.clone(),
    };

    let widget = Chart::new(datasets)
        .block(Block::default().borders(Borders::ALL).title(title))
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, last_index as f64])
                .labels([first.to_string(), last.to_string()]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([low, high])
                .labels([format!("{:.*}", digits, low), format!("{:.*}", digits, high)]),
        );
    frame.render_widget(widget, area);
}

/// Adds a little headroom so flat or extreme values stay off the border.
fn padded_range(range: Option<(f64, f64)>) -> (f64, f64) {
    match range {
        None => (0.0, 1.0),
        Some((min, max)) if max - min <= f64::EPSILON => (min - 1.0, max + 1.0),
        Some((min, max)) => {
            let pad = (max - min) * 0.05;
            (min - pad, max + pad)
        }
    }
}

fn draw_simulation(frame: &mut Frame, area: Rect, sim: &SimulationFrame) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Simulation Progress"))
        .gauge_style(Style::default().fg(Color::Blue))
        .percent(sim.progress_percent.clamp(0.0, 100.0).round() as u16)
        .label(format!("{:.0}% ({:.1}s)", sim.progress_percent, sim.elapsed_secs));
    frame.render_widget(gauge, sections[0]);

    let net = &sim.network;
    let status_style = if net.alerts.is_empty() {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Yellow)
    };
    let sump = format!(
        "Sump Level: {:.1}%{}",
        net.sump_level,
        if net.sump_low() { " (LOW)" } else { "" }
    );

    let mut lines = vec![
        Line::from(vec![
            Span::raw("System Status: "),
            Span::styled(net.system_status(), status_style),
        ]),
        Line::from(sump),
        Line::from(format!("RO Tank Level: {:.1}%", net.ro_tank_level)),
        Line::from(format!("Pump: {}", net.pump_status)),
        Line::from(format!("Flow Rate: {:.1} L/s", net.flow_rate)),
        Line::from(format!("Pressure: {:.1} bar", net.pressure)),
        Line::from(format!("Motor Temperature: {:.1}°C", net.motor_temp)),
        Line::from(format!("Power Consumption: {:.2} kW", net.power_consumption)),
    ];
    for alert in &net.alerts {
        lines.push(Line::styled(format!("! {}", alert), Style::default().fg(Color::Red)));
    }
    if sim.finished {
        lines.push(Line::styled("Simulation complete", Style::default().fg(Color::Green)));
    }

    let board = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Water Network"));
    frame.render_widget(board, sections[1]);
}

fn draw_prompt(frame: &mut Frame, area: Rect, console: &Console) {
    match console.mode() {
        Mode::Prompt => {
            let line = Line::from(vec![
                Span::styled(":", Style::default().fg(Color::Yellow)),
                Span::raw(console.input()),
            ]);
            frame.render_widget(Paragraph::new(line), area);
            let column = area.x + 1 + console.input().chars().count() as u16;
            frame.set_cursor_position((column.min(area.right().saturating_sub(1)), area.y));
        }
        Mode::Browse => {
            let message = console.message().unwrap_or_default();
            frame.render_widget(Paragraph::new(message), area);
        }
    }
}
