use std::time::Duration;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Style, Stylize},
    symbols::border,
    text::{Line, Span},
    widgets::{Block, Cell, Clear, Paragraph, Row, Table},
};

use crate::domain::CMDMode;
use crate::model::{Model, Status, UIData};

pub const COLUMN_WIDTH_MARGIN: u16 = 1;
pub const DEFAULT_COLUMN_WIDTH: u16 = 12;
const STATUS_MESSAGE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Default)]
pub struct TableUI {}

impl TableUI {
    pub fn new() -> Self {
        Self {}
    }

    pub fn draw(&mut self, model: &Model, frame: &mut Frame) {
        let uidata = model.get_uidata();
        let [filter_area, table_area, footer_area, cmdline_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        Self::draw_filters(&uidata, frame, filter_area);
        Self::draw_table(&uidata, frame, table_area);
        Self::draw_footer(&uidata, frame, footer_area);
        Self::draw_cmdline(&uidata, frame, cmdline_area);

        if uidata.show_popup {
            Self::draw_popup(&uidata.popup_message, frame);
        }
    }

    fn draw_filters(uidata: &UIData, frame: &mut Frame, area: Rect) {
        let mut spans = vec![
            " Filter: ".into(),
            Self::filter_value(&uidata.global_filter).yellow(),
            "  Category: ".into(),
            Self::filter_value(&uidata.category).yellow(),
        ];
        for header in uidata.headers.iter() {
            if let Some(value) = &header.filter {
                spans.push(format!("  {}: ", header.label).into());
                spans.push(value.clone().yellow());
            }
        }
        frame.render_widget(Line::from(spans), area);
    }

    fn filter_value(value: &str) -> String {
        if value.is_empty() {
            "All".to_string()
        } else {
            format!("\"{value}\"")
        }
    }

    fn draw_table(uidata: &UIData, frame: &mut Frame, area: Rect) {
        let block = Block::bordered()
            .title(Line::from(format!(" {} ", uidata.name).bold()).centered())
            .border_set(border::THICK);

        let placeholder = match uidata.status {
            Status::LOADING if uidata.total_records == 0 => Some("Loading..."),
            Status::FAILED => Some("Error loading products"),
            _ if uidata.rows.is_empty() => Some("No data available"),
            _ => None,
        };

        let widths: Vec<Constraint> = uidata
            .headers
            .iter()
            .map(|h| {
                let label_width = h.label.chars().count() as u16 + 2;
                let width = h.width.unwrap_or(DEFAULT_COLUMN_WIDTH).max(label_width);
                Constraint::Length(width + COLUMN_WIDTH_MARGIN)
            })
            .collect();

        let header = Row::new(uidata.headers.iter().enumerate().map(|(idx, h)| {
            let mut label = format!("{}{}", h.label, h.sort.marker());
            if h.filter.is_some() {
                label.push('*');
            }
            let style = if idx == uidata.selected_column {
                Style::new().bold().reversed()
            } else {
                Style::new().bold()
            };
            Cell::from(label).style(style)
        }));

        if let Some(text) = placeholder {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            let [header_area, message_area] =
                Layout::vertical([Constraint::Length(1), Constraint::Min(1)]).areas(inner);
            frame.render_widget(Table::new(Vec::<Row>::new(), widths).header(header), header_area);
            let [message_area] = Layout::vertical([Constraint::Length(1)])
                .flex(Flex::Center)
                .areas(message_area);
            frame.render_widget(
                Paragraph::new(text).alignment(Alignment::Center),
                message_area,
            );
            return;
        }

        let rows = uidata.rows.iter().map(|cells| {
            Row::new(cells.iter().enumerate().map(|(idx, value)| {
                let cell = Cell::from(value.clone());
                if idx == uidata.selected_column {
                    cell.style(Style::new().italic())
                } else {
                    cell
                }
            }))
        });

        let table = Table::new(rows, widths).header(header).block(block);
        frame.render_widget(table, area);
    }

    fn draw_footer(uidata: &UIData, frame: &mut Frame, area: Rect) {
        let nav = |enabled: bool, label: &'static str| -> Span<'static> {
            if enabled {
                label.blue().bold()
            } else {
                label.dark_gray()
            }
        };
        let line = Line::from(vec![
            nav(uidata.can_previous, " << "),
            nav(uidata.can_previous, " < "),
            nav(uidata.can_next, " > "),
            nav(uidata.can_next, " >> "),
            format!(
                " Page {} of {} ",
                uidata.page_index + 1,
                uidata.page_count
            )
            .bold(),
            format!(
                " Show {} | {} of {} rows ",
                uidata.page_size, uidata.nrows, uidata.total_records
            )
            .into(),
            " Help ".into(),
            "<?> ".blue().bold(),
        ]);
        frame.render_widget(line.alignment(Alignment::Right), area);
    }

    fn draw_cmdline(uidata: &UIData, frame: &mut Frame, area: Rect) {
        if uidata.active_cmdinput {
            let prompt = match uidata.cmd_mode {
                Some(CMDMode::GlobalFilter) => "Filter: ".to_string(),
                Some(CMDMode::ColumnFilter(field)) => format!("Filter {field}: "),
                Some(CMDMode::Category) => "Category: ".to_string(),
                None => ":".to_string(),
            };
            let cursor_x =
                Self::cursor_column(area, prompt.chars().count() + uidata.cmdinput.cursor_pos);
            let line = Line::from(vec![prompt.bold(), uidata.cmdinput.input.clone().into()]);
            frame.render_widget(line, area);
            frame.set_cursor_position((cursor_x, area.y));
        } else if uidata.last_status_message_update.elapsed() < STATUS_MESSAGE_TIMEOUT {
            frame.render_widget(Line::from(uidata.status_message.clone().italic()), area);
        } else if let (Status::FAILED, Some(error)) = (uidata.status, &uidata.load_error) {
            frame.render_widget(Line::from(error.clone().red()), area);
        }
    }

    // Terminal column of a cursor `offset` characters into `area`, kept
    // inside the area.
    fn cursor_column(area: Rect, offset: usize) -> u16 {
        let offset = u16::try_from(offset).unwrap_or(u16::MAX);
        area.x
            .saturating_add(offset)
            .min(area.right().saturating_sub(1))
    }

    fn draw_popup(message: &str, frame: &mut Frame) {
        let area = Self::popup_area(frame.area(), 60, 70);
        let block = Block::bordered()
            .title(Line::from(" Help ".bold()).centered())
            .title_bottom(Line::from(vec![" Close ".into(), "<Esc> ".blue().bold()]).centered())
            .border_set(border::THICK);
        frame.render_widget(Clear, area);
        frame.render_widget(Paragraph::new(message.to_string()).block(block), area);
    }

    fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
        let vertical = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
        let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
        let [area] = vertical.areas(area);
        let [area] = horizontal.areas(area);
        area
    }
}
