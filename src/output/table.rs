use comfy_table::{Cell, Color, Table};

use crate::core::{SessionInventory, SessionRecord};
use crate::output::format::{
    NumberFormat, create_styled_table, format_compact, format_cost, format_local_time,
    format_number, header_cell, right_cell, styled_cell, truncate_display,
};
use crate::source::BoxedSource;

const PREVIEW_COLUMN_CHARS: usize = 60;
const COMPACT_PREVIEW_COLUMN_CHARS: usize = 40;
const CWD_COLUMN_CHARS: usize = 32;

#[derive(Debug, Clone, Copy)]
pub(crate) struct SessionTableOptions {
    pub(crate) use_color: bool,
    pub(crate) compact: bool,
    pub(crate) show_cost: bool,
    pub(crate) number_format: NumberFormat,
}

/// Source label prefixed with the fork glyph, e.g. `┌─ codex`
fn source_label(session: &SessionRecord) -> String {
    let glyph = session.branch.glyph();
    if glyph.is_empty() {
        session.source.label().to_string()
    } else {
        format!("{glyph} {}", session.source.label())
    }
}

/// Summary wins over the first message when Claude recorded one
fn display_preview(session: &SessionRecord) -> &str {
    session
        .summary
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(&session.preview)
}

fn token_cell(tokens: u64, options: &SessionTableOptions, color: Option<Color>, bold: bool) -> Cell {
    let text = if options.compact {
        format_compact(tokens, options.number_format)
    } else {
        format_number(tokens, options.number_format)
    };
    right_cell(&text, color, bold)
}

fn build_session_table(inventory: &SessionInventory, options: &SessionTableOptions) -> Table {
    let use_color = options.use_color;
    let mut table = create_styled_table();

    let mut header = vec![
        header_cell("Source", use_color),
        header_cell("When", use_color),
        header_cell("Preview", use_color),
        header_cell("Model", use_color),
    ];
    if !options.compact {
        header.push(header_cell("Msgs", use_color));
        header.push(header_cell("Dir", use_color));
    }
    header.push(header_cell("Tokens", use_color));
    if options.show_cost {
        header.push(header_cell("Cost", use_color));
    }
    table.set_header(header);

    let branch_color = use_color.then_some(Color::Yellow);
    let cost_color = use_color.then_some(Color::Green);
    let preview_chars = if options.compact {
        COMPACT_PREVIEW_COLUMN_CHARS
    } else {
        PREVIEW_COLUMN_CHARS
    };

    for session in &inventory.sessions {
        let label_color = if session.branch.is_grouped() {
            branch_color
        } else {
            None
        };
        let mut row = vec![
            styled_cell(&source_label(session), label_color, false),
            Cell::new(format_local_time(session.timestamp)),
            Cell::new(truncate_display(display_preview(session), preview_chars)),
            Cell::new(session.primary_model.as_deref().unwrap_or("-")),
        ];
        if !options.compact {
            row.push(right_cell(
                &format_number(session.message_count as u64, options.number_format),
                None,
                false,
            ));
            let cwd = session.cwd.as_deref().unwrap_or("-");
            row.push(Cell::new(truncate_display(cwd, CWD_COLUMN_CHARS)));
        }
        row.push(token_cell(session.blended_tokens, options, None, false));
        if options.show_cost {
            row.push(right_cell(
                &format_cost(session.cost_usd, options.number_format),
                cost_color,
                false,
            ));
        }
        table.add_row(row);
    }

    let cyan = use_color.then_some(Color::Cyan);
    let mut total_row = vec![
        styled_cell("TOTAL", cyan, true),
        styled_cell(
            &format!("{} sessions", inventory.sessions.len()),
            cyan,
            false,
        ),
        Cell::new(""),
        Cell::new(""),
    ];
    if !options.compact {
        total_row.push(Cell::new(""));
        total_row.push(Cell::new(""));
    }
    total_row.push(token_cell(inventory.total_blended_tokens, options, cyan, true));
    if options.show_cost {
        total_row.push(right_cell(
            &format_cost(inventory.total_cost_usd, options.number_format),
            cost_color,
            true,
        ));
    }
    table.add_row(total_row);

    table
}

/// Print the session inventory, most recent first
pub(crate) fn print_session_table(inventory: &SessionInventory, options: &SessionTableOptions) {
    let table = build_session_table(inventory, options);
    println!("\n  Sessions\n");
    println!("{table}");
    println!();
}

fn build_source_table(sources: &[BoxedSource], use_color: bool) -> Table {
    let mut table = create_styled_table();
    table.set_header(vec![
        header_cell("Source", use_color),
        header_cell("Name", use_color),
        header_cell("Aliases", use_color),
        header_cell("Directories", use_color),
    ]);

    let missing = use_color.then_some(Color::DarkGrey);
    for source in sources {
        let roots = source.roots();
        let dirs = if roots.is_empty() {
            styled_cell("(none found)", missing, false)
        } else {
            let lines: Vec<String> = roots.iter().map(|p| p.display().to_string()).collect();
            Cell::new(lines.join("\n"))
        };
        table.add_row(vec![
            Cell::new(source.name()),
            Cell::new(source.display_name()),
            Cell::new(source.aliases().join(", ")),
            dirs,
        ]);
    }
    table
}

/// Print registered sources with the directories they would read
pub(crate) fn print_source_table(sources: &[BoxedSource], use_color: bool) {
    println!("{}", build_source_table(sources, use_color));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BranchMarker, SourceKind};
    use crate::source::{SourcePaths, resolve_sources};
    use chrono::{TimeZone, Utc};

    fn session(source: SourceKind, preview: &str, tokens: u64) -> SessionRecord {
        let ts = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let mut s = SessionRecord::new(source, "id".into(), "/tmp/x".into(), "id".into(), ts)
            .with_first_message(preview.to_string());
        s.blended_tokens = tokens;
        s.primary_model = Some("gpt-5".into());
        s
    }

    fn options(compact: bool, show_cost: bool) -> SessionTableOptions {
        SessionTableOptions {
            use_color: false,
            compact,
            show_cost,
            number_format: NumberFormat::default(),
        }
    }

    #[test]
    fn source_label_carries_branch_glyph() {
        let mut s = session(SourceKind::Codex, "hi", 1);
        assert_eq!(source_label(&s), "codex");
        s.branch = BranchMarker::BranchFirst;
        assert_eq!(source_label(&s), "┌─ codex");
    }

    #[test]
    fn summary_is_preferred_over_preview() {
        let mut s = session(SourceKind::Claude, "first message", 1);
        assert_eq!(display_preview(&s), "first message");
        s.summary = Some("Refactor parser".into());
        assert_eq!(display_preview(&s), "Refactor parser");
        s.summary = Some("  ".into());
        assert_eq!(display_preview(&s), "first message");
    }

    #[test]
    fn session_table_lists_rows_and_total() {
        let inventory = SessionInventory {
            sessions: vec![
                session(SourceKind::Codex, "fix the build", 1500),
                session(SourceKind::Claude, "write docs", 500),
            ],
            total_blended_tokens: 2000,
            total_cost_usd: 1.5,
        };
        let rendered = build_session_table(&inventory, &options(false, true)).to_string();
        assert!(rendered.contains("fix the build"));
        assert!(rendered.contains("write docs"));
        assert!(rendered.contains("1,500"));
        assert!(rendered.contains("2,000"));
        assert!(rendered.contains("$1.50"));
        assert!(rendered.contains("TOTAL"));
        assert!(rendered.contains("Msgs"));
    }

    #[test]
    fn compact_table_hides_detail_columns_and_cost() {
        let inventory = SessionInventory {
            sessions: vec![session(SourceKind::Codex, "hello", 1_500_000)],
            total_blended_tokens: 1_500_000,
            total_cost_usd: 0.0,
        };
        let rendered = build_session_table(&inventory, &options(true, false)).to_string();
        assert!(!rendered.contains("Msgs"));
        assert!(!rendered.contains("Cost"));
        assert!(rendered.contains("1.5M"));
    }

    #[test]
    fn source_table_lists_every_source() {
        let sources = resolve_sources("all", &SourcePaths::default()).unwrap();
        let rendered = build_source_table(&sources, false).to_string();
        assert!(rendered.contains("OpenAI Codex"));
        assert!(rendered.contains("Claude Code"));
        assert!(rendered.contains("cc"));
    }
}
