// src/parse/mod.rs

pub mod raw_table;

pub use raw_table::RawTable;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument, trace};

/// Keyword every championship table contains.
pub const TABLE_KEYWORD: &str = "WBA";

/// Upper bound on colspan/rowspan, same as browsers.
const MAX_SPAN: usize = 1000;

/// Return every `<table>` whose text contains `keyword`, in document order.
///
/// No match is not an error: the caller decides what an empty result means.
#[instrument(level = "debug", skip(html), fields(html_len = html.len()))]
pub fn parse_tables(html: &str, keyword: &str) -> Vec<RawTable> {
    let document = Html::parse_document(html);
    let table_sel = Selector::parse("table").expect("table selector should parse");
    let row_sel = Selector::parse("tr").expect("row selector should parse");
    let mut out = Vec::new();

    for (idx, table) in document.select(&table_sel).enumerate() {
        if !table_text(table).contains(keyword) {
            trace!(idx, "table skipped, keyword missing");
            continue;
        }
        let raw = read_table(table, &row_sel);
        trace!(
            idx,
            header_rows = raw.header_rows.len(),
            rows = raw.rows.len(),
            "table kept"
        );
        out.push(raw);
    }

    debug!(tables = out.len(), keyword, "matched tables");
    out
}

fn table_text(table: ElementRef<'_>) -> String {
    table.text().collect::<String>()
}

struct Cell {
    text: String,
    header: bool,
    colspan: usize,
    rowspan: usize,
}

/// Rows owned by `table` (rows of nested tables are skipped).
fn own_rows<'a>(
    table: ElementRef<'a>,
    row_sel: &'a Selector,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    let table_id = table.id();
    table.select(row_sel).filter(move |tr| {
        tr.ancestors()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "table")
            .map(|el| el.id() == table_id)
            .unwrap_or(false)
    })
}

fn read_cells(tr: ElementRef<'_>) -> Vec<Cell> {
    tr.children()
        .filter_map(ElementRef::wrap)
        .filter(|el| matches!(el.value().name(), "th" | "td"))
        .map(|el| Cell {
            text: cell_text(el),
            header: el.value().name() == "th",
            colspan: span_attr(el, "colspan"),
            rowspan: span_attr(el, "rowspan"),
        })
        .collect()
}

fn span_attr(el: ElementRef<'_>, name: &str) -> usize {
    el.value()
        .attr(name)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(1)
        .min(MAX_SPAN)
}

/// Text nodes joined with a space, then whitespace collapsed.
pub fn cell_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Expand spans into a rectangular-ish grid, then split header rows off the top.
fn read_table(table: ElementRef<'_>, row_sel: &Selector) -> RawTable {
    // column index -> (text, rows still to fill)
    let mut carry: Vec<Option<(String, usize)>> = Vec::new();
    let mut grid: Vec<(bool, Vec<String>)> = Vec::new();

    for tr in own_rows(table, row_sel) {
        let cells = read_cells(tr);
        let all_header = !cells.is_empty() && cells.iter().all(|c| c.header);
        let mut row: Vec<String> = Vec::new();
        let mut col = 0;

        for cell in cells {
            fill_carried(&mut carry, &mut row, &mut col);
            for _ in 0..cell.colspan {
                if carry.len() <= col {
                    carry.resize(col + 1, None);
                }
                if cell.rowspan > 1 {
                    carry[col] = Some((cell.text.clone(), cell.rowspan - 1));
                }
                row.push(cell.text.clone());
                col += 1;
            }
        }
        // Spans from above that sit to the right of the last cell. Gaps
        // before the last carried column are left empty.
        if let Some(last) = carry.iter().rposition(Option::is_some) {
            while col <= last {
                if !take_carried(&mut carry, &mut row, col) {
                    row.push(String::new());
                }
                col += 1;
            }
        }

        if !row.is_empty() {
            grid.push((all_header, row));
        }
    }

    let head_len = grid.iter().take_while(|(header, _)| *header).count();
    let mut rows = grid.into_iter().map(|(_, r)| r);
    RawTable {
        header_rows: rows.by_ref().take(head_len).collect(),
        rows: rows.collect(),
    }
}

fn fill_carried(carry: &mut [Option<(String, usize)>], row: &mut Vec<String>, col: &mut usize) {
    while *col < carry.len() && take_carried(carry, row, *col) {
        *col += 1;
    }
}

fn take_carried(carry: &mut [Option<(String, usize)>], row: &mut Vec<String>, col: usize) -> bool {
    match carry[col].take() {
        Some((text, left)) => {
            row.push(text.clone());
            if left > 1 {
                carry[col] = Some((text, left - 1));
            }
            true
        }
        None => false,
    }
}
