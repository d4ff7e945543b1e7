//! Reads every `<table>` of an HTML document into a plain text grid.
//!
//! Tables come back in document order, nested tables included, with
//! `colspan`/`rowspan` cells repeated into every slot they cover. Header rows
//! are the `<thead>` rows, or, without a `<thead>`, the leading rows made only
//! of `<th>` cells.
//!
//! The site gives its tables no ids, so the extractors find them by position.
//! That is brittle: one table added or removed upstream shifts every lookup
//! onto the wrong content, and nothing here can detect it. All positions live
//! in [`PageTable`] so such a change is a one-line fix.

use scraper::{ElementRef, Html};

use crate::error::{ScrapeError, ScrapeResult};

/// The logical tables the extractors read, and where each one sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageTable {
    /// Ranked players on the top-players listing (the first table is the
    /// site's navigation chrome).
    TopPlayers,
    /// Label/value rows: height/weight, DOB/age, experience.
    PlayerBio,
    /// Label/value roster-status rows.
    PlayerStatus,
    /// Season-by-season stats with grouped headers and a totals row.
    SeasonStats,
}

impl PageTable {
    pub const fn index(self) -> usize {
        match self {
            PageTable::TopPlayers => 1,
            PageTable::PlayerBio => 2,
            PageTable::PlayerStatus => 3,
            PageTable::SeasonStats => 5,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            PageTable::TopPlayers => "top players",
            PageTable::PlayerBio => "player bio",
            PageTable::PlayerStatus => "player status",
            PageTable::SeasonStats => "season stats",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HtmlTable {
    pub header: Vec<Vec<String>>,
    pub body: Vec<Vec<String>>,
}

impl HtmlTable {
    pub fn width(&self) -> usize {
        self.header
            .iter()
            .chain(self.body.iter())
            .map(Vec::len)
            .max()
            .unwrap_or(0)
    }

    /// Innermost header label per column (the last header row).
    pub fn inner_labels(&self) -> Vec<String> {
        self.header.last().cloned().unwrap_or_default()
    }

    /// Outermost header label per column (the first header row).
    pub fn outer_labels(&self) -> Vec<String> {
        self.header.first().cloned().unwrap_or_default()
    }
}

/// All tables of one parsed document.
#[derive(Debug, Clone, Default)]
pub struct PageTables {
    tables: Vec<HtmlTable>,
}

impl PageTables {
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);
        let tables = document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name() == "table")
            .map(read_table)
            .collect();
        Self { tables }
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn nth(&self, index: usize) -> Option<&HtmlTable> {
        self.tables.get(index)
    }

    pub fn table(&self, which: PageTable) -> ScrapeResult<&HtmlTable> {
        self.nth(which.index()).ok_or(ScrapeError::MissingTable {
            table: which.label(),
            index: which.index(),
            found: self.tables.len(),
        })
    }
}

/// Visible text of an element with whitespace (and `&nbsp;`) collapsed.
pub fn element_text(el: ElementRef<'_>) -> String {
    let raw: String = el.text().collect();
    normalize_ws(&raw.replace('\u{a0}', " "))
}

fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn child_elements<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    el.children().filter_map(ElementRef::wrap)
}

struct RawRow<'a> {
    in_thead: bool,
    cells: Vec<ElementRef<'a>>,
}

/// Rows that belong to this table, skipping rows of nested tables.
fn own_rows(table: ElementRef<'_>) -> Vec<RawRow<'_>> {
    let mut rows = Vec::new();
    for child in child_elements(table) {
        match child.value().name() {
            "tr" => rows.push(raw_row(child, false)),
            section @ ("thead" | "tbody" | "tfoot") => {
                for tr in child_elements(child).filter(|c| c.value().name() == "tr") {
                    rows.push(raw_row(tr, section == "thead"));
                }
            }
            _ => {}
        }
    }
    rows
}

fn raw_row(tr: ElementRef<'_>, in_thead: bool) -> RawRow<'_> {
    let cells = child_elements(tr)
        .filter(|c| matches!(c.value().name(), "td" | "th"))
        .collect();
    RawRow { in_thead, cells }
}

fn span_attr(el: ElementRef<'_>, name: &str) -> usize {
    el.value()
        .attr(name)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(1)
}

struct Carry {
    text: String,
    remaining: usize,
}

fn read_table(table: ElementRef<'_>) -> HtmlTable {
    let rows = own_rows(table);
    let has_thead = rows.iter().any(|r| r.in_thead);

    let mut carries: Vec<Option<Carry>> = Vec::new();
    let mut grid: Vec<Vec<String>> = Vec::with_capacity(rows.len());
    let mut header_len = 0usize;
    let mut header_open = true;

    for row in &rows {
        let is_header = if has_thead {
            row.in_thead
        } else {
            header_open
                && !row.cells.is_empty()
                && row.cells.iter().all(|c| c.value().name() == "th")
        };
        if is_header && header_open {
            header_len += 1;
        } else {
            header_open = false;
        }

        let mut out = Vec::new();
        let mut cells = row.cells.iter();
        loop {
            let col = out.len();
            if let Some(Some(carry)) = carries.get_mut(col) {
                out.push(carry.text.clone());
                carry.remaining -= 1;
                if carry.remaining == 0 {
                    carries[col] = None;
                }
                continue;
            }
            let Some(cell) = cells.next() else {
                // Trailing rowspans past the last cell of this row.
                if carries.iter().skip(col).any(Option::is_some) {
                    out.push(String::new());
                    continue;
                }
                break;
            };
            let text = element_text(*cell);
            let colspan = span_attr(*cell, "colspan");
            let rowspan = span_attr(*cell, "rowspan");
            for _ in 0..colspan {
                let slot = out.len();
                if rowspan > 1 {
                    if carries.len() <= slot {
                        carries.resize_with(slot + 1, || None);
                    }
                    carries[slot] = Some(Carry {
                        text: text.clone(),
                        remaining: rowspan - 1,
                    });
                }
                out.push(text.clone());
            }
        }
        grid.push(out);
    }

    let body = grid.split_off(header_len);
    HtmlTable { header: grid, body }
}
