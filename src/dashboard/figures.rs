//! Plotly figure JSON built from the in-memory table. Every call recomputes
//! from the full table; nothing is cached between requests.

use serde_json::{Value, json};

use crate::dataset::{Cell, Table};

/// Plotly's default qualitative palette; a position keeps its colour across
/// both box plots and the scatter matrix.
const PALETTE: &[&str] = &[
    "#636efa", "#EF553B", "#00cc96", "#ab63fa", "#FFA15A", "#19d3f3", "#FF6692", "#B6E880",
    "#FF97FF", "#FECB52",
];

const HOVER_COLUMNS: &[&str] = &[
    "player_name",
    "total_points",
    "z_score",
    "average_points",
    "age",
    "experience_years",
];

pub const BOX_HEIGHT: u32 = 700;
pub const SCATTER_HEIGHT: u32 = 800;

pub fn metric_label(column: &str) -> String {
    match column {
        "z_score" => "Total Points Z-Score".to_string(),
        "total_points" => "Total Points".to_string(),
        "average_points" => "Average Points".to_string(),
        "height_inches" => "Height (in)".to_string(),
        "weight_lbs" => "Weight (lbs)".to_string(),
        "experience_years" => "Experience (yrs)".to_string(),
        "average_cost_per_point" => "Average Cost per Point".to_string(),
        "bmi" => "BMI".to_string(),
        other => other
            .split('_')
            .filter(|w| !w.is_empty())
            .map(|w| {
                let mut chars = w.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" "),
    }
}

pub fn position_color(positions: &[String], position: &str) -> &'static str {
    let idx = positions.iter().position(|p| p == position).unwrap_or(0);
    PALETTE[idx % PALETTE.len()]
}

fn cell_json(cell: Option<&Cell>) -> Value {
    match cell {
        Some(Cell::Number(v)) => json!(v),
        Some(Cell::Text(s)) => json!(s),
        _ => Value::Null,
    }
}

fn hover_template(first_axis: &str) -> String {
    let mut lines = vec![format!("{first_axis}=%{{y}}")];
    for (idx, col) in HOVER_COLUMNS.iter().enumerate() {
        lines.push(format!("{col}=%{{customdata[{idx}]}}"));
    }
    lines.join("<br>") + "<extra></extra>"
}

/// Rows of `table` (already filtered) whose position is `position`.
fn position_rows(table: &Table, position: &str) -> Table {
    table.filter(|row| row.text("position").as_deref() == Some(position))
}

fn box_traces(
    table: &Table,
    positions: &[String],
    all_positions: &[String],
    metric: &str,
    axis: u8,
) -> Vec<Value> {
    let suffix = if axis == 1 { String::new() } else { axis.to_string() };
    positions
        .iter()
        .map(|pos| {
            let rows = position_rows(table, pos);
            let y: Vec<Value> = rows.rows().map(|r| cell_json(r.get(metric))).collect();
            let x: Vec<&str> = vec![pos.as_str(); y.len()];
            let custom: Vec<Vec<Value>> = rows
                .rows()
                .map(|r| HOVER_COLUMNS.iter().map(|c| cell_json(r.get(c))).collect())
                .collect();
            json!({
                "type": "box",
                "name": pos,
                "x": x,
                "y": y,
                "customdata": custom,
                "boxpoints": "all",
                "showlegend": false,
                "marker": { "color": position_color(all_positions, pos) },
                "hovertemplate": hover_template(&metric_label(metric)),
                "xaxis": format!("x{suffix}"),
                "yaxis": format!("y{suffix}"),
            })
        })
        .collect()
}

fn box_title(year: i64, top: &str, bottom: &str) -> String {
    let mut title = format!(
        "{year} Top Players {} and {}",
        metric_label(top),
        metric_label(bottom)
    );
    if top == "z_score" || bottom == "z_score" {
        title.push_str(" (scaled within position)");
    }
    title.push('.');
    title
}

/// Two stacked box plots (one box per position) of `top` and `bottom` over
/// the already filtered rows.
pub fn box_figure(
    table: &Table,
    positions: &[String],
    all_positions: &[String],
    year: i64,
    top: &str,
    bottom: &str,
) -> Value {
    let mut data = box_traces(table, positions, all_positions, top, 1);
    data.extend(box_traces(table, positions, all_positions, bottom, 2));
    json!({
        "data": data,
        "layout": {
            "title": { "text": box_title(year, top, bottom) },
            "height": BOX_HEIGHT,
            "grid": { "rows": 2, "columns": 1, "pattern": "independent" },
            "yaxis": { "title": { "text": metric_label(top) } },
            "yaxis2": { "title": { "text": metric_label(bottom) } },
            "xaxis2": { "title": { "text": "Position" } },
        }
    })
}

/// Scatter matrix over `dimensions`, one trace per position.
pub fn scatter_matrix_figure(
    table: &Table,
    positions: &[String],
    all_positions: &[String],
    year: i64,
    dimensions: &[String],
) -> Value {
    let data: Vec<Value> = positions
        .iter()
        .map(|pos| {
            let rows = position_rows(table, pos);
            let dims: Vec<Value> = dimensions
                .iter()
                .map(|dim| {
                    let values: Vec<Value> =
                        rows.rows().map(|r| cell_json(r.get(dim))).collect();
                    json!({ "label": metric_label(dim), "values": values })
                })
                .collect();
            let names: Vec<Value> = rows.rows().map(|r| cell_json(r.get("player_name"))).collect();
            json!({
                "type": "splom",
                "name": pos,
                "dimensions": dims,
                "text": names,
                "diagonal": { "visible": false },
                "marker": { "color": position_color(all_positions, pos), "size": 6 },
            })
        })
        .collect();
    json!({
        "data": data,
        "layout": {
            "title": { "text": format!("{year} Top Players scatter matrix") },
            "height": SCATTER_HEIGHT,
            "dragmode": "select",
            "hovermode": "closest",
        }
    })
}
