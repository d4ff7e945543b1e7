use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::figures::{box_figure, metric_label, scatter_matrix_figure};
use super::layout::INDEX_HTML;
use super::{AppState, DashboardData, DEFAULT_SCATTER_DIMENSIONS};
use crate::dataset::{Cell, Table, filter_position_year};

type ApiResult<T> = std::result::Result<Json<T>, (StatusCode, String)>;

#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    /// Comma-separated; absent means every position, empty means none.
    pub positions: Option<String>,
    pub year: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct BoxQuery {
    pub positions: Option<String>,
    pub year: Option<i64>,
    pub top: Option<String>,
    pub bottom: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ScatterQuery {
    pub positions: Option<String>,
    pub year: Option<i64>,
    /// Comma-separated metric columns.
    pub dims: Option<String>,
}

impl BoxQuery {
    fn filter(&self) -> FilterQuery {
        FilterQuery {
            positions: self.positions.clone(),
            year: self.year,
        }
    }
}

impl ScatterQuery {
    fn filter(&self) -> FilterQuery {
        FilterQuery {
            positions: self.positions.clone(),
            year: self.year,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MetricOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Serialize)]
pub struct OptionsResponse {
    pub positions: Vec<String>,
    pub years: Vec<i64>,
    pub default_year: Option<i64>,
    pub metrics: Vec<MetricOption>,
    pub default_top: String,
    pub default_bottom: String,
    pub default_dimensions: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RowsResponse {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn bad_request(msg: impl Into<String>) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, msg.into())
}

/// Selected positions (kept in dashboard order), year, and the filtered rows.
pub fn apply_filter(
    data: &DashboardData,
    filter: &FilterQuery,
) -> Result<(Vec<String>, i64, Table), (StatusCode, String)> {
    let positions = match filter.positions.as_deref() {
        None => data.positions.clone(),
        Some(raw) => {
            let wanted = split_list(raw);
            data.positions
                .iter()
                .filter(|p| wanted.contains(*p))
                .cloned()
                .collect()
        }
    };
    let year = filter
        .year
        .or_else(|| data.default_year())
        .ok_or_else(|| bad_request("no year selected and none in data"))?;
    let rows = filter_position_year(&data.table, &positions, year);
    Ok((positions, year, rows))
}

fn check_metric<'a>(
    data: &DashboardData,
    raw: Option<&'a str>,
    fallback: &'a str,
) -> Result<&'a str, (StatusCode, String)> {
    let name = raw.unwrap_or(fallback);
    if data.is_metric(name) {
        Ok(name)
    } else {
        Err(bad_request(format!("unknown metric {name}")))
    }
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn options(State(state): State<AppState>) -> Json<OptionsResponse> {
    let data = &state.data;
    Json(OptionsResponse {
        positions: data.positions.clone(),
        years: data.years.clone(),
        default_year: data.default_year(),
        metrics: data
            .metrics
            .iter()
            .map(|m| MetricOption {
                value: m.clone(),
                label: metric_label(m),
            })
            .collect(),
        default_top: "total_points".to_string(),
        default_bottom: "z_score".to_string(),
        default_dimensions: DEFAULT_SCATTER_DIMENSIONS
            .iter()
            .filter(|d| data.is_metric(d))
            .map(|d| d.to_string())
            .collect(),
    })
}

/// GET /api/box
pub async fn box_plot(
    State(state): State<AppState>,
    Query(q): Query<BoxQuery>,
) -> ApiResult<Value> {
    let data = &state.data;
    let top = check_metric(data, q.top.as_deref(), "total_points")?;
    let bottom = check_metric(data, q.bottom.as_deref(), "z_score")?;
    let (positions, year, rows) = apply_filter(data, &q.filter())?;
    Ok(Json(box_figure(&rows, &positions, &data.positions, year, top, bottom)))
}

/// GET /api/scatter
pub async fn scatter_matrix(
    State(state): State<AppState>,
    Query(q): Query<ScatterQuery>,
) -> ApiResult<Value> {
    let data = &state.data;
    let dims = match q.dims.as_deref() {
        Some(raw) => split_list(raw),
        None => DEFAULT_SCATTER_DIMENSIONS.iter().map(|d| d.to_string()).collect(),
    };
    if let Some(unknown) = dims.iter().find(|d| !data.is_metric(d)) {
        return Err(bad_request(format!("unknown dimension {unknown}")));
    }
    let (positions, year, rows) = apply_filter(data, &q.filter())?;
    Ok(Json(scatter_matrix_figure(
        &rows,
        &positions,
        &data.positions,
        year,
        &dims,
    )))
}

/// GET /api/rows: the filtered rows with every column.
pub async fn rows(
    State(state): State<AppState>,
    Query(q): Query<FilterQuery>,
) -> ApiResult<RowsResponse> {
    let (_, _, rows) = apply_filter(&state.data, &q)?;
    Ok(Json(RowsResponse {
        columns: rows.columns().to_vec(),
        rows: rows.rows().map(|r| r.cells().to_vec()).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> DashboardData {
        let csv = "\
player_name,position,year,total_points,z_score
a QB,QB,2020,300,1
b RB,RB,2020,200,0
c QB,QB,2019,250,0
";
        DashboardData::new(Table::from_csv_reader(csv.as_bytes(), "t").unwrap(), &[])
    }

    #[test]
    fn absent_positions_means_all_and_year_defaults_to_latest() {
        let d = data();
        let (positions, year, rows) = apply_filter(&d, &FilterQuery::default()).unwrap();
        assert_eq!(positions, vec!["QB", "RB"]);
        assert_eq!(year, 2020);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn empty_positions_selects_nothing() {
        let d = data();
        let filter = FilterQuery {
            positions: Some(String::new()),
            year: Some(2020),
        };
        let (positions, _, rows) = apply_filter(&d, &filter).unwrap();
        assert!(positions.is_empty());
        assert!(rows.is_empty());
    }

    #[test]
    fn unknown_metric_is_rejected() {
        let d = data();
        assert!(check_metric(&d, Some("salary"), "z_score").is_err());
        assert_eq!(check_metric(&d, None, "z_score").unwrap(), "z_score");
    }
}
