use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ScrapeError, ScrapeResult};
use crate::html_tables::{HtmlTable, PageTable, PageTables};
use crate::normalize::{
    clean_column_name, experience_to_years, height_to_inches, parse_number_cell, present,
    weight_to_lbs,
};
use crate::page_cache::{LazyPage, RawPage};
use crate::top_players::site_url;

const PAIR_SEPARATOR: &str = " / ";
const DOB_FORMATS: &[&str] = &["%b %d, %Y", "%B %d, %Y", "%m/%d/%Y", "%Y-%m-%d", "%d %b %Y"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerBioRecord {
    pub player_name: String,
    pub height: Option<String>,
    pub weight: Option<String>,
    pub dob_text: Option<String>,
    pub experience: Option<String>,
    pub height_inches: Option<f64>,
    pub weight_lbs: Option<f64>,
    pub experience_years: Option<f64>,
    pub age: Option<f64>,
    pub dob: Option<NaiveDate>,
}

/// Roster-status attributes keyed by cleaned label, in page order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStatusRecord {
    pub player_name: String,
    pub attributes: Vec<(String, String)>,
}

impl PlayerStatusRecord {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// One (season, stat) value of a player's stats table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStatsRecord {
    pub player_name: String,
    pub season: String,
    pub stat_name: String,
    pub value: Option<f64>,
}

/// A player's profile page. The bio, status and stats accessors share one
/// fetch: whichever runs first loads the page, the rest reuse it.
pub struct PlayerProfile {
    player_name: String,
    player_path: String,
    url: String,
    page: LazyPage,
}

impl PlayerProfile {
    pub fn new(
        player_name: impl Into<String>,
        player_path: impl Into<String>,
        snapshot_year: i32,
        base_url: &str,
    ) -> ScrapeResult<Self> {
        let player_path = player_path.into();
        let url = site_url(base_url, &format!("{snapshot_year}/{player_path}"))?;
        Ok(Self {
            player_name: player_name.into(),
            player_path,
            url,
            page: LazyPage::new(),
        })
    }

    pub fn with_page(player_name: impl Into<String>, page: RawPage) -> Self {
        Self {
            player_name: player_name.into(),
            player_path: String::new(),
            url: page.key.clone(),
            page: LazyPage::preloaded(page),
        }
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn player_path(&self) -> &str {
        &self.player_path
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_loaded(&self) -> bool {
        self.page.is_loaded()
    }

    fn load(&self, client: &Client) -> ScrapeResult<&RawPage> {
        self.page.get_or_fetch(client, &self.url, &[])
    }

    pub fn bio(&self, client: &Client) -> ScrapeResult<PlayerBioRecord> {
        extract_bio(self.load(client)?, &self.player_name)
    }

    pub fn status(&self, client: &Client) -> ScrapeResult<PlayerStatusRecord> {
        extract_status(self.load(client)?, &self.player_name)
    }

    pub fn stats(&self, client: &Client) -> ScrapeResult<Vec<PlayerStatsRecord>> {
        extract_stats(self.load(client)?, &self.player_name)
    }
}

/// First two columns of a label/value table, header rows included.
fn label_values(table: &HtmlTable, which: PageTable) -> ScrapeResult<Vec<(String, String)>> {
    if table.width() < 2 {
        return Err(ScrapeError::malformed(
            which.label(),
            "expected label and value columns",
        ));
    }
    Ok(table
        .header
        .iter()
        .chain(table.body.iter())
        .filter_map(|row| match row.as_slice() {
            [label, value, ..] => Some((label.clone(), value.clone())),
            _ => None,
        })
        .collect())
}

fn split_pair(raw: Option<&str>) -> (Option<String>, Option<String>) {
    let Some(raw) = present(raw) else {
        return (None, None);
    };
    match raw.split_once(PAIR_SEPARATOR) {
        Some((a, b)) => (
            present(Some(a)).map(str::to_string),
            present(Some(b)).map(str::to_string),
        ),
        None => (Some(raw.to_string()), None),
    }
}

pub fn parse_dob(raw: Option<&str>) -> ScrapeResult<Option<NaiveDate>> {
    let Some(raw) = present(raw) else {
        return Ok(None);
    };
    DOB_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .map(Some)
        .ok_or_else(|| ScrapeError::coercion("dob", raw))
}

pub fn extract_bio(page: &RawPage, player_name: &str) -> ScrapeResult<PlayerBioRecord> {
    let tables = PageTables::parse(&page.body);
    let table = tables.table(PageTable::PlayerBio)?;
    let fields: HashMap<String, String> = label_values(table, PageTable::PlayerBio)?
        .into_iter()
        .map(|(label, value)| (clean_column_name(&label), value))
        .collect();
    let field = |key: &str| fields.get(key).map(String::as_str);

    let (height, weight) = split_pair(field("heightweight"));
    let (dob_text, age_text) = split_pair(field("dobage"));
    let experience = present(field("experience")).map(str::to_string);

    let record = PlayerBioRecord {
        player_name: player_name.to_string(),
        height_inches: height_to_inches(height.as_deref()),
        weight_lbs: weight_to_lbs(weight.as_deref()),
        experience_years: experience_to_years(experience.as_deref()),
        age: parse_number_cell("age", age_text.as_deref())?,
        dob: parse_dob(dob_text.as_deref())?,
        height,
        weight,
        dob_text,
        experience,
    };
    debug!(player = player_name, "bio extracted");
    Ok(record)
}

pub fn extract_status(page: &RawPage, player_name: &str) -> ScrapeResult<PlayerStatusRecord> {
    let tables = PageTables::parse(&page.body);
    let table = tables.table(PageTable::PlayerStatus)?;
    let attributes = label_values(table, PageTable::PlayerStatus)?
        .into_iter()
        .map(|(label, value)| (clean_column_name(&label), value))
        .filter(|(key, _)| !key.is_empty())
        .collect();
    Ok(PlayerStatusRecord {
        player_name: player_name.to_string(),
        attributes,
    })
}

/// Column names for the stats table: the inner header label, qualified by
/// its group label when the same inner label appears under several groups
/// (e.g. passing and rushing "Yds"). A column with no label at all is named
/// by position, `col_<index>`.
fn stat_column_names(table: &HtmlTable) -> ScrapeResult<Vec<String>> {
    let inner = table.inner_labels();
    let outer = table.outer_labels();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for label in &inner {
        *counts.entry(label.as_str()).or_default() += 1;
    }
    let names: Vec<String> = inner
        .iter()
        .enumerate()
        .map(|(idx, label)| {
            let group = outer.get(idx).map(String::as_str).unwrap_or_default();
            if label.is_empty() {
                format!("col_{idx}")
            } else if counts[label.as_str()] > 1 && !group.is_empty() && group != label.as_str() {
                format!("{group} {label}")
            } else {
                label.clone()
            }
        })
        .collect();

    let mut seen = HashSet::new();
    for name in &names {
        if !seen.insert(name.as_str()) {
            return Err(ScrapeError::malformed(
                PageTable::SeasonStats.label(),
                format!("duplicate column {name:?}"),
            ));
        }
    }
    Ok(names)
}

fn cell(row: &[String], idx: usize) -> Option<&str> {
    row.get(idx).map(String::as_str)
}

pub fn extract_stats(page: &RawPage, player_name: &str) -> ScrapeResult<Vec<PlayerStatsRecord>> {
    let which = PageTable::SeasonStats;
    let tables = PageTables::parse(&page.body);
    let table = tables.table(which)?;

    let Some((_, rows)) = table.body.split_last() else {
        return Err(ScrapeError::malformed(which.label(), "no rows"));
    };
    let names = stat_column_names(table)?;
    let season_col = names
        .iter()
        .position(|n| n.eq_ignore_ascii_case("season"))
        .ok_or_else(|| ScrapeError::malformed(which.label(), "no Season column"))?;

    let value_cols: Vec<usize> = (0..names.len())
        .filter(|idx| *idx != season_col)
        .filter(|idx| rows.iter().any(|row| present(cell(row, *idx)).is_some()))
        .collect();

    let mut seasons = HashSet::new();
    for row in rows {
        let season = cell(row, season_col).unwrap_or_default();
        if !seasons.insert(season) {
            return Err(ScrapeError::malformed(
                which.label(),
                format!("season {season:?} appears twice"),
            ));
        }
    }

    let mut out = Vec::with_capacity(rows.len() * value_cols.len());
    for &idx in &value_cols {
        let stat_name = &names[idx];
        for row in rows {
            out.push(PlayerStatsRecord {
                player_name: player_name.to_string(),
                season: cell(row, season_col).unwrap_or_default().to_string(),
                stat_name: stat_name.clone(),
                value: parse_number_cell(stat_name, cell(row, idx))?,
            });
        }
    }
    debug!(
        player = player_name,
        seasons = rows.len(),
        stats = value_cols.len(),
        "stats extracted"
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_pair_handles_missing_half() {
        assert_eq!(
            split_pair(Some("6' 2\" / 210 lbs")),
            (Some("6' 2\"".to_string()), Some("210 lbs".to_string()))
        );
        assert_eq!(split_pair(Some("6' 2\"")), (Some("6' 2\"".to_string()), None));
        assert_eq!(split_pair(None), (None, None));
    }

    #[test]
    fn dob_formats() {
        let expected = NaiveDate::from_ymd_opt(1995, 9, 17);
        assert_eq!(parse_dob(Some("Sep 17, 1995")).unwrap(), expected);
        assert_eq!(parse_dob(Some("09/17/1995")).unwrap(), expected);
        assert_eq!(parse_dob(Some("")).unwrap(), None);
        assert!(parse_dob(Some("someday")).is_err());
    }

    #[test]
    fn duplicate_inner_labels_take_group_prefix() {
        let table = HtmlTable {
            header: vec![
                vec!["Season".into(), "Passing".into(), "Rushing".into()],
                vec!["Season".into(), "Yds".into(), "Yds".into()],
            ],
            body: vec![],
        };
        assert_eq!(
            stat_column_names(&table).unwrap(),
            vec!["Season", "Passing Yds", "Rushing Yds"]
        );
    }

    #[test]
    fn blank_labels_are_named_by_position() {
        let table = HtmlTable {
            header: vec![vec!["Season".into(), "".into(), "".into()]],
            body: vec![],
        };
        assert_eq!(
            stat_column_names(&table).unwrap(),
            vec!["Season", "col_1", "col_2"]
        );
    }

    #[test]
    fn blank_labelled_columns_keep_unique_stat_names() {
        let html = r#"<html><body>
            <table><tr><td>a</td></tr></table>
            <table><tr><td>b</td></tr></table>
            <table><tr><td>c</td></tr></table>
            <table><tr><td>d</td></tr></table>
            <table><tr><td>e</td></tr></table>
            <table>
              <thead><tr><th>Season</th><th></th><th></th></tr></thead>
              <tbody>
                <tr><td>2019</td><td>1</td><td>2</td></tr>
                <tr><td>2020</td><td>3</td><td>4</td></tr>
                <tr><td>Total</td><td>4</td><td>6</td></tr>
              </tbody>
            </table>
        </body></html>"#;
        let stats = extract_stats(&RawPage::new("inline", html), "p").unwrap();
        assert_eq!(stats.len(), 4);
        let pairs: HashSet<(&str, &str)> = stats
            .iter()
            .map(|s| (s.season.as_str(), s.stat_name.as_str()))
            .collect();
        assert_eq!(pairs.len(), 4);
        assert!(pairs.contains(&("2020", "col_2")));
    }
}
