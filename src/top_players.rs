use std::collections::{HashMap, HashSet};
use std::ops::RangeInclusive;

use reqwest::Url;
use reqwest::blocking::Client;
use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ScrapeError, ScrapeResult};
use crate::html_tables::{PageTable, PageTables, element_text};
use crate::normalize::{parse_digits_to_num, parse_number_cell, present};
use crate::page_cache::{LazyPage, RawPage};

/// Profile anchors on the listing look like `player?L=46381&P=13604`.
const PLAYER_PATH_PREFIX: &str = "player?L";
const TABLE: &str = "top players";
/// Weekly cells the listing fills in for a team's bye week.
const BYE_MARKERS: &[&str] = &["bye", "b"];

/// Query for the site's "top players" listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopPlayersQuery {
    pub league_id: u32,
    pub search_type: String,
    pub count: u32,
    pub year: i32,
    pub start_week: u32,
    pub end_week: u32,
    pub category: String,
    pub position: String,
    pub display: String,
    pub team: String,
    /// Year segment of the site URL; the site serves past seasons from the
    /// current snapshot.
    pub snapshot_year: i32,
    pub append_player_paths: bool,
}

impl TopPlayersQuery {
    pub fn defaults(year: i32) -> Self {
        Self {
            league_id: 46381,
            search_type: "BASIC".to_string(),
            count: 500,
            year,
            start_week: 1,
            end_week: 16,
            category: "overall".to_string(),
            position: "*".to_string(),
            display: "points".to_string(),
            team: "*".to_string(),
            snapshot_year: 2021,
            append_player_paths: true,
        }
    }

    pub fn weeks(&self) -> RangeInclusive<u32> {
        self.start_week..=self.end_week
    }

    pub fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("L", self.league_id.to_string()),
            ("SEARCHTYPE", self.search_type.clone()),
            ("COUNT", self.count.to_string()),
            ("YEAR", self.year.to_string()),
            ("START_WEEK", self.start_week.to_string()),
            ("END_WEEK", self.end_week.to_string()),
            ("CATEGORY", self.category.clone()),
            ("POSITION", self.position.clone()),
            ("DISPLAY", self.display.clone()),
            ("TEAM", self.team.clone()),
        ]
    }

    pub fn url(&self, base_url: &str) -> ScrapeResult<String> {
        site_url(base_url, &format!("{}/top", self.snapshot_year))
    }

    /// Column names of the listing, by position.
    pub fn columns(&self) -> Vec<String> {
        let mut cols = vec![
            "rank".to_string(),
            "player_name".to_string(),
            "total_points".to_string(),
            "average_points".to_string(),
        ];
        cols.extend(self.weeks().map(|w| format!("week_{w}_pts")));
        cols.push(format!("week_{}_opponent", self.start_week));
        cols.extend(
            ["owner", "bye_week", "salary", "years"]
                .iter()
                .map(|c| c.to_string()),
        );
        cols
    }
}

pub(crate) fn site_url(base_url: &str, path: &str) -> ScrapeResult<String> {
    let base = Url::parse(base_url).map_err(|err| ScrapeError::InvalidUrl {
        url: base_url.to_string(),
        reason: err.to_string(),
    })?;
    base.join(path)
        .map(|u| u.to_string())
        .map_err(|err| ScrapeError::InvalidUrl {
            url: format!("{base_url}{path}"),
            reason: err.to_string(),
        })
}

/// One ranked player for one listing query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRosterRecord {
    pub rank: Option<u32>,
    pub player_name: String,
    /// Last token of the display name. The site suffixes names with the
    /// position code; a name ending in something else (e.g. "Jr.") yields
    /// that token instead.
    pub position: String,
    pub year: i32,
    pub total_points: f64,
    pub average_points: f64,
    /// One entry per week of the query range, absent for byes and blanks.
    pub weekly_points: Vec<Option<f64>>,
    pub opponent: String,
    pub owner: String,
    pub bye_week: Option<u32>,
    pub salary: Option<f64>,
    pub years: Option<f64>,
    pub player_path: Option<String>,
}

/// Listing extractor; owns the fetched page for reuse.
pub struct TopPlayers {
    query: TopPlayersQuery,
    url: String,
    page: LazyPage,
}

impl TopPlayers {
    pub fn new(query: TopPlayersQuery, base_url: &str) -> ScrapeResult<Self> {
        let url = query.url(base_url)?;
        Ok(Self {
            query,
            url,
            page: LazyPage::new(),
        })
    }

    pub fn with_page(query: TopPlayersQuery, page: RawPage) -> Self {
        Self {
            url: page.key.clone(),
            query,
            page: LazyPage::preloaded(page),
        }
    }

    pub fn query(&self) -> &TopPlayersQuery {
        &self.query
    }

    pub fn roster(&self, client: &Client) -> ScrapeResult<Vec<PlayerRosterRecord>> {
        let page = self
            .page
            .get_or_fetch(client, &self.url, &self.query.params())?;
        extract_roster(page, &self.query)
    }

    /// Roster from an already loaded page.
    pub fn cached_roster(&self) -> Option<ScrapeResult<Vec<PlayerRosterRecord>>> {
        self.page.get().map(|page| extract_roster(page, &self.query))
    }
}

pub fn extract_roster(
    page: &RawPage,
    query: &TopPlayersQuery,
) -> ScrapeResult<Vec<PlayerRosterRecord>> {
    let tables = PageTables::parse(&page.body);
    let table = tables.table(PageTable::TopPlayers)?;

    let columns = query.columns();
    let width = table.width();
    if width != columns.len() {
        return Err(ScrapeError::malformed(
            TABLE,
            format!(
                "expected {} columns for weeks {}-{}, found {width}",
                columns.len(),
                query.start_week,
                query.end_week
            ),
        ));
    }

    let links = if query.append_player_paths {
        player_paths(&page.body)
    } else {
        HashMap::new()
    };

    let weeks = query.weeks().count();
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(table.body.len());
    for row in &table.body {
        if row.iter().all(|c| present(Some(c)).is_none()) {
            continue;
        }
        let cell = |idx: usize| row.get(idx).map(String::as_str);

        let Some(player_name) = present(cell(1)).map(str::to_string) else {
            return Err(ScrapeError::malformed(TABLE, "row without player name"));
        };
        if !seen.insert(player_name.clone()) {
            return Err(ScrapeError::malformed(
                TABLE,
                format!("duplicate player {player_name:?}"),
            ));
        }
        let position = position_from_name(&player_name)
            .ok_or_else(|| ScrapeError::malformed(TABLE, "empty player name"))?;

        let total_points = parse_number_cell(&columns[2], cell(2))?
            .ok_or_else(|| ScrapeError::coercion(&columns[2], cell(2).unwrap_or_default()))?;
        let average_points = parse_number_cell(&columns[3], cell(3))?
            .ok_or_else(|| ScrapeError::coercion(&columns[3], cell(3).unwrap_or_default()))?;

        let weekly_points = (0..weeks)
            .map(|w| weekly_cell(&columns[4 + w], cell(4 + w)))
            .collect::<ScrapeResult<Vec<_>>>()?;

        let tail = 4 + weeks;
        let player_path = links.get(&player_name).cloned();
        out.push(PlayerRosterRecord {
            rank: parse_digits_to_num(cell(0)).map(|r| r as u32),
            position,
            year: query.year,
            total_points,
            average_points,
            weekly_points,
            opponent: cell(tail).unwrap_or_default().to_string(),
            owner: cell(tail + 1).unwrap_or_default().to_string(),
            bye_week: parse_digits_to_num(cell(tail + 2)).map(|w| w as u32),
            salary: parse_number_cell("salary", cell(tail + 3))?,
            years: parse_number_cell("years", cell(tail + 4))?,
            player_path,
            player_name,
        });
    }

    let linked = out.iter().filter(|r| r.player_path.is_some()).count();
    info!(
        year = query.year,
        players = out.len(),
        linked,
        "top players extracted"
    );
    Ok(out)
}

/// Weekly points; a bye marker reads as absent, any other text must be a number.
fn weekly_cell(column: &str, raw: Option<&str>) -> ScrapeResult<Option<f64>> {
    match present(raw) {
        Some(text) if BYE_MARKERS.iter().any(|m| text.eq_ignore_ascii_case(m)) => Ok(None),
        _ => parse_number_cell(column, raw),
    }
}

pub fn position_from_name(name: &str) -> Option<String> {
    name.split_whitespace().last().map(str::to_string)
}

/// Display text -> profile path for every profile anchor on the page.
/// Only anchors with a `class` attribute count; the first anchor wins when
/// a text repeats.
pub fn player_paths(html: &str) -> HashMap<String, String> {
    let document = Html::parse_document(html);
    let mut out = HashMap::new();
    for a in document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "a")
    {
        let Some(href) = a.value().attr("href") else {
            continue;
        };
        if !href.starts_with(PLAYER_PATH_PREFIX) || a.value().attr("class").is_none() {
            continue;
        }
        out.entry(element_text(a)).or_insert_with(|| href.to_string());
    }
    debug!(links = out.len(), "profile links found");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_is_last_token() {
        assert_eq!(
            position_from_name("Mahomes, Patrick KCC QB").as_deref(),
            Some("QB")
        );
        assert_eq!(position_from_name("   "), None);
    }

    #[test]
    fn columns_follow_week_range() {
        let mut q = TopPlayersQuery::defaults(2020);
        assert_eq!(q.columns().len(), 4 + 16 + 5);
        q.start_week = 3;
        q.end_week = 5;
        let cols = q.columns();
        assert_eq!(cols.len(), 4 + 3 + 5);
        assert_eq!(cols[4], "week_3_pts");
        assert_eq!(cols[7], "week_3_opponent");
    }

    #[test]
    fn listing_url_uses_snapshot_year() {
        let q = TopPlayersQuery::defaults(2019);
        assert_eq!(
            q.url("https://www58.myfantasyleague.com/").unwrap(),
            "https://www58.myfantasyleague.com/2021/top"
        );
        assert!(q.params().contains(&("YEAR", "2019".to_string())));
    }

    #[test]
    fn bye_marker_is_absent_but_text_is_an_error() {
        assert_eq!(weekly_cell("week_1_pts", Some("BYE")).unwrap(), None);
        assert_eq!(weekly_cell("week_1_pts", Some("-")).unwrap(), None);
        assert_eq!(weekly_cell("week_1_pts", Some("12.5")).unwrap(), Some(12.5));
        assert!(matches!(
            weekly_cell("week_1_pts", Some("abc")),
            Err(ScrapeError::Coercion { .. })
        ));
    }

    #[test]
    fn player_paths_require_class_and_prefix() {
        let html = r#"
            <a class="position_qb" href="player?L=46381&P=1">A B QB</a>
            <a href="player?L=46381&P=2">C D RB</a>
            <a class="x" href="options?L=46381">E F WR</a>
            <a class="y" href="player?L=46381&P=9">A B QB</a>
        "#;
        let links = player_paths(html);
        assert_eq!(links.len(), 1);
        assert_eq!(links["A B QB"], "player?L=46381&P=1");
    }
}
