//! Joins listing rows with profile bios into the table the dashboard reads.

use std::collections::HashMap;

use reqwest::blocking::Client;
use tracing::{info, warn};

use crate::dataset::{Cell, Table};
use crate::error::DatasetError;
use crate::player_profile::{PlayerBioRecord, PlayerProfile};
use crate::top_players::{PlayerRosterRecord, TopPlayersQuery};

pub const BIO_COLUMNS: &[&str] = &["height_inches", "weight_lbs", "age", "experience_years", "dob"];

#[derive(Debug, Default)]
pub struct BioFetch {
    pub bios: HashMap<String, PlayerBioRecord>,
    pub skipped: usize,
    pub errors: Vec<String>,
}

/// Fetches the bio of every linked player, one request at a time. A failed
/// profile is logged and left out; the other players are unaffected.
pub fn fetch_bios(
    client: &Client,
    roster: &[PlayerRosterRecord],
    snapshot_year: i32,
    base_url: &str,
    mut on_progress: impl FnMut(usize, usize),
) -> BioFetch {
    let mut bios = HashMap::new();
    let mut errors = Vec::new();
    let mut skipped = 0usize;
    let total = roster.len();

    for (idx, player) in roster.iter().enumerate() {
        on_progress(idx + 1, total);
        if bios.contains_key(&player.player_name) {
            continue;
        }
        let Some(path) = player.player_path.as_deref() else {
            skipped += 1;
            continue;
        };
        let bio = PlayerProfile::new(&player.player_name, path, snapshot_year, base_url)
            .and_then(|profile| profile.bio(client));
        match bio {
            Ok(bio) => {
                bios.insert(player.player_name.clone(), bio);
            }
            Err(err) => {
                warn!(player = %player.player_name, error = %err, "bio extraction failed");
                errors.push(format!("{}: {err}", player.player_name));
            }
        }
    }

    info!(
        bios = bios.len(),
        skipped,
        failed = errors.len(),
        "bio fetch finished"
    );
    BioFetch {
        bios,
        skipped,
        errors,
    }
}

pub fn roster_columns(query: &TopPlayersQuery) -> Vec<String> {
    let mut cols: Vec<String> = ["rank", "player_name", "position", "year", "total_points", "average_points"]
        .iter()
        .map(|c| c.to_string())
        .collect();
    cols.extend(query.weeks().map(|w| format!("week_{w}_pts")));
    cols.extend(
        ["opponent", "owner", "bye_week", "salary", "years", "player_path"]
            .iter()
            .map(|c| c.to_string()),
    );
    cols.extend(BIO_COLUMNS.iter().map(|c| c.to_string()));
    cols
}

fn opt_text(value: Option<&str>) -> Cell {
    match value {
        Some(v) if !v.trim().is_empty() => Cell::text(v),
        _ => Cell::Missing,
    }
}

/// Roster rows left-joined with bios by player name; players without a bio
/// keep empty bio columns.
pub fn roster_table(
    query: &TopPlayersQuery,
    roster: &[PlayerRosterRecord],
    bios: &HashMap<String, PlayerBioRecord>,
) -> Result<Table, DatasetError> {
    let weeks = query.weeks().count();
    let mut table = Table::new(roster_columns(query))?;
    for player in roster {
        let bio = bios.get(&player.player_name);
        let mut row = vec![
            Cell::number(player.rank.map(f64::from)),
            Cell::text(&player.player_name),
            Cell::text(&player.position),
            Cell::Number(f64::from(player.year)),
            Cell::number(Some(player.total_points)),
            Cell::number(Some(player.average_points)),
        ];
        row.extend((0..weeks).map(|w| Cell::number(player.weekly_points.get(w).copied().flatten())));
        row.extend([
            opt_text(Some(player.opponent.as_str())),
            opt_text(Some(player.owner.as_str())),
            Cell::number(player.bye_week.map(f64::from)),
            Cell::number(player.salary),
            Cell::number(player.years),
            opt_text(player.player_path.as_deref()),
            Cell::number(bio.and_then(|b| b.height_inches)),
            Cell::number(bio.and_then(|b| b.weight_lbs)),
            Cell::number(bio.and_then(|b| b.age)),
            Cell::number(bio.and_then(|b| b.experience_years)),
            bio.and_then(|b| b.dob)
                .map(|d| Cell::text(d.format("%Y-%m-%d").to_string()))
                .unwrap_or(Cell::Missing),
        ]);
        table.push_row(row)?;
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn roster_record(name: &str, path: Option<&str>) -> PlayerRosterRecord {
        PlayerRosterRecord {
            rank: Some(1),
            player_name: name.to_string(),
            position: name.split_whitespace().last().unwrap_or_default().to_string(),
            year: 2020,
            total_points: 120.0,
            average_points: 7.5,
            weekly_points: vec![Some(10.0), None],
            opponent: "KCC".to_string(),
            owner: String::new(),
            bye_week: Some(9),
            salary: Some(5.0),
            years: None,
            player_path: path.map(str::to_string),
        }
    }

    #[test]
    fn bios_are_left_joined() {
        let mut query = TopPlayersQuery::defaults(2020);
        query.end_week = 2;
        let roster = vec![
            roster_record("Smith, Al BUF QB", Some("player?L=1&P=1")),
            roster_record("Jones, Bo NEP RB", None),
        ];
        let bios = HashMap::from([(
            "Smith, Al BUF QB".to_string(),
            PlayerBioRecord {
                player_name: "Smith, Al BUF QB".to_string(),
                height: Some("6' 2\"".to_string()),
                weight: Some("210 lbs".to_string()),
                dob_text: Some("Sep 17, 1995".to_string()),
                experience: Some("3 Yrs".to_string()),
                height_inches: Some(74.0),
                weight_lbs: Some(210.0),
                experience_years: Some(3.0),
                age: Some(25.0),
                dob: NaiveDate::from_ymd_opt(1995, 9, 17),
            },
        )]);

        let table = roster_table(&query, &roster, &bios).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.columns().len(), 6 + 2 + 6 + BIO_COLUMNS.len());

        let smith = table.row(0).unwrap();
        assert_eq!(smith.number("height_inches"), Some(74.0));
        assert_eq!(smith.text("dob").as_deref(), Some("1995-09-17"));
        assert_eq!(smith.number("week_1_pts"), Some(10.0));
        assert!(smith.get("week_2_pts").unwrap().is_missing());
        assert!(smith.get("owner").unwrap().is_missing());

        let jones = table.row(1).unwrap();
        assert!(jones.get("height_inches").unwrap().is_missing());
        assert!(jones.get("player_path").unwrap().is_missing());
        assert_eq!(jones.text("position").as_deref(), Some("RB"));
    }
}
