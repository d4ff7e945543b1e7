use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use reqwest::blocking::Client;

use project_morey::error::ScrapeError;
use project_morey::page_cache::RawPage;
use project_morey::player_profile::{PlayerProfile, extract_bio, extract_stats, extract_status};

const PLAYER: &str = "Mahomes, Patrick KCC QB";

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn profile_page() -> RawPage {
    RawPage::new("fixture://player", read_fixture("player_profile.html"))
}

#[test]
fn bio_fields_are_normalized() {
    let bio = extract_bio(&profile_page(), PLAYER).expect("fixture should parse");
    assert_eq!(bio.player_name, PLAYER);
    assert_eq!(bio.height.as_deref(), Some("6' 3\""));
    assert_eq!(bio.height_inches, Some(75.0));
    assert_eq!(bio.weight_lbs, Some(230.0));
    assert_eq!(bio.age, Some(25.0));
    assert_eq!(bio.experience_years, Some(4.0));
    assert_eq!(bio.dob, NaiveDate::from_ymd_opt(1995, 9, 17));
}

#[test]
fn status_attributes_use_cleaned_labels() {
    let status = extract_status(&profile_page(), PLAYER).expect("fixture should parse");
    assert_eq!(status.get("roster_status"), Some("Gridiron Gang"));
    assert_eq!(status.get("nfl_team"), Some("Kansas City Chiefs"));
    assert_eq!(status.get("injury_status"), Some("-"));
}

#[test]
fn stats_are_melted_by_season() {
    let stats = extract_stats(&profile_page(), PLAYER).expect("fixture should parse");

    // Three seasons (totals row dropped) by five stats (empty Fum dropped).
    assert_eq!(stats.len(), 3 * 5);
    let pairs: HashSet<(&str, &str)> = stats
        .iter()
        .map(|s| (s.season.as_str(), s.stat_name.as_str()))
        .collect();
    assert_eq!(pairs.len(), stats.len());
    assert!(stats.iter().all(|s| s.season != "Total"));
    assert!(stats.iter().all(|s| s.stat_name != "Fum"));

    let stat_names: Vec<&str> = stats
        .iter()
        .map(|s| s.stat_name.as_str())
        .fold(Vec::new(), |mut acc, name| {
            if !acc.contains(&name) {
                acc.push(name);
            }
            acc
        });
    assert_eq!(
        stat_names,
        vec!["Passing Yds", "Passing TD", "Rushing Yds", "Rushing TD", "FPts"]
    );

    let yards_2018 = stats
        .iter()
        .find(|s| s.season == "2018" && s.stat_name == "Passing Yds")
        .expect("2018 passing yards");
    assert_eq!(yards_2018.value, Some(5097.0));
}

#[test]
fn accessors_share_one_preloaded_page() {
    let profile = PlayerProfile::with_page(PLAYER, profile_page());
    assert!(profile.is_loaded());
    // No request is made for a preloaded page.
    let client = Client::new();
    let bio = profile.bio(&client).expect("bio");
    let stats = profile.stats(&client).expect("stats");
    assert_eq!(bio.weight_lbs, Some(230.0));
    assert_eq!(stats.len(), 15);
}

#[test]
fn profile_url_uses_snapshot_year() {
    let profile = PlayerProfile::new(
        PLAYER,
        "player?L=46381&P=13116",
        2021,
        "https://www58.myfantasyleague.com/",
    )
    .expect("valid url");
    assert_eq!(
        profile.url(),
        "https://www58.myfantasyleague.com/2021/player?L=46381&P=13116"
    );
    assert!(!profile.is_loaded());
}

#[test]
fn short_page_reports_missing_stats_table() {
    let page = RawPage::new("fixture://short", read_fixture("top_players.html"));
    let err = extract_stats(&page, PLAYER).unwrap_err();
    assert!(
        matches!(err, ScrapeError::MissingTable { index: 5, found: 2, .. }),
        "got {err:?}"
    );
}
