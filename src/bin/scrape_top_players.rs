use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use project_morey::assemble::{BioFetch, fetch_bios, roster_table};
use project_morey::config::{self, DEFAULT_DATA_PATH, ScrapeConfig};
use project_morey::dataset::Table;
use project_morey::http_client::http_client;
use project_morey::table_export::export_table_xlsx;
use project_morey::top_players::{TopPlayers, TopPlayersQuery};
use project_morey::zscore::with_position_zscores;

const DEFAULT_YEARS: &[i32] = &[2019, 2020];

struct YearSummary {
    year: i32,
    players: usize,
    linked: usize,
    bios: usize,
    errors: Vec<String>,
}

fn main() -> Result<()> {
    config::load_dotenv();
    config::init_tracing();

    let scrape = ScrapeConfig::from_env();
    let client = http_client(&scrape)?;

    let years = parse_list_arg("--years").unwrap_or_else(|| DEFAULT_YEARS.to_vec());
    if years.is_empty() {
        return Err(anyhow!("no years resolved for ingest"));
    }
    let out_path = parse_path_arg("--out").unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));
    let xlsx_path = parse_path_arg("--xlsx");
    let fetch_profiles = !has_flag("--no-profiles");

    let mut combined: Option<Table> = None;
    let mut summaries = Vec::new();
    for &year in &years {
        let query = build_query(year)?;
        let weeks = query.weeks();
        let listing = TopPlayers::new(query, &scrape.base_url)
            .with_context(|| format!("listing url for {year}"))?;
        let roster = listing
            .roster(client)
            .with_context(|| format!("top players for {year}"))?;
        let linked = roster.iter().filter(|p| p.player_path.is_some()).count();

        let fetched = if fetch_profiles {
            fetch_bios(
                client,
                &roster,
                listing.query().snapshot_year,
                &scrape.base_url,
                |done, total| {
                    if done % 50 == 0 || done == total {
                        eprintln!("{year}: profiles {done}/{total}");
                    }
                },
            )
        } else {
            BioFetch::default()
        };

        let table = roster_table(listing.query(), &roster, &fetched.bios)
            .with_context(|| format!("assemble {year} (weeks {weeks:?})"))?;
        summaries.push(YearSummary {
            year,
            players: roster.len(),
            linked,
            bios: fetched.bios.len(),
            errors: fetched.errors,
        });

        match combined.as_mut() {
            Some(all) => all
                .append(table)
                .with_context(|| format!("combine {year} with earlier years"))?,
            None => combined = Some(table),
        }
    }

    let Some(table) = combined else {
        return Err(anyhow!("nothing scraped"));
    };
    let table = with_position_zscores(table).context("z-score total points")?;
    table
        .write_csv(&out_path)
        .with_context(|| format!("write {}", out_path.display()))?;

    println!("Top players ingest complete");
    println!("CSV: {}", out_path.display());
    if let Some(path) = xlsx_path {
        let report = export_table_xlsx(&path, "top_players", &table)?;
        println!(
            "XLSX: {} ({} rows x {} columns)",
            path.display(),
            report.rows,
            report.columns
        );
    }
    println!("Rows: {}", table.len());
    for item in &summaries {
        println!(
            "year {}: players={} linked={} bios={}",
            item.year, item.players, item.linked, item.bios
        );
        if !item.errors.is_empty() {
            println!("  errors: {}", item.errors.len());
            for err in item.errors.iter().take(6) {
                println!("   - {err}");
            }
        }
    }

    Ok(())
}

fn build_query(year: i32) -> Result<TopPlayersQuery> {
    let mut query = TopPlayersQuery::defaults(year);
    if let Some(league) = parse_num_arg("--league") {
        query.league_id = league;
    }
    if let Some(count) = parse_num_arg("--count") {
        query.count = count;
    }
    if let Some(week) = parse_num_arg("--start-week") {
        query.start_week = week;
    }
    if let Some(week) = parse_num_arg("--end-week") {
        query.end_week = week;
    }
    if let Some(snapshot) = parse_num_arg("--snapshot-year") {
        query.snapshot_year = snapshot;
    }
    if query.start_week == 0 || query.start_week > query.end_week {
        return Err(anyhow!(
            "invalid week range {}-{}",
            query.start_week,
            query.end_week
        ));
    }
    Ok(query)
}

fn has_flag(name: &str) -> bool {
    std::env::args().skip(1).any(|arg| arg == name)
}

/// Value of `--name=value` or `--name value`, if present and non-empty.
fn arg_value(name: &str) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&prefix) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

fn parse_path_arg(name: &str) -> Option<PathBuf> {
    arg_value(name).map(PathBuf::from)
}

fn parse_num_arg<T: std::str::FromStr>(name: &str) -> Option<T> {
    arg_value(name).and_then(|raw| raw.parse::<T>().ok())
}

fn parse_list_arg(name: &str) -> Option<Vec<i32>> {
    let raw = arg_value(name)?;
    let mut out = Vec::new();
    for year in raw
        .split([',', ';', ' '])
        .filter_map(|part| part.trim().parse::<i32>().ok())
    {
        if !out.contains(&year) {
            out.push(year);
        }
    }
    Some(out)
}
