use anyhow::Result;

use liga_snapshot::config::SnapshotConfig;
use liga_snapshot::http_client::http_client;
use liga_snapshot::markup::MarkupAdapter;
use liga_snapshot::pipeline::{self, Sources};
use liga_snapshot::sportsdb::SportsDbAdapter;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let cfg = SnapshotConfig::from_env();
    let client = http_client()?;

    let api = SportsDbAdapter::new(client, &cfg);
    let scraper = cfg
        .markup_url
        .as_ref()
        .map(|url| MarkupAdapter::new(client, &cfg, url.clone()));

    let mut sources = Sources {
        events: vec![&api],
        standings: vec![&api],
    };
    if let Some(scraper) = &scraper {
        sources.events.push(scraper);
        sources.standings.push(scraper);
    }

    let report = pipeline::run(&cfg, &sources)?;

    println!("Snapshot complete: {}", report.out_dir.display());
    println!(
        "Counts: fixtures={} results={} standings={}",
        report.counts.fixtures, report.counts.results, report.counts.standings_rows
    );
    println!(
        "Standings source: {}",
        report
            .standings_source
            .map(|t| t.as_code())
            .unwrap_or("kept_old")
    );
    println!(
        "Written: fixtures={} results={} standings={} meta={}",
        report.wrote_fixtures, report.wrote_results, report.wrote_standings, report.wrote_meta
    );
    for (stage, code) in &report.status {
        println!("  {stage}: {code}");
    }

    Ok(())
}
