use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::store::{PennyStore, StoredPenny};

pub fn run(args: StatusArgs) -> Result<()> {
    if !args.db_path.exists() {
        warn!(path = %args.db_path.display(), "dedup store missing");
        return Ok(());
    }

    let store = PennyStore::open(&args.db_path)?;
    info!(
        path = %args.db_path.display(),
        pennies = store.count()?,
        "dedup store status"
    );

    let Some((filter, rows)) = listing(&store, &args)? else {
        return Ok(());
    };

    if args.json {
        let rendered =
            serde_json::to_string_pretty(&rows).context("failed to serialize penny listing")?;
        println!("{rendered}");
        return Ok(());
    }

    info!(filter = %filter, rows = rows.len(), "listing pennies");
    for row in &rows {
        info!(
            state = %row.state,
            city = %row.city,
            location = %row.location,
            name = %row.name,
            orientation = %row.orientation,
            penny_type = %row.penny_type,
            year = %row.year,
            retired = row.retired,
            created_at = %row.created_at,
            "penny"
        );
    }

    Ok(())
}

fn listing(store: &PennyStore, args: &StatusArgs) -> Result<Option<(String, Vec<StoredPenny>)>> {
    if let Some(state) = &args.state {
        return Ok(Some((format!("state={state}"), store.by_state(state)?)));
    }
    if let Some(year) = &args.year {
        return Ok(Some((format!("year={year}"), store.by_year(year)?)));
    }
    if let Some(since) = &args.since {
        let since = parse_since(since)?;
        return Ok(Some((
            format!("since={}", since.to_rfc3339()),
            store.added_since(since)?,
        )));
    }
    Ok(None)
}

fn parse_since(value: &str) -> Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("invalid --since timestamp '{value}', expected RFC 3339"))?;
    Ok(parsed.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Orientation, PennyRecord};
    use crate::store::DedupIndex;
    use chrono::TimeZone;

    fn list(store: &PennyStore, args: &StatusArgs) -> Option<(String, Vec<StoredPenny>)> {
        listing(store, args).expect("listing should succeed")
    }

    #[test]
    fn parse_since_normalizes_offsets_to_utc() {
        let parsed = parse_since("2024-05-01T12:00:00+02:00").expect("timestamp should parse");
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0);
        assert_eq!(Some(parsed), expected.single());
        assert!(parse_since("yesterday").is_err());
    }

    #[test]
    fn listing_prefers_state_then_year_then_since() {
        let mut store = PennyStore::open_in_memory().expect("in-memory store should open");
        let castle = PennyRecord {
            state: "California".to_string(),
            city: "Anaheim".to_string(),
            name: "Castle".to_string(),
            orientation: Orientation::H,
            year: "2024".to_string(),
            ..PennyRecord::default()
        };
        assert!(store.add(&castle).expect("penny should be added"));

        let mut args = StatusArgs {
            db_path: "unused.db".into(),
            state: Some("Nevada".to_string()),
            year: Some("2024".to_string()),
            since: None,
            json: false,
        };
        let (filter, rows) = list(&store, &args).expect("state filter should apply");
        assert_eq!(filter, "state=Nevada");
        assert!(rows.is_empty());

        args.state = None;
        let (filter, rows) = list(&store, &args).expect("year filter should apply");
        assert_eq!(filter, "year=2024");
        assert_eq!(rows.len(), 1);

        args.year = None;
        args.since = Some("2000-01-01T00:00:00Z".to_string());
        let (_, rows) = list(&store, &args).expect("since filter should apply");
        assert_eq!(rows[0].name, "Castle");

        args.since = None;
        assert!(list(&store, &args).is_none());
    }
}
