//! Text report.
//!
//! Renders an `Analysis` in fixed order: data source, top singles,
//! parlays, notes. Prices print in signed American form, probabilities as
//! percentages with one decimal.

use std::fmt::Write;

use crate::strategy::edge::EdgeConfig;
use crate::strategy::odds::{format_american, format_signed};
use crate::types::{Analysis, Parlay, PricedOffer};

const COLUMNS: [&str; 11] = [
    "Player",
    "Team",
    "Market",
    "Pick",
    "Line",
    "Book",
    "Price",
    "Fair%",
    "Book%",
    "EV%",
    "Kickoff (UTC)",
];

fn opt(v: Option<&str>) -> String {
    v.unwrap_or("-").to_string()
}

fn pct(p: Option<f64>) -> String {
    p.map(|p| format!("{:.1}", p * 100.0)).unwrap_or_else(|| "-".to_string())
}

fn row(o: &PricedOffer) -> [String; 11] {
    [
        o.offer.player.clone(),
        opt(o.offer.team.as_deref()),
        o.offer.market.clone(),
        o.offer.selection.clone(),
        o.offer.line.to_string(),
        o.offer.book.clone(),
        format_american(&o.offer.price),
        pct(o.fair_prob),
        pct(o.book_prob),
        o.ev_pct.map(|e| format!("{e:.1}")).unwrap_or_else(|| "-".to_string()),
        opt(o.offer.kickoff_utc.as_deref()),
    ]
}

/// Right-aligned table, each column as wide as its widest cell.
pub fn render_table(offers: &[PricedOffer]) -> String {
    let rows: Vec<[String; 11]> = offers.iter().map(row).collect();
    let mut widths: Vec<usize> = COLUMNS.iter().map(|c| c.chars().count()).collect();
    for r in &rows {
        for (w, cell) in widths.iter_mut().zip(r.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = pad_line(COLUMNS.iter().copied(), &widths);
    for r in &rows {
        out.push('\n');
        out.push_str(&pad_line(r.iter().map(String::as_str), &widths));
    }
    out
}

fn pad_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(c, &w)| format!("{c:>w$}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn parlay_label(i: usize) -> String {
    match u8::try_from(i).ok().filter(|&n| n < 26) {
        Some(n) => format!("3{}", (b'A' + n) as char),
        None => format!("3.{}", i + 1),
    }
}

fn parlay_heading(i: usize, parlay: &Parlay) -> String {
    if parlay.is_short() {
        format!(
            "{}) PARLAY ({} of {} legs)",
            parlay_label(i),
            parlay.legs.len(),
            parlay.target_legs
        )
    } else {
        format!("{}) PARLAY ({} legs)", parlay_label(i), parlay.target_legs)
    }
}

/// Render the full report.
pub fn render(analysis: &Analysis, edge: &EdgeConfig) -> String {
    let mut out = String::new();
    let s = &analysis.summary;
    let sel = &analysis.selection;

    // `write!` into a String cannot fail
    let _ = writeln!(out, "1) DATA SOURCE");
    let _ = writeln!(out, "   URL: {}", s.locator);
    let _ = writeln!(
        out,
        "   Rows loaded: {}   Rows used: {}   ROW_LIMIT: {}   SHA256*: {}",
        s.rows_loaded, s.rows_used, s.row_limit, s.fingerprint
    );
    let _ = writeln!(out, "   *hash of loaded rows only");
    let _ = writeln!(out);

    let band = format!(
        "{}..{}",
        format_signed(edge.band_min as i64),
        format_signed(edge.band_max as i64)
    );
    if sel.singles.is_empty() {
        let _ = writeln!(out, "2) TOP SINGLES — None (band/EV filters too strict)");
    } else {
        let _ = writeln!(out, "2) TOP SINGLES (EV≥{}%, {band})", edge.singles_min_edge);
        let _ = writeln!(out, "{}", render_table(&sel.singles));
    }

    for (i, parlay) in sel.parlays.iter().enumerate() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", parlay_heading(i, parlay));
        let _ = writeln!(out, "{}", render_table(&parlay.legs));
        let prob = parlay
            .win_prob
            .map(|p| format!("{:.1}%", p * 100.0))
            .unwrap_or_else(|| "n/a".to_string());
        let odds = parlay
            .american_odds
            .map(format_signed)
            .unwrap_or_else(|| "n/a".to_string());
        let _ = writeln!(out, "   → Win prob ~ {prob}   US odds ≈ {odds}");
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "4) NOTES");
    let _ = writeln!(out, "   • EV uses cross-book median (vig-light).");
    let _ = writeln!(
        out,
        "   • No-same-game rule used in example parlays to reduce correlation."
    );
    let _ = writeln!(
        out,
        "   • Parlay win prob is the product of each leg's own book probability."
    );
    let _ = writeln!(
        out,
        "   • Timestamp (UTC): {}",
        analysis.generated_at.format("%Y-%m-%d %H:%M:%S")
    );
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FeedSummary, Line, Offer, Selection};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn make_priced(player: &str, price: &str, ev: Option<f64>) -> PricedOffer {
        PricedOffer {
            offer: Offer {
                game_id: Some("g1".into()),
                week: Some("2".into()),
                player: player.into(),
                team: Some("SF".into()),
                market: "rec_yds".into(),
                selection: "Over".into(),
                line: Line::Number(dec!(72.5)),
                price: price.into(),
                book: "FD".into(),
                kickoff_utc: Some("2025-09-14T20:05:00Z".into()),
            },
            book_prob: Some(0.4878),
            fair_prob: Some(0.5122),
            ev_pct: ev,
            in_band: true,
        }
    }

    fn make_analysis(selection: Selection) -> Analysis {
        Analysis {
            summary: FeedSummary {
                locator: "https://example.com/props.csv".into(),
                rows_loaded: 12,
                rows_used: 10,
                row_limit: 5000,
                fingerprint: "0123456789abcdef".into(),
            },
            selection,
            generated_at: Utc.with_ymd_and_hms(2025, 9, 14, 12, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_empty_report_says_none() {
        let text = render(&make_analysis(Selection::default()), &EdgeConfig::default());
        assert!(text.starts_with("1) DATA SOURCE\n"));
        assert!(text.contains("URL: https://example.com/props.csv"));
        assert!(text.contains("Rows loaded: 12   Rows used: 10   ROW_LIMIT: 5000   SHA256*: 0123456789abcdef"));
        assert!(text.contains("2) TOP SINGLES — None (band/EV filters too strict)"));
        assert!(!text.contains("PARLAY"));
        assert!(text.contains("Timestamp (UTC): 2025-09-14 12:30:00"));
    }

    #[test]
    fn test_sections_in_fixed_order() {
        let parlay = Parlay {
            target_legs: 3,
            skip: 0,
            legs: vec![make_priced("B. Aiyuk", "+105", Some(2.4))],
            win_prob: Some(0.4878),
            american_odds: Some(105),
        };
        let selection = Selection {
            propositions: 1,
            pool_size: 1,
            singles: vec![make_priced("B. Aiyuk", "+105", Some(2.44))],
            parlays: vec![parlay],
        };
        let text = render(&make_analysis(selection), &EdgeConfig::default());

        let data = text.find("1) DATA SOURCE").unwrap();
        let singles = text.find("2) TOP SINGLES (EV≥2%, -115..+200)").unwrap();
        let parlay = text.find("3A) PARLAY (1 of 3 legs)").unwrap();
        let notes = text.find("4) NOTES").unwrap();
        assert!(data < singles && singles < parlay && parlay < notes);
        assert!(text.contains("→ Win prob ~ 48.8%   US odds ≈ +105"));
    }

    #[test]
    fn test_table_formats_cells() {
        let table = render_table(&[make_priced("B. Aiyuk", "105", Some(2.439))]);
        let mut lines = table.lines();
        let header = lines.next().unwrap();
        assert!(header.trim_start().starts_with("Player"));
        assert!(header.ends_with("Kickoff (UTC)"));
        let body = lines.next().unwrap();
        for cell in ["B. Aiyuk", "SF", "72.5", "FD", "+105", "51.2", "48.8", "2.4"] {
            assert!(body.contains(cell), "missing {cell} in {body}");
        }
        assert_eq!(header.chars().count(), body.chars().count());
    }

    #[test]
    fn test_undefined_values_render_as_dash() {
        let mut o = make_priced("X", "OTB", None);
        o.book_prob = None;
        o.fair_prob = None;
        o.offer.team = None;
        let table = render_table(&[o]);
        let body = table.lines().nth(1).unwrap();
        assert!(body.contains("OTB"));
        assert!(body.split_whitespace().filter(|c| *c == "-").count() >= 4);
    }

    #[test]
    fn test_parlay_labels() {
        assert_eq!(parlay_label(0), "3A");
        assert_eq!(parlay_label(1), "3B");
        assert_eq!(parlay_label(26), "3.27");
    }
}
