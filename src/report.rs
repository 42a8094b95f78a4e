use crate::parse::PriceBuckets;
use crate::types::{Ask, Trade};

const CHART_WIDTH: usize = 40;

/// Prints the ask book as `price:count` lines, ascending by price. The
/// format is deliberately bare so it pastes cleanly into a spreadsheet.
pub fn print_bucket_table(buckets: &PriceBuckets, min_price: i64, max_price: i64) {
    println!("Asks at each round ETH value from {min_price} to {max_price}:");
    for (price, count) in buckets.iter() {
        println!("{price}:{count}");
    }
}

/// Accepted-ask counts per marketplace, ascending by count.
pub fn marketplace_counts(asks: &[Ask]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for ask in asks {
        let name = ask.marketplace.as_str();
        match counts.iter_mut().find(|(n, _)| n == name) {
            Some((_, c)) => *c += 1,
            None => counts.push((name.to_string(), 1)),
        }
    }
    counts.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    counts
}

/// Prints the per-marketplace count mapping ahead of the chart, in the
/// same paste-friendly `name:count` shape as the bucket table.
pub fn print_marketplace_counts(counts: &[(String, usize)]) {
    for line in count_lines(counts) {
        println!("{line}");
    }
}

fn count_lines(counts: &[(String, usize)]) -> Vec<String> {
    counts
        .iter()
        .map(|(name, count)| format!("{name}:{count}"))
        .collect()
}

/// Terminal bar chart of listings per marketplace.
pub fn print_bar_chart(project: &str, counts: &[(String, usize)]) {
    println!("# of Listings for {project} Across Marketplaces");
    let max = counts.iter().map(|(_, c)| *c).max().unwrap_or(0);
    if max == 0 {
        println!("(no listings)");
        return;
    }
    let label_width = counts.iter().map(|(n, _)| n.len()).max().unwrap_or(0);
    for (name, count) in counts {
        let bar_len = (count * CHART_WIDTH).div_ceil(max);
        let bar = "#".repeat(bar_len);
        println!("{name:>label_width$} | {bar:<CHART_WIDTH$} {count}");
    }
}

pub fn print_trades(trades: &[Trade]) {
    for trade in trades {
        println!(
            "Marketplace: {}\n Project: {}\n Currency: {}\n Value: {}\n Timestamp: {}\n",
            trade.marketplace, trade.project_name, trade.currency, trade.price, trade.timestamp
        );
    }
}
