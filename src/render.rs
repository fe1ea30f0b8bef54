use analytics::{color_for, histogram, rgb};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use core_types::{AlignedRow, HistogramBucket, MonteCarloRecord, NamedSeries, ValidatedResult};
use serde::Serialize;

const BAR_WIDTH: usize = 40;

fn series_color(index: usize) -> Color {
    match rgb(color_for(index)) {
        Some((r, g, b)) => Color::Rgb { r, g, b },
        None => Color::Reset,
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// One row per result with its summary card values.
pub fn cards_table(results: &[ValidatedResult]) -> Table {
    let mut table = new_table();
    let Some(first) = results.first() else {
        return table;
    };

    let mut header = vec![Cell::new("Series").add_attribute(Attribute::Bold)];
    header.extend(
        first
            .card()
            .into_iter()
            .map(|(caption, _)| Cell::new(caption).add_attribute(Attribute::Bold)),
    );
    table.set_header(header);

    for (index, result) in results.iter().enumerate() {
        let mut row = vec![Cell::new(result.label()).fg(series_color(index))];
        row.extend(
            result
                .card()
                .into_iter()
                .map(|(_, value)| Cell::new(value).set_alignment(CellAlignment::Right)),
        );
        table.add_row(row);
    }
    table
}

/// The aligned series, one column per series in palette colour. Gaps show as `-`.
pub fn aligned_table(series: &[NamedSeries], rows: &[AlignedRow], precision: usize) -> Table {
    let mut table = new_table();

    let mut header = vec![Cell::new("Date").add_attribute(Attribute::Bold)];
    header.extend(
        series
            .iter()
            .enumerate()
            .map(|(index, s)| Cell::new(&s.name).fg(series_color(index))),
    );
    table.set_header(header);

    for row in rows {
        let mut cells = vec![Cell::new(&row.date)];
        cells.extend(row.values.iter().map(|(_, value)| {
            let text = match value {
                Some(v) => format!("{v:.precision$}"),
                None => "-".to_string(),
            };
            Cell::new(text).set_alignment(CellAlignment::Right)
        }));
        table.add_row(cells);
    }
    table
}

/// Text bar proportional to `frequency / max`.
fn bar(frequency: usize, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    "█".repeat(frequency * BAR_WIDTH / max)
}

fn contains(bucket: &HistogramBucket, value: f64) -> bool {
    bucket.lower <= value && value <= bucket.upper
}

pub fn histogram_table(view: &DistributionView) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Range", "Count", "", ""]);

    let max = view.buckets.iter().map(|b| b.frequency).max().unwrap_or(0);
    let color = series_color(view.index);
    // Mark only the first matching bucket when the target sits on an edge.
    let target_bucket = view
        .target_price
        .and_then(|target| view.buckets.iter().position(|b| contains(b, target)));

    for (position, bucket) in view.buckets.iter().enumerate() {
        let marker = if Some(position) == target_bucket {
            "◀ target"
        } else {
            ""
        };
        table.add_row(vec![
            Cell::new(&bucket.label),
            Cell::new(bucket.frequency).set_alignment(CellAlignment::Right),
            Cell::new(bar(bucket.frequency, max)).fg(color),
            Cell::new(marker),
        ]);
    }
    table
}

/// Symbols split into base and quote, e.g. `BTC/USDT` into `BTC` and `USDT`.
pub fn tickers_table(tickers: &[String]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Symbol", "Base", "Quote"]);
    for ticker in tickers {
        let (base, quote) = ticker.split_once('/').unwrap_or((ticker.as_str(), ""));
        table.add_row(vec![ticker.as_str(), base, quote]);
    }
    table
}

#[derive(Serialize)]
pub struct SeriesMeta<'a> {
    pub name: &'a str,
    pub color: &'static str,
}

/// Machine-readable form of an aligned series view.
#[derive(Serialize)]
pub struct SeriesView<'a> {
    pub series: Vec<SeriesMeta<'a>>,
    pub results: &'a [ValidatedResult],
    pub rows: &'a [AlignedRow],
}

impl<'a> SeriesView<'a> {
    pub fn new(
        results: &'a [ValidatedResult],
        series: &'a [NamedSeries],
        rows: &'a [AlignedRow],
    ) -> Self {
        let series = series
            .iter()
            .enumerate()
            .map(|(index, s)| SeriesMeta {
                name: &s.name,
                color: color_for(index),
            })
            .collect();
        Self {
            series,
            results,
            rows,
        }
    }
}

/// The binned final-price distribution of one Monte-Carlo result.
#[derive(Debug, Serialize)]
pub struct DistributionView {
    #[serde(skip)]
    index: usize,
    pub symbol: String,
    pub color: &'static str,
    pub predicted_price: f64,
    pub target_price: Option<f64>,
    pub likely: bool,
    pub buckets: Vec<HistogramBucket>,
}

impl DistributionView {
    pub fn new(
        index: usize,
        record: &MonteCarloRecord,
        target_return: f64,
        bucket_count: usize,
        label_precision: usize,
    ) -> Self {
        Self {
            index,
            symbol: record.symbol.clone(),
            color: color_for(index),
            predicted_price: record.result.predicted_price,
            target_price: record.result.target_price(target_return),
            likely: record.result.is_likely(),
            buckets: histogram(&record.result.final_prices, bucket_count, label_precision),
        }
    }

    pub fn title(&self) -> String {
        match self.target_price {
            Some(target) => format!(
                "{}: final price distribution (target ${:.2})",
                self.symbol, target
            ),
            None => format!("{}: final price distribution", self.symbol),
        }
    }
}
