// Series aligner - joins per-parameter series into chart rows by date
use crate::domain::trend::{MergedChartRow, TrendResultSet};
use std::collections::{BTreeMap, HashMap};

/// Merge every series in `results` into one row per sample key.
///
/// A sample key is `(date, occurrence)`: the backend emits one sample per
/// batch and several batches can share a manufacturing day, so the n-th
/// sample of a date in one series lines up with the n-th sample of that date
/// in another. Series on a shared grid align exactly; gaps become `None`
/// instead of shifting later values. Rows are ordered by date, then
/// occurrence. Columns follow the order of `results`.
pub fn align(results: &TrendResultSet) -> Vec<MergedChartRow> {
    let columns = results.len();
    let mut rows: BTreeMap<(&str, usize), Vec<Option<f64>>> = BTreeMap::new();

    for (column, (_, series)) in results.iter().enumerate() {
        if !series.is_ok() {
            continue;
        }

        let mut occurrences: HashMap<&str, usize> = HashMap::new();
        for (date, value) in series.samples() {
            let occurrence = occurrences.entry(date).or_insert(0);
            let row = rows
                .entry((date, *occurrence))
                .or_insert_with(|| vec![None; columns]);
            row[column] = Some(value);
            *occurrence += 1;
        }
    }

    rows.into_iter()
        .map(|((date, _), values)| MergedChartRow {
            date: date.to_string(),
            values,
        })
        .collect()
}
