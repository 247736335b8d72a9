//! Aggregation builder: pure summaries over a [`FilteredView`].
//!
//! Every entry point checks for an empty view first and returns
//! [`AggregateResult::NoData`] instead of running statistics on zero rows.
//!
//! Top/bottom picks are deterministic: the extreme count wins, and among
//! equal counts the smallest key (by [`CellValue`] ordering) wins.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::data::filter::FilteredView;
use crate::data::model::{CellValue, FilterColumn, Record};

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Outcome of one aggregate: either a table or the explicit "no data" sentinel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateResult<T> {
    NoData,
    Ready(T),
}

impl<T> AggregateResult<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            AggregateResult::Ready(t) => Some(t),
            AggregateResult::NoData => None,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, AggregateResult::NoData)
    }
}

/// Run `f` unless the view is empty.
fn guarded<T>(view: &FilteredView<'_>, f: impl FnOnce() -> T) -> AggregateResult<T> {
    if view.is_empty() {
        AggregateResult::NoData
    } else {
        AggregateResult::Ready(f())
    }
}

/// Total purchase amount of one product category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: CellValue,
    pub total: f64,
}

/// One metric tile: a category, its filtered total and the formatted figure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scorecard {
    pub category: CellValue,
    pub total: f64,
    pub display: String,
}

/// Row count of a (group, key) pair, e.g. (Gender, Product_Category).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCount {
    pub group: CellValue,
    pub key: CellValue,
    pub count: usize,
}

/// Equal-width purchase-amount bins with an optional density curve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    /// `counts.len() + 1` bin edges, ascending.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
    /// Kernel density estimate scaled to counts, as `[x, y]` points.
    pub density: Option<Vec<[f64; 2]>>,
}

impl Histogram {
    pub fn bin_width(&self) -> f64 {
        match (self.edges.first(), self.edges.last()) {
            (Some(lo), Some(hi)) if !self.counts.is_empty() => (hi - lo) / self.counts.len() as f64,
            _ => 0.0,
        }
    }
}

/// Pairwise Pearson correlation between numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major; `None` where the coefficient is undefined.
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: &str, col: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == row)?;
        let j = self.columns.iter().position(|c| c == col)?;
        self.values[i][j]
    }
}

// ---------------------------------------------------------------------------
// Sums
// ---------------------------------------------------------------------------

fn sum_by_category(view: &FilteredView<'_>) -> BTreeMap<CellValue, f64> {
    let mut totals: BTreeMap<CellValue, f64> = BTreeMap::new();
    for rec in view.records() {
        *totals.entry(rec.product_category.clone()).or_default() += rec.purchase_amount;
    }
    totals
}

/// Product_Category → total Purchase_Amount, ordered by category.
pub fn category_totals(view: &FilteredView<'_>) -> AggregateResult<Vec<CategoryTotal>> {
    guarded(view, || {
        sum_by_category(view)
            .into_iter()
            .map(|(category, total)| CategoryTotal { category, total })
            .collect()
    })
}

/// Category totals, largest first; equal totals by category ascending.
pub fn ranked_category_totals(view: &FilteredView<'_>) -> AggregateResult<Vec<CategoryTotal>> {
    match category_totals(view) {
        AggregateResult::Ready(mut totals) => {
            // Stable sort on the already key-ordered list keeps ties ascending.
            totals.sort_by(|a, b| b.total.total_cmp(&a.total));
            AggregateResult::Ready(totals)
        }
        AggregateResult::NoData => AggregateResult::NoData,
    }
}

/// One scorecard per product category of the whole dataset, in first-seen
/// order. Categories filtered out of the view show a zero total.
pub fn scorecards(view: &FilteredView<'_>) -> AggregateResult<Vec<Scorecard>> {
    guarded(view, || {
        let totals = sum_by_category(view);
        view.dataset()
            .categories(FilterColumn::ProductCategory)
            .iter()
            .map(|category| {
                let total = totals.get(category).copied().unwrap_or(0.0);
                Scorecard {
                    category: category.clone(),
                    total,
                    display: format_amount(total),
                }
            })
            .collect()
    })
}

/// Format with two decimals and comma thousands separators: `1,234,567.89`.
pub fn format_amount(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let negative = value < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0');
    let sign = if negative { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

// ---------------------------------------------------------------------------
// Counts and per-group picks
// ---------------------------------------------------------------------------

fn pair_counts<G, K>(view: &FilteredView<'_>, group: G, key: K) -> BTreeMap<(CellValue, CellValue), usize>
where
    G: Fn(&Record) -> &CellValue,
    K: Fn(&Record) -> &CellValue,
{
    let mut counts = BTreeMap::new();
    for rec in view.records() {
        *counts
            .entry((group(rec).clone(), key(rec).clone()))
            .or_default() += 1;
    }
    counts
}

fn into_group_counts(counts: BTreeMap<(CellValue, CellValue), usize>) -> Vec<GroupCount> {
    counts
        .into_iter()
        .map(|((group, key), count)| GroupCount { group, key, count })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extreme {
    Max,
    Min,
}

/// Pick one key per group. Counts arrive ordered by (group, key), so keeping
/// the first strictly-better entry resolves ties to the smallest key.
fn pick_per_group(counts: &BTreeMap<(CellValue, CellValue), usize>, extreme: Extreme) -> Vec<GroupCount> {
    let mut picks: BTreeMap<&CellValue, (&CellValue, usize)> = BTreeMap::new();
    for ((group, key), &count) in counts {
        picks
            .entry(group)
            .and_modify(|best| {
                let better = match extreme {
                    Extreme::Max => count > best.1,
                    Extreme::Min => count < best.1,
                };
                if better {
                    *best = (key, count);
                }
            })
            .or_insert((key, count));
    }
    picks
        .into_iter()
        .map(|(group, (key, count))| GroupCount {
            group: group.clone(),
            key: key.clone(),
            count,
        })
        .collect()
}

fn gender_category(view: &FilteredView<'_>) -> BTreeMap<(CellValue, CellValue), usize> {
    pair_counts(view, |r| &r.gender, |r| &r.product_category)
}

fn city_category(view: &FilteredView<'_>) -> BTreeMap<(CellValue, CellValue), usize> {
    pair_counts(view, |r| &r.city, |r| &r.product_category)
}

/// (Gender, Product_Category) → row count.
pub fn group_counts(view: &FilteredView<'_>) -> AggregateResult<Vec<GroupCount>> {
    guarded(view, || into_group_counts(gender_category(view)))
}

/// Per gender, the product category bought most often.
pub fn top_category_per_gender(view: &FilteredView<'_>) -> AggregateResult<Vec<GroupCount>> {
    guarded(view, || pick_per_group(&gender_category(view), Extreme::Max))
}

/// Per gender, the age with the most purchases.
pub fn top_age_per_gender(view: &FilteredView<'_>) -> AggregateResult<Vec<GroupCount>> {
    guarded(view, || {
        pick_per_group(&pair_counts(view, |r| &r.gender, |r| &r.age), Extreme::Max)
    })
}

/// Per city, the product category bought most often.
pub fn top_category_per_city(view: &FilteredView<'_>) -> AggregateResult<Vec<GroupCount>> {
    guarded(view, || pick_per_group(&city_category(view), Extreme::Max))
}

/// Per city, the product category bought least often (among those bought at all).
pub fn least_category_per_city(view: &FilteredView<'_>) -> AggregateResult<Vec<GroupCount>> {
    guarded(view, || pick_per_group(&city_category(view), Extreme::Min))
}

// ---------------------------------------------------------------------------
// Distribution
// ---------------------------------------------------------------------------

/// Purchase_Amount histogram over `[min, max]` in `bins` equal bins; the last
/// bin is closed. A constant column is spread over `[v - 0.5, v + 0.5]`.
pub fn purchase_histogram(
    view: &FilteredView<'_>,
    bins: usize,
    density_points: usize,
) -> AggregateResult<Histogram> {
    guarded(view, || {
        let amounts: Vec<f64> = view.records().map(|r| r.purchase_amount).collect();
        let bins = bins.max(1);

        let min = amounts.iter().copied().fold(f64::INFINITY, f64::min);
        let max = amounts.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let (lo, hi) = if max > min { (min, max) } else { (min - 0.5, max + 0.5) };
        let width = (hi - lo) / bins as f64;

        let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
        let mut counts = vec![0usize; bins];
        for &v in &amounts {
            let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
            counts[idx] += 1;
        }

        let density = density_curve(&amounts, min, max, width, density_points);
        Histogram {
            edges,
            counts,
            density,
        }
    })
}

/// Gaussian KDE with Scott's bandwidth, scaled by `n * bin_width` so it
/// overlays the bar heights. Undefined below two points or at zero spread.
fn density_curve(values: &[f64], lo: f64, hi: f64, bin_width: f64, points: usize) -> Option<Vec<[f64; 2]>> {
    let n = values.len();
    if n < 2 || points < 2 {
        return None;
    }
    let nf = n as f64;
    let mean = values.iter().sum::<f64>() / nf;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (nf - 1.0);
    let std = var.sqrt();
    if !(std > 0.0) {
        return None;
    }

    let bandwidth = std * nf.powf(-0.2);
    let norm = 1.0 / (nf * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
    let step = (hi - lo) / (points - 1) as f64;

    let curve = (0..points)
        .map(|k| {
            let x = lo + step * k as f64;
            let density: f64 = values
                .iter()
                .map(|&xi| (-0.5 * ((x - xi) / bandwidth).powi(2)).exp())
                .sum::<f64>()
                * norm;
            [x, density * nf * bin_width]
        })
        .collect();
    Some(curve)
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Pearson correlation between every pair of numeric columns, using the rows
/// where both sides are present. Needs at least two rows in the view.
pub fn correlation_matrix(view: &FilteredView<'_>) -> AggregateResult<CorrelationMatrix> {
    if view.len() < 2 {
        return AggregateResult::NoData;
    }

    let columns = view.dataset().numeric_columns.clone();
    let data: Vec<Vec<Option<f64>>> = columns
        .iter()
        .map(|col| view.records().map(|r| r.numeric(col)).collect())
        .collect();

    let values = (0..columns.len())
        .map(|i| {
            (0..columns.len())
                .map(|j| pearson(&data[i], &data[j]))
                .collect()
        })
        .collect();

    AggregateResult::Ready(CorrelationMatrix { columns, values })
}

fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for &(x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{apply, init_selection, select_none};
    use crate::data::model::{Dataset, REQUIRED_COLUMNS};
    use std::collections::BTreeSet;

    fn dataset(rows: &[(&str, &str, &str, i64, f64)]) -> Dataset {
        let records = rows
            .iter()
            .map(|&(city, gender, cat, age, amt)| Record {
                city: city.into(),
                gender: gender.into(),
                product_category: cat.into(),
                age: age.into(),
                purchase_amount: amt,
                extra: BTreeMap::new(),
            })
            .collect();
        Dataset::from_records(
            REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            records,
        )
    }

    fn worked_example() -> Dataset {
        dataset(&[
            ("A", "M", "X", 30, 10.0),
            ("A", "M", "Y", 30, 5.0),
            ("B", "F", "X", 25, 20.0),
        ])
    }

    fn count(group: &str, key: impl Into<CellValue>, count: usize) -> GroupCount {
        GroupCount {
            group: group.into(),
            key: key.into(),
            count,
        }
    }

    #[test]
    fn worked_example_totals_and_counts() {
        let ds = worked_example();
        let view = FilteredView::all(&ds);

        let totals = category_totals(&view);
        assert_eq!(
            totals.ready().unwrap(),
            &vec![
                CategoryTotal { category: "X".into(), total: 30.0 },
                CategoryTotal { category: "Y".into(), total: 5.0 },
            ]
        );

        let counts = group_counts(&view);
        assert_eq!(
            counts.ready().unwrap(),
            &vec![count("F", "X", 1), count("M", "X", 1), count("M", "Y", 1)]
        );
    }

    #[test]
    fn tie_resolves_to_smallest_category() {
        let ds = worked_example();
        let view = FilteredView::all(&ds);
        let top = top_category_per_gender(&view);
        assert_eq!(
            top.ready().unwrap(),
            &vec![count("F", "X", 1), count("M", "X", 1)]
        );
    }

    #[test]
    fn top_age_prefers_count_then_smaller_age() {
        let ds = dataset(&[
            ("A", "F", "X", 41, 1.0),
            ("A", "F", "X", 29, 1.0),
            ("A", "F", "X", 41, 1.0),
            ("A", "M", "X", 50, 1.0),
            ("A", "M", "X", 9, 1.0),
        ]);
        let view = FilteredView::all(&ds);
        assert_eq!(
            top_age_per_gender(&view).ready().unwrap(),
            &vec![count("F", 41i64, 2), count("M", 9i64, 1)]
        );
    }

    #[test]
    fn top_and_least_category_per_city() {
        let ds = dataset(&[
            ("A", "F", "Books", 20, 1.0),
            ("A", "F", "Books", 20, 1.0),
            ("A", "F", "Toys", 20, 1.0),
            ("A", "F", "Games", 20, 1.0),
            ("B", "M", "Toys", 20, 1.0),
        ]);
        let view = FilteredView::all(&ds);
        assert_eq!(
            top_category_per_city(&view).ready().unwrap(),
            &vec![count("A", "Books", 2), count("B", "Toys", 1)]
        );
        assert_eq!(
            least_category_per_city(&view).ready().unwrap(),
            &vec![count("A", "Games", 1), count("B", "Toys", 1)]
        );
    }

    #[test]
    fn ranked_totals_descend_with_ties_by_name() {
        let ds = dataset(&[
            ("A", "F", "Toys", 20, 5.0),
            ("A", "F", "Books", 20, 5.0),
            ("A", "F", "Games", 20, 9.0),
        ]);
        let view = FilteredView::all(&ds);
        let ranked: Vec<String> = ranked_category_totals(&view)
            .ready()
            .unwrap()
            .iter()
            .map(|t| t.category.to_string())
            .collect();
        assert_eq!(ranked, vec!["Games", "Books", "Toys"]);
    }

    #[test]
    fn scorecards_cover_every_dataset_category() {
        let ds = dataset(&[
            ("A", "F", "Toys", 20, 1234.5),
            ("B", "M", "Books", 20, 7.0),
        ]);
        let mut sel = init_selection(&ds);
        sel.insert(FilterColumn::City, BTreeSet::from([CellValue::from("A")]));
        let view = apply(&ds, &sel);

        let cards = scorecards(&view);
        let cards = cards.ready().unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].category, CellValue::from("Toys"));
        assert_eq!(cards[0].display, "1,234.50");
        assert_eq!(cards[1].display, "0.00");
    }

    #[test]
    fn null_keys_form_their_own_group() {
        let mut ds = worked_example();
        ds.records[2].gender = CellValue::Null;
        ds.records[1].product_category = CellValue::Null;
        let ds = Dataset::from_records(ds.columns.clone(), ds.records);
        let view = FilteredView::all(&ds);

        let totals = category_totals(&view);
        let totals = totals.ready().unwrap();
        assert_eq!(totals[0].category, CellValue::Null);
        assert_eq!(totals[0].total, 5.0);
        assert_eq!(totals.iter().map(|t| t.total).sum::<f64>(), 35.0);

        let counts = group_counts(&view);
        assert_eq!(
            counts.ready().unwrap(),
            &vec![
                GroupCount { group: CellValue::Null, key: "X".into(), count: 1 },
                GroupCount { group: "M".into(), key: CellValue::Null, count: 1 },
                count("M", "X", 1),
            ]
        );
    }

    #[test]
    fn amounts_format_with_separators() {
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(999.999), "1,000.00");
        assert_eq!(format_amount(1234567.891), "1,234,567.89");
        assert_eq!(format_amount(-12345.6), "-12,345.60");
        assert_eq!(format_amount(-0.001), "0.00");
    }

    #[test]
    fn empty_view_yields_no_data_everywhere() {
        let ds = worked_example();
        let mut sel = init_selection(&ds);
        select_none(&mut sel, FilterColumn::City);
        let view = apply(&ds, &sel);

        assert!(category_totals(&view).is_no_data());
        assert!(scorecards(&view).is_no_data());
        assert!(group_counts(&view).is_no_data());
        assert!(top_category_per_gender(&view).is_no_data());
        assert!(ranked_category_totals(&view).is_no_data());
        assert!(top_age_per_gender(&view).is_no_data());
        assert!(top_category_per_city(&view).is_no_data());
        assert!(least_category_per_city(&view).is_no_data());
        assert!(correlation_matrix(&view).is_no_data());
        assert!(purchase_histogram(&view, 20, 200).is_no_data());
    }

    #[test]
    fn single_row_correlation_is_no_data() {
        let ds = dataset(&[("A", "M", "X", 30, 10.0)]);
        let view = FilteredView::all(&ds);
        assert_eq!(correlation_matrix(&view), AggregateResult::NoData);
    }

    #[test]
    fn correlation_of_linear_columns() {
        let ds = dataset(&[
            ("A", "M", "X", 20, 100.0),
            ("A", "M", "X", 30, 150.0),
            ("A", "M", "X", 40, 200.0),
        ]);
        let view = FilteredView::all(&ds);
        let matrix = correlation_matrix(&view);
        let matrix = matrix.ready().unwrap();
        assert_eq!(matrix.columns, vec!["Age", "Purchase_Amount"]);
        assert!((matrix.get("Age", "Purchase_Amount").unwrap() - 1.0).abs() < 1e-12);
        assert!((matrix.get("Age", "Age").unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn constant_column_correlation_is_undefined() {
        let ds = dataset(&[("A", "M", "X", 30, 1.0), ("A", "M", "X", 30, 2.0)]);
        let view = FilteredView::all(&ds);
        let matrix = correlation_matrix(&view);
        let matrix = matrix.ready().unwrap();
        assert_eq!(matrix.get("Age", "Purchase_Amount"), None);
        assert_eq!(matrix.get("Purchase_Amount", "Purchase_Amount"), Some(1.0));
    }

    #[test]
    fn histogram_places_max_in_last_bin() {
        let ds = dataset(&[
            ("A", "M", "X", 30, 0.0),
            ("A", "M", "X", 30, 5.0),
            ("A", "M", "X", 30, 10.0),
        ]);
        let view = FilteredView::all(&ds);
        let hist = purchase_histogram(&view, 2, 50);
        let hist = hist.ready().unwrap();
        assert_eq!(hist.edges, vec![0.0, 5.0, 10.0]);
        assert_eq!(hist.counts, vec![1, 2]);
        assert_eq!(hist.bin_width(), 5.0);
        let density = hist.density.as_ref().unwrap();
        assert_eq!(density.len(), 50);
        assert_eq!(density[0][0], 0.0);
    }

    #[test]
    fn constant_amounts_widen_range_without_density() {
        let ds = dataset(&[("A", "M", "X", 30, 4.0), ("A", "M", "X", 30, 4.0)]);
        let view = FilteredView::all(&ds);
        let hist = purchase_histogram(&view, 4, 200);
        let hist = hist.ready().unwrap();
        assert_eq!(hist.edges.first(), Some(&3.5));
        assert_eq!(hist.edges.last(), Some(&4.5));
        assert_eq!(hist.counts.iter().sum::<usize>(), 2);
        assert!(hist.density.is_none());
    }
}
