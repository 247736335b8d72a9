//! Filter → aggregate, run once per interaction, then handed to a surface.

use serde::Serialize;

use crate::aggregate::{
    self, AggregateResult, CategoryTotal, CorrelationMatrix, GroupCount, Histogram, Scorecard,
};
use crate::config::DashboardConfig;
use crate::data::filter::{self, FilterSelection};
use crate::data::model::Dataset;

/// Every named result shown on the dashboard, for one filter selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub total_rows: usize,
    pub visible_rows: usize,
    pub total_amount: f64,
    pub scorecards: AggregateResult<Vec<Scorecard>>,
    pub category_totals: AggregateResult<Vec<CategoryTotal>>,
    pub purchase_histogram: AggregateResult<Histogram>,
    pub gender_category_counts: AggregateResult<Vec<GroupCount>>,
    pub top_category_per_gender: AggregateResult<Vec<GroupCount>>,
    pub ranked_category_totals: AggregateResult<Vec<CategoryTotal>>,
    pub top_age_per_gender: AggregateResult<Vec<GroupCount>>,
    pub top_category_per_city: AggregateResult<Vec<GroupCount>>,
    pub least_category_per_city: AggregateResult<Vec<GroupCount>>,
    pub correlation: AggregateResult<CorrelationMatrix>,
}

impl DashboardReport {
    /// Names of the aggregate results, in display order.
    pub fn names() -> [&'static str; 10] {
        [
            "scorecards",
            "category_totals",
            "purchase_histogram",
            "gender_category_counts",
            "top_category_per_gender",
            "ranked_category_totals",
            "top_age_per_gender",
            "top_category_per_city",
            "least_category_per_city",
            "correlation",
        ]
    }

    /// Names of the results that came back as [`AggregateResult::NoData`].
    pub fn no_data_sections(&self) -> Vec<&'static str> {
        let empty = [
            self.scorecards.is_no_data(),
            self.category_totals.is_no_data(),
            self.purchase_histogram.is_no_data(),
            self.gender_category_counts.is_no_data(),
            self.top_category_per_gender.is_no_data(),
            self.ranked_category_totals.is_no_data(),
            self.top_age_per_gender.is_no_data(),
            self.top_category_per_city.is_no_data(),
            self.least_category_per_city.is_no_data(),
            self.correlation.is_no_data(),
        ];
        Self::names()
            .into_iter()
            .zip(empty)
            .filter_map(|(name, no_data)| no_data.then_some(name))
            .collect()
    }

    /// Whether the selection left no rows.
    pub fn is_empty(&self) -> bool {
        self.visible_rows == 0
    }
}

/// Anything that can display a finished report.
pub trait RenderSurface {
    fn present(&mut self, report: &DashboardReport);
}

/// Filter `dataset` by `selection` and compute every aggregate.
pub fn build_report(
    dataset: &Dataset,
    selection: &FilterSelection,
    config: &DashboardConfig,
) -> DashboardReport {
    let view = filter::apply(dataset, selection);

    DashboardReport {
        total_rows: dataset.len(),
        visible_rows: view.len(),
        total_amount: view.records().map(|r| r.purchase_amount).sum(),
        scorecards: aggregate::scorecards(&view),
        category_totals: aggregate::category_totals(&view),
        purchase_histogram: aggregate::purchase_histogram(
            &view,
            config.histogram_bins,
            config.density_points,
        ),
        gender_category_counts: aggregate::group_counts(&view),
        top_category_per_gender: aggregate::top_category_per_gender(&view),
        ranked_category_totals: aggregate::ranked_category_totals(&view),
        top_age_per_gender: aggregate::top_age_per_gender(&view),
        top_category_per_city: aggregate::top_category_per_city(&view),
        least_category_per_city: aggregate::least_category_per_city(&view),
        correlation: aggregate::correlation_matrix(&view),
    }
}

/// Build a fresh report and present it, superseding whatever was shown before.
pub fn refresh(
    dataset: &Dataset,
    selection: &FilterSelection,
    config: &DashboardConfig,
    surface: &mut dyn RenderSurface,
) {
    let report = build_report(dataset, selection, config);
    log::debug!(
        "Refreshed dashboard: {}/{} rows visible",
        report.visible_rows,
        report.total_rows
    );
    surface.present(&report);
}

/// A surface that only writes a summary to the log.
#[derive(Debug, Default)]
pub struct LogSurface {
    pub presented: usize,
}

impl RenderSurface for LogSurface {
    fn present(&mut self, report: &DashboardReport) {
        self.presented += 1;
        if report.is_empty() {
            log::info!("No data for the current selection");
            return;
        }
        log::info!(
            "{} of {} rows, total purchases {}",
            report.visible_rows,
            report.total_rows,
            aggregate::format_amount(report.total_amount)
        );
        if let Some(cards) = report.scorecards.ready() {
            for card in cards {
                log::info!("  {}: {}", card.category, card.display);
            }
        }
        let missing = report.no_data_sections();
        if !missing.is_empty() {
            log::info!("  no data: {}", missing.join(", "));
        }
        match serde_json::to_string(report) {
            Ok(json) => log::trace!("{json}"),
            Err(e) => log::warn!("Could not serialise report: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{init_selection, select_none, toggle};
    use crate::data::loader::read_csv;
    use crate::data::model::FilterColumn;

    const CSV: &str = "City,Gender,Product_Category,Age,Purchase_Amount\n\
                       A,M,X,30,10\n\
                       A,M,Y,30,5\n\
                       B,F,X,25,20\n";

    fn dataset() -> Dataset {
        read_csv(csv::Reader::from_reader(CSV.as_bytes())).unwrap()
    }

    #[derive(Default)]
    struct Recording(Vec<DashboardReport>);

    impl RenderSurface for Recording {
        fn present(&mut self, report: &DashboardReport) {
            self.0.push(report.clone());
        }
    }

    #[test]
    fn report_is_idempotent() {
        let ds = dataset();
        let sel = init_selection(&ds);
        let config = DashboardConfig::default();
        assert_eq!(
            build_report(&ds, &sel, &config),
            build_report(&ds, &sel, &config)
        );
    }

    #[test]
    fn refresh_presents_latest_selection() {
        let ds = dataset();
        let config = DashboardConfig::default();
        let mut surface = Recording::default();

        let mut sel = init_selection(&ds);
        refresh(&ds, &sel, &config, &mut surface);
        select_none(&mut sel, FilterColumn::ProductCategory);
        refresh(&ds, &sel, &config, &mut surface);

        assert_eq!(surface.0.len(), 2);
        assert_eq!(surface.0[0].visible_rows, 3);
        assert_eq!(surface.0[0].total_amount, 35.0);
        assert!(surface.0[1].is_empty());
        assert!(surface.0[1].scorecards.is_no_data());
        assert!(surface.0[1].correlation.is_no_data());
    }

    #[test]
    fn log_surface_counts_presentations() {
        let ds = dataset();
        let mut surface = LogSurface::default();
        refresh(&ds, &init_selection(&ds), &DashboardConfig::default(), &mut surface);
        assert_eq!(surface.presented, 1);
    }

    #[test]
    fn report_serialises_no_data_sentinel() {
        let ds = dataset();
        let mut sel = init_selection(&ds);
        select_none(&mut sel, FilterColumn::City);
        let report = build_report(&ds, &sel, &DashboardConfig::default());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["correlation"], "no_data");
        assert_eq!(report.no_data_sections(), DashboardReport::names().to_vec());
    }

    #[test]
    fn single_row_report_lacks_only_correlation() {
        let ds = dataset();
        let mut sel = init_selection(&ds);
        toggle(&mut sel, FilterColumn::City, &"A".into());
        let report = build_report(&ds, &sel, &DashboardConfig::default());
        assert_eq!(report.visible_rows, 1);
        assert_eq!(report.no_data_sections(), vec!["correlation"]);
    }
}
