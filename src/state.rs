use customer_dashboard::config::DashboardConfig;
use customer_dashboard::data::filter::{self, FilterSelection};
use customer_dashboard::data::model::{CellValue, Dataset, FilterColumn};
use customer_dashboard::pipeline::{self, DashboardReport, RenderSurface};

use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Report cache – the surface the pipeline presents to
// ---------------------------------------------------------------------------

/// Holds the latest report between frames; egui redraws from it every frame.
#[derive(Debug, Default)]
pub struct ReportCache {
    pub report: Option<DashboardReport>,
}

impl RenderSurface for ReportCache {
    fn present(&mut self, report: &DashboardReport) {
        self.report = Some(report.clone());
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded dataset (None until user loads a file).
    pub dataset: Option<Dataset>,

    /// Per-column filter selections.
    pub selection: FilterSelection,

    /// Latest pipeline output.
    pub view: ReportCache,

    /// Colours for genders in grouped charts.
    pub gender_colors: Option<ColorMap>,

    /// Colours for product categories.
    pub category_colors: Option<ColorMap>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            dataset: None,
            selection: FilterSelection::default(),
            view: ReportCache::default(),
            gender_colors: None,
            category_colors: None,
            status_message: None,
        }
    }

    /// Ingest a newly loaded dataset, select everything and rebuild the report.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.selection = filter::init_selection(&dataset);
        self.gender_colors = Some(ColorMap::new(dataset.categories(FilterColumn::Gender)));
        self.category_colors = Some(ColorMap::new(
            dataset.categories(FilterColumn::ProductCategory),
        ));

        self.dataset = Some(dataset);
        self.status_message = None;
        self.refilter();
    }

    /// Rerun the pipeline after a filter change.
    pub fn refilter(&mut self) {
        if let Some(ds) = &self.dataset {
            pipeline::refresh(ds, &self.selection, &self.config, &mut self.view);
        }
    }

    pub fn report(&self) -> Option<&DashboardReport> {
        self.view.report.as_ref()
    }

    /// Toggle a single value in a column's filter.
    pub fn toggle_filter_value(&mut self, column: FilterColumn, value: &CellValue) {
        filter::toggle(&mut self.selection, column, value);
        self.refilter();
    }

    /// Select all values in a column.
    pub fn select_all(&mut self, column: FilterColumn) {
        if let Some(ds) = &self.dataset {
            filter::select_all(&mut self.selection, ds, column);
            self.refilter();
        }
    }

    /// Deselect all values in a column.
    pub fn select_none(&mut self, column: FilterColumn) {
        filter::select_none(&mut self.selection, column);
        self.refilter();
    }

    pub fn is_selected(&self, column: FilterColumn, value: &CellValue) -> bool {
        self.selection
            .get(&column)
            .is_some_and(|selected| selected.contains(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use customer_dashboard::data::loader::read_csv;

    fn state() -> AppState {
        let ds = read_csv(csv::Reader::from_reader(
            "City,Gender,Product_Category,Age,Purchase_Amount\nA,M,X,30,10\nB,F,Y,25,20\n".as_bytes(),
        ))
        .unwrap();
        let mut state = AppState::new(DashboardConfig::default());
        state.set_dataset(ds);
        state
    }

    #[test]
    fn loading_builds_a_full_report() {
        let state = state();
        assert_eq!(state.report().map(|r| r.visible_rows), Some(2));
    }

    #[test]
    fn filter_changes_refresh_the_report() {
        let mut state = state();
        state.toggle_filter_value(FilterColumn::City, &"A".into());
        assert!(!state.is_selected(FilterColumn::City, &"A".into()));
        assert_eq!(state.report().map(|r| r.visible_rows), Some(1));

        state.select_none(FilterColumn::Gender);
        assert!(state.report().is_some_and(DashboardReport::is_empty));

        state.select_all(FilterColumn::Gender);
        assert_eq!(state.report().map(|r| r.visible_rows), Some(1));
    }
}
