use std::collections::{BTreeMap, BTreeSet};

use super::model::{CellValue, Dataset, FilterColumn, Record};

// ---------------------------------------------------------------------------
// Filter selection: which values are allowed per column
// ---------------------------------------------------------------------------

/// Per-column selection state: maps column → set of allowed values.
/// An absent column is unconstrained; an empty set matches nothing.
pub type FilterSelection = BTreeMap<FilterColumn, BTreeSet<CellValue>>;

/// Initialise a [`FilterSelection`] with every value selected (i.e., show everything).
pub fn init_selection(dataset: &Dataset) -> FilterSelection {
    dataset
        .unique_values
        .iter()
        .map(|(col, vals)| (*col, vals.clone()))
        .collect()
}

/// Select every value of `column`.
pub fn select_all(selection: &mut FilterSelection, dataset: &Dataset, column: FilterColumn) {
    if let Some(all_vals) = dataset.unique_values.get(&column) {
        selection.insert(column, all_vals.clone());
    }
}

/// Deselect every value of `column`, which hides every row.
pub fn select_none(selection: &mut FilterSelection, column: FilterColumn) {
    selection.insert(column, BTreeSet::new());
}

/// Flip a single value in a column's selection.
pub fn toggle(selection: &mut FilterSelection, column: FilterColumn, value: &CellValue) {
    let selected = selection.entry(column).or_default();
    if !selected.remove(value) {
        selected.insert(value.clone());
    }
}

// ---------------------------------------------------------------------------
// FilteredView
// ---------------------------------------------------------------------------

/// The rows of a dataset that pass a selection. Borrowed, never stored.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// A view over every row.
    pub fn all(dataset: &'a Dataset) -> Self {
        FilteredView {
            dataset,
            indices: (0..dataset.len()).collect(),
        }
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    /// Source indices of the visible rows, ascending.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn records(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let records = &self.dataset.records;
        self.indices.iter().map(move |&i| &records[i])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Return the view of records that pass all active filters.
///
/// A record passes a column filter when:
/// * The column is not present in `selection` → passes (no constraint)
/// * The selected set for that column is empty → nothing selected → fails
/// * The record's value for that column is in the selected set → passes
pub fn apply<'a>(dataset: &'a Dataset, selection: &FilterSelection) -> FilteredView<'a> {
    if selection.values().any(BTreeSet::is_empty) {
        // Nothing selected for some column → hide everything
        return FilteredView {
            dataset,
            indices: Vec::new(),
        };
    }

    // Columns where every known value is selected impose no constraint.
    let active: Vec<(FilterColumn, &BTreeSet<CellValue>)> = selection
        .iter()
        .filter(|(col, selected)| match dataset.unique_values.get(*col) {
            Some(all_vals) => !all_vals.is_subset(selected),
            None => true,
        })
        .map(|(col, selected)| (*col, selected))
        .collect();

    let indices = dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| {
            active
                .iter()
                .all(|(col, selected)| selected.contains(rec.category(*col)))
        })
        .map(|(i, _)| i)
        .collect();

    FilteredView { dataset, indices }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::REQUIRED_COLUMNS;

    fn dataset() -> Dataset {
        let rows = [
            ("A", "M", "X", 30, 10.0),
            ("A", "M", "Y", 30, 5.0),
            ("B", "F", "X", 25, 20.0),
        ];
        let records = rows
            .iter()
            .map(|&(city, gender, cat, age, amt)| Record {
                city: city.into(),
                gender: gender.into(),
                product_category: cat.into(),
                age: CellValue::Integer(age),
                purchase_amount: amt,
                extra: BTreeMap::new(),
            })
            .collect();
        Dataset::from_records(
            REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            records,
        )
    }

    #[test]
    fn full_selection_keeps_every_row() {
        let ds = dataset();
        let view = apply(&ds, &init_selection(&ds));
        assert_eq!(view.indices(), &[0, 1, 2]);
    }

    #[test]
    fn empty_selection_means_no_rows() {
        let ds = dataset();
        let mut sel = init_selection(&ds);
        select_none(&mut sel, FilterColumn::Gender);
        assert!(apply(&ds, &sel).is_empty());
    }

    #[test]
    fn and_across_columns_or_within() {
        let ds = dataset();
        let mut sel = init_selection(&ds);
        toggle(&mut sel, FilterColumn::City, &"B".into());
        let view = apply(&ds, &sel);
        assert_eq!(view.indices(), &[0, 1]);

        toggle(&mut sel, FilterColumn::ProductCategory, &"X".into());
        let view = apply(&ds, &sel);
        assert_eq!(view.indices(), &[1]);
    }

    #[test]
    fn absent_column_is_unconstrained() {
        let ds = dataset();
        let mut sel = FilterSelection::new();
        sel.insert(FilterColumn::Gender, BTreeSet::from(["F".into()]));
        assert_eq!(apply(&ds, &sel).indices(), &[2]);
    }

    #[test]
    fn unknown_values_match_nothing() {
        let ds = dataset();
        let mut sel = FilterSelection::new();
        sel.insert(FilterColumn::City, BTreeSet::from(["Z".into()]));
        assert!(apply(&ds, &sel).is_empty());
    }

    #[test]
    fn select_all_restores_rows() {
        let ds = dataset();
        let mut sel = init_selection(&ds);
        select_none(&mut sel, FilterColumn::City);
        select_all(&mut sel, &ds, FilterColumn::City);
        assert_eq!(apply(&ds, &sel).len(), 3);
    }
}
