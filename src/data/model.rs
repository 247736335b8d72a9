use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

pub const CITY: &str = "City";
pub const GENDER: &str = "Gender";
pub const PRODUCT_CATEGORY: &str = "Product_Category";
pub const AGE: &str = "Age";
pub const PURCHASE_AMOUNT: &str = "Purchase_Amount";

/// Columns every input table must carry.
pub const REQUIRED_COLUMNS: [&str; 5] = [CITY, GENDER, PRODUCT_CATEGORY, AGE, PURCHASE_AMOUNT];

// ---------------------------------------------------------------------------
// CellValue – a single cell of the source table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common Pandas dtypes.
/// Used as a key in `BTreeMap` / `BTreeSet` downstream, so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn rank(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
            }
        }
        let ra = rank(self);
        let rb = rank(other);
        if ra != rb {
            return ra.cmp(&rb);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

impl CellValue {
    /// Interpret the value as an `f64`. Booleans are not numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// FilterColumn – the categorical columns a user can filter on
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum FilterColumn {
    City,
    Gender,
    ProductCategory,
}

impl FilterColumn {
    pub const ALL: [FilterColumn; 3] = [
        FilterColumn::City,
        FilterColumn::Gender,
        FilterColumn::ProductCategory,
    ];

    /// Source column name.
    pub fn name(self) -> &'static str {
        match self {
            FilterColumn::City => CITY,
            FilterColumn::Gender => GENDER,
            FilterColumn::ProductCategory => PRODUCT_CATEGORY,
        }
    }

    /// Widget label.
    pub fn label(self) -> &'static str {
        match self {
            FilterColumn::City => "City",
            FilterColumn::Gender => "Gender",
            FilterColumn::ProductCategory => "Product Category",
        }
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the source table
// ---------------------------------------------------------------------------

/// A single customer transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub city: CellValue,
    pub gender: CellValue,
    pub product_category: CellValue,
    pub age: CellValue,
    pub purchase_amount: f64,
    /// Any further source columns: column_name → value.
    pub extra: BTreeMap<String, CellValue>,
}

impl Record {
    /// Value of a filterable column.
    pub fn category(&self, column: FilterColumn) -> &CellValue {
        match column {
            FilterColumn::City => &self.city,
            FilterColumn::Gender => &self.gender,
            FilterColumn::ProductCategory => &self.product_category,
        }
    }

    /// Numeric value of any column by name; `None` for nulls and non-numbers.
    pub fn numeric(&self, column: &str) -> Option<f64> {
        match column {
            PURCHASE_AMOUNT => Some(self.purchase_amount),
            CITY => self.city.as_f64(),
            GENDER => self.gender.as_f64(),
            PRODUCT_CATEGORY => self.product_category.as_f64(),
            AGE => self.age.as_f64(),
            other => self.extra.get(other).and_then(CellValue::as_f64),
        }
    }

    fn cell(&self, column: &str) -> Option<&CellValue> {
        match column {
            CITY => Some(&self.city),
            GENDER => Some(&self.gender),
            PRODUCT_CATEGORY => Some(&self.product_category),
            AGE => Some(&self.age),
            PURCHASE_AMOUNT => None,
            other => self.extra.get(other),
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed column indices.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// All records, in source order.
    pub records: Vec<Record>,
    /// Source column names, in source order.
    pub columns: Vec<String>,
    /// Distinct values per filterable column, in first-seen order.
    pub categories: BTreeMap<FilterColumn, Vec<CellValue>>,
    /// Same values as `categories`, as sets for membership tests.
    pub unique_values: BTreeMap<FilterColumn, BTreeSet<CellValue>>,
    /// Columns holding only numbers (and nulls), in source order.
    pub numeric_columns: Vec<String>,
}

impl Dataset {
    /// Build column indices from validated records.
    pub fn from_records(columns: Vec<String>, records: Vec<Record>) -> Self {
        let mut categories: BTreeMap<FilterColumn, Vec<CellValue>> = BTreeMap::new();
        let mut unique_values: BTreeMap<FilterColumn, BTreeSet<CellValue>> = BTreeMap::new();

        for column in FilterColumn::ALL {
            let seen = unique_values.entry(column).or_default();
            let ordered = categories.entry(column).or_default();
            for rec in &records {
                let val = rec.category(column);
                if seen.insert(val.clone()) {
                    ordered.push(val.clone());
                }
            }
        }

        let numeric_columns = columns
            .iter()
            .filter(|col| col.as_str() == PURCHASE_AMOUNT || is_numeric_column(&records, col))
            .cloned()
            .collect();

        Dataset {
            records,
            columns,
            categories,
            unique_values,
            numeric_columns,
        }
    }

    /// Distinct values of `column` in first-seen order.
    pub fn categories(&self, column: FilterColumn) -> &[CellValue] {
        self.categories
            .get(&column)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A column is numeric when every non-null cell is an integer or float and
/// at least one such cell exists.
fn is_numeric_column(records: &[Record], column: &str) -> bool {
    let mut any = false;
    for rec in records {
        match rec.cell(column) {
            Some(CellValue::Integer(_)) | Some(CellValue::Float(_)) => any = true,
            Some(CellValue::Null) | None => {}
            Some(_) => return false,
        }
    }
    any
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(city: &str, gender: &str, cat: &str, age: CellValue, amt: f64) -> Record {
        Record {
            city: city.into(),
            gender: gender.into(),
            product_category: cat.into(),
            age,
            purchase_amount: amt,
            extra: BTreeMap::new(),
        }
    }

    fn columns() -> Vec<String> {
        REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn categories_keep_first_seen_order() {
        let ds = Dataset::from_records(
            columns(),
            vec![
                record("Paris", "F", "Toys", 30i64.into(), 1.0),
                record("Berlin", "M", "Books", 31i64.into(), 2.0),
                record("Paris", "M", "Toys", 32i64.into(), 3.0),
            ],
        );
        assert_eq!(
            ds.categories(FilterColumn::City),
            &[CellValue::from("Paris"), CellValue::from("Berlin")]
        );
        assert_eq!(ds.unique_values[&FilterColumn::Gender].len(), 2);
    }

    #[test]
    fn numeric_columns_skip_text_ages() {
        let ds = Dataset::from_records(
            columns(),
            vec![
                record("A", "F", "X", "18-25".into(), 1.0),
                record("A", "M", "X", 40i64.into(), 2.0),
            ],
        );
        assert_eq!(ds.numeric_columns, vec![PURCHASE_AMOUNT.to_string()]);
    }

    #[test]
    fn numeric_columns_include_integer_age_and_extras() {
        let mut with_id = record("A", "F", "X", 20i64.into(), 1.0);
        with_id.extra.insert("Customer_ID".into(), CellValue::Integer(7));
        let mut flagged = record("A", "M", "X", 40i64.into(), 2.0);
        flagged.extra.insert("Customer_ID".into(), CellValue::Null);

        let mut cols = vec!["Customer_ID".to_string()];
        cols.extend(columns());
        let ds = Dataset::from_records(cols, vec![with_id, flagged]);
        assert_eq!(
            ds.numeric_columns,
            vec!["Customer_ID".to_string(), AGE.to_string(), PURCHASE_AMOUNT.to_string()]
        );
    }

    #[test]
    fn cell_value_orders_integers_numerically() {
        let mut ages = vec![CellValue::Integer(100), CellValue::Integer(9), CellValue::Null];
        ages.sort();
        assert_eq!(
            ages,
            vec![CellValue::Null, CellValue::Integer(9), CellValue::Integer(100)]
        );
        assert!(CellValue::from("Books") < CellValue::from("Toys"));
    }
}
