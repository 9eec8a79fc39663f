//! Data row collections: what provider members build and return.

use crate::row::{DataRow, RowTuple, TheoryDataRow, TypedDataRow};
use crate::value::RawRow;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    #[error("cannot add a null row to a data row collection")]
    NullRow,
}

/// A row type that can be built from a raw, unwrapped form.
///
/// This is the single conversion point used by [`DataRowCollection::add`].
pub trait FromRaw: TheoryDataRow + Sized {
    type Raw;

    fn from_raw(raw: Self::Raw) -> Self;
}

impl FromRaw for DataRow {
    type Raw = RawRow;

    fn from_raw(raw: RawRow) -> Self {
        DataRow::new(raw)
    }
}

impl<T: RowTuple> FromRaw for TypedDataRow<T> {
    type Raw = T;

    fn from_raw(raw: T) -> Self {
        TypedDataRow::new(raw)
    }
}

/// Either a raw row (converted on insertion) or a pre-built row.
pub enum RowEntry<R: FromRaw> {
    Raw(R::Raw),
    Row(R),
}

/// Insertion-ordered collection of data rows. Duplicates are kept.
///
/// # Example
///
/// ```rust
/// use rstheory::{TypedTestData, RowMetadata, TypedDataRow};
///
/// let mut data = TypedTestData::<(i32, i32, i32)>::new();
/// data.add((1, 2, 3));
/// data.add_row(TypedDataRow::new((-4, -6, -10)).with_metadata(RowMetadata::new().label("negatives")));
/// assert_eq!(data.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DataRowCollection<R> {
    rows: Vec<R>,
}

/// Untyped collection: each raw row is a `Vec<Value>` of any arity.
pub type TestData = DataRowCollection<DataRow>;

/// Strongly typed collection: each raw row is a tuple `T`.
pub type TypedTestData<T> = DataRowCollection<TypedDataRow<T>>;

impl<R> Default for DataRowCollection<R> {
    fn default() -> Self {
        DataRowCollection { rows: Vec::new() }
    }
}

impl<R: FromRaw> DataRowCollection<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from pre-built rows.
    pub fn from_rows(rows: impl IntoIterator<Item = R>) -> Self {
        let mut data = Self::new();
        data.add_rows(rows);
        data
    }

    /// Convert a raw row and append it.
    pub fn add(&mut self, raw: R::Raw) -> &mut Self {
        self.rows.push(R::from_raw(raw));
        self
    }

    /// Append a pre-built row.
    pub fn add_row(&mut self, row: R) -> &mut Self {
        self.rows.push(row);
        self
    }

    /// Append a pre-built row that may be absent. Absent rows are an error.
    pub fn try_add_row(&mut self, row: Option<R>) -> Result<&mut Self, DataError> {
        let row = row.ok_or(DataError::NullRow)?;
        Ok(self.add_row(row))
    }

    pub fn add_range(&mut self, raws: impl IntoIterator<Item = R::Raw>) -> &mut Self {
        for raw in raws {
            self.add(raw);
        }
        self
    }

    pub fn add_rows(&mut self, rows: impl IntoIterator<Item = R>) -> &mut Self {
        for row in rows {
            self.add_row(row);
        }
        self
    }

    /// Append a mix of raw and pre-built rows, in the order given.
    pub fn add_entries(&mut self, entries: impl IntoIterator<Item = RowEntry<R>>) -> &mut Self {
        for entry in entries {
            match entry {
                RowEntry::Raw(raw) => self.add(raw),
                RowEntry::Row(row) => self.add_row(row),
            };
        }
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows in insertion order. Each call starts a fresh pass.
    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.rows.iter()
    }
}

impl<R: FromRaw> FromIterator<R::Raw> for DataRowCollection<R> {
    fn from_iter<I: IntoIterator<Item = R::Raw>>(iter: I) -> Self {
        let mut data = Self::new();
        data.add_range(iter);
        data
    }
}

impl<R: FromRaw> Extend<R::Raw> for DataRowCollection<R> {
    fn extend<I: IntoIterator<Item = R::Raw>>(&mut self, iter: I) {
        self.add_range(iter);
    }
}

impl<'a, R> IntoIterator for &'a DataRowCollection<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl<R> IntoIterator for DataRowCollection<R> {
    type Item = R;
    type IntoIter = std::vec::IntoIter<R>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}
