//! Time-indexed tables
//!
//! A [`Frame`] is an Arrow [`RecordBatch`] plus an optional designated index
//! column. The index lives in the batch like any other column, always first,
//! and is left out of [`Frame::columns`]. A frame without an index has an
//! implicit positional range index `0..num_rows`.

pub mod combine;
pub mod ops;
pub mod resample;
pub mod search;
pub mod shift;

use std::collections::HashMap;

use arrow::array::ArrayRef;
use arrow::datatypes::{Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_arrow::schema::{SchemaLike, TracingOptions};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::utils::arrow::build_batch;

pub use combine::combine_first_by_time;
pub use ops::{is_default_index, rename, reset_index, set_index, set_timeidx, sum_none};
pub use resample::{Aggregation, resample};
pub use search::search_timeidx;
pub use shift::{Axis, shift};

/// A record batch with an optional designated index column
#[derive(Debug, Clone)]
pub struct Frame {
    batch: RecordBatch,
    index: Option<String>,
}

impl Frame {
    /// Create a frame, moving the named index column to the front
    ///
    /// # Errors
    /// Returns [`Error::KeyNotFound`] if `index` is not a column of `batch`
    pub fn new(batch: RecordBatch, index: Option<&str>) -> Result<Self> {
        let mut frame = Self { batch, index: None };
        if let Some(name) = index {
            frame.promote_index(name)?;
        }
        Ok(frame)
    }

    /// Wrap a record batch without a designated index
    #[must_use]
    pub const fn from_batch(batch: RecordBatch) -> Self {
        Self { batch, index: None }
    }

    /// Build a frame from named columns of equal length
    ///
    /// # Errors
    /// Returns an Arrow error if the columns differ in length
    pub fn from_columns(columns: Vec<(&str, ArrayRef)>, index: Option<&str>) -> Result<Self> {
        let num_rows = columns.first().map_or(0, |(_, array)| array.len());
        let columns = columns
            .into_iter()
            .map(|(name, array)| (name.to_string(), array))
            .collect();
        let batch = build_batch(columns, num_rows, HashMap::new())?;
        Self::new(batch, index)
    }

    /// A frame with no rows and no columns
    #[must_use]
    pub fn empty() -> Self {
        Self::from_batch(RecordBatch::new_empty(Arc::new(Schema::empty())))
    }

    /// Serialize records into a frame using `serde_arrow`
    ///
    /// # Errors
    /// Returns [`Error::Records`] if the schema cannot be traced from the records
    pub fn from_records<T: Serialize>(records: &[T]) -> Result<Self> {
        let fields = Vec::<arrow::datatypes::FieldRef>::from_samples(
            records,
            TracingOptions::default().allow_null_fields(true),
        )?;
        let batch = serde_arrow::to_record_batch(&fields, &records)?;
        Ok(Self::from_batch(batch))
    }

    /// Deserialize the rows of the frame, index included, into records
    ///
    /// # Errors
    /// Returns [`Error::Records`] if a row does not match `T`
    pub fn to_records<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        Ok(serde_arrow::from_record_batch(&self.batch)?)
    }

    /// The underlying record batch, index column included
    #[must_use]
    pub const fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Consume the frame and return the record batch
    #[must_use]
    pub fn into_batch(self) -> RecordBatch {
        self.batch
    }

    #[must_use]
    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// Number of data columns, the index excluded
    #[must_use]
    pub fn num_columns(&self) -> usize {
        self.batch.num_columns() - usize::from(self.index.is_some())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batch.num_rows() == 0
    }

    /// Name of the designated index column
    #[must_use]
    pub fn index_name(&self) -> Option<&str> {
        self.index.as_deref()
    }

    /// The designated index column
    #[must_use]
    pub fn index(&self) -> Option<&ArrayRef> {
        self.index
            .as_deref()
            .and_then(|name| self.batch.column_by_name(name))
    }

    /// Data column names in order, the index excluded
    #[must_use]
    pub fn columns(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .filter(|name| Some(name.as_str()) != self.index.as_deref())
            .collect()
    }

    /// Whether `name` is a data column
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        Some(name) != self.index.as_deref() && self.batch.column_by_name(name).is_some()
    }

    /// A data column by name
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ArrayRef> {
        if Some(name) == self.index.as_deref() {
            return None;
        }
        self.batch.column_by_name(name)
    }

    /// The index or a data column by name
    ///
    /// # Errors
    /// Returns [`Error::KeyNotFound`] if `key` is neither
    pub fn key(&self, key: &str) -> Result<&ArrayRef> {
        self.batch
            .column_by_name(key)
            .ok_or_else(|| Error::key_not_found(key))
    }

    /// Named columns in batch order, index first when present
    pub(crate) fn named_columns(&self) -> Vec<(String, ArrayRef)> {
        self.batch
            .schema()
            .fields()
            .iter()
            .zip(self.batch.columns())
            .map(|(field, array)| (field.name().clone(), Arc::clone(array)))
            .collect()
    }

    /// Replace the index or a column with an array of the same length
    ///
    /// The field type follows the new array.
    ///
    /// # Errors
    /// Returns [`Error::KeyNotFound`] if `name` is not in the frame
    pub fn replace_column(&mut self, name: &str, array: ArrayRef) -> Result<()> {
        let schema = self.batch.schema();
        let idx = schema
            .index_of(name)
            .map_err(|_| Error::key_not_found(name))?;
        let mut columns = self.named_columns();
        columns[idx].1 = array;
        self.batch = build_batch(columns, self.num_rows(), schema.metadata().clone())?;
        Ok(())
    }

    /// Designate an existing column as the index and move it to the front
    pub(crate) fn promote_index(&mut self, name: &str) -> Result<()> {
        let schema = self.batch.schema();
        let idx = schema
            .index_of(name)
            .map_err(|_| Error::key_not_found(name))?;
        let mut columns = self.named_columns();
        let index_column = columns.remove(idx);
        columns.insert(0, index_column);
        self.batch = build_batch(columns, self.num_rows(), schema.metadata().clone())?;
        self.index = Some(name.to_string());
        Ok(())
    }

    /// Rebuild the frame from named columns, keeping the index designation
    /// when the index is still among them
    pub(crate) fn with_columns(&self, columns: Vec<(String, ArrayRef)>, num_rows: usize) -> Result<Self> {
        let index = self
            .index
            .as_deref()
            .filter(|name| columns.iter().any(|(c, _)| c == name))
            .map(str::to_string);
        let batch = build_batch(columns, num_rows, self.batch.schema().metadata().clone())?;
        Ok(Self { batch, index })
    }

    pub(crate) fn clear_index(&mut self) {
        self.index = None;
    }

    pub(crate) fn set_batch(&mut self, batch: RecordBatch) {
        self.batch = batch;
    }
}
