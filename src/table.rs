//! Per-event observable containers and their parquet tables
use std::{
    collections::BTreeMap,
    fs::File,
    path::{Path, PathBuf},
    sync::Arc,
};

use arrow::{
    array::{
        Array, ArrayBuilder, ArrayRef, FixedSizeListArray, FixedSizeListBuilder,
        Float64Array, Float64Builder, ListArray, ListBuilder, UInt64Array,
    },
    datatypes::{Field, Schema},
    error::ArrowError,
    record_batch::RecordBatch,
};
use log::debug;
use parquet::{
    arrow::{arrow_reader::ParquetRecordBatchReaderBuilder, ArrowWriter},
    errors::ParquetError,
};
use thiserror::Error;

use crate::reader::CrossSection;

const WEIGHT_COLUMN: &str = "event_weight";
const PT_HAT_COLUMN: &str = "pt_hat";

/// Number of entries per observable value
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Dim {
    Scalar,
    /// A (jet pt, value) pair
    Pair,
}

/// Values of a single observable in one event
#[derive(Debug, Clone, PartialEq)]
pub enum Values {
    Scalar(Vec<f64>),
    Pair(Vec<[f64; 2]>),
}

impl Values {
    fn new(dim: Dim) -> Self {
        match dim {
            Dim::Scalar => Self::Scalar(Vec::new()),
            Dim::Pair => Self::Pair(Vec::new()),
        }
    }

    pub fn dim(&self) -> Dim {
        match self {
            Self::Scalar(_) => Dim::Scalar,
            Self::Pair(_) => Dim::Pair,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Scalar(v) => v.len(),
            Self::Pair(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clear(&mut self) {
        match self {
            Self::Scalar(v) => v.clear(),
            Self::Pair(v) => v.clear(),
        }
    }
}

/// Observable values collected in a single event
///
/// The set of keys is fixed by [declare](Self::declare) before the first
/// event. Values for undeclared keys are discarded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventObservables {
    values: BTreeMap<String, Values>,
}

impl EventObservables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, key: String, dim: Dim) {
        self.values.entry(key).or_insert_with(|| Values::new(dim));
    }

    pub fn push(&mut self, key: &str, value: f64) {
        if let Some(Values::Scalar(v)) = self.values.get_mut(key) {
            v.push(value)
        }
    }

    pub fn push_pair(&mut self, key: &str, value: [f64; 2]) {
        if let Some(Values::Pair(v)) = self.values.get_mut(key) {
            v.push(value)
        }
    }

    /// Remove all values, keeping the declared keys
    pub fn clear(&mut self) {
        for values in self.values.values_mut() {
            values.clear()
        }
    }

    pub fn get(&self, key: &str) -> Option<&Values> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Declared keys in ascending order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Values)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

enum ColumnBuilder {
    Scalar(ListBuilder<Float64Builder>),
    Pair(ListBuilder<FixedSizeListBuilder<Float64Builder>>),
}

impl ColumnBuilder {
    fn new(dim: Dim) -> Self {
        match dim {
            Dim::Scalar => Self::Scalar(ListBuilder::new(Float64Builder::new())),
            Dim::Pair => Self::Pair(ListBuilder::new(FixedSizeListBuilder::new(
                Float64Builder::new(),
                2,
            ))),
        }
    }

    fn append(&mut self, values: &Values) {
        match (self, values) {
            (Self::Scalar(b), Values::Scalar(v)) => {
                b.values().append_slice(v);
                b.append(true);
            }
            (Self::Pair(b), Values::Pair(v)) => {
                for pair in v {
                    b.values().values().append_slice(pair);
                    b.values().append(true);
                }
                b.append(true);
            }
            (Self::Scalar(b), _) => b.append(true),
            (Self::Pair(b), _) => b.append(true),
        }
    }

    fn finish(&mut self) -> ArrayRef {
        match self {
            Self::Scalar(b) => Arc::new(b.finish()),
            Self::Pair(b) => Arc::new(b.finish()),
        }
    }
}

/// Table with one row per event and one column per observable
pub struct ObservableTable {
    weights: Float64Builder,
    pt_hat: Float64Builder,
    columns: Vec<(String, ColumnBuilder)>,
}

impl ObservableTable {
    /// Create a table with one column for each key in `observables`
    pub fn new(observables: &EventObservables) -> Self {
        let columns = observables
            .iter()
            .map(|(key, values)| (key.to_owned(), ColumnBuilder::new(values.dim())))
            .collect();
        Self {
            weights: Float64Builder::new(),
            pt_hat: Float64Builder::new(),
            columns,
        }
    }

    pub fn n_rows(&self) -> usize {
        self.weights.len()
    }

    /// Append the observables of one event as a new row
    ///
    /// `observables` has to declare the same keys as the ones used to
    /// construct the table.
    pub fn push_event(
        &mut self,
        weight: f64,
        pt_hat: Option<f64>,
        observables: &EventObservables,
    ) {
        self.weights.append_value(weight);
        self.pt_hat.append_option(pt_hat);
        for (key, column) in &mut self.columns {
            let empty;
            let values = match observables.get(key) {
                Some(values) => values,
                None => {
                    empty = Values::Scalar(Vec::new());
                    &empty
                }
            };
            column.append(values);
        }
    }

    pub fn finish(&mut self) -> Result<RecordBatch, ArrowError> {
        let mut columns: Vec<(String, ArrayRef, bool)> = vec![
            (WEIGHT_COLUMN.to_owned(), Arc::new(self.weights.finish()) as ArrayRef, false),
            (PT_HAT_COLUMN.to_owned(), Arc::new(self.pt_hat.finish()) as ArrayRef, true),
        ];
        for (key, column) in &mut self.columns {
            columns.push((key.clone(), column.finish(), false));
        }
        record_batch(columns)
    }

    /// Write all rows to a parquet file
    pub fn write_parquet(&mut self, path: &Path) -> Result<(), TableError> {
        debug!("Writing {} rows to {path:?}", self.n_rows());
        let batch = self.finish()?;
        write_batch(path, &batch)
    }
}

fn record_batch(
    columns: Vec<(String, ArrayRef, bool)>,
) -> Result<RecordBatch, ArrowError> {
    let fields: Vec<Field> = columns
        .iter()
        .map(|(name, array, nullable)| {
            Field::new(name, array.data_type().clone(), *nullable)
        })
        .collect();
    let arrays = columns.into_iter().map(|(_, array, _)| array).collect();
    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)
}

fn write_batch(path: &Path, batch: &RecordBatch) -> Result<(), TableError> {
    let file = File::create(path)
        .map_err(|err| TableError::Io(path.to_owned(), err))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

/// Write the cross section table
pub fn write_cross_section(
    path: &Path,
    xs: &CrossSection,
    n_events: u64,
) -> Result<(), TableError> {
    debug!("Writing cross section {xs:?} to {path:?}");
    let columns: Vec<(String, ArrayRef, bool)> = vec![
        (
            "cross_section".to_owned(),
            Arc::new(Float64Array::from(vec![xs.value])) as ArrayRef,
            false,
        ),
        (
            "cross_section_error".to_owned(),
            Arc::new(Float64Array::from(vec![xs.error])) as ArrayRef,
            false,
        ),
        (
            "n_events".to_owned(),
            Arc::new(UInt64Array::from(vec![n_events])) as ArrayRef,
            false,
        ),
    ];
    write_batch(path, &record_batch(columns)?)
}

/// Cross section table contents
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CrossSectionTable {
    pub cross_section: CrossSection,
    pub n_events: u64,
}

pub fn read_cross_section(path: &Path) -> Result<CrossSectionTable, TableError> {
    let batches = read_batches(path)?;
    let batch = batches
        .first()
        .ok_or_else(|| TableError::Empty(path.to_owned()))?;
    let value = first_entry(batch, "cross_section", |a: &Float64Array| a.value(0))?;
    let error =
        first_entry(batch, "cross_section_error", |a: &Float64Array| a.value(0))?;
    let n_events = first_entry(batch, "n_events", |a: &UInt64Array| a.value(0))?;
    Ok(CrossSectionTable {
        cross_section: CrossSection { value, error },
        n_events,
    })
}

fn first_entry<A, T, F>(
    batch: &RecordBatch,
    name: &str,
    get: F,
) -> Result<T, TableError>
where
    A: Array + 'static,
    F: Fn(&A) -> T,
{
    let column = batch
        .column_by_name(name)
        .ok_or_else(|| TableError::MissingColumn(name.to_owned()))?;
    let array = column
        .as_any()
        .downcast_ref::<A>()
        .ok_or_else(|| TableError::ColumnType(name.to_owned()))?;
    if array.is_empty() {
        return Err(TableError::MissingColumn(name.to_owned()));
    }
    Ok(get(array))
}

fn read_batches(path: &Path) -> Result<Vec<RecordBatch>, TableError> {
    debug!("Reading {path:?}");
    let file = File::open(path)
        .map_err(|err| TableError::Io(path.to_owned(), err))?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;
    let batches = reader.collect::<Result<Vec<_>, _>>()?;
    Ok(batches)
}

/// Observable table read back from a parquet file
#[derive(Debug, Clone)]
pub struct ObservableFile {
    batches: Vec<RecordBatch>,
    weights: Vec<f64>,
    pt_hat: Vec<Option<f64>>,
}

impl ObservableFile {
    pub fn read(path: &Path) -> Result<Self, TableError> {
        let batches = read_batches(path)?;
        let mut weights = Vec::new();
        let mut pt_hat = Vec::new();
        for batch in &batches {
            let w = float_column(batch, WEIGHT_COLUMN)?;
            weights.extend(w.iter().map(|w| w.unwrap_or_default()));
            pt_hat.extend(float_column(batch, PT_HAT_COLUMN)?.iter());
        }
        Ok(Self {
            batches,
            weights,
            pt_hat,
        })
    }

    /// Event weights, one per row
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn pt_hat(&self) -> &[Option<f64>] {
        &self.pt_hat
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.batches
            .first()
            .map_or(false, |b| b.column_by_name(name).is_some())
    }

    /// Observable values, one entry per row
    ///
    /// Returns `None` if there is no such column.
    pub fn column(&self, name: &str) -> Result<Option<Vec<Values>>, TableError> {
        if !self.has_column(name) {
            return Ok(None);
        }
        let mut res = Vec::with_capacity(self.weights.len());
        for batch in &self.batches {
            let column = batch
                .column_by_name(name)
                .ok_or_else(|| TableError::MissingColumn(name.to_owned()))?;
            let list = column
                .as_any()
                .downcast_ref::<ListArray>()
                .ok_or_else(|| TableError::ColumnType(name.to_owned()))?;
            for row in 0..list.len() {
                res.push(decode_row(name, list.value(row))?);
            }
        }
        Ok(Some(res))
    }
}

fn float_column<'a>(
    batch: &'a RecordBatch,
    name: &str,
) -> Result<&'a Float64Array, TableError> {
    batch
        .column_by_name(name)
        .ok_or_else(|| TableError::MissingColumn(name.to_owned()))?
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| TableError::ColumnType(name.to_owned()))
}

fn decode_row(name: &str, row: ArrayRef) -> Result<Values, TableError> {
    if let Some(values) = row.as_any().downcast_ref::<Float64Array>() {
        return Ok(Values::Scalar(values.values().to_vec()));
    }
    let pairs = row
        .as_any()
        .downcast_ref::<FixedSizeListArray>()
        .ok_or_else(|| TableError::ColumnType(name.to_owned()))?;
    let mut res = Vec::with_capacity(pairs.len());
    for i in 0..pairs.len() {
        let pair = pairs.value(i);
        let pair = pair
            .as_any()
            .downcast_ref::<Float64Array>()
            .filter(|p| p.len() == 2)
            .ok_or_else(|| TableError::ColumnType(name.to_owned()))?;
        res.push([pair.value(0), pair.value(1)]);
    }
    Ok(Values::Pair(res))
}

/// Output file name for the table `kind` derived from an input file
///
/// Input files named like `final_state_hadrons_0000_00.dat` give
/// `{kind}_0000_00.parquet`; all other inputs give `{kind}.parquet`.
pub fn output_file_name(input: &Path, kind: &str) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    if !name.contains("final_state_hadrons") {
        return PathBuf::from(format!("{kind}.parquet"));
    }
    let name = name.replace("final_state_hadrons", kind);
    // strip compression and format extensions
    let stem = match name.find(kind) {
        Some(pos) => {
            let after = pos + kind.len();
            match name[after..].find('.') {
                Some(dot) => &name[..after + dot],
                None => name.as_str(),
            }
        }
        None => name.as_str(),
    };
    PathBuf::from(format!("{stem}.parquet"))
}

/// Path of the cross section table next to an observables table
///
/// Replaces the last occurrence of `observables` in the path.
pub fn cross_section_path(observables: &Path) -> PathBuf {
    let path = observables.to_string_lossy();
    match path.rfind("observables") {
        Some(pos) => PathBuf::from(format!(
            "{}cross_section{}",
            &path[..pos],
            &path[pos + "observables".len()..]
        )),
        None => observables.with_file_name("cross_section.parquet"),
    }
}

#[derive(Debug, Error)]
pub enum TableError {
    #[error("I/O error for {0:?}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("Arrow error")]
    Arrow(#[from] ArrowError),
    #[error("Parquet error")]
    Parquet(#[from] ParquetError),
    #[error("No column `{0}`")]
    MissingColumn(String),
    #[error("Column `{0}` has an unexpected type")]
    ColumnType(String),
    #[error("Table {0:?} is empty")]
    Empty(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observables() -> EventObservables {
        let mut obs = EventObservables::new();
        obs.declare("hadron_pt_ch_cms".to_owned(), Dim::Scalar);
        obs.declare("inclusive_jet_Dz_atlas_R0.4".to_owned(), Dim::Pair);
        obs
    }

    #[test]
    fn undeclared() {
        let mut obs = observables();
        obs.push("hadron_pt_ch_alice", 3.);
        obs.push("hadron_pt_ch_cms", 3.);
        obs.push_pair("inclusive_jet_Dz_atlas_R0.4", [100., 0.1]);
        assert!(!obs.contains_key("hadron_pt_ch_alice"));
        assert_eq!(obs.get("hadron_pt_ch_cms"), Some(&Values::Scalar(vec![3.])));
        obs.clear();
        assert_eq!(obs.len(), 2);
        assert!(obs.iter().all(|(_, v)| v.is_empty()));
    }

    #[test]
    fn parquet_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("observables.parquet");

        let mut obs = observables();
        let mut table = ObservableTable::new(&obs);
        obs.push("hadron_pt_ch_cms", 5.);
        obs.push("hadron_pt_ch_cms", 7.);
        obs.push_pair("inclusive_jet_Dz_atlas_R0.4", [120., 0.25]);
        table.push_event(0.5, Some(20.), &obs);
        obs.clear();
        table.push_event(2., None, &obs);
        assert_eq!(table.n_rows(), 2);
        table.write_parquet(&path).unwrap();

        let file = ObservableFile::read(&path).unwrap();
        assert_eq!(file.weights(), [0.5, 2.]);
        assert_eq!(file.pt_hat(), [Some(20.), None]);
        let pt = file.column("hadron_pt_ch_cms").unwrap().unwrap();
        assert_eq!(pt, [Values::Scalar(vec![5., 7.]), Values::Scalar(vec![])]);
        let dz = file.column("inclusive_jet_Dz_atlas_R0.4").unwrap().unwrap();
        assert_eq!(dz, [Values::Pair(vec![[120., 0.25]]), Values::Pair(vec![])]);
        assert!(file.column("dijet_xj_atlas_R0.4").unwrap().is_none());

        let xs_path = cross_section_path(&path);
        assert_eq!(xs_path, dir.path().join("cross_section.parquet"));
        let xs = CrossSection {
            value: 1.5,
            error: 0.1,
        };
        write_cross_section(&xs_path, &xs, 2).unwrap();
        let read = read_cross_section(&xs_path).unwrap();
        assert_eq!(read.cross_section, xs);
        assert_eq!(read.n_events, 2);
    }

    #[test]
    fn file_names() {
        let name = output_file_name(
            Path::new("/data/final_state_hadrons_0001_02.dat.gz"),
            "observables",
        );
        assert_eq!(name, PathBuf::from("observables_0001_02.parquet"));
        let name = output_file_name(Path::new("run.dat"), "cross_section");
        assert_eq!(name, PathBuf::from("cross_section.parquet"));
    }
}
