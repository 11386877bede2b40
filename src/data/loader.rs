use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Record, RecordStore, Value};
use super::schema::Schema;
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a tabular dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one patient per line
/// * `.json`    – `[{ "age": 60, "sex_label": "Female", ... }, ...]`
/// * `.parquet` – flat scalar columns (strings, ints, floats, bools)
///
/// Every row is conformed to `schema` before it enters the store.
pub fn load_file(path: &Path, schema: &Schema) -> Result<RecordStore, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let rows = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        _ => return Err(LoadError::Unsupported { extension: ext }),
    }
    .map_err(|e| LoadError::Malformed {
        reason: format!("{e:#}"),
    })?;

    if rows.is_empty() {
        return Err(LoadError::Empty);
    }

    Ok(RecordStore::from_records(rows, schema))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, then one record per line.
/// Lines whose field count differs from the header are skipped.
fn load_csv(path: &Path) -> Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        bail!("CSV has no header row");
    }

    let mut records = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("CSV row {row_no}"))?;

        if row.len() != headers.len() {
            log::debug!(
                "Skipping CSV row {row_no}: {} fields, expected {}",
                row.len(),
                headers.len()
            );
            continue;
        }

        let fields: BTreeMap<String, Value> = headers
            .iter()
            .zip(row.iter())
            .map(|(name, cell)| (name.clone(), Value::parse_cell(cell)))
            .collect();

        records.push(Record::new(fields));
    }

    Ok(records)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "age": 75, "ejection_fraction": 20, "sex_label": "Male", "death_label": "Died" },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Vec<Record>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let rows = root.as_array().context("Expected top-level JSON array")?;

    rows.iter()
        .enumerate()
        .map(|(i, row)| -> Result<Record> {
            let obj = row
                .as_object()
                .with_context(|| format!("Row {i} is not a JSON object"))?;
            let fields = obj
                .iter()
                .map(|(key, val)| (key.clone(), json_to_value(val)))
                .collect();
            Ok(Record::new(fields))
        })
        .collect()
}

fn json_to_value(val: &JsonValue) -> Value {
    match val {
        JsonValue::Number(n) => n.as_f64().map(Value::Number).unwrap_or(Value::Absent),
        JsonValue::String(s) => Value::parse_cell(s),
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Null => Value::Absent,
        other => Value::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one scalar column per field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Vec<Record>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        let names: Vec<String> = schema.fields().iter().map(|f| f.name().clone()).collect();

        for row in 0..batch.num_rows() {
            let fields = names
                .iter()
                .zip(batch.columns())
                .map(|(name, col)| (name.clone(), extract_value(col, row)))
                .collect();
            records.push(Record::new(fields));
        }
    }

    Ok(records)
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_value(col: &Arc<dyn Array>, row: usize) -> Value {
    if col.is_null(row) {
        return Value::Absent;
    }
    match col.data_type() {
        DataType::Utf8 => Value::parse_cell(col.as_string::<i32>().value(row)),
        DataType::LargeUtf8 => Value::parse_cell(col.as_string::<i64>().value(row)),
        DataType::Int32 => Value::Number(col.as_primitive::<Int32Type>().value(row) as f64),
        DataType::Int64 => Value::Number(col.as_primitive::<Int64Type>().value(row) as f64),
        DataType::Float32 => Value::Number(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => Value::Number(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => Value::Bool(col.as_boolean().value(row)),
        other => Value::Text(format!("{other:?}")),
    }
}

// ---------------------------------------------------------------------------
// Background loading
// ---------------------------------------------------------------------------

type LoadResult = Result<RecordStore, LoadError>;

/// A one-shot load running on a worker thread.
pub struct LoadTask {
    handle: JoinHandle<LoadResult>,
}

impl LoadTask {
    /// Run `job` on a new thread.
    pub fn spawn<F>(job: F) -> Self
    where
        F: FnOnce() -> LoadResult + Send + 'static,
    {
        Self {
            handle: std::thread::spawn(job),
        }
    }

    /// Load `path` off the UI thread.
    pub fn load(path: PathBuf, schema: Schema) -> Self {
        Self::spawn(move || load_file(&path, &schema))
    }

    /// The worker's result once it has stopped, otherwise the task itself.
    ///
    /// A worker that panicked reports [`LoadError::Malformed`].
    pub fn try_finish(self) -> std::result::Result<LoadResult, Self> {
        if !self.handle.is_finished() {
            return Err(self);
        }
        Ok(self.handle.join().unwrap_or_else(|panic| {
            let reason = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            log::error!("Loader thread panicked: {reason}");
            Err(LoadError::Malformed {
                reason: format!("loader crashed: {reason}"),
            })
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper to create a temp file with the given suffix and content
    fn create_temp(suffix: &str, content: &str) -> NamedTempFile {
        let mut temp_file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        write!(temp_file, "{}", content).unwrap();
        temp_file
    }

    #[test]
    fn test_load_csv_basic() {
        let csv_content = "age,ejection_fraction,sex_label,death_label,anaemia\n\
                           60,38,Female,Survived,1\n\
                           70,20,Male,Died,0\n";
        let temp_file = create_temp(".csv", csv_content);
        let store = load_file(temp_file.path(), &Schema::default()).unwrap();

        assert_eq!(store.len(), 2);
        let first = &store.records()[0];
        assert_eq!(first.number("age"), Some(60.0));
        assert_eq!(first.get("sex_label"), &Value::Text("Female".into()));
        assert_eq!(first.get("anaemia"), &Value::Number(1.0));
        assert_eq!(first.get("platelets"), &Value::Absent);
    }

    #[test]
    fn test_load_csv_skips_ragged_rows() {
        let csv_content = "age,sex_label\n60,Female\n70\n80,Male,extra\n90,Male\n";
        let temp_file = create_temp(".csv", csv_content);
        let store = load_file(temp_file.path(), &Schema::default()).unwrap();

        let ages: Vec<_> = store.records().iter().map(|r| r.number("age")).collect();
        assert_eq!(ages, vec![Some(60.0), Some(90.0)]);
    }

    #[test]
    fn test_load_csv_unparseable_numeric_is_absent() {
        let temp_file = create_temp(".csv", "age,time\nabc,4\n");
        let store = load_file(temp_file.path(), &Schema::default()).unwrap();
        assert_eq!(store.records()[0].get("age"), &Value::Absent);
        assert_eq!(store.records()[0].number("time"), Some(4.0));
    }

    #[test]
    fn test_load_csv_header_only_is_empty() {
        let temp_file = create_temp(".csv", "age,sex_label\n");
        let result = load_file(temp_file.path(), &Schema::default());
        assert_eq!(result.unwrap_err(), LoadError::Empty);
    }

    #[test]
    fn test_load_json_records() {
        let json = r#"[
            {"age": 60, "ejection_fraction": 38, "sex_label": "Female", "death_label": "Survived", "smoking": true},
            {"age": null, "ejection_fraction": "20", "sex_label": "Male", "death_label": "Died"}
        ]"#;
        let temp_file = create_temp(".json", json);
        let store = load_file(temp_file.path(), &Schema::default()).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.records()[0].get("smoking"), &Value::Bool(true));
        assert_eq!(store.records()[1].get("age"), &Value::Absent);
        assert_eq!(store.records()[1].number("ejection_fraction"), Some(20.0));
    }

    #[test]
    fn test_load_json_rejects_non_array() {
        let temp_file = create_temp(".json", r#"{"age": 1}"#);
        let result = load_file(temp_file.path(), &Schema::default());
        assert!(matches!(result, Err(LoadError::Malformed { .. })));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let result = load_file(Path::new("/nonexistent/records.csv"), &Schema::default());
        assert!(matches!(result, Err(LoadError::NotFound { .. })));
    }

    #[test]
    fn test_unsupported_extension() {
        let temp_file = create_temp(".xlsx", "whatever");
        let result = load_file(temp_file.path(), &Schema::default());
        assert_eq!(
            result.unwrap_err(),
            LoadError::Unsupported {
                extension: "xlsx".into()
            }
        );
    }

    #[test]
    fn test_load_parquet_flat_columns() {
        use arrow::array::{BooleanArray, Float64Array, Int64Array, StringArray};
        use arrow::datatypes::{Field, Schema as ArrowSchema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let arrow_schema = Arc::new(ArrowSchema::new(vec![
            Field::new("age", DataType::Int64, false),
            Field::new("serum_creatinine", DataType::Float64, true),
            Field::new("sex_label", DataType::Utf8, false),
            Field::new("smoking", DataType::Boolean, false),
        ]));
        let batch = RecordBatch::try_new(
            arrow_schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![55, 65])),
                Arc::new(Float64Array::from(vec![Some(1.1), None])),
                Arc::new(StringArray::from(vec!["Male", "Female"])),
                Arc::new(BooleanArray::from(vec![true, false])),
            ],
        )
        .unwrap();

        let temp_file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer =
            ArrowWriter::try_new(temp_file.reopen().unwrap(), arrow_schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let store = load_file(temp_file.path(), &Schema::default()).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.records()[0].number("age"), Some(55.0));
        assert_eq!(store.records()[0].get("smoking"), &Value::Bool(true));
        assert_eq!(store.records()[1].get("serum_creatinine"), &Value::Absent);
        assert_eq!(store.records()[1].get("sex_label"), &Value::Text("Female".into()));
    }

    fn wait(mut task: LoadTask) -> Result<RecordStore, LoadError> {
        loop {
            match task.try_finish() {
                Ok(result) => return result,
                Err(pending) => {
                    task = pending;
                    std::thread::sleep(std::time::Duration::from_millis(5));
                }
            }
        }
    }

    #[test]
    fn test_task_loads_in_background() {
        let temp_file = create_temp(".csv", "age,sex_label,death_label\n60,Female,Survived\n");
        let task = LoadTask::load(temp_file.path().to_path_buf(), Schema::default());
        assert_eq!(wait(task).unwrap().len(), 1);
    }

    #[test]
    fn test_task_reports_load_errors() {
        let task = LoadTask::load(PathBuf::from("/no/such/records.csv"), Schema::default());
        assert!(matches!(wait(task), Err(LoadError::NotFound { .. })));
    }

    #[test]
    fn test_panicking_worker_is_reported_as_malformed() {
        let task = LoadTask::spawn(|| panic!("corrupt page header"));
        match wait(task) {
            Err(LoadError::Malformed { reason }) => {
                assert!(reason.contains("corrupt page header"), "{reason}")
            }
            other => panic!("expected Malformed, got {other:?}"),
        }
    }
}
