use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, AsArray, Float32Array, Float64Array, LargeListArray, ListArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{MeasurementSeries, MetadataValue, Spectrum};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a measurement series from a directory of measurement files or from
/// a single tabular file.
pub fn load_input(path: &Path) -> Result<MeasurementSeries> {
    if path.is_dir() {
        load_directory(path)
    } else {
        load_file(path)
    }
}

/// Load a series from one file, dispatching on the extension.
///
/// Supported formats:
/// * `.parquet` / `.pq` – list columns `x` and `y`, other columns are metadata
/// * `.json`            – `[{ "x": [...], "y": [...], ...meta }, ...]`
/// * `.csv`             – columns `x` and `y` holding semicolon-separated floats
pub fn load_file(path: &Path) -> Result<MeasurementSeries> {
    let ext = extension_of(path);
    let series = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    log::debug!("{}: {} spectra", path.display(), series.len());
    Ok(series)
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

fn checked_spectrum(
    x: Vec<f64>,
    y: Vec<f64>,
    metadata: BTreeMap<String, MetadataValue>,
    row: usize,
) -> Result<Spectrum> {
    if x.len() != y.len() {
        bail!("Row {row}: x has {} values but y has {}", x.len(), y.len());
    }
    Ok(Spectrum { x, y, metadata })
}

// ---------------------------------------------------------------------------
// Measurement directory
// ---------------------------------------------------------------------------

/// Every regular file in `dir`, sorted by name, is one measurement holding a
/// two-column `x y` table. Files that do not parse are skipped with a warning.
pub fn load_directory(dir: &Path) -> Result<MeasurementSeries> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let entry = entry.context("reading directory entry")?;
        if entry.file_type().context("reading file type")?.is_file() {
            paths.push(entry.path());
        }
    }
    paths.sort();

    let mut spectra = Vec::with_capacity(paths.len());
    for path in &paths {
        match load_measurement(path) {
            Ok((x, y)) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let mut metadata = BTreeMap::new();
                metadata.insert("file".to_string(), MetadataValue::String(name));
                metadata.insert(
                    "index".to_string(),
                    MetadataValue::Integer(spectra.len() as i64),
                );
                spectra.push(Spectrum { x, y, metadata });
            }
            Err(e) => log::warn!("Skipping {}: {e:#}", path.display()),
        }
    }

    if spectra.is_empty() {
        bail!("No measurement files could be read from {}", dir.display());
    }
    log::debug!("{}: {} measurement files", dir.display(), spectra.len());
    Ok(MeasurementSeries::from_spectra(spectra))
}

/// Read one two-column measurement file. Comma separated for `.csv`,
/// tab or space separated otherwise. `#` lines and a leading text header
/// are ignored.
fn load_measurement(path: &Path) -> Result<(Vec<f64>, Vec<f64>)> {
    let comma = extension_of(path) == "csv";
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .delimiter(if comma { b',' } else { b'\t' })
        .trim(csv::Trim::All)
        .from_path(path)
        .context("opening measurement file")?;

    let mut x = Vec::new();
    let mut y = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("line {line}"))?;
        // Space-separated files arrive as a single field.
        let fields: Vec<&str> = if record.len() == 1 {
            record[0].split_whitespace().collect()
        } else {
            record.iter().filter(|f| !f.is_empty()).collect()
        };
        if fields.is_empty() {
            continue;
        }
        if fields.len() < 2 {
            bail!("line {line}: expected two columns, found {}", fields.len());
        }

        match (fields[0].parse::<f64>(), fields[1].parse::<f64>()) {
            (Ok(xv), Ok(yv)) => {
                x.push(xv);
                y.push(yv);
            }
            _ if x.is_empty() => continue,
            _ => bail!("line {line}: '{}' / '{}' are not numbers", fields[0], fields[1]),
        }
    }

    if x.is_empty() {
        bail!("no numeric rows");
    }
    Ok((x, y))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, e.g. `df.to_json(orient='records')`:
///
/// ```json
/// [
///   { "x": [1000.0, 1002.0], "y": [0.12, 0.14], "temperature": 25 },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<MeasurementSeries> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;
    let records = root.as_array().context("Expected top-level JSON array")?;

    let spectra = records
        .iter()
        .enumerate()
        .map(|(i, rec)| {
            let obj = rec
                .as_object()
                .with_context(|| format!("Row {i} is not a JSON object"))?;
            let x = json_floats(obj.get("x"), i, "x")?;
            let y = json_floats(obj.get("y"), i, "y")?;
            let metadata = obj
                .iter()
                .filter(|(key, _)| *key != "x" && *key != "y")
                .map(|(key, val)| (key.clone(), json_to_metadata(val)))
                .collect();
            checked_spectrum(x, y, metadata, i)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(MeasurementSeries::from_spectra(spectra))
}

fn json_floats(val: Option<&JsonValue>, row: usize, col: &str) -> Result<Vec<f64>> {
    val.and_then(|v| v.as_array())
        .with_context(|| format!("Row {row}: missing or invalid '{col}' array"))?
        .iter()
        .enumerate()
        .map(|(j, v)| {
            v.as_f64()
                .with_context(|| format!("Row {row}, {col}[{j}]: not a number"))
        })
        .collect()
}

fn json_to_metadata(val: &JsonValue) -> MetadataValue {
    match val {
        JsonValue::Null => MetadataValue::Null,
        JsonValue::Bool(b) => MetadataValue::Bool(*b),
        JsonValue::Number(n) => n
            .as_i64()
            .map(MetadataValue::Integer)
            .or_else(|| n.as_f64().map(MetadataValue::Float))
            .unwrap_or_else(|| MetadataValue::String(n.to_string())),
        JsonValue::String(s) => MetadataValue::String(s.clone()),
        other => MetadataValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// One spectrum per row: `x` and `y` columns hold semicolon-separated
/// floats (`"1000;1002;1004"`), every other column is metadata.
fn load_csv(path: &Path) -> Result<MeasurementSeries> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers = reader.headers().context("reading CSV headers")?.clone();

    let x_idx = headers
        .iter()
        .position(|h| h == "x")
        .context("CSV missing 'x' column")?;
    let y_idx = headers
        .iter()
        .position(|h| h == "y")
        .context("CSV missing 'y' column")?;

    let mut spectra = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("CSV row {row}"))?;
        let x = semicolon_floats(record.get(x_idx).unwrap_or(""), row, "x")?;
        let y = semicolon_floats(record.get(y_idx).unwrap_or(""), row, "y")?;
        let metadata = headers
            .iter()
            .zip(record.iter())
            .enumerate()
            .filter(|(i, _)| *i != x_idx && *i != y_idx)
            .map(|(_, (name, value))| (name.to_string(), MetadataValue::parse(value)))
            .collect();
        spectra.push(checked_spectrum(x, y, metadata, row)?);
    }

    Ok(MeasurementSeries::from_spectra(spectra))
}

fn semicolon_floats(s: &str, row: usize, col: &str) -> Result<Vec<f64>> {
    s.split(';')
        .enumerate()
        .map(|(j, tok)| {
            tok.trim()
                .parse::<f64>()
                .with_context(|| format!("Row {row}, {col}[{j}]: '{tok}' is not a number"))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Parquet with `x` and `y` as `List<Float64|Float32>` (or `LargeList`);
/// other columns are metadata. Pandas and Polars output both work.
fn load_parquet(path: &Path) -> Result<MeasurementSeries> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?
        .build()
        .context("building parquet reader")?;

    let mut spectra = Vec::new();
    for batch in reader {
        let batch = batch.context("reading parquet record batch")?;
        let schema = batch.schema();
        let x_idx = schema
            .index_of("x")
            .map_err(|_| anyhow::anyhow!("Parquet file missing 'x' column"))?;
        let y_idx = schema
            .index_of("y")
            .map_err(|_| anyhow::anyhow!("Parquet file missing 'y' column"))?;

        for row in 0..batch.num_rows() {
            let x = list_floats(batch.column(x_idx), row)
                .with_context(|| format!("Row {row}: failed to read 'x'"))?;
            let y = list_floats(batch.column(y_idx), row)
                .with_context(|| format!("Row {row}: failed to read 'y'"))?;
            let metadata = schema
                .fields()
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != x_idx && *i != y_idx)
                .map(|(i, field)| (field.name().clone(), arrow_metadata(batch.column(i), row)))
                .collect();
            spectra.push(checked_spectrum(x, y, metadata, spectra.len())?);
        }
    }

    Ok(MeasurementSeries::from_spectra(spectra))
}

/// `Vec<f64>` from a List or LargeList column at `row`. Null items become NaN.
fn list_floats(col: &Arc<dyn Array>, row: usize) -> Result<Vec<f64>> {
    if col.is_null(row) {
        bail!("null value in list column");
    }

    let values = match col.data_type() {
        DataType::List(_) => col
            .as_any()
            .downcast_ref::<ListArray>()
            .context("expected ListArray")?
            .value(row),
        DataType::LargeList(_) => col
            .as_any()
            .downcast_ref::<LargeListArray>()
            .context("expected LargeListArray")?
            .value(row),
        other => bail!("Expected List or LargeList column, got {other:?}"),
    };

    if let Some(arr) = values.as_any().downcast_ref::<Float64Array>() {
        Ok(arr.iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    } else if let Some(arr) = values.as_any().downcast_ref::<Float32Array>() {
        Ok(arr.iter().map(|v| v.map_or(f64::NAN, f64::from)).collect())
    } else {
        bail!(
            "List inner type is {:?}, expected Float64 or Float32",
            values.data_type()
        )
    }
}

fn arrow_metadata(col: &Arc<dyn Array>, row: usize) -> MetadataValue {
    if col.is_null(row) {
        return MetadataValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => MetadataValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => MetadataValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => MetadataValue::Integer(col.as_primitive::<Int32Type>().value(row).into()),
        DataType::Int64 => MetadataValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => MetadataValue::Float(col.as_primitive::<Float32Type>().value(row).into()),
        DataType::Float64 => MetadataValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => MetadataValue::Bool(col.as_boolean().value(row)),
        _ => array_value_to_string(col, row)
            .map(MetadataValue::String)
            .unwrap_or(MetadataValue::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write(dir: &Path, name: &str, contents: &str) {
        let mut file = std::fs::File::create(dir.join(name)).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
    }

    #[test]
    fn loads_json_records() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "series.json",
            r#"[{"x": [1, 2], "y": [0.5, 0.25], "temperature": 30, "run": "a"},
                {"x": [1, 2], "y": [0.75, 0.5], "temperature": 40.5, "run": null}]"#,
        );
        let series = load_file(&dir.path().join("series.json")).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.column_names, vec!["run", "temperature"]);
        assert_eq!(series.spectra[1].y, vec![0.75, 0.5]);
        assert_eq!(
            series.spectra[1].metadata["temperature"],
            MetadataValue::Float(40.5)
        );
        assert_eq!(series.spectra[1].metadata["run"], MetadataValue::Null);
    }

    #[test]
    fn json_length_mismatch_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "bad.json", r#"[{"x": [1, 2], "y": [0.5]}]"#);
        assert!(load_file(&dir.path().join("bad.json")).is_err());
    }

    #[test]
    fn loads_csv_rows() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "series.csv",
            "sample,x,y,temperature\nA,1;2;3,0.1;0.2;0.3,25\nB,1;2;3,0.4;0.5;0.6,35\n",
        );
        let series = load_file(&dir.path().join("series.csv")).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.spectra[0].x, vec![1.0, 2.0, 3.0]);
        assert_eq!(
            series.spectra[1].metadata["sample"],
            MetadataValue::String("B".into())
        );
        assert_eq!(
            series.spectra[1].metadata["temperature"],
            MetadataValue::Integer(35)
        );
    }

    #[test]
    fn rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "series.xlsx", "");
        assert!(load_file(&dir.path().join("series.xlsx")).is_err());
    }

    #[test]
    fn loads_measurement_directory_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.txt", "# second\n1000\t0.3\n1002\t0.4\n");
        write(dir.path(), "a.csv", "wavenumber,intensity\n1000,0.1\n1002,0.2\n");
        write(dir.path(), "c.dat", "1000 0.5\n1002   0.6\n");
        write(dir.path(), "notes.md", "just some notes\n");

        let series = load_input(dir.path()).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.spectra[0].y, vec![0.1, 0.2]);
        assert_eq!(series.spectra[1].y, vec![0.3, 0.4]);
        assert_eq!(series.spectra[2].x, vec![1000.0, 1002.0]);
        assert_eq!(
            series.spectra[1].metadata["file"],
            MetadataValue::String("b.txt".into())
        );
        assert_eq!(series.spectra[2].metadata["index"], MetadataValue::Integer(2));
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_directory(dir.path()).is_err());
    }
}
