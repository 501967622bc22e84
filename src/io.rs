// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! I/O utilities: loading and saving by file extension.
//!
//! [`load_adaptively`] and [`save_adaptively`] pick a handler from the
//! lowercase file extension. NumPy arrays are widened to `f64`, pickles are
//! read into JSON-like values and tables (CSV, parquet) hold their cells as
//! text.

use std::fmt::Display;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use image::{DynamicImage, ImageFormat, RgbImage};
use ndarray::ArrayD;
use ndarray_npy::{NpzReader, NpzWriter, ReadNpyExt};
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::error::{OverlayError, Result};
use crate::{info, verbose, warn};

/// Extensions decoded as images.
pub const IMAGE_EXTENSIONS: [&str; 3] = ["jpeg", "jpg", "png"];

/// Lowercase extension of `path`, without the dot.
fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
}

/// Create the parent directory of `path` if needed.
fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            OverlayError::IoError(format!(
                "Failed to create directory {}: {e}",
                parent.display()
            ))
        })?;
    }
    Ok(())
}

/// Replace the extension of `path` with `suffix`.
#[must_use]
pub fn path_with_suffix<P: AsRef<Path>>(path: P, suffix: &str) -> PathBuf {
    path.as_ref().with_extension(suffix)
}

/// Save a rendered figure as `format`.
///
/// The suffix of `path` is replaced by `format` unless it already names the
/// same format, in any case (`overlay.PNG` stays as is).
///
/// # Errors
///
/// Returns an error if `format` is not a known image format or writing fails.
pub fn save_figure<P: AsRef<Path>>(figure: &RgbImage, path: P, format: &str) -> Result<PathBuf> {
    let image_format = ImageFormat::from_extension(format)
        .ok_or_else(|| OverlayError::UnsupportedFormat(format.to_string()))?;
    let path = path.as_ref();
    let path = if extension(path).is_some_and(|ext| ext.eq_ignore_ascii_case(format)) {
        path.to_path_buf()
    } else {
        path_with_suffix(path, format)
    };
    info!("Saving figure to: {}", path.display());
    ensure_parent(&path)?;
    figure.save_with_format(&path, image_format)?;
    Ok(path)
}

/// Write each item on its own line.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_to_txt<T: Display, P: AsRef<Path>>(data: &[T], path: P) -> Result<()> {
    let path = path.as_ref();
    info!("Saving {} rows to txt file: {}", data.len(), path.display());
    ensure_parent(path)?;
    let mut writer = BufWriter::new(File::create(path)?);
    for row in data {
        writeln!(writer, "{row}")?;
    }
    writer.flush()?;
    Ok(())
}

/// Save an image; the format follows the file extension.
///
/// # Errors
///
/// Returns an error if the extension is unknown or encoding fails.
pub fn save_img<P: AsRef<Path>>(img: &DynamicImage, path: P) -> Result<()> {
    let path = path.as_ref();
    verbose!("Saving an image to: {}", path.display());
    ensure_parent(path)?;
    // JPEG has no alpha channel.
    if matches!(extension(path).as_deref(), Some("jpg" | "jpeg")) {
        DynamicImage::ImageRgb8(img.to_rgb8()).save(path)?;
    } else {
        img.save(path)?;
    }
    Ok(())
}

/// Load an image.
///
/// JPEGs go through `jpeg-decoder` first, with the generic `image` decoders as fallback.
///
/// # Errors
///
/// Returns an error if the file cannot be read or decoded.
pub fn load_img<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
    let path = path.as_ref();
    verbose!("Loading image from: {}", path.display());

    if matches!(extension(path).as_deref(), Some("jpg" | "jpeg")) {
        if let Some(img) = decode_jpeg(path) {
            return Ok(img);
        }
    }
    // Fallback
    Ok(image::open(path)?)
}

fn decode_jpeg(path: &Path) -> Option<DynamicImage> {
    let file = File::open(path).ok()?;
    let mut decoder = jpeg_decoder::Decoder::new(BufReader::new(file));
    let pixels = decoder.decode().ok()?;
    let metadata = decoder.info()?;
    let width = u32::from(metadata.width);
    let height = u32::from(metadata.height);
    match metadata.pixel_format {
        jpeg_decoder::PixelFormat::RGB24 => {
            image::ImageBuffer::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8)
        }
        jpeg_decoder::PixelFormat::L8 => {
            image::ImageBuffer::from_raw(width, height, pixels).map(DynamicImage::ImageLuma8)
        }
        _ => None,
    }
}

/// Save a JSON value, pretty-printed.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_json<P: AsRef<Path>>(value: &serde_json::Value, path: P) -> Result<()> {
    let path = path.as_ref();
    verbose!("Saving JSON data to: {}", path.display());
    ensure_parent(path)?;
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

/// Load a JSON document.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid JSON.
pub fn load_json<P: AsRef<Path>>(path: P) -> Result<serde_json::Value> {
    let path = path.as_ref();
    verbose!("Loading JSON data from: {}", path.display());
    let file = File::open(path).map_err(|e| {
        OverlayError::IoError(format!("Failed to open {}: {e}", path.display()))
    })?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Rows of a CSV or parquet file, cells kept as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    /// Column names.
    pub headers: Vec<String>,
    /// Data rows, without the header.
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of the column called `name`.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.headers.iter().position(|h| h == name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(idx).map_or("", String::as_str))
                .collect(),
        )
    }
}

/// Load a CSV file whose first line is a header.
///
/// # Errors
///
/// Returns an error if the file cannot be read or a row is malformed.
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    info!("Reading data from a CSV file: {}", path.display());
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
    let headers = reader.headers()?.iter().map(String::from).collect();
    let rows = reader
        .records()
        .map(|record| record.map(|r| r.iter().map(String::from).collect()))
        .collect::<std::result::Result<Vec<Vec<String>>, csv::Error>>()?;
    let table = Table { headers, rows };
    info!("  loaded {} rows", table.len());
    Ok(table)
}

/// Write a table as CSV with a header line.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_csv<P: AsRef<Path>>(table: &Table, path: P) -> Result<()> {
    let path = path.as_ref();
    info!("Saving {} data rows to CSV: {}", table.len(), path.display());
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Load a parquet file. Every column is formatted to text; nulls become empty cells.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid parquet.
pub fn load_parquet<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    info!("Reading data from a parquet file: {}", path.display());
    let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(path)?)?;
    let headers = builder
        .schema()
        .fields()
        .iter()
        .map(|field| field.name().clone())
        .collect();

    let options = FormatOptions::default();
    let mut rows = Vec::new();
    for batch in builder.build()? {
        let batch = batch?;
        let columns = batch
            .columns()
            .iter()
            .map(|column| ArrayFormatter::try_new(column.as_ref(), &options))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        for row in 0..batch.num_rows() {
            rows.push(columns.iter().map(|c| c.value(row).to_string()).collect());
        }
    }
    let table = Table { headers, rows };
    info!("  loaded {} rows", table.len());
    Ok(table)
}

/// Write a table to parquet, one UTF-8 column per header.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_to_parquet<P: AsRef<Path>>(table: &Table, path: P) -> Result<()> {
    let path = path.as_ref();
    info!("Saving {} data rows to parquet: {}", table.len(), path.display());
    let schema = Arc::new(Schema::new(
        table
            .headers
            .iter()
            .map(|name| Field::new(name, DataType::Utf8, false))
            .collect::<Vec<_>>(),
    ));
    let columns = (0..table.headers.len())
        .map(|idx| {
            let cells = table
                .rows
                .iter()
                .map(|row| row.get(idx).map_or("", String::as_str));
            Arc::new(StringArray::from_iter_values(cells)) as ArrayRef
        })
        .collect();
    let options = RecordBatchOptions::new().with_row_count(Some(table.len()));
    let batch = RecordBatch::try_new_with_options(schema.clone(), columns, &options)?;

    ensure_parent(path)?;
    let mut writer = ArrowWriter::try_new(File::create(path)?, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

/// Read an `.npy` payload of any common numeric dtype as `f64`.
///
/// The error of the `f64` attempt is kept when no dtype matches.
#[allow(clippy::cast_precision_loss)]
fn read_npy_widened(bytes: &[u8]) -> std::result::Result<ArrayD<f64>, ndarray_npy::ReadNpyError> {
    ArrayD::<f64>::read_npy(bytes).or_else(|err| {
        ArrayD::<f32>::read_npy(bytes)
            .map(|a| a.mapv(f64::from))
            .or_else(|_| ArrayD::<i64>::read_npy(bytes).map(|a| a.mapv(|v| v as f64)))
            .or_else(|_| ArrayD::<i32>::read_npy(bytes).map(|a| a.mapv(f64::from)))
            .or_else(|_| ArrayD::<u8>::read_npy(bytes).map(|a| a.mapv(f64::from)))
            .or_else(|_| ArrayD::<bool>::read_npy(bytes).map(|a| a.mapv(|v| f64::from(u8::from(v)))))
            .map_err(|_| err)
    })
}

/// Load a single NumPy array (`.npy`), widened to `f64`.
///
/// Object arrays need Python to unpickle and cannot be read.
///
/// # Errors
///
/// Returns [`OverlayError::NumpyError`] if the file is not a numeric `.npy` array.
pub fn load_npy<P: AsRef<Path>>(path: P) -> Result<ArrayD<f64>> {
    let path = path.as_ref();
    verbose!("Loading Numpy data from: {}", path.display());
    let bytes = fs::read(path)?;
    read_npy_widened(&bytes).map_err(|err| {
        warn!("{err}");
        warn!("Only numeric arrays can be loaded; object arrays need Python to unpickle");
        err.into()
    })
}

/// Load every array of a NumPy archive (`.npz`), in archive order.
///
/// Names are reported without the `.npy` suffix NumPy adds inside the archive.
///
/// # Errors
///
/// Returns [`OverlayError::NumpyError`] if the archive or one of its arrays cannot be read.
pub fn load_npz<P: AsRef<Path>>(path: P) -> Result<Vec<(String, ArrayD<f64>)>> {
    let path = path.as_ref();
    verbose!("Loading Numpy data from: {}", path.display());
    let mut npz = NpzReader::new(BufReader::new(File::open(path)?))?;
    let names = npz.names()?;
    let mut arrays = Vec::with_capacity(names.len());
    for (idx, name) in names.into_iter().enumerate() {
        let array = npz_entry_widened(&mut npz, idx)?;
        let name = name.strip_suffix(".npy").unwrap_or(&name).to_string();
        arrays.push((name, array));
    }
    Ok(arrays)
}

/// Read entry `idx` of an archive as `f64`, trying the common numeric dtypes in turn.
#[allow(clippy::cast_precision_loss)]
fn npz_entry_widened<R: std::io::Read + std::io::Seek>(
    npz: &mut NpzReader<R>,
    idx: usize,
) -> Result<ArrayD<f64>> {
    let as_f64: std::result::Result<ArrayD<f64>, _> = npz.by_index(idx);
    let err = match as_f64 {
        Ok(array) => return Ok(array),
        Err(err) => err,
    };
    if let Ok(array) = npz.by_index(idx).map(|a: ArrayD<f32>| a.mapv(f64::from)) {
        return Ok(array);
    }
    if let Ok(array) = npz.by_index(idx).map(|a: ArrayD<i64>| a.mapv(|v| v as f64)) {
        return Ok(array);
    }
    if let Ok(array) = npz.by_index(idx).map(|a: ArrayD<i32>| a.mapv(f64::from)) {
        return Ok(array);
    }
    npz.by_index(idx)
        .map(|a: ArrayD<u8>| a.mapv(f64::from))
        .map_err(|_| err.into())
}

/// Save one array as `.npy`.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_numpy<P: AsRef<Path>>(array: &ArrayD<f64>, path: P) -> Result<()> {
    let path = path.as_ref();
    verbose!("Saving Numpy array to: {}", path.display());
    ensure_parent(path)?;
    ndarray_npy::write_npy(path, array)?;
    Ok(())
}

/// Save named arrays as an uncompressed `.npz` archive.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_npz<P: AsRef<Path>>(arrays: &[(String, ArrayD<f64>)], path: P) -> Result<()> {
    let path = path.as_ref();
    verbose!("Saving {} Numpy arrays to: {}", arrays.len(), path.display());
    ensure_parent(path)?;
    let mut npz = NpzWriter::new(BufWriter::new(File::create(path)?));
    for (name, array) in arrays {
        npz.add_array(name.trim_end_matches(".npy"), array)?;
    }
    npz.finish()?.flush()?;
    Ok(())
}

/// Load a pickle into a JSON-like value.
///
/// Dicts need string keys; tuples and sets become arrays.
///
/// # Errors
///
/// Returns [`OverlayError::PickleError`] if the stream holds something without a JSON counterpart.
pub fn load_pkl<P: AsRef<Path>>(path: P) -> Result<serde_json::Value> {
    let path = path.as_ref();
    verbose!("Loading Pickle data from: {}", path.display());
    let file = File::open(path).map_err(|e| {
        OverlayError::IoError(format!("Failed to open {}: {e}", path.display()))
    })?;
    Ok(serde_pickle::from_reader(
        BufReader::new(file),
        serde_pickle::DeOptions::new(),
    )?)
}

/// Pickle a JSON-like value.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_to_pkl<P: AsRef<Path>>(value: &serde_json::Value, path: P) -> Result<()> {
    let path = path.as_ref();
    verbose!("Saving object via Pickle to: {}", path.display());
    ensure_parent(path)?;
    let mut writer = BufWriter::new(File::create(path)?);
    serde_pickle::to_writer(&mut writer, value, serde_pickle::SerOptions::new())?;
    writer.flush()?;
    Ok(())
}

/// Copy a file, creating the target directory if needed.
///
/// # Errors
///
/// Returns an error if the copy fails.
pub fn copy_file<P: AsRef<Path>, Q: AsRef<Path>>(src: P, dst: Q) -> Result<()> {
    let (src, dst) = (src.as_ref(), dst.as_ref());
    verbose!("Copying from {} to {}", src.display(), dst.display());
    ensure_parent(dst)?;
    fs::copy(src, dst).map_err(|e| {
        OverlayError::IoError(format!(
            "Failed to copy {} to {}: {e}",
            src.display(),
            dst.display()
        ))
    })?;
    Ok(())
}

/// Data returned by [`load_adaptively`].
#[derive(Debug, Clone)]
pub enum Loaded {
    /// `.json` document or unpickled object.
    Json(serde_json::Value),
    Image(DynamicImage),
    /// `.csv` or `.parquet` rows.
    Table(Table),
    /// `.npy` array.
    Array(ArrayD<f64>),
    /// `.npz` arrays with their names.
    Arrays(Vec<(String, ArrayD<f64>)>),
}

/// Data accepted by [`save_adaptively`].
#[derive(Debug, Clone, Copy)]
pub enum Saveable<'a> {
    Image(&'a DynamicImage),
    /// Written as `.json`, or pickled as `.pkl`/`.pickle`.
    Json(&'a serde_json::Value),
    Lines(&'a [String]),
    Table(&'a Table),
    Array(&'a ArrayD<f64>),
    Arrays(&'a [(String, ArrayD<f64>)]),
}

impl Saveable<'_> {
    const fn kind(&self) -> &'static str {
        match self {
            Self::Image(_) => "image",
            Self::Json(_) => "JSON",
            Self::Lines(_) => "text",
            Self::Table(_) => "table",
            Self::Array(_) => "array",
            Self::Arrays(_) => "named array",
        }
    }
}

/// Load a file with the handler registered for its extension.
///
/// # Errors
///
/// Returns [`OverlayError::UnsupportedFormat`] for extensions without a handler,
/// or the handler's error.
pub fn load_adaptively<P: AsRef<Path>>(path: P) -> Result<Loaded> {
    let path = path.as_ref();
    let ext = extension(path).unwrap_or_default();
    match ext.as_str() {
        "json" => load_json(path).map(Loaded::Json),
        e if IMAGE_EXTENSIONS.contains(&e) => load_img(path).map(Loaded::Image),
        "csv" => load_csv(path).map(Loaded::Table),
        "parquet" => load_parquet(path).map(Loaded::Table),
        "npy" => load_npy(path).map(Loaded::Array),
        "npz" => load_npz(path).map(Loaded::Arrays),
        "pkl" | "pickle" => load_pkl(path).map(Loaded::Json),
        _ => Err(OverlayError::UnsupportedFormat(format!(
            "no loader for '{}'",
            path.display()
        ))),
    }
}

/// Save `obj` with the handler registered for the extension of `path`.
///
/// # Errors
///
/// Returns [`OverlayError::MissingExtension`] if `path` has no extension,
/// [`OverlayError::UnsupportedFormat`] if the extension does not fit `obj`,
/// or the handler's error.
pub fn save_adaptively<P: AsRef<Path>>(path: P, obj: Saveable<'_>) -> Result<()> {
    let path = path.as_ref();
    let Some(ext) = extension(path) else {
        return Err(OverlayError::MissingExtension(path.display().to_string()));
    };
    match (ext.as_str(), obj) {
        (e, Saveable::Image(img)) if IMAGE_EXTENSIONS.contains(&e) => save_img(img, path),
        ("json", Saveable::Json(value)) => save_json(value, path),
        ("txt", Saveable::Lines(lines)) => save_to_txt(lines, path),
        ("pkl" | "pickle", Saveable::Json(value)) => save_to_pkl(value, path),
        ("csv", Saveable::Table(table)) => save_csv(table, path),
        ("parquet", Saveable::Table(table)) => save_to_parquet(table, path),
        ("npy", Saveable::Array(array)) => save_numpy(array, path),
        ("npz", Saveable::Arrays(arrays)) => save_npz(arrays, path),
        (e, obj) => Err(OverlayError::UnsupportedFormat(format!(
            "cannot save {} data as '.{e}'",
            obj.kind()
        ))),
    }
}
