use anyhow::{anyhow, bail, Context, Result};
use csv::{QuoteStyle, ReaderBuilder, Terminator, WriterBuilder};
use encoding_rs::Encoding;
use std::{fs, path::Path};

use crate::table::Table;

/// Resolve a WHATWG encoding label (e.g. "utf-8", "windows-1252").
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| anyhow!("unknown encoding label: {label}"))
}

/// Read a delimited file into a `Table`.
///
/// Every field is kept as raw text; an empty field stays an empty string.
/// A ragged record is a read error, as is undecodable input.
pub fn read_table(path: &Path, delimiter: u8, encoding: &'static Encoding) -> Result<Table> {
    let raw = fs::read(path).with_context(|| format!("opening {}", path.display()))?;
    let (text, _, had_errors) = encoding.decode(&raw);
    if had_errors {
        bail!(
            "{} is not valid {} text",
            path.display(),
            encoding.name()
        );
    }

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .context("reading header row")?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("parsing {}", path.display()))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(Table { headers, rows })
}

/// Serialize a `Table` with minimal quoting and a single `\n` terminating
/// every record, then encode and write in one bulk operation.
pub fn write_table(
    path: &Path,
    delimiter: u8,
    encoding: &'static Encoding,
    table: &Table,
) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer
        .write_record(&table.headers)
        .context("serializing header row")?;
    for row in &table.rows {
        writer.write_record(row).context("serializing record")?;
    }

    let buf = writer
        .into_inner()
        .map_err(|e| anyhow!("flushing CSV serializer: {e}"))?;
    let text = String::from_utf8(buf).context("serialized CSV is not valid UTF-8")?;

    let (bytes, _, unmappable) = encoding.encode(&text);
    if unmappable {
        bail!("table contains characters not representable in {}", encoding.name());
    }

    fs::write(path, &bytes).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
