//! Reformat a raw FragPipe export into the 5-column layout used by every
//! later stage.
//!
//! The export (`report.pg_matrix.tsv` saved as `.txt`) must contain exactly
//! one sample measured in triplicate:
//!
//! ```text
//! Protein.Group  Protein.Ids  Protein.Names  Genes  First.Protein.Description  S_1  S_2  S_3
//! ```
//!
//! and is rewritten as
//!
//! ```text
//! Accession Number  Annotation  1  2  3
//! ```
//!
//! sorted by accession.
use super::*;

/// Number of columns in a single-sample triplicate export
pub const RAW_COLUMNS: usize = 8;

/// Columns kept from the raw export: accession, annotation, triplicates
pub const SELECTED: [usize; 5] = [0, 1, 5, 6, 7];

pub const HEADER: [&str; 5] = ["Accession Number", "Annotation", "1", "2", "3"];

const FORMATTED_SUFFIX: &str = "_formatted.txt";
const ANNOTATED_SUFFIX: &str = "_annotated.txt";

/// Reshape a raw export. Fails if the header does not have
/// [`RAW_COLUMNS`] columns.
pub fn reformat(raw: &Table) -> std::result::Result<Table, String> {
    if raw.header.len() != RAW_COLUMNS {
        return Err(format!(
            "expected {} header columns, found {}",
            RAW_COLUMNS,
            raw.header.len()
        ));
    }

    let mut table = Table::new(HEADER.iter().map(|s| s.to_string()).collect());
    table.rows = raw
        .rows
        .iter()
        .map(|row| {
            SELECTED
                .iter()
                .map(|&idx| Table::cell(row, idx).to_string())
                .collect::<Vec<_>>()
        })
        .collect();

    // stable, so rows sharing an accession keep their input order
    table.rows.sort_by(|a, b| a[0].cmp(&b[0]));
    Ok(table)
}

/// `dir/name.txt` -> `dir/name_formatted.txt`
pub fn output_path<P: AsRef<Path>>(path: P) -> PathBuf {
    let path = path.as_ref();
    path.with_file_name(format!("{}{}", file_stem(path), FORMATTED_SUFFIX))
}

/// Reformat a single raw export, writing `<stem>_formatted.txt` next to it
pub fn format_file<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    let raw = Table::load(path.as_ref())?;
    let table = reformat(&raw).map_err(|reason| Error::format(path.as_ref(), reason))?;

    let out = output_path(path.as_ref());
    table.write(&out)?;
    tracing::info!(
        "formatted {} rows: {} -> {}",
        table.rows.len(),
        path.as_ref().display(),
        out.display()
    );
    Ok(out)
}

/// Reformat every raw `*.txt` export in `dir`. Files with the wrong shape are
/// skipped with a warning; outputs of earlier runs are ignored.
pub fn format_folder<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for path in files_with_suffix(dir, ".txt")? {
        let name = path.to_string_lossy();
        if name.ends_with(FORMATTED_SUFFIX) || name.ends_with(ANNOTATED_SUFFIX) {
            continue;
        }
        tracing::info!("processing file: {}", path.display());
        match format_file(&path) {
            Ok(out) => written.push(out),
            Err(Error::Format { path, reason }) => {
                tracing::warn!("skipping {}: {}", path.display(), reason);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(written)
}
