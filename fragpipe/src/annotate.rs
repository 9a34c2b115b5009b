//! Replace the annotation column of formatted files with entries from an
//! accession dictionary
use super::*;

const FORMATTED_SUFFIX: &str = "_formatted.txt";
const ANNOTATED_SUFFIX: &str = "_annotated.txt";

/// Overwrite column 2 of every data row with the dictionary annotation for
/// the accession in column 1 ([`annotation::UNKNOWN`] if absent)
pub fn annotate(table: &mut Table, dict: &Dictionary) {
    for row in table.rows.iter_mut() {
        let ann = dict.annotate(Table::cell(row, 0)).to_string();
        match row.get_mut(1) {
            Some(cell) => *cell = ann,
            None => {
                row.resize(1, String::new());
                row.push(ann);
            }
        }
    }
}

/// `dir/name_formatted.txt` -> `dir/name_annotated.txt`
pub fn output_path<P: AsRef<Path>>(path: P) -> PathBuf {
    let path = path.as_ref();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = name
        .strip_suffix(FORMATTED_SUFFIX)
        .map(String::from)
        .unwrap_or_else(|| file_stem(path));
    path.with_file_name(format!("{}{}", stem, ANNOTATED_SUFFIX))
}

pub fn annotate_file<P: AsRef<Path>>(path: P, dict: &Dictionary) -> Result<PathBuf> {
    let mut table = Table::load(path.as_ref())?;
    annotate(&mut table, dict);

    let unknown = table
        .rows
        .iter()
        .filter(|row| dict.lookup(Table::cell(row, 0)).is_none())
        .count();
    let out = output_path(path.as_ref());
    table.write(&out)?;
    tracing::info!(
        "annotated {} rows ({} unknown): {} -> {}",
        table.rows.len(),
        unknown,
        path.as_ref().display(),
        out.display()
    );
    Ok(out)
}

/// Annotate every `*_formatted.txt` file in `dir`
pub fn annotate_folder<P: AsRef<Path>>(dir: P, dict: &Dictionary) -> Result<Vec<PathBuf>> {
    files_with_suffix(dir, FORMATTED_SUFFIX)?
        .into_iter()
        .map(|path| annotate_file(path, dict))
        .collect()
}
