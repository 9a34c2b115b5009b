//! Structs and methods for reading and writing the tab separated tables
//! exchanged between pipeline stages
use super::*;
use annotation::Pitchfork;
use std::io::prelude::*;
use std::io::BufWriter;

/// A tab separated file: one header line followed by data rows
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[inline]
fn split_line(line: &[u8]) -> Vec<String> {
    // A line consisting only of a tab still has two (empty) cells
    let mut cells = Pitchfork::new(b'\t', line)
        .map(|cell| String::from_utf8_lossy(cell).into_owned())
        .collect::<Vec<_>>();
    if line.last() == Some(&b'\t') {
        cells.push(String::new());
    }
    cells
}

impl Table {
    pub fn new(header: Vec<String>) -> Table {
        Table {
            header,
            rows: Vec::new(),
        }
    }

    /// Parse a tab separated file. Only line terminators are stripped, so
    /// empty leading and trailing cells survive.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Table> {
        let buffer = fs::read(path.as_ref())?;
        let mut lines = Pitchfork::new(b'\n', &buffer)
            .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
            .filter(|line| !line.is_empty());

        let header = match lines.next() {
            Some(line) => split_line(line),
            None => {
                return Err(Error::format(
                    path.as_ref(),
                    "empty file, expected a header",
                ))
            }
        };
        let rows = lines.map(split_line).collect();
        Ok(Table { header, rows })
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut f = BufWriter::new(fs::File::create(path)?);
        writeln!(f, "{}", self.header.join("\t"))?;
        for row in &self.rows {
            writeln!(f, "{}", row.join("\t"))?;
        }
        f.flush()?;
        Ok(())
    }

    /// Index of the column named `name`
    pub fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }

    /// Cell `idx` of `row`, empty if the row is too short
    pub fn cell(row: &[String], idx: usize) -> &str {
        row.get(idx).map(|s| s.as_str()).unwrap_or("")
    }
}

/// Parse a numeric cell. Empty, `NaN`/`NA` and unparseable cells are missing.
pub fn parse_value(s: &str) -> Option<f64> {
    match s.trim() {
        "" | "NA" | "N/A" => None,
        s => s.parse::<f64>().ok().filter(|v| !v.is_nan()),
    }
}

/// Render a float for output: NaN is an empty cell
pub fn format_value(v: f64) -> String {
    if v.is_nan() {
        String::new()
    } else if v == f64::INFINITY {
        "inf".to_string()
    } else if v == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        format!("{}", v)
    }
}

pub(crate) fn format_option(v: Option<f64>) -> String {
    v.map(format_value).unwrap_or_default()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn split_keeps_empty_cells() {
        assert_eq!(split_line(b"a\t\tb"), vec!["a", "", "b"]);
        assert_eq!(split_line(b"\ta\t"), vec!["", "a", ""]);
        assert_eq!(split_line(b"\t"), vec!["", ""]);
    }

    #[test]
    fn load_and_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.txt");
        fs::write(&path, "A\tB\tC\r\nx\t1\t\n\ny\t\t3\n").unwrap();

        let table = Table::load(&path).unwrap();
        assert_eq!(table.header, vec!["A", "B", "C"]);
        assert_eq!(table.rows, vec![vec!["x", "1", ""], vec!["y", "", "3"]]);
        assert_eq!(table.column("C"), Some(2));
        assert_eq!(Table::cell(&table.rows[0], 7), "");

        let out = dir.path().join("copy.txt");
        table.write(&out).unwrap();
        assert_eq!(
            fs::read_to_string(&out).unwrap(),
            "A\tB\tC\nx\t1\t\ny\t\t3\n"
        );
    }

    #[test]
    fn empty_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        fs::write(&path, "").unwrap();
        assert!(matches!(Table::load(&path), Err(Error::Format { .. })));
    }

    #[test]
    fn values() {
        assert_eq!(parse_value("1.5"), Some(1.5));
        assert_eq!(parse_value(" 2e3 "), Some(2000.0));
        assert_eq!(parse_value(""), None);
        assert_eq!(parse_value("NaN"), None);
        assert_eq!(parse_value("nan"), None);
        assert_eq!(parse_value("NA"), None);
        assert_eq!(parse_value("abc"), None);
        assert_eq!(parse_value("inf"), Some(f64::INFINITY));

        assert_eq!(format_value(f64::NAN), "");
        assert_eq!(format_value(f64::INFINITY), "inf");
        assert_eq!(format_value(f64::NEG_INFINITY), "-inf");
        assert_eq!(format_value(0.25), "0.25");
        assert_eq!(format_option(None), "");
    }
}
