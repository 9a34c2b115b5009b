//! Utilities for pulling accession descriptions out of UniProt FASTA headers
//!
//! ```text
//! >sp|P04406|G3P_HUMAN Glyceraldehyde-3-phosphate dehydrogenase OS=Homo sapiens OX=9606 GN=GAPDH
//! ```
//!
//! maps `P04406` to `Glyceraldehyde-3-phosphate dehydrogenase`.
use super::Pitchfork;
use std::fs::File;
use std::io::{self, prelude::*};
use std::path::Path;
use std::str;

/// Parse a single header line (with or without the leading `>`) into an
/// `(accession, description)` pair
pub fn parse_header(line: &str) -> Option<(String, String)> {
    let line = line.trim().trim_start_matches('>');
    if line.is_empty() {
        return None;
    }
    let (id, rest) = match line.split_once(char::is_whitespace) {
        Some((id, rest)) => (id, rest.trim()),
        None => (line, ""),
    };

    let mut fields = id.split('|');
    let (acc, name) = match (fields.next(), fields.next(), fields.next()) {
        (Some(_), Some(acc), name) => (acc, name.unwrap_or(acc)),
        _ => (id, id),
    };

    let desc = match rest.find(" OS=") {
        Some(idx) => &rest[..idx],
        None if rest.starts_with("OS=") => "",
        None => rest,
    };
    let desc = if desc.is_empty() { name } else { desc };
    Some((acc.to_string(), desc.to_string()))
}

fn is_decoy(line: &str) -> bool {
    line.contains("Reverse") || line.contains("rev_")
}

/// Collect `(accession, description)` pairs from every non-decoy header in
/// a FASTA file
pub fn headers<P: AsRef<Path>>(path: P) -> io::Result<Vec<(String, String)>> {
    let mut buf = Vec::new();
    File::open(path)?.read_to_end(&mut buf)?;

    let mut v = Vec::new();
    for line in Pitchfork::new(b'\n', &buf) {
        if line.first() != Some(&b'>') {
            continue;
        }
        let line =
            str::from_utf8(line).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        if is_decoy(line) {
            continue;
        }
        if let Some(pair) = parse_header(line) {
            v.push(pair);
        }
    }
    Ok(v)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Dictionary;

    #[test]
    fn uniprot_header() {
        let (acc, desc) = parse_header(
            ">sp|P04406|G3P_HUMAN Glyceraldehyde-3-phosphate dehydrogenase OS=Homo sapiens OX=9606",
        )
        .unwrap();
        assert_eq!(acc, "P04406");
        assert_eq!(desc, "Glyceraldehyde-3-phosphate dehydrogenase");

        assert_eq!(
            parse_header(">tr|A0A024|A0A024_HUMAN"),
            Some(("A0A024".into(), "A0A024_HUMAN".into()))
        );
        assert_eq!(
            parse_header(">SPO0001 hypothetical protein"),
            Some(("SPO0001".into(), "hypothetical protein".into()))
        );
        assert_eq!(parse_header(">"), None);
    }

    #[test]
    fn skips_decoys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            ">sp|P1|ONE_HUMAN First protein OS=Homo sapiens\nMEHK\nQLLK\n>Reverse_sp|P2|TWO_HUMAN Decoy\nKLLQ\n>sp|P3|THREE_HUMAN Third OS=Homo sapiens\nAAAK\n"
        )
        .unwrap();

        let dict = Dictionary::from_fasta(file.path()).unwrap();
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.annotate("P1"), "First protein");
        assert_eq!(dict.annotate("P3"), "Third");
        assert_eq!(dict.lookup("P2"), None);
    }
}
