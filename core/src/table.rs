//! Delimited-text plumbing shared by every input table.
//!
//! Columns are addressed by header name, never by position. A missing
//! column or a short row reads as an empty string, which the defaulting
//! parsers downstream turn into 0 / "".

use crate::error::{TransformError, TransformResult};
use csv::StringRecord;
use std::{fs::File, io::Read, path::Path};

pub fn reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input)
}

pub fn open(path: &Path) -> TransformResult<csv::Reader<File>> {
    let file = File::open(path).map_err(|e| TransformError::io(path, e))?;
    Ok(reader(file))
}

/// Header positions for a fixed set of column names.
pub struct Columns<const N: usize> {
    positions: [Option<usize>; N],
}

impl<const N: usize> Columns<N> {
    /// Resolve `names` against the header row. A repeated header name
    /// resolves to its last occurrence.
    pub fn resolve(headers: &StringRecord, names: [&str; N]) -> Self {
        let positions = names.map(|name| {
            headers
                .iter()
                .enumerate()
                .filter(|(_, h)| *h == name)
                .map(|(pos, _)| pos)
                .last()
        });
        Self { positions }
    }

    /// Field `column` (an index into the resolved names) of `record`.
    pub fn field<'r>(&self, record: &'r StringRecord, column: usize) -> &'r str {
        self.positions[column]
            .and_then(|pos| record.get(pos))
            .unwrap_or("")
    }

    pub fn missing<'n>(&self, names: &[&'n str; N]) -> Vec<&'n str> {
        names
            .iter()
            .zip(self.positions.iter())
            .filter(|(_, pos)| pos.is_none())
            .map(|(name, _)| *name)
            .collect()
    }
}

/// Records with no fields at all are not rows. A lone quoted empty field
/// (`""`) is a row.
pub fn is_blank(record: &StringRecord) -> bool {
    record.len() == 0
}

/// Visit every non-blank record after the header.
pub fn for_each_record<R, F>(input: &mut csv::Reader<R>, mut visit: F) -> csv::Result<()>
where
    R: Read,
    F: FnMut(&StringRecord),
{
    let mut record = StringRecord::new();
    while input.read_record(&mut record)? {
        if is_blank(&record) {
            continue;
        }
        visit(&record);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_header_resolves_to_last_occurrence() {
        let headers = StringRecord::from(vec!["id", "name", "id"]);
        let columns = Columns::resolve(&headers, ["id", "name", "absent"]);
        let record = StringRecord::from(vec!["1", "x", "2"]);

        assert_eq!(columns.field(&record, 0), "2");
        assert_eq!(columns.field(&record, 1), "x");
        assert_eq!(columns.field(&record, 2), "");
        assert_eq!(columns.missing(&["id", "name", "absent"]), ["absent"]);
    }

    #[test]
    fn short_record_reads_missing_fields_as_empty() {
        let headers = StringRecord::from(vec!["a", "b", "c"]);
        let columns = Columns::resolve(&headers, ["a", "c"]);
        let record = StringRecord::from(vec!["1"]);

        assert_eq!(columns.field(&record, 0), "1");
        assert_eq!(columns.field(&record, 1), "");
    }

    #[test]
    fn quoted_empty_field_is_a_row() {
        let mut input = reader("a,b\n\"\"\n1,2\n".as_bytes());
        let mut rows = 0;
        for_each_record(&mut input, |_| rows += 1).unwrap();
        assert_eq!(rows, 2);
    }
}
