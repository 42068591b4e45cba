//! Naive CSV reading for spreadsheet-style exports
//!
//! Headers are read on their own first so the row shape can be checked
//! before any data row is touched. Quoted cells may contain commas; `""`
//! inside quotes is a literal quote. Blank lines are ignored.

use std::str::Lines;

use super::error::{ImportError, ImportResult};

/// A data row of a CSV whose cell count already matches the header count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRow {
    /// 1-based line number in the source file
    pub line: usize,
    cells: Vec<String>,
}

impl ParsedRow {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell at `index`
    ///
    /// Callers only index within the shape validated by the format detector,
    /// so a miss here is a server bug, not bad input.
    pub fn cell(&self, index: usize) -> ImportResult<&str> {
        self.cells.get(index).map(String::as_str).ok_or_else(|| {
            ImportError::internal(format!(
                "Attempted to read cell {} of line {}, which only has {} cells.",
                index,
                self.line,
                self.cells.len()
            ))
        })
    }
}

/// CSV whose header line has been read but whose rows have not
pub struct NaiveCsv<'a> {
    pub headers: Vec<String>,
    body: Lines<'a>,
    header_line: usize,
}

impl<'a> NaiveCsv<'a> {
    /// Decode a UTF-8 buffer, stripping a byte-order mark if present
    pub fn decode(bytes: &[u8]) -> ImportResult<&str> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| ImportError::bad_request(format!("CSV is not valid UTF-8: {}", e)))?;
        Ok(text.strip_prefix('\u{feff}').unwrap_or(text))
    }

    /// Read the header line
    pub fn open(text: &'a str) -> ImportResult<Self> {
        let mut body = text.lines();
        let mut header_line = 0;

        let header = loop {
            header_line += 1;
            match body.next() {
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => break line,
                None => return Err(ImportError::bad_request("Invalid CSV provided. CSV was empty.")),
            }
        };

        let headers = split_cells(header).map_err(|e| {
            ImportError::bad_request(format!("Invalid CSV provided. Header line: {}", e))
        })?;

        Ok(Self {
            headers,
            body,
            header_line,
        })
    }

    /// Read all data rows, requiring each to have as many cells as the header
    pub fn rows(self) -> ImportResult<Vec<ParsedRow>> {
        let expected = self.headers.len();
        let mut rows = Vec::new();

        for (offset, line) in self.body.enumerate() {
            let line_number = self.header_line + offset + 1;
            if line.trim().is_empty() {
                continue;
            }

            let cells = split_cells(line).map_err(|e| {
                ImportError::bad_request(format!(
                    "Invalid CSV provided. Line {}: {}",
                    line_number, e
                ))
            })?;

            if cells.len() != expected {
                return Err(ImportError::bad_request(format!(
                    "Invalid CSV provided. Line {} has {} cells, but the header has {}.",
                    line_number,
                    cells.len(),
                    expected
                )));
            }

            rows.push(ParsedRow {
                line: line_number,
                cells,
            });
        }

        Ok(rows)
    }
}

fn split_cells(line: &str) -> Result<Vec<String>, String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if current.is_empty() => in_quotes = true,
            ',' if !in_quotes => cells.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }

    if in_quotes {
        return Err("unterminated quoted cell".to_string());
    }

    cells.push(current);
    Ok(cells)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_headers_then_rows() {
        let csv = NaiveCsv::open("a,b,c\n1,2,3\n\n4,5,6\n").unwrap();
        assert_eq!(csv.headers, ["a", "b", "c"]);

        let rows = csv.rows().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].cell(2).unwrap(), "3");
        assert_eq!(rows[1].line, 4);
    }

    #[test]
    fn test_crlf_and_bom() {
        let text = NaiveCsv::decode("\u{feff}a,b\r\n1,2\r\n".as_bytes()).unwrap();
        let csv = NaiveCsv::open(text).unwrap();
        assert_eq!(csv.headers, ["a", "b"]);
        assert_eq!(csv.rows().unwrap()[0].cell(1).unwrap(), "2");
    }

    #[test]
    fn test_quoted_cells() {
        let csv = NaiveCsv::open("title,artist\n\"Hello, World\",\"say \"\"hi\"\"\"\n").unwrap();
        let rows = csv.rows().unwrap();
        assert_eq!(rows[0].cell(0).unwrap(), "Hello, World");
        assert_eq!(rows[0].cell(1).unwrap(), "say \"hi\"");
    }

    #[test]
    fn test_inconsistent_row_is_rejected() {
        let err = NaiveCsv::open("a,b,c\n1,2,3\n1,2\n").unwrap().rows().unwrap_err();
        assert_eq!(err.status.as_u16(), 400);
        assert!(err.message.contains("Line 3 has 2 cells, but the header has 3"));
    }

    #[test]
    fn test_unterminated_quote() {
        let err = NaiveCsv::open("a,b\n\"oops,2\n").unwrap().rows().unwrap_err();
        assert!(err.message.contains("unterminated"));
    }

    #[test]
    fn test_empty_csv() {
        assert!(NaiveCsv::open("\n\n").is_err());
        assert!(NaiveCsv::decode(&[0xff, 0xfe, 0x00]).is_err());
    }

    #[test]
    fn test_cell_out_of_shape_is_internal() {
        let rows = NaiveCsv::open("a\n1\n").unwrap().rows().unwrap();
        let err = rows[0].cell(5).unwrap_err();
        assert_eq!(err.status.as_u16(), 500);
    }
}
