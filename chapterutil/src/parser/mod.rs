//! CSV codec with encoding and delimiter auto-detection.
//!
//! Reads spreadsheet exports into a [`Table`] and writes tables back out.
//! No level-specific logic here.

use crate::error::{ConvertError, ConvertResult, TableFormatError, TableResult};
use crate::logs::log_warning;
use crate::models::{Row, Table};

/// Delimiter written by [`write_table`] unless told otherwise.
pub const DEFAULT_DELIMITER: char = ',';

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub table: Table,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    if std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }

    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding.
///
/// Fails on an unknown encoding label or on bytes the encoding cannot
/// represent, so no replacement characters reach the table. A leading byte
/// order mark is dropped.
pub fn decode_content(bytes: &[u8], encoding: &str) -> TableResult<String> {
    let label = match encoding.trim().to_lowercase().as_str() {
        // encoding_rs reads latin1 as windows-1252, a superset of ISO-8859-1
        "iso-8859-1" | "latin-1" | "latin1" => "windows-1252".to_string(),
        other => other.to_string(),
    };
    let codec = encoding_rs::Encoding::for_label(label.as_bytes())
        .ok_or_else(|| TableFormatError::new(0, format!("Unknown encoding '{}'", encoding)))?;

    let (content, had_errors) = codec.decode_without_bom_handling(bytes);
    if had_errors {
        let message = format!("File is not valid {} text", codec.name());
        return Err(TableFormatError::new(0, message));
    }

    Ok(match content.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => content.into_owned(),
    })
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = DEFAULT_DELIMITER;
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

fn delimiter_byte(delimiter: char) -> TableResult<u8> {
    if delimiter.is_ascii() {
        Ok(delimiter as u8)
    } else {
        Err(TableFormatError::new(
            0,
            format!("Delimiter must be a single ASCII character, got '{}'", delimiter),
        ))
    }
}

/// Parse CSV text with an explicit delimiter.
///
/// Rows shorter than the header lack the trailing columns. Non-empty cells
/// past the last header are ignored with a warning. Blank lines are not
/// rows, but a line of empty cells is.
///
/// # Example
/// ```ignore
/// use chapterutil::parser::read_table_str;
///
/// let table = read_table_str("board,goal\n[],\"[\"\"star\"\"]\"", ',').unwrap();
/// assert_eq!(table.rows[0].get("goal"), Some("[\"star\"]"));
/// ```
pub fn read_table_str(content: &str, delimiter: char) -> TableResult<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter_byte(delimiter)?)
        .flexible(true)
        .has_headers(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| csv_error(e, 1))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(TableFormatError::new(1, "Empty CSV file"));
    }

    let mut table = Table::new(headers);

    for (idx, record) in reader.records().enumerate() {
        let fallback_line = idx + 2; // +1 for 0-index, +1 for header
        let record = record.map_err(|e| csv_error(e, fallback_line))?;

        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(fallback_line);

        let columns = table.headers.len();
        if record.iter().skip(columns).any(|cell| !cell.trim().is_empty()) {
            log_warning(format!(
                "Line {}: {} cells for {} columns, extra cells ignored",
                line,
                record.len(),
                columns
            ));
        }

        let mut row = Row::new(line);
        for (header, cell) in table.headers.iter().zip(record.iter()) {
            if !header.is_empty() {
                row.insert(header.as_str(), cell);
            }
        }
        table.push(row);
    }

    Ok(table)
}

fn csv_error(err: csv::Error, fallback_line: usize) -> TableFormatError {
    let line = err
        .position()
        .map(|p| p.line() as usize)
        .unwrap_or(fallback_line);
    TableFormatError::new(line, format!("Invalid CSV: {}", err))
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> TableResult<ParseResult> {
    parse_bytes_with(bytes, true, None)
}

/// Parse CSV bytes, detecting only what is not given.
///
/// Without `detect_encoding` the bytes are read as UTF-8. Without a
/// `delimiter` it is guessed from the header line.
pub fn parse_bytes_with(
    bytes: &[u8],
    detect_encoding: bool,
    delimiter: Option<char>,
) -> TableResult<ParseResult> {
    let encoding = if detect_encoding {
        self::detect_encoding(bytes)
    } else {
        "utf-8".to_string()
    };
    let content = decode_content(bytes, &encoding)?;
    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(&content));
    let table = read_table_str(&content, delimiter)?;

    Ok(ParseResult {
        table,
        encoding,
        delimiter,
    })
}

/// Render a table as CSV text: header first, then one record per row in
/// header order. Cells are quoted only when needed.
pub fn write_table(table: &Table, delimiter: char) -> ConvertResult<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter_byte(delimiter)?)
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());

    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(table.headers.iter().map(|h| row.get(h).unwrap_or("")))?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes)
        .map_err(|e| ConvertError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_csv() {
        let table = read_table_str("board,goal\n[],[1]\n[2],[3]", ',').unwrap();

        assert_eq!(table.headers, vec!["board", "goal"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0].get("board"), Some("[]"));
        assert_eq!(table.rows[1].get("goal"), Some("[3]"));
    }

    #[test]
    fn test_quoted_values() {
        let csv = "board,textgoal\n\"[1, 2, \"\"x\"\"]\",\"Hello, world\"";
        let table = read_table_str(csv, ',').unwrap();

        assert_eq!(table.rows[0].get("board"), Some(r#"[1, 2, "x"]"#));
        assert_eq!(table.rows[0].get("textgoal"), Some("Hello, world"));
    }

    #[test]
    fn test_multiline_cell() {
        let csv = "textgoal,board\n\"line one\nline two\",[]\n";
        let table = read_table_str(csv, ',').unwrap();
        assert_eq!(table.rows[0].get("textgoal"), Some("line one\nline two"));
    }

    #[test]
    fn test_empty_cell_rows_kept() {
        let table = read_table_str("a,b\n1,2\n\n,\n3,4\n", ',').unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.rows[1].get("a"), Some(""));
        assert_eq!(table.rows[1].get("b"), Some(""));
        assert_eq!(table.rows[2].get("a"), Some("3"));
    }

    #[test]
    fn test_short_row_lacks_trailing_columns() {
        let table = read_table_str("a,b,c\n1,2", ',').unwrap();

        assert_eq!(table.rows[0].get("a"), Some("1"));
        assert_eq!(table.rows[0].get("b"), Some("2"));
        assert_eq!(table.rows[0].get("c"), None);
    }

    #[test]
    fn test_row_line_numbers() {
        let table = read_table_str("a\n1\n\"x\ny\"\n3", ',').unwrap();
        let lines: Vec<usize> = table.rows.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![2, 3, 5]);
    }

    #[test]
    fn test_empty_csv_error() {
        let err = read_table_str("", ',').unwrap_err();
        assert!(err.message.contains("Empty"));
    }

    #[test]
    fn test_non_ascii_delimiter_rejected() {
        assert!(read_table_str("a\n1", '§').is_err());
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
        assert_eq!(detect_delimiter("a|b|c\n1|2|3"), '|');
        assert_eq!(detect_delimiter("board"), ',');
    }

    #[test]
    fn test_auto_parse_semicolon() {
        let result = parse_bytes_auto("board;goal\n[];[1]".as_bytes()).unwrap();

        assert_eq!(result.delimiter, ';');
        assert_eq!(result.encoding, "utf-8");
        assert_eq!(result.table.rows[0].get("goal"), Some("[1]"));
    }

    #[test]
    fn test_explicit_delimiter_wins() {
        let result = parse_bytes_with("a;b,c\n1;2,3".as_bytes(), false, Some(',')).unwrap();
        assert_eq!(result.delimiter, ',');
        assert_eq!(result.table.headers, vec!["a;b", "c"]);
    }

    #[test]
    fn test_bom_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"board,goal\n[],[1]");
        let result = parse_bytes_auto(&bytes).unwrap();
        assert_eq!(result.table.headers[0], "board");
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        assert_eq!(decode_content(bytes, "iso-8859-1").unwrap(), "Société");

        // 0xA4 and 0xBD differ between ISO-8859-1 and ISO-8859-15
        let bytes = b"Price: 5\xA4 \xBD";
        assert_eq!(decode_content(bytes, "iso-8859-1").unwrap(), "Price: 5¤ ½");
        assert_eq!(decode_content(bytes, "latin1").unwrap(), "Price: 5¤ ½");
    }

    #[test]
    fn test_cyrillic_decoding() {
        // "Привет мир" in windows-1251
        let bytes: &[u8] = &[0xCF, 0xF0, 0xE8, 0xE2, 0xE5, 0xF2, 0x20, 0xEC, 0xE8, 0xF0];
        assert_eq!(decode_content(bytes, "windows-1251").unwrap(), "Привет мир");
        assert_eq!(decode_content(bytes, "WINDOWS-1251").unwrap(), "Привет мир");
    }

    #[test]
    fn test_unknown_encoding_rejected() {
        let err = decode_content(b"board", "klingon-8").unwrap_err();
        assert!(err.message.contains("klingon-8"));
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let bytes: &[u8] = b"board,textgoal\n[],caf\xE9\n";

        assert!(decode_content(bytes, "utf-8").is_err());
        let err = parse_bytes_with(bytes, false, None).unwrap_err();
        assert!(err.message.contains("UTF-8"));
    }

    #[test]
    fn test_extra_cells_warned_not_fatal() {
        let table = read_table_str("a,b\n1,2,overflow\n3,4,\n", ',').unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0].get("b"), Some("2"));
        assert_eq!(table.rows[1].len(), 2);
    }

    #[test]
    fn test_write_table_quotes_when_needed() {
        let mut table = Table::new(vec!["board".into(), "textgoal".into()]);
        table.push(Row::new(0).with("board", "[1, 2]").with("textgoal", "plain"));
        table.push(Row::new(0).with("board", r#"["a"]"#));

        let csv = write_table(&table, ',').unwrap();
        assert_eq!(
            csv,
            "board,textgoal\r\n\"[1, 2]\",plain\r\n\"[\"\"a\"\"]\",\r\n"
        );
    }

    #[test]
    fn test_write_then_read() {
        let mut table = Table::new(vec!["a".into(), "b".into()]);
        table.push(Row::new(0).with("a", "x;y").with("b", "line\nbreak"));

        let csv = write_table(&table, ';').unwrap();
        let back = read_table_str(&csv, ';').unwrap();
        assert_eq!(back.rows[0].get("a"), Some("x;y"));
        assert_eq!(back.rows[0].get("b"), Some("line\nbreak"));
    }
}
