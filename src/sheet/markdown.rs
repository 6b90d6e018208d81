//! Markdown pipe-table rendering.

use std::fmt::Write;

use super::SheetRow;
use crate::address::MarkerScheme;

/// Render rows as a Markdown table, header first.
///
/// Pipes in cells are escaped and line breaks become `<br>`.
pub fn render_markdown<T: SheetRow>(rows: &[T], scheme: MarkerScheme) -> String {
    let header = T::header();
    let mut out = String::new();

    push_line(&mut out, header.iter().map(|h| h.to_string()));
    push_line(&mut out, header.iter().map(|_| "---".to_string()));
    for row in rows {
        push_line(
            &mut out,
            row.cells(scheme).iter().map(|cell| escape(&cell.to_string())),
        );
    }
    out
}

fn push_line(out: &mut String, cells: impl Iterator<Item = String>) {
    out.push('|');
    for cell in cells {
        // Writing to a String cannot fail.
        let _ = write!(out, " {} |", cell);
    }
    out.push('\n');
}

fn escape(cell: &str) -> String {
    cell.replace('|', "\\|")
        .replace("\r\n", "<br>")
        .replace('\n', "<br>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Address;
    use crate::row::{EnrichedRow, Row};
    use crate::value::Scalar;

    #[test]
    fn test_render_base_rows() {
        let rows = vec![
            Row::nested(Address::root(1), "system"),
            Row::scalar(
                Address::root(1).child(crate::address::Segment::ordinal(1)),
                "type",
                Scalar::string("a|b"),
            ),
        ];
        let table = render_markdown(&rows, MarkerScheme::Indexed);
        assert_eq!(
            table,
            "| Number | Key | Value |\n\
             | --- | --- | --- |\n\
             | 1 | system | <nested> |\n\
             | 1.1 | type | a\\|b |\n"
        );
    }

    #[test]
    fn test_render_enriched_line_breaks() {
        let rows = vec![EnrichedRow::new(
            Row::scalar(Address::root(1), "note", Scalar::Int(3)),
            None,
            Some("first\nsecond".into()),
        )];
        let table = render_markdown(&rows, MarkerScheme::Indexed);
        assert!(table.ends_with("| 1 | note | 3 |  | first<br>second |\n"));
    }

    #[test]
    fn test_render_empty() {
        let table = render_markdown::<Row>(&[], MarkerScheme::Letters);
        assert_eq!(table.lines().count(), 2);
    }
}
