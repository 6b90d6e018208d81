//! Splitting a row stream by top-level field.

use super::SheetRow;
use crate::address::Segment;

/// Rows belonging to one top-level field.
#[derive(Debug, Clone, PartialEq)]
pub struct Section<T> {
    /// Key of the top-level row
    pub name: String,
    pub rows: Vec<T>,
}

impl<T> Section<T> {
    /// The section name made safe for use in a file name.
    ///
    /// Path separators become `_` and square brackets become parentheses.
    pub fn file_name(&self) -> String {
        self.name
            .chars()
            .map(|c| match c {
                '/' | '\\' => '_',
                '[' => '(',
                ']' => ')',
                c => c,
            })
            .collect()
    }
}

/// Group rows by the first segment of their address, in order of first
/// appearance. Each section is named after its depth-1 row's key; a section
/// without one is named after its ordinal.
pub fn split_sections<T: SheetRow + Clone>(rows: &[T]) -> Vec<Section<T>> {
    let mut sections: Vec<(Segment, Section<T>)> = Vec::new();

    for row in rows {
        let first = row.address().first();
        let position = match sections.iter().position(|(s, _)| *s == first) {
            Some(position) => position,
            None => {
                let name = match first {
                    Segment::Ordinal(n) | Segment::Item(n) => n.to_string(),
                };
                sections.push((
                    first,
                    Section {
                        name,
                        rows: Vec::new(),
                    },
                ));
                sections.len() - 1
            }
        };
        let section = &mut sections[position].1;
        if row.address().depth() == 1 && !row.key().is_empty() {
            section.name = row.key().to_string();
        }
        section.rows.push(row.clone());
    }

    sections.into_iter().map(|(_, section)| section).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{flatten, CodecConfig};
    use crate::row::Row;
    use crate::value::Value;

    #[test]
    fn test_split_sections() {
        let tree = Value::object_from([
            (
                "system",
                Value::object_from([("type", Value::string("electrochemical"))]),
            ),
            ("version", Value::int(2)),
        ]);
        let rows = flatten(&tree, &CodecConfig::default()).unwrap();
        let sections = split_sections(&rows);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].name, "system");
        assert_eq!(sections[0].rows.len(), 2);
        assert_eq!(sections[1].name, "version");
        assert_eq!(sections[1].rows, vec![rows[2].clone()]);
    }

    #[test]
    fn test_file_name_is_sanitized() {
        let section = |name: &str| Section::<Row> {
            name: name.to_string(),
            rows: Vec::new(),
        };
        assert_eq!(section("I/V curve").file_name(), "I_V curve");
        assert_eq!(section(r"a\b").file_name(), "a_b");
        assert_eq!(section("data[0]").file_name(), "data(0)");
        assert_eq!(section("plain").file_name(), "plain");
    }

    #[test]
    fn test_section_without_header_row() {
        let rows = vec![Row::scalar(
            crate::address::Address::root(3).child(Segment::ordinal(1)),
            "orphan",
            crate::value::Scalar::Int(1),
        )];
        let sections = split_sections(&rows);
        assert_eq!(sections[0].name, "3");
    }
}
