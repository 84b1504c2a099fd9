//! ARFF serialization

use super::value::{ArffDocument, AttributeKind};
use std::fmt;

/// Quote a token when it would not survive a round trip unquoted.
pub(crate) fn quote(token: &str) -> String {
    let needs_quotes = token.is_empty()
        || token == "?"
        || token
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, ',' | '\'' | '"' | '%' | '{' | '}' | '\\'));
    if needs_quotes {
        format!("'{}'", token.replace('\\', "\\\\").replace('\'', "\\'"))
    } else {
        token.to_string()
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric => write!(f, "NUMERIC"),
            Self::Integer => write!(f, "INTEGER"),
            Self::Real => write!(f, "REAL"),
            Self::String => write!(f, "STRING"),
            Self::Nominal(values) => {
                let quoted: Vec<String> = values.iter().map(|v| quote(v)).collect();
                write!(f, "{{{}}}", quoted.join(","))
            }
        }
    }
}

impl fmt::Display for ArffDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "@RELATION {}", quote(&self.relation))?;
        writeln!(f)?;
        for attribute in &self.attributes {
            writeln!(f, "@ATTRIBUTE {} {}", quote(&attribute.name), attribute.kind)?;
        }
        writeln!(f)?;
        writeln!(f, "@DATA")?;
        for row in &self.data {
            let cells: Vec<String> = row.iter().map(ToString::to_string).collect();
            writeln!(f, "{}", cells.join(","))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arff::{ArffValue, parse};

    #[test]
    fn test_quote_only_when_needed() {
        assert_eq!(quote("Iris-setosa"), "Iris-setosa");
        assert_eq!(quote("confidence.Iris setosa"), "'confidence.Iris setosa'");
        assert_eq!(quote("it's"), "'it\\'s'");
    }

    #[test]
    fn test_written_document_parses_back() {
        let mut doc = ArffDocument::new("predictions")
            .with_attribute("repeat", AttributeKind::Integer)
            .with_attribute("confidence.a b", AttributeKind::Numeric)
            .with_attribute("prediction", AttributeKind::Nominal(vec!["a b".into(), "c".into()]));
        doc.data.push(vec![
            ArffValue::from(0usize),
            ArffValue::from(0.25),
            ArffValue::from("a b"),
        ]);

        let text = doc.to_string();
        assert!(text.starts_with("@RELATION predictions"));
        assert!(text.contains("@ATTRIBUTE prediction {'a b',c}"));

        let parsed = parse(&text).unwrap();
        assert_eq!(parsed.data[0][0], ArffValue::Integer(0));
        assert_eq!(parsed.data[0][1], ArffValue::Real(0.25));
        assert_eq!(parsed.data[0][2].as_str(), Some("a b"));
    }
}
