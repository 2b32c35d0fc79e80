//! Distinguishes embedded JSON documents from plain strings.

use serde_json::Value;

/// How a literal is scanned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentClassification {
    /// Scanned verbatim.
    Plain,
    /// A JSON object, scanned in canonical form.
    Structured {
        /// Compact serialization with keys sorted at every level.
        canonical: String,
    },
}

impl DocumentClassification {
    /// Returns the text to scan for `original`.
    #[must_use]
    pub fn scan_text<'a>(&'a self, original: &'a str) -> &'a str {
        match self {
            Self::Plain => original,
            Self::Structured { canonical } => canonical,
        }
    }

    /// Returns true for JSON documents.
    #[must_use]
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Structured { .. })
    }
}

/// Classifies `value`.
///
/// Only JSON objects count as documents; arrays, scalars and malformed JSON
/// are plain strings.
#[must_use]
pub fn classify(value: &str) -> DocumentClassification {
    match serde_json::from_str::<Value>(value) {
        Ok(doc @ Value::Object(_)) => match serde_json::to_string(&doc) {
            Ok(canonical) => DocumentClassification::Structured { canonical },
            Err(_) => DocumentClassification::Plain,
        },
        _ => DocumentClassification::Plain,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_document_is_canonicalized() {
        let policy = r#"{
            "Version": "2012-10-17",
            "Statement": [{
                "Effect": "Allow",
                "Principal": { "AWS": "arn:aws:iam::123456789012:root" }
            }]
        }"#;
        let classified = classify(policy);
        assert_eq!(
            classified,
            DocumentClassification::Structured {
                canonical: r#"{"Statement":[{"Effect":"Allow","Principal":{"AWS":"arn:aws:iam::123456789012:root"}}],"Version":"2012-10-17"}"#.to_string()
            }
        );
        assert!(classified.scan_text(policy).starts_with("{\"Statement\""));
    }

    #[test]
    fn formatting_does_not_change_canonical_form() {
        let a = classify(r#"{"b": 1, "a": "us-east-1"}"#);
        let b = classify("{\n  \"a\":\"us-east-1\",\n  \"b\":1\n}");
        assert_eq!(a, b);
    }

    #[test]
    fn non_objects_are_plain() {
        for value in [
            "arn:aws:s3:::my-bucket/us-east-1/*",
            "[\"us-east-1\"]",
            "\"us-east-1\"",
            "42",
            "{\"Version\": ",
            "",
        ] {
            let classified = classify(value);
            assert_eq!(classified, DocumentClassification::Plain, "{value:?}");
            assert_eq!(classified.scan_text(value), value);
        }
    }
}
