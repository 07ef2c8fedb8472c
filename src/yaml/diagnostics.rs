//! YAML error diagnostics for catalog and job files

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// YAML syntax or shape error with source location
#[derive(Debug, Error, Diagnostic)]
#[error("invalid YAML: {message}")]
#[diagnostic(code(cabest::yaml::syntax))]
pub struct YamlSyntaxError {
    #[source_code]
    src: NamedSource<String>,

    #[label("error here")]
    span: SourceSpan,

    #[help]
    help: Option<String>,

    /// The underlying error message
    message: String,
}

impl YamlSyntaxError {
    /// Create a syntax error from a serde_yml error
    pub fn from_serde_error(err: &serde_yml::Error, source: &str, filename: &str) -> Self {
        let (line, column) = err
            .location()
            .map(|loc| (loc.line(), loc.column()))
            .unwrap_or((1, 1));

        let offset = line_col_to_offset(source, line, column);
        let message = err.to_string();
        let help = generate_help(&message);

        Self {
            src: NamedSource::new(filename, source.to_string()),
            span: SourceSpan::from(offset..offset.saturating_add(1)),
            help,
            message,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Convert 1-based line/column to a byte offset, clamped to the source
fn line_col_to_offset(source: &str, line: usize, column: usize) -> usize {
    let mut line_start = 0;
    for (n, text) in source.split_inclusive('\n').enumerate() {
        if n + 1 == line {
            let col = column.saturating_sub(1);
            return text
                .char_indices()
                .nth(col)
                .map(|(i, _)| line_start + i)
                .unwrap_or(line_start + text.len().saturating_sub(1));
        }
        line_start += text.len();
    }
    source.len().saturating_sub(1)
}

/// Suggest a fix for common mistakes in catalog files
fn generate_help(message: &str) -> Option<String> {
    let msg = message.to_lowercase();

    if msg.contains("tab") {
        return Some("YAML requires spaces for indentation, not tabs.".to_string());
    }

    if msg.contains("duplicate key") {
        return Some("Each key can only appear once. Remove or rename the duplicate key.".to_string());
    }

    if msg.contains("missing field `width_formula`") || msg.contains("missing field `height_formula`")
    {
        return Some(
            "Every part needs width_formula and height_formula, e.g. `width_formula: depth - 18`."
                .to_string(),
        );
    }

    if msg.contains("unit_scope") || msg.contains("unknown variant") {
        return Some(
            "unit_scope must be one of: per_cabinet, per_door, per_drawer, custom.".to_string(),
        );
    }

    if msg.contains("invalid type") && msg.contains("expected f64") {
        return Some("Rates, dimensions and densities must be plain numbers.".to_string());
    }

    if msg.contains("mapping values are not allowed") {
        return Some("You may be missing a space after ':' or have incorrect indentation.".to_string());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col_to_offset() {
        let source = "line1\nline2\nline3";
        assert_eq!(line_col_to_offset(source, 1, 1), 0);
        assert_eq!(line_col_to_offset(source, 2, 1), 6);
        assert_eq!(line_col_to_offset(source, 3, 3), 14);
        assert_eq!(line_col_to_offset(source, 9, 1), source.len() - 1);
    }

    #[test]
    fn test_help_generation() {
        assert!(generate_help("found tab character").is_some());
        assert!(generate_help("parts[0]: missing field `width_formula`").is_some());
        assert!(generate_help("unknown variant `per_shelf`").is_some());
        assert!(generate_help("some random error").is_none());
    }

    #[test]
    fn test_from_serde_error() {
        let source = "id: base\nname: [unclosed\n";
        let err = serde_yml::from_str::<serde_yml::Value>(source).unwrap_err();
        let diag = YamlSyntaxError::from_serde_error(&err, source, "base.yaml");
        assert!(!diag.message().is_empty());
    }
}
