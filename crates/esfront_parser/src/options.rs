//! Parser options and their JSON file form.

use esfront_lexer::LexerOptions;
use serde::{Deserialize, Serialize};

/// Switches that select the language dialect and parsing mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParserOptions {
    /// Parse the program as strict mode code from the start.
    pub strict: bool,
    /// Shell-style syntax extensions.
    pub scripting: bool,
    pub es6: bool,
    pub pause_on_function_body: bool,
    /// Record function flags and end positions for later lazy reparsing.
    pub lazy_compilation: bool,
}

impl ParserOptions {
    pub fn lexer_options(&self, reparsing: bool) -> LexerOptions {
        LexerOptions {
            scripting: self.scripting,
            es6: self.es6,
            pause_on_function_body: self.pause_on_function_body || reparsing,
        }
    }
}

/// The options file: every field is optional and falls back to the default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParserOptionsFile {
    pub strict: Option<bool>,
    pub scripting: Option<bool>,
    pub es6: Option<bool>,
    pub pause_on_function_body: Option<bool>,
    pub lazy_compilation: Option<bool>,
}

impl ParserOptionsFile {
    /// Fill the unset fields from `other`.
    pub fn or(self, other: ParserOptionsFile) -> ParserOptionsFile {
        ParserOptionsFile {
            strict: self.strict.or(other.strict),
            scripting: self.scripting.or(other.scripting),
            es6: self.es6.or(other.es6),
            pause_on_function_body: self.pause_on_function_body.or(other.pause_on_function_body),
            lazy_compilation: self.lazy_compilation.or(other.lazy_compilation),
        }
    }

    pub fn resolve(&self) -> ParserOptions {
        ParserOptions {
            strict: self.strict.unwrap_or(false),
            scripting: self.scripting.unwrap_or(false),
            es6: self.es6.unwrap_or(false),
            pause_on_function_body: self.pause_on_function_body.unwrap_or(false),
            lazy_compilation: self.lazy_compilation.unwrap_or(false),
        }
    }
}

/// Parse an options file from a string.
pub fn parse_options_json(content: &str) -> Result<ParserOptionsFile, serde_json::Error> {
    serde_json::from_str(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options_json_camel_case() {
        let file = parse_options_json(r#"{ "es6": true, "lazyCompilation": true }"#).unwrap();
        assert_eq!(file.es6, Some(true));
        assert_eq!(file.lazy_compilation, Some(true));
        assert_eq!(file.strict, None);

        let options = file.resolve();
        assert!(options.es6);
        assert!(options.lazy_compilation);
        assert!(!options.strict);
        assert!(!options.scripting);
    }

    #[test]
    fn test_flags_win_over_file() {
        let file = parse_options_json(r#"{ "strict": false, "scripting": true }"#).unwrap();
        let flags = ParserOptionsFile {
            strict: Some(true),
            ..Default::default()
        };
        let options = flags.or(file).resolve();
        assert!(options.strict);
        assert!(options.scripting);
    }

    #[test]
    fn test_unknown_field_is_ignored_and_bad_type_rejected() {
        assert!(parse_options_json(r#"{ "other": 1 }"#).is_ok());
        assert!(parse_options_json(r#"{ "es6": "yes" }"#).is_err());
    }

    #[test]
    fn test_reparsing_pauses_on_function_body() {
        let options = ParserOptions::default();
        assert!(!options.lexer_options(false).pause_on_function_body);
        assert!(options.lexer_options(true).pause_on_function_body);
    }
}
