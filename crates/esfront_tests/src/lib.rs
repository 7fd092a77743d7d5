//! esfront_tests: Conformance framework for the esfront parser.
//!
//! A case is a snippet of source, the options to parse it with and the
//! expected outcome: a clean parse, or a specific first error code. Cases
//! are grouped into categories and the suite reports pass rates per
//! category.

use bumpalo::Bump;
use esfront_core::Source;
use esfront_parser::{parse_script, Parser, ParserOptions};
use rustc_hash::FxHashMap;

/// What a case is expected to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    Parses,
    /// The first reported error has this code.
    Fails(u32),
}

/// How a case source is handed to the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Goal {
    Script,
    Module,
}

/// Result of a single conformance case.
#[derive(Debug, Clone)]
pub struct CaseResult {
    pub name: String,
    pub category: String,
    pub passed: bool,
    /// What happened, for failing cases.
    pub detail: Option<String>,
}

/// Parse `text` and return the codes of all errors, the fatal one last.
pub fn error_codes(text: &str, options: ParserOptions, goal: Goal) -> Vec<u32> {
    let arena = Bump::new();
    let source = Source::new("conformance.js", text);
    match goal {
        Goal::Script => match parse_script(&arena, &source, options) {
            Ok(outcome) => outcome.diagnostics.diagnostics().iter().map(|d| d.code).collect(),
            Err(error) => vec![error.code],
        },
        Goal::Module => {
            let mut parser = Parser::new(&arena, &source, options);
            let result = parser.parse_module("conformance");
            let mut codes: Vec<u32> = parser.diagnostics().diagnostics().iter().map(|d| d.code).collect();
            if let Err(error) = result {
                codes.push(error.code);
            }
            codes
        }
    }
}

pub fn run_case(name: &str, category: &str, text: &str, options: ParserOptions, goal: Goal, expected: Expectation) -> CaseResult {
    let codes = error_codes(text, options, goal);
    let (passed, detail) = match (expected, codes.first()) {
        (Expectation::Parses, None) => (true, None),
        (Expectation::Parses, Some(_)) => (false, Some(format!("unexpected errors {:?}", codes))),
        (Expectation::Fails(code), Some(&first)) if first == code => (true, None),
        (Expectation::Fails(code), Some(_)) => (false, Some(format!("expected error {} but got {:?}", code, codes))),
        (Expectation::Fails(code), None) => (false, Some(format!("expected error {} but parsed cleanly", code))),
    };
    CaseResult {
        name: name.to_string(),
        category: category.to_string(),
        passed,
        detail,
    }
}

/// A collection of case results.
#[derive(Debug, Default)]
pub struct ConformanceSuite {
    results: Vec<CaseResult>,
}

impl ConformanceSuite {
    pub fn new() -> Self {
        Self::default()
    }

    /// A script case parsed with default options.
    pub fn add(&mut self, name: &str, category: &str, text: &str, expected: Expectation) {
        self.add_with(name, category, text, ParserOptions::default(), Goal::Script, expected);
    }

    pub fn add_with(
        &mut self,
        name: &str,
        category: &str,
        text: &str,
        options: ParserOptions,
        goal: Goal,
        expected: Expectation,
    ) {
        self.results.push(run_case(name, category, text, options, goal, expected));
    }

    pub fn results(&self) -> &[CaseResult] {
        &self.results
    }

    pub fn failures(&self) -> impl Iterator<Item = &CaseResult> {
        self.results.iter().filter(|result| !result.passed)
    }

    pub fn pass_rate(&self) -> f64 {
        if self.results.is_empty() {
            return 0.0;
        }
        let passed = self.results.iter().filter(|result| result.passed).count();
        passed as f64 / self.results.len() as f64 * 100.0
    }

    /// (category, passed, total), sorted by category.
    pub fn by_category(&self) -> Vec<(String, usize, usize)> {
        let mut categories: FxHashMap<&str, (usize, usize)> = FxHashMap::default();
        for result in &self.results {
            let entry = categories.entry(result.category.as_str()).or_insert((0, 0));
            if result.passed {
                entry.0 += 1;
            }
            entry.1 += 1;
        }
        let mut rows: Vec<_> = categories
            .into_iter()
            .map(|(category, (passed, total))| (category.to_string(), passed, total))
            .collect();
        rows.sort();
        rows
    }

    pub fn print_summary(&self) {
        let total = self.results.len();
        let failed = self.failures().count();
        println!("\n=== ECMAScript Conformance Summary ===");
        println!("Total cases: {}", total);
        println!("Passed: {}", total - failed);
        println!("Failed: {}", failed);
        println!("Pass rate: {:.2}%", self.pass_rate());

        println!("\n--- Results by Category ---");
        for (category, passed, total) in self.by_category() {
            println!("  {}: {}/{} ({:.2}%)", category, passed, total, passed as f64 / total as f64 * 100.0);
        }

        let failures: Vec<_> = self.failures().collect();
        if !failures.is_empty() {
            println!("\n--- Failed Cases ---");
            for failure in failures.iter().take(10) {
                println!(
                    "  [{}] {}: {}",
                    failure.category,
                    failure.name,
                    failure.detail.as_deref().unwrap_or("unknown")
                );
            }
            if failures.len() > 10 {
                println!("  ... and {} more failures", failures.len() - 10);
            }
        }
    }
}
