//! Parser integration tests.
//!
//! Drives the public entry points end to end: scripts, modules, parameter
//! lists, function bodies, recovery and lazy reparsing.

use bumpalo::Bump;
use esfront_ast::visitor::{self, collect_functions};
use esfront_ast::*;
use esfront_core::Source;
use esfront_parser::{parse_options_json, parse_script, ParseOutcome, Parser, ParserOptions, ReparsedFunction};

fn es6() -> ParserOptions {
    ParserOptions {
        es6: true,
        ..Default::default()
    }
}

/// Helper: parse and return the codes of all recovered errors.
fn error_codes(text: &str, options: ParserOptions) -> Vec<u32> {
    let arena = Bump::new();
    let source = Source::new("test.js", text);
    let outcome = parse_script(&arena, &source, options).unwrap();
    outcome.diagnostics.diagnostics().iter().map(|d| d.code).collect()
}

fn parse_ok(text: &str, options: ParserOptions) {
    let codes = error_codes(text, options);
    assert!(codes.is_empty(), "source: {} errors: {:?}", text, codes);
}

fn parse<'a>(arena: &'a Bump, source: &'a Source, options: ParserOptions) -> ParseOutcome<'a> {
    parse_script(arena, source, options).unwrap()
}

// ============================================================================
// Statements
// ============================================================================

#[test]
fn test_parse_every_statement_form() {
    let text = r#"
        var a = 1, b;
        ;
        a = b;
        if (a) b(); else { c(); }
        while (a) { a--; }
        do a++; while (a < 10);
        for (var i = 0; i < 3; i++) {}
        for (k in o) {}
        l: for (;;) { continue l; }
        switch (a) { case 1: break; default: }
        try { throw new Error("x"); } catch (e) {} finally {}
        with (o) { p = 1; }
        debugger;
        function f() { return 1; }
    "#;
    parse_ok(text, ParserOptions::default());
}

#[test]
fn test_statement_count_after_asi() {
    let arena = Bump::new();
    let source = Source::new("test.js", "a\n++b\nc = d\n(e)");
    let outcome = parse(&arena, &source, ParserOptions::default());
    assert!(!outcome.has_errors());
    // `d\n(e)` is a call, `a\n++b` is two statements
    assert_eq!(outcome.program.body.statements.len(), 3);
}

#[test]
fn test_es6_declarations() {
    parse_ok("let a = 1; const b = 2; { let c; }", es6());
    parse_ok("for (let i = 0; i < 3; i++) {}", es6());
    parse_ok("for (const x of [1, 2]) {}", es6());
    parse_ok("function* g() { yield 1; yield* g(); }", es6());
    parse_ok("f = (a, b) => a + b;", es6());
    parse_ok("o = { a, b() {}, *c() {} };", es6());
    parse_ok("t = `a${b}c${d}`;", es6());
}

// ============================================================================
// Strict mode
// ============================================================================

#[test]
fn test_use_strict_applies_to_function_name_and_parameters() {
    assert_eq!(error_codes("function eval() { 'use strict'; }", ParserOptions::default()), vec![1200]);
    assert_eq!(error_codes("function f(arguments) { 'use strict'; }", ParserOptions::default()), vec![1200]);
    parse_ok("function eval() {}", ParserOptions::default());
}

#[test]
fn test_use_strict_rechecks_earlier_directives() {
    assert_eq!(
        error_codes("function f() { '\\07'; 'use strict'; }", ParserOptions::default()),
        vec![1203]
    );
}

#[test]
fn test_strict_option_and_inheritance() {
    let strict = ParserOptions {
        strict: true,
        ..Default::default()
    };
    assert_eq!(error_codes("with (a) {}", strict), vec![1202]);
    assert_eq!(error_codes("'use strict'; function f() { var eval; }", ParserOptions::default()), vec![1200]);
    parse_ok("function f() { 'use strict'; } var eval, interface;", ParserOptions::default());
}

#[test]
fn test_strict_flag_lands_on_function() {
    let arena = Bump::new();
    let source = Source::new("test.js", "function f() { 'use strict'; }\nfunction g() {}");
    let outcome = parse(&arena, &source, ParserOptions::default());
    let functions = collect_functions(outcome.program);
    let f = functions.iter().find(|f| f.name == "f").unwrap();
    let g = functions.iter().find(|f| f.name == "g").unwrap();
    assert!(f.is_strict());
    assert!(!g.is_strict());
    assert!(!outcome.program.is_strict());
}

// ============================================================================
// Recovery
// ============================================================================

#[test]
fn test_top_level_errors_are_recovered() {
    let arena = Bump::new();
    let source = Source::new("test.js", "a = ;\nbreak;\nb = 1;\nreturn;\n");
    let outcome = parse(&arena, &source, ParserOptions::default());
    let codes: Vec<u32> = outcome.diagnostics.diagnostics().iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![1102, 1108, 1110]);
    let statements = outcome.program.body.statements;
    assert_eq!(statements.len(), 4);
    assert_eq!(statements.iter().filter(|s| s.is_error()).count(), 3);
}

#[test]
fn test_error_in_nested_function_drops_the_whole_statement() {
    let arena = Bump::new();
    let source = Source::new("test.js", "function f() { if ( }\nok();\n");
    let outcome = parse(&arena, &source, ParserOptions::default());
    assert_eq!(outcome.diagnostics.error_count(), 1);
    assert!(collect_functions(outcome.program).iter().all(|f| f.is_program()));
    let last = outcome.program.body.statements.last().unwrap();
    assert!(!last.is_error());
}

#[test]
fn test_error_inside_a_nested_construct_unwinds_cleanly() {
    assert_eq!(error_codes("for (;;) (function(){ x = ; })();\nok;", ParserOptions::default()), vec![1102]);
    assert_eq!(error_codes("L: { (function(){ break L; })(); }\nok;", ParserOptions::default()), vec![1106]);
    assert_eq!(
        error_codes("switch (a) { case 1: o = { get p() { x = ; } }; }\nok;", ParserOptions::default()),
        vec![1102]
    );
    assert_eq!(error_codes("try { while (a) { x => ; } } finally {}\nok;", es6()), vec![1102]);
}

#[test]
fn test_recovery_skips_the_blocks_a_statement_opened() {
    for text in [
        "while (a) { x = ; }\nok;",
        "switch (a) { case 1: { x = ; } }\nok;",
        "function f() { if (a) { x = ; } y(); }\nok;",
        "if (a) { b; } else { x = ; }; ok;",
    ] {
        let arena = Bump::new();
        let source = Source::new("test.js", text);
        let outcome = parse(&arena, &source, ParserOptions::default());
        let codes: Vec<u32> = outcome.diagnostics.diagnostics().iter().map(|d| d.code).collect();
        assert_eq!(codes, vec![1102], "source: {}", text);
        let last = outcome.program.body.statements.last().unwrap();
        assert!(!last.is_error(), "source: {}", text);
    }
}

#[test]
fn test_lexical_errors_are_recovered() {
    let arena = Bump::new();
    let source = Source::new("test.js", "var x = 1a;\nvar y = ;\nz = );\nok;");
    let outcome = parse(&arena, &source, ParserOptions::default());
    let codes: Vec<u32> = outcome.diagnostics.diagnostics().iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![1004, 1102, 1102]);
    assert!(!outcome.program.body.statements.last().unwrap().is_error());

    let codes = error_codes("a = 'abc\nvar y = ;\nok;", ParserOptions::default());
    assert_eq!(codes, vec![1001, 1102]);
}

#[test]
fn test_overlong_literal_is_reported_and_skipped() {
    let text = format!("x = '{}';\nok;", "a".repeat(esfront_lexer::MAX_TOKEN_LENGTH as usize));
    assert_eq!(error_codes(&text, ParserOptions::default()), vec![1010]);
}

#[test]
fn test_unclosed_comment_ends_the_parse() {
    let arena = Bump::new();
    let source = Source::new("test.js", "a = ;\nb;\n/* never closed");
    let error = parse_script(&arena, &source, ParserOptions::default()).unwrap_err();
    assert_eq!(error.code, 1003);
}

#[test]
fn test_error_location() {
    let arena = Bump::new();
    let source = Source::new("test.js", "a = 1;\nb = 2 3;\n");
    let outcome = parse(&arena, &source, ParserOptions::default());
    let diagnostic = &outcome.diagnostics.diagnostics()[0];
    assert_eq!(diagnostic.location.as_ref().map(|location| location.line), Some(2));
    assert_eq!(diagnostic.code, 1100);
}

// ============================================================================
// Other entry points
// ============================================================================

#[test]
fn test_parse_formal_parameter_list() {
    let arena = Bump::new();
    let source = Source::new("params.js", "a, b, c");
    let mut parser = Parser::new(&arena, &source, ParserOptions::default());
    let parameters = parser.parse_formal_parameter_list().unwrap();
    let names: Vec<&str> = parameters.iter().map(|p| p.name).collect();
    assert_eq!(names, vec!["a", "b", "c"]);

    let source = Source::new("params.js", "a, b) {");
    let mut parser = Parser::new(&arena, &source, ParserOptions::default());
    assert!(parser.parse_formal_parameter_list().is_err());
}

#[test]
fn test_parse_function_body() {
    let arena = Bump::new();
    let source = Source::new("body.js", "var x = arguments[0];\nreturn x + 1;");
    let mut parser = Parser::new(&arena, &source, ParserOptions::default());
    let function = parser.parse_function_body().unwrap();
    assert!(function.is_anonymous());
    assert!(function.flags.contains(FunctionFlags::USES_ARGUMENTS));
    assert_eq!(function.body.statements.len(), 2);

    let source = Source::new("body.js", "return 1; }");
    let mut parser = Parser::new(&arena, &source, ParserOptions::default());
    assert!(parser.parse_function_body().is_err());
}

#[test]
fn test_parse_module_entry_point() {
    let arena = Bump::new();
    let source = Source::new("main.js", "import { a } from 'lib';\nexport default a;\n");
    let mut parser = Parser::new(&arena, &source, es6());
    let program = parser.parse_module("main").unwrap();
    let module = program.module.unwrap();
    assert_eq!(module.imports.len(), 1);
    assert_eq!(module.exports.len(), 1);
    assert!(parser.diagnostics().is_empty());
}

// ============================================================================
// Lazy reparse
// ============================================================================

#[test]
fn test_lazy_reparse_skips_sibling_bodies() {
    let text = "function a() { var x = 1; return x; }\n\
                function b() { eval('1'); }\n\
                function c() { return this; }\n";
    let source = Source::new("lazy.js", text);
    let options = ParserOptions {
        lazy_compilation: true,
        ..Default::default()
    };

    let first_arena = Bump::new();
    let first = parse(&first_arena, &source, options);
    assert!(!first.has_errors());
    let functions = collect_functions(first.program);
    let a_id = functions.iter().find(|f| f.name == "a").unwrap().id;
    assert_eq!(first.recorded.len(), 4);

    let target = ReparsedFunction::from_recorded(&first.recorded, a_id).unwrap();
    let arena = Bump::new();
    let mut parser = Parser::new(&arena, &source, options);
    parser.set_reparsed_function(target, first.recorded.clone());
    let program = parser.parse().unwrap();
    assert!(parser.diagnostics().is_empty());

    let functions = collect_functions(program);
    let a = functions.iter().find(|f| f.name == "a").unwrap();
    let b = functions.iter().find(|f| f.name == "b").unwrap();
    let c = functions.iter().find(|f| f.name == "c").unwrap();
    assert_eq!(a.body.statements.len(), 2);
    assert!(b.body.is_empty());
    assert!(c.body.is_empty());
    // flags computed by the full parse survive the skip
    assert!(b.flags.contains(FunctionFlags::HAS_EVAL));
    assert!(c.flags.contains(FunctionFlags::USES_THIS));
    assert!(program.flags.contains(FunctionFlags::HAS_NESTED_EVAL));
    assert_eq!(b.end_parser_state, functions_end(&first, "b"));
}

#[test]
fn test_lazy_reparse_matches_the_full_parse_of_the_target() {
    let filler: String = (0..120).map(|i| format!("  v{} = v{} + {};\n", i, i, i)).collect();
    let text = format!(
        "function before() {{\n{}  function inner() {{ return 1; }}\n}}\n\
         function target(p, q) {{\n\
           var r = p * q;\n\
           if (r > 10) {{ return function(x) {{ return x + r; }}; }}\n\
           L: for (var i in q) {{ if (i) continue L; }}\n\
           return r;\n\
         }}\n\
         function after() {{\n{}}}\n",
        filler, filler
    );
    let source = Source::new("lazy.js", &text);
    let options = ParserOptions {
        lazy_compilation: true,
        ..Default::default()
    };

    let full_arena = Bump::new();
    let full = parse(&full_arena, &source, options);
    assert!(!full.has_errors());
    let full_target = *collect_functions(full.program).iter().find(|f| f.name == "target").unwrap();

    let target = ReparsedFunction::from_recorded(&full.recorded, full_target.id).unwrap();
    let arena = Bump::new();
    let mut parser = Parser::new(&arena, &source, options);
    parser.set_reparsed_function(target, full.recorded.clone());
    let program = parser.parse().unwrap();
    assert!(parser.diagnostics().is_empty());

    let lazy_target = visitor::find_function(program, full_target.id).unwrap();
    assert_eq!(format!("{:?}", lazy_target), format!("{:?}", full_target));
    let functions = collect_functions(program);
    for skipped in ["before", "after"] {
        assert!(functions.iter().find(|f| f.name == skipped).unwrap().body.is_empty());
    }
}

fn functions_end(outcome: &ParseOutcome<'_>, name: &str) -> Option<ParserState> {
    collect_functions(outcome.program)
        .into_iter()
        .find(|f| f.name == name)
        .and_then(|f| f.end_parser_state)
}

// ============================================================================
// Options
// ============================================================================

#[test]
fn test_options_file_drives_the_dialect() {
    let file = parse_options_json(r#"{ "es6": true, "scripting": false }"#).unwrap();
    let options = file.resolve();
    assert!(options.es6);
    parse_ok("let a = 1;", options);
    assert_eq!(error_codes("const a;", options), vec![1120]);
}
