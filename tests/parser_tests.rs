// tests/parser_tests.rs

use efilter::ast::{Expr, Params, Path, Query, TokenKind};
use efilter::error::ParseError;
use efilter::value::Value;

fn parse(source: &str) -> Expr {
    Query::parse(source)
        .unwrap_or_else(|e| panic!("failed to parse {source:?}: {e}"))
        .into_root()
}

fn parse_err(source: &str) -> ParseError {
    match Query::parse(source) {
        Ok(query) => panic!("expected {source:?} to fail, got `{query}`"),
        Err(e) => e,
    }
}

fn var(path: &str) -> Expr {
    Expr::binding(path)
}

fn lit(value: impl Into<Value>) -> Expr {
    Expr::literal(value)
}

// ============================================================================
// Literals and precedence
// ============================================================================

#[test]
fn test_literals() {
    assert_eq!(parse("5"), lit(5));
    assert_eq!(parse("'foo'"), lit("foo"));
    assert_eq!(parse("0x20"), lit(32));
    assert_eq!(parse("Process/pid"), var("Process/pid"));
}

#[test]
fn test_multiple_literals_fail() {
    let err = parse_err("5 5");
    assert_eq!(err.token().unwrap().kind, TokenKind::Literal(Value::Integer(5)));
    assert_eq!(err.token().unwrap().position, 2);
}

#[test]
fn test_arithmetic_precedence() {
    assert_eq!(parse("5 + 5 * 10"), Expr::sum(lit(5), Expr::product(lit(5), lit(10))));
    assert_eq!(parse("(5 + 5) * 10"), Expr::product(Expr::sum(lit(5), lit(5)), lit(10)));
    assert_eq!(
        parse("10 - 4 - 2"),
        Expr::difference(Expr::difference(lit(10), lit(4)), lit(2))
    );
    assert_eq!(
        parse("10 / 5 * 2"),
        Expr::product(Expr::quotient(lit(10), lit(5)), lit(2))
    );
}

#[test]
fn test_logical_precedence() {
    assert_eq!(
        parse("5 == 1 * 5 and Process/name is 'init'"),
        Expr::intersection(
            Expr::equivalence(lit(5), Expr::product(lit(1), lit(5))),
            Expr::equivalence(var("Process/name"), lit("init")),
        )
    );
    assert_eq!(
        parse("a or b and c"),
        Expr::union(var("a"), Expr::intersection(var("b"), var("c")))
    );
    assert_eq!(
        parse("not a and b"),
        Expr::intersection(Expr::complement(var("a")), var("b"))
    );
}

#[test]
fn test_prefix_minus() {
    assert_eq!(parse("-5"), Expr::product(lit(-1), lit(5)));
    assert_eq!(parse("-5 + 5"), Expr::sum(Expr::product(lit(-1), lit(5)), lit(5)));
    // Prefix minus binds looser than `*`
    assert_eq!(
        parse("-5 * 5"),
        Expr::product(lit(-1), Expr::product(lit(5), lit(5)))
    );
    assert_eq!(
        parse("-(5 + 5)"),
        Expr::product(lit(-1), Expr::sum(lit(5), lit(5)))
    );
    assert_eq!(
        parse("2 * -3"),
        Expr::product(lit(2), Expr::product(lit(-1), lit(3)))
    );
}

#[test]
fn test_parenthesized_negative_number() {
    assert_eq!(parse("(-5)"), lit(-5));
    assert_eq!(parse("(-2.5)"), lit(-2.5));
    assert_eq!(parse("pid == (-1)"), Expr::equivalence(var("pid"), lit(-1)));
    assert_eq!(parse("-(-5)"), Expr::product(lit(-1), lit(-5)));
    // Anything more than a bare number stays a negation
    assert_eq!(parse("(-(5))"), Expr::product(lit(-1), lit(5)));
    assert_eq!(parse("(-5 * 2)"), Expr::product(lit(-1), Expr::product(lit(5), lit(2))));
    assert_eq!(parse("(-5, 2)"), Expr::literal(vec![-5, 2]));
}

#[test]
fn test_nested_parens() {
    assert_eq!(parse("((((5))))"), lit(5));
    assert_eq!(
        parse("((5 + 1) * (2))"),
        Expr::product(Expr::sum(lit(5), lit(1)), lit(2))
    );
}

#[test]
fn test_missing_paren() {
    let err = parse_err("(5 + 5");
    assert!(err.token().is_none());

    let err = parse_err("(Process/pid == 1 name");
    assert_eq!(err.token().unwrap().kind, TokenKind::Identifier("name".to_string()));

    assert!(matches!(parse_err("5 + 5)"), ParseError::Syntax { .. }));
}

// ============================================================================
// Comparisons
// ============================================================================

#[test]
fn test_comparison_desugaring() {
    assert_eq!(
        parse("Process/pid is not 1"),
        Expr::complement(Expr::equivalence(var("Process/pid"), lit(1)))
    );
    assert_eq!(parse("Process/pid != 1"), parse("Process/pid is not 1"));
    assert_eq!(parse("Process/pid == 1"), parse("Process/pid is 1"));
    assert_eq!(parse("pid > 1"), Expr::strict_order(var("pid"), lit(1)));
    assert_eq!(parse("pid >= 1"), Expr::partial_order(var("pid"), lit(1)));
    assert_eq!(parse("pid < 1"), Expr::strict_order(lit(1), var("pid")));
    assert_eq!(parse("pid <= 1"), Expr::partial_order(lit(1), var("pid")));
    assert_eq!(
        parse("name =~ 'ini.*'"),
        Expr::regex_filter(var("name"), lit("ini.*"))
    );
}

#[test]
fn test_membership() {
    assert_eq!(
        parse("Process/command not in ('launchd', 'foo')"),
        Expr::complement(Expr::membership(
            var("Process/command"),
            lit(vec!["launchd", "foo"])
        ))
    );
    assert_eq!(
        parse("'init' in Process/command"),
        Expr::membership(lit("init"), var("Process/command"))
    );
}

#[test]
fn test_comparisons_do_not_chain() {
    assert!(parse_err("1 < 2 < 3").to_string().contains("chained"));
    assert!(matches!(parse_err("a == b == c"), ParseError::Syntax { .. }));
}

#[test]
fn test_arithmetic_binds_tighter_than_comparison() {
    assert_eq!(
        parse("pid + 1 > 2 * 3"),
        Expr::strict_order(
            Expr::sum(var("pid"), lit(1)),
            Expr::product(lit(2), lit(3))
        )
    );
}

// ============================================================================
// Lists
// ============================================================================

#[test]
fn test_lists() {
    assert_eq!(parse("()"), lit(Value::Array(vec![])));
    assert_eq!(parse("(1, 2, -3)"), lit(vec![1, 2, -3]));
    assert_eq!(parse("((1, 2))"), lit(vec![1, 2]));
    assert_eq!(
        parse("(1, 'a', (2.5, 3))"),
        lit(Value::Array(vec![
            Value::Integer(1),
            Value::from("a"),
            Value::Array(vec![Value::Float(2.5), Value::Integer(3)]),
        ]))
    );
}

#[test]
fn test_list_elements_must_be_constants() {
    let err = parse_err("(1, Process/pid)");
    assert_eq!(
        err.token().unwrap().kind,
        TokenKind::Identifier("Process/pid".to_string())
    );
    assert!(parse_err("(1, 2 + 3)").to_string().contains("literal"));
    assert!(matches!(parse_err("(1, 2"), ParseError::Syntax { token: None, .. }));
}

// ============================================================================
// Navigation and quantifiers
// ============================================================================

#[test]
fn test_let_single() {
    assert_eq!(
        parse("Process/parent matches (Process/command is 'init')"),
        Expr::let_in(
            var("Process/parent"),
            Expr::equivalence(var("Process/command"), lit("init"))
        )
    );
    assert_eq!(
        parse("Process/parent -> Process/pid"),
        Expr::let_in(var("Process/parent"), var("Process/pid"))
    );
}

#[test]
fn test_let_body_extent() {
    // The body reaches over a comparison but stops at `and`
    assert_eq!(
        parse("Process/parent -> Process/pid == 1 and Process/pid == 2"),
        Expr::intersection(
            Expr::let_in(
                var("Process/parent"),
                Expr::equivalence(var("Process/pid"), lit(1))
            ),
            Expr::equivalence(var("Process/pid"), lit(2)),
        )
    );
    assert_eq!(
        parse("Process/parent -> (Process/pid == 1 and Process/pid == 2)"),
        Expr::let_in(
            var("Process/parent"),
            Expr::intersection(
                Expr::equivalence(var("Process/pid"), lit(1)),
                Expr::equivalence(var("Process/pid"), lit(2)),
            )
        )
    );
}

#[test]
fn test_let_nested() {
    assert_eq!(
        parse("Process/parent -> Process/parent -> Process/pid"),
        Expr::let_in(
            var("Process/parent"),
            Expr::let_in(var("Process/parent"), var("Process/pid"))
        )
    );
}

#[test]
fn test_where_is_matches() {
    assert_eq!(
        parse("Process/parent where Process/pid == 1"),
        parse("Process/parent matches Process/pid == 1")
    );
}

#[test]
fn test_quantifiers() {
    assert_eq!(
        parse("any Process/children matches (Process/command is 'foo')"),
        Expr::let_any(
            var("Process/children"),
            Expr::equivalence(var("Process/command"), lit("foo"))
        )
    );
    assert_eq!(
        parse("each Process/children -> Process/pid > 1"),
        Expr::let_each(
            var("Process/children"),
            Expr::strict_order(var("Process/pid"), lit(1))
        )
    );
}

#[test]
fn test_loose_quantifier_fails() {
    assert!(matches!(parse_err("any Process/pid"), ParseError::Syntax { token: None, .. }));
    assert!(parse_err("any Process/pid == 1").to_string().contains("matches"));
    assert!(parse_err("any 5 matches Process/pid").to_string().contains("field path"));
    assert!(matches!(parse_err("each"), ParseError::Syntax { token: None, .. }));
}

#[test]
fn test_navigation_needs_binding() {
    assert!(parse_err("5 matches Process/pid").to_string().contains("field path"));
    assert!(matches!(parse_err("(Process/parent) -> pid"), ParseError::Syntax { .. }));
}

#[test]
fn test_big_query() {
    let query = "(Process/pid is 1 and Process/command in ('init', 'initd')) \
                 or any Process/children matches (Process/command not in ('launchd', 'foo'))";
    assert_eq!(
        parse(query),
        Expr::union(
            Expr::intersection(
                Expr::equivalence(var("Process/pid"), lit(1)),
                Expr::membership(var("Process/command"), lit(vec!["init", "initd"])),
            ),
            Expr::let_any(
                var("Process/children"),
                Expr::complement(Expr::membership(
                    var("Process/command"),
                    lit(vec!["launchd", "foo"])
                )),
            ),
        )
    );
}

// ============================================================================
// Components and types
// ============================================================================

#[test]
fn test_has_component() {
    assert_eq!(parse("has component Timestamps"), Expr::component("Timestamps"));
    assert_eq!(
        parse("Process/parent matches has component Timestamps"),
        Expr::let_in(var("Process/parent"), Expr::component("Timestamps"))
    );
    assert!(parse_err("has Timestamps").to_string().contains("component"));
    assert!(parse_err("has component 5").to_string().contains("component name"));
}

#[test]
fn test_isa() {
    assert_eq!(
        parse("Process/parent isa Process"),
        Expr::is_instance(var("Process/parent"), "Process")
    );
    assert_eq!(
        parse("isa Process"),
        Expr::is_instance(Expr::Binding(Path::current()), "Process")
    );
    assert_eq!(
        parse("any Process/children matches isa Process"),
        Expr::let_any(
            var("Process/children"),
            Expr::is_instance(Expr::Binding(Path::current()), "Process")
        )
    );
    assert!(parse_err("pid isa 5").to_string().contains("type name"));
}

// ============================================================================
// Template parameters
// ============================================================================

#[test]
fn test_positional_params() {
    let params = Params::Positional(vec![Value::Integer(1), Value::from("init")]);
    let query = Query::parse_with_params("Process/pid == {} and Process/name == {}", params).unwrap();
    assert_eq!(
        query,
        Query::parse("Process/pid == 1 and Process/name == 'init'").unwrap()
    );
}

#[test]
fn test_params_match_literal_query() {
    let literal = Query::parse("Process/pid == 1").unwrap();
    let positional = Query::parse_with_params("Process/pid == {}", Params::positional([1])).unwrap();
    let named = Query::parse_with_params("Process/pid == {pid}", Params::named([("pid", 1)])).unwrap();
    assert_eq!(positional, literal);
    assert_eq!(named, literal);
}

#[test]
fn test_named_params() {
    let params = Params::named([("pid", Value::Integer(1)), ("names", Value::from(vec!["a", "b"]))]);
    let query = Query::parse_with_params("pid == {pid} or name in {names} or ppid == {pid}", params)
        .unwrap();
    assert_eq!(
        query,
        Query::parse("pid == 1 or name in ('a', 'b') or ppid == 1").unwrap()
    );
}

#[test]
fn test_params_in_lists() {
    let params = Params::positional([2, 3]);
    let query = Query::parse_with_params("pid in (1, {}, {})", params).unwrap();
    assert_eq!(query.into_root(), Expr::membership(var("pid"), lit(vec![1, 2, 3])));
}

#[test]
fn test_param_failures() {
    let fails = |source: &str, params: Params| {
        Query::parse_with_params(source, params).expect_err(source)
    };

    // No params at all
    assert!(Query::parse("pid == {}").is_err());
    // Too few and too many
    fails("pid == {} or pid == {}", Params::positional([1]));
    fails("pid == {}", Params::positional([1, 2]));
    // Unknown and unused names
    fails("pid == {pid}", Params::named([("ppid", 1)]));
    let err = fails("pid == {pid}", Params::named([("pid", 1), ("extra", 2)]));
    assert!(err.to_string().contains("extra"));
    // Placeholder style must match the params
    fails("pid == {pid}", Params::positional([1]));
    fails("pid == {}", Params::named([("pid", 1)]));
}

#[test]
fn test_params_never_replace_bindings() {
    let params = Params::positional(["Process/pid"]);
    let err = Query::parse_with_params("any {} matches pid == 1", params).unwrap_err();
    assert_eq!(err.token().unwrap().kind, TokenKind::Param(None));

    let params = Params::named([("pid", "Process/pid")]);
    assert!(Query::parse_with_params("{pid} matches pid == 1", params).is_err());

    // A string param is a string, even if it looks like a path
    let params = Params::positional(["Process/pid"]);
    let query = Query::parse_with_params("{} == 1", params).unwrap();
    assert_eq!(query.into_root(), Expr::equivalence(lit("Process/pid"), lit(1)));
}

// ============================================================================
// Display
// ============================================================================

#[test]
fn test_display_reparses() {
    let queries = [
        "(Process/pid is 1 and Process/command in ('init', 'initd')) or any Process/children matches (Process/command not in ('launchd', 'foo'))",
        "Process/parent -> (Process/pid >= 2.5)",
        "each Process/children matches isa Process",
        "not (a or b)",
        "(1 + 2) * pid / 4 =~ 'x'",
        "has component Timestamps and pid < 10",
        "-5 + 5",
        "-5 * 5",
        "-(5 + 5)",
        "2 * -3",
        "(-pid) * 2",
        "(-(5)) / 2",
        "5 - -2.5",
        "-(-5)",
        "pid in (-1, 2)",
    ];

    for source in queries {
        let query = Query::parse(source).unwrap();
        let reparsed: Query = query.to_string().parse().unwrap();
        assert_eq!(query, reparsed, "Display of {source:?} was `{query}`");
    }

    let templated = [
        ("pid == {}", Params::positional([-1])),
        ("pid > {} * 2", Params::positional([-3])),
        ("{} == pid", Params::positional([-0.5])),
    ];
    for (source, params) in templated {
        let query = Query::parse_with_params(source, params).unwrap();
        let reparsed: Query = query.to_string().parse().unwrap();
        assert_eq!(query, reparsed, "Display of {source:?} was `{query}`");
    }
}
