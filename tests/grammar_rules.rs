// tests/grammar_rules.rs
use symbios_roads::{Action, DrawingRule, ExpansionRule, GeneratorError, Grammar, spell};

fn derived(grammar: &Grammar, axiom: &str, iterations: usize) -> String {
    spell(&grammar.derive(axiom, iterations).unwrap())
}

#[test]
fn test_standard_rewrite_is_simultaneous() {
    let grammar = Grammar::standard().unwrap();

    assert_eq!(derived(&grammar, "H", 0), "H");
    assert_eq!(derived(&grammar, "H", 1), "hhhhEH");
    assert_eq!(derived(&grammar, "H", 2), "hhhh[nF][sF]hhhhEH");
}

#[test]
fn test_unmatched_symbols_pass_through() {
    let grammar = Grammar::standard().unwrap();
    assert_eq!(derived(&grammar, "xHy", 1), "xhhhhEHy");
    assert_eq!(derived(&grammar, "hns", 2), "hns");
}

#[test]
fn test_rule_lookups() {
    let rule = ExpansionRule::new('A', "AB");
    assert_eq!(rule.apply('A'), Some("AB"));
    assert_eq!(rule.apply('B'), None);

    let draw = DrawingRule::new('f', Action::RoadForward);
    assert_eq!(draw.action('f'), Some(Action::RoadForward));
    assert_eq!(draw.action('g'), None);
}

#[test]
fn test_actions_resolve_by_id() {
    let grammar = Grammar::standard().unwrap();

    let push_id = grammar.symbol_id('[').unwrap();
    assert_eq!(grammar.action_for_id(push_id as usize), Some(Action::Push));

    let h_id = grammar.symbol_id('h').unwrap();
    assert_eq!(grammar.action_for_id(h_id as usize), Some(Action::Highway));

    // H only rewrites.
    let upper_h_id = grammar.symbol_id('H').unwrap();
    assert_eq!(grammar.action_for_id(upper_h_id as usize), None);
    assert_eq!(grammar.symbol_id('x'), None);
}

#[test]
fn test_derived_ids_map_to_actions() {
    let grammar = Grammar::standard().unwrap();
    let system = grammar.derive("E", 1).unwrap();

    let actions: Vec<Option<Action>> = (0..system.state.len())
        .filter_map(|i| system.state.get_view(i))
        .map(|view| grammar.action_for_id(view.sym as usize))
        .collect();

    assert_eq!(
        actions,
        vec![
            Some(Action::Push),
            Some(Action::ExitN),
            None,
            Some(Action::Pop),
            Some(Action::Push),
            Some(Action::ExitS),
            None,
            Some(Action::Pop),
        ]
    );
}

#[test]
fn test_symbols_new_to_the_axiom_carry_no_action() {
    let grammar = Grammar::standard().unwrap();
    let system = grammar.derive("hxf", 0).unwrap();

    assert_eq!(system.state.len(), 3);
    let x = system.state.get_view(1).unwrap();
    assert_eq!(grammar.action_for_id(x.sym as usize), None);
}

#[test]
fn test_invalid_symbols_are_rejected() {
    let grammar = Grammar::standard().unwrap();
    assert!(matches!(
        grammar.derive("h?f", 0),
        Err(GeneratorError::InvalidConfiguration(_))
    ));

    let result = Grammar::new(
        [ExpansionRule::new('A', "A{B")],
        [DrawingRule::new('A', Action::RoadForward)],
    );
    assert!(matches!(
        result,
        Err(GeneratorError::InvalidConfiguration(_))
    ));
}

#[test]
fn test_unbalanced_brackets_fail_to_rewrite() {
    let grammar = Grammar::standard().unwrap();
    assert!(grammar.derive("[h", 0).is_ok());
    assert!(matches!(
        grammar.derive("[h", 1),
        Err(GeneratorError::Derivation(_))
    ));
}

#[test]
fn test_grammar_without_drawing_rules_is_rejected() {
    let result = Grammar::new([ExpansionRule::new('A', "AA")], []);
    assert!(matches!(
        result,
        Err(GeneratorError::InvalidConfiguration(_))
    ));
}

#[test]
fn test_rules_load_from_json() {
    let rules: Vec<DrawingRule> = serde_json::from_str(
        r#"[{"symbol":"f","action":"RoadForward"},{"symbol":"[","action":"Push"}]"#,
    )
    .unwrap();
    let grammar = Grammar::new([], rules).unwrap();

    let f_id = grammar.symbol_id('f').unwrap();
    assert_eq!(grammar.action_for_id(f_id as usize), Some(Action::RoadForward));
    assert_eq!(grammar.drawing_rules().count(), 2);
    assert_eq!(grammar.expansion_rules().count(), 0);
}
