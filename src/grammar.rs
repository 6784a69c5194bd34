//! Rewriting and drawing tables for the road L-System.
//!
//! [`ExpansionRule`]s rewrite symbols into strings; [`DrawingRule`]s bind symbols to the
//! [`Action`]s the generator performs. A [`Grammar`] compiles the expansions into a
//! [`symbios::System`] and keeps a dense action table indexed by the system's symbol IDs,
//! so a derivation is interpreted straight off its [`SymbiosState`](symbios::SymbiosState).
//!
//! Symbols are single characters. Letters and the turtle punctuation
//! `+-/&^[]|\!$%~',@#;` are accepted; anything else is rejected when the grammar or the
//! axiom is compiled.

use crate::error::{GeneratorError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use symbios::System;

const PUNCTUATION: &str = "+-/&^[]|\\!$%~',@#;";

/// The closed set of drawing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Save the active turtle and continue with a clone (`[`).
    Push,
    /// Restore the most recently saved turtle (`]`).
    Pop,
    /// Lay a highway step, probing the population ahead (`h`).
    Highway,
    /// Turn north onto an off-ramp (`n`).
    ExitN,
    /// Turn south onto an off-ramp (`s`).
    ExitS,
    /// Turn left, then propose a road step (`l`).
    RoadLeft,
    /// Propose a road step straight ahead (`f`).
    RoadForward,
    /// Turn right, then propose a road step (`r`).
    RoadRight,
}

/// Rewrites one symbol into a replacement string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpansionRule {
    pub symbol: char,
    pub replacement: String,
}

impl ExpansionRule {
    pub fn new(symbol: char, replacement: &str) -> Self {
        Self {
            symbol,
            replacement: replacement.to_string(),
        }
    }

    /// The replacement for `symbol`, or `None` if this rule does not match it.
    pub fn apply(&self, symbol: char) -> Option<&str> {
        (symbol == self.symbol).then_some(self.replacement.as_str())
    }

    /// The rule in `symbios` production syntax, e.g. `H -> h h h h E H`.
    fn production(&self) -> Result<String> {
        let successors = module_list(&self.replacement)?;
        Ok(format!("{} -> {}", symbol_name(self.symbol)?, successors))
    }
}

/// Binds one symbol to a drawing [`Action`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawingRule {
    pub symbol: char,
    pub action: Action,
}

impl DrawingRule {
    pub fn new(symbol: char, action: Action) -> Self {
        Self { symbol, action }
    }

    pub fn action(&self, symbol: char) -> Option<Action> {
        (symbol == self.symbol).then_some(self.action)
    }
}

fn symbol_name(symbol: char) -> Result<String> {
    if symbol.is_alphabetic() || PUNCTUATION.contains(symbol) {
        Ok(symbol.to_string())
    } else {
        Err(GeneratorError::InvalidConfiguration(format!(
            "{symbol:?} is not a valid grammar symbol"
        )))
    }
}

/// Spells a symbol string as space-separated modules. Whitespace is skipped.
fn module_list(symbols: &str) -> Result<String> {
    let names = symbols
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(symbol_name)
        .collect::<Result<Vec<_>>>()?;
    Ok(names.join(" "))
}

/// Concatenates the symbols of a derived state back into a string.
pub fn spell(system: &System) -> String {
    (0..system.state.len())
        .filter_map(|i| system.state.get_view(i))
        .filter_map(|view| system.interner.resolve(view.sym))
        .collect()
}

/// Expansion and drawing tables for a road L-System.
pub struct Grammar {
    expansions: BTreeMap<char, ExpansionRule>,
    drawings: BTreeMap<char, DrawingRule>,
    /// Compiled expansions; never given an axiom itself, only cloned per derivation.
    system: System,
    /// Dense action table indexed by symbol ID.
    action_map: Vec<Option<Action>>,
}

impl Grammar {
    /// Builds a grammar from rule lists. Later rules for the same symbol replace earlier ones.
    ///
    /// Fails if there are no drawing rules, since nothing could ever be drawn, or if a
    /// rule mentions a character that cannot be a symbol.
    pub fn new(
        expansions: impl IntoIterator<Item = ExpansionRule>,
        drawings: impl IntoIterator<Item = DrawingRule>,
    ) -> Result<Self> {
        let expansions: BTreeMap<char, ExpansionRule> =
            expansions.into_iter().map(|r| (r.symbol, r)).collect();
        let drawings: BTreeMap<char, DrawingRule> =
            drawings.into_iter().map(|r| (r.symbol, r)).collect();

        if drawings.is_empty() {
            return Err(GeneratorError::InvalidConfiguration(
                "grammar has no drawing rules".into(),
            ));
        }

        let mut system = System::new();
        for rule in expansions.values() {
            system.add_rule(&rule.production()?)?;
        }

        let mut grammar = Self {
            expansions,
            drawings,
            system,
            action_map: Vec::new(),
        };

        let bindings: Vec<DrawingRule> = grammar.drawings.values().copied().collect();
        for rule in bindings {
            let id = grammar
                .system
                .interner
                .get_or_intern(&symbol_name(rule.symbol)?)
                .map_err(GeneratorError::Encoding)?;
            grammar.set_action(id, rule.action);
        }

        Ok(grammar)
    }

    /// The road grammar: highways shedding north/south exits that fan out into blocks.
    pub fn standard() -> Result<Self> {
        let blocks = "[llL][ffF][rrR]";
        let expansions = [
            ExpansionRule::new('H', "hhhhEH"),
            ExpansionRule::new('E', "[nF][sF]"),
            ExpansionRule::new('R', blocks),
            ExpansionRule::new('L', blocks),
            ExpansionRule::new('F', blocks),
        ];
        let drawings = [
            DrawingRule::new('h', Action::Highway),
            DrawingRule::new('n', Action::ExitN),
            DrawingRule::new('s', Action::ExitS),
            DrawingRule::new('l', Action::RoadLeft),
            DrawingRule::new('f', Action::RoadForward),
            DrawingRule::new('r', Action::RoadRight),
            DrawingRule::new('[', Action::Push),
            DrawingRule::new(']', Action::Pop),
        ];
        Self::new(expansions, drawings)
    }

    /// The interned ID of `symbol`, if the grammar mentions it.
    pub fn symbol_id(&self, symbol: char) -> Option<u16> {
        self.system.interner.resolve_id(&symbol_name(symbol).ok()?)
    }

    fn set_action(&mut self, id: u16, action: Action) {
        let idx = id as usize;
        if idx >= self.action_map.len() {
            self.action_map.resize(idx + 1, None);
        }
        self.action_map[idx] = Some(action);
    }

    pub fn expansion_rules(&self) -> impl Iterator<Item = &ExpansionRule> {
        self.expansions.values()
    }

    pub fn drawing_rules(&self) -> impl Iterator<Item = &DrawingRule> {
        self.drawings.values()
    }

    /// The drawing action bound to an interned symbol ID.
    pub fn action_for_id(&self, id: usize) -> Option<Action> {
        self.action_map.get(id).copied().flatten()
    }

    /// Rewrites `axiom` `iterations` times and returns the derived system.
    ///
    /// Passes are parallel: every module of the current state is replaced using the state
    /// as it stood at the start of the pass, and symbols without a rule are copied through.
    /// Symbols first seen in the axiom get fresh IDs with no action bound. Brackets must
    /// balance once rewriting runs.
    pub fn derive(&self, axiom: &str, iterations: usize) -> Result<System> {
        let mut system = self.system.clone();
        system.set_axiom(&module_list(axiom)?)?;
        system.derive(iterations)?;
        Ok(system)
    }
}
