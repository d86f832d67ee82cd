use std::collections::HashMap;

use regex_automata::{meta::Regex, Anchored, Input};
use tracing::debug;

use crate::{
    errors::errors::{Error, ErrorImpl},
    Position,
};

use super::tokens::TokenKind;

/// Flags applied to every pattern: `.` matches newlines, `^`/`$` match at
/// line boundaries. Unicode classes are on by default.
const PATTERN_FLAGS: &str = "(?sm)";

pub type StateId = usize;

/// A state stack transition. `S` is a state name while defining a table and
/// a resolved [`StateId`] once compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive<S> {
    Push(S),
    /// Pops the top state, never the last one.
    Pop,
    /// Pops (keeping the last state) and then pushes.
    ReplaceTop(S),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Token(TokenKind),
    /// One kind per capture group, in group order.
    ByGroups(Vec<TokenKind>),
}

#[derive(Debug, Clone)]
pub enum RuleDef {
    Rule {
        pattern: &'static str,
        lookahead: Option<&'static str>,
        action: Action,
        directive: Option<Directive<&'static str>>,
    },
    /// Splices another state's rules in at this point.
    Include(&'static str),
    /// Always matches, consumes nothing, only transitions.
    Default(Directive<&'static str>),
}

impl RuleDef {
    pub fn new(pattern: &'static str, kind: TokenKind) -> Self {
        RuleDef::Rule {
            pattern,
            lookahead: None,
            action: Action::Token(kind),
            directive: None,
        }
    }

    pub fn by_groups(pattern: &'static str, kinds: Vec<TokenKind>) -> Self {
        RuleDef::Rule {
            pattern,
            lookahead: None,
            action: Action::ByGroups(kinds),
            directive: None,
        }
    }

    /// Requires `lookahead` to match right after the rule's match without
    /// consuming it.
    pub fn followed_by(self, lookahead: &'static str) -> Self {
        match self {
            RuleDef::Rule {
                pattern,
                action,
                directive,
                ..
            } => RuleDef::Rule {
                pattern,
                lookahead: Some(lookahead),
                action,
                directive,
            },
            other => other,
        }
    }

    pub fn then(self, directive: Directive<&'static str>) -> Self {
        match self {
            RuleDef::Rule {
                pattern,
                lookahead,
                action,
                ..
            } => RuleDef::Rule {
                pattern,
                lookahead,
                action,
                directive: Some(directive),
            },
            RuleDef::Default(_) => RuleDef::Default(directive),
            other => other,
        }
    }
}

pub type StateDef = (&'static str, Vec<RuleDef>);

#[derive(Debug)]
pub struct CompiledRule {
    regex: Regex,
    lookahead: Option<Regex>,
    pub action: Action,
    pub directive: Option<Directive<StateId>>,
    pub pattern: &'static str,
}

/// Spans of a successful rule match, in byte offsets of the whole text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch {
    pub end: usize,
    pub groups: Vec<Option<(usize, usize)>>,
}

impl CompiledRule {
    /// Matches anchored at `pos`. Assertions such as `^`, `\b` and `\A` see
    /// the text before `pos`.
    pub fn match_at(&self, text: &str, pos: usize) -> Option<RuleMatch> {
        let input = Input::new(text).range(pos..).anchored(Anchored::Yes);

        let found = match &self.action {
            Action::Token(_) => RuleMatch {
                end: self.regex.search(&input)?.end(),
                groups: vec![],
            },
            Action::ByGroups(kinds) => {
                let mut caps = self.regex.create_captures();
                self.regex.search_captures(&input, &mut caps);
                let end = caps.get_match()?.end();
                let groups = (1..=kinds.len())
                    .map(|i| caps.get_group(i).map(|span| (span.start, span.end)))
                    .collect();
                RuleMatch { end, groups }
            }
        };

        if let Some(lookahead) = &self.lookahead {
            let ahead = Input::new(text).range(found.end..).anchored(Anchored::Yes);
            if !lookahead.is_match(ahead) {
                return None;
            }
        }

        Some(found)
    }
}

#[derive(Debug)]
pub struct State {
    pub name: &'static str,
    /// Flattened rule ids, includes already expanded.
    pub rules: Vec<usize>,
}

/// An immutable, fully resolved set of scanning states.
#[derive(Debug)]
pub struct RuleTable {
    states: Vec<State>,
    rules: Vec<CompiledRule>,
    root: StateId,
}

enum Entry {
    Rule(usize),
    Include(StateId),
}

impl RuleTable {
    pub fn build(definitions: &[StateDef], root: &str) -> Result<RuleTable, Error> {
        let mut ids: HashMap<&'static str, StateId> = HashMap::new();
        for (id, (name, _)) in definitions.iter().enumerate() {
            if ids.insert(*name, id).is_some() {
                return Err(table_error(ErrorImpl::DuplicateState {
                    state: name.to_string(),
                }));
            }
        }

        let resolve = |name: &str| -> Result<StateId, Error> {
            ids.get(name).copied().ok_or_else(|| {
                table_error(ErrorImpl::UnknownState {
                    state: name.to_string(),
                })
            })
        };

        let root = resolve(root)?;
        let mut rules = vec![];
        let mut entries: Vec<Vec<Entry>> = vec![];

        for (name, defs) in definitions {
            let mut own = vec![];
            for def in defs {
                match def {
                    RuleDef::Include(other) => own.push(Entry::Include(resolve(*other)?)),
                    RuleDef::Rule {
                        pattern,
                        lookahead,
                        action,
                        directive,
                    } => {
                        rules.push(CompiledRule {
                            regex: compile(name, pattern)?,
                            lookahead: lookahead.map(|la| compile(name, la)).transpose()?,
                            action: action.clone(),
                            directive: directive.map(|d| resolve_directive(d, &resolve)).transpose()?,
                            pattern: *pattern,
                        });
                        own.push(Entry::Rule(rules.len() - 1));
                    }
                    RuleDef::Default(directive) => {
                        rules.push(CompiledRule {
                            regex: compile(name, "")?,
                            lookahead: None,
                            action: Action::Token(TokenKind::Text),
                            directive: Some(resolve_directive(*directive, &resolve)?),
                            pattern: "",
                        });
                        own.push(Entry::Rule(rules.len() - 1));
                    }
                }
            }
            entries.push(own);
        }

        let mut flattened: Vec<Option<Vec<usize>>> = vec![None; definitions.len()];
        for id in 0..definitions.len() {
            flatten(id, &entries, definitions, &mut flattened, &mut vec![])?;
        }

        let states: Vec<State> = definitions
            .iter()
            .zip(flattened)
            .map(|((name, _), rules)| State {
                name: *name,
                rules: rules.unwrap_or_default(),
            })
            .collect();

        debug!(
            states = states.len(),
            rules = rules.len(),
            root = states[root].name,
            "built rule table"
        );

        Ok(RuleTable {
            states,
            rules,
            root,
        })
    }

    pub fn root(&self) -> StateId {
        self.root
    }

    pub fn state(&self, id: StateId) -> &State {
        &self.states[id]
    }

    pub fn state_id(&self, name: &str) -> Option<StateId> {
        self.states.iter().position(|state| state.name == name)
    }

    pub fn states(&self) -> impl Iterator<Item = &State> {
        self.states.iter()
    }

    pub fn rule(&self, id: usize) -> &CompiledRule {
        &self.rules[id]
    }

    /// The rules tried, in order, while `id` is the current state.
    pub fn rules_of(&self, id: StateId) -> impl Iterator<Item = &CompiledRule> {
        self.states[id].rules.iter().map(|&rule| &self.rules[rule])
    }
}

fn flatten(
    id: StateId,
    entries: &[Vec<Entry>],
    definitions: &[StateDef],
    done: &mut Vec<Option<Vec<usize>>>,
    visiting: &mut Vec<StateId>,
) -> Result<Vec<usize>, Error> {
    if let Some(rules) = &done[id] {
        return Ok(rules.clone());
    }
    if visiting.contains(&id) {
        return Err(table_error(ErrorImpl::IncludeCycle {
            state: definitions[id].0.to_string(),
        }));
    }

    visiting.push(id);
    let mut rules = vec![];
    for entry in &entries[id] {
        match entry {
            Entry::Rule(rule) => rules.push(*rule),
            Entry::Include(other) => {
                rules.extend(flatten(*other, entries, definitions, done, visiting)?)
            }
        }
    }
    visiting.pop();

    done[id] = Some(rules.clone());
    Ok(rules)
}

fn compile(state: &str, pattern: &str) -> Result<Regex, Error> {
    Regex::new(&format!("{}{}", PATTERN_FLAGS, pattern)).map_err(|err| {
        table_error(ErrorImpl::InvalidPattern {
            state: state.to_string(),
            pattern: pattern.to_string(),
            message: err.to_string(),
        })
    })
}

fn resolve_directive(
    directive: Directive<&'static str>,
    resolve: &impl Fn(&str) -> Result<StateId, Error>,
) -> Result<Directive<StateId>, Error> {
    Ok(match directive {
        Directive::Push(name) => Directive::Push(resolve(name)?),
        Directive::Pop => Directive::Pop,
        Directive::ReplaceTop(name) => Directive::ReplaceTop(resolve(name)?),
    })
}

fn table_error(error: ErrorImpl) -> Error {
    Error::new(error, Position::null())
}
