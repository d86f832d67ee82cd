use std::{borrow::Cow, collections::VecDeque, sync::Arc};

use tracing::{trace, warn};

use crate::{
    errors::errors::{Error, ErrorImpl},
    Position, Span, MK_TOKEN,
};

use super::{
    options::LexerOptions,
    rules::{Action, CompiledRule, Directive, RuleMatch, RuleTable, StateId},
    sophia,
    tokens::{Token, TokenKind},
};

/// Consecutive zero-width matches tolerated at one position before the
/// position is treated as unmatched.
const MAX_ZERO_WIDTH_STEPS: usize = 32;

/// A rule table paired with the options used to preprocess input.
#[derive(Debug, Clone)]
pub struct Lexer<'t> {
    table: &'t RuleTable,
    options: LexerOptions,
}

impl Lexer<'static> {
    pub fn sophia() -> Self {
        Lexer::new(sophia::table(), LexerOptions::default())
    }
}

impl Default for Lexer<'static> {
    fn default() -> Self {
        Lexer::sophia()
    }
}

impl<'t> Lexer<'t> {
    pub fn new(table: &'t RuleTable, options: LexerOptions) -> Self {
        Lexer { table, options }
    }

    pub fn with_options(self, options: LexerOptions) -> Self {
        Lexer { options, ..self }
    }

    pub fn options(&self) -> &LexerOptions {
        &self.options
    }

    pub fn table(&self) -> &'t RuleTable {
        self.table
    }

    /// Scans `source` after applying the lexer options. Token spans index
    /// into the preprocessed text, see [`LexerOptions::preprocess`].
    pub fn tokens<'a>(&self, source: &'a str) -> Tokens<'t, 'a> {
        Tokens::new(self.table, self.options.preprocess(source))
    }

    /// Scans `source` exactly as given.
    pub fn tokens_unprocessed<'a>(&self, source: &'a str) -> Tokens<'t, 'a> {
        Tokens::new(self.table, Cow::Borrowed(source))
    }

    /// Reports the first position no rule matched.
    pub fn check(&self, source: &str, file: Option<String>) -> Result<(), Error> {
        let file_name = Arc::new(file.unwrap_or_else(|| String::from("<stdin>")));

        match self
            .tokens_unprocessed(source)
            .find(|token| token.kind == TokenKind::Error)
        {
            Some(token) => Err(Error::new(
                ErrorImpl::UnmatchedInput { text: token.value },
                Position(token.span.start, file_name),
            )),
            None => Ok(()),
        }
    }
}

/// Lazy token stream over one text. Every call to [`Lexer::tokens`] starts
/// a fresh, independent scan.
#[derive(Debug, Clone)]
pub struct Tokens<'t, 'a> {
    table: &'t RuleTable,
    text: Cow<'a, str>,
    pos: usize,
    stack: Vec<StateId>,
    pending: VecDeque<Token>,
    zero_width_steps: usize,
}

impl<'t, 'a> Tokens<'t, 'a> {
    fn new(table: &'t RuleTable, text: Cow<'a, str>) -> Self {
        Tokens {
            table,
            text,
            pos: 0,
            stack: vec![table.root()],
            pending: VecDeque::new(),
            zero_width_steps: 0,
        }
    }

    /// The text being scanned.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn current_state(&self) -> &'t str {
        let id = self.stack.last().copied().unwrap_or(self.table.root());
        self.table.state(id).name
    }

    fn step(&mut self) {
        let table = self.table;
        let state = self.stack.last().copied().unwrap_or(table.root());

        if self.zero_width_steps > MAX_ZERO_WIDTH_STEPS {
            warn!(
                pos = self.pos,
                state = table.state(state).name,
                "zero-width rules stalled, skipping a character"
            );
            self.fallback();
            return;
        }

        let found = table
            .rules_of(state)
            .find_map(|rule| rule.match_at(&self.text, self.pos).map(|m| (rule, m)));

        match found {
            Some((rule, found)) => self.apply(rule, found),
            None => self.fallback(),
        }
    }

    fn apply(&mut self, rule: &CompiledRule, found: RuleMatch) {
        let start = self.pos;

        match &rule.action {
            Action::Token(kind) => self.emit(*kind, start, found.end),
            Action::ByGroups(kinds) => {
                let mut covered = start;
                for (kind, group) in kinds.iter().zip(&found.groups) {
                    if let Some((group_start, group_end)) = *group {
                        if group_start < covered {
                            continue;
                        }
                        self.emit(TokenKind::Text, covered, group_start);
                        self.emit(*kind, group_start, group_end);
                        covered = group_end;
                    }
                }
                self.emit(TokenKind::Text, covered, found.end);
            }
        }

        if found.end == start {
            self.zero_width_steps += 1;
        } else {
            self.zero_width_steps = 0;
        }
        self.pos = found.end;

        if let Some(directive) = rule.directive {
            self.transition(directive);
        }
    }

    fn transition(&mut self, directive: Directive<StateId>) {
        match directive {
            Directive::Push(id) => self.stack.push(id),
            Directive::Pop => {
                if self.stack.len() > 1 {
                    self.stack.pop();
                }
            }
            Directive::ReplaceTop(id) => {
                if self.stack.len() > 1 {
                    self.stack.pop();
                }
                self.stack.push(id);
            }
        }

        trace!(pos = self.pos, state = self.current_state(), depth = self.stack.len(), "transition");
    }

    /// No rule matched: a newline resets to the root state, anything else
    /// becomes a one-character error token.
    fn fallback(&mut self) {
        let Some(ch) = self.text[self.pos..].chars().next() else {
            return;
        };
        let start = self.pos;
        let end = start + ch.len_utf8();

        if ch == '\n' {
            self.stack.clear();
            self.stack.push(self.table.root());
            self.emit(TokenKind::Whitespace, start, end);
        } else {
            self.emit(TokenKind::Error, start, end);
        }

        self.pos = end;
        self.zero_width_steps = 0;
    }

    fn emit(&mut self, kind: TokenKind, start: usize, end: usize) {
        if start >= end {
            return;
        }

        self.pending.push_back(MK_TOKEN!(
            kind,
            self.text[start..end].to_string(),
            Span {
                start: start as u32,
                end: end as u32
            }
        ));
    }
}

impl Iterator for Tokens<'_, '_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(token);
            }
            if self.pos >= self.text.len() {
                return None;
            }
            self.step();
        }
    }
}

/// Scans Sophia source exactly as given.
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::sophia().tokens_unprocessed(source).collect()
}

/// Reports the first unmatched position in Sophia source.
pub fn check(source: &str, file: Option<String>) -> Result<(), Error> {
    Lexer::sophia().check(source, file)
}
