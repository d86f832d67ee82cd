use std::borrow::Cow;

use crate::{
    errors::errors::{Error, ErrorImpl},
    Position,
};

/// Input preprocessing shared by every lexer the host drives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerOptions {
    /// Strip leading and trailing newlines.
    pub stripnl: bool,
    /// Strip all leading and trailing whitespace. Wins over `stripnl`.
    pub stripall: bool,
    /// Make sure the text ends with a newline.
    pub ensurenl: bool,
    /// Expand tabs to this width when non-zero.
    pub tabsize: usize,
}

impl Default for LexerOptions {
    fn default() -> Self {
        LexerOptions {
            stripnl: true,
            stripall: false,
            ensurenl: true,
            tabsize: 0,
        }
    }
}

impl LexerOptions {
    /// Builds options from `name=value` pairs, starting from the defaults.
    /// Names that are not lexer options are ignored.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut options = LexerOptions::default();
        for (name, value) in pairs {
            options.set(name, value)?;
        }
        Ok(options)
    }

    pub fn set(&mut self, name: &str, value: &str) -> Result<(), Error> {
        match name {
            "stripnl" => self.stripnl = get_bool_opt(name, value)?,
            "stripall" => self.stripall = get_bool_opt(name, value)?,
            "ensurenl" => self.ensurenl = get_bool_opt(name, value)?,
            "tabsize" => self.tabsize = get_int_opt(name, value)?,
            _ => {}
        }
        Ok(())
    }

    /// Applies BOM removal, newline normalization, stripping, tab expansion
    /// and the trailing newline, in that order. Borrows when nothing changes.
    pub fn preprocess<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let mut text = Cow::Borrowed(text.strip_prefix('\u{feff}').unwrap_or(text));

        if text.contains('\r') {
            text = Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"));
        }

        text = if self.stripall {
            narrow(text, str::trim)
        } else if self.stripnl {
            narrow(text, |s| s.trim_matches('\n'))
        } else {
            text
        };

        if self.tabsize > 0 && text.contains('\t') {
            text = Cow::Owned(expand_tabs(&text, self.tabsize));
        }

        if self.ensurenl && !text.ends_with('\n') {
            text.to_mut().push('\n');
        }

        text
    }
}

fn narrow<'a>(text: Cow<'a, str>, f: impl Fn(&str) -> &str) -> Cow<'a, str> {
    match text {
        Cow::Borrowed(s) => Cow::Borrowed(f(s)),
        Cow::Owned(s) => Cow::Owned(f(&s).to_string()),
    }
}

fn expand_tabs(text: &str, tabsize: usize) -> String {
    let mut out = String::with_capacity(text.len());
    let mut column = 0;

    for ch in text.chars() {
        match ch {
            '\t' => {
                let width = tabsize - column % tabsize;
                out.extend(std::iter::repeat(' ').take(width));
                column += width;
            }
            '\n' | '\r' => {
                out.push(ch);
                column = 0;
            }
            _ => {
                out.push(ch);
                column += 1;
            }
        }
    }

    out
}

fn get_bool_opt(name: &str, value: &str) -> Result<bool, Error> {
    match value.to_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Ok(true),
        "0" | "no" | "false" | "off" => Ok(false),
        _ => Err(option_error(name, value, "one of 1/yes/true/on or 0/no/false/off")),
    }
}

fn get_int_opt(name: &str, value: &str) -> Result<usize, Error> {
    value
        .trim()
        .parse()
        .map_err(|_| option_error(name, value, "a non-negative integer"))
}

fn option_error(name: &str, value: &str, expected: &str) -> Error {
    Error::new(
        ErrorImpl::InvalidOption {
            name: name.to_string(),
            value: value.to_string(),
            expected: expected.to_string(),
        },
        Position::null(),
    )
}
