//! Parser for skill lists stored as bracketed, quoted string literals.
//!
//! Accepted shape: `['python', "sql", 'c\'s']` with optional whitespace and an
//! optional trailing comma. Anything else is rejected as a whole.

use std::iter::Peekable;
use std::str::CharIndices;
use thiserror::Error;

/// Failure to read a skill list; the row is left out of skill statistics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkillListError {
    #[error("skill list is empty text")]
    Empty,

    #[error("expected {expected} at byte {position}")]
    Unexpected {
        expected: &'static str,
        position: usize,
    },

    #[error("unterminated string starting at byte {0}")]
    UnterminatedString(usize),

    #[error("unexpected trailing text at byte {0}")]
    TrailingText(usize),
}

struct ListParser<'a> {
    text: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> ListParser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            chars: text.char_indices().peekable(),
        }
    }

    fn position(&mut self) -> usize {
        self.chars.peek().map_or(self.text.len(), |(i, _)| *i)
    }

    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
    }

    fn expect(&mut self, wanted: char, expected: &'static str) -> Result<(), SkillListError> {
        let position = self.position();
        match self.chars.next() {
            Some((_, c)) if c == wanted => Ok(()),
            _ => Err(SkillListError::Unexpected { expected, position }),
        }
    }

    fn string(&mut self) -> Result<String, SkillListError> {
        let start = self.position();
        let quote = match self.chars.next() {
            Some((_, q @ ('\'' | '"'))) => q,
            _ => {
                return Err(SkillListError::Unexpected {
                    expected: "quoted string",
                    position: start,
                });
            }
        };

        let mut value = String::new();
        loop {
            match self.chars.next() {
                None => return Err(SkillListError::UnterminatedString(start)),
                Some((_, c)) if c == quote => return Ok(value),
                Some((_, '\\')) => match self.chars.next() {
                    None => return Err(SkillListError::UnterminatedString(start)),
                    Some((_, 'n')) => value.push('\n'),
                    Some((_, 't')) => value.push('\t'),
                    Some((_, c @ ('\\' | '\'' | '"'))) => value.push(c),
                    Some((_, c)) => {
                        value.push('\\');
                        value.push(c);
                    }
                },
                Some((_, c)) => value.push(c),
            }
        }
    }

    fn list(&mut self) -> Result<Vec<String>, SkillListError> {
        self.skip_whitespace();
        self.expect('[', "'['")?;

        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            if self.chars.next_if(|(_, c)| *c == ']').is_some() {
                break;
            }

            items.push(self.string()?);

            self.skip_whitespace();
            let position = self.position();
            match self.chars.next() {
                Some((_, ',')) => continue,
                Some((_, ']')) => break,
                _ => {
                    return Err(SkillListError::Unexpected {
                        expected: "',' or ']'",
                        position,
                    });
                }
            }
        }

        self.skip_whitespace();
        match self.chars.peek() {
            None => Ok(items),
            Some((i, _)) => Err(SkillListError::TrailingText(*i)),
        }
    }
}

/// Parse a skill list literal into its raw (unnormalized) items.
pub fn parse_skill_list(text: &str) -> Result<Vec<String>, SkillListError> {
    if text.trim().is_empty() {
        return Err(SkillListError::Empty);
    }
    ListParser::new(text).list()
}

/// Normalize a skill name: trimmed and lower-cased; blank names are dropped.
pub fn normalize_skill(skill: &str) -> Option<String> {
    let skill = skill.trim().to_lowercase();
    (!skill.is_empty()).then_some(skill)
}
