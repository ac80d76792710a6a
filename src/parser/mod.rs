//! Textual order parsing.
//!
//! The grammar is the terse convention players type into a chat box:
//!
//! ```text
//! A PAR H                    hold
//! A PAR - BUR                move (also a retreat during retreat phases)
//! F MAO - SPA/SC             move naming a coast
//! A MAR S A PAR - BUR        support a move
//! A MAR S A PAR              support a hold
//! F ENG C A LON - BRE        convoy
//! A PAR D                    disband (retreat phase)
//! BUILD F STP/SC             build
//! DESTROY A PAR              adjustment disband
//! ```
//!
//! One string may carry many orders. Parsing proceeds left to right; a new
//! order begins at every `BUILD`/`DESTROY` keyword or unit reference
//! (`A <place>` / `F <place>`), and support and convoy bodies are consumed
//! through their final token before scanning resumes, so their embedded
//! unit references never start a fresh order.
//!
//! Syntax is checked here. Everything that needs a game snapshot (unit
//! existence, ownership, phase legality, reach) lives in [`validate`].

mod error;
mod validate;

pub use self::error::{OrderRejection, ParseError};
pub use self::validate::{Snapshot, ValidatedOrders};

use crate::geo::Location;
use crate::unit::UnitKind;

/// A syntactically well-formed order, not yet checked against any game.
/// The phase decides what a raw order means: `Move` is a movement order in
/// Movement and a retreat in Retreat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawOrder {
    Hold {
        kind: UnitKind,
        at: Location,
    },
    Move {
        kind: UnitKind,
        from: Location,
        to: Location,
    },
    SupportHold {
        kind: UnitKind,
        at: Location,
        target_kind: UnitKind,
        target: Location,
    },
    SupportMove {
        kind: UnitKind,
        at: Location,
        target_kind: UnitKind,
        from: Location,
        to: Location,
    },
    Convoy {
        kind: UnitKind,
        at: Location,
        cargo_kind: UnitKind,
        from: Location,
        to: Location,
    },
    Disband {
        kind: UnitKind,
        at: Location,
    },
    Build {
        kind: UnitKind,
        at: Location,
    },
    Destroy {
        kind: UnitKind,
        at: Location,
    },
}

/// One span of the input and what it parsed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSpan {
    pub text: String,
    pub result: Result<RawOrder, ParseError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Kind(UnitKind),
    Arrow,
    Hold,
    Support,
    Convoy,
    Disband,
    Build,
    Destroy,
    Word(&'a str),
}

impl<'a> Token<'a> {
    fn lex(word: &'a str) -> Self {
        match word.to_uppercase().as_str() {
            "A" | "ARMY" => Token::Kind(UnitKind::Army),
            "F" | "FLEET" => Token::Kind(UnitKind::Fleet),
            "-" | "->" | "TO" => Token::Arrow,
            "H" | "HOLD" | "HOLDS" => Token::Hold,
            "S" | "SUPPORT" | "SUPPORTS" => Token::Support,
            "C" | "CONVOY" | "CONVOYS" => Token::Convoy,
            "D" | "DISBAND" | "DISBANDS" => Token::Disband,
            "BUILD" => Token::Build,
            "DESTROY" | "REMOVE" => Token::Destroy,
            _ => Token::Word(word),
        }
    }

    /// Can this token begin a new order?
    fn starts_order(self, next: Option<Token<'a>>) -> bool {
        match self {
            Token::Build | Token::Destroy => true,
            Token::Kind(_) => matches!(next, Some(Token::Word(w)) if place(w).is_some()),
            _ => false,
        }
    }
}

/// A place token: a three-letter province code, optionally qualified with
/// a coast (`stp/nc`, `stp(nc)`).
fn place(word: &str) -> Option<Location> {
    let location: Location = word.to_lowercase().parse().ok()?;
    let code = location.province.as_str();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(location)
    } else {
        None
    }
}

/// Parse a string that may hold any number of orders.
pub fn parse_orders(text: &str) -> Vec<ParsedSpan> {
    let words: Vec<&str> = text
        .split_whitespace()
        .map(|w| w.trim_matches(|c| c == ',' || c == ';' || c == '.'))
        .filter(|w| !w.is_empty())
        .collect();
    let tokens: Vec<Token> = words.iter().map(|w| Token::lex(w)).collect();

    let mut spans = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let start = i;
        let result = parse_one(&tokens, &words, &mut i);

        if result.is_err() {
            // Resynchronize at the next order-start marker so one bad
            // order doesn't swallow the rest of the message.
            if i == start {
                i += 1;
            }
            while i < tokens.len() && !tokens[i].starts_order(tokens.get(i + 1).copied()) {
                i += 1;
            }
        }

        spans.push(ParsedSpan {
            text: words[start..i.min(words.len())].join(" "),
            result,
        });
    }

    if spans.is_empty() {
        spans.push(ParsedSpan {
            text: String::new(),
            result: Err(ParseError::Empty),
        });
    }

    spans
}

fn parse_one(tokens: &[Token], words: &[&str], i: &mut usize) -> Result<RawOrder, ParseError> {
    let near = |at: usize| words[at.min(words.len() - 1)].to_string();

    match tokens[*i] {
        Token::Build => {
            *i += 1;
            let (kind, at) = unit_ref(tokens, words, i)?;
            Ok(RawOrder::Build { kind, at })
        }
        Token::Destroy => {
            *i += 1;
            let (kind, at) = unit_ref(tokens, words, i)?;
            Ok(RawOrder::Destroy { kind, at })
        }
        Token::Kind(_) => {
            let (kind, at) = unit_ref(tokens, words, i)?;
            match tokens.get(*i) {
                None => Err(ParseError::MissingCommand(near(*i - 1))),
                Some(Token::Hold) => {
                    *i += 1;
                    Ok(RawOrder::Hold { kind, at })
                }
                Some(Token::Disband) => {
                    *i += 1;
                    Ok(RawOrder::Disband { kind, at })
                }
                Some(Token::Arrow) => {
                    *i += 1;
                    let to = place_ref(tokens, words, i)?;
                    Ok(RawOrder::Move { kind, from: at, to })
                }
                Some(Token::Support) => {
                    *i += 1;
                    let (target_kind, target) = unit_ref(tokens, words, i)?;
                    match tokens.get(*i) {
                        Some(Token::Arrow) => {
                            *i += 1;
                            let to = place_ref(tokens, words, i)?;
                            Ok(RawOrder::SupportMove {
                                kind,
                                at,
                                target_kind,
                                from: target,
                                to,
                            })
                        }
                        Some(Token::Hold) => {
                            *i += 1;
                            Ok(RawOrder::SupportHold {
                                kind,
                                at,
                                target_kind,
                                target,
                            })
                        }
                        _ => Ok(RawOrder::SupportHold {
                            kind,
                            at,
                            target_kind,
                            target,
                        }),
                    }
                }
                Some(Token::Convoy) => {
                    *i += 1;
                    let (cargo_kind, from) = unit_ref(tokens, words, i)
                        .map_err(|_| ParseError::MalformedConvoy(near(*i)))?;
                    match tokens.get(*i) {
                        Some(Token::Arrow) => {
                            *i += 1;
                            let to = place_ref(tokens, words, i)?;
                            Ok(RawOrder::Convoy {
                                kind,
                                at,
                                cargo_kind,
                                from,
                                to,
                            })
                        }
                        _ => Err(ParseError::MalformedConvoy(near(*i))),
                    }
                }
                Some(_) => Err(ParseError::UnknownKeyword(near(*i))),
            }
        }
        Token::Word(w) => Err(ParseError::UnknownKeyword(w.to_string())),
        _ => Err(ParseError::Malformed(near(*i))),
    }
}

/// `<kind> <place>`.
fn unit_ref(
    tokens: &[Token],
    words: &[&str],
    i: &mut usize,
) -> Result<(UnitKind, Location), ParseError> {
    let kind = match tokens.get(*i) {
        Some(Token::Kind(kind)) => *kind,
        Some(_) => return Err(ParseError::BadUnitKind(words[*i].to_string())),
        None => return Err(ParseError::Malformed(words[words.len() - 1].to_string())),
    };
    *i += 1;
    let at = place_ref(tokens, words, i)?;
    Ok((kind, at))
}

fn place_ref(tokens: &[Token], words: &[&str], i: &mut usize) -> Result<Location, ParseError> {
    match tokens.get(*i) {
        Some(Token::Word(w)) => match place(w) {
            Some(location) => {
                *i += 1;
                Ok(location)
            }
            None => Err(ParseError::BadPlace(w.to_string())),
        },
        Some(_) => Err(ParseError::BadPlace(words[*i].to_string())),
        None => Err(ParseError::Malformed(words[words.len() - 1].to_string())),
    }
}
