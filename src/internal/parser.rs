//! This module contains the pattern parser.
//!
//! The grammar is the classic grep one: alternation over concatenation over the
//! postfix closures `*` `+` `?`, with grouping, character classes, `.`, the line
//! anchors `^` and `$`, and `\x` escapes. A newline inside a pattern separates
//! alternatives exactly like `|`, which is what makes pattern files work.
//!
//! The parser produces NFA fragments through the builder and wraps every parsed
//! pattern for per-line containment matching: a leading any-byte loop keeps the
//! automaton restartable at every input position, a trailing any-byte-but-newline
//! loop carries a completed match to the end of its line without leaking past it,
//! and a final End node fuses the hit decision into the newline step.

use crate::{GrprError, Result};

use super::{class_expr, Frag, MatchConfig, Nfa, NodeID};

/// Parses and wraps all patterns and or-joins them into a single NFA root.
pub(crate) fn parse_patterns(
    nfa: &mut Nfa,
    patterns: &[String],
    config: &MatchConfig,
) -> Result<NodeID> {
    let mut top: Option<Frag> = None;
    for pattern in patterns {
        let wrapped = parse_pattern(nfa, pattern, config)?;
        top = Some(match top {
            None => wrapped,
            Some(t) => nfa.alt(t, wrapped),
        });
    }
    match top {
        Some(frag) => Ok(frag.begin),
        None => Err(GrprError::syntax("", "no pattern given", 0)),
    }
}

/// Parses one pattern and wraps it for per-line containment matching.
pub(crate) fn parse_pattern(nfa: &mut Nfa, pattern: &str, config: &MatchConfig) -> Result<Frag> {
    if pattern.is_empty() {
        return Err(GrprError::syntax(pattern, "empty pattern", 0));
    }
    let body = if config.literal {
        literal_body(nfa, pattern, config.case_fold)
    } else {
        Parser::new(pattern, config.case_fold).parse(nfa)?
    };
    Ok(wrap(nfa, body))
}

/// `star(any) . body . star(any but newline) . End`
fn wrap(nfa: &mut Nfa, body: Frag) -> Frag {
    let any = nfa.class(0x00, 0xFF);
    let lead = nfa.star(any);
    let frag = nfa.concat(lead, body);

    let below_nl = nfa.class(0x00, 0x09);
    let above_nl = nfa.class(0x0B, 0xFF);
    let fill = nfa.alt(below_nl, above_nl);
    let fill = nfa.star(fill);
    let frag = nfa.concat(frag, fill);

    let stop = nfa.end();
    nfa.concat(frag, stop)
}

/// Literal mode: every byte of the pattern matches itself, nothing is special.
fn literal_body(nfa: &mut Nfa, pattern: &str, case_fold: bool) -> Frag {
    let mut frag: Option<Frag> = None;
    for mut b in pattern.bytes() {
        if case_fold && b.is_ascii_uppercase() {
            b = b.to_ascii_lowercase();
        }
        let c = nfa.class(b, b);
        frag = Some(match frag {
            None => c,
            Some(f) => nfa.concat(f, c),
        });
    }
    // The caller rejected the empty pattern already.
    frag.expect("literal pattern must not be empty")
}

/// A single rune matching itself; non-ASCII runes become their exact UTF-8 byte
/// sequence.
fn literal_frag(nfa: &mut Nfa, c: char) -> Frag {
    let r = c as u32;
    if r < 0x80 {
        nfa.class(r as u8, r as u8)
    } else {
        class_expr::rune_range(nfa, r, r)
    }
}

struct Parser<'a> {
    pattern: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    case_fold: bool,
}

impl<'a> Parser<'a> {
    fn new(pattern: &'a str, case_fold: bool) -> Self {
        Self {
            pattern,
            chars: pattern.char_indices().peekable(),
            case_fold,
        }
    }

    fn err(&self, message: impl Into<String>, offset: usize) -> GrprError {
        GrprError::syntax(self.pattern, message, offset)
    }

    fn fold(&self, c: char) -> char {
        if self.case_fold && c.is_ascii_uppercase() {
            c.to_ascii_lowercase()
        } else {
            c
        }
    }

    fn next_ch(&mut self) -> Option<(usize, char)> {
        self.chars.next().map(|(i, c)| (i, self.fold(c)))
    }

    fn peek_ch(&mut self) -> Option<(usize, char)> {
        let case_fold = self.case_fold;
        self.chars.peek().map(|&(i, c)| {
            (
                i,
                if case_fold && c.is_ascii_uppercase() {
                    c.to_ascii_lowercase()
                } else {
                    c
                },
            )
        })
    }

    fn parse(mut self, nfa: &mut Nfa) -> Result<Frag> {
        let frag = self.parse_alt(nfa)?;
        if let Some((i, _)) = self.peek_ch() {
            // parse_alt stops only at a closing parenthesis it did not open.
            return Err(self.err("unmatched ')'", i));
        }
        Ok(frag)
    }

    fn parse_alt(&mut self, nfa: &mut Nfa) -> Result<Frag> {
        let mut frag = self.parse_concat(nfa)?;
        while matches!(self.peek_ch(), Some((_, '|')) | Some((_, '\n'))) {
            self.next_ch();
            let rhs = self.parse_concat(nfa)?;
            frag = nfa.alt(frag, rhs);
        }
        Ok(frag)
    }

    fn parse_concat(&mut self, nfa: &mut Nfa) -> Result<Frag> {
        let mut frag: Option<Frag> = None;
        while !matches!(
            self.peek_ch(),
            None | Some((_, '|')) | Some((_, '\n')) | Some((_, ')'))
        ) {
            let atom = self.parse_rep(nfa)?;
            frag = Some(match frag {
                None => atom,
                Some(f) => nfa.concat(f, atom),
            });
        }
        frag.ok_or_else(|| {
            let offset = self.peek_ch().map_or(self.pattern.len(), |(i, _)| i);
            self.err("empty alternative", offset)
        })
    }

    fn parse_rep(&mut self, nfa: &mut Nfa) -> Result<Frag> {
        let mut frag = self.parse_atom(nfa)?;
        while let Some((_, c)) = self.peek_ch() {
            match c {
                '*' => {
                    self.next_ch();
                    frag = nfa.star(frag);
                }
                '+' => {
                    self.next_ch();
                    frag = nfa.plus(frag);
                }
                '?' => {
                    self.next_ch();
                    frag = nfa.opt(frag);
                }
                _ => break,
            }
        }
        Ok(frag)
    }

    fn parse_atom(&mut self, nfa: &mut Nfa) -> Result<Frag> {
        let (i, c) = self
            .next_ch()
            .expect("parse_atom called at end of pattern");
        match c {
            '(' => {
                let frag = self.parse_alt(nfa)?;
                match self.next_ch() {
                    Some((_, ')')) => Ok(frag),
                    _ => Err(self.err("unclosed '('", i)),
                }
            }
            '[' => {
                let body = self.take_class_body(i)?;
                class_expr::class_from_expr(nfa, &body, self.pattern, i)
            }
            '.' => Ok(class_expr::class_from_ranges(nfa, &[(0x0A, 0x0A)], true)),
            '^' => Ok(nfa.begin()),
            '$' => Ok(nfa.end()),
            '*' | '+' | '?' => Err(self.err("repetition with nothing to repeat", i)),
            '\\' => match self.next_ch() {
                Some((_, e)) => Ok(literal_frag(nfa, e)),
                None => Err(self.err("trailing backslash", i)),
            },
            _ => Ok(literal_frag(nfa, c)),
        }
    }

    /// Collects the class source expression up to the closing `]`. A backslash
    /// keeps the following character, so `]` itself can be a class member.
    fn take_class_body(&mut self, open: usize) -> Result<String> {
        let mut body = String::new();
        loop {
            match self.next_ch() {
                None => return Err(self.err("unclosed '['", open)),
                Some((_, ']')) => return Ok(body),
                Some((_, '\\')) => {
                    body.push('\\');
                    match self.next_ch() {
                        None => return Err(self.err("unclosed '['", open)),
                        Some((_, e)) => body.push(e),
                    }
                }
                Some((_, c)) => body.push(c),
            }
        }
    }
}
