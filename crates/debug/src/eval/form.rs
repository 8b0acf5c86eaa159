//! ZIL-style prefix expressions
//!
//! ```text
//! expr  := number | atom | ',' atom | '.' atom | form
//! form  := '<' '>' | '<' head expr* '>'
//! ```
//!
//! A form whose head is not an operator name is a routine call:
//! `<GO 1 2>` calls GO, `<APPLY ,ACTION 1>` calls whatever `,ACTION` holds.

use bumpalo::Bump;

use super::{Expr, Op};
use crate::error::EvalError;
use crate::value::ValueKind;

/// Parse a FORM expression.
pub fn parse<'a>(arena: &'a Bump, text: &str) -> Result<Expr<'a>, EvalError> {
    let mut parser = FormParser { arena, text, pos: 0 };
    let expr = parser.expr()?;
    parser.skip_ws();
    if parser.pos < text.len() {
        return Err(EvalError::syntax(parser.col(), "unexpected text after expression"));
    }
    Ok(expr)
}

/// What the first element of a form names.
enum Head {
    Op(Op),
    SetGlobal,
    Apply,
    ChangeType,
}

fn head(word: &str) -> Option<Head> {
    let op = match word.to_ascii_uppercase().as_str() {
        "+" | "ADD" => Op::Add,
        "-" | "SUB" => Op::Sub,
        "*" | "MUL" => Op::Mul,
        "/" | "DIV" => Op::Div,
        "MOD" => Op::Mod,
        "BAND" | "ANDB" => Op::BitAnd,
        "BOR" | "ORB" => Op::BitOr,
        "BCOM" => Op::BitNot,
        "AND" => Op::And,
        "OR" => Op::Or,
        "NOT" => Op::Not,
        "EQUAL?" | "=?" | "==?" => Op::Equal,
        "N==?" | "N=?" => Op::NotEqual,
        "L?" | "LESS?" => Op::Less,
        "G?" | "GRTR?" => Op::Greater,
        "L=?" => Op::LessEq,
        "G=?" => Op::GreaterEq,
        "GETB" => Op::GetB,
        "GET" => Op::GetW,
        "PUTB" => Op::PutB,
        "PUT" => Op::PutW,
        "NTH" => Op::Nth,
        "IN?" => Op::In,
        "LOC" | "PARENT" => Op::Parent,
        "FIRST?" | "CHILD" => Op::Child,
        "NEXT?" | "SIBLING" => Op::Sibling,
        "MOVE" => Op::Move,
        "REMOVE" => Op::Remove,
        "FSET?" | "HAS" => Op::Has,
        "HASNT" => Op::Hasnt,
        "FSET" => Op::FSet,
        "FCLEAR" => Op::FClear,
        "GETP" => Op::GetP,
        "PUTP" => Op::PutP,
        "GETPT" => Op::GetPt,
        "PTSIZE" => Op::PtSize,
        "SET" => Op::Set,
        "INC" => Op::Inc,
        "DEC" => Op::Dec,
        "SETG" => return Some(Head::SetGlobal),
        "APPLY" => return Some(Head::Apply),
        "CHTYPE" => return Some(Head::ChangeType),
        _ => return None,
    };
    Some(Head::Op(op))
}

fn is_atom_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '<' | '>' | ',' | '"' | ';')
}

/// Decimal (optionally negative) or `$`-prefixed hex literal.
fn literal(word: &str, col: usize) -> Result<Option<i32>, EvalError> {
    if let Some(hex) = word.strip_prefix('$') {
        return i32::from_str_radix(hex, 16)
            .map(Some)
            .map_err(|_| EvalError::syntax(col, format!("invalid hex number '{}'", word)));
    }
    let digits = word.strip_prefix('-').unwrap_or(word);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(None);
    }
    word.parse::<i32>()
        .map(Some)
        .map_err(|_| EvalError::syntax(col, format!("number out of range '{}'", word)))
}

struct FormParser<'a, 't> {
    arena: &'a Bump,
    text: &'t str,
    pos: usize,
}

impl<'a, 't> FormParser<'a, 't> {
    fn col(&self) -> usize {
        self.text[..self.pos].chars().count() + 1
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn atom(&mut self) -> Result<&'t str, EvalError> {
        let start = self.pos;
        while self.peek().is_some_and(is_atom_char) {
            self.bump();
        }
        if start == self.pos {
            return Err(EvalError::syntax(self.col(), "expected a name"));
        }
        Ok(&self.text[start..self.pos])
    }

    fn name(&self, word: &str) -> &'a str {
        self.arena.alloc_str(word)
    }

    fn word(&self, word: &str, col: usize) -> Result<Expr<'a>, EvalError> {
        Ok(match literal(word, col)? {
            Some(n) => Expr::Number(n),
            None => Expr::Name(self.name(word)),
        })
    }

    fn expr(&mut self) -> Result<Expr<'a>, EvalError> {
        self.skip_ws();
        let col = self.col();
        match self.peek() {
            None => Err(EvalError::syntax(col, "unexpected end of expression")),
            Some('<') => {
                self.bump();
                self.form(col)
            }
            Some('>') => Err(EvalError::syntax(col, "unexpected '>'")),
            Some(',') => {
                self.bump();
                let word = self.atom()?;
                Ok(Expr::Global(self.name(word)))
            }
            Some('.') => {
                self.bump();
                let word = self.atom()?;
                Ok(Expr::Local(self.name(word)))
            }
            Some(c) if is_atom_char(c) => {
                let word = self.atom()?;
                self.word(word, col)
            }
            Some(c) => Err(EvalError::syntax(col, format!("unexpected '{}'", c))),
        }
    }

    /// Parse the rest of a form after its opening `<`.
    fn form(&mut self, open_col: usize) -> Result<Expr<'a>, EvalError> {
        self.skip_ws();
        if self.peek() == Some('>') {
            // <> is ZIL's false
            self.bump();
            return Ok(Expr::Number(0));
        }

        let head_col = self.col();
        let mut operator = None;
        let callee = match self.peek() {
            Some(c) if is_atom_char(c) && c != '.' => {
                let word = self.atom()?;
                operator = head(word);
                match operator {
                    Some(_) => None,
                    None => Some(self.word(word, head_col)?),
                }
            }
            _ => Some(self.expr()?),
        };

        let mut args = Vec::new();
        loop {
            self.skip_ws();
            match self.peek() {
                Some('>') => {
                    self.bump();
                    break;
                }
                None => {
                    return Err(EvalError::syntax(open_col, "unterminated form: expected '>'"));
                }
                Some(_) => args.push(self.expr()?),
            }
        }

        match (operator, callee) {
            (Some(Head::Op(op)), _) => Ok(Expr::Apply(op, self.arena.alloc_slice_copy(&args))),
            (Some(Head::SetGlobal), _) => {
                if let Some(Expr::Name(name)) = args.first().copied() {
                    args[0] = Expr::Global(name);
                }
                Ok(Expr::Apply(Op::Set, self.arena.alloc_slice_copy(&args)))
            }
            (Some(Head::Apply), _) => {
                let Some((routine, rest)) = args.split_first() else {
                    return Err(EvalError::syntax(head_col, "APPLY needs a routine"));
                };
                Ok(Expr::Call(self.arena.alloc(*routine), self.arena.alloc_slice_copy(rest)))
            }
            (Some(Head::ChangeType), _) => match args.as_slice() {
                [value, Expr::Name(kind)] => match ValueKind::from_cast_name(kind) {
                    Some(kind) => {
                        Ok(Expr::Apply(Op::Cast(kind), self.arena.alloc_slice_copy(&[*value])))
                    }
                    None => Err(EvalError::syntax(head_col, format!("unknown type '{}'", kind))),
                },
                _ => Err(EvalError::syntax(head_col, "CHTYPE expects a value and a type name")),
            },
            (None, Some(callee)) => {
                Ok(Expr::Call(self.arena.alloc(callee), self.arena.alloc_slice_copy(&args)))
            }
            (None, None) => Err(EvalError::syntax(head_col, "empty form")),
        }
    }
}
