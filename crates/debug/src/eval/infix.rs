//! C-like infix expressions
//!
//! Precedence, loosest first:
//!
//! ```text
//! =                          (right associative)
//! ||
//! &&
//! ==  !=
//! <  >  <=  >=  has  hasnt  in  notin
//! |
//! &
//! +  -
//! *  /  %
//! -x  !x  ~x  ++x  --x  &var  (kind) x
//! f(args)  obj.prop  obj.&prop  obj.#prop
//! ```
//!
//! `obj.prop` is the property's value and can be assigned to; `obj.&prop`
//! is its address and `obj.#prop` its length. Builtin functions such as
//! `parent(x)` and `getp(o, p)` take precedence over routines of the same
//! name; write the routine name in backquotes to call it instead.

use bumpalo::Bump;

use super::{Expr, Op};
use crate::error::EvalError;
use crate::value::ValueKind;

/// Parse an infix expression.
pub fn parse<'a>(arena: &'a Bump, text: &str) -> Result<Expr<'a>, EvalError> {
    let tokens = lex(text)?;
    let mut parser = InfixParser { arena, tokens, pos: 0 };
    let expr = parser.assignment()?;
    let token = parser.peek();
    if token.tok != Tok::End {
        return Err(EvalError::syntax(token.col, format!("unexpected {}", token.tok)));
    }
    Ok(expr)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Tok<'t> {
    Num(i32),
    Ident(&'t str),
    /// Backquoted name, never a builtin or keyword
    Quoted(&'t str),
    Punct(&'static str),
    End,
}

impl std::fmt::Display for Tok<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tok::Num(n) => write!(f, "number {}", n),
            Tok::Ident(s) => write!(f, "'{}'", s),
            Tok::Quoted(s) => write!(f, "'`{}`'", s),
            Tok::Punct(p) => write!(f, "'{}'", p),
            Tok::End => write!(f, "end of expression"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Token<'t> {
    tok: Tok<'t>,
    col: usize,
}

const PUNCT: &[&str] = &[
    "&&", "||", "==", "!=", "<=", ">=", "++", "--", ".&", ".#", "+", "-", "*", "/", "%", "&", "|",
    "~", "!", "<", ">", "=", "(", ")", ",", ".",
];

fn lex(text: &str) -> Result<Vec<Token<'_>>, EvalError> {
    let mut tokens = Vec::new();
    let mut pos = 0;
    let col_at = |pos: usize| text[..pos].chars().count() + 1;

    while pos < text.len() {
        let rest = &text[pos..];
        let Some(c) = rest.chars().next() else { break };
        if c.is_whitespace() {
            pos += c.len_utf8();
            continue;
        }
        let col = col_at(pos);

        if c.is_ascii_digit() || c == '$' {
            let (radix, skip) = if c == '$' {
                (16, 1)
            } else if rest.starts_with("0x") || rest.starts_with("0X") {
                (16, 2)
            } else {
                (10, 0)
            };
            let digits: &str = {
                let body = &rest[skip..];
                let end = body
                    .find(|ch: char| !ch.is_ascii_alphanumeric())
                    .unwrap_or(body.len());
                &body[..end]
            };
            let n = i32::from_str_radix(digits, radix).map_err(|_| {
                EvalError::syntax(col, format!("invalid number '{}'", &rest[..skip + digits.len()]))
            })?;
            tokens.push(Token { tok: Tok::Num(n), col });
            pos += skip + digits.len();
        } else if c.is_ascii_alphabetic() || c == '_' {
            let end = rest
                .find(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '_' || ch == '?'))
                .unwrap_or(rest.len());
            tokens.push(Token { tok: Tok::Ident(&rest[..end]), col });
            pos += end;
        } else if c == '`' {
            let Some(end) = rest[1..].find('`') else {
                return Err(EvalError::syntax(col, "unterminated quoted name"));
            };
            tokens.push(Token { tok: Tok::Quoted(&rest[1..1 + end]), col });
            pos += end + 2;
        } else if let Some(p) = PUNCT.iter().find(|p| rest.starts_with(**p)) {
            tokens.push(Token { tok: Tok::Punct(*p), col });
            pos += p.len();
        } else {
            return Err(EvalError::syntax(col, format!("unexpected character '{}'", c)));
        }
    }
    tokens.push(Token { tok: Tok::End, col: col_at(text.len()) });
    Ok(tokens)
}

fn builtin(name: &str) -> Option<Op> {
    let op = match name.to_ascii_lowercase().as_str() {
        "parent" => Op::Parent,
        "child" => Op::Child,
        "sibling" => Op::Sibling,
        "move" => Op::Move,
        "remove" => Op::Remove,
        "getb" => Op::GetB,
        "get" => Op::GetW,
        "putb" => Op::PutB,
        "put" => Op::PutW,
        "getp" => Op::GetP,
        "putp" => Op::PutP,
        "getpt" => Op::GetPt,
        "ptsize" => Op::PtSize,
        "fset" => Op::FSet,
        "fclear" => Op::FClear,
        _ => return None,
    };
    Some(op)
}

struct InfixParser<'a, 't> {
    arena: &'a Bump,
    tokens: Vec<Token<'t>>,
    pos: usize,
}

impl<'a, 't> InfixParser<'a, 't> {
    fn peek(&self) -> Token<'t> {
        self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_at(&self, offset: usize) -> Tok<'t> {
        self.tokens
            .get(self.pos + offset)
            .map_or(Tok::End, |t| t.tok)
    }

    fn advance(&mut self) -> Token<'t> {
        let token = self.peek();
        if token.tok != Tok::End {
            self.pos += 1;
        }
        token
    }

    /// Consume `p` if it is next.
    fn eat(&mut self, p: &str) -> bool {
        if matches!(self.peek().tok, Tok::Punct(q) if q == p) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, p: &str) -> Result<(), EvalError> {
        if self.eat(p) {
            Ok(())
        } else {
            let token = self.peek();
            Err(EvalError::syntax(token.col, format!("expected '{}', found {}", p, token.tok)))
        }
    }

    fn apply(&self, op: Op, args: &[Expr<'a>]) -> Expr<'a> {
        Expr::Apply(op, self.arena.alloc_slice_copy(args))
    }

    fn assignment(&mut self) -> Result<Expr<'a>, EvalError> {
        let lhs = self.or()?;
        if self.eat("=") {
            let rhs = self.assignment()?;
            return Ok(self.apply(Op::Set, &[lhs, rhs]));
        }
        Ok(lhs)
    }

    /// One left-associative precedence level.
    fn binary_level(
        &mut self,
        next: fn(&mut Self) -> Result<Expr<'a>, EvalError>,
        ops: &[(&str, Op)],
    ) -> Result<Expr<'a>, EvalError> {
        let mut lhs = next(self)?;
        'outer: loop {
            for (p, op) in ops {
                if self.eat(p) {
                    let rhs = next(self)?;
                    lhs = self.apply(*op, &[lhs, rhs]);
                    continue 'outer;
                }
            }
            return Ok(lhs);
        }
    }

    fn or(&mut self) -> Result<Expr<'a>, EvalError> {
        self.binary_level(Self::and, &[("||", Op::Or)])
    }

    fn and(&mut self) -> Result<Expr<'a>, EvalError> {
        self.binary_level(Self::equality, &[("&&", Op::And)])
    }

    fn equality(&mut self) -> Result<Expr<'a>, EvalError> {
        self.binary_level(Self::relational, &[("==", Op::Equal), ("!=", Op::NotEqual)])
    }

    fn relational(&mut self) -> Result<Expr<'a>, EvalError> {
        let mut lhs = self.bit_or()?;
        loop {
            let op = match self.peek().tok {
                Tok::Punct("<") => Op::Less,
                Tok::Punct(">") => Op::Greater,
                Tok::Punct("<=") => Op::LessEq,
                Tok::Punct(">=") => Op::GreaterEq,
                Tok::Ident(word) => match word.to_ascii_lowercase().as_str() {
                    "has" => Op::Has,
                    "hasnt" => Op::Hasnt,
                    "in" => Op::In,
                    "notin" => Op::NotIn,
                    _ => return Ok(lhs),
                },
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.bit_or()?;
            lhs = self.apply(op, &[lhs, rhs]);
        }
    }

    fn bit_or(&mut self) -> Result<Expr<'a>, EvalError> {
        self.binary_level(Self::bit_and, &[("|", Op::BitOr)])
    }

    fn bit_and(&mut self) -> Result<Expr<'a>, EvalError> {
        self.binary_level(Self::additive, &[("&", Op::BitAnd)])
    }

    fn additive(&mut self) -> Result<Expr<'a>, EvalError> {
        self.binary_level(Self::multiplicative, &[("+", Op::Add), ("-", Op::Sub)])
    }

    fn multiplicative(&mut self) -> Result<Expr<'a>, EvalError> {
        self.binary_level(Self::unary, &[("*", Op::Mul), ("/", Op::Div), ("%", Op::Mod)])
    }

    fn unary(&mut self) -> Result<Expr<'a>, EvalError> {
        let prefix = match self.peek().tok {
            Tok::Punct("-") => Some(Op::Neg),
            Tok::Punct("!") => Some(Op::Not),
            Tok::Punct("~") => Some(Op::BitNot),
            Tok::Punct("++") => Some(Op::Inc),
            Tok::Punct("--") => Some(Op::Dec),
            Tok::Punct("&") => Some(Op::VarNum),
            Tok::Punct("(") => match (self.peek_at(1), self.peek_at(2)) {
                (Tok::Ident(name), Tok::Punct(")")) => {
                    ValueKind::from_cast_name(name).map(Op::Cast)
                }
                _ => None,
            },
            _ => None,
        };
        match prefix {
            Some(op @ Op::Cast(_)) => {
                self.pos += 3;
                let operand = self.unary()?;
                Ok(self.apply(op, &[operand]))
            }
            Some(op) => {
                self.advance();
                let operand = self.unary()?;
                if let (Op::Neg, Expr::Number(n)) = (op, operand) {
                    return Ok(Expr::Number(n.wrapping_neg()));
                }
                Ok(self.apply(op, &[operand]))
            }
            None => self.postfix(),
        }
    }

    fn postfix(&mut self) -> Result<Expr<'a>, EvalError> {
        let builtin_op = match (self.peek().tok, self.peek_at(1)) {
            (Tok::Ident(name), Tok::Punct("(")) => builtin(name),
            _ => None,
        };
        let mut expr = match builtin_op {
            Some(op) => {
                self.pos += 2;
                Expr::Apply(op, self.arguments()?)
            }
            None => self.primary()?,
        };

        loop {
            if self.eat("(") {
                let args = self.arguments()?;
                expr = Expr::Call(self.arena.alloc(expr), args);
            } else if self.eat(".") {
                let prop = self.primary()?;
                expr = self.apply(Op::GetP, &[expr, prop]);
            } else if self.eat(".&") {
                let prop = self.primary()?;
                expr = self.apply(Op::GetPt, &[expr, prop]);
            } else if self.eat(".#") {
                let prop = self.primary()?;
                let table = self.apply(Op::GetPt, &[expr, prop]);
                expr = self.apply(Op::PtSize, &[table]);
            } else {
                return Ok(expr);
            }
        }
    }

    /// Comma-separated arguments after an opening parenthesis.
    fn arguments(&mut self) -> Result<&'a [Expr<'a>], EvalError> {
        let mut args = Vec::new();
        if !self.eat(")") {
            loop {
                args.push(self.assignment()?);
                if self.eat(")") {
                    break;
                }
                self.expect(",")?;
            }
        }
        Ok(self.arena.alloc_slice_copy(&args))
    }

    fn primary(&mut self) -> Result<Expr<'a>, EvalError> {
        let token = self.advance();
        match token.tok {
            Tok::Num(n) => Ok(Expr::Number(n)),
            Tok::Ident(name) | Tok::Quoted(name) => Ok(Expr::Name(self.arena.alloc_str(name))),
            Tok::Punct("(") => {
                let inner = self.assignment()?;
                self.expect(")")?;
                Ok(inner)
            }
            other => Err(EvalError::syntax(token.col, format!("unexpected {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::tests::eval;
    use crate::eval::SyntaxMode;
    use crate::mock::{MockMachine, HELPER};
    use crate::value::Value;

    fn n(v: i32) -> Result<Value, EvalError> {
        Ok(Value::Number(v))
    }

    fn infix(vm: &mut MockMachine, text: &str) -> Result<Value, EvalError> {
        crate::eval::tests::eval_with(vm, text, SyntaxMode::Infix)
    }

    #[test]
    fn test_lex_numbers() {
        let arena = Bump::new();
        assert_eq!(parse(&arena, "123"), Ok(Expr::Number(123)));
        assert_eq!(parse(&arena, "0x1F"), Ok(Expr::Number(0x1F)));
        assert_eq!(parse(&arena, "$1f"), Ok(Expr::Number(0x1F)));
        assert_eq!(parse(&arena, "-5"), Ok(Expr::Number(-5)));
        assert!(matches!(parse(&arena, "12ab"), Err(EvalError::Syntax { col: 1, .. })));
    }

    #[test]
    fn test_precedence_shapes() {
        let arena = Bump::new();
        assert_eq!(
            parse(&arena, "1 + 2 * 3"),
            Ok(Expr::Apply(
                Op::Add,
                &[Expr::Number(1), Expr::Apply(Op::Mul, &[Expr::Number(2), Expr::Number(3)])]
            ))
        );
        assert_eq!(
            parse(&arena, "a = b = 1"),
            Ok(Expr::Apply(
                Op::Set,
                &[Expr::Name("a"), Expr::Apply(Op::Set, &[Expr::Name("b"), Expr::Number(1)])]
            ))
        );
        assert_eq!(
            parse(&arena, "lamp.size"),
            Ok(Expr::Apply(Op::GetP, &[Expr::Name("lamp"), Expr::Name("size")]))
        );
        assert_eq!(
            parse(&arena, "(object) 2"),
            Ok(Expr::Apply(Op::Cast(ValueKind::Object), &[Expr::Number(2)]))
        );
    }

    #[test]
    fn test_parse_errors() {
        let arena = Bump::new();
        assert!(matches!(parse(&arena, "1 +"), Err(EvalError::Syntax { col: 4, .. })));
        assert!(matches!(parse(&arena, "(1"), Err(EvalError::Syntax { col: 3, .. })));
        assert!(matches!(parse(&arena, "1 2"), Err(EvalError::Syntax { col: 3, .. })));
        assert!(matches!(parse(&arena, "a @ b"), Err(EvalError::Syntax { col: 3, .. })));
        assert!(matches!(parse(&arena, "`open"), Err(EvalError::Syntax { .. })));
        assert!(matches!(parse(&arena, "f(1 2)"), Err(EvalError::Syntax { .. })));
    }

    #[test]
    fn test_arithmetic_and_logic() {
        let mut vm = MockMachine::sample();
        assert_eq!(eval(&mut vm, "1 + 2 * 3"), n(7));
        assert_eq!(eval(&mut vm, "(1 + 2) * 3"), n(9));
        assert_eq!(eval(&mut vm, "10 - 4 - 3"), n(3));
        assert_eq!(eval(&mut vm, "7 % 0"), Ok(Value::Invalid));
        assert_eq!(eval(&mut vm, "0x0F & 0x3C | 1"), n(13));
        assert_eq!(eval(&mut vm, "~0"), n(-1));
        assert_eq!(eval(&mut vm, "-(2 + 3)"), n(-5));
        assert_eq!(eval(&mut vm, "1 < 2 && 3 >= 3"), n(1));
        assert_eq!(eval(&mut vm, "1 == 2 || !0"), n(1));
        assert_eq!(eval(&mut vm, "2 != 2"), n(0));
    }

    #[test]
    fn test_object_keywords() {
        let mut vm = MockMachine::sample();
        assert_eq!(eval(&mut vm, "lamp in room"), n(1));
        assert_eq!(eval(&mut vm, "coin notin room"), n(1));
        assert_eq!(eval(&mut vm, "lamp has lightbit"), n(1));
        assert_eq!(eval(&mut vm, "box hasnt lightbit"), n(1));
        assert_eq!(eval(&mut vm, "parent(coin)"), Ok(Value::Object(3)));
        assert_eq!(eval(&mut vm, "child(room)"), Ok(Value::Object(2)));
        assert_eq!(eval(&mut vm, "sibling(lamp)"), Ok(Value::Object(3)));
        eval(&mut vm, "move(coin, lamp)").unwrap();
        assert_eq!(eval(&mut vm, "parent(coin)"), Ok(Value::Object(2)));
        eval(&mut vm, "remove(coin)").unwrap();
        assert_eq!(eval(&mut vm, "parent(coin)"), Ok(Value::Object(0)));
        eval(&mut vm, "fset(box, lightbit)").unwrap();
        assert_eq!(eval(&mut vm, "box has lightbit"), n(1));
        eval(&mut vm, "fclear(box, lightbit)").unwrap();
        assert_eq!(eval(&mut vm, "box has lightbit"), n(0));
    }

    #[test]
    fn test_property_forms() {
        let mut vm = MockMachine::sample();
        assert_eq!(eval(&mut vm, "lamp.p?size"), n(42));
        assert_eq!(eval(&mut vm, "box.p?size"), n(5));
        assert_eq!(eval(&mut vm, "lamp.&p?size"), Ok(Value::Pointer(0x123)));
        assert_eq!(eval(&mut vm, "room.#p?desc"), n(4));
        assert_eq!(eval(&mut vm, "getp(lamp, p?size)"), n(42));
        assert_eq!(eval(&mut vm, "lamp.p?size = 9"), n(9));
        assert_eq!(eval(&mut vm, "lamp.p?size"), n(9));
        assert!(eval(&mut vm, "box.p?size = 9").is_err());
        assert!(eval(&mut vm, "room.p?desc").is_err());
        eval(&mut vm, "putp(box, p?capacity, 3)").unwrap();
        assert_eq!(eval(&mut vm, "box.p?capacity"), n(3));
    }

    #[test]
    fn test_assignment_and_increment() {
        let mut vm = MockMachine::sample();
        assert_eq!(eval(&mut vm, "score = 5"), n(5));
        assert_eq!(eval(&mut vm, "++score"), n(6));
        assert_eq!(eval(&mut vm, "--score"), n(5));
        assert_eq!(eval(&mut vm, "moves = score = 2"), n(2));
        assert_eq!(eval(&mut vm, "moves"), n(2));
        assert_eq!(eval(&mut vm, "&score"), Ok(Value::VariableNumber(16)));
        assert!(eval(&mut vm, "&lamp").is_err());
        assert!(eval(&mut vm, "3 = 4").is_err());
    }

    #[test]
    fn test_tables() {
        let mut vm = MockMachine::sample();
        eval(&mut vm, "put(0x400, 0, 0x1234)").unwrap();
        assert_eq!(eval(&mut vm, "get(0x400, 0)"), n(0x1234));
        assert_eq!(eval(&mut vm, "getb(0x400, 1)"), n(0x34));
        eval(&mut vm, "putb(0x400, 1, 0x56)").unwrap();
        assert_eq!(eval(&mut vm, "get($400, 0)"), n(0x1256));
    }

    #[test]
    fn test_casts() {
        let mut vm = MockMachine::sample();
        assert_eq!(eval(&mut vm, "(object) 2"), Ok(Value::Object(2)));
        assert_eq!(eval(&mut vm, "(routine) 0x408"), Ok(Value::Routine(HELPER / 4)));
        assert_eq!(eval(&mut vm, "(lamp) + 1"), Ok(Value::Object(3)));
    }

    #[test]
    fn test_calls() {
        let mut vm = MockMachine::sample();
        assert_eq!(infix(&mut vm, "helper(1)"), n(42));
        assert_eq!(infix(&mut vm, "`helper`(1) + 1"), n(43));
        assert_eq!(infix(&mut vm, "lamp.p?action(0)"), n(42));
        assert_eq!(infix(&mut vm, "bogus(1)"), Ok(Value::Invalid));
    }
}
