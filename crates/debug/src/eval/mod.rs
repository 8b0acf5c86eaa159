//! Debugger expressions
//!
//! Expressions are written either in ZIL-style prefix FORMs
//! (`<GETP ,HERE ,P?LDESC>`) or in a C-like infix syntax (`here.ldesc`).
//! Both parsers build the same arena-allocated [`Expr`] tree, which a
//! single [`Evaluator`] walks against a [`DebugInterface`].

pub mod form;
pub mod infix;

use std::fmt;
use std::str::FromStr;

use bumpalo::Bump;
use common::{create_logger, log_detail, Logger};
use debuginfo::DebugInfo;

use crate::error::EvalError;
use crate::inspection::MAX_GLOBALS;
use crate::interface::DebugInterface;
use crate::value::{Value, ValueKind};

/// Operators shared by both syntaxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitAnd,
    BitOr,
    BitNot,
    Neg,
    And,
    Or,
    Not,
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    GetB,
    GetW,
    PutB,
    PutW,
    /// Legacy table access: bytes before version 4, words after
    Nth,
    In,
    NotIn,
    Parent,
    Child,
    Sibling,
    Move,
    Remove,
    Has,
    Hasnt,
    FSet,
    FClear,
    GetP,
    PutP,
    GetPt,
    PtSize,
    Set,
    Inc,
    Dec,
    /// Number of the variable an lvalue names
    VarNum,
    Cast(ValueKind),
}

impl Op {
    pub fn name(self) -> &'static str {
        match self {
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
            Op::Div => "/",
            Op::Mod => "MOD",
            Op::BitAnd => "BAND",
            Op::BitOr => "BOR",
            Op::BitNot => "BCOM",
            Op::Neg => "negate",
            Op::And => "AND",
            Op::Or => "OR",
            Op::Not => "NOT",
            Op::Equal => "EQUAL?",
            Op::NotEqual => "N==?",
            Op::Less => "L?",
            Op::Greater => "G?",
            Op::LessEq => "L=?",
            Op::GreaterEq => "G=?",
            Op::GetB => "GETB",
            Op::GetW => "GET",
            Op::PutB => "PUTB",
            Op::PutW => "PUT",
            Op::Nth => "NTH",
            Op::In => "IN?",
            Op::NotIn => "notin",
            Op::Parent => "LOC",
            Op::Child => "FIRST?",
            Op::Sibling => "NEXT?",
            Op::Move => "MOVE",
            Op::Remove => "REMOVE",
            Op::Has => "FSET?",
            Op::Hasnt => "hasnt",
            Op::FSet => "FSET",
            Op::FClear => "FCLEAR",
            Op::GetP => "GETP",
            Op::PutP => "PUTP",
            Op::GetPt => "GETPT",
            Op::PtSize => "PTSIZE",
            Op::Set => "SET",
            Op::Inc => "INC",
            Op::Dec => "DEC",
            Op::VarNum => "&",
            Op::Cast(_) => "CHTYPE",
        }
    }

    /// Allowed argument counts, `None` meaning unbounded.
    fn arity(self) -> (usize, Option<usize>) {
        match self {
            Op::Add | Op::Mul => (0, None),
            Op::Sub | Op::BitAnd | Op::BitOr | Op::And | Op::Or => (1, None),
            Op::Div | Op::Mod | Op::Equal | Op::NotEqual => (2, None),
            Op::BitNot
            | Op::Neg
            | Op::Not
            | Op::Parent
            | Op::Child
            | Op::Sibling
            | Op::Remove
            | Op::PtSize
            | Op::Inc
            | Op::Dec
            | Op::VarNum
            | Op::Cast(_) => (1, Some(1)),
            Op::PutB | Op::PutW | Op::PutP => (3, Some(3)),
            _ => (2, Some(2)),
        }
    }
}

/// A parsed expression. Names are resolved at evaluation time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expr<'a> {
    Number(i32),
    /// Searched as local, routine, object, attribute, property, then global
    Name(&'a str),
    /// Only locals of the current routine
    Local(&'a str),
    /// Everything except locals
    Global(&'a str),
    Apply(Op, &'a [Expr<'a>]),
    Call(&'a Expr<'a>, &'a [Expr<'a>]),
}

/// Which grammar to parse an expression with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    Form,
    Infix,
}

/// The session's expression syntax setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyntaxMode {
    /// FORM if the text starts with `<`, `,` or `.`, infix otherwise
    #[default]
    Auto,
    Form,
    Infix,
}

impl SyntaxMode {
    pub fn select(self, text: &str) -> Syntax {
        match self {
            SyntaxMode::Form => Syntax::Form,
            SyntaxMode::Infix => Syntax::Infix,
            SyntaxMode::Auto => match text.trim_start().chars().next() {
                Some('<' | ',' | '.') => Syntax::Form,
                _ => Syntax::Infix,
            },
        }
    }
}

impl FromStr for SyntaxMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(SyntaxMode::Auto),
            "form" | "zil" => Ok(SyntaxMode::Form),
            "infix" | "c" => Ok(SyntaxMode::Infix),
            other => Err(format!("unknown syntax '{}' (expected auto, form or infix)", other)),
        }
    }
}

impl fmt::Display for SyntaxMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxMode::Auto => write!(f, "auto"),
            SyntaxMode::Form => write!(f, "form"),
            SyntaxMode::Infix => write!(f, "infix"),
        }
    }
}

/// Parse `text` into an expression allocated in `arena`.
pub fn parse<'a>(arena: &'a Bump, text: &str, mode: SyntaxMode) -> Result<Expr<'a>, EvalError> {
    match mode.select(text) {
        Syntax::Form => form::parse(arena, text),
        Syntax::Infix => infix::parse(arena, text),
    }
}

/// Which tables an identifier is looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    All,
    Locals,
    Globals,
}

/// Evaluates expressions against a VM and optional debug info.
pub struct Evaluator<'s, V: DebugInterface + ?Sized> {
    vm: &'s mut V,
    info: Option<&'s DebugInfo>,
    log: Logger,
}

impl<'s, V: DebugInterface + ?Sized> Evaluator<'s, V> {
    pub fn new(vm: &'s mut V, info: Option<&'s DebugInfo>) -> Self {
        Evaluator { vm, info, log: create_logger("eval") }
    }

    /// Evaluate an expression. The result may be an lvalue.
    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        match *expr {
            Expr::Number(n) => Ok(Value::Number(n)),
            Expr::Name(name) => Ok(self.lookup(name, Scope::All)),
            Expr::Local(name) => Ok(self.lookup(name, Scope::Locals)),
            Expr::Global(name) => Ok(self.lookup(name, Scope::Globals)),
            Expr::Apply(op, args) => self.apply(op, args),
            Expr::Call(callee, args) => self.call(callee, args),
        }
    }

    /// Evaluate an expression and read through any lvalue.
    pub fn evaluate_rvalue(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        let value = self.evaluate(expr)?;
        Ok(value.resolve(&*self.vm))
    }

    /// Resolve an identifier, case-insensitively. Unknown names are `Invalid`.
    fn lookup(&self, name: &str, scope: Scope) -> Value {
        let Some(info) = self.info else {
            return Value::Invalid;
        };

        if scope != Scope::Globals {
            let routine = info.routine_at(self.vm.pc());
            if let Some(i) = routine.and_then(|r| {
                r.locals.iter().position(|l| l.eq_ignore_ascii_case(name))
            }) {
                return Value::Variable(i as u8 + 1);
            }
            if scope == Scope::Locals {
                return Value::Invalid;
            }
        }

        if let Some(r) = info.routine_by_name(name) {
            return Value::Routine(self.vm.pack_routine(r.code_start));
        }
        if let Some(n) = info.find_object(name) {
            return Value::Object(n);
        }
        if let Some(n) = info.find_attribute(name) {
            return Value::Attribute(n);
        }
        if let Some(n) = info.find_property(name) {
            return Value::Property(n);
        }
        if let Some(n) = info.find_global(name) {
            if n < MAX_GLOBALS {
                return Value::Variable(16 + n as u8);
            }
            log_detail!(self.log, "global {} has out-of-range index {}", name, n);
            return Value::Invalid;
        }
        log_detail!(self.log, "unresolved identifier {}", name);
        Value::Invalid
    }

    fn rvalue(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        self.evaluate_rvalue(expr)
    }

    fn apply(&mut self, op: Op, args: &[Expr]) -> Result<Value, EvalError> {
        let (min, max) = op.arity();
        if args.len() < min || max.is_some_and(|m| args.len() > m) {
            let expected = match max {
                Some(m) if m == min => format!("{}", min),
                Some(m) => format!("{} to {}", min, m),
                None => format!("at least {}", min),
            };
            return Err(EvalError::expression(format!(
                "{} expects {} argument(s), got {}",
                op.name(),
                expected,
                args.len()
            )));
        }

        match op {
            Op::Add => self.fold(args, Value::Number(0), |a, b| a + b),
            Op::Mul => self.fold(args, Value::Number(1), |a, b| a * b),
            Op::Sub if args.len() == 1 => Ok(-self.rvalue(&args[0])?),
            Op::Sub => self.fold_first(args, |a, b| a - b),
            Op::Div => self.fold_first(args, |a, b| a / b),
            Op::Mod => self.fold_first(args, |a, b| a % b),
            Op::BitAnd => self.fold_first(args, |a, b| a & b),
            Op::BitOr => self.fold_first(args, |a, b| a | b),
            Op::And => self.fold_first(args, Value::and).map(|v| v.logical_not().logical_not()),
            Op::Or => self.fold_first(args, Value::or).map(|v| v.logical_not().logical_not()),
            Op::BitNot => Ok(!self.rvalue(&args[0])?),
            Op::Neg => Ok(-self.rvalue(&args[0])?),
            Op::Not => Ok(self.rvalue(&args[0])?.logical_not()),
            Op::Equal => self.equal_any(args),
            Op::NotEqual => Ok(self.equal_any(args)?.logical_not()),
            Op::Less => self.binary(args, Value::less_than),
            Op::Greater => self.binary(args, Value::greater_than),
            Op::LessEq => self.binary(args, Value::less_or_equal),
            Op::GreaterEq => self.binary(args, Value::greater_or_equal),
            Op::GetB => self.table(args, 1),
            Op::GetW => self.table(args, 2),
            Op::Nth => {
                let width = if self.vm.version() <= 3 { 1 } else { 2 };
                self.table(args, width)
            }
            Op::PutB | Op::PutW => {
                let loc = self.table(&args[..2], if op == Op::PutB { 1 } else { 2 })?;
                let value = self.rvalue(&args[2])?;
                loc.assign(value, &mut *self.vm)
            }
            Op::In => self.contained(args),
            Op::NotIn => Ok(self.contained(args)?.logical_not()),
            Op::Parent | Op::Child | Op::Sibling => {
                let value = self.rvalue(&args[0])?;
                let Some(obj) = self.object(value, false) else {
                    return Ok(Value::Invalid);
                };
                let related = match op {
                    Op::Parent => self.vm.object_parent(obj),
                    Op::Child => self.vm.object_child(obj),
                    _ => self.vm.object_sibling(obj),
                };
                Ok(Value::Object(related))
            }
            Op::Move => {
                let (obj, dest) = (self.rvalue(&args[0])?, self.rvalue(&args[1])?);
                if !obj.is_valid() || !dest.is_valid() {
                    return Ok(Value::Invalid);
                }
                let obj = self.require_object(obj)?;
                let dest = self.require_object(dest)?;
                self.vm.move_object(obj, dest);
                Ok(Value::Object(obj))
            }
            Op::Remove => {
                let obj = self.rvalue(&args[0])?;
                if !obj.is_valid() {
                    return Ok(Value::Invalid);
                }
                let obj = self.require_object(obj)?;
                self.vm.remove_object(obj);
                Ok(Value::Object(obj))
            }
            Op::Has => self.has_attribute(args),
            Op::Hasnt => Ok(self.has_attribute(args)?.logical_not()),
            Op::FSet | Op::FClear => self.set_attribute(args, op == Op::FSet),
            Op::GetP => self.get_property(args),
            Op::PutP => {
                let loc = self.put_property_location(&args[0], &args[1])?;
                let value = self.rvalue(&args[2])?;
                loc.assign(value, &mut *self.vm)
            }
            Op::GetPt => {
                let (obj, prop) = (self.rvalue(&args[0])?, self.rvalue(&args[1])?);
                match (self.object(obj, false), self.property_number(prop)) {
                    (Some(obj), Some(prop)) => {
                        let addr = self.vm.property_address(obj, prop);
                        Ok(if addr == 0 { Value::Number(0) } else { Value::Pointer(addr) })
                    }
                    _ => Ok(Value::Invalid),
                }
            }
            Op::PtSize => {
                let table = self.rvalue(&args[0])?;
                Ok(match table.content() {
                    Some(addr) => Value::Number(self.vm.property_length(addr as u32) as i32),
                    None => Value::Invalid,
                })
            }
            Op::Set => self.set(&args[0], &args[1]),
            Op::Inc | Op::Dec => {
                let loc = self.evaluate(&args[0])?;
                if !loc.is_valid() {
                    return Ok(Value::Invalid);
                }
                let delta = Value::Number(if op == Op::Inc { 1 } else { -1 });
                let current = loc.resolve(&*self.vm);
                loc.assign(current + delta, &mut *self.vm)
            }
            Op::VarNum => match self.evaluate(&args[0])? {
                Value::Variable(n) => Ok(Value::VariableNumber(n)),
                Value::Invalid => Ok(Value::Invalid),
                other => Err(EvalError::expression(format!(
                    "cannot take the variable number of a {}",
                    other.kind()
                ))),
            },
            Op::Cast(kind) => {
                let value = self.rvalue(&args[0])?;
                Ok(value.content().map_or(Value::Invalid, |n| Value::new(kind, n)))
            }
        }
    }

    fn fold(
        &mut self,
        args: &[Expr],
        init: Value,
        f: impl Fn(Value, Value) -> Value,
    ) -> Result<Value, EvalError> {
        let mut acc = init;
        for arg in args {
            let v = self.rvalue(arg)?;
            acc = f(acc, v);
        }
        Ok(acc)
    }

    fn fold_first(&mut self, args: &[Expr], f: impl Fn(Value, Value) -> Value) -> Result<Value, EvalError> {
        let first = self.rvalue(&args[0])?;
        self.fold(&args[1..], first, f)
    }

    fn binary(&mut self, args: &[Expr], f: impl Fn(Value, Value) -> Value) -> Result<Value, EvalError> {
        let a = self.rvalue(&args[0])?;
        let b = self.rvalue(&args[1])?;
        Ok(f(a, b))
    }

    /// True if the first argument equals any of the rest.
    ///
    /// Stops at the first match; an invalid operand before then is `Invalid`.
    fn equal_any(&mut self, args: &[Expr]) -> Result<Value, EvalError> {
        let first = self.rvalue(&args[0])?;
        if !first.is_valid() {
            return Ok(Value::Invalid);
        }
        for arg in &args[1..] {
            let other = self.rvalue(arg)?;
            match first.equals(other) {
                Value::Number(1) => return Ok(Value::Number(1)),
                Value::Invalid => return Ok(Value::Invalid),
                _ => {}
            }
        }
        Ok(Value::Number(0))
    }

    /// Byte or word lvalue at `table + index * width`.
    fn table(&mut self, args: &[Expr], width: i32) -> Result<Value, EvalError> {
        let table = self.rvalue(&args[0])?;
        let index = self.rvalue(&args[1])?;
        let (Some(base), Some(i)) = (table.content(), index.content()) else {
            return Ok(Value::Invalid);
        };
        let addr = base.wrapping_add(i.wrapping_mul(width));
        if addr < 0 {
            return Ok(Value::Invalid);
        }
        Ok(if width == 1 {
            Value::ByteAtAddress(addr as u32)
        } else {
            Value::WordAtAddress(addr as u32)
        })
    }

    /// Object number in range, or 0 if `allow_nothing`.
    fn object(&self, value: Value, allow_nothing: bool) -> Option<u16> {
        let n = value.content()?;
        if (allow_nothing && n == 0) || (n >= 1 && n <= self.vm.object_count() as i32) {
            Some(n as u16)
        } else {
            None
        }
    }

    fn require_object(&self, value: Value) -> Result<u16, EvalError> {
        self.object(value, false).ok_or_else(|| {
            EvalError::expression(format!("no such object: {}", value.content().unwrap_or(0)))
        })
    }

    fn max_attribute(&self) -> u16 {
        if self.vm.version() <= 3 {
            32
        } else {
            48
        }
    }

    fn max_property(&self) -> u16 {
        if self.vm.version() <= 3 {
            31
        } else {
            63
        }
    }

    fn attribute_number(&self, value: Value) -> Option<u16> {
        let n = value.content()?;
        (n >= 0 && n < self.max_attribute() as i32).then_some(n as u16)
    }

    fn property_number(&self, value: Value) -> Option<u16> {
        let n = value.content()?;
        (n >= 1 && n <= self.max_property() as i32).then_some(n as u16)
    }

    /// Attribute bitmap byte and mask for `attr` of `obj`.
    fn attribute_bit(&self, obj: u16, attr: u16) -> (u32, u8) {
        let addr = self.vm.object_address(obj) + (attr as u32 >> 3);
        (addr, 0x80 >> (attr & 7))
    }

    fn contained(&mut self, args: &[Expr]) -> Result<Value, EvalError> {
        let (obj, parent) = (self.rvalue(&args[0])?, self.rvalue(&args[1])?);
        match (self.object(obj, false), self.object(parent, true)) {
            (Some(obj), Some(parent)) => {
                Ok(Value::from_bool(self.vm.object_parent(obj) == parent))
            }
            _ => Ok(Value::Invalid),
        }
    }

    fn has_attribute(&mut self, args: &[Expr]) -> Result<Value, EvalError> {
        let (obj, attr) = (self.rvalue(&args[0])?, self.rvalue(&args[1])?);
        match (self.object(obj, false), self.attribute_number(attr)) {
            (Some(obj), Some(attr)) => {
                let (addr, mask) = self.attribute_bit(obj, attr);
                Ok(Value::from_bool(self.vm.read_byte(addr) & mask != 0))
            }
            _ => Ok(Value::Invalid),
        }
    }

    fn set_attribute(&mut self, args: &[Expr], on: bool) -> Result<Value, EvalError> {
        let (obj, attr) = (self.rvalue(&args[0])?, self.rvalue(&args[1])?);
        if !obj.is_valid() || !attr.is_valid() {
            return Ok(Value::Invalid);
        }
        let obj = self.require_object(obj)?;
        let attr = self.attribute_number(attr).ok_or_else(|| {
            EvalError::expression(format!("no such attribute: {}", attr.content().unwrap_or(0)))
        })?;
        let (addr, mask) = self.attribute_bit(obj, attr);
        let byte = self.vm.read_byte(addr);
        self.vm.write_byte(addr, if on { byte | mask } else { byte & !mask });
        Ok(Value::from_bool(on))
    }

    /// Lvalue for a property of width 1 or 2.
    fn property_lvalue(&self, addr: u32) -> Result<Value, EvalError> {
        match self.vm.property_length(addr) {
            1 => Ok(Value::ByteAtAddress(addr)),
            2 => Ok(Value::WordAtAddress(addr)),
            n => Err(EvalError::expression(format!(
                "property at ${:04X} is {} bytes long; only 1 or 2 can be read as a value",
                addr, n
            ))),
        }
    }

    /// A property lvalue, or the default-table word when the object lacks it.
    fn get_property(&mut self, args: &[Expr]) -> Result<Value, EvalError> {
        let (obj, prop) = (self.rvalue(&args[0])?, self.rvalue(&args[1])?);
        let (Some(obj), Some(prop)) = (self.object(obj, false), self.property_number(prop)) else {
            return Ok(Value::Invalid);
        };
        let addr = self.vm.property_address(obj, prop);
        if addr == 0 {
            let defaults = self.vm.read_word(0x0A) as u32;
            return Ok(Value::WordAtAddress(defaults + 2 * (prop as u32 - 1)));
        }
        self.property_lvalue(addr)
    }

    /// Lvalue for writing a property the object must actually have.
    fn put_property_location(&mut self, obj: &Expr, prop: &Expr) -> Result<Value, EvalError> {
        let (obj, prop) = (self.rvalue(obj)?, self.rvalue(prop)?);
        if !obj.is_valid() || !prop.is_valid() {
            return Ok(Value::Invalid);
        }
        let obj = self.require_object(obj)?;
        let prop = self.property_number(prop).ok_or_else(|| {
            EvalError::expression(format!("no such property: {}", prop.content().unwrap_or(0)))
        })?;
        match self.vm.property_address(obj, prop) {
            0 => Err(EvalError::expression(format!(
                "object {} has no property {}",
                obj, prop
            ))),
            addr => self.property_lvalue(addr),
        }
    }

    /// Assignment. A property destination must exist on the object.
    fn set(&mut self, dest: &Expr, value: &Expr) -> Result<Value, EvalError> {
        let loc = match *dest {
            Expr::Apply(Op::GetP, args) if args.len() == 2 => {
                self.put_property_location(&args[0], &args[1])?
            }
            _ => self.evaluate(dest)?,
        };
        let value = self.rvalue(value)?;
        loc.assign(value, &mut *self.vm)
    }

    fn call(&mut self, callee: &Expr, args: &[Expr]) -> Result<Value, EvalError> {
        let routine = self.rvalue(callee)?;
        let mut words = Vec::with_capacity(args.len());
        for arg in args {
            let v = self.rvalue(arg)?;
            match v.content() {
                Some(n) => words.push(n as u16),
                None => return Ok(Value::Invalid),
            }
        }
        let Some(packed) = routine.content() else {
            return Ok(Value::Invalid);
        };
        if packed == 0 {
            return Ok(Value::Number(0));
        }
        let result = self
            .vm
            .call_routine(packed as u32, &words)
            .map_err(|e| EvalError::expression(format!("call failed: {}", e)))?;
        Ok(Value::Number(result as i16 as i32))
    }
}
