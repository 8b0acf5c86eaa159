//! Typed debugger values
//!
//! Every expression evaluates to a [`Value`]: an integer tagged with what it
//! denotes. Rvalue kinds carry a number, an object, an address and so on;
//! lvalue kinds name a storage location that can be read with
//! [`Value::resolve`] or written with [`Value::assign`].
//!
//! [`Value::Invalid`] is absorbing. Any operation with an invalid operand
//! yields `Invalid` instead of failing, so an unknown name deep inside an
//! expression surfaces as an invalid result rather than an error.

use std::fmt;
use std::ops::{Add, BitAnd, BitOr, Div, Mul, Neg, Not, Rem, Sub};

use crate::error::EvalError;
use crate::interface::DebugInterface;

/// The kind tag of a [`Value`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Invalid,
    Number,
    Object,
    Attribute,
    Property,
    Pointer,
    Routine,
    PackedString,
    UnpackedString,
    ReadBuf,
    LexBuf,
    VariableNumber,
    Variable,
    ByteAtAddress,
    WordAtAddress,
}

impl ValueKind {
    /// Kinds that denote a storage location
    pub fn is_lvalue(self) -> bool {
        matches!(
            self,
            ValueKind::Variable | ValueKind::ByteAtAddress | ValueKind::WordAtAddress
        )
    }

    /// Kinds whose content is a byte address
    pub fn is_unpacked_address(self) -> bool {
        matches!(
            self,
            ValueKind::Pointer | ValueKind::UnpackedString | ValueKind::ReadBuf | ValueKind::LexBuf
        )
    }

    /// Kinds whose content is a packed address
    pub fn is_packed_address(self) -> bool {
        matches!(self, ValueKind::Routine | ValueKind::PackedString)
    }

    pub fn is_address(self) -> bool {
        self.is_unpacked_address() || self.is_packed_address()
    }

    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Invalid => "invalid",
            ValueKind::Number => "number",
            ValueKind::Object => "object",
            ValueKind::Attribute => "attribute",
            ValueKind::Property => "property",
            ValueKind::Pointer => "pointer",
            ValueKind::Routine => "routine",
            ValueKind::PackedString => "string",
            ValueKind::UnpackedString => "ustring",
            ValueKind::ReadBuf => "readbuf",
            ValueKind::LexBuf => "lexbuf",
            ValueKind::VariableNumber => "varnum",
            ValueKind::Variable => "variable",
            ValueKind::ByteAtAddress => "byte",
            ValueKind::WordAtAddress => "word",
        }
    }

    /// Parse a cast target. Only rvalue kinds can be cast to.
    ///
    /// Accepts the short names used in infix casts and the ZIL type names
    /// used by `CHTYPE`, case-insensitively.
    pub fn from_cast_name(name: &str) -> Option<ValueKind> {
        let kind = match name.to_ascii_lowercase().as_str() {
            "number" | "fix" | "int" => ValueKind::Number,
            "object" | "obj" => ValueKind::Object,
            "attribute" | "attr" | "flag" => ValueKind::Attribute,
            "property" | "prop" => ValueKind::Property,
            "pointer" | "ptr" | "table" => ValueKind::Pointer,
            "routine" => ValueKind::Routine,
            "string" | "packed" => ValueKind::PackedString,
            "ustring" | "unpacked" => ValueKind::UnpackedString,
            "readbuf" => ValueKind::ReadBuf,
            "lexbuf" => ValueKind::LexBuf,
            "varnum" => ValueKind::VariableNumber,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A debugger value: a kind tag with an integer payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Value {
    Invalid,
    /// Signed integer
    Number(i32),
    Object(u16),
    Attribute(u16),
    Property(u16),
    /// Unpacked address of untyped data
    Pointer(u32),
    /// Packed routine address
    Routine(u32),
    /// Packed string address
    PackedString(u32),
    /// Unpacked string address
    UnpackedString(u32),
    /// Address of a text input buffer
    ReadBuf(u32),
    /// Address of a parse buffer
    LexBuf(u32),
    /// The number of a variable, as a value rather than its contents
    VariableNumber(u8),
    /// Lvalue: a variable (0 = stack top, 1-15 locals, 16-255 globals)
    Variable(u8),
    /// Lvalue: an unsigned byte in memory
    ByteAtAddress(u32),
    /// Lvalue: a signed word in memory
    WordAtAddress(u32),
}

impl Value {
    /// Build a value of `kind` from raw content, truncating to the kind's width.
    pub fn new(kind: ValueKind, content: i32) -> Value {
        match kind {
            ValueKind::Invalid => Value::Invalid,
            ValueKind::Number => Value::Number(content),
            ValueKind::Object => Value::Object(content as u16),
            ValueKind::Attribute => Value::Attribute(content as u16),
            ValueKind::Property => Value::Property(content as u16),
            ValueKind::Pointer => Value::Pointer(content as u32),
            ValueKind::Routine => Value::Routine(content as u32),
            ValueKind::PackedString => Value::PackedString(content as u32),
            ValueKind::UnpackedString => Value::UnpackedString(content as u32),
            ValueKind::ReadBuf => Value::ReadBuf(content as u32),
            ValueKind::LexBuf => Value::LexBuf(content as u32),
            ValueKind::VariableNumber => Value::VariableNumber(content as u8),
            ValueKind::Variable => Value::Variable(content as u8),
            ValueKind::ByteAtAddress => Value::ByteAtAddress(content as u32),
            ValueKind::WordAtAddress => Value::WordAtAddress(content as u32),
        }
    }

    pub fn from_bool(b: bool) -> Value {
        Value::Number(b as i32)
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Invalid => ValueKind::Invalid,
            Value::Number(_) => ValueKind::Number,
            Value::Object(_) => ValueKind::Object,
            Value::Attribute(_) => ValueKind::Attribute,
            Value::Property(_) => ValueKind::Property,
            Value::Pointer(_) => ValueKind::Pointer,
            Value::Routine(_) => ValueKind::Routine,
            Value::PackedString(_) => ValueKind::PackedString,
            Value::UnpackedString(_) => ValueKind::UnpackedString,
            Value::ReadBuf(_) => ValueKind::ReadBuf,
            Value::LexBuf(_) => ValueKind::LexBuf,
            Value::VariableNumber(_) => ValueKind::VariableNumber,
            Value::Variable(_) => ValueKind::Variable,
            Value::ByteAtAddress(_) => ValueKind::ByteAtAddress,
            Value::WordAtAddress(_) => ValueKind::WordAtAddress,
        }
    }

    /// Integer payload, or `None` for [`Value::Invalid`].
    pub fn content(&self) -> Option<i32> {
        let n = match *self {
            Value::Invalid => return None,
            Value::Number(n) => n,
            Value::Object(n) | Value::Attribute(n) | Value::Property(n) => n as i32,
            Value::Pointer(a)
            | Value::Routine(a)
            | Value::PackedString(a)
            | Value::UnpackedString(a)
            | Value::ReadBuf(a)
            | Value::LexBuf(a)
            | Value::ByteAtAddress(a)
            | Value::WordAtAddress(a) => a as i32,
            Value::VariableNumber(v) | Value::Variable(v) => v as i32,
        };
        Some(n)
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self, Value::Invalid)
    }

    pub fn is_lvalue(&self) -> bool {
        self.kind().is_lvalue()
    }

    /// `Some(self)` unless invalid; the entry point of the guard algebra.
    pub fn valid(self) -> Option<Value> {
        self.is_valid().then_some(self)
    }

    /// Nonzero content, or `None` if invalid.
    pub fn truthy(&self) -> Option<bool> {
        self.content().map(|n| n != 0)
    }

    // ------------------------------------------------------------------
    // Comparisons and logic: always Number 0/1 (or Invalid)
    // ------------------------------------------------------------------

    pub fn equals(self, other: Value) -> Value {
        lift2(self, other, |a, b| Some(Value::from_bool(a.content() == b.content())))
    }

    pub fn not_equals(self, other: Value) -> Value {
        lift2(self, other, |a, b| Some(Value::from_bool(a.content() != b.content())))
    }

    pub fn less_than(self, other: Value) -> Value {
        compare(self, other, |a, b| a < b)
    }

    pub fn greater_than(self, other: Value) -> Value {
        compare(self, other, |a, b| a > b)
    }

    pub fn less_or_equal(self, other: Value) -> Value {
        compare(self, other, |a, b| a <= b)
    }

    pub fn greater_or_equal(self, other: Value) -> Value {
        compare(self, other, |a, b| a >= b)
    }

    pub fn and(self, other: Value) -> Value {
        lift2(self, other, |a, b| Some(Value::from_bool(a.truthy()? && b.truthy()?)))
    }

    pub fn or(self, other: Value) -> Value {
        lift2(self, other, |a, b| Some(Value::from_bool(a.truthy()? || b.truthy()?)))
    }

    pub fn logical_not(self) -> Value {
        lift1(self, |a| Some(Value::from_bool(!a.truthy()?)))
    }

    // ------------------------------------------------------------------
    // Storage
    // ------------------------------------------------------------------

    /// Read the value an lvalue refers to. Rvalues resolve to themselves.
    ///
    /// Words and variables are sign-extended, bytes are zero-extended.
    /// A location outside memory resolves to `Invalid`.
    pub fn resolve<V: DebugInterface + ?Sized>(self, vm: &V) -> Value {
        match self {
            Value::Variable(var) => Value::Number(vm.read_variable(var) as i16 as i32),
            Value::ByteAtAddress(addr) => {
                if addr < vm.memory_size() {
                    Value::Number(vm.read_byte(addr) as i32)
                } else {
                    Value::Invalid
                }
            }
            Value::WordAtAddress(addr) => {
                if addr.checked_add(1).is_some_and(|end| end < vm.memory_size()) {
                    Value::Number(vm.read_word(addr) as i16 as i32)
                } else {
                    Value::Invalid
                }
            }
            other => other,
        }
    }

    /// Store `value` into the location this lvalue names, truncated to its width.
    ///
    /// An invalid destination or value writes nothing and yields `Invalid`.
    /// Returns the destination so assignments can be chained.
    pub fn assign<V: DebugInterface + ?Sized>(
        self,
        value: Value,
        vm: &mut V,
    ) -> Result<Value, EvalError> {
        if self.is_valid() && !self.is_lvalue() {
            return Err(EvalError::expression(format!("cannot assign to a {}", self.kind())));
        }
        debug_assert!(!value.is_lvalue(), "assigned value must be resolved first");
        let (Some(_), Some(content)) = (self.valid(), value.content()) else {
            return Ok(Value::Invalid);
        };

        match self {
            Value::Variable(var) => vm.write_variable(var, content as u16),
            Value::ByteAtAddress(addr) => {
                if addr >= vm.memory_size() {
                    return Err(out_of_range(addr));
                }
                vm.write_byte(addr, content as u8);
            }
            Value::WordAtAddress(addr) => {
                if !addr.checked_add(1).is_some_and(|end| end < vm.memory_size()) {
                    return Err(out_of_range(addr));
                }
                vm.write_word(addr, content as u16);
            }
            _ => unreachable!("non-lvalues rejected above"),
        }
        Ok(self)
    }
}

fn out_of_range(addr: u32) -> EvalError {
    EvalError::expression(format!("address ${:04X} is outside memory", addr))
}

/// Apply `f` if `a` is valid, else `Invalid`.
fn lift1(a: Value, f: impl FnOnce(Value) -> Option<Value>) -> Value {
    debug_assert!(!a.is_lvalue(), "operands must be resolved first");
    a.valid().and_then(f).unwrap_or(Value::Invalid)
}

/// Apply `f` if both operands are valid, else `Invalid`.
fn lift2(a: Value, b: Value, f: impl FnOnce(Value, Value) -> Option<Value>) -> Value {
    debug_assert!(!a.is_lvalue() && !b.is_lvalue(), "operands must be resolved first");
    a.valid()
        .zip(b.valid())
        .and_then(|(a, b)| f(a, b))
        .unwrap_or(Value::Invalid)
}

fn compare(a: Value, b: Value, f: impl FnOnce(i32, i32) -> bool) -> Value {
    lift2(a, b, |a, b| Some(Value::from_bool(f(a.content()?, b.content()?))))
}

/// Result kind of `+ - & |`.
///
/// A number combined with anything keeps the other kind; an unpacked
/// address combined with a non-address stays a pointer; anything else
/// degrades to a plain number.
fn combined_kind(a: ValueKind, b: ValueKind) -> ValueKind {
    if a == ValueKind::Number {
        b
    } else if b == ValueKind::Number {
        a
    } else if (a.is_unpacked_address() && !b.is_address())
        || (b.is_unpacked_address() && !a.is_address())
    {
        ValueKind::Pointer
    } else {
        ValueKind::Number
    }
}

/// Arithmetic whose result kind is inferred from the operands.
fn kinded(a: Value, b: Value, f: impl FnOnce(i32, i32) -> i32) -> Value {
    lift2(a, b, |a, b| {
        let kind = combined_kind(a.kind(), b.kind());
        Some(Value::new(kind, f(a.content()?, b.content()?)))
    })
}

/// Arithmetic that always produces a number.
fn numeric(a: Value, b: Value, f: impl FnOnce(i32, i32) -> Option<i32>) -> Value {
    lift2(a, b, |a, b| f(a.content()?, b.content()?).map(Value::Number))
}

impl Add for Value {
    type Output = Value;
    fn add(self, rhs: Value) -> Value {
        kinded(self, rhs, i32::wrapping_add)
    }
}

impl Sub for Value {
    type Output = Value;
    fn sub(self, rhs: Value) -> Value {
        kinded(self, rhs, i32::wrapping_sub)
    }
}

impl BitAnd for Value {
    type Output = Value;
    fn bitand(self, rhs: Value) -> Value {
        kinded(self, rhs, |a, b| a & b)
    }
}

impl BitOr for Value {
    type Output = Value;
    fn bitor(self, rhs: Value) -> Value {
        kinded(self, rhs, |a, b| a | b)
    }
}

impl Mul for Value {
    type Output = Value;
    fn mul(self, rhs: Value) -> Value {
        numeric(self, rhs, |a, b| Some(a.wrapping_mul(b)))
    }
}

/// Division by zero yields `Invalid`.
impl Div for Value {
    type Output = Value;
    fn div(self, rhs: Value) -> Value {
        numeric(self, rhs, i32::checked_div)
    }
}

/// Modulo by zero yields `Invalid`.
impl Rem for Value {
    type Output = Value;
    fn rem(self, rhs: Value) -> Value {
        numeric(self, rhs, i32::checked_rem)
    }
}

impl Neg for Value {
    type Output = Value;
    fn neg(self) -> Value {
        lift1(self, |a| Some(Value::Number(a.content()?.wrapping_neg())))
    }
}

/// Bitwise complement.
impl Not for Value {
    type Output = Value;
    fn not(self) -> Value {
        lift1(self, |a| Some(Value::Number(!a.content()?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockMachine;

    #[test]
    fn test_invalid_absorbs() {
        let n = Value::Number(5);
        assert_eq!(Value::Invalid + n, Value::Invalid);
        assert_eq!(n - Value::Invalid, Value::Invalid);
        assert_eq!(n * Value::Invalid, Value::Invalid);
        assert_eq!(Value::Invalid / n, Value::Invalid);
        assert_eq!(-Value::Invalid, Value::Invalid);
        assert_eq!(!Value::Invalid, Value::Invalid);
        assert_eq!(n.equals(Value::Invalid), Value::Invalid);
        assert_eq!(Value::Invalid.less_than(n), Value::Invalid);
        assert_eq!(Value::Invalid.and(n), Value::Invalid);
        assert_eq!(Value::Invalid.logical_not(), Value::Invalid);
    }

    #[test]
    fn test_number_keeps_other_kind() {
        assert_eq!(Value::Object(5) + Value::Number(1), Value::Object(6));
        assert_eq!(Value::Number(2) + Value::Routine(0x400), Value::Routine(0x402));
        assert_eq!(Value::Number(3) + Value::Number(4), Value::Number(7));
        assert_eq!(Value::Pointer(0x100) - Value::Number(2), Value::Pointer(0xFE));
    }

    #[test]
    fn test_unpacked_address_with_non_address_is_pointer() {
        assert_eq!(Value::UnpackedString(0x200) + Value::Object(2), Value::Pointer(0x202));
        assert_eq!(Value::Property(4) + Value::ReadBuf(0x300), Value::Pointer(0x304));
        assert_eq!(Value::LexBuf(0x10) | Value::Attribute(1), Value::Pointer(0x11));
    }

    const RVALUE_KINDS: [ValueKind; 11] = [
        ValueKind::Number,
        ValueKind::Object,
        ValueKind::Attribute,
        ValueKind::Property,
        ValueKind::Pointer,
        ValueKind::Routine,
        ValueKind::PackedString,
        ValueKind::UnpackedString,
        ValueKind::ReadBuf,
        ValueKind::LexBuf,
        ValueKind::VariableNumber,
    ];

    #[test]
    fn test_number_keeps_every_kind_in_both_orders() {
        let n = Value::Number(1);
        for kind in RVALUE_KINDS {
            let x = Value::new(kind, 0x20);
            assert_eq!(x.kind(), kind);
            for result in [n + x, x + n, n - x, x - n, n & x, x & n, n | x, x | n] {
                assert_eq!(result.kind(), kind, "{:?} combined with a number", kind);
            }
        }
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let mut vm = MockMachine::sample();
        vm.write_word(0x0400, 0x8001);
        let lvalues = [
            Value::Variable(17),
            Value::ByteAtAddress(0x0400),
            Value::WordAtAddress(0x0400),
            Value::WordAtAddress(vm.memory_size()),
        ];
        let rvalues = RVALUE_KINDS.iter().map(|&kind| Value::new(kind, 0x30));
        for v in rvalues.chain(lvalues).chain([Value::Invalid]) {
            let once = v.resolve(&vm);
            assert!(!once.is_lvalue());
            assert_eq!(once.resolve(&vm), once, "resolving {:?} twice", v);
        }
    }

    #[test]
    fn test_mismatched_kinds_degrade_to_number() {
        assert_eq!(Value::Object(2) + Value::Object(3), Value::Number(5));
        assert_eq!(Value::Pointer(0x10) + Value::Routine(1), Value::Number(0x11));
        assert_eq!(Value::Pointer(0x10) - Value::Pointer(0x8), Value::Number(8));
    }

    #[test]
    fn test_multiplicative_ops_are_numbers() {
        assert_eq!(Value::Object(3) * Value::Number(2), Value::Number(6));
        assert_eq!(Value::Number(7) / Value::Number(2), Value::Number(3));
        assert_eq!(Value::Number(-7) % Value::Number(2), Value::Number(-1));
    }

    #[test]
    fn test_division_by_zero_is_invalid() {
        assert_eq!(Value::Number(7) / Value::Number(0), Value::Invalid);
        assert_eq!(Value::Number(7) % Value::Number(0), Value::Invalid);
    }

    #[test]
    fn test_bitwise() {
        assert_eq!(Value::Number(0x0F) & Value::Number(0x3C), Value::Number(0x0C));
        assert_eq!(Value::Number(0x0F) | Value::Number(0x30), Value::Number(0x3F));
        assert_eq!(!Value::Number(0), Value::Number(-1));
        assert_eq!(-Value::Number(5), Value::Number(-5));
    }

    #[test]
    fn test_comparisons_are_zero_or_one() {
        let (a, b) = (Value::Number(2), Value::Number(3));
        assert_eq!(a.less_than(b), Value::Number(1));
        assert_eq!(a.greater_than(b), Value::Number(0));
        assert_eq!(a.less_or_equal(a), Value::Number(1));
        assert_eq!(b.greater_or_equal(a), Value::Number(1));
        assert_eq!(a.equals(a), Value::Number(1));
        assert_eq!(a.not_equals(b), Value::Number(1));
        assert_eq!(Value::Object(2).equals(Value::Number(2)), Value::Number(1));
    }

    #[test]
    fn test_logic_is_zero_or_one() {
        assert_eq!(Value::Number(5).and(Value::Number(7)), Value::Number(1));
        assert_eq!(Value::Number(5).and(Value::Number(0)), Value::Number(0));
        assert_eq!(Value::Number(0).or(Value::Object(9)), Value::Number(1));
        assert_eq!(Value::Number(9).logical_not(), Value::Number(0));
        assert_eq!(Value::Number(0).logical_not(), Value::Number(1));
    }

    #[test]
    fn test_new_truncates_to_kind_width() {
        assert_eq!(Value::new(ValueKind::Object, 0x1_0005), Value::Object(5));
        assert_eq!(Value::new(ValueKind::VariableNumber, 0x110), Value::VariableNumber(0x10));
        assert_eq!(Value::new(ValueKind::Invalid, 42), Value::Invalid);
        assert_eq!(Value::new(ValueKind::Number, -3).content(), Some(-3));
    }

    #[test]
    fn test_cast_names() {
        assert_eq!(ValueKind::from_cast_name("OBJECT"), Some(ValueKind::Object));
        assert_eq!(ValueKind::from_cast_name("fix"), Some(ValueKind::Number));
        assert_eq!(ValueKind::from_cast_name("routine"), Some(ValueKind::Routine));
        assert_eq!(ValueKind::from_cast_name("word"), None);
        assert_eq!(ValueKind::from_cast_name("bogus"), None);
    }

    #[test]
    fn test_resolve_sign_and_zero_extension() {
        let mut vm = MockMachine::sample();
        vm.write_word(0x0400, 0xFFFE);
        assert_eq!(Value::WordAtAddress(0x0400).resolve(&vm), Value::Number(-2));
        assert_eq!(Value::ByteAtAddress(0x0400).resolve(&vm), Value::Number(0xFF));
        assert_eq!(Value::Number(4).resolve(&vm), Value::Number(4));
    }

    #[test]
    fn test_resolve_outside_memory_is_invalid() {
        let vm = MockMachine::sample();
        let size = vm.memory_size();
        assert_eq!(Value::ByteAtAddress(size).resolve(&vm), Value::Invalid);
        assert_eq!(Value::WordAtAddress(size - 1).resolve(&vm), Value::Invalid);
    }

    #[test]
    fn test_assign_then_resolve_word() {
        let mut vm = MockMachine::sample();
        let loc = Value::WordAtAddress(0x0400);
        for n in [0, 1, -1, 32767, -32768] {
            loc.assign(Value::Number(n), &mut vm).unwrap();
            assert_eq!(loc.resolve(&vm), Value::Number(n));
        }
        // wraps to 16 bits
        loc.assign(Value::Number(40000), &mut vm).unwrap();
        assert_eq!(loc.resolve(&vm), Value::Number(40000 - 65536));
    }

    #[test]
    fn test_assign_then_resolve_byte() {
        let mut vm = MockMachine::sample();
        let loc = Value::ByteAtAddress(0x0400);
        for n in [0, 1, 200, 255] {
            loc.assign(Value::Number(n), &mut vm).unwrap();
            assert_eq!(loc.resolve(&vm), Value::Number(n));
        }
        loc.assign(Value::Number(0x1FF), &mut vm).unwrap();
        assert_eq!(loc.resolve(&vm), Value::Number(0xFF));
        loc.assign(Value::Number(-1), &mut vm).unwrap();
        assert_eq!(loc.resolve(&vm), Value::Number(0xFF));
    }

    #[test]
    fn test_assign_then_resolve_variable() {
        let mut vm = MockMachine::sample();
        let score = Value::Variable(16);
        let result = score.assign(Value::Object(3), &mut vm).unwrap();
        assert_eq!(result, score);
        assert_eq!(score.resolve(&vm), Value::Number(3));
        score.assign(Value::Number(-100), &mut vm).unwrap();
        assert_eq!(score.resolve(&vm), Value::Number(-100));
    }

    #[test]
    fn test_assign_invalid_writes_nothing() {
        let mut vm = MockMachine::sample();
        vm.write_word(0x0400, 0x1234);
        let loc = Value::WordAtAddress(0x0400);
        assert_eq!(loc.assign(Value::Invalid, &mut vm), Ok(Value::Invalid));
        assert_eq!(vm.read_word(0x0400), 0x1234);
        assert_eq!(Value::Invalid.assign(Value::Number(1), &mut vm), Ok(Value::Invalid));
    }

    #[test]
    fn test_assign_to_rvalue_is_error() {
        let mut vm = MockMachine::sample();
        let err = Value::Number(3).assign(Value::Number(1), &mut vm).unwrap_err();
        assert_eq!(err, EvalError::expression("cannot assign to a number"));
    }

    #[test]
    fn test_assign_outside_memory_is_error() {
        let mut vm = MockMachine::sample();
        let size = vm.memory_size();
        assert!(Value::ByteAtAddress(size).assign(Value::Number(1), &mut vm).is_err());
        assert!(Value::WordAtAddress(size - 1).assign(Value::Number(1), &mut vm).is_err());
    }
}
