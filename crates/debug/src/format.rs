//! Rendering values, addresses, variables and objects for display

use debuginfo::DebugInfo;

use crate::interface::DebugInterface;
use crate::value::Value;

/// `$` followed by at least four uppercase hex digits.
pub fn address(addr: u32) -> String {
    format!("${:04X}", addr)
}

/// Formats values with names from the VM and debug info.
pub struct Formatter<'a, V: DebugInterface + ?Sized> {
    vm: &'a V,
    info: Option<&'a DebugInfo>,
}

impl<'a, V: DebugInterface + ?Sized> Formatter<'a, V> {
    pub fn new(vm: &'a V, info: Option<&'a DebugInfo>) -> Self {
        Formatter { vm, info }
    }

    /// `ROUTINE+offset` for an address inside a known routine, else the hex address.
    pub fn location(&self, addr: u32) -> String {
        match self.info.and_then(|i| i.routine_at(addr)) {
            Some(r) if addr == r.code_start => r.name.clone(),
            Some(r) => format!("{}+{}", r.name, addr - r.code_start),
            None => address(addr),
        }
    }

    /// Name of a routine starting at an unpacked address.
    pub fn routine_name(&self, addr: u32) -> String {
        match self.info.and_then(|i| i.routine_starting_at(addr)) {
            Some(r) => r.name.clone(),
            None => address(addr),
        }
    }

    /// Display name of a variable: `sp`, a local's name, or a global's name.
    pub fn variable_name(&self, var: u8) -> String {
        match var {
            0 => "sp".to_string(),
            1..=15 => self
                .info
                .and_then(|i| i.routine_at(self.vm.pc()))
                .and_then(|r| r.locals.get(var as usize - 1))
                .cloned()
                .unwrap_or_else(|| format!("local{}", var)),
            _ => {
                let index = var as u16 - 16;
                self.info
                    .and_then(|i| i.global_name(index))
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("G{:02X}", index))
            }
        }
    }

    /// `#5 (LAMP) "brass lamp"`; object 0 is `nothing`.
    pub fn object_label(&self, obj: u16) -> String {
        if obj == 0 {
            return "nothing".to_string();
        }
        let mut label = format!("#{}", obj);
        if let Some(name) = self.info.and_then(|i| i.object_name(obj)) {
            label.push_str(&format!(" ({})", name));
        }
        if obj <= self.vm.object_count() {
            label.push_str(&format!(" \"{}\"", self.vm.object_short_name(obj)));
        }
        label
    }

    pub fn attribute_label(&self, attr: u16) -> String {
        match self.info.and_then(|i| i.attribute_name(attr)) {
            Some(name) => format!("{} ({})", name, attr),
            None => attr.to_string(),
        }
    }

    pub fn property_label(&self, prop: u16) -> String {
        match self.info.and_then(|i| i.property_name(prop)) {
            Some(name) => format!("{} ({})", name, prop),
            None => prop.to_string(),
        }
    }

    /// A number with its 16-bit hex form, e.g. `-1 ($FFFF)`.
    pub fn number(&self, n: i32) -> String {
        format!("{} (${:04X})", n, n as u16)
    }

    /// Render any value. Lvalues show where they point and what they hold.
    pub fn value(&self, value: Value) -> String {
        match value {
            Value::Invalid => "<invalid>".to_string(),
            Value::Number(n) => self.number(n),
            Value::Object(n) => format!("object {}", self.object_label(n)),
            Value::Attribute(n) => format!("attribute {}", self.attribute_label(n)),
            Value::Property(n) => format!("property {}", self.property_label(n)),
            Value::Pointer(a) => format!("pointer {}", address(a)),
            Value::Routine(p) => {
                let addr = self.vm.unpack_routine(p);
                match self.info.and_then(|i| i.routine_starting_at(addr)) {
                    Some(r) => format!("routine {} ({})", r.name, address(addr)),
                    None => format!("routine {}", address(addr)),
                }
            }
            Value::PackedString(p) => {
                let addr = self.vm.unpack_string(p);
                format!("string {} \"{}\"", address(addr), self.vm.decode_text(addr))
            }
            Value::UnpackedString(a) => {
                format!("string {} \"{}\"", address(a), self.vm.decode_text(a))
            }
            Value::ReadBuf(a) => format!("readbuf {}", address(a)),
            Value::LexBuf(a) => format!("lexbuf {}", address(a)),
            Value::VariableNumber(v) => format!("variable {} ({})", v, self.variable_name(v)),
            Value::Variable(_) | Value::ByteAtAddress(_) | Value::WordAtAddress(_) => {
                format!("{} = {}", self.lvalue(value), self.value(value.resolve(self.vm)))
            }
        }
    }

    /// Describe the location an lvalue names.
    pub fn lvalue(&self, value: Value) -> String {
        match value {
            Value::Variable(0) => "stack top".to_string(),
            Value::Variable(v @ 1..=15) => format!("local {}", self.variable_name(v)),
            Value::Variable(v) => format!("global {}", self.variable_name(v)),
            Value::ByteAtAddress(a) => format!("byte at {}", address(a)),
            Value::WordAtAddress(a) => format!("word at {}", address(a)),
            other => self.value(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{sample_debug_info, MockMachine, GO};

    #[test]
    fn test_address_format() {
        assert_eq!(address(0x1F), "$001F");
        assert_eq!(address(0x1234), "$1234");
        assert_eq!(address(0x12345), "$12345");
    }

    #[test]
    fn test_location() {
        let vm = MockMachine::sample();
        let info = sample_debug_info();
        let f = Formatter::new(&vm, Some(&info));
        assert_eq!(f.location(GO), "GO");
        assert_eq!(f.location(GO + 5), "GO+5");
        assert_eq!(f.location(0x0800), "$0800");
        let bare = Formatter::new(&vm, None);
        assert_eq!(bare.location(GO + 5), "$1015");
    }

    #[test]
    fn test_values() {
        let vm = MockMachine::sample();
        let info = sample_debug_info();
        let f = Formatter::new(&vm, Some(&info));
        assert_eq!(f.value(Value::Invalid), "<invalid>");
        assert_eq!(f.value(Value::Number(42)), "42 ($002A)");
        assert_eq!(f.value(Value::Number(-1)), "-1 ($FFFF)");
        assert_eq!(f.value(Value::Object(2)), "object #2 (LAMP) \"brass lamp\"");
        assert_eq!(f.value(Value::Object(0)), "object nothing");
        assert_eq!(f.value(Value::Attribute(3)), "attribute LIGHTBIT (3)");
        assert_eq!(f.value(Value::Property(40)), "property 40");
        assert_eq!(f.value(Value::Pointer(0x123)), "pointer $0123");
        assert_eq!(f.value(Value::Routine(GO / 4)), "routine GO ($1010)");
        assert_eq!(f.value(Value::PackedString(0x140)), "string $0500 \"hello sailor\"");
        assert_eq!(f.value(Value::VariableNumber(16)), "variable 16 (SCORE)");
    }

    #[test]
    fn test_lvalues() {
        let vm = MockMachine::sample();
        let info = sample_debug_info();
        let f = Formatter::new(&vm, Some(&info));
        assert_eq!(f.value(Value::Variable(17)), "global HERE = 1 ($0001)");
        assert_eq!(f.value(Value::WordAtAddress(0x123)), "word at $0123 = 42 ($002A)");
        assert_eq!(f.value(Value::ByteAtAddress(0x124)), "byte at $0124 = 42 ($002A)");
        assert_eq!(f.value(Value::ByteAtAddress(0xFFFF)), "byte at $FFFF = <invalid>");
    }

    #[test]
    fn test_variable_names() {
        let mut vm = MockMachine::sample();
        let info = sample_debug_info();
        assert_eq!(Formatter::new(&vm, Some(&info)).variable_name(1), "local1");
        assert_eq!(Formatter::new(&vm, Some(&info)).variable_name(20), "G04");
        vm.step_into().unwrap();
        vm.step_into().unwrap();
        let f = Formatter::new(&vm, Some(&info));
        assert_eq!(f.variable_name(0), "sp");
        assert_eq!(f.variable_name(2), "FLAG");
        assert_eq!(f.variable_name(16), "SCORE");
    }
}
