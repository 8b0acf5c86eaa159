//! Name and address lookups over [`DebugInfo`]
//!
//! Names in ZIL and Inform are case-insensitive, so every name lookup
//! compares ASCII case-insensitively.

use crate::types::{DebugInfo, LinePoint, Routine, SourceFile, Symbol};

fn find_by_name<'a>(symbols: &'a [Symbol], name: &str) -> Option<&'a Symbol> {
    symbols.iter().find(|s| s.name.eq_ignore_ascii_case(name))
}

fn find_by_number(symbols: &[Symbol], number: u16) -> Option<&str> {
    symbols
        .iter()
        .find(|s| s.number == number)
        .map(|s| s.name.as_str())
}

impl DebugInfo {
    /// Look up a routine by name
    pub fn routine_by_name(&self, name: &str) -> Option<&Routine> {
        self.routines.iter().find(|r| r.name.eq_ignore_ascii_case(name))
    }

    /// Find the routine containing an unpacked code address
    pub fn routine_at(&self, address: u32) -> Option<&Routine> {
        self.routines.iter().find(|r| r.contains(address))
    }

    /// Find the routine whose header starts exactly at an unpacked address
    pub fn routine_starting_at(&self, address: u32) -> Option<&Routine> {
        self.routines.iter().find(|r| r.code_start == address)
    }

    /// Object number for a name
    pub fn find_object(&self, name: &str) -> Option<u16> {
        find_by_name(&self.objects, name).map(|s| s.number)
    }

    /// Name of an object number
    pub fn object_name(&self, number: u16) -> Option<&str> {
        find_by_number(&self.objects, number)
    }

    /// Attribute number for a name
    pub fn find_attribute(&self, name: &str) -> Option<u16> {
        find_by_name(&self.attributes, name).map(|s| s.number)
    }

    /// Name of an attribute number
    pub fn attribute_name(&self, number: u16) -> Option<&str> {
        find_by_number(&self.attributes, number)
    }

    /// Property number for a name
    pub fn find_property(&self, name: &str) -> Option<u16> {
        find_by_name(&self.properties, name).map(|s| s.number)
    }

    /// Name of a property number
    pub fn property_name(&self, number: u16) -> Option<&str> {
        find_by_number(&self.properties, number)
    }

    /// Global index (variable number - 16) for a name
    pub fn find_global(&self, name: &str) -> Option<u16> {
        find_by_name(&self.globals, name).map(|s| s.number)
    }

    /// Name of a global index
    pub fn global_name(&self, index: u16) -> Option<&str> {
        find_by_number(&self.globals, index)
    }

    /// Look up a file by ID
    pub fn file(&self, id: u32) -> Option<&SourceFile> {
        self.files.iter().find(|f| f.id == id)
    }

    /// Find a file by name, accepting a trailing path match
    pub fn find_file(&self, name: &str) -> Option<&SourceFile> {
        self.files.iter().find(|f| {
            f.name.eq_ignore_ascii_case(name)
                || f.path.as_deref().is_some_and(|p| p.eq_ignore_ascii_case(name))
                || f.name.ends_with(name)
                || f.path.as_deref().is_some_and(|p| p.ends_with(name))
        })
    }

    /// The line point covering an unpacked code address.
    ///
    /// Uses the point with the greatest address that is still <= `address`,
    /// within the routine containing `address`.
    pub fn line_at(&self, address: u32) -> Option<&LinePoint> {
        let routine = self.routine_at(address)?;
        routine
            .lines
            .iter()
            .filter(|p| p.address <= address)
            .max_by_key(|p| p.address)
    }

    /// The lowest code address recorded for a file and line.
    pub fn address_of_line(&self, file: &str, line: u32) -> Option<u32> {
        let file_id = self.find_file(file)?.id;
        self.routines
            .iter()
            .flat_map(|r| r.lines.iter())
            .filter(|p| p.file_id == file_id && p.line == line)
            .map(|p| p.address)
            .min()
    }
}
