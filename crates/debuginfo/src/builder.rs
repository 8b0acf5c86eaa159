//! Debug information builder

use crate::types::{DebugInfo, LineFlags, LinePoint, Routine, SourceFile, Symbol};
use std::collections::HashMap;

/// Builder for constructing DebugInfo
#[derive(Debug, Default)]
pub struct DebugInfoBuilder {
    /// Source files by name
    file_map: HashMap<String, u32>,
    /// Source files in order
    files: Vec<SourceFile>,
    /// Routines in order of declaration
    routines: Vec<Routine>,
    objects: Vec<Symbol>,
    attributes: Vec<Symbol>,
    properties: Vec<Symbol>,
    globals: Vec<Symbol>,
}

impl DebugInfoBuilder {
    /// Create a new debug info builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source file, returns its ID
    ///
    /// If the file was already added, returns the existing ID.
    pub fn add_file(&mut self, name: &str, path: Option<&str>) -> u32 {
        if let Some(&id) = self.file_map.get(name) {
            return id;
        }

        let id = self.files.len() as u32;
        self.files.push(SourceFile {
            id,
            name: name.to_string(),
            path: path.map(String::from),
        });
        self.file_map.insert(name.to_string(), id);
        id
    }

    /// Begin a new routine, returns its routine ID
    pub fn begin_routine(&mut self, name: &str, code_start: u32, code_end: u32) -> usize {
        self.routines.push(Routine {
            name: name.to_string(),
            code_start,
            code_end,
            locals: Vec::new(),
            lines: Vec::new(),
        });
        self.routines.len() - 1
    }

    /// Add the next local variable of a routine
    pub fn add_local(&mut self, routine: usize, name: &str) {
        if let Some(r) = self.routines.get_mut(routine) {
            r.locals.push(name.to_string());
        }
    }

    /// Add a line point to a routine
    pub fn add_line(
        &mut self,
        routine: usize,
        address: u32,
        file_id: u32,
        line: u32,
        col: u32,
        flags: LineFlags,
    ) {
        if let Some(r) = self.routines.get_mut(routine) {
            r.lines.push(LinePoint {
                address,
                file_id,
                line,
                col,
                flags,
            });
        }
    }

    /// Name an object number
    pub fn add_object(&mut self, name: &str, number: u16) {
        self.objects.push(Symbol { name: name.to_string(), number });
    }

    /// Name an attribute number
    pub fn add_attribute(&mut self, name: &str, number: u16) {
        self.attributes.push(Symbol { name: name.to_string(), number });
    }

    /// Name a property number
    pub fn add_property(&mut self, name: &str, number: u16) {
        self.properties.push(Symbol { name: name.to_string(), number });
    }

    /// Name a global by index (variable number - 16)
    pub fn add_global(&mut self, name: &str, index: u16) {
        self.globals.push(Symbol { name: name.to_string(), number: index });
    }

    /// Build the final DebugInfo, sorting each routine's line points by address
    pub fn build(mut self) -> DebugInfo {
        for routine in &mut self.routines {
            routine.lines.sort_by_key(|p| p.address);
        }
        DebugInfo {
            files: self.files,
            routines: self.routines,
            objects: self.objects,
            attributes: self.attributes,
            properties: self.properties,
            globals: self.globals,
        }
    }
}
