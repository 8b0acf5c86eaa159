//! Debug information types for Z-machine story files

/// Complete debug information for a compiled story
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DebugInfo {
    /// Source files referenced by the debug info
    pub files: Vec<SourceFile>,
    /// Routines with their code ranges, locals and line points
    pub routines: Vec<Routine>,
    /// Object names by object number
    pub objects: Vec<Symbol>,
    /// Attribute (flag) names by attribute number
    pub attributes: Vec<Symbol>,
    /// Property names by property number
    pub properties: Vec<Symbol>,
    /// Global variable names by global index (0-based, i.e. variable number - 16)
    pub globals: Vec<Symbol>,
}

/// A source file referenced in debug info
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    /// Unique ID for this file (index in files array)
    pub id: u32,
    /// Short name as written by the compiler
    pub name: String,
    /// Full path, when the compiler recorded one
    pub path: Option<String>,
}

impl SourceFile {
    /// The name to open when reading source text.
    pub fn display_path(&self) -> &str {
        self.path.as_deref().unwrap_or(&self.name)
    }
}

/// A named numbered entity: object, attribute, property or global.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// Name as written in source
    pub name: String,
    /// Object/attribute/property number, or global index
    pub number: u16,
}

/// A routine in the story file
#[derive(Debug, Clone, PartialEq)]
pub struct Routine {
    /// Routine name
    pub name: String,
    /// Unpacked address of the routine header
    pub code_start: u32,
    /// Unpacked address one past the last byte of the routine
    pub code_end: u32,
    /// Local variable names, in variable order (local 1 first)
    pub locals: Vec<String>,
    /// Sequence points, sorted by address
    pub lines: Vec<LinePoint>,
}

impl Routine {
    /// Whether the unpacked address lies inside this routine.
    pub fn contains(&self, address: u32) -> bool {
        address >= self.code_start && address < self.code_end
    }

    /// The first line point execution stops at when stepping into the routine.
    pub fn first_statement(&self) -> Option<&LinePoint> {
        self.lines
            .iter()
            .find(|p| p.flags.contains(LineFlags::STATEMENT))
            .or_else(|| self.lines.first())
    }
}

/// Mapping from a code address to a source position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinePoint {
    /// Unpacked code address
    pub address: u32,
    /// Source file ID
    pub file_id: u32,
    /// Line number (1-based)
    pub line: u32,
    /// Column number (1-based, 0 when unknown)
    pub col: u32,
    /// Flags for this point
    pub flags: LineFlags,
}

bitflags::bitflags! {
    /// Flags for line points
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct LineFlags: u8 {
        /// This is a statement boundary (good breakpoint location)
        const STATEMENT = 0b0000_0001;
        /// This point is the routine's entry (header, before any statement)
        const ROUTINE_ENTRY = 0b0000_0010;
    }
}
