//! Source mapping between story addresses and source lines

use common::{SourceCache, SourceLoc};
use debuginfo::DebugInfo;

/// A source position for a story address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePosition {
    /// File ID in the debug info
    pub file_id: u32,
    /// Display path of the file
    pub file: String,
    pub loc: SourceLoc,
    /// Routine containing the address
    pub routine: Option<String>,
}

impl SourcePosition {
    /// `(file, line)`, the unit line stepping compares.
    pub fn line_key(&self) -> (u32, u32) {
        (self.file_id, self.loc.line)
    }
}

/// Source mapping operations
pub struct SourceMapper;

impl SourceMapper {
    /// Map an address to the line point covering it.
    pub fn position(info: &DebugInfo, addr: u32) -> Option<SourcePosition> {
        let point = info.line_at(addr)?;
        let file = info.file(point.file_id)?;
        Some(SourcePosition {
            file_id: point.file_id,
            file: file.display_path().to_string(),
            loc: SourceLoc::new(point.line, point.col),
            routine: info.routine_at(addr).map(|r| r.name.clone()),
        })
    }

    /// `(file, line)` for an address, if debug info covers it.
    pub fn line_key(info: Option<&DebugInfo>, addr: u32) -> Option<(u32, u32)> {
        info.and_then(|i| Self::position(i, addr)).map(|p| p.line_key())
    }

    /// `file:line: text`, or `file:line` when the source cannot be read.
    pub fn describe_line(sources: &mut SourceCache, pos: &SourcePosition) -> String {
        match sources.line(&pos.file, pos.loc.line) {
            Some(text) => format!("{}:{}: {}", pos.file, pos.loc.line, text.trim()),
            None => format!("{}:{}", pos.file, pos.loc.line),
        }
    }

    /// Resolve `file:line` or a bare line number in the current file.
    pub fn parse_line_spec(
        info: &DebugInfo,
        spec: &str,
        current: Option<&SourcePosition>,
    ) -> Option<(String, u32)> {
        match spec.rsplit_once(':') {
            Some((file, line)) => {
                let line = line.trim().parse().ok()?;
                let file = info.find_file(file.trim())?;
                Some((file.display_path().to_string(), line))
            }
            None => {
                let line = spec.trim().parse().ok()?;
                current.map(|c| (c.file.clone(), line))
            }
        }
    }

    /// Source lines around `line`, with `>` marking `current_line`.
    pub fn listing(
        sources: &mut SourceCache,
        file: &str,
        line: u32,
        radius: u32,
        current_line: Option<u32>,
    ) -> Vec<String> {
        sources
            .window(file, line, radius)
            .into_iter()
            .map(|(n, text)| {
                let marker = if Some(n) == current_line { ">" } else { " " };
                format!("{} {:4} {}", marker, n, text)
            })
            .collect()
    }
}
