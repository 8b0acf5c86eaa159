//! Breakpoint management
//!
//! Breakpoints are kept as a set of code addresses. The session arms and
//! disarms them in the VM; this module only resolves user address specs
//! and tracks which addresses are set.

use std::collections::BTreeSet;

use debuginfo::DebugInfo;

/// Set of breakpoint addresses, iterated in ascending order.
#[derive(Debug, Clone, Default)]
pub struct BreakpointSet {
    addresses: BTreeSet<u32>,
}

impl BreakpointSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an address. Returns false if it was already set.
    pub fn add(&mut self, addr: u32) -> bool {
        self.addresses.insert(addr)
    }

    /// Remove an address. Returns false if it was not set.
    pub fn remove(&mut self, addr: u32) -> bool {
        self.addresses.remove(&addr)
    }

    pub fn contains(&self, addr: u32) -> bool {
        self.addresses.contains(&addr)
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.addresses.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

/// Breakpoint address spec resolution
pub struct BreakpointManager;

impl BreakpointManager {
    /// Resolve an address spec to a code address.
    ///
    /// Tried in order:
    /// - `$hex`
    /// - a leading decimal number
    /// - `file:line`
    /// - `routine+offset`
    /// - a bare routine name, at its first statement
    pub fn resolve(spec: &str, info: Option<&DebugInfo>) -> Option<u32> {
        let spec = spec.trim();
        if let Some(hex) = spec.strip_prefix('$') {
            return u32::from_str_radix(hex, 16).ok();
        }
        if spec.starts_with(|c: char| c.is_ascii_digit()) {
            let end = spec.find(|c: char| !c.is_ascii_digit()).unwrap_or(spec.len());
            return spec[..end].parse().ok();
        }

        let info = info?;
        if let Some((file, line)) = spec.rsplit_once(':') {
            let line = line.trim().parse().ok()?;
            return info.address_of_line(file.trim(), line);
        }
        if let Some((name, offset)) = spec.split_once('+') {
            let routine = info.routine_by_name(name.trim())?;
            return Some(routine.code_start + parse_offset(offset.trim())?);
        }
        let routine = info.routine_by_name(spec)?;
        Some(
            routine
                .first_statement()
                .map_or(routine.code_start, |p| p.address),
        )
    }
}

/// Decimal or `$hex` offset.
fn parse_offset(text: &str) -> Option<u32> {
    match text.strip_prefix('$') {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}
