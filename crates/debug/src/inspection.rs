//! Inspection of frames, variables and the object tree
//!
//! Each operation renders to display lines; the session prints them.

use std::collections::HashSet;

use debuginfo::DebugInfo;

use crate::format::{address, Formatter};
use crate::interface::DebugInterface;
use crate::types::StoreTarget;

/// Maximum number of globals a story can have.
pub(crate) const MAX_GLOBALS: u16 = 240;

/// Header words that point at tables which may follow the globals:
/// high memory, dictionary, objects, static memory, abbreviations.
const HEADER_TABLES: [u32; 5] = [0x04, 0x08, 0x0A, 0x0E, 0x18];

/// Inspection operations
pub struct Inspector;

impl Inspector {
    /// One line per call frame, innermost first.
    pub fn backtrace<V: DebugInterface + ?Sized>(vm: &V, info: Option<&DebugInfo>) -> Vec<String> {
        let f = Formatter::new(vm, info);
        let frames = vm.frames();
        if frames.is_empty() {
            return vec!["No call frames.".to_string()];
        }

        let mut pc = vm.pc();
        let mut lines = Vec::with_capacity(frames.len());
        for (i, frame) in frames.iter().enumerate() {
            let store = match frame.store {
                StoreTarget::Global(g) => format!("global {}", f.variable_name(g + 16)),
                other => other.to_string(),
            };
            let mut line = format!(
                "#{} {} ({}) args={} stack={} store={}",
                i,
                f.location(pc),
                address(pc),
                frame.arg_count,
                frame.prev_stack_depth,
                store
            );
            if i + 1 < frames.len() {
                line.push_str(&format!(" return={}", f.location(frame.return_pc)));
            }
            lines.push(line);
            pc = frame.return_pc;
        }
        lines
    }

    /// Locals of the current frame, then the words it has pushed.
    ///
    /// The stack is read by popping and is restored before returning.
    pub fn locals<V: DebugInterface + ?Sized>(vm: &mut V, info: Option<&DebugInfo>) -> Vec<String> {
        let Some(frame) = vm.frames().into_iter().next() else {
            return vec!["No call frame.".to_string()];
        };

        let names = info
            .and_then(|i| i.routine_starting_at(frame.routine))
            .map(|r| r.locals.clone())
            .unwrap_or_default();

        let count = vm.stack_depth().saturating_sub(frame.prev_stack_depth);
        let mut popped: Vec<u16> = (0..count).map(|_| vm.pop_stack()).collect();
        for word in popped.iter().rev() {
            vm.push_stack(*word);
        }
        popped.reverse();

        let f = Formatter::new(&*vm, info);
        let mut lines = Vec::new();
        for (i, value) in frame.locals.iter().enumerate() {
            let name = names.get(i).cloned().unwrap_or_else(|| format!("local{}", i + 1));
            lines.push(format!("{} = {}", name, f.number(*value as i16 as i32)));
        }
        for (i, value) in popped.iter().enumerate() {
            lines.push(format!("stack[{}] = {}", i, f.number(*value as i16 as i32)));
        }
        if lines.is_empty() {
            lines.push("No locals.".to_string());
        }
        lines
    }

    /// Global variables, by debug-info name when available.
    pub fn globals<V: DebugInterface + ?Sized>(vm: &V, info: Option<&DebugInfo>) -> Vec<String> {
        let f = Formatter::new(vm, info);
        let value = |index: u16| f.number(vm.read_variable((index + 16) as u8) as i16 as i32);

        match info.filter(|i| !i.globals.is_empty()) {
            Some(info) => {
                let mut globals: Vec<_> = info.globals.iter().collect();
                globals.sort_by_key(|g| g.number);
                globals
                    .into_iter()
                    .filter(|g| g.number < MAX_GLOBALS)
                    .map(|g| format!("{} = {}", g.name, value(g.number)))
                    .collect()
            }
            None => (0..Self::estimate_global_count(vm))
                .map(|i| format!("G{:02X} = {}", i, value(i)))
                .collect(),
        }
    }

    /// Guess how many globals exist from the nearest header table after them.
    pub fn estimate_global_count<V: DebugInterface + ?Sized>(vm: &V) -> u16 {
        let globals = vm.read_word(0x0C) as u32;
        HEADER_TABLES
            .iter()
            .map(|&field| vm.read_word(field) as u32)
            .filter(|&addr| addr > globals)
            .min()
            .map_or(MAX_GLOBALS, |next| ((next - globals) / 2).min(MAX_GLOBALS as u32) as u16)
    }

    /// Links, attributes and properties of one object.
    pub fn show_object<V: DebugInterface + ?Sized>(
        vm: &V,
        info: Option<&DebugInfo>,
        obj: u16,
    ) -> Vec<String> {
        let f = Formatter::new(vm, info);
        let mut lines = vec![
            f.object_label(obj),
            format!("  parent: {}", f.object_label(vm.object_parent(obj))),
            format!("  sibling: {}", f.object_label(vm.object_sibling(obj))),
            format!("  child: {}", f.object_label(vm.object_child(obj))),
        ];

        let max_attr: u16 = if vm.version() <= 3 { 32 } else { 48 };
        let base = vm.object_address(obj);
        let attrs: Vec<String> = (0..max_attr)
            .filter(|a| vm.read_byte(base + (*a as u32 >> 3)) & (0x80 >> (a & 7)) != 0)
            .map(|a| f.attribute_label(a))
            .collect();
        if attrs.is_empty() {
            lines.push("  attributes: none".to_string());
        } else {
            lines.push(format!("  attributes: {}", attrs.join(", ")));
        }

        lines.push("  properties:".to_string());
        let mut prop = vm.next_property(obj, 0);
        let mut seen = HashSet::new();
        while prop != 0 && seen.insert(prop) {
            let addr = vm.property_address(obj, prop);
            let len = vm.property_length(addr) as u32;
            let bytes: Vec<String> = (0..len)
                .map(|i| format!("{:02X}", vm.read_byte(addr + i)))
                .collect();
            lines.push(format!("    {}: {}", f.property_label(prop), bytes.join(" ")));
            prop = vm.next_property(obj, prop);
        }
        lines
    }

    /// The object tree under `root`, or under every parentless object.
    ///
    /// Each object appears once; a link back to an object already shown is
    /// marked as a cycle and not followed.
    pub fn tree<V: DebugInterface + ?Sized>(
        vm: &V,
        info: Option<&DebugInfo>,
        root: Option<u16>,
    ) -> Vec<String> {
        let f = Formatter::new(vm, info);
        let mut visited = HashSet::new();
        let mut lines = Vec::new();
        match root {
            Some(obj) => walk(vm, &f, obj, 0, &mut visited, &mut lines),
            None => {
                for obj in 1..=vm.object_count() {
                    if vm.object_parent(obj) == 0 {
                        walk(vm, &f, obj, 0, &mut visited, &mut lines);
                    }
                }
            }
        }
        if lines.is_empty() {
            lines.push("No objects.".to_string());
        }
        lines
    }
}

fn walk<V: DebugInterface + ?Sized>(
    vm: &V,
    f: &Formatter<'_, V>,
    obj: u16,
    depth: usize,
    visited: &mut HashSet<u16>,
    lines: &mut Vec<String>,
) {
    let indent = "  ".repeat(depth);
    if !visited.insert(obj) {
        lines.push(format!("{}{} (cycle)", indent, f.object_label(obj)));
        return;
    }
    lines.push(format!("{}{}", indent, f.object_label(obj)));

    let mut child = vm.object_child(obj);
    while child != 0 {
        if visited.contains(&child) {
            lines.push(format!("{}  {} (cycle)", indent, f.object_label(child)));
            break;
        }
        walk(vm, f, child, depth + 1, visited, lines);
        child = vm.object_sibling(child);
    }
}
