//! Scripted Z-machine for tests
//!
//! [`MockMachine`] implements [`DebugInterface`] over real story memory
//! (header, globals, object table and property tables are laid out the way
//! a story file lays them out) but replaces instruction decoding with a
//! small scripted program: each address maps to an [`Instr`] and the
//! address of the next instruction.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use common::SourceCache;
use debuginfo::{DebugInfo, DebugInfoBuilder, LineFlags};

use crate::error::VmError;
use crate::interface::DebugInterface;
use crate::types::{CallEvent, CallFrame, PauseHandle, PauseState, StoreTarget};

const GLOBALS_ADDR: u32 = 0x40;
const DYNAMIC_END: u16 = 0x0800;

/// One scripted instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instr {
    /// Does nothing
    Step,
    /// Push a word on the evaluation stack
    Push(u16),
    /// Call a routine by packed address, storing its result in `store`
    Call { routine: u32, args: Vec<u16>, store: Option<u8> },
    /// Return from the current routine
    Return(u16),
    Jump(u32),
    Quit,
    /// Stop with an error
    Fault,
    /// Panic, as an interpreter bug would
    Panic,
}

#[derive(Debug, Clone)]
struct MockObject {
    name: String,
    parent: u16,
    attributes: Vec<u16>,
    properties: Vec<(u16, Vec<u8>)>,
}

/// Builder for [`MockMachine`].
#[derive(Debug, Clone)]
pub struct MockBuilder {
    version: u8,
    memory_size: u32,
    globals: Vec<u16>,
    defaults: Vec<(u16, u16)>,
    objects: Vec<MockObject>,
    routines: BTreeMap<u32, u8>,
    program: BTreeMap<u32, (Instr, u32)>,
    entry: u32,
    results: HashMap<u32, u16>,
    strings: HashMap<u32, String>,
}

impl MockBuilder {
    pub fn new(version: u8) -> Self {
        MockBuilder {
            version,
            memory_size: 0x2000,
            globals: vec![0; 16],
            defaults: Vec::new(),
            objects: Vec::new(),
            routines: BTreeMap::new(),
            program: BTreeMap::new(),
            entry: 0,
            results: HashMap::new(),
            strings: HashMap::new(),
        }
    }

    /// Number of global variables laid out before the object table.
    pub fn globals(mut self, count: usize) -> Self {
        self.globals.resize(count, 0);
        self
    }

    pub fn global(mut self, index: usize, value: u16) -> Self {
        if index >= self.globals.len() {
            self.globals.resize(index + 1, 0);
        }
        self.globals[index] = value;
        self
    }

    pub fn default_property(mut self, prop: u16, value: u16) -> Self {
        self.defaults.push((prop, value));
        self
    }

    /// Add the next object; objects are numbered from 1 in insertion order.
    pub fn object(
        mut self,
        name: &str,
        parent: u16,
        attributes: &[u16],
        properties: &[(u16, &[u8])],
    ) -> Self {
        self.objects.push(MockObject {
            name: name.to_string(),
            parent,
            attributes: attributes.to_vec(),
            properties: properties.iter().map(|(n, d)| (*n, d.to_vec())).collect(),
        });
        self
    }

    /// Declare a routine header at an unpacked address.
    pub fn routine(mut self, address: u32, locals: u8) -> Self {
        self.routines.insert(address, locals);
        self
    }

    /// Place an instruction of `len` bytes at `address`.
    pub fn instr(mut self, address: u32, len: u32, instr: Instr) -> Self {
        self.program.insert(address, (instr, address + len));
        self
    }

    /// Routine the story starts in.
    pub fn entry(mut self, routine: u32) -> Self {
        self.entry = routine;
        self
    }

    /// Result of calling a routine from an expression.
    pub fn result(mut self, packed: u32, value: u16) -> Self {
        self.results.insert(packed, value);
        self
    }

    /// Text decoded at an unpacked address.
    pub fn string(mut self, address: u32, text: &str) -> Self {
        self.strings.insert(address, text.to_string());
        self
    }

    pub fn build(self) -> MockMachine {
        let v4 = self.version >= 4;
        let mut mem = vec![0u8; self.memory_size as usize];
        let put_word = |mem: &mut Vec<u8>, addr: u32, w: u16| {
            mem[addr as usize] = (w >> 8) as u8;
            mem[addr as usize + 1] = w as u8;
        };

        for (i, g) in self.globals.iter().enumerate() {
            put_word(&mut mem, GLOBALS_ADDR + 2 * i as u32, *g);
        }

        let object_table = GLOBALS_ADDR + 2 * self.globals.len() as u32;
        let default_count: u32 = if v4 { 63 } else { 31 };
        for (prop, value) in &self.defaults {
            put_word(&mut mem, object_table + 2 * (*prop as u32 - 1), *value);
        }

        let entry_size: u32 = if v4 { 14 } else { 9 };
        let entries = object_table + 2 * default_count;
        let count = self.objects.len() as u16;
        let entry_addr = |obj: u16| entries + (obj as u32 - 1) * entry_size;

        // Link children so each parent's child chain is in ascending order.
        let mut parent = vec![0u16; count as usize + 1];
        let mut child = vec![0u16; count as usize + 1];
        let mut sibling = vec![0u16; count as usize + 1];
        for obj in (1..=count).rev() {
            let p = self.objects[obj as usize - 1].parent;
            if p != 0 {
                parent[obj as usize] = p;
                sibling[obj as usize] = child[p as usize];
                child[p as usize] = obj;
            }
        }

        let mut next = entries + count as u32 * entry_size;
        for (i, object) in self.objects.iter().enumerate() {
            let obj = i as u16 + 1;
            let addr = entry_addr(obj);
            for attr in &object.attributes {
                mem[(addr + (*attr as u32 >> 3)) as usize] |= 0x80 >> (attr & 7);
            }
            let links = [parent[obj as usize], sibling[obj as usize], child[obj as usize]];
            if v4 {
                for (k, link) in links.iter().enumerate() {
                    put_word(&mut mem, addr + 6 + 2 * k as u32, *link);
                }
                put_word(&mut mem, addr + 12, next as u16);
            } else {
                for (k, link) in links.iter().enumerate() {
                    mem[(addr + 4) as usize + k] = *link as u8;
                }
                put_word(&mut mem, addr + 7, next as u16);
            }

            // Empty short name, then properties in descending order.
            mem[next as usize] = 0;
            next += 1;
            let mut props = object.properties.clone();
            props.sort_by(|a, b| b.0.cmp(&a.0));
            for (num, data) in props {
                let len = data.len() as u8;
                if !v4 {
                    mem[next as usize] = 32 * (len - 1) + num as u8;
                    next += 1;
                } else if len <= 2 {
                    mem[next as usize] = num as u8 | if len == 2 { 0x40 } else { 0 };
                    next += 1;
                } else {
                    mem[next as usize] = 0x80 | num as u8;
                    mem[next as usize + 1] = 0x80 | (len & 0x3F);
                    next += 2;
                }
                for b in data {
                    mem[next as usize] = b;
                    next += 1;
                }
            }
            mem[next as usize] = 0;
            next += 1;
        }

        let body = body_start(self.version, self.entry, self.routines.get(&self.entry).copied());
        mem[0] = self.version;
        put_word(&mut mem, 0x04, 0x1000);
        put_word(&mut mem, 0x06, body as u16);
        put_word(&mut mem, 0x08, DYNAMIC_END);
        put_word(&mut mem, 0x0A, object_table as u16);
        put_word(&mut mem, 0x0C, GLOBALS_ADDR as u16);
        put_word(&mut mem, 0x0E, DYNAMIC_END);
        put_word(&mut mem, 0x18, DYNAMIC_END);

        let mut machine = MockMachine {
            version: self.version,
            initial: mem.clone(),
            memory: mem,
            object_table,
            object_count: count,
            names: self.objects.into_iter().map(|o| o.name).collect(),
            routines: self.routines,
            program: self.program,
            entry: self.entry,
            results: self.results,
            strings: self.strings,
            pc: 0,
            state: PauseState::PausedOnEntry,
            frames: Vec::new(),
            stack: Vec::new(),
            breakpoints: BTreeSet::new(),
            pause: PauseHandle::new(),
            tracing: false,
            events: Vec::new(),
        };
        machine.reset_execution();
        machine
    }
}

fn body_start(version: u8, routine: u32, locals: Option<u8>) -> u32 {
    let locals = locals.unwrap_or(0) as u32;
    if version <= 4 {
        routine + 1 + 2 * locals
    } else {
        routine + 1
    }
}

/// A scripted Z-machine.
#[derive(Debug)]
pub struct MockMachine {
    version: u8,
    memory: Vec<u8>,
    initial: Vec<u8>,
    object_table: u32,
    object_count: u16,
    names: Vec<String>,
    routines: BTreeMap<u32, u8>,
    program: BTreeMap<u32, (Instr, u32)>,
    entry: u32,
    results: HashMap<u32, u16>,
    strings: HashMap<u32, String>,
    pc: u32,
    state: PauseState,
    /// Outermost first
    frames: Vec<CallFrame>,
    stack: Vec<u16>,
    breakpoints: BTreeSet<u32>,
    pause: PauseHandle,
    tracing: bool,
    events: Vec<CallEvent>,
}

impl MockMachine {
    pub fn builder(version: u8) -> MockBuilder {
        MockBuilder::new(version)
    }

    /// Addresses currently armed as breakpoints.
    pub fn armed_breakpoints(&self) -> Vec<u32> {
        self.breakpoints.iter().copied().collect()
    }

    pub fn is_tracing(&self) -> bool {
        self.tracing
    }

    fn reset_execution(&mut self) {
        let locals = self.routines.get(&self.entry).copied().unwrap_or(0);
        self.stack.clear();
        self.frames = vec![CallFrame {
            routine: self.entry,
            return_pc: 0,
            arg_count: 0,
            prev_stack_depth: 0,
            store: StoreTarget::Discard,
            locals: vec![0; locals as usize],
        }];
        self.pc = body_start(self.version, self.entry, Some(locals));
        self.state = PauseState::PausedOnEntry;
        self.events.clear();
        self.pause.take();
    }

    fn packing_factor(&self) -> u32 {
        match self.version {
            1..=3 => 2,
            4..=7 => 4,
            _ => 8,
        }
    }

    fn globals_addr(&self) -> u32 {
        self.read_word(0x0C) as u32
    }

    fn entry_size(&self) -> u32 {
        if self.version >= 4 {
            14
        } else {
            9
        }
    }

    fn default_count(&self) -> u32 {
        if self.version >= 4 {
            63
        } else {
            31
        }
    }

    fn valid_object(&self, obj: u16) -> bool {
        obj >= 1 && obj <= self.object_count
    }

    fn link(&self, obj: u16, slot: u32) -> u16 {
        if !self.valid_object(obj) {
            return 0;
        }
        let addr = self.object_address(obj);
        if self.version >= 4 {
            self.read_word(addr + 6 + 2 * slot)
        } else {
            self.read_byte(addr + 4 + slot) as u16
        }
    }

    fn set_link(&mut self, obj: u16, slot: u32, value: u16) {
        let addr = self.object_address(obj);
        if self.version >= 4 {
            self.write_word(addr + 6 + 2 * slot, value);
        } else {
            self.write_byte(addr + 4 + slot, value as u8);
        }
    }

    /// Iterate `(number, data address, length)` over an object's properties.
    fn properties(&self, obj: u16) -> Vec<(u16, u32, u16)> {
        let mut out = Vec::new();
        if !self.valid_object(obj) {
            return out;
        }
        let entry = self.object_address(obj);
        let table = if self.version >= 4 {
            self.read_word(entry + 12)
        } else {
            self.read_word(entry + 7)
        } as u32;
        let mut addr = table + 1 + 2 * self.read_byte(table) as u32;
        loop {
            let size = self.read_byte(addr);
            if size == 0 {
                return out;
            }
            let (num, data) = if self.version < 4 {
                ((size & 0x1F) as u16, addr + 1)
            } else if size & 0x80 != 0 {
                ((size & 0x3F) as u16, addr + 2)
            } else {
                ((size & 0x3F) as u16, addr + 1)
            };
            let len = self.property_length(data);
            out.push((num, data, len));
            addr = data + len as u32;
        }
    }

    fn exec_one(&mut self) {
        let Some((instr, next)) = self.program.get(&self.pc).cloned() else {
            self.state = PauseState::PausedByError;
            return;
        };
        match instr {
            Instr::Step => self.pc = next,
            Instr::Push(v) => {
                self.stack.push(v);
                self.pc = next;
            }
            Instr::Jump(target) => self.pc = target,
            Instr::Quit => self.state = PauseState::Terminated,
            Instr::Fault => self.state = PauseState::PausedByError,
            Instr::Panic => panic!("scripted interpreter fault at ${:04X}", self.pc),
            Instr::Call { routine, args, store } => {
                let address = self.unpack_routine(routine);
                let Some(&locals) = self.routines.get(&address) else {
                    self.state = PauseState::PausedByError;
                    return;
                };
                if self.tracing {
                    self.events.push(CallEvent {
                        routine,
                        args: args.clone(),
                        depth: self.frames.len(),
                    });
                }
                let mut values = vec![0u16; locals as usize];
                for (slot, arg) in values.iter_mut().zip(&args) {
                    *slot = *arg;
                }
                self.frames.push(CallFrame {
                    routine: address,
                    return_pc: next,
                    arg_count: args.len() as u8,
                    prev_stack_depth: self.stack.len() as u16,
                    store: StoreTarget::from_variable(store),
                    locals: values,
                });
                self.pc = body_start(self.version, address, Some(locals));
            }
            Instr::Return(value) => {
                let Some(frame) = self.frames.pop() else {
                    self.state = PauseState::PausedByError;
                    return;
                };
                if self.frames.is_empty() {
                    self.state = PauseState::Terminated;
                    return;
                }
                self.stack.truncate(frame.prev_stack_depth as usize);
                self.pc = frame.return_pc;
                match frame.store {
                    StoreTarget::Discard => {}
                    StoreTarget::Stack => self.stack.push(value),
                    StoreTarget::Local(n) => self.write_variable(n, value),
                    StoreTarget::Global(g) => self.write_variable(g + 16, value),
                }
            }
        }
    }

    fn run_until(&mut self, done: impl Fn(&Self) -> bool) {
        // A request made while paused does not carry over into this resume.
        self.pause.take();
        self.state = PauseState::Running;
        loop {
            self.exec_one();
            if self.state != PauseState::Running {
                return;
            }
            if done(self) {
                self.state = PauseState::PausedByUser;
                return;
            }
            if self.breakpoints.contains(&self.pc) {
                self.state = PauseState::PausedByBreakpoint;
                return;
            }
            if self.pause.take() {
                self.state = PauseState::PausedByUser;
                return;
            }
        }
    }

    fn require_paused(&self) -> Result<(), VmError> {
        if self.state.is_paused() {
            Ok(())
        } else {
            Err(VmError::new("machine is not paused"))
        }
    }
}

impl DebugInterface for MockMachine {
    fn version(&self) -> u8 {
        self.version
    }

    fn pc(&self) -> u32 {
        self.pc
    }

    fn pause_state(&self) -> PauseState {
        self.state
    }

    fn pause_handle(&self) -> PauseHandle {
        self.pause.clone()
    }

    fn restart(&mut self) -> Result<(), VmError> {
        self.memory = self.initial.clone();
        self.reset_execution();
        Ok(())
    }

    fn step_into(&mut self) -> Result<(), VmError> {
        self.require_paused()?;
        self.run_until(|_| true);
        Ok(())
    }

    fn step_over(&mut self) -> Result<(), VmError> {
        self.require_paused()?;
        let depth = self.frames.len();
        self.run_until(|m| m.frames.len() <= depth);
        Ok(())
    }

    fn step_up(&mut self) -> Result<(), VmError> {
        self.require_paused()?;
        let depth = self.frames.len();
        self.run_until(|m| m.frames.len() < depth);
        Ok(())
    }

    fn run(&mut self) -> Result<(), VmError> {
        self.require_paused()?;
        self.run_until(|_| false);
        Ok(())
    }

    fn memory_size(&self) -> u32 {
        self.memory.len() as u32
    }

    fn read_byte(&self, address: u32) -> u8 {
        self.memory.get(address as usize).copied().unwrap_or(0)
    }

    fn read_word(&self, address: u32) -> u16 {
        ((self.read_byte(address) as u16) << 8) | self.read_byte(address + 1) as u16
    }

    fn write_byte(&mut self, address: u32, value: u8) {
        if let Some(b) = self.memory.get_mut(address as usize) {
            *b = value;
        }
    }

    fn write_word(&mut self, address: u32, value: u16) {
        self.write_byte(address, (value >> 8) as u8);
        self.write_byte(address + 1, value as u8);
    }

    fn read_variable(&self, var: u8) -> u16 {
        match var {
            0 => self.stack.last().copied().unwrap_or(0),
            1..=15 => self
                .frames
                .last()
                .and_then(|f| f.locals.get(var as usize - 1))
                .copied()
                .unwrap_or(0),
            _ => self.read_word(self.globals_addr() + 2 * (var as u32 - 16)),
        }
    }

    fn write_variable(&mut self, var: u8, value: u16) {
        match var {
            0 => match self.stack.last_mut() {
                Some(top) => *top = value,
                None => self.stack.push(value),
            },
            1..=15 => {
                if let Some(slot) = self
                    .frames
                    .last_mut()
                    .and_then(|f| f.locals.get_mut(var as usize - 1))
                {
                    *slot = value;
                }
            }
            _ => {
                let addr = self.globals_addr() + 2 * (var as u32 - 16);
                self.write_word(addr, value);
            }
        }
    }

    fn object_count(&self) -> u16 {
        self.object_count
    }

    fn object_address(&self, obj: u16) -> u32 {
        self.object_table + 2 * self.default_count() + (obj as u32).saturating_sub(1) * self.entry_size()
    }

    fn object_parent(&self, obj: u16) -> u16 {
        self.link(obj, 0)
    }

    fn object_sibling(&self, obj: u16) -> u16 {
        self.link(obj, 1)
    }

    fn object_child(&self, obj: u16) -> u16 {
        self.link(obj, 2)
    }

    fn move_object(&mut self, obj: u16, dest: u16) {
        if !self.valid_object(obj) || !self.valid_object(dest) {
            return;
        }
        self.remove_object(obj);
        let first = self.object_child(dest);
        self.set_link(obj, 1, first);
        self.set_link(dest, 2, obj);
        self.set_link(obj, 0, dest);
    }

    fn remove_object(&mut self, obj: u16) {
        let parent = self.object_parent(obj);
        if parent == 0 {
            return;
        }
        let next = self.object_sibling(obj);
        if self.object_child(parent) == obj {
            self.set_link(parent, 2, next);
        } else {
            let mut cur = self.object_child(parent);
            while cur != 0 {
                let sib = self.object_sibling(cur);
                if sib == obj {
                    self.set_link(cur, 1, next);
                    break;
                }
                cur = sib;
            }
        }
        self.set_link(obj, 0, 0);
        self.set_link(obj, 1, 0);
    }

    fn object_short_name(&self, obj: u16) -> String {
        obj.checked_sub(1)
            .and_then(|i| self.names.get(i as usize))
            .cloned()
            .unwrap_or_default()
    }

    fn property_address(&self, obj: u16, prop: u16) -> u32 {
        self.properties(obj)
            .into_iter()
            .find(|(num, _, _)| *num == prop)
            .map_or(0, |(_, data, _)| data)
    }

    fn property_length(&self, data_address: u32) -> u16 {
        if data_address == 0 {
            return 0;
        }
        let size = self.read_byte(data_address - 1);
        if self.version < 4 {
            (size >> 5) as u16 + 1
        } else if size & 0x80 != 0 {
            match size & 0x3F {
                0 => 64,
                n => n as u16,
            }
        } else if size & 0x40 != 0 {
            2
        } else {
            1
        }
    }

    fn next_property(&self, obj: u16, prop: u16) -> u16 {
        let props = self.properties(obj);
        if prop == 0 {
            return props.first().map_or(0, |p| p.0);
        }
        props
            .iter()
            .position(|p| p.0 == prop)
            .and_then(|i| props.get(i + 1))
            .map_or(0, |p| p.0)
    }

    fn frames(&self) -> Vec<CallFrame> {
        self.frames.iter().rev().cloned().collect()
    }

    fn stack_depth(&self) -> u16 {
        self.stack.len() as u16
    }

    fn pop_stack(&mut self) -> u16 {
        self.stack.pop().unwrap_or(0)
    }

    fn push_stack(&mut self, value: u16) {
        self.stack.push(value);
    }

    fn arm_breakpoint(&mut self, address: u32) {
        self.breakpoints.insert(address);
    }

    fn disarm_breakpoint(&mut self, address: u32) {
        self.breakpoints.remove(&address);
    }

    fn call_routine(&mut self, packed: u32, _args: &[u16]) -> Result<u16, VmError> {
        self.results
            .get(&packed)
            .copied()
            .ok_or_else(|| VmError::new(format!("no routine at packed address ${:04X}", packed)))
    }

    fn unpack_routine(&self, packed: u32) -> u32 {
        packed * self.packing_factor()
    }

    fn pack_routine(&self, address: u32) -> u32 {
        address / self.packing_factor()
    }

    fn unpack_string(&self, packed: u32) -> u32 {
        packed * self.packing_factor()
    }

    fn decode_text(&self, address: u32) -> String {
        self.strings.get(&address).cloned().unwrap_or_default()
    }

    fn set_call_tracing(&mut self, enabled: bool) {
        self.tracing = enabled;
        if !enabled {
            self.events.clear();
        }
    }

    fn take_call_events(&mut self) -> Vec<CallEvent> {
        std::mem::take(&mut self.events)
    }
}

// ----------------------------------------------------------------------
// Sample story
// ----------------------------------------------------------------------

pub const SAMPLE_FILE: &str = "sample.zil";

pub const SAMPLE_SOURCE: &str = "<ROUTINE MAIN ()
    <TELL \"Hello\">
    <SETG SCORE <GO 7 9>>
    <CRLF>
    <QUIT>>

<ROUTINE GO (CNT FLAG)
    <PUSH 5> <SET FLAG T>
    <HELPER 1>
    <RTRUE>>

<ROUTINE HELPER (N)
    <SET N <+ .N 1>>
    <RETURN 42>>

<ROUTINE SPIN ()
    <REPEAT () <CRLF>>>
";

pub const LIGHTBIT: u16 = 3;
pub const OPENBIT: u16 = 10;
pub const TAKEBIT: u16 = 17;
pub const P_SIZE: u16 = 7;
pub const P_CAPACITY: u16 = 9;
pub const P_DESC: u16 = 12;
pub const P_ACTION: u16 = 17;

pub const MAIN: u32 = 0x1000;
pub const GO: u32 = 0x1010;
pub const HELPER: u32 = 0x1020;
pub const SPIN: u32 = 0x1030;

/// Builder for the sample version 5 story.
///
/// Objects: 1 ROOM, 2 LAMP and 3 BOX in ROOM, 4 COIN in BOX.
/// Globals: SCORE (0), HERE (1) = ROOM, MOVES (2).
/// MAIN calls GO 7 9, which pushes 5 and calls HELPER 1.
pub fn sample_builder() -> MockBuilder {
    MockMachine::builder(5)
        .global(1, 1)
        .default_property(P_SIZE, 5)
        .object("Living Room", 0, &[LIGHTBIT], &[(P_DESC, &[0, 1, 0, 2])])
        .object("brass lamp", 1, &[LIGHTBIT, TAKEBIT], &[(P_SIZE, &[0, 42]), (P_ACTION, &[0x04, 0x08])])
        .object("wooden box", 1, &[OPENBIT], &[(P_CAPACITY, &[5])])
        .object("gold coin", 3, &[TAKEBIT], &[(P_SIZE, &[0, 1])])
        .routine(MAIN, 0)
        .routine(GO, 2)
        .routine(HELPER, 1)
        .routine(SPIN, 0)
        .instr(0x1001, 3, Instr::Step)
        .instr(0x1004, 5, Instr::Call { routine: GO / 4, args: vec![7, 9], store: Some(16) })
        .instr(0x1009, 3, Instr::Step)
        .instr(0x100C, 1, Instr::Quit)
        .instr(0x1011, 2, Instr::Push(5))
        .instr(0x1013, 2, Instr::Step)
        .instr(0x1015, 4, Instr::Call { routine: HELPER / 4, args: vec![1], store: Some(0) })
        .instr(0x1019, 1, Instr::Return(1))
        .instr(0x1021, 2, Instr::Step)
        .instr(0x1023, 1, Instr::Return(42))
        .instr(0x1031, 2, Instr::Step)
        .instr(0x1033, 3, Instr::Jump(0x1031))
        .entry(MAIN)
        .result(GO / 4, 1)
        .result(HELPER / 4, 42)
        .string(0x0500, "hello sailor")
}

impl MockMachine {
    /// The sample story, stopped at the entry of MAIN.
    pub fn sample() -> MockMachine {
        sample_builder().build()
    }

    /// The sample story entering SPIN, which loops forever.
    pub fn spinning() -> MockMachine {
        sample_builder().entry(SPIN).build()
    }
}

/// Symbols and line table for the sample story.
pub fn sample_debug_info() -> DebugInfo {
    let mut b = DebugInfoBuilder::new();
    let file = b.add_file(SAMPLE_FILE, None);
    let stmt = LineFlags::STATEMENT;
    let entry = LineFlags::ROUTINE_ENTRY;

    let main = b.begin_routine("MAIN", MAIN, 0x100D);
    b.add_line(main, 0x1000, file, 1, 1, entry);
    b.add_line(main, 0x1001, file, 2, 5, stmt);
    b.add_line(main, 0x1004, file, 3, 5, stmt);
    b.add_line(main, 0x1009, file, 4, 5, stmt);
    b.add_line(main, 0x100C, file, 5, 5, stmt);

    let go = b.begin_routine("GO", GO, 0x101A);
    b.add_local(go, "CNT");
    b.add_local(go, "FLAG");
    b.add_line(go, 0x1010, file, 7, 1, entry);
    b.add_line(go, 0x1011, file, 8, 5, stmt);
    b.add_line(go, 0x1013, file, 8, 14, stmt);
    b.add_line(go, 0x1015, file, 9, 5, stmt);
    b.add_line(go, 0x1019, file, 10, 5, stmt);

    let helper = b.begin_routine("HELPER", HELPER, 0x1024);
    b.add_local(helper, "N");
    b.add_line(helper, 0x1020, file, 12, 1, entry);
    b.add_line(helper, 0x1021, file, 13, 5, stmt);
    b.add_line(helper, 0x1023, file, 14, 5, stmt);

    let spin = b.begin_routine("SPIN", SPIN, 0x1036);
    b.add_line(spin, 0x1030, file, 16, 1, entry);
    b.add_line(spin, 0x1031, file, 17, 5, stmt);
    b.add_line(spin, 0x1033, file, 17, 17, stmt);

    b.add_object("ROOM", 1);
    b.add_object("LAMP", 2);
    b.add_object("BOX", 3);
    b.add_object("COIN", 4);
    b.add_attribute("LIGHTBIT", LIGHTBIT);
    b.add_attribute("OPENBIT", OPENBIT);
    b.add_attribute("TAKEBIT", TAKEBIT);
    b.add_property("P?SIZE", P_SIZE);
    b.add_property("P?CAPACITY", P_CAPACITY);
    b.add_property("P?DESC", P_DESC);
    b.add_property("P?ACTION", P_ACTION);
    b.add_global("SCORE", 0);
    b.add_global("HERE", 1);
    b.add_global("MOVES", 2);
    b.build()
}

/// Source cache preloaded with the sample story's source.
pub fn sample_sources() -> SourceCache {
    let mut cache = SourceCache::new();
    cache.insert(SAMPLE_FILE, SAMPLE_SOURCE);
    cache
}
