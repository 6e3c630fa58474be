//! A recording [`Gpu`] for unit tests.
//!
//! It keeps just enough driver state to behave like a real context for the cube: shader stages
//! "compile" when their braces and parentheses balance and they define `main`, programs "link"
//! when every fragment input is written by the vertex stage with the same type, and every
//! state-changing call is appended to a call log the tests can inspect.

use std::{
    cell::RefCell,
    collections::{HashMap, HashSet, VecDeque},
};

use crate::abs::{
    BufferHandle, Gpu, ProgramHandle, ShaderHandle, ShaderStage, UniformLocation, VertexArrayHandle,
};

pub const VALID_VERTEX: &str = "#version 330 core
in vec3 a_Position;
in vec4 a_Color;
uniform mat4 u_MVPMatrix;
out vec4 v_Color;
void main() {
    v_Color = a_Color;
    gl_Position = u_MVPMatrix * vec4(a_Position, 1.0);
}
";

pub const VALID_FRAGMENT: &str = "#version 330 core
in vec4 v_Color;
out vec4 o_FragColor;
void main() {
    o_FragColor = v_Color;
}
";

/// A state-changing call as seen by the driver.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    UseProgram(Option<u32>),
    BindBuffer(Option<u32>),
    BufferData {
        buffer: Option<u32>,
        len: usize,
    },
    BindVertexArray(Option<u32>),
    VertexAttribPointer {
        index: u32,
        size: i32,
        stride: i32,
        offset: i32,
        buffer: Option<u32>,
    },
    EnableVertexAttribArray(u32),
    UniformMatrix4 {
        location: u32,
        transpose: bool,
        value: Vec<f32>,
    },
    DrawArrays {
        mode: u32,
        first: i32,
        count: i32,
    },
    Enable(u32),
    CullFace(u32),
    FrontFace(u32),
    Viewport(i32, i32, i32, i32),
    ClearColor([f32; 4]),
    Clear(u32),
}

struct FakeShader {
    stage: ShaderStage,
    source: String,
    compiled: bool,
    log: String,
}

#[derive(Default)]
struct FakeProgram {
    attached: Vec<(ShaderStage, String)>,
    bindings: HashMap<String, u32>,
    linked: bool,
    log: String,
    attributes: HashMap<String, u32>,
    uniforms: HashMap<String, u32>,
}

#[derive(Default)]
struct State {
    next_id: u32,
    exhausted: bool,
    fail_next_draw: bool,
    shaders: HashMap<u32, FakeShader>,
    programs: HashMap<u32, FakeProgram>,
    deleted_programs: Vec<u32>,
    buffers: HashMap<u32, Vec<u8>>,
    vertex_arrays: HashSet<u32>,
    bound_buffer: Option<u32>,
    current_program: Option<u32>,
    errors: VecDeque<u32>,
    location_queries: usize,
    calls: Vec<Call>,
    error_polls: Vec<usize>,
}

impl State {
    fn allocate(&mut self) -> u32 {
        if self.exhausted {
            return 0;
        }
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct FakeGpu {
    state: RefCell<State>,
}

impl FakeGpu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following `create_*` call return the invalid handle.
    pub fn exhaust_handles(&self) {
        self.state.borrow_mut().exhausted = true;
    }

    /// Makes the next draw call panic, as a driver crash would.
    pub fn fail_next_draw(&self) {
        self.state.borrow_mut().fail_next_draw = true;
    }

    pub fn push_error(&self, code: u32) {
        self.state.borrow_mut().errors.push_back(code);
    }

    pub fn is_live_shader(&self, shader: ShaderHandle) -> bool {
        self.state.borrow().shaders.contains_key(&shader.raw())
    }

    pub fn live_shader_count(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub fn is_live_program(&self, program: ProgramHandle) -> bool {
        self.state.borrow().programs.contains_key(&program.raw())
    }

    pub fn live_program_count(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub fn last_deleted_program(&self) -> Option<ProgramHandle> {
        self.state
            .borrow()
            .deleted_programs
            .last()
            .map(|&id| ProgramHandle::from_raw(id))
    }

    pub fn live_buffer_count(&self) -> usize {
        self.state.borrow().buffers.len()
    }

    pub fn live_vertex_array_count(&self) -> usize {
        self.state.borrow().vertex_arrays.len()
    }

    /// The contents of a buffer, read back as native-endian floats.
    pub fn buffer_floats(&self, buffer: BufferHandle) -> Vec<f32> {
        self.state
            .borrow()
            .buffers
            .get(&buffer.raw())
            .map(|bytes| {
                bytes
                    .chunks_exact(4)
                    .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn current_program(&self) -> Option<ProgramHandle> {
        self.state
            .borrow()
            .current_program
            .map(ProgramHandle::from_raw)
    }

    /// How many attribute and uniform lookups reached the driver.
    pub fn location_queries(&self) -> usize {
        self.state.borrow().location_queries
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        let mut state = self.state.borrow_mut();
        state.calls.clear();
        state.error_polls.clear();
    }

    /// Length of the call log at each `get_error`, so tests can tell which call was checked.
    pub fn error_polls(&self) -> Vec<usize> {
        self.state.borrow().error_polls.clone()
    }

    fn record(&self, call: Call) {
        self.state.borrow_mut().calls.push(call);
    }
}

/// `(qualifier, type, name)` for every top-level declaration in `source`.
fn declarations(source: &str) -> Vec<(&str, &str, &str)> {
    source
        .lines()
        .filter_map(|line| {
            let line = line.trim().strip_suffix(';')?;
            let mut words = line.split_whitespace();
            let qualifier = words.next()?;
            let ty = words.next()?;
            let name = words.next()?;
            if words.next().is_some() {
                return None;
            }
            matches!(qualifier, "in" | "out" | "uniform" | "attribute" | "varying")
                .then_some((qualifier, ty, name))
        })
        .collect()
}

fn balanced(source: &str, open: char, close: char) -> bool {
    let mut depth = 0i32;
    for c in source.chars() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth < 0 {
                return false;
            }
        }
    }
    depth == 0
}

fn compile_log(source: &str) -> Option<String> {
    if !balanced(source, '(', ')') || !balanced(source, '{', '}') {
        return Some("ERROR: 0:1: syntax error, unbalanced brackets".to_string());
    }
    if !source.contains("void main") {
        return Some("ERROR: 0:1: missing entry point `main`".to_string());
    }
    None
}

fn link(program: &mut FakeProgram) {
    let vertex = program
        .attached
        .iter()
        .find(|(stage, _)| *stage == ShaderStage::Vertex);
    let fragment = program
        .attached
        .iter()
        .find(|(stage, _)| *stage == ShaderStage::Fragment);
    let (Some((_, vertex)), Some((_, fragment))) = (vertex, fragment) else {
        program.log = "ERROR: program needs a vertex and a fragment stage".to_string();
        return;
    };

    let vertex_decls = declarations(vertex);
    let fragment_decls = declarations(fragment);
    for &(qualifier, ty, name) in &fragment_decls {
        if !matches!(qualifier, "in" | "varying") {
            continue;
        }
        let written = vertex_decls
            .iter()
            .find(|&&(q, _, n)| matches!(q, "out" | "varying") && n == name);
        match written {
            Some(&(_, vertex_ty, _)) if vertex_ty == ty => {}
            Some(&(_, vertex_ty, _)) => {
                program.log = format!("ERROR: type mismatch for `{name}`: {vertex_ty} vs {ty}");
                return;
            }
            None => {
                program.log = format!("ERROR: fragment input `{name}` not written by vertex stage");
                return;
            }
        }
    }

    let mut attributes = HashMap::new();
    let mut taken: HashSet<u32> = HashSet::new();
    let inputs: Vec<&str> = vertex_decls
        .iter()
        .filter(|(q, _, _)| matches!(*q, "in" | "attribute"))
        .map(|&(_, _, name)| name)
        .collect();
    for name in &inputs {
        if let Some(&index) = program.bindings.get(*name) {
            attributes.insert(name.to_string(), index);
            taken.insert(index);
        }
    }
    let mut next = 0;
    for name in &inputs {
        if attributes.contains_key(*name) {
            continue;
        }
        while taken.contains(&next) {
            next += 1;
        }
        attributes.insert(name.to_string(), next);
        taken.insert(next);
    }

    let uniforms = vertex_decls
        .iter()
        .chain(fragment_decls.iter())
        .filter(|(q, _, _)| *q == "uniform")
        .enumerate()
        .map(|(i, &(_, _, name))| (name.to_string(), i as u32))
        .collect();

    program.attributes = attributes;
    program.uniforms = uniforms;
    program.linked = true;
    program.log.clear();
}

impl Gpu for FakeGpu {
    fn create_shader(&self, stage: ShaderStage) -> ShaderHandle {
        let mut state = self.state.borrow_mut();
        let id = state.allocate();
        if id != 0 {
            state.shaders.insert(
                id,
                FakeShader {
                    stage,
                    source: String::new(),
                    compiled: false,
                    log: String::new(),
                },
            );
        }
        ShaderHandle::from_raw(id)
    }

    fn shader_source(&self, shader: ShaderHandle, source: &str) {
        if let Some(s) = self.state.borrow_mut().shaders.get_mut(&shader.raw()) {
            s.source = source.to_string();
        }
    }

    fn compile_shader(&self, shader: ShaderHandle) {
        if let Some(s) = self.state.borrow_mut().shaders.get_mut(&shader.raw()) {
            match compile_log(&s.source) {
                Some(log) => {
                    s.compiled = false;
                    s.log = log;
                }
                None => {
                    s.compiled = true;
                    s.log.clear();
                }
            }
        }
    }

    fn get_shader_compile_status(&self, shader: ShaderHandle) -> bool {
        self.state
            .borrow()
            .shaders
            .get(&shader.raw())
            .is_some_and(|s| s.compiled)
    }

    fn get_shader_info_log(&self, shader: ShaderHandle) -> String {
        self.state
            .borrow()
            .shaders
            .get(&shader.raw())
            .map(|s| s.log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: ShaderHandle) {
        self.state.borrow_mut().shaders.remove(&shader.raw());
    }

    fn create_program(&self) -> ProgramHandle {
        let mut state = self.state.borrow_mut();
        let id = state.allocate();
        if id != 0 {
            state.programs.insert(id, FakeProgram::default());
        }
        ProgramHandle::from_raw(id)
    }

    fn attach_shader(&self, program: ProgramHandle, shader: ShaderHandle) {
        let mut state = self.state.borrow_mut();
        let Some(attached) = state
            .shaders
            .get(&shader.raw())
            .filter(|s| s.compiled)
            .map(|s| (s.stage, s.source.clone()))
        else {
            return;
        };
        if let Some(p) = state.programs.get_mut(&program.raw()) {
            p.attached.push(attached);
        }
    }

    fn detach_shader(&self, _program: ProgramHandle, _shader: ShaderHandle) {}

    fn bind_attrib_location(&self, program: ProgramHandle, index: u32, name: &str) {
        if let Some(p) = self.state.borrow_mut().programs.get_mut(&program.raw()) {
            p.bindings.insert(name.to_string(), index);
        }
    }

    fn link_program(&self, program: ProgramHandle) {
        if let Some(p) = self.state.borrow_mut().programs.get_mut(&program.raw()) {
            link(p);
        }
    }

    fn get_program_link_status(&self, program: ProgramHandle) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program.raw())
            .is_some_and(|p| p.linked)
    }

    fn get_program_info_log(&self, program: ProgramHandle) -> String {
        self.state
            .borrow()
            .programs
            .get(&program.raw())
            .map(|p| p.log.clone())
            .unwrap_or_default()
    }

    fn delete_program(&self, program: ProgramHandle) {
        let mut state = self.state.borrow_mut();
        if state.programs.remove(&program.raw()).is_some() {
            state.deleted_programs.push(program.raw());
        }
    }

    fn use_program(&self, program: Option<ProgramHandle>) {
        let raw = program.map(ProgramHandle::raw);
        let mut state = self.state.borrow_mut();
        let usable = raw.is_none_or(|id| state.programs.get(&id).is_some_and(|p| p.linked));
        assert!(usable, "use_program({raw:?}) on a program that is not linked");
        state.current_program = raw;
        state.calls.push(Call::UseProgram(raw));
    }

    fn get_attrib_location(&self, program: ProgramHandle, name: &str) -> Option<u32> {
        let mut state = self.state.borrow_mut();
        state.location_queries += 1;
        state
            .programs
            .get(&program.raw())
            .and_then(|p| p.attributes.get(name).copied())
    }

    fn get_uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        let mut state = self.state.borrow_mut();
        state.location_queries += 1;
        state
            .programs
            .get(&program.raw())
            .and_then(|p| p.uniforms.get(name).copied())
            .map(UniformLocation::from_raw)
    }

    fn uniform_matrix_4_f32_slice(
        &self,
        location: UniformLocation,
        transpose: bool,
        value: &[f32],
    ) {
        self.record(Call::UniformMatrix4 {
            location: location.raw(),
            transpose,
            value: value.to_vec(),
        });
    }

    fn create_buffer(&self) -> BufferHandle {
        let mut state = self.state.borrow_mut();
        let id = state.allocate();
        if id != 0 {
            state.buffers.insert(id, Vec::new());
        }
        BufferHandle::from_raw(id)
    }

    fn bind_buffer(&self, _target: u32, buffer: Option<BufferHandle>) {
        let raw = buffer.map(BufferHandle::raw);
        let mut state = self.state.borrow_mut();
        state.bound_buffer = raw;
        state.calls.push(Call::BindBuffer(raw));
    }

    fn buffer_data_u8_slice(&self, _target: u32, data: &[u8], _usage: u32) {
        let mut state = self.state.borrow_mut();
        let buffer = state.bound_buffer;
        if let Some(contents) = buffer.and_then(|id| state.buffers.get_mut(&id)) {
            *contents = data.to_vec();
        }
        state.calls.push(Call::BufferData {
            buffer,
            len: data.len(),
        });
    }

    fn delete_buffer(&self, buffer: BufferHandle) {
        self.state.borrow_mut().buffers.remove(&buffer.raw());
    }

    fn create_vertex_array(&self) -> VertexArrayHandle {
        let mut state = self.state.borrow_mut();
        let id = state.allocate();
        if id != 0 {
            state.vertex_arrays.insert(id);
        }
        VertexArrayHandle::from_raw(id)
    }

    fn bind_vertex_array(&self, vertex_array: Option<VertexArrayHandle>) {
        self.record(Call::BindVertexArray(vertex_array.map(VertexArrayHandle::raw)));
    }

    fn delete_vertex_array(&self, vertex_array: VertexArrayHandle) {
        self.state
            .borrow_mut()
            .vertex_arrays
            .remove(&vertex_array.raw());
    }

    fn vertex_attrib_pointer_f32(
        &self,
        index: u32,
        size: i32,
        _data_type: u32,
        _normalized: bool,
        stride: i32,
        offset: i32,
    ) {
        let mut state = self.state.borrow_mut();
        let buffer = state.bound_buffer;
        state.calls.push(Call::VertexAttribPointer {
            index,
            size,
            stride,
            offset,
            buffer,
        });
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        self.record(Call::EnableVertexAttribArray(index));
    }

    fn draw_arrays(&self, mode: u32, first: i32, count: i32) {
        let fail = std::mem::take(&mut self.state.borrow_mut().fail_next_draw);
        if fail {
            panic!("driver lost the context during glDrawArrays");
        }
        self.record(Call::DrawArrays {
            mode,
            first,
            count,
        });
    }

    fn enable(&self, cap: u32) {
        self.record(Call::Enable(cap));
    }

    fn cull_face(&self, mode: u32) {
        self.record(Call::CullFace(mode));
    }

    fn front_face(&self, mode: u32) {
        self.record(Call::FrontFace(mode));
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record(Call::Viewport(x, y, width, height));
    }

    fn clear_color(&self, red: f32, green: f32, blue: f32, alpha: f32) {
        self.record(Call::ClearColor([red, green, blue, alpha]));
    }

    fn clear(&self, mask: u32) {
        self.record(Call::Clear(mask));
    }

    fn get_error(&self) -> u32 {
        let mut state = self.state.borrow_mut();
        let polled_at = state.calls.len();
        state.error_polls.push(polled_at);
        state.errors.pop_front().unwrap_or(glow::NO_ERROR)
    }
}
