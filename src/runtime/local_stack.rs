//! Lexical scope stack for the tree-walking interpreter.
//!
//! Frame 0 holds globals and is never popped. Function calls push a barrier
//! frame: lookups from inside a call see the call's own frames and then
//! globals, but not the caller's locals.

use rustc_hash::FxHashMap;
use zirconium_core::{RuntimeError, RuntimeErrorKind};

use super::ZrValue;

type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Clone)]
struct Binding {
    value: ZrValue,
    constant: bool,
}

#[derive(Debug, Default)]
struct Frame {
    bindings: FxHashMap<String, Binding>,
    barrier: bool,
}

/// Ordered scope frames, innermost last.
#[derive(Debug)]
pub struct ZrLocalStack {
    frames: Vec<Frame>,
    max_depth: usize,
}

impl Default for ZrLocalStack {
    fn default() -> Self {
        Self::new(256)
    }
}

impl ZrLocalStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            frames: vec![Frame::default()],
            max_depth,
        }
    }

    /// Number of frames above globals.
    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Push a block scope.
    pub fn push_scope(&mut self) -> Result<()> {
        self.push(false)
    }

    /// Push a function scope, hiding the caller's locals.
    pub fn push_function_scope(&mut self) -> Result<()> {
        self.push(true)
    }

    fn push(&mut self, barrier: bool) -> Result<()> {
        if self.depth() >= self.max_depth {
            log::debug!("scope depth {} exceeds limit {}", self.depth() + 1, self.max_depth);
            return Err(RuntimeError::new(
                RuntimeErrorKind::StackOverflow,
                format!("maximum scope depth of {} exceeded", self.max_depth),
            ));
        }
        self.frames.push(Frame {
            bindings: FxHashMap::default(),
            barrier,
        });
        Ok(())
    }

    /// Pop the innermost scope. Globals are never popped.
    pub fn pop_scope(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Indices of the frames visible from the innermost scope, innermost
    /// first and globals last.
    fn visible(&self) -> impl Iterator<Item = usize> + '_ {
        let top = self.frames.len() - 1;
        let floor = (1..=top).rev().find(|&i| self.frames[i].barrier).unwrap_or(0);
        let locals = (floor.max(1)..=top).rev();
        locals.chain(std::iter::once(0))
    }

    fn find(&self, name: &str) -> Option<&Binding> {
        self.visible().find_map(|i| self.frames[i].bindings.get(name))
    }

    /// Resolve `name` from the innermost scope outward.
    pub fn get(&self, name: &str) -> Option<&ZrValue> {
        self.find(name).map(|binding| &binding.value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    pub fn is_constant(&self, name: &str) -> bool {
        self.find(name).is_some_and(|binding| binding.constant)
    }

    /// Assign to the nearest visible binding of `name`, or create it in the
    /// innermost scope.
    pub fn set(&mut self, name: &str, value: ZrValue) -> Result<()> {
        let target = self.visible().find(|&i| self.frames[i].bindings.contains_key(name));
        match target {
            Some(index) => {
                let binding = self.frames[index]
                    .bindings
                    .get_mut(name)
                    .ok_or_else(|| undefined(name))?;
                if binding.constant {
                    return Err(const_reassignment(name));
                }
                binding.value = value;
                Ok(())
            }
            None => {
                self.declare(name, value, false)?;
                Ok(())
            }
        }
    }

    /// Bind `name` in the innermost scope, shadowing outer bindings.
    pub fn declare(&mut self, name: &str, value: ZrValue, constant: bool) -> Result<()> {
        let frame = self.frames.last_mut().ok_or_else(|| undefined(name))?;
        if frame.bindings.get(name).is_some_and(|b| b.constant) {
            return Err(const_reassignment(name));
        }
        frame.bindings.insert(name.to_string(), Binding { value, constant });
        Ok(())
    }

    /// Bind `name` in the global frame.
    pub fn set_global(&mut self, name: &str, value: ZrValue) {
        self.frames[0].bindings.insert(
            name.to_string(),
            Binding {
                value,
                constant: false,
            },
        );
    }

    pub fn global(&self, name: &str) -> Option<&ZrValue> {
        self.frames[0].bindings.get(name).map(|binding| &binding.value)
    }

    /// Drop every scope above globals.
    pub fn unwind(&mut self) {
        self.frames.truncate(1);
    }
}

fn const_reassignment(name: &str) -> RuntimeError {
    RuntimeError::new(
        RuntimeErrorKind::ConstReassignment,
        format!("cannot assign to constant '{}'", name),
    )
}

fn undefined(name: &str) -> RuntimeError {
    RuntimeError::new(RuntimeErrorKind::UndefinedVariable, format!("'{}' is not defined", name))
}
