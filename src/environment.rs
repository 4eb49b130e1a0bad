use std::collections::HashMap;

use tracing::trace;

use crate::{common::RuntimeError, token::Token, value::Value};

/// Variable bindings as a stack of scopes, innermost last.
///
/// The bottom scope holds the globals and is never popped, so every lookup
/// chain ends there.
#[derive(Debug, Clone)]
pub struct Environment {
    stack: Vec<HashMap<String, Value>>,
}

impl Environment {
    pub fn new() -> Self {
        Self {
            stack: vec![HashMap::new()],
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn nest(&mut self) {
        self.stack.push(HashMap::new());
        trace!(depth = self.depth(), "entered scope");
    }

    pub fn unnest(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
        trace!(depth = self.depth(), "left scope");
    }

    /// Binds `name` in the innermost scope, replacing any binding already
    /// there.
    pub fn define(&mut self, name: &str, value: Value) {
        if let Some(current_scope) = self.stack.last_mut() {
            current_scope.insert(name.to_string(), value);
        }
    }

    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        for scope in self.stack.iter().rev() {
            if let Some(value) = scope.get(&name.lexeme) {
                return Ok(value.clone());
            }
        }

        Err(undefined(name))
    }

    /// Rebinds the nearest existing `name`. Never creates a binding.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        for scope in self.stack.iter_mut().rev() {
            if let Some(slot) = scope.get_mut(&name.lexeme) {
                *slot = value;
                return Ok(());
            }
        }

        Err(undefined(name))
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

fn undefined(name: &Token) -> RuntimeError {
    name.runtime_error(format!("Undefined variable '{}'.", name.lexeme))
}
