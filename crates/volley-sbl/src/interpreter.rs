use rustc_hash::FxHashMap;

use crate::{
    ast::Node,
    error::SblError,
    lexer::Lexer,
    parser::Parser,
    runtime::Runtime,
    topo::{self, Edge},
};

/// The template interpreter: loads one template per scope, orders every
/// tag behind its dependencies, then renders all scopes once per
/// `execute` call while the generators keep their state between calls.
#[derive(Debug, Default)]
pub struct Interpreter {
    parser: Parser,
    runtime: Runtime,
    scopes: Vec<(String, Vec<Node>)>,
    graph: Vec<Edge>,
    readied: bool,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an interpreter with custom tag markers, written as the
    /// begin and end markers around a literal `...`, e.g. `"{...}"`.
    pub fn with_style(style: &str) -> Result<Self, SblError> {
        match style.split_once("...") {
            Some((begin, end)) if !begin.is_empty() && !end.is_empty() => Ok(Self {
                parser: Parser::new(Lexer::new(begin, end)),
                ..Self::default()
            }),
            _ => Err(SblError::InvalidTagStyle(style.to_string())),
        }
    }

    /// Parses a template into the given scope and registers its tags.
    /// Every scope loads at most once, and only before `ready`.
    pub fn load(&mut self, input: &str, scope: &str) -> Result<(), SblError> {
        if self.readied {
            return Err(SblError::Readied);
        }
        if self.scopes.iter().any(|(name, _)| name == scope) {
            return Err(SblError::ScopeExists(scope.to_string()));
        }

        let ast = self.parser.parse(input, scope);
        self.scopes.push((scope.to_string(), ast));

        if let Some((_, ast)) = self.scopes.last() {
            for node in ast {
                if !node.is_echo() {
                    let edge = self.runtime.register(node)?;
                    self.graph.push(edge);
                }
            }
        }
        Ok(())
    }

    /// Orders the dependency graph and seals the interpreter against
    /// further loads.
    pub fn ready(&mut self) -> Result<(), SblError> {
        let sorted = topo::topological_sort(&self.graph).map_err(|error| match error {
            SblError::CycleDetected => SblError::CircularReference,
            other => other,
        })?;
        self.graph = sorted;
        self.readied = true;
        Ok(())
    }

    /// Advances every tag once, in dependency order, and renders each
    /// scope's template with the fresh values.
    pub fn execute(&mut self) -> Result<FxHashMap<String, String>, SblError> {
        for item in &self.graph {
            self.runtime.evaluate(&item.id)?;
        }

        let mut output = FxHashMap::default();
        for (scope, ast) in &self.scopes {
            let mut rendered = String::new();
            for node in ast {
                if let Some(text) = node.echo_text() {
                    rendered.push_str(text);
                } else if let Some(value) = node.id().and_then(|id| self.runtime.value(id)) {
                    rendered.push_str(&value.to_string());
                }
            }
            output.insert(scope.clone(), rendered);
        }
        Ok(output)
    }
}
