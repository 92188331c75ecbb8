//! PANIC language compiler
//!
//! Compiles PANIC source to JavaScript in five stages: lexing, parsing to a
//! concrete syntax tree, semantic analysis into a typed program,
//! optimization, and code generation.

pub mod error;
pub mod types;
pub mod ir;
pub mod cst;
pub mod lexer;
pub mod parser;
pub mod semantic;
pub mod optimizer;
pub mod codegen;

use error::PanicResult;
use ir::Program;
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    pub optimize: bool,
    /// Spaces per indentation level in the generated JavaScript.
    pub indent: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self { optimize: true, indent: 2 }
    }
}

pub struct Compiler {
    options: CompileOptions,
}

impl Compiler {
    pub fn new() -> Self {
        Self::with_options(CompileOptions::default())
    }

    pub fn with_options(options: CompileOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> CompileOptions {
        self.options
    }

    /// Runs every stage up to and including optimization (when enabled).
    pub fn analyze(&self, source: &str) -> PanicResult<Program> {
        debug!("compiling {} bytes (optimize: {})", source.len(), self.options.optimize);
        let tokens = lexer::lex(source)?;

        let cst = parser::parse(source, tokens)?;
        let program = semantic::analyze(&cst)?;

        if self.options.optimize {
            Ok(optimizer::optimize(program))
        } else {
            Ok(program)
        }
    }

    /// Compiles `source` to JavaScript, one entry per output line.
    pub fn compile(&self, source: &str) -> PanicResult<Vec<String>> {
        let program = self.analyze(source)?;
        Ok(codegen::generate(&program, self.options.indent))
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}
