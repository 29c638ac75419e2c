//! One interpretation session: file or interactive prompt.
//!
//! A `Session` owns every piece of mutable pipeline state — the interpreter
//! (global frame, locals table), the `had_error` / `had_runtime_error`
//! flags, and the node-id counter threaded into each parse so ids stay
//! unique across prompt lines.  Two scripts running concurrently need two
//! sessions; nothing here is process-global.
//!
//! Diagnostics go to stderr in the formats the error types render
//! themselves in; exit-code policy stays in `main`.

use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::Path;

use log::{debug, info};
use memmap2::Mmap;

use crate::ast::{NodeId, Stmt};
use crate::error::{FaveError, Result};
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::Scanner;
use crate::token::Token;

pub struct Session {
    interpreter: Interpreter,
    next_node_id: NodeId,
    had_error: bool,
    had_runtime_error: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            interpreter: Interpreter::new(),
            next_node_id: 0,
            had_error: false,
            had_runtime_error: false,
        }
    }

    /// Any lex/parse/resolve error so far?  Drives exit code 65.
    pub fn had_error(&self) -> bool {
        self.had_error
    }

    /// Any uncaught runtime error so far?  Drives exit code 70.
    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    /// Execute a script file once.
    pub fn run_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let mmap: Mmap = map_file(path.as_ref())?;

        // Validate once up front; the scanner slices lexemes unchecked.
        std::str::from_utf8(&mmap)?;

        self.run(&mmap);

        Ok(())
    }

    /// Interactive line-at-a-time prompt until end of input.  The global
    /// environment and resolved bindings persist across lines; the error
    /// flag resets per line so one bad line does not block the next.
    pub fn run_prompt(&mut self) -> Result<()> {
        let stdin = io::stdin();

        loop {
            print!("> ");
            io::stdout().flush()?;

            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                break; // end of input
            }

            self.run(line.as_bytes());
            self.had_error = false;
        }

        Ok(())
    }

    /// Run one source buffer through the whole pipeline.
    pub fn run(&mut self, source: &[u8]) {
        info!("Running {} bytes of source", source.len());

        let tokens: Vec<Token> = self.scan(source);

        let mut parser = Parser::new(&tokens, self.next_node_id);
        let (statements, parse_errors) = parser.parse();
        self.next_node_id = parser.next_id();

        for e in &parse_errors {
            self.report(e);
        }

        if self.had_error {
            return;
        }

        let resolve_errors: Vec<FaveError> =
            Resolver::new(&mut self.interpreter).resolve(&statements);

        for e in &resolve_errors {
            self.report(e);
        }

        if self.had_error {
            return; // stop if there was a resolution error
        }

        self.interpret(&statements);
    }

    /// Print each token of a file as one JSON object per line; diagnostics
    /// still go to stderr and set the error flag.
    pub fn dump_tokens<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let mmap: Mmap = map_file(path.as_ref())?;
        std::str::from_utf8(&mmap)?;

        for token in self.scan(&mmap) {
            match serde_json::to_string(&token) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("{}", e),
            }
        }

        Ok(())
    }

    /// Lex the whole buffer, reporting errors and keeping the good tokens —
    /// the parser still gets to look at everything that scanned cleanly.
    fn scan(&mut self, source: &[u8]) -> Vec<Token> {
        let mut tokens: Vec<Token> = Vec::new();

        for result in Scanner::new(source) {
            match result {
                Ok(token) => tokens.push(token),
                Err(e) => self.report(&e),
            }
        }

        debug!("Scanned {} tokens", tokens.len());

        tokens
    }

    fn interpret(&mut self, statements: &[Stmt]) {
        if let Err(e) = self.interpreter.interpret(statements) {
            eprintln!("{}", e);
            self.had_runtime_error = true;
        }
    }

    fn report(&mut self, error: &FaveError) {
        eprintln!("{}", error);
        self.had_error = true;
    }
}

/// Memory-map a script file read-only.
fn map_file(path: &Path) -> Result<Mmap> {
    info!("Mapping file: {:?}", path);

    let file: File = File::open(path)?;

    // SAFETY: the mapping is read-only and lives only for the duration of
    // one run; mutating the script mid-run is outside the supported model.
    let mmap: Mmap = unsafe { Mmap::map(&file)? };

    debug!("Mapped {} bytes from {:?}", mmap.len(), path);

    Ok(mmap)
}
