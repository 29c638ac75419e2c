//! Tree-walking evaluator for the Fave language.
//!
//! The interpreter owns the global frame, the mutable "current frame"
//! pointer (saved and restored around every block, call, and method body),
//! the resolver's `NodeId → depth` side table, and the output sink `print`
//! writes to.  Evaluation is single-threaded and depth-first; one
//! interpreter instance serves one script or prompt session at a time.
//!
//! Statement execution yields a [`Flow`] outcome rather than abusing the
//! error channel: `return` produces `Flow::Return(value)`, which every
//! enclosing block checks and forwards until the invoking function call
//! catches it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

use log::{debug, info};

use crate::ast::{ClassDecl, Expr, LiteralValue, NodeId, Stmt};
use crate::class::{Class, Instance};
use crate::environment::Environment;
use crate::error::{FaveError, Result};
use crate::function::Function;
use crate::token::{Token, TokenType};
use crate::value::{NativeFn, Value};

/// User-program call depth at which recursion becomes a reported runtime
/// error instead of an uncontrolled host-stack crash.  Each user frame costs
/// several host frames of `execute`/`evaluate` recursion, so the cap must
/// leave room on a 2 MiB test-thread stack.
const MAX_CALL_DEPTH: usize = 64;

/// Outcome of executing one statement.
#[derive(Debug)]
pub enum Flow {
    /// Fall through to the next statement.
    Normal,

    /// A `return` is unwinding towards the nearest enclosing call.
    Return(Value),
}

pub struct Interpreter {
    globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,

    /// Lexical depth per resolvable node, filled in by the resolver.
    /// Nodes absent from the table fall back to dynamic global lookup.
    locals: HashMap<NodeId, usize>,

    call_depth: usize,

    /// Sink for `print`.  Tests substitute an in-memory buffer.
    out: Rc<RefCell<dyn Write>>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Creates a new Interpreter printing to stdout, with native functions
    /// such as `clock` predefined in the global frame.
    pub fn new() -> Self {
        Self::with_output(Rc::new(RefCell::new(io::stdout())))
    }

    /// Creates a new Interpreter printing to `out`.
    pub fn with_output(out: Rc<RefCell<dyn Write>>) -> Self {
        info!("Initializing Interpreter");

        let globals = Rc::new(RefCell::new(Environment::new()));

        debug!("Defining native function 'clock'");

        globals.borrow_mut().define(
            "clock",
            Value::Native(Rc::new(NativeFn {
                name: "clock",
                arity: 0,
                func: |_args: &[Value]| {
                    let seconds: f64 = chrono::Utc::now().timestamp_millis() as f64 / 1000.0;

                    Ok(Value::Number(seconds))
                },
            })),
        );

        Self {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            call_depth: 0,
            out,
        }
    }

    /// Record a resolver annotation: the reference with id `id` binds
    /// `depth` frames up from wherever it executes.
    pub fn note_local(&mut self, id: NodeId, depth: usize) {
        debug!("Noting local: node {} at depth {}", id, depth);

        self.locals.insert(id, depth);
    }

    /// Interprets a list of statements (a "program").
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<()> {
        debug!("Interpreting {} statements", statements.len());

        for stmt in statements {
            match self.execute(stmt)? {
                Flow::Normal => {}

                // The resolver rejects top-level `return`; nothing to unwind
                // into here.
                Flow::Return(_) => break,
            }
        }

        info!("Interpretation completed");
        Ok(())
    }

    // ───────────────────────── statements ─────────────────────────

    fn execute(&mut self, stmt: &Stmt) -> Result<Flow> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;

                Ok(Flow::Normal)
            }

            Stmt::Print(expr) => {
                let value: Value = self.evaluate(expr)?;
                writeln!(self.out.borrow_mut(), "{}", value)?;

                Ok(Flow::Normal)
            }

            Stmt::Var { name, initializer } => {
                let value: Value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("Defining variable '{}' = {}", name.lexeme, value);

                self.environment.borrow_mut().define(&name.lexeme, value);

                Ok(Flow::Normal)
            }

            Stmt::Block(statements) => {
                let env = Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(
                    &self.environment,
                ))));

                self.execute_block(statements, env)
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if is_truthy(&self.evaluate(condition)?) {
                    self.execute(then_branch)
                } else if let Some(else_stmt) = else_branch {
                    self.execute(else_stmt)
                } else {
                    Ok(Flow::Normal)
                }
            }

            Stmt::While { condition, body } => {
                while is_truthy(&self.evaluate(condition)?) {
                    if let Flow::Return(value) = self.execute(body)? {
                        return Ok(Flow::Return(value));
                    }
                }

                Ok(Flow::Normal)
            }

            Stmt::Function(declaration) => {
                debug!("Defining function '{}'", declaration.name.lexeme);

                let function = Function::new(
                    Rc::clone(declaration),
                    Rc::clone(&self.environment),
                    false,
                );

                self.environment
                    .borrow_mut()
                    .define(&declaration.name.lexeme, Value::Function(Rc::new(function)));

                Ok(Flow::Normal)
            }

            Stmt::Return { value, .. } => {
                let value: Value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("Returning value: {}", value);

                Ok(Flow::Return(value))
            }

            Stmt::Class(declaration) => self.execute_class(declaration),
        }
    }

    /// Run `statements` inside `env`, restoring the previous frame afterwards
    /// — including on error and on an unwinding `return`.
    fn execute_block(&mut self, statements: &[Stmt], env: Rc<RefCell<Environment>>) -> Result<Flow> {
        let previous: Rc<RefCell<Environment>> = Rc::clone(&self.environment);
        self.environment = env;

        let mut outcome: Result<Flow> = Ok(Flow::Normal);

        for stmt in statements {
            match self.execute(stmt) {
                Ok(Flow::Normal) => {}

                other => {
                    outcome = other;
                    break;
                }
            }
        }

        self.environment = previous;

        outcome
    }

    fn execute_class(&mut self, declaration: &Rc<ClassDecl>) -> Result<Flow> {
        debug!("Defining class '{}'", declaration.name.lexeme);

        let superclass: Option<Rc<Class>> = match &declaration.superclass {
            Some(expr) => match self.evaluate(expr)? {
                Value::Class(class) => Some(class),

                _ => {
                    let line: usize = match expr {
                        Expr::Variable { name, .. } => name.line,
                        _ => declaration.name.line,
                    };

                    return Err(FaveError::runtime(line, "Superclass must be a class."));
                }
            },

            None => None,
        };

        // Two-step define-then-assign so methods can refer to the class by
        // name while the class object is still being built.
        self.environment
            .borrow_mut()
            .define(&declaration.name.lexeme, Value::Nil);

        let previous: Rc<RefCell<Environment>> = Rc::clone(&self.environment);

        // A class body with a superclass gets a synthetic frame binding
        // `super`; every method closes over it.
        if let Some(sup) = &superclass {
            let mut env: Environment = Environment::with_enclosing(Rc::clone(&self.environment));
            env.define("super", Value::Class(Rc::clone(sup)));

            self.environment = Rc::new(RefCell::new(env));
        }

        let mut methods: HashMap<String, Rc<Function>> = HashMap::new();

        for method in &declaration.methods {
            let is_initializer: bool = method.name.lexeme == "init";

            let function = Function::new(
                Rc::clone(method),
                Rc::clone(&self.environment),
                is_initializer,
            );

            methods.insert(method.name.lexeme.clone(), Rc::new(function));
        }

        self.environment = previous;

        let class = Class::new(declaration.name.lexeme.clone(), superclass, methods);

        self.environment
            .borrow_mut()
            .assign(&declaration.name.lexeme, Value::Class(Rc::new(class)));

        Ok(Flow::Normal)
    }

    // ───────────────────────── expressions ────────────────────────

    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::Str(s.clone()),
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Nil => Value::Nil,
            }),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => self.evaluate_unary(operator, right),

            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left_val: Value = self.evaluate(left)?;

                let short_circuits: bool = match operator.token_type {
                    TokenType::OR => is_truthy(&left_val),
                    _ => !is_truthy(&left_val), // AND
                };

                if short_circuits {
                    Ok(left_val)
                } else {
                    self.evaluate(right)
                }
            }

            Expr::Variable { name, id } => self.lookup_variable(name, *id),

            Expr::Assign { name, value, id } => {
                let value: Value = self.evaluate(value)?;

                let assigned: bool = match self.locals.get(id) {
                    Some(&depth) => Environment::assign_at(
                        &self.environment,
                        depth,
                        &name.lexeme,
                        value.clone(),
                    ),

                    None => self.globals.borrow_mut().assign(&name.lexeme, value.clone()),
                };

                if !assigned {
                    return Err(FaveError::runtime(
                        name.line,
                        format!("Undefined variable '{}'.", name.lexeme),
                    ));
                }

                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee_val: Value = self.evaluate(callee)?;

                let mut args: Vec<Value> = Vec::with_capacity(arguments.len());
                for arg in arguments {
                    args.push(self.evaluate(arg)?);
                }

                self.call_value(callee_val, args, paren.line)
            }

            Expr::Get { object, name } => {
                let object: Value = self.evaluate(object)?;

                match object {
                    Value::Instance(ref instance) => self.instance_get(instance, name),

                    _ => Err(FaveError::runtime(
                        name.line,
                        "Only instances have properties.",
                    )),
                }
            }

            Expr::Set {
                object,
                name,
                value,
            } => {
                let object: Value = self.evaluate(object)?;

                let Value::Instance(instance) = object else {
                    return Err(FaveError::runtime(name.line, "Only instances have fields."));
                };

                let value: Value = self.evaluate(value)?;
                instance.borrow_mut().set_field(&name.lexeme, value.clone());

                Ok(value)
            }

            Expr::This { keyword, id } => self.lookup_variable(keyword, *id),

            Expr::Super {
                keyword,
                method,
                id,
            } => self.evaluate_super(keyword, method, *id),
        }
    }

    fn evaluate_unary(&mut self, operator: &Token, right: &Expr) -> Result<Value> {
        let right_val: Value = self.evaluate(right)?;

        match operator.token_type {
            TokenType::MINUS => match right_val {
                Value::Number(n) => Ok(Value::Number(-n)),

                _ => Err(FaveError::runtime(
                    operator.line,
                    "Operand must be a number.",
                )),
            },

            _ => Ok(Value::Bool(!is_truthy(&right_val))), // BANG
        }
    }

    fn evaluate_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Result<Value> {
        let left_val: Value = self.evaluate(left)?;
        let right_val: Value = self.evaluate(right)?;

        let numbers_required = || -> FaveError {
            FaveError::runtime(operator.line, "Operands must be numbers.")
        };

        match operator.token_type {
            TokenType::PLUS => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),

                (Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),

                // One string and one number: stringify the number (trailing
                // ".0" stripped) and concatenate in operand order.
                (Value::Str(a), b @ Value::Number(_)) => Ok(Value::Str(format!("{}{}", a, b))),
                (a @ Value::Number(_), Value::Str(b)) => Ok(Value::Str(format!("{}{}", a, b))),

                _ => Err(FaveError::runtime(operator.line, "Operands not supported.")),
            },

            TokenType::MINUS => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a - b)),
                _ => Err(numbers_required()),
            },

            TokenType::STAR => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a * b)),

                // String repetition: floor the count, clamp negatives to zero.
                (Value::Str(s), Value::Number(n)) | (Value::Number(n), Value::Str(s)) => {
                    Ok(Value::Str(s.repeat(repeat_count(n))))
                }

                _ => Err(numbers_required()),
            },

            TokenType::SLASH => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => {
                    if b == 0.0 {
                        // Deliberate language quirk, not a defect: division by
                        // zero yields 42.
                        Ok(Value::Number(42.0))
                    } else {
                        Ok(Value::Number(a / b))
                    }
                }

                _ => Err(numbers_required()),
            },

            TokenType::EQUAL_EQUAL => Ok(Value::Bool(left_val == right_val)),
            TokenType::BANG_EQUAL => Ok(Value::Bool(left_val != right_val)),

            TokenType::GREATER => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a > b)),
                _ => Err(numbers_required()),
            },

            TokenType::GREATER_EQUAL => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a >= b)),
                _ => Err(numbers_required()),
            },

            TokenType::LESS => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a < b)),
                _ => Err(numbers_required()),
            },

            TokenType::LESS_EQUAL => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a <= b)),
                _ => Err(numbers_required()),
            },

            _ => Err(FaveError::runtime(operator.line, "Invalid binary operator.")),
        }
    }

    /// Resolver-annotated references read at their recorded depth; everything
    /// else falls back to the global frame.
    fn lookup_variable(&self, name: &Token, id: NodeId) -> Result<Value> {
        let value: Option<Value> = match self.locals.get(&id) {
            Some(&depth) => Environment::get_at(&self.environment, depth, &name.lexeme),
            None => self.globals.borrow().get(&name.lexeme),
        };

        value.ok_or_else(|| {
            FaveError::runtime(
                name.line,
                format!("Undefined variable '{}'.", name.lexeme),
            )
        })
    }

    /// Property read: fields shadow methods; a method hit produces a bound
    /// method whose closure carries the instance as `this`.
    fn instance_get(&self, instance: &Rc<RefCell<Instance>>, name: &Token) -> Result<Value> {
        if let Some(value) = instance.borrow().field(&name.lexeme) {
            return Ok(value);
        }

        let method: Option<Rc<Function>> = instance.borrow().class().find_method(&name.lexeme);

        match method {
            Some(method) => {
                let bound: Function = method.bind(Value::Instance(Rc::clone(instance)));

                Ok(Value::Function(Rc::new(bound)))
            }

            None => Err(FaveError::runtime(
                name.line,
                format!("Undefined property '{}'.", name.lexeme),
            )),
        }
    }

    /// `super.m` starts method lookup at the superclass of the class whose
    /// body the expression appears in — resolved statically via the synthetic
    /// `super` frame — then binds to the current `this`.
    fn evaluate_super(&mut self, keyword: &Token, method: &Token, id: NodeId) -> Result<Value> {
        let depth: usize = *self.locals.get(&id).ok_or_else(|| {
            FaveError::runtime(keyword.line, "Undefined variable 'super'.")
        })?;

        let superclass: Value =
            Environment::get_at(&self.environment, depth, "super").ok_or_else(|| {
                FaveError::runtime(keyword.line, "Undefined variable 'super'.")
            })?;

        // `this` sits one frame inside the `super` frame.
        let object: Value =
            Environment::get_at(&self.environment, depth - 1, "this").ok_or_else(|| {
                FaveError::runtime(keyword.line, "Undefined variable 'this'.")
            })?;

        let Value::Class(superclass) = superclass else {
            return Err(FaveError::runtime(keyword.line, "Superclass must be a class."));
        };

        match superclass.find_method(&method.lexeme) {
            Some(found) => Ok(Value::Function(Rc::new(found.bind(object)))),

            None => Err(FaveError::runtime(
                method.line,
                format!("Undefined property '{}'.", method.lexeme),
            )),
        }
    }

    // ───────────────────────── invocation ─────────────────────────

    /// Invoke any callable value with already-evaluated arguments.
    fn call_value(&mut self, callee: Value, args: Vec<Value>, line: usize) -> Result<Value> {
        match callee {
            Value::Native(native) => {
                self.check_arity(native.arity, args.len(), line)?;

                (native.func)(&args).map_err(|msg| FaveError::runtime(line, msg))
            }

            Value::Function(function) => {
                self.check_arity(function.arity(), args.len(), line)?;

                self.call_function(&function, args, line)
            }

            Value::Class(class) => {
                self.check_arity(class.arity(), args.len(), line)?;

                let instance = Rc::new(RefCell::new(Instance::new(Rc::clone(&class))));

                if let Some(init) = class.find_method("init") {
                    let bound: Function = init.bind(Value::Instance(Rc::clone(&instance)));
                    self.call_function(&bound, args, line)?;
                }

                Ok(Value::Instance(instance))
            }

            _ => Err(FaveError::runtime(
                line,
                "Can only call functions and classes.",
            )),
        }
    }

    fn check_arity(&self, expected: usize, actual: usize, line: usize) -> Result<()> {
        if expected != actual {
            return Err(FaveError::runtime(
                line,
                format!("Expected {} arguments but got {}.", expected, actual),
            ));
        }

        Ok(())
    }

    /// Invoke a user function: child frame of the closure, parameters bound
    /// positionally, body executed, `Flow::Return` caught here.
    fn call_function(
        &mut self,
        function: &Function,
        args: Vec<Value>,
        line: usize,
    ) -> Result<Value> {
        if self.call_depth >= MAX_CALL_DEPTH {
            return Err(FaveError::runtime(line, "Stack overflow."));
        }

        debug!(
            "Calling '{}' with {} argument(s)",
            function.name(),
            args.len()
        );

        let mut frame: Environment = Environment::with_enclosing(Rc::clone(&function.closure));

        for (param, arg) in function.declaration.params.iter().zip(args) {
            frame.define(&param.lexeme, arg);
        }

        let previous: Rc<RefCell<Environment>> = Rc::clone(&self.environment);
        self.environment = Rc::new(RefCell::new(frame));
        self.call_depth += 1;

        let outcome: Result<Flow> = self.run_body(&function.declaration.body);

        self.call_depth -= 1;
        self.environment = previous;

        let value: Value = match outcome? {
            Flow::Return(value) => value,
            Flow::Normal => Value::Nil,
        };

        if function.is_initializer {
            // Initializers always yield the bound instance; a bare `return;`
            // inside `init` gets here with `Flow::Return(Nil)`.
            return Environment::get_at(&function.closure, 0, "this")
                .ok_or_else(|| FaveError::runtime(line, "Undefined variable 'this'."));
        }

        Ok(value)
    }

    fn run_body(&mut self, body: &[Stmt]) -> Result<Flow> {
        for stmt in body {
            match self.execute(stmt)? {
                Flow::Normal => {}
                flow => return Ok(flow),
            }
        }

        Ok(Flow::Normal)
    }
}

/// nil and false are falsy; every other value is truthy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Nil => false,
        Value::Bool(b) => *b,
        _ => true,
    }
}

/// Repeat count for string `*` number: floor, negatives clamp to zero.
fn repeat_count(n: f64) -> usize {
    let floored: f64 = n.floor();

    if floored <= 0.0 {
        0
    } else {
        floored as usize
    }
}
