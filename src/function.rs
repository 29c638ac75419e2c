//! User-defined function values.
//!
//! A `Function` pairs a shared declaration with the scope frame that was
//! current at its definition site — the closure.  Binding a method extends
//! that closure with one extra frame holding `this`.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::ast::FunctionDecl;
use crate::environment::Environment;
use crate::value::Value;

pub struct Function {
    pub declaration: Rc<FunctionDecl>,

    /// Defining frame, held strongly so it outlives the call that created it.
    pub closure: Rc<RefCell<Environment>>,

    /// `init` methods always yield the bound instance, whatever the body
    /// returns.
    pub is_initializer: bool,
}

impl Function {
    pub fn new(
        declaration: Rc<FunctionDecl>,
        closure: Rc<RefCell<Environment>>,
        is_initializer: bool,
    ) -> Self {
        Self {
            declaration,
            closure,
            is_initializer,
        }
    }

    pub fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }

    pub fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    /// Produce the bound-method form of this function: same declaration, but
    /// closed over an extra frame in which `this` names the instance.
    pub fn bind(&self, instance: Value) -> Function {
        let mut env: Environment = Environment::with_enclosing(Rc::clone(&self.closure));
        env.define("this", instance);

        Function {
            declaration: Rc::clone(&self.declaration),
            closure: Rc::new(RefCell::new(env)),
            is_initializer: self.is_initializer,
        }
    }
}

impl fmt::Debug for Function {
    // Shallow on purpose: the closure chain can reach back to this function.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.name())
    }
}
