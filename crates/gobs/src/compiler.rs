//! Syntax-directed translation from AST to bytecode.
//!
//! The compiler walks a linted AST exactly once and appends instructions to
//! a [`Code`]. Structured control flow becomes labelled jumps, pattern
//! matching becomes check / bind / unbind sequences, and named calls are
//! dispatched between runtime primitives and user-defined callables using
//! the primitives catalog and the symbol table.
//!
//! Stack discipline: lowering a statement leaves the operand stack depth
//! unchanged; lowering an expression pushes exactly one value. `Return` is
//! the one exception: it leaves its result on the stack at the moment the
//! `Return` instruction runs.

use num_bigint::BigInt;

use crate::ast::{Def, Expr, Ident, Pattern, Program, Stmt, SwitchBranch};
use crate::bytecode::{Code, Op, Type};
use crate::error::{Error, Result};
use crate::messages::Messages;
use crate::primitives::Primitives;
use crate::span::Span;
use crate::symbols::SymbolTable;

/// Compiles a linted AST into a flat instruction stream.
///
/// A compiler instance owns the code it is building and the counters used
/// for fresh names. Both start from zero, so compiling the same AST twice
/// with fresh instances yields byte-identical code. The three services are
/// read-only for the whole compilation.
pub struct Compiler<'a> {
    symbols: &'a SymbolTable,
    primitives: &'a Primitives,
    messages: &'a Messages,
    code: Code,
    next_label: usize,
    next_variable: usize,
}

impl<'a> Compiler<'a> {
    pub fn new(
        symbols: &'a SymbolTable,
        primitives: &'a Primitives,
        messages: &'a Messages,
    ) -> Self {
        Compiler {
            symbols,
            primitives,
            messages,
            code: Code::new(),
            next_label: 0,
            next_variable: 0,
        }
    }

    /// Compile a whole program, consuming the compiler and handing the
    /// finished code to the caller.
    ///
    /// Definitions are walked in two sweeps (entry points first, then
    /// user-defined callables) so the entry point's instructions open the
    /// emitted stream. A program with no definitions compiles to a lone
    /// `Return`.
    pub fn compile(mut self, program: &Program) -> Result<Code> {
        if program.definitions.is_empty() {
            self.emit(Op::Return, program.span);
            return Ok(self.code);
        }

        for def in &program.definitions {
            match def {
                Def::Program { body, span } => {
                    self.compile_stmt(body)?;
                    self.emit(Op::Return, *span);
                }
                Def::InteractiveProgram { .. } => {
                    return Err(Error::NotImplemented("interactive programs"));
                }
                _ => {}
            }
        }

        for def in &program.definitions {
            match def {
                Def::Procedure { .. } => {
                    return Err(Error::NotImplemented("user-defined procedures"));
                }
                Def::Function { .. } => {
                    return Err(Error::NotImplemented("user-defined functions"));
                }
                _ => {}
            }
        }

        Ok(self.code)
    }

    // -----------------------------------------------------------------------
    // Emission helpers and fresh names
    // -----------------------------------------------------------------------

    fn emit(&mut self, op: Op, span: Span) {
        self.code.push(op, span);
    }

    /// Emit several instructions sharing one source span.
    fn emit_all<I: IntoIterator<Item = Op>>(&mut self, ops: I, span: Span) {
        for op in ops {
            self.emit(op, span);
        }
    }

    /// Next unique label name. The `_` prefix is reserved by the parser,
    /// so generated names cannot collide with user identifiers.
    fn fresh_label(&mut self) -> String {
        let label = format!("_l{}", self.next_label);
        self.next_label += 1;
        label
    }

    /// Next unique synthetic variable name.
    fn fresh_variable(&mut self) -> String {
        let variable = format!("_v{}", self.next_variable);
        self.next_variable += 1;
        variable
    }

    /// The dynamic assertion for Bool, named through the message catalog.
    fn bool_type(&self) -> Type {
        Type::structure(self.messages.translate("TYPE:Bool"))
    }

    fn constructor_type(&self, constructor: &Ident) -> Result<&'a str> {
        self.symbols
            .constructor_type(&constructor.name)
            .ok_or_else(|| Error::UnknownConstructor(constructor.name.clone()))
    }

    fn constructor_fields(&self, constructor: &Ident) -> Result<&'a [String]> {
        self.symbols
            .constructor_fields(&constructor.name)
            .ok_or_else(|| Error::UnknownConstructor(constructor.name.clone()))
    }

    // -----------------------------------------------------------------------
    // Statements
    // -----------------------------------------------------------------------

    /// Compile a single statement. Net stack effect: zero.
    fn compile_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Block { statements, .. } => {
                for statement in statements {
                    self.compile_stmt(statement)?;
                }
            }

            Stmt::Return { result, span } => {
                self.compile_expr(result)?;
                self.emit(Op::Return, *span);
            }

            Stmt::AssignVariable {
                variable,
                value,
                span,
            } => {
                self.compile_expr(value)?;
                self.emit(Op::SetVariable(variable.name.clone()), *span);
            }

            Stmt::AssignTuple {
                variables,
                value,
                span,
            } => {
                self.compile_expr(value)?;
                self.emit(Op::TypeCheck(Type::any_tuple(variables.len())), *span);
                for (i, variable) in variables.iter().enumerate() {
                    self.emit(Op::ReadTupleComponent(i), *span);
                    self.emit(Op::SetVariable(variable.name.clone()), *span);
                }
                self.emit(Op::Pop, *span);
            }

            Stmt::ProcedureCall {
                procedure,
                args,
                span,
            } => {
                for arg in args {
                    self.compile_expr(arg)?;
                }
                if self.primitives.is_procedure(&procedure.name) {
                    self.emit(Op::PrimitiveCall(procedure.name.clone(), args.len()), *span);
                } else if self.symbols.is_procedure(&procedure.name) {
                    return Err(Error::NotImplemented("user-defined procedure calls"));
                } else {
                    return Err(Error::UndefinedProcedure(procedure.name.clone()));
                }
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
                span,
            } => {
                self.compile_if(condition, then_branch, else_branch.as_deref(), *span)?;
            }

            Stmt::While {
                condition,
                body,
                span,
            } => {
                self.compile_while(condition, body, *span)?;
            }

            Stmt::Repeat { times, body, span } => {
                self.compile_repeat(times, body, *span)?;
            }

            Stmt::Foreach {
                index,
                range,
                body,
                span,
            } => {
                self.compile_foreach(index, range, body, *span)?;
            }

            Stmt::Switch {
                subject,
                branches,
                span,
            } => {
                self.compile_switch(subject, branches, *span)?;
            }
        }
        Ok(())
    }

    /// `if` lowers to a forward branch over the then-block; with an `else`,
    /// the then-block ends by jumping past it.
    fn compile_if(
        &mut self,
        condition: &Expr,
        then_branch: &Stmt,
        else_branch: Option<&Stmt>,
        span: Span,
    ) -> Result<()> {
        let else_label = self.fresh_label();
        self.compile_expr(condition)?;
        let bool_check = self.bool_type();
        self.emit(Op::TypeCheck(bool_check), span);
        self.emit(Op::JumpIfFalse(else_label.clone()), span);
        self.compile_stmt(then_branch)?;
        match else_branch {
            Some(else_stmt) => {
                let end_label = self.fresh_label();
                self.emit(Op::Jump(end_label.clone()), span);
                self.emit(Op::Label(else_label), span);
                self.compile_stmt(else_stmt)?;
                self.emit(Op::Label(end_label), span);
            }
            None => self.emit(Op::Label(else_label), span),
        }
        Ok(())
    }

    fn compile_while(&mut self, condition: &Expr, body: &Stmt, span: Span) -> Result<()> {
        let start_label = self.fresh_label();
        let end_label = self.fresh_label();
        self.emit(Op::Label(start_label.clone()), span);
        self.compile_expr(condition)?;
        let bool_check = self.bool_type();
        self.emit(Op::TypeCheck(bool_check), span);
        self.emit(Op::JumpIfFalse(end_label.clone()), span);
        self.compile_stmt(body)?;
        self.emit(Op::Jump(start_label), span);
        self.emit(Op::Label(end_label), span);
        Ok(())
    }

    /// `repeat` keeps its counter on the stack rather than in a variable:
    /// the loop header duplicates it for the `> 0` test and the footer
    /// subtracts one before jumping back. A count of zero or less runs the
    /// body zero times.
    fn compile_repeat(&mut self, times: &Expr, body: &Stmt, span: Span) -> Result<()> {
        self.compile_expr(times)?;
        self.emit(Op::TypeCheck(Type::Integer), span);
        let start_label = self.fresh_label();
        let end_label = self.fresh_label();
        self.emit_all(
            [
                Op::Label(start_label.clone()),
                Op::Dup,
                Op::PushInteger(BigInt::from(0)),
                Op::PrimitiveCall(">".to_string(), 2),
                Op::JumpIfFalse(end_label.clone()),
            ],
            span,
        );
        self.compile_stmt(body)?;
        self.emit_all(
            [
                Op::PushInteger(BigInt::from(1)),
                Op::PrimitiveCall("-".to_string(), 2),
                Op::Jump(start_label),
                Op::Label(end_label),
                Op::Pop,
            ],
            span,
        );
        Ok(())
    }

    /// `foreach` evaluates the range once into a synthetic variable, then
    /// walks it by index through the `_unsafe*` accessors. Those skip the
    /// VM's own checks; the `TypeCheck` on the range is what makes them
    /// safe. All synthetic variables and the user's index are unset on
    /// exit.
    fn compile_foreach(
        &mut self,
        index: &Ident,
        range: &Expr,
        body: &Stmt,
        span: Span,
    ) -> Result<()> {
        let list_var = self.fresh_variable();
        let length_var = self.fresh_variable();
        let position_var = self.fresh_variable();
        let start_label = self.fresh_label();
        let end_label = self.fresh_label();

        self.compile_expr(range)?;
        self.emit_all(
            [
                Op::TypeCheck(Type::List(Box::new(Type::Any))),
                Op::SetVariable(list_var.clone()),
                Op::PushVariable(list_var.clone()),
                Op::PrimitiveCall("_unsafeListLength".to_string(), 1),
                Op::SetVariable(length_var.clone()),
                Op::PushInteger(BigInt::from(0)),
                Op::SetVariable(position_var.clone()),
                Op::Label(start_label.clone()),
                Op::PushVariable(position_var.clone()),
                Op::PushVariable(length_var.clone()),
                Op::PrimitiveCall("<".to_string(), 2),
                Op::JumpIfFalse(end_label.clone()),
                Op::PushVariable(list_var.clone()),
                Op::PushVariable(position_var.clone()),
                Op::PrimitiveCall("_unsafeListNth".to_string(), 2),
                Op::SetVariable(index.name.clone()),
            ],
            span,
        );
        self.compile_stmt(body)?;
        self.emit_all(
            [
                Op::PushVariable(position_var.clone()),
                Op::PushInteger(BigInt::from(1)),
                Op::PrimitiveCall("+".to_string(), 2),
                Op::SetVariable(position_var.clone()),
                Op::Jump(start_label),
                Op::Label(end_label),
                Op::UnsetVariable(list_var),
                Op::UnsetVariable(length_var),
                Op::UnsetVariable(position_var),
                Op::UnsetVariable(index.name.clone()),
            ],
            span,
        );
        Ok(())
    }

    /// Patterns are tried in source order; the first match wins. Checks
    /// never pop the subject, so the failure path still has it on the
    /// stack when `_FAIL` fires, and each branch discards it itself after
    /// binding.
    fn compile_switch(
        &mut self,
        subject: &Expr,
        branches: &[SwitchBranch],
        span: Span,
    ) -> Result<()> {
        self.compile_expr(subject)?;

        let mut branch_labels = Vec::with_capacity(branches.len());
        for branch in branches {
            let label = self.fresh_label();
            self.compile_pattern_check(&branch.pattern, &label)?;
            branch_labels.push(label);
        }

        // The failure tail is emitted unconditionally; a wildcard branch
        // masks it only because its check is an unconditional jump above.
        let failure = self
            .messages
            .translate("errmsg:switch-does-not-match")
            .to_string();
        self.emit(Op::PushString(failure), span);
        self.emit(Op::PrimitiveCall("_FAIL".to_string(), 1), span);

        let end_label = self.fresh_label();
        for (branch, label) in branches.iter().zip(branch_labels) {
            self.emit(Op::Label(label), span);
            self.compile_pattern_bind(&branch.pattern)?;
            self.emit(Op::Pop, span);
            self.compile_stmt(&branch.body)?;
            self.compile_pattern_unbind(&branch.pattern);
            self.emit(Op::Jump(end_label.clone()), span);
        }
        self.emit(Op::Label(end_label), span);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Patterns
    // -----------------------------------------------------------------------

    /// Emit the check phase of a pattern: fall through on mismatch, branch
    /// to `target` on match. The subject stays on the stack either way.
    fn compile_pattern_check(&mut self, pattern: &Pattern, target: &str) -> Result<()> {
        match pattern {
            Pattern::Wildcard { span } => {
                self.emit(Op::Jump(target.to_string()), *span);
            }
            Pattern::Structure {
                constructor, span, ..
            } => {
                let type_name = self.constructor_type(constructor)?;
                self.emit(Op::TypeCheck(Type::structure(type_name)), *span);
                self.emit(
                    Op::JumpIfStructure(constructor.name.clone(), target.to_string()),
                    *span,
                );
            }
            Pattern::Tuple { parameters, span } => {
                self.emit(Op::TypeCheck(Type::any_tuple(parameters.len())), *span);
                self.emit(
                    Op::JumpIfTuple(parameters.len(), target.to_string()),
                    *span,
                );
            }
            Pattern::Timeout { span } => {
                let timeout = self.messages.translate("CONS:TIMEOUT").to_string();
                self.emit(Op::JumpIfStructure(timeout, target.to_string()), *span);
            }
        }
        Ok(())
    }

    /// Emit the bind phase: read each bound field or component out of the
    /// subject (still on the stack, never popped) into its parameter name.
    /// Structure binds follow the constructor's declared field order.
    fn compile_pattern_bind(&mut self, pattern: &Pattern) -> Result<()> {
        match pattern {
            Pattern::Wildcard { .. } | Pattern::Timeout { .. } => {}
            Pattern::Structure {
                constructor,
                parameters,
                span,
            } => {
                if parameters.is_empty() {
                    return Ok(());
                }
                let fields = self.constructor_fields(constructor)?;
                for (parameter, field) in parameters.iter().zip(fields) {
                    self.emit(Op::ReadStructureField(field.clone()), *span);
                    self.emit(Op::SetVariable(parameter.name.clone()), *span);
                }
            }
            Pattern::Tuple { parameters, span } => {
                for (i, parameter) in parameters.iter().enumerate() {
                    self.emit(Op::ReadTupleComponent(i), *span);
                    self.emit(Op::SetVariable(parameter.name.clone()), *span);
                }
            }
        }
        Ok(())
    }

    /// Emit the unbind phase: drop every binding the bind phase created.
    fn compile_pattern_unbind(&mut self, pattern: &Pattern) {
        match pattern {
            Pattern::Wildcard { .. } | Pattern::Timeout { .. } => {}
            Pattern::Structure {
                parameters, span, ..
            }
            | Pattern::Tuple { parameters, span } => {
                for parameter in parameters {
                    self.emit(Op::UnsetVariable(parameter.name.clone()), *span);
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Expressions
    // -----------------------------------------------------------------------

    /// Compile an expression. Net stack effect: one value pushed.
    fn compile_expr(&mut self, expr: &Expr) -> Result<()> {
        match expr {
            Expr::Variable { name, span } => {
                self.emit(Op::PushVariable(name.name.clone()), *span);
            }

            Expr::ConstantNumber { value, span } => {
                let number: BigInt = value
                    .parse()
                    .map_err(|_| Error::MalformedNumber(value.clone()))?;
                self.emit(Op::PushInteger(number), *span);
            }

            Expr::ConstantString { value, span } => {
                self.emit(Op::PushString(value.clone()), *span);
            }

            Expr::List { elements, span } => {
                for element in elements {
                    self.compile_expr(element)?;
                }
                self.emit(Op::MakeList(elements.len()), *span);
            }

            Expr::Tuple { elements, span } => {
                for element in elements {
                    self.compile_expr(element)?;
                }
                self.emit(Op::MakeTuple(elements.len()), *span);
            }

            Expr::Structure {
                constructor,
                fields,
                span,
            } => {
                let mut field_names = Vec::with_capacity(fields.len());
                for field in fields {
                    self.compile_expr(&field.value)?;
                    field_names.push(field.field.name.clone());
                }
                let type_name = self.constructor_type(constructor)?.to_string();
                self.emit(
                    Op::MakeStructure {
                        type_name,
                        constructor: constructor.name.clone(),
                        fields: field_names,
                    },
                    *span,
                );
            }

            Expr::StructureUpdate { .. } => {
                return Err(Error::NotImplemented("structure update expressions"));
            }

            Expr::Range { .. } => {
                return Err(Error::NotImplemented("range expressions"));
            }

            Expr::FunctionCall {
                function,
                args,
                span,
            } => {
                self.compile_function_call(function, args, *span)?;
            }
        }
        Ok(())
    }

    /// Dispatch a named call between the primitive, user-function, and
    /// field-accessor namespaces. Arguments are pushed left to right before
    /// the dispatch decision.
    fn compile_function_call(&mut self, function: &Ident, args: &[Expr], span: Span) -> Result<()> {
        if function.name == "&&" || function.name == "||" {
            return Err(Error::NotImplemented("short-circuit boolean operators"));
        }
        for arg in args {
            self.compile_expr(arg)?;
        }
        if self.primitives.is_function(&function.name) {
            self.emit(Op::PrimitiveCall(function.name.clone(), args.len()), span);
            Ok(())
        } else if self.symbols.is_function(&function.name) {
            Err(Error::NotImplemented("user-defined function calls"))
        } else if self.symbols.is_field(&function.name) {
            Err(Error::NotImplemented("field accessor calls"))
        } else {
            Err(Error::UndefinedFunction(function.name.clone()))
        }
    }
}
