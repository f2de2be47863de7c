//! Statement lowering.

use crate::builder::FunctionBuilder;
use crate::context::{CompileContext, Resolved};
use crate::errors;
use crate::expr::compile_expr;
use ember_bytecode::Instr;
use ember_common::{Ident, Span};
use ember_parser::ast::{DeclKind, Expr, FunctionDecl, Stmt};
use std::sync::Arc;

/// Lowers a statement list.
///
/// Function declarations are bound before any other statement runs, but
/// their bodies are compiled after the rest of the list so that every
/// declaration of the list is in scope for them.
pub(crate) fn compile_block(ctx: &mut CompileContext<'_>, body: &[Stmt]) {
    let mut pending = Vec::new();
    for stmt in body {
        if let Stmt::Function(decl) = stmt {
            if let Some(at) = bind_function(ctx, decl) {
                pending.push((at, decl));
            }
        }
    }
    for stmt in body {
        compile_stmt(ctx, stmt);
    }
    for (at, decl) in pending {
        let child = compile_function(ctx, decl);
        ctx.current().patch_function(at, child);
    }
}

/// Lowers one statement. Function declarations are skipped; they were
/// bound by the enclosing [`compile_block`].
pub(crate) fn compile_stmt(ctx: &mut CompileContext<'_>, stmt: &Stmt) {
    match stmt {
        Stmt::Function(_) | Stmt::Empty(_) | Stmt::Error(_) => {}
        Stmt::Declare {
            kind,
            name,
            init,
            span,
        } => compile_declare(ctx, *kind, *name, init.as_ref(), *span),
        Stmt::Return { value, span } => {
            if ctx.in_script() {
                ctx.sink.emit(errors::error_return_outside(*span));
                return;
            }
            match value {
                Some(value) => compile_expr(ctx, value),
                None => {
                    ctx.emit(Instr::LoadUndefined);
                }
            }
            ctx.emit(Instr::Return);
        }
        Stmt::If {
            condition,
            then_branch,
            else_branch,
            span,
        } => {
            compile_expr(ctx, condition);
            let to_else = ctx.emit(Instr::JumpIfFalse(0));
            compile_nested(ctx, then_branch);
            match else_branch {
                Some(else_branch) => {
                    let to_end = ctx.emit(Instr::Jump(0));
                    ctx.patch_to_here(to_else, *span);
                    compile_nested(ctx, else_branch);
                    ctx.patch_to_here(to_end, *span);
                }
                None => ctx.patch_to_here(to_else, *span),
            }
        }
        Stmt::While {
            condition,
            body,
            span,
        } => {
            let start = ctx.label(*span);
            compile_expr(ctx, condition);
            let to_end = ctx.emit(Instr::JumpIfFalse(0));
            compile_nested(ctx, body);
            ctx.emit(Instr::Jump(start));
            ctx.patch_to_here(to_end, *span);
        }
        Stmt::Throw { value, .. } => {
            compile_expr(ctx, value);
            ctx.emit(Instr::Throw);
        }
        Stmt::Block { body, .. } => {
            ctx.current().push_scope();
            compile_block(ctx, body);
            ctx.current().pop_scope();
        }
        Stmt::Expr(expr) => {
            compile_expr(ctx, expr);
            if ctx.in_script() {
                ctx.emit(Instr::SetCompletion);
            } else {
                ctx.emit(Instr::Pop);
            }
        }
    }
}

/// Lowers the single-statement body of `if`/`while`, which may itself be a
/// function declaration.
fn compile_nested(ctx: &mut CompileContext<'_>, stmt: &Stmt) {
    if let Stmt::Function(decl) = stmt {
        if let Some(at) = bind_function(ctx, decl) {
            let child = compile_function(ctx, decl);
            ctx.current().patch_function(at, child);
        }
    } else {
        compile_stmt(ctx, stmt);
    }
}

fn compile_declare(
    ctx: &mut CompileContext<'_>,
    kind: DeclKind,
    name: Ident,
    init: Option<&Expr>,
    span: Span,
) {
    let lexical = kind != DeclKind::Var;
    let is_const = kind == DeclKind::Const;

    if ctx.in_script() {
        if lexical {
            ctx.declare_lexical_global(name, span);
        }
        match init {
            Some(init) => compile_expr(ctx, init),
            None => {
                ctx.emit(Instr::LoadUndefined);
            }
        }
        let name_index = ctx.name_constant(name, span);
        if is_const {
            ctx.emit(Instr::DeclareConst(name_index));
        } else {
            ctx.emit(Instr::DeclareGlobal(name_index));
        }
        return;
    }

    // `var` slots were allocated when the function was entered.
    let slot = match ctx.current().lookup_innermost(name) {
        Some(existing) if lexical => {
            ctx.sink.emit(errors::error_duplicate(ctx.name(name), span));
            existing.slot
        }
        Some(existing) => existing.slot,
        None if lexical => {
            // Compile the initializer before the binding exists so that
            // `let x = x` reads the outer name.
            match init {
                Some(init) => compile_expr(ctx, init),
                None => {
                    ctx.emit(Instr::LoadUndefined);
                }
            }
            let slot = ctx.declare_local(name, is_const, true, span);
            ctx.emit(Instr::StoreLocal(slot));
            ctx.emit(Instr::Pop);
            return;
        }
        None => match ctx.current().lookup(name) {
            Some(local) => local.slot,
            None => ctx.declare_local(name, false, false, span),
        },
    };

    match init {
        Some(init) => compile_expr(ctx, init),
        // `var x;` leaves an existing value alone.
        None if !lexical => return,
        None => {
            ctx.emit(Instr::LoadUndefined);
        }
    }
    ctx.emit(Instr::StoreLocal(slot));
    ctx.emit(Instr::Pop);
}

/// Emits the binding of a declared function in the current scope and
/// returns the position of its `MakeFunction`, whose child index is filled
/// in once the body is compiled.
fn bind_function(ctx: &mut CompileContext<'_>, decl: &FunctionDecl) -> Option<usize> {
    let name = decl.name?;
    if ctx.in_script() {
        let at = ctx.emit(Instr::MakeFunction(0));
        let name_index = ctx.name_constant(name, decl.span);
        ctx.emit(Instr::DeclareGlobal(name_index));
        return Some(at);
    }
    let slot = match ctx.current().lookup_innermost(name) {
        Some(local) => local.slot,
        None => ctx.declare_local(name, false, false, decl.span),
    };
    let at = ctx.emit(Instr::MakeFunction(0));
    ctx.emit(Instr::StoreLocal(slot));
    ctx.emit(Instr::Pop);
    Some(at)
}

/// Compiles `decl` as a child of the current function and returns its index.
pub(crate) fn compile_function(ctx: &mut CompileContext<'_>, decl: &FunctionDecl) -> u32 {
    let name: Option<Arc<str>> = decl.name.map(|n| Arc::from(ctx.name(n)));
    ctx.functions.push(FunctionBuilder::function(name));

    for (param, span) in &decl.params {
        // In sloppy mode the later parameter wins the name.
        if ctx.mode.is_strict() && ctx.current().lookup_innermost(*param).is_some() {
            ctx.sink
                .emit(errors::error_duplicate_param(ctx.name(*param), *span));
        }
        ctx.declare_local(*param, false, false, *span);
    }
    let arity = match u16::try_from(decl.params.len()) {
        Ok(arity) => arity,
        Err(_) => {
            ctx.sink
                .emit(errors::error_limit("parameters", u16::MAX as usize, decl.span));
            u16::MAX
        }
    };
    ctx.current().arity = arity;

    let mut vars = Vec::new();
    collect_vars(&decl.body, &mut vars);
    for (var, span) in vars {
        if ctx.current().lookup_innermost(var).is_none() {
            ctx.declare_local(var, false, false, span);
        }
    }

    compile_block(ctx, &decl.body);
    ctx.emit(Instr::LoadUndefined);
    ctx.emit(Instr::Return);

    let Some(finished) = ctx.functions.pop() else {
        return 0;
    };
    let parent = ctx.current();
    parent.children.push(finished);
    let index = parent.children.len() - 1;
    match u32::try_from(index) {
        Ok(index) => index,
        Err(_) => {
            ctx.sink
                .emit(errors::error_limit("nested functions", u32::MAX as usize, decl.span));
            0
        }
    }
}

/// Collects `var` declarations of a function body, without entering nested
/// functions.
fn collect_vars(body: &[Stmt], out: &mut Vec<(Ident, Span)>) {
    for stmt in body {
        collect_vars_in(stmt, out);
    }
}

fn collect_vars_in(stmt: &Stmt, out: &mut Vec<(Ident, Span)>) {
    match stmt {
        Stmt::Declare {
            kind: DeclKind::Var,
            name,
            span,
            ..
        } => out.push((*name, *span)),
        Stmt::If {
            then_branch,
            else_branch,
            ..
        } => {
            collect_vars_in(then_branch, out);
            if let Some(else_branch) = else_branch {
                collect_vars_in(else_branch, out);
            }
        }
        Stmt::While { body, .. } => collect_vars_in(body, out),
        Stmt::Block { body, .. } => collect_vars(body, out),
        _ => {}
    }
}

/// Emits a store of the value on top of the stack into `name`, leaving the
/// value in place.
pub(crate) fn compile_store(ctx: &mut CompileContext<'_>, name: Ident, span: Span) {
    match ctx.resolve(name) {
        Resolved::Local(local) => {
            if local.is_const {
                ctx.sink.emit(errors::error_const_assign(ctx.name(name), span));
            }
            ctx.emit(Instr::StoreLocal(local.slot));
        }
        Resolved::Captured => {
            ctx.sink.emit(errors::error_capture(ctx.name(name), span));
        }
        Resolved::Global => {
            let name_index = ctx.name_constant(name, span);
            ctx.emit(Instr::StoreGlobal(name_index));
        }
    }
}
