//! Expression lowering. Every expression leaves exactly one value on the
//! operand stack.

use crate::context::{CompileContext, Resolved};
use crate::errors;
use crate::stmt::{compile_function, compile_store};
use ember_bytecode::{BinaryKind, CodeStub, Constant, Instr, UnaryKind};
use ember_parser::ast::{BinaryOp, Expr, UnaryOp};

pub(crate) fn compile_expr(ctx: &mut CompileContext<'_>, expr: &Expr) {
    match expr {
        Expr::Number(value, span) => {
            let index = ctx.constant(Constant::Number(*value), *span);
            ctx.emit(Instr::LoadConst(index));
        }
        Expr::Str(value, span) => {
            let index = ctx.constant(Constant::Str(value.as_str().into()), *span);
            ctx.emit(Instr::LoadConst(index));
        }
        Expr::Bool(true, _) => {
            ctx.emit(Instr::LoadTrue);
        }
        Expr::Bool(false, _) => {
            ctx.emit(Instr::LoadFalse);
        }
        Expr::Null(_) => {
            ctx.emit(Instr::LoadNull);
        }
        Expr::Undefined(_) | Expr::Error(_) => {
            ctx.emit(Instr::LoadUndefined);
        }
        Expr::Ident(name, span) => match ctx.resolve(*name) {
            Resolved::Local(local) => {
                ctx.emit(Instr::LoadLocal(local.slot));
            }
            Resolved::Captured => {
                ctx.sink.emit(errors::error_capture(ctx.name(*name), *span));
                ctx.emit(Instr::LoadUndefined);
            }
            Resolved::Global => {
                let index = ctx.name_constant(*name, *span);
                ctx.emit(Instr::LoadGlobal(index));
            }
        },
        Expr::Assign {
            target,
            value,
            span,
        } => {
            compile_expr(ctx, value);
            compile_store(ctx, *target, *span);
        }
        Expr::Binary {
            left,
            op: BinaryOp::And,
            right,
            span,
        } => {
            compile_expr(ctx, left);
            ctx.emit(Instr::Dup);
            let to_end = ctx.emit(Instr::JumpIfFalse(0));
            ctx.emit(Instr::Pop);
            compile_expr(ctx, right);
            ctx.patch_to_here(to_end, *span);
        }
        Expr::Binary {
            left,
            op: BinaryOp::Or,
            right,
            span,
        } => {
            compile_expr(ctx, left);
            ctx.emit(Instr::Dup);
            let to_right = ctx.emit(Instr::JumpIfFalse(0));
            let to_end = ctx.emit(Instr::Jump(0));
            ctx.patch_to_here(to_right, *span);
            ctx.emit(Instr::Pop);
            compile_expr(ctx, right);
            ctx.patch_to_here(to_end, *span);
        }
        Expr::Binary {
            left,
            op,
            right,
            span,
        } => {
            compile_expr(ctx, left);
            compile_expr(ctx, right);
            if let Some(kind) = binary_kind(*op) {
                ctx.invoke_stub(CodeStub::Binary(kind), *span);
            }
        }
        Expr::Unary { op, operand, span } => {
            compile_expr(ctx, operand);
            ctx.invoke_stub(CodeStub::Unary(unary_kind(*op)), *span);
        }
        Expr::Call { callee, args, span } => {
            compile_expr(ctx, callee);
            for arg in args {
                compile_expr(ctx, arg);
            }
            let argc = match u16::try_from(args.len()) {
                Ok(argc) => argc,
                Err(_) => {
                    ctx.sink
                        .emit(errors::error_limit("call arguments", u16::MAX as usize, *span));
                    u16::MAX
                }
            };
            ctx.invoke_stub(CodeStub::Call { argc }, *span);
        }
        Expr::Function(decl) => {
            let child = compile_function(ctx, decl);
            ctx.emit(Instr::MakeFunction(child));
        }
    }
}

fn binary_kind(op: BinaryOp) -> Option<BinaryKind> {
    let kind = match op {
        BinaryOp::Add => BinaryKind::Add,
        BinaryOp::Sub => BinaryKind::Sub,
        BinaryOp::Mul => BinaryKind::Mul,
        BinaryOp::Div => BinaryKind::Div,
        BinaryOp::Mod => BinaryKind::Mod,
        BinaryOp::Lt => BinaryKind::Lt,
        BinaryOp::Le => BinaryKind::Le,
        BinaryOp::Gt => BinaryKind::Gt,
        BinaryOp::Ge => BinaryKind::Ge,
        BinaryOp::Eq => BinaryKind::Eq,
        BinaryOp::NotEq => BinaryKind::NotEq,
        BinaryOp::StrictEq => BinaryKind::StrictEq,
        BinaryOp::StrictNotEq => BinaryKind::StrictNotEq,
        // Short-circuit operators lower to jumps.
        BinaryOp::And | BinaryOp::Or => return None,
    };
    Some(kind)
}

fn unary_kind(op: UnaryOp) -> UnaryKind {
    match op {
        UnaryOp::Not => UnaryKind::Not,
        UnaryOp::Neg => UnaryKind::Neg,
        UnaryOp::Plus => UnaryKind::Plus,
        UnaryOp::Typeof => UnaryKind::Typeof,
    }
}
