//! Builders and accessors for the handful of AST shapes the rewriter touches.

use swc_core::common::{Span, SyntaxContext, DUMMY_SP};
use swc_core::ecma::ast::*;

/// Global identifier of the library being migrated away from.
pub const SOURCE_GLOBAL: &str = "moment";
/// Global identifier of the library being migrated to.
pub const TARGET_GLOBAL: &str = "dayjs";

// -----------------------------------------------------------------------------
// Identifier / literal builders
// -----------------------------------------------------------------------------

pub fn ident(name: &str) -> Ident {
    Ident::new(name.into(), DUMMY_SP, SyntaxContext::empty())
}

pub fn ident_at(name: &str, span: Span) -> Ident {
    Ident::new(name.into(), span, SyntaxContext::empty())
}

pub fn ident_name(name: &str) -> IdentName {
    IdentName::new(name.into(), DUMMY_SP)
}

pub fn str_lit(value: &str) -> Str {
    Str {
        span: DUMMY_SP,
        value: value.into(),
        raw: None,
    }
}

// -----------------------------------------------------------------------------
// Accessors
// -----------------------------------------------------------------------------

pub fn is_ident(expr: &Expr, name: &str) -> bool {
    matches!(expr, Expr::Ident(i) if i.sym.as_ref() == name)
}

/// Non-computed property name of a member expression.
pub fn member_prop(member: &MemberExpr) -> Option<&str> {
    match &member.prop {
        MemberProp::Ident(prop) => Some(prop.sym.as_ref()),
        _ => None,
    }
}

pub fn callee_expr(call: &CallExpr) -> Option<&Expr> {
    match &call.callee {
        Callee::Expr(expr) => Some(expr),
        _ => None,
    }
}

pub fn callee_member(call: &CallExpr) -> Option<&MemberExpr> {
    match callee_expr(call)? {
        Expr::Member(member) => Some(member),
        _ => None,
    }
}

pub fn callee_member_mut(call: &mut CallExpr) -> Option<&mut MemberExpr> {
    match &mut call.callee {
        Callee::Expr(expr) => match &mut **expr {
            Expr::Member(member) => Some(member),
            _ => None,
        },
        _ => None,
    }
}

/// Method name when the callee is a non-computed member access.
pub fn call_prop(call: &CallExpr) -> Option<&str> {
    member_prop(callee_member(call)?)
}

/// First argument when it is a plain string literal.
pub fn first_arg_str(call: &CallExpr) -> Option<&Str> {
    match call.args.first() {
        Some(ExprOrSpread { spread: None, expr }) => match &**expr {
            Expr::Lit(Lit::Str(s)) => Some(s),
            _ => None,
        },
        _ => None,
    }
}

/// `const <local> = require(...)` with a plain identifier binding.
pub fn is_require_of(decl: &VarDecl, local: &str) -> bool {
    let Some(first) = decl.decls.first() else {
        return false;
    };
    let Pat::Ident(name) = &first.name else {
        return false;
    };
    if name.id.sym.as_ref() != local {
        return false;
    }
    match first.init.as_deref() {
        Some(Expr::Call(call)) => {
            matches!(callee_expr(call), Some(expr) if is_ident(expr, "require"))
        }
        _ => false,
    }
}

/// Root identifier of a call/member chain: `moment.utc().local()` -> `moment`.
pub fn chain_root(expr: &Expr) -> Option<&Ident> {
    match expr {
        Expr::Ident(i) => Some(i),
        Expr::Member(m) => chain_root(&m.obj),
        Expr::Call(c) => chain_root(callee_expr(c)?),
        Expr::Paren(p) => chain_root(&p.expr),
        _ => None,
    }
}

// -----------------------------------------------------------------------------
// Statement builders used by the import/require passes and the injector
// -----------------------------------------------------------------------------

/// `import dayjs from 'dayjs';` (span carried over so leading comments stay put)
pub fn default_import(local: &str, src: &str, span: Span) -> ImportDecl {
    ImportDecl {
        span,
        specifiers: vec![ImportSpecifier::Default(ImportDefaultSpecifier {
            span: DUMMY_SP,
            local: ident(local),
        })],
        src: Box::new(str_lit(src)),
        type_only: false,
        with: None,
        phase: ImportPhase::Evaluation,
    }
}

/// `import 'dayjs/locale/zh-cn';`
pub fn bare_import(src: &str) -> ModuleItem {
    ModuleItem::ModuleDecl(ModuleDecl::Import(ImportDecl {
        span: DUMMY_SP,
        specifiers: vec![],
        src: Box::new(str_lit(src)),
        type_only: false,
        with: None,
        phase: ImportPhase::Evaluation,
    }))
}

fn require_call(src: &str) -> CallExpr {
    CallExpr {
        span: DUMMY_SP,
        ctxt: SyntaxContext::empty(),
        callee: Callee::Expr(Box::new(Expr::Ident(ident("require")))),
        args: vec![ExprOrSpread {
            spread: None,
            expr: Box::new(Expr::Lit(Lit::Str(str_lit(src)))),
        }],
        type_args: None,
    }
}

/// `const dayjs = require('dayjs');`
pub fn require_const(local: &str, src: &str, span: Span) -> VarDecl {
    VarDecl {
        span,
        ctxt: SyntaxContext::empty(),
        kind: VarDeclKind::Const,
        declare: false,
        decls: vec![VarDeclarator {
            span: DUMMY_SP,
            name: Pat::Ident(BindingIdent {
                id: ident(local),
                type_ann: None,
            }),
            init: Some(Box::new(Expr::Call(require_call(src)))),
            definite: false,
        }],
    }
}

/// `require('dayjs/locale/zh-cn');`
pub fn bare_require_stmt(src: &str) -> ModuleItem {
    ModuleItem::Stmt(Stmt::Expr(ExprStmt {
        span: DUMMY_SP,
        expr: Box::new(Expr::Call(require_call(src))),
    }))
}

/// `dayjs.extend(<plugin>);`
pub fn extend_stmt(plugin: &str) -> ModuleItem {
    ModuleItem::Stmt(Stmt::Expr(ExprStmt {
        span: DUMMY_SP,
        expr: Box::new(Expr::Call(CallExpr {
            span: DUMMY_SP,
            ctxt: SyntaxContext::empty(),
            callee: Callee::Expr(Box::new(Expr::Member(MemberExpr {
                span: DUMMY_SP,
                obj: Box::new(Expr::Ident(ident(TARGET_GLOBAL))),
                prop: MemberProp::Ident(ident_name("extend")),
            }))),
            args: vec![ExprOrSpread {
                spread: None,
                expr: Box::new(Expr::Ident(ident(plugin))),
            }],
            type_args: None,
        })),
    }))
}
