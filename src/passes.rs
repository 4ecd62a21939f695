//! The rewrite pass pipeline.
//!
//! Eleven passes run in fixed order, each a full-tree scan for one category
//! of moment usage. Later passes see the output of earlier ones; passes
//! communicate only through the tree and the [`RewriteContext`] accumulators.
//! The final pass re-roots every `moment`-rooted call/member chain at `dayjs`
//! bottom-up, re-applying the unit normalizations at each chain level and
//! running plugin detection on every site it rewrites.

use std::collections::BTreeSet;

use swc_core::common::{SyntaxContext, DUMMY_SP};
use swc_core::ecma::ast::*;
use swc_core::ecma::visit::{VisitMut, VisitMutWith};
use tracing::debug;

use crate::ast::{self, SOURCE_GLOBAL, TARGET_GLOBAL};
use crate::error::Error;
use crate::registry::{self, ArgShape, PluginDescriptor, Rewrite, Site};
use crate::units;

/// Per-file accumulators threaded through the pipeline. Each file gets a
/// fresh context, so files can be processed concurrently.
#[derive(Debug, Default)]
pub struct RewriteContext {
    /// Names of dayjs plugins the rewritten code needs.
    pub plugins: BTreeSet<&'static str>,
    /// Lower-cased locale ids passed to `locale(...)` calls.
    pub locales: BTreeSet<String>,
}

/// Runs all passes over the module in pipeline order.
pub fn run(module: &mut Module, ctx: &mut RewriteContext) -> Result<(), Error> {
    rewrite_import_declarations(module);
    rewrite_require_declarations(module);
    module.visit_mut_with(&mut AssertEntryPoint);
    module.visit_mut_with(&mut TypeReferences);
    module.visit_mut_with(&mut NowAccessor);
    module.visit_mut_with(&mut PluralMethods);
    module.visit_mut_with(&mut ObjectArguments);
    module.visit_mut_with(&mut StringArguments);
    module.visit_mut_with(&mut GetSetCalls);
    module.visit_mut_with(&mut LocaleCalls {
        locales: &mut ctx.locales,
    });

    let mut rewrite = LibraryRewrite { ctx, failure: None };
    module.visit_mut_with(&mut rewrite);
    if let Some(err) = rewrite.failure {
        return Err(err);
    }
    debug!(plugins = ?ctx.plugins, locales = ?ctx.locales, "pass pipeline finished");
    Ok(())
}

// -----------------------------------------------------------------------------
// Passes 1 & 2: module/require statement normalization
// -----------------------------------------------------------------------------

/// `import ... from 'moment'` -> `import dayjs from 'dayjs'`, then collapse
/// duplicate dayjs imports (merged files) down to the first one.
fn rewrite_import_declarations(module: &mut Module) {
    for item in &mut module.body {
        if let ModuleItem::ModuleDecl(ModuleDecl::Import(import)) = item {
            if import.src.value.as_ref() == SOURCE_GLOBAL {
                *import = ast::default_import(TARGET_GLOBAL, TARGET_GLOBAL, import.span);
            }
        }
    }
    let mut seen = false;
    module.body.retain(|item| match item {
        ModuleItem::ModuleDecl(ModuleDecl::Import(import))
            if import.src.value.as_ref() == TARGET_GLOBAL =>
        {
            let keep = !seen;
            seen = true;
            keep
        }
        _ => true,
    });
}

struct RequireDeclarations;

impl VisitMut for RequireDeclarations {
    fn visit_mut_var_decl(&mut self, decl: &mut VarDecl) {
        decl.visit_mut_children_with(self);
        if ast::is_require_of(decl, SOURCE_GLOBAL) {
            *decl = ast::require_const(TARGET_GLOBAL, TARGET_GLOBAL, decl.span);
        }
    }
}

/// `const moment = require('moment')` -> `const dayjs = require('dayjs')`,
/// then collapse duplicate top-level dayjs requires down to the first one.
fn rewrite_require_declarations(module: &mut Module) {
    module.visit_mut_with(&mut RequireDeclarations);
    let mut seen = false;
    module.body.retain(|item| match item {
        ModuleItem::Stmt(Stmt::Decl(Decl::Var(decl))) if ast::is_require_of(decl, TARGET_GLOBAL) => {
            let keep = !seen;
            seen = true;
            keep
        }
        _ => true,
    });
}

// -----------------------------------------------------------------------------
// Pass 3: moment.isMoment(x) -> dayjs.isDayjs(x)
// -----------------------------------------------------------------------------

struct AssertEntryPoint;

impl VisitMut for AssertEntryPoint {
    fn visit_mut_call_expr(&mut self, call: &mut CallExpr) {
        call.visit_mut_children_with(self);
        if is_source_static_method(call, "isMoment") {
            if let Some(member) = ast::callee_member_mut(call) {
                member.obj = Box::new(Expr::Ident(ast::ident(TARGET_GLOBAL)));
                member.prop = MemberProp::Ident(ast::ident_name("isDayjs"));
            }
        }
    }
}

// -----------------------------------------------------------------------------
// Pass 4: Moment / MomentInput / moment.Moment type refs -> dayjs.Dayjs
// -----------------------------------------------------------------------------

struct TypeReferences;

impl VisitMut for TypeReferences {
    fn visit_mut_ts_type_ref(&mut self, type_ref: &mut TsTypeRef) {
        type_ref.visit_mut_children_with(self);
        let matches_source = match &type_ref.type_name {
            TsEntityName::Ident(name) => {
                matches!(name.sym.as_ref(), "Moment" | "MomentInput")
            }
            TsEntityName::TsQualifiedName(qualified) => {
                matches!(&qualified.left, TsEntityName::Ident(left) if left.sym.as_ref() == SOURCE_GLOBAL)
                    && matches!(qualified.right.sym.as_ref(), "Moment" | "MomentInput")
            }
        };
        if matches_source {
            type_ref.type_name = TsEntityName::TsQualifiedName(Box::new(TsQualifiedName {
                span: DUMMY_SP,
                left: TsEntityName::Ident(ast::ident(TARGET_GLOBAL)),
                right: ast::ident_name("Dayjs"),
            }));
            type_ref.type_params = None;
        }
    }
}

// -----------------------------------------------------------------------------
// Pass 5: moment.now() -> dayjs().valueOf()
// -----------------------------------------------------------------------------

struct NowAccessor;

impl VisitMut for NowAccessor {
    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        expr.visit_mut_children_with(self);
        let Expr::Call(call) = expr else { return };
        if !is_source_static_method(call, "now") || !call.args.is_empty() {
            return;
        }
        let span = call.span;
        *expr = Expr::Call(CallExpr {
            span,
            ctxt: SyntaxContext::empty(),
            callee: Callee::Expr(Box::new(Expr::Member(MemberExpr {
                span: DUMMY_SP,
                obj: Box::new(Expr::Call(CallExpr {
                    span: DUMMY_SP,
                    ctxt: SyntaxContext::empty(),
                    callee: Callee::Expr(Box::new(Expr::Ident(ast::ident(TARGET_GLOBAL)))),
                    args: vec![],
                    type_args: None,
                })),
                prop: MemberProp::Ident(ast::ident_name("valueOf")),
            }))),
            args: vec![],
            type_args: None,
        });
    }
}

// -----------------------------------------------------------------------------
// Passes 6-10: unit/argument normalization, one chain level deep
// -----------------------------------------------------------------------------

/// Pass 6: `moment().days()` -> `moment().day()`.
struct PluralMethods;

impl VisitMut for PluralMethods {
    fn visit_mut_call_expr(&mut self, call: &mut CallExpr) {
        call.visit_mut_children_with(self);
        if is_source_rooted_method(call) {
            rename_plural_method(call);
        }
    }
}

/// Pass 7: `moment({ days: 1 })` -> `moment({ day: 1 })`.
struct ObjectArguments;

impl VisitMut for ObjectArguments {
    fn visit_mut_call_expr(&mut self, call: &mut CallExpr) {
        call.visit_mut_children_with(self);
        if is_source_ctor(call) && first_arg_is_object(call) {
            singularize_object_args(&mut call.args);
        }
    }
}

/// Pass 8: `moment().add(1, 'days')` -> `moment().add(1, 'day')`.
struct StringArguments;

impl VisitMut for StringArguments {
    fn visit_mut_call_expr(&mut self, call: &mut CallExpr) {
        call.visit_mut_children_with(self);
        if is_source_rooted_method(call) {
            singularize_string_args(call);
        }
    }
}

/// Pass 9: `moment().get('days')` -> `moment().day()`,
/// `moment().set('days', 1)` -> `moment().day(1)`.
struct GetSetCalls;

impl VisitMut for GetSetCalls {
    fn visit_mut_call_expr(&mut self, call: &mut CallExpr) {
        call.visit_mut_children_with(self);
        if is_source_rooted_method(call) {
            collapse_get_set(call);
        }
    }
}

/// Pass 10: `moment.locale('zh-CN')` -> `moment.locale('zh-cn')`, recording
/// every distinct locale for the injector.
struct LocaleCalls<'a> {
    locales: &'a mut BTreeSet<String>,
}

impl VisitMut for LocaleCalls<'_> {
    fn visit_mut_call_expr(&mut self, call: &mut CallExpr) {
        call.visit_mut_children_with(self);
        if is_source_static_method(call, "locale") && !call.args.is_empty() {
            lower_locale(call, self.locales);
        }
    }
}

// -----------------------------------------------------------------------------
// Pass 11: re-root moment chains at dayjs, detecting plugins along the way
// -----------------------------------------------------------------------------

struct LibraryRewrite<'a> {
    ctx: &'a mut RewriteContext,
    failure: Option<Error>,
}

impl LibraryRewrite<'_> {
    fn record(&mut self, site: &Site) -> Vec<&'static PluginDescriptor> {
        match registry::detect(site) {
            Ok(matched) => {
                for plugin in &matched {
                    self.ctx.plugins.insert(plugin.name);
                }
                matched
            }
            Err(err) => {
                self.failure.get_or_insert(err);
                Vec::new()
            }
        }
    }

    fn rewrite_member(&mut self, member: &mut MemberExpr) {
        let site = Site {
            property: ast::member_prop(member),
            static_receiver: is_library_global(&member.obj),
            constructor: false,
            first_arg: ArgShape::None,
        };
        self.record(&site);
        if self.failure.is_some() {
            return;
        }
        if let Expr::Ident(obj) = &mut *member.obj {
            if obj.sym.as_ref() == SOURCE_GLOBAL {
                *obj = ast::ident_at(TARGET_GLOBAL, obj.span);
            }
        }
    }

    fn rewrite_call(&mut self, call: &mut CallExpr) {
        // The standalone unit passes only look one level above the library
        // root; chains need the same normalization at every level
        // (`moment.utc().get('days')`), so re-apply it here. It must run
        // before detection so detection sees the normalized names. Duration
        // and locale-data objects keep their own plural accessors
        // (`duration().days()`, `localeData().months()`) and are exempt.
        let normalize = receiver_takes_units(call);
        if normalize && ast::callee_member(call).is_some() {
            rename_plural_method(call);
            singularize_string_args(call);
            collapse_get_set(call);
            if is_global_locale_call(call) {
                lower_locale(call, &mut self.ctx.locales);
            }
        }

        let matched = {
            let site = call_site(call);
            self.record(&site)
        };
        if self.failure.is_some() {
            return;
        }
        // A descriptor-supplied rewrite wins over the generic normalizations.
        for plugin in matched {
            match plugin.rewrite {
                Some(Rewrite::NormalizeObjectKeys) if normalize => {
                    singularize_object_args(&mut call.args);
                }
                _ => {}
            }
        }

        if let Callee::Expr(callee) = &mut call.callee {
            if let Expr::Ident(id) = &mut **callee {
                if id.sym.as_ref() == SOURCE_GLOBAL {
                    *id = ast::ident_at(TARGET_GLOBAL, id.span);
                }
            }
        }
    }
}

impl VisitMut for LibraryRewrite<'_> {
    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        if self.failure.is_some() {
            return;
        }
        // Decide on the pre-rewrite root: children are visited first, so by
        // the time this node is handled an inner swap already reads `dayjs`.
        let rooted = ast::chain_root(expr).is_some_and(|root| root.sym.as_ref() == SOURCE_GLOBAL);
        expr.visit_mut_children_with(self);
        if self.failure.is_some() || !rooted {
            return;
        }
        match expr {
            Expr::Call(call) => self.rewrite_call(call),
            Expr::Member(member) => self.rewrite_member(member),
            // A bare `moment` reference (e.g. passed as a callback) is not a
            // call/member root and is left alone.
            _ => {}
        }
    }
}

fn call_site(call: &CallExpr) -> Site {
    let (property, static_receiver) = match ast::callee_member(call) {
        Some(member) => (ast::member_prop(member), is_library_global(&member.obj)),
        None => (None, false),
    };
    let constructor = matches!(ast::callee_expr(call), Some(expr) if is_library_global(expr));
    let first_arg = match call.args.first() {
        None => ArgShape::None,
        Some(ExprOrSpread { spread: Some(_), .. }) => ArgShape::Other,
        Some(ExprOrSpread { spread: None, expr }) => match &**expr {
            Expr::Array(_) => ArgShape::Array,
            Expr::Object(_) => ArgShape::Object,
            Expr::Lit(Lit::Str(s)) => ArgShape::Str(s.value.as_ref()),
            _ => ArgShape::Other,
        },
    };
    Site {
        property,
        static_receiver,
        constructor,
        first_arg,
    }
}

/// The library global under either its old or new spelling; pass 11 works
/// bottom-up, so a receiver may already have been re-rooted.
fn is_library_global(expr: &Expr) -> bool {
    ast::is_ident(expr, SOURCE_GLOBAL) || ast::is_ident(expr, TARGET_GLOBAL)
}

/// Whether a call's receiver yields a date instance, whose method names and
/// unit arguments normalize to singular form. Durations and locale data keep
/// their own plural accessors.
fn receiver_takes_units(call: &CallExpr) -> bool {
    match ast::callee_member(call) {
        Some(member) => match &*member.obj {
            Expr::Call(inner) => !matches!(ast::call_prop(inner), Some("duration" | "localeData")),
            _ => true,
        },
        None => true,
    }
}

fn is_global_locale_call(call: &CallExpr) -> bool {
    match ast::callee_member(call) {
        Some(member) => {
            is_library_global(&member.obj)
                && ast::member_prop(member) == Some("locale")
                && !call.args.is_empty()
        }
        None => false,
    }
}

// -----------------------------------------------------------------------------
// Shared shape predicates
// -----------------------------------------------------------------------------

/// `moment().x(...)`: a method call one level above the library constructor.
fn is_source_rooted_method(call: &CallExpr) -> bool {
    match ast::callee_member(call) {
        Some(member) => match &*member.obj {
            Expr::Call(inner) => {
                matches!(ast::callee_expr(inner), Some(expr) if ast::is_ident(expr, SOURCE_GLOBAL))
            }
            _ => false,
        },
        None => false,
    }
}

/// `moment.<name>(...)`: a static call on the library global.
fn is_source_static_method(call: &CallExpr, name: &str) -> bool {
    match ast::callee_member(call) {
        Some(member) => {
            ast::is_ident(&member.obj, SOURCE_GLOBAL) && ast::member_prop(member) == Some(name)
        }
        None => false,
    }
}

/// `moment(...)`: the bare constructor call.
fn is_source_ctor(call: &CallExpr) -> bool {
    matches!(ast::callee_expr(call), Some(expr) if ast::is_ident(expr, SOURCE_GLOBAL))
}

fn first_arg_is_object(call: &CallExpr) -> bool {
    matches!(
        call.args.first(),
        Some(ExprOrSpread { spread: None, expr }) if matches!(&**expr, Expr::Object(_))
    )
}

// -----------------------------------------------------------------------------
// Shared normalization helpers (passes 6-10 and the pass-11 chain walk)
// -----------------------------------------------------------------------------

/// `.days()` -> `.day()` for plural unit method names.
fn rename_plural_method(call: &mut CallExpr) -> bool {
    let Some(member) = ast::callee_member_mut(call) else {
        return false;
    };
    let MemberProp::Ident(prop) = &member.prop else {
        return false;
    };
    if !units::is_plural_unit(prop.sym.as_ref()) {
        return false;
    }
    let singular = units::to_singular(prop.sym.as_ref()).to_owned();
    member.prop = MemberProp::Ident(ast::ident_name(&singular));
    true
}

/// `(1, 'days')` -> `(1, 'day')` for unit-token string literal arguments.
fn singularize_string_args(call: &mut CallExpr) -> bool {
    let mut changed = false;
    for arg in &mut call.args {
        if arg.spread.is_some() {
            continue;
        }
        if let Expr::Lit(Lit::Str(s)) = &mut *arg.expr {
            if units::is_plural_unit(s.value.as_ref()) {
                let singular = units::to_singular(s.value.as_ref()).to_owned();
                s.value = singular.into();
                s.raw = None;
                changed = true;
            }
        }
    }
    changed
}

/// Normalizes unit keys in every object-literal argument.
fn singularize_object_args(args: &mut [ExprOrSpread]) -> bool {
    let mut changed = false;
    for arg in args {
        if arg.spread.is_some() {
            continue;
        }
        if let Expr::Object(object) = &mut *arg.expr {
            changed |= singularize_object_keys(object);
        }
    }
    changed
}

/// `{ days: 1 }` -> `{ day: 1 }`; shorthand `{ days }` -> `{ day: days }`.
fn singularize_object_keys(object: &mut ObjectLit) -> bool {
    let mut changed = false;
    for prop in &mut object.props {
        let PropOrSpread::Prop(prop) = prop else {
            continue;
        };
        match &mut **prop {
            Prop::KeyValue(kv) => {
                if let PropName::Ident(key) = &kv.key {
                    if units::is_plural_unit(key.sym.as_ref()) {
                        let singular = units::to_singular(key.sym.as_ref()).to_owned();
                        kv.key = PropName::Ident(ast::ident_name(&singular));
                        changed = true;
                    }
                }
            }
            Prop::Shorthand(id) => {
                if units::is_plural_unit(id.sym.as_ref()) {
                    let singular = units::to_singular(id.sym.as_ref()).to_owned();
                    let value = Box::new(Expr::Ident(id.clone()));
                    **prop = Prop::KeyValue(KeyValueProp {
                        key: PropName::Ident(ast::ident_name(&singular)),
                        value,
                    });
                    changed = true;
                }
            }
            _ => {}
        }
    }
    changed
}

/// `get('day')` -> `day()`, `set('days', 1)` -> `day(1)`. With an
/// object-literal first argument the call shape is kept and only the keys
/// normalize. Literals outside the unit vocabulary are left untouched.
fn collapse_get_set(call: &mut CallExpr) -> bool {
    if !matches!(ast::call_prop(call), Some("get" | "set")) {
        return false;
    }
    if let Some(s) = ast::first_arg_str(call) {
        if !units::is_unit(s.value.as_ref()) {
            return false;
        }
        let unit = units::to_singular(s.value.as_ref()).to_owned();
        if let Some(member) = ast::callee_member_mut(call) {
            member.prop = MemberProp::Ident(ast::ident_name(&unit));
        }
        call.args.remove(0);
        return true;
    }
    if let Some(ExprOrSpread { spread: None, expr }) = call.args.first_mut() {
        if let Expr::Object(object) = &mut **expr {
            return singularize_object_keys(object);
        }
    }
    false
}

/// Lower-cases a string-literal locale id and records it.
fn lower_locale(call: &mut CallExpr, locales: &mut BTreeSet<String>) -> bool {
    let Some(ExprOrSpread { spread: None, expr }) = call.args.first_mut() else {
        return false;
    };
    let Expr::Lit(Lit::Str(s)) = &mut **expr else {
        return false;
    };
    let lowered = s.value.to_lowercase();
    locales.insert(lowered.clone());
    if s.value.as_ref() != lowered {
        s.value = lowered.into();
        s.raw = None;
    }
    true
}
