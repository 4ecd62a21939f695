//! Anchor location and statement injection.
//!
//! After the passes ran, at most one `import dayjs from 'dayjs'` and at most
//! one top-level `const dayjs = require('dayjs')` remain (the rewrite passes
//! de-duplicate). Each surviving statement anchors the injected plugin and
//! locale loaders for its module system. No anchor, no injection: a file that
//! only mentions the global without binding it is left without loaders.

use swc_core::ecma::ast::*;

use crate::ast::{self, TARGET_GLOBAL};
use crate::error::Error;
use crate::passes::RewriteContext;
use tracing::debug;

fn is_target_import(item: &ModuleItem) -> bool {
    matches!(
        item,
        ModuleItem::ModuleDecl(ModuleDecl::Import(import))
            if import.src.value.as_ref() == TARGET_GLOBAL
    )
}

fn is_target_require(item: &ModuleItem) -> bool {
    match item {
        ModuleItem::Stmt(Stmt::Decl(Decl::Var(decl))) => ast::is_require_of(decl, TARGET_GLOBAL),
        _ => false,
    }
}

fn locate_anchor(
    module: &Module,
    matcher: fn(&ModuleItem) -> bool,
    module_system: &'static str,
) -> Result<Option<usize>, Error> {
    let mut found = None;
    for (index, item) in module.body.iter().enumerate() {
        if matcher(item) {
            if found.is_some() {
                return Err(Error::AmbiguousAnchor { module_system });
            }
            found = Some(index);
        }
    }
    Ok(found)
}

pub fn locate_import_anchor(module: &Module) -> Result<Option<usize>, Error> {
    locate_anchor(module, is_target_import, "import")
}

pub fn locate_require_anchor(module: &Module) -> Result<Option<usize>, Error> {
    locate_anchor(module, is_target_require, "require")
}

fn plugin_module(name: &str) -> String {
    format!("dayjs/plugin/{name}")
}

fn locale_module(id: &str) -> String {
    format!("dayjs/locale/{id}")
}

fn plugin_import(name: &str) -> ModuleItem {
    ModuleItem::ModuleDecl(ModuleDecl::Import(ast::default_import(
        name,
        &plugin_module(name),
        swc_core::common::DUMMY_SP,
    )))
}

fn plugin_require(name: &str) -> ModuleItem {
    ModuleItem::Stmt(Stmt::Decl(Decl::Var(Box::new(ast::require_const(
        name,
        &plugin_module(name),
        swc_core::common::DUMMY_SP,
    )))))
}

/// Inserts plugin loader/extend pairs and locale loaders after each anchor.
///
/// Plugins are walked in reverse lexicographic order, each pair inserted
/// directly after the anchor, which leaves the emitted statements in forward
/// reading order. Locales go in after the plugin loop and therefore end up
/// between the anchor and the first plugin pair.
pub fn inject(module: &mut Module, ctx: &RewriteContext) -> Result<(), Error> {
    if ctx.plugins.is_empty() && ctx.locales.is_empty() {
        return Ok(());
    }

    if let Some(anchor) = locate_import_anchor(module)? {
        for plugin in ctx.plugins.iter().rev() {
            module.body.insert(anchor + 1, ast::extend_stmt(plugin));
            module.body.insert(anchor + 1, plugin_import(plugin));
        }
        for locale in ctx.locales.iter().rev() {
            module
                .body
                .insert(anchor + 1, ast::bare_import(&locale_module(locale)));
        }
    }

    // Re-located after the import-side insertions may have shifted indices.
    if let Some(anchor) = locate_require_anchor(module)? {
        for plugin in ctx.plugins.iter().rev() {
            module.body.insert(anchor + 1, ast::extend_stmt(plugin));
            module.body.insert(anchor + 1, plugin_require(plugin));
        }
        for locale in ctx.locales.iter().rev() {
            module
                .body
                .insert(anchor + 1, ast::bare_require_stmt(&locale_module(locale)));
        }
    }

    debug!(
        plugins = ctx.plugins.len(),
        locales = ctx.locales.len(),
        "injected dayjs loader statements"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use swc_core::common::DUMMY_SP;

    fn import_item() -> ModuleItem {
        ModuleItem::ModuleDecl(ModuleDecl::Import(ast::default_import(
            TARGET_GLOBAL,
            TARGET_GLOBAL,
            DUMMY_SP,
        )))
    }

    fn module_with(body: Vec<ModuleItem>) -> Module {
        Module {
            span: DUMMY_SP,
            body,
            shebang: None,
        }
    }

    #[test]
    fn missing_anchor_is_not_an_error() {
        let module = module_with(vec![]);
        assert_eq!(locate_import_anchor(&module).unwrap(), None);
        assert_eq!(locate_require_anchor(&module).unwrap(), None);
    }

    #[test]
    fn duplicate_anchors_are_rejected() {
        let module = module_with(vec![import_item(), import_item()]);
        let err = locate_import_anchor(&module).expect_err("two anchors");
        assert!(matches!(
            err,
            Error::AmbiguousAnchor {
                module_system: "import"
            }
        ));
    }

    #[test]
    fn plugins_land_after_the_anchor_in_forward_order() {
        let mut module = module_with(vec![import_item()]);
        let mut ctx = RewriteContext::default();
        ctx.plugins.insert("utc");
        ctx.plugins.insert("isoWeek");
        inject(&mut module, &ctx).unwrap();

        let sources: Vec<_> = module
            .body
            .iter()
            .filter_map(|item| match item {
                ModuleItem::ModuleDecl(ModuleDecl::Import(import)) => {
                    Some(import.src.value.to_string())
                }
                _ => None,
            })
            .collect();
        assert_eq!(sources, ["dayjs", "dayjs/plugin/isoWeek", "dayjs/plugin/utc"]);
        // import + 2 * (loader + extend)
        assert_eq!(module.body.len(), 5);
    }
}
