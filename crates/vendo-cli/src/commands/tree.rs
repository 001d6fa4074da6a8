//! Handler for `vendo tree`.

use miette::Result;

use vendo_ops::ops_tree;

pub fn exec(deps_root: &str, depth: Option<usize>) -> Result<()> {
    let project_root = super::project_root()?;
    let deps_root = super::resolve_deps_root(&project_root, deps_root);

    let rendered = ops_tree::tree(&project_root, &deps_root, depth)?;
    print!("{rendered}");
    Ok(())
}
