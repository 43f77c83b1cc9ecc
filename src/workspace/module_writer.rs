use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use crate::context::Context;
use crate::template::TemplateRenderer;

/// Write the queue module into `module_dir`, overwriting any previous version.
///
/// Returns the paths written.
pub fn write_module(
    ctx: &Context,
    renderer: &TemplateRenderer,
    module_dir: &Path,
) -> Result<Vec<PathBuf>> {
    ctx.fs
        .create_dir_all(module_dir)
        .with_context(|| format!("Failed to create module directory {}", module_dir.display()))?;

    let mut written = Vec::new();
    for (file_name, contents) in renderer.render_module_files()? {
        let path = module_dir.join(file_name);
        ctx.fs.write(&path, &contents)?;
        written.push(path);
    }

    Ok(written)
}
