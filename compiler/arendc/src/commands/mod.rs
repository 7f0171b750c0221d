//! CLI commands.
//!
//! Both commands take files or directories. A directory is a source root:
//! `Data/List.ard` under it is module `Data.List`. A file given directly is
//! the module named by its stem.

use std::path::{Path, PathBuf};

use arend_ir::ModulePath;

use crate::reporting::Renderer;
use crate::server::{ArendServer, ServerError};

mod check;
mod order;

pub use check::{check_modules, CheckOutcome};
pub use order::{dependency_order, OrderedComponent};

/// Extension of Arend source files.
pub const SOURCE_EXTENSION: &str = "ard";

/// A source file and the module it defines.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SourceModule {
    pub module: ModulePath,
    pub file: PathBuf,
    pub text: String,
}

/// Read every module under `paths`, sorted by module path.
pub fn load_sources(paths: &[PathBuf]) -> Result<Vec<SourceModule>, ServerError> {
    let mut modules = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut files = Vec::new();
            collect_files(path, &mut files)?;
            for file in files {
                let Ok(relative) = file.strip_prefix(path) else {
                    continue;
                };
                let module = module_path(relative);
                modules.push(read_module(module, file)?);
            }
        } else {
            let module = module_path(Path::new(path.file_name().unwrap_or_default()));
            modules.push(read_module(module, path.clone())?);
        }
    }
    modules.sort_by(|a, b| a.module.cmp(&b.module));
    Ok(modules)
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), ServerError> {
    let entries = std::fs::read_dir(dir).map_err(|source| io_error(dir, source))?;
    for entry in entries {
        let path = entry.map_err(|source| io_error(dir, source))?.path();
        if path.is_dir() {
            collect_files(&path, files)?;
        } else if path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION) {
            files.push(path);
        }
    }
    Ok(())
}

fn read_module(module: ModulePath, file: PathBuf) -> Result<SourceModule, ServerError> {
    let text = std::fs::read_to_string(&file).map_err(|source| io_error(&file, source))?;
    Ok(SourceModule { module, file, text })
}

fn io_error(path: &Path, source: std::io::Error) -> ServerError {
    ServerError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// `Data/List.ard` -> `Data.List`.
fn module_path(relative: &Path) -> ModulePath {
    let mut segments: Vec<String> = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect();
    if let Some(last) = segments.last_mut() {
        if let Some(stem) = Path::new(last.as_str()).file_stem() {
            *last = stem.to_string_lossy().into_owned();
        }
    }
    ModulePath::new(segments)
}

/// Hand the sources to the server; returns a renderer that knows them.
pub fn load_into(server: &ArendServer, sources: &[SourceModule]) -> Renderer {
    let mut renderer = Renderer::new();
    if let Some(prelude) = &server.context().prelude {
        renderer.add_source(prelude.module.clone(), "<prelude>", prelude.source.clone());
    }
    for source in sources {
        server.update_module(source.module.clone(), source.text.clone());
        renderer.add_source(
            source.module.clone(),
            source.file.display().to_string(),
            source.text.clone(),
        );
    }
    renderer
}
