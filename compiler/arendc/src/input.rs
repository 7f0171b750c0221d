//! Salsa inputs.

use arend_ir::ModulePath;

/// Source text of one module.
///
/// Setting `text` invalidates [`parsed`](crate::query::parsed) for this file.
#[salsa::input]
pub struct SourceFile {
    #[return_ref]
    pub module: ModulePath,

    #[return_ref]
    pub text: String,
}
