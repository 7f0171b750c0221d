//! Salsa queries.

use crate::db::Db;
use crate::input::SourceFile;
use arend_parse::ParseOutput;

/// Parse a module.
///
/// # Early Cutoff
///
/// [`ParseOutput`] is compared by value: an edit that produces the same
/// concrete model (spans included) is not propagated further.
#[salsa::tracked]
pub fn parsed(db: &dyn Db, file: SourceFile) -> ParseOutput {
    arend_parse::parse(file.module(db).clone(), file.text(db))
}
