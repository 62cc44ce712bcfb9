use super::DbmsHandler;

/// ANSI baseline dialect.
///
/// Advertises no pagination, sequences or batching: limits and skips are
/// applied while iterating and auto-increment values come from the
/// sequence table.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericDbms;

impl DbmsHandler for GenericDbms {
    fn name(&self) -> &'static str {
        "generic"
    }
}
