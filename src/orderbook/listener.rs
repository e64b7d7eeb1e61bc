use super::error::EntryValidationCode;
use crate::messages::PackageHeader;
use tracing::warn;

/// Receives entries rejected while a package is processed.
///
/// Implemented for any `FnMut(&PackageHeader, EntryValidationCode)` closure.
pub trait ErrorListener {
    fn on_error(&mut self, package: &PackageHeader, code: EntryValidationCode);
}

impl<F> ErrorListener for F
where
    F: FnMut(&PackageHeader, EntryValidationCode),
{
    fn on_error(&mut self, package: &PackageHeader, code: EntryValidationCode) {
        self(package, code)
    }
}

/// Default listener: logs every rejected entry at `warn` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingErrorListener;

impl ErrorListener for LoggingErrorListener {
    fn on_error(&mut self, package: &PackageHeader, code: EntryValidationCode) {
        warn!(
            "Rejected entry in {:?} package for {}: {}",
            package.package_type, package.symbol, code
        );
    }
}
