use crate::{ScanState, Scanner, Syntax};
use tracing::trace;

/// Scans the textual form of a constructor and returns the names declared in
/// its parameter list, in order. Identifiers before the list opens, such as
/// the name of a named declaration, are not parameters.
///
/// Scanning is best-effort. If the text is malformed, the names found before
/// the scanner gave up are returned.
///
/// ```
/// use runtime_locator::{parameter_names, Syntax};
///
/// let syntax = Syntax::default();
/// assert_eq!(
///     vec!["§dep", "literal"],
///     parameter_names("function named(§dep, literal) {}", &syntax)
/// );
/// assert!(parameter_names("function () {}", &syntax).is_empty());
/// ```
#[must_use]
pub fn parameter_names(source: &str, syntax: &Syntax) -> Vec<String> {
    let mut scanner = Scanner::new(source, syntax);
    let mut names = Vec::new();
    let mut in_parameters = false;

    loop {
        let token = scanner.next_token();
        match token.state {
            ScanState::End => break,
            ScanState::Illegal => {
                trace!(
                    offset = token.start,
                    found = names.len(),
                    "signature scan stopped at unexpected input"
                );
                break;
            }
            ScanState::ParenthesesOpen => in_parameters = true,
            ScanState::Identifier if in_parameters => {
                names.push(token.text(source).to_owned());
            }
            _ => {}
        }
    }

    names
}
