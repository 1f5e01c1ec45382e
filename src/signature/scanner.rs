use crate::Syntax;

/// The lexical states of a [`Scanner`].
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum ScanState {
    /// Nothing has been scanned yet.
    No,
    /// The declaration keyword.
    Function,
    /// A run of identifier characters.
    Identifier,
    /// An opening parenthesis.
    ParenthesesOpen,
    /// A closing parenthesis.
    ParenthesesClose,
    /// A parameter separator.
    Comma,
    /// The parameter list was closed. Terminal.
    End,
    /// The input could not be scanned any further. Terminal.
    Illegal,
}

impl ScanState {
    /// Whether the scanner stays in this state forever once reached.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, ScanState::End | ScanState::Illegal)
    }
}

/// A lexeme produced by a [`Scanner`]. `start..end` is a byte range into the
/// scanned text.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Token {
    /// The state in which the lexeme was consumed.
    pub state: ScanState,
    /// Offset of the first byte of the lexeme.
    pub start: usize,
    /// Offset one past the last byte of the lexeme.
    pub end: usize,
}

impl Token {
    /// Gets the text of this token. Terminal tokens cover the character at
    /// which scanning stopped, or nothing at the end of the input.
    #[must_use]
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.start..self.end).unwrap_or("")
    }
}

/// A finite-state tokenizer for the textual form of a constructor, such as
/// `function (§logger, level) {}`.
///
/// Each call to [`next_token`](Scanner::next_token) performs exactly one state
/// transition and returns the lexeme consumed while leaving the previous
/// state. The scanner never fails: malformed input moves it to
/// [`ScanState::Illegal`], where it stays.
///
/// ```
/// use runtime_locator::{ScanState, Scanner, Syntax};
///
/// let syntax = Syntax::default();
/// let states: Vec<_> = Scanner::new("function (a) {}", &syntax)
///     .map(|token| token.state)
///     .collect();
///
/// assert_eq!(
///     vec![
///         ScanState::Function,
///         ScanState::ParenthesesOpen,
///         ScanState::Identifier,
///         ScanState::ParenthesesClose,
///         ScanState::End,
///     ],
///     states
/// );
/// ```
#[derive(Debug)]
pub struct Scanner<'a> {
    source: &'a str,
    syntax: &'a Syntax,
    state: ScanState,
    index: usize,
    exhausted: bool,
}

impl<'a> Scanner<'a> {
    /// Creates a scanner positioned at the start of `source`.
    #[must_use]
    pub fn new(source: &'a str, syntax: &'a Syntax) -> Self {
        Scanner {
            source,
            syntax,
            state: ScanState::No,
            index: 0,
            exhausted: false,
        }
    }

    /// The state the scanner will consume from on the next call.
    #[must_use]
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// The current byte offset into the source text.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Performs one transition and returns the consumed token.
    pub fn next_token(&mut self) -> Token {
        let start = self.index;
        let consumed = self.state;
        match consumed {
            ScanState::No => {
                // Nothing is consumed here, so move on to the next transition
                self.skip_whitespace();
                self.state = if self.rest().starts_with(self.syntax.keyword())
                {
                    ScanState::Function
                } else {
                    ScanState::Illegal
                };
                return self.next_token();
            }
            ScanState::End | ScanState::Illegal => {
                return Token {
                    state: consumed,
                    start,
                    end: start + 1,
                };
            }
            ScanState::Function => {
                self.index += self.syntax.keyword().len();
            }
            ScanState::Identifier => {
                let run = self
                    .rest()
                    .char_indices()
                    .find(|&(_, c)| !self.syntax.is_identifier_char(c))
                    .map_or(self.rest().len(), |(offset, _)| offset);
                self.index += run;
            }
            ScanState::ParenthesesOpen
            | ScanState::ParenthesesClose
            | ScanState::Comma => {
                self.index += 1;
            }
        }

        let end = self.index;
        self.state = match consumed {
            ScanState::Function => self.expect(&[
                ScanState::ParenthesesOpen,
                ScanState::Identifier,
            ]),
            ScanState::ParenthesesOpen => self.expect(&[
                ScanState::Identifier,
                ScanState::ParenthesesClose,
            ]),
            ScanState::Identifier => self.expect(&[
                ScanState::ParenthesesOpen,
                ScanState::ParenthesesClose,
                ScanState::Comma,
            ]),
            ScanState::Comma => self.expect(&[ScanState::Identifier]),
            _ => ScanState::End,
        };

        Token {
            state: consumed,
            start,
            end,
        }
    }

    fn rest(&self) -> &'a str {
        &self.source[self.index..]
    }

    fn skip_whitespace(&mut self) {
        let trimmed = self.rest().trim_start();
        self.index = self.source.len() - trimmed.len();
    }

    /// Skips whitespace and picks the next state from the upcoming character,
    /// falling back to [`ScanState::Illegal`] if it starts none of `allowed`.
    fn expect(&mut self, allowed: &[ScanState]) -> ScanState {
        self.skip_whitespace();
        let upcoming = self.rest().chars().next().and_then(|c| match c {
            '(' => Some(ScanState::ParenthesesOpen),
            ')' => Some(ScanState::ParenthesesClose),
            ',' => Some(ScanState::Comma),
            c if self.syntax.is_identifier_char(c) => {
                Some(ScanState::Identifier)
            }
            _ => None,
        });

        match upcoming {
            Some(state) if allowed.contains(&state) => state,
            _ => ScanState::Illegal,
        }
    }
}

/// Yields tokens up to and including the first terminal one.
impl Iterator for Scanner<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        let token = self.next_token();
        self.exhausted = token.state.is_terminal();
        Some(token)
    }
}
