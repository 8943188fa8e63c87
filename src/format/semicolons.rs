//! Statement terminator cleanup.

use super::formatter::Formatter;
use crate::parser::Token;

/// Remove a `;` that is the last thing on its line
///
/// Separators between statements on one line (`a; b`) and inside
/// `for(;;)` headers are kept.
pub(super) fn semicolons(f: &mut Formatter) {
    let mut i = 0;
    while i < f.len() {
        if matches!(f.token(i), Some(Token::Delimiter(d)) if d == ";") {
            let ends_line = f
                .index_of_next(i, |t| !t.is_space())
                .is_none_or(|next| f.token(next).is_some_and(Token::is_linebreak));
            if ends_line {
                f.remove_token(i);
                continue;
            }
        }
        i += 1;
    }
}
