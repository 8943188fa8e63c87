//! Style inference from existing sources.
//!
//! Looks at how a corpus is already written and picks the option values the
//! majority of it follows. Only indent, linebreak and brace style are
//! inferred; every other field keeps its default.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::FormatError;
use crate::options::{FileOptions, FormatOptions, Indent, Linebreak};
use crate::parser::{tokenize, Token};
use crate::process::enumerate_files;

/// Infer the options that best describe `corpus`
#[must_use]
pub fn infer_options(corpus: &[Vec<Token>]) -> FormatOptions {
    let mut votes = Votes::default();
    for tokens in corpus {
        votes.count(tokens);
    }
    FormatOptions {
        indent: votes.indent(),
        linebreak: votes.linebreak(),
        allman: votes.allman > votes.knr,
        ..FormatOptions::default()
    }
}

/// Tokenize every eligible file below `inputs` and infer options from them
///
/// Files that fail to read or lex are reported and left out of the corpus.
pub fn infer_from_paths(
    inputs: &[impl AsRef<Path>],
    file_options: &FileOptions,
) -> (FormatOptions, Vec<FormatError>) {
    let mut corpus: Vec<Vec<Token>> = Vec::new();
    let mut errors = Vec::new();
    for input in inputs {
        errors.extend(enumerate_files(
            input.as_ref(),
            None,
            file_options,
            &mut corpus,
            |path, _| match fs::read_to_string(path) {
                Ok(source) => {
                    let tokens = tokenize(&source);
                    if let Some(Token::Error(_)) = tokens.last() {
                        let error =
                            FormatError::Parsing(format!("Failed to tokenize {}", path.display()));
                        return Box::new(move |_: &mut Vec<Vec<Token>>| Err(error));
                    }
                    Box::new(move |corpus: &mut Vec<Vec<Token>>| {
                        corpus.push(tokens);
                        Ok(())
                    })
                }
                Err(e) => {
                    let error =
                        FormatError::Reading(format!("Failed to read file {}: {e}", path.display()));
                    Box::new(move |_: &mut Vec<Vec<Token>>| Err(error))
                }
            },
        ));
    }
    debug!(files = corpus.len(), "inferring options");
    (infer_options(&corpus), errors)
}

#[derive(Debug, Default)]
struct Votes {
    /// Positive indentation steps in spaces, by size
    space_steps: HashMap<usize, usize>,
    tab_lines: usize,
    linebreaks: HashMap<Linebreak, usize>,
    allman: usize,
    knr: usize,
}

impl Votes {
    fn count(&mut self, tokens: &[Token]) {
        let mut previous_width: Option<usize> = None;
        let mut line_start = true;
        for (i, token) in tokens.iter().enumerate() {
            match token {
                Token::Linebreak(text) => {
                    if let Some(style) = Linebreak::from_text(text) {
                        *self.linebreaks.entry(style).or_default() += 1;
                    }
                    line_start = true;
                    continue;
                }
                Token::Space(text) if line_start => {
                    // Blank lines say nothing about indentation
                    let blank = tokens.get(i + 1).is_none_or(Token::is_linebreak);
                    if !blank {
                        if text.contains('\t') {
                            self.tab_lines += 1;
                        } else {
                            self.step(&mut previous_width, text.len());
                        }
                    }
                }
                _ if line_start => self.step(&mut previous_width, 0),
                _ => {}
            }
            if token.is_start_of_scope("{") {
                self.brace(tokens, i);
            }
            line_start = false;
        }
    }

    fn step(&mut self, previous_width: &mut Option<usize>, width: usize) {
        if let Some(previous) = *previous_width {
            // Steps wider than any valid indent are alignment, not nesting
            if width > previous && width - previous <= FormatOptions::MAX_INDENT {
                *self.space_steps.entry(width - previous).or_default() += 1;
            }
        }
        *previous_width = Some(width);
    }

    fn brace(&mut self, tokens: &[Token], index: usize) {
        let mut saw_linebreak = false;
        for token in tokens[..index].iter().rev() {
            match token {
                Token::Space(_) => {}
                Token::Linebreak(_) => saw_linebreak = true,
                head if head.is_block_head_end() => {
                    if saw_linebreak {
                        self.allman += 1;
                    } else {
                        self.knr += 1;
                    }
                    return;
                }
                _ => return,
            }
        }
    }

    fn indent(&self) -> Indent {
        let spaced: usize = self.space_steps.values().sum();
        if self.tab_lines > spaced {
            return Indent::Tab;
        }
        self.space_steps
            .iter()
            // Ties go to the smaller step
            .max_by_key(|&(&step, &count)| (count, std::cmp::Reverse(step)))
            .map_or(FormatOptions::default().indent, |(&step, _)| {
                Indent::Spaces(step)
            })
    }

    fn linebreak(&self) -> Linebreak {
        self.linebreaks
            .iter()
            // Ties go to the preferred style
            .max_by_key(|&(&style, &count)| (count, std::cmp::Reverse(style)))
            .map_or(Linebreak::Lf, |(&style, _)| style)
    }
}
