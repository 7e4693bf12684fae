use std::rc::Rc;

use rustyline::{
    completion::{Completer, Pair},
    hint::Hinter,
};
use rustyline_derive::{Helper, Highlighter, Validator};
use trie_rs::Trie;

/// Line editor helper completing and hinting command names.
#[derive(Helper, Validator, Highlighter)]
pub(crate) struct Completion {
    pub(crate) trie: Rc<Trie<u8>>,
    pub(crate) with_hints: bool,
    pub(crate) with_completion: bool,
}

impl Hinter for Completion {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<Self::Hint> {
        if !self.with_hints {
            return None;
        }
        let start = whitespace_before(line);
        if pos < line.len() || pos < start {
            return None;
        }
        let prefix = &line[start..pos];
        if prefix.is_empty() || prefix.contains(char::is_whitespace) {
            None
        } else {
            let candidates = completion_candidates(&self.trie, prefix);
            if candidates.len() == 1 {
                Some(candidates[0][prefix.len()..].into())
            } else {
                None
            }
        }
    }
}

impl Completer for Completion {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Self::Candidate>)> {
        if !self.with_completion {
            return Ok((0, Vec::with_capacity(0)));
        }
        Ok(self.complete_command(line, pos).unwrap_or((0, Vec::with_capacity(0))))
    }
}

impl Completion {
    // only the command name is completed, arguments are plain numbers
    fn complete_command(&self, line: &str, pos: usize) -> Option<(usize, Vec<Pair>)> {
        let start = whitespace_before(line);
        let head = line.get(start..pos)?;
        if head.contains(char::is_whitespace) {
            return None;
        }
        let candidates = completion_candidates(&self.trie, head)
            .into_iter()
            .map(|c| Pair {
                display: c.clone(),
                replacement: c,
            })
            .collect();
        Some((start, candidates))
    }
}

/// All command names starting with `prefix`, none for an empty prefix.
pub(crate) fn completion_candidates(trie: &Trie<u8>, prefix: &str) -> Vec<String> {
    if prefix.is_empty() {
        Vec::with_capacity(0)
    } else {
        trie.predictive_search(prefix)
            .into_iter()
            .filter_map(|bytes| String::from_utf8(bytes).ok())
            .collect()
    }
}

// byte offset of the first non-whitespace character
fn whitespace_before(line: &str) -> usize {
    line.len() - line.trim_start().len()
}
