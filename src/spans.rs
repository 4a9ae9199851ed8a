use crate::normalizer::Corpus;
use std::ops::Range;

/// Half-open `[start, end)` character range inside a [`Corpus`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub(crate) struct Span {
    pub(crate) start: usize,
    pub(crate) end: usize,
}

impl Span {
    pub(crate) fn text<'c>(&self, corpus: &'c Corpus) -> &'c [char] {
        &corpus.chars()[self.start..self.end]
    }

    /// `None` at the corpus start.
    pub(crate) fn left(&self, corpus: &Corpus) -> Option<char> {
        self.start
            .checked_sub(1)
            .map(|ix| corpus.chars()[ix])
    }

    /// `None` at the corpus end.
    pub(crate) fn right(&self, corpus: &Corpus) -> Option<char> {
        corpus.chars().get(self.end).copied()
    }
}

/// Every span of length `1..=max_word_len` whose start lies in `starts`.
/// Spans stop at the first boundary marker; the end may still run past
/// `starts.end`.
pub(crate) fn spans_starting_in(
    corpus: &Corpus,
    max_word_len: usize,
    starts: Range<usize>,
) -> impl Iterator<Item = Span> + '_ {
    let len = corpus.len();
    starts
        .filter(move |&start| !corpus.is_boundary(start))
        .flat_map(move |start| {
            let limit = start.saturating_add(max_word_len).min(len);
            let stop = (start..limit)
                .find(|&ix| corpus.is_boundary(ix))
                .unwrap_or(limit);
            (start + 1..=stop).map(move |end| Span { start, end })
        })
}

pub(crate) fn spans(corpus: &Corpus, max_word_len: usize) -> impl Iterator<Item = Span> + '_ {
    spans_starting_in(corpus, max_word_len, 0..corpus.len())
}
