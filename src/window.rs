// Fixed-size partitioning of a unit sequence (words, sentences, paragraphs) into windows.

use serde::{Deserialize, Serialize};

/// What to do with a trailing window shorter than the configured size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TailPolicy {
    /// Emit the short window labelled with its true token count
    #[default]
    Keep,
    /// Discard it; its units are excluded from every denominator
    Drop,
}

/// A contiguous slice of the source sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub window_index: usize,
    pub start_offset: usize,
    pub token_count: usize,
}

impl Window {
    /// Offset one past the last unit of this window
    pub fn end_offset(&self) -> usize {
        self.start_offset + self.token_count
    }

    /// Borrow the units this window covers
    pub fn slice<'a, T>(&self, units: &'a [T]) -> &'a [T] {
        &units[self.start_offset..self.end_offset()]
    }
}

/// Window layout parameters. Cheap to copy; produces a fresh iterator per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Windower {
    size: usize,
    tail: TailPolicy,
}

impl Windower {
    pub fn new(size: usize, tail: TailPolicy) -> Self {
        Self { size, tail }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn tail(&self) -> TailPolicy {
        self.tail
    }

    /// Lay windows over `unit_count` units. A zero size or empty input yields nothing.
    pub fn windows(&self, unit_count: usize) -> Windows {
        Windows {
            size: self.size,
            tail: self.tail,
            total: unit_count,
            next_offset: 0,
            next_index: 0,
        }
    }

    /// Windows paired with the units they cover
    pub fn split<'a, T>(&self, units: &'a [T]) -> impl Iterator<Item = (Window, &'a [T])> + 'a {
        self.windows(units.len()).map(move |w| (w, w.slice(units)))
    }

    /// Number of units the layout covers (all of them, or all but the dropped tail)
    pub fn covered(&self, unit_count: usize) -> usize {
        self.windows(unit_count).map(|w| w.token_count).sum()
    }
}

/// Iterator over the windows of a sequence. `Clone` restarts from the current position.
#[derive(Debug, Clone)]
pub struct Windows {
    size: usize,
    tail: TailPolicy,
    total: usize,
    next_offset: usize,
    next_index: usize,
}

impl Iterator for Windows {
    type Item = Window;

    fn next(&mut self) -> Option<Window> {
        if self.size == 0 || self.next_offset >= self.total {
            return None;
        }

        let remaining = self.total - self.next_offset;
        let token_count = remaining.min(self.size);
        if token_count < self.size && self.tail == TailPolicy::Drop {
            self.next_offset = self.total;
            return None;
        }

        let window = Window {
            window_index: self.next_index,
            start_offset: self.next_offset,
            token_count,
        };
        self.next_offset += token_count;
        self.next_index += 1;
        Some(window)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.size == 0 || self.next_offset >= self.total {
            return (0, Some(0));
        }
        let remaining = self.total - self.next_offset;
        let n = match self.tail {
            TailPolicy::Keep => remaining.div_ceil(self.size),
            TailPolicy::Drop => remaining / self.size,
        };
        (n, Some(n))
    }
}

impl ExactSizeIterator for Windows {}

/// Whitespace-delimited units of a text, line breaks treated as spaces
pub fn whitespace_units(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}
