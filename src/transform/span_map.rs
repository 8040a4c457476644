use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    fn len(self) -> usize {
        self.end - self.start
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Mapping {
    original: Span,
    current: Span,
}

/// Translates positions in a partially rewritten line back to the line it started as.
///
/// Each mapping records one rewritten region; mappings are sorted by `current.start` and never
/// overlap. Text between mappings is unchanged, so its offset is fixed by the last mapping that
/// ends before it.
#[derive(Debug, Clone, Default)]
pub(super) struct SpanMap {
    original_len: usize,
    mappings: Vec<Mapping>,
}

impl SpanMap {
    pub(super) fn new(original_len: usize) -> Self {
        Self {
            original_len,
            mappings: Vec::new(),
        }
    }

    pub(super) fn to_original(&self, current: Span) -> Span {
        let start = self.map_start(current.start).min(self.original_len);
        let end = self.map_end(current.end).clamp(start, self.original_len);
        Span { start, end }
    }

    /// Records replacements applied to the current line. `replacements` must be sorted by
    /// start and non-overlapping, with spans in pre-replacement coordinates.
    pub(super) fn record(&mut self, replacements: &[(Span, usize)]) {
        let originals = replacements
            .iter()
            .map(|(span, _)| self.to_original(*span))
            .collect::<Vec<_>>();

        let mut next = Vec::with_capacity(self.mappings.len() + replacements.len());
        let mut shift: isize = 0;
        let mut previous = std::mem::take(&mut self.mappings).into_iter().peekable();

        for ((span, new_len), original) in replacements.iter().zip(originals) {
            while let Some(mapping) = previous.next_if(|mapping| mapping.current.end <= span.start) {
                next.push(shifted(mapping, shift));
            }
            // mappings overlapping this replacement are absorbed into it
            while previous
                .next_if(|mapping| mapping.current.start < span.end)
                .is_some()
            {}

            let start = offset(span.start, shift);
            next.push(Mapping {
                original,
                current: Span {
                    start,
                    end: start + new_len,
                },
            });
            shift += *new_len as isize - span.len() as isize;
        }

        next.extend(previous.map(|mapping| shifted(mapping, shift)));
        self.mappings = next;
    }

    fn map_start(&self, position: usize) -> usize {
        let mut delta: isize = 0;
        for mapping in &self.mappings {
            if position < mapping.current.start {
                break;
            }
            if position < mapping.current.end {
                return mapping.original.start;
            }
            delta = mapping.original.end as isize - mapping.current.end as isize;
        }
        offset(position, delta)
    }

    fn map_end(&self, position: usize) -> usize {
        let mut delta: isize = 0;
        for mapping in &self.mappings {
            if position <= mapping.current.start {
                break;
            }
            if position <= mapping.current.end {
                return mapping.original.end;
            }
            delta = mapping.original.end as isize - mapping.current.end as isize;
        }
        offset(position, delta)
    }
}

fn offset(position: usize, delta: isize) -> usize {
    position.saturating_add_signed(delta)
}

fn shifted(mapping: Mapping, shift: isize) -> Mapping {
    Mapping {
        original: mapping.original,
        current: Span {
            start: offset(mapping.current.start, shift),
            end: offset(mapping.current.end, shift),
        },
    }
}
