use std::ops::Range;
use tracing::trace;

use crate::constants::DEFAULT_MAX_PLACEHOLDER_TOKENS;
use crate::features::best_label_similarity;
use crate::query::{Slot, TemplatePart, template_parts};

/// Punctuation a placeholder span may not cross.
const CLAUSE_BREAKS: &[char] = &[',', ';', ':', '(', ')'];

/// Lowercased titles whose trailing period never ends a sentence.
const TITLE_ABBREVIATIONS: &[&str] = &[
    "capt", "col", "dr", "gen", "hon", "lt", "mr", "mrs", "ms", "mt", "prof", "rev", "sgt", "st",
];

/// Abbreviations that are also ordinary words or often close a sentence.
/// They only continue the sentence when the next word is lowercase or a number.
const AMBIGUOUS_ABBREVIATIONS: &[&str] = &[
    "approx", "ca", "co", "e.g", "etc", "i.e", "inc", "jr", "ltd", "no", "sr", "vs",
];

/// A normalized word with its byte range in the tokenized text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub span: Range<usize>,
    /// Clause punctuation follows this token.
    pub break_after: bool,
}

fn whitespace_chunks(text: &str) -> impl Iterator<Item = (usize, &str)> {
    let base = text.as_ptr() as usize;
    text.split_whitespace()
        .map(move |chunk| (chunk.as_ptr() as usize - base, chunk))
}

fn normalize_word(word: &str) -> String {
    word.to_lowercase().replace('\u{2019}', "'")
}

fn split_possessive(core: &str) -> Option<(&str, &str)> {
    for suffix in ["'s", "'S", "\u{2019}s", "\u{2019}S"] {
        if let Some(stem) = core.strip_suffix(suffix) {
            if !stem.is_empty() {
                return Some((stem, &core[stem.len()..]));
            }
        }
    }
    None
}

fn mark_break(tokens: &mut [Token]) {
    if let Some(last) = tokens.last_mut() {
        last.break_after = true;
    }
}

/// Splits on whitespace, strips edge punctuation and splits off possessive `'s`.
///
/// Lone punctuation and punctuation glued to a word's edge mark a clause
/// break on the preceding token when it is one of `, ; : ( )`.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::new();

    for (offset, chunk) in whitespace_chunks(text) {
        let Some(core_start) = chunk.find(char::is_alphanumeric) else {
            if chunk.contains(CLAUSE_BREAKS) {
                mark_break(&mut tokens);
            }
            continue;
        };
        let core_end = chunk
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_alphanumeric())
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(chunk.len());

        let leading = &chunk[..core_start];
        let core = &chunk[core_start..core_end];
        let trailing = &chunk[core_end..];

        if leading.contains(CLAUSE_BREAKS) {
            mark_break(&mut tokens);
        }

        let detached_possessive = core.eq_ignore_ascii_case("s")
            && (leading.ends_with('\'') || leading.ends_with('\u{2019}'));

        if detached_possessive {
            let apostrophe = leading.char_indices().last().map(|(i, _)| i).unwrap_or(0);
            tokens.push(Token {
                text: "'s".to_string(),
                span: offset + apostrophe..offset + core_end,
                break_after: false,
            });
        } else if let Some((stem, suffix)) = split_possessive(core) {
            let stem_start = offset + core_start;
            let suffix_start = stem_start + stem.len();
            tokens.push(Token {
                text: normalize_word(stem),
                span: stem_start..suffix_start,
                break_after: false,
            });
            tokens.push(Token {
                text: "'s".to_string(),
                span: suffix_start..suffix_start + suffix.len(),
                break_after: false,
            });
        } else {
            tokens.push(Token {
                text: normalize_word(core),
                span: offset + core_start..offset + core_end,
                break_after: false,
            });
        }

        if trailing.contains(CLAUSE_BREAKS) {
            mark_break(&mut tokens);
        }
    }

    tokens
}

fn is_abbreviation(before: &str, after: &str) -> bool {
    let Some(word) = before.split_whitespace().last() else {
        return false;
    };
    let word = word.trim_start_matches(|c: char| !c.is_alphanumeric());

    let mut chars = word.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return c.is_uppercase();
    }

    let word = word.to_lowercase();
    if TITLE_ABBREVIATIONS.contains(&word.as_str()) {
        return true;
    }
    AMBIGUOUS_ABBREVIATIONS.contains(&word.as_str())
        && after
            .trim_start()
            .chars()
            .next()
            .is_some_and(|c| c.is_lowercase() || c.is_ascii_digit())
}

fn push_trimmed(text: &str, range: Range<usize>, out: &mut Vec<Range<usize>>) {
    let slice = &text[range.clone()];
    let start = range.start + (slice.len() - slice.trim_start().len());
    let end = range.end - (slice.len() - slice.trim_end().len());
    if start < end {
        out.push(start..end);
    }
}

/// Byte ranges of the sentences in `text`, trimmed of surrounding whitespace.
///
/// A sentence ends at `.`, `!` or `?` (plus closing quotes or brackets)
/// followed by whitespace or the end of text, unless the period closes an
/// initial or a known abbreviation. A blank line always ends a sentence.
pub fn split_sentences(text: &str) -> Vec<Range<usize>> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let byte_at = |i: usize| chars.get(i).map_or(text.len(), |(pos, _)| *pos);

    let mut sentences = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < chars.len() {
        let (pos, c) = chars[i];

        let boundary = match c {
            '.' | '!' | '?' => {
                let mut j = i + 1;
                while j < chars.len()
                    && matches!(
                        chars[j].1,
                        '.' | '!' | '?' | '"' | '\'' | ')' | '\u{201D}' | '\u{2019}'
                    )
                {
                    j += 1;
                }
                let at_gap = j >= chars.len() || chars[j].1.is_whitespace();
                let abbreviated =
                    c == '.' && is_abbreviation(&text[start..pos], &text[byte_at(j)..]);
                (at_gap && !abbreviated).then(|| (byte_at(j), j))
            }
            '\n' => {
                let mut j = i + 1;
                while j < chars.len() && matches!(chars[j].1, ' ' | '\t' | '\r') {
                    j += 1;
                }
                (j < chars.len() && chars[j].1 == '\n').then(|| (pos, j))
            }
            _ => None,
        };

        match boundary {
            Some((end, next)) => {
                push_trimmed(text, start..end, &mut sentences);
                start = byte_at(next);
                i = next;
            }
            None => i += 1,
        }
    }

    push_trimmed(text, start..text.len(), &mut sentences);
    sentences
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(Vec<String>),
    Slot(Slot),
}

/// A pattern template prepared for matching against tokenized sentences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledTemplate {
    segments: Vec<Segment>,
}

impl CompiledTemplate {
    pub fn compile(template: &str) -> Self {
        let mut segments: Vec<Segment> = Vec::new();
        for part in template_parts(template) {
            match part {
                TemplatePart::Slot(slot) => segments.push(Segment::Slot(slot)),
                TemplatePart::Text(text) => {
                    let words: Vec<String> = tokenize(text).into_iter().map(|t| t.text).collect();
                    if words.is_empty() {
                        continue;
                    }
                    match segments.last_mut() {
                        Some(Segment::Literal(prev)) => prev.extend(words),
                        _ => segments.push(Segment::Literal(words)),
                    }
                }
            }
        }
        Self { segments }
    }

    /// No literal words: matched by label co-occurrence.
    pub fn is_co_occurrence(&self) -> bool {
        !self
            .segments
            .iter()
            .any(|s| matches!(s, Segment::Literal(_)))
    }

    /// Two placeholders with no literal between them cannot be delimited.
    fn has_adjacent_slots(&self) -> bool {
        self.segments
            .windows(2)
            .any(|w| matches!(w, [Segment::Slot(_), Segment::Slot(_)]))
    }
}

/// Fact labels used to pick placeholder spans and co-occurrence matches.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelHints<'a> {
    pub subject: &'a str,
    pub object: &'a str,
}

impl<'a> LabelHints<'a> {
    pub fn new(subject: &'a str, object: &'a str) -> Self {
        Self { subject, object }
    }
}

/// One instantiation of a template in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    /// Byte range of the sentence in the document text.
    pub sentence_span: Range<usize>,
    pub subject_surface: String,
    pub object_surface: String,
    /// Token ranges within the sentence.
    pub subject_tokens: Option<Range<usize>>,
    pub object_tokens: Option<Range<usize>>,
    pub sentence_tokens: usize,
}

type Assignment = (Option<Range<usize>>, Option<Range<usize>>);

/// Finds template instantiations in document text.
///
/// Literal words match case-insensitively; each placeholder absorbs between
/// one and `max_placeholder_tokens` tokens without crossing clause
/// punctuation.
#[derive(Debug, Clone, Copy)]
pub struct PatternMatcher {
    max_placeholder_tokens: usize,
}

impl Default for PatternMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PLACEHOLDER_TOKENS)
    }
}

impl PatternMatcher {
    pub fn new(max_placeholder_tokens: usize) -> Self {
        Self {
            max_placeholder_tokens: max_placeholder_tokens.max(1),
        }
    }

    pub fn max_placeholder_tokens(&self) -> usize {
        self.max_placeholder_tokens
    }

    pub fn find_matches(
        &self,
        text: &str,
        template: &str,
        hints: LabelHints<'_>,
    ) -> Vec<PatternMatch> {
        self.find_compiled(text, &CompiledTemplate::compile(template), hints)
    }

    pub fn find_compiled(
        &self,
        text: &str,
        template: &CompiledTemplate,
        hints: LabelHints<'_>,
    ) -> Vec<PatternMatch> {
        if template.has_adjacent_slots() && !template.is_co_occurrence() {
            trace!(?template, "Template has adjacent placeholders, skipping");
            return Vec::new();
        }

        let mut matches = Vec::new();
        for sentence_span in split_sentences(text) {
            let sentence = &text[sentence_span.clone()];
            let tokens = tokenize(sentence);
            if tokens.is_empty() {
                continue;
            }

            let assignments = if template.is_co_occurrence() {
                co_occurrence(&tokens, hints).into_iter().collect()
            } else {
                self.match_sentence(&template.segments, &tokens, hints)
            };

            for (subject, object) in assignments {
                matches.push(PatternMatch {
                    sentence_span: sentence_span.clone(),
                    subject_surface: surface(sentence, &tokens, subject.as_ref()),
                    object_surface: surface(sentence, &tokens, object.as_ref()),
                    subject_tokens: subject,
                    object_tokens: object,
                    sentence_tokens: tokens.len(),
                });
            }
        }
        matches
    }

    fn match_sentence(
        &self,
        segments: &[Segment],
        tokens: &[Token],
        hints: LabelHints<'_>,
    ) -> Vec<Assignment> {
        let Some((first, Segment::Literal(words))) = segments
            .iter()
            .enumerate()
            .find(|(_, s)| matches!(s, Segment::Literal(_)))
        else {
            return Vec::new();
        };

        let mut found: Vec<Assignment> = Vec::new();
        for anchor in 0..tokens.len() {
            if !literal_at(tokens, anchor, words) {
                continue;
            }
            if let Some(assignment) = self.match_at(segments, first, anchor, tokens, hints) {
                if !found.contains(&assignment) {
                    found.push(assignment);
                }
            }
        }
        found
    }

    fn match_at(
        &self,
        segments: &[Segment],
        first: usize,
        anchor: usize,
        tokens: &[Token],
        hints: LabelHints<'_>,
    ) -> Option<Assignment> {
        let mut assignment: Assignment = (None, None);
        let mut assign = |slot: Slot, span: Range<usize>| match slot {
            Slot::Subject => assignment.0 = Some(span),
            Slot::Object => assignment.1 = Some(span),
        };

        if let Some(Segment::Slot(slot)) = first.checked_sub(1).and_then(|i| segments.get(i)) {
            let candidates = (1..=self.max_placeholder_tokens)
                .take_while(|k| *k <= anchor)
                .map(|k| anchor - k..anchor);
            assign(*slot, best_span(tokens, candidates, hints)?);
        }

        let mut cursor = match &segments[first] {
            Segment::Literal(words) => anchor + words.len(),
            Segment::Slot(_) => return None,
        };

        let mut i = first + 1;
        while i < segments.len() {
            let Segment::Slot(slot) = &segments[i] else {
                return None;
            };
            match segments.get(i + 1) {
                Some(Segment::Literal(words)) => {
                    let span = self.gap_span(tokens, cursor, words)?;
                    cursor = span.end + words.len();
                    assign(*slot, span);
                    i += 2;
                }
                Some(Segment::Slot(_)) => return None,
                None => {
                    let candidates = (1..=self.max_placeholder_tokens)
                        .take_while(|k| cursor + k <= tokens.len())
                        .map(|k| cursor..cursor + k);
                    assign(*slot, best_span(tokens, candidates, hints)?);
                    i += 1;
                }
            }
        }

        Some(assignment)
    }

    /// Shortest placeholder span starting at `start` that is followed by `words`.
    fn gap_span(&self, tokens: &[Token], start: usize, words: &[String]) -> Option<Range<usize>> {
        for k in 1..=self.max_placeholder_tokens {
            let span = start..start + k;
            if span.end + words.len() > tokens.len() || crosses_break(tokens, &span) {
                return None;
            }
            if literal_at(tokens, span.end, words) {
                return Some(span);
            }
        }
        None
    }
}

fn literal_at(tokens: &[Token], at: usize, words: &[String]) -> bool {
    tokens
        .get(at..at + words.len())
        .is_some_and(|window| window.iter().zip(words).all(|(t, w)| t.text == *w))
}

fn crosses_break(tokens: &[Token], span: &Range<usize>) -> bool {
    span.end > span.start + 1 && tokens[span.start..span.end - 1].iter().any(|t| t.break_after)
}

fn surface(sentence: &str, tokens: &[Token], span: Option<&Range<usize>>) -> String {
    match span {
        Some(span) if span.start < span.end && span.end <= tokens.len() => {
            sentence[tokens[span.start].span.start..tokens[span.end - 1].span.end].to_string()
        }
        _ => String::new(),
    }
}

/// Candidate most similar to either label; ties keep the shorter span.
///
/// Candidates come shortest first and stop at the first clause break.
fn best_span(
    tokens: &[Token],
    candidates: impl Iterator<Item = Range<usize>>,
    hints: LabelHints<'_>,
) -> Option<Range<usize>> {
    let mut best: Option<(Range<usize>, f64)> = None;
    for span in candidates {
        if crosses_break(tokens, &span) {
            break;
        }
        let text = tokens[span.clone()]
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let score = best_label_similarity(&text, hints.subject, hints.object);
        if best.as_ref().is_none_or(|(_, s)| score > *s) {
            best = Some((span, score));
        }
    }
    best.map(|(span, _)| span)
}

fn find_words(
    tokens: &[Token],
    words: &[String],
    skip: Option<&Range<usize>>,
) -> Option<Range<usize>> {
    if words.is_empty() {
        return None;
    }
    (0..tokens.len())
        .filter(|at| literal_at(tokens, *at, words))
        .map(|at| at..at + words.len())
        .find(|span| skip.is_none_or(|s| span.end <= s.start || s.end <= span.start))
}

fn co_occurrence(tokens: &[Token], hints: LabelHints<'_>) -> Option<Assignment> {
    let label_words =
        |label: &str| -> Vec<String> { tokenize(label).into_iter().map(|t| t.text).collect() };

    let subject = find_words(tokens, &label_words(hints.subject), None)?;
    let object = find_words(tokens, &label_words(hints.object), Some(&subject))?;
    Some((Some(subject), Some(object)))
}
