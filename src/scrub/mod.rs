use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// A sentence ends at `.`, `!` or `?` followed by whitespace; the punctuation
/// stays with the preceding sentence.
static SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]\s+").unwrap());

/// Replace \r\n / \n / \r with spaces and collapse extra whitespace.
pub fn flatten_newlines(text: &str) -> String {
    let replaced = text
        .replace("\r\n", " ")
        .replace('\n', " ")
        .replace('\r', " ");
    WHITESPACE_RUN.replace_all(&replaced, " ").trim().to_string()
}

fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for boundary in SENTENCE_END.find_iter(text) {
        // keep the terminal punctuation (one ASCII byte) with the sentence
        let end = boundary.start() + 1;
        sentences.push(&text[start..end]);
        start = boundary.end();
    }
    if start < text.len() {
        sentences.push(&text[start..]);
    }
    sentences
}

/// Compiled term matcher, built once at startup and read-only for the run.
pub struct ScrubConfig {
    matcher: Regex,
}

impl ScrubConfig {
    /// Compile a case-insensitive whole-word alternation over `terms`.
    ///
    /// Whole word means no letter, digit, underscore or hyphen on either side,
    /// so `light` must not match inside `daylight`, `light-colored` or
    /// `Highlighted`. The regex engine has no lookaround, so the boundaries
    /// are spelled out as non-word-character alternatives.
    pub fn new(terms: &[String]) -> Result<Self> {
        let mut escaped = Vec::with_capacity(terms.len());
        for term in terms {
            let term = term.trim();
            if term.is_empty() {
                bail!("target terms must be non-empty");
            }
            escaped.push(regex::escape(term));
        }
        if escaped.is_empty() {
            bail!("at least one target term is required");
        }

        let pattern = format!(
            r"(?i)(?:^|[^0-9A-Za-z_-])(?:{})(?:[^0-9A-Za-z_-]|$)",
            escaped.join("|")
        );
        let matcher = Regex::new(&pattern)
            .with_context(|| format!("compiling term pattern for {:?}", terms))?;

        Ok(Self { matcher })
    }

    /// Remove entire sentences containing a whole-word match of any term.
    ///
    /// Newlines are flattened first so line breaks cannot corrupt sentence
    /// boundaries; survivors are rejoined with single spaces. Empty or
    /// whitespace-only input passes through unchanged.
    pub fn scrub(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return text.to_string();
        }

        let flat = flatten_newlines(text);
        let kept: Vec<&str> = split_sentences(&flat)
            .into_iter()
            .filter(|sentence| !self.matcher.is_match(sentence))
            .collect();

        let joined = kept.join(" ");
        WHITESPACE_RUN
            .replace_all(joined.trim(), " ")
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(terms: &[&str]) -> ScrubConfig {
        let terms: Vec<String> = terms.iter().map(|t| t.to_string()).collect();
        ScrubConfig::new(&terms).unwrap()
    }

    #[test]
    fn flatten_replaces_all_line_break_conventions() {
        assert_eq!(flatten_newlines("Line one\nLine two"), "Line one Line two");
        assert_eq!(flatten_newlines("a\r\nb\rc"), "a b c");
        assert_eq!(flatten_newlines("  spaced \n\n  out  "), "spaced out");
    }

    #[test]
    fn flatten_is_idempotent() {
        let once = flatten_newlines("first\nsecond\r\n  third");
        assert_eq!(flatten_newlines(&once), once);
    }

    #[test]
    fn scrub_removes_matching_sentence() {
        let cfg = config(&["lighting"]);
        assert_eq!(
            cfg.scrub("The room has soft lighting. The walls are blue."),
            "The walls are blue."
        );
    }

    #[test]
    fn scrub_keeps_embedded_occurrences() {
        let cfg = config(&["light"]);
        let text = "Highlighted shadows make the photo pop.";
        assert_eq!(cfg.scrub(text), text);

        let cfg = config(&["lighting"]);
        let text = "A back-lighting rig and daylight film were used.";
        assert_eq!(cfg.scrub(text), text);
    }

    #[test]
    fn scrub_matches_whole_words_case_insensitively() {
        let cfg = config(&["light"]);
        assert_eq!(cfg.scrub("Light falls on the table. A cat sleeps."), "A cat sleeps.");
        assert_eq!(cfg.scrub("There is light."), "");
    }

    #[test]
    fn scrub_with_every_sentence_matching_yields_empty() {
        let cfg = config(&["lighting", "illumination"]);
        assert_eq!(
            cfg.scrub("Warm lighting everywhere. The illumination is harsh!"),
            ""
        );
    }

    #[test]
    fn text_without_terminal_punctuation_is_one_sentence() {
        let cfg = config(&["light"]);
        assert_eq!(cfg.scrub("a soft light over the bed"), "");
        assert_eq!(cfg.scrub("a soft glow over the bed"), "a soft glow over the bed");
    }

    #[test]
    fn scrub_flattens_newlines_before_splitting() {
        let cfg = config(&["lighting"]);
        assert_eq!(
            cfg.scrub("Soft\nlighting here. Blue\nwalls."),
            "Blue walls."
        );
    }

    #[test]
    fn whitespace_only_input_passes_through() {
        let cfg = config(&["light"]);
        assert_eq!(cfg.scrub("   "), "   ");
        assert_eq!(cfg.scrub(""), "");
    }

    #[test]
    fn exclamation_and_question_marks_end_sentences() {
        let cfg = config(&["light"]);
        assert_eq!(
            cfg.scrub("What a light! Lovely walls? Yes."),
            "Lovely walls? Yes."
        );
    }

    #[test]
    fn terms_are_escaped_and_validated() {
        let cfg = config(&["c++"]);
        assert_eq!(cfg.scrub("I write c++. I also sleep."), "I also sleep.");

        assert!(ScrubConfig::new(&[]).is_err());
        assert!(ScrubConfig::new(&[" ".to_string()]).is_err());
    }
}
