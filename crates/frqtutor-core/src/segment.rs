//! Sentence segmentation for student responses.

/// Split text into sentences.
///
/// A sentence ends at `.`, `!`, or `?` followed by whitespace or end of
/// text, so decimals like "3.5" and quoted terminators mid-word stay intact.
/// Whatever trails the last terminator is kept as a final sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.trim().chars().peekable();

    while let Some(ch) = chars.next() {
        current.push(ch);

        let is_sentence_end = matches!(ch, '.' | '!' | '?')
            && chars.peek().map_or(true, |next| next.is_whitespace());

        if is_sentence_end {
            let sentence = current.trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            current.clear();
        }
    }

    let rest = current.trim();
    if !rest.is_empty() {
        sentences.push(rest.to_string());
    }

    sentences
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_terminators() {
        let sentences = split_sentences("The asteroid struck. Dust filled the sky! What next?");
        assert_eq!(
            sentences,
            vec![
                "The asteroid struck.",
                "Dust filled the sky!",
                "What next?"
            ]
        );
    }

    #[test]
    fn keeps_decimals_intact() {
        let sentences = split_sentences("The impact released 3.5 joules. It was large.");
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0], "The impact released 3.5 joules.");
    }

    #[test]
    fn unterminated_tail_is_a_sentence() {
        let sentences = split_sentences("First one. And a trailing fragment");
        assert_eq!(sentences, vec!["First one.", "And a trailing fragment"]);
    }

    #[test]
    fn empty_and_whitespace_input() {
        assert!(split_sentences("").is_empty());
        assert!(split_sentences("   \n  ").is_empty());
    }

    #[test]
    fn collapses_surrounding_whitespace() {
        let sentences = split_sentences("  A.   B.  ");
        assert_eq!(sentences, vec!["A.", "B."]);
    }
}
