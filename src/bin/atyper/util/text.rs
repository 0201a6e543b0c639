/// Greedy word wrap. Words longer than `width` (such as file paths) are split
/// across lines instead of overflowing the table border.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word;
        while word.chars().count() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let cut = byte_index(word, width);
            lines.push(word[..cut].to_string());
            word = &word[cut..];
        }

        let current_len = current.chars().count();
        if current.is_empty() {
            current = word.to_string();
        } else if current_len + 1 + word.chars().count() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Shortens `s` to at most `max_len` characters, marking the cut with `…`.
pub fn truncate(s: &str, max_len: usize) -> String {
    match max_len {
        0 => String::new(),
        _ if s.chars().count() <= max_len => s.to_string(),
        1 => "…".to_string(),
        _ => format!("{}…", &s[..byte_index(s, max_len - 1)]),
    }
}

fn byte_index(s: &str, chars: usize) -> usize {
    s.char_indices().nth(chars).map_or(s.len(), |(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_joins_words_up_to_width() {
        assert_eq!(wrap("rule 145 has no neighbor count", 16), vec![
            "rule 145 has no",
            "neighbor count"
        ]);
    }

    #[test]
    fn wrap_splits_overlong_words() {
        assert_eq!(wrap("see graphs/not_DAG-element_C.dot", 12), vec![
            "see",
            "graphs/not_D",
            "AG-element_C",
            ".dot"
        ]);
    }

    #[test]
    fn wrap_empty_text_is_one_blank_line() {
        assert_eq!(wrap("", 10), vec![String::new()]);
    }

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate("OPLS-AA", 7), "OPLS-AA");
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("benzene_ring", 8), "benzene…");
        assert_eq!(truncate("C", 0), "");
        assert_eq!(truncate("CH", 1), "…");
    }

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate("αβγδεζ", 4), "αβγ…");
    }
}
