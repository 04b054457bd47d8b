// Whitespace normalization for sentences and raw extracted text.

/// Collapse every whitespace run (including CRLF) into one space and trim the ends
pub fn normalize_sentence(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    normalize_sentence_into(text, &mut result);
    result
}

/// Same as [`normalize_sentence`], reusing `buffer`
pub fn normalize_sentence_into(text: &str, buffer: &mut String) {
    buffer.clear();
    buffer.reserve(text.len());
    for word in text.split_whitespace() {
        if !buffer.is_empty() {
            buffer.push(' ');
        }
        buffer.push_str(word);
    }
}

/// Keep paragraph structure while cleaning extraction noise: carriage returns
/// become line breaks, runs of spaces and tabs become one space, and three or
/// more consecutive line breaks shrink to a single blank line.
pub fn tidy_paragraph_breaks(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_newlines = 0usize;
    let mut pending_space = false;

    for ch in text.replace("\r\n", "\n").chars() {
        match ch {
            '\r' | '\n' => {
                pending_newlines += 1;
                pending_space = false;
            }
            ' ' | '\t' => pending_space = true,
            _ => {
                if pending_newlines > 0 {
                    if !out.is_empty() {
                        out.push_str(if pending_newlines >= 2 { "\n\n" } else { "\n" });
                    }
                    pending_newlines = 0;
                } else if pending_space && !out.is_empty() {
                    out.push(' ');
                }
                pending_space = false;
                out.push(ch);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_sentence_collapses_breaks() {
        assert_eq!(
            normalize_sentence("Uma frase\ncom\r\nquebras  e\ttabs."),
            "Uma frase com quebras e tabs."
        );
        assert_eq!(normalize_sentence("   "), "");
    }

    #[test]
    fn test_buffer_is_reused() {
        let mut buffer = String::from("lixo");
        normalize_sentence_into(" Linha um.\nLinha dois. ", &mut buffer);
        assert_eq!(buffer, "Linha um. Linha dois.");
    }

    #[test]
    fn test_tidy_paragraph_breaks() {
        let raw = "  Primeiro   parágrafo.\r\nSegue aqui.\n\n\n\nSegundo\t\tparágrafo.  \n";
        assert_eq!(
            tidy_paragraph_breaks(raw),
            "Primeiro parágrafo.\nSegue aqui.\n\nSegundo parágrafo."
        );
    }

    #[test]
    fn test_indentation_after_line_break_is_dropped() {
        assert_eq!(tidy_paragraph_breaks("Um.\n   Dois.\n\n \tTrês."), "Um.\nDois.\n\nTrês.");
    }
}
