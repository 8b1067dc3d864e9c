/// Extracts a JSON object or array from text that may wrap it in markdown code fences or
/// surround it with preamble/trailing prose, as chat-completion models frequently do.
///
/// Strategy: prefer the contents of a ```json fenced block if present, otherwise fall back
/// to the first balanced `{...}` or `[...]` span in the text.
pub fn extract_json_from_text(text: &str) -> Option<String> {
    if let Some(fenced) = extract_fenced(text) {
        return Some(fenced);
    }
    extract_balanced(text)
}

fn extract_fenced(text: &str) -> Option<String> {
    let start_marker_positions = ["```json", "```JSON", "```"];
    for marker in start_marker_positions {
        if let Some(start) = text.find(marker) {
            let after = &text[start + marker.len()..];
            if let Some(end) = after.find("```") {
                let candidate = after[..end].trim();
                if !candidate.is_empty() {
                    return Some(candidate.to_string());
                }
            }
        }
    }
    None
}

fn extract_balanced(text: &str) -> Option<String> {
    let bytes = text.as_bytes();
    for (start_idx, &b) in bytes.iter().enumerate() {
        let (open, close) = match b {
            b'{' => (b'{', b'}'),
            b'[' => (b'[', b']'),
            _ => continue,
        };
        let mut depth = 0i32;
        let mut in_string = false;
        let mut escape = false;
        for (offset, &c) in bytes[start_idx..].iter().enumerate() {
            if in_string {
                if escape {
                    escape = false;
                } else if c == b'\\' {
                    escape = true;
                } else if c == b'"' {
                    in_string = false;
                }
                continue;
            }
            match c {
                b'"' => in_string = true,
                c if c == open => depth += 1,
                c if c == close => {
                    depth -= 1;
                    if depth == 0 {
                        let end_idx = start_idx + offset + 1;
                        return Some(text[start_idx..end_idx].to_string());
                    }
                }
                _ => {}
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_from_fenced_block() {
        let text = "Sure, here you go:\n```json\n{\"a\": 1}\n```\nLet me know if you need more.";
        assert_eq!(extract_json_from_text(text), Some("{\"a\": 1}".to_string()));
    }

    #[test]
    fn extracts_balanced_object_without_fence() {
        let text = "The result is {\"headline\": \"x\", \"bullets\": [\"a\", \"b\"]} as requested.";
        assert_eq!(
            extract_json_from_text(text),
            Some("{\"headline\": \"x\", \"bullets\": [\"a\", \"b\"]}".to_string())
        );
    }

    #[test]
    fn returns_none_when_no_json_present() {
        assert_eq!(extract_json_from_text("no json here"), None);
    }
}
