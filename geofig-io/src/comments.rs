/// 移除 JSON 字符串之外的 `//` 行注释，换行符保留以维持报错行号。
pub fn strip_comments(source: &str) -> String {
    let mut output = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(ch) = chars.next() {
        if in_string {
            output.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => {
                in_string = true;
                output.push(ch);
            }
            '/' if chars.peek() == Some(&'/') => {
                while let Some(&next) = chars.peek() {
                    if next == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            _ => output.push(ch),
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_full_line_and_trailing_comments() {
        let source = "// header\n{\n  \"a\": 1, // trailing\n  \"b\": 2\n}\n";
        assert_eq!(strip_comments(source), "\n{\n  \"a\": 1, \n  \"b\": 2\n}\n");
    }

    #[test]
    fn keeps_slashes_inside_strings() {
        let source = r#"{"url": "http://example.com", "q": "say \"//hi\""}"#;
        assert_eq!(strip_comments(source), source);
    }

    #[test]
    fn single_slash_is_preserved() {
        assert_eq!(strip_comments("1 / 2"), "1 / 2");
    }
}
