use crate::config::import_config::ImportConfig;
use crate::domain::model::ParsedRow;
use thiserror::Error;

const QUOTE: char = '"';

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unterminated quoted field starting at column {column}")]
    UnterminatedQuote { column: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Unquoted,
    Quoted,
}

/// 逐字元的分隔文字解析器
///
/// 欄位內容以「連續片段」從原始行切片複製，而不是逐字元推入，
/// 只有在遇到引號或分隔符時才會把目前片段寫進累加器。
#[derive(Debug, Clone)]
pub struct RecordParser {
    delimiter: char,
    trim_whitespace: bool,
    strict_quotes: bool,
}

impl RecordParser {
    pub fn new(delimiter: char, trim_whitespace: bool) -> Self {
        Self {
            delimiter,
            trim_whitespace,
            strict_quotes: false,
        }
    }

    pub fn from_config(config: &ImportConfig) -> Self {
        Self {
            delimiter: config.delimiter,
            trim_whitespace: config.trim_whitespace,
            strict_quotes: config.strict_quotes,
        }
    }

    pub fn strict_quotes(mut self, strict: bool) -> Self {
        self.strict_quotes = strict;
        self
    }

    pub fn parse_line(&self, line: &str, line_number: usize) -> Result<ParsedRow, ParseError> {
        Ok(ParsedRow {
            line: line_number,
            fields: self.split(line)?,
        })
    }

    pub fn split(&self, line: &str) -> Result<Vec<String>, ParseError> {
        let mut fields = Vec::new();
        let mut field = String::new();
        let mut state = State::Unquoted;
        let mut run_start = 0;
        let mut quote_opened_at = 0;
        let mut chars = line.char_indices().peekable();

        while let Some((idx, ch)) = chars.next() {
            if ch == QUOTE {
                field.push_str(&line[run_start..idx]);
                run_start = idx + QUOTE.len_utf8();

                let escaped = state == State::Quoted
                    && matches!(chars.peek(), Some(&(_, next)) if next == QUOTE);
                if escaped {
                    field.push(QUOTE);
                    chars.next();
                    run_start += QUOTE.len_utf8();
                } else if state == State::Quoted {
                    state = State::Unquoted;
                } else {
                    state = State::Quoted;
                    quote_opened_at = idx;
                }
            } else if ch == self.delimiter && state == State::Unquoted {
                field.push_str(&line[run_start..idx]);
                run_start = idx + ch.len_utf8();
                fields.push(self.close_field(&mut field));
            }
        }

        if state == State::Quoted && self.strict_quotes {
            return Err(ParseError::UnterminatedQuote {
                column: line[..quote_opened_at].chars().count() + 1,
            });
        }

        // 最後一個欄位無條件推入，所以 N 個分隔符一定得到 N+1 個欄位
        field.push_str(&line[run_start..]);
        fields.push(self.close_field(&mut field));
        Ok(fields)
    }

    fn close_field(&self, field: &mut String) -> String {
        let value = std::mem::take(field);
        if self.trim_whitespace {
            let trimmed = value.trim();
            if trimmed.len() != value.len() {
                return trimmed.to_string();
            }
        }
        value
    }
}

impl Default for RecordParser {
    fn default() -> Self {
        Self::from_config(&ImportConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(line: &str) -> Vec<String> {
        RecordParser::default().split(line).unwrap()
    }

    #[test]
    fn test_delimiter_inside_quotes_does_not_split() {
        assert_eq!(split(r#"a,"b,c",d"#), vec!["a", "b,c", "d"]);
    }

    #[test]
    fn test_escaped_quotes() {
        assert_eq!(split(r#""he said ""hi""""#), vec![r#"he said "hi""#]);
    }

    #[test]
    fn test_trailing_empty_field() {
        assert_eq!(split("a,b,"), vec!["a", "b", ""]);
        assert_eq!(split(",,"), vec!["", "", ""]);
        assert_eq!(split(""), vec![""]);
    }

    #[test]
    fn test_trim_whitespace_is_configurable() {
        assert_eq!(split("  a , b  "), vec!["a", "b"]);

        let raw = RecordParser::new(',', false);
        assert_eq!(raw.split("  a , b  ").unwrap(), vec!["  a ", " b  "]);
    }

    #[test]
    fn test_custom_delimiters() {
        let tabs = RecordParser::new('\t', true);
        assert_eq!(tabs.split("SKU-1\tM-1\t").unwrap(), vec!["SKU-1", "M-1", ""]);

        let semicolons = RecordParser::new(';', true);
        assert_eq!(
            semicolons.split("a;\"x;y\";c,d").unwrap(),
            vec!["a", "x;y", "c,d"]
        );
    }

    #[test]
    fn test_quotes_in_the_middle_of_a_field_toggle_state() {
        assert_eq!(split(r#"ab"c,d"e,f"#), vec!["abc,de", "f"]);
    }

    #[test]
    fn test_multibyte_content_is_preserved() {
        assert_eq!(split("蘋果,\"紅,綠\",é"), vec!["蘋果", "紅,綠", "é"]);
    }

    #[test]
    fn test_unterminated_quote_is_lenient_by_default() {
        assert_eq!(split(r#"a,"b,c"#), vec!["a", "b,c"]);
    }

    #[test]
    fn test_unterminated_quote_rejected_when_strict() {
        let parser = RecordParser::default().strict_quotes(true);
        assert_eq!(
            parser.split(r#"a,"b,c"#),
            Err(ParseError::UnterminatedQuote { column: 3 })
        );
        assert!(parser.split(r#"a,"b,c""#).is_ok());
    }

    #[test]
    fn test_parse_line_keeps_line_number() {
        let row = RecordParser::default().parse_line("x,y", 7).unwrap();
        assert_eq!(row.line, 7);
        assert_eq!(row.fields, vec!["x", "y"]);
    }
}
