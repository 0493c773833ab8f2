//! Splitting SQL input into individual statements.

use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::tokenizer::{Token, Tokenizer};
use tracing::debug;

/// Split `sql` on top-level semicolons.
///
/// Semicolons inside string literals, quoted identifiers, dollar-quoted
/// bodies and comments do not split. Statements with nothing but whitespace
/// or comments are dropped. Input the tokenizer cannot read is returned as a
/// single statement so the server reports the error.
pub(crate) fn split_statements(sql: &str) -> Vec<String> {
    let dialect = PostgreSqlDialect {};
    let tokens = match Tokenizer::new(&dialect, sql).with_unescape(false).tokenize() {
        Ok(tokens) => tokens,
        Err(e) => {
            debug!(error = %e, "tokenizer rejected input, sending it whole");
            let trimmed = sql.trim();
            return if trimmed.is_empty() {
                Vec::new()
            } else {
                vec![trimmed.to_string()]
            };
        }
    };

    tokens
        .split(|token| matches!(token, Token::SemiColon))
        .filter(|chunk| chunk.iter().any(|t| !matches!(t, Token::Whitespace(_))))
        .map(|chunk| {
            chunk
                .iter()
                .map(ToString::to_string)
                .collect::<String>()
                .trim()
                .to_string()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_on_top_level_semicolons() {
        assert_eq!(
            split_statements("CREATE TABLE a (id INT); SELECT * FROM b;"),
            vec!["CREATE TABLE a (id INT)", "SELECT * FROM b"]
        );
        assert_eq!(split_statements("SELECT 1"), vec!["SELECT 1"]);
    }

    #[test]
    fn test_quoted_semicolons_do_not_split() {
        assert_eq!(
            split_statements("SELECT ';' AS semi, 'it''s' AS quote;"),
            vec!["SELECT ';' AS semi, 'it''s' AS quote"]
        );
        assert_eq!(
            split_statements(r#"SELECT 1 AS "a;b";"#),
            vec![r#"SELECT 1 AS "a;b""#]
        );
    }

    #[test]
    fn test_dollar_quoted_body_stays_whole() {
        let sql = "DO $$ BEGIN PERFORM 1; PERFORM 2; END $$; SELECT 3;";
        let statements = split_statements(sql);

        assert_eq!(statements.len(), 2);
        assert!(statements[0].contains("PERFORM 1; PERFORM 2;"));
        assert_eq!(statements[1], "SELECT 3");
    }

    #[test]
    fn test_blank_and_comment_only_statements_are_dropped() {
        assert!(split_statements("  ;\n ; ").is_empty());
        assert!(split_statements("-- nothing here\n").is_empty());
        assert_eq!(
            split_statements("SELECT 1; -- trailing note\n"),
            vec!["SELECT 1"]
        );
    }
}
