//! Prompt templates and response cleaning for SQL generation.

use once_cell::sync::Lazy;
use regex::Regex;

/// Code fences with an optional SQL language tag, plus trailing whitespace.
static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"`{3,}(?i:(?:postgresql|postgres|pgsql|psql|sql)\b)?\s*")
        .expect("code fence pattern is valid")
});

/// Build the prompt for a first SQL candidate.
pub fn initial_prompt(question: &str, schema_context: &str) -> String {
    format!(
        r#"You are a PostgreSQL expert. Convert the user's natural language question into a valid SQL query.

### LIVE DATABASE SCHEMA (RAG CONTEXT) ###
{schema_context}

### RULES ###
1. Return ONLY the raw SQL. No markdown.
2. Always end with a semicolon (;).
3. If creating tables, use `IF NOT EXISTS`.
4. If dropping tables, ALWAYS append `CASCADE`.
5. Use valid PostgreSQL syntax.

User Question: {question}
SQL:"#
    )
}

/// Build the prompt for repairing SQL the database rejected.
///
/// The failed SQL and the error text are embedded verbatim.
pub fn repair_prompt(
    question: &str,
    failed_sql: &str,
    error_message: &str,
    schema_context: &str,
) -> String {
    format!(
        r#"You are a PostgreSQL expert debugging a broken query.

### LIVE DATABASE SCHEMA ###
{schema_context}

### ORIGINAL REQUEST ###
User: "{question}"

### FAILED ATTEMPT ###
SQL: {failed_sql}

### DATABASE ERROR ###
Error: {error_message}

### INSTRUCTIONS ###
1. Analyze the error message (e.g., syntax error, missing column, constraint violation).
2. Rewrite the SQL to fix the error.
3. If the error is about dependencies (DROP), ensure CASCADE is used.
4. Return ONLY the corrected SQL. No explanations.

Corrected SQL:"#
    )
}

/// Strip markdown code fences and surrounding whitespace from model output.
///
/// Applying it twice gives the same result as applying it once.
pub fn clean_response(text: &str) -> String {
    CODE_FENCE.replace_all(text.trim(), "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTEXT: &str = "CREATE TABLE users (\n    id INTEGER PRIMARY KEY, username CHARACTER VARYING\n);";

    #[test]
    fn test_initial_prompt_embeds_context_and_rules() {
        let prompt = initial_prompt("show all users", CONTEXT);

        assert!(prompt.contains(CONTEXT));
        assert!(prompt.contains("IF NOT EXISTS"));
        assert!(prompt.contains("CASCADE"));
        assert!(prompt.contains("semicolon"));
        assert!(prompt.ends_with("User Question: show all users\nSQL:"));
    }

    #[test]
    fn test_repair_prompt_embeds_failure_verbatim() {
        let failed = "SELECT * FROM usrs;";
        let error = "relation \"usrs\" does not exist";
        let prompt = repair_prompt("show all users", failed, error, CONTEXT);

        assert!(prompt.contains(&format!("SQL: {}", failed)));
        assert!(prompt.contains(&format!("Error: {}", error)));
        assert!(prompt.contains("User: \"show all users\""));
        assert!(prompt.contains(CONTEXT));
        assert!(prompt.ends_with("Corrected SQL:"));
    }

    #[test]
    fn test_clean_plain_sql() {
        assert_eq!(clean_response("  SELECT 1;\n"), "SELECT 1;");
    }

    #[test]
    fn test_clean_tagged_fence() {
        assert_eq!(
            clean_response("```sql\nSELECT * FROM users;\n```"),
            "SELECT * FROM users;"
        );
        assert_eq!(
            clean_response("```SQL\nSELECT * FROM users;\n```\n"),
            "SELECT * FROM users;"
        );
        assert_eq!(
            clean_response("```postgresql\nSELECT 1;\n```"),
            "SELECT 1;"
        );
    }

    #[test]
    fn test_clean_bare_fence() {
        assert_eq!(clean_response("```\nSELECT 1;\n```"), "SELECT 1;");
    }

    #[test]
    fn test_clean_keeps_non_sql_tag_words() {
        assert_eq!(
            clean_response("```\nSELECT sqlite_version FROM t;\n```"),
            "SELECT sqlite_version FROM t;"
        );
    }

    #[test]
    fn test_clean_is_idempotent() {
        let once = clean_response("``` ```sql\n``SELECT 1;```` ");
        assert_eq!(clean_response(&once), once);
    }
}
