use crate::engine::types::QuestionType;

const TRUE_TOKENS: [&str; 6] = ["true", "yes", "1", "t", "y", "correct"];
const FALSE_TOKENS: [&str; 6] = ["false", "no", "0", "f", "n", "incorrect"];

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

fn parse_bool_token(s: &str) -> Option<bool> {
    let token = normalize(s);
    if TRUE_TOKENS.contains(&token.as_str()) {
        Some(true)
    } else if FALSE_TOKENS.contains(&token.as_str()) {
        Some(false)
    } else {
        None
    }
}

/// Correctness verdict for one answer. Missing or unscoreable input is wrong.
///
/// Open-ended answers are correct when the expected answer appears inside the
/// submitted text, so a longer explanation that contains the key phrase passes
/// while a fragment of the expected answer does not.
pub fn score(
    question_type: Option<QuestionType>,
    expected: Option<&str>,
    submitted: Option<&str>,
) -> bool {
    let (Some(question_type), Some(expected), Some(submitted)) =
        (question_type, expected, submitted)
    else {
        return false;
    };

    let expected_norm = normalize(expected);
    if expected_norm.is_empty() {
        return false;
    }

    match question_type {
        QuestionType::Mcq | QuestionType::ShortAnswer => expected_norm == normalize(submitted),
        QuestionType::TrueFalse => match (parse_bool_token(expected), parse_bool_token(submitted)) {
            (Some(e), Some(s)) => e == s,
            _ => false,
        },
        QuestionType::OpenEnded => normalize(submitted).contains(&expected_norm),
    }
}
