//! Overflow policy for questions with more than four options.
//!
//! The record schema is fixed at `option_a..option_d`, but some listing
//! pages carry five or six options. The fold keeps the first three options
//! addressable, sets `option_d` to the literal marker `"Other"`, and
//! serializes every option from the fourth onward into a markdown
//! `Additional options:` block appended to the explanation, lettered
//! sequentially from `D`. When the signaled correct option falls inside the
//! overflow range, the designation is forced to `option_d` and the block is
//! preceded by a `**Correct Answer:**` line so the true answer text is
//! never lost.

use crate::models::AnswerOption;

/// Separator between an existing explanation and the additional-options
/// block.
const EXPLANATION_SEPARATOR: &str = "\n\n---\n";

/// The result of folding a raw option list into the fixed A-D schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FoldedOptions {
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_answer: AnswerOption,
    pub explanation: Option<String>,
}

/// Fold a raw ordered option list into `option_a..option_d`.
///
/// `correct_idx` is the zero-based index of the signaled correct option in
/// `options`. Callers guarantee `options.len() >= 4` and
/// `correct_idx < options.len()`.
///
/// With exactly four options this is a verbatim mapping; with more, the
/// overflow block described in the module docs lands in `explanation`
/// (after the existing explanation and a `---` separator, if one exists).
pub fn fold_options(
    options: &[String],
    correct_idx: usize,
    explanation: Option<String>,
) -> FoldedOptions {
    debug_assert!(options.len() >= 4);
    debug_assert!(correct_idx < options.len());

    if options.len() <= 4 {
        let correct_answer = AnswerOption::from_index(correct_idx.min(3))
            .unwrap_or(AnswerOption::OptionD);
        return FoldedOptions {
            option_a: options[0].clone(),
            option_b: options[1].clone(),
            option_c: options[2].clone(),
            option_d: options[3].clone(),
            correct_answer,
            explanation,
        };
    }

    let mut extra_lines: Vec<String> = Vec::new();
    if correct_idx >= 3 {
        extra_lines.push(format!("**Correct Answer:** {}", options[correct_idx]));
    }
    extra_lines.push("Additional options:".to_string());
    for (i, opt) in options.iter().enumerate().skip(3) {
        let label = (b'A' + i as u8) as char;
        extra_lines.push(format!("{label}. {opt}"));
    }
    let extra_block = extra_lines.join("\n");

    let explanation = match explanation {
        Some(existing) => format!("{existing}{EXPLANATION_SEPARATOR}{extra_block}"),
        None => extra_block,
    };

    // A correct option within A-C keeps its letter; anything in the
    // overflow range maps to D ("Other").
    let correct_answer = match correct_idx {
        0 => AnswerOption::OptionA,
        1 => AnswerOption::OptionB,
        2 => AnswerOption::OptionC,
        _ => AnswerOption::OptionD,
    };

    FoldedOptions {
        option_a: options[0].clone(),
        option_b: options[1].clone(),
        option_c: options[2].clone(),
        option_d: "Other".to_string(),
        correct_answer,
        explanation: Some(explanation),
    }
}
