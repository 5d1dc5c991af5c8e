//! Yes/no quality audits over generated text.
//!
//! The quality editor persona is primed with the text under review, then
//! asked each audit question in turn. Audits are fail-fast: the first
//! violated criterion is reported and later criteria are never asked.

use crate::persona::PersonaAgent;

/// One audit question plus the short label used in rewrite prompts and
/// warnings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditCriterion {
    pub label: String,
    pub question: String,
}

impl AuditCriterion {
    pub fn new(label: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            question: question.into(),
        }
    }
}

/// Audit criteria applied to a freshly generated question. These pass when
/// the editor answers YES.
pub fn frq_quality_criteria() -> Vec<AuditCriterion> {
    [
        "Can the question be answered using only evidence from the context above?",
        "Does the question test understanding of the information presented in the context?",
    ]
    .into_iter()
    .map(|q| AuditCriterion::new(q, format!("{q} Answer with one word YES or NO.")))
    .collect()
}

/// Audit criteria applied to assembled feedback. These pass when the editor
/// answers NO — a YES means the feedback has the named defect.
pub fn feedback_quality_criteria() -> Vec<AuditCriterion> {
    ["contradict itself", "repeat the same points"]
        .into_iter()
        .map(|label| {
            AuditCriterion::new(
                label,
                format!("Does the feedback {label}? Answer with one word YES or NO."),
            )
        })
        .collect()
}

/// Whether a YES answer means the audit passed or failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassWhen {
    AnswerYes,
    AnswerNo,
}

/// Result of running a criteria list against a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityVerdict {
    pub passed: bool,
    /// Label of the first violated criterion, if any.
    pub failed: Option<String>,
}

/// Outcome of a quality-gated loop.
///
/// Gates are best-effort: when the retry budget runs out the last candidate
/// is still returned, but tagged so callers can warn instead of silently
/// shipping unvetted output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gated<T> {
    /// The gate was satisfied.
    Passed(T),
    /// The retry budget ran out; `value` is the last candidate.
    Exhausted { value: T, failed_criterion: String },
}

impl<T> Gated<T> {
    pub fn value(&self) -> &T {
        match self {
            Gated::Passed(value) => value,
            Gated::Exhausted { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Gated::Passed(value) => value,
            Gated::Exhausted { value, .. } => value,
        }
    }

    /// The criterion that was still failing when the gate gave up, if any.
    pub fn failed_criterion(&self) -> Option<&str> {
        match self {
            Gated::Passed(_) => None,
            Gated::Exhausted {
                failed_criterion, ..
            } => Some(failed_criterion),
        }
    }
}

/// Runs binary audits against text using the quality-editor persona.
pub struct QualityChecker<'a> {
    editor: &'a mut PersonaAgent,
    criteria: Vec<AuditCriterion>,
    pass_when: PassWhen,
}

impl<'a> QualityChecker<'a> {
    pub fn new(
        editor: &'a mut PersonaAgent,
        criteria: Vec<AuditCriterion>,
        pass_when: PassWhen,
    ) -> Self {
        Self {
            editor,
            criteria,
            pass_when,
        }
    }

    /// Present `subject` to the editor, then ask each audit question in
    /// order, stopping at the first violation.
    ///
    /// The priming reply is discarded; it only seeds the editor's memory
    /// with the text under review.
    pub async fn check(&mut self, subject: &str) -> anyhow::Result<QualityVerdict> {
        self.editor.respond(subject).await?;

        for criterion in &self.criteria {
            let answer = self.editor.respond(&criterion.question).await?;
            let said_yes = answer.contains("YES");
            let passed = match self.pass_when {
                PassWhen::AnswerYes => said_yes,
                PassWhen::AnswerNo => !said_yes,
            };
            if !passed {
                return Ok(QualityVerdict {
                    passed: false,
                    failed: Some(criterion.label.clone()),
                });
            }
        }

        Ok(QualityVerdict {
            passed: true,
            failed: None,
        })
    }

    /// Ask the editor persona for a rewrite that avoids the failed property.
    pub async fn rewrite(&mut self, feedback: &str, failed_label: &str) -> anyhow::Result<String> {
        let task = format!(
            "Return an edited version of this feedback so that it does not {failed_label}.\n\
             <FEEDBACK>\n{feedback}\n</FEEDBACK>"
        );
        self.editor.respond(&task).await
    }
}
