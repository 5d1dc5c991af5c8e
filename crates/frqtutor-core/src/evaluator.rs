//! Student-response evaluation: fact checking, scoring, feedback assembly.
//!
//! Correctness is judged sentence by sentence against the FRQ context, each
//! judgment going straight to the provider as a one-shot prompt (no persona
//! memory). The teacher persona then explains what went wrong and scores the
//! response against the rubric, and the assembled feedback passes through
//! its own quality-edit gate.

use tracing::{debug, info, warn};

use crate::persona::PersonaAgent;
use crate::quality::{Gated, QualityChecker};
use crate::retry::{any_attempt_accepts, final_token};
use crate::segment::split_sentences;
use crate::traits::{CompletionProvider, CompletionSettings};

const DEFAULT_MAX_EDITS: u32 = 2;

/// Attempts allowed for a per-sentence correctness judgment.
const SENTENCE_JUDGMENT_ATTEMPTS: u32 = 3;
/// Attempts allowed for the did-it-answer-the-question judgment.
const ANSWERED_JUDGMENT_ATTEMPTS: u32 = 2;

const OPENING_CORRECT_ANSWERED: &str = "Good Job! You answered the question correctly.\n";
const OPENING_CORRECT_UNANSWERED: &str =
    "Your response was accurate, but did not adequately answer the question.\n";
const OPENING_INCORRECT_ANSWERED: &str =
    "Your response contained incorrect information but overall still answered the question.\n";
const OPENING_INCORRECT_UNANSWERED: &str =
    "Your response contained incorrect information and did not adequately answer the question.\n";

/// Per-response correctness findings. Intermediate, not persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectnessReport {
    /// Conjunction over all sentence judgments.
    pub all_correct: bool,
    /// Sentences judged incorrect, in response order.
    pub incorrect_sentences: Vec<String>,
    /// Whether the response answers the question overall.
    pub answered_question: bool,
}

fn correctness_prompt(context: &str, sentence: &str) -> String {
    format!(
        "Identify claims from the response and evaluate the accuracy of each using evidence \
from the context step by step. Evidence from the context is not needed if the claim is common \
sense. Return a final answer of CORRECT if all claims are accurate, and INCORRECT otherwise.
Example1:
<CONTEXT>
</CONTEXT>
<RESPONSE>
During the Scramble for Africa, European powers justified their colonization efforts by claiming to bring civilization, Islam, and economic development to the continent.
</RESPONSE>
Evaluation:
Claim 1: European powers justified their colonization efforts by bringing civilization to the continent. \n\nAccuracy: CORRECT. The text states that European powers \"justified their colonization efforts by claiming to bring civilization, Christianity, and economic development to the continent.\" \n\nClaim 2: European powers justified their colonization efforts by bringing Islam to the continent. \n\nAccuracy: INCORRECT. The text states that European powers \"justified their colonization efforts by claiming to bring civilization, Christianity, and economic development to the continent.\" Islam is not mentioned as one of the claims made by European powers.
Final Answer: INCORRECT

<CONTEXT>
{context}
</CONTEXT>
<RESPONSE>
{sentence}
</RESPONSE>
Evaluation:
"
    )
}

fn answered_prompt(question: &str, response: &str) -> String {
    format!(
        "Does the response answer the question? Remember that a response with incorrect \
information can still answer the question if the misinformation does not overly impact the \
main points of the response. Return one word YES or NO:
Example1:
<QUESTION>
</QUESTION>
<RESPONSE>
</RESPONSE>
Answer: YES

<QUESTION>
{question}
</QUESTION>
<RESPONSE>
{response}
</RESPONSE>
"
    )
}

/// The subject preamble shown to the quality editor before feedback audits.
fn feedback_review_subject(feedback: &str) -> String {
    format!(
        "Refer to the following feedback for the following requests:\n\
         <FEEDBACK>\n{feedback}\n</FEEDBACK>"
    )
}

/// Evaluates a student response against an FRQ and the session rubric.
pub struct ResponseEvaluator<'a> {
    teacher: &'a mut PersonaAgent,
    checker: Option<QualityChecker<'a>>,
    provider: &'a dyn CompletionProvider,
    settings: &'a CompletionSettings,
    rubric: &'a str,
    max_edits: u32,
}

impl<'a> ResponseEvaluator<'a> {
    /// `checker` enables the feedback quality gate; judgment calls bypass
    /// the personas and go to `provider` directly.
    pub fn new(
        teacher: &'a mut PersonaAgent,
        checker: Option<QualityChecker<'a>>,
        provider: &'a dyn CompletionProvider,
        settings: &'a CompletionSettings,
        rubric: &'a str,
    ) -> Self {
        Self {
            teacher,
            checker,
            provider,
            settings,
            rubric,
            max_edits: DEFAULT_MAX_EDITS,
        }
    }

    /// Bound on feedback rewrites after a failed audit.
    pub fn with_max_edits(mut self, max_edits: u32) -> Self {
        self.max_edits = max_edits;
        self
    }

    /// Judge each sentence of `response` against `context`, and whether the
    /// response answers `question` overall.
    ///
    /// A sentence is correct as soon as one of its bounded retries ends in
    /// CORRECT (see `retry::any_attempt_accepts` — first accepted attempt
    /// wins, no voting). Provider errors propagate.
    pub async fn evaluate_correctness(
        &self,
        context: &str,
        question: &str,
        response: &str,
    ) -> anyhow::Result<CorrectnessReport> {
        let sentences = split_sentences(response);
        debug!(sentence_count = sentences.len(), "fact-checking response");

        let mut all_correct = true;
        let mut incorrect_sentences = Vec::new();
        for sentence in sentences {
            let request = self.settings.request(correctness_prompt(context, &sentence));
            let correct = any_attempt_accepts(
                self.provider,
                &request,
                SENTENCE_JUDGMENT_ATTEMPTS,
                |reply| final_token(reply) == "CORRECT",
            )
            .await?;
            if !correct {
                debug!(sentence = %sentence, "sentence judged incorrect");
                incorrect_sentences.push(sentence);
            }
            all_correct = all_correct && correct;
        }

        let request = self.settings.request(answered_prompt(question, response));
        let answered_question = any_attempt_accepts(
            self.provider,
            &request,
            ANSWERED_JUDGMENT_ATTEMPTS,
            |reply| final_token(reply) == "YES",
        )
        .await?;

        Ok(CorrectnessReport {
            all_correct,
            incorrect_sentences,
            answered_question,
        })
    }

    /// Score the response 1-3 against the rubric via the teacher persona.
    async fn evaluate_core_standard(
        &mut self,
        context: &str,
        response: &str,
    ) -> anyhow::Result<String> {
        let task = format!(
            "{rubric}\n\
Score the following response from 1-3. Remember the student can only \
use information provided in the context and scale the score accordingly. Explain why step by step. \
Then, unless the score is 3, give suggestions on how to improve the score.\n\
<CONTEXT>\n{context}\n</CONTEXT>\n\
<RESPONSE>\n{response}\n</RESPONSE>",
            rubric = self.rubric
        );
        self.teacher.respond(&task).await
    }

    /// Build the narrative feedback for the correctness findings: a fixed
    /// opening keyed on (all_correct, answered_question), then per-sentence
    /// explanations and/or an inadequately-answered explanation.
    async fn build_narrative(
        &mut self,
        question: &str,
        report: &CorrectnessReport,
    ) -> anyhow::Result<String> {
        let mut feedback = String::new();

        match (report.all_correct, report.answered_question) {
            (true, true) => feedback.push_str(OPENING_CORRECT_ANSWERED),
            (true, false) => {
                feedback.push_str(OPENING_CORRECT_UNANSWERED);
                feedback.push_str(&self.explain_unanswered(question).await?);
                feedback.push('\n');
            }
            (false, true) => {
                feedback.push_str(OPENING_INCORRECT_ANSWERED);
                for sentence in &report.incorrect_sentences {
                    feedback.push_str(&self.explain_incorrect(sentence).await?);
                    feedback.push('\n');
                }
            }
            (false, false) => {
                feedback.push_str(OPENING_INCORRECT_UNANSWERED);
                for sentence in &report.incorrect_sentences {
                    feedback.push_str(&self.explain_incorrect(sentence).await?);
                    feedback.push('\n');
                }
                feedback.push_str(&self.explain_unanswered(question).await?);
                feedback.push('\n');
            }
        }

        Ok(feedback)
    }

    async fn explain_incorrect(&mut self, sentence: &str) -> anyhow::Result<String> {
        self.teacher
            .respond(&format!(
                "Explain step by step why the sentence '{sentence}' is incorrect given the \
                 provided context"
            ))
            .await
    }

    async fn explain_unanswered(&mut self, question: &str) -> anyhow::Result<String> {
        self.teacher
            .respond(&format!(
                "Explain step by step why the response does not adequately answer the \
                 question: {question}"
            ))
            .await
    }

    /// Evaluate a student response and return assembled feedback.
    ///
    /// The narrative is followed by the rubric-based score block, separated
    /// by a blank line, then run through the quality-edit gate.
    pub async fn evaluate(
        &mut self,
        context: &str,
        question: &str,
        response: &str,
    ) -> anyhow::Result<Gated<String>> {
        let report = self.evaluate_correctness(context, question, response).await?;
        info!(
            all_correct = report.all_correct,
            answered = report.answered_question,
            incorrect = report.incorrect_sentences.len(),
            "correctness evaluated"
        );

        let standard_feedback = self.evaluate_core_standard(context, response).await?;
        let mut feedback = self.build_narrative(question, &report).await?;
        feedback.push_str("\n\n");
        feedback.push_str(&standard_feedback);

        let Some(checker) = self.checker.as_mut() else {
            return Ok(Gated::Passed(feedback));
        };

        let mut edits = 0;
        loop {
            let verdict = checker.check(&feedback_review_subject(&feedback)).await?;
            let Some(criterion) = verdict.failed else {
                return Ok(Gated::Passed(feedback));
            };

            if edits == self.max_edits {
                return Ok(Gated::Exhausted {
                    value: feedback,
                    failed_criterion: criterion,
                });
            }

            warn!(criterion = %criterion, "feedback failed quality audit, rewriting");
            feedback = checker.rewrite(&feedback, &criterion).await?;
            edits += 1;
        }
    }
}
