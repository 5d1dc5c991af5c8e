//! Free-response-question generation.
//!
//! The knowledge persona builds up topic material in stages (introduction,
//! facts, context paragraphs), then the questioner persona produces an
//! open-ended question answerable from that context alone. When quality
//! gating is on, questions that fail the FRQ audit are regenerated against
//! the same context, up to a bounded number of retries.

use tracing::{info, warn};

use crate::persona::PersonaAgent;
use crate::quality::{Gated, QualityChecker};

const DEFAULT_MAX_RETRY: u32 = 2;

/// A generated free-response-question artifact. Immutable once produced;
/// regeneration replaces the whole artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frq {
    /// Two-sentence topic introduction.
    pub intro: String,
    /// Three paragraphs of supporting context.
    pub context: String,
    /// The open-ended question.
    pub question: String,
}

impl Frq {
    /// Intro and context joined the way the FRQ is presented to the student.
    pub fn context_block(&self) -> String {
        format!("{}\n{}", self.intro, self.context)
    }
}

/// The subject preamble shown to the quality editor before FRQ audits.
fn frq_review_subject(context: &str, question: &str) -> String {
    format!(
        "Refer to the following context and question for the following requests:\n\
         <CONTEXT>\n{context}\n</CONTEXT>\n\
         <QUESTION>\n{question}\n</QUESTION>"
    )
}

/// Orchestrates the knowledge and questioner personas to produce an FRQ.
pub struct ContentGenerator<'a> {
    knowledge: &'a mut PersonaAgent,
    questioner: &'a mut PersonaAgent,
    checker: Option<QualityChecker<'a>>,
    max_retry: u32,
}

impl<'a> ContentGenerator<'a> {
    /// `checker` enables the quality gate; pass `None` to accept the first
    /// generated question unaudited.
    pub fn new(
        knowledge: &'a mut PersonaAgent,
        questioner: &'a mut PersonaAgent,
        checker: Option<QualityChecker<'a>>,
    ) -> Self {
        Self {
            knowledge,
            questioner,
            checker,
            max_retry: DEFAULT_MAX_RETRY,
        }
    }

    /// Bound on question regenerations after a failed audit.
    pub fn with_max_retry(mut self, max_retry: u32) -> Self {
        self.max_retry = max_retry;
        self
    }

    /// Generate an FRQ for `topic`.
    pub async fn generate(&mut self, topic: &str) -> anyhow::Result<Gated<Frq>> {
        let (intro, context) = self.generate_intro_context(topic).await?;
        let mut question = generate_question(self.questioner, &context).await?;

        let Some(checker) = self.checker.as_mut() else {
            return Ok(Gated::Passed(Frq {
                intro,
                context,
                question,
            }));
        };

        let mut tries = 0;
        loop {
            let subject = frq_review_subject(&format!("{intro}\n{context}"), &question);
            let verdict = checker.check(&subject).await?;
            let Some(criterion) = verdict.failed else {
                info!(tries, "question passed quality audit");
                return Ok(Gated::Passed(Frq {
                    intro,
                    context,
                    question,
                }));
            };

            if tries == self.max_retry {
                return Ok(Gated::Exhausted {
                    value: Frq {
                        intro,
                        context,
                        question,
                    },
                    failed_criterion: criterion,
                });
            }

            warn!(
                criterion = %criterion,
                discarded = %question,
                "question failed quality audit, regenerating"
            );
            question = generate_question(self.questioner, &context).await?;
            tries += 1;
        }
    }

    /// Stage the knowledge persona through introduction, facts, and context.
    ///
    /// The facts reply is discarded on purpose: it conditions the persona's
    /// memory so the context paragraphs have material to draw on.
    async fn generate_intro_context(&mut self, topic: &str) -> anyhow::Result<(String, String)> {
        let intro = self
            .knowledge
            .respond(&format!(
                "Write a short 2 sentence introduction for the topic '{topic}'"
            ))
            .await?;
        self.knowledge
            .respond(&format!(
                "generate 8 facts related to the topic '{topic}' which could follow your introduction"
            ))
            .await?;
        let context = self
            .knowledge
            .respond(
                "generate 3 paragraphs about the topic naturally utilizing the above facts \
                 incorporating quotes if necessary",
            )
            .await?;
        Ok((intro, context))
    }
}

async fn generate_question(questioner: &mut PersonaAgent, context: &str) -> anyhow::Result<String> {
    questioner
        .respond(&format!(
            "Generate an open-ended question which can be answered solely by drawing evidence \
             from the context:\n'{context}'"
        ))
        .await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::persona::Persona;
    use crate::quality::{frq_quality_criteria, PassWhen};
    use crate::test_util::ScriptedProvider;
    use crate::traits::CompletionSettings;

    const CAN_BE_ANSWERED: &str = "Can the question be answered";
    const TESTS_UNDERSTANDING: &str = "Does the question test understanding";
    const QUESTION_TASK: &str = "Generate an open-ended question";

    fn agents(provider: &Arc<ScriptedProvider>) -> (PersonaAgent, PersonaAgent, PersonaAgent) {
        let settings = CompletionSettings::default();
        let make = |persona| {
            PersonaAgent::new(
                persona,
                "standard",
                provider.clone() as Arc<dyn crate::traits::CompletionProvider>,
                settings.clone(),
            )
        };
        (
            make(Persona::Knowledge),
            make(Persona::Questioner),
            make(Persona::Editor),
        )
    }

    fn content_provider() -> ScriptedProvider {
        ScriptedProvider::with_default("YES")
            .on("2 sentence introduction", &["An intro."])
            .on("8 facts", &["Eight facts."])
            .on("3 paragraphs", &["Three paragraphs of context."])
    }

    #[tokio::test]
    async fn gating_disabled_uses_single_question_call() {
        let provider =
            Arc::new(content_provider().on(QUESTION_TASK, &["What caused the extinction?"]));
        let (mut knowledge, mut questioner, _editor) = agents(&provider);

        let gated = ContentGenerator::new(&mut knowledge, &mut questioner, None)
            .generate("Dinosaur extinction")
            .await
            .unwrap();

        let frq = match gated {
            Gated::Passed(frq) => frq,
            other => panic!("expected Passed, got {other:?}"),
        };
        assert_eq!(frq.intro, "An intro.");
        assert_eq!(frq.context, "Three paragraphs of context.");
        assert_eq!(frq.question, "What caused the extinction?");
        assert_eq!(frq.context_block(), "An intro.\nThree paragraphs of context.");

        assert_eq!(provider.calls_containing(QUESTION_TASK), 1);
        // No editor interaction at all without a checker.
        assert_eq!(provider.calls_containing("Jan"), 0);
    }

    #[tokio::test]
    async fn failed_audit_regenerates_question_only() {
        let provider = Arc::new(
            content_provider()
                .on(QUESTION_TASK, &["First question?", "Second question?"])
                .on(CAN_BE_ANSWERED, &["NO", "YES"])
                .on(TESTS_UNDERSTANDING, &["YES"]),
        );
        let (mut knowledge, mut questioner, mut editor) = agents(&provider);
        let checker =
            QualityChecker::new(&mut editor, frq_quality_criteria(), PassWhen::AnswerYes);

        let gated = ContentGenerator::new(&mut knowledge, &mut questioner, Some(checker))
            .generate("Dinosaur extinction")
            .await
            .unwrap();

        assert_eq!(gated.value().question, "Second question?");
        assert!(matches!(gated, Gated::Passed(_)));

        // Two question calls total; the context was generated exactly once.
        assert_eq!(provider.calls_containing(QUESTION_TASK), 2);
        assert_eq!(provider.calls_containing("3 paragraphs"), 1);
    }

    #[tokio::test]
    async fn exhausted_gate_returns_last_question_tagged() {
        let provider = Arc::new(
            content_provider()
                .on(QUESTION_TASK, &["Q1?", "Q2?", "Q3?", "Q4?"])
                .on(CAN_BE_ANSWERED, &["NO"]),
        );
        let (mut knowledge, mut questioner, mut editor) = agents(&provider);
        let checker =
            QualityChecker::new(&mut editor, frq_quality_criteria(), PassWhen::AnswerYes);

        let gated = ContentGenerator::new(&mut knowledge, &mut questioner, Some(checker))
            .with_max_retry(2)
            .generate("Dinosaur extinction")
            .await
            .unwrap();

        // Initial question plus exactly two regenerations.
        assert_eq!(provider.calls_containing(QUESTION_TASK), 3);
        assert_eq!(gated.value().question, "Q3?");
        assert_eq!(
            gated.failed_criterion(),
            Some("Can the question be answered using only evidence from the context above?")
        );
    }
}
