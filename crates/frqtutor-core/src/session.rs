//! Session orchestration.
//!
//! One `Session` per active user interaction. The session owns the five
//! persona agents and the rubric, and exposes the four operations the view
//! layer consumes. Callers must serialize access themselves — a session is
//! not meant to be shared across concurrent invocations.

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::evaluator::ResponseEvaluator;
use crate::generator::ContentGenerator;
use crate::persona::{Persona, PersonaAgent};
use crate::quality::{
    feedback_quality_criteria, frq_quality_criteria, PassWhen, QualityChecker,
};
use crate::traits::{CompletionProvider, CompletionSettings};

/// Options for starting a session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// The core learning standard questions and rubric target.
    pub standard: String,
    /// Initial topic; can be (re)set later with `set_topic`.
    pub topic: Option<String>,
    /// Pre-made rubric. When absent, one is generated at session start.
    pub rubric: Option<String>,
    /// Whether quality gates run on generated questions and feedback.
    pub enable_qa: bool,
    /// Completion settings used for every call in this session.
    pub settings: CompletionSettings,
    /// Bound on question regenerations per FRQ.
    pub max_question_retries: u32,
    /// Bound on feedback rewrites per evaluation.
    pub max_feedback_edits: u32,
}

impl SessionOptions {
    pub fn new(standard: impl Into<String>) -> Self {
        Self {
            standard: standard.into(),
            topic: None,
            rubric: None,
            enable_qa: false,
            settings: CompletionSettings::default(),
            max_question_retries: 2,
            max_feedback_edits: 2,
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn with_rubric(mut self, rubric: impl Into<String>) -> Self {
        self.rubric = Some(rubric.into());
        self
    }

    pub fn with_quality_gates(mut self, enable_qa: bool) -> Self {
        self.enable_qa = enable_qa;
        self
    }

    pub fn with_settings(mut self, settings: CompletionSettings) -> Self {
        self.settings = settings;
        self
    }
}

/// A tutoring session: configuration, rubric, and the five persona agents.
pub struct Session {
    id: Uuid,
    standard: String,
    topic: Option<String>,
    rubric: String,
    enable_qa: bool,
    settings: CompletionSettings,
    max_question_retries: u32,
    max_feedback_edits: u32,
    provider: Arc<dyn CompletionProvider>,
    knowledge: PersonaAgent,
    questioner: PersonaAgent,
    teacher: PersonaAgent,
    student: PersonaAgent,
    editor: PersonaAgent,
}

impl Session {
    /// Start a session against `provider`.
    ///
    /// Unless a rubric was supplied, this issues the rubric-generation call,
    /// so credential problems surface here rather than mid-operation.
    pub async fn start(
        provider: Arc<dyn CompletionProvider>,
        options: SessionOptions,
    ) -> anyhow::Result<Self> {
        let id = Uuid::new_v4();
        let agent = |persona| {
            PersonaAgent::new(
                persona,
                &options.standard,
                provider.clone(),
                options.settings.clone(),
            )
        };
        let knowledge = agent(Persona::Knowledge);
        let questioner = agent(Persona::Questioner);
        let mut teacher = agent(Persona::Teacher);
        let student = agent(Persona::Student);
        let editor = agent(Persona::Editor);

        let rubric = match options.rubric {
            Some(rubric) => rubric,
            None => generate_rubric(&mut teacher, &options.standard)
                .await
                .context("failed to generate grading rubric")?,
        };

        info!(
            session_id = %id,
            standard = %options.standard,
            enable_qa = options.enable_qa,
            provider = provider.name(),
            "session started"
        );

        Ok(Self {
            id,
            standard: options.standard,
            topic: options.topic,
            rubric,
            enable_qa: options.enable_qa,
            settings: options.settings,
            max_question_retries: options.max_question_retries,
            max_feedback_edits: options.max_feedback_edits,
            provider,
            knowledge,
            questioner,
            teacher,
            student,
            editor,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn standard(&self) -> &str {
        &self.standard
    }

    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    /// The grading rubric, fixed for the session's lifetime.
    pub fn rubric(&self) -> &str {
        &self.rubric
    }

    /// Set the learning topic for subsequent operations.
    pub fn set_topic(&mut self, topic: impl Into<String>) {
        self.topic = Some(topic.into());
    }

    fn required_topic(&self) -> anyhow::Result<String> {
        self.topic
            .clone()
            .ok_or_else(|| anyhow::anyhow!("no topic set; call set_topic first"))
    }

    /// Generate an FRQ for the current topic.
    ///
    /// Returns the presented context (introduction + context paragraphs)
    /// and the question. When the quality gate runs out of retries the
    /// best-effort question is returned and a warning is logged.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub async fn generate_question(&mut self) -> anyhow::Result<(String, String)> {
        let topic = self.required_topic()?;

        let checker = if self.enable_qa {
            Some(QualityChecker::new(
                &mut self.editor,
                frq_quality_criteria(),
                PassWhen::AnswerYes,
            ))
        } else {
            None
        };
        let gated = ContentGenerator::new(&mut self.knowledge, &mut self.questioner, checker)
            .with_max_retry(self.max_question_retries)
            .generate(&topic)
            .await?;

        if let Some(criterion) = gated.failed_criterion() {
            warn!(
                criterion = %criterion,
                "returning best-effort question after exhausting quality retries"
            );
        }
        let frq = gated.into_value();
        Ok((frq.context_block(), frq.question))
    }

    /// Simulate a model answer to an FRQ via the student persona.
    #[instrument(skip(self, frq), fields(session_id = %self.id))]
    pub async fn generate_model_answer(&mut self, frq: &str) -> anyhow::Result<String> {
        self.student
            .respond(&format!(
                "Answer the following question in paragraph form:\n {frq}"
            ))
            .await
    }

    /// Evaluate a student response and return assembled feedback.
    ///
    /// When the feedback quality gate runs out of edits the best-effort
    /// feedback is returned and a warning is logged.
    #[instrument(skip(self, context, question, student_response), fields(session_id = %self.id))]
    pub async fn evaluate_response(
        &mut self,
        context: &str,
        question: &str,
        student_response: &str,
    ) -> anyhow::Result<String> {
        let checker = if self.enable_qa {
            Some(QualityChecker::new(
                &mut self.editor,
                feedback_quality_criteria(),
                PassWhen::AnswerNo,
            ))
        } else {
            None
        };
        let gated = ResponseEvaluator::new(
            &mut self.teacher,
            checker,
            self.provider.as_ref(),
            &self.settings,
            &self.rubric,
        )
        .with_max_edits(self.max_feedback_edits)
        .evaluate(context, question, student_response)
        .await?;

        if let Some(criterion) = gated.failed_criterion() {
            warn!(
                criterion = %criterion,
                "returning best-effort feedback after exhausting quality edits"
            );
        }
        Ok(gated.into_value())
    }
}

async fn generate_rubric(teacher: &mut PersonaAgent, standard: &str) -> anyhow::Result<String> {
    teacher
        .respond(&format!(
            "Concisely generate a rubric for grading an essay answer based on how well it \
             demonstrates the core standard '{standard}'. It should assign a score from 1-3 \
             and give criteria for meeting each score cutoff."
        ))
        .await
}
