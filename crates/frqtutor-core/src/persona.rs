//! Persona agents — isolated conversational identities over one backend.
//!
//! Each agent owns its prompt template and its own ordered history; nothing
//! is shared between personas. Capabilities are passed around as explicit
//! agent references, never looked up globally.

use std::sync::Arc;

use tracing::debug;

use crate::traits::{CompletionProvider, CompletionSettings};

/// The five fixed persona roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Persona {
    /// Produces factual introduction and context text for a topic.
    Knowledge,
    /// Produces open-ended questions targeting the learning standard.
    Questioner,
    /// Produces rubrics, scoring explanations, and corrective explanations.
    Teacher,
    /// Simulates a student writing a model answer.
    Student,
    /// Runs yes/no audits and rewrites text to satisfy a constraint.
    Editor,
}

impl Persona {
    /// The name the persona speaks as in its transcript.
    pub fn speaker(&self) -> &'static str {
        match self {
            Persona::Knowledge => "Mary",
            Persona::Questioner => "John",
            Persona::Teacher => "Susan",
            Persona::Student => "Zach",
            Persona::Editor => "Jan",
        }
    }

    /// Prompt template with `{chat_history}` and `{task}` placeholders.
    ///
    /// The questioner persona embeds the learning standard so its questions
    /// target it; the other personas ignore `standard`.
    pub fn template(&self, standard: &str) -> String {
        match self {
            Persona::Knowledge => "Mary is a super-intelligent, advanced AI task executor that possesses accurate knowledge on every topic.
It does not mention itself or admit its nature as an AI.
It uses the voice of a primary or secondary source.
It does not use first or second person except when quoting a source.
It fulfills requests exactly and concisely.
For the following requests, you will respond and do tasks as Mary.

{chat_history}
Human: {task}
Mary:"
                .to_string(),
            Persona::Questioner => format!(
                "John is a super-intelligent question asking AI with critical reading and thinking skills.
It does not mention itself or admit its nature as an AI.
It does not use first or second person except when quoting a source.
It specializes in generating insightful questions that test understanding of a text passage.
Its questions expect the response to exhibit the standard: {standard}.
For the following requests, you will respond and do tasks as John.

{{chat_history}}
Human: {{task}}
John:"
            ),
            Persona::Teacher => "Susan is a super-intelligent, advanced educational AI that is an expert at teaching students.
It is knowledgeable in all common student mistakes.
It does not mention itself or admit its nature as an AI.
It does not use first or second person except when quoting a source.
It fulfills requests exactly and concisely.
It is extremely competent in evaluating free response questions, identifying false information,
and providing the best advice for students to improve their writing with respect to a rubric.
For the following requests, you will respond and do tasks as Susan.

{chat_history}
Human: {task}
Susan:"
                .to_string(),
            Persona::Student => "Zach is a human 4th grade student that is doing a writing assignment.
For the following requests, you will respond and write as Zach.

{chat_history}
{task}
Zach:"
                .to_string(),
            Persona::Editor => "Jan is an advanced teaching quality assurance AI that is an expert at
editing educational text to promote concise, helpful, and easy to understand material for students.
It does not mention itself or admit its nature as an AI.
It fulfills requests exactly and concisely without repeating the request.
It does not use first or second person except when quoting a source.
For the following requests, you will respond as Jan.

{chat_history}
{task}
Jan:"
                .to_string(),
        }
    }
}

/// One completed task/reply exchange in an agent's transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    /// The task text sent to the persona.
    pub task: String,
    /// The persona's reply.
    pub reply: String,
}

/// A persona wrapped around one completion backend with private memory.
///
/// History is append-only and never pruned, so the rendered prompt grows
/// with every call. Callers must tolerate increasing prompt length over an
/// agent's lifetime.
pub struct PersonaAgent {
    persona: Persona,
    template: String,
    history: Vec<Exchange>,
    provider: Arc<dyn CompletionProvider>,
    settings: CompletionSettings,
}

impl PersonaAgent {
    pub fn new(
        persona: Persona,
        standard: &str,
        provider: Arc<dyn CompletionProvider>,
        settings: CompletionSettings,
    ) -> Self {
        Self {
            persona,
            template: persona.template(standard),
            history: Vec::new(),
            provider,
            settings,
        }
    }

    pub fn persona(&self) -> Persona {
        self.persona
    }

    /// The accumulated transcript, in call order. After N `respond` calls
    /// this holds exactly N exchanges.
    pub fn history(&self) -> &[Exchange] {
        &self.history
    }

    /// Render the full prompt for a new task: the persona template filled
    /// with the accumulated transcript and the task text.
    fn render(&self, task: &str) -> String {
        let mut chat_history = String::new();
        for exchange in &self.history {
            chat_history.push_str(&format!(
                "Human: {}\n{}: {}\n",
                exchange.task,
                self.persona.speaker(),
                exchange.reply
            ));
        }
        self.template
            .replace("{chat_history}", chat_history.trim_end())
            .replace("{task}", task)
    }

    /// Send a task to the persona and return its reply.
    ///
    /// Appends the exchange to the transcript. No input validation is done
    /// here; provider errors propagate unchanged.
    pub async fn respond(&mut self, task: &str) -> anyhow::Result<String> {
        let prompt = self.render(task);
        debug!(
            persona = self.persona.speaker(),
            history_len = self.history.len(),
            prompt_chars = prompt.len(),
            "persona call"
        );
        let request = self.settings.request(prompt);
        let completion = self.provider.complete(&request).await?;
        let reply = completion.text.trim().to_string();
        self.history.push(Exchange {
            task: task.to_string(),
            reply: reply.clone(),
        });
        Ok(reply)
    }
}
