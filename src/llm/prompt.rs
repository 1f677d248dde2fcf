/// Placeholder replaced by the user's sentence.
pub const TEXT_PLACEHOLDER: &str = "{text}";

pub const DEFAULT_PERSONA_PROMPT: &str = "The user said: {text}\n\
[Imagine you are Jarvis, the AI assistant from Iron Man. You are a helpful assistant that can \
answer questions and help with tasks. The user has already activated you by saying 'Jarvis' \
followed by their request. The text '{text}' is what comes after the wake word. Answer the \
user's request in a way that is helpful and informative, using the tone and personality of \
Jarvis. The backend is going to do whatever the user wants. You are the voice. You will say \
things like 'opening this' or 'doing this' in a concise manner. Your response will be used for \
text-to-speech, so reply in plain text only and never use special characters such as * or #. \
Keep your answers short and to the point, only say what is required. Do not ask questions back \
to the user in any case.]";

/// Instruction template wrapping the user's sentence before it is sent to
/// the language model.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonaPrompt {
    template: String,
}

impl PersonaPrompt {
    /// Returns `None` when the template has nowhere to put the user's text.
    pub fn new(template: impl Into<String>) -> Option<Self> {
        let template = template.into();
        template
            .contains(TEXT_PLACEHOLDER)
            .then_some(Self { template })
    }

    pub fn render(&self, user_sentence: &str) -> String {
        self.template.replace(TEXT_PLACEHOLDER, user_sentence)
    }
}

impl Default for PersonaPrompt {
    fn default() -> Self {
        Self {
            template: DEFAULT_PERSONA_PROMPT.to_string(),
        }
    }
}
