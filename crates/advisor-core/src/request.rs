//! Request building.
//!
//! Turns a conversation plus the current filter selection into the logical
//! payload a transport sends. Building is pure: no I/O, no randomness, and no
//! failure modes.

use serde::{Deserialize, Serialize};

use crate::conversation::{Conversation, TransportConvention, TurnRole};
use crate::filter::{FilterKind, FilterSelection};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const MAX_OUTPUT_TOKENS: u32 = 800;
pub const TEMPERATURE: f32 = 0.2;

/// Appended to the instruction when a blocked reply is retried.
pub const REPHRASE_DIRECTIVE: &str = "Restate the request neutrally and answer only with historical or educational framing.";

/// Advisor persona placed ahead of the filter criteria.
pub const DEFAULT_PERSONA: &str = "You are a world-class, discerning watch collection advisor. \
Your expertise covers both vintage and modern luxury timepieces, spanning all price points and complexities. \
Provide objective, insightful, and knowledgeable advice based on the user's filters. \
Highlight brand heritage, long-term value retention, movement quality, and current market trends. \
Suggest specific models and brands that fit the user's criteria.";

/// Generation parameters sent with every request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub max_output_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_output_tokens: MAX_OUTPUT_TOKENS,
            temperature: TEMPERATURE,
        }
    }
}

/// One `(role, text)` entry of a request history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireTurn {
    pub role: TurnRole,
    pub text: String,
}

impl WireTurn {
    pub fn new(role: TurnRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

/// The logical payload of one remote call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    /// Set under [`TransportConvention::SeparateField`]; `None` when the
    /// instruction travels inline as the first history entry.
    pub system_instruction: Option<String>,
    pub history: Vec<WireTurn>,
    pub generation: GenerationConfig,
    /// Lets the model consult web search before answering.
    pub grounding: bool,
    pub convention: TransportConvention,
}

impl ChatRequest {
    /// The instruction text, wherever the convention placed it.
    pub fn instruction(&self) -> Option<&str> {
        match self.convention {
            TransportConvention::SeparateField => self.system_instruction.as_deref(),
            TransportConvention::InlineHistory => self
                .history
                .first()
                .filter(|turn| turn.role == TurnRole::Instruction)
                .map(|turn| turn.text.as_str()),
        }
    }

    /// Returns a copy whose instruction carries [`REPHRASE_DIRECTIVE`].
    pub fn with_rephrase_directive(&self) -> Self {
        let mut request = self.clone();
        match request.convention {
            TransportConvention::SeparateField => {
                request.system_instruction = Some(append_directive(
                    request.system_instruction.as_deref(),
                ));
            }
            TransportConvention::InlineHistory => match request.history.first_mut() {
                Some(turn) if turn.role == TurnRole::Instruction => {
                    turn.text = append_directive(Some(&turn.text));
                }
                _ => request
                    .history
                    .insert(0, WireTurn::new(TurnRole::Instruction, REPHRASE_DIRECTIVE)),
            },
        }
        request
    }
}

fn append_directive(instruction: Option<&str>) -> String {
    match instruction {
        Some(text) if !text.is_empty() => format!("{text}\n\n{REPHRASE_DIRECTIVE}"),
        _ => REPHRASE_DIRECTIVE.to_string(),
    }
}

/// Fixed instruction template: persona text followed by the filter criteria.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionTemplate {
    persona: String,
}

impl InstructionTemplate {
    pub fn new(persona: impl Into<String>) -> Self {
        Self {
            persona: persona.into(),
        }
    }

    pub fn render(&self, filters: &FilterSelection) -> String {
        format!(
            "{persona}\n\n\
             Current applied watch criteria:\n\
             Gender preference: {gender}.\n\
             Desired Price Range: {price}.\n\
             Preferred Case Size: {size}.\n\
             Watch Type/Complication: {kind}.\n\
             Movement Type: {movement}.\n",
            persona = self.persona,
            gender = filters.get(FilterKind::Gender),
            price = filters.get(FilterKind::Price),
            size = filters.get(FilterKind::CaseSize),
            kind = filters.get(FilterKind::WatchType),
            movement = filters.get(FilterKind::Movement),
        )
    }
}

impl Default for InstructionTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_PERSONA)
    }
}

/// Builds [`ChatRequest`]s for one integration.
///
/// Model, convention, grounding and generation parameters are fixed when the
/// builder is created; only the conversation and filters vary per call.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    template: InstructionTemplate,
    model: String,
    convention: TransportConvention,
    grounding: bool,
    generation: GenerationConfig,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self {
            template: InstructionTemplate::default(),
            model: DEFAULT_MODEL.to_string(),
            convention: TransportConvention::default(),
            grounding: false,
            generation: GenerationConfig::default(),
        }
    }
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(mut self, template: InstructionTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_convention(mut self, convention: TransportConvention) -> Self {
        self.convention = convention;
        self
    }

    pub fn with_grounding(mut self, grounding: bool) -> Self {
        self.grounding = grounding;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn convention(&self) -> TransportConvention {
        self.convention
    }

    /// The instruction text for `filters`.
    pub fn instruction_for(&self, filters: &FilterSelection) -> String {
        self.template.render(filters)
    }

    /// Builds the request payload.
    ///
    /// The stored instruction turn, if any, is replaced by the instruction
    /// freshly rendered from `filters`, so a stale filter context never
    /// reaches the transport.
    pub fn build(&self, conversation: &Conversation, filters: &FilterSelection) -> ChatRequest {
        let instruction = self.instruction_for(filters);
        let rendered = conversation.render_for_transport(self.convention);

        let mut history: Vec<WireTurn> = rendered
            .history
            .map(|(role, text)| match role {
                TurnRole::Instruction => WireTurn::new(role, instruction.as_str()),
                _ => WireTurn::new(role, text),
            })
            .collect();

        let system_instruction = match self.convention {
            TransportConvention::SeparateField => Some(instruction),
            TransportConvention::InlineHistory => {
                if history.first().map(|turn| turn.role) != Some(TurnRole::Instruction) {
                    history.insert(0, WireTurn::new(TurnRole::Instruction, instruction));
                }
                None
            }
        };

        ChatRequest {
            model: self.model.clone(),
            system_instruction,
            history,
            generation: self.generation,
            grounding: self.grounding,
            convention: self.convention,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterOption, Gender, MovementType};
    use strum::IntoEnumIterator;

    fn conversation() -> Conversation {
        let mut conversation = Conversation::with_greeting("Hello!");
        conversation.append(TurnRole::User, "Recommend a diver").unwrap();
        conversation
    }

    #[test]
    fn test_all_any_mentions_any_five_times() {
        let builder = RequestBuilder::new();
        let instruction = builder.instruction_for(&FilterSelection::default());

        assert_eq!(instruction.matches("Any").count(), 5);
        for kind in FilterKind::iter() {
            for label in kind.options().into_iter().filter(|label| *label != "Any") {
                assert!(
                    !instruction.contains(label),
                    "unexpected filter value {label:?} in instruction"
                );
            }
        }
    }

    #[test]
    fn test_instruction_interpolates_selected_labels() {
        let mut filters = FilterSelection::default();
        filters
            .set(FilterKind::Gender, "ladies")
            .set(FilterKind::Movement, "quartz");
        let instruction = RequestBuilder::new().instruction_for(&filters);

        assert!(instruction.contains(&format!("Gender preference: {}.", Gender::Ladies.label())));
        assert!(instruction.contains(&format!("Movement Type: {}.", MovementType::Quartz.label())));
        assert_eq!(instruction.matches("Any").count(), 3);
    }

    #[test]
    fn test_build_is_deterministic() {
        let builder = RequestBuilder::new();
        let conversation = conversation();
        let filters = FilterSelection::default();
        assert_eq!(
            builder.build(&conversation, &filters),
            builder.build(&conversation, &filters)
        );
    }

    #[test]
    fn test_build_separate_field() {
        let builder = RequestBuilder::new().with_convention(TransportConvention::SeparateField);
        let mut conversation = conversation();
        conversation.set_instruction("stale instruction");
        let request = builder.build(&conversation, &FilterSelection::default());

        assert_eq!(
            request.system_instruction.as_deref(),
            Some(builder.instruction_for(&FilterSelection::default()).as_str())
        );
        assert_eq!(
            request.history,
            vec![
                WireTurn::new(TurnRole::Assistant, "Hello!"),
                WireTurn::new(TurnRole::User, "Recommend a diver"),
            ]
        );
        assert_eq!(request.generation.max_output_tokens, 800);
        assert_eq!(request.generation.temperature, 0.2);
        assert_eq!(request.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_build_inline_prepends_instruction() {
        let builder = RequestBuilder::new().with_convention(TransportConvention::InlineHistory);
        let request = builder.build(&conversation(), &FilterSelection::default());

        assert!(request.system_instruction.is_none());
        assert_eq!(request.history.len(), 3);
        assert_eq!(request.history[0].role, TurnRole::Instruction);
        assert_eq!(
            request.instruction(),
            Some(builder.instruction_for(&FilterSelection::default()).as_str())
        );
    }

    #[test]
    fn test_build_inline_replaces_stale_instruction() {
        let builder = RequestBuilder::new().with_convention(TransportConvention::InlineHistory);
        let mut conversation = conversation();
        conversation.set_instruction("stale instruction");
        let request = builder.build(&conversation, &FilterSelection::default());

        assert_eq!(request.history.len(), 3);
        assert!(request.history.iter().all(|turn| turn.text != "stale instruction"));
    }

    #[test]
    fn test_rephrase_directive_appends_to_instruction() {
        for convention in [
            TransportConvention::SeparateField,
            TransportConvention::InlineHistory,
        ] {
            let builder = RequestBuilder::new().with_convention(convention);
            let request = builder.build(&conversation(), &FilterSelection::default());
            let rephrased = request.with_rephrase_directive();

            let instruction = rephrased.instruction().unwrap();
            assert!(instruction.starts_with(DEFAULT_PERSONA));
            assert!(instruction.ends_with(REPHRASE_DIRECTIVE));
            assert_eq!(rephrased.history.len(), request.history.len());
        }
    }
}
