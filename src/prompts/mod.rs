//! Prompt templates for generation requests
//!
//! Everything here is pure string assembly. Builders never call a provider
//! and never mutate state, so the same inputs always yield the same prompt.

use serde::{Deserialize, Serialize};

/// Output mode for a generation request
///
/// The mode selects both the prompt template and the pacing profile used
/// when fragments are delivered to the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    /// Animated HTML explainer document
    #[default]
    Animation,
    /// Plain conversational text reply
    Text,
}

impl std::fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Animation => write!(f, "animation"),
            Self::Text => write!(f, "text"),
        }
    }
}

/// Class name required on every subtitle text element in animation output
///
/// Downstream consumers locate narration text programmatically by this
/// marker, so the template must demand it verbatim.
pub const SUBTITLE_MARKER_CLASS: &str = "subtitle-text";

/// Build the system prompt for a streamed generation request
///
/// # Arguments
///
/// * `mode` - Selects the animation document template or the plain-text
///   assistant persona
/// * `topic` - The user's topic, embedded verbatim into the template
pub fn build_system_prompt(mode: GenerationMode, topic: &str) -> String {
    match mode {
        GenerationMode::Animation => format!(
            r#"Create an exceptionally beautiful animated explainer about: {topic}

It must be dynamic, like a complete video that is already playing. It should
walk through one full process from start to finish and explain a single small
knowledge point clearly. The page must be visually polished, with a real sense
of design, and the knowledge and imagery must both be accurate.

Include narration-style subtitle text that explains the topic from beginning
to end. Subtitles must be bilingual. Every subtitle text element MUST carry
the class "{marker}" so the narration can be located programmatically.

No interactive buttons or controls of any kind. Playback starts immediately.

Use a harmonious, widely liked light color palette and rich, plentiful visual
elements.

**Layout requirements: use a full-screen or near full-screen layout. The main
container must occupy at least 80% of the viewport width and more than 70% of
the viewport height. Minimize margins and empty space so the content fills
the display area. The main content area should be one large, centered white
or light-colored card taking up most of the screen.**

**Subtitle requirements: subtitles must sit below the animated content, fixed
or absolutely positioned at the bottom of the container, clearly visible and
never covering any animated element. The subtitle area needs a solid or
semi-transparent background so the text stays readable, with a clear visual
separation from the animation above it.**

**Ensure every element is positioned correctly within a 2K-resolution
container. Avoid overlap, subtitle occlusion, misplaced shapes, or anything
else that would break the visual presentation.**

Deliver HTML + CSS + JS + SVG, all inside a single self-contained HTML file."#,
            topic = topic,
            marker = SUBTITLE_MARKER_CLASS,
        ),
        GenerationMode::Text => format!(
            "You are a knowledgeable, friendly assistant. Answer the user's \
             question about {topic} in clear natural language. Be accurate and \
             concise. Reply with plain conversational text only, no HTML and no \
             code unless the user explicitly asks for it.",
            topic = topic,
        ),
    }
}

/// Build the one-shot prompt for the interactive model-artifact generator
///
/// The artifact is a standalone interactive document rather than a timed
/// animation, so it gets its own template instead of reusing the animation
/// one.
pub fn build_artifact_prompt(request: &str) -> String {
    format!(
        r#"Build a single self-contained interactive HTML document that models: {request}

Requirements:
- Expose at least two adjustable parameters (sliders, number inputs, or
  similar) that visibly change the model when moved.
- Use a two-pane layout: controls on one side, the live visualization on the
  other.
- Use only native HTML, CSS, JavaScript, and SVG. No frameworks, no external
  scripts, stylesheets, fonts, or images of any kind.
- Everything must work offline from the single file.
- Label the parameters clearly and pick sensible defaults and ranges.

Return the complete HTML document."#,
        request = request,
    )
}
