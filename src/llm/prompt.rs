use std::fmt;

use serde::Serialize;

use crate::analysis::categorize::{rate_level, Categorization, CategoryIndices, ColorLineage};
use crate::analysis::rate::SpeechRate;
use crate::analysis::traits::TraitProfile;
use crate::config::CategoryThresholds;
use crate::error::{CompositionError, VoiceError};

/// System prompt for every elaboration call.
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Character-sheet frame that opens the first prompt.
pub const INSTRUCTION_1: &str = r#"Anime male Character Design Prompt:
Appearance:
Male character
Hair:[]
Eyes:[]
Outfit(upper body):[]
His Extraversion:[]
His Openness:[]
His Conscientiousness:[]
His Agreeableness:[]
accessories:[]
Era:modern
Back ground:City in the dark of night(less light), simple.
Frame:headshot, facing forward, no invisible head parts.
(important)Art Style: Pixiv-inspired anime illustration, Flat, 2D,The style should have soft, light, and rhythmic lines with vibrant colors, yet the gentleness of the lines elegantly finishes the character's expression and atmosphere.This style excellently portrays the character's internal emotions with great sensitivity, exuding visual poetry. no-text.

Generate a prompt for DALLE3 to generate an image from the following information according to the above frame.(Fields that have already been filled out will remain the same.)
"#;

/// Worked input/output pair that closes the first prompt.
pub const EXAMPLE_1: &str = r#"
Here are an example.
imput =
{Individuals are relatively sociable, enjoy interactions with others to a degree, but also value some quiet time.
Individuals are curious and enjoy exploring new experiences and ideas.
Individuals are relatively organized, responsible, and mostly act in a planned manner.
Individuals are very friendly, cooperative, and respectful of others' feelings and opinions.
his voice is clear and low pitch
image_colo_lineage:Red or Green lineage
}

output =
{Anime Character Design Prompt:
Appearance:
Male character
Hair: Dark brown, slightly messy with spikes, short length
Eyes: Golden brown, with a sharp gaze
Outfit (upper body): Black jacket with high collar, red t-shirt underneath
His Extraversion: Individuals are relatively sociable, enjoy interactions with others to a degree, but also value some quiet time.
His Openness: Individuals are curious and enjoy exploring new experiences and ideas.
His Conscientiousness: Individuals are relatively organized, responsible, and mostly act in a planned manner.
His Agreeableness: Individuals are very friendly, cooperative, and respectful of others' feelings and opinions.
accessories:High-tech earphone
Era:modern
Back ground:City in the dark of night(less light), simple.
Frame:headshot, facing forward, no invisible head parts.
(important)Art Style: Pixiv-inspired anime illustration, Flat, 2D,The style should have soft, light, and rhythmic lines with vibrant colors, yet the gentleness of the lines elegantly finishes the character's expression and atmosphere.This style excellently portrays the character's internal emotions with great sensitivity, exuding visual poetry. no-text.}
please make a prompt for DALLE3 like this
"#;

/// Worked expression example that prefixes the elaborated character sheet.
pub const INSTRUCTION_2: &str = r#"
Here are an example.
Anime Character Design Prompt:
Appearance:
Male character
Hair: Dark brown, slightly messy with spikes, short length
Eyes: Golden brown, with a sharp gaze
Outfit (upper body): Black jacket with high collar, red t-shirt underneath
His Extraversion: Individuals are relatively sociable, enjoy interactions with others to a degree, but also value some quiet time.
His Openness: Individuals are curious and enjoy exploring new experiences and ideas.
His Conscientiousness: Individuals are relatively organized, responsible, and mostly act in a planned manner.
His Agreeableness: Individuals are very friendly, cooperative, and respectful of others' feelings and opinions.
accessories:High-tech earphone
Era:modern
Back ground:City in the dark of night(less light), simple.
Frame:headshot, facing forward, no invisible head parts.
(important)Art Style: Pixiv-inspired anime illustration, Flat, 2D,The style should have soft, light, and rhythmic lines with vibrant colors, yet the gentleness of the lines elegantly finishes the character's expression and atmosphere.This style excellently portrays the character's internal emotions with great sensitivity, exuding visual poetry. no text or color palette.
Expression:beaming smile
  prompt: A male anime pixiv-inspired character headshot and facing forward with short, spiky deep brown hair and intense amber eyes, now with a beaming smile. The style remains soft, light, rhythmic, and vibrant, capturing the character's internal emotions and visual poetry. He wears a sleek black jacket over a vibrant red shirt, symbolizing audacity and spirit, and high-tech earphones, indicating focus and readiness. The background is city of night and simple. highlighting the character's featurese.no text or color palette.
                please make a prompt for DALLE3 like this.
please make a prompt as an example"#;

/// The first prompt: trait sentences, voice description and color hint
/// inside the fixed frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PromptText(String);

impl PromptText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for PromptText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PromptText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

pub fn compose_prompt(indices: &CategoryIndices, lineage: ColorLineage) -> PromptText {
    let profile = TraitProfile::lookup(indices.rate, indices.pitch);

    let mut text = String::from(INSTRUCTION_1);
    for sentence in profile.sentences() {
        text.push_str(sentence);
        text.push('\n');
    }
    text.push_str(&format!(
        "his voice is {} and {}\n",
        indices.contrast.label(),
        indices.height().label()
    ));
    text.push_str(lineage.instruction());
    text.push('\n');
    text.push_str(EXAMPLE_1);

    PromptText(text)
}

/// Compose from the two independent analysis branches.
///
/// A pitch/contrast failure is reported ahead of a rate failure when both
/// branches failed.
pub fn compose_from_analysis(
    categorization: Result<Categorization, VoiceError>,
    rate: Result<SpeechRate, VoiceError>,
    thresholds: &CategoryThresholds,
) -> Result<PromptText, CompositionError> {
    let categorization = categorization.map_err(CompositionError::Features)?;
    let rate = rate.map_err(CompositionError::Rate)?;

    let indices = categorization
        .categories
        .with_rate(rate_level(rate.characters_per_second, thresholds));
    Ok(compose_prompt(&indices, categorization.lineage))
}

/// The elaborated character sheet, prefixed with the expression example.
pub fn second_prompt(reply: &str) -> String {
    format!("{INSTRUCTION_2}\n{}", reply.trim())
}

/// Ask for a final image prompt with the given facial expression.
pub fn expression_prompt(second: &str, expression: &str) -> String {
    format!("{second} \nExpression: {expression} \n prompt:")
}
