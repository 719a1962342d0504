use serde::Serialize;

use super::categorize::Level;

/// How strongly a trait is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Degree {
    Low,
    ModeratelyLow,
    ModeratelyHigh,
    High,
}

use Degree::{High as H, Low as L, ModeratelyHigh as MH, ModeratelyLow as ML};

impl Degree {
    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PersonalityTrait {
    Extraversion,
    Openness,
    Conscientiousness,
    Agreeableness,
}

// Rows are speech-rate categories, columns pitch categories.
const EXTRAVERSION: [[Degree; 4]; 4] = [[H, MH, ML, L], [MH, MH, ML, L], [ML, ML, L, L], [L, L, L, L]];
const OPENNESS: [[Degree; 4]; 4] = [[ML, MH, MH, ML], [MH, H, H, MH], [ML, ML, ML, MH], [L, L, L, L]];
const CONSCIENTIOUSNESS: [[Degree; 4]; 4] =
    [[H, H, ML, L], [H, H, ML, L], [MH, MH, ML, L], [MH, MH, ML, L]];
const AGREEABLENESS: [[Degree; 4]; 4] = [[L, MH, MH, ML], [L, MH, H, MH], [L, MH, H, MH], [L, ML, MH, ML]];

impl PersonalityTrait {
    /// Prompt order.
    pub const ALL: [PersonalityTrait; 4] = [
        PersonalityTrait::Extraversion,
        PersonalityTrait::Openness,
        PersonalityTrait::Conscientiousness,
        PersonalityTrait::Agreeableness,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PersonalityTrait::Extraversion => "extraversion",
            PersonalityTrait::Openness => "openness",
            PersonalityTrait::Conscientiousness => "conscientiousness",
            PersonalityTrait::Agreeableness => "agreeableness",
        }
    }

    fn table(self) -> &'static [[Degree; 4]; 4] {
        match self {
            PersonalityTrait::Extraversion => &EXTRAVERSION,
            PersonalityTrait::Openness => &OPENNESS,
            PersonalityTrait::Conscientiousness => &CONSCIENTIOUSNESS,
            PersonalityTrait::Agreeableness => &AGREEABLENESS,
        }
    }

    pub fn degree(self, rate: Level, pitch: Level) -> Degree {
        self.table()[rate.index()][pitch.index()]
    }

    /// The English description used in prompts.
    pub fn sentence(self, degree: Degree) -> &'static str {
        match (self, degree) {
            (PersonalityTrait::Extraversion, L) => {
                "Individuals are very introverted, value spending time alone, and tend to avoid social situations."
            }
            (PersonalityTrait::Extraversion, ML) => {
                "Individuals are relatively introverted, participate in social activities occasionally, and prefer quiet time."
            }
            (PersonalityTrait::Extraversion, MH) => {
                "Individuals are relatively sociable, enjoy interactions with others to a degree, but also value some quiet time."
            }
            (PersonalityTrait::Extraversion, H) => {
                "Individuals are sociable, energetic, and enjoy interactions with friends."
            }

            (PersonalityTrait::Openness, L) => {
                "Individuals avoid new experiences and changes, preferring routine and familiar environments."
            }
            (PersonalityTrait::Openness, ML) => {
                "Individuals are a bit cautious towards new experiences and are content with the familiar."
            }
            (PersonalityTrait::Openness, MH) => {
                "Individuals are relatively curious, open to new experiences, but also content with the familiar."
            }
            (PersonalityTrait::Openness, H) => {
                "Individuals are curious and enjoy exploring new experiences and ideas."
            }

            (PersonalityTrait::Conscientiousness, L) => {
                "Individuals are disorganized, often act without planning, and have a low sense of responsibility."
            }
            (PersonalityTrait::Conscientiousness, ML) => {
                "Individuals are sometimes disorganized or act without planning."
            }
            (PersonalityTrait::Conscientiousness, MH) => {
                "Individuals are relatively organized, responsible, and mostly act in a planned manner."
            }
            (PersonalityTrait::Conscientiousness, H) => {
                "Individuals are organized, responsible, and act in a planned manner."
            }

            (PersonalityTrait::Agreeableness, L) => {
                "Individuals are competitive, critical, and do not consider others' feelings and opinions much."
            }
            (PersonalityTrait::Agreeableness, ML) => {
                "Individuals are sometimes competitive or critical, respectful of others' opinions but find asserting their own views important."
            }
            (PersonalityTrait::Agreeableness, MH) => {
                "Individuals are relatively friendly and cooperative, respectful of others' feelings and opinions, but will assert their own opinions at times."
            }
            (PersonalityTrait::Agreeableness, H) => {
                "Individuals are very friendly, cooperative, and respectful of others' feelings and opinions."
            }
        }
    }
}

/// One degree per trait for a (rate, pitch) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TraitProfile {
    pub extraversion: Degree,
    pub openness: Degree,
    pub conscientiousness: Degree,
    pub agreeableness: Degree,
}

impl TraitProfile {
    pub fn lookup(rate: Level, pitch: Level) -> Self {
        Self {
            extraversion: PersonalityTrait::Extraversion.degree(rate, pitch),
            openness: PersonalityTrait::Openness.degree(rate, pitch),
            conscientiousness: PersonalityTrait::Conscientiousness.degree(rate, pitch),
            agreeableness: PersonalityTrait::Agreeableness.degree(rate, pitch),
        }
    }

    pub fn degree(&self, t: PersonalityTrait) -> Degree {
        match t {
            PersonalityTrait::Extraversion => self.extraversion,
            PersonalityTrait::Openness => self.openness,
            PersonalityTrait::Conscientiousness => self.conscientiousness,
            PersonalityTrait::Agreeableness => self.agreeableness,
        }
    }

    /// Sentences in E, O, C, A order.
    pub fn sentences(&self) -> [&'static str; 4] {
        PersonalityTrait::ALL.map(|t| t.sentence(self.degree(t)))
    }
}
