//! Questions asked during disambiguation
//!
//! A [`Question`] renders its own prompt and turns an answer into a list of
//! [`Effect`]s. It never touches the engine directly; the engine applies the
//! effects, which keeps every transition visible in one place.

use crate::accessor::{Accessor, FieldValue};
use crate::candidate::Candidate;
use crate::constraint::Constraint;
use crate::phrases::{PhraseRules, Reading, Transit};

/// State change requested by an answer
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// The user is travelling; stays set for the rest of the session
    SetOnTheRoad,
    /// Replace the whole query queue
    ResetQuery(Vec<String>),
    /// Append a refinement to the query queue
    Enqueue(String),
    /// Add a constraint to the memory
    Constrain(Constraint),
    /// The location is found; terminal
    Resolve(Candidate),
}

/// One unit of dialogue
#[derive(Debug, Clone, PartialEq)]
pub enum Question {
    /// Initial question when the user is stationary
    WhereAreYou,
    /// Initial question once the user is known to be travelling
    WhereAreYouGoing,
    /// Nothing matched; ask the user to describe the place again
    CouldntUnderstand,
    /// Exactly one candidate left
    IsThisHere(Candidate),
    /// Several candidates that differ in `feature`; asks about the first one
    IsThisInFeature {
        feature: Accessor,
        options: Vec<Candidate>,
    },
    /// Several candidates without a distinguishing feature
    WhichOneDoYouMean(Vec<Candidate>),
}

impl Question {
    /// Short name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Question::WhereAreYou => "where_are_you",
            Question::WhereAreYouGoing => "where_are_you_going",
            Question::CouldntUnderstand => "couldnt_understand",
            Question::IsThisHere(_) => "is_this_here",
            Question::IsThisInFeature { .. } => "is_this_in_feature",
            Question::WhichOneDoYouMean(_) => "which_one_do_you_mean",
        }
    }

    /// Prompt text; phrasing depends on whether the user is on the road
    pub fn prompt(&self, on_the_road: bool) -> String {
        match self {
            Question::WhereAreYou => "Waar ben je?".to_string(),
            Question::WhereAreYouGoing => "Waar ga je naar toe?".to_string(),
            Question::CouldntUnderstand => format!(
                "Ik weet niet waar je {}.. kan je het nog een keer uitleggen?",
                if on_the_road { "naar toe gaat" } else { "bent" }
            ),
            Question::IsThisHere(location) => {
                if on_the_road {
                    format!("Ga je naar {}?", location.display_name)
                } else {
                    format!("Ben je op {}?", location.display_name)
                }
            }
            Question::IsThisInFeature { feature, options } => {
                match options.first().map(|best| feature.apply(best)) {
                    Some(FieldValue::Present(value)) => format!("In {}?", value),
                    _ => format!("Zonder {}?", feature_noun(feature)),
                }
            }
            Question::WhichOneDoYouMean(options) => {
                let mut text = "Welke bedoel je?".to_string();
                for (n, option) in options.iter().enumerate() {
                    text.push_str(&format!("\n{}. {}", n + 1, option.display_name));
                }
                text
            }
        }
    }

    /// Interpret an answer
    ///
    /// Every answer produces progress: unparseable text is taken as the
    /// payload itself, and a failed pick counts as a "no".
    pub fn interpret(&self, answer: &str, rules: &PhraseRules) -> Vec<Effect> {
        let reading = rules.read(answer);
        match self {
            Question::WhereAreYou | Question::CouldntUnderstand => interpret_whereabouts(reading),
            Question::WhereAreYouGoing => reading
                .heading
                .map(|phrase| vec![Effect::ResetQuery(vec![phrase])])
                .unwrap_or_default(),
            Question::IsThisHere(location) => {
                if reading.affirmative {
                    return vec![Effect::Resolve(location.clone())];
                }
                let mut effects = vec![exclude(location)];
                if let Some(refinement) = reading.residual {
                    effects.push(Effect::Enqueue(refinement));
                }
                effects
            }
            Question::IsThisInFeature { feature, options } => {
                let Some(best) = options.first() else {
                    return Vec::new();
                };
                let value = feature.apply(best);
                if reading.affirmative {
                    return vec![Effect::Constrain(Constraint::equal(feature.clone(), value))];
                }
                let mut effects = Vec::new();
                if let Some(refinement) = reading.residual {
                    effects.push(Effect::Enqueue(refinement));
                }
                effects.push(exclude(best));
                effects.push(Effect::Constrain(Constraint::not_equal(feature.clone(), value)));
                effects
            }
            Question::WhichOneDoYouMean(options) => match pick(answer, options.len()) {
                Some(index) => vec![Effect::Resolve(options[index].clone())],
                None => options.iter().map(exclude).collect(),
            },
        }
    }
}

/// Answer to "where are you": a place, or travel plans
fn interpret_whereabouts(reading: Reading) -> Vec<Effect> {
    if !reading.en_route {
        return reading
            .location
            .map(|place| vec![Effect::ResetQuery(vec![place])])
            .unwrap_or_default();
    }

    let mut effects = vec![Effect::SetOnTheRoad];
    if reading.transit == Some(Transit::Train) {
        effects.push(Effect::Constrain(Constraint::equal(Accessor::path(["class"]), "railway")));
        effects.push(Effect::Constrain(Constraint::equal(Accessor::path(["type"]), "station")));
    }
    if let Some(destination) = reading.destination {
        effects.push(Effect::ResetQuery(vec![destination]));
    }
    effects
}

fn exclude(candidate: &Candidate) -> Effect {
    Effect::Constrain(Constraint::not_equal(
        Accessor::identifier(),
        candidate.place_id.as_str(),
    ))
}

/// 1-based pick from a numbered list
fn pick(answer: &str, count: usize) -> Option<usize> {
    let number: usize = answer.trim().trim_end_matches('.').parse().ok()?;
    (1..=count).contains(&number).then(|| number - 1)
}

fn feature_noun(feature: &Accessor) -> &'static str {
    if *feature == Accessor::city() {
        "plaatsnaam"
    } else if *feature == Accessor::street() {
        "straatnaam"
    } else {
        "naam"
    }
}
