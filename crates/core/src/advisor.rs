//! Rating advisor (Module H): given a target rating, reports whether it
//! is reachable by editing down, which dimensions and scenes are
//! responsible, and a prioritized set of scene-level recommendations.
//!
//! The advisor's per-rating ceiling table is deliberately a second,
//! separately tuned surface from the cascade in [`crate::aggregate`] —
//! "what does it take to hit 12+" is a different question from "what
//! rating does this already have".

use crate::aggregate::{cascade, AggregateScores};
use crate::model::ScoredScene;
use crate::units::Rating;

/// Language for templated problem-scene suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    En,
    Ru,
}

impl Default for Language {
    fn default() -> Self {
        Language::En
    }
}

/// How urgently a gap needs addressing to reach the target rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

fn priority_for_gap(gap: f64) -> Priority {
    if gap > 0.5 {
        Priority::Critical
    } else if gap > 0.3 {
        Priority::High
    } else if gap > 0.15 {
        Priority::Medium
    } else {
        Priority::Low
    }
}

/// A single dimension whose current aggregate exceeds the target's
/// tolerance, sorted by `gap` descending.
#[derive(Debug, Clone, PartialEq)]
pub struct Gap {
    pub dimension: String,
    pub current: f64,
    pub target: f64,
    pub gap: f64,
    pub priority: Priority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

fn severity_for_excess(total_excess: f64) -> Severity {
    if total_excess > 1.5 {
        Severity::Critical
    } else if total_excess > 0.8 {
        Severity::High
    } else if total_excess > 0.4 {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// A scene whose per-dimension scores individually exceed what the
/// target tolerates, with a severity bucket and localized suggestions.
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemScene {
    pub scene_id: u32,
    pub severity: Severity,
    pub total_excess: f64,
    pub preview: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    RemoveScene,
    RewriteScene,
    ReduceContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendationEffort {
    Easy,
    Medium,
    Hard,
}

/// One ranked, actionable edit for a single scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub scene_id: u32,
    pub action: ActionKind,
    pub effort: RecommendationEffort,
    pub impact: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffortEstimate {
    Minimal,
    Moderate,
    Significant,
    Extensive,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdvisorReport {
    pub target: Rating,
    pub current: Rating,
    pub is_achievable: bool,
    pub confidence: f64,
    pub gaps: Vec<Gap>,
    pub problem_scenes: Vec<ProblemScene>,
    pub recommendations: Vec<Recommendation>,
    pub effort_estimate: EffortEstimate,
    pub alternative_targets: Vec<Rating>,
}

/// Per-dimension ceiling a target rating tolerates. Dimensions not named
/// explicitly in spec's table for a tier carry forward the previous
/// tier's ceiling (0+ starts every dimension at zero).
struct Ceiling {
    violence: f64,
    gore: f64,
    sex_act: f64,
    nudity: f64,
    profanity: f64,
    drugs: f64,
    child_risk: f64,
}

fn ceiling_for(target: Rating) -> Ceiling {
    match target {
        Rating::Zero => Ceiling {
            violence: 0.0,
            gore: 0.0,
            sex_act: 0.0,
            nudity: 0.0,
            profanity: 0.0,
            drugs: 0.0,
            child_risk: 0.0,
        },
        Rating::Six => Ceiling {
            violence: 0.2,
            gore: 0.0,
            sex_act: 0.0,
            nudity: 0.0,
            profanity: 0.1,
            drugs: 0.0,
            child_risk: 0.1,
        },
        Rating::Twelve => Ceiling {
            violence: 0.4,
            gore: 0.2,
            sex_act: 0.0,
            nudity: 0.2,
            profanity: 0.3,
            drugs: 0.2,
            child_risk: 0.2,
        },
        Rating::Sixteen => Ceiling {
            violence: 0.6,
            gore: 0.4,
            sex_act: 0.3,
            nudity: 0.5,
            profanity: 0.6,
            drugs: 0.5,
            child_risk: 0.4,
        },
        Rating::Eighteen => Ceiling {
            violence: 1.0,
            gore: 1.0,
            sex_act: 1.0,
            nudity: 1.0,
            profanity: 1.0,
            drugs: 1.0,
            child_risk: 1.0,
        },
    }
}

fn dims(aggregate: &AggregateScores, ceiling: &Ceiling) -> [(&'static str, f64, f64); 7] {
    [
        ("violence", aggregate.violence, ceiling.violence),
        ("gore", aggregate.gore, ceiling.gore),
        ("sex_act", aggregate.sex_act, ceiling.sex_act),
        ("nudity", aggregate.nudity, ceiling.nudity),
        ("profanity", aggregate.profanity, ceiling.profanity),
        ("drugs", aggregate.drugs, ceiling.drugs),
        ("child_risk", aggregate.child_risk, ceiling.child_risk),
    ]
}

/// Dimensions whose current aggregate exceeds `ceiling`, sorted by gap
/// descending.
fn compute_gaps(aggregate: &AggregateScores, ceiling: &Ceiling) -> Vec<Gap> {
    let mut gaps: Vec<Gap> = dims(aggregate, ceiling)
        .into_iter()
        .filter_map(|(name, current, target)| {
            let gap = current - target;
            (gap > 0.0).then(|| Gap {
                dimension: name.to_string(),
                current,
                target,
                gap,
                priority: priority_for_gap(gap),
            })
        })
        .collect();
    gaps.sort_by(|a, b| b.gap.partial_cmp(&a.gap).unwrap());
    gaps
}

/// `max violation > 0.5 => 0.3; > 0.3 => 0.5; avg > 0.2 => 0.7; else 0.9`.
fn confidence_from_gaps(gaps: &[Gap]) -> f64 {
    if gaps.is_empty() {
        return 0.9;
    }
    let max_violation = gaps.iter().map(|g| g.gap).fold(0.0_f64, f64::max);
    let avg_violation = gaps.iter().map(|g| g.gap).sum::<f64>() / gaps.len() as f64;
    if max_violation > 0.5 {
        0.3
    } else if max_violation > 0.3 {
        0.5
    } else if avg_violation > 0.2 {
        0.7
    } else {
        0.9
    }
}

fn suggestion_for(dimension: &str, lang: Language) -> String {
    match (dimension, lang) {
        ("violence", Language::En) => "soften or cut the explicit violent action".to_string(),
        ("violence", Language::Ru) => "смягчите или сократите сцены насилия".to_string(),
        ("gore", Language::En) => "remove or soften graphic gore and injury detail".to_string(),
        ("gore", Language::Ru) => "уберите или смягчите описания увечий и крови".to_string(),
        ("sex_act", Language::En) => "cut or fade the explicit sexual content".to_string(),
        ("sex_act", Language::Ru) => "сократите или уберите откровенные сексуальные сцены".to_string(),
        ("nudity", Language::En) => "reduce or remove nudity".to_string(),
        ("nudity", Language::Ru) => "сократите или уберите сцены обнажения".to_string(),
        ("profanity", Language::En) => "replace strong profanity with milder language".to_string(),
        ("profanity", Language::Ru) => "замените грубую лексику на более мягкую".to_string(),
        ("drugs", Language::En) => "reduce the depiction of drug use".to_string(),
        ("drugs", Language::Ru) => "сократите изображение употребления наркотиков".to_string(),
        ("child_risk", Language::En) => "reduce scenes that place a minor at risk".to_string(),
        ("child_risk", Language::Ru) => {
            "сократите сцены, где несовершеннолетний подвергается риску".to_string()
        }
        (other, _) => format!("address the {other} content in this scene"),
    }
}

const PROBLEM_SCENE_PREVIEW_CHARS: usize = 200;

fn preview(sample_text: &str, max_chars: usize) -> String {
    sample_text.chars().take(max_chars).collect()
}

/// Scenes whose per-dimension scores individually exceed `ceiling`,
/// sorted by total excess descending.
fn problem_scenes(scenes: &[ScoredScene], ceiling: &Ceiling, lang: Language) -> Vec<ProblemScene> {
    let mut flagged: Vec<ProblemScene> = scenes
        .iter()
        .filter_map(|scene| {
            let scores = [
                ("violence", scene.scores.violence.get(), ceiling.violence),
                ("gore", scene.scores.gore.get(), ceiling.gore),
                ("sex_act", scene.scores.sex_act.get(), ceiling.sex_act),
                ("nudity", scene.scores.nudity.get(), ceiling.nudity),
                ("profanity", scene.scores.profanity.get(), ceiling.profanity),
                ("drugs", scene.scores.drugs.get(), ceiling.drugs),
                ("child_risk", scene.scores.child_risk.get(), ceiling.child_risk),
            ];
            let exceeded: Vec<(&str, f64)> = scores
                .into_iter()
                .filter_map(|(name, current, cap)| (current > cap).then(|| (name, current - cap)))
                .collect();
            if exceeded.is_empty() {
                return None;
            }
            let total_excess: f64 = exceeded.iter().map(|(_, excess)| excess).sum();
            let suggestions = exceeded.iter().map(|(name, _)| suggestion_for(name, lang)).collect();
            Some(ProblemScene {
                scene_id: scene.scene_id,
                severity: severity_for_excess(total_excess),
                total_excess,
                preview: preview(&scene.sample_text, PROBLEM_SCENE_PREVIEW_CHARS),
                suggestions,
            })
        })
        .collect();
    flagged.sort_by(|a, b| b.total_excess.partial_cmp(&a.total_excess).unwrap());
    flagged
}

/// How many of the worst problem scenes receive a scene-level
/// recommendation, mirroring the top-trigger-scene convention in §4.E.
const TOP_PROBLEM_SCENES: usize = 5;

fn max_issue(scene: &ScoredScene) -> f64 {
    [
        scene.scores.violence.get(),
        scene.scores.gore.get(),
        scene.scores.sex_act.get(),
        scene.scores.nudity.get(),
        scene.scores.profanity.get(),
        scene.scores.drugs.get(),
        scene.scores.child_risk.get(),
    ]
    .into_iter()
    .fold(0.0_f64, f64::max)
}

/// One recommendation per top problem scene: `remove_scene` when the
/// scene's single worst dimension is severe, `rewrite_scene` when it's
/// moderate, `reduce_content` otherwise. Sorted by impact descending.
fn recommendations_for(scenes: &[ScoredScene], problems: &[ProblemScene]) -> Vec<Recommendation> {
    let mut recs: Vec<Recommendation> = problems
        .iter()
        .take(TOP_PROBLEM_SCENES)
        .filter_map(|problem| {
            let scene = scenes.iter().find(|s| s.scene_id == problem.scene_id)?;
            let issue = max_issue(scene);
            let (action, effort, impact) = if issue >= 0.6 {
                (ActionKind::RemoveScene, RecommendationEffort::Easy, (1.2 * issue).min(1.0))
            } else if issue >= 0.3 {
                (ActionKind::RewriteScene, RecommendationEffort::Hard, 0.9 * issue)
            } else {
                (ActionKind::ReduceContent, RecommendationEffort::Medium, 0.7 * issue)
            };
            Some(Recommendation {
                scene_id: scene.scene_id,
                action,
                effort,
                impact,
            })
        })
        .collect();
    recs.sort_by(|a, b| b.impact.partial_cmp(&a.impact).unwrap());
    recs
}

/// `3*critical-scenes + 2*high-scenes + 2*critical-gaps`;
/// `>15 extensive, >10 significant, >5 moderate, else minimal`.
fn effort_estimate(gaps: &[Gap], problems: &[ProblemScene]) -> EffortEstimate {
    let critical_scenes = problems.iter().filter(|p| p.severity == Severity::Critical).count();
    let high_scenes = problems.iter().filter(|p| p.severity == Severity::High).count();
    let critical_gaps = gaps.iter().filter(|g| g.priority == Priority::Critical).count();

    let score = 3 * critical_scenes + 2 * high_scenes + 2 * critical_gaps;
    if score > 15 {
        EffortEstimate::Extensive
    } else if score > 10 {
        EffortEstimate::Significant
    } else if score > 5 {
        EffortEstimate::Moderate
    } else {
        EffortEstimate::Minimal
    }
}

/// The next-lower ratings below `target` (closest first) whose gap count
/// against the current aggregate is at most 2, capped at two suggestions.
fn alternative_targets(aggregate: &AggregateScores, target: Rating) -> Vec<Rating> {
    target
        .lower_than()
        .into_iter()
        .filter(|r| compute_gaps(aggregate, &ceiling_for(*r)).len() <= 2)
        .take(2)
        .collect()
}

/// Produce a full advisory report for reaching `target`.
///
/// `current` is the script's own predicted rating; pass `None` to derive
/// it from `aggregate` via the rating cascade. This tool can only reduce
/// measured risk, so a target less strict than the script's current
/// rating can never be reached by editing down — only a target at or
/// below the current rating is achievable.
pub fn advise(
    aggregate: &AggregateScores,
    scenes: &[ScoredScene],
    target: Rating,
    current: Option<Rating>,
    lang: Language,
) -> AdvisorReport {
    let current = current.unwrap_or_else(|| cascade(aggregate).rating);
    let is_achievable = target <= current;

    let ceiling = ceiling_for(target);
    let gaps = compute_gaps(aggregate, &ceiling);
    let confidence = if is_achievable { confidence_from_gaps(&gaps) } else { 0.0 };

    let problems = problem_scenes(scenes, &ceiling, lang);
    let recommendations = recommendations_for(scenes, &problems);
    let effort = effort_estimate(&gaps, &problems);
    let alternatives = if is_achievable { Vec::new() } else { alternative_targets(aggregate, target) };

    AdvisorReport {
        target,
        current,
        is_achievable,
        confidence,
        gaps,
        problem_scenes: problems,
        recommendations,
        effort_estimate: effort,
        alternative_targets: alternatives,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::DimensionScores;
    use crate::units::UnitScore;

    fn scene_with(id: u32, weight: f64, scores: DimensionScores) -> ScoredScene {
        ScoredScene {
            scene_id: id,
            heading: String::new(),
            scores,
            weight,
            sample_text: "a sample scene for advisor tests, repeated content follows".to_string(),
        }
    }

    #[test]
    fn already_compliant_script_is_achievable_with_high_confidence() {
        let report = advise(&AggregateScores::default(), &[], Rating::Twelve, None, Language::En);
        assert!(report.is_achievable);
        assert_eq!(report.confidence, 0.9);
        assert!(report.gaps.is_empty());
    }

    #[test]
    fn target_above_current_is_not_achievable() {
        let aggregate = AggregateScores::default();
        let report = advise(&aggregate, &[], Rating::Eighteen, Some(Rating::Six), Language::En);
        assert!(!report.is_achievable);
        assert_eq!(report.confidence, 0.0);
    }

    #[test]
    fn lowering_from_eighteen_to_six_is_achievable_but_low_confidence() {
        // Scenario 8: current 18+, target 6+, sex_act = 0.9.
        let aggregate = AggregateScores {
            sex_act: 0.9,
            ..Default::default()
        };
        let report = advise(&aggregate, &[], Rating::Six, Some(Rating::Eighteen), Language::En);
        assert!(report.is_achievable);
        assert_eq!(report.confidence, 0.3);
        assert!(report.gaps.iter().any(|g| g.dimension == "sex_act" && g.priority == Priority::Critical));
    }

    #[test]
    fn critical_gap_produces_a_remove_scene_recommendation() {
        let aggregate = AggregateScores {
            sex_act: 0.9,
            ..Default::default()
        };
        let scene = scene_with(
            0,
            0.9,
            DimensionScores {
                sex_act: UnitScore::new(0.9),
                ..Default::default()
            },
        );
        let report = advise(&aggregate, &[scene], Rating::Six, Some(Rating::Eighteen), Language::En);
        assert_eq!(report.recommendations.len(), 1);
        assert_eq!(report.recommendations[0].action, ActionKind::RemoveScene);
    }

    #[test]
    fn alternative_targets_are_suggested_when_not_achievable() {
        let aggregate = AggregateScores::default();
        let report = advise(&aggregate, &[], Rating::Eighteen, Some(Rating::Six), Language::En);
        assert!(!report.alternative_targets.is_empty());
        assert!(report.alternative_targets.len() <= 2);
    }

    #[test]
    fn heavy_gap_and_critical_scenes_drive_extensive_effort() {
        let aggregate = AggregateScores {
            violence: 0.95,
            gore: 0.95,
            sex_act: 0.95,
            nudity: 0.95,
            profanity: 0.95,
            drugs: 0.95,
            child_risk: 0.95,
            ..Default::default()
        };
        let scenes: Vec<ScoredScene> = (0..4)
            .map(|i| {
                scene_with(
                    i,
                    0.9,
                    DimensionScores {
                        violence: UnitScore::new(0.95),
                        gore: UnitScore::new(0.95),
                        sex_act: UnitScore::new(0.95),
                        nudity: UnitScore::new(0.95),
                        profanity: UnitScore::new(0.95),
                        drugs: UnitScore::new(0.95),
                        child_risk: UnitScore::new(0.95),
                    },
                )
            })
            .collect();
        let report = advise(&aggregate, &scenes, Rating::Zero, Some(Rating::Eighteen), Language::En);
        assert_eq!(report.effort_estimate, EffortEstimate::Extensive);
    }

    #[test]
    fn localized_suggestions_switch_by_language() {
        let aggregate = AggregateScores {
            violence: 0.9,
            ..Default::default()
        };
        let scene = scene_with(
            0,
            0.9,
            DimensionScores {
                violence: UnitScore::new(0.9),
                ..Default::default()
            },
        );
        let en = advise(&aggregate, &[scene.clone()], Rating::Zero, Some(Rating::Eighteen), Language::En);
        let ru = advise(&aggregate, &[scene], Rating::Zero, Some(Rating::Eighteen), Language::Ru);
        assert_ne!(en.problem_scenes[0].suggestions, ru.problem_scenes[0].suggestions);
    }
}
