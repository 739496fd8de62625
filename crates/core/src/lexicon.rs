//! Frozen dictionaries of tagged patterns per content dimension, plus the
//! exclusion and context lists the feature extractor consults.
//!
//! Patterns are compiled once into a process-wide [`Lexicon`] and shared
//! read-only thereafter: loaded once, treated as immutable.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Result;

/// The seven content-risk dimensions scored per scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dimension {
    Violence,
    Gore,
    SexAct,
    Nudity,
    Profanity,
    Drugs,
    ChildRisk,
}

impl Dimension {
    pub const ALL: [Dimension; 7] = [
        Dimension::Violence,
        Dimension::Gore,
        Dimension::SexAct,
        Dimension::Nudity,
        Dimension::Profanity,
        Dimension::Drugs,
        Dimension::ChildRisk,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Dimension::Violence => "violence",
            Dimension::Gore => "gore",
            Dimension::SexAct => "sex_act",
            Dimension::Nudity => "nudity",
            Dimension::Profanity => "profanity",
            Dimension::Drugs => "drugs",
            Dimension::ChildRisk => "child_risk",
        }
    }
}

/// Compiled pattern sets for a single dimension, plus any modulating lists.
pub struct Lexicon {
    violence: Vec<Regex>,
    psych_violence: Vec<Regex>,
    heroic_dampener: Vec<&'static str>,
    visceral_gate: Regex,
    gore_strict: Vec<&'static str>,
    gore_exclude: Vec<&'static str>,
    sex_act: Vec<Regex>,
    nudity: Vec<Regex>,
    profanity: Vec<Regex>,
    drugs: Vec<Regex>,
    child_mentions: Vec<Regex>,
}

fn compile_all(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("lexicon pattern must compile"))
        .collect()
}

/// English + Russian violence patterns. Word-bounded where meaningful.
const VIOLENCE_PATTERNS: &[&str] = &[
    r"(?i)\bkill\w*",
    r"(?i)\bshoot\w*",
    r"(?i)\bshot\b",
    r"(?i)\bstab\w*",
    r"(?i)\bknife\b",
    r"(?i)\bgun\w*",
    r"(?i)\bpistol\b",
    r"(?i)\brifle\b",
    r"(?i)\bexplod\w*",
    r"(?i)\bblast\w*",
    r"(?i)\battack\w*",
    r"(?i)\battack(?:ed|ing)?\b",
    r"(?i)\bbeat\w*",
    r"(?i)\bbeat(?:s|en|ing)?\b",
    r"(?i)\bcorpse\b",
    r"(?i)\bcorps(?:e|es)?\b",
    r"(?i)\brip(?:ped|s)? apart\b",
    r"(?i)\bdead\b",
    r"(?i)\bmurder\w*",
    r"(?i)\bviolence\b",
    r"(?i)\bterrorist\b",
    r"(?i)\bhostage\b",
    r"(?i)\bthug(s)?\b",
    r"(?i)\bterror\b",
    r"(?i)\bfight(ing)?\b",
    r"(?i)\bbattle(s|d)?\b",
    r"(?i)\bwar\b",
    r"(?i)\bshoot[- ]?out\b",
    r"(?i)\bexplosion\b",
    r"(?i)\bgrenade\b",
    // Russian
    r"(?i)\bубийств\w*",
    r"(?i)\bубить\b",
    r"(?i)\bстрелять\w*",
    r"(?i)\bзарезать\b",
    r"(?i)\bатаковать\b",
    r"(?i)\bизбиени\w*",
    r"(?i)\bдрак\w*",
    r"(?i)\bнасили\w*",
    r"(?i)\bоружи\w*",
];

const PSYCH_VIOLENCE_PATTERNS: &[&str] = &[
    r"(?i)\btorture\w*",
    r"(?i)\bmadness\b",
    r"(?i)\bscream\w*",
    r"(?i)\binsane\b",
    r"(?i)\basylum\b",
    r"(?i)\bterror\b",
    r"(?i)\bpanic\w*",
    r"(?i)\bsuicide\b",
    r"(?i)\bkill himself\b",
    r"(?i)\bpsychotic\b",
    r"(?i)\bmental hospital\b",
];

const HEROIC_KEYWORDS: &[&str] = &[
    "superman",
    "batman",
    "wonder woman",
    "lex luthor",
    "krypton",
    "metropolis",
    "hero",
    "villain",
    "save",
    "rescue",
    "laser",
    "fly",
    "power",
    "superpower",
    "comic",
    "adventure",
];

const GORE_STRICT: &[&str] = &[
    "blood",
    "bloody",
    "bloodied",
    "bleeding",
    "corpse",
    "wound",
    "scar",
    "injur",
    "crash",
    "burn",
    "explod",
    "guts",
    "entrails",
    "brain",
    "dead body",
    "кровь",
    "кровав",
    "кровоточ",
    "рана",
    "кишки",
];

const GORE_EXCLUDE: &[&str] = &[
    "blood oath",
    "black ink",
    "blackened tongue",
    "ink dribbl",
    "ink is now",
];

const PROFANITY_PATTERNS: &[&str] = &[
    r"(?i)\bfuck\w*\b",
    r"(?i)\bshit\b",
    r"(?i)\bmotherfucker\b",
    r"(?i)\bbitch\b",
    r"(?i)\bбля\w*\b",
    r"(?i)\bсука\b",
    r"(?i)\bхуй\w*\b",
    r"(?i)\bпизд\w*\b",
    r"(?i)\bебал\w*\b",
    r"(?i)\bдерьм\w*\b",
    r"(?i)\bговн\w*\b",
];

const DRUG_PATTERNS: &[&str] = &[
    r"(?i)\bdrug(s)?\b",
    r"(?i)\bheroin\b",
    r"(?i)\bcocaine\b",
    r"(?i)\bmarijuana\b",
    r"(?i)\bpill(s)?\b",
    r"(?i)\bweed\b",
    r"(?i)\balcohol\b",
    r"(?i)\bdrunk\b",
    r"(?i)\bcigarette\b",
    r"(?i)\bгероин\b",
    r"(?i)\bкокаин\b",
    r"(?i)\bмарихуан\w*\b",
    r"(?i)\bалкогол\w*\b",
    r"(?i)\bкурен\w*\b",
];

const CHILD_PATTERNS: &[&str] = &[
    r"(?i)\bchild\b",
    r"(?i)\bkid(s)?\b",
    r"(?i)\bson\b",
    r"(?i)\bdaughter\b",
    r"(?i)\bteen(aged)?\b",
    r"(?i)\bребен\w*",
    r"(?i)\bребён\w*",
    r"(?i)\bдет(и|ей|ям)\b",
];

const NUDITY_PATTERNS: &[&str] = &[
    r"(?i)\bbra\b",
    r"(?i)\bpanty\b|\bpanties\b",
    r"(?i)\bunderwear\b",
    r"(?i)\bnaked\b",
    r"(?i)\bskinny[- ]?dipping\b",
    r"(?i)\bголая?\b",
    r"(?i)\bнаг\w*",
];

const SEX_ACT_PATTERNS: &[&str] = &[
    r"(?i)\brape\b",
    r"(?i)\bsexual\b",
    r"(?i)\bintercourse\b",
    r"(?i)\bsex scene\b",
    r"(?i)\bmolest\w*",
    r"(?i)\borgasm\w*",
    r"(?i)\bmake love\b",
    r"(?i)\bhaving sex\b",
    r"(?i)\bsexually\b",
    r"(?i)\bизнасилов\w*",
    r"(?i)\bсексуальн\w*",
    r"(?i)\bинтим\w*",
];

impl Lexicon {
    fn build() -> Result<Self> {
        Ok(Self {
            violence: compile_all(VIOLENCE_PATTERNS),
            psych_violence: compile_all(PSYCH_VIOLENCE_PATTERNS),
            heroic_dampener: HEROIC_KEYWORDS.to_vec(),
            visceral_gate: Regex::new(r"(?i)\b(blood|gore|corpse|bleeding|wound|pain|scream)\b")?,
            gore_strict: GORE_STRICT.to_vec(),
            gore_exclude: GORE_EXCLUDE.to_vec(),
            sex_act: compile_all(SEX_ACT_PATTERNS),
            nudity: compile_all(NUDITY_PATTERNS),
            profanity: compile_all(PROFANITY_PATTERNS),
            drugs: compile_all(DRUG_PATTERNS),
            child_mentions: compile_all(CHILD_PATTERNS),
        })
    }

    pub fn global() -> &'static Lexicon {
        static LEXICON: Lazy<Lexicon> = Lazy::new(|| Lexicon::build().expect("lexicon must compile"));
        &LEXICON
    }

    pub fn violence_patterns(&self) -> &[Regex] {
        &self.violence
    }

    pub fn psych_violence_patterns(&self) -> &[Regex] {
        &self.psych_violence
    }

    pub fn sex_act_patterns(&self) -> &[Regex] {
        &self.sex_act
    }

    pub fn nudity_patterns(&self) -> &[Regex] {
        &self.nudity
    }

    pub fn profanity_patterns(&self) -> &[Regex] {
        &self.profanity
    }

    pub fn drug_patterns(&self) -> &[Regex] {
        &self.drugs
    }

    pub fn child_mention_patterns(&self) -> &[Regex] {
        &self.child_mentions
    }

    /// True if `text` contains a heroic-fiction trope keyword.
    pub fn has_heroic_dampener(&self, text: &str) -> bool {
        self.heroic_dampener.iter().any(|kw| text.contains(kw))
    }

    /// True if `text` contains at least one visceral-evidence keyword.
    pub fn has_visceral_evidence(&self, text: &str) -> bool {
        self.visceral_gate.is_match(text)
    }

    /// Count gore keyword occurrences, suppressed entirely if any exclusion
    /// substring is present anywhere in the scene.
    pub fn count_gore(&self, text: &str) -> u32 {
        if self.gore_exclude.iter().any(|ex| text.contains(ex)) {
            return 0;
        }
        self.gore_strict.iter().filter(|g| text.contains(*g)).count() as u32
    }
}

/// Sum match counts (not distinct matches) across a set of patterns.
pub fn count_matches(patterns: &[Regex], text: &str) -> u32 {
    patterns.iter().map(|p| p.find_iter(text).count() as u32).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gore_exclusion_suppresses_false_positive() {
        let lex = Lexicon::global();
        let text = "he swore a blood oath; ink dribbled on the page.".to_lowercase();
        assert_eq!(lex.count_gore(&text), 0);
    }

    #[test]
    fn gore_strict_counts_real_hits() {
        let lex = Lexicon::global();
        let text = "blood splatters across the corpse, a gruesome wound visible".to_lowercase();
        assert!(lex.count_gore(&text) > 0);
    }

    #[test]
    fn heroic_dampener_detects_superhero_tropes() {
        let lex = Lexicon::global();
        assert!(lex.has_heroic_dampener("superman fires a laser at lex luthor"));
        assert!(!lex.has_heroic_dampener("a quiet office scene"));
    }

    #[test]
    fn visceral_gate_requires_co_occurring_evidence() {
        let lex = Lexicon::global();
        assert!(lex.has_visceral_evidence("she was bleeding badly"));
        assert!(!lex.has_visceral_evidence("they had an argument"));
    }

    #[test]
    fn count_matches_sums_across_patterns_not_distinct() {
        let patterns = compile_all(&[r"(?i)\bgun\w*", r"(?i)\bshoot\w*"]);
        let text = "he pulls a gun, a second gun appears, then shoots and shoots again".to_lowercase();
        assert_eq!(count_matches(&patterns, &text), 4);
    }
}
