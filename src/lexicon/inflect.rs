//! Re-inflection of base forms to Penn Treebank tags.
//!
//! Irregular forms come from fixed tables; everything else goes through
//! the regular English spelling rules (`-es`, `-ies`, e-dropping,
//! consonant doubling).

/// Generates the surface form of a base word for a fine-grained tag.
pub trait Inflector: Send + Sync {
    /// Inflected form, or `None` if no single-token form can be generated.
    fn try_inflect(&self, base: &str, tag: &str) -> Option<String>;

    /// Inflected form, falling back to `base` unchanged.
    fn inflect(&self, base: &str, tag: &str) -> String {
        self.try_inflect(base, tag)
            .unwrap_or_else(|| base.to_string())
    }
}

/// (base, past, past participle)
const IRREGULAR_VERBS: &[(&str, &str, &str)] = &[
    ("arise", "arose", "arisen"),
    ("awake", "awoke", "awoken"),
    ("be", "was", "been"),
    ("bear", "bore", "borne"),
    ("beat", "beat", "beaten"),
    ("become", "became", "become"),
    ("begin", "began", "begun"),
    ("bend", "bent", "bent"),
    ("bind", "bound", "bound"),
    ("bite", "bit", "bitten"),
    ("bleed", "bled", "bled"),
    ("blow", "blew", "blown"),
    ("break", "broke", "broken"),
    ("breed", "bred", "bred"),
    ("bring", "brought", "brought"),
    ("build", "built", "built"),
    ("burst", "burst", "burst"),
    ("buy", "bought", "bought"),
    ("cast", "cast", "cast"),
    ("catch", "caught", "caught"),
    ("choose", "chose", "chosen"),
    ("cling", "clung", "clung"),
    ("come", "came", "come"),
    ("cost", "cost", "cost"),
    ("creep", "crept", "crept"),
    ("cut", "cut", "cut"),
    ("deal", "dealt", "dealt"),
    ("dig", "dug", "dug"),
    ("do", "did", "done"),
    ("draw", "drew", "drawn"),
    ("drink", "drank", "drunk"),
    ("drive", "drove", "driven"),
    ("dwell", "dwelt", "dwelt"),
    ("eat", "ate", "eaten"),
    ("fall", "fell", "fallen"),
    ("feed", "fed", "fed"),
    ("feel", "felt", "felt"),
    ("fight", "fought", "fought"),
    ("find", "found", "found"),
    ("flee", "fled", "fled"),
    ("fling", "flung", "flung"),
    ("fly", "flew", "flown"),
    ("forget", "forgot", "forgotten"),
    ("forgive", "forgave", "forgiven"),
    ("freeze", "froze", "frozen"),
    ("get", "got", "gotten"),
    ("give", "gave", "given"),
    ("go", "went", "gone"),
    ("grind", "ground", "ground"),
    ("grow", "grew", "grown"),
    ("hang", "hung", "hung"),
    ("have", "had", "had"),
    ("hear", "heard", "heard"),
    ("hide", "hid", "hidden"),
    ("hold", "held", "held"),
    ("hurt", "hurt", "hurt"),
    ("keep", "kept", "kept"),
    ("kneel", "knelt", "knelt"),
    ("know", "knew", "known"),
    ("lay", "laid", "laid"),
    ("lead", "led", "led"),
    ("leap", "leapt", "leapt"),
    ("leave", "left", "left"),
    ("lend", "lent", "lent"),
    ("let", "let", "let"),
    ("lie", "lay", "lain"),
    ("light", "lit", "lit"),
    ("lose", "lost", "lost"),
    ("make", "made", "made"),
    ("mean", "meant", "meant"),
    ("meet", "met", "met"),
    ("pay", "paid", "paid"),
    ("put", "put", "put"),
    ("quit", "quit", "quit"),
    ("read", "read", "read"),
    ("ride", "rode", "ridden"),
    ("ring", "rang", "rung"),
    ("rise", "rose", "risen"),
    ("run", "ran", "run"),
    ("say", "said", "said"),
    ("see", "saw", "seen"),
    ("seek", "sought", "sought"),
    ("sell", "sold", "sold"),
    ("send", "sent", "sent"),
    ("set", "set", "set"),
    ("shake", "shook", "shaken"),
    ("shine", "shone", "shone"),
    ("shoot", "shot", "shot"),
    ("shrink", "shrank", "shrunk"),
    ("shut", "shut", "shut"),
    ("sing", "sang", "sung"),
    ("sink", "sank", "sunk"),
    ("sit", "sat", "sat"),
    ("slay", "slew", "slain"),
    ("sleep", "slept", "slept"),
    ("slide", "slid", "slid"),
    ("smite", "smote", "smitten"),
    ("speak", "spoke", "spoken"),
    ("spend", "spent", "spent"),
    ("spin", "spun", "spun"),
    ("split", "split", "split"),
    ("spread", "spread", "spread"),
    ("stand", "stood", "stood"),
    ("steal", "stole", "stolen"),
    ("stick", "stuck", "stuck"),
    ("sting", "stung", "stung"),
    ("stink", "stank", "stunk"),
    ("strike", "struck", "struck"),
    ("strive", "strove", "striven"),
    ("swear", "swore", "sworn"),
    ("sweep", "swept", "swept"),
    ("swim", "swam", "swum"),
    ("swing", "swung", "swung"),
    ("take", "took", "taken"),
    ("teach", "taught", "taught"),
    ("tear", "tore", "torn"),
    ("tell", "told", "told"),
    ("think", "thought", "thought"),
    ("throw", "threw", "thrown"),
    ("tread", "trod", "trodden"),
    ("understand", "understood", "understood"),
    ("wake", "woke", "woken"),
    ("wear", "wore", "worn"),
    ("weave", "wove", "woven"),
    ("weep", "wept", "wept"),
    ("win", "won", "won"),
    ("withdraw", "withdrew", "withdrawn"),
    ("wring", "wrung", "wrung"),
    ("write", "wrote", "written"),
];

const IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("analysis", "analyses"),
    ("cactus", "cacti"),
    ("calf", "calves"),
    ("child", "children"),
    ("crisis", "crises"),
    ("criterion", "criteria"),
    ("deer", "deer"),
    ("elf", "elves"),
    ("fish", "fish"),
    ("foot", "feet"),
    ("fungus", "fungi"),
    ("goose", "geese"),
    ("half", "halves"),
    ("knife", "knives"),
    ("leaf", "leaves"),
    ("life", "lives"),
    ("loaf", "loaves"),
    ("louse", "lice"),
    ("man", "men"),
    ("mouse", "mice"),
    ("nucleus", "nuclei"),
    ("ox", "oxen"),
    ("person", "people"),
    ("phenomenon", "phenomena"),
    ("self", "selves"),
    ("series", "series"),
    ("sheep", "sheep"),
    ("shelf", "shelves"),
    ("species", "species"),
    ("thief", "thieves"),
    ("tooth", "teeth"),
    ("wife", "wives"),
    ("wolf", "wolves"),
    ("woman", "women"),
];

/// (base, comparative, superlative)
const IRREGULAR_COMPARATIVES: &[(&str, &str, &str)] = &[
    ("bad", "worse", "worst"),
    ("badly", "worse", "worst"),
    ("far", "farther", "farthest"),
    ("good", "better", "best"),
    ("ill", "worse", "worst"),
    ("little", "less", "least"),
    ("many", "more", "most"),
    ("much", "more", "most"),
    ("well", "better", "best"),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishInflector;

impl Inflector for EnglishInflector {
    fn try_inflect(&self, base: &str, tag: &str) -> Option<String> {
        if base.is_empty() {
            return None;
        }

        match tag {
            "NN" | "NNP" | "VB" | "JJ" | "RB" => Some(base.to_string()),
            "NNS" | "NNPS" => Some(plural(base)),
            "VBZ" => Some(third_person(base)),
            "VBP" => Some(if base == "be" { "are".to_string() } else { base.to_string() }),
            "VBG" => Some(present_participle(base)),
            "VBD" => Some(past(base, false)),
            "VBN" => Some(past(base, true)),
            "JJR" | "RBR" => graded(base, false),
            "JJS" | "RBS" => graded(base, true),
            _ => None,
        }
    }
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

fn ends_with_consonant_y(word: &str) -> bool {
    let mut rev = word.chars().rev();
    matches!((rev.next(), rev.next()), (Some('y'), Some(c)) if !is_vowel(c))
}

fn ends_with_sibilant(word: &str) -> bool {
    ["s", "x", "z", "ch", "sh"].iter().any(|s| word.ends_with(s))
}

fn syllables(word: &str) -> usize {
    let mut count = 0;
    let mut previous_vowel = false;
    for c in word.chars() {
        let vowel = is_vowel(c) || c == 'y';
        if vowel && !previous_vowel {
            count += 1;
        }
        previous_vowel = vowel;
    }
    if count > 1 && word.ends_with('e') && !word.ends_with("le") && !word.ends_with("ee") {
        count -= 1;
    }
    count.max(1)
}

/// Single-syllable consonant-vowel-consonant endings double the final
/// consonant (stop -> stopped, big -> bigger).
fn doubles_final_consonant(word: &str) -> bool {
    let chars: Vec<char> = word.chars().collect();
    if chars.len() < 3 || syllables(word) != 1 {
        return false;
    }
    let (c1, v, c2) = (chars[chars.len() - 3], chars[chars.len() - 2], chars[chars.len() - 1]);
    !is_vowel(c1) && is_vowel(v) && !is_vowel(c2) && !matches!(c2, 'w' | 'x' | 'y')
}

fn with_doubled(word: &str, suffix: &str) -> String {
    let last = word.chars().last().unwrap_or_default();
    format!("{word}{last}{suffix}")
}

fn strip_last(word: &str) -> &str {
    match word.char_indices().last() {
        Some((idx, _)) => &word[..idx],
        None => word,
    }
}

fn plural(base: &str) -> String {
    if let Some((_, plural)) = IRREGULAR_PLURALS.iter().find(|(b, _)| *b == base) {
        return plural.to_string();
    }
    if ends_with_sibilant(base) {
        format!("{base}es")
    } else if ends_with_consonant_y(base) {
        format!("{}ies", strip_last(base))
    } else {
        format!("{base}s")
    }
}

fn third_person(base: &str) -> String {
    match base {
        "be" => return "is".to_string(),
        "have" => return "has".to_string(),
        _ => {}
    }
    if ends_with_sibilant(base) || base.ends_with('o') {
        format!("{base}es")
    } else if ends_with_consonant_y(base) {
        format!("{}ies", strip_last(base))
    } else {
        format!("{base}s")
    }
}

fn present_participle(base: &str) -> String {
    if base == "be" {
        return "being".to_string();
    }
    if base.ends_with("ie") {
        return format!("{}ying", &base[..base.len() - 2]);
    }
    if base.ends_with('e') && !["ee", "ye", "oe"].iter().any(|s| base.ends_with(s)) {
        return format!("{}ing", strip_last(base));
    }
    if doubles_final_consonant(base) {
        return with_doubled(base, "ing");
    }
    format!("{base}ing")
}

fn past(base: &str, participle: bool) -> String {
    if let Some((_, past, pp)) = IRREGULAR_VERBS.iter().find(|(b, _, _)| *b == base) {
        return if participle { pp } else { past }.to_string();
    }
    if base.ends_with('e') {
        format!("{base}d")
    } else if ends_with_consonant_y(base) {
        format!("{}ied", strip_last(base))
    } else if doubles_final_consonant(base) {
        with_doubled(base, "ed")
    } else {
        format!("{base}ed")
    }
}

/// Comparative or superlative. Long adjectives take "more"/"most" and so
/// have no single-token form.
fn graded(base: &str, superlative: bool) -> Option<String> {
    if let Some((_, comparative, superl)) =
        IRREGULAR_COMPARATIVES.iter().find(|(b, _, _)| *b == base)
    {
        return Some(if superlative { superl } else { comparative }.to_string());
    }

    let count = syllables(base);
    if count > 2 || (count == 2 && !base.ends_with('y')) {
        return None;
    }

    let suffix = if superlative { "est" } else { "er" };
    Some(if base.ends_with('e') {
        format!("{}{}", base, &suffix[1..])
    } else if ends_with_consonant_y(base) {
        format!("{}i{}", strip_last(base), suffix)
    } else if doubles_final_consonant(base) {
        with_doubled(base, suffix)
    } else {
        format!("{base}{suffix}")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inflect(base: &str, tag: &str) -> String {
        EnglishInflector.inflect(base, tag)
    }

    #[test]
    fn test_base_form_tags_unchanged() {
        assert_eq!(inflect("run", "VB"), "run");
        assert_eq!(inflect("warm", "JJ"), "warm");
        assert_eq!(inflect("house", "NN"), "house");
    }

    #[test]
    fn test_plurals() {
        assert_eq!(inflect("cat", "NNS"), "cats");
        assert_eq!(inflect("box", "NNS"), "boxes");
        assert_eq!(inflect("church", "NNS"), "churches");
        assert_eq!(inflect("city", "NNS"), "cities");
        assert_eq!(inflect("day", "NNS"), "days");
        assert_eq!(inflect("child", "NNS"), "children");
        assert_eq!(inflect("wolf", "NNS"), "wolves");
    }

    #[test]
    fn test_third_person() {
        assert_eq!(inflect("run", "VBZ"), "runs");
        assert_eq!(inflect("go", "VBZ"), "goes");
        assert_eq!(inflect("fly", "VBZ"), "flies");
        assert_eq!(inflect("wash", "VBZ"), "washes");
        assert_eq!(inflect("have", "VBZ"), "has");
        assert_eq!(inflect("be", "VBZ"), "is");
    }

    #[test]
    fn test_present_participle() {
        assert_eq!(inflect("run", "VBG"), "running");
        assert_eq!(inflect("jog", "VBG"), "jogging");
        assert_eq!(inflect("sprint", "VBG"), "sprinting");
        assert_eq!(inflect("make", "VBG"), "making");
        assert_eq!(inflect("see", "VBG"), "seeing");
        assert_eq!(inflect("die", "VBG"), "dying");
        assert_eq!(inflect("be", "VBG"), "being");
        assert_eq!(inflect("snow", "VBG"), "snowing");
    }

    #[test]
    fn test_past_forms() {
        assert_eq!(inflect("run", "VBD"), "ran");
        assert_eq!(inflect("run", "VBN"), "run");
        assert_eq!(inflect("write", "VBN"), "written");
        assert_eq!(inflect("walk", "VBD"), "walked");
        assert_eq!(inflect("hope", "VBD"), "hoped");
        assert_eq!(inflect("cry", "VBD"), "cried");
        assert_eq!(inflect("stop", "VBD"), "stopped");
        assert_eq!(inflect("play", "VBD"), "played");
    }

    #[test]
    fn test_comparatives() {
        assert_eq!(inflect("warm", "JJR"), "warmer");
        assert_eq!(inflect("hot", "JJR"), "hotter");
        assert_eq!(inflect("large", "JJS"), "largest");
        assert_eq!(inflect("happy", "JJR"), "happier");
        assert_eq!(inflect("good", "JJS"), "best");
        assert_eq!(inflect("fast", "RBR"), "faster");
    }

    #[test]
    fn test_long_adjectives_have_no_graded_form() {
        assert_eq!(EnglishInflector.try_inflect("beautiful", "JJR"), None);
        assert_eq!(EnglishInflector.try_inflect("feverish", "JJS"), None);
        assert_eq!(inflect("feverish", "JJS"), "feverish");
    }

    #[test]
    fn test_unknown_tag_keeps_base() {
        assert_eq!(EnglishInflector.try_inflect("warm", "IN"), None);
        assert_eq!(inflect("warm", "IN"), "warm");
    }

    #[test]
    fn test_syllables() {
        assert_eq!(syllables("warm"), 1);
        assert_eq!(syllables("happy"), 2);
        assert_eq!(syllables("large"), 1);
        assert_eq!(syllables("feverish"), 3);
        assert_eq!(syllables("gentle"), 2);
    }
}
