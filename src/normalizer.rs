use crate::types::{NoisePolicy, BOUNDARY};

const ASCII_PUNCT: &str = ",.<>/?:;'\"[]{}()\\|~!@#$%^&*-_=+`";
const CJK_PUNCT: &str = "，。《》、？：；“”‘’｛｝【】（）…￥！—┄－「」『』〈〉·～";

/// Normalized text. Every maximal noise run has been replaced by one
/// [`BOUNDARY`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Corpus {
    chars: Vec<char>,
}

impl Corpus {
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn is_boundary(&self, ix: usize) -> bool {
        self.chars[ix] == BOUNDARY
    }

    pub fn as_string(&self) -> String {
        self.chars.iter().collect()
    }
}

pub(crate) fn is_noise(ch: char, policy: NoisePolicy) -> bool {
    if ch.is_whitespace() || ASCII_PUNCT.contains(ch) || CJK_PUNCT.contains(ch) {
        return true;
    }
    if ch.is_ascii_digit() {
        return !policy.treat_digits_as_content;
    }
    if ch.is_ascii_alphabetic() {
        return !policy.treat_latin_as_content;
    }
    false
}

pub fn normalize(text: &str, policy: NoisePolicy) -> Corpus {
    let mut chars = Vec::with_capacity(text.len() / 3 + 1);
    let mut in_noise = false;
    for ch in text.chars() {
        if is_noise(ch, policy) {
            if !in_noise {
                chars.push(BOUNDARY);
                in_noise = true;
            }
        } else {
            chars.push(ch);
            in_noise = false;
        }
    }
    Corpus { chars }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noise_runs_collapse_to_one_boundary() {
        let corpus = normalize("十四，，十四 。\n四十", NoisePolicy::default());
        assert_eq!(corpus.as_string(), "十四 十四 四十");
    }

    #[test]
    fn latin_letters_are_noise_unless_enabled() {
        let text = "用ABC做";
        assert_eq!(normalize(text, NoisePolicy::default()).as_string(), "用 做");
        let policy = NoisePolicy {
            treat_latin_as_content: true,
            ..NoisePolicy::default()
        };
        assert_eq!(normalize(text, policy).as_string(), "用ABC做");
    }

    #[test]
    fn digit_policy_controls_digit_runs() {
        let text = "第2024年";
        assert_eq!(normalize(text, NoisePolicy::default()).as_string(), "第2024年");
        let policy = NoisePolicy {
            treat_digits_as_content: false,
            ..NoisePolicy::default()
        };
        assert_eq!(normalize(text, policy).as_string(), "第 年");
    }

    #[test]
    fn leading_and_trailing_noise_become_single_markers() {
        let corpus = normalize("  天气！", NoisePolicy::default());
        assert_eq!(corpus.as_string(), " 天气 ");
        assert!(corpus.is_boundary(0));
        assert!(corpus.is_boundary(3));
    }

    #[test]
    fn empty_text_is_empty_corpus() {
        assert!(normalize("", NoisePolicy::default()).is_empty());
    }
}
