/*!
 * Cleanup of model output before it is embedded in a document.
 *
 * Models add preambles ("Here is the translation:") and code fences despite
 * being told not to. The catalog below strips the known artifacts; it is
 * applied until nothing changes so the result is stable under re-sanitizing.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Known output artifacts and their replacements
static ARTIFACT_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        // Whole output wrapped in a fence on one line
        (Regex::new(r"^\s*```[ \t]*([^`\n]+?)[ \t]*```\s*$").unwrap(), "$1"),
        // Whole output wrapped in an opening and a closing fence; a lone fence is content
        (
            Regex::new(r"(?s)^\s*```[\w+-]*[ \t]*\r?\n(?:(.*?)\r?\n)?[ \t]*```\s*$").unwrap(),
            "$1",
        ),
        // English
        (
            Regex::new(r"(?i)^\s*(here is|here's|below is) (the|your|my) translat(ion|ed text)( (in|to|into) [\p{L} ()]+)?\s*[:：]\s*").unwrap(),
            "",
        ),
        (Regex::new(r"(?i)^\s*(translation|translated text)( (in|to|into) [\p{L} ()]+)?\s*[:：]\s*").unwrap(), ""),
        // French
        (Regex::new(r"(?i)^\s*voici (la|votre) traduction( (en|vers l'|vers le) ?[\p{L} ]+)?\s*[:：]\s*").unwrap(), ""),
        (Regex::new(r"(?i)^\s*traduction( en [\p{L} ]+)?\s*[:：]\s*").unwrap(), ""),
        // Spanish
        (Regex::new(r"(?i)^\s*aqu[ií] (est[aá]|tienes) la traducci[oó]n( (al|en) [\p{L} ]+)?\s*[:：]\s*").unwrap(), ""),
        (Regex::new(r"(?i)^\s*traducci[oó]n( (al|en) [\p{L} ]+)?\s*[:：]\s*").unwrap(), ""),
        // German
        (Regex::new(r"(?i)^\s*hier ist die [üu]bersetzung( (ins|auf) [\p{L} ]+)?\s*[:：]\s*").unwrap(), ""),
        (Regex::new(r"(?i)^\s*[üu]bersetzung( (ins|auf) [\p{L} ]+)?\s*[:：]\s*").unwrap(), ""),
        // Italian
        (Regex::new(r"(?i)^\s*ecco la traduzione( (in|verso l') ?[\p{L} ]+)?\s*[:：]\s*").unwrap(), ""),
        (Regex::new(r"(?i)^\s*traduzione( in [\p{L} ]+)?\s*[:：]\s*").unwrap(), ""),
        // Portuguese
        (Regex::new(r"(?i)^\s*aqui est[aá] a tradu[cç][aã]o( (para o|em) [\p{L} ]+)?\s*[:：]\s*").unwrap(), ""),
        (Regex::new(r"(?i)^\s*tradu[cç][aã]o( (para o|em) [\p{L} ]+)?\s*[:：]\s*").unwrap(), ""),
        // Dutch
        (Regex::new(r"(?i)^\s*hier is de vertaling( (in het|naar het) [\p{L} ]+)?\s*[:：]\s*").unwrap(), ""),
        (Regex::new(r"(?i)^\s*vertaling\s*[:：]\s*").unwrap(), ""),
        // Chinese
        (Regex::new(r"^\s*(以下是|这是|這是)?(翻译|翻譯)(结果|結果|内容)?(如下)?\s*[:：]\s*").unwrap(), ""),
        // Japanese
        (Regex::new(r"^\s*(以下は|こちらが)?翻訳(結果|文)?(です)?\s*[:：]\s*").unwrap(), ""),
        // Trailing notes after a blank line
        (
            Regex::new(r"(?is)\n\s*\n\s*\(?(note|remarque|nota|hinweis|opmerking|注意|备注|注)\s*[:：].*$").unwrap(),
            "",
        ),
    ]
});

/// Apply every pattern once, then trim
fn sanitize_once(text: &str) -> String {
    let mut current = text.to_string();
    for (pattern, replacement) in ARTIFACT_PATTERNS.iter() {
        current = pattern.replace_all(&current, *replacement).into_owned();
    }
    current.trim().to_string()
}

/// Strip known model artifacts until the text is stable
pub fn sanitize_translation(raw: &str) -> String {
    let mut current = raw.trim().to_string();
    loop {
        let next = sanitize_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}
