//! LLM 响应解析器 - 业务能力层
//!
//! 把不受约束的自然语言响应转换为强类型的有界值：
//! - 维度单元 → 1-7 连续分数
//! - 变量单元 → 0/1 标记 + 理由文本
//!
//! 纯函数，无 I/O。解析失败是可恢复错误：同一单元重新调用一次
//! 可能得到可解析的文本，重试逻辑在 unit_caller 里。

use crate::error::ParseError;
use once_cell::sync::Lazy;
use regex::Regex;

/// 小数模式（如 5.2）
static DECIMAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d+\.\d+)\b").unwrap());

/// 整数模式（如 5）
static INTEGER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d+)\b").unwrap());

/// `<reasoning>...</reasoning>` 块（大小写不敏感，可跨多行）
static REASONING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<reasoning>(.*?)</reasoning>").unwrap());

/// `<answer>...</answer>` 块（大小写不敏感，可跨多行）
static ANSWER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<answer>(.*?)</answer>").unwrap());

/// 独立的 "1" token
static TOKEN_ONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b1\b").unwrap());

/// 独立的 "0" token
static TOKEN_ZERO_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b0\b").unwrap());

/// 英文数字单词 → 分数，按 one..seven 顺序扫描
const WRITTEN_NUMBERS: [(&str, f64); 7] = [
    ("one", 1.0),
    ("two", 2.0),
    ("three", 3.0),
    ("four", 4.0),
    ("five", 5.0),
    ("six", 6.0),
    ("seven", 7.0),
];

/// 解析维度单元的连续分数
///
/// 解析顺序：
/// 1. 小数模式（"5.2"）
/// 2. 整数模式（"5"、"The score is 5"）
/// 3. 英文数字单词（"five"）
///
/// 数字一律钳制到 [1.0, 7.0]——越界数值（"7.5"、"-1"）是静默修正，
/// 不是错误。完全提取不到分数才返回 `ParseError`。
pub fn parse_continuous(text: &str) -> Result<f64, ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseError::EmptyResponse);
    }

    // 先找小数，再找整数
    for re in [&*DECIMAL_RE, &*INTEGER_RE] {
        if let Some(caps) = re.captures(trimmed) {
            if let Ok(score) = caps[1].parse::<f64>() {
                return Ok(score.clamp(1.0, 7.0));
            }
        }
    }

    // 尝试英文数字单词（one, two, three...）
    let text_lower = trimmed.to_lowercase();
    for (word, num) in WRITTEN_NUMBERS {
        if text_lower.contains(word) {
            return Ok(num);
        }
    }

    Err(ParseError::NoScore {
        response: trimmed.to_string(),
    })
}

/// 解析变量单元的二元答案
///
/// 优先读取 `<answer>` 标签；没有标签时退回到全文扫描。
/// `<reasoning>` 块缺失时理由为空字符串，不算错误。
pub fn parse_binary(text: &str) -> Result<(u8, String), ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseError::EmptyResponse);
    }

    let reasoning = REASONING_RE
        .captures(trimmed)
        .map(|caps| caps[1].trim().to_string())
        .unwrap_or_default();

    if let Some(caps) = ANSWER_RE.captures(trimmed) {
        let inner = caps[1].trim().to_string();
        let inner_lower = inner.to_lowercase();

        if inner_lower.contains('1') || contains_word(&inner_lower, "one") {
            return Ok((1, reasoning));
        }
        if inner_lower.contains('0')
            || contains_word(&inner_lower, "zero")
            || contains_word(&inner_lower, "absent")
        {
            return Ok((0, reasoning));
        }

        return Err(ParseError::UnparseableAnswerTag { inner });
    }

    // 没有 <answer> 标签，扫描全文
    let text_lower = trimmed.to_lowercase();
    if TOKEN_ONE_RE.is_match(&text_lower)
        || contains_word(&text_lower, "present")
        || contains_word(&text_lower, "yes")
    {
        return Ok((1, reasoning));
    }
    if TOKEN_ZERO_RE.is_match(&text_lower)
        || contains_word(&text_lower, "absent")
        || contains_word(&text_lower, "no")
    {
        return Ok((0, reasoning));
    }

    Err(ParseError::NoBinaryAnswer {
        response: trimmed.to_string(),
    })
}

/// 按单词边界匹配，避免 "no" 命中 "know" 这类误判
fn contains_word(haystack: &str, word: &str) -> bool {
    haystack
        .split(|c: char| !c.is_alphanumeric())
        .any(|token| token == word)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========== parse_continuous ==========

    #[test]
    fn test_parse_plain_integer() {
        assert_eq!(parse_continuous("5").unwrap(), 5.0);
        assert_eq!(parse_continuous("1").unwrap(), 1.0);
        assert_eq!(parse_continuous("7").unwrap(), 7.0);
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_continuous("5.2").unwrap(), 5.2);
        assert_eq!(parse_continuous("3.75").unwrap(), 3.75);
    }

    #[test]
    fn test_parse_number_in_sentence() {
        assert_eq!(parse_continuous("The score is 5").unwrap(), 5.0);
        assert_eq!(parse_continuous("I would rate this 6.5 overall").unwrap(), 6.5);
    }

    #[test]
    fn test_decimal_takes_priority_over_integer() {
        // 小数模式优先于整数模式
        assert_eq!(parse_continuous("between 3 and 4, so 3.5").unwrap(), 3.5);
    }

    #[test]
    fn test_clamp_out_of_range() {
        // 越界是静默修正，不是错误
        assert_eq!(parse_continuous("7.5").unwrap(), 7.0);
        assert_eq!(parse_continuous("9").unwrap(), 7.0);
        assert_eq!(parse_continuous("0.5").unwrap(), 1.0);
        assert_eq!(parse_continuous("-1").unwrap(), 1.0);
        assert_eq!(parse_continuous("0").unwrap(), 1.0);
    }

    #[test]
    fn test_parse_written_numbers() {
        assert_eq!(parse_continuous("one").unwrap(), 1.0);
        assert_eq!(parse_continuous("Two").unwrap(), 2.0);
        assert_eq!(parse_continuous("three").unwrap(), 3.0);
        assert_eq!(parse_continuous("FOUR").unwrap(), 4.0);
        assert_eq!(parse_continuous("five").unwrap(), 5.0);
        assert_eq!(parse_continuous("six").unwrap(), 6.0);
        assert_eq!(parse_continuous("seven").unwrap(), 7.0);
    }

    #[test]
    fn test_written_number_in_sentence() {
        assert_eq!(parse_continuous("The rating is five.").unwrap(), 5.0);
    }

    #[test]
    fn test_parse_continuous_failures() {
        assert!(parse_continuous("").is_err());
        assert!(parse_continuous("   ").is_err());
        assert!(parse_continuous("N/A").is_err());
        assert!(parse_continuous("no idea").is_err());
    }

    // ========== parse_binary ==========

    #[test]
    fn test_answer_tag_one() {
        assert_eq!(parse_binary("<answer>1</answer>").unwrap(), (1, String::new()));
        assert_eq!(parse_binary("<answer>one</answer>").unwrap(), (1, String::new()));
    }

    #[test]
    fn test_answer_tag_zero() {
        assert_eq!(parse_binary("<answer>0</answer>").unwrap(), (0, String::new()));
        assert_eq!(parse_binary("<answer>zero</answer>").unwrap(), (0, String::new()));
        assert_eq!(
            parse_binary("<answer>absent</answer>").unwrap(),
            (0, String::new())
        );
    }

    #[test]
    fn test_reasoning_block_extracted() {
        let (value, reasoning) =
            parse_binary("<reasoning>x</reasoning><answer>0</answer>").unwrap();
        assert_eq!(value, 0);
        assert_eq!(reasoning, "x");
    }

    #[test]
    fn test_reasoning_multiline_case_insensitive() {
        let text = "<REASONING>\nuses loaded terms\nrepeatedly\n</REASONING>\n<Answer>1</Answer>";
        let (value, reasoning) = parse_binary(text).unwrap();
        assert_eq!(value, 1);
        assert_eq!(reasoning, "uses loaded terms\nrepeatedly");
    }

    #[test]
    fn test_unparseable_answer_tag() {
        let err = parse_binary("<answer>maybe</answer>").unwrap_err();
        assert!(matches!(err, ParseError::UnparseableAnswerTag { .. }));
    }

    #[test]
    fn test_fallback_without_answer_tag() {
        assert_eq!(parse_binary("1").unwrap().0, 1);
        assert_eq!(parse_binary("0").unwrap().0, 0);
        assert_eq!(parse_binary("The marker is present.").unwrap().0, 1);
        assert_eq!(parse_binary("yes").unwrap().0, 1);
        assert_eq!(parse_binary("The marker is absent.").unwrap().0, 0);
        assert_eq!(parse_binary("No").unwrap().0, 0);
    }

    #[test]
    fn test_fallback_word_boundary() {
        // "know" 不应命中 "no"
        assert!(parse_binary("I know nothing about markers").is_err());
    }

    #[test]
    fn test_parse_binary_failures() {
        assert!(parse_binary("").is_err());
        assert!(parse_binary("   ").is_err());
        assert!(parse_binary("unclear").is_err());
    }
}
