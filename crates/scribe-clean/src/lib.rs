//! Text cleaner
//!
//! Normalizes raw document text before splitting. Every rule is a pure
//! function of its input, and rules run in a fixed order (headers, bullets,
//! whitespace) so identical input and options always give identical output.

use lazy_static::lazy_static;
use regex::Regex;
use scribe_core::CleanOptions;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref FRONT_MATTER_END: Regex =
        Regex::new(r"(?mi)^[ \t]*\*{3}[ \t]*START OF\b.*$").unwrap();
    static ref BACK_MATTER_START: Regex =
        Regex::new(r"(?mi)^[ \t]*\*{3}[ \t]*END OF\b.*$").unwrap();
    static ref PAGE_NUMBER: Regex =
        Regex::new(r"(?i)^\s*(?:page\s+\d{1,4}|-\s*\d{1,4}\s*-|\d{1,4})\s*$").unwrap();
    static ref BOILERPLATE: Regex =
        Regex::new(r"(?i)^\s*(?:copyright\b|©|\(c\)\s*\d{4}|all rights reserved|isbn\b)").unwrap();
    static ref BULLET: Regex = Regex::new(r"^(\s*)(?:[-*•◦▪‣]|\d{1,3}[.)])\s+").unwrap();
    static ref HORIZONTAL_SPACE: Regex = Regex::new(r"[ \t\u{00A0}\x0B\x0C]+").unwrap();
    static ref EXCESS_NEWLINES: Regex = Regex::new(r"\n{3,}").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanRule {
    FrontMatter,
    BackMatter,
    PageNumbers,
    Boilerplate,
    Bullets,
    Whitespace,
}

/// How many lines a rule touched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanStat {
    pub rule: CleanRule,
    pub count: usize,
}

/// Rule-based document cleaner
#[derive(Debug, Clone, Copy, Default)]
pub struct Cleaner;

impl Cleaner {
    pub fn new() -> Self {
        Self
    }

    /// Clean `raw` according to `options`
    pub fn clean(&self, raw: &str, options: &CleanOptions) -> String {
        self.clean_with_report(raw, options).0
    }

    /// Clean `raw` and report which rules fired
    pub fn clean_with_report(&self, raw: &str, options: &CleanOptions) -> (String, Vec<CleanStat>) {
        let mut stats = Vec::new();
        let mut text = raw.to_string();

        if options.remove_headers {
            text = remove_headers(&text, &mut stats);
        }
        if options.strip_bullets {
            text = strip_bullets(&text, &mut stats);
        }
        if options.normalize_whitespace {
            text = normalize_whitespace(&text, &mut stats);
        }

        (text, stats)
    }
}

fn push_stat(stats: &mut Vec<CleanStat>, rule: CleanRule, count: usize) {
    if count > 0 {
        stats.push(CleanStat { rule, count });
    }
}

fn remove_headers(text: &str, stats: &mut Vec<CleanStat>) -> String {
    let mut body = text;

    if let Some(marker) = FRONT_MATTER_END.find(body) {
        push_stat(stats, CleanRule::FrontMatter, body[..marker.end()].lines().count());
        body = &body[marker.end()..];
    }
    if let Some(marker) = BACK_MATTER_START.find(body) {
        push_stat(stats, CleanRule::BackMatter, body[marker.start()..].lines().count());
        body = &body[..marker.start()];
    }

    let mut page_numbers = 0;
    let mut boilerplate = 0;
    let kept: Vec<&str> = body
        .split('\n')
        .filter(|line| {
            if PAGE_NUMBER.is_match(line) {
                page_numbers += 1;
                false
            } else if BOILERPLATE.is_match(line) {
                boilerplate += 1;
                false
            } else {
                true
            }
        })
        .collect();

    push_stat(stats, CleanRule::PageNumbers, page_numbers);
    push_stat(stats, CleanRule::Boilerplate, boilerplate);

    kept.join("\n")
}

fn strip_bullets(text: &str, stats: &mut Vec<CleanStat>) -> String {
    let mut count = 0;
    let lines: Vec<String> = text
        .split('\n')
        .map(|line| {
            if BULLET.is_match(line) {
                count += 1;
                BULLET.replace(line, "${1}").into_owned()
            } else {
                line.to_string()
            }
        })
        .collect();

    push_stat(stats, CleanRule::Bullets, count);
    lines.join("\n")
}

fn normalize_whitespace(text: &str, stats: &mut Vec<CleanStat>) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");

    let mut changed = 0;
    let lines: Vec<String> = unified
        .split('\n')
        .map(|line| {
            let collapsed = HORIZONTAL_SPACE.replace_all(line, " ");
            let normalized = collapsed.trim();
            if normalized != line {
                changed += 1;
            }
            normalized.to_string()
        })
        .collect();

    let joined = lines.join("\n");
    changed += EXCESS_NEWLINES.find_iter(&joined).count();
    let collapsed = EXCESS_NEWLINES.replace_all(&joined, "\n\n");

    push_stat(stats, CleanRule::Whitespace, changed);
    collapsed.trim().to_string()
}
